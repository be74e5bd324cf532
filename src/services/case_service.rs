// src/services/case_service.rs

use std::{collections::HashSet, sync::Arc};

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{CaseRepository, LawFirmRepository, PropertyRepository, TenantRepository, UserRepository},
    models::{
        admin::LawFirm,
        auth::{Role, User},
        legal_case::{
            AdminCasePatch, CreateCasePayload, DocumentSlot, LegalCase, QuoteResponse, TenantPayment,
        },
        payment::{PaymentOutcome, PaymentSession, ResolveOutcome},
        property::{Property, Tenant},
    },
    services::{
        lifecycle::{self, DraftRequest},
        payment_gateway::MockPaymentGateway,
        pricing,
    },
};

/// Tudo o que a notificação em PDF precisa.
pub struct NoticeParts {
    pub case: LegalCase,
    pub property: Property,
    pub tenant: Tenant,
    pub landlord: User,
    pub law_firm: Option<LawFirm>,
}

#[derive(Clone)]
pub struct CaseService {
    users: Arc<dyn UserRepository>,
    properties: Arc<dyn PropertyRepository>,
    tenants: Arc<dyn TenantRepository>,
    cases: Arc<dyn CaseRepository>,
    law_firms: Arc<dyn LawFirmRepository>,
    gateway: MockPaymentGateway,
}

impl CaseService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        properties: Arc<dyn PropertyRepository>,
        tenants: Arc<dyn TenantRepository>,
        cases: Arc<dyn CaseRepository>,
        law_firms: Arc<dyn LawFirmRepository>,
        gateway: MockPaymentGateway,
    ) -> Self {
        Self { users, properties, tenants, cases, law_firms, gateway }
    }

    // =========================================================================
    //  LEITURA & PERMISSÕES
    // =========================================================================

    async fn load(&self, case_id: Uuid) -> Result<LegalCase, AppError> {
        self.cases
            .find_by_id(case_id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound(format!("Case {}", case_id)))
    }

    async fn owned_property(&self, user: &User, property_id: Uuid) -> Result<Property, AppError> {
        match self.properties.find_by_id(property_id).await? {
            Some(p) if p.landlord_id == user.id => Ok(p),
            _ => Err(AppError::ResourceNotFound(format!("Property {}", property_id))),
        }
    }

    fn can_view(user: &User, case: &LegalCase) -> bool {
        match user.role {
            Role::Admin => true,
            Role::Landlord => case.landlord_id == user.id,
            Role::Contractor => {
                case.contractor_id == Some(user.id)
                    || (case.contractor_id.is_none() && case.is_paid_active())
            }
        }
    }

    fn ensure_owner_or_admin(user: &User, case: &LegalCase) -> Result<(), AppError> {
        if user.role == Role::Admin || (user.role == Role::Landlord && case.landlord_id == user.id) {
            return Ok(());
        }
        Err(AppError::Forbidden("only the case owner can do this".into()))
    }

    // Contratado responsável pelo caso, ou admin
    fn ensure_worker(user: &User, case: &LegalCase) -> Result<(), AppError> {
        if user.role == Role::Admin || (user.role == Role::Contractor && case.contractor_id == Some(user.id)) {
            return Ok(());
        }
        Err(AppError::Forbidden("only the assigned contractor can do this".into()))
    }

    pub async fn get_case(&self, user: &User, case_id: Uuid) -> Result<LegalCase, AppError> {
        let case = self.load(case_id).await?;
        if !Self::can_view(user, &case) {
            // Não revelamos a existência de casos alheios
            return Err(AppError::ResourceNotFound(format!("Case {}", case_id)));
        }
        Ok(case)
    }

    pub async fn list_cases(&self, user: &User) -> Result<Vec<LegalCase>, AppError> {
        match user.role {
            Role::Admin => self.cases.list_all().await,
            Role::Landlord => self.cases.list_by_landlord(user.id).await,
            Role::Contractor => self.cases.list_for_contractor(user.id).await,
        }
    }

    // =========================================================================
    //  PREÇO & CRIAÇÃO
    // =========================================================================

    pub async fn quote(&self, user: &User, property_id: Uuid) -> Result<QuoteResponse, AppError> {
        let property = self.owned_property(user, property_id).await?;
        let price = pricing::chargeable_price(user, &property)?;

        Ok(QuoteResponse {
            property_id,
            jurisdiction: property.jurisdiction,
            price,
            referral_discount_applied: pricing::has_referral(user),
        })
    }

    pub async fn create_case(&self, user: &User, payload: CreateCasePayload) -> Result<LegalCase, AppError> {
        let property = self.owned_property(user, payload.property_id).await?;

        let tenant = match self.tenants.find_by_id(payload.tenant_id).await? {
            Some(t) if t.landlord_id == user.id => t,
            _ => return Err(AppError::ResourceNotFound(format!("Tenant {}", payload.tenant_id))),
        };
        if tenant.property_id != property.id {
            return Err(AppError::InvalidStateForTransition(format!(
                "tenant {} does not live at property {}",
                tenant.id, property.id
            )));
        }

        if let Some(firm_id) = payload.law_firm_id {
            if self.law_firms.find_by_id(firm_id).await?.is_none() {
                return Err(AppError::ResourceNotFound(format!("Law firm {}", firm_id)));
            }
        }

        // 1. Preço (falha antes de qualquer gravação)
        let price = pricing::chargeable_price(user, &property)?;

        // 2. Um pedido aberto por inquilino
        let tenant_cases = self.cases.list_by_tenant(tenant.id).await?;
        lifecycle::ensure_no_open_request(tenant.id, &tenant_cases)?;

        let case = lifecycle::new_draft(
            DraftRequest {
                landlord_id: user.id,
                property_id: property.id,
                tenant_id: tenant.id,
                law_firm_id: payload.law_firm_id,
                price,
                rent_owed_at_filing: payload.rent_owed_at_filing,
                notes: payload.notes,
            },
            Utc::now(),
        );

        let case = self.cases.insert(&case).await?;
        tracing::info!("Case {} created as draft for tenant {} at {}", case.id, tenant.id, price);
        Ok(case)
    }

    pub async fn delete_draft(&self, user: &User, case_id: Uuid) -> Result<(), AppError> {
        let case = self.load(case_id).await?;
        if case.landlord_id != user.id {
            return Err(AppError::ResourceNotFound(format!("Case {}", case_id)));
        }
        lifecycle::ensure_deletable(&case)?;

        self.cases.delete(case_id).await?;
        tracing::info!("Draft case {} deleted", case_id);
        Ok(())
    }

    // =========================================================================
    //  CHECKOUT
    // =========================================================================

    pub async fn enter_checkout(&self, user: &User, case_ids: &[Uuid]) -> Result<PaymentSession, AppError> {
        let mut cases = Vec::with_capacity(case_ids.len());
        let mut seen_cases = HashSet::new();
        let mut seen_tenants = HashSet::new();

        for case_id in case_ids {
            if !seen_cases.insert(*case_id) {
                continue;
            }
            let case = self.load(*case_id).await?;
            if case.landlord_id != user.id {
                return Err(AppError::ResourceNotFound(format!("Case {}", case_id)));
            }
            lifecycle::ensure_checkout_ready(&case)?;

            // Dois casos do mesmo inquilino no mesmo checkout seria cobrança dupla
            if !seen_tenants.insert(case.tenant_id) {
                return Err(AppError::DuplicateActiveRequest { tenant_id: case.tenant_id });
            }
            let tenant_cases = self.cases.list_by_tenant(case.tenant_id).await?;
            lifecycle::ensure_no_paid_active(case.tenant_id, &tenant_cases)?;

            cases.push(case);
        }

        self.gateway.create_session(user.id, cases).await
    }

    pub async fn find_session(&self, user: &User, session_id: Uuid) -> Result<PaymentSession, AppError> {
        let session = self.gateway.find_session(session_id).await?;
        if user.role != Role::Admin && session.owner_user_id != user.id {
            return Err(AppError::ResourceNotFound(format!("Session {}", session_id)));
        }
        Ok(session)
    }

    pub async fn resolve_checkout(
        &self,
        user: &User,
        session_id: Uuid,
        outcome: PaymentOutcome,
    ) -> Result<ResolveOutcome, AppError> {
        self.find_session(user, session_id).await?;
        self.gateway.resolve(session_id, outcome).await
    }

    // =========================================================================
    //  TRABALHO DE CAMPO
    // =========================================================================

    pub async fn claim(&self, contractor: &User, case_id: Uuid) -> Result<LegalCase, AppError> {
        if contractor.role != Role::Contractor {
            return Err(AppError::Forbidden("only contractors can claim cases".into()));
        }
        let mut case = self.load(case_id).await?;
        lifecycle::claim(&mut case, contractor.id, Utc::now())?;

        let case = self.cases.update(&case).await?;
        tracing::info!("Case {} claimed by contractor {}", case_id, contractor.id);
        Ok(case)
    }

    pub async fn unclaim(&self, user: &User, case_id: Uuid) -> Result<LegalCase, AppError> {
        let mut case = self.load(case_id).await?;
        Self::ensure_worker(user, &case)?;
        lifecycle::unclaim(&mut case, Utc::now())?;

        let case = self.cases.update(&case).await?;
        tracing::info!("Case {} released by {}", case_id, user.id);
        Ok(case)
    }

    pub async fn start_work(&self, user: &User, case_id: Uuid) -> Result<LegalCase, AppError> {
        let mut case = self.load(case_id).await?;
        Self::ensure_worker(user, &case)?;
        lifecycle::start_work(&mut case, Utc::now())?;
        self.cases.update(&case).await
    }

    pub async fn record_document(
        &self,
        user: &User,
        case_id: Uuid,
        slot: DocumentSlot,
        reference: Option<String>,
    ) -> Result<LegalCase, AppError> {
        let mut case = self.load(case_id).await?;
        if Self::ensure_owner_or_admin(user, &case).is_err() {
            Self::ensure_worker(user, &case)?;
        }
        lifecycle::set_document(&mut case, slot, reference, Utc::now())?;
        self.cases.update(&case).await
    }

    pub async fn mark_complete(&self, user: &User, case_id: Uuid) -> Result<LegalCase, AppError> {
        let mut case = self.load(case_id).await?;
        Self::ensure_worker(user, &case)?;
        lifecycle::mark_complete(&mut case, Utc::now())?;

        let case = self.cases.update(&case).await?;
        tracing::info!("Case {} completed", case_id);
        Ok(case)
    }

    // =========================================================================
    //  PAGAMENTOS DO INQUILINO
    // =========================================================================

    pub async fn record_tenant_payment(
        &self,
        user: &User,
        case_id: Uuid,
        amount: Decimal,
        paid_on: NaiveDate,
    ) -> Result<TenantPayment, AppError> {
        let mut case = self.load(case_id).await?;
        Self::ensure_owner_or_admin(user, &case)?;

        let now = Utc::now();
        lifecycle::apply_tenant_payment(&mut case, amount, now)?;

        let payment = TenantPayment {
            id: Uuid::new_v4(),
            case_id,
            amount,
            paid_on,
            created_at: now,
        };
        self.cases.record_payment(&case, &payment).await?;

        tracing::info!(
            "Tenant payment of {} recorded on case {}; balance now {}",
            amount,
            case_id,
            case.current_rent_owed
        );
        Ok(payment)
    }

    pub async fn list_tenant_payments(&self, user: &User, case_id: Uuid) -> Result<Vec<TenantPayment>, AppError> {
        let case = self.get_case(user, case_id).await?;
        self.cases.list_payments(case.id).await
    }

    // =========================================================================
    //  ADMIN
    // =========================================================================

    pub async fn admin_update(&self, case_id: Uuid, patch: AdminCasePatch) -> Result<LegalCase, AppError> {
        let case = self.load(case_id).await?;
        let before = (case.status, case.payment_status);

        let case = lifecycle::apply_admin_patch(case, patch, Utc::now())?;
        let case = self.cases.update(&case).await?;

        if before != (case.status, case.payment_status) {
            tracing::warn!(
                "Admin override on case {}: {:?}/{:?} -> {:?}/{:?}",
                case_id,
                before.0,
                before.1,
                case.status,
                case.payment_status
            );
        }
        Ok(case)
    }

    /// Edição em lote: cada caso passa pelas mesmas regras de `admin_update`.
    pub async fn admin_bulk_update(
        &self,
        case_ids: &[Uuid],
        patch: AdminCasePatch,
    ) -> Result<Vec<LegalCase>, AppError> {
        let now = Utc::now();
        let mut updated = Vec::with_capacity(case_ids.len());
        for case_id in case_ids {
            let case = self.load(*case_id).await?;
            updated.push(lifecycle::apply_admin_patch(case, patch.clone(), now)?);
        }

        // Tudo ou nada
        self.cases.update_many(&updated).await?;
        tracing::warn!("Admin bulk edit applied to {} case(s)", updated.len());
        Ok(updated)
    }

    // =========================================================================
    //  DOCUMENTO
    // =========================================================================

    pub async fn notice_parts(&self, user: &User, case_id: Uuid) -> Result<NoticeParts, AppError> {
        let case = self.get_case(user, case_id).await?;

        let property = self
            .properties
            .find_by_id(case.property_id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound(format!("Property {}", case.property_id)))?;
        let tenant = self
            .tenants
            .find_by_id(case.tenant_id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound(format!("Tenant {}", case.tenant_id)))?;
        let landlord = self
            .users
            .find_by_id(case.landlord_id)
            .await?
            .ok_or(AppError::UserNotFound)?;
        let law_firm = match case.law_firm_id {
            Some(id) => self.law_firms.find_by_id(id).await?,
            None => None,
        };

        Ok(NoticeParts { case, property, tenant, landlord, law_firm })
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::{
            auth::PriceOverride,
            legal_case::{CaseStatus, PaymentStatus},
            payment::SessionStatus,
            property::PropertyType,
        },
        services::test_support::{property_in, tenant_at, Fixture},
    };

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn request(fx: &Fixture, tenant: &Tenant) -> CreateCasePayload {
        CreateCasePayload {
            property_id: fx.property.id,
            tenant_id: tenant.id,
            law_firm_id: None,
            rent_owed_at_filing: dec("1200"),
            notes: None,
        }
    }

    async fn paid_case(fx: &Fixture) -> LegalCase {
        let case = fx.cases.create_case(&fx.landlord, request(fx, &fx.tenant)).await.unwrap();
        let session = fx.cases.enter_checkout(&fx.landlord, &[case.id]).await.unwrap();
        fx.gateway.resolve(session.id, PaymentOutcome::Success).await.unwrap();
        fx.cases.get_case(&fx.landlord, case.id).await.unwrap()
    }

    #[tokio::test]
    async fn create_fixes_price_and_opens_unpaid_draft() {
        let fx = Fixture::new().await;
        let case = fx.cases.create_case(&fx.landlord, request(&fx, &fx.tenant)).await.unwrap();

        assert_eq!(case.price, dec("150.00"));
        assert_eq!(case.status, CaseStatus::NoticeDraft);
        assert_eq!(case.payment_status, PaymentStatus::Unpaid);
        assert_eq!(case.current_rent_owed, case.rent_owed_at_filing);
    }

    #[tokio::test]
    async fn locked_jurisdiction_creates_nothing() {
        let fx = Fixture::new().await;
        fx.store
            .set_price_override(
                fx.landlord.id,
                "Howard County",
                PriceOverride { price: dec("150"), unlocked: false },
            )
            .await
            .unwrap();
        let landlord = UserRepository::find_by_id(&fx.store, fx.landlord.id).await.unwrap().unwrap();

        let mut property = property_in(&landlord, "Howard County");
        property.property_type = PropertyType::Commercial;
        PropertyRepository::insert(&fx.store, &property).await.unwrap();
        let tenant = tenant_at(&property);
        TenantRepository::insert(&fx.store, &tenant).await.unwrap();

        let payload = CreateCasePayload {
            property_id: property.id,
            tenant_id: tenant.id,
            law_firm_id: None,
            rent_owed_at_filing: dec("900"),
            notes: None,
        };
        let err = fx.cases.create_case(&landlord, payload).await.unwrap_err();
        assert!(matches!(err, AppError::PricingUnavailable(_)));
        assert!(fx.cases.list_cases(&landlord).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn quote_applies_referral_discount() {
        let fx = Fixture::new().await;
        fx.store.set_referral_code(fx.landlord.id, Some("FRIEND")).await.unwrap();
        let landlord = UserRepository::find_by_id(&fx.store, fx.landlord.id).await.unwrap().unwrap();

        let quote = fx.cases.quote(&landlord, fx.property.id).await.unwrap();
        assert_eq!(quote.price, dec("145.00"));
        assert!(quote.referral_discount_applied);
    }

    #[tokio::test]
    async fn second_open_draft_for_same_tenant_is_rejected() {
        let fx = Fixture::new().await;
        fx.cases.create_case(&fx.landlord, request(&fx, &fx.tenant)).await.unwrap();

        let err = fx.cases.create_case(&fx.landlord, request(&fx, &fx.tenant)).await.unwrap_err();
        assert!(matches!(err, AppError::DuplicateActiveRequest { .. }));

        // Outro inquilino não é afetado
        let other = fx.another_tenant().await;
        assert!(fx.cases.create_case(&fx.landlord, request(&fx, &other)).await.is_ok());
    }

    #[tokio::test]
    async fn checkout_rejects_draft_while_tenant_has_paid_active_case() {
        let fx = Fixture::new().await;
        let active = paid_case(&fx).await;
        assert!(active.is_paid_active());

        // Pago e ativo não bloqueia um novo rascunho...
        let draft = fx.cases.create_case(&fx.landlord, request(&fx, &fx.tenant)).await.unwrap();

        // ...mas bloqueia o checkout dele
        let err = fx.cases.enter_checkout(&fx.landlord, &[draft.id]).await.unwrap_err();
        assert!(matches!(err, AppError::DuplicateActiveRequest { .. }));
        assert!(fx.cases.get_case(&fx.landlord, draft.id).await.unwrap().is_draft_unpaid());
    }

    #[tokio::test]
    async fn cancelled_checkout_of_two_cases_reverts_both() {
        let fx = Fixture::new().await;
        let other = fx.another_tenant().await;
        let a = fx.cases.create_case(&fx.landlord, request(&fx, &fx.tenant)).await.unwrap();
        let b = fx.cases.create_case(&fx.landlord, request(&fx, &other)).await.unwrap();

        let session = fx.cases.enter_checkout(&fx.landlord, &[a.id, b.id]).await.unwrap();
        assert_eq!(session.total_amount, dec("300"));

        let outcome = fx
            .cases
            .resolve_checkout(&fx.landlord, session.id, PaymentOutcome::Cancelled)
            .await
            .unwrap();
        assert_eq!(outcome.session().status, SessionStatus::Expired);

        let again = fx
            .cases
            .resolve_checkout(&fx.landlord, session.id, PaymentOutcome::Cancelled)
            .await
            .unwrap();
        assert!(matches!(again, ResolveOutcome::AlreadyResolved(_)));

        for id in [a.id, b.id] {
            let case = fx.cases.get_case(&fx.landlord, id).await.unwrap();
            assert!(case.is_draft_unpaid());
            assert_eq!(case.checkout_session_id, None);
        }
    }

    #[tokio::test]
    async fn same_tenant_twice_in_one_checkout_is_rejected() {
        let fx = Fixture::new().await;
        let a = fx.cases.create_case(&fx.landlord, request(&fx, &fx.tenant)).await.unwrap();

        // Um segundo rascunho só existe via override do admin; o checkout precisa barrar
        let mut b = a.clone();
        b.id = Uuid::new_v4();
        CaseRepository::insert(&fx.store, &b).await.unwrap();

        let err = fx.cases.enter_checkout(&fx.landlord, &[a.id, b.id]).await.unwrap_err();
        assert!(matches!(err, AppError::DuplicateActiveRequest { .. }));
    }

    #[tokio::test]
    async fn only_unpaid_drafts_can_be_deleted() {
        let fx = Fixture::new().await;
        let draft = fx.cases.create_case(&fx.landlord, request(&fx, &fx.tenant)).await.unwrap();
        fx.cases.delete_draft(&fx.landlord, draft.id).await.unwrap();
        assert!(fx.cases.get_case(&fx.landlord, draft.id).await.is_err());

        let paid = paid_case(&fx).await;
        let err = fx.cases.delete_draft(&fx.landlord, paid.id).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidStateForDeletion { .. }));
    }

    #[tokio::test]
    async fn contractor_flow_to_complete() {
        let fx = Fixture::new().await;
        let case = paid_case(&fx).await;

        // Sem claim não pode trabalhar
        assert!(matches!(
            fx.cases.start_work(&fx.contractor, case.id).await,
            Err(AppError::Forbidden(_))
        ));

        fx.cases.claim(&fx.contractor, case.id).await.unwrap();
        let case = fx.cases.start_work(&fx.contractor, case.id).await.unwrap();
        assert_eq!(case.status, CaseStatus::InProgress);

        for slot in [DocumentSlot::EvictionNotice, DocumentSlot::Photo] {
            fx.cases
                .record_document(&fx.contractor, case.id, slot, Some(format!("{slot}.jpg")))
                .await
                .unwrap();
        }

        let err = fx.cases.mark_complete(&fx.contractor, case.id).await.unwrap_err();
        assert!(matches!(err, AppError::IncompleteDocuments { ref missing } if missing.len() == 2));
        let unchanged = fx.cases.get_case(&fx.contractor, case.id).await.unwrap();
        assert_eq!(unchanged.status, CaseStatus::InProgress);

        for slot in [DocumentSlot::Receipt, DocumentSlot::CertificateOfMailing] {
            fx.cases
                .record_document(&fx.landlord, case.id, slot, Some(format!("{slot}.pdf")))
                .await
                .unwrap();
        }
        let done = fx.cases.mark_complete(&fx.contractor, case.id).await.unwrap();
        assert_eq!(done.status, CaseStatus::Complete);
        assert_eq!(done.payment_status, PaymentStatus::Paid);
    }

    #[tokio::test]
    async fn contractor_cannot_claim_a_draft_or_see_foreign_claims() {
        let fx = Fixture::new().await;
        let draft = fx.cases.create_case(&fx.landlord, request(&fx, &fx.tenant)).await.unwrap();
        assert!(matches!(
            fx.cases.claim(&fx.contractor, draft.id).await,
            Err(AppError::InvalidStateForTransition(_))
        ));
        assert!(fx.cases.list_cases(&fx.contractor).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn released_case_in_progress_stays_visible_to_contractors() {
        let fx = Fixture::new().await;
        let case = paid_case(&fx).await;

        fx.cases.claim(&fx.contractor, case.id).await.unwrap();
        fx.cases.start_work(&fx.contractor, case.id).await.unwrap();
        fx.cases.unclaim(&fx.contractor, case.id).await.unwrap();

        let other = fx.another_contractor().await;
        let listed = fx.cases.list_cases(&other).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].status, CaseStatus::InProgress);
        assert_eq!(listed[0].contractor_id, None);

        fx.cases.get_case(&other, case.id).await.unwrap();
        let claimed = fx.cases.claim(&other, case.id).await.unwrap();
        assert_eq!(claimed.contractor_id, Some(other.id));
        assert!(fx.cases.list_cases(&fx.contractor).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn admin_notes_on_pending_case_survive_payment() {
        let fx = Fixture::new().await;
        let case = fx.cases.create_case(&fx.landlord, request(&fx, &fx.tenant)).await.unwrap();
        let session = fx.cases.enter_checkout(&fx.landlord, &[case.id]).await.unwrap();

        let patch = AdminCasePatch { notes: Some("side door only".into()), ..Default::default() };
        fx.cases.admin_update(case.id, patch).await.unwrap();

        fx.cases
            .resolve_checkout(&fx.landlord, session.id, PaymentOutcome::Success)
            .await
            .unwrap();

        let stored = fx.cases.get_case(&fx.landlord, case.id).await.unwrap();
        assert_eq!(stored.payment_status, PaymentStatus::Paid);
        assert_eq!(stored.status, CaseStatus::Submitted);
        assert_eq!(stored.notes.as_deref(), Some("side door only"));
    }

    #[tokio::test]
    async fn overpayment_keeps_balance() {
        let fx = Fixture::new().await;
        let case = paid_case(&fx).await;

        let err = fx
            .cases
            .record_tenant_payment(&fx.landlord, case.id, dec("2000"), Utc::now().date_naive())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Overpayment { .. }));
        let stored = fx.cases.get_case(&fx.landlord, case.id).await.unwrap();
        assert_eq!(stored.current_rent_owed, dec("1200"));

        fx.cases
            .record_tenant_payment(&fx.landlord, case.id, dec("300"), Utc::now().date_naive())
            .await
            .unwrap();
        let stored = fx.cases.get_case(&fx.landlord, case.id).await.unwrap();
        assert_eq!(stored.current_rent_owed, dec("900"));
        assert_eq!(stored.rent_owed_at_filing, dec("1200"));
        assert_eq!(fx.cases.list_tenant_payments(&fx.landlord, case.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn admin_bulk_edit_is_all_or_nothing() {
        let fx = Fixture::new().await;
        let other = fx.another_tenant().await;
        let complete_ready = paid_case(&fx).await;
        let bare = fx.cases.create_case(&fx.landlord, request(&fx, &other)).await.unwrap();

        for slot in DocumentSlot::ALL {
            fx.cases
                .record_document(&fx.admin, complete_ready.id, slot, Some("doc".into()))
                .await
                .unwrap();
        }

        let patch = AdminCasePatch { status: Some(CaseStatus::Complete), ..Default::default() };
        let err = fx
            .cases
            .admin_bulk_update(&[complete_ready.id, bare.id], patch.clone())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::IncompleteDocuments { .. }));
        let untouched = fx.cases.get_case(&fx.admin, complete_ready.id).await.unwrap();
        assert_eq!(untouched.status, CaseStatus::Submitted);

        let done = fx.cases.admin_update(complete_ready.id, patch).await.unwrap();
        assert_eq!(done.status, CaseStatus::Complete);
    }
}
