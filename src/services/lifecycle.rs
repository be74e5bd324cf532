// src/services/lifecycle.rs
//
// Transições puras do ciclo de vida do caso. Nada aqui toca repositório:
// o `CaseService` e o gateway carregam os casos, aplicam a transição e gravam.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::{
        legal_case::{AdminCasePatch, CaseStatus, DocumentSlot, LegalCase, PaymentStatus},
        payment::PaymentOutcome,
    },
    services::pricing::ensure_chargeable,
};

/// Dados já validados para abrir um rascunho.
pub struct DraftRequest {
    pub landlord_id: Uuid,
    pub property_id: Uuid,
    pub tenant_id: Uuid,
    pub law_firm_id: Option<Uuid>,
    pub price: Decimal,
    pub rent_owed_at_filing: Decimal,
    pub notes: Option<String>,
}

pub fn new_draft(request: DraftRequest, now: DateTime<Utc>) -> LegalCase {
    LegalCase {
        id: Uuid::new_v4(),
        landlord_id: request.landlord_id,
        property_id: request.property_id,
        tenant_id: request.tenant_id,
        law_firm_id: request.law_firm_id,
        status: CaseStatus::NoticeDraft,
        payment_status: PaymentStatus::Unpaid,
        price: request.price,
        rent_owed_at_filing: request.rent_owed_at_filing,
        current_rent_owed: request.rent_owed_at_filing,
        documents: Default::default(),
        checkout_session_id: None,
        contractor_id: None,
        claimed_at: None,
        notes: request.notes,
        created_at: now,
        updated_at: now,
    }
}

fn invalid(case: &LegalCase, action: &str) -> AppError {
    AppError::InvalidStateForTransition(format!(
        "cannot {} case {} in state {:?}/{:?}",
        action, case.id, case.status, case.payment_status
    ))
}

// --- Guards ---

/// A trava do Complete. Toda rota que leva a `Complete` passa por aqui.
pub fn can_mark_complete(case: &LegalCase) -> Result<(), AppError> {
    let missing = case.documents.missing();
    if !missing.is_empty() {
        return Err(AppError::IncompleteDocuments { missing });
    }
    Ok(())
}

/// Um rascunho aberto por inquilino: bloqueia se houver outro caso
/// não pago que ainda não foi concluído.
pub fn ensure_no_open_request(tenant_id: Uuid, tenant_cases: &[LegalCase]) -> Result<(), AppError> {
    let conflict = tenant_cases.iter().any(|c| {
        c.tenant_id == tenant_id
            && c.payment_status != PaymentStatus::Paid
            && c.status != CaseStatus::Complete
    });
    if conflict {
        return Err(AppError::DuplicateActiveRequest { tenant_id });
    }
    Ok(())
}

/// Regra do checkout: não pagar um segundo caso enquanto outro já pago segue ativo.
pub fn ensure_no_paid_active(tenant_id: Uuid, tenant_cases: &[LegalCase]) -> Result<(), AppError> {
    if tenant_cases.iter().any(|c| c.tenant_id == tenant_id && c.is_paid_active()) {
        return Err(AppError::DuplicateActiveRequest { tenant_id });
    }
    Ok(())
}

pub fn ensure_checkout_ready(case: &LegalCase) -> Result<(), AppError> {
    if !case.is_draft_unpaid() {
        return Err(invalid(case, "check out"));
    }
    ensure_chargeable(case.price)
}

pub fn ensure_deletable(case: &LegalCase) -> Result<(), AppError> {
    if !case.is_draft_unpaid() {
        return Err(AppError::InvalidStateForDeletion {
            status: case.status,
            payment_status: case.payment_status,
        });
    }
    Ok(())
}

fn ensure_claimable_state(case: &LegalCase, action: &str) -> Result<(), AppError> {
    if case.is_paid_active() {
        Ok(())
    } else {
        Err(invalid(case, action))
    }
}

// --- Pagamento do checkout ---

pub fn mark_pending(case: &mut LegalCase, session_id: Uuid, now: DateTime<Utc>) {
    case.payment_status = PaymentStatus::PendingPayment;
    case.checkout_session_id = Some(session_id);
    case.updated_at = now;
}

/// Aplica o resultado da sessão aos casos que a referenciam; os demais são descartados.
/// A idempotência vem da trava `Open` da sessão, que o chamador grava junto.
pub fn on_payment_resolved(
    cases: Vec<LegalCase>,
    session_id: Uuid,
    outcome: PaymentOutcome,
    now: DateTime<Utc>,
) -> Vec<LegalCase> {
    cases
        .into_iter()
        .filter(|c| c.checkout_session_id == Some(session_id))
        .filter_map(|mut case| {
            match outcome {
                PaymentOutcome::Success => {
                    case.payment_status = PaymentStatus::Paid;
                    case.status = CaseStatus::Submitted;
                }
                PaymentOutcome::Cancelled | PaymentOutcome::Failed => {
                    if case.payment_status != PaymentStatus::PendingPayment {
                        return None;
                    }
                    case.payment_status = PaymentStatus::Unpaid;
                    case.status = CaseStatus::NoticeDraft;
                }
            }
            case.checkout_session_id = None;
            case.updated_at = now;
            Some(case)
        })
        .collect()
}

// --- Trabalho de campo ---

pub fn claim(case: &mut LegalCase, contractor_id: Uuid, now: DateTime<Utc>) -> Result<(), AppError> {
    ensure_claimable_state(case, "claim")?;

    match case.contractor_id {
        Some(current) if current == contractor_id => return Ok(()),
        Some(_) => {
            return Err(AppError::InvalidStateForTransition(format!(
                "case {} is already claimed by another contractor",
                case.id
            )))
        }
        None => {}
    }

    case.contractor_id = Some(contractor_id);
    case.claimed_at = Some(now);
    case.updated_at = now;
    Ok(())
}

pub fn unclaim(case: &mut LegalCase, now: DateTime<Utc>) -> Result<(), AppError> {
    ensure_claimable_state(case, "unclaim")?;
    case.contractor_id = None;
    case.claimed_at = None;
    case.updated_at = now;
    Ok(())
}

pub fn start_work(case: &mut LegalCase, now: DateTime<Utc>) -> Result<(), AppError> {
    if !(case.status == CaseStatus::Submitted && case.payment_status == PaymentStatus::Paid) {
        return Err(invalid(case, "start work on"));
    }
    case.status = CaseStatus::InProgress;
    case.updated_at = now;
    Ok(())
}

pub fn set_document(
    case: &mut LegalCase,
    slot: DocumentSlot,
    reference: Option<String>,
    now: DateTime<Utc>,
) -> Result<(), AppError> {
    if case.status == CaseStatus::Complete {
        return Err(invalid(case, "change documents of"));
    }
    case.documents.set(slot, reference);
    case.updated_at = now;
    Ok(())
}

pub fn mark_complete(case: &mut LegalCase, now: DateTime<Utc>) -> Result<(), AppError> {
    can_mark_complete(case)?;
    if !case.is_paid_active() {
        return Err(invalid(case, "complete"));
    }
    case.status = CaseStatus::Complete;
    case.updated_at = now;
    Ok(())
}

/// Abate o saldo devido. Pagamento acima do saldo é rejeitado, nunca ajustado.
pub fn apply_tenant_payment(case: &mut LegalCase, amount: Decimal, now: DateTime<Utc>) -> Result<(), AppError> {
    if !case.is_paid_active() {
        return Err(invalid(case, "record a tenant payment on"));
    }
    // NUMERIC(12,2): frações de centavo não chegam ao banco
    if amount <= Decimal::ZERO || amount.normalize().scale() > 2 {
        return Err(AppError::InvalidPaymentAmount);
    }
    if amount > case.current_rent_owed {
        return Err(AppError::Overpayment {
            amount,
            balance: case.current_rent_owed,
        });
    }
    case.current_rent_owed -= amount;
    case.updated_at = now;
    Ok(())
}

/// Edição direta do admin. Chegar em `Complete` continua exigindo os quatro documentos.
pub fn apply_admin_patch(
    mut case: LegalCase,
    patch: AdminCasePatch,
    now: DateTime<Utc>,
) -> Result<LegalCase, AppError> {
    let slots = [
        (DocumentSlot::EvictionNotice, patch.eviction_notice),
        (DocumentSlot::Photo, patch.photo),
        (DocumentSlot::Receipt, patch.receipt),
        (DocumentSlot::CertificateOfMailing, patch.certificate_of_mailing),
    ];
    let touches_documents = slots.iter().any(|(_, r)| r.is_some());

    // Só reabrindo o caso os documentos voltam a ser editáveis
    let stays_complete = patch.status.is_none_or(|s| s == CaseStatus::Complete);
    if touches_documents && case.status == CaseStatus::Complete && stays_complete {
        return Err(invalid(&case, "change documents of"));
    }
    for (slot, reference) in slots {
        if let Some(reference) = reference {
            case.documents.set(slot, Some(reference));
        }
    }

    if let Some(price) = patch.price {
        ensure_chargeable(price)?;
        case.price = price;
    }
    if let Some(payment_status) = patch.payment_status {
        case.payment_status = payment_status;
        if payment_status != PaymentStatus::PendingPayment {
            case.checkout_session_id = None;
        }
    }
    if let Some(status) = patch.status {
        case.status = status;
    }
    if patch.notes.is_some() {
        case.notes = patch.notes;
    }

    if case.status == CaseStatus::Complete {
        can_mark_complete(&case)?;
    }

    case.updated_at = now;
    Ok(case)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::draft_case;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn paid(mut case: LegalCase, status: CaseStatus) -> LegalCase {
        case.status = status;
        case.payment_status = PaymentStatus::Paid;
        case
    }

    fn with_documents(mut case: LegalCase, slots: &[DocumentSlot]) -> LegalCase {
        for slot in slots {
            case.documents.set(*slot, Some(format!("{}.pdf", slot)));
        }
        case
    }

    #[test]
    fn complete_requires_all_four_documents() {
        let mut case = with_documents(
            paid(draft_case(dec("150")), CaseStatus::InProgress),
            &[DocumentSlot::EvictionNotice, DocumentSlot::Photo],
        );

        let err = mark_complete(&mut case, Utc::now()).unwrap_err();
        match err {
            AppError::IncompleteDocuments { missing } => {
                assert_eq!(missing, vec![DocumentSlot::Receipt, DocumentSlot::CertificateOfMailing]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(case.status, CaseStatus::InProgress);

        let mut case = with_documents(case, &DocumentSlot::ALL);
        mark_complete(&mut case, Utc::now()).unwrap();
        assert_eq!(case.status, CaseStatus::Complete);
    }

    #[test]
    fn blank_reference_does_not_fill_a_slot() {
        let mut case = paid(draft_case(dec("150")), CaseStatus::InProgress);
        set_document(&mut case, DocumentSlot::Photo, Some("   ".into()), Utc::now()).unwrap();
        assert_eq!(case.documents.photo, None);
    }

    #[test]
    fn documents_are_frozen_once_complete() {
        let mut case = with_documents(paid(draft_case(dec("150")), CaseStatus::InProgress), &DocumentSlot::ALL);
        mark_complete(&mut case, Utc::now()).unwrap();

        let err = set_document(&mut case, DocumentSlot::Photo, None, Utc::now()).unwrap_err();
        assert!(matches!(err, AppError::InvalidStateForTransition(_)));
        assert!(can_mark_complete(&case).is_ok());
    }

    #[test]
    fn admin_patch_cannot_bypass_the_document_gate() {
        let case = with_documents(paid(draft_case(dec("150")), CaseStatus::InProgress), &[DocumentSlot::Photo]);
        let patch = AdminCasePatch {
            status: Some(CaseStatus::Complete),
            ..Default::default()
        };
        assert!(matches!(
            apply_admin_patch(case.clone(), patch, Utc::now()),
            Err(AppError::IncompleteDocuments { .. })
        ));

        let patch = AdminCasePatch {
            status: Some(CaseStatus::Complete),
            eviction_notice: Some("n.pdf".into()),
            receipt: Some("r.pdf".into()),
            certificate_of_mailing: Some("c.pdf".into()),
            ..Default::default()
        };
        let patched = apply_admin_patch(case, patch, Utc::now()).unwrap();
        assert_eq!(patched.status, CaseStatus::Complete);
    }

    #[test]
    fn admin_patch_keeping_complete_cannot_swap_documents() {
        let mut case = with_documents(paid(draft_case(dec("150")), CaseStatus::InProgress), &DocumentSlot::ALL);
        mark_complete(&mut case, Utc::now()).unwrap();

        let patch = AdminCasePatch {
            status: Some(CaseStatus::Complete),
            receipt: Some("other-receipt.pdf".into()),
            ..Default::default()
        };
        assert!(matches!(
            apply_admin_patch(case.clone(), patch, Utc::now()),
            Err(AppError::InvalidStateForTransition(_))
        ));

        // Reabrir libera a troca
        let patch = AdminCasePatch {
            status: Some(CaseStatus::InProgress),
            receipt: Some("other-receipt.pdf".into()),
            ..Default::default()
        };
        let reopened = apply_admin_patch(case, patch, Utc::now()).unwrap();
        assert_eq!(reopened.status, CaseStatus::InProgress);
        assert_eq!(reopened.documents.receipt.as_deref(), Some("other-receipt.pdf"));
    }

    #[test]
    fn admin_patch_rejects_non_positive_price() {
        let case = draft_case(dec("150"));
        let patch = AdminCasePatch { price: Some(Decimal::ZERO), ..Default::default() };
        assert!(matches!(apply_admin_patch(case, patch, Utc::now()), Err(AppError::InvalidPrice(_))));
    }

    #[test]
    fn overpayment_is_rejected_without_touching_balance() {
        let mut case = paid(draft_case(dec("150")), CaseStatus::Submitted);
        case.current_rent_owed = dec("1200");

        let err = apply_tenant_payment(&mut case, dec("2000"), Utc::now()).unwrap_err();
        assert!(matches!(err, AppError::Overpayment { .. }));
        assert_eq!(case.current_rent_owed, dec("1200"));

        apply_tenant_payment(&mut case, dec("1200"), Utc::now()).unwrap();
        assert_eq!(case.current_rent_owed, Decimal::ZERO);
    }

    #[test]
    fn tenant_payment_needs_positive_amount_and_paid_case() {
        let mut draft = draft_case(dec("150"));
        assert!(matches!(
            apply_tenant_payment(&mut draft, dec("10"), Utc::now()),
            Err(AppError::InvalidStateForTransition(_))
        ));

        let mut case = paid(draft_case(dec("150")), CaseStatus::InProgress);
        assert!(matches!(
            apply_tenant_payment(&mut case, Decimal::ZERO, Utc::now()),
            Err(AppError::InvalidPaymentAmount)
        ));
    }

    #[test]
    fn tenant_payment_below_one_cent_is_rejected() {
        let mut case = paid(draft_case(dec("150")), CaseStatus::InProgress);
        case.current_rent_owed = dec("1200");

        assert!(matches!(
            apply_tenant_payment(&mut case, dec("0.001"), Utc::now()),
            Err(AppError::InvalidPaymentAmount)
        ));
        assert_eq!(case.current_rent_owed, dec("1200"));

        apply_tenant_payment(&mut case, dec("0.10"), Utc::now()).unwrap();
        assert_eq!(case.current_rent_owed, dec("1199.90"));
    }

    #[test]
    fn only_unpaid_drafts_are_deletable() {
        assert!(ensure_deletable(&draft_case(dec("150"))).is_ok());

        let case = paid(draft_case(dec("150")), CaseStatus::Submitted);
        assert!(matches!(
            ensure_deletable(&case),
            Err(AppError::InvalidStateForDeletion { status: CaseStatus::Submitted, .. })
        ));

        let mut pending = draft_case(dec("150"));
        mark_pending(&mut pending, Uuid::new_v4(), Utc::now());
        assert!(ensure_deletable(&pending).is_err());
    }

    #[test]
    fn claim_requires_paid_case_and_respects_other_claims() {
        let contractor = Uuid::new_v4();
        let mut draft = draft_case(dec("150"));
        assert!(claim(&mut draft, contractor, Utc::now()).is_err());

        let mut case = paid(draft_case(dec("150")), CaseStatus::Submitted);
        claim(&mut case, contractor, Utc::now()).unwrap();
        assert_eq!(case.contractor_id, Some(contractor));
        assert_eq!(case.status, CaseStatus::Submitted);

        assert!(claim(&mut case, Uuid::new_v4(), Utc::now()).is_err());
        claim(&mut case, contractor, Utc::now()).unwrap();

        unclaim(&mut case, Utc::now()).unwrap();
        assert_eq!(case.contractor_id, None);
        assert_eq!(case.claimed_at, None);
    }

    #[test]
    fn open_draft_blocks_a_second_draft_but_paid_cases_do_not() {
        let draft = draft_case(dec("150"));
        let tenant_id = draft.tenant_id;
        assert!(matches!(
            ensure_no_open_request(tenant_id, &[draft.clone()]),
            Err(AppError::DuplicateActiveRequest { .. })
        ));

        let active = paid(draft.clone(), CaseStatus::InProgress);
        assert!(ensure_no_open_request(tenant_id, &[active.clone()]).is_ok());
        assert!(ensure_no_paid_active(tenant_id, &[active]).is_err());

        let mut failed = draft.clone();
        failed.payment_status = PaymentStatus::Failed;
        assert!(ensure_no_open_request(tenant_id, &[failed]).is_err());

        let done = paid(draft, CaseStatus::Complete);
        assert!(ensure_no_paid_active(tenant_id, &[done]).is_ok());
    }

    #[test]
    fn success_moves_only_session_cases() {
        let session_id = Uuid::new_v4();
        let mut a = draft_case(dec("100"));
        let mut b = draft_case(dec("70"));
        mark_pending(&mut a, session_id, Utc::now());
        mark_pending(&mut b, session_id, Utc::now());
        let outsider = draft_case(dec("50"));

        let updated = on_payment_resolved(vec![a, b, outsider], session_id, PaymentOutcome::Success, Utc::now());

        assert_eq!(updated.len(), 2);
        for case in updated {
            assert_eq!(case.status, CaseStatus::Submitted);
            assert_eq!(case.payment_status, PaymentStatus::Paid);
            assert_eq!(case.checkout_session_id, None);
        }
    }

    #[test]
    fn cancel_reverts_pending_cases_to_unpaid_drafts() {
        let session_id = Uuid::new_v4();
        let mut a = draft_case(dec("100"));
        mark_pending(&mut a, session_id, Utc::now());

        let updated = on_payment_resolved(vec![a], session_id, PaymentOutcome::Cancelled, Utc::now());
        assert_eq!(updated.len(), 1);
        assert!(updated[0].is_draft_unpaid());
        assert_eq!(updated[0].checkout_session_id, None);
    }
}
