// src/services/payment_gateway.rs

use std::{sync::Arc, time::Duration};

use chrono::Utc;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::SessionRepository,
    models::{
        legal_case::LegalCase,
        payment::{PaymentOutcome, PaymentSession, ResolveOutcome, SessionStatus},
    },
    services::lifecycle,
};

/// Checkout simulado. A sessão nasce `Open` e o resultado chega depois,
/// como um webhook do processador, via `resolve`.
#[derive(Clone)]
pub struct MockPaymentGateway {
    sessions: Arc<dyn SessionRepository>,
}

impl MockPaymentGateway {
    pub fn new(sessions: Arc<dyn SessionRepository>) -> Self {
        Self { sessions }
    }

    pub async fn create_session(
        &self,
        user_id: Uuid,
        cases: Vec<LegalCase>,
    ) -> Result<PaymentSession, AppError> {
        if cases.is_empty() {
            return Err(AppError::InvalidStateForTransition(
                "a checkout session needs at least one case".into(),
            ));
        }

        for case in &cases {
            if case.landlord_id != user_id {
                return Err(AppError::Forbidden(format!("case {} belongs to another account", case.id)));
            }
            lifecycle::ensure_checkout_ready(case)?;
        }

        let now = Utc::now();
        let session = PaymentSession {
            id: Uuid::new_v4(),
            owner_user_id: user_id,
            case_ids: cases.iter().map(|c| c.id).collect(),
            total_amount: cases.iter().map(|c| c.price).sum::<Decimal>(),
            status: SessionStatus::Open,
            created_at: now,
            resolved_at: None,
        };

        let pending: Vec<LegalCase> = cases
            .into_iter()
            .map(|mut case| {
                lifecycle::mark_pending(&mut case, session.id, now);
                case
            })
            .collect();

        // Sessão e casos gravados juntos; um caso que saiu de Unpaid no meio derruba tudo
        self.sessions.open_session(&session, &pending).await?;

        tracing::info!(
            "Checkout session {} opened for {} case(s), total {}",
            session.id,
            session.case_ids.len(),
            session.total_amount
        );
        Ok(session)
    }

    pub async fn find_session(&self, session_id: Uuid) -> Result<PaymentSession, AppError> {
        self.sessions
            .find_by_id(session_id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound(format!("Session {}", session_id)))
    }

    /// Entrega do resultado. Entregas repetidas devolvem `AlreadyResolved`.
    pub async fn resolve(&self, session_id: Uuid, outcome: PaymentOutcome) -> Result<ResolveOutcome, AppError> {
        let session = self.find_session(session_id).await?;
        if session.status != SessionStatus::Open {
            tracing::info!("Duplicate outcome {:?} for session {} ignored", outcome, session_id);
            return Ok(ResolveOutcome::AlreadyResolved(session));
        }

        let now = Utc::now();
        let status = outcome.terminal_status();
        let transition = move |cases: Vec<LegalCase>| lifecycle::on_payment_resolved(cases, session_id, outcome, now);

        let applied = self
            .sessions
            .resolve_session(session_id, status, now, &transition)
            .await?;

        let session = self.find_session(session_id).await?;
        let Some(updated) = applied else {
            // Outra entrega ganhou a corrida
            return Ok(ResolveOutcome::AlreadyResolved(session));
        };

        tracing::info!(
            "Checkout session {} resolved as {:?}; {} case(s) updated",
            session_id,
            status,
            updated.len()
        );
        Ok(ResolveOutcome::Resolved(session))
    }

    /// Simula o processador entregando o resultado depois de `delay`.
    pub fn schedule_outcome(&self, session_id: Uuid, outcome: PaymentOutcome, delay: Duration) {
        let gateway = self.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Err(e) = gateway.resolve(session_id, outcome).await {
                tracing::error!("Scheduled outcome for session {} failed: {}", session_id, e);
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        db::{CaseRepository, MemoryStore},
        models::legal_case::{CaseStatus, PaymentStatus},
        services::test_support::draft_case_for,
    };

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    async fn seed(store: &MemoryStore, landlord_id: Uuid, prices: &[&str]) -> Vec<LegalCase> {
        let mut cases = Vec::new();
        for price in prices {
            let case = draft_case_for(landlord_id, dec(price));
            CaseRepository::insert(store, &case).await.unwrap();
            cases.push(case);
        }
        cases
    }

    fn gateway(store: &MemoryStore) -> MockPaymentGateway {
        MockPaymentGateway::new(Arc::new(store.clone()))
    }

    async fn reload(store: &MemoryStore, id: Uuid) -> LegalCase {
        CaseRepository::find_by_id(store, id).await.unwrap().unwrap()
    }

    #[tokio::test]
    async fn session_totals_prices_and_marks_cases_pending() {
        let store = MemoryStore::new();
        let landlord = Uuid::new_v4();
        let cases = seed(&store, landlord, &["100", "70"]).await;

        let session = gateway(&store).create_session(landlord, cases.clone()).await.unwrap();

        assert_eq!(session.status, SessionStatus::Open);
        assert_eq!(session.total_amount, dec("170"));
        for case in &cases {
            let stored = reload(&store, case.id).await;
            assert_eq!(stored.payment_status, PaymentStatus::PendingPayment);
            assert_eq!(stored.checkout_session_id, Some(session.id));
        }
    }

    #[tokio::test]
    async fn pending_case_cannot_enter_a_second_session() {
        let store = MemoryStore::new();
        let landlord = Uuid::new_v4();
        let cases = seed(&store, landlord, &["100"]).await;
        let gw = gateway(&store);

        gw.create_session(landlord, cases.clone()).await.unwrap();

        // Cópia antiga do caso (ainda Unpaid): a trava do repositório barra a segunda sessão
        let err = gw.create_session(landlord, cases.clone()).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidStateForTransition(_)));

        let fresh = reload(&store, cases[0].id).await;
        assert!(gw.create_session(landlord, vec![fresh]).await.is_err());
    }

    #[tokio::test]
    async fn empty_or_foreign_checkout_is_rejected() {
        let store = MemoryStore::new();
        let landlord = Uuid::new_v4();
        let cases = seed(&store, landlord, &["100"]).await;
        let gw = gateway(&store);

        assert!(gw.create_session(landlord, vec![]).await.is_err());
        assert!(matches!(
            gw.create_session(Uuid::new_v4(), cases).await,
            Err(AppError::Forbidden(_))
        ));
    }

    #[tokio::test]
    async fn cancel_reverts_all_cases_and_repeated_cancel_is_a_no_op() {
        let store = MemoryStore::new();
        let landlord = Uuid::new_v4();
        let cases = seed(&store, landlord, &["100", "70"]).await;
        let outsider = seed(&store, landlord, &["50"]).await.remove(0);
        let gw = gateway(&store);

        let session = gw.create_session(landlord, cases.clone()).await.unwrap();
        assert_eq!(session.total_amount, dec("170"));

        let first = gw.resolve(session.id, PaymentOutcome::Cancelled).await.unwrap();
        assert!(matches!(first, ResolveOutcome::Resolved(_)));
        assert_eq!(first.session().status, SessionStatus::Expired);

        let after_first: Vec<LegalCase> = {
            let mut v = Vec::new();
            for c in &cases {
                v.push(reload(&store, c.id).await);
            }
            v
        };
        for case in &after_first {
            assert_eq!(case.status, CaseStatus::NoticeDraft);
            assert_eq!(case.payment_status, PaymentStatus::Unpaid);
            assert_eq!(case.checkout_session_id, None);
        }

        let second = gw.resolve(session.id, PaymentOutcome::Cancelled).await.unwrap();
        assert!(matches!(second, ResolveOutcome::AlreadyResolved(_)));
        for case in &after_first {
            assert_eq!(&reload(&store, case.id).await, case);
        }
        assert_eq!(reload(&store, outsider.id).await, outsider);
    }

    #[tokio::test]
    async fn success_submits_every_case_once() {
        let store = MemoryStore::new();
        let landlord = Uuid::new_v4();
        let cases = seed(&store, landlord, &["100", "70"]).await;
        let gw = gateway(&store);

        let session = gw.create_session(landlord, cases.clone()).await.unwrap();
        gw.resolve(session.id, PaymentOutcome::Success).await.unwrap();

        for case in &cases {
            let stored = reload(&store, case.id).await;
            assert_eq!(stored.status, CaseStatus::Submitted);
            assert_eq!(stored.payment_status, PaymentStatus::Paid);
        }

        // Um cancelamento atrasado não desfaz o pagamento
        let late = gw.resolve(session.id, PaymentOutcome::Cancelled).await.unwrap();
        assert!(matches!(late, ResolveOutcome::AlreadyResolved(ref s) if s.status == SessionStatus::Complete));
        assert_eq!(reload(&store, cases[0].id).await.payment_status, PaymentStatus::Paid);
    }

    #[tokio::test]
    async fn edits_made_while_pending_survive_resolution() {
        let store = MemoryStore::new();
        let landlord = Uuid::new_v4();
        let cases = seed(&store, landlord, &["100"]).await;
        let gw = gateway(&store);

        let session = gw.create_session(landlord, cases.clone()).await.unwrap();

        // Admin ajusta o caso enquanto o pagamento está pendente
        let mut edited = reload(&store, cases[0].id).await;
        edited.notes = Some("call tenant before posting".into());
        edited.price = dec("90");
        CaseRepository::update(&store, &edited).await.unwrap();

        gw.resolve(session.id, PaymentOutcome::Success).await.unwrap();

        let stored = reload(&store, cases[0].id).await;
        assert_eq!(stored.payment_status, PaymentStatus::Paid);
        assert_eq!(stored.status, CaseStatus::Submitted);
        assert_eq!(stored.notes.as_deref(), Some("call tenant before posting"));
        assert_eq!(stored.price, dec("90"));
    }

    #[tokio::test]
    async fn cancel_skips_cases_detached_from_the_session() {
        let store = MemoryStore::new();
        let landlord = Uuid::new_v4();
        let cases = seed(&store, landlord, &["100", "70"]).await;
        let gw = gateway(&store);

        let session = gw.create_session(landlord, cases.clone()).await.unwrap();

        // Marcado como pago à mão antes do cancelamento chegar
        let mut settled = reload(&store, cases[0].id).await;
        settled.payment_status = PaymentStatus::Paid;
        settled.status = CaseStatus::Submitted;
        settled.checkout_session_id = None;
        CaseRepository::update(&store, &settled).await.unwrap();

        gw.resolve(session.id, PaymentOutcome::Cancelled).await.unwrap();

        assert_eq!(reload(&store, cases[0].id).await, settled);
        let reverted = reload(&store, cases[1].id).await;
        assert_eq!(reverted.payment_status, PaymentStatus::Unpaid);
        assert_eq!(reverted.status, CaseStatus::NoticeDraft);
    }

    #[tokio::test]
    async fn unknown_session_is_not_found() {
        let store = MemoryStore::new();
        let err = gateway(&store).resolve(Uuid::new_v4(), PaymentOutcome::Success).await.unwrap_err();
        assert!(matches!(err, AppError::ResourceNotFound(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn scheduled_outcome_is_delivered_after_delay() {
        let store = MemoryStore::new();
        let landlord = Uuid::new_v4();
        let cases = seed(&store, landlord, &["100"]).await;
        let gw = gateway(&store);

        let session = gw.create_session(landlord, cases.clone()).await.unwrap();
        gw.schedule_outcome(session.id, PaymentOutcome::Success, Duration::from_secs(5));

        tokio::time::sleep(Duration::from_secs(6)).await;
        assert_eq!(reload(&store, cases[0].id).await.payment_status, PaymentStatus::Paid);
    }
}
