// src/db/session_repo.rs

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::case_repo::write_case,
    models::{
        legal_case::{CaseStatus, LegalCase, PaymentStatus},
        payment::{PaymentSession, SessionStatus},
    },
};

#[async_trait]
pub trait SessionRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<PaymentSession>, AppError>;

    /// Persiste a sessão `Open` e os casos já marcados como `PendingPayment`.
    /// Falha (sem gravar nada) se algum caso não estiver mais em (NoticeDraft, Unpaid).
    async fn open_session(&self, session: &PaymentSession, cases: &[LegalCase]) -> Result<(), AppError>;

    /// Compare-and-set `Open -> status`. Os casos da sessão são lidos já travados e
    /// passam por `transition`; o resultado é gravado na mesma operação.
    /// Retorna `None` (sem gravar nada) se a sessão já não estava `Open`.
    async fn resolve_session(
        &self,
        session_id: Uuid,
        status: SessionStatus,
        resolved_at: DateTime<Utc>,
        transition: CaseTransition<'_>,
    ) -> Result<Option<Vec<LegalCase>>, AppError>;
}

/// Recebe o estado atual dos casos da sessão e devolve os que devem ser gravados.
pub type CaseTransition<'a> = &'a (dyn Fn(Vec<LegalCase>) -> Vec<LegalCase> + Send + Sync);

#[derive(Clone)]
pub struct PgSessionRepository {
    pool: PgPool,
}

impl PgSessionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionRepository for PgSessionRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<PaymentSession>, AppError> {
        let row = sqlx::query_as::<_, PaymentSession>("SELECT * FROM payment_sessions WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn open_session(&self, session: &PaymentSession, cases: &[LegalCase]) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO payment_sessions (id, owner_user_id, case_ids, total_amount, status, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(session.id)
        .bind(session.owner_user_id)
        .bind(&session.case_ids)
        .bind(session.total_amount)
        .bind(session.status)
        .bind(session.created_at)
        .execute(&mut *tx)
        .await?;

        for case in cases {
            // O próprio status funciona como trava: só sai de Unpaid uma vez
            let result = sqlx::query(
                r#"
                UPDATE legal_cases
                SET payment_status = $2, checkout_session_id = $3, updated_at = $4
                WHERE id = $1 AND status = $5 AND payment_status = $6
                "#,
            )
            .bind(case.id)
            .bind(case.payment_status)
            .bind(case.checkout_session_id)
            .bind(case.updated_at)
            .bind(CaseStatus::NoticeDraft)
            .bind(PaymentStatus::Unpaid)
            .execute(&mut *tx)
            .await?;

            if result.rows_affected() == 0 {
                return Err(AppError::InvalidStateForTransition(format!(
                    "case {} is no longer an unpaid draft",
                    case.id
                )));
            }
        }

        tx.commit().await?;
        Ok(())
    }

    async fn resolve_session(
        &self,
        session_id: Uuid,
        status: SessionStatus,
        resolved_at: DateTime<Utc>,
        transition: CaseTransition<'_>,
    ) -> Result<Option<Vec<LegalCase>>, AppError> {
        let mut tx = self.pool.begin().await?;

        let flipped = sqlx::query_as::<_, (Vec<Uuid>,)>(
            r#"
            UPDATE payment_sessions SET status = $2, resolved_at = $3
            WHERE id = $1 AND status = $4
            RETURNING case_ids
            "#,
        )
        .bind(session_id)
        .bind(status)
        .bind(resolved_at)
        .bind(SessionStatus::Open)
        .fetch_optional(&mut *tx)
        .await?;

        let Some((case_ids,)) = flipped else {
            return Ok(None);
        };

        // Edições concorrentes (admin, claim) esperam o commit
        let current = sqlx::query_as::<_, LegalCase>(
            "SELECT * FROM legal_cases WHERE id = ANY($1) ORDER BY created_at FOR UPDATE",
        )
        .bind(&case_ids)
        .fetch_all(&mut *tx)
        .await?;

        let updated = transition(current);
        for case in &updated {
            write_case(&mut *tx, case).await?;
        }

        tx.commit().await?;
        Ok(Some(updated))
    }
}
