// src/db/case_repo.rs

use async_trait::async_trait;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::legal_case::{CaseStatus, LegalCase, PaymentStatus, TenantPayment},
};

#[async_trait]
pub trait CaseRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<LegalCase>, AppError>;
    async fn list_all(&self) -> Result<Vec<LegalCase>, AppError>;
    async fn list_by_landlord(&self, landlord_id: Uuid) -> Result<Vec<LegalCase>, AppError>;
    async fn list_by_tenant(&self, tenant_id: Uuid) -> Result<Vec<LegalCase>, AppError>;
    async fn list_by_property(&self, property_id: Uuid) -> Result<Vec<LegalCase>, AppError>;

    /// Casos disponíveis para contratados: (Submitted, Paid) sem dono,
    /// mais os que já estão com o contratado informado.
    async fn list_for_contractor(&self, contractor_id: Uuid) -> Result<Vec<LegalCase>, AppError>;

    async fn insert(&self, case: &LegalCase) -> Result<LegalCase, AppError>;
    async fn update(&self, case: &LegalCase) -> Result<LegalCase, AppError>;

    /// Grava todos ou nenhum.
    async fn update_many(&self, cases: &[LegalCase]) -> Result<(), AppError>;

    async fn delete(&self, id: Uuid) -> Result<bool, AppError>;

    /// Insere o pagamento e grava o novo saldo do caso na mesma transação.
    async fn record_payment(&self, case: &LegalCase, payment: &TenantPayment) -> Result<(), AppError>;

    async fn list_payments(&self, case_id: Uuid) -> Result<Vec<TenantPayment>, AppError>;
}

/// UPDATE de todas as colunas mutáveis. Retorna o número de linhas afetadas.
pub(crate) async fn write_case<'e, E>(executor: E, case: &LegalCase) -> Result<u64, AppError>
where
    E: Executor<'e, Database = Postgres>,
{
    let result = sqlx::query(
        r#"
        UPDATE legal_cases
        SET law_firm_id = $2, status = $3, payment_status = $4, price = $5,
            current_rent_owed = $6, eviction_notice = $7, photo = $8, receipt = $9,
            certificate_of_mailing = $10, checkout_session_id = $11,
            contractor_id = $12, claimed_at = $13, notes = $14, updated_at = $15
        WHERE id = $1
        "#,
    )
    .bind(case.id)
    .bind(case.law_firm_id)
    .bind(case.status)
    .bind(case.payment_status)
    .bind(case.price)
    .bind(case.current_rent_owed)
    .bind(&case.documents.eviction_notice)
    .bind(&case.documents.photo)
    .bind(&case.documents.receipt)
    .bind(&case.documents.certificate_of_mailing)
    .bind(case.checkout_session_id)
    .bind(case.contractor_id)
    .bind(case.claimed_at)
    .bind(&case.notes)
    .bind(case.updated_at)
    .execute(executor)
    .await?;

    Ok(result.rows_affected())
}

#[derive(Clone)]
pub struct PgCaseRepository {
    pool: PgPool,
}

impl PgCaseRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CaseRepository for PgCaseRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<LegalCase>, AppError> {
        let row = sqlx::query_as::<_, LegalCase>("SELECT * FROM legal_cases WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn list_all(&self) -> Result<Vec<LegalCase>, AppError> {
        let rows = sqlx::query_as::<_, LegalCase>("SELECT * FROM legal_cases ORDER BY created_at DESC")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn list_by_landlord(&self, landlord_id: Uuid) -> Result<Vec<LegalCase>, AppError> {
        let rows = sqlx::query_as::<_, LegalCase>(
            "SELECT * FROM legal_cases WHERE landlord_id = $1 ORDER BY created_at DESC",
        )
        .bind(landlord_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn list_by_tenant(&self, tenant_id: Uuid) -> Result<Vec<LegalCase>, AppError> {
        let rows = sqlx::query_as::<_, LegalCase>(
            "SELECT * FROM legal_cases WHERE tenant_id = $1 ORDER BY created_at DESC",
        )
        .bind(tenant_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn list_by_property(&self, property_id: Uuid) -> Result<Vec<LegalCase>, AppError> {
        let rows = sqlx::query_as::<_, LegalCase>(
            "SELECT * FROM legal_cases WHERE property_id = $1 ORDER BY created_at DESC",
        )
        .bind(property_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn list_for_contractor(&self, contractor_id: Uuid) -> Result<Vec<LegalCase>, AppError> {
        let rows = sqlx::query_as::<_, LegalCase>(
            r#"
            SELECT * FROM legal_cases
            WHERE contractor_id = $1
               OR (contractor_id IS NULL AND payment_status = $2 AND status IN ($3, $4))
            ORDER BY created_at
            "#,
        )
        .bind(contractor_id)
        .bind(PaymentStatus::Paid)
        .bind(CaseStatus::Submitted)
        .bind(CaseStatus::InProgress)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn insert(&self, case: &LegalCase) -> Result<LegalCase, AppError> {
        let row = sqlx::query_as::<_, LegalCase>(
            r#"
            INSERT INTO legal_cases (
                id, landlord_id, property_id, tenant_id, law_firm_id,
                status, payment_status, price, rent_owed_at_filing, current_rent_owed,
                eviction_notice, photo, receipt, certificate_of_mailing,
                checkout_session_id, contractor_id, claimed_at, notes, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19, $20)
            RETURNING *
            "#,
        )
        .bind(case.id)
        .bind(case.landlord_id)
        .bind(case.property_id)
        .bind(case.tenant_id)
        .bind(case.law_firm_id)
        .bind(case.status)
        .bind(case.payment_status)
        .bind(case.price)
        .bind(case.rent_owed_at_filing)
        .bind(case.current_rent_owed)
        .bind(&case.documents.eviction_notice)
        .bind(&case.documents.photo)
        .bind(&case.documents.receipt)
        .bind(&case.documents.certificate_of_mailing)
        .bind(case.checkout_session_id)
        .bind(case.contractor_id)
        .bind(case.claimed_at)
        .bind(&case.notes)
        .bind(case.created_at)
        .bind(case.updated_at)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn update(&self, case: &LegalCase) -> Result<LegalCase, AppError> {
        if write_case(&self.pool, case).await? == 0 {
            return Err(AppError::ResourceNotFound(format!("Case {}", case.id)));
        }
        Ok(case.clone())
    }

    async fn update_many(&self, cases: &[LegalCase]) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        for case in cases {
            if write_case(&mut *tx, case).await? == 0 {
                // Drop do tx faz o rollback
                return Err(AppError::ResourceNotFound(format!("Case {}", case.id)));
            }
        }

        tx.commit().await?;
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM legal_cases WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn record_payment(&self, case: &LegalCase, payment: &TenantPayment) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "INSERT INTO tenant_payments (id, case_id, amount, paid_on, created_at) VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(payment.id)
        .bind(payment.case_id)
        .bind(payment.amount)
        .bind(payment.paid_on)
        .bind(payment.created_at)
        .execute(&mut *tx)
        .await?;

        if write_case(&mut *tx, case).await? == 0 {
            return Err(AppError::ResourceNotFound(format!("Case {}", case.id)));
        }

        tx.commit().await?;
        Ok(())
    }

    async fn list_payments(&self, case_id: Uuid) -> Result<Vec<TenantPayment>, AppError> {
        let rows = sqlx::query_as::<_, TenantPayment>(
            "SELECT * FROM tenant_payments WHERE case_id = $1 ORDER BY paid_on, created_at",
        )
        .bind(case_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
