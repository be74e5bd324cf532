// src/db/law_firm_repo.rs

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{common::error::AppError, models::admin::LawFirm};

#[async_trait]
pub trait LawFirmRepository: Send + Sync {
    async fn list(&self) -> Result<Vec<LawFirm>, AppError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<LawFirm>, AppError>;
    async fn insert(&self, firm: &LawFirm) -> Result<LawFirm, AppError>;
}

#[derive(Clone)]
pub struct PgLawFirmRepository {
    pool: PgPool,
}

impl PgLawFirmRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LawFirmRepository for PgLawFirmRepository {
    async fn list(&self) -> Result<Vec<LawFirm>, AppError> {
        let rows = sqlx::query_as::<_, LawFirm>("SELECT * FROM law_firms ORDER BY name")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<LawFirm>, AppError> {
        let row = sqlx::query_as::<_, LawFirm>("SELECT * FROM law_firms WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn insert(&self, firm: &LawFirm) -> Result<LawFirm, AppError> {
        let row = sqlx::query_as::<_, LawFirm>(
            r#"
            INSERT INTO law_firms (id, name, address, phone, email, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(firm.id)
        .bind(&firm.name)
        .bind(&firm.address)
        .bind(&firm.phone)
        .bind(&firm.email)
        .bind(firm.created_at)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }
}
