// src/db/user_repo.rs

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::auth::{NewUser, PriceOverride, Role, User},
};

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError>;

    async fn create_user(&self, new_user: NewUser) -> Result<User, AppError>;

    async fn list_users(&self) -> Result<Vec<User>, AppError>;

    /// Cria ou substitui a entrada de preço de uma jurisdição.
    async fn set_price_override(
        &self,
        user_id: Uuid,
        jurisdiction: &str,
        entry: PriceOverride,
    ) -> Result<(), AppError>;

    /// Retorna `false` se a jurisdição não existia.
    async fn remove_price_override(&self, user_id: Uuid, jurisdiction: &str) -> Result<bool, AppError>;

    async fn set_referral_code(&self, user_id: Uuid, code: Option<&str>) -> Result<(), AppError>;
}

// Linha da tabela 'users' (a tabela de preços vem de 'jurisdiction_prices')
#[derive(FromRow)]
struct UserRow {
    id: Uuid,
    email: String,
    password_hash: String,
    full_name: String,
    role: Role,
    referral_code: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(FromRow)]
struct PriceRow {
    user_id: Uuid,
    jurisdiction: String,
    price: Decimal,
    unlocked: bool,
}

impl UserRow {
    fn into_user(self, price_overrides: HashMap<String, PriceOverride>) -> User {
        User {
            id: self.id,
            email: self.email,
            password_hash: self.password_hash,
            full_name: self.full_name,
            role: self.role,
            price_overrides,
            referral_code: self.referral_code,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

// O repositório de usuários, responsável pelas tabelas 'users' e 'jurisdiction_prices'
#[derive(Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn load_prices(&self, user_id: Uuid) -> Result<HashMap<String, PriceOverride>, AppError> {
        let rows = sqlx::query_as::<_, PriceRow>(
            "SELECT user_id, jurisdiction, price, unlocked FROM jurisdiction_prices WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| (r.jurisdiction, PriceOverride { price: r.price, unlocked: r.unlocked }))
            .collect())
    }

    async fn hydrate(&self, row: Option<UserRow>) -> Result<Option<User>, AppError> {
        match row {
            Some(row) => {
                let prices = self.load_prices(row.id).await?;
                Ok(Some(row.into_user(prices)))
            }
            None => Ok(None),
        }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let row = sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        self.hydrate(row).await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let row = sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        self.hydrate(row).await
    }

    async fn create_user(&self, new_user: NewUser) -> Result<User, AppError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (id, email, password_hash, full_name, role, referral_code)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&new_user.email)
        .bind(&new_user.password_hash)
        .bind(&new_user.full_name)
        .bind(new_user.role)
        .bind(&new_user.referral_code)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            // Converte violação de chave única em um erro mais amigável
            if let Some(db_err) = e.as_database_error() {
                if db_err.is_unique_violation() {
                    return AppError::EmailAlreadyExists;
                }
            }
            AppError::DatabaseError(e)
        })?;

        Ok(row.into_user(HashMap::new()))
    }

    async fn list_users(&self) -> Result<Vec<User>, AppError> {
        let rows = sqlx::query_as::<_, UserRow>("SELECT * FROM users ORDER BY created_at")
            .fetch_all(&self.pool)
            .await?;

        // Uma query só para todos os preços, agrupados por usuário
        let price_rows = sqlx::query_as::<_, PriceRow>(
            "SELECT user_id, jurisdiction, price, unlocked FROM jurisdiction_prices",
        )
        .fetch_all(&self.pool)
        .await?;

        let mut prices: HashMap<Uuid, HashMap<String, PriceOverride>> = HashMap::new();
        for r in price_rows {
            prices
                .entry(r.user_id)
                .or_default()
                .insert(r.jurisdiction, PriceOverride { price: r.price, unlocked: r.unlocked });
        }

        Ok(rows
            .into_iter()
            .map(|row| {
                let user_prices = prices.remove(&row.id).unwrap_or_default();
                row.into_user(user_prices)
            })
            .collect())
    }

    async fn set_price_override(
        &self,
        user_id: Uuid,
        jurisdiction: &str,
        entry: PriceOverride,
    ) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO jurisdiction_prices (user_id, jurisdiction, price, unlocked)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (user_id, jurisdiction)
            DO UPDATE SET price = EXCLUDED.price, unlocked = EXCLUDED.unlocked
            "#,
        )
        .bind(user_id)
        .bind(jurisdiction)
        .bind(entry.price)
        .bind(entry.unlocked)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn remove_price_override(&self, user_id: Uuid, jurisdiction: &str) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM jurisdiction_prices WHERE user_id = $1 AND jurisdiction = $2")
            .bind(user_id)
            .bind(jurisdiction)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn set_referral_code(&self, user_id: Uuid, code: Option<&str>) -> Result<(), AppError> {
        let result = sqlx::query("UPDATE users SET referral_code = $2, updated_at = now() WHERE id = $1")
            .bind(user_id)
            .bind(code)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::UserNotFound);
        }
        Ok(())
    }
}
