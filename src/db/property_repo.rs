// src/db/property_repo.rs

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::property::{Property, Tenant},
};

#[async_trait]
pub trait PropertyRepository: Send + Sync {
    async fn list_by_landlord(&self, landlord_id: Uuid) -> Result<Vec<Property>, AppError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Property>, AppError>;
    async fn insert(&self, property: &Property) -> Result<Property, AppError>;
    async fn update(&self, property: &Property) -> Result<Property, AppError>;
    async fn delete(&self, id: Uuid) -> Result<bool, AppError>;
}

#[async_trait]
pub trait TenantRepository: Send + Sync {
    async fn list_by_landlord(&self, landlord_id: Uuid) -> Result<Vec<Tenant>, AppError>;
    async fn list_by_property(&self, property_id: Uuid) -> Result<Vec<Tenant>, AppError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Tenant>, AppError>;
    async fn insert(&self, tenant: &Tenant) -> Result<Tenant, AppError>;
    async fn update(&self, tenant: &Tenant) -> Result<Tenant, AppError>;
    async fn delete(&self, id: Uuid) -> Result<bool, AppError>;
}

// =========================================================================
//  PROPERTIES
// =========================================================================

#[derive(Clone)]
pub struct PgPropertyRepository {
    pool: PgPool,
}

impl PgPropertyRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PropertyRepository for PgPropertyRepository {
    async fn list_by_landlord(&self, landlord_id: Uuid) -> Result<Vec<Property>, AppError> {
        let rows = sqlx::query_as::<_, Property>(
            "SELECT * FROM properties WHERE landlord_id = $1 ORDER BY created_at",
        )
        .bind(landlord_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Property>, AppError> {
        let row = sqlx::query_as::<_, Property>("SELECT * FROM properties WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn insert(&self, property: &Property) -> Result<Property, AppError> {
        let row = sqlx::query_as::<_, Property>(
            r#"
            INSERT INTO properties (id, landlord_id, address, city, jurisdiction, property_type, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(property.id)
        .bind(property.landlord_id)
        .bind(&property.address)
        .bind(&property.city)
        .bind(&property.jurisdiction)
        .bind(property.property_type)
        .bind(property.created_at)
        .bind(property.updated_at)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn update(&self, property: &Property) -> Result<Property, AppError> {
        let row = sqlx::query_as::<_, Property>(
            r#"
            UPDATE properties
            SET address = $2, city = $3, jurisdiction = $4, property_type = $5, updated_at = $6
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(property.id)
        .bind(&property.address)
        .bind(&property.city)
        .bind(&property.jurisdiction)
        .bind(property.property_type)
        .bind(property.updated_at)
        .fetch_optional(&self.pool)
        .await?;

        row.ok_or_else(|| AppError::ResourceNotFound(format!("Property {}", property.id)))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM properties WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

// =========================================================================
//  TENANTS
// =========================================================================

#[derive(Clone)]
pub struct PgTenantRepository {
    pool: PgPool,
}

impl PgTenantRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TenantRepository for PgTenantRepository {
    async fn list_by_landlord(&self, landlord_id: Uuid) -> Result<Vec<Tenant>, AppError> {
        let rows = sqlx::query_as::<_, Tenant>(
            "SELECT * FROM tenants WHERE landlord_id = $1 ORDER BY created_at",
        )
        .bind(landlord_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn list_by_property(&self, property_id: Uuid) -> Result<Vec<Tenant>, AppError> {
        let rows = sqlx::query_as::<_, Tenant>(
            "SELECT * FROM tenants WHERE property_id = $1 ORDER BY created_at",
        )
        .bind(property_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Tenant>, AppError> {
        let row = sqlx::query_as::<_, Tenant>("SELECT * FROM tenants WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn insert(&self, tenant: &Tenant) -> Result<Tenant, AppError> {
        let row = sqlx::query_as::<_, Tenant>(
            r#"
            INSERT INTO tenants (
                id, landlord_id, property_id, occupants, email, phone,
                is_subsidized, subsidy_type, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING *
            "#,
        )
        .bind(tenant.id)
        .bind(tenant.landlord_id)
        .bind(tenant.property_id)
        .bind(&tenant.occupants)
        .bind(&tenant.email)
        .bind(&tenant.phone)
        .bind(tenant.is_subsidized)
        .bind(&tenant.subsidy_type)
        .bind(tenant.created_at)
        .bind(tenant.updated_at)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn update(&self, tenant: &Tenant) -> Result<Tenant, AppError> {
        let row = sqlx::query_as::<_, Tenant>(
            r#"
            UPDATE tenants
            SET property_id = $2, occupants = $3, email = $4, phone = $5,
                is_subsidized = $6, subsidy_type = $7, updated_at = $8
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(tenant.id)
        .bind(tenant.property_id)
        .bind(&tenant.occupants)
        .bind(&tenant.email)
        .bind(&tenant.phone)
        .bind(tenant.is_subsidized)
        .bind(&tenant.subsidy_type)
        .bind(tenant.updated_at)
        .fetch_optional(&self.pool)
        .await?;

        row.ok_or_else(|| AppError::ResourceNotFound(format!("Tenant {}", tenant.id)))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM tenants WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
