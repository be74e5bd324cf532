// src/services/property_service.rs

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{CaseRepository, PropertyRepository, TenantRepository},
    models::{
        auth::User,
        property::{Property, PropertyPayload, Tenant, TenantPayload},
    },
};

#[derive(Clone)]
pub struct PropertyService {
    properties: Arc<dyn PropertyRepository>,
    tenants: Arc<dyn TenantRepository>,
    cases: Arc<dyn CaseRepository>,
}

fn clean(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

impl PropertyService {
    pub fn new(
        properties: Arc<dyn PropertyRepository>,
        tenants: Arc<dyn TenantRepository>,
        cases: Arc<dyn CaseRepository>,
    ) -> Self {
        Self { properties, tenants, cases }
    }

    // =========================================================================
    //  PROPERTIES
    // =========================================================================

    pub async fn list_properties(&self, landlord: &User) -> Result<Vec<Property>, AppError> {
        self.properties.list_by_landlord(landlord.id).await
    }

    pub async fn get_property(&self, landlord: &User, property_id: Uuid) -> Result<Property, AppError> {
        match self.properties.find_by_id(property_id).await? {
            Some(p) if p.landlord_id == landlord.id => Ok(p),
            _ => Err(AppError::ResourceNotFound(format!("Property {}", property_id))),
        }
    }

    pub async fn create_property(&self, landlord: &User, payload: PropertyPayload) -> Result<Property, AppError> {
        let now = Utc::now();
        let property = Property {
            id: Uuid::new_v4(),
            landlord_id: landlord.id,
            address: payload.address.trim().to_string(),
            city: payload.city.trim().to_string(),
            jurisdiction: payload.jurisdiction.trim().to_string(),
            property_type: payload.property_type,
            created_at: now,
            updated_at: now,
        };

        let property = self.properties.insert(&property).await?;
        tracing::info!("Property {} registered in {}", property.id, property.jurisdiction);
        Ok(property)
    }

    /// Casos já criados guardam o próprio preço; mudar a jurisdição aqui não os reprecifica.
    pub async fn update_property(
        &self,
        landlord: &User,
        property_id: Uuid,
        payload: PropertyPayload,
    ) -> Result<Property, AppError> {
        let mut property = self.get_property(landlord, property_id).await?;
        property.address = payload.address.trim().to_string();
        property.city = payload.city.trim().to_string();
        property.jurisdiction = payload.jurisdiction.trim().to_string();
        property.property_type = payload.property_type;
        property.updated_at = Utc::now();

        self.properties.update(&property).await
    }

    pub async fn delete_property(&self, landlord: &User, property_id: Uuid) -> Result<(), AppError> {
        let property = self.get_property(landlord, property_id).await?;

        if !self.cases.list_by_property(property.id).await?.is_empty() {
            return Err(AppError::HasDependentRecords(format!("Property {} has cases", property.id)));
        }
        if !self.tenants.list_by_property(property.id).await?.is_empty() {
            return Err(AppError::HasDependentRecords(format!("Property {} has tenants", property.id)));
        }

        self.properties.delete(property.id).await?;
        tracing::info!("Property {} deleted", property.id);
        Ok(())
    }

    // =========================================================================
    //  TENANTS
    // =========================================================================

    pub async fn list_tenants(&self, landlord: &User) -> Result<Vec<Tenant>, AppError> {
        self.tenants.list_by_landlord(landlord.id).await
    }

    pub async fn get_tenant(&self, landlord: &User, tenant_id: Uuid) -> Result<Tenant, AppError> {
        match self.tenants.find_by_id(tenant_id).await? {
            Some(t) if t.landlord_id == landlord.id => Ok(t),
            _ => Err(AppError::ResourceNotFound(format!("Tenant {}", tenant_id))),
        }
    }

    pub async fn create_tenant(&self, landlord: &User, payload: TenantPayload) -> Result<Tenant, AppError> {
        // O imóvel precisa ser do mesmo proprietário
        let property = self.get_property(landlord, payload.property_id).await?;

        let now = Utc::now();
        let tenant = Tenant {
            id: Uuid::new_v4(),
            landlord_id: landlord.id,
            property_id: property.id,
            occupants: normalize_occupants(payload.occupants),
            email: clean(payload.email),
            phone: clean(payload.phone),
            is_subsidized: payload.is_subsidized,
            subsidy_type: if payload.is_subsidized { clean(payload.subsidy_type) } else { None },
            created_at: now,
            updated_at: now,
        };

        let tenant = self.tenants.insert(&tenant).await?;
        tracing::info!("Tenant {} registered at property {}", tenant.id, property.id);
        Ok(tenant)
    }

    pub async fn update_tenant(
        &self,
        landlord: &User,
        tenant_id: Uuid,
        payload: TenantPayload,
    ) -> Result<Tenant, AppError> {
        let mut tenant = self.get_tenant(landlord, tenant_id).await?;

        if payload.property_id != tenant.property_id {
            let property = self.get_property(landlord, payload.property_id).await?;
            if !self.cases.list_by_tenant(tenant.id).await?.is_empty() {
                return Err(AppError::HasDependentRecords(format!(
                    "Tenant {} has cases at property {}",
                    tenant.id, tenant.property_id
                )));
            }
            tenant.property_id = property.id;
        }

        tenant.occupants = normalize_occupants(payload.occupants);
        tenant.email = clean(payload.email);
        tenant.phone = clean(payload.phone);
        tenant.is_subsidized = payload.is_subsidized;
        tenant.subsidy_type = if payload.is_subsidized { clean(payload.subsidy_type) } else { None };
        tenant.updated_at = Utc::now();

        self.tenants.update(&tenant).await
    }

    pub async fn delete_tenant(&self, landlord: &User, tenant_id: Uuid) -> Result<(), AppError> {
        let tenant = self.get_tenant(landlord, tenant_id).await?;

        if !self.cases.list_by_tenant(tenant.id).await?.is_empty() {
            return Err(AppError::HasDependentRecords(format!("Tenant {} has cases", tenant.id)));
        }

        self.tenants.delete(tenant.id).await?;
        tracing::info!("Tenant {} deleted", tenant.id);
        Ok(())
    }
}

fn normalize_occupants(occupants: Vec<String>) -> Vec<String> {
    occupants
        .into_iter()
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .collect()
}
