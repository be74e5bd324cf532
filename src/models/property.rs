// src/models/property.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;
use serde_json::json;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "property_type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PropertyType {
    Residential,
    Commercial,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    pub id: Uuid,
    pub landlord_id: Uuid,
    #[schema(example = "1200 N Charles St, Apt 3")]
    pub address: String,
    #[schema(example = "Baltimore")]
    pub city: String,
    /// Chave de lookup do preço (condado).
    #[schema(example = "Baltimore City")]
    pub jurisdiction: String,
    pub property_type: PropertyType,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Tenant {
    pub id: Uuid,
    pub landlord_id: Uuid,
    pub property_id: Uuid,
    #[schema(example = json!(["John Doe", "Mary Doe"]))]
    pub occupants: Vec<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub is_subsidized: bool,
    #[schema(example = "Housing Choice Voucher")]
    pub subsidy_type: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Tenant {
    /// Nome usado nos documentos: os ocupantes separados por vírgula.
    pub fn display_name(&self) -> String {
        if self.occupants.is_empty() {
            "All Occupants".to_string()
        } else {
            self.occupants.join(", ")
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PropertyPayload {
    #[validate(length(min = 1, message = "required"))]
    pub address: String,
    #[validate(length(min = 1, message = "required"))]
    pub city: String,
    #[validate(length(min = 1, message = "required"))]
    pub jurisdiction: String,
    pub property_type: PropertyType,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TenantPayload {
    pub property_id: Uuid,
    #[serde(default)]
    pub occupants: Vec<String>,
    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: Option<String>,
    pub phone: Option<String>,
    #[serde(default)]
    pub is_subsidized: bool,
    pub subsidy_type: Option<String>,
}
