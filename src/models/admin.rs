// src/models/admin.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::models::legal_case::max_two_decimals;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LawFirm {
    pub id: Uuid,
    #[schema(example = "Doe & Partners LLC")]
    pub name: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LawFirmPayload {
    #[validate(length(min = 1, message = "required"))]
    pub name: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: Option<String>,
}

fn non_negative_price(value: &rust_decimal::Decimal) -> Result<(), ValidationError> {
    max_two_decimals(value)?;
    if value.is_sign_negative() {
        return Err(ValidationError::new("non_negative").with_message("O preço não pode ser negativo.".into()));
    }
    Ok(())
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PriceOverridePayload {
    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "Baltimore City")]
    pub jurisdiction: String,
    #[validate(custom(function = "non_negative_price"))]
    #[schema(example = "150.00")]
    pub price: rust_decimal::Decimal,
    pub unlocked: bool,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReferralCodePayload {
    #[validate(length(min = 1, max = 64))]
    pub referral_code: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn price_entry_rejects_sub_cent_prices() {
        let payload = PriceOverridePayload {
            jurisdiction: "Baltimore City".into(),
            price: "0.001".parse().unwrap(),
            unlocked: true,
        };
        let errors = payload.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("price"));
    }
}
