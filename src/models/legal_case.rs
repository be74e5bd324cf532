// src/models/legal_case.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

// --- Enums ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "case_status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CaseStatus {
    NoticeDraft,
    Submitted,
    InProgress,
    Complete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "payment_status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Unpaid,
    PendingPayment,
    Paid,
    Failed,
    Refunded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum DocumentSlot {
    EvictionNotice,
    Photo,
    Receipt,
    CertificateOfMailing,
}

impl DocumentSlot {
    pub const ALL: [DocumentSlot; 4] = [
        DocumentSlot::EvictionNotice,
        DocumentSlot::Photo,
        DocumentSlot::Receipt,
        DocumentSlot::CertificateOfMailing,
    ];
}

impl std::fmt::Display for DocumentSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            DocumentSlot::EvictionNotice => "eviction-notice",
            DocumentSlot::Photo => "photo",
            DocumentSlot::Receipt => "receipt",
            DocumentSlot::CertificateOfMailing => "certificate-of-mailing",
        };
        f.write_str(name)
    }
}

// --- Structs ---

/// Os quatro anexos do caso. Cada um é uma referência (nome do arquivo/URL) ou vazio.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DocumentSlots {
    pub eviction_notice: Option<String>,
    pub photo: Option<String>,
    pub receipt: Option<String>,
    pub certificate_of_mailing: Option<String>,
}

impl DocumentSlots {
    pub fn get(&self, slot: DocumentSlot) -> Option<&str> {
        match slot {
            DocumentSlot::EvictionNotice => self.eviction_notice.as_deref(),
            DocumentSlot::Photo => self.photo.as_deref(),
            DocumentSlot::Receipt => self.receipt.as_deref(),
            DocumentSlot::CertificateOfMailing => self.certificate_of_mailing.as_deref(),
        }
    }

    pub fn set(&mut self, slot: DocumentSlot, reference: Option<String>) {
        // String vazia conta como "sem documento"
        let reference = reference.filter(|r| !r.trim().is_empty());
        match slot {
            DocumentSlot::EvictionNotice => self.eviction_notice = reference,
            DocumentSlot::Photo => self.photo = reference,
            DocumentSlot::Receipt => self.receipt = reference,
            DocumentSlot::CertificateOfMailing => self.certificate_of_mailing = reference,
        }
    }

    pub fn missing(&self) -> Vec<DocumentSlot> {
        DocumentSlot::ALL
            .into_iter()
            .filter(|slot| self.get(*slot).is_none())
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LegalCase {
    pub id: Uuid,
    pub landlord_id: Uuid,
    pub property_id: Uuid,
    pub tenant_id: Uuid,
    pub law_firm_id: Option<Uuid>,

    pub status: CaseStatus,
    pub payment_status: PaymentStatus,

    // Fixado na criação; só o admin altera
    #[schema(example = "150.00")]
    pub price: Decimal,

    #[schema(example = "1200.00")]
    pub rent_owed_at_filing: Decimal,
    #[schema(example = "1200.00")]
    pub current_rent_owed: Decimal,

    #[sqlx(flatten)]
    pub documents: DocumentSlots,

    pub checkout_session_id: Option<Uuid>,

    pub contractor_id: Option<Uuid>,
    pub claimed_at: Option<DateTime<Utc>>,

    pub notes: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl LegalCase {
    pub fn is_draft_unpaid(&self) -> bool {
        self.status == CaseStatus::NoticeDraft && self.payment_status == PaymentStatus::Unpaid
    }

    /// Pago e ainda em andamento (Submitted ou InProgress).
    pub fn is_paid_active(&self) -> bool {
        self.payment_status == PaymentStatus::Paid
            && matches!(self.status, CaseStatus::Submitted | CaseStatus::InProgress)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TenantPayment {
    pub id: Uuid,
    pub case_id: Uuid,
    #[schema(example = "300.00")]
    pub amount: Decimal,
    #[schema(value_type = String, format = Date, example = "2026-03-01")]
    pub paid_on: NaiveDate,
    pub created_at: DateTime<Utc>,
}

// --- Payloads ---

/// Valores monetários são gravados como NUMERIC(12,2).
pub(crate) fn max_two_decimals(value: &Decimal) -> Result<(), ValidationError> {
    if value.normalize().scale() <= 2 {
        Ok(())
    } else {
        Err(ValidationError::new("max_two_decimals").with_message("Use no máximo duas casas decimais.".into()))
    }
}

fn positive_decimal(value: &Decimal) -> Result<(), ValidationError> {
    max_two_decimals(value)?;
    if *value > Decimal::ZERO {
        Ok(())
    } else {
        Err(ValidationError::new("positive").with_message("O valor deve ser maior que zero.".into()))
    }
}

fn non_negative_decimal(value: &Decimal) -> Result<(), ValidationError> {
    max_two_decimals(value)?;
    if *value >= Decimal::ZERO {
        Ok(())
    } else {
        Err(ValidationError::new("non_negative").with_message("O valor não pode ser negativo.".into()))
    }
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuotePayload {
    pub property_id: Uuid,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuoteResponse {
    pub property_id: Uuid,
    pub jurisdiction: String,
    #[schema(example = "145.00")]
    pub price: Decimal,
    pub referral_discount_applied: bool,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCasePayload {
    pub property_id: Uuid,
    pub tenant_id: Uuid,
    pub law_firm_id: Option<Uuid>,
    #[validate(custom(function = "non_negative_decimal"))]
    #[schema(example = "1200.00")]
    pub rent_owed_at_filing: Decimal,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DocumentPayload {
    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "notice-2026-03-01.pdf")]
    pub reference: String,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TenantPaymentPayload {
    // Zero e negativos ficam para o serviço (InvalidPaymentAmount)
    #[validate(custom(function = "max_two_decimals"))]
    #[schema(example = "300.00")]
    pub amount: Decimal,
    #[schema(value_type = String, format = Date, example = "2026-03-01")]
    pub paid_on: NaiveDate,
}

/// Edição direta pelo admin. Campos ausentes não são alterados.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdminCasePatch {
    pub status: Option<CaseStatus>,
    pub payment_status: Option<PaymentStatus>,
    #[validate(custom(function = "positive_decimal"))]
    pub price: Option<Decimal>,
    pub notes: Option<String>,
    // Some("") limpa o slot
    pub eviction_notice: Option<String>,
    pub photo: Option<String>,
    pub receipt: Option<String>,
    pub certificate_of_mailing: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn money_fields_reject_sub_cent_amounts() {
        let payment = TenantPaymentPayload {
            amount: dec("0.001"),
            paid_on: NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
        };
        let errors = payment.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("amount"));

        let case = CreateCasePayload {
            property_id: Uuid::new_v4(),
            tenant_id: Uuid::new_v4(),
            law_firm_id: None,
            rent_owed_at_filing: dec("1200.005"),
            notes: None,
        };
        assert!(case.validate().is_err());

        let patch = AdminCasePatch { price: Some(dec("149.999")), ..Default::default() };
        assert!(patch.validate().is_err());
    }

    #[test]
    fn trailing_zeros_still_count_as_cents() {
        let payment = TenantPaymentPayload {
            amount: dec("300.5000"),
            paid_on: NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
        };
        assert!(payment.validate().is_ok());

        let patch = AdminCasePatch { price: Some(dec("149.99")), ..Default::default() };
        assert!(patch.validate().is_ok());
    }
}
