// src/models/payment.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "session_status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionStatus {
    Open,
    Complete, // terminal
    Expired,  // terminal
}

/// Resultado entregue pelo processador (webhook / redirect).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum PaymentOutcome {
    Success,
    Cancelled,
    Failed,
}

impl PaymentOutcome {
    pub fn terminal_status(self) -> SessionStatus {
        match self {
            PaymentOutcome::Success => SessionStatus::Complete,
            PaymentOutcome::Cancelled | PaymentOutcome::Failed => SessionStatus::Expired,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentSession {
    pub id: Uuid,
    pub owner_user_id: Uuid,
    pub case_ids: Vec<Uuid>,
    #[schema(example = "170.00")]
    pub total_amount: Decimal,
    pub status: SessionStatus,
    pub created_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutPayload {
    #[validate(length(min = 1, message = "Selecione ao menos um caso."))]
    pub case_ids: Vec<Uuid>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutResponse {
    pub session: PaymentSession,
    /// URL do checkout simulado para onde a UI redireciona.
    #[schema(example = "/api/checkout/550e8400-e29b-41d4-a716-446655440000")]
    pub checkout_url: String,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OutcomePayload {
    pub outcome: PaymentOutcome,
}

/// Resposta do `resolve`. Entrega duplicada não é erro.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase", tag = "result", content = "session")]
pub enum ResolveOutcome {
    Resolved(PaymentSession),
    AlreadyResolved(PaymentSession),
}

impl ResolveOutcome {
    pub fn session(&self) -> &PaymentSession {
        match self {
            ResolveOutcome::Resolved(s) | ResolveOutcome::AlreadyResolved(s) => s,
        }
    }
}
