use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use rust_decimal::Decimal;
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

use crate::models::legal_case::{CaseStatus, DocumentSlot, PaymentStatus};

/// Motivo pelo qual o preço de uma jurisdição não pode ser calculado.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PricingError {
    #[error("pricing not configured for this jurisdiction")]
    NotConfigured,

    #[error("jurisdiction not enabled for this account")]
    NotEnabled,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("E-mail já existe")]
    EmailAlreadyExists,

    #[error("Credenciais inválidas")]
    InvalidCredentials,

    #[error("Token inválido")]
    InvalidToken,

    #[error("Usuário não encontrado")]
    UserNotFound,

    #[error("Acesso negado: {0}")]
    Forbidden(String),

    #[error("Não encontrado: {0}")]
    ResourceNotFound(String),

    // --- Regras do ciclo de vida do caso ---

    #[error("{0}")]
    PricingUnavailable(#[from] PricingError),

    #[error("invalid price {0}: a case cannot be charged a non-positive amount")]
    InvalidPrice(Decimal),

    #[error("tenant {tenant_id} already has an active request")]
    DuplicateActiveRequest { tenant_id: Uuid },

    #[error("cannot complete case: missing documents {}", display_slots(.missing))]
    IncompleteDocuments { missing: Vec<DocumentSlot> },

    #[error("invalid state for transition: {0}")]
    InvalidStateForTransition(String),

    #[error("only unpaid drafts can be deleted (case is {status:?}/{payment_status:?})")]
    InvalidStateForDeletion {
        status: CaseStatus,
        payment_status: PaymentStatus,
    },

    #[error("payment of {amount} exceeds the current balance of {balance}")]
    Overpayment { amount: Decimal, balance: Decimal },

    #[error("payment amount must be greater than zero, in whole cents")]
    InvalidPaymentAmount,

    #[error("cannot delete: {0}")]
    HasDependentRecords(String),

    #[error("Fonte não encontrada: {0}")]
    FontNotFound(String),

    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    // `anyhow::Error` captura o contexto de erros inesperados
    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

fn display_slots(slots: &[DocumentSlot]) -> String {
    slots.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_)
            | AppError::InvalidPrice(_)
            | AppError::InvalidPaymentAmount => StatusCode::BAD_REQUEST,
            AppError::EmailAlreadyExists
            | AppError::DuplicateActiveRequest { .. }
            | AppError::InvalidStateForTransition(_)
            | AppError::InvalidStateForDeletion { .. }
            | AppError::HasDependentRecords(_) => StatusCode::CONFLICT,
            AppError::InvalidCredentials | AppError::InvalidToken => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::UserNotFound | AppError::ResourceNotFound(_) => StatusCode::NOT_FOUND,
            AppError::PricingUnavailable(_)
            | AppError::IncompleteDocuments { .. }
            | AppError::Overpayment { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Código estável para a UI decidir o que mostrar.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::ValidationError(_) => "VALIDATION_ERROR",
            AppError::EmailAlreadyExists => "EMAIL_ALREADY_EXISTS",
            AppError::InvalidCredentials => "INVALID_CREDENTIALS",
            AppError::InvalidToken => "INVALID_TOKEN",
            AppError::UserNotFound => "USER_NOT_FOUND",
            AppError::Forbidden(_) => "FORBIDDEN",
            AppError::ResourceNotFound(_) => "NOT_FOUND",
            AppError::PricingUnavailable(_) => "PRICING_UNAVAILABLE",
            AppError::InvalidPrice(_) => "INVALID_PRICE",
            AppError::DuplicateActiveRequest { .. } => "DUPLICATE_ACTIVE_REQUEST",
            AppError::IncompleteDocuments { .. } => "INCOMPLETE_DOCUMENTS",
            AppError::InvalidStateForTransition(_) => "INVALID_STATE_FOR_TRANSITION",
            AppError::InvalidStateForDeletion { .. } => "INVALID_STATE_FOR_DELETION",
            AppError::Overpayment { .. } => "OVERPAYMENT",
            AppError::InvalidPaymentAmount => "INVALID_PAYMENT_AMOUNT",
            AppError::HasDependentRecords(_) => "HAS_DEPENDENT_RECORDS",
            _ => "INTERNAL_ERROR",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.code();

        let body = match &self {
            // Retorna todos os detalhes da validação, campo a campo
            AppError::ValidationError(errors) => {
                let mut details = std::collections::HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .map(|e| {
                            e.message
                                .as_ref()
                                .map(|m| m.to_string())
                                .unwrap_or_else(|| e.code.to_string())
                        })
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                json!({
                    "error": "Um ou mais campos são inválidos.",
                    "code": code,
                    "details": details,
                })
            }
            AppError::IncompleteDocuments { missing } => json!({
                "error": self.to_string(),
                "code": code,
                "details": { "missing": missing },
            }),
            e if status == StatusCode::INTERNAL_SERVER_ERROR => {
                // O `tracing` loga a mensagem detalhada; o cliente só vê a genérica.
                tracing::error!("Erro Interno do Servidor: {:?}", e);
                json!({ "error": "Ocorreu um erro inesperado.", "code": code })
            }
            e => json!({ "error": e.to_string(), "code": code }),
        };

        (status, Json(body)).into_response()
    }
}
