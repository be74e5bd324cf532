// src/handlers/checkout.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        rbac::{LandlordRole, RequireRole},
    },
    models::payment::{
        CheckoutPayload, CheckoutResponse, OutcomePayload, PaymentOutcome, PaymentSession, ResolveOutcome,
    },
};

// POST /api/checkout
#[utoipa::path(
    post,
    path = "/api/checkout",
    tag = "Checkout",
    request_body = CheckoutPayload,
    responses(
        (status = 201, description = "Sessão aberta; os casos ficam aguardando pagamento", body = CheckoutResponse),
        (status = 409, description = "Algum caso não é um rascunho não pago")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_checkout(
    State(app_state): State<AppState>,
    RequireRole(user, _): RequireRole<LandlordRole>,
    Json(payload): Json<CheckoutPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let session = app_state.case_service.enter_checkout(&user, &payload.case_ids).await?;

    // Processador simulado: confirma sozinho depois do atraso configurado
    if let Some(delay) = app_state.auto_resolve_after {
        app_state.gateway.schedule_outcome(session.id, PaymentOutcome::Success, delay);
    }

    let checkout_url = format!("/api/checkout/{}", session.id);
    Ok((StatusCode::CREATED, Json(CheckoutResponse { session, checkout_url })))
}

// GET /api/checkout/{id}
#[utoipa::path(
    get,
    path = "/api/checkout/{id}",
    tag = "Checkout",
    params(("id" = Uuid, Path, description = "ID da sessão")),
    responses(
        (status = 200, description = "Sessão de checkout", body = PaymentSession),
        (status = 404, description = "Não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_checkout(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<PaymentSession>, AppError> {
    Ok(Json(app_state.case_service.find_session(&user, id).await?))
}

// POST /api/checkout/{id}/outcome
#[utoipa::path(
    post,
    path = "/api/checkout/{id}/outcome",
    tag = "Checkout",
    params(("id" = Uuid, Path, description = "ID da sessão")),
    request_body = OutcomePayload,
    responses(
        (status = 200, description = "Resultado aplicado, ou sessão já resolvida", body = ResolveOutcome),
        (status = 404, description = "Sessão não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn deliver_outcome(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<OutcomePayload>,
) -> Result<Json<ResolveOutcome>, AppError> {
    let outcome = app_state.case_service.resolve_checkout(&user, id, payload.outcome).await?;
    Ok(Json(outcome))
}
