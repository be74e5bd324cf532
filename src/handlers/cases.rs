// src/handlers/cases.rs

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
        rbac::{ContractorRole, LandlordRole, RequireRole, StaffRole},
    },
    models::legal_case::{
        CreateCasePayload, DocumentPayload, DocumentSlot, LegalCase, QuotePayload, QuoteResponse,
        TenantPayment, TenantPaymentPayload,
    },
};

// =============================================================================
//  1. PROPRIETÁRIO: PREÇO, CRIAÇÃO & RASCUNHOS
// =============================================================================

// POST /api/cases/quote
#[utoipa::path(
    post,
    path = "/api/cases/quote",
    tag = "Cases",
    request_body = QuotePayload,
    responses(
        (status = 200, description = "Preço para a jurisdição do imóvel", body = QuoteResponse),
        (status = 422, description = "Preço não configurado ou jurisdição bloqueada")
    ),
    security(("api_jwt" = []))
)]
pub async fn quote(
    State(app_state): State<AppState>,
    RequireRole(user, _): RequireRole<LandlordRole>,
    Json(payload): Json<QuotePayload>,
) -> Result<Json<QuoteResponse>, AppError> {
    payload.validate()?;
    Ok(Json(app_state.case_service.quote(&user, payload.property_id).await?))
}

// POST /api/cases
#[utoipa::path(
    post,
    path = "/api/cases",
    tag = "Cases",
    request_body = CreateCasePayload,
    responses(
        (status = 201, description = "Rascunho criado", body = LegalCase),
        (status = 409, description = "Inquilino já tem um pedido aberto")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_case(
    State(app_state): State<AppState>,
    RequireRole(user, _): RequireRole<LandlordRole>,
    Json(payload): Json<CreateCasePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let case = app_state.case_service.create_case(&user, payload).await?;
    Ok((StatusCode::CREATED, Json(case)))
}

// GET /api/cases
#[utoipa::path(
    get,
    path = "/api/cases",
    tag = "Cases",
    responses((status = 200, description = "Casos visíveis para o usuário", body = Vec<LegalCase>)),
    security(("api_jwt" = []))
)]
pub async fn list_cases(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<Json<Vec<LegalCase>>, AppError> {
    Ok(Json(app_state.case_service.list_cases(&user).await?))
}

// GET /api/cases/{id}
#[utoipa::path(
    get,
    path = "/api/cases/{id}",
    tag = "Cases",
    params(("id" = Uuid, Path, description = "ID do caso")),
    responses(
        (status = 200, description = "Caso", body = LegalCase),
        (status = 404, description = "Não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_case(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<LegalCase>, AppError> {
    Ok(Json(app_state.case_service.get_case(&user, id).await?))
}

// DELETE /api/cases/{id}
#[utoipa::path(
    delete,
    path = "/api/cases/{id}",
    tag = "Cases",
    params(("id" = Uuid, Path, description = "ID do caso")),
    responses(
        (status = 204, description = "Rascunho removido"),
        (status = 409, description = "Só rascunhos não pagos podem ser removidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_case(
    State(app_state): State<AppState>,
    RequireRole(user, _): RequireRole<LandlordRole>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    app_state.case_service.delete_draft(&user, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
//  2. DOCUMENTOS
// =============================================================================

// PUT /api/cases/{id}/documents/{slot}
#[utoipa::path(
    put,
    path = "/api/cases/{id}/documents/{slot}",
    tag = "Cases",
    params(
        ("id" = Uuid, Path, description = "ID do caso"),
        ("slot" = DocumentSlot, Path, description = "eviction-notice, photo, receipt ou certificate-of-mailing")
    ),
    request_body = DocumentPayload,
    responses((status = 200, description = "Documento registrado", body = LegalCase)),
    security(("api_jwt" = []))
)]
pub async fn put_document(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path((id, slot)): Path<(Uuid, DocumentSlot)>,
    Json(payload): Json<DocumentPayload>,
) -> Result<Json<LegalCase>, AppError> {
    payload.validate()?;
    let case = app_state
        .case_service
        .record_document(&user, id, slot, Some(payload.reference))
        .await?;
    Ok(Json(case))
}

// DELETE /api/cases/{id}/documents/{slot}
#[utoipa::path(
    delete,
    path = "/api/cases/{id}/documents/{slot}",
    tag = "Cases",
    params(
        ("id" = Uuid, Path, description = "ID do caso"),
        ("slot" = DocumentSlot, Path, description = "Slot a limpar")
    ),
    responses((status = 200, description = "Documento removido", body = LegalCase)),
    security(("api_jwt" = []))
)]
pub async fn clear_document(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path((id, slot)): Path<(Uuid, DocumentSlot)>,
) -> Result<Json<LegalCase>, AppError> {
    Ok(Json(app_state.case_service.record_document(&user, id, slot, None).await?))
}

// =============================================================================
//  3. CONTRATADO: TRABALHO DE CAMPO
// =============================================================================

// POST /api/cases/{id}/claim
#[utoipa::path(
    post,
    path = "/api/cases/{id}/claim",
    tag = "Cases",
    params(("id" = Uuid, Path, description = "ID do caso")),
    responses(
        (status = 200, description = "Caso assumido", body = LegalCase),
        (status = 409, description = "Caso não está pago ou já foi assumido")
    ),
    security(("api_jwt" = []))
)]
pub async fn claim_case(
    State(app_state): State<AppState>,
    RequireRole(user, _): RequireRole<ContractorRole>,
    Path(id): Path<Uuid>,
) -> Result<Json<LegalCase>, AppError> {
    Ok(Json(app_state.case_service.claim(&user, id).await?))
}

// POST /api/cases/{id}/unclaim
#[utoipa::path(
    post,
    path = "/api/cases/{id}/unclaim",
    tag = "Cases",
    params(("id" = Uuid, Path, description = "ID do caso")),
    responses((status = 200, description = "Caso liberado", body = LegalCase)),
    security(("api_jwt" = []))
)]
pub async fn unclaim_case(
    State(app_state): State<AppState>,
    RequireRole(user, _): RequireRole<StaffRole>,
    Path(id): Path<Uuid>,
) -> Result<Json<LegalCase>, AppError> {
    Ok(Json(app_state.case_service.unclaim(&user, id).await?))
}

// POST /api/cases/{id}/start
#[utoipa::path(
    post,
    path = "/api/cases/{id}/start",
    tag = "Cases",
    params(("id" = Uuid, Path, description = "ID do caso")),
    responses((status = 200, description = "Caso em andamento", body = LegalCase)),
    security(("api_jwt" = []))
)]
pub async fn start_case(
    State(app_state): State<AppState>,
    RequireRole(user, _): RequireRole<StaffRole>,
    Path(id): Path<Uuid>,
) -> Result<Json<LegalCase>, AppError> {
    Ok(Json(app_state.case_service.start_work(&user, id).await?))
}

// POST /api/cases/{id}/complete
#[utoipa::path(
    post,
    path = "/api/cases/{id}/complete",
    tag = "Cases",
    params(("id" = Uuid, Path, description = "ID do caso")),
    responses(
        (status = 200, description = "Caso concluído", body = LegalCase),
        (status = 422, description = "Faltam documentos")
    ),
    security(("api_jwt" = []))
)]
pub async fn complete_case(
    State(app_state): State<AppState>,
    RequireRole(user, _): RequireRole<StaffRole>,
    Path(id): Path<Uuid>,
) -> Result<Json<LegalCase>, AppError> {
    Ok(Json(app_state.case_service.mark_complete(&user, id).await?))
}

// =============================================================================
//  4. PAGAMENTOS DO INQUILINO
// =============================================================================

// POST /api/cases/{id}/payments
#[utoipa::path(
    post,
    path = "/api/cases/{id}/payments",
    tag = "Cases",
    params(("id" = Uuid, Path, description = "ID do caso")),
    request_body = TenantPaymentPayload,
    responses(
        (status = 201, description = "Pagamento registrado", body = TenantPayment),
        (status = 400, description = "Valor inválido"),
        (status = 422, description = "Valor acima do saldo")
    ),
    security(("api_jwt" = []))
)]
pub async fn record_payment(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<TenantPaymentPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let payment = app_state
        .case_service
        .record_tenant_payment(&user, id, payload.amount, payload.paid_on)
        .await?;
    Ok((StatusCode::CREATED, Json(payment)))
}

// GET /api/cases/{id}/payments
#[utoipa::path(
    get,
    path = "/api/cases/{id}/payments",
    tag = "Cases",
    params(("id" = Uuid, Path, description = "ID do caso")),
    responses((status = 200, description = "Pagamentos do inquilino", body = Vec<TenantPayment>)),
    security(("api_jwt" = []))
)]
pub async fn list_payments(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<TenantPayment>>, AppError> {
    Ok(Json(app_state.case_service.list_tenant_payments(&user, id).await?))
}
