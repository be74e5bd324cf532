// src/handlers/admin.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        rbac::{AdminRole, RequireRole},
    },
    models::{
        admin::{LawFirm, LawFirmPayload, PriceOverridePayload, ReferralCodePayload},
        auth::User,
        legal_case::{AdminCasePatch, LegalCase},
    },
};

type Admin = RequireRole<AdminRole>;

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BulkCasePatchPayload {
    #[validate(length(min = 1, message = "Selecione ao menos um caso."))]
    pub case_ids: Vec<Uuid>,
    #[validate(nested)]
    pub patch: AdminCasePatch,
}

// =============================================================================
//  1. USUÁRIOS, PREÇOS & INDICAÇÃO
// =============================================================================

#[utoipa::path(
    get,
    path = "/api/admin/users",
    tag = "Admin",
    responses((status = 200, description = "Todos os usuários", body = Vec<User>)),
    security(("api_jwt" = []))
)]
pub async fn list_users(
    State(app_state): State<AppState>,
    _admin: Admin,
) -> Result<Json<Vec<User>>, AppError> {
    Ok(Json(app_state.admin_service.list_users().await?))
}

#[utoipa::path(
    put,
    path = "/api/admin/users/{id}/prices",
    tag = "Admin",
    params(("id" = Uuid, Path, description = "ID do proprietário")),
    request_body = PriceOverridePayload,
    responses((status = 200, description = "Tabela de preços atualizada", body = User)),
    security(("api_jwt" = []))
)]
pub async fn set_price(
    State(app_state): State<AppState>,
    _admin: Admin,
    Path(id): Path<Uuid>,
    Json(payload): Json<PriceOverridePayload>,
) -> Result<Json<User>, AppError> {
    payload.validate()?;
    Ok(Json(app_state.admin_service.set_price_override(id, payload).await?))
}

#[utoipa::path(
    delete,
    path = "/api/admin/users/{id}/prices/{jurisdiction}",
    tag = "Admin",
    params(
        ("id" = Uuid, Path, description = "ID do proprietário"),
        ("jurisdiction" = String, Path, description = "Jurisdição a remover")
    ),
    responses((status = 200, description = "Entrada removida", body = User)),
    security(("api_jwt" = []))
)]
pub async fn remove_price(
    State(app_state): State<AppState>,
    _admin: Admin,
    Path((id, jurisdiction)): Path<(Uuid, String)>,
) -> Result<Json<User>, AppError> {
    Ok(Json(app_state.admin_service.remove_price_override(id, &jurisdiction).await?))
}

#[utoipa::path(
    put,
    path = "/api/admin/users/{id}/referral",
    tag = "Admin",
    params(("id" = Uuid, Path, description = "ID do usuário")),
    request_body = ReferralCodePayload,
    responses((status = 200, description = "Código de indicação atualizado", body = User)),
    security(("api_jwt" = []))
)]
pub async fn set_referral(
    State(app_state): State<AppState>,
    _admin: Admin,
    Path(id): Path<Uuid>,
    Json(payload): Json<ReferralCodePayload>,
) -> Result<Json<User>, AppError> {
    payload.validate()?;
    Ok(Json(app_state.admin_service.set_referral_code(id, payload.referral_code).await?))
}

// =============================================================================
//  2. CASOS
// =============================================================================

#[utoipa::path(
    get,
    path = "/api/admin/cases",
    tag = "Admin",
    responses((status = 200, description = "Todos os casos", body = Vec<LegalCase>)),
    security(("api_jwt" = []))
)]
pub async fn list_all_cases(
    State(app_state): State<AppState>,
    RequireRole(admin, _): Admin,
) -> Result<Json<Vec<LegalCase>>, AppError> {
    Ok(Json(app_state.case_service.list_cases(&admin).await?))
}

#[utoipa::path(
    patch,
    path = "/api/admin/cases/{id}",
    tag = "Admin",
    params(("id" = Uuid, Path, description = "ID do caso")),
    request_body = AdminCasePatch,
    responses(
        (status = 200, description = "Caso atualizado", body = LegalCase),
        (status = 422, description = "Conclusão sem os quatro documentos")
    ),
    security(("api_jwt" = []))
)]
pub async fn patch_case(
    State(app_state): State<AppState>,
    _admin: Admin,
    Path(id): Path<Uuid>,
    Json(patch): Json<AdminCasePatch>,
) -> Result<Json<LegalCase>, AppError> {
    patch.validate()?;
    Ok(Json(app_state.case_service.admin_update(id, patch).await?))
}

#[utoipa::path(
    patch,
    path = "/api/admin/cases",
    tag = "Admin",
    request_body = BulkCasePatchPayload,
    responses((status = 200, description = "Casos atualizados (tudo ou nada)", body = Vec<LegalCase>)),
    security(("api_jwt" = []))
)]
pub async fn bulk_patch_cases(
    State(app_state): State<AppState>,
    _admin: Admin,
    Json(payload): Json<BulkCasePatchPayload>,
) -> Result<Json<Vec<LegalCase>>, AppError> {
    payload.validate()?;
    let cases = app_state
        .case_service
        .admin_bulk_update(&payload.case_ids, payload.patch)
        .await?;
    Ok(Json(cases))
}

// =============================================================================
//  3. ESCRITÓRIOS DE ADVOCACIA
// =============================================================================

#[utoipa::path(
    post,
    path = "/api/admin/law-firms",
    tag = "Admin",
    request_body = LawFirmPayload,
    responses((status = 201, description = "Escritório cadastrado", body = LawFirm)),
    security(("api_jwt" = []))
)]
pub async fn create_law_firm(
    State(app_state): State<AppState>,
    _admin: Admin,
    Json(payload): Json<LawFirmPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let firm = app_state.admin_service.create_law_firm(payload).await?;
    Ok((StatusCode::CREATED, Json(firm)))
}

// Qualquer usuário autenticado escolhe o escritório ao criar o caso
#[utoipa::path(
    get,
    path = "/api/law-firms",
    tag = "Admin",
    responses((status = 200, description = "Escritórios cadastrados", body = Vec<LawFirm>)),
    security(("api_jwt" = []))
)]
pub async fn list_law_firms(
    State(app_state): State<AppState>,
    _user: AuthenticatedUser,
) -> Result<Json<Vec<LawFirm>>, AppError> {
    Ok(Json(app_state.admin_service.list_law_firms().await?))
}
