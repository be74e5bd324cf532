// src/handlers/tenants.rs

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
    middleware::rbac::{LandlordRole, RequireRole},
    models::property::{Tenant, TenantPayload},
};

type Landlord = RequireRole<LandlordRole>;

#[utoipa::path(
    post,
    path = "/api/tenants",
    tag = "Tenants",
    request_body = TenantPayload,
    responses((status = 201, description = "Inquilino cadastrado", body = Tenant)),
    security(("api_jwt" = []))
)]
pub async fn create_tenant(
    State(app_state): State<AppState>,
    RequireRole(user, _): Landlord,
    Json(payload): Json<TenantPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let tenant = app_state.property_service.create_tenant(&user, payload).await?;
    Ok((StatusCode::CREATED, Json(tenant)))
}

#[utoipa::path(
    get,
    path = "/api/tenants",
    tag = "Tenants",
    responses((status = 200, description = "Inquilinos do proprietário", body = Vec<Tenant>)),
    security(("api_jwt" = []))
)]
pub async fn list_tenants(
    State(app_state): State<AppState>,
    RequireRole(user, _): Landlord,
) -> Result<Json<Vec<Tenant>>, AppError> {
    Ok(Json(app_state.property_service.list_tenants(&user).await?))
}

#[utoipa::path(
    get,
    path = "/api/tenants/{id}",
    tag = "Tenants",
    params(("id" = Uuid, Path, description = "ID do inquilino")),
    responses(
        (status = 200, description = "Inquilino", body = Tenant),
        (status = 404, description = "Não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_tenant(
    State(app_state): State<AppState>,
    RequireRole(user, _): Landlord,
    Path(id): Path<Uuid>,
) -> Result<Json<Tenant>, AppError> {
    Ok(Json(app_state.property_service.get_tenant(&user, id).await?))
}

#[utoipa::path(
    put,
    path = "/api/tenants/{id}",
    tag = "Tenants",
    params(("id" = Uuid, Path, description = "ID do inquilino")),
    request_body = TenantPayload,
    responses((status = 200, description = "Inquilino atualizado", body = Tenant)),
    security(("api_jwt" = []))
)]
pub async fn update_tenant(
    State(app_state): State<AppState>,
    RequireRole(user, _): Landlord,
    Path(id): Path<Uuid>,
    Json(payload): Json<TenantPayload>,
) -> Result<Json<Tenant>, AppError> {
    payload.validate()?;
    Ok(Json(app_state.property_service.update_tenant(&user, id, payload).await?))
}

#[utoipa::path(
    delete,
    path = "/api/tenants/{id}",
    tag = "Tenants",
    params(("id" = Uuid, Path, description = "ID do inquilino")),
    responses(
        (status = 204, description = "Removido"),
        (status = 409, description = "Inquilino com casos")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_tenant(
    State(app_state): State<AppState>,
    RequireRole(user, _): Landlord,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    app_state.property_service.delete_tenant(&user, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
