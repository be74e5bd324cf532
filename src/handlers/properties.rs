// src/handlers/properties.rs

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
    models::property::{Property, PropertyPayload},
};

type Landlord = RequireRole<LandlordRole>;

#[utoipa::path(
    post,
    path = "/api/properties",
    tag = "Properties",
    request_body = PropertyPayload,
    responses((status = 201, description = "Imóvel cadastrado", body = Property)),
    security(("api_jwt" = []))
)]
pub async fn create_property(
    State(app_state): State<AppState>,
    RequireRole(user, _): Landlord,
    Json(payload): Json<PropertyPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let property = app_state.property_service.create_property(&user, payload).await?;
    Ok((StatusCode::CREATED, Json(property)))
}

#[utoipa::path(
    get,
    path = "/api/properties",
    tag = "Properties",
    responses((status = 200, description = "Imóveis do proprietário", body = Vec<Property>)),
    security(("api_jwt" = []))
)]
pub async fn list_properties(
    State(app_state): State<AppState>,
    RequireRole(user, _): Landlord,
) -> Result<Json<Vec<Property>>, AppError> {
    Ok(Json(app_state.property_service.list_properties(&user).await?))
}

#[utoipa::path(
    get,
    path = "/api/properties/{id}",
    tag = "Properties",
    params(("id" = Uuid, Path, description = "ID do imóvel")),
    responses(
        (status = 200, description = "Imóvel", body = Property),
        (status = 404, description = "Não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_property(
    State(app_state): State<AppState>,
    RequireRole(user, _): Landlord,
    Path(id): Path<Uuid>,
) -> Result<Json<Property>, AppError> {
    Ok(Json(app_state.property_service.get_property(&user, id).await?))
}

#[utoipa::path(
    put,
    path = "/api/properties/{id}",
    tag = "Properties",
    params(("id" = Uuid, Path, description = "ID do imóvel")),
    request_body = PropertyPayload,
    responses((status = 200, description = "Imóvel atualizado", body = Property)),
    security(("api_jwt" = []))
)]
pub async fn update_property(
    State(app_state): State<AppState>,
    RequireRole(user, _): Landlord,
    Path(id): Path<Uuid>,
    Json(payload): Json<PropertyPayload>,
) -> Result<Json<Property>, AppError> {
    payload.validate()?;
    Ok(Json(app_state.property_service.update_property(&user, id, payload).await?))
}

#[utoipa::path(
    delete,
    path = "/api/properties/{id}",
    tag = "Properties",
    params(("id" = Uuid, Path, description = "ID do imóvel")),
    responses(
        (status = 204, description = "Removido"),
        (status = 409, description = "Imóvel com casos ou inquilinos")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_property(
    State(app_state): State<AppState>,
    RequireRole(user, _): Landlord,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    app_state.property_service.delete_property(&user, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
