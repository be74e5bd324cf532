// src/handlers/documents.rs

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
};
use chrono::Utc;
use uuid::Uuid;

use crate::{common::error::AppError, config::AppState, middleware::auth::AuthenticatedUser};

// GET /api/cases/{id}/notice.pdf
#[utoipa::path(
    get,
    path = "/api/cases/{id}/notice.pdf",
    tag = "Documents",
    params(("id" = Uuid, Path, description = "ID do caso")),
    responses(
        (status = 200, description = "Notificação em PDF", content_type = "application/pdf", body = Vec<u8>),
        (status = 404, description = "Caso não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn download_notice(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let parts = app_state.case_service.notice_parts(&user, id).await?;
    let pdf_bytes = app_state
        .document_service
        .render_notice_pdf(&parts, Utc::now().date_naive())
        .await?;

    let headers = [
        (header::CONTENT_TYPE, "application/pdf".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"notice-{}.pdf\"", id),
        ),
    ];

    Ok((StatusCode::OK, headers, pdf_bytes))
}
