use crate::AppState;
use crate::api::error::AppError;
use crate::api::handlers::health::MessageResponse;
use crate::services::pptx::Presentation;
use axum::{
    Json,
    extract::{Path, State},
};
use std::sync::Arc;

#[utoipa::path(
    get,
    path = "/templates/{id}",
    params(
        ("id" = String, Path, description = "Template id returned by /upload")
    ),
    responses(
        (status = 200, description = "Parsed presentation JSON"),
        (status = 404, description = "Unknown template id")
    ),
    tag = "templates"
)]
pub async fn get_template(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Arc<Presentation>>, AppError> {
    let template = state
        .templates
        .get(&id)
        .ok_or_else(|| AppError::NotFound(format!("Template {} not found", id)))?;
    Ok(Json(template.presentation))
}

#[utoipa::path(
    post,
    path = "/generate",
    responses(
        (status = 200, description = "Placeholder for slide generation", body = MessageResponse)
    ),
    tag = "templates"
)]
pub async fn generate() -> Json<MessageResponse> {
    Json(MessageResponse {
        message: "Slide generation endpoint - TBD".to_string(),
    })
}
