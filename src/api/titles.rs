//! Title availability and inventory endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::{copy::Copy, title::TitleAvailability},
};

/// Add copy request
#[derive(Deserialize, ToSchema)]
pub struct CreateCopyRequest {
    /// Copy number within the title, starts at 1
    pub copy_number: i32,
}

/// Get per-title copy availability
#[utoipa::path(
    get,
    path = "/titles/{id}/availability",
    tag = "titles",
    params(
        ("id" = i32, Path, description = "Title ID")
    ),
    responses(
        (status = 200, description = "Copy counts for the title", body = TitleAvailability),
        (status = 404, description = "Title not found")
    )
)]
pub async fn get_availability(
    State(state): State<crate::AppState>,
    Path(title_id): Path<i32>,
) -> AppResult<Json<TitleAvailability>> {
    let availability = state.services.availability.for_title(title_id).await?;
    Ok(Json(availability))
}

/// Add a copy to a title's inventory
#[utoipa::path(
    post,
    path = "/titles/{id}/copies",
    tag = "titles",
    params(
        ("id" = i32, Path, description = "Title ID")
    ),
    request_body = CreateCopyRequest,
    responses(
        (status = 201, description = "Copy added", body = Copy),
        (status = 400, description = "Copy number invalid or already stocked"),
        (status = 404, description = "Title not found")
    )
)]
pub async fn create_copy(
    State(state): State<crate::AppState>,
    Path(title_id): Path<i32>,
    Json(request): Json<CreateCopyRequest>,
) -> AppResult<(StatusCode, Json<Copy>)> {
    let copy = state
        .services
        .circulation
        .add_copy(title_id, request.copy_number)
        .await?;
    Ok((StatusCode::CREATED, Json(copy)))
}
