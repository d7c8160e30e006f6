use axum::{extract::State, Extension, Json};
use tower_http::request_id::RequestId;

use crate::{
    error::AppResult, middleware::request_id::request_id_str, models::CatalogueSummary,
    routes::AppState,
};

/// Handler for the catalogue reload endpoint
pub async fn reload(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
) -> AppResult<Json<CatalogueSummary>> {
    tracing::info!(
        request_id = %request_id_str(&request_id),
        source = %state.source.name(),
        "Reloading catalogue"
    );

    let summary = state.reload().await?;
    Ok(Json(summary))
}
