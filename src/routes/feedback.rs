use axum::{extract::State, http::StatusCode, Json};

use crate::{
    error::AppResult,
    models::{Feedback, FeedbackReceipt},
    routes::AppState,
};

/// Handler for the site feedback endpoint
pub async fn submit(
    State(state): State<AppState>,
    Json(feedback): Json<Feedback>,
) -> AppResult<(StatusCode, Json<FeedbackReceipt>)> {
    let receipt = state.comments.save(&feedback).await?;
    Ok((StatusCode::CREATED, Json(receipt)))
}
