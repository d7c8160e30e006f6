use axum::{extract::State, Extension, Json};
use tower_http::request_id::RequestId;

use crate::{
    middleware::request_id::request_id_str,
    models::{RecommendationRequest, RecommendationResponse},
    routes::AppState,
};

/// Handler for recommendations endpoint
///
/// Always answers 200; an empty `recommendations` list comes with a message
/// for the user instead of an error status.
pub async fn recommend(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Json(request): Json<RecommendationRequest>,
) -> Json<RecommendationResponse> {
    let query = request
        .liked_titles
        .first()
        .filter(|title| !title.trim().is_empty())
        .cloned();

    tracing::info!(
        request_id = %request_id_str(&request_id),
        liked_count = request.liked_titles.len(),
        query = ?query,
        "Processing recommendation request"
    );

    let recommendations = match state.snapshot().await {
        Some(snapshot) => snapshot.recommend_movies(query.as_deref()),
        None => {
            tracing::warn!(
                request_id = %request_id_str(&request_id),
                "No catalogue loaded, returning empty recommendations"
            );
            Vec::new()
        }
    };

    tracing::info!(
        request_id = %request_id_str(&request_id),
        results = recommendations.len(),
        "Recommendation completed"
    );

    Json(RecommendationResponse::new(query, recommendations))
}
