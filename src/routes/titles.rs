use axum::{
    extract::{Query, State},
    Json,
};

use crate::{models::TitleQuery, routes::AppState};

/// Handler for the title listing endpoint
///
/// Titles come back in catalogue order, duplicates collapsed. An unloaded
/// catalogue yields an empty list.
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<TitleQuery>,
) -> Json<Vec<String>> {
    let Some(snapshot) = state.snapshot().await else {
        return Json(Vec::new());
    };

    let needle = params
        .q
        .as_deref()
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .map(str::to_lowercase);

    let index = snapshot.index();
    let titles = snapshot
        .catalogue()
        .titles()
        .enumerate()
        .filter(|(row, title)| index.get(title) == Some(*row))
        .map(|(_, title)| title)
        .filter(|title| match &needle {
            Some(needle) => title.to_lowercase().contains(needle.as_str()),
            None => true,
        })
        .map(str::to_string)
        .collect();

    Json(titles)
}
