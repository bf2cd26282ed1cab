//! Categories API endpoints.

use api_types::{
    Page,
    category::{CategoryNew, CategoryView},
};
use axum::{extract::State, http::StatusCode};

use crate::{
    ServerError,
    extract::{Json, Path, Query},
    server::ServerState,
};

pub(crate) fn map_category(category: engine::Category) -> CategoryView {
    CategoryView {
        id: category.id,
        name: category.name,
    }
}

pub async fn list(
    State(state): State<ServerState>,
    Query(page): Query<Page>,
) -> Result<Json<Vec<CategoryView>>, ServerError> {
    let categories = state
        .engine
        .list_categories(page)
        .await?
        .into_iter()
        .map(map_category)
        .collect();
    Ok(Json(categories))
}

pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<CategoryNew>,
) -> Result<(StatusCode, Json<CategoryView>), ServerError> {
    let category = state.engine.create_category(&payload.name).await?;
    Ok((StatusCode::CREATED, Json(map_category(category))))
}

pub async fn get(
    State(state): State<ServerState>,
    Path(category_id): Path<i32>,
) -> Result<Json<CategoryView>, ServerError> {
    let category = state.engine.category(category_id).await?;
    Ok(Json(map_category(category)))
}

pub async fn remove(
    State(state): State<ServerState>,
    Path(category_id): Path<i32>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_category(category_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
