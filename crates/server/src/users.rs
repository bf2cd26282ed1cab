//! Users API endpoints.
//!
//! Responses are built from [`engine::User`], which has no password hash.

use api_types::{
    Page,
    event::EventView,
    user::{UserNew, UserUpdate, UserView, UserWithEventsView},
};
use axum::{extract::State, http::StatusCode};

use crate::{
    ServerError,
    events::map_event,
    extract::{Json, Path, Query},
    server::ServerState,
};

fn map_user(user: engine::User) -> UserView {
    UserView {
        id: user.id,
        email: user.email,
        username: user.username,
        full_name: user.full_name,
        is_active: user.is_active,
        created_at: user.created_at,
        updated_at: user.updated_at,
    }
}

pub async fn list(
    State(state): State<ServerState>,
    Query(page): Query<Page>,
) -> Result<Json<Vec<UserView>>, ServerError> {
    let users = state
        .engine
        .list_users(page)
        .await?
        .into_iter()
        .map(map_user)
        .collect();
    Ok(Json(users))
}

pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<UserNew>,
) -> Result<(StatusCode, Json<UserView>), ServerError> {
    let user = state.engine.create_user(payload).await?;
    Ok((StatusCode::CREATED, Json(map_user(user))))
}

pub async fn get(
    State(state): State<ServerState>,
    Path(user_id): Path<i32>,
) -> Result<Json<UserWithEventsView>, ServerError> {
    let found = state.engine.user_with_events(user_id).await?;
    Ok(Json(UserWithEventsView {
        user: map_user(found.user),
        events: found.events.into_iter().map(map_event).collect(),
    }))
}

/// Serves both PUT and PATCH; only the keys present in the body change.
pub async fn update(
    State(state): State<ServerState>,
    Path(user_id): Path<i32>,
    Json(payload): Json<UserUpdate>,
) -> Result<Json<UserView>, ServerError> {
    let user = state.engine.update_user(user_id, payload).await?;
    Ok(Json(map_user(user)))
}

pub async fn remove(
    State(state): State<ServerState>,
    Path(user_id): Path<i32>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_user(user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn events(
    State(state): State<ServerState>,
    Path(user_id): Path<i32>,
) -> Result<Json<Vec<EventView>>, ServerError> {
    let events = state
        .engine
        .user_events(user_id)
        .await?
        .into_iter()
        .map(map_event)
        .collect();
    Ok(Json(events))
}
