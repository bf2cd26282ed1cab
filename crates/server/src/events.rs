//! Events and attendee registration endpoints.

use api_types::event::{
    AttendeeNew, AttendeeView, EventDetailView, EventNew, EventQuery, EventUpdate, EventView,
};
use axum::{extract::State, http::StatusCode};

use crate::{
    ServerError,
    extract::{Json, Path, Query},
    server::ServerState,
};

pub(crate) fn map_event(event: engine::Event) -> EventView {
    EventView {
        id: event.id,
        title: event.title,
        description: event.description,
        location: event.location,
        start_date: event.start_date,
        end_date: event.end_date,
        is_active: event.is_active,
        organizer_id: event.organizer_id,
        created_at: event.created_at,
        updated_at: event.updated_at,
    }
}

fn map_attendee(attendee: engine::Attendee) -> AttendeeView {
    AttendeeView {
        id: attendee.id,
        event_id: attendee.event_id,
        user_id: attendee.user_id,
        registration_date: attendee.registration_date,
        attended: attendee.attended,
    }
}

pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<EventQuery>,
) -> Result<Json<Vec<EventView>>, ServerError> {
    let events = state
        .engine
        .list_events(query)
        .await?
        .into_iter()
        .map(map_event)
        .collect();
    Ok(Json(events))
}

pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<EventNew>,
) -> Result<(StatusCode, Json<EventView>), ServerError> {
    let event = state.engine.create_event(payload).await?;
    Ok((StatusCode::CREATED, Json(map_event(event))))
}

pub async fn get(
    State(state): State<ServerState>,
    Path(event_id): Path<i32>,
) -> Result<Json<EventDetailView>, ServerError> {
    let detail = state.engine.event_detail(event_id).await?;
    Ok(Json(EventDetailView {
        event: map_event(detail.event),
        attendees: detail.attendees.into_iter().map(map_attendee).collect(),
    }))
}

/// Serves both PUT and PATCH; only the keys present in the body change.
pub async fn update(
    State(state): State<ServerState>,
    Path(event_id): Path<i32>,
    Json(payload): Json<EventUpdate>,
) -> Result<Json<EventView>, ServerError> {
    let event = state.engine.update_event(event_id, payload).await?;
    Ok(Json(map_event(event)))
}

pub async fn remove(
    State(state): State<ServerState>,
    Path(event_id): Path<i32>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_event(event_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_attendees(
    State(state): State<ServerState>,
    Path(event_id): Path<i32>,
) -> Result<Json<Vec<AttendeeView>>, ServerError> {
    let attendees = state
        .engine
        .list_attendees(event_id)
        .await?
        .into_iter()
        .map(map_attendee)
        .collect();
    Ok(Json(attendees))
}

pub async fn add_attendee(
    State(state): State<ServerState>,
    Path(event_id): Path<i32>,
    Json(payload): Json<AttendeeNew>,
) -> Result<(StatusCode, Json<AttendeeView>), ServerError> {
    let attendee = state.engine.add_attendee(event_id, payload).await?;
    Ok((StatusCode::CREATED, Json(map_attendee(attendee))))
}

pub async fn remove_attendee(
    State(state): State<ServerState>,
    Path((event_id, user_id)): Path<(i32, i32)>,
) -> Result<StatusCode, ServerError> {
    state.engine.remove_attendee(event_id, user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
