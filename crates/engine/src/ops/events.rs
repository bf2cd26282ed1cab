use api_types::event::{EventNew, EventQuery, EventUpdate};
use chrono::Utc;
use sea_orm::{
    ActiveValue, ConnectionTrait, QueryFilter, QueryOrder, QuerySelect, TransactionTrait,
    prelude::*,
    sea_query::{Expr, Func},
};

use crate::{
    Attendee, EngineError, Event, EventDetail, ResultEngine, event_attendees, events, validation,
};

use super::{Engine, set_patch, users::require_user, with_tx};

pub(super) async fn require_event<C: ConnectionTrait>(
    db: &C,
    event_id: i32,
) -> ResultEngine<events::Model> {
    events::Entity::find_by_id(event_id)
        .one(db)
        .await?
        .ok_or_else(|| EngineError::NotFound(format!("event {event_id}")))
}

/// Case-insensitive `LIKE %needle%` on a text column.
///
/// The needle is lowered with full Unicode rules. SQLite's `LOWER` only folds
/// ASCII, so on SQLite a non-ASCII capital stored in the column (`É`) still
/// has to be matched by the same capital.
fn contains_ci(column: events::Column, needle: &str) -> sea_orm::sea_query::SimpleExpr {
    Expr::expr(Func::lower(Expr::col(column))).like(format!("%{}%", needle.to_lowercase()))
}

impl Engine {
    /// Create an event. The organizer must exist.
    pub async fn create_event(&self, input: EventNew) -> ResultEngine<Event> {
        validation::event_new(&input)?;
        let now = Utc::now();
        with_tx!(self, |db_tx| {
            require_user(&db_tx, input.organizer_id).await?;

            let active = events::ActiveModel {
                title: ActiveValue::Set(input.title),
                description: ActiveValue::Set(input.description),
                location: ActiveValue::Set(input.location),
                start_date: ActiveValue::Set(input.start_date),
                end_date: ActiveValue::Set(input.end_date),
                is_active: ActiveValue::Set(input.is_active.unwrap_or(true)),
                organizer_id: ActiveValue::Set(input.organizer_id),
                created_at: ActiveValue::Set(now),
                updated_at: ActiveValue::Set(now),
                ..Default::default()
            };
            let model = active.insert(&db_tx).await?;
            Ok(Event::from(model))
        })
    }

    pub async fn event(&self, event_id: i32) -> ResultEngine<Event> {
        require_event(&self.database, event_id)
            .await
            .map(Event::from)
    }

    /// Return an event with its attendees.
    pub async fn event_detail(&self, event_id: i32) -> ResultEngine<EventDetail> {
        with_tx!(self, |db_tx| {
            let event = require_event(&db_tx, event_id).await?;
            let attendees = event_attendees::Entity::find()
                .filter(event_attendees::Column::EventId.eq(event_id))
                .order_by_asc(event_attendees::Column::Id)
                .all(&db_tx)
                .await?;
            Ok(EventDetail {
                event: event.into(),
                attendees: attendees.into_iter().map(Attendee::from).collect(),
            })
        })
    }

    /// List events matching every filter present in `query`.
    pub async fn list_events(&self, query: EventQuery) -> ResultEngine<Vec<Event>> {
        let page = query.page();
        let mut select = events::Entity::find();
        if let Some(title) = query.title.as_deref().filter(|s| !s.is_empty()) {
            select = select.filter(contains_ci(events::Column::Title, title));
        }
        if let Some(location) = query.location.as_deref().filter(|s| !s.is_empty()) {
            select = select.filter(contains_ci(events::Column::Location, location));
        }
        if let Some(start_date) = query.start_date {
            select = select.filter(events::Column::StartDate.gte(start_date));
        }
        if let Some(is_active) = query.is_active {
            select = select.filter(events::Column::IsActive.eq(is_active));
        }

        let rows = select
            .order_by_asc(events::Column::Id)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.database)
            .await?;
        Ok(rows.into_iter().map(Event::from).collect())
    }

    /// Apply the supplied fields of `changes` to an event.
    ///
    /// The date order is checked against the stored row, so moving only
    /// `end_date` before the stored `start_date` (or the reverse) fails.
    pub async fn update_event(&self, event_id: i32, changes: EventUpdate) -> ResultEngine<Event> {
        with_tx!(self, |db_tx| {
            let model = require_event(&db_tx, event_id).await?;
            validation::event_update(&changes, &model.start_date, &model.end_date)?;

            let mut active: events::ActiveModel = model.into();
            set_patch(&mut active.title, changes.title);
            set_patch(&mut active.description, changes.description);
            set_patch(&mut active.location, changes.location);
            set_patch(&mut active.start_date, changes.start_date);
            set_patch(&mut active.end_date, changes.end_date);
            set_patch(&mut active.is_active, changes.is_active);
            active.updated_at = ActiveValue::Set(Utc::now());

            let model = active.update(&db_tx).await?;
            Ok(Event::from(model))
        })
    }

    /// Delete an event and its attendee registrations in one transaction.
    pub async fn delete_event(&self, event_id: i32) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            require_event(&db_tx, event_id).await?;

            let removed = event_attendees::Entity::delete_many()
                .filter(event_attendees::Column::EventId.eq(event_id))
                .exec(&db_tx)
                .await?;
            events::Entity::delete_by_id(event_id).exec(&db_tx).await?;

            tracing::debug!(
                "deleted event {event_id} with {} registrations",
                removed.rows_affected
            );
            Ok(())
        })
    }
}
