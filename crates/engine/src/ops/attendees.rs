use api_types::event::AttendeeNew;
use chrono::Utc;
use sea_orm::{ActiveValue, QueryFilter, QueryOrder, TransactionTrait, prelude::*};

use crate::{Attendee, EngineError, ResultEngine, event_attendees};

use super::{Engine, events::require_event, users::require_user, with_tx};

const ALREADY_REGISTERED: &str = "user is already registered for this event";

/// The only unique index on registrations is `(event_id, user_id)`.
fn registration_conflict(_detail: &str) -> (&'static str, String) {
    ("user_id", ALREADY_REGISTERED.to_string())
}

impl Engine {
    /// Register a user for an event.
    ///
    /// Both must exist and a user registers for a given event at most once.
    pub async fn add_attendee(&self, event_id: i32, input: AttendeeNew) -> ResultEngine<Attendee> {
        with_tx!(self, |db_tx| {
            require_event(&db_tx, event_id).await?;
            require_user(&db_tx, input.user_id).await?;

            let existing = event_attendees::Entity::find()
                .filter(event_attendees::Column::EventId.eq(event_id))
                .filter(event_attendees::Column::UserId.eq(input.user_id))
                .one(&db_tx)
                .await?;
            if existing.is_some() {
                return Err(EngineError::conflict("user_id", ALREADY_REGISTERED));
            }

            let active = event_attendees::ActiveModel {
                event_id: ActiveValue::Set(event_id),
                user_id: ActiveValue::Set(input.user_id),
                registration_date: ActiveValue::Set(Utc::now()),
                attended: ActiveValue::Set(input.attended.unwrap_or(false)),
                ..Default::default()
            };
            let model = active
                .insert(&db_tx)
                .await
                .map_err(|err| EngineError::from_unique_violation(err, registration_conflict))?;
            tracing::debug!("user {} registered for event {event_id}", model.user_id);
            Ok(Attendee::from(model))
        })
    }

    /// Cancel a registration.
    pub async fn remove_attendee(&self, event_id: i32, user_id: i32) -> ResultEngine<()> {
        let res = event_attendees::Entity::delete_many()
            .filter(event_attendees::Column::EventId.eq(event_id))
            .filter(event_attendees::Column::UserId.eq(user_id))
            .exec(&self.database)
            .await?;
        if res.rows_affected == 0 {
            return Err(EngineError::NotFound(format!(
                "registration of user {user_id} for event {event_id}"
            )));
        }
        Ok(())
    }

    pub async fn list_attendees(&self, event_id: i32) -> ResultEngine<Vec<Attendee>> {
        with_tx!(self, |db_tx| {
            require_event(&db_tx, event_id).await?;
            let rows = event_attendees::Entity::find()
                .filter(event_attendees::Column::EventId.eq(event_id))
                .order_by_asc(event_attendees::Column::Id)
                .all(&db_tx)
                .await?;
            Ok(rows.into_iter().map(Attendee::from).collect())
        })
    }
}

#[cfg(test)]
mod tests {
    use api_types::{event::EventNew, user::UserNew};
    use chrono::{Duration, TimeZone};
    use migration::MigratorTrait;
    use sea_orm::Database;

    use super::*;

    fn registration(event_id: i32, user_id: i32) -> event_attendees::ActiveModel {
        event_attendees::ActiveModel {
            event_id: ActiveValue::Set(event_id),
            user_id: ActiveValue::Set(user_id),
            registration_date: ActiveValue::Set(Utc::now()),
            attended: ActiveValue::Set(false),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn unique_index_rejects_a_second_registration() {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        migration::Migrator::up(&db, None).await.unwrap();
        let engine = Engine::builder()
            .database(db.clone())
            .build()
            .await
            .unwrap();

        let user = engine
            .create_user(UserNew {
                email: "bob@example.com".to_string(),
                username: "bob".to_string(),
                full_name: None,
                password: "secret-password".to_string(),
            })
            .await
            .unwrap();
        let start = Utc.with_ymd_and_hms(2025, 6, 1, 9, 0, 0).unwrap();
        let event = engine
            .create_event(EventNew {
                title: "Rust Meetup".to_string(),
                description: None,
                location: "Main Hall".to_string(),
                start_date: start,
                end_date: start + Duration::hours(8),
                is_active: None,
                organizer_id: user.id,
            })
            .await
            .unwrap();

        registration(event.id, user.id).insert(&db).await.unwrap();
        let err = registration(event.id, user.id)
            .insert(&db)
            .await
            .map_err(|err| EngineError::from_unique_violation(err, registration_conflict))
            .unwrap_err();

        assert_eq!(err, EngineError::conflict("user_id", ALREADY_REGISTERED));
    }
}
