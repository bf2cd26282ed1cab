use api_types::user::{UserNew, UserUpdate};
use chrono::Utc;
use sea_orm::{
    ActiveValue, ConnectionTrait, QueryFilter, QueryOrder, QuerySelect, TransactionTrait,
    prelude::*,
};

use crate::{
    EngineError, Event, Page, ResultEngine, User, UserWithEvents, event_attendees, events, users,
    users::classify_conflict, validation,
};

use super::{Engine, set_patch, with_tx};

pub(super) async fn require_user<C: ConnectionTrait>(
    db: &C,
    user_id: i32,
) -> ResultEngine<users::Model> {
    users::Entity::find_by_id(user_id)
        .one(db)
        .await?
        .ok_or_else(|| EngineError::NotFound(format!("user {user_id}")))
}

/// Fails with a conflict when another user (not `except`) already uses
/// `value` in `column`.
async fn ensure_unique<C: ConnectionTrait>(
    db: &C,
    column: users::Column,
    value: &str,
    except: Option<i32>,
) -> ResultEngine<()> {
    let mut select = users::Entity::find().filter(column.eq(value));
    if let Some(user_id) = except {
        select = select.filter(users::Column::Id.ne(user_id));
    }
    if select.one(db).await?.is_some() {
        let (field, message) = match column {
            users::Column::Email => ("email", "email already registered"),
            _ => ("username", "username already taken"),
        };
        return Err(EngineError::conflict(field, message));
    }
    Ok(())
}

async fn organized_events<C: ConnectionTrait>(db: &C, user_id: i32) -> ResultEngine<Vec<Event>> {
    let rows = events::Entity::find()
        .filter(events::Column::OrganizerId.eq(user_id))
        .order_by_asc(events::Column::Id)
        .all(db)
        .await?;
    Ok(rows.into_iter().map(Event::from).collect())
}

impl Engine {
    /// Register a new user.
    ///
    /// Email and username are checked separately so the conflict names the
    /// field that collided. The unique keys on `users` catch the race between
    /// the check and the insert.
    pub async fn create_user(&self, input: UserNew) -> ResultEngine<User> {
        validation::user_new(&input)?;
        let hashed_password = self.hasher.hash(&input.password)?;
        let now = Utc::now();
        with_tx!(self, |db_tx| {
            ensure_unique(&db_tx, users::Column::Email, &input.email, None).await?;
            ensure_unique(&db_tx, users::Column::Username, &input.username, None).await?;

            let active = users::ActiveModel {
                email: ActiveValue::Set(input.email),
                username: ActiveValue::Set(input.username),
                hashed_password: ActiveValue::Set(hashed_password),
                full_name: ActiveValue::Set(input.full_name),
                is_active: ActiveValue::Set(true),
                created_at: ActiveValue::Set(now),
                updated_at: ActiveValue::Set(now),
                ..Default::default()
            };
            let model = active
                .insert(&db_tx)
                .await
                .map_err(|err| EngineError::from_unique_violation(err, classify_conflict))?;
            tracing::info!("created user {} ({})", model.username, model.id);
            Ok(User::from(model))
        })
    }

    pub async fn user(&self, user_id: i32) -> ResultEngine<User> {
        require_user(&self.database, user_id).await.map(User::from)
    }

    /// Return a user together with the events they organize.
    pub async fn user_with_events(&self, user_id: i32) -> ResultEngine<UserWithEvents> {
        with_tx!(self, |db_tx| {
            let user = require_user(&db_tx, user_id).await?;
            let events = organized_events(&db_tx, user_id).await?;
            Ok(UserWithEvents {
                user: user.into(),
                events,
            })
        })
    }

    pub async fn list_users(&self, page: Page) -> ResultEngine<Vec<User>> {
        let rows = users::Entity::find()
            .order_by_asc(users::Column::Id)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.database)
            .await?;
        Ok(rows.into_iter().map(User::from).collect())
    }

    /// Events organized by a user.
    pub async fn user_events(&self, user_id: i32) -> ResultEngine<Vec<Event>> {
        with_tx!(self, |db_tx| {
            require_user(&db_tx, user_id).await?;
            organized_events(&db_tx, user_id).await
        })
    }

    /// Apply the supplied fields of `changes` to a user.
    ///
    /// A supplied password is hashed before it reaches the store. Email and
    /// username must stay unique across *other* users; re-submitting one's
    /// own value is fine.
    pub async fn update_user(&self, user_id: i32, changes: UserUpdate) -> ResultEngine<User> {
        validation::user_update(&changes)?;
        let hashed_password = match changes.password.as_ref().into_option() {
            Some(password) => Some(self.hasher.hash(password)?),
            None => None,
        };
        with_tx!(self, |db_tx| {
            let model = require_user(&db_tx, user_id).await?;

            if let Some(email) = changes.email.as_ref().into_option() {
                ensure_unique(&db_tx, users::Column::Email, email, Some(user_id)).await?;
            }
            if let Some(username) = changes.username.as_ref().into_option() {
                ensure_unique(&db_tx, users::Column::Username, username, Some(user_id)).await?;
            }

            let mut active: users::ActiveModel = model.into();
            set_patch(&mut active.email, changes.email);
            set_patch(&mut active.username, changes.username);
            set_patch(&mut active.full_name, changes.full_name);
            set_patch(&mut active.is_active, changes.is_active);
            if let Some(hashed_password) = hashed_password {
                active.hashed_password = ActiveValue::Set(hashed_password);
            }
            active.updated_at = ActiveValue::Set(Utc::now());

            let model = active
                .update(&db_tx)
                .await
                .map_err(|err| EngineError::from_unique_violation(err, classify_conflict))?;
            Ok(User::from(model))
        })
    }

    /// Delete a user and everything they own.
    ///
    /// In one transaction: registrations to the user's events, the user's own
    /// registrations, the events they organize, then the user.
    pub async fn delete_user(&self, user_id: i32) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            require_user(&db_tx, user_id).await?;

            let event_ids: Vec<i32> = events::Entity::find()
                .select_only()
                .column(events::Column::Id)
                .filter(events::Column::OrganizerId.eq(user_id))
                .into_tuple()
                .all(&db_tx)
                .await?;

            if !event_ids.is_empty() {
                let removed = event_attendees::Entity::delete_many()
                    .filter(event_attendees::Column::EventId.is_in(event_ids.clone()))
                    .exec(&db_tx)
                    .await?;
                tracing::debug!(
                    "user {user_id}: removed {} registrations to organized events",
                    removed.rows_affected
                );
            }

            let removed = event_attendees::Entity::delete_many()
                .filter(event_attendees::Column::UserId.eq(user_id))
                .exec(&db_tx)
                .await?;
            tracing::debug!(
                "user {user_id}: removed {} own registrations",
                removed.rows_affected
            );

            events::Entity::delete_many()
                .filter(events::Column::OrganizerId.eq(user_id))
                .exec(&db_tx)
                .await?;
            users::Entity::delete_by_id(user_id).exec(&db_tx).await?;

            tracing::info!(
                "deleted user {user_id} with {} organized events",
                event_ids.len()
            );
            Ok(())
        })
    }
}
