//! The module contains `User` and its table.
//!
//! The stored row carries the password hash; the public [`User`] does not,
//! so the hash can never reach an output shape.

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;

use crate::Event;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct User {
    pub id: i32,
    pub email: String,
    pub username: String,
    pub full_name: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Model> for User {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            email: model.email,
            username: model.username,
            full_name: model.full_name,
            is_active: model.is_active,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

/// A user together with the events they organize.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UserWithEvents {
    pub user: User,
    pub events: Vec<Event>,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub email: String,
    #[sea_orm(unique)]
    pub username: String,
    pub hashed_password: String,
    pub full_name: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::events::Entity")]
    Events,
    #[sea_orm(has_many = "super::event_attendees::Entity")]
    Attendances,
}

impl Related<super::events::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Events.def()
    }
}

impl Related<super::event_attendees::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Attendances.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Names the colliding column from a driver unique-violation message.
pub(crate) fn classify_conflict(detail: &str) -> (&'static str, String) {
    if detail.contains("email") {
        ("email", "email already registered".to_string())
    } else {
        ("username", "username already taken".to_string())
    }
}
