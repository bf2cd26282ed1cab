//! The module contains `Event` and its table.

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;

use crate::Attendee;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Event {
    pub id: i32,
    pub title: String,
    pub description: Option<String>,
    pub location: String,
    pub start_date: DateTime<Utc>,
    /// Never earlier than `start_date`.
    pub end_date: DateTime<Utc>,
    pub is_active: bool,
    pub organizer_id: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Model> for Event {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            title: model.title,
            description: model.description,
            location: model.location,
            start_date: model.start_date,
            end_date: model.end_date,
            is_active: model.is_active,
            organizer_id: model.organizer_id,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

/// An event with its registered attendees.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EventDetail {
    pub event: Event,
    pub attendees: Vec<Attendee>,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "events")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub title: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    pub location: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub is_active: bool,
    pub organizer_id: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::OrganizerId",
        to = "super::users::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Organizer,
    #[sea_orm(has_many = "super::event_attendees::Entity")]
    Attendees,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Organizer.def()
    }
}

impl Related<super::event_attendees::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Attendees.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
