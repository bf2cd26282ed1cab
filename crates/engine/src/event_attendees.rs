//! Registrations of users to events.
//!
//! A (event, user) pair appears at most once. The operation layer checks
//! before inserting and the `idx-event_attendees-event_user` unique index
//! catches concurrent registrations.

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Attendee {
    pub id: i32,
    pub event_id: i32,
    pub user_id: i32,
    pub registration_date: DateTime<Utc>,
    pub attended: bool,
}

impl From<Model> for Attendee {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            event_id: model.event_id,
            user_id: model.user_id,
            registration_date: model.registration_date,
            attended: model.attended,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "event_attendees")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub event_id: i32,
    pub user_id: i32,
    pub registration_date: DateTime<Utc>,
    pub attended: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::events::Entity",
        from = "Column::EventId",
        to = "super::events::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Event,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    User,
}

impl Related<super::events::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Event.def()
    }
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
