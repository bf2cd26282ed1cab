use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use patch::Patch;

mod patch;
pub mod timestamp;

/// Default number of rows returned by list endpoints.
pub const DEFAULT_LIMIT: u64 = 100;
/// Upper bound on `limit`.
pub const MAX_LIMIT: u64 = 1000;

/// Offset pagination (`?skip=0&limit=100`).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub skip: Option<u64>,
    pub limit: Option<u64>,
}

impl Page {
    pub fn new(skip: u64, limit: u64) -> Self {
        Self {
            skip: Some(skip),
            limit: Some(limit),
        }
    }

    pub fn offset(&self) -> u64 {
        self.skip.unwrap_or(0)
    }

    /// Requested limit, clamped to `1..=MAX_LIMIT`.
    pub fn limit(&self) -> u64 {
        self.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
    }
}

pub mod category {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryNew {
        pub name: String,
    }

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct CategoryView {
        pub id: i32,
        pub name: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoriesSeeded {
        pub inserted: usize,
    }
}

pub mod expense {
    use super::*;
    use crate::category::CategoryView;

    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct ExpenseNew {
        pub title: String,
        pub amount: f64,
        #[serde(default)]
        pub notes: Option<String>,
        pub category_id: i32,
        /// Server time is used when omitted.
        #[serde(default, deserialize_with = "crate::timestamp::optional")]
        pub date: Option<DateTime<Utc>>,
    }

    /// Partial update: only the keys present in the body are applied.
    #[derive(Clone, Debug, Default, Serialize, Deserialize)]
    pub struct ExpenseUpdate {
        #[serde(default, skip_serializing_if = "Patch::is_absent")]
        pub title: Patch<String>,
        #[serde(default, skip_serializing_if = "Patch::is_absent")]
        pub amount: Patch<f64>,
        #[serde(
            default,
            deserialize_with = "crate::timestamp::patch",
            skip_serializing_if = "Patch::is_absent"
        )]
        pub date: Patch<DateTime<Utc>>,
        #[serde(default, skip_serializing_if = "Patch::is_absent")]
        pub notes: Patch<Option<String>>,
        #[serde(default, skip_serializing_if = "Patch::is_absent")]
        pub category_id: Patch<i32>,
    }

    #[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
    pub struct ExpenseQuery {
        pub skip: Option<u64>,
        pub limit: Option<u64>,
        pub category_id: Option<i32>,
    }

    impl ExpenseQuery {
        pub fn page(&self) -> Page {
            Page {
                skip: self.skip,
                limit: self.limit,
            }
        }
    }

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct ExpenseView {
        pub id: i32,
        pub title: String,
        pub amount: f64,
        pub date: DateTime<Utc>,
        pub notes: Option<String>,
        pub category_id: i32,
        pub category: CategoryView,
    }
}

pub mod user {
    use super::*;
    use crate::event::EventView;

    /// Body of `POST /users`. The password is hashed before it is stored.
    #[derive(Clone, Serialize, Deserialize)]
    pub struct UserNew {
        pub email: String,
        pub username: String,
        #[serde(default)]
        pub full_name: Option<String>,
        pub password: String,
    }

    #[derive(Clone, Default, Serialize, Deserialize)]
    pub struct UserUpdate {
        #[serde(default, skip_serializing_if = "Patch::is_absent")]
        pub email: Patch<String>,
        #[serde(default, skip_serializing_if = "Patch::is_absent")]
        pub username: Patch<String>,
        #[serde(default, skip_serializing_if = "Patch::is_absent")]
        pub full_name: Patch<Option<String>>,
        #[serde(default, skip_serializing_if = "Patch::is_absent")]
        pub password: Patch<String>,
        #[serde(default, skip_serializing_if = "Patch::is_absent")]
        pub is_active: Patch<bool>,
    }

    /// Public user shape; carries no password field.
    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct UserView {
        pub id: i32,
        pub email: String,
        pub username: String,
        pub full_name: Option<String>,
        pub is_active: bool,
        pub created_at: DateTime<Utc>,
        pub updated_at: DateTime<Utc>,
    }

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct UserWithEventsView {
        #[serde(flatten)]
        pub user: UserView,
        pub events: Vec<EventView>,
    }
}

pub mod event {
    use super::*;

    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct EventNew {
        pub title: String,
        #[serde(default)]
        pub description: Option<String>,
        pub location: String,
        #[serde(deserialize_with = "crate::timestamp::required")]
        pub start_date: DateTime<Utc>,
        #[serde(deserialize_with = "crate::timestamp::required")]
        pub end_date: DateTime<Utc>,
        /// Defaults to `true`.
        #[serde(default)]
        pub is_active: Option<bool>,
        pub organizer_id: i32,
    }

    #[derive(Clone, Debug, Default, Serialize, Deserialize)]
    pub struct EventUpdate {
        #[serde(default, skip_serializing_if = "Patch::is_absent")]
        pub title: Patch<String>,
        #[serde(default, skip_serializing_if = "Patch::is_absent")]
        pub description: Patch<Option<String>>,
        #[serde(default, skip_serializing_if = "Patch::is_absent")]
        pub location: Patch<String>,
        #[serde(
            default,
            deserialize_with = "crate::timestamp::patch",
            skip_serializing_if = "Patch::is_absent"
        )]
        pub start_date: Patch<DateTime<Utc>>,
        #[serde(
            default,
            deserialize_with = "crate::timestamp::patch",
            skip_serializing_if = "Patch::is_absent"
        )]
        pub end_date: Patch<DateTime<Utc>>,
        #[serde(default, skip_serializing_if = "Patch::is_absent")]
        pub is_active: Patch<bool>,
    }

    /// Filters for `GET /events`; every field is optional and they combine
    /// with AND.
    #[derive(Clone, Debug, Default, Serialize, Deserialize)]
    pub struct EventQuery {
        pub skip: Option<u64>,
        pub limit: Option<u64>,
        /// Case-insensitive substring.
        pub title: Option<String>,
        /// Case-insensitive substring.
        pub location: Option<String>,
        /// Events starting at or after this instant.
        #[serde(default, deserialize_with = "crate::timestamp::optional")]
        pub start_date: Option<DateTime<Utc>>,
        pub is_active: Option<bool>,
    }

    impl EventQuery {
        pub fn page(&self) -> Page {
            Page {
                skip: self.skip,
                limit: self.limit,
            }
        }
    }

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct EventView {
        pub id: i32,
        pub title: String,
        pub description: Option<String>,
        pub location: String,
        pub start_date: DateTime<Utc>,
        pub end_date: DateTime<Utc>,
        pub is_active: bool,
        pub organizer_id: i32,
        pub created_at: DateTime<Utc>,
        pub updated_at: DateTime<Utc>,
    }

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct EventDetailView {
        #[serde(flatten)]
        pub event: EventView,
        pub attendees: Vec<AttendeeView>,
    }

    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct AttendeeNew {
        pub user_id: i32,
        /// Defaults to `false`.
        #[serde(default)]
        pub attended: Option<bool>,
    }

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct AttendeeView {
        pub id: i32,
        pub event_id: i32,
        pub user_id: i32,
        pub registration_date: DateTime<Utc>,
        pub attended: bool,
    }
}
