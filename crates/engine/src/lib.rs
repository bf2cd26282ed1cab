//! Operation layer for the expense tracker and the event management API.
//!
//! [`Engine`] owns the store handle and exposes one async method per
//! operation. Every write (and every read that needs more than one query)
//! runs inside a single database transaction.

pub use api_types::{Page, Patch};
pub use categories::Category;
pub use credentials::{Argon2Hasher, CredentialHasher};
pub use error::EngineError;
pub use event_attendees::Attendee;
pub use events::{Event, EventDetail};
pub use expenses::Expense;
pub use ops::{DEFAULT_CATEGORIES, Engine, EngineBuilder};
pub use users::{User, UserWithEvents};
pub use validation::{PASSWORD_MIN, Rule, ValidationErrors, Violation};

mod categories;
mod credentials;
mod error;
mod event_attendees;
mod events;
mod expenses;
mod ops;
mod users;
mod validation;

pub type ResultEngine<T> = Result<T, EngineError>;
