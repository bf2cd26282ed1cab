use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::IntoResponse,
};
use engine::{EngineError, Violation};

use serde::Serialize;
pub use server::{ServerState, router, run_with_listener, shutdown_signal, spawn_with_listener};

mod categories;
mod events;
mod expenses;
mod extract;
mod server;
mod users;

pub mod types {
    pub mod category {
        pub use api_types::category::{CategoriesSeeded, CategoryNew, CategoryView};
    }

    pub mod expense {
        pub use api_types::expense::{ExpenseNew, ExpenseQuery, ExpenseUpdate, ExpenseView};
    }

    pub mod user {
        pub use api_types::user::{UserNew, UserUpdate, UserView, UserWithEventsView};
    }

    pub mod event {
        pub use api_types::event::{
            AttendeeNew, AttendeeView, EventDetailView, EventNew, EventQuery, EventUpdate,
            EventView,
        };
    }
}

pub enum ServerError {
    Engine(EngineError),
    /// The request never reached the engine: malformed path, query or body.
    Rejected { status: StatusCode, error: String },
}

#[derive(Serialize)]
struct Error {
    error: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    violations: Vec<Violation>,
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::NotFound(_) => StatusCode::NOT_FOUND,
        EngineError::Conflict { .. } => StatusCode::CONFLICT,
        EngineError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        EngineError::Hashing(_) | EngineError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn body_for_engine_error(err: EngineError) -> Error {
    match err {
        EngineError::Validation(errors) => Error {
            error: "validation failed".to_string(),
            violations: errors.violations().to_vec(),
        },
        EngineError::Database(db_err) => {
            tracing::error!("database error: {db_err}");
            Error {
                error: "internal server error".to_string(),
                violations: Vec::new(),
            }
        }
        EngineError::Hashing(reason) => {
            tracing::error!("credential hashing failed: {reason}");
            Error {
                error: "internal server error".to_string(),
                violations: Vec::new(),
            }
        }
        other => Error {
            error: other.to_string(),
            violations: Vec::new(),
        },
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, body) = match self {
            ServerError::Engine(err) => (status_for_engine_error(&err), body_for_engine_error(err)),
            ServerError::Rejected { status, error } => (
                status,
                Error {
                    error,
                    violations: Vec::new(),
                },
            ),
        };

        (status, Json(body)).into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}

// Axum picks the status: 400 for unparsable input, 415 for a missing
// content type, 422 for a body that parses but does not fit the type.
impl From<JsonRejection> for ServerError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Rejected {
            status: rejection.status(),
            error: rejection.body_text(),
        }
    }
}

impl From<QueryRejection> for ServerError {
    fn from(rejection: QueryRejection) -> Self {
        Self::Rejected {
            status: rejection.status(),
            error: rejection.body_text(),
        }
    }
}

impl From<PathRejection> for ServerError {
    fn from(rejection: PathRejection) -> Self {
        Self::Rejected {
            status: rejection.status(),
            error: rejection.body_text(),
        }
    }
}
