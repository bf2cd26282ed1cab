use std::{future::Future, sync::Arc};

use axum::{
    Json, Router,
    routing::{delete, get},
};
use serde::Serialize;
use tokio::signal;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{categories, events, expenses, users};
use engine::Engine;

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
}

#[derive(Serialize)]
struct Welcome {
    message: &'static str,
}

async fn root() -> Json<Welcome> {
    Json(Welcome {
        message: "Welcome to the Atrium API",
    })
}

/// Every route of the API, with request tracing and permissive CORS.
pub fn router(state: ServerState) -> Router {
    Router::new()
        .route("/", get(root))
        .route(
            "/categories",
            get(categories::list).post(categories::create),
        )
        .route(
            "/categories/{id}",
            get(categories::get).delete(categories::remove),
        )
        .route("/expenses", get(expenses::list).post(expenses::create))
        .route(
            "/expenses/{id}",
            get(expenses::get)
                .put(expenses::update)
                .patch(expenses::update)
                .delete(expenses::remove),
        )
        .route("/users", get(users::list).post(users::create))
        .route(
            "/users/{id}",
            get(users::get)
                .put(users::update)
                .patch(users::update)
                .delete(users::remove),
        )
        .route("/users/{id}/events", get(users::events))
        .route("/events", get(events::list).post(events::create))
        .route(
            "/events/{id}",
            get(events::get)
                .put(events::update)
                .patch(events::update)
                .delete(events::remove),
        )
        .route(
            "/events/{id}/attendees",
            get(events::list_attendees).post(events::add_attendee),
        )
        .route(
            "/events/{id}/attendees/{user_id}",
            delete(events::remove_attendee),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Serve until `shutdown` resolves, then drain in-flight requests.
pub async fn run_with_listener<F>(
    engine: Arc<Engine>,
    listener: tokio::net::TcpListener,
    shutdown: F,
) -> Result<(), std::io::Error>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    let state = ServerState { engine };

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await
}

pub fn spawn_with_listener(
    engine: Arc<Engine>,
    listener: tokio::net::TcpListener,
) -> Result<std::net::SocketAddr, std::io::Error> {
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(err) = run_with_listener(engine, listener, std::future::pending()).await {
            tracing::error!("server failed: {err}");
        }
    });

    Ok(addr)
}

/// Resolves on Ctrl+C, or SIGTERM on unix.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {err}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut term) => {
                term.recv().await;
            }
            Err(err) => {
                tracing::error!("failed to install SIGTERM handler: {err}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("shutdown signal received");
}
