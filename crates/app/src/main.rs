use std::sync::Arc;

use migration::{Migrator, MigratorTrait};

mod settings;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let settings = settings::Settings::new()?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "atrium={level},server={level},engine={level},tower_http={level}",
            level = settings.app.level
        ))
        .init();

    let config = settings.server;
    let db = match connect(&config.database).await {
        Ok(db) => db,
        Err(err) => {
            tracing::error!("failed to initialize database: {err}");
            return Err(err);
        }
    };

    let engine = engine::Engine::builder().database(db).build().await?;
    if config.seed_categories {
        engine.seed_default_categories().await?;
    }
    let engine = Arc::new(engine);

    let bind = config.bind.unwrap_or_else(|| "127.0.0.1".to_string());
    let addr = format!("{}:{}", bind, config.port);
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!("failed to bind server listener on {addr}: {err}");
            return Err(err.into());
        }
    };

    if let Err(err) =
        server::run_with_listener(engine.clone(), listener, server::shutdown_signal()).await
    {
        tracing::error!("server failed: {err}");
    }

    if let Some(engine) = Arc::into_inner(engine) {
        engine.close().await?;
    }
    tracing::info!("bye");
    Ok(())
}

async fn connect(
    database: &settings::Database,
) -> Result<sea_orm::DatabaseConnection, Box<dyn std::error::Error + Send + Sync>> {
    let database = sea_orm::Database::connect(database.url()).await?;
    Migrator::up(&database, None).await?;
    tracing::info!("database ready");
    Ok(database)
}
