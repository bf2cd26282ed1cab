use std::process::ExitCode;

use migration::{DEFAULT_DATABASE_URL, Migrator};
use sea_orm::Database;
use sea_orm_migration::prelude::*;

const USAGE: &str = "usage: migration [up [N] | down [N] | fresh | refresh | reset | status]";

enum Action {
    Up(Option<u32>),
    Down(Option<u32>),
    Fresh,
    Refresh,
    Reset,
    Status,
}

fn parse(mut args: impl Iterator<Item = String>) -> Option<Action> {
    let command = args.next().unwrap_or_else(|| "up".to_string());
    let steps = match args.next() {
        Some(raw) => Some(raw.parse().ok()?),
        None => None,
    };
    let action = match (command.as_str(), steps) {
        ("up", steps) => Action::Up(steps),
        ("down", steps) => Action::Down(steps.or(Some(1))),
        ("fresh", None) => Action::Fresh,
        ("refresh", None) => Action::Refresh,
        ("reset", None) => Action::Reset,
        ("status", None) => Action::Status,
        _ => return None,
    };
    args.next().is_none().then_some(action)
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error + Send + Sync>> {
    let Some(action) = parse(std::env::args().skip(1)) else {
        eprintln!("{USAGE}");
        return Ok(ExitCode::from(2));
    };

    let db_url =
        std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string());
    let db = Database::connect(&db_url).await?;

    match action {
        Action::Up(steps) => Migrator::up(&db, steps).await?,
        Action::Down(steps) => Migrator::down(&db, steps).await?,
        Action::Fresh => Migrator::fresh(&db).await?,
        Action::Refresh => Migrator::refresh(&db).await?,
        Action::Reset => Migrator::reset(&db).await?,
        Action::Status => Migrator::status(&db).await?,
    }

    Ok(ExitCode::SUCCESS)
}
