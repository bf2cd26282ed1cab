pub use sea_orm_migration::prelude::*;

mod m20250612_090000_expense_tracker;
mod m20250612_100000_event_management;

/// Database used by the migration and admin binaries when `DATABASE_URL` is unset.
pub const DEFAULT_DATABASE_URL: &str = "sqlite:./atrium.db?mode=rwc";

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250612_090000_expense_tracker::Migration),
            Box::new(m20250612_100000_event_management::Migration),
        ]
    }
}
