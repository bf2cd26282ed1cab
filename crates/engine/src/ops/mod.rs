use std::sync::Arc;

use sea_orm::{ActiveValue, DatabaseConnection, Value};

use crate::{Argon2Hasher, CredentialHasher, Patch, ResultEngine};

mod attendees;
mod categories;
mod events;
mod expenses;
mod users;

pub use categories::DEFAULT_CATEGORIES;

/// Run a block inside a DB transaction, committing on success and rolling back on error.
///
/// The block must not `return Ok(..)` early: only the value it evaluates to
/// is committed.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
    hasher: Arc<dyn CredentialHasher>,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    /// Release the store handle. Call once at shutdown.
    pub async fn close(self) -> ResultEngine<()> {
        self.database.close().await?;
        Ok(())
    }
}

/// Copy a supplied value into an active model column; absent fields stay
/// untouched.
fn set_patch<V>(column: &mut ActiveValue<V>, patch: Patch<V>)
where
    V: Into<Value>,
{
    if let Patch::Present(value) = patch {
        *column = ActiveValue::Set(value);
    }
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
    hasher: Option<Arc<dyn CredentialHasher>>,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Replace the default Argon2 password hasher.
    pub fn hasher(mut self, hasher: Arc<dyn CredentialHasher>) -> EngineBuilder {
        self.hasher = Some(hasher);
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        Ok(Engine {
            database: self.database,
            hasher: self.hasher.unwrap_or_else(|| Arc::new(Argon2Hasher)),
        })
    }
}
