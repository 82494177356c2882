use sea_orm::DatabaseConnection;

mod accounts;
mod requests;

pub use accounts::{NewProvider, NewUser};
pub use requests::{AvailableRequest, DEFAULT_JOB_COST_MINOR, HistoryEntry};

use crate::{EngineError, ResultEngine};

/// Run a block inside a DB transaction, committing on success and rolling back on error.
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
}

impl Engine {
    pub fn new(database: DatabaseConnection) -> Self {
        Self { database }
    }
}

fn require_field(value: &str, field: &str) -> ResultEngine<()> {
    if value.trim().is_empty() {
        return Err(EngineError::MissingField(field.to_string()));
    }
    Ok(())
}
