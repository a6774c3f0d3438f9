//! Database-specific error types and conversions.

use wedplan_core::error::WedplanError;

/// Database-layer error type.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("SurrealDB error: {0}")]
    Surreal(#[from] surrealdb::Error),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Corrupt row: {0}")]
    Decode(String),

    #[error("Record not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },
}

impl From<DbError> for WedplanError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => WedplanError::NotFound { entity, id },
            other => WedplanError::Database(other.to_string()),
        }
    }
}
