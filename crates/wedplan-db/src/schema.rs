//! Schema definitions and migration runner for SurrealDB.
//!
//! All table definitions use SCHEMAFULL mode for data integrity.
//! UUIDs and calendar dates are stored as strings. Enums are stored as
//! strings with ASSERT constraints for validation.

use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::info;

use crate::error::DbError;

// -----------------------------------------------------------------------
// Migration tracking
// -----------------------------------------------------------------------

const MIGRATION_TABLE_DDL: &str = "\
DEFINE TABLE IF NOT EXISTS _migration SCHEMAFULL;
DEFINE FIELD IF NOT EXISTS version ON TABLE _migration TYPE int;
DEFINE FIELD IF NOT EXISTS name ON TABLE _migration TYPE string;
DEFINE FIELD IF NOT EXISTS applied_at ON TABLE _migration TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX IF NOT EXISTS idx_migration_version ON TABLE _migration \
    COLUMNS version UNIQUE;
";

#[derive(Debug, SurrealValue)]
struct MigrationRecord {
    version: u32,
    #[allow(dead_code)]
    name: String,
}

struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

static MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "initial_schema",
    sql: SCHEMA_V1,
}];

// -----------------------------------------------------------------------
// Schema v1: initial table definitions
// -----------------------------------------------------------------------

const SCHEMA_V1: &str = "\
-- =======================================================================
-- Users
-- =======================================================================
DEFINE TABLE user SCHEMAFULL;
DEFINE FIELD name ON TABLE user TYPE string;
DEFINE FIELD email ON TABLE user TYPE string;
DEFINE FIELD password_hash ON TABLE user TYPE string;
DEFINE FIELD role ON TABLE user TYPE string \
    ASSERT $value IN ['client', 'admin'];
DEFINE FIELD created_at ON TABLE user TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_user_email ON TABLE user COLUMNS email UNIQUE;

-- =======================================================================
-- Packages
-- =======================================================================
DEFINE TABLE package SCHEMAFULL;
DEFINE FIELD name ON TABLE package TYPE string;
DEFINE FIELD description ON TABLE package TYPE string DEFAULT '';
DEFINE FIELD price ON TABLE package TYPE int ASSERT $value >= 0;
DEFINE FIELD is_active ON TABLE package TYPE bool DEFAULT true;
DEFINE FIELD created_at ON TABLE package TYPE datetime \
    DEFAULT time::now();

-- =======================================================================
-- Orders
-- =======================================================================
DEFINE TABLE wedding_order SCHEMAFULL;
DEFINE FIELD user_id ON TABLE wedding_order TYPE string;
DEFINE FIELD package_id ON TABLE wedding_order TYPE string;
DEFINE FIELD wedding_date ON TABLE wedding_order TYPE string;
DEFINE FIELD total_price ON TABLE wedding_order TYPE int \
    ASSERT $value > 0;
DEFINE FIELD payment_status ON TABLE wedding_order TYPE string \
    ASSERT $value IN ['Unpaid', 'AwaitingConfirmation', 'Paid'];
DEFINE FIELD order_status ON TABLE wedding_order TYPE string \
    ASSERT $value IN ['Pending', 'Confirmed', 'Done', 'Cancelled'];
DEFINE FIELD payment_proof_url ON TABLE wedding_order \
    TYPE option<string>;
DEFINE FIELD client_paid_amount ON TABLE wedding_order TYPE option<int>;
DEFINE FIELD created_at ON TABLE wedding_order TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE wedding_order TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_order_user ON TABLE wedding_order COLUMNS user_id;
DEFINE INDEX idx_order_date ON TABLE wedding_order COLUMNS wedding_date;

-- =======================================================================
-- Booking claims: record id is the claimed key (user id or date), so
-- a second claim on the same key is rejected by the store.
-- =======================================================================
DEFINE TABLE active_order_claim SCHEMAFULL;
DEFINE FIELD order_id ON TABLE active_order_claim TYPE string;
DEFINE FIELD claimed_at ON TABLE active_order_claim TYPE datetime \
    DEFAULT time::now();

DEFINE TABLE wedding_date_claim SCHEMAFULL;
DEFINE FIELD order_id ON TABLE wedding_date_claim TYPE string;
DEFINE FIELD claimed_at ON TABLE wedding_date_claim TYPE datetime \
    DEFAULT time::now();

-- =======================================================================
-- Preparation tasks
-- =======================================================================
DEFINE TABLE preparation_task SCHEMAFULL;
DEFINE FIELD order_id ON TABLE preparation_task TYPE string;
DEFINE FIELD position ON TABLE preparation_task TYPE int \
    ASSERT $value >= 1;
DEFINE FIELD name ON TABLE preparation_task TYPE string;
DEFINE FIELD is_done ON TABLE preparation_task TYPE bool DEFAULT false;
DEFINE FIELD updated_at ON TABLE preparation_task TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_task_order_position ON TABLE preparation_task \
    COLUMNS order_id, position UNIQUE;
";

// -----------------------------------------------------------------------
// Public API
// -----------------------------------------------------------------------

/// Run all pending migrations against the given SurrealDB client.
///
/// Creates a `_migration` tracking table on first run, then applies
/// each migration whose version exceeds the current maximum.
pub async fn run_migrations<C: Connection>(db: &Surreal<C>) -> Result<(), DbError> {
    db.query(MIGRATION_TABLE_DDL)
        .await?
        .check()
        .map_err(|e| DbError::Migration(e.to_string()))?;

    let mut result = db
        .query("SELECT * FROM _migration ORDER BY version DESC LIMIT 1")
        .await?;
    let records: Vec<MigrationRecord> = result.take(0)?;
    let current_version = records.first().map(|m| m.version).unwrap_or(0);

    for migration in MIGRATIONS {
        if migration.version > current_version {
            info!(
                version = migration.version,
                name = migration.name,
                "Applying migration"
            );
            db.query(migration.sql).await?.check().map_err(|e| {
                DbError::Migration(format!(
                    "Migration v{} '{}' failed: {}",
                    migration.version, migration.name, e,
                ))
            })?;

            db.query(
                "CREATE _migration SET version = $version, \
                 name = $name",
            )
            .bind(("version", migration.version))
            .bind(("name", migration.name))
            .await?
            .check()
            .map_err(|e| {
                DbError::Migration(format!(
                    "Failed to record migration v{}: {}",
                    migration.version, e,
                ))
            })?;

            info!(version = migration.version, "Migration applied");
        }
    }

    Ok(())
}
