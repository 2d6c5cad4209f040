//! SurrealDB schema initialization for the case log

use crate::Result;
use surrealdb::engine::any::Any;
use surrealdb::Surreal;
use tracing::{debug, info};

/// Initialize the `cases` table.
///
/// Safe to call on every connection (idempotent).
pub async fn init_schema(db: &Surreal<Any>) -> Result<()> {
    info!("Initializing aircon SurrealDB schema");
    init_cases_table(db).await?;
    Ok(())
}

/// Initialize `cases` table with constraints and indexes
///
/// Schema:
/// ```text
/// TABLE cases {
///   case_id:     STRING (unique)
///   recorded_at: DATETIME (indexed, insertion order)
///   hour:        INT (timing hour, denormalized for matching)
///   case_key:    OBJECT (room_temp, humidity, num_people, movement, timing)
///   decision:    OBJECT (full decision output)
/// }
/// ```
///
/// Rows are never updated or deleted.
async fn init_cases_table(db: &Surreal<Any>) -> Result<()> {
    debug!("Initializing cases table");

    let sql = r#"
        DEFINE TABLE IF NOT EXISTS cases
            SCHEMALESS
            PERMISSIONS
                FOR select FULL
                FOR create FULL
                FOR update NONE
                FOR delete NONE;

        DEFINE INDEX IF NOT EXISTS idx_case_id ON TABLE cases COLUMNS case_id UNIQUE;

        -- Insertion order for load_all and first-match lookups
        DEFINE INDEX IF NOT EXISTS idx_recorded_at ON TABLE cases COLUMNS recorded_at;

        -- Exact-match part of the similarity test
        DEFINE INDEX IF NOT EXISTS idx_hour_people ON TABLE cases COLUMNS hour, case_key.num_people;
    "#;

    db.query(sql).await?.check()?;
    info!("cases table initialized");
    Ok(())
}
