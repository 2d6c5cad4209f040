//! SurrealDB-backed CaseStore implementation
//!
//! Stores each `CaseEntry` as one row of the `cases` table and performs the
//! similarity match server-side.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use surrealdb::engine::any::Any;
use surrealdb::opt::auth::{Database, Root};
use surrealdb::Surreal;
use tracing::{debug, info, instrument};

use crate::error::{StateError, StorageError};
use crate::migrations;
use crate::records::{CaseEntry, CaseKey, OutputRecord, SimilarityTolerance};
use crate::storage_traits::{CaseStore, StorageResult};

/// Serialize chrono datetimes as native SurrealDB datetimes so that
/// `ORDER BY recorded_at` sorts chronologically. Rows sharing a timestamp
/// fall back to `case_id` order.
mod surreal_datetime {
    use chrono::{DateTime, Utc};
    use serde::{self, Deserialize, Deserializer, Serializer};
    use surrealdb::sql::Datetime as SurrealDatetime;

    pub fn serialize<S>(date: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let sd = SurrealDatetime::from(*date);
        serde::Serialize::serialize(&sd, serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let sd = SurrealDatetime::deserialize(deserializer)?;
        Ok(DateTime::from(sd))
    }
}

const NAMESPACE: &str = "aircon";
const DATABASE: &str = "cases";

const CASE_COLUMNS: &str = "case_id, recorded_at, hour, case_key, decision";

/// Configuration for a remote SurrealDB connection
#[derive(Debug, Clone)]
pub struct CloudConfig {
    /// WebSocket endpoint URL (e.g., "wss://xxx.aws-use1.surrealdb.cloud")
    pub endpoint: String,
    pub username: String,
    pub password: String,
    /// Namespace (default: "aircon")
    pub namespace: String,
    /// Database name (default: "cases")
    pub database: String,
    /// Whether this is a root user (true) or database user (false)
    pub is_root: bool,
}

impl CloudConfig {
    /// Create from environment variables
    ///
    /// Reads:
    /// - SURREALDB_ENDPOINT (required)
    /// - SURREALDB_USERNAME (required)
    /// - SURREALDB_PASSWORD (required)
    /// - SURREALDB_NAMESPACE (optional, default: "aircon")
    /// - SURREALDB_DATABASE (optional, default: "cases")
    /// - SURREALDB_ROOT (optional, default: "false")
    pub fn from_env() -> std::result::Result<Self, String> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an injectable lookup.
    pub fn from_lookup<F>(lookup: F) -> std::result::Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &str| lookup(name).ok_or_else(|| format!("{name} not set"));
        let endpoint = required("SURREALDB_ENDPOINT")?;
        let username = required("SURREALDB_USERNAME")?;
        let password = required("SURREALDB_PASSWORD")?;
        let namespace = lookup("SURREALDB_NAMESPACE").unwrap_or_else(|| NAMESPACE.to_string());
        let database = lookup("SURREALDB_DATABASE").unwrap_or_else(|| DATABASE.to_string());
        let is_root = lookup("SURREALDB_ROOT")
            .map(|v| v.eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        Ok(Self {
            endpoint,
            username,
            password,
            namespace,
            database,
            is_root,
        })
    }
}

/// Row shape of the `cases` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct CaseRow {
    case_id: String,
    #[serde(with = "surreal_datetime")]
    recorded_at: DateTime<Utc>,
    hour: u8,
    case_key: CaseKey,
    decision: OutputRecord,
}

impl From<&CaseEntry> for CaseRow {
    fn from(entry: &CaseEntry) -> Self {
        CaseRow {
            case_id: entry.id.clone(),
            recorded_at: entry.recorded_at,
            hour: entry.key.timing.hour(),
            case_key: entry.key.clone(),
            decision: entry.output.clone(),
        }
    }
}

impl From<CaseRow> for CaseEntry {
    fn from(row: CaseRow) -> Self {
        CaseEntry {
            id: row.case_id,
            recorded_at: row.recorded_at,
            key: row.case_key,
            output: row.decision,
        }
    }
}

/// SurrealDB-backed implementation of [`CaseStore`].
pub struct SurrealCaseStore {
    db: Surreal<Any>,
}

impl SurrealCaseStore {
    /// Create an in-memory instance for testing.
    #[instrument]
    pub async fn in_memory() -> crate::Result<Self> {
        let store = Self::connect("mem://").await?;
        info!("SurrealCaseStore connected (in-memory)");
        Ok(store)
    }

    /// Connect to any SurrealDB endpoint URL without authentication
    /// (`mem://`, `surrealkv://path`, `ws://host:port`).
    pub async fn connect(url: &str) -> crate::Result<Self> {
        let db = surrealdb::engine::any::connect(url)
            .await
            .map_err(|e| StateError::Connection(format!("Failed to connect to {url}: {e}")))?;

        db.use_ns(NAMESPACE)
            .use_db(DATABASE)
            .await
            .map_err(|e| StateError::Connection(e.to_string()))?;

        migrations::init_schema(&db).await?;
        Ok(Self { db })
    }

    /// Connect to a remote instance with credentials.
    #[instrument(skip(config), fields(endpoint = %config.endpoint, namespace = %config.namespace))]
    pub async fn connect_cloud(config: CloudConfig) -> crate::Result<Self> {
        let db = surrealdb::engine::any::connect(&config.endpoint)
            .await
            .map_err(|e| {
                StateError::Connection(format!("Failed to connect to {}: {}", config.endpoint, e))
            })?;

        if config.is_root {
            db.signin(Root {
                username: &config.username,
                password: &config.password,
            })
            .await
            .map_err(|e| StateError::Connection(format!("Root auth failed: {e}")))?;
        } else {
            db.signin(Database {
                namespace: &config.namespace,
                database: &config.database,
                username: &config.username,
                password: &config.password,
            })
            .await
            .map_err(|e| StateError::Connection(format!("DB auth failed: {e}")))?;
        }

        db.use_ns(&config.namespace)
            .use_db(&config.database)
            .await
            .map_err(|e| StateError::Connection(e.to_string()))?;

        migrations::init_schema(&db).await?;
        info!("SurrealCaseStore connected (cloud)");
        Ok(Self { db })
    }

    /// Create from environment variables.
    ///
    /// Tries, in order: [`CloudConfig::from_env`], `SURREALDB_URL`, then local
    /// persistence under `.aircon/db`.
    pub async fn from_env() -> crate::Result<Self> {
        if let Ok(config) = CloudConfig::from_env() {
            return Self::connect_cloud(config).await;
        }

        if let Ok(url) = std::env::var("SURREALDB_URL") {
            let store = Self::connect(&url).await?;
            info!("SurrealCaseStore connected ({})", url);
            return Ok(store);
        }

        let path = ".aircon/db";
        std::fs::create_dir_all(path).map_err(|source| StateError::Io {
            path: path.into(),
            source,
        })?;
        let url = format!("surrealkv://{path}");
        info!("No cloud config or SURREALDB_URL found, using local persistence: {url}");
        Self::connect(&url).await
    }

    fn backend(e: surrealdb::Error) -> StorageError {
        StorageError::Backend(e.to_string())
    }
}

#[async_trait]
impl CaseStore for SurrealCaseStore {
    async fn load_all(&self) -> StorageResult<Vec<CaseEntry>> {
        let mut res = self
            .db
            .query(format!(
                "SELECT {CASE_COLUMNS} FROM cases ORDER BY recorded_at ASC, case_id ASC"
            ))
            .await
            .map_err(Self::backend)?;

        let rows: Vec<CaseRow> = res.take(0).map_err(Self::backend)?;
        Ok(rows.into_iter().map(CaseEntry::from).collect())
    }

    async fn append(&self, entry: &CaseEntry) -> StorageResult<()> {
        debug!(case_id = %entry.id, "appending case");

        let _created: Option<CaseRow> = self
            .db
            .create("cases")
            .content(CaseRow::from(entry))
            .await
            .map_err(Self::backend)?;

        Ok(())
    }

    async fn query_similar(
        &self,
        probe: &CaseKey,
        tolerance: &SimilarityTolerance,
    ) -> StorageResult<Option<CaseEntry>> {
        let mut res = self
            .db
            .query(format!(
                "SELECT {CASE_COLUMNS} FROM cases \
                 WHERE math::abs(case_key.room_temp - $room_temp) <= $temp_tol \
                 AND math::abs(case_key.humidity - $humidity) <= $humidity_tol \
                 AND case_key.num_people = $num_people \
                 AND case_key.movement = $movement \
                 AND hour = $hour \
                 ORDER BY recorded_at ASC, case_id ASC LIMIT 1"
            ))
            .bind(("room_temp", probe.room_temp))
            .bind(("temp_tol", tolerance.room_temp))
            .bind(("humidity", probe.humidity))
            .bind(("humidity_tol", tolerance.humidity))
            .bind(("num_people", probe.num_people))
            .bind(("movement", probe.movement.to_string()))
            .bind(("hour", probe.timing.hour()))
            .await
            .map_err(Self::backend)?;

        let rows: Vec<CaseRow> = res.take(0).map_err(Self::backend)?;
        Ok(rows.into_iter().next().map(CaseEntry::from))
    }

    async fn len(&self) -> StorageResult<usize> {
        #[derive(Deserialize)]
        struct Count {
            count: usize,
        }

        let mut res = self
            .db
            .query("SELECT count() FROM cases GROUP ALL")
            .await
            .map_err(Self::backend)?;
        let rows: Vec<Count> = res.take(0).map_err(Self::backend)?;
        Ok(rows.first().map(|c| c.count).unwrap_or(0))
    }
}
