//! Case memory: reuse a past decision when today's conditions look the same.
//!
//! Lookups scan the log oldest first and the first similar case wins. Misses
//! are computed by the engine and appended. The store is never allowed to
//! block a recommendation: load failures count as an empty log and append
//! failures are logged and swallowed.

use std::future::Future;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use aircon_state::{
    CaseEntry, CaseKey, CaseStore, OutputRecord, SimilarityTolerance, StorageError, StorageResult,
};
use serde::{Deserialize, Serialize};
use tracing::{instrument, warn};

use crate::domain::{InputRecord, Result};
use crate::engine::{self, DecisionTrace};
use crate::metrics::METRICS;
use crate::obs;

/// Configuration for the case memory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseMemoryConfig {
    /// Consult and extend the log; when false every request is computed
    pub enabled: bool,
    /// Similarity bounds for room temperature and humidity
    pub tolerance: SimilarityTolerance,
    /// Deadline for each store call; `None` waits indefinitely
    pub store_timeout_ms: Option<u64>,
    /// Append computed decisions to the log
    pub persist_misses: bool,
}

impl Default for CaseMemoryConfig {
    fn default() -> Self {
        CaseMemoryConfig {
            enabled: true,
            tolerance: SimilarityTolerance::default(),
            store_timeout_ms: None,
            persist_misses: true,
        }
    }
}

impl CaseMemoryConfig {
    /// Read overrides from `AIRCON_*` environment variables.
    ///
    /// - `AIRCON_CACHE_ENABLED`
    /// - `AIRCON_TEMP_TOLERANCE`
    /// - `AIRCON_HUMIDITY_TOLERANCE`
    /// - `AIRCON_STORE_TIMEOUT_MS`
    /// - `AIRCON_PERSIST_MISSES`
    ///
    /// Unparseable values are logged and ignored.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an injectable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(v) = parse_var(&lookup, "AIRCON_CACHE_ENABLED") {
            config.enabled = v;
        }
        if let Some(v) = parse_var::<f64, _>(&lookup, "AIRCON_TEMP_TOLERANCE") {
            config.tolerance.room_temp = v;
        }
        if let Some(v) = parse_var::<f64, _>(&lookup, "AIRCON_HUMIDITY_TOLERANCE") {
            config.tolerance.humidity = v;
        }
        if let Some(v) = parse_var(&lookup, "AIRCON_STORE_TIMEOUT_MS") {
            config.store_timeout_ms = Some(v);
        }
        if let Some(v) = parse_var(&lookup, "AIRCON_PERSIST_MISSES") {
            config.persist_misses = v;
        }
        config
    }
}

fn parse_var<T, F>(lookup: &F, name: &str) -> Option<T>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    let raw = lookup(name)?;
    match raw.trim().parse() {
        Ok(v) => Some(v),
        Err(_) => {
            warn!(var = name, value = %raw, "ignoring unparseable environment override");
            None
        }
    }
}

/// Where a decision came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum DecisionSource {
    /// Replayed from a stored case
    Cache { case_id: String },
    /// Computed by the engine. `case_id` is the id of the new log entry;
    /// `persisted` is false when the append failed or persistence is off
    Computed { case_id: String, persisted: bool },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionOutcome {
    pub output: OutputRecord,
    #[serde(flatten)]
    pub source: DecisionSource,
    /// Engine intermediates, present only when this request ran the cascade
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace: Option<DecisionTrace>,
}

impl DecisionOutcome {
    pub fn is_cache_hit(&self) -> bool {
        matches!(self.source, DecisionSource::Cache { .. })
    }
}

/// Engine front end backed by a case log.
pub struct CaseMemory {
    store: Arc<dyn CaseStore>,
    config: CaseMemoryConfig,
}

impl CaseMemory {
    pub fn new(store: Arc<dyn CaseStore>, config: CaseMemoryConfig) -> Self {
        CaseMemory { store, config }
    }

    pub fn with_default_config(store: Arc<dyn CaseStore>) -> Self {
        Self::new(store, CaseMemoryConfig::default())
    }

    pub fn config(&self) -> &CaseMemoryConfig {
        &self.config
    }

    /// Recommendation for `input`, from the log when a similar case exists.
    pub async fn decide(&self, input: &InputRecord) -> Result<OutputRecord> {
        self.decide_with_outcome(input).await.map(|o| o.output)
    }

    /// Like [`decide`](Self::decide), also reporting whether the log answered.
    ///
    /// Invalid input fails before the store is touched.
    #[instrument(skip_all, fields(hour = input.timing.hour(), num_people = input.num_people))]
    pub async fn decide_with_outcome(&self, input: &InputRecord) -> Result<DecisionOutcome> {
        input.validate()?;
        let key = input.case_key();

        if self.config.enabled {
            if let Some(hit) = self.find_similar(&key).await {
                METRICS.inc_cache_hits();
                obs::emit_cache_hit(&hit.id, hit.key.room_temp, hit.key.humidity);
                return Ok(DecisionOutcome {
                    output: hit.output,
                    source: DecisionSource::Cache { case_id: hit.id },
                    trace: None,
                });
            }
        }

        let (output, trace) = engine::compute_with_trace(input)?;
        METRICS.inc_cache_misses();
        obs::emit_cache_miss(
            input.room_temp,
            input.humidity,
            input.num_people,
            input.timing.hour(),
        );

        let entry = CaseEntry::new(key, output.clone());
        let persisted = if self.config.enabled && self.config.persist_misses {
            self.persist(&entry).await
        } else {
            false
        };

        Ok(DecisionOutcome {
            output,
            source: DecisionSource::Computed {
                case_id: entry.id,
                persisted,
            },
            trace: Some(trace),
        })
    }

    /// First stored case similar to `key`, or `None`.
    ///
    /// A store that cannot be read behaves like an empty one.
    pub async fn find_similar(&self, key: &CaseKey) -> Option<CaseEntry> {
        match self
            .guarded(self.store.query_similar(key, &self.config.tolerance))
            .await
        {
            Ok(found) => found,
            Err(e) => {
                METRICS.inc_load_failures();
                obs::emit_store_degraded("load", &e);
                None
            }
        }
    }

    /// The full case log, oldest first.
    pub async fn history(&self) -> Result<Vec<CaseEntry>> {
        Ok(self.guarded(self.store.load_all()).await?)
    }

    async fn persist(&self, entry: &CaseEntry) -> bool {
        match self.guarded(self.store.append(entry)).await {
            Ok(()) => {
                obs::emit_case_persisted(&entry.id);
                true
            }
            Err(e) => {
                METRICS.inc_persist_failures();
                obs::emit_store_degraded("append", &e);
                false
            }
        }
    }

    async fn guarded<T, F>(&self, op: F) -> StorageResult<T>
    where
        F: Future<Output = StorageResult<T>>,
    {
        match self.config.store_timeout_ms {
            Some(timeout_ms) => tokio::time::timeout(Duration::from_millis(timeout_ms), op)
                .await
                .map_err(|_| StorageError::Timeout { timeout_ms })?,
            None => op.await,
        }
    }
}
