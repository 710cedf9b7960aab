//! Application state management

use crate::corpus::CorpusRegistry;
use crate::store::{FulltextStore, DEFAULT_CACHE_CAPACITY};
use anyhow::Result;
use chrono::{DateTime, Utc};
use std::path::PathBuf;
use std::sync::Arc;

/// Application state holding the corpus registry and the fulltext store
pub struct AppState {
    pub registry: CorpusRegistry,
    pub store: Arc<FulltextStore>,
    pub data_dir: PathBuf,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    /// Initialize application state from a data directory laid out as
    /// `corpora/*.json` (registration records) plus `fulltext.db` (tokens).
    pub fn new(data_dir: PathBuf) -> Result<Self> {
        let corpora_dir = data_dir.join("corpora");
        let db_path = data_dir.join("fulltext.db");

        let registry = CorpusRegistry::load_dir(&corpora_dir)?;
        FulltextStore::init_db(&db_path)?;
        let store = Arc::new(FulltextStore::open(db_path, DEFAULT_CACHE_CAPACITY));

        Ok(Self {
            registry,
            store,
            data_dir,
            started_at: Utc::now(),
        })
    }

    pub fn uptime_seconds(&self) -> i64 {
        (Utc::now() - self.started_at).num_seconds()
    }
}
