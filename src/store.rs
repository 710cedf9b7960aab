//! Fulltext page store with LRU caching, loads from SQLite
//!
//! Sentence tokens live in a SQLite database; pages are materialized on
//! demand and shared as `Arc`s through an LRU cache.

use crate::page::{FulltextPage, Word};
use anyhow::{Context, Result};
use lru::LruCache;
use rusqlite::{Connection, OptionalExtension};
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Default page cache capacity (number of sentences)
pub const DEFAULT_CACHE_CAPACITY: usize = 1000;

#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub struct PageKey {
    pub corpus_id: String,
    pub sentence_id: String,
}

impl PageKey {
    pub fn new(corpus_id: impl Into<String>, sentence_id: impl Into<String>) -> Self {
        Self {
            corpus_id: corpus_id.into(),
            sentence_id: sentence_id.into(),
        }
    }
}

pub struct FulltextStore {
    cache: Mutex<LruCache<PageKey, Arc<FulltextPage>>>,
    db_path: PathBuf,
}

impl FulltextStore {
    pub fn open(db_path: impl Into<PathBuf>, capacity: usize) -> Self {
        let cache = LruCache::new(
            NonZeroUsize::new(capacity)
                .unwrap_or_else(|| NonZeroUsize::new(DEFAULT_CACHE_CAPACITY).unwrap()),
        );
        Self {
            cache: Mutex::new(cache),
            db_path: db_path.into(),
        }
    }

    /// Create the token tables if they do not exist yet.
    pub fn init_db(db_path: &Path) -> Result<()> {
        let conn = Connection::open(db_path)
            .with_context(|| format!("Failed to open fulltext db at {:?}", db_path))?;

        conn.execute_batch(
            r#"
            -- One row per rendered sentence
            CREATE TABLE IF NOT EXISTS sentences (
                corpus_id TEXT NOT NULL,
                sentence_id TEXT NOT NULL,
                PRIMARY KEY (corpus_id, sentence_id)
            );

            -- Word tokens, position counts from 1 within the sentence
            CREATE TABLE IF NOT EXISTS sentence_tokens (
                corpus_id TEXT NOT NULL,
                sentence_id TEXT NOT NULL,
                position INTEGER NOT NULL,
                surface TEXT NOT NULL,
                lemma TEXT,
                pos TEXT,
                PRIMARY KEY (corpus_id, sentence_id, position)
            );
            "#,
        )?;

        Ok(())
    }

    /// Fetch a page, serving from cache when possible. Returns `None` for a
    /// sentence the store has never seen.
    pub fn get(&self, key: &PageKey) -> Result<Option<Arc<FulltextPage>>> {
        {
            let mut cache = self.cache.lock().unwrap();
            if let Some(page) = cache.get(key) {
                return Ok(Some(Arc::clone(page)));
            }
        }

        let Some(page) = self.load_page(key)? else {
            return Ok(None);
        };

        let page = Arc::new(page);
        {
            let mut cache = self.cache.lock().unwrap();
            cache.put(key.clone(), Arc::clone(&page));
        }
        Ok(Some(page))
    }

    /// Whether the store knows the sentence at all.
    pub fn contains(&self, key: &PageKey) -> Result<bool> {
        let conn = self.connection()?;
        let exists: Option<i64> = conn
            .query_row(
                "SELECT 1 FROM sentences WHERE corpus_id = ?1 AND sentence_id = ?2",
                rusqlite::params![key.corpus_id, key.sentence_id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(exists.is_some())
    }

    /// Insert a sentence and its tokens, replacing any previous rows.
    pub fn insert_sentence(&self, key: &PageKey, words: &[Word]) -> Result<()> {
        let mut conn = self.connection()?;
        let tx = conn.transaction()?;

        tx.execute(
            "INSERT OR REPLACE INTO sentences (corpus_id, sentence_id) VALUES (?1, ?2)",
            rusqlite::params![key.corpus_id, key.sentence_id],
        )?;
        tx.execute(
            "DELETE FROM sentence_tokens WHERE corpus_id = ?1 AND sentence_id = ?2",
            rusqlite::params![key.corpus_id, key.sentence_id],
        )?;

        for (i, word) in words.iter().enumerate() {
            tx.execute(
                "INSERT INTO sentence_tokens (corpus_id, sentence_id, position, surface, lemma, pos)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                rusqlite::params![
                    key.corpus_id,
                    key.sentence_id,
                    (i + 1) as i64,
                    word.surface,
                    word.lemma,
                    word.pos
                ],
            )?;
        }

        tx.commit()?;

        // The cached rendering is stale now
        self.cache.lock().unwrap().pop(key);
        Ok(())
    }

    pub fn clear(&self) {
        self.cache.lock().unwrap().clear();
    }

    pub fn stats(&self) -> (usize, usize) {
        let cache = self.cache.lock().unwrap();
        (cache.len(), cache.cap().get())
    }

    fn connection(&self) -> Result<Connection> {
        Connection::open(&self.db_path)
            .with_context(|| format!("Failed to open fulltext db at {:?}", self.db_path))
    }

    fn load_page(&self, key: &PageKey) -> Result<Option<FulltextPage>> {
        let conn = self.connection()?;

        let known: Option<i64> = conn
            .query_row(
                "SELECT 1 FROM sentences WHERE corpus_id = ?1 AND sentence_id = ?2",
                rusqlite::params![key.corpus_id, key.sentence_id],
                |row| row.get(0),
            )
            .optional()?;
        if known.is_none() {
            return Ok(None);
        }

        let mut stmt = conn.prepare(
            "SELECT surface, lemma, pos FROM sentence_tokens
             WHERE corpus_id = ?1 AND sentence_id = ?2
             ORDER BY position ASC",
        )?;

        let words: Vec<Word> = stmt
            .query_map(rusqlite::params![key.corpus_id, key.sentence_id], |row| {
                Ok(Word {
                    surface: row.get(0)?,
                    lemma: row.get(1)?,
                    pos: row.get(2)?,
                })
            })?
            .filter_map(|r| r.ok())
            .collect();

        tracing::debug!(
            corpus = %key.corpus_id,
            sentence = %key.sentence_id,
            tokens = words.len(),
            "rendered fulltext page"
        );

        Ok(Some(FulltextPage::new(
            key.corpus_id.clone(),
            key.sentence_id.clone(),
            words,
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_store() -> (tempfile::TempDir, FulltextStore) {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("fulltext.db");
        FulltextStore::init_db(&db_path).unwrap();
        (dir, FulltextStore::open(db_path, 10))
    }

    fn words(surfaces: &[&str]) -> Vec<Word> {
        surfaces.iter().map(|s| Word::new(*s)).collect()
    }

    #[test]
    fn test_round_trip_and_ids() {
        let (_dir, store) = test_store();
        let key = PageKey::new("la_murre", "s42");
        store
            .insert_sentence(&key, &words(&["yksi", "kaksi", "kolme"]))
            .unwrap();

        let page = store.get(&key).unwrap().unwrap();
        assert_eq!(page.len(), 3);
        assert_eq!(page.tokens()[0].id, "s42w1");
        assert_eq!(page.tokens()[2].surface, "kolme");
        assert!(store.contains(&key).unwrap());
    }

    #[test]
    fn test_unknown_sentence_is_none() {
        let (_dir, store) = test_store();
        let key = PageKey::new("la_murre", "s999");
        assert!(store.get(&key).unwrap().is_none());
        assert!(!store.contains(&key).unwrap());
    }

    #[test]
    fn test_cache_serves_same_arc() {
        let (_dir, store) = test_store();
        let key = PageKey::new("la_murre", "s1");
        store.insert_sentence(&key, &words(&["sana"])).unwrap();

        let first = store.get(&key).unwrap().unwrap();
        let second = store.get(&key).unwrap().unwrap();
        assert!(Arc::ptr_eq(&first, &second));

        let (len, cap) = store.stats();
        assert_eq!(len, 1);
        assert_eq!(cap, 10);

        store.clear();
        assert_eq!(store.stats().0, 0);
    }

    #[test]
    fn test_insert_replaces_and_invalidates() {
        let (_dir, store) = test_store();
        let key = PageKey::new("la_murre", "s7");
        store.insert_sentence(&key, &words(&["vanha"])).unwrap();
        let _ = store.get(&key).unwrap();

        store
            .insert_sentence(&key, &words(&["uusi", "lause"]))
            .unwrap();
        let page = store.get(&key).unwrap().unwrap();
        assert_eq!(page.len(), 2);
        assert_eq!(page.tokens()[0].surface, "uusi");
    }
}
