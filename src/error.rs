//! Error types for Murre

use thiserror::Error;

#[derive(Error, Debug)]
pub enum MurreError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid corpus: {0}")]
    InvalidCorpus(String),

    #[error("{0}")]
    Other(String),
}

impl serde::Serialize for MurreError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}
