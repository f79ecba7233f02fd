//! The save collaborator boundary.

use std::path::PathBuf;

use thiserror::Error;
use uuid::{Uuid, Variant};

use crate::record::SavePayload;

#[derive(Error, Debug)]
pub enum SaveError {
    #[error("unauthorized")]
    Unauthorized,

    #[error("rejected: {0}")]
    Rejected(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("encoding error: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Receives the edited annotations. Called from a worker thread.
pub trait SaveClient: Send + Sync {
    fn save(&self, payload: &SavePayload) -> Result<(), SaveError>;
}

/// Writes the payload as pretty-printed JSON.
pub struct JsonFileClient {
    path: PathBuf,
}

impl JsonFileClient {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

impl SaveClient for JsonFileClient {
    fn save(&self, payload: &SavePayload) -> Result<(), SaveError> {
        let data = serde_json::to_string_pretty(payload)?;
        std::fs::write(&self.path, data)?;
        tracing::info!(path = %self.path.display(), "annotations written");
        Ok(())
    }
}

/// Hyphenated 8-4-4-4-12 hex with version nibble 4 and variant nibble 8, 9, a or b.
pub fn is_valid_file_id(file_id: &str) -> bool {
    if file_id.len() != 36 {
        return false;
    }
    match Uuid::try_parse(file_id) {
        Ok(uuid) => uuid.get_version_num() == 4 && uuid.get_variant() == Variant::RFC4122,
        Err(_) => false,
    }
}
