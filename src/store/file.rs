//! File-backed activation store with atomic writes.
//!
//! Activation state lives in `dirs::config_dir()/<namespace>/settings.json`,
//! alongside whatever other settings the application keeps there.
//! Uses temp file + rename for atomic writes.

use crate::store::record::ActivationRecord;
use crate::store::ActivationStore;
use crate::GateError;
use serde_json::{Map, Value};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

/// File name of the settings document.
pub const SETTINGS_FILE: &str = "settings.json";

/// Activation store backed by a JSON settings file.
#[derive(Debug, Clone)]
pub struct FileStore {
    /// Settings document path.
    path: PathBuf,
}

impl FileStore {
    /// Create a file store for the given namespace.
    ///
    /// The settings file is `dirs::config_dir()/<namespace>/settings.json`.
    pub fn new(namespace: &str) -> Result<Self, GateError> {
        let base_dir = dirs::config_dir()
            .ok_or_else(|| GateError::StoreIO("Could not find config directory".to_string()))?;

        Ok(Self {
            path: base_dir.join(namespace).join(SETTINGS_FILE),
        })
    }

    /// Create a file store at a specific settings file path.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the settings document.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| SETTINGS_FILE.into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    /// Read the whole settings document. A missing file is an empty document.
    fn read_document(&self) -> Result<Map<String, Value>, GateError> {
        if !self.path.exists() {
            return Ok(Map::new());
        }

        let text = fs::read_to_string(&self.path)
            .map_err(|e| GateError::StoreIO(format!("Failed to read settings: {}", e)))?;

        if text.trim().is_empty() {
            return Ok(Map::new());
        }

        match serde_json::from_str(&text) {
            Ok(Value::Object(doc)) => Ok(doc),
            Ok(_) => Err(GateError::StoreCorrupt(
                "settings document is not a JSON object".to_string(),
            )),
            Err(e) => Err(GateError::StoreCorrupt(format!(
                "Failed to parse settings: {}",
                e
            ))),
        }
    }

    /// Write the whole settings document atomically.
    fn write_document(&self, doc: &Map<String, Value>) -> Result<(), GateError> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)
                .map_err(|e| GateError::StoreIO(format!("Failed to create settings dir: {}", e)))?;
        }

        let json = serde_json::to_string_pretty(doc)
            .map_err(|e| GateError::StoreIO(format!("Failed to serialize settings: {}", e)))?;

        let temp_path = self.temp_path();

        // Write to temp file and flush it to disk
        let mut file = File::create(&temp_path)
            .map_err(|e| GateError::StoreIO(format!("Failed to create temp file: {}", e)))?;
        file.write_all(json.as_bytes())
            .and_then(|_| file.sync_all())
            .map_err(|e| GateError::StoreIO(format!("Failed to write temp file: {}", e)))?;

        // Atomic rename
        fs::rename(&temp_path, &self.path)
            .map_err(|e| GateError::StoreIO(format!("Failed to rename settings file: {}", e)))?;

        Ok(())
    }
}

impl ActivationStore for FileStore {
    fn load(&self) -> Result<ActivationRecord, GateError> {
        let doc = self.read_document()?;
        let record = ActivationRecord::from_document(&doc)?;
        debug!(
            path = %self.path.display(),
            has_key = record.license_key.is_some(),
            installation_date = ?record.installation_date,
            "loaded activation record"
        );
        Ok(record)
    }

    fn save(&self, record: &ActivationRecord) -> Result<(), GateError> {
        // Read-modify-write so unrelated settings survive
        let mut doc = self.read_document()?;
        record.write_into(&mut doc);
        self.write_document(&doc)?;
        debug!(path = %self.path.display(), "saved activation record");
        Ok(())
    }
}
