//! On-disk JSON document backing the record store.

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::domain::{FrequentRoute, TravelRecord};

use super::error::StoreError;

/// Everything the store persists.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreDocument {
    #[serde(default)]
    pub travel_records: Vec<TravelRecord>,
    #[serde(default)]
    pub frequent_routes: Vec<FrequentRoute>,
}

/// The data file.
#[derive(Debug, Clone)]
pub struct StoreFile {
    path: PathBuf,
}

impl StoreFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the document.
    ///
    /// A missing file is an empty document. A file that cannot be read or
    /// parsed is logged and treated as empty, and each collection is read
    /// on its own so a corrupt one does not discard the other.
    pub fn load(&self) -> StoreDocument {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = %self.path.display(), "no data file yet, starting empty");
                return StoreDocument::default();
            }
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "could not read data file");
                return StoreDocument::default();
            }
        };

        let value: serde_json::Value = match serde_json::from_str(&contents) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "data file is not valid JSON");
                return StoreDocument::default();
            }
        };

        StoreDocument {
            travel_records: collection(&value, "travelRecords"),
            frequent_routes: collection(&value, "frequentRoutes"),
        }
    }

    /// Write the document, replacing the previous file atomically.
    ///
    /// Creates parent directories if they don't exist.
    pub fn save(&self, document: &StoreDocument) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(document)?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, &self.path)?;

        Ok(())
    }
}

fn collection<T: DeserializeOwned>(document: &serde_json::Value, key: &str) -> Vec<T> {
    let Some(items) = document.get(key) else {
        return Vec::new();
    };
    match Vec::<T>::deserialize(items) {
        Ok(items) => items,
        Err(e) => {
            tracing::warn!(key, error = %e, "discarding unreadable collection");
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tempfile::tempdir;

    use crate::domain::{Fare, RecordId, TransportationType};

    fn record() -> TravelRecord {
        TravelRecord {
            id: RecordId::new("1"),
            date: NaiveDate::from_ymd_opt(2025, 11, 10).unwrap(),
            from_station: "新宿".to_string(),
            to_station: "渋谷".to_string(),
            transportation_type: TransportationType::Train,
            transportation_company: Some("JR".to_string()),
            fare: Fare::from_yen(200),
        }
    }

    #[test]
    fn save_and_load() {
        let dir = tempdir().unwrap();
        let file = StoreFile::new(dir.path().join("nested/expenses.json"));
        let document = StoreDocument {
            travel_records: vec![record()],
            frequent_routes: Vec::new(),
        };

        file.save(&document).unwrap();
        assert_eq!(file.load(), document);
    }

    #[test]
    fn missing_file_is_empty() {
        let dir = tempdir().unwrap();
        let file = StoreFile::new(dir.path().join("nothing.json"));
        assert_eq!(file.load(), StoreDocument::default());
    }

    #[test]
    fn garbage_is_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("expenses.json");
        std::fs::write(&path, "not json at all").unwrap();
        assert_eq!(StoreFile::new(&path).load(), StoreDocument::default());
    }

    #[test]
    fn corrupt_collection_keeps_the_other() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("expenses.json");
        std::fs::write(
            &path,
            r#"{
                "travelRecords": [{"id": "1", "date": "2025-11-10", "fromStation": "新宿",
                    "toStation": "渋谷", "transportationType": "train", "fare": 200}],
                "frequentRoutes": "oops"
            }"#,
        )
        .unwrap();

        let document = StoreFile::new(&path).load();
        assert_eq!(document.travel_records.len(), 1);
        assert_eq!(document.travel_records[0].fare, Fare::from_yen(200));
        assert!(document.frequent_routes.is_empty());
    }

    #[test]
    fn wire_keys_are_camel_case() {
        let json = serde_json::to_value(StoreDocument::default()).unwrap();
        assert!(json.get("travelRecords").is_some());
        assert!(json.get("frequentRoutes").is_some());
    }
}
