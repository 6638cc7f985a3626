//! Artifact persistence
//!
//! Serializes objects with bincode, writing through a temp file in the
//! destination directory and renaming into place so a concurrent reader
//! never observes a partially written artifact. Overwrites any existing
//! file at the path.

use crate::error::{AutomlError, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::info;

/// Serialize `object` to `path`, creating parent directories as needed.
pub fn save_object<T: Serialize>(path: &Path, object: &T) -> Result<()> {
    let parent = path.parent().filter(|p| !p.as_os_str().is_empty());
    if let Some(dir) = parent {
        std::fs::create_dir_all(dir).map_err(|e| AutomlError::PersistError {
            path: path.to_path_buf(),
            source: e,
        })?;
    }

    let mut tmp = NamedTempFile::new_in(parent.unwrap_or_else(|| Path::new("."))).map_err(
        |e| AutomlError::PersistError {
            path: path.to_path_buf(),
            source: e,
        },
    )?;

    {
        let mut writer = BufWriter::new(tmp.as_file_mut());
        bincode::serialize_into(&mut writer, object)?;
        writer.flush().map_err(|e| AutomlError::PersistError {
            path: path.to_path_buf(),
            source: e,
        })?;
    }

    // Atomic rename within the same directory
    tmp.persist(path).map_err(|e| AutomlError::PersistError {
        path: path.to_path_buf(),
        source: e.error,
    })?;

    info!(path = %path.display(), "artifact written");
    Ok(())
}

/// Deserialize an object previously written by [`save_object`].
pub fn load_object<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let file = File::open(path).map_err(|e| AutomlError::PersistError {
        path: path.to_path_buf(),
        source: e,
    })?;
    let reader = BufReader::new(file);
    bincode::deserialize_from(reader).map_err(|e| {
        AutomlError::SerializationError(format!("{}: {}", path.display(), e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Payload {
        name: String,
        values: Vec<f64>,
    }

    fn payload() -> Payload {
        Payload {
            name: "winner".into(),
            values: vec![1.0, 2.5, -3.0],
        }
    }

    #[test]
    fn test_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.pkl");
        save_object(&path, &payload()).unwrap();
        let loaded: Payload = load_object(&path).unwrap();
        assert_eq!(loaded, payload());
    }

    #[test]
    fn test_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deep/nested/artifacts/model.pkl");
        save_object(&path, &payload()).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_overwrites_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.pkl");
        save_object(&path, &payload()).unwrap();

        let replacement = Payload {
            name: "other".into(),
            values: vec![9.0],
        };
        save_object(&path, &replacement).unwrap();
        let loaded: Payload = load_object(&path).unwrap();
        assert_eq!(loaded, replacement);
    }

    #[test]
    fn test_no_temp_file_left_behind() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.pkl");
        save_object(&path, &payload()).unwrap();
        let entries: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_corrupt_file_error_names_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.pkl");
        std::fs::write(&path, b"not a bincode payload").unwrap();

        let result: Result<Payload> = load_object(&path);
        match result {
            Err(AutomlError::SerializationError(msg)) => {
                assert!(msg.contains("model.pkl"), "message was: {msg}");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_missing_file_is_persist_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.pkl");
        let result: Result<Payload> = load_object(&path);
        match result {
            Err(AutomlError::PersistError { path: p, .. }) => assert_eq!(p, path),
            other => panic!("unexpected: {other:?}"),
        }
    }
}
