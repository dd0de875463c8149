//! Build record lookup.
//!
//! A [`BuildStore`] resolves a static export name to a build and loads its
//! generation input.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use sitepack_model::{BuildData, Deployment};

/// Maximum number of build records scanned when resolving a name.
pub const SCAN_LIMIT: usize = 100;

/// Error from a build store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No build with the given id exists.
    #[error("Build not found: {0}")]
    NotFound(String),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// A build record could not be parsed.
    #[error("Invalid build record {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Source of published builds.
pub trait BuildStore: Send + Sync {
    /// Id of the build whose deployment is a static export named `name`.
    fn find_build_id_by_name(&self, name: &str) -> Result<Option<String>, StoreError>;

    /// Generation input of build `build_id`.
    fn load_build_data(&self, build_id: &str) -> Result<BuildData, StoreError>;
}

/// Deployment descriptor as stored: either a JSON string or an object.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum StoredDeployment {
    Encoded(String),
    Object(Deployment),
}

impl StoredDeployment {
    fn decode(self) -> Option<Deployment> {
        match self {
            Self::Encoded(json) => serde_json::from_str(&json).ok(),
            Self::Object(deployment) => Some(deployment),
        }
    }
}

/// Id and deployment of a stored build, without its data.
#[derive(Debug, Deserialize)]
struct RecordHeader {
    id: String,
    #[serde(default)]
    deployment: Option<StoredDeployment>,
}

#[derive(Debug, Deserialize)]
struct RecordData {
    id: String,
    data: BuildData,
}

/// Build store backed by a directory of JSON records.
///
/// Each `*.json` file holds `{ "id", "deployment", "data" }`, where `data`
/// is the build's [`BuildData`].
#[derive(Debug, Clone)]
pub struct FsBuildStore {
    dir: PathBuf,
}

impl FsBuildStore {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Record files in file-name order.
    fn records(&self) -> Result<Vec<PathBuf>, StoreError> {
        let mut paths: Vec<PathBuf> = std::fs::read_dir(&self.dir)?
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
            .collect();
        paths.sort();
        Ok(paths)
    }
}

impl BuildStore for FsBuildStore {
    fn find_build_id_by_name(&self, name: &str) -> Result<Option<String>, StoreError> {
        for path in self.records()?.into_iter().take(SCAN_LIMIT) {
            let header = match read_header(&path) {
                Ok(header) => header,
                Err(e) => {
                    tracing::debug!(error = %e, "Skipping unreadable build record");
                    continue;
                }
            };
            if header
                .deployment
                .and_then(StoredDeployment::decode)
                .is_some_and(|deployment| deployment.is_static_named(name))
            {
                return Ok(Some(header.id));
            }
        }
        Ok(None)
    }

    fn load_build_data(&self, build_id: &str) -> Result<BuildData, StoreError> {
        for path in self.records()? {
            let bytes = std::fs::read(&path)?;
            let Ok(header) = serde_json::from_slice::<RecordHeader>(&bytes) else {
                continue;
            };
            if header.id != build_id {
                continue;
            }
            let record: RecordData = serde_json::from_slice(&bytes)
                .map_err(|source| StoreError::Parse { path, source })?;
            tracing::debug!(build_id = %record.id, "Loaded build data");
            return Ok(record.data);
        }
        Err(StoreError::NotFound(build_id.to_owned()))
    }
}

fn read_header(path: &Path) -> Result<RecordHeader, StoreError> {
    let bytes = std::fs::read(path)?;
    serde_json::from_slice(&bytes).map_err(|source| StoreError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// In-memory build store.
#[derive(Debug, Default, Clone)]
pub struct MemoryBuildStore {
    builds: Vec<(String, Option<Deployment>, BuildData)>,
}

impl MemoryBuildStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a build. Its deployment is taken from the build snapshot.
    #[must_use]
    pub fn with_build(mut self, id: impl Into<String>, data: BuildData) -> Self {
        let deployment = data.build.deployment.clone();
        self.builds.push((id.into(), deployment, data));
        self
    }
}

impl BuildStore for MemoryBuildStore {
    fn find_build_id_by_name(&self, name: &str) -> Result<Option<String>, StoreError> {
        Ok(self
            .builds
            .iter()
            .take(SCAN_LIMIT)
            .find(|(_, deployment, _)| {
                deployment
                    .as_ref()
                    .is_some_and(|deployment| deployment.is_static_named(name))
            })
            .map(|(id, _, _)| id.clone()))
    }

    fn load_build_data(&self, build_id: &str) -> Result<BuildData, StoreError> {
        self.builds
            .iter()
            .find(|(id, _, _)| id == build_id)
            .map(|(_, _, data)| data.clone())
            .ok_or_else(|| StoreError::NotFound(build_id.to_owned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::sample_build;
    use pretty_assertions::assert_eq;

    fn write_record(dir: &Path, file: &str, id: &str, deployment: &serde_json::Value) {
        let record = serde_json::json!({
            "id": id,
            "deployment": deployment,
            "data": sample_build(),
        });
        std::fs::write(dir.join(file), serde_json::to_vec(&record).unwrap()).unwrap();
    }

    #[test]
    fn test_find_by_encoded_deployment() {
        let dir = tempfile::tempdir().unwrap();
        write_record(
            dir.path(),
            "a.json",
            "build-a",
            &serde_json::json!(r#"{"destination":"static","name":"acme.zip"}"#),
        );
        let store = FsBuildStore::new(dir.path());

        assert_eq!(
            store.find_build_id_by_name("acme.zip").unwrap(),
            Some("build-a".to_owned())
        );
        assert_eq!(store.find_build_id_by_name("other.zip").unwrap(), None);
    }

    #[test]
    fn test_find_by_object_deployment() {
        let dir = tempfile::tempdir().unwrap();
        write_record(
            dir.path(),
            "a.json",
            "build-a",
            &serde_json::json!({"destination": "saas", "name": "acme.zip"}),
        );
        write_record(
            dir.path(),
            "b.json",
            "build-b",
            &serde_json::json!({"destination": "static", "name": "acme.zip"}),
        );
        let store = FsBuildStore::new(dir.path());

        assert_eq!(
            store.find_build_id_by_name("acme.zip").unwrap(),
            Some("build-b".to_owned())
        );
    }

    #[test]
    fn test_invalid_records_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.json"), "not json").unwrap();
        write_record(
            dir.path(),
            "b.json",
            "build-b",
            &serde_json::json!("{broken"),
        );
        write_record(
            dir.path(),
            "c.json",
            "build-c",
            &serde_json::json!({"destination": "static", "name": "acme.zip"}),
        );
        let store = FsBuildStore::new(dir.path());

        assert_eq!(
            store.find_build_id_by_name("acme.zip").unwrap(),
            Some("build-c".to_owned())
        );
    }

    #[test]
    fn test_load_build_data() {
        let dir = tempfile::tempdir().unwrap();
        write_record(dir.path(), "a.json", "build-a", &serde_json::Value::Null);
        let store = FsBuildStore::new(dir.path());

        let data = store.load_build_data("build-a").unwrap();
        assert_eq!(data.build.project_id, "prj-acme");

        let err = store.load_build_data("build-x").unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[test]
    fn test_missing_directory_is_io_error() {
        let store = FsBuildStore::new("/nonexistent/builds");

        assert!(matches!(
            store.find_build_id_by_name("acme.zip"),
            Err(StoreError::Io(_))
        ));
    }

    #[test]
    fn test_memory_store() {
        let store = MemoryBuildStore::new().with_build("build-a", sample_build());

        assert_eq!(
            store.find_build_id_by_name("acme.zip").unwrap(),
            Some("build-a".to_owned())
        );
        assert!(store.load_build_data("build-a").is_ok());
        assert!(matches!(
            store.load_build_data("nope"),
            Err(StoreError::NotFound(_))
        ));
    }
}
