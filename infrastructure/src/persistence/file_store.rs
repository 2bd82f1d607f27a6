// ./infrastructure/src/persistence/file_store.rs
use application::{ApplicationError, KeyValueStore};
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::PathBuf;
use tokio::fs;
use tracing::{debug, instrument};

/// Durable key-value adapter keeping one `<key>.json` file per key inside a
/// data directory. Keys are expected to be plain identifiers (the
/// application only uses `contacts`, `settings` and `darkMode`), so they
/// map directly to file names.
#[derive(Debug, Clone)]
pub struct FileKeyValueStore {
    dir: PathBuf,
}

impl FileKeyValueStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    async fn ensure_dir(&self) -> Result<(), ApplicationError> {
        fs::create_dir_all(&self.dir).await.map_err(|e| {
            ApplicationError::Storage(format!(
                "creating data directory {}: {e}",
                self.dir.display()
            ))
        })
    }
}

#[async_trait]
impl KeyValueStore for FileKeyValueStore {
    #[instrument(skip(self))]
    async fn get(&self, key: &str) -> Result<Option<String>, ApplicationError> {
        match fs::read_to_string(self.path_for(key)).await {
            Ok(raw) => {
                debug!(key, bytes = raw.len(), "Read value from file store");
                Ok(Some(raw))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(ApplicationError::Storage(format!(
                "reading key '{key}': {e}"
            ))),
        }
    }

    #[instrument(skip(self, value))]
    async fn set(&self, key: &str, value: &str) -> Result<(), ApplicationError> {
        self.ensure_dir().await?;
        fs::write(self.path_for(key), value).await.map_err(|e| {
            ApplicationError::Storage(format!("writing key '{key}': {e}"))
        })?;
        debug!(key, bytes = value.len(), "Wrote value to file store");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn clear(&self) -> Result<(), ApplicationError> {
        let mut entries = match fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            // Nothing was ever persisted; clearing an absent namespace succeeds.
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(()),
            Err(e) => {
                return Err(ApplicationError::Storage(format!(
                    "listing data directory {}: {e}",
                    self.dir.display()
                )));
            }
        };

        while let Some(entry) = entries.next_entry().await.map_err(|e| {
            ApplicationError::Storage(format!(
                "listing data directory {}: {e}",
                self.dir.display()
            ))
        })? {
            fs::remove_file(entry.path()).await.map_err(|e| {
                ApplicationError::Storage(format!(
                    "removing {}: {e}",
                    entry.path().display()
                ))
            })?;
        }
        debug!("Cleared file store namespace");
        Ok(())
    }
}
