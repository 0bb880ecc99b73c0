//! JSON snapshot contact repository
//!
//! The whole store is serialized on every save. Writes go to a sibling temp
//! file which is synced and then renamed over the target, so a reader only
//! ever sees the previous snapshot or the new one.

use async_trait::async_trait;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use shared::{run_debug, ContactRow};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::error::{OutreachError, OutreachResult};
use crate::state::ContactStore;
use crate::traits::ContactRepository;

/// Snapshot format version written by this build
pub const SNAPSHOT_VERSION: u32 = 1;

/// On-disk layout of the store
#[derive(Debug, Serialize, Deserialize)]
struct StoreSnapshot {
    version: u32,
    saved_at: DateTime<Local>,
    rows: Vec<ContactRow>,
}

/// Contact repository backed by one JSON file
pub struct RealContactRepository {
    path: PathBuf,
}

impl RealContactRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn exists(&self) -> bool {
        fs::metadata(&self.path).await.is_ok()
    }

    /// Write a fresh store, refusing to replace an existing one unless `force`
    pub async fn create(&self, store: &ContactStore, force: bool) -> OutreachResult<()> {
        if !force && self.exists().await {
            return Err(OutreachError::StoreExists {
                path: self.path.display().to_string(),
            });
        }
        self.save(store).await
    }

    fn temp_path(&self) -> PathBuf {
        let file_name = self
            .path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "contacts.json".to_string());
        self.path.with_file_name(format!(".{file_name}.tmp"))
    }

    fn corrupt(&self, message: impl Into<String>) -> OutreachError {
        OutreachError::StoreCorrupt {
            path: self.path.display().to_string(),
            message: message.into(),
        }
    }
}

#[async_trait]
impl ContactRepository for RealContactRepository {
    async fn load(&self) -> OutreachResult<ContactStore> {
        let raw = match fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(OutreachError::StoreNotFound {
                    path: self.path.display().to_string(),
                })
            }
            Err(e) => return Err(OutreachError::fs("read contact store", &self.path, e)),
        };

        let snapshot: StoreSnapshot =
            serde_json::from_str(&raw).map_err(|e| self.corrupt(e.to_string()))?;
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(self.corrupt(format!(
                "unsupported snapshot version {} (expected {})",
                snapshot.version, SNAPSHOT_VERSION
            )));
        }

        run_debug!(
            "📂 Loaded {} rows from {} (saved {})",
            snapshot.rows.len(),
            self.path.display(),
            snapshot.saved_at.to_rfc3339()
        );
        Ok(ContactStore::new(snapshot.rows))
    }

    async fn save(&self, store: &ContactStore) -> OutreachResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| OutreachError::fs("create store directory", parent, e))?;
        }

        let snapshot = StoreSnapshot {
            version: SNAPSHOT_VERSION,
            saved_at: Local::now(),
            rows: store.rows().to_vec(),
        };
        let bytes = serde_json::to_vec_pretty(&snapshot)?;

        let tmp = self.temp_path();
        let mut file = fs::File::create(&tmp)
            .await
            .map_err(|e| OutreachError::fs("create temp snapshot", &tmp, e))?;
        file.write_all(&bytes)
            .await
            .map_err(|e| OutreachError::fs("write temp snapshot", &tmp, e))?;
        file.sync_all()
            .await
            .map_err(|e| OutreachError::fs("sync temp snapshot", &tmp, e))?;
        drop(file);

        fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| OutreachError::fs("replace contact store", &self.path, e))?;
        Ok(())
    }
}
