//! JSON-lines audit log
//!
//! One entry per line, appended. The file is created on first write and
//! earlier lines are never rewritten. A line torn by a crash is terminated
//! before the next append and skipped when reading.

use async_trait::async_trait;
use shared::{run_warn, AuditEntry};
use std::io::{ErrorKind, SeekFrom};
use std::path::{Path, PathBuf};
use tokio::fs::{self, File, OpenOptions};
use tokio::io::{AsyncReadExt, AsyncSeekExt, AsyncWriteExt};

use crate::error::{OutreachError, OutreachResult};
use crate::traits::AuditSink;

pub struct RealAuditLog {
    path: PathBuf,
}

impl RealAuditLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Every entry in the log, oldest first; a missing log is empty
    ///
    /// Lines that do not parse are skipped with a warning.
    pub async fn read_all(&self) -> OutreachResult<Vec<AuditEntry>> {
        let raw = match fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(OutreachError::fs("read audit log", &self.path, e)),
        };

        let mut entries = Vec::new();
        for (number, line) in raw.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str(line) {
                Ok(entry) => entries.push(entry),
                Err(e) => run_warn!(
                    "⚠️ Skipping malformed line {} of {}: {}",
                    number + 1,
                    self.path.display(),
                    e
                ),
            }
        }
        Ok(entries)
    }

    /// Whether the log is missing, empty or ends with a complete line
    async fn ends_with_newline(&self) -> OutreachResult<bool> {
        let mut file = match File::open(&self.path).await {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(true),
            Err(e) => return Err(OutreachError::fs("open audit log", &self.path, e)),
        };
        let len = file
            .metadata()
            .await
            .map_err(|e| OutreachError::fs("inspect audit log", &self.path, e))?
            .len();
        if len == 0 {
            return Ok(true);
        }

        let mut last = [0u8; 1];
        file.seek(SeekFrom::End(-1))
            .await
            .map_err(|e| OutreachError::fs("seek audit log", &self.path, e))?;
        file.read_exact(&mut last)
            .await
            .map_err(|e| OutreachError::fs("read audit log", &self.path, e))?;
        Ok(last[0] == b'\n')
    }
}

#[async_trait]
impl AuditSink for RealAuditLog {
    async fn append(&self, entry: &AuditEntry) -> OutreachResult<()> {
        let mut line = String::new();
        if !self.ends_with_newline().await? {
            run_warn!("⚠️ Audit log {} ends in a torn line, starting a new one", self.path.display());
            line.push('\n');
        }
        line.push_str(&serde_json::to_string(entry)?);
        line.push('\n');

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(|e| OutreachError::fs("open audit log", &self.path, e))?;
        file.write_all(line.as_bytes())
            .await
            .map_err(|e| OutreachError::fs("append audit log", &self.path, e))?;
        file.flush()
            .await
            .map_err(|e| OutreachError::fs("flush audit log", &self.path, e))?;
        Ok(())
    }
}
