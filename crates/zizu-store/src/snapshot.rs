//! Whole-file JSON mirror of the in-memory state.
//!
//! Rewritten on every mutation, not appended. The write goes to a sibling
//! temp file first and is renamed into place so a crash mid-write never
//! leaves a truncated snapshot behind.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use zizu_schema::{Lead, Turn};

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub conversations: HashMap<String, Vec<Turn>>,
    #[serde(default)]
    pub leads: Vec<Lead>,
    #[serde(default)]
    pub last_updated: Option<DateTime<Utc>>,
}

impl Snapshot {
    /// Load a snapshot if the file exists. A missing file is not an error;
    /// an unreadable or malformed one is.
    pub async fn load(path: &Path) -> Result<Option<Snapshot>> {
        let raw = match tokio::fs::read_to_string(path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e).context(format!("reading snapshot {}", path.display())),
        };
        let snapshot = serde_json::from_str(&raw)
            .context(format!("decoding snapshot {}", path.display()))?;
        Ok(Some(snapshot))
    }

    /// Rewrite the snapshot wholesale: write to `<path>.tmp`, then rename.
    pub async fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        let payload = serde_json::to_vec_pretty(self)?;
        let tmp = path.with_extension("tmp");
        tokio::fs::write(&tmp, &payload)
            .await
            .context(format!("writing snapshot temp {}", tmp.display()))?;
        tokio::fs::rename(&tmp, path)
            .await
            .context(format!("renaming snapshot into {}", path.display()))?;
        Ok(())
    }
}
