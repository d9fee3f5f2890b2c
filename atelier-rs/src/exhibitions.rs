//! File-backed exhibition store.
//!
//! Exhibitions live as one ordered JSON array on disk. Every mutation is a
//! read-modify-write of the whole document, serialized behind a process-wide
//! lock and committed via temp-file rename so concurrent requests cannot
//! lose updates. Ids are creation-time unix milliseconds, bumped while taken.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::RwLock;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Exhibition {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub date: String,
}

/// Partial update; absent fields keep their stored value.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct ExhibitionPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub date: Option<String>,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to access exhibitions file: {0}")]
    Io(#[from] std::io::Error),
    #[error("exhibitions file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone)]
pub struct ExhibitionStore {
    path: Arc<PathBuf>,
    lock: Arc<RwLock<()>>,
}

impl ExhibitionStore {
    /// Open the store, creating an empty document (and parent directory)
    /// when the file does not exist yet.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        if tokio::fs::try_exists(&path).await? {
            // Fail fast on a corrupt document instead of at first request.
            let raw = tokio::fs::read(&path).await?;
            let _: Vec<Exhibition> = serde_json::from_slice(&raw)?;
        } else {
            tokio::fs::write(&path, b"[]").await?;
        }

        Ok(Self {
            path: Arc::new(path),
            lock: Arc::new(RwLock::new(())),
        })
    }

    pub async fn list(&self) -> Result<Vec<Exhibition>, StoreError> {
        let _guard = self.lock.read().await;
        self.read_all().await
    }

    pub async fn create(
        &self,
        title: String,
        description: String,
        date: String,
    ) -> Result<Exhibition, StoreError> {
        let _guard = self.lock.write().await;
        let mut exhibitions = self.read_all().await?;

        let mut id = now_millis();
        while exhibitions.iter().any(|ex| ex.id == id) {
            id += 1;
        }

        let exhibition = Exhibition {
            id,
            title,
            description,
            date,
        };
        exhibitions.push(exhibition.clone());
        self.write_all(&exhibitions).await?;

        Ok(exhibition)
    }

    /// Merge the patch into the record with this id. Returns `None` when the
    /// id is absent; the document is left untouched in that case.
    pub async fn update(
        &self,
        id: i64,
        patch: ExhibitionPatch,
    ) -> Result<Option<Exhibition>, StoreError> {
        let _guard = self.lock.write().await;
        let mut exhibitions = self.read_all().await?;

        let Some(existing) = exhibitions.iter_mut().find(|ex| ex.id == id) else {
            return Ok(None);
        };

        if let Some(title) = patch.title {
            existing.title = title;
        }
        if let Some(description) = patch.description {
            existing.description = description;
        }
        if let Some(date) = patch.date {
            existing.date = date;
        }
        let updated = existing.clone();

        self.write_all(&exhibitions).await?;
        Ok(Some(updated))
    }

    /// Returns false when the id is absent.
    pub async fn delete(&self, id: i64) -> Result<bool, StoreError> {
        let _guard = self.lock.write().await;
        let mut exhibitions = self.read_all().await?;

        let before = exhibitions.len();
        exhibitions.retain(|ex| ex.id != id);
        if exhibitions.len() == before {
            return Ok(false);
        }

        self.write_all(&exhibitions).await?;
        Ok(true)
    }

    async fn read_all(&self) -> Result<Vec<Exhibition>, StoreError> {
        let raw = tokio::fs::read(self.path.as_ref()).await?;
        Ok(serde_json::from_slice(&raw)?)
    }

    async fn write_all(&self, exhibitions: &[Exhibition]) -> Result<(), StoreError> {
        let raw = serde_json::to_vec_pretty(exhibitions)?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, raw).await?;
        tokio::fs::rename(&tmp, self.path.as_ref()).await?;
        Ok(())
    }
}

fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as i64)
        .unwrap_or(0)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use anyhow::Result;
    use tempfile::tempdir;

    use super::{ExhibitionPatch, ExhibitionStore};

    #[tokio::test]
    async fn open_creates_empty_document() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("exhibitions.json");

        let store = ExhibitionStore::open(&path).await?;

        assert!(store.list().await?.is_empty());
        assert_eq!(std::fs::read_to_string(&path)?, "[]");
        Ok(())
    }

    #[tokio::test]
    async fn open_rejects_corrupt_document() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("exhibitions.json");
        std::fs::write(&path, "{not json")?;

        assert!(ExhibitionStore::open(&path).await.is_err());
        Ok(())
    }

    #[tokio::test]
    async fn create_assigns_unique_ids() -> Result<()> {
        let dir = tempdir()?;
        let store = ExhibitionStore::open(dir.path().join("exhibitions.json")).await?;

        let first = store
            .create("Spring".into(), "Watercolors".into(), "2026-03-01".into())
            .await?;
        let second = store
            .create("Summer".into(), "Oils".into(), "2026-06-01".into())
            .await?;

        assert_ne!(first.id, second.id);
        assert_eq!(store.list().await?.len(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn update_merges_only_present_fields() -> Result<()> {
        let dir = tempdir()?;
        let store = ExhibitionStore::open(dir.path().join("exhibitions.json")).await?;
        let created = store
            .create("Spring".into(), "Watercolors".into(), "2026-03-01".into())
            .await?;

        let updated = store
            .update(
                created.id,
                ExhibitionPatch {
                    title: Some("Spring Revisited".into()),
                    ..Default::default()
                },
            )
            .await?
            .unwrap();

        assert_eq!(updated.title, "Spring Revisited");
        assert_eq!(updated.description, "Watercolors");
        assert_eq!(updated.date, "2026-03-01");
        Ok(())
    }

    #[tokio::test]
    async fn update_missing_id_returns_none() -> Result<()> {
        let dir = tempdir()?;
        let store = ExhibitionStore::open(dir.path().join("exhibitions.json")).await?;

        let result = store.update(42, ExhibitionPatch::default()).await?;

        assert!(result.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn delete_missing_id_leaves_store_unchanged() -> Result<()> {
        let dir = tempdir()?;
        let store = ExhibitionStore::open(dir.path().join("exhibitions.json")).await?;
        store
            .create("Spring".into(), "Watercolors".into(), "2026-03-01".into())
            .await?;

        assert!(!store.delete(42).await?);
        assert_eq!(store.list().await?.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn document_survives_reopen() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("exhibitions.json");

        let store = ExhibitionStore::open(&path).await?;
        let created = store
            .create("Spring".into(), "Watercolors".into(), "2026-03-01".into())
            .await?;
        drop(store);

        let reopened = ExhibitionStore::open(&path).await?;
        let listed = reopened.list().await?;
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, created.id);
        Ok(())
    }
}
