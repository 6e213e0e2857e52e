use std::path::{Path, PathBuf};

use contracts::domain::a005_quote::aggregate::{QuoteDraft, QuoteDraftId, QuoteDraftListItem};
use contracts::domain::common::{AggregateId, AggregateRoot};
use thiserror::Error;
use tokio::sync::Mutex;

#[derive(Debug, Error)]
pub enum DraftStoreError {
    #[error("draft {0} not found")]
    NotFound(String),

    /// Черновик изменён другим сохранением
    #[error("draft {id} version conflict: expected {expected}, stored {stored}")]
    VersionConflict { id: String, expected: i32, stored: i32 },

    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid draft file {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

fn io_error(path: &Path, source: std::io::Error) -> DraftStoreError {
    DraftStoreError::Io {
        path: path.display().to_string(),
        source,
    }
}

/// Снимки черновиков в виде JSON-файлов `{id}.json`.
///
/// Файл всегда записывается целиком: сначала во временный файл, затем
/// переименованием. Записи сериализуются внутренней блокировкой.
pub struct DraftStore {
    dir: PathBuf,
    write_lock: Mutex<()>,
}

impl DraftStore {
    pub fn new(dir: PathBuf) -> Self {
        Self {
            dir,
            write_lock: Mutex::new(()),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, id: &QuoteDraftId) -> PathBuf {
        self.dir.join(format!("{}.json", id.as_string()))
    }

    async fn read(path: &Path) -> Result<Option<QuoteDraft>, DraftStoreError> {
        let bytes = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(io_error(path, e)),
        };
        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|source| DraftStoreError::Json {
                path: path.display().to_string(),
                source,
            })
    }

    /// Сохранить черновик.
    ///
    /// Версия черновика должна совпадать с сохранённой (новый черновик
    /// сохраняется без проверки). После записи версия увеличивается.
    pub async fn save(&self, draft: &mut QuoteDraft) -> Result<(), DraftStoreError> {
        let _guard = self.write_lock.lock().await;
        let path = self.path_for(&draft.id);

        if let Some(stored) = Self::read(&path).await? {
            if stored.metadata.version != draft.metadata.version {
                return Err(DraftStoreError::VersionConflict {
                    id: draft.to_string_id(),
                    expected: draft.metadata.version,
                    stored: stored.metadata.version,
                });
            }
        }

        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| io_error(&self.dir, e))?;

        let mut next = draft.clone();
        next.metadata.increment_version();
        next.metadata.touch();
        let json = serde_json::to_vec_pretty(&next).map_err(|source| DraftStoreError::Json {
            path: path.display().to_string(),
            source,
        })?;

        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, &json)
            .await
            .map_err(|e| io_error(&tmp, e))?;
        tokio::fs::rename(&tmp, &path)
            .await
            .map_err(|e| io_error(&path, e))?;

        tracing::debug!(
            "{} {} ({}) saved, version {}",
            QuoteDraft::element_name(),
            next.to_string_id(),
            next.description(),
            next.metadata.version
        );
        *draft = next;
        Ok(())
    }

    pub async fn load(&self, id: &QuoteDraftId) -> Result<QuoteDraft, DraftStoreError> {
        Self::read(&self.path_for(id))
            .await?
            .ok_or_else(|| DraftStoreError::NotFound(id.as_string()))
    }

    /// Список черновиков, недавно изменённые сверху.
    ///
    /// Повреждённые файлы пропускаются с предупреждением в логе.
    pub async fn list(&self) -> Result<Vec<QuoteDraftListItem>, DraftStoreError> {
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(io_error(&self.dir, e)),
        };

        let mut out = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| io_error(&self.dir, e))?
        {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            match Self::read(&path).await {
                Ok(Some(draft)) => out.push(QuoteDraftListItem::from(&draft)),
                Ok(None) => {}
                Err(e) => tracing::warn!("Skipping draft file: {}", e),
            }
        }

        out.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(out)
    }

    /// Удалить черновик; `false`, если его не было
    pub async fn delete(&self, id: &QuoteDraftId) -> Result<bool, DraftStoreError> {
        let _guard = self.write_lock.lock().await;
        let path = self.path_for(id);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(io_error(&path, e)),
        }
    }
}
