//! Источники каталога: материалы, изделия, спецификации, поставщики,
//! варианты и параметры работ из внешней документной БД.

mod envelope;
pub mod file;
pub mod http;
pub mod snapshot;

use std::sync::Arc;

use async_trait::async_trait;
use contracts::domain::a001_material::aggregate::Material;
use contracts::domain::a002_supplier::aggregate::Supplier;
use contracts::domain::a003_variant::aggregate::Variant;
use contracts::domain::a004_product::aggregate::{BomLine, Product, ProductId};
use contracts::shared::labor::LaborParams;
use thiserror::Error;

use crate::shared::config::{resolve_path, CatalogConfig, CatalogSourceKind};

pub use snapshot::{load_snapshot, CatalogSnapshot};

/// Ошибки интеграции с каталогом
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("network error requesting {url}: {message}")]
    Network { url: String, message: String },

    #[error("HTTP {status} from {url}: {body}")]
    Status { url: String, status: u16, body: String },

    #[error("catalog rejected request for {resource}: {message}")]
    Rejected { resource: String, message: String },

    #[error("malformed response for {resource}: {message}")]
    Malformed { resource: String, message: String },

    #[error("{resource} not found")]
    NotFound { resource: String },

    #[error("catalog is incomplete: {resource} not found")]
    Incomplete { resource: String },

    #[error("I/O error reading {path}: {message}")]
    Io { path: String, message: String },
}

impl CatalogError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, CatalogError::NotFound { .. })
    }
}

/// Трейт для источника каталога
#[async_trait]
pub trait CatalogSource: Send + Sync {
    async fn materials(&self) -> Result<Vec<Material>, CatalogError>;

    async fn product(&self, id: &ProductId) -> Result<Product, CatalogError>;

    /// Спецификация изделия
    async fn bom(&self, id: &ProductId) -> Result<Vec<BomLine>, CatalogError>;

    async fn suppliers(&self) -> Result<Vec<Supplier>, CatalogError>;

    async fn variants(&self) -> Result<Vec<Variant>, CatalogError>;

    /// `None`, если параметры работ не настроены
    async fn labor_params(&self) -> Result<Option<LaborParams>, CatalogError>;
}

/// Создать источник каталога по конфигурации
pub fn build_source(config: &CatalogConfig) -> anyhow::Result<Arc<dyn CatalogSource>> {
    let source: Arc<dyn CatalogSource> = match config.source {
        CatalogSourceKind::Http => {
            tracing::info!("Catalog source: HTTP {}", config.base_url);
            Arc::new(http::HttpCatalog::new(
                &config.base_url,
                std::time::Duration::from_secs(config.timeout_secs),
            )?)
        }
        CatalogSourceKind::File => {
            let dir = resolve_path(&config.data_dir);
            tracing::info!("Catalog source: files in {}", dir.display());
            Arc::new(file::FileCatalog::new(dir))
        }
    };
    Ok(source)
}
