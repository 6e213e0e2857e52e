use std::time::Duration;

use async_trait::async_trait;
use contracts::domain::a001_material::aggregate::Material;
use contracts::domain::a002_supplier::aggregate::Supplier;
use contracts::domain::a003_variant::aggregate::Variant;
use contracts::domain::a004_product::aggregate::{BomLine, Product, ProductId};
use contracts::domain::common::AggregateRoot;
use contracts::shared::labor::LaborParams;
use serde_json::Value;

use super::envelope::{require_envelope, unwrap_envelope};
use super::{CatalogError, CatalogSource};

/// Путь конфигурации работ в API документной БД
const LABOR_CONFIG_PATH: &str = "configuracion/mano-obra";

/// HTTP-клиент REST API документной БД
pub struct HttpCatalog {
    client: reqwest::Client,
    base_url: String,
}

impl HttpCatalog {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: reqwest::Client::builder().timeout(timeout).build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    /// GET с разбором JSON; 404 возвращает `None`
    async fn get_json(&self, path: &str) -> Result<Option<Value>, CatalogError> {
        let url = self.url(path);
        tracing::debug!("Catalog API: GET {}", url);

        let response = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| CatalogError::Network {
                url: url.clone(),
                message: e.to_string(),
            })?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CatalogError::Status {
                url,
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<Value>()
            .await
            .map(Some)
            .map_err(|e| CatalogError::Malformed {
                resource: path.to_string(),
                message: e.to_string(),
            })
    }

    async fn get_required(&self, path: &str) -> Result<Value, CatalogError> {
        self.get_json(path)
            .await?
            .ok_or_else(|| CatalogError::NotFound {
                resource: path.to_string(),
            })
    }
}

fn product_path(id: &ProductId) -> String {
    format!(
        "{}/{}",
        Product::collection_name(),
        urlencoding::encode(id.as_str())
    )
}

#[async_trait]
impl CatalogSource for HttpCatalog {
    async fn materials(&self) -> Result<Vec<Material>, CatalogError> {
        let path = Material::collection_name();
        let body = self.get_required(path).await?;
        require_envelope(path, "materiales", body)
    }

    async fn product(&self, id: &ProductId) -> Result<Product, CatalogError> {
        let path = product_path(id);
        let body = self.get_required(&path).await?;
        unwrap_envelope(&path, "producto", body)?.ok_or(CatalogError::NotFound { resource: path })
    }

    async fn bom(&self, id: &ProductId) -> Result<Vec<BomLine>, CatalogError> {
        let path = format!("{}/{}", product_path(id), Material::collection_name());
        let body = self.get_required(&path).await?;
        require_envelope(&path, "materiales", body)
    }

    async fn suppliers(&self) -> Result<Vec<Supplier>, CatalogError> {
        let path = Supplier::collection_name();
        let body = self.get_required(path).await?;
        require_envelope(path, "proveedores", body)
    }

    async fn variants(&self) -> Result<Vec<Variant>, CatalogError> {
        let path = Variant::collection_name();
        let body = self.get_required(path).await?;
        require_envelope(path, "variantes", body)
    }

    async fn labor_params(&self) -> Result<Option<LaborParams>, CatalogError> {
        match self.get_json(LABOR_CONFIG_PATH).await? {
            Some(body) => unwrap_envelope(LABOR_CONFIG_PATH, "configuracion", body),
            None => Ok(None),
        }
    }
}
