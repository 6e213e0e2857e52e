use std::path::{Path, PathBuf};

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

/// Каталог из JSON-файлов на диске (оффлайн-режим и тесты).
///
/// Файлы содержат те же конверты `{ "success": true, ... }`, что и API.
pub struct FileCatalog {
    dir: PathBuf,
}

impl FileCatalog {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    /// Прочитать файл; отсутствующий файл даёт `None`
    async fn read_json(&self, relative: &Path) -> Result<Option<Value>, CatalogError> {
        let path = self.dir.join(relative);
        let text = match tokio::fs::read_to_string(&path).await {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(CatalogError::Io {
                    path: path.display().to_string(),
                    message: e.to_string(),
                })
            }
        };

        serde_json::from_str(&text)
            .map(Some)
            .map_err(|e| CatalogError::Malformed {
                resource: relative.display().to_string(),
                message: e.to_string(),
            })
    }

    async fn read_required(&self, relative: &Path) -> Result<Value, CatalogError> {
        self.read_json(relative)
            .await?
            .ok_or_else(|| CatalogError::NotFound {
                resource: relative.display().to_string(),
            })
    }
}

fn collection_file(collection: &str) -> PathBuf {
    PathBuf::from(format!("{}.json", collection))
}

/// Каталог изделия; идентификатор не должен выходить за пределы `data_dir`
fn product_dir(id: &ProductId) -> Result<PathBuf, CatalogError> {
    let raw = id.as_str();
    if raw.is_empty() || raw.starts_with('.') || raw.contains('/') || raw.contains('\\') {
        return Err(CatalogError::NotFound {
            resource: format!("{}/{}", Product::collection_name(), raw),
        });
    }
    Ok(PathBuf::from(Product::collection_name()).join(raw))
}

#[async_trait]
impl CatalogSource for FileCatalog {
    async fn materials(&self) -> Result<Vec<Material>, CatalogError> {
        let path = collection_file(Material::collection_name());
        let body = self.read_required(&path).await?;
        require_envelope(&path.display().to_string(), "materiales", body)
    }

    async fn product(&self, id: &ProductId) -> Result<Product, CatalogError> {
        let path = product_dir(id)?;
        let path = path.with_file_name(format!("{}.json", id.as_str()));
        let resource = path.display().to_string();
        let body = self.read_required(&path).await?;
        unwrap_envelope(&resource, "producto", body)?
            .ok_or(CatalogError::NotFound { resource })
    }

    async fn bom(&self, id: &ProductId) -> Result<Vec<BomLine>, CatalogError> {
        let path = product_dir(id)?.join(collection_file(Material::collection_name()));
        let body = self.read_required(&path).await?;
        require_envelope(&path.display().to_string(), "materiales", body)
    }

    async fn suppliers(&self) -> Result<Vec<Supplier>, CatalogError> {
        let path = collection_file(Supplier::collection_name());
        let body = self.read_required(&path).await?;
        require_envelope(&path.display().to_string(), "proveedores", body)
    }

    async fn variants(&self) -> Result<Vec<Variant>, CatalogError> {
        let path = collection_file(Variant::collection_name());
        let body = self.read_required(&path).await?;
        require_envelope(&path.display().to_string(), "variantes", body)
    }

    async fn labor_params(&self) -> Result<Option<LaborParams>, CatalogError> {
        let path = PathBuf::from("configuracion").join("mano-obra.json");
        match self.read_json(&path).await? {
            Some(body) => unwrap_envelope(&path.display().to_string(), "configuracion", body),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use serde_json::json;

    /// Временный каталог с файлами; удаляется при drop
    pub(crate) struct TempCatalogDir {
        pub path: PathBuf,
    }

    impl TempCatalogDir {
        pub fn new() -> Self {
            let path = std::env::temp_dir().join(format!("catalog-test-{}", uuid::Uuid::new_v4()));
            std::fs::create_dir_all(&path).unwrap();
            Self { path }
        }

        pub fn write(&self, relative: &str, value: Value) {
            let path = self.path.join(relative);
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).unwrap();
            }
            std::fs::write(path, serde_json::to_vec_pretty(&value).unwrap()).unwrap();
        }
    }

    impl Drop for TempCatalogDir {
        fn drop(&mut self) {
            let _ = std::fs::remove_dir_all(&self.path);
        }
    }

    /// Небольшой каталог: окно PVC со стеклом и уплотнителем
    pub(crate) fn seed_window_catalog(dir: &TempCatalogDir) {
        dir.write(
            "materiales.json",
            json!({
                "success": true,
                "materiales": [
                    {
                        "_id": "perfil",
                        "nombre": "Perfil PVC",
                        "categoria": "perfil",
                        "area_longitud": 1.0,
                        "tiene_variantes": true,
                        "proveedores": [
                            {
                                "proveedor": "prov-general",
                                "precio": 100.0,
                                "es_principal": true,
                                "tipo_variante": "pvc",
                                "variantes": [{ "variante": "blanco", "precio_adicional": 10.0 }]
                            }
                        ]
                    },
                    {
                        "_id": "vidrio",
                        "nombre": "Vidrio claro",
                        "categoria": "vidrio",
                        "area_longitud": 1.0,
                        "proveedores": [
                            { "proveedor": "prov-vidrio", "precio": 50.0, "es_principal": true }
                        ]
                    },
                    {
                        "_id": "sello",
                        "nombre": "Sello",
                        "categoria": "sellador",
                        "area_longitud": 2.0,
                        "proveedores": [
                            { "proveedor": "prov-general", "precio": 4.0 }
                        ]
                    }
                ]
            }),
        );
        dir.write(
            "productos/ventana.json",
            json!({
                "success": true,
                "producto": { "_id": "ventana", "nombre": "Ventana", "tipo": "pvc" }
            }),
        );
        dir.write(
            "productos/ventana/materiales.json",
            json!({
                "success": true,
                "materiales": [
                    { "material": "perfil", "formula": "2 * (ancho + alto)" },
                    { "material": "vidrio", "formula": "ancho * alto" },
                    {
                        "material": "sello",
                        "es_dependiente": true,
                        "material_dependencia": "perfil",
                        "multiplicador": 2.0
                    }
                ]
            }),
        );
        dir.write(
            "proveedores.json",
            json!({
                "success": true,
                "proveedores": [
                    { "_id": "prov-general", "nombre": "Perfiles SA" },
                    { "_id": "prov-vidrio", "nombre": "Vidrios SA" }
                ]
            }),
        );
        dir.write(
            "variantes.json",
            json!({
                "success": true,
                "variantes": [
                    { "_id": "blanco", "nombre": "Blanco", "tipo": "pvc" },
                    { "_id": "claro", "nombre": "Claro", "tipo": "vidrio" }
                ]
            }),
        );
    }

    #[tokio::test]
    async fn test_reads_catalog_files() {
        let dir = TempCatalogDir::new();
        seed_window_catalog(&dir);
        let catalog = FileCatalog::new(dir.path.clone());

        let materials = catalog.materials().await.unwrap();
        assert_eq!(materials.len(), 3);

        let product = catalog.product(&ProductId::new("ventana")).await.unwrap();
        assert_eq!(product.nombre, "Ventana");

        let bom = catalog.bom(&ProductId::new("ventana")).await.unwrap();
        assert_eq!(bom.len(), 3);
        assert!(bom[2].is_dependent());

        assert_eq!(catalog.suppliers().await.unwrap().len(), 2);
        assert_eq!(catalog.variants().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_missing_labor_config_is_none() {
        let dir = TempCatalogDir::new();
        let catalog = FileCatalog::new(dir.path.clone());
        assert!(catalog.labor_params().await.unwrap().is_none());

        dir.write(
            "configuracion/mano-obra.json",
            json!({ "success": true, "configuracion": null }),
        );
        assert!(catalog.labor_params().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_missing_product_is_not_found() {
        let dir = TempCatalogDir::new();
        let catalog = FileCatalog::new(dir.path.clone());
        let err = catalog.product(&ProductId::new("puerta")).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_path_like_product_id_is_rejected() {
        let dir = TempCatalogDir::new();
        let catalog = FileCatalog::new(dir.path.clone());
        let err = catalog.bom(&ProductId::new("../secret")).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_rejected_envelope() {
        let dir = TempCatalogDir::new();
        dir.write(
            "proveedores.json",
            json!({ "success": false, "error": "acceso denegado" }),
        );
        let catalog = FileCatalog::new(dir.path.clone());
        let err = catalog.suppliers().await.unwrap_err();
        assert!(matches!(err, CatalogError::Rejected { ref message, .. } if message == "acceso denegado"));
    }
}
