use contracts::shared::labor::LaborParams;
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub catalog: CatalogConfig,
    pub pricing: PricingConfig,
    pub drafts: DraftsConfig,
    /// Параметры работ на случай, если каталог их не вернул
    #[serde(default)]
    pub labor: Option<LaborParams>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CatalogSourceKind {
    Http,
    File,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CatalogConfig {
    pub source: CatalogSourceKind,
    pub base_url: String,
    pub data_dir: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    10
}

#[derive(Debug, Deserialize, Clone)]
pub struct PricingConfig {
    /// Ставка ISV (налога с продаж), доля: 0.15 = 15%
    pub tax_rate: f64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DraftsConfig {
    pub dir: String,
}

/// Default configuration embedded in the binary
const DEFAULT_CONFIG: &str = r#"
[server]
port = 3000

[catalog]
source = "http"
base_url = "http://localhost:3001/api"
data_dir = "data/catalog"
timeout_secs = 10

[pricing]
tax_rate = 0.15

[drafts]
dir = "target/drafts"
"#;

impl Config {
    /// Параметры работ из конфигурации или зашитые значения по умолчанию
    pub fn fallback_labor(&self) -> LaborParams {
        self.labor.clone().unwrap_or_default()
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if !self.pricing.tax_rate.is_finite() || !(0.0..1.0).contains(&self.pricing.tax_rate) {
            anyhow::bail!(
                "pricing.tax_rate must be a fraction in [0, 1), got {}",
                self.pricing.tax_rate
            );
        }
        if self.catalog.source == CatalogSourceKind::Http && self.catalog.base_url.trim().is_empty()
        {
            anyhow::bail!("catalog.base_url is required for the http catalog source");
        }
        Ok(())
    }
}

/// Load configuration from config.toml file
///
/// Search order:
/// 1. Next to the executable (for production)
/// 2. Falls back to embedded default config
pub fn load_config() -> anyhow::Result<Config> {
    // Try to find config.toml next to the executable
    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            let config_path = exe_dir.join("config.toml");

            if config_path.exists() {
                tracing::info!("Loading config from: {}", config_path.display());
                let contents = std::fs::read_to_string(&config_path)?;
                return parse_config(&contents);
            } else {
                tracing::warn!("config.toml not found at: {}", config_path.display());
            }
        }
    }

    // Fall back to default config
    tracing::info!("Using default embedded configuration");
    parse_config(DEFAULT_CONFIG)
}

fn parse_config(contents: &str) -> anyhow::Result<Config> {
    let config: Config = toml::from_str(contents)?;
    config.validate()?;
    Ok(config)
}

/// Resolve a configured path.
/// Relative paths are resolved relative to the executable directory
pub fn resolve_path(configured: &str) -> PathBuf {
    let path = Path::new(configured);

    // If absolute path, use as is
    if path.is_absolute() {
        return path.to_path_buf();
    }

    // If relative path, resolve it relative to the executable directory
    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            return exe_dir.join(path);
        }
    }

    // Fallback: use relative to current directory
    PathBuf::from(configured)
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::enums::material_type::ProductMaterialType;

    #[test]
    fn test_default_config_loads() {
        let config = parse_config(DEFAULT_CONFIG).unwrap();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.catalog.source, CatalogSourceKind::Http);
        assert_eq!(config.pricing.tax_rate, 0.15);
        assert_eq!(config.drafts.dir, "target/drafts");
        assert!(config.labor.is_none());
        assert_eq!(
            config
                .fallback_labor()
                .fabricacion
                .for_type(ProductMaterialType::Pvc)
                .tarifa,
            400.0
        );
    }

    #[test]
    fn test_labor_override_table() {
        let toml = format!(
            "{}\n{}",
            DEFAULT_CONFIG,
            r#"
[labor.fabricacion.pvc]
tarifa = 420
[labor.fabricacion.aluminio]
tarifa = 470
[labor.instalacion.pvc]
tarifa = 210
[labor.instalacion.aluminio]
tarifa = 260
activo = false
[labor.malla]
activo = true
incluye_mano_obra = true
tarifa_mano_obra = 90
materiales_contribuyen = ["m-malla"]
"#
        );
        let config = parse_config(&toml).unwrap();
        let labor = config.fallback_labor();
        assert_eq!(labor.fabricacion.pvc.tarifa, 420.0);
        assert!(!labor.instalacion.aluminio.activo);
        assert!(labor.malla.activo);
        assert_eq!(labor.malla.materiales_contribuyen.len(), 1);
    }

    #[test]
    fn test_rejects_out_of_range_tax_rate() {
        let toml = DEFAULT_CONFIG.replace("tax_rate = 0.15", "tax_rate = 15");
        assert!(parse_config(&toml).is_err());
    }

    #[test]
    fn test_absolute_path_is_kept() {
        let abs = if cfg!(windows) { "C:\\drafts" } else { "/var/drafts" };
        assert_eq!(resolve_path(abs), PathBuf::from(abs));
    }
}
