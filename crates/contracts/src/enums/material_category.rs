use serde::{Deserialize, Deserializer, Serialize};

/// Категория материала
///
/// Заменяет поиск подстроки в свободном тексте категории: стекло
/// определяется только значением `Vidrio`. Метка из БД сравнивается без
/// учёта регистра и пробелов по краям.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MaterialCategory {
    Perfil,
    Vidrio,
    Herraje,
    Accesorio,
    Malla,
    Sellador,
    #[default]
    Otro,
}

impl MaterialCategory {
    const ALL: [MaterialCategory; 7] = [
        MaterialCategory::Perfil,
        MaterialCategory::Vidrio,
        MaterialCategory::Herraje,
        MaterialCategory::Accesorio,
        MaterialCategory::Malla,
        MaterialCategory::Sellador,
        MaterialCategory::Otro,
    ];

    /// Категория по метке из каталога; неизвестная метка даёт `Otro`
    pub fn from_label(label: &str) -> Self {
        let normalized = label.trim().to_lowercase();
        if normalized.is_empty() {
            return MaterialCategory::Otro;
        }
        match Self::ALL.into_iter().find(|c| c.code() == normalized) {
            Some(category) => category,
            None => {
                tracing::warn!("Unknown material category '{}', using 'otro'", label);
                MaterialCategory::Otro
            }
        }
    }

    /// Получить код категории
    pub fn code(&self) -> &'static str {
        match self {
            MaterialCategory::Perfil => "perfil",
            MaterialCategory::Vidrio => "vidrio",
            MaterialCategory::Herraje => "herraje",
            MaterialCategory::Accesorio => "accesorio",
            MaterialCategory::Malla => "malla",
            MaterialCategory::Sellador => "sellador",
            MaterialCategory::Otro => "otro",
        }
    }

    /// Стекло закупается у отдельного поставщика
    pub fn is_glass(&self) -> bool {
        matches!(self, MaterialCategory::Vidrio)
    }
}

impl<'de> Deserialize<'de> for MaterialCategory {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let label = Option::<String>::deserialize(deserializer)?;
        Ok(label
            .as_deref()
            .map(MaterialCategory::from_label)
            .unwrap_or_default())
    }
}

impl std::fmt::Display for MaterialCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}
