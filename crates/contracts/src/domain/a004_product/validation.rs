use std::collections::HashMap;

use crate::domain::a001_material::aggregate::MaterialId;
use crate::domain::a005_quote::item::Dimensions;
use serde::{Deserialize, Serialize};

use super::aggregate::BomLine;

/// Проблема спецификации, найденная при вводе данных.
///
/// `linea`: индекс строки в присланном списке (с нуля).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "tipo", rename_all = "snake_case")]
pub enum BomIssue {
    InvalidFormula {
        linea: usize,
        material: MaterialId,
        formula: String,
        mensaje: String,
    },
    EmptyFormula {
        linea: usize,
        material: MaterialId,
    },
    UnknownMaterial {
        linea: usize,
        material: MaterialId,
    },
    /// `es_dependiente` без `material_dependencia`
    MissingDependency {
        linea: usize,
        material: MaterialId,
    },
    DependencyOutsideBom {
        linea: usize,
        material: MaterialId,
        dependencia: MaterialId,
    },
    InvalidMultiplier {
        linea: usize,
        material: MaterialId,
        multiplicador: f64,
    },
    DependencyCycle {
        linea: usize,
        material: MaterialId,
    },
    /// Ссылка `cantidad_<id>` на материал вне спецификации
    QuantityRefOutsideBom {
        linea: usize,
        material: MaterialId,
        referencia: MaterialId,
    },
}

impl BomIssue {
    pub fn line(&self) -> usize {
        match self {
            BomIssue::InvalidFormula { linea, .. }
            | BomIssue::EmptyFormula { linea, .. }
            | BomIssue::UnknownMaterial { linea, .. }
            | BomIssue::MissingDependency { linea, .. }
            | BomIssue::DependencyOutsideBom { linea, .. }
            | BomIssue::InvalidMultiplier { linea, .. }
            | BomIssue::DependencyCycle { linea, .. }
            | BomIssue::QuantityRefOutsideBom { linea, .. } => *linea,
        }
    }
}

/// Замена ссылки на зависимость по имени на ID материала
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DependencyRewrite {
    pub linea: usize,
    pub anterior: String,
    pub material: MaterialId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidateBomRequest {
    pub lineas: Vec<BomLine>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidateBomResponse {
    /// Строки после нормализации ссылок
    pub lineas: Vec<BomLine>,
    pub reescrituras: Vec<DependencyRewrite>,
    pub problemas: Vec<BomIssue>,
    pub valido: bool,
}

/// Пробное вычисление формулы из формы редактирования спецификации
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluateFormulaRequest {
    pub formula: String,
    #[serde(default)]
    pub dimensiones: Option<Dimensions>,
    /// Дополнительные переменные, например `cantidad_<id>`
    #[serde(default)]
    pub variables: HashMap<String, f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluateFormulaResponse {
    pub valor: Option<f64>,
    #[serde(default)]
    pub variables_desconocidas: Vec<String>,
    /// Переменные, на которые ссылается формула
    #[serde(default)]
    pub referencias: Vec<String>,
    #[serde(default)]
    pub error: Option<String>,
}
