use std::collections::HashSet;

use contracts::domain::a001_material::aggregate::{Material, MaterialId};
use contracts::domain::a004_product::aggregate::BomLine;
use contracts::domain::a004_product::validation::{BomIssue, DependencyRewrite};
use contracts::domain::common::AggregateId;

use crate::shared::formula::Formula;
use crate::usecases::u501_price_item::bom_graph;

/// Результат проверки спецификации
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BomValidation {
    pub issues: Vec<BomIssue>,
}

impl BomValidation {
    pub fn is_valid(&self) -> bool {
        self.issues.is_empty()
    }
}

/// Проверка спецификации при сохранении изделия.
///
/// В отличие от расчёта, где ошибки данных превращаются в предупреждения,
/// здесь каждая проблема отклоняет спецификацию.
pub fn validate_bom(lines: &[BomLine], materials: &[Material]) -> BomValidation {
    let catalog: HashSet<&MaterialId> = materials.iter().map(|m| &m.id).collect();
    let in_bom: HashSet<&MaterialId> = lines.iter().map(|l| &l.material).collect();
    let mut issues = Vec::new();
    let mut refs: Vec<Vec<MaterialId>> = vec![Vec::new(); lines.len()];

    for (i, line) in lines.iter().enumerate() {
        let material = line.material.clone();

        if !catalog.contains(&line.material) {
            issues.push(BomIssue::UnknownMaterial {
                linea: i,
                material: material.clone(),
            });
        }

        if line.es_dependiente && !line.is_dependent() {
            issues.push(BomIssue::MissingDependency {
                linea: i,
                material,
            });
            continue;
        }

        if let Some(dep) = line.dependency() {
            if !in_bom.contains(dep) {
                issues.push(BomIssue::DependencyOutsideBom {
                    linea: i,
                    material: material.clone(),
                    dependencia: dep.clone(),
                });
            }
            if !line.multiplicador.is_finite() || line.multiplicador <= 0.0 {
                issues.push(BomIssue::InvalidMultiplier {
                    linea: i,
                    material,
                    multiplicador: line.multiplicador,
                });
            }
            continue;
        }

        if line.formula.trim().is_empty() {
            issues.push(BomIssue::EmptyFormula { linea: i, material });
            continue;
        }

        match Formula::parse(&line.formula) {
            Ok(formula) => {
                let line_refs = bom_graph::quantity_refs(&formula);
                for referencia in line_refs.iter().filter(|r| !in_bom.contains(r)) {
                    issues.push(BomIssue::QuantityRefOutsideBom {
                        linea: i,
                        material: material.clone(),
                        referencia: referencia.clone(),
                    });
                }
                refs[i] = line_refs;
            }
            Err(e) => issues.push(BomIssue::InvalidFormula {
                linea: i,
                material,
                formula: line.formula.clone(),
                mensaje: e.to_string(),
            }),
        }
    }

    let steps = bom_graph::plan(lines, &refs);
    for i in bom_graph::cyclic_lines(&steps) {
        issues.push(BomIssue::DependencyCycle {
            linea: i,
            material: lines[i].material.clone(),
        });
    }

    issues.sort_by_key(|issue| issue.line());
    BomValidation { issues }
}

/// Заменить ссылки на зависимость, записанные названием материала, на его ID.
///
/// Совпадение ищется по основному и дополнительным названиям без учёта
/// регистра. При нескольких совпадениях предпочитается материал из этой же
/// спецификации; неоднозначные ссылки не меняются.
pub fn normalize_dependency_refs(
    lines: Vec<BomLine>,
    materials: &[Material],
) -> (Vec<BomLine>, Vec<DependencyRewrite>) {
    let known: HashSet<&MaterialId> = materials.iter().map(|m| &m.id).collect();
    let in_bom: HashSet<MaterialId> = lines.iter().map(|l| l.material.clone()).collect();
    let mut rewrites = Vec::new();

    let lines = lines
        .into_iter()
        .enumerate()
        .map(|(i, mut line)| {
            let Some(dep) = line.dependency() else {
                return line;
            };
            if known.contains(dep) {
                return line;
            }

            let candidates: Vec<&Material> =
                materials.iter().filter(|m| m.matches_name(dep.as_str())).collect();
            let chosen = match candidates.as_slice() {
                [only] => Some(*only),
                [] => None,
                many => {
                    let local: Vec<&&Material> =
                        many.iter().filter(|m| in_bom.contains(&m.id)).collect();
                    match local.as_slice() {
                        [only] => Some(**only),
                        _ => None,
                    }
                }
            };

            if let Some(target) = chosen {
                rewrites.push(DependencyRewrite {
                    linea: i,
                    anterior: dep.as_string(),
                    material: target.id.clone(),
                });
                line.material_dependencia = Some(target.id.clone());
                line.es_dependiente = true;
            }
            line
        })
        .collect();

    (lines, rewrites)
}
