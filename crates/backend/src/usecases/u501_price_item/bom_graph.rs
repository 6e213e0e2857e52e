//! Порядок расчёта строк спецификации.
//!
//! Граф строится по строкам: ребро A -> B, если B зависит от материала
//! строки A (через `material_dependencia` или ссылку `cantidad_<id>` в
//! формуле). Строки рассчитываются в топологическом порядке, при равенстве
//! побеждает порядок во входных данных.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

use contracts::domain::a001_material::aggregate::MaterialId;
use contracts::domain::a004_product::aggregate::{BomLine, QUANTITY_VAR_PREFIX};

use crate::shared::formula::Formula;

/// Шаг расчёта
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Рассчитать строку с данным индексом
    Resolve(usize),
    /// Строка входит в цикл зависимостей: количество 0
    Cycle(usize),
}

impl Step {
    pub fn index(&self) -> usize {
        match self {
            Step::Resolve(i) | Step::Cycle(i) => *i,
        }
    }
}

/// Материалы, на количество которых ссылается формула (`cantidad_<id>`)
pub fn quantity_refs(formula: &Formula) -> Vec<MaterialId> {
    formula
        .variables()
        .into_iter()
        .filter_map(|name| name.strip_prefix(QUANTITY_VAR_PREFIX))
        .filter(|id| !id.is_empty())
        .map(MaterialId::new)
        .collect()
}

/// Материалы, от которых зависит строка
fn line_deps<'a>(line: &'a BomLine, refs: &'a [MaterialId]) -> Vec<&'a MaterialId> {
    match line.dependency() {
        Some(dep) => vec![dep],
        None => refs.iter().collect(),
    }
}

/// Построить план расчёта.
///
/// `refs[i]` содержит ссылки формулы строки `i` (пусто для зависимых строк
/// и неразобранных формул). Каждая строка попадает в план ровно один раз.
pub fn plan(lines: &[BomLine], refs: &[Vec<MaterialId>]) -> Vec<Step> {
    let n = lines.len();
    let mut by_material: HashMap<&MaterialId, Vec<usize>> = HashMap::new();
    for (i, line) in lines.iter().enumerate() {
        by_material.entry(&line.material).or_default().push(i);
    }

    let empty = Vec::new();
    let mut successors: Vec<Vec<usize>> = vec![Vec::new(); n];
    let mut indegree = vec![0usize; n];
    for (j, line) in lines.iter().enumerate() {
        let line_refs = refs.get(j).unwrap_or(&empty);
        let mut preds: Vec<usize> = line_deps(line, line_refs)
            .into_iter()
            .filter_map(|m| by_material.get(m))
            .flatten()
            .copied()
            .collect();
        preds.sort_unstable();
        preds.dedup();
        for i in preds {
            successors[i].push(j);
            indegree[j] += 1;
        }
    }

    let mut ready: BinaryHeap<Reverse<usize>> = (0..n)
        .filter(|&i| indegree[i] == 0)
        .map(Reverse)
        .collect();
    let mut done = vec![false; n];
    let mut steps = Vec::with_capacity(n);

    loop {
        while let Some(Reverse(i)) = ready.pop() {
            done[i] = true;
            steps.push(Step::Resolve(i));
            release(i, &successors, &mut indegree, &done, &mut ready);
        }

        if steps.len() == n {
            break;
        }

        // Остались только строки в циклах и строки после них
        let cyclic: Vec<usize> = (0..n)
            .filter(|&i| !done[i] && on_cycle(i, &successors, &done))
            .collect();
        if cyclic.is_empty() {
            break;
        }
        for &i in &cyclic {
            done[i] = true;
            steps.push(Step::Cycle(i));
        }
        for &i in &cyclic {
            release(i, &successors, &mut indegree, &done, &mut ready);
        }
    }

    steps
}

fn release(
    i: usize,
    successors: &[Vec<usize>],
    indegree: &mut [usize],
    done: &[bool],
    ready: &mut BinaryHeap<Reverse<usize>>,
) {
    for &j in &successors[i] {
        indegree[j] -= 1;
        if indegree[j] == 0 && !done[j] {
            ready.push(Reverse(j));
        }
    }
}

/// Достижима ли строка `start` из самой себя по ещё не рассчитанным строкам
fn on_cycle(start: usize, successors: &[Vec<usize>], done: &[bool]) -> bool {
    let mut visited = vec![false; successors.len()];
    let mut stack: Vec<usize> = successors[start].clone();
    while let Some(i) = stack.pop() {
        if i == start {
            return true;
        }
        if done[i] || visited[i] {
            continue;
        }
        visited[i] = true;
        stack.extend(successors[i].iter().copied());
    }
    false
}

/// Строки, попавшие в цикл
pub fn cyclic_lines(steps: &[Step]) -> Vec<usize> {
    steps
        .iter()
        .filter_map(|s| match s {
            Step::Cycle(i) => Some(*i),
            Step::Resolve(_) => None,
        })
        .collect()
}
