//! Вычислитель формул количества материалов.
//!
//! Небольшой язык выражений над размерами изделия (`ancho`, `alto`,
//! `divisionHorizontal`...) и уже рассчитанными количествами
//! (`cantidad_<materialId>`). Неизвестные переменные равны 0.

mod eval;
mod lexer;
mod parser;

pub use eval::{Evaluation, Variables};
pub use parser::Formula;

use thiserror::Error;

/// Ошибка разбора или вычисления формулы; всегда содержит исходный текст
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FormulaError {
    #[error("empty formula")]
    Empty { formula: String },

    #[error("syntax error in formula '{formula}' at {position}: {message}")]
    Syntax {
        formula: String,
        position: usize,
        message: String,
    },

    #[error("unknown function '{name}' in formula '{formula}'")]
    UnknownFunction { formula: String, name: String },

    #[error("function '{name}' expects {expected} argument(s), got {got} in formula '{formula}'")]
    Arity {
        formula: String,
        name: String,
        expected: &'static str,
        got: usize,
    },

    #[error("division by zero in formula '{formula}'")]
    DivisionByZero { formula: String },

    #[error("formula '{formula}' produced a non-finite value")]
    NonFinite { formula: String },
}

impl FormulaError {
    /// Текст формулы, вызвавшей ошибку
    pub fn formula(&self) -> &str {
        match self {
            FormulaError::Empty { formula }
            | FormulaError::Syntax { formula, .. }
            | FormulaError::UnknownFunction { formula, .. }
            | FormulaError::Arity { formula, .. }
            | FormulaError::DivisionByZero { formula }
            | FormulaError::NonFinite { formula } => formula,
        }
    }
}

/// Разобрать и вычислить формулу за один вызов
pub fn evaluate(formula: &str, variables: &Variables) -> Result<Evaluation, FormulaError> {
    Formula::parse(formula)?.eval(variables)
}
