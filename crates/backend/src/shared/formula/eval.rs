use std::collections::HashMap;

use contracts::domain::a001_material::aggregate::MaterialId;
use contracts::domain::a004_product::aggregate::quantity_var;
use contracts::domain::a005_quote::item::Dimensions;

use super::parser::{BinOp, Expr, Func, UnaryOp};
use super::FormulaError;

/// Значения переменных формул
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Variables {
    values: HashMap<String, f64>,
}

impl Variables {
    pub fn new() -> Self {
        Self::default()
    }

    /// Переменные размеров изделия
    pub fn from_dimensions(dimensions: &Dimensions) -> Self {
        let mut vars = Self::new();
        for (name, value) in dimensions.variables() {
            vars.set(name, value);
        }
        vars
    }

    pub fn set(&mut self, name: impl Into<String>, value: f64) {
        self.values.insert(name.into(), value);
    }

    /// Опубликовать рассчитанное количество материала как `cantidad_<id>`
    pub fn set_quantity(&mut self, material: &MaterialId, value: f64) {
        self.values.insert(quantity_var(material), value);
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.values.get(name).copied()
    }
}

/// Результат вычисления
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub value: f64,
    /// Переменные, которых не было в наборе (подставлен 0)
    pub unknown_variables: Vec<String>,
}

pub(super) fn evaluate_ast(
    ast: &Expr,
    source: &str,
    variables: &Variables,
) -> Result<Evaluation, FormulaError> {
    let mut ctx = EvalContext {
        source,
        variables,
        unknown: Vec::new(),
    };
    let value = ctx.eval(ast)?;
    if !value.is_finite() {
        return Err(FormulaError::NonFinite {
            formula: source.to_string(),
        });
    }
    Ok(Evaluation {
        value,
        unknown_variables: ctx.unknown,
    })
}

struct EvalContext<'a> {
    source: &'a str,
    variables: &'a Variables,
    unknown: Vec<String>,
}

impl EvalContext<'_> {
    fn eval(&mut self, expr: &Expr) -> Result<f64, FormulaError> {
        match expr {
            Expr::Number(n) => Ok(*n),
            Expr::Var(name) => Ok(self.lookup(name)),
            Expr::Unary(op, operand) => {
                let v = self.eval(operand)?;
                Ok(match op {
                    UnaryOp::Neg => -v,
                    UnaryOp::Plus => v,
                    UnaryOp::Not => bool_to_num(!truthy(v)),
                })
            }
            Expr::Binary(BinOp::And, lhs, rhs) => {
                if !truthy(self.eval(lhs)?) {
                    return Ok(0.0);
                }
                Ok(bool_to_num(truthy(self.eval(rhs)?)))
            }
            Expr::Binary(BinOp::Or, lhs, rhs) => {
                if truthy(self.eval(lhs)?) {
                    return Ok(1.0);
                }
                Ok(bool_to_num(truthy(self.eval(rhs)?)))
            }
            Expr::Binary(op, lhs, rhs) => {
                let l = self.eval(lhs)?;
                let r = self.eval(rhs)?;
                self.binary(*op, l, r)
            }
            Expr::Ternary(cond, then, otherwise) => {
                if truthy(self.eval(cond)?) {
                    self.eval(then)
                } else {
                    self.eval(otherwise)
                }
            }
            Expr::Call(Func::If, args) => {
                if truthy(self.eval(&args[0])?) {
                    self.eval(&args[1])
                } else {
                    self.eval(&args[2])
                }
            }
            Expr::Call(func, args) => {
                let values = args
                    .iter()
                    .map(|a| self.eval(a))
                    .collect::<Result<Vec<f64>, _>>()?;
                Ok(apply(*func, &values))
            }
        }
    }

    fn lookup(&mut self, name: &str) -> f64 {
        match self.variables.get(name) {
            Some(v) => v,
            None => {
                if !self.unknown.iter().any(|u| u == name) {
                    self.unknown.push(name.to_string());
                }
                0.0
            }
        }
    }

    fn binary(&self, op: BinOp, l: f64, r: f64) -> Result<f64, FormulaError> {
        let value = match op {
            BinOp::Add => l + r,
            BinOp::Sub => l - r,
            BinOp::Mul => l * r,
            BinOp::Div | BinOp::Rem if r == 0.0 => {
                return Err(FormulaError::DivisionByZero {
                    formula: self.source.to_string(),
                })
            }
            BinOp::Div => l / r,
            BinOp::Rem => l % r,
            BinOp::Pow => l.powf(r),
            BinOp::Lt => bool_to_num(l < r),
            BinOp::Le => bool_to_num(l <= r),
            BinOp::Gt => bool_to_num(l > r),
            BinOp::Ge => bool_to_num(l >= r),
            BinOp::Eq => bool_to_num(l == r),
            BinOp::Ne => bool_to_num(l != r),
            BinOp::And | BinOp::Or => unreachable!("short-circuit operators are handled in eval"),
        };
        Ok(value)
    }
}

fn truthy(v: f64) -> bool {
    v != 0.0 && !v.is_nan()
}

fn bool_to_num(b: bool) -> f64 {
    if b {
        1.0
    } else {
        0.0
    }
}

fn apply(func: Func, args: &[f64]) -> f64 {
    let digits = || args.get(1).copied().unwrap_or(0.0);
    match func {
        Func::RoundDown => round_to(args[0], digits(), f64::floor),
        Func::RoundUp => round_to(args[0], digits(), f64::ceil),
        Func::Round => round_to(args[0], digits(), f64::round),
        Func::Floor => round_to(args[0], 0.0, f64::floor),
        Func::Ceil => round_to(args[0], 0.0, f64::ceil),
        Func::Max => args.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        Func::Min => args.iter().copied().fold(f64::INFINITY, f64::min),
        Func::Abs => args[0].abs(),
        Func::If => unreachable!("SI is evaluated lazily"),
    }
}

/// Округление до `digits` знаков заданной функцией.
///
/// Значения, отличающиеся от целого после масштабирования меньше чем на 1e-9,
/// сначала притягиваются к нему: 2.3 * 10 = 22.999999999999996 даёт 23.
fn round_to(value: f64, digits: f64, mode: fn(f64) -> f64) -> f64 {
    let digits = digits.trunc().clamp(-12.0, 12.0) as i32;
    let factor = 10f64.powi(digits.abs());
    let scaled = if digits >= 0 {
        value * factor
    } else {
        value / factor
    };
    let nearest = scaled.round();
    let snapped = if (scaled - nearest).abs() < 1e-9 {
        nearest
    } else {
        scaled
    };
    if digits >= 0 {
        mode(snapped) / factor
    } else {
        mode(snapped) * factor
    }
}
