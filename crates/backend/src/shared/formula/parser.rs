use super::eval::{self, Evaluation, Variables};
use super::lexer::{tokenize, Spanned, Token};
use super::FormulaError;

/// Предельная глубина вложенности выражения (скобки, унарные операторы,
/// тернарные ветви, степени)
const MAX_DEPTH: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq)]
pub(super) enum UnaryOp {
    Neg,
    Plus,
    Not,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(super) enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Pow,
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
    And,
    Or,
}

/// Встроенные функции
#[derive(Debug, Clone, Copy, PartialEq)]
pub(super) enum Func {
    RoundDown,
    RoundUp,
    Round,
    Floor,
    Ceil,
    Max,
    Min,
    Abs,
    If,
}

impl Func {
    fn lookup(name: &str) -> Option<Func> {
        let f = match name.to_uppercase().as_str() {
            "REDONDEAR.MENOS" | "ROUNDDOWN" => Func::RoundDown,
            "REDONDEAR.MAS" | "ROUNDUP" => Func::RoundUp,
            "REDONDEAR" | "ROUND" | "MATH.ROUND" => Func::Round,
            "ENTERO" | "MATH.FLOOR" => Func::Floor,
            "MATH.CEIL" => Func::Ceil,
            "MAX" | "MATH.MAX" => Func::Max,
            "MIN" | "MATH.MIN" => Func::Min,
            "ABS" | "MATH.ABS" => Func::Abs,
            "SI" | "IF" => Func::If,
            _ => return None,
        };
        Some(f)
    }

    /// Допустимое число аргументов: (min, max, описание)
    fn arity(&self) -> (usize, usize, &'static str) {
        match self {
            Func::RoundDown | Func::RoundUp | Func::Round => (1, 2, "1 or 2"),
            Func::Floor | Func::Ceil | Func::Abs => (1, 1, "1"),
            Func::Max | Func::Min => (1, usize::MAX, "at least 1"),
            Func::If => (3, 3, "3"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(super) enum Expr {
    Number(f64),
    Var(String),
    Unary(UnaryOp, Box<Expr>),
    Binary(BinOp, Box<Expr>, Box<Expr>),
    Ternary(Box<Expr>, Box<Expr>, Box<Expr>),
    Call(Func, Vec<Expr>),
}

/// Разобранная формула: можно вычислять многократно с разными переменными
#[derive(Debug, Clone, PartialEq)]
pub struct Formula {
    source: String,
    ast: Expr,
}

impl Formula {
    pub fn parse(source: &str) -> Result<Formula, FormulaError> {
        if source.trim().is_empty() {
            return Err(FormulaError::Empty {
                formula: source.to_string(),
            });
        }
        let tokens = tokenize(source)?;
        let mut parser = Parser {
            source,
            tokens,
            cursor: 0,
            depth: 0,
        };
        let ast = parser.expression()?;
        parser.expect(Token::Eof, "end of formula")?;
        Ok(Formula {
            source: source.to_string(),
            ast,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn eval(&self, variables: &Variables) -> Result<Evaluation, FormulaError> {
        eval::evaluate_ast(&self.ast, &self.source, variables)
    }

    /// Имена переменных в порядке первого упоминания, без повторов
    pub fn variables(&self) -> Vec<&str> {
        let mut out = Vec::new();
        collect_vars(&self.ast, &mut out);
        out
    }
}

fn collect_vars<'a>(expr: &'a Expr, out: &mut Vec<&'a str>) {
    match expr {
        Expr::Number(_) => {}
        Expr::Var(name) => {
            if !out.contains(&name.as_str()) {
                out.push(name);
            }
        }
        Expr::Unary(_, e) => collect_vars(e, out),
        Expr::Binary(_, l, r) => {
            collect_vars(l, out);
            collect_vars(r, out);
        }
        Expr::Ternary(c, a, b) => {
            collect_vars(c, out);
            collect_vars(a, out);
            collect_vars(b, out);
        }
        Expr::Call(_, args) => args.iter().for_each(|a| collect_vars(a, out)),
    }
}

struct Parser<'a> {
    source: &'a str,
    tokens: Vec<Spanned>,
    cursor: usize,
    depth: usize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> &Token {
        &self.tokens[self.cursor].token
    }

    fn pos(&self) -> usize {
        self.tokens[self.cursor].pos
    }

    fn advance(&mut self) -> Token {
        let token = self.tokens[self.cursor].token.clone();
        if token != Token::Eof {
            self.cursor += 1;
        }
        token
    }

    fn eat(&mut self, token: &Token) -> bool {
        if self.peek() == token {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, token: Token, what: &str) -> Result<(), FormulaError> {
        if self.eat(&token) {
            Ok(())
        } else {
            Err(self.error(format!("expected {}, found {:?}", what, self.peek())))
        }
    }

    fn error(&self, message: String) -> FormulaError {
        FormulaError::Syntax {
            formula: self.source.to_string(),
            position: self.pos(),
            message,
        }
    }

    /// Рекурсивный шаг разбора с учётом глубины
    fn nested(
        &mut self,
        step: fn(&mut Self) -> Result<Expr, FormulaError>,
    ) -> Result<Expr, FormulaError> {
        if self.depth >= MAX_DEPTH {
            return Err(self.error("formula nested too deeply".to_string()));
        }
        self.depth += 1;
        let result = step(self);
        self.depth -= 1;
        result
    }

    /// Длинная цепочка `a + b + c ...` даёт такое же глубокое дерево,
    /// как вложенные скобки
    fn link(&self, links: &mut usize) -> Result<(), FormulaError> {
        *links += 1;
        if self.depth + *links > MAX_DEPTH {
            return Err(self.error("formula nested too deeply".to_string()));
        }
        Ok(())
    }

    fn expression(&mut self) -> Result<Expr, FormulaError> {
        self.ternary()
    }

    fn ternary(&mut self) -> Result<Expr, FormulaError> {
        self.nested(Self::ternary_inner)
    }

    fn ternary_inner(&mut self) -> Result<Expr, FormulaError> {
        let cond = self.or()?;
        if self.eat(&Token::Question) {
            let then = self.ternary()?;
            self.expect(Token::Colon, "':'")?;
            let otherwise = self.ternary()?;
            return Ok(Expr::Ternary(
                Box::new(cond),
                Box::new(then),
                Box::new(otherwise),
            ));
        }
        Ok(cond)
    }

    fn or(&mut self) -> Result<Expr, FormulaError> {
        let mut lhs = self.and()?;
        let mut links = 0;
        while self.eat(&Token::OrOr) {
            self.link(&mut links)?;
            let rhs = self.and()?;
            lhs = Expr::Binary(BinOp::Or, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn and(&mut self) -> Result<Expr, FormulaError> {
        let mut lhs = self.comparison()?;
        let mut links = 0;
        while self.eat(&Token::AndAnd) {
            self.link(&mut links)?;
            let rhs = self.comparison()?;
            lhs = Expr::Binary(BinOp::And, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn comparison(&mut self) -> Result<Expr, FormulaError> {
        let lhs = self.additive()?;
        let op = match self.peek() {
            Token::Lt => BinOp::Lt,
            Token::Le => BinOp::Le,
            Token::Gt => BinOp::Gt,
            Token::Ge => BinOp::Ge,
            Token::EqEq => BinOp::Eq,
            Token::NotEq => BinOp::Ne,
            _ => return Ok(lhs),
        };
        self.advance();
        let rhs = self.additive()?;
        Ok(Expr::Binary(op, Box::new(lhs), Box::new(rhs)))
    }

    fn additive(&mut self) -> Result<Expr, FormulaError> {
        let mut lhs = self.multiplicative()?;
        let mut links = 0;
        loop {
            let op = match self.peek() {
                Token::Plus => BinOp::Add,
                Token::Minus => BinOp::Sub,
                _ => return Ok(lhs),
            };
            self.advance();
            self.link(&mut links)?;
            let rhs = self.multiplicative()?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
    }

    fn multiplicative(&mut self) -> Result<Expr, FormulaError> {
        let mut lhs = self.unary()?;
        let mut links = 0;
        loop {
            let op = match self.peek() {
                Token::Star => BinOp::Mul,
                Token::Slash => BinOp::Div,
                Token::Percent => BinOp::Rem,
                _ => return Ok(lhs),
            };
            self.advance();
            self.link(&mut links)?;
            let rhs = self.unary()?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
    }

    fn unary(&mut self) -> Result<Expr, FormulaError> {
        self.nested(Self::unary_inner)
    }

    fn unary_inner(&mut self) -> Result<Expr, FormulaError> {
        let op = match self.peek() {
            Token::Minus => UnaryOp::Neg,
            Token::Plus => UnaryOp::Plus,
            Token::Bang => UnaryOp::Not,
            _ => return self.power(),
        };
        self.advance();
        let operand = self.unary()?;
        Ok(Expr::Unary(op, Box::new(operand)))
    }

    // ^ правоассоциативен и связывает сильнее унарного минуса: -2^2 = -4
    fn power(&mut self) -> Result<Expr, FormulaError> {
        let base = self.primary()?;
        if self.eat(&Token::Caret) {
            let exponent = self.unary()?;
            return Ok(Expr::Binary(BinOp::Pow, Box::new(base), Box::new(exponent)));
        }
        Ok(base)
    }

    fn primary(&mut self) -> Result<Expr, FormulaError> {
        let pos = self.pos();
        match self.advance() {
            Token::Num(n) => Ok(Expr::Number(n)),
            Token::LParen => {
                let inner = self.expression()?;
                self.expect(Token::RParen, "')'")?;
                Ok(inner)
            }
            Token::Ident(name) => {
                if self.peek() == &Token::LParen {
                    self.advance();
                    return self.call(name);
                }
                match name.to_lowercase().as_str() {
                    "true" => Ok(Expr::Number(1.0)),
                    "false" => Ok(Expr::Number(0.0)),
                    _ => Ok(Expr::Var(name)),
                }
            }
            other => Err(FormulaError::Syntax {
                formula: self.source.to_string(),
                position: pos,
                message: format!("unexpected {:?}", other),
            }),
        }
    }

    fn call(&mut self, name: String) -> Result<Expr, FormulaError> {
        let func = Func::lookup(&name).ok_or_else(|| FormulaError::UnknownFunction {
            formula: self.source.to_string(),
            name: name.clone(),
        })?;

        let mut args = Vec::new();
        if !self.eat(&Token::RParen) {
            loop {
                args.push(self.expression()?);
                if self.eat(&Token::Comma) {
                    continue;
                }
                self.expect(Token::RParen, "',' or ')'")?;
                break;
            }
        }

        let (min, max, expected) = func.arity();
        if args.len() < min || args.len() > max {
            return Err(FormulaError::Arity {
                formula: self.source.to_string(),
                name,
                expected,
                got: args.len(),
            });
        }
        Ok(Expr::Call(func, args))
    }
}
