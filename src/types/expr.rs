use std::fmt;
use std::ops::Not;

use super::operand::OperandSymbol;
use super::value::Value;

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum UnaryOp {
    Not,
    Negate,
    OnesComplement,
    Plus,
}

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BinaryOp {
    And,
    Or,
    LogicalAnd,
    LogicalOr,
    Xor,
    Equal,
    NotEqual,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
    Modulo,
    Add,
    Subtract,
    Multiply,
    Divide,
    LeftShift,
    RightShift,
}

impl BinaryOp {
    /// `true` for `<`, `<=`, `>` and `>=`.
    #[must_use]
    pub fn is_relational(self) -> bool {
        matches!(
            self,
            BinaryOp::LessThan
                | BinaryOp::LessThanOrEqual
                | BinaryOp::GreaterThan
                | BinaryOp::GreaterThanOrEqual
        )
    }
}

/// Plural rule expression tree.
///
/// Trees are produced by a parser (see [`parse_rules`](crate::parse::parse_rules)) or
/// by the builder helpers in this module, and are evaluated by
/// [`evaluate_boolean`](crate::evaluate_boolean).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Expr {
    Constant(Value),
    Operand(OperandSymbol),
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    /// Inclusive integer range `min..max`.
    Range {
        min: Box<Expr>,
        max: Box<Expr>,
    },
    /// Comma list; a relation holds if it holds for any member.
    Group(Vec<Expr>),
    Parenthesis(Box<Expr>),
    /// Reserved for extensions; the evaluator resolves no functions.
    Call {
        name: String,
        args: Vec<Expr>,
    },
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnaryOp::Not => write!(f, "not "),
            UnaryOp::Negate => write!(f, "-"),
            UnaryOp::OnesComplement => write!(f, "~"),
            UnaryOp::Plus => write!(f, "+"),
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            BinaryOp::And => "&",
            BinaryOp::Or => "|",
            BinaryOp::LogicalAnd => "and",
            BinaryOp::LogicalOr => "or",
            BinaryOp::Xor => "^",
            BinaryOp::Equal => "=",
            BinaryOp::NotEqual => "!=",
            BinaryOp::LessThan => "<",
            BinaryOp::LessThanOrEqual => "<=",
            BinaryOp::GreaterThan => ">",
            BinaryOp::GreaterThanOrEqual => ">=",
            BinaryOp::Modulo => "%",
            BinaryOp::Add => "+",
            BinaryOp::Subtract => "-",
            BinaryOp::Multiply => "*",
            BinaryOp::Divide => "/",
            BinaryOp::LeftShift => "<<",
            BinaryOp::RightShift => ">>",
        };
        write!(f, "{symbol}")
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Constant(value) => write!(f, "{value}"),
            Expr::Operand(symbol) => write!(f, "{symbol}"),
            Expr::Unary { op, operand } => write!(f, "{op}{operand}"),
            Expr::Binary { op, left, right } => write!(f, "{left} {op} {right}"),
            Expr::Range { min, max } => write!(f, "{min}..{max}"),
            Expr::Group(items) => write_joined(f, items, ","),
            Expr::Parenthesis(inner) => write!(f, "({inner})"),
            Expr::Call { name, args } => {
                write!(f, "{name}(")?;
                write_joined(f, args, ", ")?;
                write!(f, ")")
            }
        }
    }
}

fn write_joined(f: &mut fmt::Formatter<'_>, items: &[Expr], separator: &str) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, "{separator}")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

impl Expr {
    /// Short description of the node kind, used in error messages.
    #[must_use]
    pub fn kind_name(&self) -> String {
        match self {
            Expr::Constant(Value::Bool(_)) => "boolean constant".to_owned(),
            Expr::Constant(Value::Number(_)) => "numeric constant".to_owned(),
            Expr::Operand(symbol) => format!("operand `{symbol}`"),
            Expr::Unary { op, .. } => format!("unary `{}`", op.to_string().trim_end()),
            Expr::Binary { op, .. } => format!("binary `{op}`"),
            Expr::Range { .. } => "range".to_owned(),
            Expr::Group(_) => "group".to_owned(),
            Expr::Parenthesis(_) => "parenthesis".to_owned(),
            Expr::Call { name, .. } => format!("call `{name}`"),
        }
    }

    #[must_use]
    pub fn unary(op: UnaryOp, operand: Expr) -> Expr {
        Expr::Unary {
            op,
            operand: Box::new(operand),
        }
    }

    #[must_use]
    pub fn binary(op: BinaryOp, left: Expr, right: Expr) -> Expr {
        Expr::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    #[must_use]
    pub fn paren(self) -> Expr {
        Expr::Parenthesis(Box::new(self))
    }

    #[must_use]
    pub fn modulo(self, divisor: impl Into<Expr>) -> Expr {
        Expr::binary(BinaryOp::Modulo, self, divisor.into())
    }

    #[must_use]
    pub fn equals(self, other: impl Into<Expr>) -> Expr {
        Expr::binary(BinaryOp::Equal, self, other.into())
    }

    #[must_use]
    pub fn not_equals(self, other: impl Into<Expr>) -> Expr {
        Expr::binary(BinaryOp::NotEqual, self, other.into())
    }

    #[must_use]
    pub fn lt(self, other: impl Into<Expr>) -> Expr {
        Expr::binary(BinaryOp::LessThan, self, other.into())
    }

    #[must_use]
    pub fn lte(self, other: impl Into<Expr>) -> Expr {
        Expr::binary(BinaryOp::LessThanOrEqual, self, other.into())
    }

    #[must_use]
    pub fn gt(self, other: impl Into<Expr>) -> Expr {
        Expr::binary(BinaryOp::GreaterThan, self, other.into())
    }

    #[must_use]
    pub fn gte(self, other: impl Into<Expr>) -> Expr {
        Expr::binary(BinaryOp::GreaterThanOrEqual, self, other.into())
    }

    #[must_use]
    pub fn and(self, other: Expr) -> Expr {
        Expr::binary(BinaryOp::LogicalAnd, self, other)
    }

    #[must_use]
    pub fn or(self, other: Expr) -> Expr {
        Expr::binary(BinaryOp::LogicalOr, self, other)
    }
}

impl Not for Expr {
    type Output = Expr;

    fn not(self) -> Expr {
        Expr::unary(UnaryOp::Not, self)
    }
}

impl From<Value> for Expr {
    fn from(v: Value) -> Self {
        Expr::Constant(v)
    }
}

impl From<i64> for Expr {
    fn from(v: i64) -> Self {
        Expr::Constant(Value::from(v))
    }
}

impl From<i32> for Expr {
    fn from(v: i32) -> Self {
        Expr::Constant(Value::from(v))
    }
}

impl From<bool> for Expr {
    fn from(v: bool) -> Self {
        Expr::Constant(Value::Bool(v))
    }
}

impl From<super::operand::Operand> for Expr {
    fn from(v: super::operand::Operand) -> Self {
        Expr::Constant(Value::Number(v))
    }
}

/// Reference to an operand component, e.g. `operand(OperandSymbol::I)` for `i`.
#[must_use]
pub fn operand(symbol: OperandSymbol) -> Expr {
    Expr::Operand(symbol)
}

#[must_use]
pub fn constant(value: impl Into<Value>) -> Expr {
    Expr::Constant(value.into())
}

#[must_use]
pub fn range(min: impl Into<Expr>, max: impl Into<Expr>) -> Expr {
    Expr::Range {
        min: Box::new(min.into()),
        max: Box::new(max.into()),
    }
}

#[must_use]
pub fn group<T: Into<Expr>>(items: impl IntoIterator<Item = T>) -> Expr {
    Expr::Group(items.into_iter().map(Into::into).collect())
}
