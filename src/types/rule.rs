use std::sync::Arc;

use super::error::EvalError;
use super::expr::Expr;
use super::operand::Operand;
use super::rule_info::RuleInfo;

/// What a rule checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleKind {
    /// Holds when the operand's sign is `0`.
    Zero,
    /// Holds when the absolute value is numerically `1`; the sign is ignored,
    /// so `-1` matches too.
    One,
    /// Holds for the empty operand only.
    Empty,
    /// Always holds; the conventional "other" fallback.
    AlwaysTrue,
    /// Delegates to the expression evaluator.
    Expression(Arc<Expr>),
}

/// A plural case identity paired with the predicate that selects it.
///
/// Rules are immutable and cheap to clone; the permutation tables of an
/// [`EvaluatableCaseSet`](super::EvaluatableCaseSet) hold many copies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    info: Arc<RuleInfo>,
    kind: RuleKind,
}

impl Rule {
    #[must_use]
    pub fn new(info: RuleInfo, kind: RuleKind) -> Self {
        Self {
            info: Arc::new(info),
            kind,
        }
    }

    #[must_use]
    pub fn zero(info: RuleInfo) -> Self {
        Self::new(info, RuleKind::Zero)
    }

    #[must_use]
    pub fn one(info: RuleInfo) -> Self {
        Self::new(info, RuleKind::One)
    }

    #[must_use]
    pub fn empty(info: RuleInfo) -> Self {
        Self::new(info, RuleKind::Empty)
    }

    #[must_use]
    pub fn always_true(info: RuleInfo) -> Self {
        Self::new(info, RuleKind::AlwaysTrue)
    }

    #[must_use]
    pub fn expression(info: RuleInfo, expr: Expr) -> Self {
        Self::new(info, RuleKind::Expression(Arc::new(expr)))
    }

    #[must_use]
    pub fn info(&self) -> &RuleInfo {
        &self.info
    }

    #[must_use]
    pub fn kind(&self) -> &RuleKind {
        &self.kind
    }

    /// Shorthand for `self.info().case()`.
    #[must_use]
    pub fn case(&self) -> &str {
        self.info.case()
    }

    /// `true` only when the optional flag is explicitly set.
    #[must_use]
    pub fn is_optional(&self) -> bool {
        self.info.optional() == Some(true)
    }

    /// Check whether this rule's case applies to `operand`.
    ///
    /// # Errors
    ///
    /// Propagates [`EvalError`] from a malformed expression tree.
    pub fn evaluate(&self, operand: &Operand) -> Result<bool, EvalError> {
        match &self.kind {
            RuleKind::Zero => Ok(operand.sign() == 0),
            RuleKind::One => Ok(operand.n().value_eq(&Operand::from(1_u64))),
            RuleKind::Empty => Ok(operand.is_empty()),
            RuleKind::AlwaysTrue => Ok(true),
            RuleKind::Expression(expr) => crate::evaluate::evaluate_boolean(expr, operand),
        }
    }
}
