//! CLDR plural-category resolution.
//!
//! A [`Rule`] pairs a case identity ([`RuleInfo`]) with a predicate over a
//! decomposed number ([`Operand`]). A [`RuleCollection`] answers which cases
//! apply to an operand, and a [`Resolver`] maps rule-set identifiers to
//! collections, caching the outcome.

pub mod cldr;
mod compile;
mod error;
mod evaluate;
pub mod parse;
mod resolve;
mod types;

pub use compile::MAX_OPTIONAL_CASES;
pub use error::PluralError;
pub use evaluate::{evaluate_boolean, evaluate_number};
pub use resolve::{
    ExpressionParser, LibraryLoader, RULE_EXPRESSION_SENTINEL, Resolver, ResolverBuilder,
    RuleSetFactory, RuleSetRegistry, TypeResolver, default_type_resolver,
};
pub use types::{
    BinaryOp, BoxError, ConfigError, EvalError, EvaluatableCaseSet, EvaluationReport, Expr,
    MAX_FRACTION_DIGITS, Operand, OperandSymbol, Position, ResolveError, Rule, RuleCollection,
    RuleInfo, RuleKind, UnaryOp, Value, constant, group, operand, range,
};
