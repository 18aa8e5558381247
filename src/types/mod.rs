mod case_set;
mod collection;
mod error;
mod expr;
mod operand;
mod report;
mod rule;
mod rule_info;
mod value;

pub use case_set::EvaluatableCaseSet;
pub use collection::RuleCollection;
pub use error::{BoxError, ConfigError, EvalError, Position, ResolveError};
pub use expr::{BinaryOp, Expr, UnaryOp, constant, group, operand, range};
pub use operand::{MAX_FRACTION_DIGITS, Operand, OperandSymbol};
pub use report::EvaluationReport;
pub use rule::{Rule, RuleKind};
pub use rule_info::RuleInfo;
pub use value::Value;
