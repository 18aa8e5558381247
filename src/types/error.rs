use std::error::Error as StdError;
use std::fmt;

use thiserror::Error;

use crate::parse::ParseError;

/// Where in the tree an unsupported node was encountered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position {
    Boolean,
    Numeric,
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Position::Boolean => write!(f, "boolean"),
            Position::Numeric => write!(f, "numeric"),
        }
    }
}

/// Errors raised while evaluating an expression tree against an operand.
///
/// Both variants indicate a malformed tree or an operand that cannot take part
/// in the requested arithmetic. They are never recovered from internally.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvalError {
    #[error("unsupported {kind} in {position} position")]
    UnsupportedOperation { kind: String, position: Position },

    #[error("invalid operation: {reason}")]
    InvalidOperation { reason: String },
}

impl EvalError {
    pub(crate) fn unsupported(kind: impl Into<String>, position: Position) -> Self {
        EvalError::UnsupportedOperation {
            kind: kind.into(),
            position,
        }
    }

    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        EvalError::InvalidOperation {
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{count} optional cases exceed the maximum of {max}")]
    TooManyOptionalCases { count: usize, max: usize },
}

/// Boxed error returned by rule-set factories.
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Failure to turn a rule-set identifier into a rule collection.
///
/// Resolution failures are cached by the [`Resolver`](crate::Resolver), so a
/// second lookup of the same identifier returns the same error value.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("rule-set library '{library}' is not loaded")]
    LibraryNotFound { library: String },

    #[error("rule-set '{name}' not found")]
    RuleSetNotFound { name: String },

    #[error("rule-set '{name}' failed to produce rules: {source}")]
    Factory {
        name: String,
        #[source]
        source: BoxError,
    },

    #[error("rule expression could not be parsed: {0}")]
    Parse(#[from] ParseError),

    #[error("no rule expression parser configured for '{identifier}'")]
    NoParser { identifier: String },
}

impl ResolveError {
    /// `true` when nothing answered to the identifier, as opposed to a rule-set
    /// that was found but could not be built.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            ResolveError::LibraryNotFound { .. } | ResolveError::RuleSetNotFound { .. }
        )
    }
}
