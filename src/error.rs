use std::sync::Arc;

use thiserror::Error;

use crate::parse::ParseError;
use crate::{ConfigError, EvalError, ResolveError};

/// Unified error type covering evaluation, case-set construction, rule-set
/// resolution, and parsing.
///
/// Returned by convenience methods like
/// [`RuleCollection::evaluate()`](crate::RuleCollection::evaluate) and
/// [`Resolver::evaluate()`](crate::Resolver::evaluate).
#[derive(Debug, Error)]
pub enum PluralError {
    #[error(transparent)]
    Eval(#[from] EvalError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Resolution failures are cached and shared between callers.
    #[error(transparent)]
    Resolve(#[from] Arc<ResolveError>),

    #[error(transparent)]
    Parse(#[from] ParseError),
}

impl From<ResolveError> for PluralError {
    fn from(err: ResolveError) -> Self {
        Self::Resolve(Arc::new(err))
    }
}
