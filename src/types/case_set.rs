use std::fmt;
use std::sync::Arc;

use super::collection::RuleCollection;
use super::error::{ConfigError, EvalError};
use super::operand::Operand;
use super::report::EvaluationReport;
use super::rule::Rule;

/// A rule collection compiled for repeated evaluation.
///
/// Optional rules are stored first, then required rules, each group in its
/// original order. For every required rule there is a precomputed result per
/// optional-match bitmask, so evaluation allocates nothing.
///
/// At most [`MAX_OPTIONAL_CASES`](crate::MAX_OPTIONAL_CASES) optional rules
/// are supported.
pub struct EvaluatableCaseSet {
    pub(crate) rules: Box<[Rule]>,
    pub(crate) optional_count: usize,
    /// Indexed by `[required index][optional mask]`.
    pub(crate) permutations: Box<[Box<[Arc<[Rule]>]>]>,
}

impl EvaluatableCaseSet {
    /// Compile `rules` into a case set.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::TooManyOptionalCases`] if `rules` holds more
    /// optional rules than supported.
    pub fn new(rules: &RuleCollection) -> Result<Self, ConfigError> {
        crate::compile::compile(rules)
    }

    /// Matching optional cases in rule order, then the first matching required
    /// case. `Ok(None)` when no required rule holds.
    ///
    /// # Errors
    ///
    /// Propagates [`EvalError`] from a rule's expression.
    pub fn evaluate(&self, operand: &Operand) -> Result<Option<Arc<[Rule]>>, EvalError> {
        crate::evaluate::evaluate_cases(
            &self.rules,
            self.optional_count,
            &self.permutations,
            operand,
        )
    }

    /// Like [`evaluate`](Self::evaluate), but also reports the optional bitmask,
    /// the selected required rule, and timing.
    ///
    /// # Errors
    ///
    /// Propagates [`EvalError`] from a rule's expression.
    pub fn evaluate_detailed(&self, operand: &Operand) -> Result<EvaluationReport, EvalError> {
        crate::evaluate::evaluate_cases_detailed(
            &self.rules,
            self.optional_count,
            &self.permutations,
            operand,
        )
    }

    #[must_use]
    pub fn optional_case_count(&self) -> usize {
        self.optional_count
    }

    #[must_use]
    pub fn required_case_count(&self) -> usize {
        self.rules.len() - self.optional_count
    }

    /// Total entries in the permutation table.
    #[must_use]
    pub fn permutation_count(&self) -> usize {
        self.permutations.iter().map(|row| row.len()).sum()
    }

    /// The precomputed result for a required rule and optional-match bitmask.
    #[must_use]
    pub fn permutation(&self, required_index: usize, mask: usize) -> Option<&[Rule]> {
        self.permutations
            .get(required_index)?
            .get(mask)
            .map(|rules| &**rules)
    }

    /// Rules in evaluation order: optional first, then required.
    #[must_use]
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }
}

impl fmt::Debug for EvaluatableCaseSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EvaluatableCaseSet")
            .field("optional", &self.optional_count)
            .field("required", &self.required_case_count())
            .field("permutations", &self.permutation_count())
            .finish()
    }
}
