use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use super::rule::Rule;

/// Detailed evaluation report returned by
/// [`EvaluatableCaseSet::evaluate_detailed()`](super::EvaluatableCaseSet::evaluate_detailed).
///
/// Contains the resolved case list, the optional-match bitmask, the required
/// rule that was selected, and the wall-clock duration of the evaluation.
#[derive(Debug, Clone)]
#[must_use]
pub struct EvaluationReport {
    cases: Option<Arc<[Rule]>>,
    optional_mask: usize,
    required: Option<Rule>,
    duration: Duration,
}

impl EvaluationReport {
    pub(crate) fn new(
        cases: Option<Arc<[Rule]>>,
        optional_mask: usize,
        required: Option<Rule>,
        duration: Duration,
    ) -> Self {
        Self {
            cases,
            optional_mask,
            required,
            duration,
        }
    }

    /// The matched cases, same as
    /// [`EvaluatableCaseSet::evaluate()`](super::EvaluatableCaseSet::evaluate).
    #[must_use]
    pub fn cases(&self) -> Option<&[Rule]> {
        self.cases.as_deref()
    }

    /// Bit `k` is set when the `k`-th optional rule held.
    #[must_use]
    pub fn optional_mask(&self) -> usize {
        self.optional_mask
    }

    /// The first required rule that held.
    #[must_use]
    pub fn required(&self) -> Option<&Rule> {
        self.required.as_ref()
    }

    #[must_use]
    pub fn duration(&self) -> Duration {
        self.duration
    }
}

impl fmt::Display for EvaluationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.cases {
            Some(cases) => {
                let names: Vec<&str> = cases.iter().map(Rule::case).collect();
                write!(f, "cases: [{}]", names.join(", "))?;
            }
            None => write!(f, "cases: none")?,
        }
        write!(f, ", optional mask: {:#b}", self.optional_mask)?;
        write!(f, ", duration: {:?}", self.duration)?;
        Ok(())
    }
}
