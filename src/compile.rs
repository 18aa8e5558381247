use std::sync::Arc;

use tracing::debug;

use crate::{ConfigError, EvaluatableCaseSet, Rule, RuleCollection};

/// Upper bound on optional rules in a single case set; the permutation table
/// grows as `2^k` in the optional count.
pub const MAX_OPTIONAL_CASES: usize = 10;

pub(crate) fn compile(rules: &RuleCollection) -> Result<EvaluatableCaseSet, ConfigError> {
    let (optional, required): (Vec<Rule>, Vec<Rule>) =
        rules.iter().cloned().partition(Rule::is_optional);
    check_optional_count(optional.len())?;

    let permutations: Box<[Box<[Arc<[Rule]>]>]> = required
        .iter()
        .map(|rule| permutations_for(&optional, rule))
        .collect();

    debug!(
        optional = optional.len(),
        required = required.len(),
        permutations = required.len() << optional.len(),
        "compiled case set"
    );

    let optional_count = optional.len();
    let mut ordered = optional;
    ordered.extend(required);
    Ok(EvaluatableCaseSet {
        rules: ordered.into_boxed_slice(),
        optional_count,
        permutations,
    })
}

fn check_optional_count(count: usize) -> Result<(), ConfigError> {
    if count > MAX_OPTIONAL_CASES {
        return Err(ConfigError::TooManyOptionalCases {
            count,
            max: MAX_OPTIONAL_CASES,
        });
    }
    Ok(())
}

/// One entry per optional-match bitmask: the optional rules whose bit is set,
/// in rule order, followed by `required`.
fn permutations_for(optional: &[Rule], required: &Rule) -> Box<[Arc<[Rule]>]> {
    (0..1_usize << optional.len())
        .map(|mask| {
            optional
                .iter()
                .enumerate()
                .filter(|(bit, _)| mask & (1 << bit) != 0)
                .map(|(_, rule)| rule.clone())
                .chain(std::iter::once(required.clone()))
                .collect()
        })
        .collect()
}
