mod error;
mod grammar;

pub use error::ParseError;

use crate::{Rule, RuleCollection};

/// Parse CLDR-style rule text into a [`RuleCollection`].
///
/// Rules that do not name a `RuleSet` in their header get the input text
/// itself as rule set, so a collection resolved from an inline expression can
/// be queried by that same identifier.
///
/// # Errors
///
/// Returns [`ParseError`] if the input is not valid rule syntax.
///
/// # Example
///
/// ```
/// let rules = plurule::parse::parse_rules(
///     "[Category=cardinal,Culture=en,Case=one]n=1 @integer 1[Category=cardinal,Culture=en,Case=other]",
/// )
/// .unwrap();
/// assert_eq!(rules.len(), 2);
/// ```
pub fn parse_rules(input: &str) -> Result<RuleCollection, ParseError> {
    parse_rules_for(input, input)
}

/// Like [`parse_rules`], with an explicit default rule-set name.
///
/// # Errors
///
/// Returns [`ParseError`] if the input is not valid rule syntax.
pub fn parse_rules_for(rule_set: &str, input: &str) -> Result<RuleCollection, ParseError> {
    use winnow::Parser;
    let parsed = grammar::parse_rules.parse(input).map_err(|e| {
        let message = e.inner().to_string();
        let message = if message.is_empty() {
            "invalid rule syntax".to_owned()
        } else {
            message.replace('\n', "; ")
        };
        ParseError::new(message, e.offset())
    })?;

    Ok(parsed
        .into_iter()
        .map(|(info, condition)| {
            let info = if info.rule_set().is_empty() {
                info.with_rule_set(rule_set)
            } else {
                info
            };
            match condition {
                Some(expr) => Rule::expression(info, expr),
                None => Rule::always_true(info),
            }
        })
        .collect())
}
