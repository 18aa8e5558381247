use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use super::case_set::EvaluatableCaseSet;
use super::error::{ConfigError, EvalError};
use super::operand::Operand;
use super::rule::Rule;
use super::rule_info::RuleInfo;
use crate::error::PluralError;

type CaseSetCache = RwLock<HashMap<RuleInfo, Arc<EvaluatableCaseSet>>>;

/// An ordered, immutable collection of rules.
///
/// Cloning is cheap: clones share the rules and the per-`(rule set, category,
/// culture)` cache of compiled [`EvaluatableCaseSet`]s.
///
/// # Example
///
/// ```
/// use plurule::{Operand, OperandSymbol, Rule, RuleCollection, RuleInfo, operand};
///
/// let en = RuleInfo::new().with_category("cardinal").with_culture("en");
/// let rules = RuleCollection::new([
///     Rule::expression(en.clone().with_case("one"), operand(OperandSymbol::N).equals(1)),
///     Rule::always_true(en.clone().with_case("other")),
/// ]);
///
/// let cases = rules.evaluate(&en, &Operand::from(2_i64)).unwrap().unwrap();
/// assert_eq!(cases[0].case(), "other");
/// ```
#[derive(Clone)]
pub struct RuleCollection {
    rules: Arc<[Rule]>,
    case_sets: Arc<CaseSetCache>,
}

impl RuleCollection {
    #[must_use]
    pub fn new(rules: impl IntoIterator<Item = Rule>) -> Self {
        Self {
            rules: rules.into_iter().collect(),
            case_sets: Arc::default(),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Rule> {
        self.rules.iter()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[Rule] {
        &self.rules
    }

    /// The rules whose identity matches every non-wildcard field of `filter`,
    /// in insertion order.
    ///
    /// A wildcard filter returns a clone sharing this collection's storage.
    #[must_use]
    pub fn query(&self, filter: &RuleInfo) -> RuleCollection {
        if filter.is_wildcard() {
            return self.clone();
        }
        RuleCollection::new(self.rules.iter().filter(|r| r.info().matches(filter)).cloned())
    }

    /// The compiled case set for the `(rule set, category, culture)` triple of
    /// `filter`. Built on first use and cached.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the triple has more optional cases than an
    /// [`EvaluatableCaseSet`] supports.
    pub fn case_set(&self, filter: &RuleInfo) -> Result<Arc<EvaluatableCaseSet>, ConfigError> {
        let key = filter.triple();
        if let Some(found) = self
            .case_sets
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
        {
            return Ok(Arc::clone(found));
        }

        let built = Arc::new(EvaluatableCaseSet::new(&self.query(&key))?);
        let mut cache = self
            .case_sets
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        Ok(Arc::clone(cache.entry(key).or_insert(built)))
    }

    /// The cases that apply to `operand`: matching optional cases first, in
    /// rule order, then the single required case that matched.
    ///
    /// Rules are restricted to the triple of `filter`; a case or optional flag
    /// in `filter` further narrows the returned list. `Ok(None)` means no
    /// required rule matched (or nothing survived the narrowing).
    ///
    /// # Errors
    ///
    /// Returns [`PluralError`] if the case set cannot be built or a rule's
    /// expression fails to evaluate.
    pub fn evaluate(
        &self,
        filter: &RuleInfo,
        operand: &Operand,
    ) -> Result<Option<Arc<[Rule]>>, PluralError> {
        let matched = self.case_set(filter)?.evaluate(operand)?;
        Ok(narrow(matched, filter))
    }

    /// Linear-scan evaluation with the same output contract as
    /// [`evaluate`](Self::evaluate), without compiling a case set.
    ///
    /// # Errors
    ///
    /// Propagates [`EvalError`] from a rule's expression.
    pub fn evaluate_linear(
        &self,
        filter: &RuleInfo,
        operand: &Operand,
    ) -> Result<Option<Arc<[Rule]>>, EvalError> {
        let key = filter.triple();
        let candidates = self.rules.iter().filter(|r| r.info().matches(&key));

        let mut optional = Vec::new();
        let mut required = None;
        for rule in candidates {
            if rule.is_optional() {
                if rule.evaluate(operand)? {
                    optional.push(rule.clone());
                }
            } else if required.is_none() && rule.evaluate(operand)? {
                required = Some(rule.clone());
            }
        }

        let matched = required.map(|rule| {
            optional.push(rule);
            Arc::from(optional)
        });
        Ok(narrow(matched, filter))
    }
}

fn narrow(matched: Option<Arc<[Rule]>>, filter: &RuleInfo) -> Option<Arc<[Rule]>> {
    let matched = matched?;
    if !filter.narrows_cases() {
        return Some(matched);
    }
    let narrowed: Arc<[Rule]> = matched
        .iter()
        .filter(|r| r.info().matches(filter))
        .cloned()
        .collect();
    (!narrowed.is_empty()).then_some(narrowed)
}

impl Default for RuleCollection {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl FromIterator<Rule> for RuleCollection {
    fn from_iter<I: IntoIterator<Item = Rule>>(iter: I) -> Self {
        Self::new(iter)
    }
}

impl<'a> IntoIterator for &'a RuleCollection {
    type Item = &'a Rule;
    type IntoIter = std::slice::Iter<'a, Rule>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl fmt::Debug for RuleCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleCollection")
            .field("rules", &self.rules)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for RuleCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RuleCollection({} rules)", self.rules.len())
    }
}
