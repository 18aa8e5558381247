use std::fmt;

/// Identity of a rule, doubling as a query filter.
///
/// As a filter, an empty string field and an `optional` of `None` match
/// anything. As an identity every field is compared literally.
///
/// # Example
///
/// ```
/// use plurule::RuleInfo;
///
/// let rule = RuleInfo::new()
///     .with_category("cardinal")
///     .with_culture("en")
///     .with_case("one")
///     .with_optional(false);
/// let filter = RuleInfo::new().with_culture("en");
/// assert!(rule.matches(&filter));
/// assert!(!rule.matches(&filter.with_case("other")));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RuleInfo {
    rule_set: String,
    category: String,
    culture: String,
    case: String,
    optional: Option<bool>,
}

impl RuleInfo {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_rule_set(mut self, rule_set: impl Into<String>) -> Self {
        self.rule_set = rule_set.into();
        self
    }

    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    #[must_use]
    pub fn with_culture(mut self, culture: impl Into<String>) -> Self {
        self.culture = culture.into();
        self
    }

    #[must_use]
    pub fn with_case(mut self, case: impl Into<String>) -> Self {
        self.case = case.into();
        self
    }

    /// Set the optional flag; `None` is the unknown state.
    #[must_use]
    pub fn with_optional(mut self, optional: impl Into<Option<bool>>) -> Self {
        self.optional = optional.into();
        self
    }

    #[must_use]
    pub fn rule_set(&self) -> &str {
        &self.rule_set
    }

    #[must_use]
    pub fn category(&self) -> &str {
        &self.category
    }

    #[must_use]
    pub fn culture(&self) -> &str {
        &self.culture
    }

    #[must_use]
    pub fn case(&self) -> &str {
        &self.case
    }

    #[must_use]
    pub fn optional(&self) -> Option<bool> {
        self.optional
    }

    /// Tri-state encoding of the optional flag: `-1` unknown, `0` no, `1` yes.
    #[must_use]
    pub fn optional_code(&self) -> i8 {
        match self.optional {
            None => -1,
            Some(false) => 0,
            Some(true) => 1,
        }
    }

    /// `true` if every field is a wildcard.
    #[must_use]
    pub fn is_wildcard(&self) -> bool {
        self.rule_set.is_empty()
            && self.category.is_empty()
            && self.culture.is_empty()
            && self.case.is_empty()
            && self.optional.is_none()
    }

    /// `true` if this identity satisfies every non-wildcard field of `filter`.
    #[must_use]
    pub fn matches(&self, filter: &RuleInfo) -> bool {
        fn field_matches(value: &str, wanted: &str) -> bool {
            wanted.is_empty() || value == wanted
        }
        field_matches(&self.rule_set, &filter.rule_set)
            && field_matches(&self.category, &filter.category)
            && field_matches(&self.culture, &filter.culture)
            && field_matches(&self.case, &filter.case)
            && filter.optional.is_none_or(|wanted| self.optional == Some(wanted))
    }

    /// The `(rule set, category, culture)` part of this filter, with case and
    /// optional flag wildcarded.
    #[must_use]
    pub fn triple(&self) -> RuleInfo {
        RuleInfo {
            rule_set: self.rule_set.clone(),
            category: self.category.clone(),
            culture: self.culture.clone(),
            case: String::new(),
            optional: None,
        }
    }

    /// `true` if case or optional flag narrow the filter beyond its triple.
    #[must_use]
    pub fn narrows_cases(&self) -> bool {
        !self.case.is_empty() || self.optional.is_some()
    }
}

/// Renders the rule header syntax, e.g. `[Category=cardinal,Culture=en,Case=one]`.
impl fmt::Display for RuleInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let optional = self.optional.map(|o| if o { "1" } else { "0" });
        let fields = [
            ("RuleSet", Some(self.rule_set.as_str())),
            ("Category", Some(self.category.as_str())),
            ("Culture", Some(self.culture.as_str())),
            ("Case", Some(self.case.as_str())),
            ("Optional", optional),
        ];
        write!(f, "[")?;
        let mut first = true;
        for (key, value) in fields {
            let Some(value) = value.filter(|v| !v.is_empty()) else {
                continue;
            };
            if !first {
                write!(f, ",")?;
            }
            write!(f, "{key}={value}")?;
            first = false;
        }
        write!(f, "]")
    }
}
