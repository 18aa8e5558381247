//! A small built-in excerpt of the CLDR plural rules.
//!
//! Covers cardinal and ordinal rules for `root`, `ar`, `cy`, `de`, `en`, `fr`,
//! `ja`, `pl` and `ru`. English additionally carries an optional exact `zero`
//! case. Cultures are matched literally; there is no fallback from `en-GB` to
//! `en`.

use crate::parse::{ParseError, parse_rules_for};
use crate::{RuleCollection, RuleSetRegistry};

/// Name under which the rules are registered.
pub const RULE_SET: &str = "Unicode.CLDR";

const RULES: &str = "
[Category=cardinal,Culture=root,Case=other] @integer 0~15, 100, 1000 @decimal 0.0~1.5

[Category=cardinal,Culture=ja,Case=other] @integer 0~15, 100, 1000 @decimal 0.0~1.5

[Category=cardinal,Culture=en,Case=zero,Optional=1]n = 0 @integer 0
[Category=cardinal,Culture=en,Case=one]i = 1 and v = 0 @integer 1
[Category=cardinal,Culture=en,Case=other] @integer 0, 2~16, 100 @decimal 0.0~1.5

[Category=cardinal,Culture=de,Case=one]i = 1 and v = 0 @integer 1
[Category=cardinal,Culture=de,Case=other] @integer 0, 2~16, 100 @decimal 0.0~1.5

[Category=cardinal,Culture=fr,Case=one]i = 0,1 @integer 0, 1 @decimal 0.0~1.5
[Category=cardinal,Culture=fr,Case=many]e = 0 and i != 0 and i % 1000000 = 0 and v = 0 or e != 0..5 @integer 1000000
[Category=cardinal,Culture=fr,Case=other] @integer 2~17, 100, 1000 @decimal 2.0~3.5

[Category=cardinal,Culture=ru,Case=one]v = 0 and i % 10 = 1 and i % 100 != 11 @integer 1, 21, 31
[Category=cardinal,Culture=ru,Case=few]v = 0 and i % 10 = 2..4 and i % 100 != 12..14 @integer 2~4, 22~24
[Category=cardinal,Culture=ru,Case=many]v = 0 and i % 10 = 0 or v = 0 and i % 10 = 5..9 or v = 0 and i % 100 = 11..14 @integer 0, 5~19, 100
[Category=cardinal,Culture=ru,Case=other] @decimal 0.0~1.5

[Category=cardinal,Culture=pl,Case=one]i = 1 and v = 0 @integer 1
[Category=cardinal,Culture=pl,Case=few]v = 0 and i % 10 = 2..4 and i % 100 != 12..14 @integer 2~4, 22~24
[Category=cardinal,Culture=pl,Case=many]v = 0 and i != 1 and i % 10 = 0..1 or v = 0 and i % 10 = 5..9 or v = 0 and i % 100 = 12..14 @integer 0, 5~19, 100
[Category=cardinal,Culture=pl,Case=other] @decimal 0.0~1.5

[Category=cardinal,Culture=ar,Case=zero]n = 0 @integer 0
[Category=cardinal,Culture=ar,Case=one]n = 1 @integer 1
[Category=cardinal,Culture=ar,Case=two]n = 2 @integer 2
[Category=cardinal,Culture=ar,Case=few]n % 100 = 3..10 @integer 3~10, 103~110
[Category=cardinal,Culture=ar,Case=many]n % 100 = 11..99 @integer 11~26, 111
[Category=cardinal,Culture=ar,Case=other] @integer 100~102, 200~202 @decimal 0.1~0.9

[Category=cardinal,Culture=cy,Case=zero]n = 0 @integer 0
[Category=cardinal,Culture=cy,Case=one]n = 1 @integer 1
[Category=cardinal,Culture=cy,Case=two]n = 2 @integer 2
[Category=cardinal,Culture=cy,Case=few]n = 3 @integer 3
[Category=cardinal,Culture=cy,Case=many]n = 6 @integer 6
[Category=cardinal,Culture=cy,Case=other] @integer 4, 5, 7~20, 100 @decimal 0.1~0.9

[Category=ordinal,Culture=root,Case=other] @integer 0~15, 100, 1000
[Category=ordinal,Culture=ja,Case=other] @integer 0~15, 100, 1000
[Category=ordinal,Culture=de,Case=other] @integer 0~15, 100, 1000
[Category=ordinal,Culture=ru,Case=other] @integer 0~15, 100, 1000
[Category=ordinal,Culture=pl,Case=other] @integer 0~15, 100, 1000
[Category=ordinal,Culture=ar,Case=other] @integer 0~15, 100, 1000

[Category=ordinal,Culture=en,Case=one]n % 10 = 1 and n % 100 != 11 @integer 1, 21, 31
[Category=ordinal,Culture=en,Case=two]n % 10 = 2 and n % 100 != 12 @integer 2, 22, 32
[Category=ordinal,Culture=en,Case=few]n % 10 = 3 and n % 100 != 13 @integer 3, 23, 33
[Category=ordinal,Culture=en,Case=other] @integer 0, 4~18, 100, 1000

[Category=ordinal,Culture=fr,Case=one]n = 1 @integer 1
[Category=ordinal,Culture=fr,Case=other] @integer 0, 2~16, 100

[Category=ordinal,Culture=cy,Case=zero]n = 0,7,8,9 @integer 0, 7~9
[Category=ordinal,Culture=cy,Case=one]n = 1 @integer 1
[Category=ordinal,Culture=cy,Case=two]n = 2 @integer 2
[Category=ordinal,Culture=cy,Case=few]n = 3,4 @integer 3, 4
[Category=ordinal,Culture=cy,Case=many]n = 5,6 @integer 5, 6
[Category=ordinal,Culture=cy,Case=other] @integer 10~25, 100
";

/// Parse the built-in rules.
///
/// # Errors
///
/// Returns [`ParseError`] only if the embedded rule text is malformed.
pub fn rules() -> Result<RuleCollection, ParseError> {
    parse_rules_for(RULE_SET, RULES)
}

/// A registry holding the built-in rules under [`RULE_SET`].
#[must_use]
pub fn registry() -> RuleSetRegistry {
    RuleSetRegistry::new().register(RULE_SET, || Ok(rules()?))
}
