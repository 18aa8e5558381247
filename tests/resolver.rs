use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use plurule::parse::ParseError;
use plurule::{
    LibraryLoader, Operand, PluralError, ResolveError, Resolver, Rule, RuleCollection, RuleInfo,
    RuleSetRegistry,
};
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn other_only() -> RuleCollection {
    RuleCollection::new([Rule::always_true(RuleInfo::new().with_case("other"))])
}

fn last_case(resolver: &Resolver, filter: &RuleInfo, value: i64) -> Option<String> {
    resolver
        .evaluate(filter, &Operand::from(value))
        .unwrap()
        .and_then(|matched| matched.last().map(|r| r.case().to_owned()))
}

#[test]
fn default_resolver_knows_cldr() {
    init_tracing();
    let resolver = Resolver::default();
    let en = RuleInfo::new()
        .with_rule_set(plurule::cldr::RULE_SET)
        .with_category("cardinal")
        .with_culture("en");
    assert_eq!(last_case(&resolver, &en, 1).as_deref(), Some("one"));
    assert_eq!(last_case(&resolver, &en, 7).as_deref(), Some("other"));

    let dotted_as_path = en.clone().with_rule_set("Unicode::CLDR");
    assert_eq!(last_case(&resolver, &dotted_as_path, 1).as_deref(), Some("one"));
}

#[test]
fn each_identifier_is_built_once() {
    init_tracing();
    let builds = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&builds);
    let resolver = Resolver::builder()
        .default_library(RuleSetRegistry::new().register("Counted", move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(other_only())
        }))
        .build();

    let first = resolver.resolve("Counted").unwrap();
    let second = resolver.resolve("Counted").unwrap();
    assert_eq!(builds.load(Ordering::SeqCst), 1);
    assert!(std::ptr::eq(first.as_slice(), second.as_slice()));

    // Whitespace makes a different identifier but the same rule set.
    resolver.resolve(" Counted ").unwrap();
    assert_eq!(builds.load(Ordering::SeqCst), 2);
    assert_eq!(resolver.cached_len(), 2);
}

#[test]
fn failures_are_cached() {
    init_tracing();
    let attempts = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&attempts);
    let resolver = Resolver::builder()
        .default_library(RuleSetRegistry::new().register("Broken", move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Err("rule data is corrupt".into())
        }))
        .build();

    let first = resolver.resolve("Broken").unwrap_err();
    let second = resolver.resolve("Broken").unwrap_err();
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(attempts.load(Ordering::SeqCst), 1);
    assert!(!first.is_not_found());
    assert!(first.to_string().contains("rule data is corrupt"));
}

#[test]
fn unknown_names() {
    let resolver = Resolver::default();

    let err = resolver.resolve("Unicode.CLDR99").unwrap_err();
    assert!(matches!(*err, ResolveError::RuleSetNotFound { ref name } if name == "Unicode.CLDR99"));

    let err = resolver.resolve("Unicode.CLDR, Missing.Library").unwrap_err();
    assert!(matches!(*err, ResolveError::LibraryNotFound { ref library } if library == "Missing.Library"));
    assert!(err.is_not_found());
}

#[test]
fn empty_identifier_is_empty_collection() {
    let resolver = Resolver::builder().without_default_library().build();
    assert!(resolver.resolve("").unwrap().is_empty());
    assert_eq!(
        last_case(&resolver, &RuleInfo::new().with_category("cardinal"), 1),
        None
    );
}

#[test]
fn inline_rule_text_is_parsed() {
    init_tracing();
    let resolver = Resolver::default();
    let text = "[Category=cardinal,Culture=xx,Case=one]n = 1[Category=cardinal,Culture=xx,Case=other]";

    let rules = resolver.resolve(text).unwrap();
    assert_eq!(rules.len(), 2);
    assert!(rules.iter().all(|r| r.info().rule_set() == text));

    let filter = RuleInfo::new()
        .with_rule_set(text)
        .with_category("cardinal")
        .with_culture("xx");
    assert_eq!(last_case(&resolver, &filter, 1).as_deref(), Some("one"));
    assert_eq!(last_case(&resolver, &filter, 2).as_deref(), Some("other"));
}

#[test]
fn inline_syntax_errors_are_resolve_errors() {
    let resolver = Resolver::default();
    let err = resolver.resolve("[Case=one] n =").unwrap_err();
    assert!(matches!(*err, ResolveError::Parse(_)));

    let filter = RuleInfo::new().with_rule_set("[Case=one] n =");
    assert!(matches!(
        resolver.evaluate(&filter, &Operand::from(1_i64)),
        Err(PluralError::Resolve(_))
    ));
}

#[test]
fn custom_parser_receives_inline_text() {
    let seen = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&seen);
    let resolver = Resolver::builder()
        .parser(move |text: &str| {
            counter.fetch_add(1, Ordering::SeqCst);
            if text.len() > 3 {
                Ok(other_only())
            } else {
                Err(ParseError::new("too short", 0))
            }
        })
        .build();

    assert_eq!(resolver.resolve("[custom rules]").unwrap().len(), 1);
    assert!(resolver.resolve("[x]").is_err());
    assert_eq!(seen.load(Ordering::SeqCst), 2);
}

#[test]
fn missing_parser_is_reported() {
    let resolver = Resolver::builder().without_parser().build();
    let err = resolver.resolve("[Case=one] n = 1").unwrap_err();
    assert!(matches!(*err, ResolveError::NoParser { .. }));
}

struct DirectoryLoader {
    loads: Arc<AtomicUsize>,
}

impl LibraryLoader for DirectoryLoader {
    fn load(&self, name: &str) -> Option<Arc<RuleSetRegistry>> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        (name == "Plugins.Extra").then(|| {
            Arc::new(RuleSetRegistry::new().register("Extra.Rules", || Ok(other_only())))
        })
    }
}

#[test]
fn loader_supplies_unknown_libraries() {
    init_tracing();
    let loads = Arc::new(AtomicUsize::new(0));
    let resolver = Resolver::builder()
        .loader(DirectoryLoader {
            loads: Arc::clone(&loads),
        })
        .build();

    let rules = resolver.resolve("Extra.Rules, Plugins.Extra").unwrap();
    assert_eq!(rules.len(), 1);
    assert!(resolver.resolve("Extra.Rules, Plugins.Extra").is_ok());
    assert_eq!(loads.load(Ordering::SeqCst), 1);

    // Remapped name, same library; a new identifier asks the loader again.
    assert!(resolver.resolve("Extra::Rules, Plugins.Extra").is_ok());
    assert_eq!(loads.load(Ordering::SeqCst), 2);

    let err = resolver.resolve("Extra.Rules, Plugins.Missing").unwrap_err();
    assert!(matches!(*err, ResolveError::LibraryNotFound { .. }));
}

#[test]
fn registered_library_wins_over_loader() {
    let loads = Arc::new(AtomicUsize::new(0));
    let resolver = Resolver::builder()
        .library(
            "Plugins.Extra",
            RuleSetRegistry::new().register("Extra.Rules", || {
                Ok(RuleCollection::new([
                    Rule::one(RuleInfo::new().with_case("one")),
                    Rule::always_true(RuleInfo::new().with_case("other")),
                ]))
            }),
        )
        .loader(DirectoryLoader {
            loads: Arc::clone(&loads),
        })
        .build();
    assert_eq!(resolver.resolve("Extra.Rules, Plugins.Extra").unwrap().len(), 2);
    assert_eq!(loads.load(Ordering::SeqCst), 0);
}

#[test]
fn type_resolver_runs_once_per_identifier() {
    let lookups = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&lookups);
    let resolver = Resolver::builder()
        .default_library(RuleSetRegistry::new().register("Counted", || Ok(other_only())))
        .type_resolver(move |registry: &RuleSetRegistry, name: &str| {
            counter.fetch_add(1, Ordering::SeqCst);
            registry.get(name)
        })
        .build();

    resolver.resolve("Counted").unwrap();
    resolver.resolve("Counted").unwrap();
    assert_eq!(lookups.load(Ordering::SeqCst), 1);

    resolver.resolve("Missing").unwrap_err();
    resolver.resolve("Missing").unwrap_err();
    assert_eq!(lookups.load(Ordering::SeqCst), 2);
}

#[test]
fn custom_type_resolver() {
    let resolver = Resolver::builder()
        .default_library(RuleSetRegistry::new().register("rules", || Ok(other_only())))
        .type_resolver(|registry: &RuleSetRegistry, name: &str| {
            registry.get(&name.to_ascii_lowercase())
        })
        .build();
    assert!(resolver.resolve("RULES").is_ok());
    assert!(resolver.resolve("Unicode.CLDR").is_err());
}

#[test]
fn rule_set_field_is_not_a_filter_after_resolution() {
    let resolver = Resolver::builder()
        .default_library(RuleSetRegistry::new().register("Alias", || {
            plurule::cldr::rules().map_err(Into::into)
        }))
        .build();
    let filter = RuleInfo::new()
        .with_rule_set("Alias")
        .with_category("cardinal")
        .with_culture("ru");
    assert_eq!(last_case(&resolver, &filter, 3).as_deref(), Some("few"));
}
