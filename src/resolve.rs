use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use tracing::{debug, trace, warn};

use crate::error::PluralError;
use crate::parse::ParseError;
use crate::{BoxError, Operand, ResolveError, Rule, RuleCollection, RuleInfo};

/// Identifiers starting with this character are inline rule expressions.
pub const RULE_EXPRESSION_SENTINEL: char = '[';

/// Produces the rules of a named rule set.
pub type RuleSetFactory = Arc<dyn Fn() -> Result<RuleCollection, BoxError> + Send + Sync>;

/// Turns inline rule text (an identifier starting with `[`) into rules.
pub type ExpressionParser = Arc<dyn Fn(&str) -> Result<RuleCollection, ParseError> + Send + Sync>;

/// Finds the factory for a rule-set name inside a library.
pub type TypeResolver =
    Arc<dyn Fn(&RuleSetRegistry, &str) -> Option<RuleSetFactory> + Send + Sync>;

/// A library of rule-set factories keyed by name, populated at startup.
///
/// # Example
///
/// ```
/// use plurule::{Rule, RuleCollection, RuleInfo, RuleSetRegistry};
///
/// let registry = RuleSetRegistry::new().register("My.Rules", || {
///     Ok(RuleCollection::new([Rule::always_true(RuleInfo::new().with_case("other"))]))
/// });
/// assert!(registry.contains("My.Rules"));
/// ```
#[derive(Clone, Default)]
pub struct RuleSetRegistry {
    factories: HashMap<String, RuleSetFactory>,
}

impl RuleSetRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `factory` under `name`, replacing any earlier registration.
    #[must_use]
    pub fn register<F>(mut self, name: impl Into<String>, factory: F) -> Self
    where
        F: Fn() -> Result<RuleCollection, BoxError> + Send + Sync + 'static,
    {
        self.factories.insert(name.into(), Arc::new(factory));
        self
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<RuleSetFactory> {
        self.factories.get(name).cloned()
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.factories.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

impl fmt::Debug for RuleSetRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.names().collect();
        names.sort_unstable();
        f.debug_struct("RuleSetRegistry")
            .field("rule_sets", &names)
            .finish()
    }
}

/// Supplies libraries that were not registered with the resolver up front,
/// e.g. plugins loaded on demand.
pub trait LibraryLoader: Send + Sync {
    /// The library called `name`, or `None` if this loader does not know it.
    fn load(&self, name: &str) -> Option<Arc<RuleSetRegistry>>;
}

/// Looks `name` up as given, then with `.` and `::` path separators swapped.
#[must_use]
pub fn default_type_resolver(registry: &RuleSetRegistry, name: &str) -> Option<RuleSetFactory> {
    registry.get(name).or_else(|| {
        let remapped = if name.contains("::") {
            name.replace("::", ".")
        } else {
            name.replace('.', "::")
        };
        (remapped != name).then(|| registry.get(&remapped)).flatten()
    })
}

type ResolveCache = RwLock<HashMap<String, Result<RuleCollection, Arc<ResolveError>>>>;

/// Maps rule-set identifiers to rule collections and remembers the outcome.
///
/// An identifier is one of:
/// - empty: resolves to an empty collection;
/// - inline rule text starting with `[`: handed to the configured parser;
/// - `"Name, Library"` or `"Name"`: `Name` is looked up in the named library,
///   or in the default library when no library is given.
///
/// Each identifier is resolved at most once per resolver; failures are cached
/// like successes. Concurrent first lookups may both compute, but only the
/// first published result is ever returned.
///
/// # Example
///
/// ```
/// use plurule::{Operand, Resolver, RuleInfo};
///
/// let resolver = Resolver::default();
/// let filter = RuleInfo::new()
///     .with_rule_set("Unicode.CLDR")
///     .with_category("cardinal")
///     .with_culture("en");
/// let cases = resolver.evaluate(&filter, &Operand::from(1_i64)).unwrap().unwrap();
/// assert_eq!(cases.last().map(|r| r.case()), Some("one"));
/// ```
pub struct Resolver {
    libraries: HashMap<String, Arc<RuleSetRegistry>>,
    default_library: Option<Arc<RuleSetRegistry>>,
    loader: Option<Arc<dyn LibraryLoader>>,
    type_resolver: TypeResolver,
    parser: Option<ExpressionParser>,
    cache: ResolveCache,
}

impl Resolver {
    #[must_use]
    pub fn builder() -> ResolverBuilder {
        ResolverBuilder::new()
    }

    /// Resolve `identifier` to a rule collection, from cache if possible.
    ///
    /// # Errors
    ///
    /// Returns the (cached) [`ResolveError`] if the identifier names nothing
    /// known or its rules could not be produced.
    pub fn resolve(&self, identifier: &str) -> Result<RuleCollection, Arc<ResolveError>> {
        if let Some(cached) = self
            .cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(identifier)
        {
            trace!(identifier, "rule set cache hit");
            return cached.clone();
        }

        debug!(identifier, "resolving rule set");
        let resolved = self.load(identifier).map_err(Arc::new);
        if let Err(err) = &resolved {
            warn!(identifier, error = %err, "rule set resolution failed");
        }

        let mut cache = self.cache.write().unwrap_or_else(PoisonError::into_inner);
        let published = cache
            .entry(identifier.to_owned())
            .or_insert(resolved)
            .clone();
        debug!(identifier, cached = cache.len(), "published rule set");
        published
    }

    /// Resolve the rule set named by `filter` and evaluate `operand` against
    /// the rules matching the rest of `filter`.
    ///
    /// The resolved collection is queried with the rule-set field wildcarded,
    /// so the identifier need not equal the rule set recorded on each rule.
    ///
    /// # Errors
    ///
    /// Returns [`PluralError`] on resolution, configuration or evaluation
    /// failure.
    pub fn evaluate(
        &self,
        filter: &RuleInfo,
        operand: &Operand,
    ) -> Result<Option<Arc<[Rule]>>, PluralError> {
        let rules = self.resolve(filter.rule_set())?;
        rules.evaluate(&filter.clone().with_rule_set(""), operand)
    }

    /// Number of identifiers with a cached result.
    #[must_use]
    pub fn cached_len(&self) -> usize {
        self.cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn load(&self, identifier: &str) -> Result<RuleCollection, ResolveError> {
        if identifier.is_empty() {
            return Ok(RuleCollection::default());
        }

        if identifier.starts_with(RULE_EXPRESSION_SENTINEL) {
            let parser = self.parser.as_ref().ok_or_else(|| ResolveError::NoParser {
                identifier: identifier.to_owned(),
            })?;
            return Ok(parser(identifier)?);
        }

        let (name, library) = match identifier.split_once(',') {
            Some((name, library)) => (name.trim(), Some(library.trim())),
            None => (identifier.trim(), None),
        };
        let registry = self.library(library)?;
        let factory =
            (self.type_resolver)(&registry, name).ok_or_else(|| ResolveError::RuleSetNotFound {
                name: name.to_owned(),
            })?;
        factory().map_err(|source| ResolveError::Factory {
            name: name.to_owned(),
            source,
        })
    }

    fn library(&self, name: Option<&str>) -> Result<Arc<RuleSetRegistry>, ResolveError> {
        let found = match name {
            None => self.default_library.clone(),
            Some(name) => self.libraries.get(name).cloned().or_else(|| {
                self.loader.as_ref().and_then(|loader| loader.load(name))
            }),
        };
        found.ok_or_else(|| ResolveError::LibraryNotFound {
            library: name.unwrap_or("<default>").to_owned(),
        })
    }
}

impl Default for Resolver {
    /// Built-in CLDR rules as the default library, the reference rule parser,
    /// and no extra libraries.
    fn default() -> Self {
        ResolverBuilder::new().build()
    }
}

impl fmt::Debug for Resolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut libraries: Vec<&str> = self.libraries.keys().map(String::as_str).collect();
        libraries.sort_unstable();
        f.debug_struct("Resolver")
            .field("libraries", &libraries)
            .field("default_library", &self.default_library)
            .field("has_loader", &self.loader.is_some())
            .field("has_parser", &self.parser.is_some())
            .field("cached", &self.cached_len())
            .finish()
    }
}

/// Builder for [`Resolver`].
///
/// Starts from the built-in CLDR library as default library and the
/// reference parser for inline rule text.
#[must_use]
pub struct ResolverBuilder {
    libraries: HashMap<String, Arc<RuleSetRegistry>>,
    default_library: Option<Arc<RuleSetRegistry>>,
    loader: Option<Arc<dyn LibraryLoader>>,
    type_resolver: TypeResolver,
    parser: Option<ExpressionParser>,
}

impl ResolverBuilder {
    pub fn new() -> Self {
        Self {
            libraries: HashMap::new(),
            default_library: Some(Arc::new(crate::cldr::registry())),
            loader: None,
            type_resolver: Arc::new(default_type_resolver),
            parser: Some(Arc::new(crate::parse::parse_rules)),
        }
    }

    /// Make `registry` available as `"Name, <name>"`.
    pub fn library(mut self, name: impl Into<String>, registry: RuleSetRegistry) -> Self {
        self.libraries.insert(name.into(), Arc::new(registry));
        self
    }

    /// The library consulted for identifiers without a library part.
    pub fn default_library(mut self, registry: RuleSetRegistry) -> Self {
        self.default_library = Some(Arc::new(registry));
        self
    }

    pub fn without_default_library(mut self) -> Self {
        self.default_library = None;
        self
    }

    /// Fallback for library names that were not registered with
    /// [`library`](Self::library).
    pub fn loader(mut self, loader: impl LibraryLoader + 'static) -> Self {
        self.loader = Some(Arc::new(loader));
        self
    }

    pub fn type_resolver<F>(mut self, resolver: F) -> Self
    where
        F: Fn(&RuleSetRegistry, &str) -> Option<RuleSetFactory> + Send + Sync + 'static,
    {
        self.type_resolver = Arc::new(resolver);
        self
    }

    pub fn parser<F>(mut self, parser: F) -> Self
    where
        F: Fn(&str) -> Result<RuleCollection, ParseError> + Send + Sync + 'static,
    {
        self.parser = Some(Arc::new(parser));
        self
    }

    /// Reject inline rule text with [`ResolveError::NoParser`].
    pub fn without_parser(mut self) -> Self {
        self.parser = None;
        self
    }

    pub fn build(self) -> Resolver {
        Resolver {
            libraries: self.libraries,
            default_library: self.default_library,
            loader: self.loader,
            type_resolver: self.type_resolver,
            parser: self.parser,
            cache: RwLock::default(),
        }
    }
}

impl Default for ResolverBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    fn other_only() -> RuleCollection {
        RuleCollection::new([Rule::always_true(RuleInfo::new().with_case("other"))])
    }

    #[test]
    fn empty_identifier_is_empty_collection() {
        let resolver = Resolver::default();
        let rules = resolver.resolve("").unwrap();
        assert!(rules.is_empty());
    }

    #[test]
    fn default_library_lookup() {
        let resolver = Resolver::builder()
            .default_library(RuleSetRegistry::new().register("Test.Rules", || Ok(other_only())))
            .build();
        assert_eq!(resolver.resolve("Test.Rules").unwrap().len(), 1);
    }

    #[test]
    fn named_library_lookup() {
        let resolver = Resolver::builder()
            .library("extra", RuleSetRegistry::new().register("Test.Rules", || Ok(other_only())))
            .build();
        assert_eq!(resolver.resolve("Test.Rules, extra").unwrap().len(), 1);
        assert_eq!(resolver.resolve("Test.Rules ,  extra ").unwrap().len(), 1);
    }

    #[test]
    fn missing_library_and_rule_set() {
        let resolver = Resolver::default();
        let err = resolver.resolve("Test.Rules, nowhere").unwrap_err();
        assert!(matches!(*err, ResolveError::LibraryNotFound { ref library } if library == "nowhere"));
        assert!(err.is_not_found());

        let err = resolver.resolve("No.Such.Rules").unwrap_err();
        assert!(matches!(*err, ResolveError::RuleSetNotFound { ref name } if name == "No.Such.Rules"));

        let resolver = Resolver::builder().without_default_library().build();
        let err = resolver.resolve("Unicode.CLDR").unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn factory_failure_is_not_a_not_found() {
        let resolver = Resolver::builder()
            .default_library(
                RuleSetRegistry::new().register("Broken", || Err("corrupt rule data".into())),
            )
            .build();
        let err = resolver.resolve("Broken").unwrap_err();
        assert!(matches!(*err, ResolveError::Factory { .. }));
        assert!(!err.is_not_found());
        assert!(err.to_string().contains("corrupt rule data"));
    }

    #[test]
    fn factory_runs_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let resolver = Resolver::builder()
            .default_library(RuleSetRegistry::new().register("Counted", move || {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(other_only())
            }))
            .build();

        let first = resolver.resolve("Counted").unwrap();
        let second = resolver.resolve("Counted").unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(std::ptr::eq(first.as_slice(), second.as_slice()));
    }

    #[test]
    fn errors_are_cached() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let resolver = Resolver::builder()
            .default_library(RuleSetRegistry::new().register("Flaky", move || {
                counter.fetch_add(1, Ordering::SeqCst);
                Err("boom".into())
            }))
            .build();

        let first = resolver.resolve("Flaky").unwrap_err();
        let second = resolver.resolve("Flaky").unwrap_err();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(resolver.cached_len(), 1);
    }

    #[test]
    fn inline_rules_go_to_the_parser() {
        let seen = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&seen);
        let resolver = Resolver::builder()
            .parser(move |text| {
                counter.fetch_add(1, Ordering::SeqCst);
                assert!(text.starts_with('['));
                Ok(other_only())
            })
            .build();
        assert_eq!(resolver.resolve("[Case=other]").unwrap().len(), 1);
        resolver.resolve("[Case=other]").unwrap();
        assert_eq!(seen.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn inline_rules_without_parser() {
        let resolver = Resolver::builder().without_parser().build();
        let err = resolver.resolve("[Case=other]").unwrap_err();
        assert!(matches!(*err, ResolveError::NoParser { .. }));
    }

    #[test]
    fn inline_parse_failure() {
        let resolver = Resolver::default();
        let err = resolver.resolve("[Case=one]n = ").unwrap_err();
        assert!(matches!(*err, ResolveError::Parse(_)));
        assert!(!err.is_not_found());
    }

    #[test]
    fn path_separator_remapping() {
        let registry = RuleSetRegistry::new()
            .register("my::rules", || Ok(other_only()))
            .register("Other.Rules", || Ok(other_only()));
        assert!(default_type_resolver(&registry, "my.rules").is_some());
        assert!(default_type_resolver(&registry, "Other::Rules").is_some());
        assert!(default_type_resolver(&registry, "missing").is_none());
    }

    #[test]
    fn custom_type_resolver() {
        let resolver = Resolver::builder()
            .default_library(RuleSetRegistry::new().register("rules", || Ok(other_only())))
            .type_resolver(|registry, name| registry.get(&name.to_ascii_lowercase()))
            .build();
        assert!(resolver.resolve("RULES").is_ok());
    }

    struct PluginLoader;

    impl LibraryLoader for PluginLoader {
        fn load(&self, name: &str) -> Option<Arc<RuleSetRegistry>> {
            (name == "plugin").then(|| {
                Arc::new(RuleSetRegistry::new().register("Plugin.Rules", || Ok(other_only())))
            })
        }
    }

    #[test]
    fn loader_supplies_unregistered_libraries() {
        let resolver = Resolver::builder().loader(PluginLoader).build();
        assert!(resolver.resolve("Plugin.Rules, plugin").is_ok());
        let err = resolver.resolve("Plugin.Rules, other").unwrap_err();
        assert!(err.is_not_found());

        let restricted = Resolver::default();
        assert!(restricted.resolve("Plugin.Rules, plugin").is_err());
    }

    #[test]
    fn evaluate_wildcards_the_rule_set() {
        let resolver = Resolver::default();
        let text = "[RuleSet=Inline,Case=one]n = 1 [RuleSet=Inline,Case=other]";
        let filter = RuleInfo::new().with_rule_set(text);
        let cases = resolver
            .evaluate(&filter, &Operand::from(1_i64))
            .unwrap()
            .unwrap();
        assert_eq!(cases[0].case(), "one");
    }

    #[test]
    fn evaluate_surfaces_resolution_errors() {
        let resolver = Resolver::default();
        let filter = RuleInfo::new().with_rule_set("Nope");
        assert!(matches!(
            resolver.evaluate(&filter, &Operand::from(1_i64)),
            Err(PluralError::Resolve(_))
        ));
    }
}
