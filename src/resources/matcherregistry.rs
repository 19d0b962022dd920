//! Named matcher factories.
//!
//! A [`MatcherRegistry`] maps names to factories. Invoking a name with
//! configuration arguments yields a [`Matcher`] bound to the target kind the
//! factory was described with:
//!
//! ```ignore
//! registry.describe_matcher("above", Some(ValueKind::Integer), |args| {
//!     let n = args.first().and_then(Value::as_integer).unwrap_or(0);
//!     Ok(predicate(move |v| v.as_integer().is_some_and(|x| x > n)))
//! });
//! let m = registry.build("above", &[Value::from(10)])?;
//! ```
//!
//! The registry is a cheap cloneable handle. Clones share the same table,
//! so it can be inserted as a resource and also handed to owners that build
//! matchers outside of systems.

use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use bevy_ecs::prelude::Resource;
use log::{debug, warn};
use rustc_hash::FxHashMap;

use crate::events::builtin::register_builtin_matchers;
use crate::events::error::{EventError, Result};
use crate::events::matcher::{Matcher, Predicate};
use crate::events::value::{Value, ValueKind};

/// Turns configuration arguments into a predicate.
pub type MatcherFactory = Arc<dyn Fn(&[Value]) -> Result<Predicate> + Send + Sync>;

struct Description {
    target: Option<ValueKind>,
    factory: MatcherFactory,
}

/// Shared table of matcher factories keyed by name.
#[derive(Resource, Clone, Default)]
pub struct MatcherRegistry {
    factories: Arc<RwLock<FxHashMap<String, Arc<Description>>>>,
}

impl MatcherRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry preloaded with the built-in matchers.
    pub fn with_builtins() -> Self {
        let registry = Self::new();
        register_builtin_matchers(&registry);
        registry
    }

    /// Describe a matcher under `name`. `target` of `None` matches any kind.
    ///
    /// Describing an existing name replaces the previous factory for every
    /// holder of this registry.
    pub fn describe_matcher<F>(&self, name: impl Into<String>, target: Option<ValueKind>, factory: F)
    where
        F: Fn(&[Value]) -> Result<Predicate> + Send + Sync + 'static,
    {
        let name = name.into();
        let description = Arc::new(Description {
            target,
            factory: Arc::new(factory),
        });
        let mut factories = self.factories.write().unwrap_or_else(PoisonError::into_inner);
        if factories.insert(name.clone(), description).is_some() {
            warn!("Matcher `{}` redescribed; previous factory replaced", name);
        } else {
            debug!("Described matcher `{}` (target: {:?})", name, target);
        }
    }

    /// [`describe_matcher`](Self::describe_matcher) with the target given by
    /// kind name (`"integer"`, `"string"`, ...). `"any"` and `"object"`
    /// accept every kind.
    pub fn describe_matcher_on<F>(&self, name: impl Into<String>, kind: &str, factory: F) -> Result<()>
    where
        F: Fn(&[Value]) -> Result<Predicate> + Send + Sync + 'static,
    {
        let target = match kind.parse::<ValueKind>()? {
            ValueKind::Object => None,
            kind => Some(kind),
        };
        self.describe_matcher(name, target, factory);
        Ok(())
    }

    /// Build a matcher from the factory described under `name`.
    pub fn build(&self, name: &str, args: &[Value]) -> Result<Matcher> {
        let description = self
            .factories
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
            .ok_or_else(|| EventError::UnknownMatcher(name.to_string()))?;
        // factory runs outside the lock so it may consult the registry itself
        let predicate = (description.factory)(args)?;
        Ok(Matcher::from_predicate(description.target, predicate))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(name)
    }

    /// Target kind a name was described with; `None` if unknown.
    pub fn target_of(&self, name: &str) -> Option<Option<ValueKind>> {
        self.factories
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .map(|d| d.target)
    }

    /// Described names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .factories
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.factories
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for MatcherRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MatcherRegistry")
            .field("names", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::matcher::predicate;

    fn describe_above(registry: &MatcherRegistry) {
        registry.describe_matcher("above", Some(ValueKind::Integer), |args| {
            let n = args
                .first()
                .and_then(Value::as_integer)
                .ok_or_else(|| EventError::bad_arguments("above", "expected an integer"))?;
            Ok(predicate(move |v| v.as_integer().is_some_and(|x| x > n)))
        });
    }

    #[test]
    fn test_new_registry_is_empty() {
        let registry = MatcherRegistry::new();
        assert!(registry.is_empty());
        assert!(!registry.contains("above"));
    }

    #[test]
    fn test_describe_and_build() {
        let registry = MatcherRegistry::new();
        describe_above(&registry);

        let m = registry.build("above", &[Value::from(10)]).unwrap();
        assert!(m.matches(&Value::from(15)).unwrap());
        assert!(!m.matches(&Value::from(5)).unwrap());
        assert!(!m.can_match_on(ValueKind::String));
        assert_eq!(m.target(), Some(ValueKind::Integer));
    }

    #[test]
    fn test_untargeted_description_matches_anything() {
        let registry = MatcherRegistry::new();
        registry.describe_matcher("foo_matcher", None, |args| {
            let expected = args.first().cloned().unwrap_or(Value::Nil);
            Ok(predicate(move |v| *v == expected))
        });
        let m = registry.build("foo_matcher", &[Value::from("")]).unwrap();
        assert!(m.can_match_on(ValueKind::Object));
        assert!(m.matches(&Value::from("")).unwrap());
    }

    #[test]
    fn test_unknown_name() {
        let registry = MatcherRegistry::new();
        assert!(matches!(
            registry.build("missing", &[]),
            Err(EventError::UnknownMatcher(name)) if name == "missing"
        ));
    }

    #[test]
    fn test_factory_rejects_arguments() {
        let registry = MatcherRegistry::new();
        describe_above(&registry);
        assert!(matches!(
            registry.build("above", &[Value::from("ten")]),
            Err(EventError::BadMatcherArguments { .. })
        ));
    }

    #[test]
    fn test_last_description_wins() {
        let registry = MatcherRegistry::new();
        registry.describe_matcher("flag", None, |_| Ok(predicate(|_| false)));
        registry.describe_matcher("flag", Some(ValueKind::Boolean), |_| Ok(predicate(|_| true)));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.target_of("flag"), Some(Some(ValueKind::Boolean)));
        let m = registry.build("flag", &[]).unwrap();
        assert!(m.matches(&Value::from(true)).unwrap());
    }

    #[test]
    fn test_describe_by_kind_name() {
        let registry = MatcherRegistry::new();
        registry
            .describe_matcher_on("shout", "string", |_| {
                Ok(predicate(|v| v.as_str().is_some_and(|s| s.ends_with('!'))))
            })
            .unwrap();
        registry
            .describe_matcher_on("whatever", "any", |_| Ok(predicate(|_| true)))
            .unwrap();

        assert_eq!(registry.target_of("shout"), Some(Some(ValueKind::String)));
        assert_eq!(registry.target_of("whatever"), Some(None));
        let m = registry.build("shout", &[]).unwrap();
        assert!(m.matches(&Value::from("hey!")).unwrap());
        assert!(!m.matches(&Value::from(1)).unwrap());

        assert!(matches!(
            registry.describe_matcher_on("odd", "widget", |_| Ok(predicate(|_| true))),
            Err(EventError::UnknownKind(name)) if name == "widget"
        ));
        assert!(!registry.contains("odd"));
    }

    #[test]
    fn test_clones_share_table() {
        let registry = MatcherRegistry::new();
        let handle = registry.clone();
        describe_above(&handle);
        assert!(registry.contains("above"));
        assert_eq!(registry.names(), vec!["above".to_string()]);
    }
}
