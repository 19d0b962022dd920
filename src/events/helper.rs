//! Capability traits that attach event handling to arbitrary owners.
//!
//! - [`Helper`] gives an owner its own lazily-created [`EventRunner`] plus
//!   `on` / `matching` / `raise_event` conveniences. Implementors only expose
//!   the storage slot.
//! - [`Matchers`] lets an owner build registered matchers by name,
//!   forwarding to an injected [`MatcherRegistry`].
//!
//! # Example
//!
//! ```ignore
//! struct Paddle {
//!     runner: Option<EventRunner>,
//! }
//!
//! impl Helper for Paddle {
//!     fn event_runner_slot(&mut self) -> &mut Option<EventRunner> {
//!         &mut self.runner
//!     }
//! }
//!
//! let mut paddle = Paddle { runner: None };
//! let big_hit = paddle.matching(|v| v.as_integer().is_some_and(|n| n > 10));
//! paddle.on_matching("hit", big_hit, |args, _| { /* ... */ Ok(()) });
//! paddle.raise_event("hit", args![15]);
//! paddle.listener_runner().run()?;
//! ```

use crate::events::error::Result;
use crate::events::matcher::Matcher;
use crate::events::runner::{EventRunner, EventSender};
use crate::events::value::{EventArgs, Value};
use crate::resources::matcherregistry::MatcherRegistry;

/// Owner-side event capability. Each implementor owns one runner exclusively.
pub trait Helper {
    /// Storage for the owned runner. `None` until first use.
    fn event_runner_slot(&mut self) -> &mut Option<EventRunner>;

    /// The owned runner, created on first access.
    fn event_runner(&mut self) -> &mut EventRunner {
        self.event_runner_slot().get_or_insert_with(EventRunner::new)
    }

    /// Replace the owned runner. Listeners and pending events of the previous
    /// runner are dropped with it.
    fn set_event_runner(&mut self, runner: EventRunner) {
        *self.event_runner_slot() = Some(runner);
    }

    /// The runner to drain. Same as [`event_runner`](Self::event_runner).
    fn listener_runner(&mut self) -> &mut EventRunner {
        self.event_runner()
    }

    /// Listen for `name` unconditionally.
    fn on<F>(&mut self, name: impl Into<String>, handler: F)
    where
        F: FnMut(&[Value], &EventSender) -> Result<()> + Send + Sync + 'static,
    {
        self.event_runner().register(name, None, handler);
    }

    /// Listen for `name` only when `matcher` accepts the first argument.
    fn on_matching<F>(&mut self, name: impl Into<String>, matcher: Matcher, handler: F)
    where
        F: FnMut(&[Value], &EventSender) -> Result<()> + Send + Sync + 'static,
    {
        self.event_runner().register(name, Some(matcher), handler);
    }

    /// Ad-hoc matcher over any kind whose predicate is `f` itself.
    fn matching<F>(&self, f: F) -> Matcher
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        Matcher::anything(f)
    }

    /// Enqueue an event on the owned runner.
    fn raise_event(&mut self, name: impl Into<String>, args: EventArgs) {
        self.event_runner().raise_event(name, args);
    }
}

/// Owner-side matcher construction.
pub trait Matchers {
    fn matcher_registry(&self) -> &MatcherRegistry;

    /// Build the matcher described under `name` with configuration `args`.
    fn matcher(&self, name: &str, args: &[Value]) -> Result<Matcher> {
        self.matcher_registry().build(name, args)
    }
}

impl Matchers for MatcherRegistry {
    fn matcher_registry(&self) -> &MatcherRegistry {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args;
    use crate::events::matcher::predicate;
    use crate::events::value::ValueKind;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};

    #[derive(Default)]
    struct Owner {
        runner: Option<EventRunner>,
        registry: MatcherRegistry,
    }

    impl Helper for Owner {
        fn event_runner_slot(&mut self) -> &mut Option<EventRunner> {
            &mut self.runner
        }
    }

    impl Matchers for Owner {
        fn matcher_registry(&self) -> &MatcherRegistry {
            &self.registry
        }
    }

    #[test]
    fn test_runner_created_lazily() {
        let mut owner = Owner::default();
        assert!(owner.runner.is_none());
        owner.raise_event("foo", args![]);
        assert!(owner.runner.is_some());
        assert_eq!(owner.listener_runner().pending(), 1);
    }

    #[test]
    fn test_owners_do_not_share_runners() {
        let mut a = Owner::default();
        let mut b = Owner::default();
        a.on("foo", |_, _| Ok(()));
        assert!(a.event_runner().has_listeners("foo"));
        assert!(!b.event_runner().has_listeners("foo"));
    }

    #[test]
    fn test_where_matcher_guards_listener() {
        let mut owner = Owner::default();
        owner.set_event_runner(EventRunner::new());

        let res = Arc::new(AtomicUsize::new(0));
        let seen = Arc::new(AtomicI64::new(0));
        let above_ten = owner.matching(|v| v.as_integer().is_some_and(|x| x > 10));
        let (r, s) = (res.clone(), seen.clone());
        owner.on_matching("foo", above_ten, move |args, _| {
            r.fetch_add(1, Ordering::SeqCst);
            s.store(args[0].as_integer().unwrap_or(0), Ordering::SeqCst);
            Ok(())
        });

        owner.raise_event("foo", args![10]);
        owner.raise_event("foo", args![15]);
        owner.listener_runner().run().unwrap();

        assert_eq!(res.load(Ordering::SeqCst), 1);
        assert_eq!(seen.load(Ordering::SeqCst), 15);
    }

    #[test]
    fn test_matcher_forwards_to_registry() {
        let owner = Owner::default();
        owner.registry.describe_matcher("match", Some(ValueKind::String), |args| {
            let needle = args
                .first()
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            Ok(predicate(move |v| v.as_str().is_some_and(|s| s.contains(&needle))))
        });

        let m = owner.matcher("match", &[Value::from("foo")]).unwrap();
        assert_eq!(m.target(), Some(ValueKind::String));
        assert!(m.matches(&Value::from("a foo b")).unwrap());
        assert!(owner.matcher("nope", &[]).is_err());
    }

    #[test]
    fn test_concrete_above_scenario() {
        let registry = MatcherRegistry::new();
        registry.describe_matcher("above", Some(ValueKind::Integer), |args| {
            let n = args.first().and_then(Value::as_integer).unwrap_or(0);
            Ok(predicate(move |x| x.as_integer().is_some_and(|x| x > n)))
        });
        let m = registry.matcher("above", &[Value::from(10)]).unwrap();
        assert!(m.matches(&Value::from(15)).unwrap());
        assert!(!m.matches(&Value::from(5)).unwrap());
        assert!(!m.can_match_on(ValueKind::String));
    }
}
