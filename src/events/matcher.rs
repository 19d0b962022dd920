//! Type-guarded predicates used to filter listeners.
//!
//! A [`Matcher`] pairs an optional target [`ValueKind`] with a predicate.
//! The predicate is only consulted for values whose kind is compatible with
//! the target; anything else is a silent non-match.
//!
//! # Example
//!
//! ```ignore
//! let above_ten = Matcher::new(Some(ValueKind::Integer), |v| {
//!     v.as_integer().is_some_and(|n| n > 10)
//! });
//! assert!(above_ten.matches(&Value::from(15))?);
//! assert!(!above_ten.matches(&Value::from("15"))?);
//! ```

use std::fmt;
use std::sync::Arc;

use crate::events::error::Result;
use crate::events::value::{Value, ValueKind};

/// Predicate embedded in a matcher. Failures propagate to whoever is
/// dispatching.
pub type Predicate = Arc<dyn Fn(&Value) -> Result<bool> + Send + Sync>;

/// Wraps an infallible closure as a [`Predicate`].
pub fn predicate<F>(f: F) -> Predicate
where
    F: Fn(&Value) -> bool + Send + Sync + 'static,
{
    Arc::new(move |v: &Value| -> Result<bool> { Ok(f(v)) })
}

#[derive(Clone)]
enum Guard {
    Predicate(Predicate),
    And(Box<Matcher>, Box<Matcher>),
    Or(Box<Matcher>, Box<Matcher>),
    Not(Box<Matcher>),
}

/// Immutable, cheaply cloneable type-guarded predicate.
#[derive(Clone)]
pub struct Matcher {
    target: Option<ValueKind>,
    guard: Guard,
}

impl Matcher {
    /// Matcher over `target` (or anything when `None`) with an infallible predicate.
    pub fn new<F>(target: Option<ValueKind>, f: F) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        Self::from_predicate(target, predicate(f))
    }

    /// Matcher whose predicate may fail.
    pub fn fallible<F>(target: Option<ValueKind>, f: F) -> Self
    where
        F: Fn(&Value) -> Result<bool> + Send + Sync + 'static,
    {
        Self::from_predicate(target, Arc::new(f))
    }

    pub fn from_predicate(target: Option<ValueKind>, predicate: Predicate) -> Self {
        Self {
            target,
            guard: Guard::Predicate(predicate),
        }
    }

    /// Unrestricted matcher; the predicate sees every value.
    pub fn anything<F>(f: F) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        Self::new(None, f)
    }

    pub fn target(&self) -> Option<ValueKind> {
        self.target
    }

    /// True when there is no target, or `kind` is the target or one of its descendants.
    pub fn can_match_on(&self, kind: ValueKind) -> bool {
        self.target.is_none_or(|target| kind.is_a(target))
    }

    /// Screens `value`. The predicate never runs for incompatible kinds.
    pub fn matches(&self, value: &Value) -> Result<bool> {
        if !self.can_match_on(value.kind()) {
            return Ok(false);
        }
        match &self.guard {
            Guard::Predicate(p) => p(value),
            Guard::And(a, b) => Ok(a.matches(value)? && b.matches(value)?),
            Guard::Or(a, b) => Ok(a.matches(value)? || b.matches(value)?),
            Guard::Not(m) => Ok(!m.matches(value)?),
        }
    }

    /// Both matchers must accept. Short-circuits left to right.
    ///
    /// Targets the narrower operand kind when one contains the other.
    pub fn and(self, other: Matcher) -> Matcher {
        let target = match (self.target, other.target) {
            (None, target) | (target, None) => target,
            (Some(a), Some(b)) if b.is_a(a) => Some(b),
            (a, _) => a,
        };
        Matcher {
            target,
            guard: Guard::And(Box::new(self), Box::new(other)),
        }
    }

    /// Either matcher may accept. Short-circuits left to right.
    ///
    /// Targets the closest kind both operand targets descend from.
    pub fn or(self, other: Matcher) -> Matcher {
        let target = match (self.target, other.target) {
            (Some(a), Some(b)) => Some(a.common_ancestor(b)),
            _ => None,
        };
        Matcher {
            target,
            guard: Guard::Or(Box::new(self), Box::new(other)),
        }
    }

    /// Accepts compatible values that `self` rejects. Values of incompatible
    /// kinds are still a non-match.
    pub fn not(self) -> Matcher {
        Matcher {
            target: self.target,
            guard: Guard::Not(Box::new(self)),
        }
    }

    /// [`can_match_on`](Self::can_match_on) with the kind given by name
    /// (`"string"`, `"numeric"`, ...).
    pub fn can_match_on_name(&self, kind: &str) -> Result<bool> {
        Ok(self.can_match_on(kind.parse::<ValueKind>()?))
    }
}

impl fmt::Debug for Matcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let guard = match self.guard {
            Guard::Predicate(_) => "predicate",
            Guard::And(..) => "and",
            Guard::Or(..) => "or",
            Guard::Not(_) => "not",
        };
        f.debug_struct("Matcher")
            .field("target", &self.target)
            .field("guard", &guard)
            .finish()
    }
}
