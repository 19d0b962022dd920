//! Standard matchers installed by [`register_builtin_matchers`].
//!
//! | name             | target  | arguments           |
//! |------------------|---------|---------------------|
//! | `anything`       | any     | none                |
//! | `equal_to`       | any     | value               |
//! | `more_than`      | numeric | bound               |
//! | `less_than`      | numeric | bound               |
//! | `between`        | numeric | low, high           |
//! | `almost`         | numeric | value, precision    |
//! | `matching_text`  | string  | substring           |
//! | `inside`         | any     | rect                |
//! | `outside`        | any     | rect                |
//! | `colliding_with` | rect    | rect                |
//!
//! `inside` and `outside` accept both rects and points (`Vector2`).

use crate::events::error::{EventError, Result};
use crate::events::matcher::predicate;
use crate::events::value::{Rect, Value, ValueKind};
use crate::resources::matcherregistry::MatcherRegistry;

fn arg<'a>(name: &str, args: &'a [Value], index: usize) -> Result<&'a Value> {
    args.get(index).ok_or_else(|| {
        EventError::bad_arguments(name, format!("missing argument {}", index + 1))
    })
}

fn number_arg(name: &str, args: &[Value], index: usize) -> Result<f64> {
    arg(name, args, index)?
        .as_f64()
        .ok_or_else(|| EventError::bad_arguments(name, format!("argument {} must be numeric", index + 1)))
}

fn rect_arg(name: &str, args: &[Value], index: usize) -> Result<Rect> {
    arg(name, args, index)?
        .as_rect()
        .ok_or_else(|| EventError::bad_arguments(name, format!("argument {} must be a rect", index + 1)))
}

/// True if a rect or point lies within `area`. Other kinds never do.
fn within(value: &Value, area: &Rect) -> Option<bool> {
    match value {
        Value::Rect(r) => Some(r.inside(area)),
        Value::Vector2(p) => Some(area.contains_point(*p)),
        _ => None,
    }
}

/// Install the standard matchers into `registry`.
pub fn register_builtin_matchers(registry: &MatcherRegistry) {
    registry.describe_matcher("anything", None, |_| Ok(predicate(|_| true)));

    registry.describe_matcher("equal_to", None, |args| {
        let expected = arg("equal_to", args, 0)?.clone();
        Ok(predicate(move |v| *v == expected))
    });

    registry.describe_matcher("more_than", Some(ValueKind::Numeric), |args| {
        let bound = number_arg("more_than", args, 0)?;
        Ok(predicate(move |v| v.as_f64().is_some_and(|x| x > bound)))
    });

    registry.describe_matcher("less_than", Some(ValueKind::Numeric), |args| {
        let bound = number_arg("less_than", args, 0)?;
        Ok(predicate(move |v| v.as_f64().is_some_and(|x| x < bound)))
    });

    registry.describe_matcher("between", Some(ValueKind::Numeric), |args| {
        let low = number_arg("between", args, 0)?;
        let high = number_arg("between", args, 1)?;
        if low > high {
            return Err(EventError::bad_arguments(
                "between",
                format!("low bound {} exceeds high bound {}", low, high),
            ));
        }
        Ok(predicate(move |v| {
            v.as_f64().is_some_and(|x| (low..=high).contains(&x))
        }))
    });

    registry.describe_matcher("almost", Some(ValueKind::Numeric), |args| {
        let expected = number_arg("almost", args, 0)?;
        let precision = number_arg("almost", args, 1)?.abs();
        Ok(predicate(move |v| {
            v.as_f64().is_some_and(|x| (x - expected).abs() <= precision)
        }))
    });

    registry.describe_matcher("matching_text", Some(ValueKind::String), |args| {
        let needle = arg("matching_text", args, 0)?
            .as_str()
            .ok_or_else(|| EventError::bad_arguments("matching_text", "argument 1 must be text"))?
            .to_string();
        Ok(predicate(move |v| v.as_str().is_some_and(|s| s.contains(&needle))))
    });

    registry.describe_matcher("inside", None, |args| {
        let area = rect_arg("inside", args, 0)?;
        Ok(predicate(move |v| within(v, &area).unwrap_or(false)))
    });

    registry.describe_matcher("outside", None, |args| {
        let area = rect_arg("outside", args, 0)?;
        Ok(predicate(move |v| match v {
            Value::Rect(r) => !r.collides(&area),
            _ => within(v, &area).is_some_and(|inside| !inside),
        }))
    });

    registry.describe_matcher("colliding_with", Some(ValueKind::Rect), |args| {
        let area = rect_arg("colliding_with", args, 0)?;
        Ok(predicate(move |v| v.as_rect().is_some_and(|r| r.collides(&area))))
    });
}
