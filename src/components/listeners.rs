//! Event listener component.
//!
//! The [`Listeners`] component gives an entity its own
//! [`EventRunner`](crate::events::runner::EventRunner) through the
//! [`Helper`] capability. The runner is created the first time it is
//! needed and is never shared with another entity.
//!
//! # Example
//!
//! ```ignore
//! let mut listeners = Listeners::default();
//! let hard_hit = registry.matcher("more_than", &[Value::from(10)])?;
//! listeners.on_matching("hit", hard_hit, |args, events| {
//!     events.raise_event("shake", args![]);
//!     Ok(())
//! });
//! commands.spawn((Group::new("paddle"), listeners));
//! ```
//!
//! # Related
//!
//! - [`crate::systems::listeners::run_listeners`] – drains every runner each frame
//! - [`crate::systems::listeners::raise_frame_events`] – raises `"update"` on runners that listen for it

use bevy_ecs::prelude::Component;

use crate::events::helper::Helper;
use crate::events::runner::EventRunner;

#[derive(Component, Debug, Default)]
pub struct Listeners {
    runner: Option<EventRunner>,
}

impl Listeners {
    /// Start with a preconfigured runner instead of a lazily created one.
    pub fn with_runner(runner: EventRunner) -> Self {
        Self {
            runner: Some(runner),
        }
    }

    /// True once a runner exists.
    pub fn has_runner(&self) -> bool {
        self.runner.is_some()
    }

    /// Pending events without forcing a runner into existence.
    pub fn pending(&self) -> usize {
        self.runner.as_ref().map_or(0, EventRunner::pending)
    }
}

impl Helper for Listeners {
    fn event_runner_slot(&mut self) -> &mut Option<EventRunner> {
        &mut self.runner
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args;

    #[test]
    fn test_default_has_no_runner() {
        let listeners = Listeners::default();
        assert!(!listeners.has_runner());
        assert_eq!(listeners.pending(), 0);
    }

    #[test]
    fn test_raise_creates_runner() {
        let mut listeners = Listeners::default();
        listeners.raise_event("ping", args![1]);
        assert!(listeners.has_runner());
        assert_eq!(listeners.pending(), 1);
    }

    #[test]
    fn test_with_runner_keeps_configuration() {
        let mut runner = EventRunner::new();
        runner.register("ping", None, |_, _| Ok(()));
        let mut listeners = Listeners::with_runner(runner);
        assert!(listeners.event_runner().has_listeners("ping"));
    }
}
