//! Listener systems.
//!
//! # System Flow
//!
//! Each frame:
//!
//! 1. [`raise_frame_events`] raises `"update"` (with the scaled delta) on every
//!    [`Listeners`] that listens for it
//! 2. [`run_listeners`] drains every runner with pending events
//!
//! A failing runner is logged and left with its remaining events queued; the
//! other entities are still drained.

use std::error::Error;

use bevy_ecs::prelude::*;
use log::{error, trace};

use crate::args;
use crate::components::group::Group;
use crate::components::listeners::Listeners;
use crate::events::helper::Helper;
use crate::resources::worldtime::WorldTime;

/// Event raised once per frame on entities that listen for it.
pub const UPDATE_EVENT: &str = "update";

/// Raise [`UPDATE_EVENT`] with the frame delta on interested runners.
pub fn raise_frame_events(world_time: Res<WorldTime>, mut query: Query<&mut Listeners>) {
    for mut listeners in query.iter_mut() {
        if !listeners.has_runner() || !listeners.event_runner().has_listeners(UPDATE_EVENT) {
            continue;
        }
        listeners.raise_event(UPDATE_EVENT, args![world_time.delta]);
    }
}

/// Drain every entity's pending events.
pub fn run_listeners(mut query: Query<(Entity, Option<&Group>, &mut Listeners)>) {
    for (entity, group, mut listeners) in query.iter_mut() {
        if listeners.pending() == 0 {
            continue;
        }
        let name = group.map_or("<unnamed>", Group::name);
        match listeners.listener_runner().run() {
            Ok(drained) => trace!("{:?} ({}) drained {} event(s)", entity, name, drained),
            Err(e) => {
                let cause = e.source().map(|s| s.to_string()).unwrap_or_default();
                error!("Listeners on {:?} ({}): {} {}", entity, name, e, cause);
            }
        }
    }
}
