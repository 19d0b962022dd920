//! Ray DSL library.
//!
//! Event matching and deferred dispatch for game objects, plus a memoizing
//! image cache, packaged as ECS components, resources, and systems.
//!
//! - [`events`] – values, matchers, runners, and the capability traits
//! - [`components`] – [`Listeners`](components::listeners::Listeners) and name tags
//! - [`resources`] – matcher registry, image cache, configuration, time
//! - [`systems`] – per-frame event raising and draining
//! - [`game`] – demo scene used by the binary

pub mod components;
pub mod events;
pub mod game;
pub mod resources;
pub mod systems;
