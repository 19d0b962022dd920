//! Engine systems.
//!
//! Submodules overview
//! - [`listeners`] – raise per-frame events and drain every entity's runner
//! - [`time`] – update simulation time and delta

pub mod listeners;
pub mod time;
