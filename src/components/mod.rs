//! ECS components for entities.
//!
//! Submodules overview:
//! - [`group`] – name tag used to address entities
//! - [`listeners`] – per-entity event runner granted through [`Helper`](crate::events::helper::Helper)

pub mod group;
pub mod listeners;
