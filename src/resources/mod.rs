//! ECS resources made available to systems.
//!
//! Overview
//! - `gameconfig` – settings loaded from `config.ini`
//! - `image` – pixel grids, colors, and scoped pixel locks
//! - `imagecache` – images memoized by filename (non-send)
//! - `matcherregistry` – named matcher factories shared by all owners
//! - `worldtime` – simulation time and delta
pub mod gameconfig;
pub mod image;
pub mod imagecache;
pub mod matcherregistry;
pub mod worldtime;
