//! Event matching and deferred dispatch.
//!
//! Owners register listeners for named events, optionally guarded by a
//! [`Matcher`](matcher::Matcher). Raising an event only queues it; the owner
//! drains its queue explicitly (or the
//! [`run_listeners`](crate::systems::listeners::run_listeners) system does it
//! once per frame).
//!
//! Submodules:
//! - [`builtin`] – standard matchers (`more_than`, `inside`, ...)
//! - [`error`] – [`EventError`](error::EventError)
//! - [`helper`] – `Helper` and `Matchers` capability traits
//! - [`matcher`] – type-guarded predicates and their composition
//! - [`runner`] – listener table and FIFO event queue
//! - [`value`] – dynamically typed event arguments and their kinds
pub mod builtin;
pub mod error;
pub mod helper;
pub mod matcher;
pub mod runner;
pub mod value;
