//! Deferred event dispatch.
//!
//! An [`EventRunner`] owns a set of listeners keyed by event name and a FIFO
//! queue of pending events. Raising an event only enqueues it; nothing runs
//! until [`EventRunner::run`] drains the queue.
//!
//! # Flow
//!
//! 1. `register` appends a listener (optional [`Matcher`] + handler) for a name
//! 2. `raise_event` pushes `(name, args)` to the tail of the queue
//! 3. `run` pops events from the head until the queue is empty; for each one,
//!    listeners for that name fire in registration order
//!
//! Handlers receive the runner's [`EventSender`]. Events raised through it
//! while draining join the same queue and are delivered before `run`
//! returns. A handler that keeps re-raising its own event never lets `run`
//! finish.
//!
//! A guarded listener screens the *first* argument of the event (or `Nil`
//! when the event has none). Later arguments are never inspected.

use std::fmt;

use crossbeam_channel::{Receiver, Sender, unbounded};
use log::{trace, warn};
use rustc_hash::FxHashMap;

use crate::events::error::{EventError, Result};
use crate::events::matcher::Matcher;
use crate::events::value::{EventArgs, Value};

static NIL: Value = Value::Nil;

/// Listener callback. Receives the event arguments and a handle for raising
/// follow-up events.
pub type Handler = Box<dyn FnMut(&[Value], &EventSender) -> Result<()> + Send + Sync>;

/// A raised, not yet dispatched event.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub name: String,
    pub args: EventArgs,
}

/// Cloneable handle that enqueues events onto a runner's queue.
#[derive(Clone)]
pub struct EventSender {
    tx: Sender<Event>,
}

impl EventSender {
    /// Append an event to the queue. Events sent after the runner is dropped
    /// are discarded.
    pub fn raise_event(&self, name: impl Into<String>, args: EventArgs) {
        let event = Event {
            name: name.into(),
            args,
        };
        if let Err(err) = self.tx.send(event) {
            trace!("Discarding `{}`: runner is gone", err.0.name);
        }
    }
}

impl fmt::Debug for EventSender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventSender")
            .field("pending", &self.tx.len())
            .finish()
    }
}

struct Listener {
    matcher: Option<Matcher>,
    handler: Handler,
}

/// Listener table plus pending-event queue.
pub struct EventRunner {
    listeners: FxHashMap<String, Vec<Listener>>,
    sender: EventSender,
    rx: Receiver<Event>,
    warn_drain_len: Option<usize>,
}

impl Default for EventRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl EventRunner {
    pub fn new() -> Self {
        let (tx, rx) = unbounded();
        Self {
            listeners: FxHashMap::default(),
            sender: EventSender { tx },
            rx,
            warn_drain_len: None,
        }
    }

    /// Log a warning when a single `run` drains more than `len` events.
    pub fn with_warn_drain_len(mut self, len: usize) -> Self {
        self.warn_drain_len = Some(len);
        self
    }

    /// Append a listener for `name`. The same handler may be registered any
    /// number of times and fires once per registration.
    pub fn register<F>(&mut self, name: impl Into<String>, matcher: Option<Matcher>, handler: F)
    where
        F: FnMut(&[Value], &EventSender) -> Result<()> + Send + Sync + 'static,
    {
        let name = name.into();
        trace!(
            "Registering listener for `{}` (guarded: {})",
            name,
            matcher.is_some()
        );
        self.listeners.entry(name).or_default().push(Listener {
            matcher,
            handler: Box::new(handler),
        });
    }

    /// Enqueue an event. No handler runs until [`run`](Self::run).
    pub fn raise_event(&self, name: impl Into<String>, args: EventArgs) {
        self.sender.raise_event(name, args);
    }

    /// Handle for raising events onto this runner from elsewhere.
    pub fn sender(&self) -> EventSender {
        self.sender.clone()
    }

    /// Drain the queue, dispatching each event to its listeners.
    ///
    /// Returns the number of events drained. If a predicate or handler
    /// fails, the failing event is consumed, the error is returned wrapped
    /// in [`EventError::Dispatch`], and later events stay queued for the
    /// next call.
    pub fn run(&mut self) -> Result<usize> {
        let mut drained = 0;
        let mut warned = false;
        while let Ok(event) = self.rx.try_recv() {
            drained += 1;
            if let Some(limit) = self.warn_drain_len
                && !warned
                && drained > limit
            {
                warn!(
                    "Event drain exceeded {} events (now handling `{}`); check for re-raise cycles",
                    limit, event.name
                );
                warned = true;
            }
            self.dispatch(&event)
                .map_err(|source| EventError::Dispatch {
                    event: event.name.clone(),
                    source: Box::new(source),
                })?;
        }
        Ok(drained)
    }

    fn dispatch(&mut self, event: &Event) -> Result<()> {
        let Self {
            listeners, sender, ..
        } = self;
        let Some(listeners) = listeners.get_mut(&event.name) else {
            trace!("No listeners for `{}`", event.name);
            return Ok(());
        };
        let subject = event.args.first().unwrap_or(&NIL);
        for listener in listeners.iter_mut() {
            if let Some(matcher) = &listener.matcher
                && !matcher.matches(subject)?
            {
                continue;
            }
            (listener.handler)(&event.args, sender)?;
        }
        Ok(())
    }

    /// Number of raised events not yet dispatched.
    pub fn pending(&self) -> usize {
        self.rx.len()
    }

    pub fn is_idle(&self) -> bool {
        self.rx.is_empty()
    }

    pub fn listener_count(&self, name: &str) -> usize {
        self.listeners.get(name).map_or(0, Vec::len)
    }

    pub fn has_listeners(&self, name: &str) -> bool {
        self.listener_count(name) > 0
    }

    /// Names with at least one listener, sorted.
    pub fn event_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.listeners.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl fmt::Debug for EventRunner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventRunner")
            .field("events", &self.event_names())
            .field("pending", &self.pending())
            .finish()
    }
}
