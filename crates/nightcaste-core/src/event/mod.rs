//! Event queue and dispatcher.
//!
//! Producers (behaviours, input, subscribers themselves) push [`Event`]s onto
//! a FIFO queue. [`EventManager::process_events`] drains that queue and hands
//! every event to each subscriber registered for its [`EventType`], in
//! registration order.
//!
//! # Cascades
//!
//! Subscribers receive a [`ListenerContext`] through which they can throw new
//! events. Those are appended to the same queue and are processed by the same
//! drain, after everything that was already queued. A drain stops with
//! [`Error::CascadeLimitExceeded`] once it has dequeued
//! [`EventConfig::max_events_per_drain`] events and more are pending.
//!
//! # Failures
//!
//! Subscribers return `anyhow::Result<()>`. What happens on `Err` is decided by
//! [`FailurePolicy`].
//!
//! # Example
//!
//! ```
//! use nightcaste_core::entity::EntityId;
//! use nightcaste_core::event::{Event, EventManager, GameAction, GameEvent, EventData};
//! use glam::IVec2;
//!
//! let mut events: EventManager<Vec<String>> = EventManager::new();
//! events.register_listener(GameAction::Move, |event, ctx| {
//!     ctx.state_mut().push(event.to_string());
//!     ctx.throw_new(GameEvent::EntityMoved, EventData::Empty);
//!     Ok(())
//! });
//! events.register_listener(GameEvent::EntityMoved, |event, ctx| {
//!     ctx.state_mut().push(event.to_string());
//!     Ok(())
//! });
//!
//! events.throw(Event::move_action(EntityId::new(0), IVec2::new(1, 0)));
//!
//! let mut log = Vec::new();
//! assert_eq!(events.process_events(0, &mut log).unwrap(), 2);
//! assert_eq!(log, ["Event(GameAction.Move)", "Event(GameEvent.EntityMoved)"]);
//! ```

pub mod types;

use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::num::NonZeroUsize;

use serde::{Deserialize, Serialize};
use tracing::{debug, error, trace};

pub use types::{
    Event, EventData, EventType, FrameworkEvent, GameAction, GameEvent, GuiAction, GuiEvent,
    InputEvent,
};

use crate::error::{Error, Result};

// =============================================================================
// Listener Registration
// =============================================================================

/// Handle returned by [`EventManager::register_listener`].
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ListenerId(u64);

impl ListenerId {
    /// Returns the raw handle value.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ListenerId({})", self.0)
    }
}

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "listener:{}", self.0)
    }
}

/// Subscriber callback.
pub type Listener<S> = Box<dyn FnMut(&Event, &mut ListenerContext<'_, S>) -> anyhow::Result<()>>;

struct Registration<S> {
    id: ListenerId,
    callback: Listener<S>,
}

/// What a subscriber sees while handling one event.
pub struct ListenerContext<'a, S> {
    state: &'a mut S,
    queue: &'a mut VecDeque<Event>,
    round: u64,
}

impl<S> ListenerContext<'_, S> {
    /// Shared state passed to the drain.
    #[must_use]
    pub fn state(&self) -> &S {
        &*self.state
    }

    /// Shared state passed to the drain, mutably.
    pub fn state_mut(&mut self) -> &mut S {
        &mut *self.state
    }

    /// Round the drain runs in.
    #[must_use]
    pub fn round(&self) -> u64 {
        self.round
    }

    /// Queues `event` behind everything already pending.
    pub fn throw(&mut self, event: Event) {
        self.queue.push_back(event);
    }

    /// Creates and queues an event.
    pub fn throw_new(&mut self, event_type: impl Into<EventType>, data: EventData) {
        self.throw(Event::new(event_type, data));
    }
}

// =============================================================================
// Configuration
// =============================================================================

/// How the drain reacts to a failing subscriber.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Stop the drain and return [`Error::ListenerFailed`].
    ///
    /// Later subscribers of the failing event are skipped; queued events stay
    /// queued for the next drain.
    #[default]
    Propagate,
    /// Log the failure, count it and keep delivering.
    Isolate,
}

/// Tunables for [`EventManager`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventConfig {
    /// Most events a single [`EventManager::process_events`] call may dequeue.
    ///
    /// Zero is rejected on deserialization.
    pub max_events_per_drain: NonZeroUsize,
    /// Reaction to subscriber errors.
    pub failure_policy: FailurePolicy,
}

impl EventConfig {
    /// Default cascade cap.
    pub const DEFAULT_MAX_EVENTS_PER_DRAIN: NonZeroUsize = match NonZeroUsize::new(10_000) {
        Some(limit) => limit,
        None => panic!("default cascade cap must be non-zero"),
    };
}

impl Default for EventConfig {
    fn default() -> Self {
        Self {
            max_events_per_drain: Self::DEFAULT_MAX_EVENTS_PER_DRAIN,
            failure_policy: FailurePolicy::default(),
        }
    }
}

// =============================================================================
// Event Manager
// =============================================================================

/// FIFO event queue plus the subscriber registry.
///
/// `S` is the state subscribers mutate, typically the
/// [`EntityManager`](crate::entity::EntityManager). It is borrowed only for the
/// duration of a drain.
pub struct EventManager<S> {
    queue: VecDeque<Event>,
    listeners: HashMap<EventType, Vec<Registration<S>>>,
    next_listener_id: u64,
    config: EventConfig,
    isolated_failures: u64,
}

impl<S> EventManager<S> {
    /// Creates a manager with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(EventConfig::default())
    }

    /// Creates a manager with `config`.
    #[must_use]
    pub fn with_config(config: EventConfig) -> Self {
        Self {
            queue: VecDeque::new(),
            listeners: HashMap::new(),
            next_listener_id: 0,
            config,
            isolated_failures: 0,
        }
    }

    /// Subscribes `listener` to `event_type`.
    ///
    /// Subscribers of one type are called in registration order. Registering
    /// the same logic twice delivers every event to it twice.
    pub fn register_listener<F>(&mut self, event_type: impl Into<EventType>, listener: F) -> ListenerId
    where
        F: FnMut(&Event, &mut ListenerContext<'_, S>) -> anyhow::Result<()> + 'static,
    {
        let event_type = event_type.into();
        let id = ListenerId(self.next_listener_id);
        self.next_listener_id += 1;

        debug!(%event_type, listener = %id, "registered listener");
        self.listeners.entry(event_type).or_default().push(Registration {
            id,
            callback: Box::new(listener),
        });
        id
    }

    /// Unsubscribes the registration `id` from `event_type`.
    ///
    /// Returns `false` if it was not registered there.
    pub fn remove_listener(&mut self, event_type: &EventType, id: ListenerId) -> bool {
        let removed = self.listeners.get_mut(event_type).is_some_and(|registrations| {
            let before = registrations.len();
            registrations.retain(|registration| registration.id != id);
            registrations.len() != before
        });

        if removed {
            debug!(%event_type, listener = %id, "removed listener");
        } else {
            debug!(%event_type, listener = %id, "listener was not registered");
        }
        removed
    }

    /// Number of subscribers for `event_type`.
    #[must_use]
    pub fn listener_count(&self, event_type: &EventType) -> usize {
        self.listeners.get(event_type).map_or(0, Vec::len)
    }

    /// Builds an event without queueing it.
    #[must_use]
    #[allow(clippy::unused_self)]
    pub fn create(&self, event_type: impl Into<EventType>, data: EventData) -> Event {
        Event::new(event_type, data)
    }

    /// Queues `event` at the tail.
    pub fn throw(&mut self, event: Event) {
        trace!(%event, "queued event");
        self.queue.push_back(event);
    }

    /// Creates and queues an event.
    pub fn throw_new(&mut self, event_type: impl Into<EventType>, data: EventData) {
        self.throw(Event::new(event_type, data));
    }

    /// Number of queued events.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Queued events, head first.
    pub fn queued(&self) -> impl Iterator<Item = &Event> {
        self.queue.iter()
    }

    /// Subscriber errors swallowed under [`FailurePolicy::Isolate`].
    #[must_use]
    pub fn isolated_failures(&self) -> u64 {
        self.isolated_failures
    }

    /// Active configuration.
    #[must_use]
    pub fn config(&self) -> &EventConfig {
        &self.config
    }

    /// Delivers queued events, including those thrown meanwhile, until the
    /// queue is empty.
    ///
    /// Returns the number of events dequeued. Events nobody listens to count.
    ///
    /// # Errors
    ///
    /// - [`Error::CascadeLimitExceeded`] if more than
    ///   [`EventConfig::max_events_per_drain`] events would be dequeued; the
    ///   rest stay queued
    /// - [`Error::ListenerFailed`] if a subscriber fails under
    ///   [`FailurePolicy::Propagate`]
    pub fn process_events(&mut self, round: u64, state: &mut S) -> Result<usize> {
        let limit = self.config.max_events_per_drain.get();
        let mut processed = 0;

        while let Some(event) = self.queue.pop_front() {
            if processed == limit {
                self.queue.push_front(event);
                error!(limit, pending = self.queue.len(), round, "event cascade limit reached");
                return Err(Error::CascadeLimitExceeded { limit });
            }
            processed += 1;
            self.dispatch(&event, round, state)?;
        }

        Ok(processed)
    }

    fn dispatch(&mut self, event: &Event, round: u64, state: &mut S) -> Result<()> {
        let registrations = match self.listeners.get_mut(event.event_type()) {
            Some(registrations) if !registrations.is_empty() => registrations,
            _ => {
                trace!(%event, round, "no listeners");
                return Ok(());
            }
        };

        debug!(%event, listeners = registrations.len(), round, "processing event");
        let mut ctx = ListenerContext {
            state,
            queue: &mut self.queue,
            round,
        };

        for registration in registrations.iter_mut() {
            let Err(source) = (registration.callback)(event, &mut ctx) else {
                continue;
            };
            match self.config.failure_policy {
                FailurePolicy::Propagate => {
                    return Err(Error::ListenerFailed {
                        event_type: event.event_type().clone(),
                        listener: registration.id,
                        source,
                    });
                }
                FailurePolicy::Isolate => {
                    self.isolated_failures += 1;
                    error!(%event, listener = %registration.id, error = %source, "listener failed");
                }
            }
        }

        Ok(())
    }
}

impl<S> Default for EventManager<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> fmt::Debug for EventManager<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventManager")
            .field("pending", &self.queue.len())
            .field("event_types", &self.listeners.len())
            .field("config", &self.config)
            .field("isolated_failures", &self.isolated_failures)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Tests
// =============================================================================
