//! Error types for nightcaste-core.
//!
//! Lookup misses are not errors: a missing component is `None` and removing an
//! unknown listener returns `false`. Everything in [`Error`] aborts the single
//! operation in progress and is surfaced to the caller.

use thiserror::Error;

use crate::entity::{BlueprintRef, ComponentType};
use crate::event::{EventType, ListenerId};

/// Core error type.
#[derive(Debug, Error)]
pub enum Error {
    /// A configuration names a component type with no registered constructor.
    #[error("unknown component type: {0}")]
    UnknownComponentType(ComponentType),

    /// An attribute map could not be turned into its component.
    #[error("invalid attributes for component {component_type}: {source}")]
    InvalidAttributes {
        /// Component being constructed.
        component_type: ComponentType,
        /// Conversion failure.
        #[source]
        source: serde_json::Error,
    },

    /// The same component tag is used by two different Rust types.
    #[error("component type {0} is already bound to a different Rust type")]
    ComponentTypeConflict(ComponentType),

    /// The blueprint resolver has no configuration for this reference.
    #[error("blueprint not found: {0}")]
    BlueprintNotFound(BlueprintRef),

    /// A behaviour configuration names an implementation nobody registered.
    #[error("unknown behaviour implementation: {0}")]
    UnknownBehaviour(String),

    /// A configuration value does not have the expected shape.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(#[from] serde_json::Error),

    /// A subscriber returned an error while the failure policy is `Propagate`.
    #[error("listener {listener} failed while handling {event_type}: {source}")]
    ListenerFailed {
        /// Event being delivered.
        event_type: EventType,
        /// The failing registration.
        listener: ListenerId,
        /// Error returned by the subscriber.
        #[source]
        source: anyhow::Error,
    },

    /// One `process_events` call dequeued more events than allowed.
    #[error("event cascade exceeded {limit} events in a single drain")]
    CascadeLimitExceeded {
        /// The configured cap.
        limit: usize,
    },
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
