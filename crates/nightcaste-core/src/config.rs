//! Runtime configuration.
//!
//! The host parses its configuration file in whatever format it likes and
//! hands the result over as a `serde_json::Value` (or deserializes
//! [`CoreConfig`] directly). Everything is optional:
//!
//! ```json
//! {
//!     "component_behaviours": [
//!         {"component_type": "Input", "impl": ["behaviour", "InputBehaviour"]}
//!     ],
//!     "events": {"max_events_per_drain": 10000, "failure_policy": "propagate"}
//! }
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::entity::ComponentType;
use crate::error::Result;
use crate::event::EventConfig;

/// Names a behaviour implementation.
///
/// Either a plain name (`"InputBehaviour"`) or a `[module, class]` pair
/// (`["behaviour", "InputBehaviour"]`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BehaviourImpl {
    /// `[module, class]`.
    Qualified(String, String),
    /// Plain registry name.
    Name(String),
}

impl BehaviourImpl {
    /// The bare implementation name, without module.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Qualified(_, class) => class,
            Self::Name(name) => name,
        }
    }
}

impl fmt::Display for BehaviourImpl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Qualified(module, class) => write!(f, "{module}.{class}"),
            Self::Name(name) => f.write_str(name),
        }
    }
}

impl From<&str> for BehaviourImpl {
    fn from(name: &str) -> Self {
        Self::Name(name.to_string())
    }
}

/// Binds one behaviour to one component type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentBehaviourConfig {
    /// Component type whose owners the behaviour drives.
    pub component_type: ComponentType,
    /// Behaviour to instantiate.
    #[serde(rename = "impl")]
    pub implementation: BehaviourImpl,
}

/// Top-level configuration for a [`Simulation`](crate::simulation::Simulation).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    /// Behaviour bindings, applied in order.
    pub component_behaviours: Vec<ComponentBehaviourConfig>,
    /// Event queue tunables.
    pub events: EventConfig,
}

impl CoreConfig {
    /// Reads the configuration out of an already parsed value.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidConfiguration`](crate::Error::InvalidConfiguration) if
    /// the value has the wrong shape.
    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        Ok(serde_json::from_value(value)?)
    }
}
