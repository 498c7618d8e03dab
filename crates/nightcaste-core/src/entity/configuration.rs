//! Declarative entity configurations.
//!
//! An [`EntityConfiguration`] maps component types to attribute maps. It is a
//! transient blueprint: the entity manager reads it once to construct the
//! components of a new entity and never keeps it around.
//!
//! Configurations (de)serialize as a plain nested map, so they can be read
//! from any `serde` format:
//!
//! ```
//! use nightcaste_core::entity::EntityConfiguration;
//! use serde_json::json;
//!
//! let config: EntityConfiguration =
//!     serde_json::from_value(json!({"Position": {"x": 42, "y": 27}})).unwrap();
//!
//! assert_eq!(config.get_attributes("Position")["x"], json!(42));
//! assert!(config.get_attributes("Renderable").is_empty());
//! ```

use std::borrow::Cow;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::ComponentType;
use crate::value::{AttributeMap, Value};

/// Component type → attribute map, used to construct one entity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityConfiguration {
    components: IndexMap<ComponentType, AttributeMap>,
}

impl EntityConfiguration {
    /// Creates an empty configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets one attribute of `component_type`.
    ///
    /// Creates the attribute map on first use; afterwards only the named
    /// attribute is inserted or overwritten, the rest of the map is kept.
    pub fn add_attribute(
        &mut self,
        component_type: impl Into<ComponentType>,
        name: impl Into<String>,
        value: impl Into<Value>,
    ) {
        self.components
            .entry(component_type.into())
            .or_default()
            .insert(name.into(), value.into());
    }

    /// Builder form of [`add_attribute`](Self::add_attribute).
    #[must_use]
    pub fn with_attribute(
        mut self,
        component_type: impl Into<ComponentType>,
        name: impl Into<String>,
        value: impl Into<Value>,
    ) -> Self {
        self.add_attribute(component_type, name, value);
        self
    }

    /// Declares a component with no attributes.
    ///
    /// Useful for marker components whose constructor needs no input.
    pub fn add_component(&mut self, component_type: impl Into<ComponentType>) {
        self.components.entry(component_type.into()).or_default();
    }

    /// Returns the attributes for `component_type`; empty if it is absent.
    #[must_use]
    pub fn get_attributes(&self, component_type: &str) -> Cow<'_, AttributeMap> {
        self.components
            .get(component_type)
            .map_or_else(|| Cow::Owned(AttributeMap::new()), Cow::Borrowed)
    }

    /// Returns `true` if `component_type` is part of the configuration.
    #[must_use]
    pub fn contains(&self, component_type: &str) -> bool {
        self.components.contains_key(component_type)
    }

    /// Component types in the order they were first mentioned.
    pub fn component_types(&self) -> impl Iterator<Item = &ComponentType> {
        self.components.keys()
    }

    /// Iterates over (component type, attributes) pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&ComponentType, &AttributeMap)> {
        self.components.iter()
    }

    /// Number of component types configured.
    #[must_use]
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// Returns `true` if no component is configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }
}
