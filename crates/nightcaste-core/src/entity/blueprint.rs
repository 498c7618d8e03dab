//! Blueprint references and resolvers.
//!
//! A blueprint is a named, reusable [`EntityConfiguration`]. How blueprints are
//! stored is up to the caller; the entity manager only needs something that
//! implements [`BlueprintResolver`]. [`BlueprintLibrary`] is the in-memory
//! implementation, usually filled once from parsed asset data.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::EntityConfiguration;
use crate::error::{Error, Result};

/// Name of a blueprint, e.g. `"actors.player"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlueprintRef(String);

impl BlueprintRef {
    /// Creates a reference from a blueprint name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the blueprint name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BlueprintRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for BlueprintRef {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for BlueprintRef {
    fn from(name: String) -> Self {
        Self(name)
    }
}

/// Turns a blueprint reference into a fresh configuration.
pub trait BlueprintResolver {
    /// Returns the configuration named by `blueprint`.
    ///
    /// # Errors
    ///
    /// [`Error::BlueprintNotFound`] if the reference cannot be resolved.
    fn create_configuration(&self, blueprint: &BlueprintRef) -> Result<EntityConfiguration>;
}

/// Prefetched blueprints held in memory.
///
/// Deserializes from a map of blueprint name to configuration:
///
/// ```
/// use nightcaste_core::entity::{BlueprintLibrary, BlueprintRef, BlueprintResolver};
/// use serde_json::json;
///
/// let library: BlueprintLibrary = serde_json::from_value(json!({
///     "actors.player": {"Position": {"x": 1, "y": 1}, "Input": {}}
/// }))
/// .unwrap();
///
/// let config = library
///     .create_configuration(&BlueprintRef::new("actors.player"))
///     .unwrap();
/// assert_eq!(config.len(), 2);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlueprintLibrary {
    blueprints: IndexMap<BlueprintRef, EntityConfiguration>,
}

impl BlueprintLibrary {
    /// Creates an empty library.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `configuration` under `blueprint`, returning the one it replaced.
    pub fn insert(
        &mut self,
        blueprint: impl Into<BlueprintRef>,
        configuration: EntityConfiguration,
    ) -> Option<EntityConfiguration> {
        self.blueprints.insert(blueprint.into(), configuration)
    }

    /// Returns `true` if `blueprint` is known.
    #[must_use]
    pub fn contains(&self, blueprint: &BlueprintRef) -> bool {
        self.blueprints.contains_key(blueprint)
    }

    /// Number of blueprints.
    #[must_use]
    pub fn len(&self) -> usize {
        self.blueprints.len()
    }

    /// Returns `true` if the library is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.blueprints.is_empty()
    }
}

impl BlueprintResolver for BlueprintLibrary {
    fn create_configuration(&self, blueprint: &BlueprintRef) -> Result<EntityConfiguration> {
        self.blueprints
            .get(blueprint)
            .cloned()
            .ok_or_else(|| Error::BlueprintNotFound(blueprint.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_a_copy() {
        let mut library = BlueprintLibrary::new();
        library.insert(
            "items.door",
            EntityConfiguration::new().with_attribute("Position", "x", 3),
        );

        let mut config = library
            .create_configuration(&BlueprintRef::new("items.door"))
            .unwrap();
        config.add_attribute("Position", "x", 9);

        let fresh = library
            .create_configuration(&BlueprintRef::new("items.door"))
            .unwrap();
        assert_eq!(fresh.get_attributes("Position")["x"], 3);
    }

    #[test]
    fn miss_is_blueprint_not_found() {
        let library = BlueprintLibrary::new();
        let result = library.create_configuration(&BlueprintRef::new("actors.ghost"));
        assert!(matches!(result, Err(Error::BlueprintNotFound(name)) if name.as_str() == "actors.ghost"));
    }
}
