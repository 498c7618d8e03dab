//! Entity identity, component storage and entity construction.
//!
//! This module provides:
//! - [`EntityId`]: opaque, monotonically increasing entity identifier
//! - [`ComponentStore`]: every component, keyed by component type and entity
//! - [`EntityConfiguration`]: component type → attributes, used to build entities
//! - [`BlueprintResolver`]: turns named blueprints into configurations
//! - [`EntityManager`]: ties the above together
//!
//! # Example
//!
//! ```
//! use nightcaste_core::entity::{Component, ComponentType, EntityConfiguration, EntityManager};
//! use serde::Deserialize;
//!
//! #[derive(Debug, PartialEq, Deserialize)]
//! struct Position {
//!     x: i32,
//!     y: i32,
//! }
//!
//! impl Component for Position {
//!     const TYPE: ComponentType = ComponentType::from_static("Position");
//! }
//!
//! let mut entities = EntityManager::new();
//! entities.register_component::<Position>();
//!
//! let config = EntityConfiguration::new()
//!     .with_attribute("Position", "x", 42)
//!     .with_attribute("Position", "y", 27);
//! let player = entities.create_entity_from_configuration(&config).unwrap();
//!
//! assert_eq!(player.as_u64(), 0);
//! assert_eq!(
//!     entities.get_component::<Position>(player),
//!     Some(&Position { x: 42, y: 27 })
//! );
//! ```

pub mod blueprint;
pub mod component;
pub mod configuration;
pub mod registry;

use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

pub use blueprint::{BlueprintLibrary, BlueprintRef, BlueprintResolver};
pub use component::{AnyComponent, Component, ComponentContainer, ComponentStore, ComponentType, Storage};
pub use configuration::EntityConfiguration;
pub use registry::ComponentRegistry;

use crate::error::{Error, Result};

/// Unique identifier for an entity.
///
/// Identifiers start at 0, grow by one per created entity and are never
/// reused. Their numeric order is the creation order.
///
/// ```
/// use nightcaste_core::entity::EntityId;
///
/// let first = EntityId::new(0);
/// let second = EntityId::new(1);
/// assert!(first < second);
/// ```
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(u64);

impl EntityId {
    /// Wraps a raw identifier.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw identifier.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntityId({})", self.0)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for EntityId {
    fn from(id: u64) -> Self {
        Self::new(id)
    }
}

impl From<EntityId> for u64 {
    fn from(id: EntityId) -> Self {
        id.0
    }
}

// =============================================================================
// Entity Manager
// =============================================================================

/// Owns the component store and creates entities.
///
/// Entities are not stored anywhere: an entity exists through the components
/// attached to it. The manager only remembers the next identifier to hand out.
pub struct EntityManager {
    next_id: u64,
    components: ComponentStore,
    registry: ComponentRegistry,
    blueprints: Box<dyn BlueprintResolver>,
}

impl EntityManager {
    /// Creates a manager with an empty store and an empty blueprint library.
    #[must_use]
    pub fn new() -> Self {
        Self::with_resolver(BlueprintLibrary::new())
    }

    /// Creates a manager that resolves blueprints through `resolver`.
    #[must_use]
    pub fn with_resolver(resolver: impl BlueprintResolver + 'static) -> Self {
        Self {
            next_id: 0,
            components: ComponentStore::new(),
            registry: ComponentRegistry::new(),
            blueprints: Box::new(resolver),
        }
    }

    /// Makes `C` constructible from configurations.
    pub fn register_component<C>(&mut self)
    where
        C: Component + DeserializeOwned,
    {
        debug!(component_type = %C::TYPE, "registered component constructor");
        self.registry.register::<C>();
    }

    /// Allocates a fresh entity identifier.
    pub fn create_entity(&mut self) -> EntityId {
        let id = EntityId::new(self.next_id);
        self.next_id += 1;
        id
    }

    /// Creates an entity and attaches one component per configured type.
    ///
    /// Every component type is checked for a constructor before an identifier
    /// is allocated. If a component then fails to build, the components
    /// already attached are removed again; the identifier stays used.
    ///
    /// # Errors
    ///
    /// - [`Error::UnknownComponentType`] if a type has no constructor
    /// - [`Error::InvalidAttributes`] if an attribute map does not fit its type
    /// - [`Error::ComponentTypeConflict`] if a constructor's tag is held by another type
    pub fn create_entity_from_configuration(
        &mut self,
        configuration: &EntityConfiguration,
    ) -> Result<EntityId> {
        if let Some(unknown) = configuration
            .component_types()
            .find(|component_type| !self.registry.contains(component_type.as_str()))
        {
            return Err(Error::UnknownComponentType(unknown.clone()));
        }

        let entity = self.create_entity();
        for (component_type, attributes) in configuration.iter() {
            if let Err(err) =
                self.registry
                    .construct(&mut self.components, entity, component_type, attributes)
            {
                let purged = self.components.remove_entity(entity);
                debug!(%entity, %component_type, purged, "entity construction failed");
                return Err(err);
            }
        }

        debug!(%entity, components = configuration.len(), "entity created from configuration");
        Ok(entity)
    }

    /// Resolves `blueprint` and creates an entity from it.
    ///
    /// # Errors
    ///
    /// [`Error::BlueprintNotFound`] on a bad reference, otherwise the errors of
    /// [`create_entity_from_configuration`](Self::create_entity_from_configuration).
    pub fn create_entity_from_blueprint(&mut self, blueprint: &BlueprintRef) -> Result<EntityId> {
        let configuration = self.blueprints.create_configuration(blueprint)?;
        self.create_entity_from_configuration(&configuration)
    }

    /// Adds `component` to `entity`; see [`ComponentStore::add_component`].
    ///
    /// # Errors
    ///
    /// [`Error::ComponentTypeConflict`] if the tag is held by another type.
    pub fn add_component<C: Component>(&mut self, entity: EntityId, component: C) -> Result<Option<C>> {
        self.components.add_component(entity, component)
    }

    /// Removes the component of `component_type` from `entity`, if present.
    pub fn remove_component(&mut self, entity: EntityId, component_type: &str) -> bool {
        self.components.remove_component(entity, component_type)
    }

    /// Returns the `C` owned by `entity`.
    #[must_use]
    pub fn get_component<C: Component>(&self, entity: EntityId) -> Option<&C> {
        self.components.get_component(entity)
    }

    /// Returns the `C` owned by `entity` mutably.
    pub fn get_component_mut<C: Component>(&mut self, entity: EntityId) -> Option<&mut C> {
        self.components.get_component_mut(entity)
    }

    /// Every (entity, `C`) pair currently stored.
    pub fn get_all_of_type<C: Component>(&self) -> impl Iterator<Item = (EntityId, &C)> {
        self.components.get_all_of_type::<C>()
    }

    /// Removes every component of `entity`.
    pub fn remove_entity(&mut self, entity: EntityId) -> usize {
        self.components.remove_entity(entity)
    }

    /// Read access to the store.
    #[must_use]
    pub fn components(&self) -> &ComponentStore {
        &self.components
    }

    /// Write access to the store.
    pub fn components_mut(&mut self) -> &mut ComponentStore {
        &mut self.components
    }

    /// Registered component constructors.
    #[must_use]
    pub fn registry(&self) -> &ComponentRegistry {
        &self.registry
    }

    /// Number of identifiers handed out so far.
    #[must_use]
    pub fn allocated(&self) -> u64 {
        self.next_id
    }
}

impl Default for EntityManager {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for EntityManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityManager")
            .field("next_id", &self.next_id)
            .field("components", &self.components)
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Tests
// =============================================================================
