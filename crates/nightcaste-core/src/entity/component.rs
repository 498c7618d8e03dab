//! Component types and the type-erased component store.
//!
//! Every component type gets its own typed container ([`Storage<C>`]). The
//! [`ComponentStore`] keeps those containers behind the [`ComponentContainer`]
//! trait, keyed by the component's stable [`ComponentType`] tag, so lookups by
//! (type, entity) stay O(1) without a fixed schema and without unsafe casts.
//!
//! # Determinism
//!
//! Both levels use `IndexMap`: component types iterate in the order they were
//! first stored, entities within a type in the order their component was first
//! added. Overwriting a component keeps its position; removing and re-adding
//! moves it to the end.
//!
//! # Example
//!
//! ```
//! use nightcaste_core::entity::{Component, ComponentStore, ComponentType, EntityId};
//!
//! #[derive(Debug, Clone, PartialEq)]
//! struct Position {
//!     x: i32,
//!     y: i32,
//! }
//!
//! impl Component for Position {
//!     const TYPE: ComponentType = ComponentType::from_static("Position");
//! }
//!
//! let mut store = ComponentStore::new();
//! let entity = EntityId::new(0);
//! store.add_component(entity, Position { x: 1, y: 2 }).unwrap();
//!
//! assert_eq!(store.get_component::<Position>(entity), Some(&Position { x: 1, y: 2 }));
//! assert!(store.remove_component(entity, "Position"));
//! assert!(store.get_component::<Position>(entity).is_none());
//! ```

use std::any::Any;
use std::borrow::{Borrow, Cow};
use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::EntityId;
use crate::error::{Error, Result};

// =============================================================================
// Component Type
// =============================================================================

/// Stable tag identifying a component's schema (e.g. `"Position"`).
///
/// Tags can be built at compile time with [`ComponentType::from_static`] or
/// at runtime from configuration strings. Static and owned tags with the same
/// text compare and hash equal, and a `&str` can be used for map lookups.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ComponentType(Cow<'static, str>);

impl ComponentType {
    /// Creates a tag from any string.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(Cow::Owned(name.into()))
    }

    /// Creates a tag from a static string; usable in `const` context.
    #[must_use]
    pub const fn from_static(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }

    /// Returns the tag text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ComponentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for ComponentType {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ComponentType {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for ComponentType {
    fn from(name: String) -> Self {
        Self(Cow::Owned(name))
    }
}

// =============================================================================
// Component Traits
// =============================================================================

/// A plain data record attached to an entity.
///
/// Components carry no behaviour. The tag must be unique per Rust type; the
/// store rejects a second type claiming an existing tag.
pub trait Component: fmt::Debug + Send + Sync + 'static {
    /// Tag under which instances of this type are stored.
    const TYPE: ComponentType;
}

/// Object-safe view of any component, used where the concrete type is only
/// known by its tag (behaviour dispatch, tag-based lookups).
pub trait AnyComponent: fmt::Debug + Send + Sync + 'static {
    /// Returns the tag of this component.
    fn component_type(&self) -> ComponentType;

    /// Upcasts to `Any` for downcasting.
    fn as_any(&self) -> &dyn Any;
}

impl<C: Component> AnyComponent for C {
    fn component_type(&self) -> ComponentType {
        C::TYPE
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl dyn AnyComponent {
    /// Returns the concrete component if it is a `C`.
    #[must_use]
    pub fn downcast_ref<C: Component>(&self) -> Option<&C> {
        self.as_any().downcast_ref::<C>()
    }
}

// =============================================================================
// Containers
// =============================================================================

/// Uniform capability over one typed component container.
pub trait ComponentContainer: Send + Sync + 'static {
    /// Tag of the components held.
    fn component_type(&self) -> ComponentType;

    /// Returns the component owned by `entity`, if any.
    fn get(&self, entity: EntityId) -> Option<&dyn AnyComponent>;

    /// Removes the component owned by `entity`. Returns `true` if one existed.
    fn remove(&mut self, entity: EntityId) -> bool;

    /// Returns `true` if `entity` owns a component in this container.
    fn contains(&self, entity: EntityId) -> bool;

    /// Number of stored components.
    fn len(&self) -> usize;

    /// Returns `true` if the container holds nothing.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All (entity, component) pairs in container order.
    fn entries(&self) -> Box<dyn Iterator<Item = (EntityId, &dyn AnyComponent)> + '_>;

    /// Upcasts to `Any` for typed access.
    fn as_any(&self) -> &dyn Any;

    /// Upcasts to `Any` for typed mutable access.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Typed container for components of type `C`.
#[derive(Debug)]
pub struct Storage<C: Component> {
    components: IndexMap<EntityId, C>,
}

impl<C: Component> Storage<C> {
    /// Creates an empty container.
    #[must_use]
    pub fn new() -> Self {
        Self {
            components: IndexMap::new(),
        }
    }

    /// Inserts or overwrites, returning the previous component.
    pub fn insert(&mut self, entity: EntityId, component: C) -> Option<C> {
        self.components.insert(entity, component)
    }

    /// Returns the component for `entity`.
    #[must_use]
    pub fn get(&self, entity: EntityId) -> Option<&C> {
        self.components.get(&entity)
    }

    /// Returns the component for `entity` mutably.
    pub fn get_mut(&mut self, entity: EntityId) -> Option<&mut C> {
        self.components.get_mut(&entity)
    }

    /// Removes and returns the component for `entity`.
    pub fn take(&mut self, entity: EntityId) -> Option<C> {
        self.components.shift_remove(&entity)
    }

    /// Iterates over (entity, component) pairs in container order.
    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &C)> {
        self.components.iter().map(|(id, c)| (*id, c))
    }
}

impl<C: Component> Default for Storage<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Component> ComponentContainer for Storage<C> {
    fn component_type(&self) -> ComponentType {
        C::TYPE
    }

    fn get(&self, entity: EntityId) -> Option<&dyn AnyComponent> {
        self.components
            .get(&entity)
            .map(|c| c as &dyn AnyComponent)
    }

    fn remove(&mut self, entity: EntityId) -> bool {
        self.components.shift_remove(&entity).is_some()
    }

    fn contains(&self, entity: EntityId) -> bool {
        self.components.contains_key(&entity)
    }

    fn len(&self) -> usize {
        self.components.len()
    }

    fn entries(&self) -> Box<dyn Iterator<Item = (EntityId, &dyn AnyComponent)> + '_> {
        Box::new(
            self.components
                .iter()
                .map(|(id, c)| (*id, c as &dyn AnyComponent)),
        )
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

// =============================================================================
// Component Store
// =============================================================================

/// All component instances, indexed by component type and entity.
///
/// Entity existence is implicit: the store never purges components on its own.
/// Use [`ComponentStore::remove_entity`] to drop everything an entity owns.
#[derive(Default)]
pub struct ComponentStore {
    containers: IndexMap<ComponentType, Box<dyn ComponentContainer>>,
}

impl ComponentStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `component` to `entity`, overwriting any component of the same type.
    ///
    /// Returns the overwritten component, if there was one.
    ///
    /// # Errors
    ///
    /// [`Error::ComponentTypeConflict`] if `C::TYPE` is already used by a
    /// different Rust type.
    pub fn add_component<C: Component>(
        &mut self,
        entity: EntityId,
        component: C,
    ) -> Result<Option<C>> {
        let storage = self
            .containers
            .entry(C::TYPE)
            .or_insert_with(|| Box::new(Storage::<C>::new()) as Box<dyn ComponentContainer>)
            .as_any_mut()
            .downcast_mut::<Storage<C>>()
            .ok_or(Error::ComponentTypeConflict(C::TYPE))?;
        Ok(storage.insert(entity, component))
    }

    /// Removes the component of `component_type` owned by `entity`.
    ///
    /// Absent components are not an error; the return value says whether
    /// anything was removed.
    pub fn remove_component(&mut self, entity: EntityId, component_type: &str) -> bool {
        self.containers
            .get_mut(component_type)
            .is_some_and(|container| container.remove(entity))
    }

    /// Removes and returns the `C` owned by `entity`.
    pub fn take_component<C: Component>(&mut self, entity: EntityId) -> Option<C> {
        self.storage_mut::<C>()?.take(entity)
    }

    /// Returns the `C` owned by `entity`.
    #[must_use]
    pub fn get_component<C: Component>(&self, entity: EntityId) -> Option<&C> {
        self.storage::<C>()?.get(entity)
    }

    /// Returns the `C` owned by `entity` mutably.
    pub fn get_component_mut<C: Component>(&mut self, entity: EntityId) -> Option<&mut C> {
        self.storage_mut::<C>()?.get_mut(entity)
    }

    /// Looks a component up by tag when the concrete type is not known.
    #[must_use]
    pub fn get_component_dyn(
        &self,
        entity: EntityId,
        component_type: &str,
    ) -> Option<&dyn AnyComponent> {
        self.containers.get(component_type)?.get(entity)
    }

    /// Returns `true` if `entity` owns a component of `component_type`.
    #[must_use]
    pub fn has_component(&self, entity: EntityId, component_type: &str) -> bool {
        self.containers
            .get(component_type)
            .is_some_and(|container| container.contains(entity))
    }

    /// Every (entity, `C`) pair currently stored.
    pub fn get_all_of_type<C: Component>(&self) -> impl Iterator<Item = (EntityId, &C)> {
        self.storage::<C>()
            .into_iter()
            .flat_map(|storage| storage.iter())
    }

    /// Every (entity, component) pair stored under `component_type`.
    ///
    /// Empty for unknown tags.
    pub fn get_all_of_type_dyn(
        &self,
        component_type: &str,
    ) -> impl Iterator<Item = (EntityId, &dyn AnyComponent)> {
        self.containers
            .get(component_type)
            .into_iter()
            .flat_map(|container| container.entries())
    }

    /// Number of components stored under `component_type`.
    #[must_use]
    pub fn len_of_type(&self, component_type: &str) -> usize {
        self.containers
            .get(component_type)
            .map_or(0, |container| container.len())
    }

    /// Tags of every component owned by `entity`, in store order.
    #[must_use]
    pub fn component_types_of(&self, entity: EntityId) -> Vec<ComponentType> {
        self.containers
            .iter()
            .filter(|(_, container)| container.contains(entity))
            .map(|(tag, _)| tag.clone())
            .collect()
    }

    /// Removes every component owned by `entity`. Returns how many were removed.
    pub fn remove_entity(&mut self, entity: EntityId) -> usize {
        self.containers
            .values_mut()
            .map(|container| container.remove(entity))
            .filter(|removed| *removed)
            .count()
    }

    /// Tags of every component type that has been stored, in first-use order.
    pub fn component_types(&self) -> impl Iterator<Item = &ComponentType> {
        self.containers.keys()
    }

    fn storage<C: Component>(&self) -> Option<&Storage<C>> {
        self.containers
            .get(C::TYPE.as_str())?
            .as_any()
            .downcast_ref::<Storage<C>>()
    }

    fn storage_mut<C: Component>(&mut self) -> Option<&mut Storage<C>> {
        self.containers
            .get_mut(C::TYPE.as_str())?
            .as_any_mut()
            .downcast_mut::<Storage<C>>()
    }
}

impl fmt::Debug for ComponentStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(
                self.containers
                    .iter()
                    .map(|(tag, container)| (tag.as_str(), container.len())),
            )
            .finish()
    }
}

// =============================================================================
// Tests
// =============================================================================
