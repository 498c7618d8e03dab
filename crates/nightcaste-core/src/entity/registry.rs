//! Component constructors keyed by component type.
//!
//! A configuration only carries tags and attribute maps. The registry turns
//! each pair into a typed component by deserializing the attribute map with
//! `serde`, so any `C: Component + DeserializeOwned` can be built from data.

use std::fmt;

use indexmap::IndexMap;
use serde::de::DeserializeOwned;

use super::{Component, ComponentStore, ComponentType, EntityId};
use crate::error::{Error, Result};
use crate::value::{self, AttributeMap};

/// Builds one component from its attributes and adds it to the store.
pub type ConstructFn = fn(&mut ComponentStore, EntityId, &AttributeMap) -> Result<()>;

/// Registered component constructors.
#[derive(Default, Clone)]
pub struct ComponentRegistry {
    constructors: IndexMap<ComponentType, ConstructFn>,
}

impl ComponentRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `C` under `C::TYPE`. Registering twice is harmless.
    pub fn register<C>(&mut self)
    where
        C: Component + DeserializeOwned,
    {
        self.constructors.insert(C::TYPE, construct::<C>);
    }

    /// Returns `true` if a constructor exists for `component_type`.
    #[must_use]
    pub fn contains(&self, component_type: &str) -> bool {
        self.constructors.contains_key(component_type)
    }

    /// Constructs the component tagged `component_type` and attaches it to `entity`.
    ///
    /// # Errors
    ///
    /// [`Error::UnknownComponentType`] without a constructor,
    /// [`Error::InvalidAttributes`] when the attributes do not deserialize, and
    /// [`Error::ComponentTypeConflict`] if the store holds another type under the tag.
    pub fn construct(
        &self,
        store: &mut ComponentStore,
        entity: EntityId,
        component_type: &ComponentType,
        attributes: &AttributeMap,
    ) -> Result<()> {
        let construct = self
            .constructors
            .get(component_type)
            .ok_or_else(|| Error::UnknownComponentType(component_type.clone()))?;
        construct(store, entity, attributes)
    }

    /// Registered tags in registration order.
    pub fn component_types(&self) -> impl Iterator<Item = &ComponentType> {
        self.constructors.keys()
    }
}

impl fmt::Debug for ComponentRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.constructors.keys()).finish()
    }
}

fn construct<C>(store: &mut ComponentStore, entity: EntityId, attributes: &AttributeMap) -> Result<()>
where
    C: Component + DeserializeOwned,
{
    let component: C =
        serde_json::from_value(value::to_object(attributes)).map_err(|source| {
            Error::InvalidAttributes {
                component_type: C::TYPE,
                source,
            }
        })?;
    store.add_component(entity, component)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, PartialEq, Deserialize)]
    struct Position {
        x: i32,
        y: i32,
    }

    impl Component for Position {
        const TYPE: ComponentType = ComponentType::from_static("Position");
    }

    #[derive(Debug, Default, Deserialize)]
    struct Input {}

    impl Component for Input {
        const TYPE: ComponentType = ComponentType::from_static("Input");
    }

    fn attributes(value: serde_json::Value) -> AttributeMap {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn constructs_from_attributes() {
        let mut registry = ComponentRegistry::new();
        registry.register::<Position>();
        let mut store = ComponentStore::new();

        registry
            .construct(
                &mut store,
                EntityId::new(0),
                &Position::TYPE,
                &attributes(json!({"x": 42, "y": 27})),
            )
            .unwrap();

        assert_eq!(
            store.get_component::<Position>(EntityId::new(0)),
            Some(&Position { x: 42, y: 27 })
        );
    }

    #[test]
    fn empty_attributes_build_marker_component() {
        let mut registry = ComponentRegistry::new();
        registry.register::<Input>();
        let mut store = ComponentStore::new();

        registry
            .construct(&mut store, EntityId::new(3), &Input::TYPE, &AttributeMap::new())
            .unwrap();
        assert!(store.has_component(EntityId::new(3), "Input"));
    }

    #[test]
    fn unknown_type_is_rejected() {
        let registry = ComponentRegistry::new();
        let mut store = ComponentStore::new();

        let result = registry.construct(
            &mut store,
            EntityId::new(0),
            &ComponentType::new("Renderable"),
            &AttributeMap::new(),
        );
        assert!(matches!(result, Err(Error::UnknownComponentType(tag)) if tag.as_str() == "Renderable"));
    }

    #[test]
    fn bad_attributes_are_reported() {
        let mut registry = ComponentRegistry::new();
        registry.register::<Position>();
        let mut store = ComponentStore::new();

        let result = registry.construct(
            &mut store,
            EntityId::new(0),
            &Position::TYPE,
            &attributes(json!({"x": "left"})),
        );
        assert!(matches!(
            result,
            Err(Error::InvalidAttributes { component_type, .. }) if component_type == Position::TYPE
        ));
        assert_eq!(store.len_of_type("Position"), 0);
    }
}
