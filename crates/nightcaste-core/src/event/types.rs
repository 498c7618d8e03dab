//! Event identifiers and payloads.
//!
//! Event identifiers form a nested enum hierarchy. The top-level
//! [`EventType`] says which family an event belongs to, the inner enums name
//! the event. Games add their own identifiers through [`EventType::Custom`].
//!
//! Payloads are the [`EventData`] tagged union. The common shapes (an entity,
//! a move, a use, a key press) have dedicated variants, and
//! [`EventData::Attributes`] keeps an open attribute bag for everything else.

use std::borrow::Cow;
use std::fmt;

use glam::IVec2;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::entity::{ComponentType, EntityId};
use crate::input::Key;
use crate::value::{AttributeMap, Value};

// =============================================================================
// Event Families
// =============================================================================

/// Lifecycle notifications from the engine itself.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FrameworkEvent {
    /// An entity was created.
    EntityCreated,
    /// An entity was destroyed.
    EntityDestroyed,
    /// An entity finished its initialization.
    EntityInitialized,
    /// The game started.
    GameStarted,
    /// The game was paused.
    GamePaused,
    /// The game resumed after a pause.
    GameResumed,
    /// A system was attached.
    SystemAdded,
    /// A component was added to an entity.
    ComponentAdded,
    /// A component was removed from an entity.
    ComponentRemoved,
}

/// Requests issued by actors; systems decide what actually happens.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameAction {
    /// Switch to another map.
    MapChange,
    /// Move through a transition (stairs, portal) to another map.
    MapTransition,
    /// Move an entity by a grid delta.
    Move,
    /// Use whatever lies in a direction.
    UseEntity,
    /// Enter the world.
    WorldEnter,
}

/// Facts about the game state that already happened.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameEvent {
    /// An entity changed position.
    EntityMoved,
    /// The current map changed.
    MapChanged,
}

/// Requests issued by the user interface.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GuiAction {
    /// Open a menu.
    MenuOpen,
}

/// Notifications for the user interface.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GuiEvent {
    /// The active view changed.
    ViewChanged,
}

/// Raw input notifications.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InputEvent {
    /// A key was pressed.
    KeyPressed,
}

// =============================================================================
// Event Type
// =============================================================================

/// Identifier of an event, used to route it to its subscribers.
///
/// ```
/// use nightcaste_core::event::{EventType, GameAction};
///
/// let move_action = EventType::from(GameAction::Move);
/// assert_eq!(move_action.to_string(), "GameAction.Move");
/// assert_eq!(EventType::custom("DoorOpened").to_string(), "Custom.DoorOpened");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventType {
    /// Engine lifecycle.
    Framework(FrameworkEvent),
    /// Actor requests.
    Action(GameAction),
    /// Game state changes.
    Game(GameEvent),
    /// UI requests.
    GuiAction(GuiAction),
    /// UI notifications.
    Gui(GuiEvent),
    /// Input notifications.
    Input(InputEvent),
    /// Game-defined identifier.
    Custom(Cow<'static, str>),
}

impl EventType {
    /// Creates a game-defined identifier.
    #[must_use]
    pub fn custom(name: impl Into<Cow<'static, str>>) -> Self {
        Self::Custom(name.into())
    }

    /// Family name, as used in the display form.
    #[must_use]
    pub fn category(&self) -> &'static str {
        match self {
            Self::Framework(_) => "FrameworkEvent",
            Self::Action(_) => "GameAction",
            Self::Game(_) => "GameEvent",
            Self::GuiAction(_) => "GuiAction",
            Self::Gui(_) => "GuiEvent",
            Self::Input(_) => "InputEvent",
            Self::Custom(_) => "Custom",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let category = self.category();
        match self {
            Self::Framework(e) => write!(f, "{category}.{e:?}"),
            Self::Action(e) => write!(f, "{category}.{e:?}"),
            Self::Game(e) => write!(f, "{category}.{e:?}"),
            Self::GuiAction(e) => write!(f, "{category}.{e:?}"),
            Self::Gui(e) => write!(f, "{category}.{e:?}"),
            Self::Input(e) => write!(f, "{category}.{e:?}"),
            Self::Custom(name) => write!(f, "{category}.{name}"),
        }
    }
}

impl From<FrameworkEvent> for EventType {
    fn from(e: FrameworkEvent) -> Self {
        Self::Framework(e)
    }
}

impl From<GameAction> for EventType {
    fn from(e: GameAction) -> Self {
        Self::Action(e)
    }
}

impl From<GameEvent> for EventType {
    fn from(e: GameEvent) -> Self {
        Self::Game(e)
    }
}

impl From<GuiAction> for EventType {
    fn from(e: GuiAction) -> Self {
        Self::GuiAction(e)
    }
}

impl From<GuiEvent> for EventType {
    fn from(e: GuiEvent) -> Self {
        Self::Gui(e)
    }
}

impl From<InputEvent> for EventType {
    fn from(e: InputEvent) -> Self {
        Self::Input(e)
    }
}

// =============================================================================
// Event Payload
// =============================================================================

/// Payload fixed when the event is created.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub enum EventData {
    /// No payload.
    #[default]
    Empty,
    /// A single entity.
    Entity {
        /// Subject of the event
        entity: EntityId,
    },
    /// A component on an entity.
    Component {
        /// Owner of the component
        entity: EntityId,
        /// Tag of the component
        component_type: ComponentType,
    },
    /// Grid movement request.
    Move {
        /// Entity to move
        entity: EntityId,
        /// Grid offset, +y pointing down
        delta: IVec2,
    },
    /// Interaction request.
    Use {
        /// Acting entity
        user: EntityId,
        /// Direction of the target; zero means "here"
        direction: IVec2,
    },
    /// Completed movement.
    Moved {
        /// Entity that moved
        entity: EntityId,
        /// Old position
        from: IVec2,
        /// New position
        to: IVec2,
    },
    /// A map by name.
    Map {
        /// Map name
        name: String,
    },
    /// A key press.
    Key {
        /// Pressed key
        key: Key,
    },
    /// Open attribute bag for game-defined events.
    Attributes(AttributeMap),
}

fn vector(v: IVec2) -> Value {
    json!([v.x, v.y])
}

impl EventData {
    /// The entity the payload is about, if it names one.
    ///
    /// For use requests this is the user.
    #[must_use]
    pub fn entity(&self) -> Option<EntityId> {
        match self {
            Self::Entity { entity }
            | Self::Component { entity, .. }
            | Self::Move { entity, .. }
            | Self::Moved { entity, .. } => Some(*entity),
            Self::Use { user, .. } => Some(*user),
            _ => None,
        }
    }

    /// Looks up one payload attribute by name.
    ///
    /// Structured variants answer with their field names; move requests also
    /// answer `dx` and `dy`. Vectors come back as `[x, y]` arrays.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<Value> {
        match (self, name) {
            (Self::Attributes(attributes), _) => attributes.get(name).cloned(),
            (
                Self::Entity { entity }
                | Self::Component { entity, .. }
                | Self::Move { entity, .. }
                | Self::Moved { entity, .. },
                "entity",
            ) => Some(json!(entity.as_u64())),
            (Self::Component { component_type, .. }, "component_type") => {
                Some(json!(component_type.as_str()))
            }
            (Self::Move { delta, .. }, "delta") => Some(vector(*delta)),
            (Self::Move { delta, .. }, "dx") => Some(json!(delta.x)),
            (Self::Move { delta, .. }, "dy") => Some(json!(delta.y)),
            (Self::Use { user, .. }, "user") => Some(json!(user.as_u64())),
            (Self::Use { direction, .. }, "direction") => Some(vector(*direction)),
            (Self::Moved { from, .. }, "from") => Some(vector(*from)),
            (Self::Moved { to, .. }, "to") => Some(vector(*to)),
            (Self::Map { name }, "name") => Some(json!(name)),
            (Self::Key { key }, "key") => serde_json::to_value(key).ok(),
            _ => None,
        }
    }
}

impl From<AttributeMap> for EventData {
    fn from(attributes: AttributeMap) -> Self {
        Self::Attributes(attributes)
    }
}

// =============================================================================
// Event
// =============================================================================

/// An immutable message: an identifier plus its payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    event_type: EventType,
    data: EventData,
}

impl Event {
    /// Creates an event.
    #[must_use]
    pub fn new(event_type: impl Into<EventType>, data: EventData) -> Self {
        Self {
            event_type: event_type.into(),
            data,
        }
    }

    /// Creates an event without payload.
    #[must_use]
    pub fn empty(event_type: impl Into<EventType>) -> Self {
        Self::new(event_type, EventData::Empty)
    }

    /// `GameAction::Move` for `entity` by `delta`.
    #[must_use]
    pub fn move_action(entity: EntityId, delta: IVec2) -> Self {
        Self::new(GameAction::Move, EventData::Move { entity, delta })
    }

    /// `GameAction::UseEntity` by `user` towards `direction`.
    #[must_use]
    pub fn use_action(user: EntityId, direction: IVec2) -> Self {
        Self::new(GameAction::UseEntity, EventData::Use { user, direction })
    }

    /// Routing identifier.
    #[must_use]
    pub fn event_type(&self) -> &EventType {
        &self.event_type
    }

    /// Payload.
    #[must_use]
    pub fn data(&self) -> &EventData {
        &self.data
    }

    /// Shorthand for [`EventData::attribute`].
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<Value> {
        self.data.attribute(name)
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Event({})", self.event_type)
    }
}
