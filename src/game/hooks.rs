//! Game-level hooks and the scene they operate on.

use super::events::{Event, EventKind, EventQueue, Listeners};
use crate::entity::{Entity, EntityId, EntitySet};
use crate::error::Result;
use crate::surface::{Surface, SubscriptionId};

/// Behavior attached to a [`Game`](super::Game).
///
/// All three hooks are required so a forgotten override cannot silently
/// do nothing.
pub trait GameHooks {
    /// One-time setup when the loop starts from stopped: register listeners
    /// and initial entities here.
    fn run(&mut self, scene: &mut Scene<'_>) -> Result<()>;

    /// Runs once per tick, before any entity is updated.
    fn update(&mut self, scene: &mut Scene<'_>, events: &[Event]) -> Result<()>;

    /// Runs once per drawn frame, before any entity is drawn.
    fn draw(&mut self, surface: &mut dyn Surface, interpolation: f64) -> Result<()>;
}

/// Mutable view of the scheduler's world handed to game-level hooks.
///
/// Unlike entity updates, changes made here take effect immediately.
pub struct Scene<'a> {
    surface: &'a mut dyn Surface,
    entities: &'a mut EntitySet,
    listeners: &'a mut Listeners,
    events: &'a mut EventQueue,
}

impl<'a> Scene<'a> {
    /// Borrow the parts of a scheduler as a scene.
    pub fn new(
        surface: &'a mut dyn Surface,
        entities: &'a mut EntitySet,
        listeners: &'a mut Listeners,
        events: &'a mut EventQueue,
    ) -> Self {
        Self {
            surface,
            entities,
            listeners,
            events,
        }
    }

    /// Surface width.
    pub fn width(&self) -> f64 {
        self.surface.width()
    }

    /// Surface height.
    pub fn height(&self) -> f64 {
        self.surface.height()
    }

    /// The host surface.
    pub fn surface(&mut self) -> &mut dyn Surface {
        &mut *self.surface
    }

    /// Add an entity, running its `add` hook first.
    pub fn add_entity(&mut self, entity: Box<dyn Entity>) -> Result<EntityId> {
        self.entities.insert(&mut *self.surface, entity)
    }

    /// Remove an entity, running its `remove` hook first.
    pub fn remove_entity(&mut self, id: EntityId) -> Result<Box<dyn Entity>> {
        self.entities.remove(&mut *self.surface, id)
    }

    /// Number of entities.
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Start buffering events of `kind`.
    pub fn add_event_listener(&mut self, kind: EventKind) -> SubscriptionId {
        self.listeners.add(&mut *self.surface, kind)
    }

    /// Stop buffering events of `kind` and drop those already buffered.
    pub fn remove_event_listener(&mut self, kind: EventKind) -> Result<()> {
        self.listeners.remove(&mut *self.surface, kind)?;
        self.events.discard_kind(kind);
        Ok(())
    }
}
