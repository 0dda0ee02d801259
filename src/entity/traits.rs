//! The `Entity` trait and the context handed to it on each tick.

use super::set::Commands;
use super::EntityId;
use crate::error::Result;
use crate::game::Event;
use crate::surface::Surface;

/// A simulated object driven by the loop.
///
/// Every hook is required. An entity owns its drawable handle: it creates it
/// in [`add`](Self::add) and releases it in [`remove`](Self::remove). Any
/// `Err` returned from a hook is fatal to the tick in progress.
pub trait Entity {
    /// Called once, when the entity joins the scheduler. Register shapes here.
    fn add(&mut self, surface: &mut dyn Surface) -> Result<()>;

    /// Advance one tick, given every event buffered since the previous tick.
    fn update(&mut self, events: &[Event], ctx: &mut UpdateContext<'_>) -> Result<()>;

    /// Write the position interpolated `interpolation` ticks ahead.
    fn draw(&mut self, surface: &mut dyn Surface, interpolation: f64) -> Result<()>;

    /// Called once, when the entity leaves the scheduler. Release shapes here.
    fn remove(&mut self, surface: &mut dyn Surface) -> Result<()>;
}

/// What an entity can see and request during [`Entity::update`].
///
/// Spawns and despawns are deferred until every entity has been updated for
/// the current tick.
pub struct UpdateContext<'a> {
    id: EntityId,
    width: f64,
    height: f64,
    commands: &'a mut Commands,
}

impl<'a> UpdateContext<'a> {
    pub(crate) fn new(id: EntityId, width: f64, height: f64, commands: &'a mut Commands) -> Self {
        Self {
            id,
            width,
            height,
            commands,
        }
    }

    /// The entity being updated.
    pub const fn id(&self) -> EntityId {
        self.id
    }

    /// Surface width at the start of the tick.
    pub const fn width(&self) -> f64 {
        self.width
    }

    /// Surface height at the start of the tick.
    pub const fn height(&self) -> f64 {
        self.height
    }

    /// Queue a new entity for insertion at the end of this tick.
    pub fn spawn(&mut self, entity: Box<dyn Entity>) {
        self.commands.spawn(entity);
    }

    /// Queue an entity for removal at the end of this tick.
    pub fn despawn(&mut self, id: EntityId) {
        self.commands.despawn(id);
    }

    /// Queue this entity for removal at the end of this tick.
    pub fn despawn_self(&mut self) {
        self.commands.despawn(self.id);
    }
}
