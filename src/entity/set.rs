//! Ordered entity storage and deferred structural changes.

use super::{Entity, EntityId};
use crate::error::{Error, Result};
use crate::surface::Surface;
use tracing::debug;

/// Entities in insertion order, which is also update and draw order.
#[derive(Default)]
pub struct EntitySet {
    entries: Vec<(EntityId, Box<dyn Entity>)>,
    next_id: u64,
}

impl EntitySet {
    /// An empty set.
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
            next_id: 0,
        }
    }

    /// Run the entity's `add` hook, then append it.
    ///
    /// If the hook fails the entity is dropped and never joins the set.
    pub fn insert(&mut self, surface: &mut dyn Surface, mut entity: Box<dyn Entity>) -> Result<EntityId> {
        entity.add(surface)?;
        let id = EntityId::new(self.next_id);
        self.next_id += 1;
        self.entries.push((id, entity));
        debug!(%id, "entity added");
        Ok(id)
    }

    /// Run the entity's `remove` hook, then take it out of the set.
    ///
    /// Unknown ids fail with [`Error::EntityNotFound`] before any hook runs.
    pub fn remove(&mut self, surface: &mut dyn Surface, id: EntityId) -> Result<Box<dyn Entity>> {
        let index = self
            .entries
            .iter()
            .position(|(entry_id, _)| *entry_id == id)
            .ok_or(Error::EntityNotFound(id))?;
        self.entries[index].1.remove(surface)?;
        let (_, entity) = self.entries.remove(index);
        debug!(%id, "entity removed");
        Ok(entity)
    }

    /// Remove every entity, running each `remove` hook. Every entity leaves
    /// the set even if a hook fails; the first failure is returned.
    pub fn clear(&mut self, surface: &mut dyn Surface) -> Result<()> {
        let mut first_err = None;
        for (id, mut entity) in self.entries.drain(..) {
            if let Err(e) = entity.remove(surface) {
                first_err.get_or_insert(e);
            }
            debug!(%id, "entity removed");
        }
        first_err.map_or(Ok(()), Err)
    }

    /// Whether `id` is in the set.
    pub fn contains(&self, id: EntityId) -> bool {
        self.entries.iter().any(|(entry_id, _)| *entry_id == id)
    }

    /// Ids in order.
    pub fn ids(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.entries.iter().map(|(id, _)| *id)
    }

    /// Mutable access to every entity, in order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (EntityId, &mut (dyn Entity + 'static))> + '_ {
        self.entries.iter_mut().map(|(id, e)| (*id, e.as_mut()))
    }

    /// Number of entities.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A structural change requested while entities were being updated.
pub enum Command {
    /// Insert a new entity.
    Spawn(Box<dyn Entity>),
    /// Remove an existing entity.
    Despawn(EntityId),
}

/// Queue of structural changes applied after the entity update pass.
#[derive(Default)]
pub struct Commands {
    queue: Vec<Command>,
}

impl Commands {
    /// An empty queue.
    pub const fn new() -> Self {
        Self { queue: Vec::new() }
    }

    /// Queue an insertion.
    pub fn spawn(&mut self, entity: Box<dyn Entity>) {
        self.queue.push(Command::Spawn(entity));
    }

    /// Queue a removal.
    pub fn despawn(&mut self, id: EntityId) {
        self.queue.push(Command::Despawn(id));
    }

    /// Whether nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Apply every queued change in order.
    ///
    /// Despawning an id that is already gone, for example one despawned
    /// twice in the same tick, is a no-op. Every command is applied even if
    /// one fails; the first failure is returned.
    pub fn apply(&mut self, set: &mut EntitySet, surface: &mut dyn Surface) -> Result<()> {
        let mut first_err = None;
        for command in self.queue.drain(..) {
            let result = match command {
                Command::Spawn(entity) => set.insert(surface, entity).map(drop),
                Command::Despawn(id) if !set.contains(id) => {
                    debug!(%id, "despawn of absent entity ignored");
                    Ok(())
                }
                Command::Despawn(id) => set.remove(surface, id).map(drop),
            };
            if let Err(e) = result {
                first_err.get_or_insert(e);
            }
        }
        first_err.map_or(Ok(()), Err)
    }
}
