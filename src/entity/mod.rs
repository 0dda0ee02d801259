//! Entities: simulated objects driven by the loop.
//!
//! This module contains:
//! - [`Entity`]: the add/update/draw/remove contract
//! - [`EntitySet`]: ordered storage owned by the scheduler
//! - [`Commands`]: spawns and despawns requested mid-tick
//! - [`Body`]: position/velocity/size with the standard interpolated draw
//! - [`Bouncer`]: a ready-made text entity that bounces around the surface

mod body;
mod bouncer;
mod set;
mod traits;

pub use body::Body;
pub use bouncer::Bouncer;
pub use set::{Command, Commands, EntitySet};
pub use traits::{Entity, UpdateContext};

use std::fmt;

/// Identity of an entity within one scheduler, assigned at insertion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(u64);

impl EntityId {
    /// Wrap a raw id.
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw id.
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, Result};
    use crate::game::Event;
    use crate::surface::{MemorySurface, Surface};

    struct Dot(Body);

    impl Entity for Dot {
        fn add(&mut self, surface: &mut dyn Surface) -> Result<()> {
            self.0.attach(surface);
            Ok(())
        }

        fn update(&mut self, _events: &[Event], _ctx: &mut UpdateContext<'_>) -> Result<()> {
            Ok(())
        }

        fn draw(&mut self, surface: &mut dyn Surface, interpolation: f64) -> Result<()> {
            self.0.draw(surface, interpolation)
        }

        fn remove(&mut self, surface: &mut dyn Surface) -> Result<()> {
            self.0.detach(surface)
        }
    }

    struct Broken;

    impl Entity for Broken {
        fn add(&mut self, _surface: &mut dyn Surface) -> Result<()> {
            Err(Error::hook("no shapes today"))
        }

        fn update(&mut self, _events: &[Event], _ctx: &mut UpdateContext<'_>) -> Result<()> {
            Ok(())
        }

        fn draw(&mut self, _surface: &mut dyn Surface, _interpolation: f64) -> Result<()> {
            Ok(())
        }

        fn remove(&mut self, _surface: &mut dyn Surface) -> Result<()> {
            Ok(())
        }
    }

    fn dot() -> Box<dyn Entity> {
        Box::new(Dot(Body::at(0.0, 0.0)))
    }

    #[test]
    fn test_insert_keeps_order() {
        let mut surface = MemorySurface::default();
        let mut set = EntitySet::new();
        let a = set.insert(&mut surface, dot()).unwrap();
        let b = set.insert(&mut surface, dot()).unwrap();
        assert_eq!(set.ids().collect::<Vec<_>>(), vec![a, b]);
        assert_eq!(surface.shape_count(), 2);
    }

    #[test]
    fn test_remove_unknown_is_not_found() {
        let mut surface = MemorySurface::default();
        let mut set = EntitySet::new();
        let err = set.remove(&mut surface, EntityId::new(42));
        assert!(matches!(err, Err(Error::EntityNotFound(id)) if id == EntityId::new(42)));
    }

    #[test]
    fn test_remove_twice_fails_second_time() {
        let mut surface = MemorySurface::default();
        let mut set = EntitySet::new();
        let id = set.insert(&mut surface, dot()).unwrap();
        assert!(set.remove(&mut surface, id).is_ok());
        assert!(matches!(set.remove(&mut surface, id), Err(Error::EntityNotFound(_))));
        assert_eq!(surface.shape_count(), 0);
    }

    #[test]
    fn test_failed_add_never_joins() {
        let mut surface = MemorySurface::default();
        let mut set = EntitySet::new();
        assert!(set.insert(&mut surface, Box::new(Broken)).is_err());
        assert!(set.is_empty());
    }

    #[test]
    fn test_clear_releases_all_shapes() {
        let mut surface = MemorySurface::default();
        let mut set = EntitySet::new();
        set.insert(&mut surface, dot()).unwrap();
        set.insert(&mut surface, dot()).unwrap();
        set.clear(&mut surface).unwrap();
        assert!(set.is_empty());
        assert_eq!(surface.shape_count(), 0);
    }

    #[test]
    fn test_commands_apply_in_order() {
        let mut surface = MemorySurface::default();
        let mut set = EntitySet::new();
        let first = set.insert(&mut surface, dot()).unwrap();

        let mut commands = Commands::new();
        commands.spawn(dot());
        commands.despawn(first);
        assert!(!commands.is_empty());
        commands.apply(&mut set, &mut surface).unwrap();

        assert!(commands.is_empty());
        assert_eq!(set.len(), 1);
        assert!(!set.contains(first));
    }

    #[test]
    fn test_repeated_despawn_is_noop() {
        let mut surface = MemorySurface::default();
        let mut set = EntitySet::new();
        let id = set.insert(&mut surface, dot()).unwrap();

        let mut commands = Commands::new();
        commands.despawn(id);
        commands.despawn(id);
        commands.despawn(EntityId::new(99));
        commands.apply(&mut set, &mut surface).unwrap();

        assert!(set.is_empty());
        assert_eq!(surface.shape_count(), 0);
    }

    #[test]
    fn test_failed_spawn_keeps_applying_queue() {
        let mut surface = MemorySurface::default();
        let mut set = EntitySet::new();
        let first = set.insert(&mut surface, dot()).unwrap();

        let mut commands = Commands::new();
        commands.spawn(Box::new(Broken));
        commands.despawn(first);
        commands.spawn(dot());

        assert!(matches!(commands.apply(&mut set, &mut surface), Err(Error::Hook(_))));
        assert!(commands.is_empty());
        assert!(!set.contains(first));
        assert_eq!(set.len(), 1);
    }
}
