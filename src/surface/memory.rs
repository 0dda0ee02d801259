//! Headless surface that keeps everything in memory.

use super::{Coords, HostSurface, ShapeId, SubscriptionId, Surface, WakeSlot};
use crate::error::{Error, Result};
use crate::game::EventKind;
use std::collections::BTreeMap;
use std::time::{Duration, Instant};

/// A shape stored by [`MemorySurface`].
#[derive(Debug, Clone, PartialEq)]
pub struct MemoryShape {
    /// Current coordinates.
    pub coords: Coords,
    /// Text content for text items.
    pub text: Option<String>,
    /// Number of `set_coords` calls received.
    pub moves: u64,
}

/// An in-memory surface.
///
/// Records every delay requested through `schedule_after` and counts
/// presented frames, which makes the scheduler observable without a screen.
#[derive(Debug)]
pub struct MemorySurface {
    width: f64,
    height: f64,
    shapes: BTreeMap<ShapeId, MemoryShape>,
    bindings: BTreeMap<SubscriptionId, EventKind>,
    next_handle: u64,
    scheduled: Vec<Duration>,
    frames: u64,
    wake: WakeSlot,
}

impl MemorySurface {
    /// Create a surface with the given bounds.
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            shapes: BTreeMap::new(),
            bindings: BTreeMap::new(),
            next_handle: 1,
            scheduled: Vec::new(),
            frames: 0,
            wake: WakeSlot::new(),
        }
    }

    /// Change the bounds.
    pub fn set_size(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
    }

    /// Look up a shape.
    pub fn shape(&self, shape: ShapeId) -> Option<&MemoryShape> {
        self.shapes.get(&shape)
    }

    /// Number of live shapes.
    pub fn shape_count(&self) -> usize {
        self.shapes.len()
    }

    /// Number of live event bindings.
    pub fn binding_count(&self) -> usize {
        self.bindings.len()
    }

    /// Whether some binding exists for `kind`.
    pub fn is_bound(&self, kind: EventKind) -> bool {
        self.bindings.values().any(|&k| k == kind)
    }

    /// Every delay requested so far, oldest first.
    pub fn scheduled(&self) -> &[Duration] {
        &self.scheduled
    }

    /// The most recently requested delay.
    pub fn last_delay(&self) -> Option<Duration> {
        self.scheduled.last().copied()
    }

    /// Frames presented so far.
    pub const fn frames(&self) -> u64 {
        self.frames
    }

    fn next_handle(&mut self) -> u64 {
        let handle = self.next_handle;
        self.next_handle += 1;
        handle
    }

    fn insert(&mut self, coords: Coords, text: Option<String>) -> ShapeId {
        let id = ShapeId::new(self.next_handle());
        self.shapes.insert(
            id,
            MemoryShape {
                coords,
                text,
                moves: 0,
            },
        );
        id
    }
}

impl Default for MemorySurface {
    fn default() -> Self {
        Self::new(640.0, 480.0)
    }
}

impl Surface for MemorySurface {
    fn width(&self) -> f64 {
        self.width
    }

    fn height(&self) -> f64 {
        self.height
    }

    fn create_shape(&mut self, coords: Coords) -> ShapeId {
        self.insert(coords, None)
    }

    fn create_text(&mut self, coords: Coords, text: &str) -> ShapeId {
        self.insert(coords, Some(text.to_owned()))
    }

    fn coords(&self, shape: ShapeId) -> Option<Coords> {
        self.shapes.get(&shape).map(|s| s.coords)
    }

    fn set_coords(&mut self, shape: ShapeId, coords: Coords) -> Result<()> {
        let entry = self.shapes.get_mut(&shape).ok_or(Error::ShapeNotFound(shape))?;
        entry.coords = coords;
        entry.moves += 1;
        Ok(())
    }

    fn delete_shape(&mut self, shape: ShapeId) -> Result<()> {
        self.shapes
            .remove(&shape)
            .map(|_| ())
            .ok_or(Error::ShapeNotFound(shape))
    }

    fn bind_event(&mut self, kind: EventKind) -> SubscriptionId {
        let id = SubscriptionId::new(self.next_handle());
        self.bindings.insert(id, kind);
        id
    }

    fn unbind_event(&mut self, subscription: SubscriptionId) -> Result<()> {
        self.bindings
            .remove(&subscription)
            .map(|_| ())
            .ok_or(Error::SubscriptionNotFound(subscription))
    }

    fn schedule_after(&mut self, delay: Duration) {
        self.scheduled.push(delay);
        self.wake.arm(Instant::now(), delay);
    }

    fn present(&mut self) -> Result<()> {
        self.frames += 1;
        Ok(())
    }
}

impl HostSurface for MemorySurface {
    fn next_wakeup(&self) -> Option<Instant> {
        self.wake.due()
    }

    fn take_due_wakeup(&mut self, now: Instant) -> bool {
        self.wake.take_due(now)
    }

    fn resize(&mut self, width: u16, height: u16) {
        self.set_size(f64::from(width), f64::from(height));
    }
}
