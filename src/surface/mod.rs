//! Host surfaces: the drawable area the loop drives.
//!
//! A [`Surface`] is everything the scheduler and entities need from the
//! host: bounds, shape handles with coordinate read/write, event bindings,
//! and a single-shot delayed wakeup. Two implementations ship:
//!
//! - [`MemorySurface`]: headless, records everything, for tests and tools
//! - [`TerminalSurface`]: a character-cell canvas on a real terminal
//!
//! Hosts that run in real time also implement [`HostSurface`] so the
//! [`Runner`](crate::host::Runner) can see when the pending wakeup falls due.

mod memory;
pub mod raster;
mod terminal;

pub use memory::{MemoryShape, MemorySurface};
pub use raster::Raster;
pub use terminal::{TerminalConfig, TerminalSurface};

use crate::error::Result;
use crate::game::EventKind;
use std::fmt;
use std::time::{Duration, Instant};

/// Opaque handle to a shape on a surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ShapeId(u64);

impl ShapeId {
    /// Wrap a raw handle.
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw handle.
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ShapeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "shape:{}", self.0)
    }
}

/// Opaque handle to an event binding on a surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    /// Wrap a raw handle.
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw handle.
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub:{}", self.0)
    }
}

/// Shape coordinates: a 2-value point or a 4-value bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Coords {
    /// A single anchor point.
    Point {
        /// X coordinate.
        x: f64,
        /// Y coordinate.
        y: f64,
    },
    /// A box from `(x0, y0)` to `(x1, y1)`.
    Rect {
        /// Left.
        x0: f64,
        /// Top.
        y0: f64,
        /// Right.
        x1: f64,
        /// Bottom.
        y1: f64,
    },
}

impl Coords {
    /// A point.
    pub const fn point(x: f64, y: f64) -> Self {
        Self::Point { x, y }
    }

    /// A box given by its two corners.
    pub const fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self::Rect { x0, y0, x1, y1 }
    }

    /// Number of coordinate values: 2 or 4.
    pub const fn len(&self) -> usize {
        match self {
            Self::Point { .. } => 2,
            Self::Rect { .. } => 4,
        }
    }

    /// Always false; present for symmetry with `len`.
    pub const fn is_empty(&self) -> bool {
        false
    }

    /// The anchor (top-left) point.
    pub const fn origin(&self) -> (f64, f64) {
        match *self {
            Self::Point { x, y } => (x, y),
            Self::Rect { x0, y0, .. } => (x0, y0),
        }
    }

    /// The coordinate values in order.
    pub fn values(&self) -> Vec<f64> {
        match *self {
            Self::Point { x, y } => vec![x, y],
            Self::Rect { x0, y0, x1, y1 } => vec![x0, y0, x1, y1],
        }
    }
}

/// The capability contract between the loop and its host.
///
/// Object safe: entities and hooks receive `&mut dyn Surface`.
pub trait Surface {
    /// Logical width of the drawable area.
    fn width(&self) -> f64;

    /// Logical height of the drawable area.
    fn height(&self) -> f64;

    /// Create a plain shape at `coords`.
    fn create_shape(&mut self, coords: Coords) -> ShapeId;

    /// Create a text item anchored at `coords`.
    fn create_text(&mut self, coords: Coords, text: &str) -> ShapeId;

    /// Read a shape's current coordinates.
    fn coords(&self, shape: ShapeId) -> Option<Coords>;

    /// Move or resize a shape.
    fn set_coords(&mut self, shape: ShapeId, coords: Coords) -> Result<()>;

    /// Delete a shape and release its handle.
    fn delete_shape(&mut self, shape: ShapeId) -> Result<()>;

    /// Start delivering events of `kind`.
    fn bind_event(&mut self, kind: EventKind) -> SubscriptionId;

    /// Stop a binding made by [`bind_event`](Self::bind_event).
    fn unbind_event(&mut self, subscription: SubscriptionId) -> Result<()>;

    /// Arm a single-shot wakeup `delay` from now. The host answers by calling
    /// [`Game::step`](crate::Game::step) once the delay has elapsed.
    fn schedule_after(&mut self, delay: Duration);

    /// Flush whatever was drawn since the last call.
    fn present(&mut self) -> Result<()> {
        Ok(())
    }
}

/// A surface that a real-time host loop can wait on.
pub trait HostSurface: Surface {
    /// When the pending wakeup is due, if one is armed.
    fn next_wakeup(&self) -> Option<Instant>;

    /// Disarm and return `true` if the pending wakeup is due at `now`.
    fn take_due_wakeup(&mut self, now: Instant) -> bool;

    /// The host area changed size.
    fn resize(&mut self, width: u16, height: u16);
}

/// Holds at most one pending wakeup. Re-arming replaces the previous one.
#[derive(Debug, Clone, Copy, Default)]
pub struct WakeSlot {
    due: Option<Instant>,
}

impl WakeSlot {
    /// An empty slot.
    pub const fn new() -> Self {
        Self { due: None }
    }

    /// Arm for `delay` after `now`.
    pub fn arm(&mut self, now: Instant, delay: Duration) {
        self.due = Some(now + delay);
    }

    /// The pending deadline.
    pub const fn due(&self) -> Option<Instant> {
        self.due
    }

    /// Disarm if due at `now`.
    pub fn take_due(&mut self, now: Instant) -> bool {
        match self.due {
            Some(due) if due <= now => {
                self.due = None;
                true
            }
            _ => false,
        }
    }

    /// Disarm unconditionally.
    pub fn clear(&mut self) {
        self.due = None;
    }
}
