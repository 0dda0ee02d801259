//! # Tickwheel
//!
//! A fixed-timestep game loop driven by host timer callbacks.
//!
//! Tickwheel runs simulation updates at a constant rate, draws at an
//! independent rate with interpolation, and never blocks: every scheduling
//! pass ends by asking the host surface for a single-shot wakeup.
//!
//! ## Core Concepts
//!
//! - **Fixed updates, free draws**: `ticks_per_second` and `frames_per_second` are independent
//! - **Capped catch-up**: at most `max_frameskip` ticks per pass, so a stall cannot spiral
//! - **Interpolation**: draws receive how far the clock sits between two ticks
//! - **Host-driven**: the [`Surface`] re-invokes [`Game::step`]; [`Runner`] is one such host
//!
//! ## Example
//!
//! ```rust,ignore
//! use tickwheel::{Bouncer, Game, GameHooks, LoopConfig, MemorySurface, Scene};
//!
//! let config = LoopConfig::new(20.0, 60.0, 5);
//! let mut game = Game::with_config(MemorySurface::default(), MyHooks, config)?;
//! game.start()?;
//! game.add_entity(Box::new(Bouncer::new("hi", 10.0, 10.0, 2.0, 1.0)))?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod clock;
pub mod entity;
pub mod error;
pub mod game;
pub mod host;
pub mod surface;

// Re-exports for convenience
pub use clock::{Clock, ManualClock, MonotonicClock};
pub use entity::{Body, Bouncer, Commands, Entity, EntityId, EntitySet, UpdateContext};
pub use error::{Error, HookError, Result};
pub use game::{
    DelayQuantization, Event, EventKind, Game, GameHooks, KeyCode, KeyModifiers, LoopConfig,
    LoopState, MouseButton, Pointer, Scene, StepReport,
};
pub use host::{HostAction, InputActor, RunSummary, Runner, RunnerConfig};
pub use surface::{
    Coords, HostSurface, MemorySurface, ShapeId, SubscriptionId, Surface, TerminalConfig,
    TerminalSurface,
};
