//! Game: the fixed-timestep loop and everything it owns.
//!
//! # Architecture
//!
//! ```text
//!  host timer ──▶ Game::step ──▶ catch-up ticks (≤ max_frameskip)
//!      ▲                           │  GameHooks::update, Entity::update
//!      │                           ▼
//!      │                       one draw (interpolated)
//!      │                           │  GameHooks::draw, Entity::draw
//!      │                           ▼
//!      └──── Surface::schedule_after(min(next_update, next_draw) - now)
//!
//!  host input ──▶ Game::handle_event ──▶ EventQueue (drained each tick)
//! ```

mod config;
mod events;
mod hooks;
mod scheduler;
pub mod timing;

pub use config::{DelayQuantization, LoopConfig, MAX_RATE};
pub use events::{
    Event, EventKind, EventQueue, KeyCode, KeyModifiers, Listeners, MouseButton, Pointer,
};
pub use hooks::{GameHooks, Scene};
pub use scheduler::{Game, LoopState, StepReport};
