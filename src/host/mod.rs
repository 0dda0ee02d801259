//! Host driver: plays the role of a toolkit's main loop for terminal and
//! headless surfaces.
//!
//! - [`InputActor`]: polls terminal input on its own thread
//! - [`Runner`]: waits on input and the surface's pending wakeup, calling
//!   [`Game::step`](crate::Game::step) when it falls due

mod input;
mod runner;

pub use input::{convert_event, InputActor};
pub use runner::{HostAction, RunSummary, Runner, RunnerConfig, INPUT_CHANNEL_CAPACITY};
