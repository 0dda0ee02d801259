//! The host loop: waits for input or the next wakeup, whichever comes first.

use super::input::InputActor;
use crate::clock::Clock;
use crate::error::Result;
use crate::game::{Event, Game, GameHooks};
use crate::surface::HostSurface;
use crossbeam_channel::{bounded, Receiver, RecvTimeoutError};
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Capacity of the input channel between the input thread and the host loop.
pub const INPUT_CHANNEL_CAPACITY: usize = 64;

/// Configuration for [`Runner`].
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// How long to wait for input when no wakeup is pending.
    pub idle_poll: Duration,
    /// Poll timeout of the input thread before it rechecks shutdown.
    pub input_poll_timeout: Duration,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            idle_poll: Duration::from_millis(100),
            input_poll_timeout: Duration::from_millis(10),
        }
    }
}

/// What the host does with an event after the interceptor saw it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostAction {
    /// Hand the event to [`Game::handle_event`].
    Forward,
    /// Swallow the event.
    Consume,
    /// Leave the host loop.
    Quit,
}

/// Counters for one [`Runner::run`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Scheduling passes the host triggered.
    pub steps: u64,
    /// Events forwarded to the game.
    pub forwarded: u64,
    /// Events the game buffered.
    pub buffered: u64,
}

/// Single-threaded host loop.
///
/// Plays the part of a GUI toolkit's main loop: it answers the surface's
/// `schedule_after` requests by calling [`Game::step`] when they fall due,
/// and delivers input in between.
#[derive(Debug, Clone, Default)]
pub struct Runner {
    config: RunnerConfig,
}

impl Runner {
    /// Create a runner.
    pub const fn new(config: RunnerConfig) -> Self {
        Self { config }
    }

    /// The configuration.
    pub const fn config(&self) -> &RunnerConfig {
        &self.config
    }

    /// Spawn the terminal input thread and return it with its receiver.
    pub fn spawn_input(&self) -> (InputActor, Receiver<Event>) {
        let (tx, rx) = bounded(INPUT_CHANNEL_CAPACITY);
        let actor = InputActor::spawn(tx, self.config.input_poll_timeout);
        (actor, rx)
    }

    /// Drive `game` until the interceptor quits or the event source closes.
    ///
    /// `intercept` sees every event first, with mutable access to the game
    /// so it can start, pause or stop the loop. Resize events resize the
    /// surface before the interceptor runs.
    ///
    /// # Errors
    ///
    /// The first error returned by the interceptor or by a scheduling pass.
    pub fn run<S, H, C, F>(
        &self,
        game: &mut Game<S, H, C>,
        events: &Receiver<Event>,
        mut intercept: F,
    ) -> Result<RunSummary>
    where
        S: HostSurface,
        H: GameHooks,
        C: Clock,
        F: FnMut(&mut Game<S, H, C>, &Event) -> Result<HostAction>,
    {
        let mut summary = RunSummary::default();
        info!("host loop started");

        loop {
            let now = Instant::now();
            if game.surface_mut().take_due_wakeup(now) {
                game.step()?;
                summary.steps += 1;
                continue;
            }

            let timeout = game
                .surface()
                .next_wakeup()
                .map_or(self.config.idle_poll, |due| due.saturating_duration_since(now));

            let event = match events.recv_timeout(timeout) {
                Ok(event) => event,
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => {
                    debug!("event source closed");
                    break;
                }
            };

            if let Event::Resize { width, height } = event {
                game.surface_mut().resize(width, height);
            }

            match intercept(game, &event)? {
                HostAction::Forward => {
                    summary.forwarded += 1;
                    if game.handle_event(event) {
                        summary.buffered += 1;
                    }
                }
                HostAction::Consume => {}
                HostAction::Quit => break,
            }
        }

        info!(
            steps = summary.steps,
            forwarded = summary.forwarded,
            "host loop finished"
        );
        Ok(summary)
    }
}
