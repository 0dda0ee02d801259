//! Bounce: text labels drifting around the terminal at a fixed tick rate.
//!
//! Keys: space starts/stops, `p` pauses/resumes, `n` spawns a label,
//! `q` or Esc quits. Clicking teleports every label to the pointer.
//!
//! Logs go to `tickwheel-bounce.log`; set `RUST_LOG=tickwheel=trace` to see
//! every scheduling pass.

use std::fs::File;
use std::sync::Mutex;
use tickwheel::{
    Body, Bouncer, Entity, Event, EventKind, Game, GameHooks, HostAction, KeyCode, LoopConfig,
    LoopState, Result, Runner, Scene, Surface, TerminalSurface, UpdateContext,
};
use tracing_subscriber::EnvFilter;

const LABELS: [&str; 4] = ["tick", "wheel", "fixed", "step"];

/// A static line of text.
struct Label {
    text: &'static str,
    body: Body,
}

impl Entity for Label {
    fn add(&mut self, surface: &mut dyn Surface) -> Result<()> {
        self.body.attach_text(surface, self.text);
        Ok(())
    }

    fn update(&mut self, _events: &[Event], _ctx: &mut UpdateContext<'_>) -> Result<()> {
        Ok(())
    }

    fn draw(&mut self, surface: &mut dyn Surface, interpolation: f64) -> Result<()> {
        self.body.draw(surface, interpolation)
    }

    fn remove(&mut self, surface: &mut dyn Surface) -> Result<()> {
        self.body.detach(surface)
    }
}

#[derive(Default)]
struct BounceGame {
    spawned: u32,
}

impl BounceGame {
    fn spawn(&mut self, scene: &mut Scene<'_>) -> Result<()> {
        let n = self.spawned;
        self.spawned += 1;
        let x = (f64::from(n) * 7.0) % scene.width().max(1.0);
        let y = (f64::from(n) * 3.0) % scene.height().max(1.0);
        let dx = if n % 2 == 0 { 1.0 } else { -1.0 };
        let label = LABELS[n as usize % LABELS.len()];
        scene.add_entity(Box::new(Bouncer::new(label, x, y, dx, 0.5)))?;
        Ok(())
    }
}

impl GameHooks for BounceGame {
    fn run(&mut self, scene: &mut Scene<'_>) -> Result<()> {
        scene.add_event_listener(EventKind::Key);
        scene.add_event_listener(EventKind::ButtonPress);
        scene.add_entity(Box::new(Label {
            text: "space start/stop  p pause  n spawn  q quit",
            body: Body::at(0.0, 0.0),
        }))?;
        self.spawned = 0;
        for _ in 0..3 {
            self.spawn(scene)?;
        }
        Ok(())
    }

    fn update(&mut self, scene: &mut Scene<'_>, events: &[Event]) -> Result<()> {
        for event in events {
            if event.key_code() == Some(KeyCode::Char('n')) {
                self.spawn(scene)?;
            }
        }
        Ok(())
    }

    fn draw(&mut self, _surface: &mut dyn Surface, _interpolation: f64) -> Result<()> {
        Ok(())
    }
}

fn intercept(game: &mut Game<TerminalSurface, BounceGame>, event: &Event) -> Result<HostAction> {
    Ok(match event.key_code() {
        Some(KeyCode::Char('q') | KeyCode::Esc) => HostAction::Quit,
        Some(KeyCode::Char(' ')) => {
            if game.state() == LoopState::Stopped {
                game.start()?;
            } else {
                game.stop()?;
            }
            HostAction::Consume
        }
        Some(KeyCode::Char('p')) => {
            match game.state() {
                LoopState::Running => game.pause(),
                LoopState::Paused => {
                    game.start()?;
                }
                LoopState::Stopped => {}
            }
            HostAction::Consume
        }
        _ => HostAction::Forward,
    })
}

fn main() -> Result<()> {
    let log = File::create("tickwheel-bounce.log")?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(log))
        .with_ansi(false)
        .compact()
        .init();

    let runner = Runner::default();
    let (input, events) = runner.spawn_input();

    let config = LoopConfig::new(20.0, 60.0, 5);
    let mut game = Game::with_config(TerminalSurface::new()?, BounceGame::default(), config)?;
    game.start()?;

    let outcome = runner.run(&mut game, &events, intercept);
    let stopped = game.stop();
    let (ticks, frames) = (game.ticks(), game.frames());

    // Restores the terminal before anything is printed.
    drop(game);
    input.join();

    let summary = outcome?;
    stopped?;
    println!(
        "{} steps, {ticks} ticks, {frames} frames, {} events forwarded",
        summary.steps, summary.forwarded
    );
    Ok(())
}
