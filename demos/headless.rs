//! Headless: drive the loop by hand with a manual clock and a memory surface.
//!
//! Acts as the host itself: after every pass it advances the clock by the
//! requested delay and calls `step` again. Halfway through it simulates a
//! half-second stall to show the catch-up cap.

use tickwheel::{
    Bouncer, Event, Game, GameHooks, LoopConfig, ManualClock, MemorySurface, Result, Scene,
    StepReport, Surface,
};

struct OneBouncer;

impl GameHooks for OneBouncer {
    fn run(&mut self, scene: &mut Scene<'_>) -> Result<()> {
        scene.add_entity(Box::new(Bouncer::new("o", 10.0, 10.0, 4.0, 3.0)))?;
        Ok(())
    }

    fn update(&mut self, _scene: &mut Scene<'_>, _events: &[Event]) -> Result<()> {
        Ok(())
    }

    fn draw(&mut self, _surface: &mut dyn Surface, _interpolation: f64) -> Result<()> {
        Ok(())
    }
}

fn print_report(now: f64, report: &StepReport) {
    let interpolation = report
        .interpolation
        .map_or_else(|| "-".to_string(), |i| format!("{i:.3}"));
    let delay = report
        .delay
        .map_or_else(|| "halted".to_string(), |d| format!("{}ms", d.as_millis()));
    println!(
        "t={now:>7.3}s  updates={}  interpolation={interpolation:>6}  next={delay}",
        report.updates
    );
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .compact()
        .init();

    let clock = ManualClock::new(0.0);
    let config = LoopConfig::new(20.0, 60.0, 5);
    let mut game = Game::with_clock(
        MemorySurface::new(80.0, 24.0),
        OneBouncer,
        config,
        clock.clone(),
    )?;

    let mut now = 0.0;
    let mut report = game.start()?;
    print_report(now, &report);

    for pass in 0..40 {
        let Some(delay) = report.delay else { break };
        let mut elapsed = delay.as_secs_f64();
        if pass == 20 {
            println!("-- stall --");
            elapsed += 0.5;
        }
        now += elapsed;
        clock.set(now);
        report = game.step()?;
        print_report(now, &report);
    }

    game.pause();
    print_report(now, &game.step()?);

    println!(
        "{} ticks, {} frames, {} shapes",
        game.ticks(),
        game.frames(),
        game.surface().shape_count()
    );
    game.stop()
}
