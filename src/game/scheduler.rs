//! Game: the fixed-timestep loop scheduler.
//!
//! The scheduler never blocks and never loops on its own. Each call to
//! [`Game::step`] runs one scheduling pass and then asks the surface for a
//! single-shot wakeup; the host answers by calling `step` again. A pass:
//!
//! 1. halts the chain if the loop is not running,
//! 2. runs catch-up ticks while the update deadline is behind the clock,
//!    at most `max_frameskip` of them,
//! 3. draws once if the draw deadline has passed, interpolated between the
//!    last tick and the next,
//! 4. rearms the wakeup for the earlier of the two deadlines.
//!
//! Update rate and draw rate are independent: simulation runs at
//! `ticks_per_second`, drawing at up to `frames_per_second`.

use super::config::LoopConfig;
use super::events::{Event, EventKind, EventQueue, Listeners};
use super::hooks::{GameHooks, Scene};
use super::timing;
use crate::clock::{Clock, MonotonicClock};
use crate::entity::{Commands, Entity, EntityId, EntitySet, UpdateContext};
use crate::error::{Error, Result};
use crate::surface::{Surface, SubscriptionId};
use std::time::Duration;
use tracing::{debug, error, info, trace, warn};

/// Lifecycle state of the loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoopState {
    /// Not started, or stopped: no entities, no listeners.
    #[default]
    Stopped,
    /// Ticking and drawing.
    Running,
    /// Halted with entities and listeners kept. `start()` resumes.
    Paused,
}

impl LoopState {
    /// Whether the scheduling chain is live.
    #[inline]
    pub const fn is_running(self) -> bool {
        matches!(self, Self::Running)
    }
}

/// What one scheduling pass did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepReport {
    /// Update ticks performed.
    pub updates: u32,
    /// Interpolation used if a frame was drawn.
    pub interpolation: Option<f64>,
    /// Delay requested from the host, `None` when the chain halted.
    pub delay: Option<Duration>,
}

impl StepReport {
    const fn halted() -> Self {
        Self {
            updates: 0,
            interpolation: None,
            delay: None,
        }
    }

    /// Whether this pass ended the scheduling chain.
    pub const fn is_halted(&self) -> bool {
        self.delay.is_none()
    }

    /// Whether this pass drew a frame.
    pub const fn drew(&self) -> bool {
        self.interpolation.is_some()
    }
}

/// The loop scheduler.
///
/// Owns the surface, the entity collection, the listener registry and the
/// event buffer. Everything is mutated from inside `step` or from the
/// public methods below; nothing is shared across threads.
pub struct Game<S, H, C = MonotonicClock> {
    config: LoopConfig,
    clock: C,
    surface: S,
    hooks: H,
    entities: EntitySet,
    listeners: Listeners,
    events: EventQueue,
    state: LoopState,
    /// Absolute clock time of the next update tick.
    next_update: f64,
    /// Absolute clock time of the next draw.
    next_draw: f64,
    ticks: u64,
    frames: u64,
}

impl<S: Surface, H: GameHooks> Game<S, H, MonotonicClock> {
    /// Create a scheduler with the default configuration.
    ///
    /// # Errors
    ///
    /// Never fails with the default configuration; kept fallible for
    /// symmetry with [`with_config`](Self::with_config).
    pub fn new(surface: S, hooks: H) -> Result<Self> {
        Self::with_config(surface, hooks, LoopConfig::default())
    }

    /// Create a scheduler driven by the wall clock.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `config` fails validation.
    pub fn with_config(surface: S, hooks: H, config: LoopConfig) -> Result<Self> {
        Self::with_clock(surface, hooks, config, MonotonicClock::new())
    }
}

impl<S: Surface, H: GameHooks, C: Clock> Game<S, H, C> {
    /// Create a scheduler reading time from `clock`.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `config` fails validation.
    pub fn with_clock(surface: S, hooks: H, config: LoopConfig, clock: C) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            clock,
            surface,
            hooks,
            entities: EntitySet::new(),
            listeners: Listeners::new(),
            events: EventQueue::new(),
            state: LoopState::Stopped,
            next_update: 0.0,
            next_draw: 0.0,
            ticks: 0,
            frames: 0,
        })
    }

    /// The validated configuration.
    pub const fn config(&self) -> &LoopConfig {
        &self.config
    }

    /// Current lifecycle state.
    pub const fn state(&self) -> LoopState {
        self.state
    }

    /// Whether the loop is running.
    pub const fn is_running(&self) -> bool {
        self.state.is_running()
    }

    /// The clock.
    pub const fn clock(&self) -> &C {
        &self.clock
    }

    /// The host surface.
    pub const fn surface(&self) -> &S {
        &self.surface
    }

    /// The host surface, mutably.
    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    /// The game hooks.
    pub const fn hooks(&self) -> &H {
        &self.hooks
    }

    /// The game hooks, mutably.
    pub fn hooks_mut(&mut self) -> &mut H {
        &mut self.hooks
    }

    /// Surface width.
    pub fn width(&self) -> f64 {
        self.surface.width()
    }

    /// Surface height.
    pub fn height(&self) -> f64 {
        self.surface.height()
    }

    /// Number of entities.
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Entity ids in update/draw order.
    pub fn entity_ids(&self) -> Vec<EntityId> {
        self.entities.ids().collect()
    }

    /// Number of event kinds being listened for.
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Whether events of `kind` are being listened for.
    pub fn is_listening(&self, kind: EventKind) -> bool {
        self.listeners.accepts(kind)
    }

    /// Events buffered for the next tick.
    pub fn pending_events(&self) -> &[Event] {
        self.events.as_slice()
    }

    /// Absolute time of the next update tick.
    pub const fn next_update_deadline(&self) -> f64 {
        self.next_update
    }

    /// Absolute time of the next draw.
    pub const fn next_draw_deadline(&self) -> f64 {
        self.next_draw
    }

    /// Update ticks performed since construction.
    pub const fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Frames drawn since construction.
    pub const fn frames(&self) -> u64 {
        self.frames
    }

    /// Start or resume the loop and run the first scheduling pass.
    ///
    /// From [`LoopState::Stopped`] the `run` hook is called first; resuming
    /// from [`LoopState::Paused`] skips it. Both deadlines are reset to now.
    /// If `run` fails, whatever it set up is released and the loop is left
    /// stopped.
    ///
    /// # Errors
    ///
    /// [`Error::AlreadyRunning`] if the loop is running, or a hook fault
    /// from `run` or the first pass.
    pub fn start(&mut self) -> Result<StepReport> {
        let from = self.state;
        if from.is_running() {
            return Err(Error::AlreadyRunning);
        }

        self.state = LoopState::Running;
        self.next_update = self.clock.now();
        self.next_draw = self.next_update;

        if from == LoopState::Stopped {
            info!(
                ticks_per_second = self.config.ticks_per_second,
                frames_per_second = self.config.frames_per_second,
                max_frameskip = self.config.max_frameskip,
                "loop started"
            );
            if let Err(err) = self.hooks.run(&mut Scene::new(
                &mut self.surface,
                &mut self.entities,
                &mut self.listeners,
                &mut self.events,
            )) {
                // Half-finished setup is released so the next start runs it again
                error!(%err, "setup failed, loop stopped");
                if let Err(cleanup) = self.stop() {
                    warn!(%cleanup, "cleanup after failed setup");
                }
                return Err(err);
            }
        } else {
            info!("loop resumed");
        }

        self.step()
    }

    /// Halt the scheduling chain, keeping entities, listeners and deadlines.
    ///
    /// Takes effect at the top of the next pass.
    pub fn pause(&mut self) {
        if self.state.is_running() {
            self.state = LoopState::Paused;
            info!("loop paused");
        }
    }

    /// Halt the loop and release everything: listeners are unbound, the
    /// event buffer is cleared and every entity is removed.
    ///
    /// Cleanup always runs to completion; the first hook or surface failure
    /// is returned afterwards. Stopping a stopped loop is a no-op.
    pub fn stop(&mut self) -> Result<()> {
        let was = self.state;
        self.state = LoopState::Stopped;

        let listeners = self.listeners.clear(&mut self.surface);
        self.events.clear();
        let entities = self.entities.clear(&mut self.surface);

        if was != LoopState::Stopped {
            info!("loop stopped");
        }
        listeners.and(entities)
    }

    /// Add an entity, running its `add` hook first.
    pub fn add_entity(&mut self, entity: Box<dyn Entity>) -> Result<EntityId> {
        self.entities.insert(&mut self.surface, entity)
    }

    /// Remove an entity, running its `remove` hook first.
    ///
    /// # Errors
    ///
    /// [`Error::EntityNotFound`] if `id` is not in the collection.
    pub fn remove_entity(&mut self, id: EntityId) -> Result<Box<dyn Entity>> {
        self.entities.remove(&mut self.surface, id)
    }

    /// Start buffering events of `kind` while running.
    pub fn add_event_listener(&mut self, kind: EventKind) -> SubscriptionId {
        self.listeners.add(&mut self.surface, kind)
    }

    /// Stop buffering events of `kind` and drop those already buffered.
    ///
    /// # Errors
    ///
    /// [`Error::ListenerNotFound`] if nothing listens for `kind`.
    pub fn remove_event_listener(&mut self, kind: EventKind) -> Result<()> {
        self.listeners.remove(&mut self.surface, kind)?;
        self.events.discard_kind(kind);
        Ok(())
    }

    /// Deliver an event from the host.
    ///
    /// Buffered for the next tick only while running and listening for its
    /// kind; otherwise dropped. Returns whether it was buffered.
    pub fn handle_event(&mut self, event: Event) -> bool {
        if self.state.is_running() && self.listeners.accepts(event.kind()) {
            self.events.push(event);
            true
        } else {
            trace!(?event, "event dropped");
            false
        }
    }

    /// Run one scheduling pass.
    ///
    /// # Errors
    ///
    /// A hook fault. The loop is left paused and no wakeup is requested.
    pub fn step(&mut self) -> Result<StepReport> {
        if !self.state.is_running() {
            trace!(state = ?self.state, "scheduling chain halted");
            return Ok(StepReport::halted());
        }

        let tick_delay = self.config.tick_delay();
        let max_frameskip = self.config.max_frameskip;

        let mut updates = 0;
        while self.clock.now() > self.next_update && updates < max_frameskip {
            if let Err(err) = self.tick() {
                self.fault(&err);
                return Err(err);
            }
            updates += 1;
            self.next_update += tick_delay;
        }

        if updates == max_frameskip && self.clock.now() > self.next_update {
            debug!(
                behind = self.clock.now() - self.next_update,
                "frameskip limit reached"
            );
        }

        let mut interpolation = None;
        let now = self.clock.now();
        if now > self.next_draw {
            let value = timing::interpolation(now, self.next_update, tick_delay);
            if let Err(err) = self.render(value) {
                self.fault(&err);
                return Err(err);
            }
            self.next_draw = timing::advance_draw_deadline(
                self.next_draw,
                self.config.frame_delay(),
                self.clock.now(),
            );
            interpolation = Some(value);
        }

        let delay = timing::reschedule_delay(
            self.clock.now(),
            self.next_update,
            self.next_draw,
            self.config.quantization,
        );
        self.surface.schedule_after(delay);
        trace!(updates, ?interpolation, ?delay, "step");

        Ok(StepReport {
            updates,
            interpolation,
            delay: Some(delay),
        })
    }

    /// One update tick: deliver buffered events, then drop them.
    fn tick(&mut self) -> Result<()> {
        let events = self.events.take();
        let Self {
            hooks,
            surface,
            entities,
            listeners,
            events: queue,
            ..
        } = self;

        hooks.update(&mut Scene::new(surface, entities, listeners, queue), &events)?;

        let (width, height) = (surface.width(), surface.height());
        let mut commands = Commands::new();
        for (id, entity) in entities.iter_mut() {
            let mut ctx = UpdateContext::new(id, width, height, &mut commands);
            entity.update(&events, &mut ctx)?;
        }
        commands.apply(entities, surface)?;

        self.ticks += 1;
        Ok(())
    }

    /// One drawn frame.
    fn render(&mut self, interpolation: f64) -> Result<()> {
        let Self {
            hooks,
            surface,
            entities,
            ..
        } = self;

        hooks.draw(surface, interpolation)?;
        for (_, entity) in entities.iter_mut() {
            entity.draw(surface, interpolation)?;
        }
        surface.present()?;

        self.frames += 1;
        Ok(())
    }

    fn fault(&mut self, err: &Error) {
        error!(%err, "hook fault, loop halted");
        self.state = LoopState::Paused;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::entity::Body;
    use crate::game::{DelayQuantization, MouseButton, Pointer};
    use crate::surface::{Coords, MemorySurface};
    use std::cell::RefCell;
    use std::rc::Rc;

    type Log = Rc<RefCell<Vec<String>>>;

    /// Entity that records every hook call.
    struct Recorder {
        name: &'static str,
        log: Log,
        body: Body,
        fail_update: bool,
        spawn_once: bool,
    }

    impl Recorder {
        fn new(name: &'static str, log: &Log) -> Self {
            Self {
                name,
                log: Rc::clone(log),
                body: Body::at(10.0, 10.0).with_velocity(5.0, 5.0),
                fail_update: false,
                spawn_once: false,
            }
        }
    }

    impl Entity for Recorder {
        fn add(&mut self, surface: &mut dyn Surface) -> Result<()> {
            self.body.attach(surface);
            self.log.borrow_mut().push(format!("add:{}", self.name));
            Ok(())
        }

        fn update(&mut self, events: &[Event], ctx: &mut UpdateContext<'_>) -> Result<()> {
            self.log
                .borrow_mut()
                .push(format!("update:{}:{}", self.name, events.len()));
            if self.fail_update {
                return Err(Error::hook("update exploded"));
            }
            if self.spawn_once {
                self.spawn_once = false;
                ctx.spawn(Box::new(Recorder::new("child", &self.log)));
            }
            Ok(())
        }

        fn draw(&mut self, surface: &mut dyn Surface, interpolation: f64) -> Result<()> {
            self.log.borrow_mut().push(format!("draw:{}", self.name));
            self.body.draw(surface, interpolation)
        }

        fn remove(&mut self, surface: &mut dyn Surface) -> Result<()> {
            self.log.borrow_mut().push(format!("remove:{}", self.name));
            self.body.detach(surface)
        }
    }

    /// Game hooks that listen for button presses and add one recorder.
    struct Script {
        log: Log,
        runs: u32,
        fail_run: bool,
    }

    impl GameHooks for Script {
        fn run(&mut self, scene: &mut Scene<'_>) -> Result<()> {
            self.runs += 1;
            scene.add_event_listener(EventKind::ButtonPress);
            scene.add_entity(Box::new(Recorder::new("a", &self.log)))?;
            if self.fail_run {
                return Err(Error::hook("setup interrupted"));
            }
            Ok(())
        }

        fn update(&mut self, _scene: &mut Scene<'_>, events: &[Event]) -> Result<()> {
            self.log.borrow_mut().push(format!("update:game:{}", events.len()));
            Ok(())
        }

        fn draw(&mut self, _surface: &mut dyn Surface, _interpolation: f64) -> Result<()> {
            self.log.borrow_mut().push("draw:game".to_string());
            Ok(())
        }
    }

    type TestGame = Game<MemorySurface, Script, ManualClock>;

    fn game(tps: f64, fps: f64, frameskip: u32) -> (TestGame, ManualClock, Log) {
        let clock = ManualClock::new(0.0);
        let log: Log = Rc::default();
        let hooks = Script {
            log: Rc::clone(&log),
            runs: 0,
            fail_run: false,
        };
        let config = LoopConfig::new(tps, fps, frameskip);
        let game = Game::with_clock(MemorySurface::new(200.0, 100.0), hooks, config, clock.clone())
            .unwrap();
        (game, clock, log)
    }

    fn press(x: f64, y: f64) -> Event {
        Event::ButtonPress(Pointer::at(x, y, Some(MouseButton::Left)))
    }

    #[test]
    fn test_rejects_bad_config_at_construction() {
        let log: Log = Rc::default();
        let hooks = Script {
            log,
            runs: 0,
            fail_run: false,
        };
        let result = Game::with_clock(
            MemorySurface::default(),
            hooks,
            LoopConfig::new(20.0, 60.0, 0),
            ManualClock::new(0.0),
        );
        assert!(matches!(result, Err(Error::InvalidFrameskip(0))));
    }

    #[test]
    fn test_start_runs_setup_and_first_pass() {
        let (mut game, _clock, log) = game(20.0, 60.0, 5);
        let report = game.start().unwrap();

        assert!(game.is_running());
        assert_eq!(game.hooks().runs, 1);
        assert_eq!(game.entity_count(), 1);
        assert!(game.is_listening(EventKind::ButtonPress));
        // Clock has not moved past either deadline.
        assert_eq!(report.updates, 0);
        assert!(!report.drew());
        assert_eq!(report.delay, Some(timing::MIN_DELAY));
        assert_eq!(*log.borrow(), vec!["add:a"]);
    }

    #[test]
    fn test_frameskip_caps_catch_up() {
        let (mut game, clock, _log) = game(20.0, 60.0, 5);
        game.start().unwrap();

        clock.set(0.3);
        let report = game.step().unwrap();

        assert_eq!(report.updates, 5);
        assert!((game.next_update_deadline() - 0.25).abs() < 1e-9);
        let interpolation = report.interpolation.unwrap();
        assert!((interpolation - 2.0).abs() < 1e-9);
        assert_eq!(game.frames(), 1);
        assert!(game.next_draw_deadline() > 0.3);
        // Still behind, so the next pass is requested as soon as possible.
        assert_eq!(report.delay, Some(timing::MIN_DELAY));
    }

    #[test]
    fn test_updates_per_pass_is_min_of_debt_and_frameskip() {
        for n in 0..=8u32 {
            let (mut game, clock, _log) = game(4.0, 1.0, 5);
            game.start().unwrap();

            clock.set(f64::from(n) * 0.25);
            let report = game.step().unwrap();

            let expected = n.min(5);
            assert_eq!(report.updates, expected, "debt of {n} ticks");
            assert_eq!(game.next_update_deadline(), f64::from(expected) * 0.25);
        }
    }

    #[test]
    fn test_repeated_passes_advance_by_exact_ticks() {
        let (mut game, clock, _log) = game(4.0, 1.0, 5);
        game.start().unwrap();

        for pass in 1..=4u32 {
            clock.advance(2.0 * 0.25);
            let report = game.step().unwrap();
            assert_eq!(report.updates, 2);
            assert_eq!(game.next_update_deadline(), f64::from(pass) * 0.5);
        }
        assert_eq!(game.ticks(), 8);
    }

    #[test]
    fn test_interpolation_range() {
        let (mut game, clock, _log) = game(4.0, 2048.0, 5);
        game.start().unwrap();

        // Exactly on a tick boundary: that tick has not run yet.
        clock.set(0.75);
        let at_boundary = game.step().unwrap();
        assert_eq!(at_boundary.interpolation, Some(1.0));

        // Just past it: the tick runs and interpolation restarts near zero.
        clock.set(0.75 + 1.0 / 1024.0);
        let after = game.step().unwrap();
        assert_eq!(after.updates, 1);
        let value = after.interpolation.unwrap();
        assert!(value > 0.0 && value < 0.01);
    }

    #[test]
    fn test_draws_once_per_pass() {
        let (mut game, clock, log) = game(4.0, 64.0, 5);
        game.start().unwrap();
        log.borrow_mut().clear();

        clock.set(1.0);
        let report = game.step().unwrap();
        assert!(report.drew());
        let draws = log.borrow().iter().filter(|l| *l == "draw:game").count();
        assert_eq!(draws, 1);
        assert_eq!(game.surface().frames(), 1);
        assert!(game.next_draw_deadline() > 1.0);
    }

    #[test]
    fn test_entity_drawn_at_interpolated_position() {
        let (mut game, clock, _log) = game(4.0, 64.0, 5);
        game.start().unwrap();
        let shape = game.surface().shape(crate::surface::ShapeId::new(2)).cloned();
        assert!(shape.is_some());

        clock.set(0.75);
        game.step().unwrap();
        // Recorder starts at (10, 10) moving (5, 5); it does not move itself,
        // so the drawn position is pure extrapolation.
        let coords = game.surface().coords(crate::surface::ShapeId::new(2));
        assert_eq!(coords, Some(Coords::point(15.0, 15.0)));
    }

    #[test]
    fn test_hooks_run_in_order() {
        let (mut game, clock, log) = game(4.0, 64.0, 5);
        game.start().unwrap();
        game.add_entity(Box::new(Recorder::new("b", &log))).unwrap();
        log.borrow_mut().clear();

        clock.set(0.25);
        game.step().unwrap();
        assert_eq!(
            *log.borrow(),
            vec![
                "update:game:0",
                "update:a:0",
                "update:b:0",
                "draw:game",
                "draw:a",
                "draw:b",
            ]
        );
    }

    #[test]
    fn test_events_delivered_once_then_drained() {
        let (mut game, clock, log) = game(4.0, 1.0, 5);
        game.start().unwrap();
        log.borrow_mut().clear();

        assert!(game.handle_event(press(1.0, 1.0)));
        assert!(game.handle_event(press(2.0, 2.0)));
        assert!(game.handle_event(press(3.0, 3.0)));
        assert_eq!(game.pending_events().len(), 3);

        clock.set(0.5);
        game.step().unwrap();

        assert!(game.pending_events().is_empty());
        let log = log.borrow();
        assert_eq!(log[0], "update:game:3");
        assert_eq!(log[1], "update:a:3");
        assert_eq!(log[2], "update:game:0");
        assert_eq!(log[3], "update:a:0");
    }

    #[test]
    fn test_unbound_or_idle_events_dropped() {
        let (mut game, _clock, _log) = game(4.0, 1.0, 5);
        assert!(!game.handle_event(press(1.0, 1.0)));

        game.start().unwrap();
        assert!(!game.handle_event(Event::FocusIn));
        assert!(game.handle_event(press(1.0, 1.0)));

        game.pause();
        assert!(!game.handle_event(press(1.0, 1.0)));
        assert_eq!(game.pending_events().len(), 1);
    }

    #[test]
    fn test_pause_halts_chain_and_keeps_world() {
        let (mut game, clock, _log) = game(4.0, 1.0, 5);
        game.start().unwrap();
        let scheduled = game.surface().scheduled().len();

        game.pause();
        clock.set(1.0);
        let report = game.step().unwrap();

        assert!(report.is_halted());
        assert_eq!(report.updates, 0);
        assert_eq!(game.surface().scheduled().len(), scheduled);
        assert_eq!(game.state(), LoopState::Paused);
        assert_eq!(game.entity_count(), 1);
        assert_eq!(game.listener_count(), 1);
    }

    #[test]
    fn test_resume_resets_deadlines_without_setup() {
        let (mut game, clock, _log) = game(4.0, 1.0, 5);
        game.start().unwrap();
        game.pause();

        clock.set(10.0);
        game.start().unwrap();

        assert_eq!(game.hooks().runs, 1);
        assert_eq!(game.entity_count(), 1);
        assert_eq!(game.next_update_deadline(), 10.0);
        assert_eq!(game.ticks(), 0);
    }

    #[test]
    fn test_start_while_running_fails() {
        let (mut game, _clock, _log) = game(4.0, 1.0, 5);
        game.start().unwrap();
        assert!(matches!(game.start(), Err(Error::AlreadyRunning)));
    }

    #[test]
    fn test_stop_releases_everything_and_is_idempotent() {
        let (mut game, _clock, log) = game(4.0, 1.0, 5);
        game.start().unwrap();
        game.handle_event(press(1.0, 1.0));

        for _ in 0..2 {
            game.stop().unwrap();
            assert_eq!(game.state(), LoopState::Stopped);
            assert_eq!(game.entity_count(), 0);
            assert_eq!(game.listener_count(), 0);
            assert!(game.pending_events().is_empty());
            assert_eq!(game.surface().shape_count(), 0);
            assert_eq!(game.surface().binding_count(), 0);
        }
        assert_eq!(log.borrow().iter().filter(|l| *l == "remove:a").count(), 1);
    }

    #[test]
    fn test_restart_after_stop_runs_setup_again() {
        let (mut game, _clock, _log) = game(4.0, 1.0, 5);
        game.start().unwrap();
        game.stop().unwrap();
        game.start().unwrap();
        assert_eq!(game.hooks().runs, 2);
        assert_eq!(game.entity_count(), 1);
    }

    #[test]
    fn test_update_fault_halts_chain() {
        let (mut game, clock, log) = game(4.0, 1.0, 5);
        game.start().unwrap();
        let mut bad = Recorder::new("bad", &log);
        bad.fail_update = true;
        game.add_entity(Box::new(bad)).unwrap();
        let scheduled = game.surface().scheduled().len();

        clock.set(1.0);
        let err = game.step();

        assert!(matches!(err, Err(Error::Hook(_))));
        assert_eq!(game.state(), LoopState::Paused);
        assert_eq!(game.surface().scheduled().len(), scheduled);
        assert!(game.step().unwrap().is_halted());
    }

    #[test]
    fn test_remove_unknown_entity_fails() {
        let (mut game, _clock, _log) = game(4.0, 1.0, 5);
        game.start().unwrap();
        let ids = game.entity_ids();
        game.remove_entity(ids[0]).unwrap();
        assert!(matches!(game.remove_entity(ids[0]), Err(Error::EntityNotFound(_))));
    }

    #[test]
    fn test_remove_unknown_listener_fails() {
        let (mut game, _clock, _log) = game(4.0, 1.0, 5);
        assert!(matches!(
            game.remove_event_listener(EventKind::Key),
            Err(Error::ListenerNotFound(EventKind::Key))
        ));
    }

    #[test]
    fn test_removing_listener_drops_its_buffered_events() {
        let (mut game, clock, log) = game(4.0, 1.0, 5);
        game.start().unwrap();
        game.add_event_listener(EventKind::Key);
        log.borrow_mut().clear();

        assert!(game.handle_event(press(1.0, 1.0)));
        assert!(game.handle_event(Event::key(crate::game::KeyCode::Char('a'))));
        assert!(game.handle_event(press(2.0, 2.0)));
        game.remove_event_listener(EventKind::ButtonPress).unwrap();

        assert_eq!(game.pending_events().len(), 1);
        assert_eq!(game.pending_events()[0].kind(), EventKind::Key);

        game.remove_event_listener(EventKind::Key).unwrap();
        clock.set(0.25);
        game.step().unwrap();
        assert_eq!(log.borrow()[0], "update:game:0");
    }

    #[test]
    fn test_failed_setup_leaves_loop_stopped() {
        let (mut game, _clock, log) = game(4.0, 1.0, 5);
        game.hooks_mut().fail_run = true;

        assert!(matches!(game.start(), Err(Error::Hook(_))));
        assert_eq!(game.state(), LoopState::Stopped);
        assert_eq!(game.entity_count(), 0);
        assert_eq!(game.listener_count(), 0);
        assert_eq!(game.surface().shape_count(), 0);
        assert_eq!(game.surface().binding_count(), 0);
        assert_eq!(*log.borrow(), vec!["add:a", "remove:a"]);

        game.hooks_mut().fail_run = false;
        game.start().unwrap();
        assert_eq!(game.hooks().runs, 2);
        assert_eq!(game.entity_count(), 1);
        assert!(game.is_listening(EventKind::ButtonPress));
    }

    #[test]
    fn test_draw_deadline_on_clock_does_not_redraw() {
        let (mut game, clock, _log) = game(20.0, 60.0, 5);
        game.start().unwrap();

        clock.set(0.3);
        assert!(game.step().unwrap().drew());
        assert!(game.next_draw_deadline() > 0.3);

        let again = game.step().unwrap();
        assert!(!again.drew());
        assert_eq!(game.frames(), 1);
    }

    #[test]
    fn test_spawn_from_update_joins_after_pass() {
        let (mut game, clock, log) = game(4.0, 1.0, 5);
        game.start().unwrap();
        let mut parent = Recorder::new("parent", &log);
        parent.spawn_once = true;
        game.add_entity(Box::new(parent)).unwrap();
        log.borrow_mut().clear();

        clock.set(0.25);
        game.step().unwrap();
        assert_eq!(game.entity_count(), 3);
        assert!(!log.borrow().iter().any(|l| l.starts_with("update:child")));

        clock.set(0.5);
        game.step().unwrap();
        assert!(log.borrow().iter().any(|l| l == "update:child:0"));
    }

    #[test]
    fn test_delay_tracks_nearest_deadline() {
        let (mut game, clock, _log) = game(4.0, 2.0, 5);
        game.start().unwrap();

        clock.set(0.125);
        let report = game.step().unwrap();
        // next_update = 0.25, next_draw = 0.5
        assert_eq!(report.delay, Some(Duration::from_millis(125)));
    }

    #[test]
    fn test_exact_quantization_keeps_fraction() {
        let clock = ManualClock::new(0.0);
        let hooks = Script {
            log: Rc::default(),
            runs: 0,
            fail_run: false,
        };
        let config = LoopConfig::new(4.0, 2.0, 5).with_quantization(DelayQuantization::Exact);
        let mut game = Game::with_clock(MemorySurface::default(), hooks, config, clock.clone())
            .unwrap();
        game.start().unwrap();

        clock.set(0.1005);
        let delay = game.step().unwrap().delay.unwrap();
        assert!(delay > Duration::from_millis(149));
        assert!(delay < Duration::from_millis(150));
    }
}
