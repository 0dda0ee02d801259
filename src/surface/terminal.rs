//! Terminal surface: a character-cell canvas on the real terminal.
//!
//! One surface unit is one terminal cell. Shapes live in a map ordered by
//! handle (creation order = stacking order) and are composited into a
//! [`Raster`] on every `present`; only the difference from the previous
//! frame reaches the terminal, in a single write.

use super::raster::{Raster, FILL_GLYPH, POINT_GLYPH};
use super::{Coords, HostSurface, ShapeId, SubscriptionId, Surface, WakeSlot};
use crate::error::{Error, Result};
use crate::game::EventKind;
use crossterm::{
    cursor,
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
};
use std::collections::BTreeMap;
use std::io::{self, Stdout, Write};
use std::time::{Duration, Instant};
use tracing::debug;

/// Configuration for the terminal session.
#[derive(Debug, Clone)]
pub struct TerminalConfig {
    /// Whether to enable mouse capture (needed for pointer events).
    pub enable_mouse: bool,
    /// Whether to use the alternate screen buffer.
    pub alternate_screen: bool,
}

impl Default for TerminalConfig {
    fn default() -> Self {
        Self {
            enable_mouse: true,
            alternate_screen: true,
        }
    }
}

#[derive(Debug, Clone)]
struct TerminalShape {
    coords: Coords,
    text: Option<String>,
}

/// A [`Surface`] drawing into the terminal.
pub struct TerminalSurface {
    config: TerminalConfig,
    stdout: Stdout,
    shapes: BTreeMap<ShapeId, TerminalShape>,
    bindings: BTreeMap<SubscriptionId, EventKind>,
    next_handle: u64,
    /// Frame being composed.
    next: Raster,
    /// Frame currently on screen.
    current: Raster,
    needs_full_redraw: bool,
    output: Vec<u8>,
    wake: WakeSlot,
}

impl TerminalSurface {
    /// Take over the terminal with the default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if terminal setup fails (raw mode, alternate screen, etc.).
    pub fn new() -> Result<Self> {
        Self::with_config(TerminalConfig::default())
    }

    /// Take over the terminal with a custom configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if terminal setup fails.
    pub fn with_config(config: TerminalConfig) -> Result<Self> {
        let (width, height) = terminal::size()?;

        terminal::enable_raw_mode()?;

        let mut stdout = io::stdout();
        if config.alternate_screen {
            execute!(stdout, EnterAlternateScreen)?;
        }
        if config.enable_mouse {
            execute!(stdout, EnableMouseCapture)?;
        }
        execute!(stdout, cursor::Hide)?;
        debug!(width, height, "terminal surface ready");

        Ok(Self {
            config,
            stdout,
            shapes: BTreeMap::new(),
            bindings: BTreeMap::new(),
            next_handle: 1,
            next: Raster::new(width, height),
            current: Raster::new(width, height),
            needs_full_redraw: true,
            output: Vec::with_capacity(16 * 1024),
            wake: WakeSlot::new(),
        })
    }

    /// Whether any binding exists for `kind`.
    pub fn is_bound(&self, kind: EventKind) -> bool {
        self.bindings.values().any(|&k| k == kind)
    }

    fn next_handle(&mut self) -> u64 {
        let handle = self.next_handle;
        self.next_handle += 1;
        handle
    }

    fn insert(&mut self, coords: Coords, text: Option<String>) -> ShapeId {
        let id = ShapeId::new(self.next_handle());
        self.shapes.insert(id, TerminalShape { coords, text });
        id
    }

    fn compose(&mut self) {
        self.next.clear();
        for shape in self.shapes.values() {
            rasterize(&mut self.next, shape.coords, shape.text.as_deref());
        }
    }
}

/// Draw one shape into `raster`. Coordinates round to the nearest cell.
fn rasterize(raster: &mut Raster, coords: Coords, text: Option<&str>) {
    #[allow(clippy::cast_possible_truncation)]
    let cell = |v: f64| v.round() as i64;
    match (coords, text) {
        (Coords::Point { x, y }, Some(text)) => {
            raster.draw_text(cell(x), cell(y), text);
        }
        (Coords::Point { x, y }, None) => raster.put(cell(x), cell(y), POINT_GLYPH),
        (Coords::Rect { x0, y0, x1, y1 }, Some(text)) => {
            raster.fill_rect(cell(x0), cell(y0), cell(x1), cell(y1), FILL_GLYPH);
            raster.draw_text(cell(x0), cell(y0), text);
        }
        (Coords::Rect { x0, y0, x1, y1 }, None) => {
            raster.fill_rect(cell(x0), cell(y0), cell(x1), cell(y1), FILL_GLYPH);
        }
    }
}

impl Surface for TerminalSurface {
    fn width(&self) -> f64 {
        f64::from(self.next.width())
    }

    fn height(&self) -> f64 {
        f64::from(self.next.height())
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
        self.wake.arm(Instant::now(), delay);
    }

    fn present(&mut self) -> Result<()> {
        self.compose();
        self.output.clear();

        if self.needs_full_redraw {
            self.output.extend_from_slice(b"\x1b[2J");
            self.next.render_full(&mut self.output)?;
            self.needs_full_redraw = false;
        } else {
            self.next.render_diff(&self.current, &mut self.output)?;
        }

        if !self.output.is_empty() {
            self.stdout.write_all(&self.output)?;
            self.stdout.flush()?;
        }
        std::mem::swap(&mut self.current, &mut self.next);
        Ok(())
    }
}

impl HostSurface for TerminalSurface {
    fn next_wakeup(&self) -> Option<Instant> {
        self.wake.due()
    }

    fn take_due_wakeup(&mut self, now: Instant) -> bool {
        self.wake.take_due(now)
    }

    fn resize(&mut self, width: u16, height: u16) {
        debug!(width, height, "terminal resized");
        self.next.resize(width, height);
        self.current.resize(width, height);
        self.needs_full_redraw = true;
    }
}

impl Drop for TerminalSurface {
    fn drop(&mut self) {
        let _ = execute!(self.stdout, cursor::Show);
        if self.config.enable_mouse {
            let _ = execute!(self.stdout, DisableMouseCapture);
        }
        if self.config.alternate_screen {
            let _ = execute!(self.stdout, LeaveAlternateScreen);
        }
        let _ = terminal::disable_raw_mode();
    }
}
