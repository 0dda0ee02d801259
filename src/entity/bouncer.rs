//! Bouncer: a text label that drifts and reflects off the surface edges.

use super::{Body, Entity, UpdateContext};
use crate::error::Result;
use crate::game::Event;
use crate::surface::Surface;

/// A text entity that moves by its velocity every tick and bounces inside
/// the surface bounds. Pointer events teleport it to the pointer.
#[derive(Debug, Clone)]
pub struct Bouncer {
    text: String,
    body: Body,
}

impl Bouncer {
    /// Create a bouncer at `(x, y)` moving `(dx, dy)` per tick.
    pub fn new(text: impl Into<String>, x: f64, y: f64, dx: f64, dy: f64) -> Self {
        Self {
            text: text.into(),
            body: Body::at(x, y).with_velocity(dx, dy),
        }
    }

    /// The label.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Current kinematic state.
    pub const fn body(&self) -> &Body {
        &self.body
    }

    fn bounce(&mut self, width: f64, height: f64) {
        let body = &mut self.body;
        if body.x < 0.0 {
            body.x = 0.0;
            body.dx = -body.dx;
        } else if body.x > width {
            body.x = width;
            body.dx = -body.dx;
        }

        if body.y < 0.0 {
            body.y = 0.0;
            body.dy = -body.dy;
        } else if body.y > height {
            body.y = height;
            body.dy = -body.dy;
        }
    }
}

impl Entity for Bouncer {
    fn add(&mut self, surface: &mut dyn Surface) -> Result<()> {
        self.body.attach_text(surface, &self.text);
        Ok(())
    }

    fn update(&mut self, events: &[Event], ctx: &mut UpdateContext<'_>) -> Result<()> {
        // Last pointer position wins.
        if let Some((x, y)) = events.iter().filter_map(Event::position).last() {
            self.body.x = x;
            self.body.y = y;
        }
        self.body.step();
        self.bounce(ctx.width(), ctx.height());
        Ok(())
    }

    fn draw(&mut self, surface: &mut dyn Surface, interpolation: f64) -> Result<()> {
        self.body.draw(surface, interpolation)
    }

    fn remove(&mut self, surface: &mut dyn Surface) -> Result<()> {
        self.body.detach(surface)
    }
}
