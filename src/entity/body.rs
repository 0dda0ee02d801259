//! Position, velocity and size of a drawable entity.

use crate::error::Result;
use crate::surface::{Coords, ShapeId, Surface};

/// Kinematic state shared by most entities.
///
/// Velocity is in surface units per tick. A body with zero width and zero
/// height is drawn as a point; any other size is drawn as a bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Body {
    /// Handle of the shape on the surface, once attached.
    pub shape: Option<ShapeId>,
    /// X position.
    pub x: f64,
    /// Y position.
    pub y: f64,
    /// X velocity per tick.
    pub dx: f64,
    /// Y velocity per tick.
    pub dy: f64,
    /// Width, 0 for a point.
    pub width: f64,
    /// Height, 0 for a point.
    pub height: f64,
}

impl Body {
    /// A motionless point body at `(x, y)`.
    pub const fn at(x: f64, y: f64) -> Self {
        Self {
            shape: None,
            x,
            y,
            dx: 0.0,
            dy: 0.0,
            width: 0.0,
            height: 0.0,
        }
    }

    /// Set the velocity.
    #[must_use]
    pub const fn with_velocity(mut self, dx: f64, dy: f64) -> Self {
        self.dx = dx;
        self.dy = dy;
        self
    }

    /// Set the size.
    #[must_use]
    pub const fn with_size(mut self, width: f64, height: f64) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Whether this body is drawn as a point.
    #[inline]
    pub fn is_point(&self) -> bool {
        self.width == 0.0 && self.height == 0.0
    }

    /// Position extrapolated `interpolation` ticks along the velocity.
    #[inline]
    pub fn interpolated(&self, interpolation: f64) -> (f64, f64) {
        (
            self.x + self.dx * interpolation,
            self.y + self.dy * interpolation,
        )
    }

    /// Coordinates to draw at the given interpolation.
    pub fn coords_at(&self, interpolation: f64) -> Coords {
        let (x, y) = self.interpolated(interpolation);
        if self.is_point() {
            Coords::point(x, y)
        } else {
            Coords::rect(x, y, x + self.width, y + self.height)
        }
    }

    /// Advance one tick.
    #[inline]
    pub fn step(&mut self) {
        self.x += self.dx;
        self.y += self.dy;
    }

    /// Create a plain shape for this body on `surface`.
    pub fn attach(&mut self, surface: &mut dyn Surface) -> ShapeId {
        let id = surface.create_shape(self.coords_at(0.0));
        self.shape = Some(id);
        id
    }

    /// Create a text shape for this body on `surface`.
    pub fn attach_text(&mut self, surface: &mut dyn Surface, text: &str) -> ShapeId {
        let id = surface.create_text(self.coords_at(0.0), text);
        self.shape = Some(id);
        id
    }

    /// Write the interpolated coordinates to the attached shape.
    ///
    /// A body that was never attached has nothing to draw and is skipped.
    pub fn draw(&self, surface: &mut dyn Surface, interpolation: f64) -> Result<()> {
        match self.shape {
            Some(id) => surface.set_coords(id, self.coords_at(interpolation)),
            None => Ok(()),
        }
    }

    /// Delete the attached shape, if any.
    pub fn detach(&mut self, surface: &mut dyn Surface) -> Result<()> {
        match self.shape.take() {
            Some(id) => surface.delete_shape(id),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::MemorySurface;

    #[test]
    fn test_point_body_draws_pair() {
        let mut surface = MemorySurface::default();
        let mut body = Body::at(10.0, 10.0).with_velocity(5.0, 5.0);
        let id = body.attach(&mut surface);

        body.draw(&mut surface, 1.0).unwrap();
        let coords = surface.coords(id).unwrap();
        assert_eq!(coords, Coords::point(15.0, 15.0));
        assert_eq!(coords.len(), 2);
    }

    #[test]
    fn test_sized_body_draws_box() {
        let mut surface = MemorySurface::default();
        let mut body = Body::at(2.0, 3.0).with_velocity(1.0, 0.0).with_size(4.0, 2.0);
        let id = body.attach(&mut surface);

        body.draw(&mut surface, 0.5).unwrap();
        assert_eq!(surface.coords(id), Some(Coords::rect(2.5, 3.0, 6.5, 5.0)));
    }

    #[test]
    fn test_zero_interpolation_is_current_position() {
        let body = Body::at(1.0, 2.0).with_velocity(9.0, 9.0);
        assert_eq!(body.interpolated(0.0), (1.0, 2.0));
    }

    #[test]
    fn test_detach_releases_shape() {
        let mut surface = MemorySurface::default();
        let mut body = Body::at(0.0, 0.0);
        body.attach(&mut surface);
        body.detach(&mut surface).unwrap();
        assert_eq!(surface.shape_count(), 0);
        assert!(body.shape.is_none());
        assert!(body.detach(&mut surface).is_ok());
    }

    #[test]
    fn test_unattached_draw_is_noop() {
        let mut surface = MemorySurface::default();
        assert!(Body::at(0.0, 0.0).draw(&mut surface, 1.0).is_ok());
    }
}
