//! Screen to world coordinate mapping

use crate::error::ImportError;
use crate::types::{ScreenPoint, WorldPoint};
use parking_lot::RwLock;

/// Pan/zoom transform of the canvas stage
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewTransform {
    /// Horizontal translation in screen pixels
    pub tx: f64,
    /// Vertical translation in screen pixels
    pub ty: f64,
    pub scale_x: f64,
    pub scale_y: f64,
}

impl ViewTransform {
    /// Identity transform
    #[must_use]
    pub fn identity() -> Self {
        Self {
            tx: 0.0,
            ty: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
        }
    }
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self::identity()
    }
}

/// Canvas collaborator: current transform and grid snapping
pub trait Viewport: Send + Sync {
    /// Transform as of now
    fn transform(&self) -> ViewTransform;

    /// Snap a world point to the grid
    fn snap(&self, point: WorldPoint) -> WorldPoint;
}

/// Map `screen` into world space, then add `offset` to both axes.
///
/// The transform is read from the viewport on every call.
pub fn to_world(
    viewport: &dyn Viewport,
    screen: ScreenPoint,
    offset: f64,
) -> Result<WorldPoint, ImportError> {
    let t = viewport.transform();
    if !usable_scale(t.scale_x) || !usable_scale(t.scale_y) {
        return Err(ImportError::InvalidViewport(format!(
            "scale ({}, {}) cannot be inverted",
            t.scale_x, t.scale_y
        )));
    }
    Ok(WorldPoint {
        x: (screen.x - t.tx) / t.scale_x + offset,
        y: (screen.y - t.ty) / t.scale_y + offset,
    })
}

fn usable_scale(scale: f64) -> bool {
    scale.is_finite() && scale != 0.0
}

/// Viewport with a settable transform and a square grid
#[derive(Debug)]
pub struct GridViewport {
    transform: RwLock<ViewTransform>,
    grid_size: f64,
}

impl GridViewport {
    #[must_use]
    pub fn new(transform: ViewTransform, grid_size: f64) -> Self {
        Self {
            transform: RwLock::new(transform),
            grid_size,
        }
    }

    /// Pan/zoom the view
    pub fn set_transform(&self, transform: ViewTransform) {
        *self.transform.write() = transform;
    }

    #[inline]
    #[must_use]
    pub fn grid_size(&self) -> f64 {
        self.grid_size
    }
}

impl Default for GridViewport {
    fn default() -> Self {
        Self::new(ViewTransform::identity(), 100.0)
    }
}

impl Viewport for GridViewport {
    fn transform(&self) -> ViewTransform {
        *self.transform.read()
    }

    fn snap(&self, point: WorldPoint) -> WorldPoint {
        if self.grid_size <= 0.0 {
            return point;
        }
        let g = self.grid_size;
        WorldPoint {
            x: (point.x / g).round() * g,
            y: (point.y / g).round() * g,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_adds_offset() {
        let vp = GridViewport::default();
        let p = to_world(&vp, ScreenPoint::new(10.0, 20.0), 5.0).unwrap();
        assert_eq!(p, WorldPoint::new(15.0, 25.0));
    }

    #[test]
    fn translation_then_inverse_scale() {
        let vp = GridViewport::new(
            ViewTransform {
                tx: 100.0,
                ty: 50.0,
                scale_x: 2.0,
                scale_y: 0.5,
            },
            100.0,
        );
        let p = to_world(&vp, ScreenPoint::new(300.0, 150.0), 0.0).unwrap();
        assert_eq!(p, WorldPoint::new(100.0, 200.0));
    }

    #[test]
    fn zero_scale_is_invalid() {
        let vp = GridViewport::new(
            ViewTransform {
                scale_x: 0.0,
                ..ViewTransform::identity()
            },
            100.0,
        );
        let err = to_world(&vp, ScreenPoint::new(1.0, 1.0), 0.0).unwrap_err();
        assert!(matches!(err, ImportError::InvalidViewport(_)));
    }

    #[test]
    fn transform_is_requeried() {
        let vp = GridViewport::default();
        let before = to_world(&vp, ScreenPoint::new(100.0, 100.0), 0.0).unwrap();
        vp.set_transform(ViewTransform {
            scale_x: 2.0,
            scale_y: 2.0,
            ..ViewTransform::identity()
        });
        let after = to_world(&vp, ScreenPoint::new(100.0, 100.0), 0.0).unwrap();
        assert_eq!(before, WorldPoint::new(100.0, 100.0));
        assert_eq!(after, WorldPoint::new(50.0, 50.0));
    }

    #[test]
    fn snapping_rounds_to_grid() {
        let vp = GridViewport::default();
        assert_eq!(vp.snap(WorldPoint::new(149.0, 151.0)), WorldPoint::new(100.0, 200.0));

        let free = GridViewport::new(ViewTransform::identity(), 0.0);
        assert_eq!(free.snap(WorldPoint::new(149.0, 151.0)), WorldPoint::new(149.0, 151.0));
    }
}
