use crate::core::{bounds::Bounds, geo::Size, node::NodeTransform};

/// Screen-space visibility culling for the draw pass.
///
/// Rectangles that merely touch the viewport edge still count as visible.
pub struct Culling;

impl Culling {
    /// The viewport as a rectangle anchored at the origin.
    pub fn viewport_bounds(viewport: Size) -> Bounds {
        Bounds::from_coords(0.0, 0.0, viewport.width, viewport.height)
    }

    /// Returns `true` if the supplied rectangle is at least partially inside the viewport.
    pub fn aabb_intersects(viewport: &Bounds, target: &Bounds) -> bool {
        viewport.intersects(target)
    }

    /// Maps a rectangle in a node's local space to its parent (screen) space.
    pub fn to_screen(transform: &NodeTransform, local: &Bounds) -> Bounds {
        let a = transform.to_parent(local.min);
        let b = transform.to_parent(local.max);
        Bounds::from_coords(a.x.min(b.x), a.y.min(b.y), a.x.max(b.x), a.y.max(b.y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geo::Point;

    #[test]
    fn test_touching_edge_is_visible() {
        let viewport = Culling::viewport_bounds(Size::new(100.0, 100.0));
        let edge = Bounds::from_coords(100.0, 0.0, 150.0, 50.0);
        let outside = Bounds::from_coords(100.5, 0.0, 150.0, 50.0);
        assert!(Culling::aabb_intersects(&viewport, &edge));
        assert!(!Culling::aabb_intersects(&viewport, &outside));
    }

    #[test]
    fn test_to_screen_applies_transform() {
        let mut transform = NodeTransform::new(Size::new(200.0, 200.0));
        transform.anchor = Point::ZERO;
        transform.position = Point::new(10.0, 20.0);
        transform.scale = 2.0;

        let local = Bounds::from_coords(0.0, 0.0, 50.0, 50.0);
        assert_eq!(
            Culling::to_screen(&transform, &local),
            Bounds::from_coords(10.0, 20.0, 110.0, 120.0)
        );
    }
}
