use crate::core::geo::{Point, Size};
use serde::{Deserialize, Serialize};

/// Represents a bounding box in screen or node-local coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min: Point,
    pub max: Point,
}

impl Bounds {
    /// Creates new bounds from two points
    pub fn new(min: Point, max: Point) -> Self {
        Self { min, max }
    }

    /// Creates bounds from individual coordinates
    pub fn from_coords(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self::new(Point::new(min_x, min_y), Point::new(max_x, max_y))
    }

    /// Creates bounds from a bottom-left origin and a size
    pub fn from_origin_and_size(origin: Point, size: Size) -> Self {
        Self::new(
            origin,
            Point::new(origin.x + size.width, origin.y + size.height),
        )
    }

    /// Creates bounds from a center point and size
    pub fn from_center_and_size(center: Point, size: Size) -> Self {
        let half_width = size.width / 2.0;
        let half_height = size.height / 2.0;
        Self::new(
            Point::new(center.x - half_width, center.y - half_height),
            Point::new(center.x + half_width, center.y + half_height),
        )
    }

    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    pub fn size(&self) -> Size {
        Size::new(self.width(), self.height())
    }

    pub fn center(&self) -> Point {
        self.min.midpoint(&self.max)
    }

    /// Checks if the bounds contain a point (edges included)
    pub fn contains(&self, point: &Point) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
    }

    /// Checks if the bounds intersect with another bounds.
    /// Touching edges count as intersecting.
    pub fn intersects(&self, other: &Bounds) -> bool {
        !(other.max.x < self.min.x
            || other.min.x > self.max.x
            || other.max.y < self.min.y
            || other.min.y > self.max.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_contains() {
        let bounds = Bounds::from_coords(0.0, 0.0, 100.0, 50.0);
        assert!(bounds.contains(&Point::new(50.0, 25.0)));
        assert!(bounds.contains(&Point::new(100.0, 50.0)));
        assert!(!bounds.contains(&Point::new(101.0, 25.0)));
    }

    #[test]
    fn test_bounds_intersects() {
        let a = Bounds::from_coords(0.0, 0.0, 10.0, 10.0);
        let b = Bounds::from_coords(10.0, 5.0, 20.0, 15.0);
        let c = Bounds::from_coords(11.0, 0.0, 20.0, 10.0);
        assert!(a.intersects(&b));
        assert!(!a.intersects(&c));
    }

    #[test]
    fn test_bounds_from_center() {
        let bounds = Bounds::from_center_and_size(Point::new(5.0, 5.0), Size::new(4.0, 2.0));
        assert_eq!(bounds, Bounds::from_coords(3.0, 4.0, 7.0, 6.0));
        assert_eq!(bounds.center(), Point::new(5.0, 5.0));
        assert_eq!(bounds.size(), Size::new(4.0, 2.0));
    }
}
