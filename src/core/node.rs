//! Placement of a node inside its parent space.
//!
//! A node has an unscaled content size, a normalized anchor point inside that
//! content, a scale applied around the anchor, and a position that says where
//! the anchor lands in the parent. This is the same model the map surface,
//! markers and popup items use.

use crate::core::{
    bounds::Bounds,
    geo::{Point, Size},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NodeTransform {
    pub position: Point,
    pub scale: f64,
    pub anchor: Point,
    pub content_size: Size,
}

impl NodeTransform {
    /// A transform with unit scale and a centered anchor.
    pub fn new(content_size: Size) -> Self {
        Self {
            position: Point::ZERO,
            scale: 1.0,
            anchor: Point::new(0.5, 0.5),
            content_size,
        }
    }

    /// The anchor expressed in local (unscaled) coordinates.
    pub fn anchor_in_points(&self) -> Point {
        self.anchor.scale_by(&self.content_size)
    }

    /// Maps a point from the node's local space to its parent space.
    pub fn to_parent(&self, local: Point) -> Point {
        self.position
            .add(&local.subtract(&self.anchor_in_points()).multiply(self.scale))
    }

    /// Maps a point from the parent space into the node's local space.
    ///
    /// A zero scale collapses the node onto its anchor.
    pub fn to_local(&self, parent: Point) -> Point {
        if self.scale == 0.0 {
            return self.anchor_in_points();
        }
        parent
            .subtract(&self.position)
            .multiply(1.0 / self.scale)
            .add(&self.anchor_in_points())
    }

    /// Normalized anchor (0..1 in each axis) for a point given in parent space.
    pub fn anchor_for(&self, parent: Point) -> Point {
        let local = self.to_local(parent);
        let width = if self.content_size.width == 0.0 {
            1.0
        } else {
            self.content_size.width
        };
        let height = if self.content_size.height == 0.0 {
            1.0
        } else {
            self.content_size.height
        };
        Point::new(local.x / width, local.y / height)
    }

    /// Moves the pivot without visually moving the node.
    pub fn set_anchor_preserving_placement(&mut self, anchor: Point) {
        let scaled = self.content_size.scaled(self.scale);
        let shift = anchor.subtract(&self.anchor).scale_by(&scaled);
        self.anchor = anchor;
        self.position = self.position.add(&shift);
    }

    /// Bounds of the node in parent space at its current scale.
    pub fn frame(&self) -> Bounds {
        self.frame_at(self.position, self.scale)
    }

    /// Bounds the node would have at another position and scale (anchor unchanged).
    pub fn frame_at(&self, position: Point, scale: f64) -> Bounds {
        let scaled = self.content_size.scaled(scale);
        let origin = position.subtract(&self.anchor.scale_by(&scaled));
        Bounds::from_origin_and_size(origin, scaled)
    }
}

impl Default for NodeTransform {
    fn default() -> Self {
        Self::new(Size::ZERO)
    }
}
