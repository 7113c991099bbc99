//! Tappable landmark marker placed on the map surface.
//!
//! Markers live in the map's local space, so zooming the map would zoom them
//! too. Each marker counter-scales against the map to keep a constant size on
//! screen, and is drawn slightly smaller while resting than while pressed.

use crate::animation::{EasingFunction, Tween};
use crate::core::{
    bounds::Bounds,
    config::GuideConfig,
    geo::{Point, Size},
};
use crate::input::{EventHandled, Touch, TouchResponder};
use crate::landmarks::registry::MapPlacement;
use crate::ui::button::Pressable;

/// Scale of the landmark thumbnail relative to the marker.
pub const THUMBNAIL_SCALE: f64 = 0.375;

#[derive(Debug)]
pub struct LandmarkMarker {
    index: usize,
    name: String,
    thumbnail: String,
    position: Point,
    base_size: Size,
    reference_scale: f64,
    resting_multiplier: f64,
    pressed_multiplier: f64,
    ease_rate: f64,
    parent_scale: f64,
    scale: f64,
    scale_tween: Option<Tween<f64>>,
    z_order: i32,
    button: Pressable,
}

impl LandmarkMarker {
    /// Creates the marker for registry entry `index` on a surface of `surface` size.
    pub fn new(index: usize, placement: &MapPlacement, surface: Size, config: &GuideConfig) -> Self {
        Self {
            index,
            name: placement.landmark.name.clone(),
            thumbnail: placement.landmark.image.clone(),
            position: placement.local_position(surface),
            base_size: config.markers.size,
            reference_scale: config.screen_scale(),
            resting_multiplier: config.markers.resting_multiplier,
            pressed_multiplier: config.markers.pressed_multiplier,
            ease_rate: config.interaction.ease_rate,
            parent_scale: 1.0,
            scale: 1.0,
            scale_tween: None,
            z_order: 0,
            button: Pressable::new().with_touch_move_allowed(false),
        }
    }

    /// Callback fired when a tap on the marker completes.
    pub fn on_release(mut self, callback: impl FnMut() + Send + 'static) -> Self {
        self.button.set_on_release(callback);
        self
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn thumbnail(&self) -> &str {
        &self.thumbnail
    }

    /// Position in map-local units.
    pub fn position(&self) -> Point {
        self.position
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn base_size(&self) -> Size {
        self.base_size
    }

    pub fn z_order(&self) -> i32 {
        self.z_order
    }

    pub fn is_pressed(&self) -> bool {
        self.button.is_pressed()
    }

    pub fn is_animating(&self) -> bool {
        self.scale_tween.is_some()
    }

    /// Marker bounds in map-local units.
    pub fn local_bounds(&self) -> Bounds {
        Bounds::from_center_and_size(self.position, self.base_size.scaled(self.scale))
    }

    /// Scale that keeps the marker at its reference size under a parent at `parent_scale`.
    pub fn counter_scale(&self, parent_scale: f64) -> f64 {
        let counter = if parent_scale != 0.0 {
            self.reference_scale / parent_scale
        } else {
            0.0
        };
        let multiplier = if self.is_pressed() {
            self.pressed_multiplier
        } else {
            self.resting_multiplier
        };
        counter * multiplier
    }

    /// Counteracts the parent's scale.
    ///
    /// With a `future_scale` the marker aims for the size it needs once the
    /// parent reaches that scale. A zero `duration` applies the scale at once;
    /// otherwise it eases there, replacing any scale animation in progress.
    pub fn maintain_scale(&mut self, parent_scale: f64, duration: f64, future_scale: Option<f64>) {
        self.parent_scale = future_scale.unwrap_or(parent_scale);
        let target = self.counter_scale(self.parent_scale);

        if duration <= 0.0 {
            self.scale_tween = None;
            self.scale = target;
        } else {
            self.scale_tween = Some(Tween::with_easing(
                self.scale,
                target,
                duration,
                EasingFunction::EaseOut {
                    rate: self.ease_rate,
                },
            ));
        }
    }

    pub fn update(&mut self, dt: f64) {
        if let Some(tween) = self.scale_tween.as_mut() {
            self.scale = tween.tick(dt);
            if tween.is_finished() {
                self.scale_tween = None;
            }
        }
    }

    /// Re-applies the press multiplier. A running scale animation keeps its
    /// remaining time and is redirected to the new target.
    fn refresh(&mut self) {
        let target = self.counter_scale(self.parent_scale);
        match self.scale_tween.as_ref() {
            Some(tween) if !tween.is_finished() => {
                let remaining = tween.duration * (1.0 - tween.progress());
                let easing = tween.easing;
                self.scale_tween = Some(Tween::with_easing(self.scale, target, remaining, easing));
            }
            _ => {
                self.scale_tween = None;
                self.scale = target;
            }
        }
    }
}

/// Touch locations are expected in map-local units.
impl TouchResponder for LandmarkMarker {
    fn handles_touch_at(&self, point: Point) -> bool {
        self.local_bounds().contains(&point)
    }

    fn on_began(&mut self, touch: &Touch) -> EventHandled {
        let inside = self.handles_touch_at(touch.location);
        let handled = self.button.began(touch.id, inside);
        if handled.is_handled() {
            log::trace!("marker {} pressed", self.name);
            self.z_order = 1;
            self.refresh();
        }
        handled
    }

    fn on_moved(&mut self, touch: &Touch) {
        let was_pressed = self.is_pressed();
        let inside = self.handles_touch_at(touch.location);
        self.button.moved(touch.id, inside);
        if was_pressed != self.is_pressed() {
            self.refresh();
        }
    }

    fn on_ended(&mut self, touch: &Touch) {
        if !self.button.is_tracking() {
            return;
        }
        let inside = self.handles_touch_at(touch.location);
        if self.button.ended(touch.id, inside) {
            log::debug!("marker {} released", self.name);
        }
        self.z_order = 0;
        self.refresh();
    }

    fn on_cancelled(&mut self, touch: &Touch) {
        if !self.button.is_tracking() {
            return;
        }
        self.button.cancelled(touch.id);
        self.z_order = 0;
        self.refresh();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::landmarks::registry::Landmark;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn marker() -> LandmarkMarker {
        let config = GuideConfig::default();
        let placement = MapPlacement::new(Landmark::new("Pier", "pier.png", ""), Point::new(0.5, 0.25));
        LandmarkMarker::new(0, &placement, Size::new(1000.0, 2000.0), &config)
    }

    #[test]
    fn test_counter_scale() {
        let mut m = marker();
        assert_eq!(m.position(), Point::new(500.0, 500.0));

        m.maintain_scale(2.0, 0.0, None);
        assert_eq!(m.scale(), 0.5 * 0.75);

        m.maintain_scale(0.0, 0.0, None);
        assert_eq!(m.scale(), 0.0);
    }

    #[test]
    fn test_future_scale_is_eased_towards() {
        let mut m = marker();
        m.maintain_scale(1.0, 0.0, None);
        m.maintain_scale(1.0, 0.2, Some(4.0));
        assert!(m.is_animating());
        assert_eq!(m.scale(), 0.75);

        m.update(0.1);
        assert!(m.scale() < 0.75 && m.scale() > 0.25 * 0.75);
        m.update(0.1);
        assert!(!m.is_animating());
        assert_eq!(m.scale(), 0.25 * 0.75);
    }

    #[test]
    fn test_press_feedback() {
        let mut m = marker();
        m.maintain_scale(1.0, 0.0, None);
        assert!(m.on_began(&Touch::at(1, 500.0, 500.0)).is_handled());
        assert!(m.is_pressed());
        assert_eq!(m.z_order(), 1);
        assert_eq!(m.scale(), 1.0);

        m.on_ended(&Touch::at(1, 500.0, 500.0));
        assert_eq!(m.z_order(), 0);
        assert_eq!(m.scale(), 0.75);
    }

    #[test]
    fn test_press_during_scale_animation_keeps_easing() {
        let mut m = marker();
        m.maintain_scale(1.0, 0.0, None);
        m.maintain_scale(1.0, 0.2, Some(4.0));
        m.update(0.05);
        let before = m.scale();

        assert!(m.on_began(&Touch::at(1, 500.0, 500.0)).is_handled());
        assert!(m.is_animating());
        assert_eq!(m.scale(), before);

        m.update(0.1);
        assert!(m.is_animating());
        m.update(0.1);
        assert!(!m.is_animating());
        assert!((m.scale() - 0.25).abs() < 1e-9);
    }

    #[test]
    fn test_tap_releases_but_drag_does_not() {
        let releases = Arc::new(AtomicUsize::new(0));
        let counter = releases.clone();
        let mut m = marker().on_release(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        m.maintain_scale(1.0, 0.0, None);

        m.on_began(&Touch::at(1, 510.0, 490.0));
        m.on_ended(&Touch::at(1, 510.0, 490.0));
        assert_eq!(releases.load(Ordering::SeqCst), 1);

        // Dragging the map over a marker never opens it
        m.on_began(&Touch::at(2, 500.0, 500.0));
        m.on_moved(&Touch::at(2, 501.0, 500.0));
        assert!(!m.is_pressed());
        m.on_ended(&Touch::at(2, 501.0, 500.0));
        assert_eq!(releases.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_touch_outside_is_ignored() {
        let mut m = marker();
        m.maintain_scale(1.0, 0.0, None);
        // 160 * 0.75 = 120 wide, so 61 units away is outside
        assert!(!m.on_began(&Touch::at(1, 561.0, 500.0)).is_handled());
        assert_eq!(m.z_order(), 0);
    }
}
