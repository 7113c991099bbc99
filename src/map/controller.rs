//! Gesture-driven pan/zoom for the map surface.
//!
//! Up to two touches are tracked. One touch pans; two touches pinch-zoom
//! around their midpoint while also panning with it. When the last touch
//! lifts, the surface eases back inside its scale band and fully on-screen.

use crate::animation::{EasingFunction, Tween};
use crate::core::{
    config::{BoundaryPolicy, GuideConfig, InteractionConfig},
    constants::{MAX_TRACKED_TOUCHES, MIN_PINCH_DISTANCE},
    geo::{Point, Size},
    node::NodeTransform,
};
use crate::input::{EventHandled, Touch, TouchId, TouchResponder};
use crate::landmarks::marker::LandmarkMarker;
use crate::map::limits::ScaleLimits;

/// Externally visible gesture state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureState {
    Idle,
    Panning,
    Zooming,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct TrackedTouch {
    id: TouchId,
    location: Point,
}

/// Snapshot taken when a gesture (re)starts; moves are measured against it.
#[derive(Debug, Clone, Copy, PartialEq)]
enum GestureSession {
    Idle,
    Panning {
        slot: usize,
        start_position: Point,
        start_touch: Point,
    },
    Zooming {
        start_position: Point,
        start_scale: f64,
        start_touches: [Point; 2],
    },
}

#[derive(Debug, Clone)]
struct SnapBack {
    position: Tween<Point>,
    scale: Tween<f64>,
}

/// Pan/zoom controller owning the map surface transform and its markers
#[derive(Debug)]
pub struct MapController {
    transform: NodeTransform,
    viewport: Size,
    limits: ScaleLimits,
    interaction: InteractionConfig,
    touches: [Option<TrackedTouch>; MAX_TRACKED_TOUCHES],
    session: GestureSession,
    snap: Option<SnapBack>,
    markers: Vec<LandmarkMarker>,
}

impl MapController {
    /// Creates a controller for a map surface of `content_size`, centered in
    /// the viewport at the middle of its scale band.
    pub fn new(content_size: Size, config: &GuideConfig) -> Self {
        let limits = ScaleLimits::compute(
            config.viewport,
            content_size,
            config.screen_scale(),
            &config.interaction,
        );

        let mut transform = NodeTransform::new(content_size);
        transform.position = config.viewport.center();
        transform.scale = limits.midpoint();

        log::debug!(
            "map controller for {}x{} surface, scale band [{:.3}, {:.3}]",
            content_size.width,
            content_size.height,
            limits.min,
            limits.max
        );

        Self {
            transform,
            viewport: config.viewport,
            limits,
            interaction: config.interaction.clone(),
            touches: [None; MAX_TRACKED_TOUCHES],
            session: GestureSession::Idle,
            snap: None,
            markers: Vec::new(),
        }
    }

    pub fn transform(&self) -> &NodeTransform {
        &self.transform
    }

    pub fn position(&self) -> Point {
        self.transform.position
    }

    pub fn scale(&self) -> f64 {
        self.transform.scale
    }

    pub fn anchor(&self) -> Point {
        self.transform.anchor
    }

    pub fn limits(&self) -> &ScaleLimits {
        &self.limits
    }

    pub fn viewport(&self) -> Size {
        self.viewport
    }

    pub fn state(&self) -> GestureState {
        match self.session {
            GestureSession::Idle => GestureState::Idle,
            GestureSession::Panning { .. } => GestureState::Panning,
            GestureSession::Zooming { .. } => GestureState::Zooming,
        }
    }

    pub fn tracked_touches(&self) -> usize {
        self.touches.iter().flatten().count()
    }

    pub fn is_tracking(&self, id: TouchId) -> bool {
        self.slot_of(id).is_some()
    }

    pub fn is_snapping(&self) -> bool {
        self.snap.is_some()
    }

    /// Places the surface directly, cancelling any snap-back. Markers follow.
    pub fn set_view(&mut self, position: Point, scale: f64) {
        self.snap = None;
        self.transform.position = position;
        self.transform.scale = scale;
        self.maintain_scale_of_markers(0.0, None);
    }

    /// Adds a marker and sizes it for the current zoom level.
    pub fn add_marker(&mut self, mut marker: LandmarkMarker) -> usize {
        marker.maintain_scale(self.transform.scale, 0.0, None);
        self.markers.push(marker);
        self.markers.len() - 1
    }

    pub fn markers(&self) -> &[LandmarkMarker] {
        &self.markers
    }

    pub fn markers_mut(&mut self) -> &mut [LandmarkMarker] {
        &mut self.markers
    }

    /// Maps a point on the surface (in unscaled surface units) to the screen.
    pub fn surface_to_screen(&self, local: Point) -> Point {
        self.transform.to_parent(local)
    }

    pub fn screen_to_surface(&self, screen: Point) -> Point {
        self.transform.to_local(screen)
    }

    /// Screen position of a marker, if it exists.
    pub fn marker_screen_position(&self, index: usize) -> Option<Point> {
        self.markers
            .get(index)
            .map(|marker| self.surface_to_screen(marker.position()))
    }

    /// Start tracking a touch. Returns `NotHandled` when two are already tracked.
    pub fn touch_began(&mut self, touch: &Touch) -> EventHandled {
        if self.is_tracking(touch.id) {
            return EventHandled::NotHandled;
        }
        let Some(slot) = self.touches.iter().position(Option::is_none) else {
            log::trace!("touch {} ignored: already tracking two touches", touch.id);
            return EventHandled::NotHandled;
        };
        self.touches[slot] = Some(TrackedTouch {
            id: touch.id,
            location: touch.location,
        });

        // Grabbing the map stops it where the finger is
        if self.snap.take().is_some() {
            self.maintain_scale_of_markers(0.0, None);
        }

        if self.set_up_for_panning() {
            log::trace!("touch {} began; panning", touch.id);
        } else if self.set_up_for_zooming() {
            log::trace!("touch {} began; zooming with the previous touch", touch.id);
        }

        EventHandled::Handled
    }

    pub fn touch_moved(&mut self, touch: &Touch) {
        let Some(slot) = self.slot_of(touch.id) else {
            return;
        };
        if let Some(tracked) = self.touches[slot].as_mut() {
            tracked.location = touch.location;
        }

        match self.session {
            GestureSession::Idle => {}
            GestureSession::Panning {
                slot,
                start_position,
                start_touch,
            } => {
                let Some(current) = self.location_in(slot) else {
                    return;
                };
                let position = start_position.add(&current.subtract(&start_touch));
                self.apply_gesture(position, self.transform.scale);
            }
            GestureSession::Zooming {
                start_position,
                start_scale,
                start_touches,
            } => {
                let (Some(first), Some(second)) = (self.location_in(0), self.location_in(1))
                else {
                    return;
                };

                let start_distance = start_touches[0].distance_to(&start_touches[1]);
                let factor = if start_distance < MIN_PINCH_DISTANCE {
                    1.0
                } else {
                    first.distance_to(&second) / start_distance
                };
                let scale = self.limits.clamp_hard(start_scale * factor);

                let start_midpoint = start_touches[0].midpoint(&start_touches[1]);
                let current_midpoint = first.midpoint(&second);
                let position = start_position.add(&current_midpoint.subtract(&start_midpoint));

                self.apply_gesture(position, scale);
                self.maintain_scale_of_markers(0.0, None);
            }
        }
    }

    pub fn touch_ended(&mut self, touch: &Touch) {
        let Some(slot) = self.slot_of(touch.id) else {
            return;
        };
        self.touches[slot] = None;

        if self.set_up_for_panning() {
            log::trace!("touch {} ended; remaining touch pans", touch.id);
        } else {
            log::trace!("all tracked touches ended");
            self.session = GestureSession::Idle;
            self.snap_to_limits();
        }
    }

    pub fn touch_cancelled(&mut self, touch: &Touch) {
        self.touch_ended(touch);
    }

    /// Advances the snap-back and marker animations by `dt` seconds.
    pub fn update(&mut self, dt: f64) {
        if let Some(snap) = self.snap.as_mut() {
            self.transform.position = snap.position.tick(dt);
            self.transform.scale = snap.scale.tick(dt);
            if snap.position.is_finished() && snap.scale.is_finished() {
                self.snap = None;
            }
        }
        for marker in &mut self.markers {
            marker.update(dt);
        }
    }

    /// Re-sizes every marker against the map scale, optionally animating
    /// towards the scale the map will have once `duration` has elapsed.
    pub fn maintain_scale_of_markers(&mut self, duration: f64, future_scale: Option<f64>) {
        let scale = self.transform.scale;
        for marker in &mut self.markers {
            marker.maintain_scale(scale, duration, future_scale);
        }
    }

    /// How far the surface must move to leave no viewport edge exposed,
    /// if it were at `position` with `scale`.
    pub fn out_of_bounds_correction(&self, position: Point, scale: f64) -> Point {
        let frame = self.transform.frame_at(position, scale);
        let mut correction = Point::ZERO;

        // Top edge below the top of the screen
        correction.y += (self.viewport.height - frame.max.y).max(0.0);
        // Bottom edge above the bottom of the screen
        correction.y -= frame.min.y.max(0.0);
        // Left edge right of the left side of the screen
        correction.x -= frame.min.x.max(0.0);
        // Right edge left of the right side of the screen
        correction.x += (self.viewport.width - frame.max.x).max(0.0);

        correction
    }

    fn slot_of(&self, id: TouchId) -> Option<usize> {
        self.touches
            .iter()
            .position(|t| t.map(|t| t.id) == Some(id))
    }

    fn location_in(&self, slot: usize) -> Option<Point> {
        self.touches.get(slot).copied().flatten().map(|t| t.location)
    }

    /// Records a pan session; succeeds only with exactly one tracked touch.
    fn set_up_for_panning(&mut self) -> bool {
        let tracked: Vec<usize> = (0..MAX_TRACKED_TOUCHES)
            .filter(|slot| self.touches[*slot].is_some())
            .collect();
        let [slot] = tracked[..] else {
            return false;
        };
        let Some(start_touch) = self.location_in(slot) else {
            return false;
        };

        self.session = GestureSession::Panning {
            slot,
            start_position: self.transform.position,
            start_touch,
        };
        true
    }

    /// Records a zoom session; succeeds only with two tracked touches.
    fn set_up_for_zooming(&mut self) -> bool {
        let (Some(first), Some(second)) = (self.location_in(0), self.location_in(1)) else {
            return false;
        };

        // Zoom in and out of the point between the fingers
        let anchor = self.transform.anchor_for(first.midpoint(&second));
        self.transform.set_anchor_preserving_placement(anchor);

        self.session = GestureSession::Zooming {
            start_position: self.transform.position,
            start_scale: self.transform.scale,
            start_touches: [first, second],
        };
        true
    }

    fn apply_gesture(&mut self, position: Point, scale: f64) {
        match self.interaction.boundary_policy {
            BoundaryPolicy::DeferToSnap => {
                self.transform.position = position;
                self.transform.scale = scale;
            }
            BoundaryPolicy::RubberBand => {
                let mut scale = scale;
                if scale < self.limits.min {
                    scale += (self.limits.min - scale) / 2.0;
                } else if scale > self.limits.max {
                    scale -= (scale - self.limits.max) / 2.0;
                }

                let correction = self.out_of_bounds_correction(position, scale);
                self.transform.position =
                    position.add(&correction.multiply(1.0 / self.interaction.elasticity));
                self.transform.scale = scale;
            }
        }
    }

    /// Eases the surface back into its scale band and onto the screen.
    fn snap_to_limits(&mut self) {
        let duration = self.interaction.snap_duration;
        let easing = EasingFunction::EaseOut {
            rate: self.interaction.ease_rate,
        };

        let current_scale = self.transform.scale;
        let snapped_scale = self.limits.clamp(current_scale);
        let current_position = self.transform.position;
        let snapped_position =
            current_position.add(&self.out_of_bounds_correction(current_position, snapped_scale));

        self.maintain_scale_of_markers(duration, Some(snapped_scale));

        if snapped_scale == current_scale && snapped_position == current_position {
            return;
        }

        log::debug!(
            "snapping map from scale {:.3} to {:.3}, position ({:.1}, {:.1}) to ({:.1}, {:.1})",
            current_scale,
            snapped_scale,
            current_position.x,
            current_position.y,
            snapped_position.x,
            snapped_position.y
        );

        self.snap = Some(SnapBack {
            position: Tween::with_easing(current_position, snapped_position, duration, easing),
            scale: Tween::with_easing(current_scale, snapped_scale, duration, easing),
        });
    }
}

impl TouchResponder for MapController {
    fn handles_touch_at(&self, _point: Point) -> bool {
        // The map listens to the whole screen
        true
    }

    fn on_began(&mut self, touch: &Touch) -> EventHandled {
        self.touch_began(touch)
    }

    fn on_moved(&mut self, touch: &Touch) {
        self.touch_moved(touch);
    }

    fn on_ended(&mut self, touch: &Touch) {
        self.touch_ended(touch);
    }

    fn on_cancelled(&mut self, touch: &Touch) {
        self.touch_cancelled(touch);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::landmarks::registry::{Landmark, MapPlacement};

    const EPS: f64 = 1e-9;

    fn config() -> GuideConfig {
        GuideConfig::for_viewport(Size::new(1000.0, 1000.0))
    }

    /// 2000x2000 surface in a 1000x1000 viewport: band [1.0, ~1.63]
    fn controller() -> MapController {
        MapController::new(Size::new(2000.0, 2000.0), &config())
    }

    fn controller_with_marker() -> MapController {
        let mut map = controller();
        let placement = MapPlacement::new(Landmark::new("Pier", "pier.png", ""), Point::new(0.5, 0.5));
        map.add_marker(LandmarkMarker::new(0, &placement, Size::new(2000.0, 2000.0), &config()));
        map
    }

    /// On-screen marker size relative to the reference display.
    fn marker_screen_scale(map: &MapController) -> f64 {
        map.markers()[0].scale() * map.scale()
    }

    fn resting_screen_scale() -> f64 {
        config().screen_scale() * config().markers.resting_multiplier
    }

    fn settle(map: &mut MapController) {
        for _ in 0..60 {
            map.update(1.0 / 60.0);
        }
    }

    #[test]
    fn test_initial_placement() {
        let map = controller();
        assert_eq!(map.position(), Point::new(500.0, 500.0));
        assert!((map.scale() - map.limits().midpoint()).abs() < EPS);
        assert_eq!(map.state(), GestureState::Idle);
    }

    #[test]
    fn test_third_touch_is_rejected() {
        let mut map = controller();
        assert!(map.touch_began(&Touch::at(1, 100.0, 100.0)).is_handled());
        assert!(map.touch_began(&Touch::at(2, 200.0, 200.0)).is_handled());
        assert!(!map.touch_began(&Touch::at(3, 300.0, 300.0)).is_handled());
        assert_eq!(map.tracked_touches(), 2);
        assert!(!map.is_tracking(3));
    }

    #[test]
    fn test_single_touch_pans_by_exact_delta() {
        let mut map = controller();
        let start = map.position();
        map.touch_began(&Touch::at(1, 400.0, 400.0));
        assert_eq!(map.state(), GestureState::Panning);
        map.touch_moved(&Touch::at(1, 430.0, 380.0));
        assert_eq!(map.position(), start.add(&Point::new(30.0, -20.0)));
    }

    #[test]
    fn test_pinch_scales_by_distance_ratio() {
        let mut map = controller();
        let start_scale = map.scale();
        map.touch_began(&Touch::at(1, 400.0, 500.0));
        map.touch_began(&Touch::at(2, 600.0, 500.0));
        assert_eq!(map.state(), GestureState::Zooming);

        // Distance 200 -> 240
        map.touch_moved(&Touch::at(2, 640.0, 500.0));
        assert!((map.scale() - start_scale * 1.2).abs() < EPS);
    }

    #[test]
    fn test_second_touch_reanchors_without_jump() {
        let mut map = controller();
        let before = map.transform().frame();
        map.touch_began(&Touch::at(1, 300.0, 300.0));
        map.touch_began(&Touch::at(2, 500.0, 700.0));
        let after = map.transform().frame();
        assert!((before.min.x - after.min.x).abs() < EPS);
        assert!((before.min.y - after.min.y).abs() < EPS);
        // The pinch midpoint is now the pivot
        assert!((map.position().x - 400.0).abs() < EPS);
        assert!((map.position().y - 500.0).abs() < EPS);
    }

    #[test]
    fn test_pinch_is_clamped_to_hard_limit() {
        let mut map = controller();
        map.touch_began(&Touch::at(1, 490.0, 500.0));
        map.touch_began(&Touch::at(2, 510.0, 500.0));
        map.touch_moved(&Touch::at(2, 2000.0, 500.0));
        assert!((map.scale() - map.limits().hard_max).abs() < EPS);
        assert!(map.scale() > map.limits().max);
    }

    #[test]
    fn test_release_settles_inside_band_and_on_screen() {
        let mut map = controller();
        map.touch_began(&Touch::at(1, 400.0, 500.0));
        map.touch_began(&Touch::at(2, 600.0, 500.0));
        // Shrink far below the soft minimum
        map.touch_moved(&Touch::at(2, 420.0, 500.0));
        assert!(map.scale() < map.limits().min);

        map.touch_ended(&Touch::at(1, 400.0, 500.0));
        assert_eq!(map.state(), GestureState::Panning);
        map.touch_ended(&Touch::at(2, 420.0, 500.0));
        assert_eq!(map.state(), GestureState::Idle);
        assert!(map.is_snapping());

        settle(&mut map);
        assert!(!map.is_snapping());
        assert!(map.limits().contains(map.scale()));

        let frame = map.transform().frame();
        assert!(frame.min.x <= EPS && frame.min.y <= EPS);
        assert!(frame.max.x >= 1000.0 - EPS && frame.max.y >= 1000.0 - EPS);
    }

    #[test]
    fn test_drag_off_screen_snaps_back() {
        let mut map = controller();
        map.touch_began(&Touch::at(1, 500.0, 500.0));
        map.touch_moved(&Touch::at(1, 2500.0, 500.0));
        // Deferred policy lets the drag run free
        assert!(map.transform().frame().min.x > 0.0);
        map.touch_ended(&Touch::at(1, 2500.0, 500.0));
        settle(&mut map);
        assert!(map.transform().frame().min.x.abs() < EPS);
    }

    #[test]
    fn test_new_touch_cancels_snap() {
        let mut map = controller();
        map.touch_began(&Touch::at(1, 500.0, 500.0));
        map.touch_moved(&Touch::at(1, 2500.0, 500.0));
        map.touch_ended(&Touch::at(1, 2500.0, 500.0));
        map.update(0.05);
        assert!(map.is_snapping());
        let held = map.position();

        map.touch_began(&Touch::at(2, 100.0, 100.0));
        assert!(!map.is_snapping());
        map.update(0.5);
        assert_eq!(map.position(), held);
    }

    #[test]
    fn test_markers_keep_screen_size_through_pinch_and_snap() {
        let mut map = controller_with_marker();
        assert!((marker_screen_scale(&map) - resting_screen_scale()).abs() < EPS);

        map.touch_began(&Touch::at(1, 400.0, 500.0));
        map.touch_began(&Touch::at(2, 600.0, 500.0));
        map.touch_moved(&Touch::at(2, 700.0, 500.0));
        assert!(map.scale() > map.limits().max);
        assert!((marker_screen_scale(&map) - resting_screen_scale()).abs() < EPS);

        map.touch_ended(&Touch::at(1, 400.0, 500.0));
        map.touch_ended(&Touch::at(2, 700.0, 500.0));
        assert!(map.markers()[0].is_animating());
        settle(&mut map);
        assert!((map.scale() - map.limits().max).abs() < EPS);
        assert!(!map.markers()[0].is_animating());
        assert!((marker_screen_scale(&map) - resting_screen_scale()).abs() < EPS);
    }

    #[test]
    fn test_cancelled_snap_stops_marker_animation() {
        let mut map = controller_with_marker();
        map.touch_began(&Touch::at(1, 400.0, 500.0));
        map.touch_began(&Touch::at(2, 600.0, 500.0));
        map.touch_moved(&Touch::at(2, 700.0, 500.0));
        map.touch_ended(&Touch::at(1, 400.0, 500.0));
        map.touch_ended(&Touch::at(2, 700.0, 500.0));
        map.update(0.05);
        assert!(map.is_snapping());

        map.touch_began(&Touch::at(3, 500.0, 500.0));
        assert!(!map.markers()[0].is_animating());
        for _ in 0..30 {
            map.update(1.0 / 60.0);
        }
        assert!((marker_screen_scale(&map) - resting_screen_scale()).abs() < EPS);
    }

    #[test]
    fn test_remaining_touch_continues_panning_without_jump() {
        let mut map = controller();
        map.touch_began(&Touch::at(1, 400.0, 500.0));
        map.touch_began(&Touch::at(2, 600.0, 500.0));
        map.touch_moved(&Touch::at(2, 620.0, 500.0));
        map.touch_ended(&Touch::at(1, 400.0, 500.0));

        let held = map.position();
        map.touch_moved(&Touch::at(2, 630.0, 510.0));
        assert!((map.position().x - (held.x + 10.0)).abs() < EPS);
        assert!((map.position().y - (held.y + 10.0)).abs() < EPS);
    }

    #[test]
    fn test_untracked_touches_are_ignored() {
        let mut map = controller();
        let start = map.position();
        map.touch_moved(&Touch::at(42, 0.0, 0.0));
        map.touch_ended(&Touch::at(42, 0.0, 0.0));
        map.touch_cancelled(&Touch::at(42, 0.0, 0.0));
        assert_eq!(map.position(), start);
        assert_eq!(map.state(), GestureState::Idle);
        assert!(!map.is_snapping());
    }

    #[test]
    fn test_rubber_band_damps_overshoot() {
        let mut config = config();
        config.interaction.boundary_policy = BoundaryPolicy::RubberBand;
        let mut map = MapController::new(Size::new(2000.0, 2000.0), &config);
        // Bottom-left corner pinned to the screen corner at the minimum scale
        map.set_view(Point::new(1000.0, 1000.0), 1.0);
        assert_eq!(map.transform().frame().min, Point::ZERO);

        // Any drag to the right now exposes the left edge
        map.touch_began(&Touch::at(1, 500.0, 500.0));
        map.touch_moved(&Touch::at(1, 640.0, 500.0));
        let overshoot = map.transform().frame().min.x;
        assert!(overshoot > 0.0);
        assert!((overshoot - (140.0 - 140.0 / 1.4)).abs() < 1e-6);
    }

    #[test]
    fn test_rubber_band_halves_scale_overshoot() {
        let mut config = config();
        config.interaction.boundary_policy = BoundaryPolicy::RubberBand;
        let mut map = MapController::new(Size::new(2000.0, 2000.0), &config);
        let start_scale = map.scale();
        let max = map.limits().max;

        // Distance 200 -> 400
        map.touch_began(&Touch::at(1, 400.0, 500.0));
        map.touch_began(&Touch::at(2, 600.0, 500.0));
        map.touch_moved(&Touch::at(2, 800.0, 500.0));

        let raw = map.limits().clamp_hard(start_scale * 2.0);
        assert!(raw > max && raw < map.limits().hard_max);
        assert!((map.scale() - (max + (raw - max) / 2.0)).abs() < EPS);
    }

    #[test]
    fn test_coincident_pinch_does_not_divide_by_zero() {
        let mut map = controller();
        let start_scale = map.scale();
        map.touch_began(&Touch::at(1, 500.0, 500.0));
        map.touch_began(&Touch::at(2, 500.0, 500.0));
        map.touch_moved(&Touch::at(2, 600.0, 500.0));
        assert!(map.scale().is_finite());
        assert_eq!(map.scale(), start_scale);
    }
}
