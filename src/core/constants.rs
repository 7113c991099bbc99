//! Core constants tuned for the reference tablet display.

/// Viewport width (in points) that corresponds to a content scale of 1.0 (iPad Retina).
pub const REFERENCE_VIEWPORT_WIDTH: f64 = 1536.0;

/// The map can never be zoomed out further than this multiple of the "fill the viewport" scale.
pub const MIN_SCALE_MULTIPLIER: f64 = 2.0;

/// Maximum zoom as a multiple of the device content scale.
pub const MAX_SCALE_MULTIPLIER: f64 = 2.5;

/// During a pinch the scale may drop to this fraction of the minimum scale.
pub const HARD_MIN_SCALE_FACTOR: f64 = 0.5;

/// During a pinch the scale may grow to this multiple of the maximum scale.
pub const HARD_MAX_SCALE_FACTOR: f64 = 2.0;

/// Rubber-band resistance: overshoot is pulled back by `overshoot / ELASTICITY`.
pub const ELASTICITY: f64 = 1.4;

/// Seconds the snap-back animation takes once all touches have ended.
pub const SNAP_DURATION: f64 = 0.2;

/// Rate of the ease-out curve used by snap-back and marker re-scaling.
pub const EASE_OUT_RATE: f64 = 3.0;

/// Marker multiplier while resting (slightly smaller than pressed).
pub const MARKER_RESTING_MULTIPLIER: f64 = 0.75;

/// Marker multiplier while pressed.
pub const MARKER_PRESSED_MULTIPLIER: f64 = 1.0;

/// Delay between two tile loads during frame-stepped assembly (one frame at 60 fps).
pub const TILE_LOAD_INTERVAL: f64 = 1.0 / 60.0;

/// Opacity of the dimmed popup backdrop (0-255 scale, normalized when used).
pub const BACKDROP_OPACITY: u8 = 220;

/// Touch slots tracked by the map controller.
pub const MAX_TRACKED_TOUCHES: usize = 2;

/// Pinches that start with the fingers closer than this (in points) do not scale.
pub const MIN_PINCH_DISTANCE: f64 = 1.0;
