use crate::animation::easing::EasingFunction;
use crate::core::geo::Point;

/// Represents an animatable value that can be tweened
pub trait Tweenable {
    /// Interpolate between self and other by factor t (0.0 to 1.0)
    fn lerp(&self, other: &Self, t: f64) -> Self;
}

impl Tweenable for f64 {
    fn lerp(&self, other: &Self, t: f64) -> Self {
        self + (other - self) * t
    }
}

impl Tweenable for Point {
    fn lerp(&self, other: &Self, t: f64) -> Self {
        Point::new(self.x.lerp(&other.x, t), self.y.lerp(&other.y, t))
    }
}

/// A tween between two values, advanced explicitly once per frame.
///
/// Time only moves when [`Tween::tick`] is called, so animations stay in step
/// with the frame loop that owns them.
#[derive(Debug, Clone)]
pub struct Tween<T: Tweenable + Clone> {
    pub from: T,
    pub to: T,
    /// Duration in seconds
    pub duration: f64,
    pub easing: EasingFunction,
    elapsed: f64,
}

impl<T: Tweenable + Clone> Tween<T> {
    /// Create a new linear tween
    pub fn new(from: T, to: T, duration: f64) -> Self {
        Self::with_easing(from, to, duration, EasingFunction::Linear)
    }

    /// Create a new tween with custom easing
    pub fn with_easing(from: T, to: T, duration: f64, easing: EasingFunction) -> Self {
        Self {
            from,
            to,
            duration: duration.max(0.0),
            easing,
            elapsed: 0.0,
        }
    }

    /// Get the current progress (0.0 to 1.0)
    pub fn progress(&self) -> f64 {
        if self.duration <= 0.0 {
            1.0
        } else {
            (self.elapsed / self.duration).min(1.0)
        }
    }

    pub fn is_finished(&self) -> bool {
        self.progress() >= 1.0
    }

    /// Get the current value
    pub fn current_value(&self) -> T {
        if self.is_finished() {
            return self.to.clone();
        }
        self.from.lerp(&self.to, self.easing.apply(self.progress()))
    }

    /// Advance by `dt` seconds and return the value at the new time
    pub fn tick(&mut self, dt: f64) -> T {
        self.elapsed += dt.max(0.0);
        self.current_value()
    }
}
