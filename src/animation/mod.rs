pub mod easing;
pub mod tweening;

// Re-export commonly used types for convenience
pub use easing::EasingFunction;
pub use tweening::{Tween, Tweenable};
