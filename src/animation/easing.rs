/// Easing functions for smooth animations
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EasingFunction {
    Linear,
    /// `t^rate`: starts slow.
    EaseIn { rate: f64 },
    /// `t^(1/rate)`: starts fast and settles gently.
    EaseOut { rate: f64 },
    EaseOutCubic,
}

impl EasingFunction {
    /// Apply the easing function to a normalized time value (0.0 to 1.0)
    pub fn apply(&self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);

        match self {
            EasingFunction::Linear => t,
            EasingFunction::EaseIn { rate } => t.powf(*rate),
            EasingFunction::EaseOut { rate } => {
                if *rate <= 0.0 {
                    t
                } else {
                    t.powf(1.0 / rate)
                }
            }
            EasingFunction::EaseOutCubic => 1.0 - (1.0 - t).powi(3),
        }
    }
}

impl Default for EasingFunction {
    fn default() -> Self {
        Self::Linear
    }
}
