use crate::core::{config::InteractionConfig, geo::Size};

/// Scale band for the map surface.
///
/// `min`/`max` is the soft band the map always settles into. `hard_min` and
/// `hard_max` bound the transient scale while a pinch is in progress.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleLimits {
    pub min: f64,
    pub max: f64,
    pub hard_min: f64,
    pub hard_max: f64,
}

impl ScaleLimits {
    /// Derives the band from the viewport, the unscaled map size and the
    /// device content scale.
    ///
    /// The minimum keeps the map at least as large as the viewport in both
    /// axes; the maximum is a fixed multiple of the content scale and never
    /// drops below the minimum.
    pub fn compute(
        viewport: Size,
        content: Size,
        screen_scale: f64,
        interaction: &InteractionConfig,
    ) -> Self {
        let fill = if content.is_empty() {
            1.0
        } else {
            (viewport.width / content.width).max(viewport.height / content.height)
        };

        let min = fill * interaction.min_scale_multiplier;
        let max = (screen_scale * interaction.max_scale_multiplier).max(min);

        Self {
            min,
            max,
            hard_min: min * interaction.hard_min_scale_factor,
            hard_max: max * interaction.hard_max_scale_factor,
        }
    }

    pub fn clamp(&self, scale: f64) -> f64 {
        scale.clamp(self.min, self.max)
    }

    pub fn clamp_hard(&self, scale: f64) -> f64 {
        scale.max(self.hard_min).min(self.hard_max)
    }

    pub fn contains(&self, scale: f64) -> bool {
        scale >= self.min && scale <= self.max
    }

    /// Scale at rest position between the two soft limits.
    pub fn midpoint(&self) -> f64 {
        (self.min + self.max) / 2.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limits_follow_asset_dimensions() {
        let interaction = InteractionConfig::default();
        let limits = ScaleLimits::compute(
            Size::new(1536.0, 2048.0),
            Size::new(4096.0, 5120.0),
            1.0,
            &interaction,
        );
        // Height is the tighter axis: 2048 / 5120 = 0.4
        assert!((limits.min - 0.8).abs() < 1e-12);
        assert!((limits.max - 2.5).abs() < 1e-12);
        assert!((limits.hard_min - 0.4).abs() < 1e-12);
        assert!((limits.hard_max - 5.0).abs() < 1e-12);

        // At min scale the map covers the viewport in both axes
        assert!(4096.0 * limits.min >= 1536.0);
        assert!(5120.0 * limits.min >= 2048.0);
    }

    #[test]
    fn test_max_never_below_min() {
        let interaction = InteractionConfig::default();
        let limits = ScaleLimits::compute(
            Size::new(1536.0, 2048.0),
            Size::new(100.0, 100.0),
            0.5,
            &interaction,
        );
        assert_eq!(limits.max, limits.min);
        assert_eq!(limits.clamp(1000.0), limits.max);
    }

    #[test]
    fn test_clamping() {
        let limits = ScaleLimits {
            min: 1.0,
            max: 2.0,
            hard_min: 0.5,
            hard_max: 4.0,
        };
        assert_eq!(limits.clamp(0.1), 1.0);
        assert_eq!(limits.clamp_hard(0.1), 0.5);
        assert_eq!(limits.clamp_hard(10.0), 4.0);
        assert!(limits.contains(1.5));
        assert!(!limits.contains(2.5));
        assert_eq!(limits.midpoint(), 1.5);
    }
}
