//! Configuration for the guide
//!
//! Every tunable the map controller, markers, popups and tile assembly use is
//! collected in [`GuideConfig`]. Defaults reproduce the shipped behaviour, and
//! any subset of fields can be overridden from JSON.

use crate::core::{constants, geo::Size};
use crate::{GuideError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// How the map reacts to being dragged past its limits while a gesture is live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundaryPolicy {
    /// Free movement during the drag (only the hard scale limit applies);
    /// all correction happens in the snap-back when the last touch ends.
    DeferToSnap,
    /// Continuous rubber-band resistance while dragging, followed by the snap-back.
    RubberBand,
}

impl Default for BoundaryPolicy {
    fn default() -> Self {
        Self::DeferToSnap
    }
}

/// Which grid of image tiles forms the map surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TileGridConfig {
    pub base_name: String,
    pub extension: String,
    pub columns: u32,
    pub rows: u32,
    /// Seconds between two tile loads in frame-stepped assembly.
    pub load_interval: f64,
}

impl Default for TileGridConfig {
    fn default() -> Self {
        Self {
            base_name: "newYorkMap".to_string(),
            extension: ".png".to_string(),
            columns: 4,
            rows: 5,
            load_interval: constants::TILE_LOAD_INTERVAL,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractionConfig {
    pub boundary_policy: BoundaryPolicy,
    pub elasticity: f64,
    pub min_scale_multiplier: f64,
    pub max_scale_multiplier: f64,
    pub hard_min_scale_factor: f64,
    pub hard_max_scale_factor: f64,
    pub snap_duration: f64,
    pub ease_rate: f64,
}

impl TileGridConfig {
    /// Number of tiles in the grid, rejecting empty and overflowing grids.
    pub fn tile_count(&self) -> Result<usize> {
        if self.columns == 0 || self.rows == 0 {
            return Err(GuideError::EmptyGrid);
        }
        self.columns
            .checked_mul(self.rows)
            .map(|count| count as usize)
            .ok_or_else(|| {
                GuideError::Config(format!(
                    "tile grid {}x{} is too large",
                    self.columns, self.rows
                ))
            })
    }
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            boundary_policy: BoundaryPolicy::default(),
            elasticity: constants::ELASTICITY,
            min_scale_multiplier: constants::MIN_SCALE_MULTIPLIER,
            max_scale_multiplier: constants::MAX_SCALE_MULTIPLIER,
            hard_min_scale_factor: constants::HARD_MIN_SCALE_FACTOR,
            hard_max_scale_factor: constants::HARD_MAX_SCALE_FACTOR,
            snap_duration: constants::SNAP_DURATION,
            ease_rate: constants::EASE_OUT_RATE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkerConfig {
    /// Unscaled marker size; the on-screen size is this times the content scale.
    pub size: Size,
    pub resting_multiplier: f64,
    pub pressed_multiplier: f64,
}

impl Default for MarkerConfig {
    fn default() -> Self {
        Self {
            size: Size::new(160.0, 160.0),
            resting_multiplier: constants::MARKER_RESTING_MULTIPLIER,
            pressed_multiplier: constants::MARKER_PRESSED_MULTIPLIER,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PopupConfig {
    pub open_duration: f64,
    pub close_duration: f64,
    /// How far (as a fraction of the viewport height) content slides up while closing.
    pub close_slide_fraction: f64,
    pub backdrop_opacity: u8,
    /// Unscaled popup button size.
    pub button_size: Size,
    pub title_font_size: f64,
    pub body_font_size: f64,
    pub button_font_size: f64,
    /// Fraction of the viewport width text may occupy before wrapping.
    pub text_width_fraction: f64,
}

impl Default for PopupConfig {
    fn default() -> Self {
        Self {
            open_duration: 0.3,
            close_duration: 0.25,
            close_slide_fraction: 0.25,
            backdrop_opacity: constants::BACKDROP_OPACITY,
            button_size: Size::new(768.0, 160.0),
            title_font_size: 150.0,
            body_font_size: 75.0,
            button_font_size: 100.0,
            text_width_fraction: 0.8,
        }
    }
}

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuideConfig {
    /// Size of the window the guide draws into, in points.
    pub viewport: Size,
    /// Viewport width that corresponds to a content scale of 1.0.
    pub reference_width: f64,
    pub interaction: InteractionConfig,
    pub markers: MarkerConfig,
    pub popup: PopupConfig,
    pub tiles: TileGridConfig,
}

impl Default for GuideConfig {
    fn default() -> Self {
        Self {
            viewport: Size::new(1536.0, 2048.0),
            reference_width: constants::REFERENCE_VIEWPORT_WIDTH,
            interaction: InteractionConfig::default(),
            markers: MarkerConfig::default(),
            popup: PopupConfig::default(),
            tiles: TileGridConfig::default(),
        }
    }
}

impl GuideConfig {
    /// Defaults for a specific viewport size.
    pub fn for_viewport(viewport: Size) -> Self {
        Self {
            viewport,
            ..Self::default()
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: GuideConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Device content scale relative to the reference display.
    pub fn screen_scale(&self) -> f64 {
        self.viewport.width / self.reference_width
    }

    pub fn validate(&self) -> Result<()> {
        if self.viewport.is_empty() {
            return Err(GuideError::Config(format!(
                "viewport must be non-empty, got {}x{}",
                self.viewport.width, self.viewport.height
            )));
        }
        if self.reference_width <= 0.0 {
            return Err(GuideError::Config(
                "reference_width must be positive".to_string(),
            ));
        }
        if self.interaction.elasticity < 1.0 {
            return Err(GuideError::Config(
                "elasticity below 1.0 would amplify overshoot".to_string(),
            ));
        }
        let interaction = &self.interaction;
        let multipliers = [
            ("min_scale_multiplier", interaction.min_scale_multiplier),
            ("max_scale_multiplier", interaction.max_scale_multiplier),
            ("hard_min_scale_factor", interaction.hard_min_scale_factor),
            ("hard_max_scale_factor", interaction.hard_max_scale_factor),
        ];
        for (name, value) in multipliers {
            if !(value.is_finite() && value > 0.0) {
                return Err(GuideError::Config(format!(
                    "{} must be positive, got {}",
                    name, value
                )));
            }
        }
        // hard_min <= min <= max <= hard_max
        if interaction.hard_min_scale_factor > 1.0 {
            return Err(GuideError::Config(format!(
                "hard_min_scale_factor must not exceed 1.0, got {}",
                interaction.hard_min_scale_factor
            )));
        }
        if interaction.hard_max_scale_factor < 1.0 {
            return Err(GuideError::Config(format!(
                "hard_max_scale_factor must be at least 1.0, got {}",
                interaction.hard_max_scale_factor
            )));
        }
        self.tiles.tile_count()?;
        Ok(())
    }
}
