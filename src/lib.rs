//! # nyguide
//!
//! A touch-driven tourist map of New York City.
//!
//! The crate assembles a large map surface from a grid of image tiles, lets
//! the user pan and pinch-zoom it inside scale limits with a snap-back
//! animation, and places a marker per landmark that keeps a constant on-screen
//! size. Tapping a marker opens an animated detail popup with buttons that
//! hand directions and web links to an external launcher.
//!
//! Everything here is headless: the scene produces a list of
//! [`DrawCommand`](rendering::DrawCommand)s for a [`Renderer`](rendering::Renderer)
//! to consume, and is driven by explicit touch events and frame ticks.

pub mod animation;
pub mod command;
pub mod core;
pub mod input;
pub mod landmarks;
pub mod map;
pub mod prelude;
pub mod rendering;
pub mod scene;
pub mod spatial;
pub mod tiles;
pub mod ui;
pub use crate::core::constants;

// Re-export public API
pub use core::{
    bounds::Bounds,
    config::{BoundaryPolicy, GuideConfig, TileGridConfig},
    geo::{Point, Size},
    node::NodeTransform,
};

pub use command::{command_channel, GuideCommand};

pub use input::{Touch, TouchDispatcher, TouchPhase, TouchResponder};

pub use landmarks::{Landmark, LandmarkMarker, LandmarkRegistry, LinkLauncher};

pub use map::{MapController, ScaleLimits};

pub use rendering::{DrawCommand, Renderer};

pub use scene::GuideScene;

pub use tiles::{AsyncAssembly, TileSource, TiledImage};

pub use ui::{Popup, PopupPresenter, Pressable};

pub use animation::{easing::EasingFunction, tweening::Tween};

/// Result type used throughout the library
pub type Result<T> = std::result::Result<T, GuideError>;

/// Common error types
#[derive(Debug, thiserror::Error)]
pub enum GuideError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[cfg(feature = "decode")]
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Missing tile: {name}")]
    MissingTile { name: String },

    #[error("Tile grid has no tiles")]
    EmptyGrid,

    #[error("Config error: {0}")]
    Config(String),
}

/// Error type alias for convenience
pub type Error = GuideError;
