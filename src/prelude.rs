//! Prelude module for common nyguide types and traits
//!
//! This module re-exports the most commonly used types, traits, and functions
//! for easy importing with `use nyguide::prelude::*;`

pub use crate::core::{
    bounds::Bounds,
    config::{
        BoundaryPolicy, GuideConfig, InteractionConfig, MarkerConfig, PopupConfig, TileGridConfig,
    },
    geo::{Point, Size},
    node::NodeTransform,
};

pub use crate::animation::{EasingFunction, Tween, Tweenable};

pub use crate::input::{
    EventHandled, Touch, TouchDispatcher, TouchId, TouchPhase, TouchResponder,
};

pub use crate::map::{GestureState, MapController, ScaleLimits};

pub use crate::tiles::{
    AssemblyOutcome, AssemblyStatus, AsyncAssembly, MemoryTileSource, ProgressSink, TileImage,
    TileSource, TiledImage,
};

#[cfg(feature = "decode")]
pub use crate::tiles::FsTileSource;

pub use crate::landmarks::{
    build_landmark_popup, open_directions, Landmark, LandmarkMarker, LandmarkRegistry,
    LinkLauncher, LoggingLauncher, MapPlacement,
};

pub use crate::ui::{
    loading_popup, ApproxMeasure, ContentKind, ContentMeasure, Popup, PopupPhase, PopupPresenter,
    Pressable,
};

pub use crate::rendering::{Color, DrawCommand, NullRenderer, Renderer};

pub use crate::spatial::Culling;

pub use crate::command::{command_channel, CommandReceiver, CommandSender, GuideCommand};

pub use crate::scene::{GuideScene, ResponderKey};

pub use crate::{GuideError, Result};
