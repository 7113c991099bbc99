pub mod links;
pub mod marker;
pub mod popup;
pub mod registry;

pub use links::{open_directions, LinkLauncher, LoggingLauncher};
pub use marker::LandmarkMarker;
pub use popup::build_landmark_popup;
pub use registry::{Landmark, LandmarkRegistry, MapPlacement};
