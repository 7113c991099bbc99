pub mod controller;
pub mod limits;

pub use controller::{GestureState, MapController};
pub use limits::ScaleLimits;
