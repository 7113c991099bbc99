use crate::core::geo::Point;
use serde::{Deserialize, Serialize};

/// Platform-assigned identifier, stable for the lifetime of one finger contact.
pub type TouchId = u64;

/// Individual touch point as delivered by the platform input layer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Touch {
    pub id: TouchId,
    /// Current location in screen space (y up)
    pub location: Point,
}

impl Touch {
    pub fn new(id: TouchId, location: Point) -> Self {
        Self { id, location }
    }

    pub fn at(id: TouchId, x: f64, y: f64) -> Self {
        Self::new(id, Point::new(x, y))
    }
}

/// Types of touch events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TouchPhase {
    Began,
    Moved,
    Ended,
    Cancelled,
}

/// Whether an event was handled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventHandled {
    Handled,
    NotHandled,
}

impl EventHandled {
    pub fn is_handled(self) -> bool {
        self == EventHandled::Handled
    }
}

impl From<bool> for EventHandled {
    fn from(handled: bool) -> Self {
        if handled {
            EventHandled::Handled
        } else {
            EventHandled::NotHandled
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_touch_construction() {
        let touch = Touch::at(7, 100.0, 200.0);
        assert_eq!(touch.id, 7);
        assert_eq!(touch.location, Point::new(100.0, 200.0));
    }

    #[test]
    fn test_event_handled_from_bool() {
        assert!(EventHandled::from(true).is_handled());
        assert!(!EventHandled::from(false).is_handled());
    }
}
