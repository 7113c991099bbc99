pub mod dispatcher;
pub mod events;

// Re-export the essential types
pub use dispatcher::{forward_touch, offer_touch, TouchDispatcher, TouchResponder};
pub use events::{EventHandled, Touch, TouchId, TouchPhase};
