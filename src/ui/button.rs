//! Pressable surface shared by markers and popup buttons.
//!
//! [`Pressable`] only tracks state; whoever owns it decides whether a touch
//! location is inside the surface and passes that along with each event.

use crate::input::{EventHandled, TouchId};
use std::fmt;

/// Callback fired on press or release.
pub type Callback = Box<dyn FnMut() + Send>;

pub struct Pressable {
    active_touch: Option<TouchId>,
    pressed: bool,
    /// Set when a touch moved while movement is disallowed; the touch can no longer release.
    moved_off: bool,
    touch_move_allowed: bool,
    enabled: bool,
    on_press: Option<Callback>,
    on_release: Option<Callback>,
}

impl Pressable {
    pub fn new() -> Self {
        Self {
            active_touch: None,
            pressed: false,
            moved_off: false,
            touch_move_allowed: true,
            enabled: true,
            on_press: None,
            on_release: None,
        }
    }

    /// Whether the press survives the touch moving. When disallowed, any movement
    /// cancels the press, which is what surfaces on a draggable map need.
    pub fn with_touch_move_allowed(mut self, allowed: bool) -> Self {
        self.touch_move_allowed = allowed;
        self
    }

    pub fn on_press(mut self, callback: impl FnMut() + Send + 'static) -> Self {
        self.on_press = Some(Box::new(callback));
        self
    }

    pub fn on_release(mut self, callback: impl FnMut() + Send + 'static) -> Self {
        self.on_release = Some(Box::new(callback));
        self
    }

    pub fn set_on_release(&mut self, callback: impl FnMut() + Send + 'static) {
        self.on_release = Some(Box::new(callback));
    }

    pub fn is_pressed(&self) -> bool {
        self.pressed
    }

    pub fn is_tracking(&self) -> bool {
        self.active_touch.is_some()
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Disabling drops any touch in progress without releasing.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            self.reset();
        }
    }

    pub fn touch_move_allowed(&self) -> bool {
        self.touch_move_allowed
    }

    pub fn began(&mut self, id: TouchId, inside: bool) -> EventHandled {
        if !self.enabled || !inside || self.active_touch.is_some() {
            return EventHandled::NotHandled;
        }

        self.active_touch = Some(id);
        self.pressed = true;
        self.moved_off = false;
        if let Some(callback) = self.on_press.as_mut() {
            callback();
        }
        EventHandled::Handled
    }

    pub fn moved(&mut self, id: TouchId, inside: bool) {
        if self.active_touch != Some(id) {
            return;
        }

        if !self.touch_move_allowed {
            self.moved_off = true;
            self.pressed = false;
            return;
        }
        self.pressed = inside;
    }

    /// Ends the touch. Returns whether the release callback fired.
    pub fn ended(&mut self, id: TouchId, inside: bool) -> bool {
        if self.active_touch != Some(id) {
            return false;
        }

        let release = inside && !self.moved_off;
        self.reset();
        if release {
            if let Some(callback) = self.on_release.as_mut() {
                callback();
            }
        }
        release
    }

    /// A lost touch never counts as a release.
    pub fn cancelled(&mut self, id: TouchId) {
        if self.active_touch == Some(id) {
            self.reset();
        }
    }

    fn reset(&mut self) {
        self.active_touch = None;
        self.pressed = false;
        self.moved_off = false;
    }
}

impl Default for Pressable {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Pressable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pressable")
            .field("active_touch", &self.active_touch)
            .field("pressed", &self.pressed)
            .field("moved_off", &self.moved_off)
            .field("touch_move_allowed", &self.touch_move_allowed)
            .field("enabled", &self.enabled)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn counting() -> (Pressable, Arc<AtomicUsize>, Arc<AtomicUsize>) {
        let presses = Arc::new(AtomicUsize::new(0));
        let releases = Arc::new(AtomicUsize::new(0));
        let p = presses.clone();
        let r = releases.clone();
        let pressable = Pressable::new()
            .on_press(move || {
                p.fetch_add(1, Ordering::SeqCst);
            })
            .on_release(move || {
                r.fetch_add(1, Ordering::SeqCst);
            });
        (pressable, presses, releases)
    }

    #[test]
    fn test_tap_inside_releases() {
        let (mut button, presses, releases) = counting();
        assert!(button.began(1, true).is_handled());
        assert!(button.is_pressed());
        assert!(button.ended(1, true));
        assert!(!button.is_pressed());
        assert_eq!(presses.load(Ordering::SeqCst), 1);
        assert_eq!(releases.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_touch_outside_is_not_claimed() {
        let (mut button, presses, _) = counting();
        assert!(!button.began(1, false).is_handled());
        assert_eq!(presses.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_move_off_and_back_on() {
        let (mut button, _, releases) = counting();
        button.began(1, true);
        button.moved(1, false);
        assert!(!button.is_pressed());
        button.moved(1, true);
        assert!(button.is_pressed());
        assert!(!button.ended(1, false));
        assert_eq!(releases.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_disallowed_movement_cancels_release() {
        let (button, _, releases) = counting();
        let mut button = button.with_touch_move_allowed(false);
        button.began(1, true);
        button.moved(1, true);
        assert!(!button.is_pressed());
        assert!(!button.ended(1, true));
        assert_eq!(releases.load(Ordering::SeqCst), 0);

        // The next tap works again
        button.began(2, true);
        assert!(button.ended(2, true));
    }

    #[test]
    fn test_cancel_never_releases() {
        let (mut button, _, releases) = counting();
        button.began(1, true);
        button.cancelled(1);
        assert!(!button.is_tracking());
        assert_eq!(releases.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_other_touches_are_ignored() {
        let (mut button, _, releases) = counting();
        button.began(1, true);
        assert!(!button.began(2, true).is_handled());
        assert!(!button.ended(2, true));
        assert!(button.is_pressed());
        assert!(button.ended(1, true));
        assert_eq!(releases.load(Ordering::SeqCst), 1);
    }
}
