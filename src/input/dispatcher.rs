//! Ordered touch routing.
//!
//! Components that want touches implement [`TouchResponder`] and are registered
//! in a [`TouchDispatcher`] under a key chosen by their owner. A new touch is
//! offered to registrations from the highest z-order down; every responder that
//! accepts it becomes a claimant and receives the rest of that touch's stream.
//! A swallowing registration that accepts a touch hides it from everything
//! below.

use crate::core::geo::Point;
use crate::input::events::{EventHandled, Touch, TouchId, TouchPhase};
use fxhash::FxHashMap;
use std::fmt::Debug;

/// Capability of anything that can take part in touch handling.
///
/// Locations handed to a responder are already expressed in that responder's
/// own coordinate space; the owner does the conversion.
pub trait TouchResponder {
    /// Whether a touch starting at `point` falls on this responder.
    fn handles_touch_at(&self, point: Point) -> bool;

    /// A touch began. Returning `Handled` claims the touch.
    fn on_began(&mut self, touch: &Touch) -> EventHandled;

    fn on_moved(&mut self, touch: &Touch);

    fn on_ended(&mut self, touch: &Touch);

    /// Lost touches are treated as ended unless a responder knows better.
    fn on_cancelled(&mut self, touch: &Touch) {
        self.on_ended(touch);
    }
}

/// Offers a freshly started touch to a responder, honouring its hit test.
pub fn offer_touch(responder: &mut dyn TouchResponder, touch: &Touch) -> EventHandled {
    if !responder.handles_touch_at(touch.location) {
        return EventHandled::NotHandled;
    }
    responder.on_began(touch)
}

/// Forwards a follow-up phase to a responder.
pub fn forward_touch(responder: &mut dyn TouchResponder, phase: TouchPhase, touch: &Touch) {
    match phase {
        TouchPhase::Began => {
            responder.on_began(touch);
        }
        TouchPhase::Moved => responder.on_moved(touch),
        TouchPhase::Ended => responder.on_ended(touch),
        TouchPhase::Cancelled => responder.on_cancelled(touch),
    }
}

#[derive(Debug, Clone)]
struct Registration<K> {
    key: K,
    z_order: i32,
    swallows: bool,
    sequence: u64,
}

/// Z-ordered registry of touch responders plus per-touch claim tracking
#[derive(Debug)]
pub struct TouchDispatcher<K> {
    registrations: Vec<Registration<K>>,
    claims: FxHashMap<TouchId, Vec<K>>,
    next_sequence: u64,
}

impl<K: Copy + Eq + Debug> TouchDispatcher<K> {
    pub fn new() -> Self {
        Self {
            registrations: Vec::new(),
            claims: FxHashMap::default(),
            next_sequence: 0,
        }
    }

    /// Register (or re-register) a responder key.
    pub fn register(&mut self, key: K, z_order: i32, swallows: bool) {
        self.registrations.retain(|r| r.key != key);
        self.registrations.push(Registration {
            key,
            z_order,
            swallows,
            sequence: self.next_sequence,
        });
        self.next_sequence += 1;
        self.sort();
    }

    /// Remove a responder; it also stops receiving touches it had claimed.
    pub fn unregister(&mut self, key: K) {
        self.registrations.retain(|r| r.key != key);
        for claimants in self.claims.values_mut() {
            claimants.retain(|k| *k != key);
        }
        self.claims.retain(|_, claimants| !claimants.is_empty());
    }

    pub fn set_z_order(&mut self, key: K, z_order: i32) {
        if let Some(registration) = self.registrations.iter_mut().find(|r| r.key == key) {
            registration.z_order = z_order;
        }
        self.sort();
    }

    pub fn is_registered(&self, key: K) -> bool {
        self.registrations.iter().any(|r| r.key == key)
    }

    /// Registered keys, highest z-order first.
    pub fn keys(&self) -> Vec<K> {
        self.registrations.iter().map(|r| r.key).collect()
    }

    /// Keys that currently own a touch.
    pub fn claimants(&self, id: TouchId) -> &[K] {
        self.claims.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Offers a new touch to each registration in order until it is swallowed.
    pub fn begin<F>(&mut self, touch: &Touch, mut deliver: F) -> EventHandled
    where
        F: FnMut(K, &Touch) -> EventHandled,
    {
        if self.claims.contains_key(&touch.id) {
            log::trace!("touch {} began twice; ignoring", touch.id);
            return EventHandled::NotHandled;
        }

        let mut claimants = Vec::new();
        for registration in &self.registrations {
            if deliver(registration.key, touch).is_handled() {
                claimants.push(registration.key);
                if registration.swallows {
                    break;
                }
            }
        }

        if claimants.is_empty() {
            EventHandled::NotHandled
        } else {
            log::trace!("touch {} claimed by {:?}", touch.id, claimants);
            self.claims.insert(touch.id, claimants);
            EventHandled::Handled
        }
    }

    /// Routes a moved/ended/cancelled touch to its claimants.
    ///
    /// Unknown touches are ignored. Ending phases release the claim.
    pub fn route<F>(&mut self, phase: TouchPhase, touch: &Touch, mut deliver: F) -> EventHandled
    where
        F: FnMut(K, &Touch),
    {
        let claimants = match phase {
            // Beginnings go through `begin`, which decides who claims the touch
            TouchPhase::Began => None,
            TouchPhase::Moved => self.claims.get(&touch.id).cloned(),
            TouchPhase::Ended | TouchPhase::Cancelled => self.claims.remove(&touch.id),
        };

        match claimants {
            Some(keys) => {
                for key in keys {
                    deliver(key, touch);
                }
                EventHandled::Handled
            }
            None => EventHandled::NotHandled,
        }
    }

    fn sort(&mut self) {
        self.registrations
            .sort_by(|a, b| b.z_order.cmp(&a.z_order).then(a.sequence.cmp(&b.sequence)));
    }
}

impl<K: Copy + Eq + Debug> Default for TouchDispatcher<K> {
    fn default() -> Self {
        Self::new()
    }
}
