use crate::core::geo::Point;
use crate::input::{EventHandled, Touch, TouchResponder};
use crate::rendering::DrawCommand;
use crate::tiles::ProgressSink;
use crate::ui::popup::Popup;

/// Owner of the modal layer: at most one active popup plus any that are
/// still animating closed.
#[derive(Debug, Default)]
pub struct PopupPresenter {
    active: Option<Popup>,
    closing: Vec<Popup>,
}

impl PopupPresenter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active(&self) -> Option<&Popup> {
        self.active.as_ref()
    }

    pub fn active_mut(&mut self) -> Option<&mut Popup> {
        self.active.as_mut()
    }

    pub fn has_active(&self) -> bool {
        self.active.is_some()
    }

    pub fn closing_count(&self) -> usize {
        self.closing.len()
    }

    /// Closes the current popup and opens `popup` in one step.
    pub fn show(&mut self, mut popup: Popup, origin: Option<Point>) {
        self.close();
        popup.open(origin);
        log::debug!("showing popup");
        self.active = Some(popup);
    }

    /// Starts closing the active popup.
    pub fn close(&mut self) {
        if let Some(mut popup) = self.active.take() {
            popup.close();
            self.closing.push(popup);
        }
    }

    /// Removes the active popup at once, without a transition.
    pub fn dismiss(&mut self) {
        if let Some(mut popup) = self.active.take() {
            popup.dismiss();
        }
    }

    pub fn update(&mut self, dt: f64) {
        if let Some(popup) = self.active.as_mut() {
            popup.update(dt);
        }
        for popup in &mut self.closing {
            popup.update(dt);
        }
        self.closing.retain(|popup| !popup.is_closed());
    }

    /// Closing popups first, so the active one stays on top.
    pub fn draw(&self, out: &mut Vec<DrawCommand>) {
        for popup in &self.closing {
            popup.draw(out);
        }
        if let Some(popup) = &self.active {
            popup.draw(out);
        }
    }
}

impl TouchResponder for PopupPresenter {
    fn handles_touch_at(&self, point: Point) -> bool {
        self.active
            .as_ref()
            .map(|popup| popup.handles_touch_at(point))
            .unwrap_or(false)
    }

    fn on_began(&mut self, touch: &Touch) -> EventHandled {
        match self.active.as_mut() {
            Some(popup) => popup.on_began(touch),
            None => EventHandled::NotHandled,
        }
    }

    fn on_moved(&mut self, touch: &Touch) {
        if let Some(popup) = self.active.as_mut() {
            popup.on_moved(touch);
        }
    }

    fn on_ended(&mut self, touch: &Touch) {
        if let Some(popup) = self.active.as_mut() {
            popup.on_ended(touch);
        }
    }

    fn on_cancelled(&mut self, touch: &Touch) {
        if let Some(popup) = self.active.as_mut() {
            popup.on_cancelled(touch);
        }
    }
}

/// Drives the active popup's progress bar from a tile assembly.
impl ProgressSink for PopupPresenter {
    fn progress(&mut self, fraction: f64) {
        if let Some(popup) = self.active.as_mut() {
            popup.set_progress(fraction);
        }
    }

    fn finished(&mut self) {
        self.close();
    }

    fn aborted(&mut self) {
        self.dismiss();
    }
}
