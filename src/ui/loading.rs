use crate::core::{config::GuideConfig, geo::Size};
use crate::ui::popup::{ContentKind, Popup};

pub const LOADING_BAR_IMAGE: &str = "loadingBar.png";
pub const LOADING_BORDER_IMAGE: &str = "loadingBorder.png";
/// Unscaled size shared by the bar and its border.
pub const LOADING_BAR_SIZE: Size = Size {
    width: 1024.0,
    height: 96.0,
};

/// Popup showing startup progress: a bar revealed left to right inside a border.
pub fn loading_popup(config: &GuideConfig) -> Popup {
    let mut popup = Popup::from_config(config);
    let scale = config.screen_scale();
    let center = config.viewport.center();

    popup.add_overlay(
        ContentKind::ProgressBar {
            image: LOADING_BAR_IMAGE.to_string(),
            progress: 0.0,
        },
        LOADING_BAR_SIZE,
        scale,
        center,
    );
    popup.add_overlay(
        ContentKind::Image {
            name: LOADING_BORDER_IMAGE.to_string(),
        },
        LOADING_BAR_SIZE,
        scale,
        center,
    );
    popup
}

impl Popup {
    /// Updates the first progress bar. Returns `false` if the popup has none.
    pub fn set_progress(&mut self, fraction: f64) -> bool {
        let fraction = fraction.clamp(0.0, 1.0);
        for index in 0..self.items().len() {
            if let Some(item) = self.item_mut(index) {
                if let ContentKind::ProgressBar { progress, .. } = &mut item.kind {
                    *progress = fraction;
                    return true;
                }
            }
        }
        false
    }

    pub fn progress(&self) -> Option<f64> {
        self.items().iter().find_map(|item| match item.kind {
            ContentKind::ProgressBar { progress, .. } => Some(progress),
            _ => None,
        })
    }
}
