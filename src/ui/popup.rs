//! Modal popup: a dimmed backdrop with content stacked vertically and a row
//! of buttons underneath.
//!
//! Content and buttons are laid out top to bottom with equal gaps above,
//! between and below them, each centered horizontally. Opening fades every
//! part in, optionally flying it out of an origin point; closing fades
//! everything out while sliding content upwards.

use crate::animation::{EasingFunction, Tween};
use crate::core::{
    bounds::Bounds,
    config::{GuideConfig, PopupConfig},
    geo::{Point, Size},
    node::NodeTransform,
};
use crate::input::{EventHandled, Touch, TouchResponder};
use crate::rendering::{Color, DrawCommand};
use crate::ui::button::Pressable;
use fxhash::FxHashMap;

/// Width of one character relative to the font size, for approximate measuring.
const CHAR_WIDTH_FACTOR: f64 = 0.5;
/// Line height relative to the font size.
const LINE_HEIGHT_FACTOR: f64 = 1.2;

/// Wrapped text and the box it occupies.
#[derive(Debug, Clone, PartialEq)]
pub struct TextLayout {
    pub lines: Vec<String>,
    pub size: Size,
}

/// Sizes popup content before it is laid out.
pub trait ContentMeasure {
    fn measure_text(&self, text: &str, font_size: f64, max_width: f64) -> TextLayout;

    /// Unscaled size of an image asset.
    fn image_size(&self, name: &str) -> Size;
}

/// Monospace-ish text estimate plus a table of known image sizes.
#[derive(Debug, Clone)]
pub struct ApproxMeasure {
    image_sizes: FxHashMap<String, Size>,
    pub default_image_size: Size,
}

impl ApproxMeasure {
    pub fn new() -> Self {
        Self {
            image_sizes: FxHashMap::default(),
            default_image_size: Size::new(512.0, 384.0),
        }
    }

    pub fn with_image(mut self, name: impl Into<String>, size: Size) -> Self {
        self.image_sizes.insert(name.into(), size);
        self
    }
}

impl Default for ApproxMeasure {
    fn default() -> Self {
        Self::new()
    }
}

impl ContentMeasure for ApproxMeasure {
    fn measure_text(&self, text: &str, font_size: f64, max_width: f64) -> TextLayout {
        let char_width = font_size * CHAR_WIDTH_FACTOR;
        let max_chars = if char_width > 0.0 {
            ((max_width / char_width).floor() as usize).max(1)
        } else {
            usize::MAX
        };

        let mut lines = Vec::new();
        for paragraph in text.lines() {
            let mut line = String::new();
            for word in paragraph.split_whitespace() {
                let needed = if line.is_empty() {
                    word.chars().count()
                } else {
                    line.chars().count() + 1 + word.chars().count()
                };
                if needed > max_chars && !line.is_empty() {
                    lines.push(std::mem::take(&mut line));
                }
                if !line.is_empty() {
                    line.push(' ');
                }
                line.push_str(word);
            }
            lines.push(line);
        }

        let widest = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0);
        let size = Size::new(
            widest as f64 * char_width,
            lines.len() as f64 * font_size * LINE_HEIGHT_FACTOR,
        );
        TextLayout { lines, size }
    }

    fn image_size(&self, name: &str) -> Size {
        self.image_sizes
            .get(name)
            .copied()
            .unwrap_or(self.default_image_size)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ContentKind {
    Text {
        lines: Vec<String>,
        font_size: f64,
        color: Color,
    },
    Image {
        name: String,
    },
    /// Image revealed from the left up to `progress` of its width.
    ProgressBar {
        image: String,
        progress: f64,
    },
    Button {
        label: String,
        font_size: f64,
    },
}

#[derive(Debug, Clone)]
struct ItemMotion {
    position: Tween<Point>,
    scale: Tween<f64>,
    opacity: Tween<f64>,
}

impl ItemMotion {
    fn is_finished(&self) -> bool {
        self.position.is_finished() && self.scale.is_finished() && self.opacity.is_finished()
    }
}

/// One piece of popup content.
#[derive(Debug, Clone)]
pub struct PopupItem {
    pub kind: ContentKind,
    transform: NodeTransform,
    /// Where layout put the item; animations start or end here.
    home: Point,
    home_scale: f64,
    opacity: f64,
    /// Overlays keep a fixed position instead of joining the vertical stack.
    laid_out: bool,
    motion: Option<ItemMotion>,
}

impl PopupItem {
    fn new(kind: ContentKind, content_size: Size, scale: f64, laid_out: bool) -> Self {
        let mut transform = NodeTransform::new(content_size);
        transform.scale = scale;
        Self {
            kind,
            transform,
            home: Point::ZERO,
            home_scale: scale,
            opacity: 1.0,
            laid_out,
            motion: None,
        }
    }

    pub fn transform(&self) -> &NodeTransform {
        &self.transform
    }

    pub fn frame(&self) -> Bounds {
        self.transform.frame()
    }

    /// Frame at the laid-out position and scale.
    pub fn home_frame(&self) -> Bounds {
        self.transform.frame_at(self.home, self.home_scale)
    }

    pub fn opacity(&self) -> f64 {
        self.opacity
    }

    fn scaled_height(&self) -> f64 {
        self.transform.content_size.height * self.home_scale
    }

    fn place_home(&mut self, home: Point) {
        self.home = home;
        if self.motion.is_none() {
            self.transform.position = home;
        }
    }

    fn animate(&mut self, position: Tween<Point>, scale: Tween<f64>, opacity: Tween<f64>) {
        self.transform.position = position.current_value();
        self.transform.scale = scale.current_value();
        self.opacity = opacity.current_value();
        self.motion = Some(ItemMotion {
            position,
            scale,
            opacity,
        });
    }

    fn update(&mut self, dt: f64) {
        if let Some(motion) = self.motion.as_mut() {
            self.transform.position = motion.position.tick(dt);
            self.transform.scale = motion.scale.tick(dt);
            self.opacity = motion.opacity.tick(dt);
            if motion.is_finished() {
                self.motion = None;
            }
        }
    }

    fn draw(&self, out: &mut Vec<DrawCommand>) {
        let bounds = self.frame();
        let relative_scale = if self.home_scale != 0.0 {
            self.transform.scale / self.home_scale
        } else {
            0.0
        };
        match &self.kind {
            ContentKind::Text {
                lines,
                font_size,
                color,
            } => out.push(DrawCommand::Text {
                lines: lines.clone(),
                font_size: font_size * relative_scale,
                bounds,
                color: color.faded(self.opacity),
            }),
            ContentKind::Image { name } => out.push(DrawCommand::Image {
                name: name.clone(),
                bounds,
                opacity: self.opacity,
            }),
            ContentKind::ProgressBar { image, progress } => {
                let clip = Bounds::from_origin_and_size(
                    bounds.min,
                    Size::new(bounds.width() * progress.clamp(0.0, 1.0), bounds.height()),
                );
                out.push(DrawCommand::ProgressBar {
                    image: image.clone(),
                    bounds,
                    clip,
                    opacity: self.opacity,
                });
            }
            // Buttons draw themselves with their tint and pressed state
            ContentKind::Button { .. } => {}
        }
    }
}

/// Action button at the bottom of a popup.
#[derive(Debug)]
pub struct PopupButton {
    item: PopupItem,
    color: Color,
    pressable: Pressable,
}

impl PopupButton {
    pub fn label(&self) -> &str {
        match &self.item.kind {
            ContentKind::Button { label, .. } => label,
            _ => "",
        }
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn item(&self) -> &PopupItem {
        &self.item
    }

    pub fn frame(&self) -> Bounds {
        self.item.frame()
    }

    pub fn is_pressed(&self) -> bool {
        self.pressable.is_pressed()
    }

    fn draw(&self, out: &mut Vec<DrawCommand>) {
        if let ContentKind::Button { label, font_size } = &self.item.kind {
            out.push(DrawCommand::Button {
                label: label.clone(),
                font_size: font_size * self.item.transform.scale,
                bounds: self.frame(),
                color: self.color.faded(self.item.opacity),
                pressed: self.pressable.is_pressed(),
            });
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PopupPhase {
    Opening,
    Open,
    Closing,
    Closed,
}

/// Modal content container.
#[derive(Debug)]
pub struct Popup {
    viewport: Size,
    config: PopupConfig,
    screen_scale: f64,
    backdrop_level: f64,
    backdrop_tween: Option<Tween<f64>>,
    items: Vec<PopupItem>,
    buttons: Vec<PopupButton>,
    phase: PopupPhase,
    remaining: f64,
}

impl Popup {
    pub fn new(viewport: Size, config: &PopupConfig, screen_scale: f64) -> Self {
        Self {
            viewport,
            config: config.clone(),
            screen_scale,
            backdrop_level: 1.0,
            backdrop_tween: None,
            items: Vec::new(),
            buttons: Vec::new(),
            phase: PopupPhase::Open,
            remaining: 0.0,
        }
    }

    pub fn from_config(config: &GuideConfig) -> Self {
        Self::new(config.viewport, &config.popup, config.screen_scale())
    }

    pub fn viewport(&self) -> Size {
        self.viewport
    }

    pub fn screen_scale(&self) -> f64 {
        self.screen_scale
    }

    pub fn config(&self) -> &PopupConfig {
        &self.config
    }

    pub fn phase(&self) -> PopupPhase {
        self.phase
    }

    /// Opening or open: the popup takes input.
    pub fn is_active(&self) -> bool {
        matches!(self.phase, PopupPhase::Opening | PopupPhase::Open)
    }

    pub fn is_closed(&self) -> bool {
        self.phase == PopupPhase::Closed
    }

    pub fn items(&self) -> &[PopupItem] {
        &self.items
    }

    pub fn item_mut(&mut self, index: usize) -> Option<&mut PopupItem> {
        self.items.get_mut(index)
    }

    pub fn buttons(&self) -> &[PopupButton] {
        &self.buttons
    }

    /// Current backdrop alpha.
    pub fn backdrop_alpha(&self) -> u8 {
        (self.config.backdrop_opacity as f64 * self.backdrop_level).round() as u8
    }

    /// Adds wrapped text to the stack. Returns its item index.
    pub fn add_text(
        &mut self,
        text: &str,
        font_size: f64,
        color: Color,
        measure: &dyn ContentMeasure,
    ) -> usize {
        let max_width = self.viewport.width * self.config.text_width_fraction;
        let layout = measure.measure_text(text, font_size, max_width);
        let kind = ContentKind::Text {
            lines: layout.lines,
            font_size,
            color,
        };
        self.push_item(PopupItem::new(kind, layout.size, 1.0, true))
    }

    /// Adds an image to the stack at `scale`. Returns its item index.
    pub fn add_image(&mut self, name: &str, scale: f64, measure: &dyn ContentMeasure) -> usize {
        let size = measure.image_size(name);
        let kind = ContentKind::Image {
            name: name.to_string(),
        };
        self.push_item(PopupItem::new(kind, size, scale, true))
    }

    /// Adds any content to the stack with an explicit size.
    pub fn add_content(&mut self, kind: ContentKind, size: Size, scale: f64) -> usize {
        self.push_item(PopupItem::new(kind, size, scale, true))
    }

    /// Adds content pinned at `center` outside the vertical stack.
    pub fn add_overlay(&mut self, kind: ContentKind, size: Size, scale: f64, center: Point) -> usize {
        let mut item = PopupItem::new(kind, size, scale, false);
        item.place_home(center);
        self.items.push(item);
        self.items.len() - 1
    }

    /// Adds a button below the content; `on_release` runs when it is tapped.
    pub fn add_button(
        &mut self,
        label: &str,
        color: Color,
        on_release: impl FnMut() + Send + 'static,
    ) -> usize {
        let kind = ContentKind::Button {
            label: label.to_string(),
            font_size: self.config.button_font_size,
        };
        self.buttons.push(PopupButton {
            item: PopupItem::new(kind, self.config.button_size, self.screen_scale, true),
            color,
            pressable: Pressable::new().on_release(on_release),
        });
        self.layout();
        self.buttons.len() - 1
    }

    /// Vertical gap between (and around) the stacked elements.
    ///
    /// Negative when the content is taller than the viewport.
    pub fn layout_gap(&self) -> f64 {
        let stacked: Vec<&PopupItem> = self.stacked().collect();
        let total: f64 = stacked.iter().map(|item| item.scaled_height()).sum();
        (self.viewport.height - total) / (stacked.len() + 1) as f64
    }

    /// Laid-out frames of the stacked elements, top to bottom.
    pub fn stacked_frames(&self) -> Vec<Bounds> {
        self.stacked().map(PopupItem::home_frame).collect()
    }

    /// Starts the opening transition. With an `origin`, content grows out of that point.
    pub fn open(&mut self, origin: Option<Point>) {
        let duration = self.config.open_duration;
        let easing = EasingFunction::EaseOutCubic;

        self.phase = PopupPhase::Opening;
        self.remaining = duration;
        self.backdrop_level = 0.0;
        self.backdrop_tween = Some(Tween::with_easing(0.0, 1.0, duration, easing));

        for item in self.all_items_mut() {
            let (from, from_scale) = match origin {
                Some(origin) => (origin, 0.0),
                None => (item.home, item.home_scale),
            };
            item.animate(
                Tween::with_easing(from, item.home, duration, easing),
                Tween::with_easing(from_scale, item.home_scale, duration, easing),
                Tween::with_easing(0.0, 1.0, duration, easing),
            );
        }
    }

    /// Starts the closing transition; the popup is closed once it finishes.
    pub fn close(&mut self) {
        if matches!(self.phase, PopupPhase::Closing | PopupPhase::Closed) {
            return;
        }

        let duration = self.config.close_duration;
        let slide = self.viewport.height * self.config.close_slide_fraction;
        let easing = EasingFunction::EaseIn { rate: 2.0 };

        self.phase = PopupPhase::Closing;
        self.remaining = duration;
        self.backdrop_tween = Some(Tween::with_easing(self.backdrop_level, 0.0, duration, easing));

        for button in &mut self.buttons {
            button.pressable.set_enabled(false);
        }
        for item in self.all_items_mut() {
            let position = item.transform.position;
            let scale = item.transform.scale;
            item.animate(
                Tween::with_easing(position, position.add(&Point::new(0.0, slide)), duration, easing),
                Tween::new(scale, scale, duration),
                Tween::with_easing(item.opacity, 0.0, duration, easing),
            );
        }
    }

    /// Tears the popup down without a transition.
    pub fn dismiss(&mut self) {
        self.phase = PopupPhase::Closed;
        self.backdrop_tween = None;
        self.backdrop_level = 0.0;
        for button in &mut self.buttons {
            button.pressable.set_enabled(false);
        }
    }

    pub fn update(&mut self, dt: f64) {
        if self.phase == PopupPhase::Closed {
            return;
        }

        if let Some(tween) = self.backdrop_tween.as_mut() {
            self.backdrop_level = tween.tick(dt);
            if tween.is_finished() {
                self.backdrop_tween = None;
            }
        }
        for item in self.all_items_mut() {
            item.update(dt);
        }

        if matches!(self.phase, PopupPhase::Opening | PopupPhase::Closing) {
            self.remaining -= dt;
            if self.remaining <= 0.0 {
                self.phase = match self.phase {
                    PopupPhase::Opening => PopupPhase::Open,
                    _ => {
                        log::debug!("popup closed");
                        PopupPhase::Closed
                    }
                };
            }
        }
    }

    pub fn draw(&self, out: &mut Vec<DrawCommand>) {
        if self.is_closed() {
            return;
        }

        out.push(DrawCommand::Rect {
            bounds: Bounds::from_origin_and_size(Point::ZERO, self.viewport),
            color: Color::BLACK.with_alpha(self.backdrop_alpha()),
        });
        for item in &self.items {
            item.draw(out);
        }
        for button in &self.buttons {
            button.draw(out);
        }
    }

    fn push_item(&mut self, item: PopupItem) -> usize {
        self.items.push(item);
        self.layout();
        self.items.len() - 1
    }

    fn stacked(&self) -> impl Iterator<Item = &PopupItem> {
        self.items
            .iter()
            .filter(|item| item.laid_out)
            .chain(self.buttons.iter().map(|button| &button.item))
    }

    fn all_items_mut(&mut self) -> impl Iterator<Item = &mut PopupItem> {
        self.items
            .iter_mut()
            .chain(self.buttons.iter_mut().map(|button| &mut button.item))
    }

    fn layout(&mut self) {
        let gap = self.layout_gap();
        let width = self.viewport.width;
        let mut cursor = self.viewport.height;

        let stacked = self
            .items
            .iter_mut()
            .filter(|item| item.laid_out)
            .chain(self.buttons.iter_mut().map(|button| &mut button.item));

        for item in stacked {
            let size = item.transform.content_size.scaled(item.home_scale);
            let anchor = item.transform.anchor;
            let top = cursor - gap;
            item.place_home(Point::new(
                width / 2.0 + size.width * (anchor.x - 0.5),
                top - size.height * (1.0 - anchor.y),
            ));
            cursor = top - size.height;
        }
    }
}

/// An active popup takes every touch; only its buttons react to them.
impl TouchResponder for Popup {
    fn handles_touch_at(&self, _point: Point) -> bool {
        self.is_active()
    }

    fn on_began(&mut self, touch: &Touch) -> EventHandled {
        if !self.is_active() {
            return EventHandled::NotHandled;
        }
        for button in &mut self.buttons {
            let inside = button.frame().contains(&touch.location);
            button.pressable.began(touch.id, inside);
        }
        EventHandled::Handled
    }

    fn on_moved(&mut self, touch: &Touch) {
        for button in &mut self.buttons {
            let inside = button.frame().contains(&touch.location);
            button.pressable.moved(touch.id, inside);
        }
    }

    fn on_ended(&mut self, touch: &Touch) {
        for button in &mut self.buttons {
            let inside = button.frame().contains(&touch.location);
            if button.pressable.ended(touch.id, inside) {
                log::debug!("popup button {} tapped", button.label());
            }
        }
    }

    fn on_cancelled(&mut self, touch: &Touch) {
        for button in &mut self.buttons {
            button.pressable.cancelled(touch.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    const EPS: f64 = 1e-9;

    fn popup() -> Popup {
        Popup::new(Size::new(1000.0, 2000.0), &PopupConfig::default(), 1.0)
    }

    fn settle(popup: &mut Popup) {
        for _ in 0..60 {
            popup.update(1.0 / 60.0);
        }
    }

    #[test]
    fn test_wrapping() {
        let measure = ApproxMeasure::new();
        // 10 pt font: 5 pt per char, 4 chars per line at width 20
        let layout = measure.measure_text("ab cd efghij", 10.0, 20.0);
        assert_eq!(layout.lines, vec!["ab", "cd", "efghij"]);
        assert_eq!(layout.size.width, 30.0);
        assert!((layout.size.height - 36.0).abs() < EPS);

        let layout = measure.measure_text("one\ntwo", 10.0, 1000.0);
        assert_eq!(layout.lines.len(), 2);
    }

    #[test]
    fn test_equal_gaps() {
        let mut popup = popup();
        popup.add_content(ContentKind::Image { name: "a".into() }, Size::new(400.0, 300.0), 1.0);
        popup.add_content(ContentKind::Image { name: "b".into() }, Size::new(200.0, 100.0), 2.0);
        popup.add_button("Close", Color::RED, || {});

        // 300 + 200 + 160 = 660 tall, 4 gaps
        let gap = popup.layout_gap();
        assert!((gap - (2000.0 - 660.0) / 4.0).abs() < EPS);

        let frames = popup.stacked_frames();
        assert!((2000.0 - frames[0].max.y - gap).abs() < EPS);
        assert!((frames[0].min.y - frames[1].max.y - gap).abs() < EPS);
        assert!((frames[1].min.y - frames[2].max.y - gap).abs() < EPS);
        assert!((frames[2].min.y - gap).abs() < EPS);
        for frame in frames {
            assert!((frame.center().x - 500.0).abs() < EPS);
        }
    }

    #[test]
    fn test_overlays_stay_out_of_the_stack() {
        let mut popup = popup();
        let bar = popup.add_overlay(
            ContentKind::ProgressBar {
                image: "bar.png".into(),
                progress: 0.0,
            },
            Size::new(100.0, 10.0),
            1.0,
            Point::new(500.0, 1000.0),
        );
        assert!(popup.stacked_frames().is_empty());
        assert_eq!(popup.layout_gap(), 2000.0);
        assert_eq!(popup.items()[bar].frame().center(), Point::new(500.0, 1000.0));
    }

    #[test]
    fn test_open_from_origin() {
        let mut popup = popup();
        popup.add_content(ContentKind::Image { name: "a".into() }, Size::new(400.0, 300.0), 1.0);
        let home = popup.stacked_frames()[0];

        popup.open(Some(Point::new(100.0, 100.0)));
        assert_eq!(popup.phase(), PopupPhase::Opening);
        assert_eq!(popup.backdrop_alpha(), 0);
        assert_eq!(popup.items()[0].transform().scale, 0.0);
        assert_eq!(popup.items()[0].transform().position, Point::new(100.0, 100.0));

        settle(&mut popup);
        assert_eq!(popup.phase(), PopupPhase::Open);
        assert_eq!(popup.backdrop_alpha(), 220);
        assert_eq!(popup.items()[0].frame(), home);
        assert_eq!(popup.items()[0].opacity(), 1.0);
    }

    #[test]
    fn test_close_fades_and_slides_up() {
        let mut popup = popup();
        popup.add_content(ContentKind::Image { name: "a".into() }, Size::new(400.0, 300.0), 1.0);
        popup.open(None);
        settle(&mut popup);
        let open_y = popup.items()[0].transform().position.y;

        popup.close();
        assert!(!popup.is_active());
        popup.update(0.1);
        assert!(popup.items()[0].transform().position.y > open_y);

        settle(&mut popup);
        assert!(popup.is_closed());
        assert_eq!(popup.items()[0].opacity(), 0.0);
        assert!((popup.items()[0].transform().position.y - (open_y + 500.0)).abs() < EPS);

        let mut out = Vec::new();
        popup.draw(&mut out);
        assert!(out.is_empty());
    }

    #[test]
    fn test_swallows_touches_and_routes_to_buttons() {
        let taps = Arc::new(AtomicUsize::new(0));
        let counter = taps.clone();
        let mut popup = popup();
        popup.add_button("Close", Color::RED, move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        let center = popup.buttons()[0].frame().center();

        // Touches outside any button are still taken
        assert!(popup.on_began(&Touch::at(1, 5.0, 5.0)).is_handled());
        popup.on_ended(&Touch::at(1, 5.0, 5.0));
        assert_eq!(taps.load(Ordering::SeqCst), 0);

        assert!(popup.on_began(&Touch::new(2, center)).is_handled());
        assert!(popup.buttons()[0].is_pressed());
        popup.on_ended(&Touch::new(2, center));
        assert_eq!(taps.load(Ordering::SeqCst), 1);

        popup.close();
        assert!(!popup.handles_touch_at(center));
        assert!(!popup.on_began(&Touch::new(3, center)).is_handled());
    }
}
