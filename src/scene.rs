//! The guide's single screen.
//!
//! At startup the scene shows a loading popup and assembles the map tiles one
//! per frame. Once the surface is complete it builds the map controller with
//! a marker per landmark. From then on touches are routed by z-order: an open
//! popup takes everything, then markers, then the map itself.

use crate::command::{command_channel, send_on_release, CommandReceiver, CommandSender, GuideCommand};
use crate::core::{bounds::Bounds, config::GuideConfig, geo::Point};
use crate::input::{
    forward_touch, offer_touch, EventHandled, Touch, TouchDispatcher, TouchPhase, TouchResponder,
};
use crate::landmarks::{
    build_landmark_popup, links::open_directions, marker::THUMBNAIL_SCALE, LandmarkMarker,
    LandmarkRegistry, LinkLauncher,
};
use crate::map::MapController;
use crate::rendering::{DrawCommand, Renderer};
use crate::spatial::Culling;
use crate::tiles::{AssemblyOutcome, AssemblyStatus, AsyncAssembly, TileSource, TiledImage};
use crate::ui::{loading_popup, ApproxMeasure, ContentMeasure, PopupPresenter};
use crate::Result;

pub const MAP_Z_ORDER: i32 = 0;
pub const MARKER_Z_ORDER: i32 = 1;
pub const POPUP_Z_ORDER: i32 = 100;

/// Touch-handling parts of the scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResponderKey {
    Popup,
    Marker(usize),
    Map,
}

pub struct GuideScene {
    config: GuideConfig,
    registry: LandmarkRegistry,
    tiles: Box<dyn TileSource>,
    launcher: Box<dyn LinkLauncher>,
    measure: Box<dyn ContentMeasure>,
    assembly: Option<AsyncAssembly>,
    surface: Option<TiledImage>,
    map: Option<MapController>,
    failure: Option<String>,
    presenter: PopupPresenter,
    dispatcher: TouchDispatcher<ResponderKey>,
    commands: CommandSender,
    pending: CommandReceiver,
}

impl GuideScene {
    /// Sets up the scene and starts loading the map tiles behind a loading popup.
    pub fn new(
        config: GuideConfig,
        registry: LandmarkRegistry,
        tiles: Box<dyn TileSource>,
        launcher: Box<dyn LinkLauncher>,
    ) -> Result<Self> {
        config.validate()?;
        let assembly = AsyncAssembly::new(config.tiles.clone())?;
        let (commands, pending) = command_channel();

        let mut presenter = PopupPresenter::new();
        presenter.show(loading_popup(&config), None);

        let mut dispatcher = TouchDispatcher::new();
        dispatcher.register(ResponderKey::Popup, POPUP_Z_ORDER, true);

        log::info!(
            "guide scene {}x{} with {} landmarks",
            config.viewport.width,
            config.viewport.height,
            registry.len()
        );

        Ok(Self {
            config,
            registry,
            tiles,
            launcher,
            measure: Box::new(ApproxMeasure::new()),
            assembly: Some(assembly),
            surface: None,
            map: None,
            failure: None,
            presenter,
            dispatcher,
            commands,
            pending,
        })
    }

    /// Replaces the text and image measuring used for popups.
    pub fn with_measure(mut self, measure: Box<dyn ContentMeasure>) -> Self {
        self.measure = measure;
        self
    }

    pub fn config(&self) -> &GuideConfig {
        &self.config
    }

    pub fn registry(&self) -> &LandmarkRegistry {
        &self.registry
    }

    pub fn map(&self) -> Option<&MapController> {
        self.map.as_ref()
    }

    pub fn map_mut(&mut self) -> Option<&mut MapController> {
        self.map.as_mut()
    }

    pub fn surface(&self) -> Option<&TiledImage> {
        self.surface.as_ref()
    }

    pub fn presenter(&self) -> &PopupPresenter {
        &self.presenter
    }

    pub fn dispatcher(&self) -> &TouchDispatcher<ResponderKey> {
        &self.dispatcher
    }

    pub fn is_loading(&self) -> bool {
        self.assembly.is_some()
    }

    pub fn assembly_status(&self) -> Option<&AssemblyStatus> {
        self.assembly.as_ref().map(AsyncAssembly::status)
    }

    /// Name of the tile that stopped the map from loading.
    pub fn failure(&self) -> Option<&str> {
        self.failure.as_deref()
    }

    /// Sender for queuing commands from outside the scene.
    pub fn commands(&self) -> CommandSender {
        self.commands.clone()
    }

    /// Advances loading and animations by `dt` seconds.
    pub fn update(&mut self, dt: f64) {
        let outcome = match self.assembly.as_mut() {
            Some(assembly) => assembly.tick(dt, &*self.tiles, &mut self.presenter),
            None => None,
        };
        match outcome {
            Some(AssemblyOutcome::Completed { .. }) => self.finish_loading(),
            Some(AssemblyOutcome::Failed { missing }) => {
                log::error!("map could not be loaded: tile {} is missing", missing);
                self.assembly = None;
                self.failure = Some(missing);
            }
            None => {}
        }

        if let Some(map) = self.map.as_mut() {
            map.update(dt);
        }
        self.presenter.update(dt);
        self.process_commands();
    }

    pub fn handle_touch(&mut self, phase: TouchPhase, touch: Touch) -> EventHandled {
        let Self {
            dispatcher,
            map,
            presenter,
            ..
        } = self;

        let handled = match phase {
            TouchPhase::Began => dispatcher.begin(&touch, |key, touch| {
                match responder(key, touch, map, presenter) {
                    Some((responder, touch)) => offer_touch(responder, &touch),
                    None => EventHandled::NotHandled,
                }
            }),
            _ => dispatcher.route(phase, &touch, |key, touch| {
                if let Some((responder, touch)) = responder(key, touch, map, presenter) {
                    forward_touch(responder, phase, &touch);
                }
            }),
        };

        self.process_commands();
        handled
    }

    pub fn touch_began(&mut self, touch: Touch) -> EventHandled {
        self.handle_touch(TouchPhase::Began, touch)
    }

    pub fn touch_moved(&mut self, touch: Touch) -> EventHandled {
        self.handle_touch(TouchPhase::Moved, touch)
    }

    pub fn touch_ended(&mut self, touch: Touch) -> EventHandled {
        self.handle_touch(TouchPhase::Ended, touch)
    }

    pub fn touch_cancelled(&mut self, touch: Touch) -> EventHandled {
        self.handle_touch(TouchPhase::Cancelled, touch)
    }

    /// Carries out queued commands.
    pub fn process_commands(&mut self) {
        while let Ok(command) = self.pending.try_recv() {
            log::debug!("command {:?}", command);
            match command {
                GuideCommand::ShowLandmark(index) => self.show_landmark(index),
                GuideCommand::ClosePopup => self.presenter.close(),
                GuideCommand::OpenDirections(address) => {
                    open_directions(&mut *self.launcher, &address);
                }
                GuideCommand::OpenUrl(url) => {
                    if !self.launcher.open_url(&url) {
                        log::warn!("could not open {}", url);
                    }
                }
            }
        }
    }

    /// Opens the detail popup of a landmark, flying out of its marker.
    pub fn show_landmark(&mut self, index: usize) {
        let Some(placement) = self.registry.get(index) else {
            log::warn!("no landmark at index {}", index);
            return;
        };
        let popup = build_landmark_popup(
            &placement.landmark,
            &self.config,
            &*self.measure,
            &self.commands,
        );
        let origin = self
            .map
            .as_ref()
            .and_then(|map| map.marker_screen_position(index));
        log::info!("showing {}", placement.landmark.name);
        self.presenter.show(popup, origin);
    }

    /// Everything to draw this frame, back to front.
    pub fn draw_list(&self) -> Vec<DrawCommand> {
        let mut out = Vec::new();
        let screen = Culling::viewport_bounds(self.config.viewport);

        if let (Some(surface), Some(map)) = (&self.surface, &self.map) {
            let transform = map.transform();
            for tile in surface.visible_tiles(transform, self.config.viewport) {
                out.push(DrawCommand::Tile {
                    name: tile.name.clone(),
                    bounds: Culling::to_screen(transform, &tile.bounds()),
                });
            }

            let mut markers: Vec<&LandmarkMarker> = map.markers().iter().collect();
            markers.sort_by_key(|marker| marker.z_order());
            for marker in markers {
                let bounds = Culling::to_screen(transform, &marker.local_bounds());
                if !Culling::aabb_intersects(&screen, &bounds) {
                    continue;
                }
                out.push(DrawCommand::Marker {
                    thumbnail: marker.thumbnail().to_string(),
                    thumbnail_bounds: Bounds::from_center_and_size(
                        bounds.center(),
                        bounds.size().scaled(THUMBNAIL_SCALE),
                    ),
                    bounds,
                    pressed: marker.is_pressed(),
                });
            }
        }

        self.presenter.draw(&mut out);
        out
    }

    pub fn render(&self, renderer: &mut dyn Renderer) {
        renderer.render(self.config.viewport, &self.draw_list());
    }

    fn finish_loading(&mut self) {
        let Some(surface) = self.assembly.take().and_then(|mut a| a.take_image()) else {
            return;
        };

        let mut map = MapController::new(surface.size(), &self.config);
        for (index, placement) in self.registry.placements().iter().enumerate() {
            let marker = LandmarkMarker::new(index, placement, surface.size(), &self.config)
                .on_release(send_on_release(&self.commands, GuideCommand::ShowLandmark(index)));
            map.add_marker(marker);
            self.dispatcher
                .register(ResponderKey::Marker(index), MARKER_Z_ORDER, false);
        }
        self.dispatcher.register(ResponderKey::Map, MAP_Z_ORDER, false);

        log::info!(
            "map ready: {}x{} with {} markers",
            surface.size().width,
            surface.size().height,
            map.markers().len()
        );
        self.map = Some(map);
        self.surface = Some(surface);
    }
}

/// Resolves a key to its responder, with the touch converted into that
/// responder's space. Markers work in map-local units.
fn responder<'a>(
    key: ResponderKey,
    touch: &Touch,
    map: &'a mut Option<MapController>,
    presenter: &'a mut PopupPresenter,
) -> Option<(&'a mut dyn TouchResponder, Touch)> {
    match key {
        ResponderKey::Popup => Some((presenter as &mut dyn TouchResponder, *touch)),
        ResponderKey::Map => map
            .as_mut()
            .map(|map| (map as &mut dyn TouchResponder, *touch)),
        ResponderKey::Marker(index) => {
            let map = map.as_mut()?;
            let local = Touch::new(touch.id, map.screen_to_surface(touch.location));
            let marker = map.markers_mut().get_mut(index)?;
            Some((marker as &mut dyn TouchResponder, local))
        }
    }
}

impl std::fmt::Debug for GuideScene {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GuideScene")
            .field("config", &self.config)
            .field("landmarks", &self.registry.len())
            .field("assembly", &self.assembly)
            .field("map", &self.map)
            .field("failure", &self.failure)
            .field("presenter", &self.presenter)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geo::Size;
    use crate::landmarks::LoggingLauncher;
    use crate::tiles::MemoryTileSource;

    fn scene_with(source: MemoryTileSource) -> GuideScene {
        let mut config = GuideConfig::for_viewport(Size::new(768.0, 1024.0));
        config.tiles.columns = 2;
        config.tiles.rows = 2;
        GuideScene::new(
            config,
            LandmarkRegistry::new_york().clone(),
            Box::new(source),
            Box::new(LoggingLauncher::default()),
        )
        .unwrap()
    }

    fn run(scene: &mut GuideScene, frames: usize) {
        for _ in 0..frames {
            scene.update(1.0 / 60.0);
        }
    }

    #[test]
    fn test_loading_then_map() {
        let source =
            MemoryTileSource::uniform_grid("newYorkMap", ".png", 2, 2, Size::new(1024.0, 1024.0));
        let mut scene = scene_with(source);
        assert!(scene.is_loading());
        assert!(scene.presenter().has_active());

        // The loading popup swallows touches while tiles load
        assert!(scene.touch_began(Touch::at(1, 10.0, 10.0)).is_handled());
        assert_eq!(scene.dispatcher().claimants(1), &[ResponderKey::Popup]);
        scene.touch_ended(Touch::at(1, 10.0, 10.0));

        run(&mut scene, 10);
        assert!(!scene.is_loading());
        assert!(!scene.presenter().has_active());
        let map = scene.map().unwrap();
        assert_eq!(map.markers().len(), 24);
        assert_eq!(scene.surface().unwrap().size(), Size::new(2048.0, 2048.0));
        assert!(scene.dispatcher().is_registered(ResponderKey::Map));
    }

    #[test]
    fn test_missing_tile_leaves_no_map() {
        let mut source =
            MemoryTileSource::uniform_grid("newYorkMap", ".png", 2, 2, Size::new(1024.0, 1024.0));
        source.remove("newYorkMap1x1.png");
        let mut scene = scene_with(source);

        run(&mut scene, 10);
        assert_eq!(scene.failure(), Some("newYorkMap1x1.png"));
        assert!(scene.map().is_none());
        assert!(!scene.presenter().has_active());
        assert!(scene.draw_list().is_empty());
        assert!(!scene.touch_began(Touch::at(1, 10.0, 10.0)).is_handled());
    }

    #[test]
    fn test_draw_list_culls_tiles() {
        let source =
            MemoryTileSource::uniform_grid("newYorkMap", ".png", 2, 2, Size::new(1024.0, 1024.0));
        let mut scene = scene_with(source);
        run(&mut scene, 60);

        let tiles = scene
            .draw_list()
            .iter()
            .filter(|c| matches!(c, DrawCommand::Tile { .. }))
            .count();
        // Zoomed in around the center every tile touches the viewport
        assert_eq!(tiles, 4);

        // Push the map far to the right so only its left column remains visible
        let map = scene.map_mut().unwrap();
        let scale = map.scale();
        let frame = map.transform().frame();
        map.set_view(
            Point::new(map.position().x - frame.min.x - 1100.0 * scale, map.position().y),
            scale,
        );
        let tiles: Vec<String> = scene
            .draw_list()
            .into_iter()
            .filter_map(|c| match c {
                DrawCommand::Tile { name, .. } => Some(name),
                _ => None,
            })
            .collect();
        assert_eq!(tiles, vec!["newYorkMap1x0.png", "newYorkMap1x1.png"]);
    }
}
