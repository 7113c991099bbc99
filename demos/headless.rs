use nyguide::{
    core::geo::{Point, Size},
    input::Touch,
    landmarks::LoggingLauncher,
    rendering::NullRenderer,
    tiles::MemoryTileSource,
    GuideConfig, GuideScene, LandmarkRegistry,
};

const FRAME: f64 = 1.0 / 60.0;

/// Drives the guide without a window: loads the map, pans and pinches it,
/// then taps a landmark and works through its popup.
fn main() -> anyhow::Result<()> {
    #[cfg(feature = "debug")]
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    println!("🗽 nyguide headless example");
    println!("===========================");

    let config = GuideConfig::for_viewport(Size::new(768.0, 1024.0));
    let tiles = MemoryTileSource::uniform_grid(
        &config.tiles.base_name,
        &config.tiles.extension,
        config.tiles.columns,
        config.tiles.rows,
        Size::new(1024.0, 1024.0),
    );
    let mut scene = GuideScene::new(
        config,
        LandmarkRegistry::new_york().clone(),
        Box::new(tiles),
        Box::new(LoggingLauncher {
            accept_app_links: false,
        }),
    )?;
    let mut renderer = NullRenderer::default();

    // Assemble the surface, one tile per frame
    let mut frames = 0;
    while scene.is_loading() {
        scene.update(FRAME);
        scene.render(&mut renderer);
        frames += 1;
    }
    if let Some(missing) = scene.failure() {
        anyhow::bail!("map tile {} is missing", missing);
    }
    let surface = scene
        .surface()
        .ok_or_else(|| anyhow::anyhow!("no map surface after loading"))?;
    println!(
        "✅ Map assembled in {} frames: {}x{} from {} tiles",
        frames,
        surface.size().width,
        surface.size().height,
        surface.tile_count()
    );
    settle(&mut scene, &mut renderer, 30);

    // One-finger drag
    let map = scene.map().ok_or_else(|| anyhow::anyhow!("map not ready"))?;
    println!("\n🚀 Pan: starting at {:?} scale {:.3}", map.position(), map.scale());
    scene.touch_began(Touch::at(1, 300.0, 500.0));
    for step in 1..=10 {
        scene.touch_moved(Touch::at(1, 300.0 + 15.0 * step as f64, 500.0));
        scene.update(FRAME);
    }
    scene.touch_ended(Touch::at(1, 450.0, 500.0));
    settle(&mut scene, &mut renderer, 30);
    report(&scene);

    // Two-finger pinch outwards
    println!("\n🔍 Pinch:");
    scene.touch_began(Touch::at(1, 334.0, 512.0));
    scene.touch_began(Touch::at(2, 434.0, 512.0));
    for step in 1..=10 {
        let spread = 5.0 * step as f64;
        scene.touch_moved(Touch::at(1, 334.0 - spread, 512.0));
        scene.touch_moved(Touch::at(2, 434.0 + spread, 512.0));
        scene.update(FRAME);
    }
    scene.touch_ended(Touch::at(1, 284.0, 512.0));
    scene.touch_ended(Touch::at(2, 484.0, 512.0));
    settle(&mut scene, &mut renderer, 30);
    report(&scene);

    // Tap the first landmark that is on screen
    let map = scene.map().ok_or_else(|| anyhow::anyhow!("map not ready"))?;
    let viewport = scene.config().viewport;
    let target = (0..map.markers().len()).find_map(|index| {
        map.marker_screen_position(index)
            .filter(|p| p.x > 0.0 && p.y > 0.0 && p.x < viewport.width && p.y < viewport.height)
            .map(|p| (index, p))
    });
    let Some((index, at)) = target else {
        println!("\n⚠️ No landmark is visible");
        return Ok(());
    };
    let name = scene.map().map(|m| m.markers()[index].name().to_string());
    println!("\n📍 Tapping {} at ({:.0}, {:.0})", name.unwrap_or_default(), at.x, at.y);
    tap(&mut scene, at);
    settle(&mut scene, &mut renderer, 30);

    let labels: Vec<String> = scene
        .presenter()
        .active()
        .map(|popup| popup.buttons().iter().map(|b| b.label().to_string()).collect())
        .unwrap_or_default();
    println!("   Popup buttons: {:?}", labels);

    for label in ["Directions", "Close"] {
        let frame = scene.presenter().active().and_then(|popup| {
            popup
                .buttons()
                .iter()
                .find(|b| b.label() == label)
                .map(|b| b.frame().center())
        });
        if let Some(center) = frame {
            println!("   Pressing {}", label);
            tap(&mut scene, center);
            settle(&mut scene, &mut renderer, 30);
        }
    }

    println!("\n📊 Final state:");
    report(&scene);
    println!("   Popup open: {}", scene.presenter().has_active());
    println!(
        "   Rendered {} frames, {} draw commands",
        renderer.frames, renderer.commands
    );
    Ok(())
}

fn tap(scene: &mut GuideScene, at: Point) {
    scene.touch_began(Touch::new(9, at));
    scene.touch_ended(Touch::new(9, at));
}

fn settle(scene: &mut GuideScene, renderer: &mut NullRenderer, frames: usize) {
    for _ in 0..frames {
        scene.update(FRAME);
        scene.render(renderer);
    }
}

fn report(scene: &GuideScene) {
    if let Some(map) = scene.map() {
        println!(
            "   Position ({:.1}, {:.1}) scale {:.3} (limits {:.3}..{:.3})",
            map.position().x,
            map.position().y,
            map.scale(),
            map.limits().min,
            map.limits().max
        );
    }
}
