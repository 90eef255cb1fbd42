//! Lakeside demo: a small lake scene driven through the full pass pipeline
//! on the headless backend, logging what each frame did.

use std::cell::RefCell;
use std::rc::Rc;

use waterline::config::RendererConfig;
use waterline::foundation::math::Vec3;
use waterline::render::backends::headless::{FrameEvent, HeadlessBackend, ObjectKind};
use waterline::render::{CameraState, FrameRenderer, RenderError};
use waterline::scene::{Entity, Light, Skybox, StaticScene, Terrain, WaterBody};

const FRAMES: u64 = 60;

fn build_scene() -> StaticScene {
    StaticScene::new(Vec3::new(0.45, 0.62, 0.9), 0.0)
        .add_light(Light::new(
            Vec3::new(200.0, 400.0, 200.0),
            Vec3::new(1.0, 0.96, 0.9),
        ))
        .add_entity(Entity::new(Vec3::new(-8.0, 1.0, -30.0), "boulder"))
        .add_entity(Entity::new(Vec3::new(6.0, 0.5, -25.0), "boulder"))
        .add_entity(
            Entity::new(Vec3::new(0.0, 3.0, -40.0), "pine").with_scale(2.5),
        )
        .add_entity(Entity::new(Vec3::new(2.0, -4.0, -28.0), "boulder"))
        .add_terrain(Terrain::new(Vec3::new(0.0, -2.0, -30.0), "lakebed"))
        .add_terrain(Terrain::new(Vec3::new(-50.0, 1.0, -30.0), "shore"))
        .add_water(WaterBody::new(Vec3::new(0.0, 0.0, -30.0), 80.0))
        .with_skybox(Skybox::new("dusk"))
}

fn run() -> Result<(), RenderError> {
    let backend = HeadlessBackend::new((1280, 720));
    let mut renderer = FrameRenderer::new(
        backend.device(),
        backend.display(),
        backend.renderers(),
        RendererConfig::default(),
    )?;
    renderer.set_scene(Some(Rc::new(RefCell::new(build_scene()))));
    backend.take_events();

    for frame in 0..FRAMES {
        // Slow orbit above the lake, looking slightly down
        let angle = frame as f32 * 0.02;
        renderer.set_camera(CameraState::new(
            Vec3::new(angle.sin() * 12.0, 6.0, angle.cos() * 12.0 - 30.0),
            Vec3::new(0.25, angle, 0.0),
        ));
        renderer.render()?;

        let events = backend.take_events();
        let drawn = events
            .iter()
            .filter(|event| matches!(event, FrameEvent::Drawn { .. }))
            .count();
        let culled = events
            .iter()
            .filter(|event| matches!(event, FrameEvent::Culled { .. }))
            .count();
        let water_draws = events
            .iter()
            .filter(|event| {
                matches!(
                    event,
                    FrameEvent::Drawn {
                        kind: ObjectKind::Water,
                        ..
                    }
                )
            })
            .count();
        log::debug!(
            "Frame {frame}: {drawn} draws ({water_draws} water), {culled} clipped away"
        );
    }

    log::info!("Rendered {} frames", renderer.frame_count());
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(error) = run() {
        log::error!("Lakeside demo failed: {error}");
        std::process::exit(1);
    }
}
