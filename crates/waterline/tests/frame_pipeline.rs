//! End-to-end frame pipeline tests against the headless backend
//!
//! Each test runs real frames through [`FrameRenderer`] and inspects the
//! recorded event stream: pass order, target bind pairing, clip uniform
//! values, CPU-emulated clip culling, and the per-frame bookkeeping.

use std::cell::RefCell;
use std::rc::Rc;

use waterline::config::RendererConfig;
use waterline::foundation::math::Vec3;
use waterline::render::backends::headless::{
    FrameEvent, HeadlessBackend, ObjectKind, UniformValue,
};
use waterline::render::shader::NO_CLIP_HEIGHT;
use waterline::render::{FrameRenderer, RenderError};
use waterline::scene::{Entity, Light, Scene, StaticScene, Terrain, WaterBody};

const RESOLUTION: (u32, u32) = (1280, 720);

fn renderer_with(backend: &HeadlessBackend) -> FrameRenderer {
    FrameRenderer::new(
        backend.device(),
        backend.display(),
        backend.renderers(),
        RendererConfig::default(),
    )
    .expect("headless initialization cannot fail")
}

/// Lake scene: water at height zero, one entity above and one below it.
fn lake_scene() -> StaticScene {
    StaticScene::new(Vec3::new(0.4, 0.6, 0.9), 0.0)
        .add_light(Light::white(Vec3::new(100.0, 200.0, 100.0)))
        .add_entity(Entity::new(Vec3::new(0.0, 5.0, -20.0), "rock"))
        .add_entity(Entity::new(Vec3::new(3.0, -5.0, -20.0), "rock"))
        .add_terrain(Terrain::new(Vec3::new(0.0, -1.0, -20.0), "grass"))
        .add_water(WaterBody::new(Vec3::new(0.0, 0.0, -20.0), 60.0))
}

fn bind_scene(renderer: &mut FrameRenderer, scene: StaticScene) {
    renderer.set_scene(Some(Rc::new(RefCell::new(scene))));
}

/// Slices one frame's events into the spans rendered to each off-screen
/// target plus the span after the final unbind (main + water passes).
fn pass_spans(events: &[FrameEvent]) -> (Vec<&FrameEvent>, Vec<&FrameEvent>, Vec<&FrameEvent>) {
    let mut bounds = Vec::new();
    for (index, event) in events.iter().enumerate() {
        if matches!(
            event,
            FrameEvent::TargetBound { .. } | FrameEvent::TargetUnbound { .. }
        ) {
            bounds.push(index);
        }
    }
    assert_eq!(bounds.len(), 4, "expected two bind/unbind pairs per frame");

    let first = events[bounds[0] + 1..bounds[1]].iter().collect();
    let second = events[bounds[2] + 1..bounds[3]].iter().collect();
    let rest = events[bounds[3] + 1..].iter().collect();
    (first, second, rest)
}

fn drawn_heights(span: &[&FrameEvent], kind: ObjectKind) -> Vec<f32> {
    span.iter()
        .filter_map(|event| match event {
            FrameEvent::Drawn {
                kind: event_kind,
                position,
            } if *event_kind == kind => Some(position.y),
            _ => None,
        })
        .collect()
}

fn clip_heights_for(events: &[FrameEvent], program: &str) -> Vec<f32> {
    events
        .iter()
        .filter_map(|event| match event {
            FrameEvent::UniformLoaded {
                program: loaded_program,
                name,
                value: UniformValue::F32(height),
            } if loaded_program == program && name == "clipHeight" => Some(*height),
            _ => None,
        })
        .collect()
}

#[test]
fn frame_binds_refraction_then_reflection_then_screen() {
    let backend = HeadlessBackend::new(RESOLUTION);
    let mut renderer = renderer_with(&backend);
    bind_scene(&mut renderer, lake_scene());
    backend.take_events();

    renderer.render().unwrap();
    let events = backend.take_events();

    let reflection = renderer.water_fbo().reflection_texture();
    let refraction = renderer.water_fbo().refraction_texture();
    let target_events: Vec<&FrameEvent> = events
        .iter()
        .filter(|event| {
            matches!(
                event,
                FrameEvent::TargetBound { .. } | FrameEvent::TargetUnbound { .. }
            )
        })
        .collect();

    assert_eq!(
        target_events,
        vec![
            &FrameEvent::TargetBound {
                texture: refraction
            },
            &FrameEvent::TargetUnbound {
                texture: refraction
            },
            &FrameEvent::TargetBound {
                texture: reflection
            },
            &FrameEvent::TargetUnbound {
                texture: reflection
            },
        ]
    );
}

#[test]
fn frame_ends_with_present_then_timing() {
    let backend = HeadlessBackend::new(RESOLUTION);
    let mut renderer = renderer_with(&backend);
    bind_scene(&mut renderer, lake_scene());
    backend.take_events();

    renderer.render().unwrap();
    let events = backend.take_events();

    let tail: Vec<&FrameEvent> = events.iter().rev().take(2).collect();
    assert_eq!(
        tail,
        vec![&FrameEvent::FrameTimingUpdated, &FrameEvent::Presented]
    );
}

#[test]
fn clip_planes_carry_the_seam_margin() {
    let backend = HeadlessBackend::new(RESOLUTION);
    let mut renderer = renderer_with(&backend);
    // Water height 1.5 with the default margin of 2.0
    bind_scene(
        &mut renderer,
        StaticScene::new(Vec3::zeros(), 1.5).add_water(WaterBody::new(Vec3::zeros(), 10.0)),
    );
    backend.take_events();

    renderer.render().unwrap();
    let events = backend.take_events();

    // The entity program loads one clip plane per opaque pass, in pass order
    assert_eq!(
        clip_heights_for(&events, "entity"),
        vec![1.5 + 2.0, 1.5 - 2.0, NO_CLIP_HEIGHT]
    );
}

#[test]
fn clip_sides_match_each_pass() {
    let backend = HeadlessBackend::new(RESOLUTION);
    let mut renderer = renderer_with(&backend);
    bind_scene(&mut renderer, lake_scene());
    backend.take_events();

    renderer.render().unwrap();
    let events = backend.take_events();

    let sides: Vec<bool> = events
        .iter()
        .filter_map(|event| match event {
            FrameEvent::UniformLoaded {
                program,
                name,
                value: UniformValue::Bool(keep_above),
            } if program == "entity" && name == "clipPositive" => Some(*keep_above),
            _ => None,
        })
        .collect();

    // Refraction keeps below, reflection keeps above, main keeps everything
    assert_eq!(sides, vec![false, true, true]);
}

#[test]
fn clipping_culls_the_wrong_half_space_per_pass() {
    let backend = HeadlessBackend::new(RESOLUTION);
    let mut renderer = renderer_with(&backend);
    bind_scene(&mut renderer, lake_scene());
    backend.take_events();

    renderer.render().unwrap();
    let events = backend.take_events();
    let (refraction, reflection, rest) = pass_spans(&events);

    // Refraction sees the underwater entity only, reflection the one above
    assert_eq!(drawn_heights(&refraction, ObjectKind::Entity), vec![-5.0]);
    assert_eq!(drawn_heights(&reflection, ObjectKind::Entity), vec![5.0]);

    // The main pass draws both
    let mut main_heights = drawn_heights(&rest, ObjectKind::Entity);
    main_heights.sort_by(f32::total_cmp);
    assert_eq!(main_heights, vec![-5.0, 5.0]);
}

#[test]
fn terrain_straddling_the_plane_survives_both_margins() {
    let backend = HeadlessBackend::new(RESOLUTION);
    let mut renderer = renderer_with(&backend);
    // Terrain at y = -1 is inside both the +2 and -2 margin bands
    bind_scene(&mut renderer, lake_scene());
    backend.take_events();

    renderer.render().unwrap();
    let events = backend.take_events();
    let (refraction, reflection, _) = pass_spans(&events);

    assert_eq!(drawn_heights(&refraction, ObjectKind::Terrain), vec![-1.0]);
    assert_eq!(drawn_heights(&reflection, ObjectKind::Terrain), vec![-1.0]);
}

#[test]
fn water_pass_receives_both_attachments_and_draws_after_opaque() {
    let backend = HeadlessBackend::new(RESOLUTION);
    let mut renderer = renderer_with(&backend);
    bind_scene(&mut renderer, lake_scene());
    backend.take_events();

    renderer.render().unwrap();
    let events = backend.take_events();

    let inputs = events
        .iter()
        .find_map(|event| match event {
            FrameEvent::WaterInputsBound {
                reflection,
                refraction,
            } => Some((*reflection, *refraction)),
            _ => None,
        })
        .expect("water pass must bind its inputs");
    assert_eq!(inputs.0, renderer.water_fbo().reflection_texture());
    assert_eq!(inputs.1, renderer.water_fbo().refraction_texture());

    // The water draw is the last draw of the frame
    let last_draw = events
        .iter()
        .rev()
        .find_map(|event| match event {
            FrameEvent::Drawn { kind, .. } => Some(*kind),
            _ => None,
        })
        .expect("frame must draw something");
    assert_eq!(last_draw, ObjectKind::Water);
}

#[test]
fn skybox_draws_in_every_opaque_pass() {
    let backend = HeadlessBackend::new(RESOLUTION);
    let mut renderer = renderer_with(&backend);
    bind_scene(&mut renderer, lake_scene());
    backend.take_events();

    renderer.render().unwrap();
    let events = backend.take_events();

    let skybox_draws = events
        .iter()
        .filter(|event| {
            matches!(
                event,
                FrameEvent::Drawn {
                    kind: ObjectKind::Skybox,
                    ..
                }
            )
        })
        .count();
    assert_eq!(skybox_draws, 3);
}

#[test]
fn render_without_scene_is_an_error_and_touches_nothing() {
    let backend = HeadlessBackend::new(RESOLUTION);
    let mut renderer = renderer_with(&backend);
    backend.take_events();

    let result = renderer.render();
    assert!(matches!(result, Err(RenderError::NoSceneBound)));
    assert!(backend.take_events().is_empty());
    assert_eq!(renderer.frame_count(), 0);
}

#[test]
fn projection_loads_into_every_program_at_initialization() {
    let backend = HeadlessBackend::new(RESOLUTION);
    let _renderer = renderer_with(&backend);
    let events = backend.take_events();

    for program in ["entity", "terrain", "water", "skybox"] {
        let loaded = events.iter().any(|event| {
            matches!(
                event,
                FrameEvent::UniformLoaded {
                    program: loaded_program,
                    name,
                    value: UniformValue::Mat4(_),
                } if loaded_program == program && name == "projMatrix"
            )
        });
        assert!(loaded, "projection missing for the {program} program");
    }
}

#[test]
fn scene_update_runs_once_per_frame_after_the_passes() {
    struct CountingScene {
        inner: StaticScene,
        updates: Rc<RefCell<u32>>,
    }

    impl Scene for CountingScene {
        fn sky_color(&self) -> Vec3 {
            self.inner.sky_color()
        }
        fn water_height(&self) -> f32 {
            self.inner.water_height()
        }
        fn lights(&self) -> &[Light] {
            self.inner.lights()
        }
        fn entity_groups(&self) -> &waterline::scene::MaterialGroups<Entity> {
            self.inner.entity_groups()
        }
        fn terrain_groups(&self) -> &waterline::scene::MaterialGroups<Terrain> {
            self.inner.terrain_groups()
        }
        fn skybox(&self) -> &waterline::scene::Skybox {
            self.inner.skybox()
        }
        fn water_bodies(&self) -> &[WaterBody] {
            self.inner.water_bodies()
        }
        fn update(&mut self) {
            *self.updates.borrow_mut() += 1;
        }
    }

    let backend = HeadlessBackend::new(RESOLUTION);
    let mut renderer = renderer_with(&backend);
    let updates = Rc::new(RefCell::new(0));
    renderer.set_scene(Some(Rc::new(RefCell::new(CountingScene {
        inner: lake_scene(),
        updates: Rc::clone(&updates),
    }))));

    renderer.render().unwrap();
    renderer.render().unwrap();
    renderer.render().unwrap();

    assert_eq!(*updates.borrow(), 3);
    assert_eq!(renderer.frame_count(), 3);
}

#[test]
fn empty_material_groups_bind_nothing() {
    let backend = HeadlessBackend::new(RESOLUTION);
    let mut renderer = renderer_with(&backend);
    // No entities, no terrain, no water
    bind_scene(&mut renderer, StaticScene::new(Vec3::zeros(), 0.0));
    backend.take_events();

    renderer.render().unwrap();
    let events = backend.take_events();

    let material_binds = events
        .iter()
        .filter(|event| {
            matches!(
                event,
                FrameEvent::MaterialBound {
                    kind: ObjectKind::Entity | ObjectKind::Terrain | ObjectKind::Water,
                    ..
                }
            )
        })
        .count();
    assert_eq!(material_binds, 0);
}

#[test]
fn material_groups_bind_once_per_group_in_key_order() {
    let backend = HeadlessBackend::new(RESOLUTION);
    let mut renderer = renderer_with(&backend);
    let scene = StaticScene::new(Vec3::zeros(), -100.0)
        .add_entity(Entity::new(Vec3::new(0.0, 1.0, 0.0), "rock"))
        .add_entity(Entity::new(Vec3::new(1.0, 1.0, 0.0), "rock"))
        .add_entity(Entity::new(Vec3::new(2.0, 1.0, 0.0), "fern"));
    bind_scene(&mut renderer, scene);
    backend.take_events();

    renderer.render().unwrap();
    let events = backend.take_events();
    let (_, _, main_pass) = pass_spans(&events);

    let entity_materials: Vec<&str> = main_pass
        .iter()
        .filter_map(|event| match event {
            FrameEvent::MaterialBound {
                kind: ObjectKind::Entity,
                material,
            } => Some(material.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(entity_materials, ["fern", "rock"]);
}

#[test]
fn mirrored_camera_matrix_differs_only_in_the_reflection_pass() {
    let backend = HeadlessBackend::new(RESOLUTION);
    let mut renderer = renderer_with(&backend);
    renderer.set_camera(waterline::render::CameraState::new(
        Vec3::new(0.0, 10.0, 0.0),
        Vec3::new(0.3, 0.0, 0.0),
    ));
    bind_scene(&mut renderer, lake_scene());
    backend.take_events();

    renderer.render().unwrap();
    let events = backend.take_events();

    let camera_matrices: Vec<&UniformValue> = events
        .iter()
        .filter_map(|event| match event {
            FrameEvent::UniformLoaded {
                program,
                name,
                value,
            } if program == "entity" && name == "cameraMatrix" => Some(value),
            _ => None,
        })
        .collect();

    // Passes: refraction, reflection, main. Refraction and main share the
    // real camera, the reflection pass uses the mirrored one
    assert_eq!(camera_matrices.len(), 3);
    assert_eq!(camera_matrices[0], camera_matrices[2]);
    assert_ne!(camera_matrices[0], camera_matrices[1]);
}
