//! # Rendering System
//!
//! Frame-composition core: a fixed pipeline of render passes that combines
//! the opaque scene (entities, terrain, skybox) with a reflective and
//! refractive water surface produced via render-to-texture.
//!
//! ## Architecture
//!
//! - [`FrameRenderer`]: the pass orchestrator, owning camera matrix
//!   derivation, clip-plane bookkeeping, and the per-frame pass sequence
//! - [`shader::BasicShader`]: the uniform contract each GPU program obeys
//! - [`water_fbo::WaterFboPair`]: the two off-screen targets the water
//!   pass samples
//! - [`api`]: the collaborator contracts the application implements
//!   (device, display, per-object-kind renderers)
//!
//! ## Pass sequence
//!
//! Each frame runs strictly in order on the calling thread: refraction
//! pass (real camera, clipped to below the water surface), reflection pass
//! (mirrored camera, clipped to above), main opaque pass to the screen
//! (no clipping), then the water pass sampling both off-screen
//! attachments. All per-frame state is derived fresh; nothing carries over
//! between frames.

pub mod api;
pub mod backends;
pub mod camera;
pub mod shader;
pub mod water_fbo;

pub use api::{
    DisplaySurface, EntityRenderer, GpuProgram, OffscreenTarget, RenderDevice, SkyboxRenderer,
    TerrainRenderer, TextureHandle, UniformLocation, WaterRenderer,
};
pub use camera::CameraState;
pub use shader::{BasicShader, ClipPlane, ShaderFeatures};
pub use water_fbo::WaterFboPair;

use crate::config::RendererConfig;
use crate::foundation::math::{create_proj_matrix, utils, Mat4};
use crate::scene::{LightBatch, Scene};
use std::cell::RefCell;
use std::rc::Rc;
use thiserror::Error;

/// Rendering errors
#[derive(Error, Debug)]
pub enum RenderError {
    /// Render was invoked with no current scene; surfaced as an error so
    /// embedders can decide whether it is fatal
    #[error("no scene is bound to the renderer")]
    NoSceneBound,

    /// A collaborator failed during renderer construction
    #[error("renderer initialization failed: {0}")]
    InitializationFailed(String),

    /// A shader program failed to link
    #[error("shader program failed to link: {0}")]
    ShaderLinkFailed(String),

    /// Backend-reported failure outside initialization
    #[error("backend error: {0}")]
    BackendError(String),
}

/// Result type for backend operations
pub type BackendResult<T> = Result<T, RenderError>;

/// Shared handle to the current scene.
///
/// The application owns the scene; the renderer holds this handle only to
/// read it once per frame and invoke its update hook. Swapping scenes
/// between frames is safe; swapping mid-frame is not supported.
pub type SceneHandle = Rc<RefCell<dyn Scene>>;

/// The four per-object-kind renderer collaborators
pub struct RendererSet {
    /// Entity renderer
    pub entity: Box<dyn EntityRenderer>,
    /// Terrain renderer
    pub terrain: Box<dyn TerrainRenderer>,
    /// Water renderer
    pub water: Box<dyn WaterRenderer>,
    /// Skybox renderer
    pub skybox: Box<dyn SkyboxRenderer>,
}

/// Multi-pass frame orchestrator.
///
/// Owns every render resource of a session (the four shader variants, the
/// water frame-buffer pair, the collaborators) plus the session-constant
/// projection matrix and the current camera and scene. One `render` call
/// performs all passes back-to-back on the calling thread.
///
/// There is no process-wide state: multiple independent renderers can
/// coexist, each with its own device and scene.
pub struct FrameRenderer {
    // Declaration order is teardown order: targets and shaders release
    // before the collaborators that created them.
    water_fbo: WaterFboPair,
    entity_shader: BasicShader,
    terrain_shader: BasicShader,
    water_shader: BasicShader,
    skybox_shader: BasicShader,
    renderers: RendererSet,
    display: Box<dyn DisplaySurface>,
    device: Box<dyn RenderDevice>,

    projection: Mat4,
    camera: CameraState,
    scene: Option<SceneHandle>,
    config: RendererConfig,
    frame_count: u64,
}

impl FrameRenderer {
    /// Build a renderer from its collaborators.
    ///
    /// Compiles the four shader variants, computes the projection matrix
    /// from the display resolution and configured field of view, loads it
    /// into every shader, and creates the water frame-buffer pair.
    /// Collaborator failures propagate without retry.
    pub fn new(
        mut device: Box<dyn RenderDevice>,
        display: Box<dyn DisplaySurface>,
        renderers: RendererSet,
        config: RendererConfig,
    ) -> Result<Self, RenderError> {
        let (width, height) = display.resolution();
        log::info!("Initializing frame renderer at {}x{}", width, height);

        let lit_textured = ShaderFeatures::none()
            .with_lighting()
            .with_clip_plane()
            .with_tex_coords_and_normals();
        let mut entity_shader =
            BasicShader::new(device.create_program(&config.shaders.entity)?, lit_textured)?;
        let mut terrain_shader =
            BasicShader::new(device.create_program(&config.shaders.terrain)?, lit_textured)?;
        let mut water_shader = BasicShader::new(
            device.create_program(&config.shaders.water)?,
            ShaderFeatures::none()
                .with_lighting()
                .with_tex_coords_and_normals(),
        )?;
        let mut skybox_shader = BasicShader::new(
            device.create_program(&config.shaders.skybox)?,
            ShaderFeatures::none().with_clip_plane(),
        )?;

        // The projection depends only on session constants; compute it once
        // and share it with every program.
        let aspect_ratio = width as f32 / height as f32;
        let projection = create_proj_matrix(
            aspect_ratio,
            utils::deg_to_rad(config.fov_degrees),
            config.z_near,
            config.z_far,
        );
        for shader in [
            &mut entity_shader,
            &mut terrain_shader,
            &mut water_shader,
            &mut skybox_shader,
        ] {
            shader.start();
            shader.load_proj_matrix(&projection);
            shader.stop();
        }

        let water_fbo = WaterFboPair::new(&mut *device, (width, height))?;

        Ok(Self {
            water_fbo,
            entity_shader,
            terrain_shader,
            water_shader,
            skybox_shader,
            renderers,
            display,
            device,
            projection,
            camera: CameraState::default(),
            scene: None,
            config,
            frame_count: 0,
        })
    }

    /// Bind a scene (or unbind with `None`).
    ///
    /// Only safe between frames; the bound scene is read by every
    /// subsequent `render` call until replaced.
    pub fn set_scene(&mut self, scene: Option<SceneHandle>) {
        log::debug!(
            "Scene {}",
            if scene.is_some() { "bound" } else { "unbound" }
        );
        self.scene = scene;
    }

    /// Whether a scene is currently bound
    pub fn has_scene(&self) -> bool {
        self.scene.is_some()
    }

    /// Snapshot the camera pose used by subsequent frames
    pub fn set_camera(&mut self, camera: CameraState) {
        self.camera = camera;
    }

    /// The camera pose in effect
    pub fn camera(&self) -> CameraState {
        self.camera
    }

    /// The session-constant projection matrix
    pub fn projection_matrix(&self) -> &Mat4 {
        &self.projection
    }

    /// The reflection/refraction frame-buffer pair
    pub fn water_fbo(&self) -> &WaterFboPair {
        &self.water_fbo
    }

    /// Number of frames rendered so far
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Render one complete frame.
    ///
    /// Runs the refraction, reflection, main opaque, and water passes in
    /// order, then invokes the scene's update hook, presents, and updates
    /// frame timing. Returns [`RenderError::NoSceneBound`] without touching
    /// the GPU when no scene is set.
    pub fn render(&mut self) -> Result<(), RenderError> {
        let scene = self.scene.clone().ok_or(RenderError::NoSceneBound)?;
        log::trace!("Rendering frame {}", self.frame_count);

        {
            let scene_ref = scene.borrow();
            let view: &dyn Scene = &*scene_ref;

            let water_height = view.water_height();
            let camera_matrix = camera::view_matrix(&self.camera);
            let reflection_matrix = camera::reflection_view_matrix(&self.camera, water_height);
            let lights = LightBatch::from_lights(view.lights());
            let margin = self.config.clip_margin;

            // Refraction: what is visible through the surface, from the
            // real camera, keeping only geometry below the plane.
            self.water_fbo.bind_refraction();
            self.render_opaque(
                view,
                &camera_matrix,
                &lights,
                Some(ClipPlane::keep_below(water_height + margin)),
            );
            self.water_fbo.unbind();

            // Reflection: the mirror image, from the mirrored camera,
            // keeping only geometry above the plane.
            self.water_fbo.bind_reflection();
            self.render_opaque(
                view,
                &reflection_matrix,
                &lights,
                Some(ClipPlane::keep_above(water_height - margin)),
            );
            self.water_fbo.unbind();

            // Main opaque pass to the screen, unclipped.
            self.render_opaque(view, &camera_matrix, &lights, None);

            self.render_water(view, &camera_matrix, &lights);
        }

        scene.borrow_mut().update();
        self.display.present()?;
        self.display.update_frame_timing();
        self.frame_count += 1;
        Ok(())
    }

    /// One opaque pass: entities, terrain, then skybox, grouped by
    /// material key so each shared material binds once per group.
    fn render_opaque(
        &mut self,
        scene: &dyn Scene,
        camera_matrix: &Mat4,
        lights: &LightBatch,
        clip: Option<ClipPlane>,
    ) {
        self.device.clear(scene.sky_color());

        Self::prepare_shader(&mut self.entity_shader, scene, camera_matrix, clip);
        for group in scene.entity_groups().values() {
            let Some(exemplar) = group.first() else {
                continue;
            };
            self.renderers
                .entity
                .bind_material(exemplar, &mut self.entity_shader);
            for entity in group {
                self.renderers
                    .entity
                    .render(entity, lights, &mut self.entity_shader);
            }
            self.renderers.entity.unbind_material();
        }
        self.entity_shader.stop();

        Self::prepare_shader(&mut self.terrain_shader, scene, camera_matrix, clip);
        for group in scene.terrain_groups().values() {
            let Some(exemplar) = group.first() else {
                continue;
            };
            self.renderers
                .terrain
                .bind_material(exemplar, &mut self.terrain_shader);
            for terrain in group {
                self.renderers
                    .terrain
                    .render(terrain, lights, &mut self.terrain_shader);
            }
            self.renderers.terrain.unbind_material();
        }
        self.terrain_shader.stop();

        Self::prepare_shader(&mut self.skybox_shader, scene, camera_matrix, clip);
        self.renderers
            .skybox
            .render(scene.skybox(), &mut self.skybox_shader);
        self.skybox_shader.stop();
    }

    /// The water pass: every water body, lit by the same light batch,
    /// sampling both off-screen color attachments.
    fn render_water(&mut self, scene: &dyn Scene, camera_matrix: &Mat4, lights: &LightBatch) {
        Self::prepare_shader(&mut self.water_shader, scene, camera_matrix, None);
        let bodies = scene.water_bodies();
        if let Some(exemplar) = bodies.first() {
            self.renderers
                .water
                .bind_material(exemplar, &self.water_fbo, &mut self.water_shader);
            for water in bodies {
                self.renderers
                    .water
                    .render(water, lights, &mut self.water_shader);
            }
            self.renderers.water.unbind_material();
        }
        self.water_shader.stop();
    }

    /// Activate a shader and load the per-pass uniforms every variant
    /// shares. The clip load is unconditional; variants without the
    /// capability ignore it.
    fn prepare_shader(
        shader: &mut BasicShader,
        scene: &dyn Scene,
        camera_matrix: &Mat4,
        clip: Option<ClipPlane>,
    ) {
        shader.start();
        shader.load_camera_matrix(camera_matrix);
        shader.load_sky_color(scene.sky_color());
        shader.load_clipping(clip);
    }
}
