//! Recording backend with no GPU behind it
//!
//! Implements every collaborator contract against a shared event log, so a
//! whole frame can run on the CPU and be inspected afterwards: which
//! targets were bound, which uniforms each program received, what was drawn
//! and in what order. The entity and terrain doubles apply the currently
//! loaded clip plane on the CPU, making clip behavior observable without a
//! rasterizer.
//!
//! Used by the integration tests and the demo application; also suitable
//! for CI environments without a display.

use crate::config::ShaderConfig;
use crate::foundation::math::{create_trans_matrix, Mat4, Vec3};
use crate::render::api::{
    DisplaySurface, EntityRenderer, GpuProgram, OffscreenTarget, RenderDevice, SkyboxRenderer,
    TerrainRenderer, TextureHandle, UniformLocation, WaterRenderer,
};
use crate::render::shader::{BasicShader, ClipPlane};
use crate::render::water_fbo::WaterFboPair;
use crate::render::{BackendResult, RendererSet};
use crate::scene::{Entity, LightBatch, Skybox, Terrain, WaterBody};
use std::cell::RefCell;
use std::collections::HashMap;
use std::path::Path;
use std::rc::Rc;

/// Value carried by a recorded uniform load
#[derive(Debug, Clone, PartialEq)]
pub enum UniformValue {
    /// 4x4 matrix uniform
    Mat4(Mat4),
    /// 3-component vector uniform
    Vec3(Vec3),
    /// Scalar uniform
    F32(f32),
    /// Boolean uniform
    Bool(bool),
}

/// Object kind a draw event refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectKind {
    /// Entity draw
    Entity,
    /// Terrain tile draw
    Terrain,
    /// Water tile draw
    Water,
    /// Skybox draw
    Skybox,
}

/// One step of a recorded frame, in issue order
#[derive(Debug, Clone, PartialEq)]
pub enum FrameEvent {
    /// Current target cleared to a color
    Cleared {
        /// Clear color
        color: Vec3,
    },
    /// Program linked successfully
    ProgramLinked {
        /// Program label (vertex source file stem)
        program: String,
    },
    /// Program activated
    ProgramActivated {
        /// Program label
        program: String,
    },
    /// Program deactivated
    ProgramDeactivated {
        /// Program label
        program: String,
    },
    /// Uniform load applied to a declared uniform
    UniformLoaded {
        /// Program label
        program: String,
        /// Uniform name
        name: String,
        /// Loaded value
        value: UniformValue,
    },
    /// Off-screen target bound
    TargetBound {
        /// Color attachment of the bound target
        texture: TextureHandle,
    },
    /// Off-screen target unbound, default target restored
    TargetUnbound {
        /// Color attachment of the released target
        texture: TextureHandle,
    },
    /// Shared material bound for a group
    MaterialBound {
        /// Object kind
        kind: ObjectKind,
        /// Material key
        material: String,
    },
    /// Shared material released
    MaterialUnbound {
        /// Object kind
        kind: ObjectKind,
    },
    /// Water pass received both off-screen attachments
    WaterInputsBound {
        /// Reflection color attachment
        reflection: TextureHandle,
        /// Refraction color attachment
        refraction: TextureHandle,
    },
    /// Object drawn
    Drawn {
        /// Object kind
        kind: ObjectKind,
        /// Object position
        position: Vec3,
    },
    /// Object discarded by the active clip plane
    Culled {
        /// Object kind
        kind: ObjectKind,
        /// Object position
        position: Vec3,
    },
    /// Frame presented
    Presented,
    /// Frame timing updated
    FrameTimingUpdated,
}

/// State shared by every collaborator of one headless backend
#[derive(Default)]
struct HeadlessState {
    events: Vec<FrameEvent>,
    active_clip: Option<ClipPlane>,
}

impl HeadlessState {
    fn push(&mut self, event: FrameEvent) {
        self.events.push(event);
    }
}

type SharedState = Rc<RefCell<HeadlessState>>;

/// Factory for a matched set of recording collaborators.
///
/// All collaborators created from one backend share a single event log;
/// [`take_events`](Self::take_events) drains it for inspection.
pub struct HeadlessBackend {
    state: SharedState,
    resolution: (u32, u32),
}

impl HeadlessBackend {
    /// Create a backend reporting the given display resolution
    pub fn new(resolution: (u32, u32)) -> Self {
        Self {
            state: Rc::new(RefCell::new(HeadlessState::default())),
            resolution,
        }
    }

    /// Recording device collaborator
    pub fn device(&self) -> Box<dyn RenderDevice> {
        Box::new(HeadlessDevice {
            state: Rc::clone(&self.state),
            next_texture: 0,
        })
    }

    /// Recording display collaborator
    pub fn display(&self) -> Box<dyn DisplaySurface> {
        Box::new(HeadlessDisplay {
            state: Rc::clone(&self.state),
            resolution: self.resolution,
        })
    }

    /// The full set of recording renderer collaborators
    pub fn renderers(&self) -> RendererSet {
        RendererSet {
            entity: Box::new(HeadlessEntityRenderer {
                state: Rc::clone(&self.state),
            }),
            terrain: Box::new(HeadlessTerrainRenderer {
                state: Rc::clone(&self.state),
            }),
            water: Box::new(HeadlessWaterRenderer {
                state: Rc::clone(&self.state),
            }),
            skybox: Box::new(HeadlessSkyboxRenderer {
                state: Rc::clone(&self.state),
            }),
        }
    }

    /// Drain and return every event recorded so far, in issue order
    pub fn take_events(&self) -> Vec<FrameEvent> {
        std::mem::take(&mut self.state.borrow_mut().events)
    }
}

struct HeadlessDevice {
    state: SharedState,
    next_texture: u64,
}

impl RenderDevice for HeadlessDevice {
    fn create_program(&mut self, config: &ShaderConfig) -> BackendResult<Box<dyn GpuProgram>> {
        let label = Path::new(&config.vertex_shader_path)
            .file_stem()
            .map_or_else(|| config.vertex_shader_path.clone(), |stem| {
                stem.to_string_lossy().into_owned()
            });
        Ok(Box::new(HeadlessProgram {
            state: Rc::clone(&self.state),
            label,
            locations: RefCell::new(HashMap::new()),
            names: RefCell::new(HashMap::new()),
        }))
    }

    fn create_offscreen_target(
        &mut self,
        _width: u32,
        _height: u32,
    ) -> BackendResult<Box<dyn OffscreenTarget>> {
        let texture = TextureHandle(self.next_texture);
        self.next_texture += 1;
        Ok(Box::new(HeadlessTarget {
            state: Rc::clone(&self.state),
            texture,
        }))
    }

    fn clear(&mut self, color: Vec3) {
        self.state.borrow_mut().push(FrameEvent::Cleared { color });
    }
}

struct HeadlessProgram {
    state: SharedState,
    label: String,
    locations: RefCell<HashMap<String, i32>>,
    names: RefCell<HashMap<i32, String>>,
}

impl HeadlessProgram {
    fn record_uniform(&self, location: UniformLocation, value: UniformValue) {
        if !location.is_used() {
            return;
        }
        let name = self
            .names
            .borrow()
            .get(&location.0)
            .cloned()
            .unwrap_or_default();

        // Mirror the clip uniforms into shared state so the renderer
        // doubles can emulate GPU-side clipping.
        let mut state = self.state.borrow_mut();
        match (&name[..], &value) {
            ("clipHeight", UniformValue::F32(height)) => {
                let keep_above = state
                    .active_clip
                    .map_or(true, |clip| clip.keep_above);
                state.active_clip = Some(ClipPlane {
                    height: *height,
                    keep_above,
                });
            }
            ("clipPositive", UniformValue::Bool(keep_above)) => {
                let height = state.active_clip.map_or(0.0, |clip| clip.height);
                state.active_clip = Some(ClipPlane {
                    height,
                    keep_above: *keep_above,
                });
            }
            _ => {}
        }
        state.push(FrameEvent::UniformLoaded {
            program: self.label.clone(),
            name,
            value,
        });
    }
}

impl GpuProgram for HeadlessProgram {
    fn bind_attribute(&mut self, _slot: u32, _name: &str) {}

    fn link(&mut self) -> BackendResult<()> {
        self.state.borrow_mut().push(FrameEvent::ProgramLinked {
            program: self.label.clone(),
        });
        Ok(())
    }

    fn uniform_location(&self, name: &str) -> UniformLocation {
        let mut locations = self.locations.borrow_mut();
        let next = locations.len() as i32;
        let location = *locations.entry(name.to_string()).or_insert(next);
        self.names.borrow_mut().insert(location, name.to_string());
        UniformLocation(location)
    }

    fn activate(&mut self) {
        self.state.borrow_mut().push(FrameEvent::ProgramActivated {
            program: self.label.clone(),
        });
    }

    fn deactivate(&mut self) {
        self.state
            .borrow_mut()
            .push(FrameEvent::ProgramDeactivated {
                program: self.label.clone(),
            });
    }

    fn set_mat4(&mut self, location: UniformLocation, value: &Mat4) {
        self.record_uniform(location, UniformValue::Mat4(*value));
    }

    fn set_vec3(&mut self, location: UniformLocation, value: Vec3) {
        self.record_uniform(location, UniformValue::Vec3(value));
    }

    fn set_f32(&mut self, location: UniformLocation, value: f32) {
        self.record_uniform(location, UniformValue::F32(value));
    }

    fn set_bool(&mut self, location: UniformLocation, value: bool) {
        self.record_uniform(location, UniformValue::Bool(value));
    }
}

struct HeadlessTarget {
    state: SharedState,
    texture: TextureHandle,
}

impl OffscreenTarget for HeadlessTarget {
    fn bind(&mut self) {
        self.state.borrow_mut().push(FrameEvent::TargetBound {
            texture: self.texture,
        });
    }

    fn unbind(&mut self) {
        self.state.borrow_mut().push(FrameEvent::TargetUnbound {
            texture: self.texture,
        });
    }

    fn color_texture(&self) -> TextureHandle {
        self.texture
    }
}

struct HeadlessDisplay {
    state: SharedState,
    resolution: (u32, u32),
}

impl DisplaySurface for HeadlessDisplay {
    fn resolution(&self) -> (u32, u32) {
        self.resolution
    }

    fn present(&mut self) -> BackendResult<()> {
        self.state.borrow_mut().push(FrameEvent::Presented);
        Ok(())
    }

    fn update_frame_timing(&mut self) {
        self.state.borrow_mut().push(FrameEvent::FrameTimingUpdated);
    }
}

struct HeadlessEntityRenderer {
    state: SharedState,
}

impl EntityRenderer for HeadlessEntityRenderer {
    fn bind_material(&mut self, exemplar: &Entity, _shader: &mut BasicShader) {
        self.state.borrow_mut().push(FrameEvent::MaterialBound {
            kind: ObjectKind::Entity,
            material: exemplar.material.clone(),
        });
    }

    fn render(&mut self, entity: &Entity, lights: &LightBatch, shader: &mut BasicShader) {
        let clip = self.state.borrow().active_clip;
        if let Some(clip) = clip {
            if !clip.retains(entity.position.y) {
                self.state.borrow_mut().push(FrameEvent::Culled {
                    kind: ObjectKind::Entity,
                    position: entity.position,
                });
                return;
            }
        }
        shader.load_trans_matrix(&entity.transform_matrix());
        for light in lights.lights() {
            shader.load_light(light);
        }
        self.state.borrow_mut().push(FrameEvent::Drawn {
            kind: ObjectKind::Entity,
            position: entity.position,
        });
    }

    fn unbind_material(&mut self) {
        self.state.borrow_mut().push(FrameEvent::MaterialUnbound {
            kind: ObjectKind::Entity,
        });
    }
}

struct HeadlessTerrainRenderer {
    state: SharedState,
}

impl TerrainRenderer for HeadlessTerrainRenderer {
    fn bind_material(&mut self, exemplar: &Terrain, _shader: &mut BasicShader) {
        self.state.borrow_mut().push(FrameEvent::MaterialBound {
            kind: ObjectKind::Terrain,
            material: exemplar.material.clone(),
        });
    }

    fn render(&mut self, terrain: &Terrain, lights: &LightBatch, shader: &mut BasicShader) {
        let clip = self.state.borrow().active_clip;
        if let Some(clip) = clip {
            if !clip.retains(terrain.position.y) {
                self.state.borrow_mut().push(FrameEvent::Culled {
                    kind: ObjectKind::Terrain,
                    position: terrain.position,
                });
                return;
            }
        }
        shader.load_trans_matrix(&terrain.transform_matrix());
        for light in lights.lights() {
            shader.load_light(light);
        }
        self.state.borrow_mut().push(FrameEvent::Drawn {
            kind: ObjectKind::Terrain,
            position: terrain.position,
        });
    }

    fn unbind_material(&mut self) {
        self.state.borrow_mut().push(FrameEvent::MaterialUnbound {
            kind: ObjectKind::Terrain,
        });
    }
}

struct HeadlessWaterRenderer {
    state: SharedState,
}

impl WaterRenderer for HeadlessWaterRenderer {
    fn bind_material(
        &mut self,
        _exemplar: &WaterBody,
        fbo: &WaterFboPair,
        _shader: &mut BasicShader,
    ) {
        let mut state = self.state.borrow_mut();
        state.push(FrameEvent::MaterialBound {
            kind: ObjectKind::Water,
            material: "water".to_string(),
        });
        state.push(FrameEvent::WaterInputsBound {
            reflection: fbo.reflection_texture(),
            refraction: fbo.refraction_texture(),
        });
    }

    fn render(&mut self, water: &WaterBody, lights: &LightBatch, shader: &mut BasicShader) {
        let transform = create_trans_matrix(water.position, Vec3::zeros(), water.size, false);
        shader.load_trans_matrix(&transform);
        for light in lights.lights() {
            shader.load_light(light);
        }
        self.state.borrow_mut().push(FrameEvent::Drawn {
            kind: ObjectKind::Water,
            position: water.position,
        });
    }

    fn unbind_material(&mut self) {
        self.state.borrow_mut().push(FrameEvent::MaterialUnbound {
            kind: ObjectKind::Water,
        });
    }
}

struct HeadlessSkyboxRenderer {
    state: SharedState,
}

impl SkyboxRenderer for HeadlessSkyboxRenderer {
    fn render(&mut self, skybox: &Skybox, _shader: &mut BasicShader) {
        let mut state = self.state.borrow_mut();
        state.push(FrameEvent::MaterialBound {
            kind: ObjectKind::Skybox,
            material: skybox.material.clone(),
        });
        state.push(FrameEvent::Drawn {
            kind: ObjectKind::Skybox,
            position: Vec3::zeros(),
        });
        state.push(FrameEvent::MaterialUnbound {
            kind: ObjectKind::Skybox,
        });
    }
}
