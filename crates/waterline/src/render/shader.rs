//! Shader uniform contract
//!
//! Every pass drives its GPU program through [`BasicShader`], which pins
//! down the attribute slots and uniform names the programs must declare:
//! attribute 0 is always `position`, attributes 1 and 2 (`textureCoord`,
//! `norm`) exist only for variants with textured, lit vertices. Uniform
//! names are part of the GPU contract: `transMatrix`, `cameraMatrix`,
//! `projMatrix`, `skyCol` always; `lightPos`/`lightCol` for lit variants;
//! `clipHeight`/`clipPositive` for clip-capable variants.
//!
//! Uniform locations are resolved exactly once at construction, right after
//! linking, and cached for the shader's lifetime.

use crate::foundation::math::{Mat4, Vec3};
use crate::render::api::{GpuProgram, UniformLocation};
use crate::render::BackendResult;
use crate::scene::Light;

/// Clip height loaded when clipping is disabled; low enough that the
/// above-half-space keeps all geometry a scene can hold.
pub const NO_CLIP_HEIGHT: f32 = -1.0e9;

/// Horizontal clip plane: a height plus the side that stays visible.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClipPlane {
    /// Plane height in world units
    pub height: f32,
    /// True when the visible half-space is above the height
    pub keep_above: bool,
}

impl ClipPlane {
    /// Plane discarding everything below `height`
    pub fn keep_above(height: f32) -> Self {
        Self {
            height,
            keep_above: true,
        }
    }

    /// Plane discarding everything above `height`
    pub fn keep_below(height: f32) -> Self {
        Self {
            height,
            keep_above: false,
        }
    }

    /// Whether geometry at the given height survives this plane
    pub fn retains(&self, height: f32) -> bool {
        if self.keep_above {
            height >= self.height
        } else {
            height <= self.height
        }
    }
}

/// Capabilities a shader variant declares.
///
/// Resolved at construction; a capability left off makes the corresponding
/// loads silent no-ops so callers never need to branch per variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ShaderFeatures {
    /// Variant declares `lightPos`/`lightCol` uniforms
    pub lighting: bool,
    /// Variant declares `clipHeight`/`clipPositive` uniforms
    pub clip_plane: bool,
    /// Vertex format carries texture coordinates and normals (slots 1, 2)
    pub tex_coords_and_normals: bool,
}

impl ShaderFeatures {
    /// No optional capabilities
    pub fn none() -> Self {
        Self::default()
    }

    /// Enable the lighting uniform group
    pub fn with_lighting(mut self) -> Self {
        self.lighting = true;
        self
    }

    /// Enable the clip-plane uniform group
    pub fn with_clip_plane(mut self) -> Self {
        self.clip_plane = true;
        self
    }

    /// Enable the texture-coordinate and normal vertex attributes
    pub fn with_tex_coords_and_normals(mut self) -> Self {
        self.tex_coords_and_normals = true;
        self
    }
}

/// Uniform locations cached at construction
#[derive(Debug, Clone, Copy)]
struct UniformLocations {
    trans_matrix: UniformLocation,
    camera_matrix: UniformLocation,
    proj_matrix: UniformLocation,
    sky_color: UniformLocation,
    light_pos: UniformLocation,
    light_col: UniformLocation,
    clip_height: UniformLocation,
    clip_positive: UniformLocation,
}

impl UniformLocations {
    fn resolve(program: &dyn GpuProgram, features: ShaderFeatures) -> Self {
        let conditional = |enabled: bool, name: &str| {
            if enabled {
                program.uniform_location(name)
            } else {
                UniformLocation::UNUSED
            }
        };

        Self {
            trans_matrix: program.uniform_location("transMatrix"),
            camera_matrix: program.uniform_location("cameraMatrix"),
            proj_matrix: program.uniform_location("projMatrix"),
            sky_color: program.uniform_location("skyCol"),
            light_pos: conditional(features.lighting, "lightPos"),
            light_col: conditional(features.lighting, "lightCol"),
            clip_height: conditional(features.clip_plane, "clipHeight"),
            clip_positive: conditional(features.clip_plane, "clipPositive"),
        }
    }
}

/// A linked GPU program together with its capability record and cached
/// uniform locations.
///
/// All uniform loads between [`start`](Self::start) and
/// [`stop`](Self::stop) apply to this program; callers must not interleave
/// loads from two shaders without starting the second.
pub struct BasicShader {
    program: Box<dyn GpuProgram>,
    features: ShaderFeatures,
    locations: UniformLocations,
}

impl BasicShader {
    /// Bind attributes, link the program, and resolve uniform locations.
    pub fn new(mut program: Box<dyn GpuProgram>, features: ShaderFeatures) -> BackendResult<Self> {
        program.bind_attribute(0, "position");
        if features.tex_coords_and_normals {
            program.bind_attribute(1, "textureCoord");
            program.bind_attribute(2, "norm");
        }
        program.link()?;

        let locations = UniformLocations::resolve(&*program, features);
        Ok(Self {
            program,
            features,
            locations,
        })
    }

    /// Capability record this shader was constructed with
    pub fn features(&self) -> ShaderFeatures {
        self.features
    }

    /// Activate the program; subsequent uniform loads apply to it
    pub fn start(&mut self) {
        self.program.activate();
    }

    /// Deactivate the program
    pub fn stop(&mut self) {
        self.program.deactivate();
    }

    /// Load the per-object transform matrix
    pub fn load_trans_matrix(&mut self, matrix: &Mat4) {
        self.program.set_mat4(self.locations.trans_matrix, matrix);
    }

    /// Load the camera (inverse view) matrix
    pub fn load_camera_matrix(&mut self, matrix: &Mat4) {
        self.program.set_mat4(self.locations.camera_matrix, matrix);
    }

    /// Load the session-constant projection matrix
    pub fn load_proj_matrix(&mut self, matrix: &Mat4) {
        self.program.set_mat4(self.locations.proj_matrix, matrix);
    }

    /// Load one light; no-op for variants without the lighting capability
    pub fn load_light(&mut self, light: &Light) {
        if !self.features.lighting {
            return;
        }
        self.program.set_vec3(self.locations.light_pos, light.position);
        self.program.set_vec3(self.locations.light_col, light.color);
    }

    /// Load the sky color
    pub fn load_sky_color(&mut self, color: Vec3) {
        self.program.set_vec3(self.locations.sky_color, color);
    }

    /// Load the clip plane, or the keep-everything plane for `None`.
    ///
    /// Callable unconditionally: variants without the clip capability
    /// ignore the call entirely.
    pub fn load_clipping(&mut self, clip: Option<ClipPlane>) {
        if !self.features.clip_plane {
            return;
        }
        let plane = clip.unwrap_or(ClipPlane {
            height: NO_CLIP_HEIGHT,
            keep_above: true,
        });
        self.program.set_f32(self.locations.clip_height, plane.height);
        self.program
            .set_bool(self.locations.clip_positive, plane.keep_above);
    }
}
