//! Device-side traits: programs, render targets, and the display surface

use crate::config::ShaderConfig;
use crate::foundation::math::{Mat4, Vec3};
use crate::render::BackendResult;

/// Handle to a texture owned by the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub u64);

/// Resolved location of a uniform within a linked GPU program.
///
/// Resolving a name the program does not declare yields
/// [`UniformLocation::UNUSED`]; loading through an unused location is a
/// silent no-op on every backend, never an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UniformLocation(pub i32);

impl UniformLocation {
    /// Sentinel for uniforms the active program does not declare
    pub const UNUSED: UniformLocation = UniformLocation(-1);

    /// Whether this location refers to a declared uniform
    pub fn is_used(self) -> bool {
        self.0 >= 0
    }
}

/// A compiled-but-not-yet-linked GPU program.
///
/// The expected call sequence mirrors program setup on real graphics APIs:
/// bind vertex attribute slots, link once, then resolve uniform locations.
/// Uniform loads only apply while the program is activated.
pub trait GpuProgram {
    /// Bind a vertex attribute name to a slot; only valid before linking
    fn bind_attribute(&mut self, slot: u32, name: &str);

    /// Link and validate the program
    fn link(&mut self) -> BackendResult<()>;

    /// Resolve a uniform name; returns [`UniformLocation::UNUSED`] for
    /// names the program does not declare
    fn uniform_location(&self, name: &str) -> UniformLocation;

    /// Make this the active program for subsequent uniform loads and draws
    fn activate(&mut self);

    /// Deactivate this program
    fn deactivate(&mut self);

    /// Load a 4x4 matrix uniform
    fn set_mat4(&mut self, location: UniformLocation, value: &Mat4);

    /// Load a 3-component vector uniform
    fn set_vec3(&mut self, location: UniformLocation, value: Vec3);

    /// Load a scalar uniform
    fn set_f32(&mut self, location: UniformLocation, value: f32);

    /// Load a boolean uniform
    fn set_bool(&mut self, location: UniformLocation, value: bool);
}

/// Off-screen render target with color and depth attachments.
///
/// Binding redirects all subsequent draws to the target; unbinding restores
/// the default (screen) target. Binds must pair LIFO with unbinds.
pub trait OffscreenTarget {
    /// Redirect subsequent draws to this target
    fn bind(&mut self);

    /// Restore the default render target
    fn unbind(&mut self);

    /// Color attachment, sampleable as a texture once unbound
    fn color_texture(&self) -> TextureHandle;
}

/// Window/display collaborator.
///
/// Creation and destruction of the underlying surface belong to the
/// application; the renderer only reads the resolution at initialization
/// and presents at the end of each frame.
pub trait DisplaySurface {
    /// Configured resolution in pixels (width, height)
    fn resolution(&self) -> (u32, u32);

    /// Present the completed frame
    fn present(&mut self) -> BackendResult<()>;

    /// Per-frame timing hook, invoked once after presenting
    fn update_frame_timing(&mut self);
}

/// Graphics device factory and per-pass state.
///
/// Owns program compilation and render-target creation; construction
/// failures propagate to the renderer's caller without retry.
pub trait RenderDevice {
    /// Compile a shader program from the given sources
    fn create_program(&mut self, config: &ShaderConfig) -> BackendResult<Box<dyn GpuProgram>>;

    /// Create an off-screen target with color and depth attachments
    fn create_offscreen_target(
        &mut self,
        width: u32,
        height: u32,
    ) -> BackendResult<Box<dyn OffscreenTarget>>;

    /// Clear the currently bound target's color and depth to the given color
    fn clear(&mut self, color: Vec3);
}
