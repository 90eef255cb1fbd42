//! Collaborator contracts for the rendering core
//!
//! The frame renderer is a pass orchestrator, not a GPU driver: the
//! graphics device, the display surface, and the per-object-kind renderers
//! are all supplied by the application behind the traits defined here. The
//! traits are deliberately narrow: they carry exactly what the pass
//! sequence needs and nothing else.

mod collaborators;
mod device;

pub use collaborators::{EntityRenderer, SkyboxRenderer, TerrainRenderer, WaterRenderer};
pub use device::{
    DisplaySurface, GpuProgram, OffscreenTarget, RenderDevice, TextureHandle, UniformLocation,
};
