//! # Waterline
//!
//! Frame-composition engine for scenes with a reflective, refractive water
//! surface. Each frame renders the opaque scene three times (clipped below
//! the water plane for refraction, mirrored and clipped above for
//! reflection, unclipped to the screen), then draws the water sampling both
//! off-screen results.
//!
//! The crate is backend-agnostic: the graphics device, display surface, and
//! per-object-kind renderers are collaborators supplied by the application
//! behind the traits in [`render::api`]. A recording headless backend ships
//! in [`render::backends::headless`] for tests and display-less
//! environments.
//!
//! ## Quick start
//!
//! ```no_run
//! use std::cell::RefCell;
//! use std::rc::Rc;
//! use waterline::config::RendererConfig;
//! use waterline::foundation::math::Vec3;
//! use waterline::render::backends::headless::HeadlessBackend;
//! use waterline::render::FrameRenderer;
//! use waterline::scene::{Entity, Light, StaticScene, WaterBody};
//!
//! # fn main() -> Result<(), waterline::render::RenderError> {
//! let backend = HeadlessBackend::new((1280, 720));
//! let mut renderer = FrameRenderer::new(
//!     backend.device(),
//!     backend.display(),
//!     backend.renderers(),
//!     RendererConfig::default(),
//! )?;
//!
//! let scene = StaticScene::new(Vec3::new(0.4, 0.6, 0.9), 0.0)
//!     .add_light(Light::white(Vec3::new(100.0, 200.0, 100.0)))
//!     .add_entity(Entity::new(Vec3::new(0.0, 5.0, -20.0), "rock"))
//!     .add_water(WaterBody::new(Vec3::new(0.0, 0.0, -20.0), 60.0));
//! renderer.set_scene(Some(Rc::new(RefCell::new(scene))));
//!
//! renderer.render()?;
//! # Ok(())
//! # }
//! ```

/// Renderer configuration
pub mod config;

/// Math foundations: vectors, matrices, transform composition
pub mod foundation;

/// The rendering system: pass orchestration, shaders, collaborator traits
pub mod render;

/// Scene contract and object types
pub mod scene;

/// Commonly used types
pub mod prelude {
    pub use crate::config::{RendererConfig, ShaderConfig, ShaderSet};
    pub use crate::foundation::math::{Mat4, Vec3, Vec4};
    pub use crate::render::{
        BasicShader, CameraState, ClipPlane, FrameRenderer, RenderError, RendererSet,
        SceneHandle, ShaderFeatures, WaterFboPair,
    };
    pub use crate::scene::{
        Entity, Light, LightBatch, Scene, Skybox, StaticScene, Terrain, WaterBody,
    };
}

pub use render::{FrameRenderer, RenderError};
