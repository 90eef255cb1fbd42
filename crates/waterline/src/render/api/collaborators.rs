//! Per-object-kind renderer collaborators
//!
//! One trait per object kind, each exposing the scoped
//! bind / render / unbind triple the pass sequence drives: bind the shared
//! material of a group once, render every member under it, then unbind.
//! Lit kinds receive the full per-pass light batch, never a filtered one.

use crate::render::shader::BasicShader;
use crate::render::water_fbo::WaterFboPair;
use crate::scene::{Entity, LightBatch, Skybox, Terrain, WaterBody};

/// Renders entities sharing a material
pub trait EntityRenderer {
    /// Bind the material shared by a group, using any member as exemplar
    fn bind_material(&mut self, exemplar: &Entity, shader: &mut BasicShader);

    /// Draw one entity under the currently bound material
    fn render(&mut self, entity: &Entity, lights: &LightBatch, shader: &mut BasicShader);

    /// Release the bound material
    fn unbind_material(&mut self);
}

/// Renders terrain tiles sharing a material
pub trait TerrainRenderer {
    /// Bind the material shared by a group, using any member as exemplar
    fn bind_material(&mut self, exemplar: &Terrain, shader: &mut BasicShader);

    /// Draw one tile under the currently bound material
    fn render(&mut self, terrain: &Terrain, lights: &LightBatch, shader: &mut BasicShader);

    /// Release the bound material
    fn unbind_material(&mut self);
}

/// Renders water tiles, sampling the reflection/refraction attachments
pub trait WaterRenderer {
    /// Bind the shared water material and both off-screen color attachments
    fn bind_material(
        &mut self,
        exemplar: &WaterBody,
        fbo: &WaterFboPair,
        shader: &mut BasicShader,
    );

    /// Draw one water tile under the currently bound material
    fn render(&mut self, water: &WaterBody, lights: &LightBatch, shader: &mut BasicShader);

    /// Release the bound material
    fn unbind_material(&mut self);
}

/// Renders the skybox
pub trait SkyboxRenderer {
    /// Draw the skybox; bind/draw/unbind collapse into one call since the
    /// skybox is a single object
    fn render(&mut self, skybox: &Skybox, shader: &mut BasicShader);
}
