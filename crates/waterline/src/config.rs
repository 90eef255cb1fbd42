//! Renderer configuration
//!
//! Session-constant parameters for the frame renderer: projection setup,
//! the clip-seam margin, and the shader sources each pass compiles. All
//! structures are serde-ready so applications can load them from their own
//! config files.

use serde::{Deserialize, Serialize};

/// Paths of one shader program's sources.
///
/// Compilation itself belongs to the device collaborator; the renderer only
/// carries the paths through to it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShaderConfig {
    /// Path to the vertex shader source
    pub vertex_shader_path: String,
    /// Path to the fragment shader source
    pub fragment_shader_path: String,
}

impl ShaderConfig {
    /// Create a new shader configuration
    pub fn new(vertex_path: impl Into<String>, fragment_path: impl Into<String>) -> Self {
        Self {
            vertex_shader_path: vertex_path.into(),
            fragment_shader_path: fragment_path.into(),
        }
    }
}

/// Shader sources for the four pass kinds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShaderSet {
    /// Entity pass program
    pub entity: ShaderConfig,
    /// Terrain pass program
    pub terrain: ShaderConfig,
    /// Water pass program
    pub water: ShaderConfig,
    /// Skybox pass program
    pub skybox: ShaderConfig,
}

impl Default for ShaderSet {
    fn default() -> Self {
        Self {
            entity: ShaderConfig::new("shaders/entity.vert", "shaders/entity.frag"),
            terrain: ShaderConfig::new("shaders/terrain.vert", "shaders/terrain.frag"),
            water: ShaderConfig::new("shaders/water.vert", "shaders/water.frag"),
            skybox: ShaderConfig::new("shaders/skybox.vert", "shaders/skybox.frag"),
        }
    }
}

/// Frame renderer configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RendererConfig {
    /// Vertical field of view in degrees
    pub fov_degrees: f32,

    /// Near projection plane
    pub z_near: f32,

    /// Far projection plane
    pub z_far: f32,

    /// Margin in world units added to the water height when clipping the
    /// reflection and refraction passes. Hides the seam where geometry
    /// straddles the water plane; tunable, not derived.
    pub clip_margin: f32,

    /// Shader sources per pass kind
    pub shaders: ShaderSet,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            fov_degrees: 70.0,
            z_near: 0.1,
            z_far: 1000.0,
            clip_margin: 2.0,
            shaders: ShaderSet::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_matches_session_constants() {
        let config = RendererConfig::default();
        assert_eq!(config.fov_degrees, 70.0);
        assert_eq!(config.z_near, 0.1);
        assert_eq!(config.z_far, 1000.0);
        assert_eq!(config.clip_margin, 2.0);
    }
}
