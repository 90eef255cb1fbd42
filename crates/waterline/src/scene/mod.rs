//! Scene contract consumed by the frame renderer
//!
//! The renderer never owns scene content. It reads the current scene
//! through the [`Scene`] trait once per frame and derives everything else
//! (camera matrices, light batches, clip planes) fresh from it.
//! [`StaticScene`] is a ready-made implementation for applications whose
//! content does not change structurally between frames.

pub mod lighting;

pub use lighting::{Light, LightBatch, MAX_LIGHTS};

use crate::foundation::math::{create_trans_matrix, Mat4, Vec3};
use std::collections::BTreeMap;

/// Renderable object with a shared material
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    /// Position in world space
    pub position: Vec3,
    /// Euler rotation in radians
    pub rotation: Vec3,
    /// Uniform scale factor
    pub scale: f32,
    /// Material/texture key used to group entities into draw batches
    pub material: String,
}

impl Entity {
    /// Create an entity at the given position with the given material key
    pub fn new(position: Vec3, material: impl Into<String>) -> Self {
        Self {
            position,
            rotation: Vec3::zeros(),
            scale: 1.0,
            material: material.into(),
        }
    }

    /// Set the Euler rotation
    pub fn with_rotation(mut self, rotation: Vec3) -> Self {
        self.rotation = rotation;
        self
    }

    /// Set the uniform scale
    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }

    /// World transform for this entity, rebuilt on demand
    pub fn transform_matrix(&self) -> Mat4 {
        create_trans_matrix(self.position, self.rotation, self.scale, false)
    }
}

/// Terrain tile with a shared material
#[derive(Debug, Clone, PartialEq)]
pub struct Terrain {
    /// World position of the tile origin
    pub position: Vec3,
    /// Material/texture key used to group tiles into draw batches
    pub material: String,
}

impl Terrain {
    /// Create a tile at the given position with the given material key
    pub fn new(position: Vec3, material: impl Into<String>) -> Self {
        Self {
            position,
            material: material.into(),
        }
    }

    /// World transform for this tile
    pub fn transform_matrix(&self) -> Mat4 {
        create_trans_matrix(self.position, Vec3::zeros(), 1.0, false)
    }
}

/// Water surface tile
#[derive(Debug, Clone, PartialEq)]
pub struct WaterBody {
    /// Center of the tile; the y component sits on the scene's water plane
    pub position: Vec3,
    /// Tile edge length in world units
    pub size: f32,
}

impl WaterBody {
    /// Create a water tile centered at the given position
    pub fn new(position: Vec3, size: f32) -> Self {
        Self { position, size }
    }
}

/// Skybox drawn behind all opaque geometry
#[derive(Debug, Clone, PartialEq)]
pub struct Skybox {
    /// Cube-map material key
    pub material: String,
}

impl Skybox {
    /// Create a skybox with the given cube-map material key
    pub fn new(material: impl Into<String>) -> Self {
        Self {
            material: material.into(),
        }
    }
}

/// Material-keyed grouping of renderable objects.
///
/// A `BTreeMap` keeps draw order stable across frames; the grouping itself
/// is what lets each pass bind a material once per group.
pub type MaterialGroups<T> = BTreeMap<String, Vec<T>>;

/// Contract the frame renderer reads the current scene through.
///
/// The application owns the scene and may swap it between frames; swapping
/// mid-frame is not supported. The renderer holds a shared handle and only
/// calls [`Scene::update`] once per frame, after all passes complete.
pub trait Scene {
    /// Clear color and fog color for every pass
    fn sky_color(&self) -> Vec3;

    /// Height of the horizontal water plane
    fn water_height(&self) -> f32;

    /// Full light set, unfiltered
    fn lights(&self) -> &[Light];

    /// Entities grouped by material key
    fn entity_groups(&self) -> &MaterialGroups<Entity>;

    /// Terrain tiles grouped by material key
    fn terrain_groups(&self) -> &MaterialGroups<Terrain>;

    /// The skybox
    fn skybox(&self) -> &Skybox;

    /// All water tiles
    fn water_bodies(&self) -> &[WaterBody];

    /// Per-frame hook, invoked once after all passes of a frame
    fn update(&mut self);
}

/// Scene implementation backed by plain collections.
///
/// Content is supplied up front through builder methods; `update` is a
/// no-op. Suitable for applications and tests that drive scene changes
/// from outside the render loop.
#[derive(Debug, Clone)]
pub struct StaticScene {
    sky_color: Vec3,
    water_height: f32,
    lights: Vec<Light>,
    entities: MaterialGroups<Entity>,
    terrains: MaterialGroups<Terrain>,
    skybox: Skybox,
    water: Vec<WaterBody>,
}

impl StaticScene {
    /// Create an empty scene with the given sky color and water height
    pub fn new(sky_color: Vec3, water_height: f32) -> Self {
        Self {
            sky_color,
            water_height,
            lights: Vec::new(),
            entities: MaterialGroups::new(),
            terrains: MaterialGroups::new(),
            skybox: Skybox::new("sky"),
            water: Vec::new(),
        }
    }

    /// Add a light
    pub fn add_light(mut self, light: Light) -> Self {
        self.lights.push(light);
        self
    }

    /// Add an entity to the group matching its material key
    pub fn add_entity(mut self, entity: Entity) -> Self {
        self.entities
            .entry(entity.material.clone())
            .or_default()
            .push(entity);
        self
    }

    /// Add a terrain tile to the group matching its material key
    pub fn add_terrain(mut self, terrain: Terrain) -> Self {
        self.terrains
            .entry(terrain.material.clone())
            .or_default()
            .push(terrain);
        self
    }

    /// Add a water tile
    pub fn add_water(mut self, water: WaterBody) -> Self {
        self.water.push(water);
        self
    }

    /// Replace the skybox
    pub fn with_skybox(mut self, skybox: Skybox) -> Self {
        self.skybox = skybox;
        self
    }
}

impl Scene for StaticScene {
    fn sky_color(&self) -> Vec3 {
        self.sky_color
    }

    fn water_height(&self) -> f32 {
        self.water_height
    }

    fn lights(&self) -> &[Light] {
        &self.lights
    }

    fn entity_groups(&self) -> &MaterialGroups<Entity> {
        &self.entities
    }

    fn terrain_groups(&self) -> &MaterialGroups<Terrain> {
        &self.terrains
    }

    fn skybox(&self) -> &Skybox {
        &self.skybox
    }

    fn water_bodies(&self) -> &[WaterBody] {
        &self.water
    }

    fn update(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entities_group_by_material_key() {
        let scene = StaticScene::new(Vec3::new(0.5, 0.6, 0.7), 0.0)
            .add_entity(Entity::new(Vec3::new(0.0, 1.0, 0.0), "rock"))
            .add_entity(Entity::new(Vec3::new(0.0, 2.0, 0.0), "rock"))
            .add_entity(Entity::new(Vec3::new(0.0, 3.0, 0.0), "tree"));

        assert_eq!(scene.entity_groups().len(), 2);
        assert_eq!(scene.entity_groups()["rock"].len(), 2);
        assert_eq!(scene.entity_groups()["tree"].len(), 1);
    }

    #[test]
    fn entity_transform_carries_translation() {
        let entity = Entity::new(Vec3::new(4.0, 5.0, 6.0), "rock");
        let m = entity.transform_matrix();
        assert_eq!(m[(0, 3)], 4.0);
        assert_eq!(m[(1, 3)], 5.0);
        assert_eq!(m[(2, 3)], 6.0);
    }

    #[test]
    fn groups_iterate_in_key_order() {
        let scene = StaticScene::new(Vec3::zeros(), 0.0)
            .add_entity(Entity::new(Vec3::zeros(), "zebra"))
            .add_entity(Entity::new(Vec3::zeros(), "apple"));

        let keys: Vec<&str> = scene.entity_groups().keys().map(String::as_str).collect();
        assert_eq!(keys, ["apple", "zebra"]);
    }
}
