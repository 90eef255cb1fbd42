//! Light sources and the fixed-size per-pass light batch

use crate::foundation::math::Vec3;

/// Maximum number of lights a single pass can carry.
///
/// Matches the fixed-size light array declared by the shader programs;
/// lights beyond this count are dropped, not filtered by relevance.
pub const MAX_LIGHTS: usize = 4;

/// Point light source
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Light {
    /// Light position in world space
    pub position: Vec3,
    /// Light color (RGB)
    pub color: Vec3,
}

impl Light {
    /// Create a light at the given position with the given color
    pub fn new(position: Vec3, color: Vec3) -> Self {
        Self { position, color }
    }

    /// Create a plain white light at the given position
    pub fn white(position: Vec3) -> Self {
        Self::new(position, Vec3::new(1.0, 1.0, 1.0))
    }
}

impl Default for Light {
    fn default() -> Self {
        Self {
            position: Vec3::zeros(),
            color: Vec3::zeros(),
        }
    }
}

/// Fixed-size light array passed to every lit pass of a frame.
///
/// Built fresh from the scene's full light set each frame; passes always
/// receive the whole batch with its count, never a filtered subset.
#[derive(Debug, Clone, Copy)]
pub struct LightBatch {
    lights: [Light; MAX_LIGHTS],
    count: usize,
}

impl LightBatch {
    /// Collect a scene's light set into a batch, truncating past
    /// [`MAX_LIGHTS`].
    pub fn from_lights(source: &[Light]) -> Self {
        if source.len() > MAX_LIGHTS {
            log::warn!(
                "Scene has {} lights; only the first {} are rendered",
                source.len(),
                MAX_LIGHTS
            );
        }
        let count = source.len().min(MAX_LIGHTS);
        let mut lights = [Light::default(); MAX_LIGHTS];
        lights[..count].copy_from_slice(&source[..count]);
        Self { lights, count }
    }

    /// The populated lights, in scene order
    pub fn lights(&self) -> &[Light] {
        &self.lights[..self.count]
    }

    /// Number of populated lights
    pub fn count(&self) -> usize {
        self.count
    }

    /// Whether the batch holds no lights
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn batch_keeps_scene_order() {
        let source = [
            Light::white(Vec3::new(1.0, 0.0, 0.0)),
            Light::white(Vec3::new(2.0, 0.0, 0.0)),
        ];
        let batch = LightBatch::from_lights(&source);
        assert_eq!(batch.count(), 2);
        assert_eq!(batch.lights()[0].position.x, 1.0);
        assert_eq!(batch.lights()[1].position.x, 2.0);
    }

    #[test]
    fn batch_truncates_past_capacity() {
        let source: Vec<Light> = (0..7)
            .map(|i| Light::white(Vec3::new(i as f32, 0.0, 0.0)))
            .collect();
        let batch = LightBatch::from_lights(&source);
        assert_eq!(batch.count(), MAX_LIGHTS);
        assert_eq!(batch.lights().len(), MAX_LIGHTS);
    }

    #[test]
    fn empty_batch() {
        let batch = LightBatch::from_lights(&[]);
        assert!(batch.is_empty());
        assert!(batch.lights().is_empty());
    }
}
