//! Reflection/refraction frame-buffer pair
//!
//! Two off-screen targets whose color attachments feed the water pass: the
//! reflection target holds the scene as seen by the mirrored camera, the
//! refraction target holds the underwater view from the real camera.

use crate::render::api::{OffscreenTarget, RenderDevice, TextureHandle};
use crate::render::BackendResult;

/// Which of the pair is currently bound
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BoundTarget {
    Reflection,
    Refraction,
}

/// The reflection and refraction render targets, bound one at a time.
///
/// Binds must pair LIFO with [`unbind`](Self::unbind); a nested bind is a
/// usage error (debug-asserted; release builds carry no runtime check and
/// would silently corrupt subsequent draws, as on a real GPU).
pub struct WaterFboPair {
    reflection: Box<dyn OffscreenTarget>,
    refraction: Box<dyn OffscreenTarget>,
    bound: Option<BoundTarget>,
}

impl WaterFboPair {
    /// Create both targets at the given resolution.
    pub fn new(device: &mut dyn RenderDevice, resolution: (u32, u32)) -> BackendResult<Self> {
        let (width, height) = resolution;
        let reflection = device.create_offscreen_target(width, height)?;
        let refraction = device.create_offscreen_target(width, height)?;
        log::debug!("Water FBO pair created at {}x{}", width, height);
        Ok(Self {
            reflection,
            refraction,
            bound: None,
        })
    }

    /// Redirect subsequent draws to the reflection target
    pub fn bind_reflection(&mut self) {
        debug_assert!(self.bound.is_none(), "nested water FBO bind");
        self.reflection.bind();
        self.bound = Some(BoundTarget::Reflection);
    }

    /// Redirect subsequent draws to the refraction target
    pub fn bind_refraction(&mut self) {
        debug_assert!(self.bound.is_none(), "nested water FBO bind");
        self.refraction.bind();
        self.bound = Some(BoundTarget::Refraction);
    }

    /// Restore the default render target
    pub fn unbind(&mut self) {
        match self.bound.take() {
            Some(BoundTarget::Reflection) => self.reflection.unbind(),
            Some(BoundTarget::Refraction) => self.refraction.unbind(),
            None => debug_assert!(false, "unbind without a bound water FBO"),
        }
    }

    /// Color attachment of the reflection target
    pub fn reflection_texture(&self) -> TextureHandle {
        self.reflection.color_texture()
    }

    /// Color attachment of the refraction target
    pub fn refraction_texture(&self) -> TextureHandle {
        self.refraction.color_texture()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ShaderConfig;
    use crate::foundation::math::Vec3;
    use crate::render::api::GpuProgram;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct CountingTarget {
        texture: TextureHandle,
        binds: Rc<RefCell<Vec<(u64, bool)>>>,
    }

    impl OffscreenTarget for CountingTarget {
        fn bind(&mut self) {
            self.binds.borrow_mut().push((self.texture.0, true));
        }

        fn unbind(&mut self) {
            self.binds.borrow_mut().push((self.texture.0, false));
        }

        fn color_texture(&self) -> TextureHandle {
            self.texture
        }
    }

    struct CountingDevice {
        next_texture: u64,
        binds: Rc<RefCell<Vec<(u64, bool)>>>,
    }

    impl RenderDevice for CountingDevice {
        fn create_program(&mut self, _config: &ShaderConfig) -> BackendResult<Box<dyn GpuProgram>> {
            unimplemented!("not used by these tests")
        }

        fn create_offscreen_target(
            &mut self,
            _width: u32,
            _height: u32,
        ) -> BackendResult<Box<dyn OffscreenTarget>> {
            let texture = TextureHandle(self.next_texture);
            self.next_texture += 1;
            Ok(Box::new(CountingTarget {
                texture,
                binds: Rc::clone(&self.binds),
            }))
        }

        fn clear(&mut self, _color: Vec3) {}
    }

    fn pair() -> (WaterFboPair, Rc<RefCell<Vec<(u64, bool)>>>) {
        let binds = Rc::new(RefCell::new(Vec::new()));
        let mut device = CountingDevice {
            next_texture: 0,
            binds: Rc::clone(&binds),
        };
        let pair = WaterFboPair::new(&mut device, (1280, 720)).unwrap();
        (pair, binds)
    }

    #[test]
    fn targets_have_distinct_color_attachments() {
        let (pair, _) = pair();
        assert_ne!(pair.reflection_texture(), pair.refraction_texture());
    }

    #[test]
    fn unbind_releases_the_bound_target() {
        let (mut pair, binds) = pair();
        let refraction = pair.refraction_texture().0;
        let reflection = pair.reflection_texture().0;

        pair.bind_refraction();
        pair.unbind();
        pair.bind_reflection();
        pair.unbind();

        assert_eq!(
            *binds.borrow(),
            vec![
                (refraction, true),
                (refraction, false),
                (reflection, true),
                (reflection, false),
            ]
        );
    }

    #[test]
    #[should_panic(expected = "nested water FBO bind")]
    #[cfg(debug_assertions)]
    fn nested_bind_is_a_usage_error() {
        let (mut pair, _) = pair();
        pair.bind_refraction();
        pair.bind_reflection();
    }
}
