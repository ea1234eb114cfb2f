/// Scroll-driven presentation parameters of one section.
///
/// `offset_y` and `opacity` apply to the section content; `rotation_deg`
/// drives the decorative surface behind it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MotionParams {
    pub offset_y: f32,
    pub opacity: f32,
    pub rotation_deg: f32,
}

impl Default for MotionParams {
    fn default() -> Self {
        Self {
            offset_y: 0.0,
            opacity: 1.0,
            rotation_deg: 0.0,
        }
    }
}

/// A decorative surface (a 3D scene, a canvas) rendered behind a section.
///
/// It only consumes motion parameters; nothing flows back into the page.
pub trait Ornament {
    fn apply(&mut self, params: &MotionParams);
}

/// Ornament that renders nothing.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullOrnament;

impl Ornament for NullOrnament {
    fn apply(&mut self, _params: &MotionParams) {}
}

impl<F: FnMut(&MotionParams)> Ornament for F {
    fn apply(&mut self, params: &MotionParams) {
        self(params)
    }
}
