use smallvec::SmallVec;

use crate::Interpolate;
use crate::error::InterpolationError;

/// Piecewise-linear mapping from an input scalar to any [`Interpolate`] value.
///
/// Inputs below the first breakpoint yield the first output, inputs past the
/// last breakpoint the last output.
///
/// ```rust
/// use vitrine_core::ValueInterpolator;
///
/// let fade = ValueInterpolator::new([0.0, 0.3, 0.7, 1.0], [0.0f32, 1.0, 1.0, 0.0]).unwrap();
/// assert_eq!(fade.map(0.5), 1.0);
/// assert!((fade.map(0.15) - 0.5).abs() < 1e-6);
/// ```
#[derive(Clone, Debug)]
pub struct ValueInterpolator<T: Interpolate + Clone = f32> {
    inputs: SmallVec<[f32; 4]>,
    outputs: SmallVec<[T; 4]>,
}

impl<T: Interpolate + Clone> ValueInterpolator<T> {
    pub fn new(
        inputs: impl IntoIterator<Item = f32>,
        outputs: impl IntoIterator<Item = T>,
    ) -> Result<Self, InterpolationError> {
        let inputs: SmallVec<[f32; 4]> = inputs.into_iter().collect();
        let outputs: SmallVec<[T; 4]> = outputs.into_iter().collect();

        if inputs.len() != outputs.len() {
            return Err(InterpolationError::LengthMismatch {
                inputs: inputs.len(),
                outputs: outputs.len(),
            });
        }
        if inputs.len() < 2 {
            return Err(InterpolationError::TooFewBreakpoints(inputs.len()));
        }
        if let Some(index) = inputs.iter().position(|x| !x.is_finite()) {
            return Err(InterpolationError::NonFinite { index });
        }
        if let Some(index) = inputs.windows(2).position(|w| w[1] <= w[0]) {
            return Err(InterpolationError::NotIncreasing { index: index + 1 });
        }

        Ok(Self { inputs, outputs })
    }

    /// Two-point mapping `from.0 → to.0`, `from.1 → to.1`.
    pub fn linear(from: (f32, f32), to: (T, T)) -> Result<Self, InterpolationError> {
        Self::new([from.0, from.1], [to.0, to.1])
    }

    pub fn map(&self, x: f32) -> T {
        let last = self.inputs.len() - 1;
        // NaN compares false everywhere; treat it as "not started yet".
        if x.is_nan() || x <= self.inputs[0] {
            return self.outputs[0].clone();
        }
        if x >= self.inputs[last] {
            return self.outputs[last].clone();
        }
        // First breakpoint strictly greater than x closes the segment.
        let hi = self.inputs.partition_point(|b| *b <= x);
        let lo = hi - 1;
        let span = self.inputs[hi] - self.inputs[lo];
        let t = (x - self.inputs[lo]) / span;
        self.outputs[lo].interpolate(&self.outputs[hi], t)
    }
}
