//! Weight tensor storage, initialization, and constraints.
//!
//! The tensor maps (output channel, kernel position, input channel) to a
//! coefficient. It is always allocated at 144 entries (4 output slots x
//! 9 positions x 4 input slots) independent of the active channel count.
//! The addressable layout is fixed for compatibility:
//!
//! `index = out * 36 + kernel_pos * num_channels + in_channel`
//!
//! with positions ordered row-major TL,T,TR,L,C,R,BL,B,BR. Entries outside
//! the addressable range for the active channel count are filled by
//! initialization but never read by the evaluator.

use crate::schema::{
    CHANNEL_SLOTS, InitStrategy, KERNEL_POSITIONS, WeightConstraints,
};

use super::EngineRng;

/// Total tensor entry count, independent of the active channel count.
pub const WEIGHT_COUNT: usize = CHANNEL_SLOTS * KERNEL_POSITIONS * CHANNEL_SLOTS;

/// Stride between output-channel blocks.
const OUT_STRIDE: usize = KERNEL_POSITIONS * CHANNEL_SLOTS;

/// User-supplied weight generator for the Custom init strategy.
/// Receives the flat tensor index and returns the weight value.
pub type CustomInitFn = dyn Fn(usize) -> f32 + Send + Sync;

/// The 3x3 convolution weight tensor.
#[derive(Debug, Clone, PartialEq)]
pub struct WeightTensor {
    data: Vec<f32>,
}

impl Default for WeightTensor {
    fn default() -> Self {
        Self::new()
    }
}

impl WeightTensor {
    /// Create a zeroed tensor.
    pub fn new() -> Self {
        Self {
            data: vec![0.0f32; WEIGHT_COUNT],
        }
    }

    /// Flat index for (output channel, kernel position, input channel)
    /// under the active channel count.
    #[inline]
    pub fn index(out: usize, pos: usize, ic: usize, num_channels: usize) -> usize {
        out * OUT_STRIDE + pos * num_channels + ic
    }

    #[inline]
    pub fn get(&self, out: usize, pos: usize, ic: usize, num_channels: usize) -> f32 {
        self.data[Self::index(out, pos, ic, num_channels)]
    }

    #[inline]
    pub fn set(&mut self, out: usize, pos: usize, ic: usize, num_channels: usize, value: f32) {
        self.data[Self::index(out, pos, ic, num_channels)] = value;
    }

    /// Raw tensor values.
    #[inline]
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// Mutable raw tensor values.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [f32] {
        &mut self.data
    }

    /// Replace all 144 entries.
    pub fn copy_from(&mut self, values: &[f32; WEIGHT_COUNT]) {
        self.data.copy_from_slice(values);
    }

    /// Fill all entries according to the chosen strategy.
    ///
    /// Custom uses the installed generator when present and falls back to
    /// Uniform otherwise. Constraints are applied by the caller afterwards.
    pub fn initialize(
        &mut self,
        strategy: InitStrategy,
        num_channels: usize,
        weight_range: f32,
        rng: &mut EngineRng,
        custom: Option<&CustomInitFn>,
    ) {
        match strategy {
            InitStrategy::Xavier => {
                let fan_in = (num_channels * KERNEL_POSITIONS) as f32;
                let fan_out = num_channels as f32;
                let limit = (6.0 / (fan_in + fan_out)).sqrt();
                for w in &mut self.data {
                    *w = rng.uniform(-limit, limit);
                }
            }
            InitStrategy::He => {
                let fan_in = (num_channels * KERNEL_POSITIONS) as f32;
                let sd = (2.0 / fan_in).sqrt();
                for w in &mut self.data {
                    *w = rng.normal() * sd;
                }
            }
            InitStrategy::Uniform => {
                for w in &mut self.data {
                    *w = rng.uniform(-weight_range, weight_range);
                }
            }
            InitStrategy::Custom => match custom {
                Some(generator) => {
                    for (i, w) in self.data.iter_mut().enumerate() {
                        *w = generator(i);
                    }
                }
                None => {
                    self.initialize(InitStrategy::Uniform, num_channels, weight_range, rng, None);
                }
            },
        }
    }

    /// Clamp every entry to the configured bounds. This is the sole
    /// enforcement point for the tensor invariant.
    pub fn apply_constraints(&mut self, constraints: &WeightConstraints) {
        for w in &mut self.data {
            *w = w.clamp(constraints.min, constraints.max);
        }
    }

    /// Tensor values with channel/kernel scaling applied, for display.
    ///
    /// Scaling touches only the entries addressable under the active
    /// channel count; the rest are returned raw.
    pub fn effective(
        &self,
        channel_scale: &[f32; CHANNEL_SLOTS],
        kernel_scale: &[f32; KERNEL_POSITIONS],
        num_channels: usize,
    ) -> Vec<f32> {
        let mut out = self.data.clone();
        for oc in 0..CHANNEL_SLOTS {
            for pos in 0..KERNEL_POSITIONS {
                for ic in 0..num_channels {
                    let idx = Self::index(oc, pos, ic, num_channels);
                    out[idx] = self.data[idx] * channel_scale[oc] * kernel_scale[pos];
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::WeightConstraints;

    #[test]
    fn test_tensor_length_is_fixed() {
        let tensor = WeightTensor::new();
        assert_eq!(tensor.as_slice().len(), 144);
    }

    #[test]
    fn test_index_layout() {
        // out*36 + pos*num_channels + ic
        assert_eq!(WeightTensor::index(0, 0, 0, 4), 0);
        assert_eq!(WeightTensor::index(0, 4, 0, 1), 4);
        assert_eq!(WeightTensor::index(1, 0, 0, 2), 36);
        assert_eq!(WeightTensor::index(2, 3, 1, 3), 2 * 36 + 3 * 3 + 1);
        assert_eq!(WeightTensor::index(3, 8, 3, 4), 143);
    }

    #[test]
    fn test_xavier_within_limit() {
        let mut tensor = WeightTensor::new();
        let mut rng = EngineRng::new(11);
        tensor.initialize(InitStrategy::Xavier, 3, 1.0, &mut rng, None);

        let limit = (6.0f32 / (27.0 + 3.0)).sqrt();
        for &w in tensor.as_slice() {
            assert!(w.abs() <= limit, "xavier weight {} beyond {}", w, limit);
        }
    }

    #[test]
    fn test_uniform_within_range() {
        let mut tensor = WeightTensor::new();
        let mut rng = EngineRng::new(12);
        tensor.initialize(InitStrategy::Uniform, 4, 2.5, &mut rng, None);
        for &w in tensor.as_slice() {
            assert!(w.abs() <= 2.5);
        }
    }

    #[test]
    fn test_all_strategies_within_constraints() {
        let constraints = WeightConstraints::default();
        let mut rng = EngineRng::new(13);
        for strategy in [
            InitStrategy::Xavier,
            InitStrategy::He,
            InitStrategy::Uniform,
            InitStrategy::Custom,
        ] {
            let mut tensor = WeightTensor::new();
            tensor.initialize(strategy, 2, 3.0, &mut rng, None);
            tensor.apply_constraints(&constraints);
            for &w in tensor.as_slice() {
                assert!(
                    w >= constraints.min && w <= constraints.max,
                    "{:?} produced out-of-bound weight {}",
                    strategy,
                    w
                );
            }
        }
    }

    #[test]
    fn test_custom_generator_used() {
        let mut tensor = WeightTensor::new();
        let mut rng = EngineRng::new(14);
        let generator = |i: usize| i as f32 * 0.01;
        tensor.initialize(InitStrategy::Custom, 4, 1.0, &mut rng, Some(&generator));
        assert_eq!(tensor.as_slice()[0], 0.0);
        assert_eq!(tensor.as_slice()[100], 1.0);
    }

    #[test]
    fn test_custom_without_generator_falls_back_to_uniform() {
        let mut tensor = WeightTensor::new();
        let mut rng = EngineRng::new(15);
        tensor.initialize(InitStrategy::Custom, 4, 0.5, &mut rng, None);
        for &w in tensor.as_slice() {
            assert!(w.abs() <= 0.5);
        }
        // Not all zero: initialization actually ran.
        assert!(tensor.as_slice().iter().any(|&w| w != 0.0));
    }

    #[test]
    fn test_constraints_clamp() {
        let mut tensor = WeightTensor::new();
        tensor.as_mut_slice()[0] = 100.0;
        tensor.as_mut_slice()[1] = -100.0;
        tensor.apply_constraints(&WeightConstraints::default());
        assert_eq!(tensor.as_slice()[0], 4.0);
        assert_eq!(tensor.as_slice()[1], -4.0);
    }

    #[test]
    fn test_copy_round_trip() {
        let mut values = [0.0f32; WEIGHT_COUNT];
        for (i, v) in values.iter_mut().enumerate() {
            *v = (i as f32 - 72.0) * 0.05;
        }
        let mut tensor = WeightTensor::new();
        tensor.copy_from(&values);
        for (a, b) in tensor.as_slice().iter().zip(values.iter()) {
            assert!((a - b).abs() < 1e-5);
        }
    }

    #[test]
    fn test_effective_scaling() {
        let mut tensor = WeightTensor::new();
        tensor.set(1, 4, 0, 2, 2.0);

        let mut channel_scale = [1.0f32; CHANNEL_SLOTS];
        channel_scale[1] = 3.0;
        let mut kernel_scale = [1.0f32; KERNEL_POSITIONS];
        kernel_scale[4] = 0.5;

        let effective = tensor.effective(&channel_scale, &kernel_scale, 2);
        let idx = WeightTensor::index(1, 4, 0, 2);
        assert!((effective[idx] - 3.0).abs() < 1e-6);
        // Stored tensor is untouched.
        assert_eq!(tensor.get(1, 4, 0, 2), 2.0);
    }
}
