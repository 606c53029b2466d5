//! Configuration types for the neural CA engine.

use serde::{Deserialize, Serialize};

/// Number of output-channel slots in the weight tensor (fixed).
pub const CHANNEL_SLOTS: usize = 4;
/// Number of kernel positions in the 3x3 neighborhood (fixed).
pub const KERNEL_POSITIONS: usize = 9;

/// Valid range for the active channel count.
pub const NUM_CHANNELS_RANGE: (usize, usize) = (1, 4);
/// Valid range for update steps per presentation frame.
pub const STEPS_PER_FRAME_RANGE: (usize, usize) = (1, 20);
/// Valid range for the weight range (uniform init / mutation baseline).
pub const WEIGHT_RANGE_RANGE: (f32, f32) = (0.5, 5.0);
/// Valid range for channel and kernel scale multipliers.
pub const SCALE_RANGE: (f32, f32) = (0.1, 5.0);

/// Top-level engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Grid edge length in cells. The grid is square and toroidal.
    pub grid_size: usize,
    /// Active channel count (1-4). Storage always holds 4 slots per cell.
    pub num_channels: usize,
    /// Update steps per presentation frame (1-20).
    #[serde(default = "default_steps_per_frame")]
    pub steps_per_frame: usize,
    /// Temporal blend factor between previous and activated value (0-1).
    #[serde(default = "default_update_rate")]
    pub update_rate: f32,
    /// Nonlinearity applied to each convolution sum.
    #[serde(default)]
    pub activation: Activation,
    /// Scale for uniform initialization and mutation magnitude baseline (0.5-5.0).
    #[serde(default = "default_weight_range")]
    pub weight_range: f32,
    /// Weight tensor initialization strategy.
    #[serde(default)]
    pub weight_init: InitStrategy,
    /// Hard clamp applied to the weight tensor after every write.
    #[serde(default)]
    pub constraints: WeightConstraints,
    /// Per-output-channel multiplier applied at evaluation time (0.1-5.0).
    #[serde(default = "default_channel_scale")]
    pub channel_scale: [f32; CHANNEL_SLOTS],
    /// Per-kernel-position multiplier applied at evaluation time (0.1-5.0).
    #[serde(default = "default_kernel_scale")]
    pub kernel_scale: [f32; KERNEL_POSITIONS],
    /// Mutation parameters.
    #[serde(default)]
    pub mutation: MutationConfig,
    /// Enable wall-clock-triggered mutation at construction.
    #[serde(default)]
    pub auto_evolve: bool,
}

fn default_steps_per_frame() -> usize {
    1
}
fn default_update_rate() -> f32 {
    0.1
}
fn default_weight_range() -> f32 {
    1.0
}
fn default_channel_scale() -> [f32; CHANNEL_SLOTS] {
    [1.0; CHANNEL_SLOTS]
}
fn default_kernel_scale() -> [f32; KERNEL_POSITIONS] {
    [1.0; KERNEL_POSITIONS]
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            grid_size: 128,
            num_channels: 3,
            steps_per_frame: default_steps_per_frame(),
            update_rate: default_update_rate(),
            activation: Activation::default(),
            weight_range: default_weight_range(),
            weight_init: InitStrategy::default(),
            constraints: WeightConstraints::default(),
            channel_scale: default_channel_scale(),
            kernel_scale: default_kernel_scale(),
            mutation: MutationConfig::default(),
            auto_evolve: false,
        }
    }
}

impl EngineConfig {
    /// Total cell count.
    #[inline]
    pub fn cell_count(&self) -> usize {
        self.grid_size * self.grid_size
    }

    /// Clamp every tunable to its documented valid range.
    ///
    /// Out-of-range values are silently pulled back rather than rejected;
    /// setters on the engine route through the same clamps.
    pub fn sanitize(&mut self) {
        self.num_channels = self
            .num_channels
            .clamp(NUM_CHANNELS_RANGE.0, NUM_CHANNELS_RANGE.1);
        self.steps_per_frame = self
            .steps_per_frame
            .clamp(STEPS_PER_FRAME_RANGE.0, STEPS_PER_FRAME_RANGE.1);
        self.update_rate = self.update_rate.clamp(0.0, 1.0);
        self.weight_range = self
            .weight_range
            .clamp(WEIGHT_RANGE_RANGE.0, WEIGHT_RANGE_RANGE.1);
        for s in &mut self.channel_scale {
            *s = s.clamp(SCALE_RANGE.0, SCALE_RANGE.1);
        }
        for s in &mut self.kernel_scale {
            *s = s.clamp(SCALE_RANGE.0, SCALE_RANGE.1);
        }
        self.constraints.sanitize();
        self.mutation.sanitize();
    }

    /// Validate construction-time parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.grid_size < 3 {
            return Err(ConfigError::InvalidGridSize(self.grid_size));
        }
        Ok(())
    }
}

/// Configuration validation errors. Construction is the only fallible path;
/// everything after construction clamps instead of failing.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Grid size must be at least 3 cells, got {0}")]
    InvalidGridSize(usize),
}

/// Hard constraints on weight tensor entries.
///
/// `min`/`max` are the sole enforcement point for the tensor invariant and
/// are re-applied after every initialization and mutation. The penalty
/// fields are reserved configuration for future regularization and do not
/// enter the simulation math.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeightConstraints {
    pub min: f32,
    pub max: f32,
    #[serde(default)]
    pub l1_penalty: f32,
    #[serde(default)]
    pub l2_penalty: f32,
}

impl Default for WeightConstraints {
    fn default() -> Self {
        Self {
            min: -4.0,
            max: 4.0,
            l1_penalty: 0.0,
            l2_penalty: 0.0,
        }
    }
}

impl WeightConstraints {
    fn sanitize(&mut self) {
        if self.min > self.max {
            std::mem::swap(&mut self.min, &mut self.max);
        }
    }
}

/// Weight tensor initialization strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InitStrategy {
    /// Uniform in +-sqrt(6 / (fan_in + fan_out)).
    #[default]
    Xavier,
    /// Gaussian with standard deviation sqrt(2 / fan_in).
    He,
    /// Uniform in +-weight_range.
    Uniform,
    /// User-supplied generator; falls back to Uniform when none is installed.
    Custom,
}

impl InitStrategy {
    /// Parse a strategy name. Unknown names fall back to Xavier rather than
    /// erroring, logged at warn level so typos stay observable.
    pub fn from_name(name: &str) -> Self {
        match name {
            "xavier" => Self::Xavier,
            "he" => Self::He,
            "uniform" => Self::Uniform,
            "custom" => Self::Custom,
            other => {
                log::warn!("Unknown init strategy '{other}', falling back to xavier");
                Self::Xavier
            }
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Xavier => "xavier",
            Self::He => "he",
            Self::Uniform => "uniform",
            Self::Custom => "custom",
        }
    }
}

/// Mutation algorithm selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MutationPattern {
    /// Per-entry trigger with a uniform delta.
    #[default]
    Uniform,
    /// Per-entry trigger with a Gaussian delta.
    Gaussian,
    /// Small-magnitude weights mutate more often.
    Selective,
    /// Coherent per-channel shifts.
    Spatial,
    /// Uniform rule with strength decaying over step count.
    Temporal,
}

impl MutationPattern {
    /// Parse a pattern name. Unknown names fall back to Uniform, logged at
    /// warn level.
    pub fn from_name(name: &str) -> Self {
        match name {
            "uniform" => Self::Uniform,
            "gaussian" => Self::Gaussian,
            "selective" => Self::Selective,
            "spatial" => Self::Spatial,
            "temporal" => Self::Temporal,
            other => {
                log::warn!("Unknown mutation pattern '{other}', falling back to uniform");
                Self::Uniform
            }
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Uniform => "uniform",
            Self::Gaussian => "gaussian",
            Self::Selective => "selective",
            Self::Spatial => "spatial",
            Self::Temporal => "temporal",
        }
    }
}

/// Mutation parameters and eligibility gates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MutationConfig {
    /// Per-weight mutation trigger probability (0-1).
    pub rate: f32,
    /// Fraction of weight_range used as mutation magnitude (0-1).
    pub strength: f32,
    /// Mutation algorithm.
    #[serde(default)]
    pub pattern: MutationPattern,
    /// Per-output-channel eligibility gate.
    #[serde(default = "default_channel_mask")]
    pub channel_mask: [bool; CHANNEL_SLOTS],
    /// Per-kernel-position eligibility gate.
    #[serde(default = "default_kernel_mask")]
    pub kernel_mask: [bool; KERNEL_POSITIONS],
    /// Decay base for the temporal pattern.
    #[serde(default = "default_decay_factor")]
    pub decay_factor: f32,
}

fn default_channel_mask() -> [bool; CHANNEL_SLOTS] {
    [true; CHANNEL_SLOTS]
}
fn default_kernel_mask() -> [bool; KERNEL_POSITIONS] {
    [true; KERNEL_POSITIONS]
}
fn default_decay_factor() -> f32 {
    0.98
}

impl Default for MutationConfig {
    fn default() -> Self {
        Self {
            rate: 0.1,
            strength: 0.3,
            pattern: MutationPattern::default(),
            channel_mask: default_channel_mask(),
            kernel_mask: default_kernel_mask(),
            decay_factor: default_decay_factor(),
        }
    }
}

impl MutationConfig {
    fn sanitize(&mut self) {
        self.rate = self.rate.clamp(0.0, 1.0);
        self.strength = self.strength.clamp(0.0, 1.0);
        self.decay_factor = self.decay_factor.clamp(0.0, 1.0);
    }
}

/// Nonlinearity applied to each convolution sum.
///
/// Parameters live on the variant they belong to; slot meanings never
/// overlap between functions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Activation {
    /// tanh(scale * x + bias)
    Tanh {
        #[serde(default = "default_unit")]
        scale: f32,
        #[serde(default)]
        bias: f32,
    },
    /// Leaky rectifier: x above threshold, leak * x below.
    Relu {
        #[serde(default)]
        threshold: f32,
        #[serde(default = "default_leak")]
        leak: f32,
    },
    /// 1 / (1 + exp(-(scale * x + bias)))
    Sigmoid {
        #[serde(default = "default_unit")]
        scale: f32,
        #[serde(default)]
        bias: f32,
    },
    /// Pass-through.
    Identity,
    /// x / (1 + exp(-beta * x))
    Swish {
        #[serde(default = "default_unit")]
        beta: f32,
    },
    /// tanh-approximated GELU with a tunable alpha on the inner term.
    Gelu {
        #[serde(default = "default_unit")]
        alpha: f32,
    },
}

fn default_unit() -> f32 {
    1.0
}
fn default_leak() -> f32 {
    0.01
}

impl Default for Activation {
    fn default() -> Self {
        Self::Tanh {
            scale: default_unit(),
            bias: 0.0,
        }
    }
}
