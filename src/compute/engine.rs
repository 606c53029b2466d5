//! Engine - owns the weight tensor, state buffers, RNG, and scheduler,
//! and exposes the full operation surface consumed by a presentation or
//! host layer.
//!
//! Construction is the only fallible operation. Every setter clamps
//! out-of-range values to the documented range instead of rejecting them;
//! stepping and mutation are pure numeric transforms with no failure mode.

use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::schema::{
    Activation, CHANNEL_SLOTS, ConfigError, EngineConfig, InitStrategy, KERNEL_POSITIONS,
    MutationPattern, NUM_CHANNELS_RANGE, SCALE_RANGE, STEPS_PER_FRAME_RANGE, SeedPattern,
    WEIGHT_RANGE_RANGE,
};

use super::mutation::{self, MutationHistory, MutationRecord};
use super::{
    AutoEvolveScheduler, CustomInitFn, EngineRng, StateBuffers, WEIGHT_COUNT, WeightTensor,
    evaluator,
};

/// Smoothing factor for the instantaneous step-rate estimate.
const RATE_EMA_ALPHA: f32 = 0.2;

/// The neural CA engine.
pub struct Engine {
    config: EngineConfig,
    weights: WeightTensor,
    state: StateBuffers,
    rng: EngineRng,
    scheduler: AutoEvolveScheduler,
    history: MutationHistory,
    custom_init: Option<Box<CustomInitFn>>,
    last_step_at: Option<Instant>,
    steps_per_second: f32,
}

impl Engine {
    /// Create an engine with entropy-seeded randomness.
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        Self::build(config, EngineRng::random())
    }

    /// Create an engine with a fixed RNG seed for reproducible runs.
    pub fn with_rng(config: EngineConfig, seed: u64) -> Result<Self, ConfigError> {
        Self::build(config, EngineRng::new(seed))
    }

    fn build(mut config: EngineConfig, mut rng: EngineRng) -> Result<Self, ConfigError> {
        config.sanitize();
        config.validate()?;

        let mut weights = WeightTensor::new();
        weights.initialize(
            config.weight_init,
            config.num_channels,
            config.weight_range,
            &mut rng,
            None,
        );
        weights.apply_constraints(&config.constraints);

        let state = StateBuffers::new(config.grid_size);

        let mut scheduler = AutoEvolveScheduler::new();
        if config.auto_evolve {
            scheduler.enable(Instant::now(), &mut rng);
        }

        log::info!(
            "Engine created: {0}x{0} grid, {1} channels, {2} init",
            config.grid_size,
            config.num_channels,
            config.weight_init.name()
        );

        Ok(Self {
            config,
            weights,
            state,
            rng,
            scheduler,
            history: MutationHistory::default(),
            custom_init: None,
            last_step_at: None,
            steps_per_second: 0.0,
        })
    }

    /// Perform one update step: poll the auto-evolve trigger, evaluate the
    /// next buffer, and swap roles.
    pub fn step(&mut self) {
        let now = Instant::now();
        if self.scheduler.poll(now, &mut self.rng) {
            log::debug!("Auto-evolve trigger at step {}", self.state.step());
            self.mutate_weights(None);
        }

        let (current, next) = self.state.split();
        evaluator::step_into(current, next, &self.weights, &self.config);
        self.state.swap();

        if let Some(previous) = self.last_step_at {
            let dt = now.duration_since(previous).as_secs_f32();
            if dt > 0.0 {
                let instantaneous = 1.0 / dt;
                self.steps_per_second = if self.steps_per_second == 0.0 {
                    instantaneous
                } else {
                    self.steps_per_second * (1.0 - RATE_EMA_ALPHA) + instantaneous * RATE_EMA_ALPHA
                };
            }
        }
        self.last_step_at = Some(now);
    }

    /// Run the configured number of update steps for one visual frame.
    pub fn frame(&mut self) {
        for _ in 0..self.config.steps_per_frame {
            self.step();
        }
    }

    /// Zero both buffers, reset the step counter, and place 1-3 randomized
    /// seeds near the grid center.
    pub fn reset(&mut self) {
        self.state.reset(self.config.num_channels, &mut self.rng);
        log::info!("State reset and reseeded");
    }

    /// Stamp a seed disk into the current buffer.
    pub fn seed(&mut self, x: usize, y: usize, radius: f32, pattern: SeedPattern) {
        let limit = self.config.grid_size - 1;
        self.state.seed(
            x.min(limit),
            y.min(limit),
            radius,
            pattern,
            self.config.num_channels,
            &mut self.rng,
        );
    }

    /// Reinitialize the weight tensor with the given strategy, which also
    /// becomes the configured strategy.
    pub fn initialize_weights(&mut self, strategy: InitStrategy) {
        self.config.weight_init = strategy;
        self.weights.initialize(
            strategy,
            self.config.num_channels,
            self.config.weight_range,
            &mut self.rng,
            self.custom_init.as_deref(),
        );
        self.weights.apply_constraints(&self.config.constraints);
        log::info!("Weights reinitialized with {}", strategy.name());
    }

    /// Mutate the weight tensor, using the configured pattern when none is
    /// given, and record the event.
    pub fn mutate_weights(&mut self, pattern: Option<MutationPattern>) {
        let pattern = pattern.unwrap_or(self.config.mutation.pattern);
        mutation::apply(
            &mut self.weights,
            pattern,
            &self.config.mutation,
            self.config.num_channels,
            self.config.weight_range,
            self.state.step(),
            &mut self.rng,
        );
        self.weights.apply_constraints(&self.config.constraints);
        self.history.push(MutationRecord::now(
            pattern,
            self.config.mutation.rate,
            self.config.mutation.strength,
            self.state.step(),
        ));
        log::debug!("Mutated weights ({}) at step {}", pattern.name(), self.state.step());
    }

    /// Install a generator for the Custom init strategy.
    pub fn set_custom_initializer(
        &mut self,
        generator: impl Fn(usize) -> f32 + Send + Sync + 'static,
    ) {
        self.custom_init = Some(Box::new(generator));
    }

    pub fn enable_auto_evolve(&mut self) {
        self.config.auto_evolve = true;
        self.scheduler.enable(Instant::now(), &mut self.rng);
    }

    pub fn disable_auto_evolve(&mut self) {
        self.config.auto_evolve = false;
        self.scheduler.disable();
    }

    // --- Configuration setters. All silently clamp to the valid range. ---

    pub fn set_num_channels(&mut self, channels: usize) {
        self.config.num_channels = channels.clamp(NUM_CHANNELS_RANGE.0, NUM_CHANNELS_RANGE.1);
    }

    pub fn set_steps_per_frame(&mut self, steps: usize) {
        self.config.steps_per_frame =
            steps.clamp(STEPS_PER_FRAME_RANGE.0, STEPS_PER_FRAME_RANGE.1);
    }

    pub fn set_update_rate(&mut self, rate: f32) {
        self.config.update_rate = rate.clamp(0.0, 1.0);
    }

    pub fn set_activation(&mut self, activation: Activation) {
        self.config.activation = activation;
    }

    pub fn set_weight_range(&mut self, range: f32) {
        self.config.weight_range = range.clamp(WEIGHT_RANGE_RANGE.0, WEIGHT_RANGE_RANGE.1);
    }

    /// Update the hard clamp bounds and re-apply them immediately so the
    /// tensor invariant holds at all times.
    pub fn set_weight_constraints(&mut self, mut min: f32, mut max: f32) {
        if min > max {
            std::mem::swap(&mut min, &mut max);
        }
        self.config.constraints.min = min;
        self.config.constraints.max = max;
        self.weights.apply_constraints(&self.config.constraints);
    }

    pub fn set_channel_scale(&mut self, channel: usize, scale: f32) {
        if channel < CHANNEL_SLOTS {
            self.config.channel_scale[channel] = scale.clamp(SCALE_RANGE.0, SCALE_RANGE.1);
        }
    }

    pub fn set_kernel_scale(&mut self, position: usize, scale: f32) {
        if position < KERNEL_POSITIONS {
            self.config.kernel_scale[position] = scale.clamp(SCALE_RANGE.0, SCALE_RANGE.1);
        }
    }

    pub fn set_mutation_rate(&mut self, rate: f32) {
        self.config.mutation.rate = rate.clamp(0.0, 1.0);
    }

    pub fn set_mutation_strength(&mut self, strength: f32) {
        self.config.mutation.strength = strength.clamp(0.0, 1.0);
    }

    pub fn set_mutation_pattern(&mut self, pattern: MutationPattern) {
        self.config.mutation.pattern = pattern;
    }

    pub fn set_weight_init_strategy(&mut self, strategy: InitStrategy) {
        self.config.weight_init = strategy;
    }

    pub fn set_channel_mutation_mask(&mut self, channel: usize, enabled: bool) {
        if channel < CHANNEL_SLOTS {
            self.config.mutation.channel_mask[channel] = enabled;
        }
    }

    pub fn set_kernel_mutation_mask(&mut self, position: usize, enabled: bool) {
        if position < KERNEL_POSITIONS {
            self.config.mutation.kernel_mask[position] = enabled;
        }
    }

    // --- Introspection. ---

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn step_count(&self) -> u64 {
        self.state.step()
    }

    /// Raw weight tensor values.
    pub fn weights(&self) -> &[f32] {
        self.weights.as_slice()
    }

    /// Replace the weight tensor. Constraints are re-applied, as after any
    /// write.
    pub fn set_weights(&mut self, values: &[f32; WEIGHT_COUNT]) {
        self.weights.copy_from(values);
        self.weights.apply_constraints(&self.config.constraints);
    }

    /// Weight values with channel/kernel scaling applied, for display.
    pub fn effective_weights(&self) -> Vec<f32> {
        self.weights.effective(
            &self.config.channel_scale,
            &self.config.kernel_scale,
            self.config.num_channels,
        )
    }

    /// First `count` effective weights, for compact display.
    pub fn sample_weights(&self, count: usize) -> Vec<f32> {
        let mut sample = self.effective_weights();
        sample.truncate(count);
        sample
    }

    /// Read-only view of the current state buffer (4 channel slots per
    /// cell, row-major).
    pub fn current_state(&self) -> &[f32] {
        self.state.current()
    }

    /// Channel value at (x, y) in the current buffer.
    pub fn get(&self, x: usize, y: usize, channel: usize) -> f32 {
        self.state.get(x, y, channel)
    }

    pub fn mutation_history(&self) -> &MutationHistory {
        &self.history
    }

    /// Engine summary for display layers.
    pub fn network_config(&self) -> NetworkConfig {
        NetworkConfig {
            grid_size: self.config.grid_size,
            num_channels: self.config.num_channels,
            weight_count: WEIGHT_COUNT,
            activation: self.config.activation.name().to_string(),
            weight_range: self.config.weight_range,
            step_count: self.state.step(),
            steps_per_second: self.steps_per_second,
        }
    }

    /// Value statistics over the active channels of the current buffer.
    pub fn stats(&self) -> GridStats {
        GridStats::from_state(&self.state, self.config.num_channels)
    }
}

/// Read-only engine summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    pub grid_size: usize,
    pub num_channels: usize,
    pub weight_count: usize,
    pub activation: String,
    pub weight_range: f32,
    pub step_count: u64,
    /// Smoothed steps per second; 0 until two steps have run.
    pub steps_per_second: f32,
}

/// Grid value statistics for monitoring.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridStats {
    pub min_value: f32,
    pub max_value: f32,
    pub mean_value: f32,
    /// Cells with any active-channel magnitude above 1e-6.
    pub active_cells: usize,
}

impl GridStats {
    fn from_state(state: &StateBuffers, num_channels: usize) -> Self {
        let gs = state.grid_size();
        let buffer = state.current();
        let mut min_value = f32::INFINITY;
        let mut max_value = f32::NEG_INFINITY;
        let mut sum = 0.0f32;
        let mut active_cells = 0usize;

        for cell in 0..gs * gs {
            let base = cell * CHANNEL_SLOTS;
            let mut active = false;
            for c in 0..num_channels {
                let v = buffer[base + c];
                min_value = min_value.min(v);
                max_value = max_value.max(v);
                sum += v;
                active |= v.abs() > 1e-6;
            }
            if active {
                active_cells += 1;
            }
        }

        Self {
            min_value,
            max_value,
            mean_value: sum / (gs * gs * num_channels) as f32,
            active_cells,
        }
    }
}
