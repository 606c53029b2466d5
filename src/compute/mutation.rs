//! Mutation engine - randomized weight tensor transformations.
//!
//! Each pattern reads the tensor, perturbs the entries eligible under the
//! channel/position masks, and leaves constraint re-application and history
//! recording to the engine. Eligibility always requires both
//! `channel_mask[out]` and `kernel_mask[pos]`.

use std::collections::VecDeque;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::schema::{CHANNEL_SLOTS, KERNEL_POSITIONS, MutationConfig, MutationPattern};

use super::{EngineRng, WeightTensor};

/// Bounded mutation history capacity.
pub const HISTORY_CAPACITY: usize = 100;

/// One recorded mutation event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MutationRecord {
    /// Unix timestamp in milliseconds.
    pub timestamp_ms: u64,
    pub pattern: MutationPattern,
    pub rate: f32,
    pub strength: f32,
    /// Simulation step count at the time of mutation.
    pub step: u64,
}

impl MutationRecord {
    pub fn now(pattern: MutationPattern, rate: f32, strength: f32, step: u64) -> Self {
        let timestamp_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or_default();
        Self {
            timestamp_ms,
            pattern,
            rate,
            strength,
            step,
        }
    }
}

/// Ring of the most recent mutation events; oldest evicted first.
#[derive(Debug, Default)]
pub struct MutationHistory {
    entries: VecDeque<MutationRecord>,
}

impl MutationHistory {
    pub fn push(&mut self, record: MutationRecord) {
        if self.entries.len() == HISTORY_CAPACITY {
            self.entries.pop_front();
        }
        self.entries.push_back(record);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &MutationRecord> {
        self.entries.iter()
    }

    pub fn latest(&self) -> Option<&MutationRecord> {
        self.entries.back()
    }
}

/// Mutation strength after temporal decay at the given step count.
#[inline]
pub fn temporal_strength(strength: f32, decay_factor: f32, step: u64) -> f32 {
    strength * decay_factor.powf(step as f32 / 1000.0)
}

/// Apply one mutation pattern to the tensor.
///
/// The caller re-applies constraints afterwards; the tensor is never
/// visible in a partially-constrained state.
pub fn apply(
    tensor: &mut WeightTensor,
    pattern: MutationPattern,
    config: &MutationConfig,
    num_channels: usize,
    weight_range: f32,
    step: u64,
    rng: &mut EngineRng,
) {
    let magnitude = config.strength * weight_range;

    match pattern {
        MutationPattern::Uniform => {
            for_each_eligible(tensor, config, num_channels, |w, rng| {
                if rng.chance(config.rate) {
                    *w += rng.signed_unit() * magnitude;
                }
            }, rng);
        }
        MutationPattern::Gaussian => {
            for_each_eligible(tensor, config, num_channels, |w, rng| {
                if rng.chance(config.rate) {
                    *w += rng.normal() * magnitude;
                }
            }, rng);
        }
        MutationPattern::Selective => {
            // Small-magnitude weights mutate more often; the probability can
            // exceed 1 for near-zero weights, which saturates to a certain
            // mutation.
            for_each_eligible(tensor, config, num_channels, |w, rng| {
                let probability = config.rate * (1.0 + (-w.abs()).exp());
                if rng.chance(probability) {
                    *w += rng.signed_unit() * magnitude;
                }
            }, rng);
        }
        MutationPattern::Spatial => {
            for out in 0..CHANNEL_SLOTS {
                if !config.channel_mask[out] {
                    continue;
                }
                if rng.chance(config.rate * 0.5) {
                    // Coherent shift across the whole output channel.
                    let delta = rng.signed_unit() * magnitude * 0.5;
                    for pos in 0..KERNEL_POSITIONS {
                        if !config.kernel_mask[pos] {
                            continue;
                        }
                        for ic in 0..num_channels {
                            let idx = WeightTensor::index(out, pos, ic, num_channels);
                            tensor.as_mut_slice()[idx] += delta;
                        }
                    }
                } else {
                    for pos in 0..KERNEL_POSITIONS {
                        if !config.kernel_mask[pos] {
                            continue;
                        }
                        for ic in 0..num_channels {
                            if rng.chance(config.rate) {
                                let idx = WeightTensor::index(out, pos, ic, num_channels);
                                tensor.as_mut_slice()[idx] += rng.signed_unit() * magnitude;
                            }
                        }
                    }
                }
            }
        }
        MutationPattern::Temporal => {
            let decayed = temporal_strength(config.strength, config.decay_factor, step);
            let magnitude = decayed * weight_range;
            for_each_eligible(tensor, config, num_channels, |w, rng| {
                if rng.chance(config.rate) {
                    *w += rng.signed_unit() * magnitude;
                }
            }, rng);
        }
    }
}

/// Visit every addressable tensor entry whose channel and position masks
/// are both enabled.
fn for_each_eligible(
    tensor: &mut WeightTensor,
    config: &MutationConfig,
    num_channels: usize,
    mut visit: impl FnMut(&mut f32, &mut EngineRng),
    rng: &mut EngineRng,
) {
    for out in 0..CHANNEL_SLOTS {
        if !config.channel_mask[out] {
            continue;
        }
        for pos in 0..KERNEL_POSITIONS {
            if !config.kernel_mask[pos] {
                continue;
            }
            for ic in 0..num_channels {
                let idx = WeightTensor::index(out, pos, ic, num_channels);
                visit(&mut tensor.as_mut_slice()[idx], rng);
            }
        }
    }
}
