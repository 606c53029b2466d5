//! Update evaluator - the per-step state transition.
//!
//! Computes the next buffer as a pure function of the current buffer, the
//! weight tensor, and the configuration: weighted 3x3 convolution,
//! activation, temporal blend, neighbor-coherence nudge, clamp. Every
//! output cell/channel depends only on immutable snapshots, so the map is
//! embarrassingly parallel; rows are distributed with rayon.

use rayon::prelude::*;

use crate::schema::{CHANNEL_SLOTS, EngineConfig, KERNEL_POSITIONS};

use super::{WeightTensor, wrap_coord};

/// Combined channel-0/1 magnitude above which a neighbor counts as active
/// for the coherence nudge.
const COHERENCE_THRESHOLD: f32 = 0.3;
/// Blend weight kept by the cell's own value during the coherence nudge.
const COHERENCE_KEEP: f32 = 0.85;

/// Compute one simulation step from `current` into `next`.
///
/// Channels at or beyond the active count are written as 0 so stale values
/// from two steps ago never survive a channel-count change.
pub fn step_into(current: &[f32], next: &mut [f32], weights: &WeightTensor, config: &EngineConfig) {
    let gs = config.grid_size;
    let nc = config.num_channels;
    let update_rate = config.update_rate;
    let row_stride = gs * CHANNEL_SLOTS;

    next.par_chunks_mut(row_stride)
        .enumerate()
        .for_each(|(y, row)| {
            let mut neighborhood = [0usize; KERNEL_POSITIONS];

            for x in 0..gs {
                // Base indices of the 3x3 neighborhood, row-major
                // TL,T,TR,L,C,R,BL,B,BR with toroidal wrapping.
                let mut pos = 0;
                for dy in -1i32..=1 {
                    let sy = wrap_coord(y as i32 + dy, gs);
                    for dx in -1i32..=1 {
                        let sx = wrap_coord(x as i32 + dx, gs);
                        neighborhood[pos] = (sy * gs + sx) * CHANNEL_SLOTS;
                        pos += 1;
                    }
                }

                // Channel-0/1 averages over active neighbors (center excluded).
                let mut avg = [0.0f32; 2];
                let mut active_neighbors = 0u32;
                if nc >= 2 {
                    let mut sum0 = 0.0f32;
                    let mut sum1 = 0.0f32;
                    for (p, &base) in neighborhood.iter().enumerate() {
                        if p == 4 {
                            continue;
                        }
                        let c0 = current[base];
                        let c1 = current[base + 1];
                        if (c0 * c0 + c1 * c1).sqrt() > COHERENCE_THRESHOLD {
                            sum0 += c0;
                            sum1 += c1;
                            active_neighbors += 1;
                        }
                    }
                    if active_neighbors > 0 {
                        avg[0] = sum0 / active_neighbors as f32;
                        avg[1] = sum1 / active_neighbors as f32;
                    }
                }

                let cell = neighborhood[4];
                for c in 0..CHANNEL_SLOTS {
                    let out = x * CHANNEL_SLOTS + c;
                    if c >= nc {
                        row[out] = 0.0;
                        continue;
                    }

                    let mut sum = 0.0f32;
                    for (p, &base) in neighborhood.iter().enumerate() {
                        let mut acc = 0.0f32;
                        for ic in 0..nc {
                            acc += current[base + ic] * weights.get(c, p, ic, nc);
                        }
                        sum += acc * config.kernel_scale[p];
                    }
                    sum *= config.channel_scale[c];

                    let activated = config.activation.apply(sum);
                    let mut value =
                        current[cell + c] * (1.0 - update_rate) + activated * update_rate;

                    if nc >= 2 && c < 2 && active_neighbors > 0 {
                        value = value * COHERENCE_KEEP + avg[c] * (1.0 - COHERENCE_KEEP);
                    }

                    row[out] = value.clamp(-1.0, 1.0);
                }
            }
        });
}
