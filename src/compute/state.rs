//! Double-buffered cell state storage and seeding.
//!
//! Two equally-shaped flat buffers hold cell state; exactly one is
//! "current" (read) and one is "next" (write) at any time, and they swap
//! roles every step. Buffer identity is never exposed to callers, only
//! the roles. Each cell stores 4 channel slots regardless of the active
//! channel count; unused slots hold 0.

use crate::schema::{CHANNEL_SLOTS, SeedPattern};

use super::EngineRng;

/// Seed radius bounds used by `reset()`.
const RESET_RADIUS: (f32, f32) = (5.0, 20.0);

/// Wrap a coordinate into [0, size) with toroidal topology.
#[inline]
pub fn wrap_coord(coord: i32, size: usize) -> usize {
    let size = size as i32;
    (((coord % size) + size) % size) as usize
}

/// Double-buffered cell state for a square toroidal grid.
pub struct StateBuffers {
    data: [Vec<f32>; 2],
    /// Index of the current (read) buffer; flips each step.
    current: usize,
    grid_size: usize,
    step: u64,
}

impl StateBuffers {
    /// Create zeroed buffers for a grid_size x grid_size grid.
    pub fn new(grid_size: usize) -> Self {
        let len = grid_size * grid_size * CHANNEL_SLOTS;
        Self {
            data: [vec![0.0f32; len], vec![0.0f32; len]],
            current: 0,
            grid_size,
            step: 0,
        }
    }

    #[inline]
    pub fn grid_size(&self) -> usize {
        self.grid_size
    }

    /// Steps taken since construction or the last reset.
    #[inline]
    pub fn step(&self) -> u64 {
        self.step
    }

    /// Base index of the cell at (x, y).
    #[inline]
    pub fn idx(&self, x: usize, y: usize) -> usize {
        (y * self.grid_size + x) * CHANNEL_SLOTS
    }

    /// Read-only view of the current buffer.
    #[inline]
    pub fn current(&self) -> &[f32] {
        &self.data[self.current]
    }

    /// Channel value at (x, y) in the current buffer.
    #[inline]
    pub fn get(&self, x: usize, y: usize, channel: usize) -> f32 {
        self.data[self.current][self.idx(x, y) + channel]
    }

    /// Borrow the current buffer for reading and the next for writing.
    pub fn split(&mut self) -> (&[f32], &mut [f32]) {
        let (a, b) = self.data.split_at_mut(1);
        if self.current == 0 {
            (&a[0], &mut b[0])
        } else {
            (&b[0], &mut a[0])
        }
    }

    /// Flip buffer roles and advance the step counter.
    pub fn swap(&mut self) {
        self.current ^= 1;
        self.step += 1;
    }

    /// Stamp a seed disk into the current buffer.
    ///
    /// The write rectangle is clamped to grid bounds (seeding does not
    /// wrap); cells strictly outside the radius are left untouched. Only
    /// the first `num_channels` channels are written.
    pub fn seed(
        &mut self,
        center_x: usize,
        center_y: usize,
        radius: f32,
        pattern: SeedPattern,
        num_channels: usize,
        rng: &mut EngineRng,
    ) {
        if radius <= 0.0 {
            return;
        }
        let gs = self.grid_size;
        let reach = radius.ceil() as usize;
        let x_lo = center_x.saturating_sub(reach);
        let x_hi = (center_x + reach).min(gs - 1);
        let y_lo = center_y.saturating_sub(reach);
        let y_hi = (center_y + reach).min(gs - 1);

        let buffer = &mut self.data[self.current];
        for y in y_lo..=y_hi {
            for x in x_lo..=x_hi {
                let dx = x as f32 - center_x as f32;
                let dy = y as f32 - center_y as f32;
                let dist = (dx * dx + dy * dy).sqrt();
                if dist > radius {
                    continue;
                }

                let base = (y * gs + x) * CHANNEL_SLOTS;
                match pattern {
                    SeedPattern::Random => {
                        for c in 0..num_channels {
                            buffer[base + c] = rng.signed_unit();
                        }
                    }
                    SeedPattern::Center => {
                        let falloff = 1.0 - dist / radius;
                        for c in 0..num_channels {
                            buffer[base + c] = falloff;
                        }
                    }
                    SeedPattern::Ring => {
                        let peak = 0.7 * radius;
                        let band = 0.3 * radius;
                        let value = (1.0 - (dist - peak).abs() / band).max(0.0);
                        for c in 0..num_channels {
                            buffer[base + c] = value;
                        }
                    }
                    SeedPattern::Gradient => {
                        // Direction from the cell to the seed center.
                        let angle = (-dy).atan2(-dx);
                        buffer[base] = angle.cos();
                        if num_channels >= 2 {
                            buffer[base + 1] = angle.sin();
                        }
                        for c in 2..num_channels {
                            buffer[base + c] = 0.0;
                        }
                    }
                }
            }
        }
    }

    /// Zero both buffers, reset the step counter, and place 1-3 randomized
    /// seeds near the grid center.
    pub fn reset(&mut self, num_channels: usize, rng: &mut EngineRng) {
        for buffer in &mut self.data {
            buffer.fill(0.0);
        }
        self.step = 0;

        let gs = self.grid_size;
        let center = (gs / 2) as i32;
        let bound = (gs / 4).max(1) as f32;
        let count = rng.int_range(1, 3);

        for _ in 0..count {
            let cx = (center + rng.uniform(-bound, bound) as i32).clamp(0, gs as i32 - 1);
            let cy = (center + rng.uniform(-bound, bound) as i32).clamp(0, gs as i32 - 1);
            let radius = rng.uniform(RESET_RADIUS.0, RESET_RADIUS.1);
            let pattern = SeedPattern::ALL[rng.int_range(0, SeedPattern::ALL.len() - 1)];
            self.seed(cx as usize, cy as usize, radius, pattern, num_channels, rng);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_coord() {
        assert_eq!(wrap_coord(0, 8), 0);
        assert_eq!(wrap_coord(-1, 8), 7);
        assert_eq!(wrap_coord(8, 8), 0);
        assert_eq!(wrap_coord(-9, 8), 7);
        assert_eq!(wrap_coord(17, 8), 1);
    }

    #[test]
    fn test_buffers_alternate_strictly() {
        let mut state = StateBuffers::new(4);
        let before = state.current;
        state.swap();
        assert_ne!(state.current, before);
        state.swap();
        assert_eq!(state.current, before);
        assert_eq!(state.step(), 2);
    }

    #[test]
    fn test_center_seed_falloff() {
        let mut state = StateBuffers::new(16);
        let mut rng = EngineRng::new(1);
        state.seed(8, 8, 2.0, SeedPattern::Center, 1, &mut rng);

        // Falloff 1.0 at the center.
        assert!((state.get(8, 8, 0) - 1.0).abs() < 1e-6);
        // Falloff 0.0 at exact distance r (the cell is still written).
        assert!(state.get(10, 8, 0).abs() < 1e-6);
        // Halfway out.
        assert!((state.get(9, 8, 0) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_seed_leaves_outside_untouched() {
        let mut state = StateBuffers::new(16);
        let mut rng = EngineRng::new(2);
        // Pre-mark a cell outside the disk.
        let idx = state.idx(12, 8);
        state.data[state.current][idx] = 0.75;

        state.seed(8, 8, 2.0, SeedPattern::Center, 1, &mut rng);
        assert_eq!(state.get(12, 8, 0), 0.75);
        // Diagonal neighbor at distance sqrt(8) > 2 also untouched.
        assert_eq!(state.get(10, 10, 0), 0.0);
    }

    #[test]
    fn test_seed_clamps_at_grid_edge() {
        let mut state = StateBuffers::new(8);
        let mut rng = EngineRng::new(3);
        // Disk centered at the corner must not wrap or panic.
        state.seed(0, 0, 3.0, SeedPattern::Center, 1, &mut rng);
        assert!((state.get(0, 0, 0) - 1.0).abs() < 1e-6);
        // Opposite corner untouched (no wraparound during seeding).
        assert_eq!(state.get(7, 7, 0), 0.0);
    }

    #[test]
    fn test_ring_seed_peaks_at_seven_tenths() {
        let mut state = StateBuffers::new(32);
        let mut rng = EngineRng::new(4);
        let radius = 10.0;
        state.seed(16, 16, radius, SeedPattern::Ring, 1, &mut rng);

        // Cell at exactly 0.7 * radius from center.
        assert!((state.get(23, 16, 0) - 1.0).abs() < 1e-6);
        // Center of the disk is outside the band.
        assert_eq!(state.get(16, 16, 0), 0.0);
    }

    #[test]
    fn test_gradient_seed_direction() {
        let mut state = StateBuffers::new(16);
        let mut rng = EngineRng::new(5);
        state.seed(8, 8, 3.0, SeedPattern::Gradient, 2, &mut rng);

        // Cell left of center: direction to center is +x, angle 0.
        assert!((state.get(7, 8, 0) - 1.0).abs() < 1e-6);
        assert!(state.get(7, 8, 1).abs() < 1e-6);
        // Cell above center: direction to center is +y, angle pi/2.
        assert!(state.get(8, 7, 0).abs() < 1e-6);
        assert!((state.get(8, 7, 1) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_seed_only_writes_active_channels() {
        let mut state = StateBuffers::new(16);
        let mut rng = EngineRng::new(6);
        state.seed(8, 8, 2.0, SeedPattern::Random, 2, &mut rng);
        assert_eq!(state.get(8, 8, 2), 0.0);
        assert_eq!(state.get(8, 8, 3), 0.0);
    }

    #[test]
    fn test_reset_zeroes_and_reseeds() {
        let mut state = StateBuffers::new(64);
        let mut rng = EngineRng::new(7);
        state.swap();
        state.swap();
        assert_eq!(state.step(), 2);

        state.reset(2, &mut rng);
        assert_eq!(state.step(), 0);
        // Something was seeded.
        assert!(state.current().iter().any(|&v| v != 0.0));
    }
}
