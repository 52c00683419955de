//! Release-velocity estimation for flings.
//!
//! Impulse strategy: the velocity is derived from the kinetic energy the pointer imparted over
//! the most recent samples, which is less noisy than a two-point difference.

const HISTORY_SIZE: usize = 20;

/// Samples older than this (relative to the newest) are ignored.
const HORIZON_MS: u64 = 100;

/// A gap this long between consecutive samples means the pointer had stopped.
pub const ASSUME_STOPPED_MS: u64 = 40;

#[derive(Clone, Copy, Debug, Default)]
struct Sample {
    time_ms: u64,
    position: f32,
}

/// Tracks one axis of pointer positions.
#[derive(Clone, Debug)]
pub struct VelocityTracker1D {
    samples: [Option<Sample>; HISTORY_SIZE],
    index: usize,
}

impl Default for VelocityTracker1D {
    fn default() -> Self {
        Self::new()
    }
}

impl VelocityTracker1D {
    pub fn new() -> Self {
        Self {
            samples: [None; HISTORY_SIZE],
            index: 0,
        }
    }

    pub fn add_position(&mut self, time_ms: u64, position: f32) {
        if !position.is_finite() {
            return;
        }
        self.index = (self.index + 1) % HISTORY_SIZE;
        self.samples[self.index] = Some(Sample { time_ms, position });
    }

    /// Velocity in px/s; `0.0` with fewer than two usable samples.
    pub fn velocity(&self) -> f32 {
        let Some(newest) = self.samples[self.index] else {
            return 0.0;
        };

        let mut positions = [0.0f32; HISTORY_SIZE];
        let mut times = [0.0f32; HISTORY_SIZE];
        let mut count = 0;
        let mut cursor = self.index;
        let mut newer = newest;

        while let Some(sample) = self.samples[cursor] {
            let age = newest.time_ms.saturating_sub(sample.time_ms);
            let gap = newer.time_ms.saturating_sub(sample.time_ms);
            if age > HORIZON_MS || gap > ASSUME_STOPPED_MS {
                break;
            }
            positions[count] = sample.position;
            times[count] = -(age as f32);
            newer = sample;
            count += 1;
            if count >= HISTORY_SIZE {
                break;
            }
            cursor = if cursor == 0 { HISTORY_SIZE - 1 } else { cursor - 1 };
        }

        if count < 2 {
            return 0.0;
        }
        impulse_velocity(&positions[..count], &times[..count]) * 1000.0
    }

    /// Velocity in px/s clamped to `±max_velocity`.
    pub fn velocity_with_max(&self, max_velocity: f32) -> f32 {
        if !max_velocity.is_finite() || max_velocity <= 0.0 {
            return 0.0;
        }
        let v = self.velocity();
        if v.is_nan() {
            return 0.0;
        }
        v.clamp(-max_velocity, max_velocity)
    }

    pub fn reset(&mut self) {
        self.samples = [None; HISTORY_SIZE];
        self.index = 0;
    }
}

/// `positions`/`times` are ordered newest first; times are non-positive ms.
fn impulse_velocity(positions: &[f32], times: &[f32]) -> f32 {
    let start = positions.len() - 1;
    let mut work = 0.0f32;
    let mut next_time = times[start];

    for i in (1..=start).rev() {
        let current_time = next_time;
        next_time = times[i - 1];
        if current_time == next_time {
            continue;
        }
        let v_curr = (positions[i] - positions[i - 1]) / (current_time - next_time);
        let v_prev = energy_to_velocity(work);
        work += (v_curr - v_prev) * v_curr.abs();
        if i == start {
            work *= 0.5;
        }
    }

    energy_to_velocity(work)
}

#[inline]
fn energy_to_velocity(energy: f32) -> f32 {
    energy.signum() * (2.0 * energy.abs()).sqrt()
}
