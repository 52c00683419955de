//! Fling deceleration.
//!
//! Positions follow the spline-based decay curve of Android's `Scroller`, parameterised by a
//! friction constant and the screen density. The engine performs no timing of its own: every
//! [`FlingPhysics::tick`] receives the host's frame time.

use std::sync::LazyLock;

use crate::{EventQueue, ReaderEvent};

const INFLECTION: f64 = 0.35;
const START_TENSION: f64 = 0.5;
const END_TENSION: f64 = 1.0;
const P1: f64 = START_TENSION * INFLECTION;
const P2: f64 = 1.0 - END_TENSION * (1.0 - INFLECTION);

const NB_SAMPLES: usize = 100;

const GRAVITY_EARTH: f64 = 9.80665;
const INCHES_PER_METER: f64 = 39.37;
/// `ln(0.78) / ln(0.9)`
const DECELERATION_RATE: f64 = 2.358_201_6;

/// Weight of the newest sample in the reported velocity.
const VELOCITY_SMOOTHING: f32 = 0.5;

/// Distance coefficients sampled along the fling spline, `positions[NB_SAMPLES] == 1.0`.
static SPLINE_POSITIONS: LazyLock<[f64; NB_SAMPLES + 1]> = LazyLock::new(|| {
    let mut positions = [0.0f64; NB_SAMPLES + 1];
    let mut x_min = 0.0f64;
    for (i, slot) in positions.iter_mut().take(NB_SAMPLES).enumerate() {
        let alpha = i as f64 / NB_SAMPLES as f64;
        let mut x_max = 1.0f64;
        let (x, coef) = loop {
            let x_mid = x_min + (x_max - x_min) / 2.0;
            let c = 3.0 * x_mid * (1.0 - x_mid);
            let tx = c * ((1.0 - x_mid) * P1 + x_mid * P2) + x_mid * x_mid * x_mid;
            if (tx - alpha).abs() < 1e-5 || x_max - x_min < 1e-12 {
                break (x_mid, c);
            }
            if tx > alpha {
                x_max = x_mid;
            } else {
                x_min = x_mid;
            }
        };
        *slot = coef * ((1.0 - x) * START_TENSION + x) + x * x * x;
    }
    positions[NB_SAMPLES] = 1.0;
    positions
});

/// Fraction of the total fling distance covered at `t` (0..=1 of the duration).
fn spline_distance(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    let index = (NB_SAMPLES as f64 * t) as usize;
    if index >= NB_SAMPLES {
        return 1.0;
    }
    let t_inf = index as f64 / NB_SAMPLES as f64;
    let t_sup = (index + 1) as f64 / NB_SAMPLES as f64;
    let d_inf = SPLINE_POSITIONS[index];
    let d_sup = SPLINE_POSITIONS[index + 1];
    d_inf + (t - t_inf) * (d_sup - d_inf) / (t_sup - t_inf)
}

/// Duration and travel of a fling with a given initial speed.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FlingCurve {
    pub duration_ms: u64,
    /// Total travel in px (unsigned).
    pub distance: f64,
}

impl FlingCurve {
    pub fn new(speed: f32, friction: f32, density: f32) -> Self {
        let speed = f64::from(speed.abs());
        if !(speed.is_finite() && speed > 0.0) {
            return Self {
                duration_ms: 0,
                distance: 0.0,
            };
        }
        let physical = GRAVITY_EARTH * INCHES_PER_METER * f64::from(density) * 160.0 * 0.84;
        let decel = f64::from(friction) * physical;
        let l = (INFLECTION * speed / decel).ln();
        let decel_minus_one = DECELERATION_RATE - 1.0;
        let duration = 1000.0 * (l / decel_minus_one).exp();
        let distance = decel * (DECELERATION_RATE / decel_minus_one * l).exp();
        Self {
            duration_ms: duration.max(0.0) as u64,
            distance,
        }
    }

    /// Travelled distance (unsigned) after `elapsed_ms`.
    pub fn distance_at(&self, elapsed_ms: u64) -> f64 {
        if self.duration_ms == 0 {
            return self.distance;
        }
        self.distance * spline_distance(elapsed_ms as f64 / self.duration_ms as f64)
    }
}

/// Result of one fling tick, in scroll space (positive `delta_y` scrolls the content up).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FlingStep {
    pub delta_x: i32,
    pub delta_y: i32,
    pub finished: bool,
}

#[derive(Clone, Debug)]
struct FlingSession {
    curve: FlingCurve,
    /// Unit direction of travel.
    dir_x: f64,
    dir_y: f64,
    velocity_x: f32,
    velocity_y: f32,
    start_ms: u64,
    last_tick_ms: u64,
    last_x: i32,
    last_y: i32,
    last_exact_y: f64,
}

/// Velocity-driven deceleration producing per-tick offset deltas.
#[derive(Clone, Debug)]
pub struct FlingPhysics {
    friction: f32,
    density: f32,
    session: Option<FlingSession>,
    current_velocity: f32,
}

impl FlingPhysics {
    pub fn new(friction: f32, density: f32) -> Self {
        Self {
            friction,
            density,
            session: None,
            current_velocity: 0.0,
        }
    }

    pub fn set_friction(&mut self, friction: f32) {
        self.friction = friction;
    }

    pub fn friction(&self) -> f32 {
        self.friction
    }

    pub fn is_running(&self) -> bool {
        self.session.is_some()
    }

    pub fn is_finished(&self) -> bool {
        self.session.is_none()
    }

    /// Smoothed instantaneous velocity along y, px/s. Zero when idle.
    pub fn current_velocity(&self) -> f32 {
        self.current_velocity
    }

    /// Initial velocity of the running session.
    pub fn initial_velocity(&self) -> Option<(f32, f32)> {
        self.session.as_ref().map(|s| (s.velocity_x, s.velocity_y))
    }

    /// Expected duration of the running session.
    pub fn duration_ms(&self) -> Option<u64> {
        self.session.as_ref().map(|s| s.curve.duration_ms)
    }

    /// Starts a fling with the given signed velocities (px/s, scroll space).
    ///
    /// A running session is stopped first, so its end notification precedes the new start.
    pub fn start(&mut self, velocity_x: f32, velocity_y: f32, now_ms: u64, events: &mut EventQueue) {
        self.stop(events);

        let vx = if velocity_x.is_finite() { velocity_x } else { 0.0 };
        let vy = if velocity_y.is_finite() { velocity_y } else { 0.0 };
        let speed = (f64::from(vx).powi(2) + f64::from(vy).powi(2)).sqrt();
        let (dir_x, dir_y) = if speed > 0.0 {
            (f64::from(vx) / speed, f64::from(vy) / speed)
        } else {
            (0.0, 0.0)
        };
        let curve = FlingCurve::new(speed as f32, self.friction, self.density);
        vdebug!(
            velocity_x = vx,
            velocity_y = vy,
            duration_ms = curve.duration_ms,
            distance = curve.distance,
            "FlingPhysics::start"
        );

        self.session = Some(FlingSession {
            curve,
            dir_x,
            dir_y,
            velocity_x: vx,
            velocity_y: vy,
            start_ms: now_ms,
            last_tick_ms: now_ms,
            last_x: 0,
            last_y: 0,
            last_exact_y: 0.0,
        });
        self.current_velocity = vy;
        events.emit(ReaderEvent::FlingStarted {
            velocity_x: vx,
            velocity_y: vy,
        });
    }

    /// Advances the decay curve to `now_ms`.
    ///
    /// `|delta_y|` is kept below `viewport_height` so a single tick never skips a whole
    /// screen of recycling. A finished tick ends the session (and emits `FlingEnded`).
    pub fn tick(&mut self, now_ms: u64, viewport_height: i32, events: &mut EventQueue) -> FlingStep {
        let Some(session) = self.session.as_mut() else {
            return FlingStep {
                finished: true,
                ..FlingStep::default()
            };
        };

        let elapsed = now_ms.saturating_sub(session.start_ms);
        let travelled = session.curve.distance_at(elapsed);
        let exact_x = travelled * session.dir_x;
        let exact_y = travelled * session.dir_y;
        let x = exact_x.round() as i32;
        let y = exact_y.round() as i32;

        let delta_x = x - session.last_x;
        let mut delta_y = y - session.last_y;
        let limit = (viewport_height - 1).max(1);
        delta_y = delta_y.clamp(-limit, limit);

        let dt_ms = now_ms.saturating_sub(session.last_tick_ms);
        if dt_ms > 0 {
            let instantaneous = ((exact_y - session.last_exact_y) * 1000.0 / dt_ms as f64) as f32;
            self.current_velocity = VELOCITY_SMOOTHING * instantaneous
                + (1.0 - VELOCITY_SMOOTHING) * self.current_velocity;
        }

        session.last_x = x;
        session.last_y = y;
        session.last_exact_y = exact_y;
        session.last_tick_ms = session.last_tick_ms.max(now_ms);

        let stalled = dt_ms > 0 && delta_x == 0 && delta_y == 0;
        let finished = elapsed >= session.curve.duration_ms || stalled;
        if finished {
            self.stop(events);
        }

        FlingStep {
            delta_x,
            delta_y,
            finished,
        }
    }

    /// Cancels the running session. Returns `false` (and emits nothing) when already stopped.
    pub fn stop(&mut self, events: &mut EventQueue) -> bool {
        if self.session.take().is_none() {
            return false;
        }
        vdebug!("FlingPhysics::stop");
        self.current_velocity = 0.0;
        events.emit(ReaderEvent::FlingEnded);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spline_endpoints() {
        assert!(spline_distance(0.0).abs() < 0.01);
        assert!((spline_distance(1.0) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn spline_is_monotonic_and_concave() {
        let mut prev = 0.0;
        let mut prev_slope = f64::INFINITY;
        for i in 1..=NB_SAMPLES {
            let d = SPLINE_POSITIONS[i];
            let slope = d - prev;
            assert!(slope >= 0.0, "spline must not go backwards at {i}");
            assert!(slope <= prev_slope + 1e-9, "spline slope must not grow at {i}");
            prev = d;
            prev_slope = slope;
        }
    }

    #[test]
    fn faster_flings_travel_further() {
        let slow = FlingCurve::new(1000.0, 0.03, 1.0);
        let fast = FlingCurve::new(4000.0, 0.03, 1.0);
        assert!(slow.duration_ms > 0);
        assert!(fast.duration_ms > slow.duration_ms);
        assert!(fast.distance > slow.distance);
    }

    #[test]
    fn zero_velocity_has_no_travel() {
        let curve = FlingCurve::new(0.0, 0.03, 1.0);
        assert_eq!(curve.duration_ms, 0);
        assert_eq!(curve.distance, 0.0);
    }
}
