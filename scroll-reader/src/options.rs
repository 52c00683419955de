use thiserror::Error;

/// Rejected configuration values.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum OptionsError {
    #[error("invalid scale range: min_scale={min} max_scale={max} (need 0 < min <= 1 <= max)")]
    InvalidScaleRange { min: f32, max: f32 },
    #[error("fling friction must be positive and finite, got {0}")]
    NonPositiveFriction(f32),
    #[error("invalid fling velocity range: min={min} max={max}")]
    InvalidFlingVelocityRange { min: f32, max: f32 },
    #[error("screen density must be positive and finite, got {0}")]
    NonPositiveDensity(f32),
    #[error("divider height must not be negative, got {0}")]
    NegativeDividerHeight(i32),
    #[error("touch slop must not be negative, got {0}")]
    NegativeTouchSlop(f32),
}

/// Configuration for [`crate::GestureController`] and the components it drives.
///
/// With `feature = "serde"`, missing fields fall back to their defaults, so a host can keep a
/// partial document (e.g. only `divider_height`) in its own settings file.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ReaderOptions {
    /// Space between consecutive items, in content pixels.
    pub divider_height: i32,
    pub min_scale: f32,
    pub max_scale: f32,
    /// Friction of the fling deceleration curve.
    pub fling_friction: f32,
    /// Screen density (1.0 = 160 dpi) used by the fling deceleration model.
    pub density: f32,
    /// Pointer travel (px) before a press becomes a drag.
    pub touch_slop: f32,
    /// Release velocity (px/s) required to start a fling.
    pub min_fling_velocity: f32,
    /// Release velocities are capped to this value (px/s).
    pub max_fling_velocity: f32,
    pub snap_animation_duration_ms: u64,
    /// Remaining items below the viewport that count as "running low". `0` disables it.
    pub low_data_threshold: usize,
    /// Minimum distance between two fingers (px) for a pinch to count as a zoom.
    pub min_finger_distance: f32,
    /// Fraction of an item that must remain visible above the viewport bottom for it to be
    /// the current page. Tunable; nothing else depends on the exact value.
    pub current_item_visibility: f32,
    pub double_tap_timeout_ms: u64,
    pub double_tap_slop: f32,
    /// Presses held longer than this are not taps.
    pub long_press_timeout_ms: u64,
}

impl Default for ReaderOptions {
    fn default() -> Self {
        Self {
            divider_height: 10,
            min_scale: 0.5,
            max_scale: 2.0,
            fling_friction: 0.03,
            density: 1.0,
            touch_slop: 8.0,
            min_fling_velocity: 50.0,
            max_fling_velocity: 8_000.0,
            snap_animation_duration_ms: 200,
            low_data_threshold: 0,
            min_finger_distance: 10.0,
            current_item_visibility: 0.66,
            double_tap_timeout_ms: 300,
            double_tap_slop: 100.0,
            long_press_timeout_ms: 500,
        }
    }
}

impl ReaderOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_divider_height(mut self, divider_height: i32) -> Self {
        self.divider_height = divider_height;
        self
    }

    pub fn with_scale_range(mut self, min_scale: f32, max_scale: f32) -> Self {
        self.min_scale = min_scale;
        self.max_scale = max_scale;
        self
    }

    pub fn with_fling_friction(mut self, fling_friction: f32) -> Self {
        self.fling_friction = fling_friction;
        self
    }

    pub fn with_density(mut self, density: f32) -> Self {
        self.density = density;
        self
    }

    pub fn with_touch_slop(mut self, touch_slop: f32) -> Self {
        self.touch_slop = touch_slop;
        self
    }

    pub fn with_fling_velocity_range(mut self, min: f32, max: f32) -> Self {
        self.min_fling_velocity = min;
        self.max_fling_velocity = max;
        self
    }

    pub fn with_snap_animation_duration_ms(mut self, duration_ms: u64) -> Self {
        self.snap_animation_duration_ms = duration_ms;
        self
    }

    pub fn with_low_data_threshold(mut self, threshold: usize) -> Self {
        self.low_data_threshold = threshold;
        self
    }

    pub fn with_min_finger_distance(mut self, distance: f32) -> Self {
        self.min_finger_distance = distance;
        self
    }

    pub fn with_current_item_visibility(mut self, fraction: f32) -> Self {
        self.current_item_visibility = fraction;
        self
    }

    pub fn with_double_tap(mut self, timeout_ms: u64, slop: f32) -> Self {
        self.double_tap_timeout_ms = timeout_ms;
        self.double_tap_slop = slop;
        self
    }

    pub fn with_long_press_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.long_press_timeout_ms = timeout_ms;
        self
    }

    pub fn validate(&self) -> Result<(), OptionsError> {
        let (min, max) = (self.min_scale, self.max_scale);
        if !(min.is_finite() && max.is_finite() && min > 0.0 && min <= 1.0 && max >= 1.0) {
            return Err(OptionsError::InvalidScaleRange { min, max });
        }
        if !(self.fling_friction.is_finite() && self.fling_friction > 0.0) {
            return Err(OptionsError::NonPositiveFriction(self.fling_friction));
        }
        let (vmin, vmax) = (self.min_fling_velocity, self.max_fling_velocity);
        if !(vmin.is_finite() && vmax.is_finite() && vmin >= 0.0 && vmin <= vmax) {
            return Err(OptionsError::InvalidFlingVelocityRange {
                min: vmin,
                max: vmax,
            });
        }
        if !(self.density.is_finite() && self.density > 0.0) {
            return Err(OptionsError::NonPositiveDensity(self.density));
        }
        if self.divider_height < 0 {
            return Err(OptionsError::NegativeDividerHeight(self.divider_height));
        }
        if !(self.touch_slop >= 0.0) {
            return Err(OptionsError::NegativeTouchSlop(self.touch_slop));
        }
        Ok(())
    }

    /// Returns a copy where every invalid field is replaced by a usable value.
    ///
    /// Inverted ranges are swapped; non-finite or out-of-domain values fall back to defaults.
    pub fn sanitized(&self) -> Self {
        let defaults = Self::default();
        let mut out = self.clone();

        let (mut min, mut max) = (out.min_scale, out.max_scale);
        if min > max {
            core::mem::swap(&mut min, &mut max);
        }
        if !(min.is_finite() && min > 0.0 && min <= 1.0) {
            min = defaults.min_scale;
        }
        if !(max.is_finite() && max >= 1.0) {
            max = defaults.max_scale;
        }
        out.min_scale = min;
        out.max_scale = max;

        if !(out.fling_friction.is_finite() && out.fling_friction > 0.0) {
            out.fling_friction = defaults.fling_friction;
        }
        if !(out.density.is_finite() && out.density > 0.0) {
            out.density = defaults.density;
        }

        let (mut vmin, mut vmax) = (out.min_fling_velocity, out.max_fling_velocity);
        if vmin > vmax {
            core::mem::swap(&mut vmin, &mut vmax);
        }
        if !(vmin.is_finite() && vmin >= 0.0) {
            vmin = defaults.min_fling_velocity;
        }
        if !(vmax.is_finite() && vmax >= vmin) {
            vmax = defaults.max_fling_velocity.max(vmin);
        }
        out.min_fling_velocity = vmin;
        out.max_fling_velocity = vmax;

        out.divider_height = out.divider_height.max(0);
        if !(out.touch_slop.is_finite() && out.touch_slop >= 0.0) {
            out.touch_slop = defaults.touch_slop;
        }
        if !(out.min_finger_distance.is_finite() && out.min_finger_distance >= 0.0) {
            out.min_finger_distance = defaults.min_finger_distance;
        }
        if !(out.current_item_visibility.is_finite()
            && (0.0..=1.0).contains(&out.current_item_visibility))
        {
            out.current_item_visibility = defaults.current_item_visibility;
        }
        if !(out.double_tap_slop.is_finite() && out.double_tap_slop >= 0.0) {
            out.double_tap_slop = defaults.double_tap_slop;
        }
        out
    }
}
