use crate::{ContentBounds, Matrix, Point};

/// Linear interpolation of all matrix slots over a fixed duration.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SnapAnimation {
    pub from: Matrix,
    pub to: Matrix,
    pub start_ms: u64,
    pub duration_ms: u64,
}

impl SnapAnimation {
    pub fn new(from: Matrix, to: Matrix, start_ms: u64, duration_ms: u64) -> Self {
        Self {
            from,
            to,
            start_ms,
            duration_ms: duration_ms.max(1),
        }
    }

    pub fn is_done(&self, now_ms: u64) -> bool {
        now_ms.saturating_sub(self.start_ms) >= self.duration_ms
    }

    pub fn sample(&self, now_ms: u64) -> Matrix {
        let elapsed = now_ms.saturating_sub(self.start_ms);
        let t = (elapsed as f32 / self.duration_ms as f32).clamp(0.0, 1.0);
        self.from.lerp(&self.to, t)
    }
}

/// Which content edge an over-scroll pan is pushing against.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Edge {
    Top,
    Bottom,
}

/// Pan/zoom state of the render matrix.
///
/// Invariants after every public operation:
/// - `min_scale <= scale <= max_scale` for zoom results (snap targets are set by the engine
///   itself and are always identity or `max_scale`).
/// - horizontal translation stays between `0` and `-width * (scale - 1)`.
#[derive(Clone, Debug)]
pub struct TransformEngine {
    current: Matrix,
    saved: Matrix,
    snap: Option<SnapAnimation>,
    min_scale: f32,
    max_scale: f32,
    width: f32,
    height: f32,
}

impl TransformEngine {
    pub fn new(min_scale: f32, max_scale: f32) -> Self {
        Self {
            current: Matrix::IDENTITY,
            saved: Matrix::IDENTITY,
            snap: None,
            min_scale,
            max_scale,
            width: 0.0,
            height: 0.0,
        }
    }

    pub fn set_scale_range(&mut self, min_scale: f32, max_scale: f32) {
        self.min_scale = min_scale;
        self.max_scale = max_scale;
    }

    pub fn min_scale(&self) -> f32 {
        self.min_scale
    }

    pub fn max_scale(&self) -> f32 {
        self.max_scale
    }

    pub fn set_viewport(&mut self, width: f32, height: f32) {
        self.width = width;
        self.height = height;
    }

    pub fn current(&self) -> Matrix {
        self.current
    }

    /// Current vertical scale.
    pub fn scale(&self) -> f32 {
        self.current.scale_y
    }

    pub fn snap_animation(&self) -> Option<&SnapAnimation> {
        self.snap.as_ref()
    }

    pub fn is_animating(&self) -> bool {
        self.snap.is_some()
    }

    /// Drops all transform state.
    pub fn reset(&mut self) {
        self.current = Matrix::IDENTITY;
        self.saved = Matrix::IDENTITY;
        self.snap = None;
    }

    /// Remembers the current matrix (gesture start).
    pub fn save(&mut self) {
        self.saved = self.current;
    }

    /// Returns to the matrix remembered by [`Self::save`].
    pub fn restore(&mut self) {
        self.current = self.saved;
    }

    /// Translates horizontally by `delta_x` screen px, then clamps the pan.
    pub fn apply_pan(&mut self, delta_x: f32) {
        if delta_x.is_finite() && delta_x != 0.0 {
            self.current.post_translate(delta_x, 0.0);
        }
        self.clamp_horizontal();
    }

    pub fn clamp_horizontal(&mut self) {
        let limit = -self.width * (self.current.scale_x - 1.0);
        let (lo, hi) = if limit <= 0.0 { (limit, 0.0) } else { (0.0, limit) };
        self.current.translate_x = self.current.translate_x.clamp(lo, hi);
    }

    /// Scales by `scale_ratio` about `focal` (content space), bounded to the scale range.
    ///
    /// When `content` is known, the result is vertically clamped so the content top never
    /// moves below the viewport top and its bottom never rises above the viewport bottom.
    /// Returns the ratio actually applied.
    pub fn apply_zoom(
        &mut self,
        focal: Point,
        scale_ratio: f32,
        content: Option<ContentBounds>,
    ) -> f32 {
        let scale = self.current.scale_x;
        if !(scale_ratio.is_finite() && scale_ratio > 0.0 && scale > 0.0) {
            vwarn!(scale_ratio, scale, "apply_zoom: degenerate scale ratio");
            return 1.0;
        }
        let target = (scale * scale_ratio).clamp(self.min_scale, self.max_scale);
        let effective = target / scale;
        self.current.pre_scale(effective, effective, focal);
        if let Some(content) = content {
            self.clamp_vertical(content);
        }
        vtrace!(scale = self.current.scale_y, effective, "apply_zoom");
        effective
    }

    pub fn clamp_vertical(&mut self, content: ContentBounds) {
        let sy = self.current.scale_y;
        let top = content.top as f32 * sy + self.current.translate_y;
        if top > 0.0 {
            self.current.translate_y -= top;
        }
        let bottom = content.bottom as f32 * sy + self.current.translate_y;
        if bottom < self.height {
            self.current.translate_y += self.height - bottom;
        }
    }

    /// Redirects an over-scroll of `content_dy` (content px) into a vertical pan.
    ///
    /// Returns `true` when the pan hit `edge` and was clamped there.
    pub fn overscroll_pan(&mut self, content_dy: f32, content: ContentBounds, edge: Edge) -> bool {
        if content_dy.is_finite() {
            self.current.pre_translate(0.0, content_dy);
        }
        let sy = self.current.scale_y;
        match edge {
            Edge::Top => {
                let top = content.top as f32 * sy + self.current.translate_y;
                if top > 0.0 {
                    self.current.translate_y -= top;
                    return true;
                }
            }
            Edge::Bottom => {
                let bottom = content.bottom as f32 * sy + self.current.translate_y;
                if bottom < self.height {
                    self.current.translate_y += self.height - bottom;
                    return true;
                }
            }
        }
        false
    }

    /// Starts interpolating from the current matrix to `target`.
    ///
    /// A running animation is replaced, starting from its last sampled state.
    pub fn begin_snap_animation(&mut self, target: Matrix, now_ms: u64, duration_ms: u64) {
        let from = self.step(now_ms);
        vdebug!(duration_ms, target_scale = target.scale_y, "begin_snap_animation");
        self.snap = Some(SnapAnimation::new(from, target, now_ms, duration_ms));
    }

    pub fn snap_to_identity(&mut self, now_ms: u64, duration_ms: u64) {
        self.begin_snap_animation(Matrix::IDENTITY, now_ms, duration_ms);
    }

    /// Double-tap behaviour: zoom to `max_scale` about `at` when not zoomed in, otherwise
    /// reset to identity.
    pub fn toggle_zoom(&mut self, at: Point, now_ms: u64, duration_ms: u64) {
        let target = if self.scale() <= 1.0 {
            Matrix::scale_about(self.max_scale, self.max_scale, at)
        } else {
            Matrix::IDENTITY
        };
        self.begin_snap_animation(target, now_ms, duration_ms);
    }

    /// Matrix to render at `now_ms`.
    ///
    /// Once the animation duration has elapsed the target is committed as the current matrix
    /// and the animation ends; further calls just return it.
    pub fn step(&mut self, now_ms: u64) -> Matrix {
        let Some(snap) = self.snap else {
            return self.current;
        };
        if snap.is_done(now_ms) {
            vtrace!("snap animation committed");
            self.current = snap.to;
            self.snap = None;
            return self.current;
        }
        snap.sample(now_ms)
    }

    /// Commits a running animation immediately.
    pub fn finish_animation(&mut self) {
        if let Some(snap) = self.snap.take() {
            self.current = snap.to;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> TransformEngine {
        let mut t = TransformEngine::new(0.5, 2.0);
        t.set_viewport(400.0, 1000.0);
        t
    }

    #[test]
    fn zoom_is_bounded_by_scale_range() {
        let mut t = engine();
        t.apply_zoom(Point::new(200.0, 500.0), 3.0, None);
        assert_eq!(t.scale(), 2.0);
        t.apply_zoom(Point::new(200.0, 500.0), 0.01, None);
        assert_eq!(t.scale(), 0.5);
    }

    #[test]
    fn degenerate_zoom_ratio_is_ignored() {
        let mut t = engine();
        assert_eq!(t.apply_zoom(Point::new(0.0, 0.0), f32::NAN, None), 1.0);
        assert_eq!(t.apply_zoom(Point::new(0.0, 0.0), 0.0, None), 1.0);
        assert!(t.current().is_identity());
    }

    #[test]
    fn pan_stays_within_zoomed_width() {
        let mut t = engine();
        t.apply_zoom(Point::new(200.0, 500.0), 2.0, None);
        t.apply_pan(10_000.0);
        assert_eq!(t.current().translate_x, 0.0);
        t.apply_pan(-10_000.0);
        assert_eq!(t.current().translate_x, -400.0);
    }

    #[test]
    fn pan_when_zoomed_out_uses_ordered_bounds() {
        let mut t = engine();
        t.apply_zoom(Point::new(200.0, 500.0), 0.5, None);
        t.apply_pan(-10_000.0);
        assert_eq!(t.current().translate_x, 0.0);
        t.apply_pan(10_000.0);
        assert_eq!(t.current().translate_x, 200.0);
    }

    #[test]
    fn zoom_clamps_content_to_viewport() {
        let mut t = engine();
        let content = ContentBounds {
            top: 200,
            bottom: 3000,
        };
        // Zooming about the viewport top would push the content top down into view.
        t.apply_zoom(Point::new(200.0, 0.0), 2.0, Some(content));
        let m = t.current();
        assert_eq!(m.map_y(200.0), 0.0);
        assert!(m.map_y(3000.0) >= 1000.0);
    }

    #[test]
    fn overscroll_pan_reports_edge() {
        let mut t = engine();
        t.apply_zoom(Point::new(200.0, 500.0), 2.0, None);
        let content = ContentBounds {
            top: 0,
            bottom: 1000,
        };
        // Zoomed around the middle: 500px of slack above and below.
        assert!(!t.overscroll_pan(100.0, content, Edge::Top));
        assert!(t.overscroll_pan(1000.0, content, Edge::Top));
        assert_eq!(t.current().translate_y, 0.0);
        assert!(t.overscroll_pan(-5000.0, content, Edge::Bottom));
        assert_eq!(t.current().map_y(1000.0), 1000.0);
    }

    #[test]
    fn save_and_restore_round_trip() {
        let mut t = engine();
        t.save();
        t.apply_zoom(Point::new(10.0, 10.0), 1.5, None);
        t.restore();
        assert!(t.current().is_identity());
    }

    #[test]
    fn snap_animation_commits_target() {
        let mut t = engine();
        t.apply_zoom(Point::new(200.0, 500.0), 0.5, None);
        t.snap_to_identity(1_000, 200);
        assert!(t.is_animating());
        let mid = t.step(1_100);
        assert!(mid.scale_y > 0.5 && mid.scale_y < 1.0);
        assert!(t.is_animating());
        assert!(t.step(1_200).is_identity());
        assert!(!t.is_animating());
        assert!(t.step(5_000).is_identity());
    }

    #[test]
    fn toggle_zoom_switches_between_identity_and_max() {
        let mut t = engine();
        t.toggle_zoom(Point::new(100.0, 100.0), 0, 200);
        t.finish_animation();
        assert_eq!(t.scale(), 2.0);
        t.toggle_zoom(Point::new(100.0, 100.0), 10, 200);
        t.finish_animation();
        assert!(t.current().is_identity());
    }
}
