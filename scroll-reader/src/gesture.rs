use crate::emitter::{EventQueue, ReaderEvent};
use crate::fling::FlingPhysics;
use crate::provider::{ItemProvider, PlacementSink, RenderSurface};
use crate::state::{ReaderSnapshot, ScrollSnapshot};
use crate::transform::TransformEngine;
use crate::velocity::VelocityTracker1D;
use crate::viewport::Viewport;
use crate::{OptionsError, Point, PointerEvent, PointerPhase, ReaderOptions, ScrollState};

/// Classification of the active touch stream.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum GestureMode {
    #[default]
    None,
    Drag,
    Zoom,
}

/// What the host has to do after feeding an event or a frame tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Invalidation {
    /// The requested offset changed; run [`GestureController::layout`].
    pub layout: bool,
    /// The matrix changed; run [`GestureController::draw`].
    pub redraw: bool,
    /// A fling, snap animation or pending tap needs further ticks.
    pub animating: bool,
}

impl Invalidation {
    pub fn any(&self) -> bool {
        self.layout || self.redraw || self.animating
    }
}

#[derive(Clone, Copy, Debug)]
struct PendingTap {
    at: Point,
    up_ms: u64,
    suppressed: bool,
}

#[derive(Clone, Debug, Default)]
struct Press {
    start: Point,
    last: Point,
    down_ms: u64,
    /// Still a tap candidate (no slop exceeded, no second pointer).
    tap_candidate: bool,
    /// The press interrupted a fling or hit a boundary; it must not confirm a single tap.
    suppress_tap: bool,
    /// Zoom ended while a finger is still down; ignore it until the next press.
    zoom_lock: bool,
    /// The host vetoed this press at touch-down.
    intercepted: bool,
    pointer_count: usize,
    start_distance: f32,
    midpoint: Point,
}

/// Pointer state machine driving the viewport, transform and fling physics.
///
/// All notifications land in the controller's [`EventQueue`]; drain it after each call.
#[derive(Debug)]
pub struct GestureController<H, K> {
    options: ReaderOptions,
    viewport: Viewport<H, K>,
    transform: TransformEngine,
    fling: FlingPhysics,
    tracker_x: VelocityTracker1D,
    tracker_y: VelocityTracker1D,
    mode: GestureMode,
    press: Option<Press>,
    pending_tap: Option<PendingTap>,
    intercept_down: bool,
    events: EventQueue,
}

impl<H, K: Clone + PartialEq> GestureController<H, K> {
    /// Creates a controller, repairing invalid options (see [`ReaderOptions::sanitized`]).
    pub fn new(options: ReaderOptions) -> Self {
        let options = options.sanitized();
        vdebug!(?options, "GestureController::new");
        Self {
            viewport: Viewport::new(&options),
            transform: TransformEngine::new(options.min_scale, options.max_scale),
            fling: FlingPhysics::new(options.fling_friction, options.density),
            tracker_x: VelocityTracker1D::new(),
            tracker_y: VelocityTracker1D::new(),
            mode: GestureMode::None,
            press: None,
            pending_tap: None,
            intercept_down: false,
            events: EventQueue::new(),
            options,
        }
    }

    /// Creates a controller, rejecting invalid options.
    pub fn try_new(options: ReaderOptions) -> Result<Self, OptionsError> {
        options.validate()?;
        Ok(Self::new(options))
    }

    pub fn options(&self) -> &ReaderOptions {
        &self.options
    }

    pub fn viewport(&self) -> &Viewport<H, K> {
        &self.viewport
    }

    pub fn viewport_mut(&mut self) -> &mut Viewport<H, K> {
        &mut self.viewport
    }

    pub fn transform(&self) -> &TransformEngine {
        &self.transform
    }

    pub fn fling(&self) -> &FlingPhysics {
        &self.fling
    }

    pub fn mode(&self) -> GestureMode {
        self.mode
    }

    pub fn scroll_state(&self) -> ScrollState {
        self.events.scroll_state()
    }

    /// Smoothed fling velocity (px/s); zero when no fling is running.
    pub fn current_velocity(&self) -> f32 {
        self.fling.current_velocity()
    }

    pub fn events(&self) -> &EventQueue {
        &self.events
    }

    pub fn events_mut(&mut self) -> &mut EventQueue {
        &mut self.events
    }

    pub fn drain_events(&mut self) -> Vec<ReaderEvent> {
        self.events.take()
    }

    /// When set, touch-downs only cancel a running fling; the rest of the press is ignored.
    pub fn set_intercept_down(&mut self, intercept: bool) {
        self.intercept_down = intercept;
    }

    pub fn set_fling_friction(&mut self, friction: f32) {
        if friction.is_finite() && friction > 0.0 {
            self.options.fling_friction = friction;
            self.fling.set_friction(friction);
        }
    }

    pub fn attach_provider<P>(&mut self, provider: &P, sink: &mut impl PlacementSink<H>)
    where
        P: ItemProvider<Handle = H, Key = K>,
    {
        self.fling.stop(&mut self.events);
        self.viewport.attach_provider(provider, sink);
        self.transform.reset();
        self.reset_gesture();
        self.events.set_scroll_state(ScrollState::Idle);
    }

    /// Jumps to the start of `index` on the next layout pass.
    pub fn set_selection<P>(&mut self, index: usize, provider: &P) -> bool
    where
        P: ItemProvider<Handle = H, Key = K>,
    {
        if !self.viewport.set_selection(index, provider) {
            return false;
        }
        if self.fling.stop(&mut self.events) {
            self.events.set_scroll_state(ScrollState::Idle);
        }
        true
    }

    pub fn restore_offset(&mut self, offset: i32) {
        self.viewport.restore_offset(offset);
    }

    pub fn on_data_changed<P>(&mut self, provider: &mut P, sink: &mut impl PlacementSink<H>)
    where
        P: ItemProvider<Handle = H, Key = K>,
    {
        self.viewport.on_data_changed(provider, sink);
    }

    pub fn on_invalidated(&mut self, sink: &mut impl PlacementSink<H>) {
        self.fling.stop(&mut self.events);
        self.viewport.on_invalidated(sink);
        self.transform.reset();
        self.reset_gesture();
        self.events.set_scroll_state(ScrollState::Idle);
    }

    /// Layout-pass entry point.
    pub fn layout<P>(
        &mut self,
        width: i32,
        height: i32,
        provider: &mut P,
        sink: &mut impl PlacementSink<H>,
    ) where
        P: ItemProvider<Handle = H, Key = K>,
    {
        self.transform.set_viewport(width as f32, height as f32);
        self.viewport
            .layout(width, height, provider, sink, &mut self.events);
    }

    /// Draw-pass entry point: hands the matrix for `now_ms` to `surface`.
    ///
    /// Returns `true` while a snap animation is still running.
    pub fn draw(&mut self, now_ms: u64, surface: &mut impl RenderSurface) -> bool {
        let matrix = self.transform.step(now_ms);
        surface.set_matrix(&matrix);
        self.transform.is_animating()
    }

    pub fn snapshot(&self) -> ReaderSnapshot {
        ReaderSnapshot {
            scroll: ScrollSnapshot {
                offset: self.viewport.current_offset(),
                current_index: self.viewport.current_index(),
            },
            matrix: self.transform.current(),
            scroll_state: self.scroll_state(),
        }
    }

    /// Pointer-event entry point.
    pub fn on_pointer_event(&mut self, event: &PointerEvent) -> Invalidation {
        let mut out = Invalidation::default();
        let now = event.timestamp_ms;
        if event.phase == PointerPhase::Cancel {
            self.cancel(now, &mut out);
            out.animating = self.is_animating();
            return out;
        }
        let Some(point) = event.primary() else {
            vwarn!(phase = ?event.phase, "pointer event without pointers");
            return out;
        };

        match event.phase {
            PointerPhase::Down => self.on_down(point, now, &mut out),
            PointerPhase::Move => self.on_move(event, point, now, &mut out),
            PointerPhase::PointerDown => self.on_pointer_down(event),
            PointerPhase::PointerUp => self.on_pointer_up(event, now, &mut out),
            PointerPhase::Up => self.on_up(point, now, &mut out),
            PointerPhase::Cancel => {}
        }
        out.animating = self.is_animating();
        out
    }

    fn on_down(&mut self, point: Point, now: u64, out: &mut Invalidation) {
        let interrupted_fling = self.fling.stop(&mut self.events);
        if self.intercept_down {
            vtrace!("touch-down intercepted by host");
            // A vetoed press cannot complete a double tap.
            if let Some(tap) = self.pending_tap.take() {
                self.confirm_single_tap(tap);
            }
            self.press = Some(Press {
                intercepted: true,
                ..Press::default()
            });
            self.events.set_scroll_state(ScrollState::Idle);
            return;
        }

        if self.transform.is_animating() {
            self.transform.finish_animation();
            out.redraw = true;
        }
        self.transform.save();
        self.tracker_x.reset();
        self.tracker_y.reset();
        self.tracker_x.add_position(now, point.x);
        self.tracker_y.add_position(now, point.y);
        self.mode = GestureMode::None;

        let double_tap = self.pending_tap.take().and_then(|tap| {
            let in_time = now.saturating_sub(tap.up_ms) <= self.options.double_tap_timeout_ms;
            if in_time && tap.at.distance(point) <= self.options.double_tap_slop {
                Some(tap)
            } else {
                // The first tap expired without a frame tick confirming it.
                self.confirm_single_tap(tap);
                None
            }
        });
        if let Some(tap) = double_tap {
            vtrace!(x = point.x, y = point.y, "double tap");
            self.events.emit(ReaderEvent::DoubleTap {
                x: tap.at.x,
                y: tap.at.y,
            });
            self.transform
                .toggle_zoom(point, now, self.options.snap_animation_duration_ms);
            out.redraw = true;
        }

        self.press = Some(Press {
            start: point,
            last: point,
            down_ms: now,
            tap_candidate: double_tap.is_none(),
            suppress_tap: interrupted_fling,
            pointer_count: 1,
            ..Press::default()
        });
        self.events.set_scroll_state(ScrollState::Idle);
    }

    fn on_move(&mut self, event: &PointerEvent, point: Point, now: u64, out: &mut Invalidation) {
        let Some(press) = self.press.as_mut() else {
            return;
        };
        if press.intercepted || press.zoom_lock {
            return;
        }

        match self.mode {
            GestureMode::Zoom => {
                let distance = event.finger_distance();
                if distance > self.options.min_finger_distance && press.start_distance > 0.0 {
                    self.transform.restore();
                    let focal = Point::new(self.viewport.width() as f32 / 2.0, press.midpoint.y);
                    self.transform.apply_zoom(
                        focal,
                        distance / press.start_distance,
                        self.viewport.content_bounds(),
                    );
                    out.redraw = true;
                }
            }
            GestureMode::None | GestureMode::Drag => {
                self.tracker_x.add_position(now, point.x);
                self.tracker_y.add_position(now, point.y);

                if self.mode == GestureMode::None {
                    if press.start.distance(point) <= self.options.touch_slop {
                        press.last = point;
                        return;
                    }
                    vtrace!("gesture: none -> drag");
                    self.mode = GestureMode::Drag;
                    press.tap_candidate = false;
                }

                let dy_px = press.last.y - point.y;
                let dx_px = point.x - press.last.x;
                press.last = point;

                if dy_px != 0.0 {
                    self.events.set_scroll_state(ScrollState::TouchScroll);
                    let scale = self.transform.scale();
                    let contact =
                        self.viewport
                            .scroll_by(dy_px / scale, &mut self.transform, &mut self.events);
                    if contact.is_some() {
                        press.suppress_tap = true;
                    }
                    out.layout = true;
                }
                if dx_px != 0.0 {
                    self.transform.apply_pan(dx_px);
                }
                out.redraw = true;
            }
        }
    }

    fn on_pointer_down(&mut self, event: &PointerEvent) {
        let Some(press) = self.press.as_mut() else {
            return;
        };
        if press.intercepted {
            return;
        }
        press.pointer_count = event.pointers.len();
        press.tap_candidate = false;
        let distance = event.finger_distance();
        if distance > self.options.min_finger_distance {
            press.start_distance = distance;
            press.midpoint = event.finger_midpoint().unwrap_or(press.last);
            self.transform.save();
            if self.mode != GestureMode::Zoom {
                vtrace!(distance, "gesture: -> zoom");
            }
            self.mode = GestureMode::Zoom;
        }
    }

    fn on_pointer_up(&mut self, event: &PointerEvent, now: u64, out: &mut Invalidation) {
        let Some(press) = self.press.as_mut() else {
            return;
        };
        press.pointer_count = event.pointers.len().saturating_sub(1);
        if self.mode != GestureMode::Zoom || press.pointer_count >= 2 {
            return;
        }
        vtrace!(scale = self.transform.scale(), "gesture: zoom -> none");
        press.zoom_lock = true;
        self.mode = GestureMode::None;
        self.finish_zoom(now, out);
    }

    fn on_up(&mut self, point: Point, now: u64, out: &mut Invalidation) {
        let Some(press) = self.press.take() else {
            self.mode = GestureMode::None;
            return;
        };
        if press.intercepted {
            self.mode = GestureMode::None;
            return;
        }

        match self.mode {
            GestureMode::Zoom => self.finish_zoom(now, out),
            GestureMode::Drag => {
                self.tracker_x.add_position(now, point.x);
                self.tracker_y.add_position(now, point.y);
                let max = self.options.max_fling_velocity;
                let vx = self.tracker_x.velocity_with_max(max);
                let vy = self.tracker_y.velocity_with_max(max);
                if vy.abs() > self.options.min_fling_velocity {
                    self.events.set_scroll_state(ScrollState::Fling);
                    self.fling.start(-vx, -vy, now, &mut self.events);
                } else {
                    self.events.set_scroll_state(ScrollState::Idle);
                }
            }
            GestureMode::None => {
                let held = now.saturating_sub(press.down_ms);
                if press.tap_candidate && !press.zoom_lock && held <= self.options.long_press_timeout_ms
                {
                    self.pending_tap = Some(PendingTap {
                        at: press.start,
                        up_ms: now,
                        suppressed: press.suppress_tap,
                    });
                }
                self.events.set_scroll_state(ScrollState::Idle);
            }
        }
        self.mode = GestureMode::None;
        self.tracker_x.reset();
        self.tracker_y.reset();
    }

    fn finish_zoom(&mut self, now: u64, out: &mut Invalidation) {
        if self.transform.scale() <= 1.0 {
            self.transform
                .snap_to_identity(now, self.options.snap_animation_duration_ms);
        } else {
            self.transform.apply_pan(0.0);
        }
        out.redraw = true;
    }

    fn cancel(&mut self, now: u64, out: &mut Invalidation) {
        vtrace!(mode = ?self.mode, "gesture cancelled");
        if self.mode == GestureMode::Zoom {
            self.finish_zoom(now, out);
        }
        self.reset_gesture();
        if !self.fling.is_running() {
            self.events.set_scroll_state(ScrollState::Idle);
        }
    }

    fn reset_gesture(&mut self) {
        self.mode = GestureMode::None;
        self.press = None;
        self.pending_tap = None;
        self.tracker_x.reset();
        self.tracker_y.reset();
    }

    /// Frame-tick entry point: advances a running fling and confirms pending single taps.
    pub fn tick(&mut self, now_ms: u64) -> Invalidation {
        let mut out = Invalidation::default();

        if self.fling.is_running() {
            let step = self
                .fling
                .tick(now_ms, self.viewport.height(), &mut self.events);
            if step.delta_x != 0 {
                self.transform.apply_pan(-(step.delta_x as f32));
                out.redraw = true;
            }
            if step.delta_y != 0 {
                let scale = self.transform.scale();
                let contact = self.viewport.scroll_by(
                    step.delta_y as f32 / scale,
                    &mut self.transform,
                    &mut self.events,
                );
                out.layout = true;
                out.redraw = true;
                if contact.is_some() {
                    vdebug!(edge = ?contact, "fling reached an edge");
                    self.fling.stop(&mut self.events);
                }
            }
            if self.fling.is_running() {
                self.events.emit(ReaderEvent::FlingTick {
                    velocity: self.fling.current_velocity(),
                });
            } else {
                self.events.set_scroll_state(ScrollState::Idle);
            }
        }

        if let Some(tap) = self.pending_tap {
            if now_ms.saturating_sub(tap.up_ms) > self.options.double_tap_timeout_ms {
                self.pending_tap = None;
                self.confirm_single_tap(tap);
            }
        }

        if self.transform.is_animating() {
            out.redraw = true;
        }
        out.animating = self.is_animating();
        out
    }

    fn confirm_single_tap(&mut self, tap: PendingTap) {
        if tap.suppressed {
            vtrace!("single tap suppressed");
            return;
        }
        self.events.emit(ReaderEvent::SingleTap {
            x: tap.at.x,
            y: tap.at.y,
        });
    }

    pub fn is_animating(&self) -> bool {
        self.fling.is_running() || self.transform.is_animating() || self.pending_tap.is_some()
    }
}
