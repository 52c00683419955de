use crate::ScrollState;

/// Notifications produced by the engine.
///
/// The engine never calls back into the host; every operation pushes events into an
/// [`EventQueue`] that the host drains after the call returns.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ReaderEvent {
    ScrollStateChanged(ScrollState),
    /// The current page (the item straddling the viewport bottom) changed.
    PageChanged { index: usize },
    HeaderReached,
    FooterReached,
    FlingStarted { velocity_x: f32, velocity_y: f32 },
    /// A fling tick moved the content. `velocity` is the smoothed px/s estimate.
    FlingTick { velocity: f32 },
    FlingEnded,
    /// Fewer than `low_data_threshold` items remain below the laid-out range.
    RunningLowOnData,
    SingleTap { x: f32, y: f32 },
    DoubleTap { x: f32, y: f32 },
}

/// Ordered buffer of [`ReaderEvent`]s.
///
/// Scroll-state notifications are de-duplicated: `set_scroll_state` only emits when the state
/// actually changes.
#[derive(Clone, Debug, Default)]
pub struct EventQueue {
    events: Vec<ReaderEvent>,
    scroll_state: ScrollState,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit(&mut self, event: ReaderEvent) {
        vtrace!(?event, "emit");
        self.events.push(event);
    }

    pub fn scroll_state(&self) -> ScrollState {
        self.scroll_state
    }

    pub fn set_scroll_state(&mut self, state: ScrollState) {
        if self.scroll_state == state {
            return;
        }
        self.scroll_state = state;
        self.emit(ReaderEvent::ScrollStateChanged(state));
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn as_slice(&self) -> &[ReaderEvent] {
        &self.events
    }

    /// Removes and returns all pending events, oldest first.
    pub fn drain(&mut self) -> impl Iterator<Item = ReaderEvent> + '_ {
        self.events.drain(..)
    }

    pub fn take(&mut self) -> Vec<ReaderEvent> {
        core::mem::take(&mut self.events)
    }

    /// Forgets pending events and the last scroll state.
    pub fn reset(&mut self) {
        self.events.clear();
        self.scroll_state = ScrollState::Idle;
    }
}
