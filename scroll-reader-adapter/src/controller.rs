use scroll_reader::{
    GestureController, Invalidation, ItemProvider, OptionsError, PlacementSink, PointerEvent,
    ReaderEvent, ReaderOptions, ReaderSnapshot, RenderSurface, ScrollSnapshot,
};

use crate::{PageAnchor, apply_page_anchor, capture_page_anchor};

/// A framework-neutral reader that wraps a [`GestureController`] together with its item
/// provider and placement sink.
///
/// This type does not hold any UI objects. Hosts drive it by calling:
/// - `resize` when the viewport size changes
/// - `on_pointer_event` for every normalized input event
/// - `tick(now_ms)` each frame while `is_animating()` is true
/// - `draw(now_ms, surface)` from the draw pass
///
/// Layout is re-run automatically whenever input or a tick moved the scroll offset, so the sink
/// always reflects the latest state once a call returns.
pub struct Reader<P: ItemProvider, S> {
    c: GestureController<P::Handle, P::Key>,
    provider: P,
    sink: S,
    width: i32,
    height: i32,
}

impl<P, S> Reader<P, S>
where
    P: ItemProvider,
    S: PlacementSink<P::Handle>,
{
    pub fn new(options: ReaderOptions, provider: P, sink: S) -> Self {
        Self::from_controller(GestureController::new(options), provider, sink)
    }

    pub fn try_new(options: ReaderOptions, provider: P, sink: S) -> Result<Self, OptionsError> {
        Ok(Self::from_controller(
            GestureController::try_new(options)?,
            provider,
            sink,
        ))
    }

    pub fn from_controller(
        mut c: GestureController<P::Handle, P::Key>,
        provider: P,
        mut sink: S,
    ) -> Self {
        c.attach_provider(&provider, &mut sink);
        Self {
            c,
            provider,
            sink,
            width: 0,
            height: 0,
        }
    }

    pub fn controller(&self) -> &GestureController<P::Handle, P::Key> {
        &self.c
    }

    pub fn controller_mut(&mut self) -> &mut GestureController<P::Handle, P::Key> {
        &mut self.c
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn into_parts(self) -> (GestureController<P::Handle, P::Key>, P, S) {
        (self.c, self.provider, self.sink)
    }

    pub fn size(&self) -> (i32, i32) {
        (self.width, self.height)
    }

    pub fn is_animating(&self) -> bool {
        self.c.is_animating()
    }

    pub fn drain_events(&mut self) -> Vec<ReaderEvent> {
        self.c.drain_events()
    }

    pub fn resize(&mut self, width: i32, height: i32) {
        self.width = width;
        self.height = height;
        self.relayout();
    }

    /// Runs a layout pass with the last known size. A no-op until `resize` was called.
    pub fn relayout(&mut self) {
        if self.width <= 0 || self.height <= 0 {
            return;
        }
        self.c
            .layout(self.width, self.height, &mut self.provider, &mut self.sink);
    }

    pub fn on_pointer_event(&mut self, event: &PointerEvent) -> Invalidation {
        let out = self.c.on_pointer_event(event);
        if out.layout {
            self.relayout();
        }
        out
    }

    /// Advances fling, snap and tap timers.
    pub fn tick(&mut self, now_ms: u64) -> Invalidation {
        let out = self.c.tick(now_ms);
        if out.layout {
            self.relayout();
        }
        out
    }

    /// Returns `true` while a snap animation is still running.
    pub fn draw(&mut self, now_ms: u64, surface: &mut impl RenderSurface) -> bool {
        self.c.draw(now_ms, surface)
    }

    /// Jumps to the start of `index`. Returns `false` for out-of-range indexes.
    pub fn scroll_to_index(&mut self, index: usize) -> bool {
        if !self.c.set_selection(index, &self.provider) {
            return false;
        }
        self.relayout();
        true
    }

    /// Mutates the data set and lets the engine re-resolve the current page by identity.
    pub fn update_data<R>(&mut self, f: impl FnOnce(&mut P) -> R) -> R {
        let result = f(&mut self.provider);
        self.c.on_data_changed(&mut self.provider, &mut self.sink);
        self.relayout();
        result
    }

    /// Swaps in a different data set, dropping every laid-out view and the scroll position.
    pub fn replace_provider(&mut self, provider: P) -> P {
        let old = std::mem::replace(&mut self.provider, provider);
        self.c.attach_provider(&self.provider, &mut self.sink);
        self.relayout();
        old
    }

    pub fn snapshot(&self) -> ReaderSnapshot {
        self.c.snapshot()
    }

    /// Restores a position captured by [`Reader::snapshot`].
    pub fn restore(&mut self, scroll: ScrollSnapshot) {
        self.c.restore_offset(scroll.offset);
        self.relayout();
    }

    pub fn capture_anchor(&self) -> Option<PageAnchor<P::Key>> {
        capture_page_anchor(self.c.viewport())
    }

    /// Applies a previously captured anchor. Returns `false` when the page is gone.
    pub fn apply_anchor(&mut self, anchor: &PageAnchor<P::Key>) -> bool {
        if !apply_page_anchor(&mut self.c, &self.provider, anchor) {
            return false;
        }
        self.relayout();
        true
    }
}
