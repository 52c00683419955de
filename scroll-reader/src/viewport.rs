use std::collections::VecDeque;

use crate::emitter::{EventQueue, ReaderEvent};
use crate::provider::{InsertAt, ItemProvider, PlacementSink};
use crate::recycle::RecyclePool;
use crate::transform::{Edge, TransformEngine};
use crate::{ContentBounds, LaidOutItem, MaxOffset, ReaderOptions, Rect, ScrollOffsets, VisibleRange};

/// Upper bound on layout passes per [`Viewport::layout`] call.
///
/// The second pass only runs when the first one discovered a new max offset, re-measured an
/// item to a different height or re-based the offset on item 0. Each settles in one more pass
/// as long as heights hold still.
const MAX_LAYOUT_PASSES: usize = 2;

/// Sliding window of laid-out items over a vertically stacked list.
///
/// Offsets are in content pixels, positions of laid-out items in viewport pixels. When the
/// window is empty, `first_index`/`display_offset` still describe the slot the next fill
/// starts from.
#[derive(Debug)]
pub struct Viewport<H, K> {
    items: VecDeque<LaidOutItem<H, K>>,
    pool: RecyclePool<H>,
    first_index: usize,
    display_offset: i32,
    current_offset: i32,
    next_offset: i32,
    max_offset: MaxOffset,
    width: i32,
    height: i32,
    divider_height: i32,
    current_index: Option<usize>,
    current_item_visibility: f32,
    low_data_threshold: usize,
    low_data_notified: bool,
    header_latched: bool,
    footer_latched: bool,
    restore_offset: Option<i32>,
}

impl<H, K: Clone + PartialEq> Viewport<H, K> {
    pub fn new(options: &ReaderOptions) -> Self {
        Self {
            items: VecDeque::new(),
            pool: RecyclePool::default(),
            first_index: 0,
            display_offset: 0,
            current_offset: 0,
            next_offset: 0,
            max_offset: MaxOffset::Unknown,
            width: 0,
            height: 0,
            divider_height: options.divider_height.max(0),
            current_index: None,
            current_item_visibility: options.current_item_visibility,
            low_data_threshold: options.low_data_threshold,
            low_data_notified: false,
            header_latched: false,
            footer_latched: false,
            restore_offset: None,
        }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn divider_height(&self) -> i32 {
        self.divider_height
    }

    /// Takes effect on the next layout pass.
    pub fn set_divider_height(&mut self, divider_height: i32) {
        self.divider_height = divider_height.max(0);
        self.max_offset = MaxOffset::Unknown;
    }

    pub fn set_low_data_threshold(&mut self, threshold: usize) {
        self.low_data_threshold = threshold;
        self.low_data_notified = false;
    }

    pub fn set_current_item_visibility(&mut self, fraction: f32) {
        if fraction.is_finite() {
            self.current_item_visibility = fraction.clamp(0.0, 1.0);
        }
    }

    pub fn pool(&self) -> &RecyclePool<H> {
        &self.pool
    }

    pub fn offsets(&self) -> ScrollOffsets {
        ScrollOffsets {
            current: self.current_offset,
            target: self.next_offset,
            max: self.max_offset,
            display: self.display_offset,
        }
    }

    pub fn current_offset(&self) -> i32 {
        self.current_offset
    }

    pub fn max_offset(&self) -> MaxOffset {
        self.max_offset
    }

    /// The item straddling the viewport bottom edge (the "current page").
    pub fn current_index(&self) -> Option<usize> {
        self.current_index
    }

    pub fn is_header_reached(&self) -> bool {
        self.header_latched
    }

    pub fn is_footer_reached(&self) -> bool {
        self.footer_latched
    }

    pub fn visible_range(&self) -> Option<VisibleRange> {
        let first = self.items.front()?;
        let last = self.items.back()?;
        Some(VisibleRange {
            top_index: first.index,
            bottom_index: last.index,
        })
    }

    /// First laid-out item whose bottom edge is below the viewport top.
    pub fn first_visible_index(&self) -> Option<usize> {
        self.items.iter().find(|it| it.bottom > 0).map(|it| it.index)
    }

    pub fn content_bounds(&self) -> Option<ContentBounds> {
        let first = self.items.front()?;
        let last = self.items.back()?;
        Some(ContentBounds {
            top: first.top,
            bottom: last.bottom,
        })
    }

    pub fn laid_out_items(&self) -> impl Iterator<Item = &LaidOutItem<H, K>> + '_ {
        self.items.iter()
    }

    pub fn for_each_laid_out(&self, mut f: impl FnMut(&LaidOutItem<H, K>)) {
        for item in &self.items {
            f(item);
        }
    }

    pub fn laid_out_len(&self) -> usize {
        self.items.len()
    }

    pub fn laid_out(&self, index: usize) -> Option<&LaidOutItem<H, K>> {
        let pos = index.checked_sub(self.items.front()?.index)?;
        self.items.get(pos)
    }

    /// Binds a (new) provider: resets the pool to its view types and drops all laid-out items.
    pub fn attach_provider<P>(&mut self, provider: &P, sink: &mut impl PlacementSink<H>)
    where
        P: ItemProvider<Handle = H, Key = K>,
    {
        vinfo!(
            count = provider.count(),
            view_types = provider.view_type_count(),
            "Viewport::attach_provider"
        );
        self.on_invalidated(sink);
        self.pool.initialize(provider.view_type_count());
    }

    /// Requests a scroll position for the next layout pass.
    pub fn restore_offset(&mut self, offset: i32) {
        self.restore_offset = Some(offset);
    }

    /// Content offset at which `index` starts, summed from intrinsic heights and dividers.
    pub fn offset_of<P>(&self, index: usize, provider: &P) -> Option<i32>
    where
        P: ItemProvider<Handle = H, Key = K>,
    {
        (index < provider.count()).then(|| content_start(provider, index, self.divider_height))
    }

    /// Requests the offset at which `index` starts. Returns `false` for out-of-range indexes.
    pub fn set_selection<P>(&mut self, index: usize, provider: &P) -> bool
    where
        P: ItemProvider<Handle = H, Key = K>,
    {
        if index >= provider.count() {
            vwarn!(index, count = provider.count(), "set_selection: index out of range");
            return false;
        }
        self.next_offset = content_start(provider, index, self.divider_height);
        self.current_index = Some(index);
        vdebug!(index, offset = self.next_offset, "set_selection");
        true
    }

    /// Moves the requested offset by `delta` content px and runs header/footer detection.
    ///
    /// While zoomed in, motion past either end is redirected into a vertical pan of
    /// `transform`; the edge is only reported once that pan is exhausted. Returns the edge the
    /// motion is pressing against, if any.
    pub fn scroll_by(
        &mut self,
        delta: f32,
        transform: &mut TransformEngine,
        events: &mut EventQueue,
    ) -> Option<Edge> {
        if !delta.is_finite() {
            vwarn!(delta, "scroll_by: non-finite delta");
            return None;
        }
        self.next_offset = (self.next_offset as f32 + delta) as i32;
        let zoomed = transform.scale() > 1.0;
        let bounds = self.content_bounds();

        let mut contact = None;
        if self.next_offset < 0 {
            let reached = match bounds {
                Some(bounds) if zoomed => transform.overscroll_pan(-delta, bounds, Edge::Top),
                _ => true,
            };
            if reached {
                if !self.header_latched {
                    self.header_latched = true;
                    events.emit(ReaderEvent::HeaderReached);
                }
                contact = Some(Edge::Top);
            } else {
                self.header_latched = false;
            }
        } else if self.next_offset != 0 {
            self.header_latched = false;
        }

        if let Some(max) = self.max_offset.known() {
            if self.next_offset > max {
                let reached = match bounds {
                    Some(bounds) if zoomed => {
                        transform.overscroll_pan(-delta, bounds, Edge::Bottom)
                    }
                    _ => true,
                };
                if reached {
                    if !self.footer_latched {
                        self.footer_latched = true;
                        events.emit(ReaderEvent::FooterReached);
                    }
                    contact = Some(Edge::Bottom);
                } else {
                    self.footer_latched = false;
                }
            } else if self.next_offset != max {
                self.footer_latched = false;
            }
        }
        contact
    }

    /// Runs the layout for a `width` × `height` viewport.
    pub fn layout<P>(
        &mut self,
        width: i32,
        height: i32,
        provider: &mut P,
        sink: &mut impl PlacementSink<H>,
        events: &mut EventQueue,
    ) where
        P: ItemProvider<Handle = H, Key = K>,
    {
        if width != self.width || height != self.height {
            vdebug!(width, height, "Viewport: viewport resized");
            self.width = width.max(0);
            self.height = height.max(0);
            self.max_offset = MaxOffset::Unknown;
        }

        if self.pool.view_type_count() == 0 {
            self.pool.initialize(provider.view_type_count());
        }
        let count = provider.count();
        if count == 0 {
            self.clear_to_empty_list(sink);
            return;
        }
        if self.items.is_empty() && self.first_index >= count {
            self.first_index = count - 1;
            self.display_offset = 0;
        }

        for _ in 0..MAX_LAYOUT_PASSES {
            if !self.layout_pass(provider, sink, events) {
                break;
            }
            vtrace!(max = ?self.max_offset, "Viewport: window changed, laying out again");
        }
    }

    /// One trim/fill/position pass.
    ///
    /// Returns `true` when the max offset changed, a laid-out item was re-measured to a new
    /// height, or the offset was re-based on item 0. Each can leave the window short of the
    /// viewport edges.
    fn layout_pass<P>(
        &mut self,
        provider: &mut P,
        sink: &mut impl PlacementSink<H>,
        events: &mut EventQueue,
    ) -> bool
    where
        P: ItemProvider<Handle = H, Key = K>,
    {
        if let Some(offset) = self.restore_offset.take() {
            self.next_offset = offset;
        }
        self.next_offset = self.max_offset.clamp(self.next_offset);
        let delta = self.current_offset - self.next_offset;

        self.trim(delta, sink);
        self.fill_bottom(delta, provider, sink, events);
        self.fill_top(delta, provider, sink);
        let drifted = self.pin_to_first_item();
        let resized = self.position(delta, provider, sink, events);
        self.current_offset = self.next_offset;

        vtrace!(
            offset = self.current_offset,
            range = ?self.visible_range(),
            "Viewport::layout_pass"
        );
        self.update_max_offset(provider.count()) || resized || drifted
    }

    fn trim(&mut self, delta: i32, sink: &mut impl PlacementSink<H>) {
        while let Some(front) = self.items.front() {
            if front.bottom + delta > 0 {
                break;
            }
            let height = front.height();
            if let Some(item) = self.items.pop_front() {
                self.display_offset += height + self.divider_height;
                self.first_index = item.index + 1;
                self.recycle(item, sink);
            }
        }

        while let Some(back) = self.items.back() {
            if back.top + delta < self.height {
                break;
            }
            if let Some(item) = self.items.pop_back() {
                self.recycle(item, sink);
            }
        }
    }

    fn fill_bottom<P>(
        &mut self,
        delta: i32,
        provider: &mut P,
        sink: &mut impl PlacementSink<H>,
        events: &mut EventQueue,
    ) where
        P: ItemProvider<Handle = H, Key = K>,
    {
        let count = provider.count();
        let (mut edge, mut index) = match self.items.back() {
            Some(back) => (back.bottom + self.divider_height, back.index + 1),
            None => (self.display_offset, self.first_index),
        };

        // An empty window far above the new offset: walk the slot down by intrinsic heights
        // instead of materializing items that would be trimmed right away.
        if self.items.is_empty() {
            while index + 1 < count {
                let h = intrinsic_height(&*provider, index);
                if edge + h + delta > 0 {
                    break;
                }
                edge += h + self.divider_height;
                index += 1;
            }
            self.first_index = index;
            self.display_offset = edge;
        }

        while edge + delta < self.height && index < count {
            let view_type = provider.view_type_of(index);
            let recycled = self.pool.acquire(view_type);
            let handle = provider.materialize(index, recycled);
            let h = self.initial_height(provider, index, &handle);
            let key = provider.item_at(index).key;
            sink.attach(&handle, InsertAt::End);
            self.items.push_back(LaidOutItem {
                index,
                key,
                view_type,
                top: edge,
                bottom: edge + h,
                handle,
            });
            edge += h + self.divider_height;
            index += 1;
            self.check_low_data(count, index - 1, events);
        }
    }

    fn fill_top<P>(&mut self, delta: i32, provider: &mut P, sink: &mut impl PlacementSink<H>)
    where
        P: ItemProvider<Handle = H, Key = K>,
    {
        let (mut edge, mut index) = match self.items.front() {
            Some(front) => (front.top, front.index),
            None => (self.display_offset, self.first_index),
        };

        while edge - self.divider_height + delta > 0 && index >= 1 {
            index -= 1;
            let bottom = edge - self.divider_height;

            if self.items.is_empty() {
                let h = intrinsic_height(&*provider, index);
                if bottom - h + delta >= self.height {
                    // Still below the viewport; just move the slot up.
                    edge = bottom - h;
                    self.first_index = index;
                    self.display_offset = edge;
                    continue;
                }
            }

            let view_type = provider.view_type_of(index);
            let recycled = self.pool.acquire(view_type);
            let handle = provider.materialize(index, recycled);
            let h = self.initial_height(provider, index, &handle);
            let key = provider.item_at(index).key;
            sink.attach(&handle, InsertAt::Start);
            edge = bottom - h;
            self.items.push_front(LaidOutItem {
                index,
                key,
                view_type,
                top: edge,
                bottom,
                handle,
            });
            self.first_index = index;
            self.display_offset = edge;
        }
    }

    /// Re-measures and places every laid-out item, then resolves the current page.
    ///
    /// Returns `true` if any item changed height.
    fn position<P>(
        &mut self,
        delta: i32,
        provider: &mut P,
        sink: &mut impl PlacementSink<H>,
        events: &mut EventQueue,
    ) -> bool
    where
        P: ItemProvider<Handle = H, Key = K>,
    {
        self.display_offset += delta;
        let mut top = self.display_offset;
        let width = self.width;
        let mut resized = false;
        for item in self.items.iter_mut() {
            let measured = provider.measure(item.index, &item.handle, width);
            let h = match valid_height(measured) {
                Some(h) => h,
                None => {
                    vwarn!(index = item.index, measured, "invalid measurement; keeping previous height");
                    item.height()
                }
            };
            resized |= h != item.height();
            item.top = top;
            item.bottom = top + h;
            sink.place(
                &item.handle,
                Rect {
                    left: 0,
                    top: item.top,
                    right: width,
                    bottom: item.bottom,
                },
            );
            top = item.bottom + self.divider_height;
        }

        let Some(last) = self.items.back() else {
            return resized;
        };
        let straddling = self
            .items
            .iter()
            .find(|it| it.top < self.height && it.bottom >= self.height);
        let current = match straddling {
            Some(it) => {
                let visible = (self.height - it.top) as f32;
                if visible >= it.height() as f32 * self.current_item_visibility {
                    it.index
                } else {
                    it.index.saturating_sub(1)
                }
            }
            None => last.index,
        };
        if self.current_index != Some(current) {
            self.current_index = Some(current);
            vdebug!(index = current, "page changed");
            events.emit(ReaderEvent::PageChanged { index: current });
        }
        resized
    }

    fn update_max_offset(&mut self, count: usize) -> bool {
        let Some(last) = self.items.back() else {
            return false;
        };
        if last.index + 1 != count {
            return false;
        }
        let max = (self.current_offset + last.bottom - self.height).max(0);
        let changed = self.max_offset != MaxOffset::Known(max);
        self.max_offset = MaxOffset::Known(max);
        changed
    }

    fn check_low_data(&mut self, count: usize, bottom_index: usize, events: &mut EventQueue) {
        if self.low_data_threshold == 0 || self.low_data_notified {
            return;
        }
        if count - (bottom_index + 1) < self.low_data_threshold {
            self.low_data_notified = true;
            vdebug!(count, bottom_index, "running low on data");
            events.emit(ReaderEvent::RunningLowOnData);
        }
    }

    fn initial_height<P>(&self, provider: &mut P, index: usize, handle: &H) -> i32
    where
        P: ItemProvider<Handle = H, Key = K>,
    {
        let measured = provider.measure(index, handle, self.width);
        valid_height(measured).unwrap_or_else(|| {
            vwarn!(index, measured, "invalid measurement; using intrinsic height");
            intrinsic_height(&*provider, index)
        })
    }

    fn recycle(&mut self, item: LaidOutItem<H, K>, sink: &mut impl PlacementSink<H>) {
        sink.detach(&item.handle);
        self.pool.release(item.view_type, item.handle);
    }

    fn clear_to_empty_list(&mut self, sink: &mut impl PlacementSink<H>) {
        while let Some(item) = self.items.pop_front() {
            self.recycle(item, sink);
        }
        self.first_index = 0;
        self.display_offset = 0;
        self.current_offset = 0;
        self.next_offset = 0;
        self.restore_offset = None;
        self.current_index = None;
        self.max_offset = MaxOffset::Known(0);
    }

    /// Data replaced: keeps the current page in place by identity and rebinds stale views.
    ///
    /// Afterwards the offset is re-derived from the first laid-out item, so heights that
    /// changed above the window or a list that shrank past it leave no stale offset behind.
    pub fn on_data_changed<P>(&mut self, provider: &mut P, sink: &mut impl PlacementSink<H>)
    where
        P: ItemProvider<Handle = H, Key = K>,
    {
        let count = provider.count();
        self.max_offset = MaxOffset::Unknown;
        self.low_data_notified = false;
        vdebug!(count, current = ?self.current_index, "Viewport::on_data_changed");

        if count == 0 {
            self.clear_to_empty_list(sink);
            self.max_offset = MaxOffset::Unknown;
            return;
        }

        let shift = self.current_item_shift(provider, count);
        let in_range = |index: usize| {
            let shifted = index as isize + shift;
            (0..count as isize).contains(&shifted)
        };

        // Views whose index fell off either end.
        while self.items.front().is_some_and(|it| !in_range(it.index)) {
            if let Some(item) = self.items.pop_front() {
                self.recycle(item, sink);
            }
        }
        while self.items.back().is_some_and(|it| !in_range(it.index)) {
            if let Some(item) = self.items.pop_back() {
                self.recycle(item, sink);
            }
        }
        let apply = |index: usize| (index as isize + shift).clamp(0, count as isize - 1) as usize;
        for item in self.items.iter_mut() {
            item.index = apply(item.index);
        }
        self.current_index = self
            .current_index
            .filter(|&i| in_range(i))
            .map(apply);

        if self.items.is_empty() {
            self.first_index = apply(self.first_index);
            self.display_offset = 0;
        }
        self.rebind_stale(provider, sink);
        self.remeasure(provider);
        self.reanchor(provider);
    }

    /// Re-measures the window in place, stacking down from the front item's top.
    fn remeasure<P>(&mut self, provider: &mut P)
    where
        P: ItemProvider<Handle = H, Key = K>,
    {
        let Some(mut top) = self.items.front().map(|it| it.top) else {
            return;
        };
        let width = self.width;
        let divider = self.divider_height;
        for item in self.items.iter_mut() {
            let measured = provider.measure(item.index, &item.handle, width);
            let h = valid_height(measured).unwrap_or_else(|| item.height());
            item.top = top;
            item.bottom = top + h;
            top = item.bottom + divider;
        }
    }

    /// Index shift of the current page, found by key. Zero when it stayed put or vanished.
    fn current_item_shift<P>(&self, provider: &P, count: usize) -> isize
    where
        P: ItemProvider<Handle = H, Key = K>,
    {
        let Some(current) = self.current_index else {
            return 0;
        };
        let Some(item) = self.laid_out(current) else {
            return 0;
        };
        if current < count && provider.item_at(current).key == item.key {
            return 0;
        }
        let Some(new_index) = (0..count).find(|&i| provider.item_at(i).key == item.key) else {
            vdebug!(current, "current item not found after data change");
            return 0;
        };
        vdebug!(from = current, to = new_index, "current item moved");
        new_index as isize - current as isize
    }

    /// Rebuilds the offset from the front of the window, or from the empty-window slot.
    fn reanchor<P>(&mut self, provider: &P)
    where
        P: ItemProvider<Handle = H, Key = K>,
    {
        if let Some(front) = self.items.front() {
            self.first_index = front.index;
            self.display_offset = front.top;
        }
        self.current_offset =
            content_start(provider, self.first_index, self.divider_height) - self.display_offset;
        self.next_offset = self.current_offset;
        vdebug!(
            first = self.first_index,
            offset = self.current_offset,
            "Viewport: offset re-anchored"
        );
    }

    /// Once index 0 is reached, by a laid-out item or by the empty-window slot, its top fixes
    /// the offset. Shifts both offsets onto it, keeping this pass's delta, and reports whether
    /// anything moved.
    fn pin_to_first_item(&mut self) -> bool {
        let top = match self.items.front() {
            Some(front) if front.index == 0 => front.top,
            None if self.first_index == 0 => self.display_offset,
            _ => return false,
        };
        let drift = -top - self.current_offset;
        if drift == 0 {
            return false;
        }
        vdebug!(drift, "Viewport: offset drifted from the first item");
        self.current_offset += drift;
        self.next_offset += drift;
        if let Some(max) = self.max_offset.known() {
            self.max_offset = MaxOffset::Known((max + drift).max(0));
        }
        true
    }

    /// Rebinds laid-out items whose key changed. A view can only be re-bound to the same view
    /// type; on a type change the window is cut there and the next fill rebuilds the rest.
    fn rebind_stale<P>(&mut self, provider: &mut P, sink: &mut impl PlacementSink<H>)
    where
        P: ItemProvider<Handle = H, Key = K>,
    {
        let mut pos = 0;
        while pos < self.items.len() {
            let Some(item) = self.items.get(pos) else {
                break;
            };
            let index = item.index;
            let key = provider.item_at(index).key;
            if key == item.key {
                pos += 1;
                continue;
            }
            if provider.view_type_of(index) != item.view_type {
                vdebug!(index, "view type changed; cutting the window");
                if pos == 0 {
                    self.first_index = index;
                    self.display_offset = item.top;
                }
                while self.items.len() > pos {
                    if let Some(item) = self.items.pop_back() {
                        self.recycle(item, sink);
                    }
                }
                break;
            }
            // Same view type: the handle is re-bound in place and stays attached.
            let Some(item) = self.items.remove(pos) else {
                break;
            };
            let handle = provider.materialize(index, Some(item.handle));
            self.items.insert(
                pos,
                LaidOutItem {
                    index,
                    key,
                    handle,
                    ..item
                },
            );
            pos += 1;
        }
    }

    /// Full reset: drops every laid-out view without pooling it.
    pub fn on_invalidated(&mut self, sink: &mut impl PlacementSink<H>) {
        vinfo!(laid_out = self.items.len(), "Viewport::on_invalidated");
        for item in self.items.drain(..) {
            sink.detach(&item.handle);
        }
        self.first_index = 0;
        self.display_offset = 0;
        self.current_offset = 0;
        self.next_offset = 0;
        self.max_offset = MaxOffset::Unknown;
        self.current_index = None;
        self.low_data_notified = false;
        self.header_latched = false;
        self.footer_latched = false;
        self.restore_offset = None;
    }
}

fn valid_height(h: f32) -> Option<i32> {
    (h.is_finite() && h >= 0.0).then(|| h.round() as i32)
}

fn intrinsic_height<P: ItemProvider>(provider: &P, index: usize) -> i32 {
    valid_height(provider.item_at(index).height).unwrap_or(0)
}

/// Content offset at which `index` starts, from intrinsic heights.
fn content_start<P: ItemProvider>(provider: &P, index: usize, divider_height: i32) -> i32 {
    (0..index)
        .map(|i| intrinsic_height(provider, i) + divider_height)
        .sum()
}
