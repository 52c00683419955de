use scroll_reader::{InsertAt, Item, ItemProvider, PlacementSink, Rect};

/// A view handle handed out by [`VecProvider`]. The id survives recycling.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PageView(pub u64);

/// An in-memory [`ItemProvider`] over a `Vec` of items.
///
/// Views are plain ids, so this is mostly useful for simulations, tests, and hosts that keep
/// their real views in a side table keyed by the [`PageView`] id.
#[derive(Clone, Debug)]
pub struct VecProvider<K> {
    items: Vec<Item<K>>,
    view_type_count: usize,
    next_id: u64,
    bound: u64,
}

impl VecProvider<usize> {
    /// One item per height, keyed by its initial index.
    pub fn from_heights(heights: impl IntoIterator<Item = f32>) -> Self {
        let items = heights
            .into_iter()
            .enumerate()
            .map(|(key, height)| Item {
                key,
                height,
                view_type: 0,
            })
            .collect();
        Self::new(items)
    }
}

impl<K> VecProvider<K> {
    pub fn new(items: Vec<Item<K>>) -> Self {
        let view_type_count = items.iter().map(|it| it.view_type + 1).max().unwrap_or(1);
        Self {
            items,
            view_type_count,
            next_id: 0,
            bound: 0,
        }
    }

    pub fn items(&self) -> &[Item<K>] {
        &self.items
    }

    /// Mutable access to the backing items.
    ///
    /// Changes only reach the engine through `on_data_changed`; prefer
    /// [`Reader::update_data`](crate::Reader::update_data), which does that for you.
    pub fn items_mut(&mut self) -> &mut Vec<Item<K>> {
        &mut self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn push(&mut self, item: Item<K>) {
        self.view_type_count = self.view_type_count.max(item.view_type + 1);
        self.items.push(item);
    }

    /// Inserts `items` before the current first item, keeping their order.
    pub fn prepend(&mut self, items: impl IntoIterator<Item = Item<K>>) {
        let mut head: Vec<_> = items.into_iter().collect();
        for item in &head {
            self.view_type_count = self.view_type_count.max(item.view_type + 1);
        }
        head.append(&mut self.items);
        self.items = head;
    }

    pub fn set_height(&mut self, index: usize, height: f32) -> bool {
        match self.items.get_mut(index) {
            Some(item) => {
                item.height = height;
                true
            }
            None => false,
        }
    }

    /// Number of distinct views created so far (recycled views are not counted again).
    pub fn views_created(&self) -> u64 {
        self.next_id
    }

    /// Number of `materialize` calls so far, fresh or recycled.
    pub fn bind_count(&self) -> u64 {
        self.bound
    }
}

impl<K: PartialEq> VecProvider<K> {
    pub fn index_of(&self, key: &K) -> Option<usize> {
        self.items.iter().position(|it| it.key == *key)
    }
}

impl<K: Clone + PartialEq> ItemProvider for VecProvider<K> {
    type Handle = PageView;
    type Key = K;

    fn count(&self) -> usize {
        self.items.len()
    }

    fn item_at(&self, index: usize) -> Item<K> {
        self.items[index].clone()
    }

    fn view_type_count(&self) -> usize {
        self.view_type_count
    }

    fn materialize(&mut self, _index: usize, recycled: Option<PageView>) -> PageView {
        self.bound += 1;
        recycled.unwrap_or_else(|| {
            self.next_id += 1;
            PageView(self.next_id)
        })
    }
}

/// A [`PlacementSink`] that records what the engine asked the host to do.
#[derive(Clone, Debug)]
pub struct RecordingSink<H> {
    attached: Vec<H>,
    placements: Vec<(H, Rect)>,
    detach_count: usize,
}

impl<H> Default for RecordingSink<H> {
    fn default() -> Self {
        Self {
            attached: Vec::new(),
            placements: Vec::new(),
            detach_count: 0,
        }
    }
}

impl<H> RecordingSink<H> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Currently attached views, top to bottom.
    pub fn attached(&self) -> &[H] {
        &self.attached
    }

    /// Every `place` call since the last [`RecordingSink::clear_placements`].
    pub fn placements(&self) -> &[(H, Rect)] {
        &self.placements
    }

    pub fn clear_placements(&mut self) {
        self.placements.clear();
    }

    pub fn detach_count(&self) -> usize {
        self.detach_count
    }
}

impl<H: PartialEq> RecordingSink<H> {
    /// The most recent rect `handle` was placed at.
    pub fn rect_of(&self, handle: &H) -> Option<Rect> {
        self.placements
            .iter()
            .rev()
            .find(|(h, _)| h == handle)
            .map(|(_, rect)| *rect)
    }
}

impl<H: Clone + PartialEq> PlacementSink<H> for RecordingSink<H> {
    fn attach(&mut self, handle: &H, at: InsertAt) {
        match at {
            InsertAt::Start => self.attached.insert(0, handle.clone()),
            InsertAt::End => self.attached.push(handle.clone()),
        }
    }

    fn detach(&mut self, handle: &H) {
        self.detach_count += 1;
        self.attached.retain(|h| h != handle);
    }

    fn place(&mut self, handle: &H, rect: Rect) {
        self.placements.push((handle.clone(), rect));
    }
}
