/// An item as reported by the external item provider.
///
/// The engine never owns items; it only reads the height and view type and correlates the
/// identity `key` with laid-out views across data-set changes.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Item<K> {
    pub key: K,
    /// Intrinsic height in content pixels. May change between layout passes.
    pub height: f32,
    pub view_type: usize,
}

/// A placed rectangle in viewport coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Rect {
    pub fn height(&self) -> i32 {
        self.bottom - self.top
    }

    pub fn width(&self) -> i32 {
        self.right - self.left
    }
}

/// An item that currently holds a materialized view.
///
/// `top`/`bottom` are viewport coordinates as of the last layout pass.
#[derive(Clone, Debug)]
pub struct LaidOutItem<H, K> {
    pub index: usize,
    pub key: K,
    pub view_type: usize,
    pub top: i32,
    pub bottom: i32,
    pub handle: H,
}

impl<H, K> LaidOutItem<H, K> {
    pub fn height(&self) -> i32 {
        self.bottom - self.top
    }
}

/// Inclusive range of laid-out item indexes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VisibleRange {
    pub top_index: usize,
    pub bottom_index: usize, // inclusive
}

impl VisibleRange {
    pub fn len(&self) -> usize {
        self.bottom_index + 1 - self.top_index
    }

    pub fn contains(&self, index: usize) -> bool {
        (self.top_index..=self.bottom_index).contains(&index)
    }
}

/// The furthest offset the list can scroll to.
///
/// Stays [`MaxOffset::Unknown`] until the last item has been laid out once.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MaxOffset {
    #[default]
    Unknown,
    Known(i32),
}

impl MaxOffset {
    pub fn known(self) -> Option<i32> {
        match self {
            Self::Unknown => None,
            Self::Known(v) => Some(v),
        }
    }

    pub(crate) fn clamp(self, offset: i32) -> i32 {
        let offset = offset.max(0);
        match self {
            Self::Unknown => offset,
            Self::Known(max) => offset.min(max),
        }
    }
}

/// Scroll offsets in content pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScrollOffsets {
    /// Offset applied by the last layout pass.
    pub current: i32,
    /// Offset requested for the next layout pass (may be out of bounds until then).
    pub target: i32,
    pub max: MaxOffset,
    /// Viewport top of the first laid-out item.
    pub display: i32,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ScrollState {
    #[default]
    Idle,
    TouchScroll,
    Fling,
}

/// Vertical extent of the laid-out content in viewport coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ContentBounds {
    pub top: i32,
    pub bottom: i32,
}

impl ContentBounds {
    pub fn height(&self) -> i32 {
        self.bottom - self.top
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance(self, other: Point) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    pub fn midpoint(self, other: Point) -> Point {
        Point::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PointerPhase {
    Down,
    Move,
    Up,
    PointerDown,
    PointerUp,
    Cancel,
}

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Pointer {
    pub id: u32,
    pub x: f32,
    pub y: f32,
}

impl Pointer {
    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// A normalized pointer event from the host.
///
/// `pointers` lists every pointer that is down during the event, the primary one first.
/// For `PointerUp` the lifted pointer is still included.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PointerEvent {
    pub phase: PointerPhase,
    pub pointers: Vec<Pointer>,
    pub timestamp_ms: u64,
}

impl PointerEvent {
    pub fn new(phase: PointerPhase, pointers: Vec<Pointer>, timestamp_ms: u64) -> Self {
        Self {
            phase,
            pointers,
            timestamp_ms,
        }
    }

    /// Single-pointer convenience constructor.
    pub fn single(phase: PointerPhase, x: f32, y: f32, timestamp_ms: u64) -> Self {
        Self::new(phase, vec![Pointer { id: 0, x, y }], timestamp_ms)
    }

    pub fn primary(&self) -> Option<Point> {
        self.pointers.first().map(Pointer::position)
    }

    /// Distance between the first two pointers, or `0.0` with fewer than two.
    pub fn finger_distance(&self) -> f32 {
        match self.pointers.as_slice() {
            [a, b, ..] => a.position().distance(b.position()),
            _ => {
                vwarn!(
                    pointers = self.pointers.len(),
                    "finger_distance: fewer than two pointers"
                );
                0.0
            }
        }
    }

    pub fn finger_midpoint(&self) -> Option<Point> {
        match self.pointers.as_slice() {
            [a, b, ..] => Some(a.position().midpoint(b.position())),
            _ => None,
        }
    }
}
