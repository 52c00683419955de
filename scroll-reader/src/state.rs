use crate::{Matrix, ScrollState};

/// Restorable scroll position.
///
/// With `feature = "serde"`, this type implements `Serialize`/`Deserialize`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScrollSnapshot {
    pub offset: i32,
    pub current_index: Option<usize>,
}

/// A combined snapshot of scroll position, render matrix and scroll state.
///
/// Only `scroll.offset` is fed back into the engine (via `restore_offset`); the rest is for
/// hosts that want to persist or inspect the reader state without coupling to its internals.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ReaderSnapshot {
    pub scroll: ScrollSnapshot,
    pub matrix: Matrix,
    pub scroll_state: ScrollState,
}
