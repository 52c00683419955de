//! A headless scrolling/zooming engine for vertically stacked comic pages.
//!
//! For host-side helpers (a `Reader` facade, in-memory providers, page anchors), see the
//! `scroll-reader-adapter` crate.
//!
//! The engine keeps a sliding window of laid-out items over an arbitrarily long list,
//! recycles views that leave the viewport, and turns raw pointer input into drags, pinch zooms
//! and decelerating flings.
//!
//! It is UI-agnostic. The host is expected to provide:
//! - an [`ItemProvider`] (item count, heights, view types, view materialization)
//! - a [`PlacementSink`] receiving attach/detach/place instructions
//! - a [`RenderSurface`] receiving the pan/zoom matrix
//! - normalized [`PointerEvent`]s and frame ticks
//!
//! Notifications (page changes, header/footer, fling lifecycle, taps) are collected in an
//! [`EventQueue`] instead of callbacks.
#![forbid(unsafe_code)]

#[macro_use]
mod macros;

mod emitter;
mod fling;
mod gesture;
mod matrix;
mod options;
mod provider;
mod recycle;
mod state;
mod transform;
mod types;
mod velocity;
mod viewport;


pub use emitter::{EventQueue, ReaderEvent};
pub use fling::{FlingCurve, FlingPhysics, FlingStep};
pub use gesture::{GestureController, GestureMode, Invalidation};
pub use matrix::Matrix;
pub use options::{OptionsError, ReaderOptions};
pub use provider::{InsertAt, ItemProvider, PlacementSink, RenderSurface};
pub use recycle::RecyclePool;
pub use state::{ReaderSnapshot, ScrollSnapshot};
pub use transform::{Edge, SnapAnimation, TransformEngine};
pub use types::{
    ContentBounds, Item, LaidOutItem, MaxOffset, Point, Pointer, PointerEvent, PointerPhase, Rect,
    ScrollOffsets, ScrollState, VisibleRange,
};
pub use velocity::VelocityTracker1D;
pub use viewport::Viewport;
