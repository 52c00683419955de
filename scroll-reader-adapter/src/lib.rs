//! Host-side helpers for the `scroll-reader` crate.
//!
//! The `scroll-reader` crate is UI-agnostic and only owns the scrolling, zooming and recycling
//! state. This crate provides small, framework-neutral pieces most hosts end up writing anyway:
//!
//! - [`Reader`]: owns the controller, provider and placement sink, and re-runs layout after
//!   input and frame ticks
//! - [`VecProvider`] / [`RecordingSink`]: an in-memory data set and a sink that records
//!   placements (simulations, tests)
//! - [`PageAnchor`]: persist a reading position by page identity instead of raw offset
//!
//! No bindings to any particular UI framework are included.
#![forbid(unsafe_code)]

mod anchor;
mod controller;
mod vec_provider;

#[cfg(test)]
mod tests;

pub use anchor::{PageAnchor, apply_page_anchor, capture_page_anchor};
pub use controller::Reader;
pub use vec_provider::{PageView, RecordingSink, VecProvider};
