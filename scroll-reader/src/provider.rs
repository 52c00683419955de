use crate::{Item, Matrix, Rect};

/// Source of items and their materialized views.
///
/// The engine only ever asks for indexes in `0..count()`. `Handle` is whatever the host uses
/// to refer to a view (a widget id, a texture slot, a struct); the engine moves handles between
/// the laid-out window and the recycle pool but never looks inside them.
pub trait ItemProvider {
    type Handle;
    type Key: PartialEq + Clone;

    fn count(&self) -> usize;

    fn item_at(&self, index: usize) -> Item<Self::Key>;

    fn view_type_of(&self, index: usize) -> usize {
        self.item_at(index).view_type
    }

    /// Number of distinct view types. Types are `0..view_type_count()`.
    fn view_type_count(&self) -> usize {
        1
    }

    /// Produces a view for `index`, reusing `recycled` when the pool had one of the right type.
    fn materialize(&mut self, index: usize, recycled: Option<Self::Handle>) -> Self::Handle;

    /// Measured height of the view at `width`. Non-finite or negative results are ignored.
    fn measure(&mut self, index: usize, handle: &Self::Handle, width: i32) -> f32 {
        let _ = (handle, width);
        self.item_at(index).height
    }
}

/// Where a newly attached view goes in the host's child list.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InsertAt {
    Start,
    End,
}

/// Receives placement instructions for laid-out views.
pub trait PlacementSink<H> {
    fn attach(&mut self, handle: &H, at: InsertAt) {
        let _ = (handle, at);
    }

    fn detach(&mut self, handle: &H) {
        let _ = handle;
    }

    fn place(&mut self, handle: &H, rect: Rect) {
        let _ = (handle, rect);
    }
}

impl<H> PlacementSink<H> for () {}

/// Receives the transform to draw the content with.
pub trait RenderSurface {
    fn set_matrix(&mut self, matrix: &Matrix);
}

impl RenderSurface for Matrix {
    fn set_matrix(&mut self, matrix: &Matrix) {
        *self = *matrix;
    }
}
