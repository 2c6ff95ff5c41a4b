//! Type-level conversion of a view to its unmanaged counterpart.
//!
//! The unmanaged view keeps the element type, rank, layout metadata and
//! memory traits of the source view and only swaps its ownership mode. This
//! is the one place that rebuilds a view from its parts, so it must follow
//! any change to the parameters of [`View`].

use brak_view::{Mode, View};

/// Produce the unmanaged equivalent of a view.
pub trait MakeUnmanaged {
    /// The view type with reference counting disabled.
    ///
    /// Views that are already unmanaged map to themselves, with their
    /// original lifetime.
    type Output<'s>
    where
        Self: 's;

    fn make_unmanaged(&self) -> Self::Output<'_>;
}

/// Unmanaged equivalent of the view type `V`, borrowed for `'s`.
pub type UnmanagedView<'s, V> = <V as MakeUnmanaged>::Output<'s>;

impl<T, const R: usize, M: Mode<T>, const MT: u8> MakeUnmanaged for View<T, R, M, MT> {
    type Output<'s> = View<T, R, M::AsUnmanaged<'s>, MT> where Self: 's;

    #[inline]
    fn make_unmanaged(&self) -> Self::Output<'_> {
        // SAFETY: the new mode aliases the same buffer, and the layout
        // metadata is copied unchanged from a valid view.
        unsafe {
            View::from_raw_parts(
                self.mode().as_unmanaged(),
                *self.extents(),
                *self.strides(),
                self.offset(),
            )
        }
    }
}
