//! Rank-typed strided array views with an explicit ownership mode.
//!
//! This crate provides the array view consumed by the `brak` indexing
//! wrappers. A [`View`] couples a compile-time rank with runtime extents and
//! strides over a dense buffer, and states in its type how the buffer's
//! lifetime is tracked:
//!
//! - [`Managed`]: the buffer is reference-counted; cloning the view bumps the count
//! - [`Unmanaged`]: the view is a bare alias whose validity is bounded by a lifetime
//!
//! # Core Operations
//!
//! - native multi-index access: [`View::element_ref`] and `view[[i, j, k]]`
//! - leading-index slicing: [`View::subview`], sharing the same buffer
//! - raw pointer access: [`View::as_mut_ptr`]
//!
//! # Aliasing
//!
//! Views are shared handles, like the views of HPC array libraries: every
//! clone or slice of a view addresses the same elements. Safe code reads
//! elements through `&T` and [`ElementRef`]. Writes through a shared handle
//! are `unsafe` ([`ElementRef::as_mut`], [`ElementRef::write`]): the caller
//! guarantees that no other access to that element overlaps the write.
//! Distinct elements may be written concurrently. The only safe write path is
//! [`View::get_mut`], which needs `&mut` on the sole handle of a managed
//! buffer.
//!
//! ```
//! use brak_view::View;
//!
//! let mut data = View::<i32, 2>::new("data", [3, 4]);
//! *data.get_mut([1, 2]).unwrap() = 7;
//!
//! let row = data.subview::<1, 1>([1]);
//! assert_eq!(row[[2]], 7);
//! assert_eq!(data.use_count(), 2);
//!
//! // SAFETY: no other reference to this element is live.
//! unsafe { row.element_ref([3]).write(8) };
//! assert_eq!(*data.element_ref([1, 3]), 8);
//! ```

pub mod element;
pub mod layout;
pub mod memory_traits;
pub mod mode;
pub mod view;

pub use element::ElementRef;
pub use layout::{col_major_strides, row_major_strides, Layout};
pub use memory_traits::MemoryTraits;
pub use mode::{Managed, Mode, Unmanaged};
pub use view::View;

/// Highest rank a view may have.
pub const MAX_RANK: usize = 8;

// ============================================================================
// Error types
// ============================================================================

/// Errors that can occur while building views and ranges.
#[derive(Debug, thiserror::Error)]
pub enum ViewError {
    /// Buffer length does not match the product of the extents.
    #[error("shape mismatch: extents {extents:?} need {expected} elements, got {actual}")]
    ShapeMismatch {
        extents: Vec<usize>,
        expected: usize,
        actual: usize,
    },
    /// The product of the extents overflows `usize` or exceeds `isize::MAX`.
    /// The product of the extents does not fit in `usize`.
    #[error("extent overflow: {0:?}")]
    ExtentOverflow(Vec<usize>),

    /// A range bound is reversed.
    #[error("invalid range in dimension {dim}: begin {begin} > end {end}")]
    InvalidRange { dim: usize, begin: usize, end: usize },
}

/// Result type for view operations.
pub type Result<T> = std::result::Result<T, ViewError>;
