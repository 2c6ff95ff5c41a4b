//! Bracket indexing over rank-typed array views.
//!
//! A [`View`] of rank `R` is normally accessed in one step with all its
//! indices, `view[[i, j, k]]`. This crate adds chained, one-index-at-a-time
//! access, `w.at(i).at(j)[k]`, through two interchangeable wrappers:
//!
//! - [`WrapperSubview`]: every bracket slices the view, producing a view of
//!   rank one lower
//! - [`WrapperArray`]: the view is kept whole and the indices are accumulated
//!   in a fixed-size array until the last bracket performs the access
//!
//! Each bracket returns a value of a new type whose rank is one lower, so the
//! number of brackets is checked by the compiler. The last bracket returns an
//! [`ElementRef`] into the original buffer, aliasing exactly the element the
//! native access would return. It reads like `&T`; writing through it is
//! `unsafe`, since views and wrappers are shared handles.
//!
//! # Reference counting
//!
//! A [`Managed`] view bumps an atomic reference count whenever it is cloned.
//! Both wrappers turn the view into an [`Unmanaged`] one at the first bracket
//! (see [`MakeUnmanaged`]), so intermediate wrappers are plain `Copy` values
//! that can be captured by thousands of parallel closures without touching
//! the count.
//!
//! # Example
//!
//! ```rust
//! use brak::{Bracket, View, WrapperArray, WrapperSubview};
//!
//! let data = View::<i32, 3>::new("data", [2, 3, 4]);
//!
//! let by_slices = WrapperSubview::new(data.clone());
//! // SAFETY: no other access to this element is in flight.
//! unsafe { by_slices.at(1).at(2).at(3).write(42) };
//!
//! let by_indices = WrapperArray::new(data.clone());
//! assert_eq!(*by_indices.at(1).at(2).at(3), 42);
//! assert_eq!(data[[1, 2, 3]], 42);
//!
//! // brackets never touch the reference count
//! let _deep = by_slices.at(0).at(0);
//! assert_eq!(data.use_count(), 3);
//! ```
//!
//! # Parallel kernels
//!
//! [`parallel_for`] runs a closure over every index of an [`MDRangePolicy`],
//! copying the closure once per work split:
//!
//! ```rust
//! use brak::{parallel_for, Bracket, MDRangePolicy, View, WrapperArray};
//!
//! let data = View::<usize, 2>::new("data", [4, 8]);
//! let wrapper = WrapperArray::new(data.clone());
//! let policy = MDRangePolicy::from_extents([4, 8]);
//!
//! parallel_for("fill", &policy, move |[i, j]| {
//!     // SAFETY: every index tuple writes its own element.
//!     unsafe { wrapper.at(i).at(j).write(i * 8 + j) };
//! });
//!
//! assert_eq!(data[[3, 7]], 31);
//! ```

mod array;
mod bracket;
pub mod dispatch;
mod maybe_sync;
mod subview;
mod unmanaged;

pub use array::WrapperArray;
pub use bracket::Bracket;
pub use dispatch::{parallel_for, MDRangePolicy};
pub use maybe_sync::MaybeSendSync;
pub use subview::WrapperSubview;
pub use unmanaged::{MakeUnmanaged, UnmanagedView};

// ============================================================================
// Re-exports from brak-view
// ============================================================================
pub use brak_view::memory_traits;
pub use brak_view::{
    col_major_strides, row_major_strides, ElementRef, Layout, Managed, MemoryTraits, Mode, Result,
    Unmanaged, View, ViewError, MAX_RANK,
};
