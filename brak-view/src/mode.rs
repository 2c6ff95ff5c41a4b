//! Ownership modes of a view's buffer.
//!
//! A mode is the part of a view that holds on to the buffer. [`Managed`]
//! shares ownership through an atomic reference count; [`Unmanaged`] is a
//! bare pointer borrowed for a lifetime `'a` and costs nothing to copy. Every
//! mode knows its unmanaged counterpart ([`Mode::AsUnmanaged`]), which is how
//! views drop reference counting without losing track of the buffer's
//! validity.

use std::cell::UnsafeCell;
use std::fmt;
use std::marker::PhantomData;
use std::ops::Deref;
use std::sync::Arc;

use crate::element::ElementRef;

mod sealed {
    pub trait Sealed {}
}

/// How a view holds on to its buffer.
///
/// This trait is sealed: the only modes are [`Managed`] and [`Unmanaged`].
pub trait Mode<T>: Clone + sealed::Sealed {
    /// The unmanaged mode aliasing the same buffer.
    ///
    /// For [`Managed`] this borrows the managed handle for `'s`. For
    /// [`Unmanaged`] it is the mode itself, keeping its original lifetime.
    type AsUnmanaged<'s>: Mode<T> + Copy
    where
        Self: 's;

    /// Handle to a single element ([`ElementRef`] with the lifetime of the
    /// buffer borrow).
    type Ref<'s>: Deref<Target = T> + Copy
    where
        Self: 's;

    /// Whether this mode keeps a reference count.
    const MANAGED: bool;

    /// Label of the buffer (empty for unmanaged modes).
    fn label(&self) -> &str;

    /// Base pointer of the whole buffer.
    fn base_ptr(&self) -> *mut T;

    /// Alias the buffer without reference counting.
    fn as_unmanaged(&self) -> Self::AsUnmanaged<'_>;

    /// Handle to the element `offset` elements past the base pointer.
    ///
    /// # Safety
    /// `offset` must address an element of the buffer.
    unsafe fn element_at(&self, offset: isize) -> Self::Ref<'_>;
}

// ============================================================================
// Managed
// ============================================================================

struct Buffer<T> {
    label: String,
    cells: Box<[UnsafeCell<T>]>,
}

// Elements are written through shared handles; see the crate-level aliasing
// contract.
unsafe impl<T: Send + Sync> Sync for Buffer<T> {}

/// Reference-counted ownership of a labelled buffer.
pub struct Managed<T> {
    buffer: Arc<Buffer<T>>,
}

impl<T> Managed<T> {
    pub(crate) fn from_vec(label: &str, data: Vec<T>) -> Self {
        let cells: Box<[UnsafeCell<T>]> = data.into_iter().map(UnsafeCell::new).collect();
        Self {
            buffer: Arc::new(Buffer {
                label: label.to_owned(),
                cells,
            }),
        }
    }

    /// Number of handles sharing the buffer.
    pub fn use_count(&self) -> usize {
        Arc::strong_count(&self.buffer)
    }

    /// Whether this handle is the only one sharing the buffer.
    pub(crate) fn is_unique(&mut self) -> bool {
        Arc::get_mut(&mut self.buffer).is_some()
    }
}

impl<T> Clone for Managed<T> {
    fn clone(&self) -> Self {
        Self {
            buffer: Arc::clone(&self.buffer),
        }
    }
}

impl<T> fmt::Debug for Managed<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Managed")
            .field("label", &self.buffer.label)
            .field("len", &self.buffer.cells.len())
            .field("use_count", &self.use_count())
            .finish()
    }
}

impl<T> sealed::Sealed for Managed<T> {}

impl<T> Mode<T> for Managed<T> {
    type AsUnmanaged<'s> = Unmanaged<'s, T> where Self: 's;
    type Ref<'s> = ElementRef<'s, T> where Self: 's;

    const MANAGED: bool = true;

    fn label(&self) -> &str {
        &self.buffer.label
    }

    #[inline]
    fn base_ptr(&self) -> *mut T {
        UnsafeCell::raw_get(self.buffer.cells.as_ptr())
    }

    #[inline]
    fn as_unmanaged(&self) -> Unmanaged<'_, T> {
        Unmanaged {
            ptr: self.base_ptr(),
            _marker: PhantomData,
        }
    }

    #[inline]
    unsafe fn element_at(&self, offset: isize) -> ElementRef<'_, T> {
        ElementRef::new(self.base_ptr().offset(offset))
    }
}

// ============================================================================
// Unmanaged
// ============================================================================

/// Bare alias of a buffer that stays valid for `'a`.
pub struct Unmanaged<'a, T> {
    ptr: *mut T,
    _marker: PhantomData<&'a mut T>,
}

unsafe impl<T: Send + Sync> Send for Unmanaged<'_, T> {}
unsafe impl<T: Send + Sync> Sync for Unmanaged<'_, T> {}

impl<'a, T> Unmanaged<'a, T> {
    pub(crate) fn from_slice(data: &'a mut [T]) -> Self {
        Self {
            ptr: data.as_mut_ptr(),
            _marker: PhantomData,
        }
    }
}

impl<T> Clone for Unmanaged<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Unmanaged<'_, T> {}

impl<T> fmt::Debug for Unmanaged<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Unmanaged").field("ptr", &self.ptr).finish()
    }
}

impl<T> sealed::Sealed for Unmanaged<'_, T> {}

impl<'a, T> Mode<T> for Unmanaged<'a, T> {
    type AsUnmanaged<'s> = Unmanaged<'a, T> where Self: 's;
    type Ref<'s> = ElementRef<'a, T> where Self: 's;

    const MANAGED: bool = false;

    fn label(&self) -> &str {
        ""
    }

    #[inline]
    fn base_ptr(&self) -> *mut T {
        self.ptr
    }

    #[inline]
    fn as_unmanaged(&self) -> Unmanaged<'a, T> {
        *self
    }

    #[inline]
    unsafe fn element_at(&self, offset: isize) -> ElementRef<'a, T> {
        ElementRef::new(self.ptr.offset(offset))
    }
}
