//! Rank-typed strided view.
//!
//! [`View`] carries its rank as a const parameter, so the number of indices
//! is checked by the compiler: native access takes `[usize; R]` and slicing
//! returns a view whose rank is fixed by its type.

use std::fmt;
use std::marker::PhantomData;
use std::ops::Index;

use crate::element::ElementRef;
use crate::layout::Layout;
use crate::memory_traits::MemoryTraits;
use crate::mode::{Managed, Mode, Unmanaged};
use crate::{Result, ViewError, MAX_RANK};

// ============================================================================
// Validation helpers
// ============================================================================

/// Number of elements spanned by `extents`, or `None` if it exceeds
/// `isize::MAX` (the largest offset a view can address).
fn checked_size(extents: &[usize]) -> Option<usize> {
    extents
        .iter()
        .try_fold(1usize, |acc, &e| acc.checked_mul(e))
        .filter(|&n| n <= isize::MAX as usize)
}

/// Number of elements spanned by `extents`.
///
/// # Panics
/// Panics with [`ViewError::ExtentOverflow`] if the product overflows.
fn dense_size(extents: &[usize]) -> usize {
    match checked_size(extents) {
        Some(size) => size,
        None => panic!("{}", ViewError::ExtentOverflow(extents.to_vec())),
    }
}

fn validate_len(len: usize, extents: &[usize]) -> Result<()> {
    let expected =
        checked_size(extents).ok_or_else(|| ViewError::ExtentOverflow(extents.to_vec()))?;
    if expected != len {
        return Err(ViewError::ShapeMismatch {
            extents: extents.to_vec(),
            expected,
            actual: len,
        });
    }
    Ok(())
}

// ============================================================================
// View
// ============================================================================

/// Strided view of rank `R` over a buffer owned according to `M`.
///
/// # Type Parameters
/// - `T`: Element type
/// - `R`: Rank, between 1 and 8
/// - `M`: Ownership mode ([`Managed`] or [`Unmanaged`])
/// - `MT`: Memory traits bitmask (see [`memory_traits`](crate::memory_traits))
///
/// A rank outside `1..=8` is rejected when a constructor is instantiated:
///
/// ```compile_fail
/// use brak_view::View;
/// let _ = View::<i32, 0>::new("empty", []);
/// ```
pub struct View<T, const R: usize, M: Mode<T> = Managed<T>, const MT: u8 = 0> {
    mode: M,
    extents: [usize; R],
    strides: [isize; R],
    offset: isize,
    _elem: PhantomData<T>,
}

impl<T, const R: usize, M: Mode<T>, const MT: u8> Clone for View<T, R, M, MT> {
    fn clone(&self) -> Self {
        Self {
            mode: self.mode.clone(),
            extents: self.extents,
            strides: self.strides,
            offset: self.offset,
            _elem: PhantomData,
        }
    }
}

impl<T, const R: usize, const MT: u8> Copy for View<T, R, Unmanaged<'_, T>, MT> {}

impl<T, const R: usize, M: Mode<T>, const MT: u8> fmt::Debug for View<T, R, M, MT> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("View")
            .field("label", &self.mode.label())
            .field("managed", &M::MANAGED)
            .field("extents", &self.extents)
            .field("strides", &self.strides)
            .field("offset", &self.offset)
            .field("memory_traits", &MT)
            .finish()
    }
}

impl<T: Default, const R: usize> View<T, R, Managed<T>> {
    /// Allocate a row-major view filled with `T::default()`.
    pub fn new(label: &str, extents: [usize; R]) -> Self {
        Self::with_layout(label, extents, Layout::Right)
    }

    /// Allocate a view with the given layout, filled with `T::default()`.
    ///
    /// # Panics
    /// Panics if the number of elements overflows `isize`.
    pub fn with_layout(label: &str, extents: [usize; R], layout: Layout) -> Self {
        const { assert!(R >= 1 && R <= MAX_RANK, "view rank must be between 1 and 8") };
        let size = dense_size(&extents);
        let mut data = Vec::with_capacity(size);
        data.resize_with(size, T::default);
        tracing::debug!(label, ?extents, ?layout, "allocating view");
        Self {
            mode: Managed::from_vec(label, data),
            extents,
            strides: layout.strides(&extents),
            offset: 0,
            _elem: PhantomData,
        }
    }
}

impl<T, const R: usize> View<T, R, Managed<T>> {
    /// Adopt `data` as the buffer of a managed view.
    pub fn from_vec(
        label: &str,
        data: Vec<T>,
        extents: [usize; R],
        layout: Layout,
    ) -> Result<Self> {
        const { assert!(R >= 1 && R <= MAX_RANK, "view rank must be between 1 and 8") };
        validate_len(data.len(), &extents)?;
        tracing::debug!(label, ?extents, ?layout, "adopting buffer");
        Ok(Self {
            mode: Managed::from_vec(label, data),
            extents,
            strides: layout.strides(&extents),
            offset: 0,
            _elem: PhantomData,
        })
    }

    /// Allocate a row-major view with values produced by `f`.
    ///
    /// `f` is called once per index, in row-major order.
    ///
    /// # Panics
    /// Panics if the number of elements overflows `isize`.
    pub fn from_fn(
        label: &str,
        extents: [usize; R],
        mut f: impl FnMut([usize; R]) -> T,
    ) -> Self {
        const { assert!(R >= 1 && R <= MAX_RANK, "view rank must be between 1 and 8") };
        let size = dense_size(&extents);
        let mut data = Vec::with_capacity(size);
        let mut idx = [0usize; R];
        for _ in 0..size {
            data.push(f(idx));
            for d in (0..R).rev() {
                idx[d] += 1;
                if idx[d] < extents[d] {
                    break;
                }
                idx[d] = 0;
            }
        }
        tracing::debug!(label, ?extents, "allocating view from function");
        Self {
            mode: Managed::from_vec(label, data),
            extents,
            strides: Layout::Right.strides(&extents),
            offset: 0,
            _elem: PhantomData,
        }
    }
}

impl<T, const R: usize, const MT: u8> View<T, R, Managed<T>, MT> {
    /// Number of handles sharing this view's buffer.
    pub fn use_count(&self) -> usize {
        self.mode.use_count()
    }

    /// Exclusive access to the element at `index`.
    ///
    /// Returns `None` while another handle shares the buffer (clones and
    /// slices of this view). Unmanaged views borrow the handle they come
    /// from, so none can be alive here.
    ///
    /// ```compile_fail
    /// use brak_view::View;
    ///
    /// let mut data = View::<i32, 1>::new("data", [2]);
    /// let a = data.get_mut([0]).unwrap();
    /// let b = data.get_mut([0]).unwrap();
    /// *a = 1;
    /// *b = 2;
    /// ```
    ///
    /// # Panics
    /// Panics if any index is out of range for its dimension.
    pub fn get_mut(&mut self, index: [usize; R]) -> Option<&mut T> {
        if !self.mode.is_unique() {
            return None;
        }
        let off = self.offset_of(&index);
        // SAFETY: bounds checked, and `&mut self` on the only handle rules out
        // any other access to the buffer.
        Some(unsafe { &mut *self.mode.base_ptr().offset(off) })
    }
}

impl<'a, T, const R: usize> View<T, R, Unmanaged<'a, T>> {
    /// Alias caller-owned storage without reference counting.
    pub fn from_slice(data: &'a mut [T], extents: [usize; R], layout: Layout) -> Result<Self> {
        const { assert!(R >= 1 && R <= MAX_RANK, "view rank must be between 1 and 8") };
        validate_len(data.len(), &extents)?;
        Ok(Self {
            mode: Unmanaged::from_slice(data),
            extents,
            strides: layout.strides(&extents),
            offset: 0,
            _elem: PhantomData,
        })
    }
}

impl<T, const R: usize, M: Mode<T>, const MT: u8> View<T, R, M, MT> {
    /// Rank of the view.
    #[inline]
    pub const fn rank() -> usize {
        R
    }

    /// Whether the view keeps its buffer alive through a reference count.
    #[inline]
    pub const fn is_managed() -> bool {
        M::MANAGED
    }

    #[inline]
    pub fn memory_traits() -> MemoryTraits {
        MemoryTraits::from_bits(MT)
    }

    /// Extent of dimension `dim`.
    ///
    /// # Panics
    /// Panics if `dim >= R`.
    #[inline]
    pub fn extent(&self, dim: usize) -> usize {
        self.extents[dim]
    }

    #[inline]
    pub fn extents(&self) -> &[usize; R] {
        &self.extents
    }

    #[inline]
    pub fn strides(&self) -> &[isize; R] {
        &self.strides
    }

    /// Element offset of the view's origin from the start of the buffer.
    #[inline]
    pub fn offset(&self) -> isize {
        self.offset
    }

    /// Number of elements addressed by the view.
    #[inline]
    pub fn size(&self) -> usize {
        dense_size(&self.extents)
    }

    #[inline]
    pub fn label(&self) -> &str {
        self.mode.label()
    }

    /// Raw pointer to the view's origin.
    ///
    /// After slicing, the elements of the view are generally not contiguous
    /// from this pointer.
    #[inline]
    pub fn as_mut_ptr(&self) -> *mut T {
        self.mode.base_ptr().wrapping_offset(self.offset)
    }

    /// Buffer offset of the element at `index`.
    ///
    /// # Panics
    /// Panics if any index is out of range for its dimension.
    #[inline]
    fn offset_of(&self, index: &[usize; R]) -> isize {
        let mut off = self.offset;
        for d in 0..R {
            assert!(
                index[d] < self.extents[d],
                "index {} out of bounds for dim {} with extent {}",
                index[d],
                d,
                self.extents[d]
            );
            off += index[d] as isize * self.strides[d];
        }
        off
    }

    /// Native multi-index access.
    ///
    /// Returns a handle to the element, read through `Deref` and written
    /// through its `unsafe` methods (see [`ElementRef`]).
    ///
    /// # Panics
    /// Panics if any index is out of range for its dimension.
    #[inline]
    pub fn element_ref(&self, index: [usize; R]) -> M::Ref<'_> {
        let off = self.offset_of(&index);
        // SAFETY: `offset_of` checked every index against its extent, and the
        // extents and strides of a view always stay inside its buffer.
        unsafe { self.mode.element_at(off) }
    }

    /// Slice the `K` leading dimensions at `leading`, keeping the remaining
    /// `L` dimensions open.
    ///
    /// The slice shares the buffer and the ownership mode: slicing a managed
    /// view increments the reference count.
    ///
    /// ```
    /// use brak_view::View;
    ///
    /// let cube = View::<u8, 3>::new("cube", [2, 3, 4]);
    /// let plane = cube.subview::<1, 2>([1]);
    /// let line = cube.subview::<2, 1>([1, 2]);
    /// assert_eq!(plane.extents(), &[3, 4]);
    /// assert_eq!(line.extents(), &[4]);
    /// ```
    ///
    /// # Panics
    /// Panics if a leading index is out of range.
    pub fn subview<const K: usize, const L: usize>(
        &self,
        leading: [usize; K],
    ) -> View<T, L, M, MT> {
        const {
            assert!(
                K >= 1 && L >= 1 && K + L == R,
                "subview must fix at least one leading index and keep at least one"
            )
        };
        let mut offset = self.offset;
        for (d, &index) in leading.iter().enumerate() {
            assert!(
                index < self.extents[d],
                "index {} out of bounds for dim {} with extent {}",
                index,
                d,
                self.extents[d]
            );
            offset += index as isize * self.strides[d];
        }
        let mut extents = [0usize; L];
        extents.copy_from_slice(&self.extents[K..]);
        let mut strides = [0isize; L];
        strides.copy_from_slice(&self.strides[K..]);
        View {
            mode: self.mode.clone(),
            extents,
            strides,
            offset,
            _elem: PhantomData,
        }
    }

    /// Retag the view with different memory traits.
    pub fn with_memory_traits<const MT2: u8>(self) -> View<T, R, M, MT2> {
        View {
            mode: self.mode,
            extents: self.extents,
            strides: self.strides,
            offset: self.offset,
            _elem: PhantomData,
        }
    }

    /// Copy the elements in row-major logical order.
    pub fn to_vec(&self) -> Vec<T>
    where
        T: Clone,
    {
        let size = self.size();
        let mut out = Vec::with_capacity(size);
        let mut idx = [0usize; R];
        for _ in 0..size {
            out.push(self[idx].clone());
            for d in (0..R).rev() {
                idx[d] += 1;
                if idx[d] < self.extents[d] {
                    break;
                }
                idx[d] = 0;
            }
        }
        out
    }

    /// Ownership mode of the view.
    #[inline]
    pub fn mode(&self) -> &M {
        &self.mode
    }

    /// Split the view into its mode and layout metadata.
    pub fn into_raw_parts(self) -> (M, [usize; R], [isize; R], isize) {
        (self.mode, self.extents, self.strides, self.offset)
    }

    /// Rebuild a view from its parts.
    ///
    /// # Safety
    /// Every index within `extents` must map, through `strides` and
    /// `offset`, to an element of the buffer held by `mode`.
    pub unsafe fn from_raw_parts(
        mode: M,
        extents: [usize; R],
        strides: [isize; R],
        offset: isize,
    ) -> Self {
        Self {
            mode,
            extents,
            strides,
            offset,
            _elem: PhantomData,
        }
    }
}

impl<T, const R: usize, M: Mode<T>, const MT: u8> Index<[usize; R]> for View<T, R, M, MT> {
    type Output = T;

    #[inline]
    fn index(&self, index: [usize; R]) -> &T {
        let off = self.offset_of(&index);
        // SAFETY: bounds checked by `offset_of`.
        unsafe { &*self.mode.base_ptr().offset(off) }
    }
}

// ============================================================================
// Tests
// ============================================================================
