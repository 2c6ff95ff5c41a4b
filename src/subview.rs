//! Bracket indexing by successive slicing.

use std::ops::Index;

use brak_view::{Mode, View, MAX_RANK};

use crate::bracket::Bracket;
use crate::unmanaged::MakeUnmanaged;

/// Wrapper whose brackets slice the view.
///
/// Each [`at`](Bracket::at) on a wrapper of rank `C > 1` fixes the leading
/// dimension of the wrapped view and wraps the resulting view of rank
/// `C - 1`, which shares the original buffer. The view is made unmanaged
/// before the first slice, so only the depth-0 wrapper can hold a
/// reference-counted view.
///
/// ```rust
/// use brak::{Bracket, View, WrapperSubview};
///
/// let data = View::<i32, 3>::new("data", [2, 3, 4]);
/// let w3 = WrapperSubview::new(data.clone());
/// let w2 = w3.at(1);
/// assert_eq!(w2.view().extents(), &[3, 4]);
///
/// // SAFETY: nothing else accesses this element meanwhile.
/// unsafe { w2.at(2).at(3).write(5) };
/// assert_eq!(w2.at(2)[3], 5);
/// assert_eq!(data[[1, 2, 3]], 5);
/// ```
///
/// The direct access takes exactly as many indices as the current rank:
///
/// ```compile_fail
/// use brak::{Bracket, View, WrapperSubview};
///
/// let w = WrapperSubview::new(View::<i32, 3>::new("data", [2, 2, 2]));
/// let _ = w.at(0).call([0, 0, 0]);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct WrapperSubview<V> {
    view: V,
}

impl<T, const R: usize, M: Mode<T>, const MT: u8> WrapperSubview<View<T, R, M, MT>> {
    /// Wrap a view of rank 1 to 8.
    pub fn new(view: View<T, R, M, MT>) -> Self {
        const {
            assert!(
                R >= 1 && R <= MAX_RANK,
                "wrapped view rank must be between 1 and 8"
            )
        };
        if M::MANAGED {
            tracing::trace!(
                label = view.label(),
                rank = R,
                "wrapping managed view by subviews"
            );
        }
        Self { view }
    }

    /// Current rank, equal to the rank of the wrapped view.
    #[inline]
    pub const fn rank(&self) -> usize {
        R
    }

    /// Access an element with all remaining indices at once.
    ///
    /// # Panics
    /// Panics if an index is out of range.
    #[inline]
    pub fn call(&self, indices: [usize; R]) -> M::Ref<'_> {
        self.view.element_ref(indices)
    }

    /// Raw pointer to the origin of the wrapped view.
    ///
    /// Once brackets have sliced the view, the elements reachable from this
    /// pointer are generally not contiguous; only the strides of
    /// [`view`](Self::view) describe where they are.
    #[inline]
    pub fn as_mut_ptr(&self) -> *mut T {
        self.view.as_mut_ptr()
    }

    /// The wrapped view, sharing its buffer.
    #[inline]
    pub fn view(&self) -> View<T, R, M, MT> {
        self.view.clone()
    }
}

macro_rules! impl_bracket_subview {
    ($($rank:literal => $lower:literal),* $(,)?) => {$(
        impl<T, M: Mode<T>, const MT: u8> Bracket for WrapperSubview<View<T, $rank, M, MT>> {
            const RANK: usize = $rank;

            type Output<'s> = WrapperSubview<View<T, $lower, M::AsUnmanaged<'s>, MT>>
            where
                Self: 's;

            #[inline]
            fn at(&self, index: usize) -> Self::Output<'_> {
                WrapperSubview {
                    view: self.view.make_unmanaged().subview::<1, $lower>([index]),
                }
            }
        }
    )*};
}

impl_bracket_subview!(8 => 7, 7 => 6, 6 => 5, 5 => 4, 4 => 3, 3 => 2, 2 => 1);

impl<T, M: Mode<T>, const MT: u8> Bracket for WrapperSubview<View<T, 1, M, MT>> {
    const RANK: usize = 1;

    type Output<'s> = M::Ref<'s> where Self: 's;

    #[inline]
    fn at(&self, index: usize) -> Self::Output<'_> {
        self.view.element_ref([index])
    }
}

impl<T, const R: usize, M: Mode<T>, const MT: u8> Index<[usize; R]>
    for WrapperSubview<View<T, R, M, MT>>
{
    type Output = T;

    #[inline]
    fn index(&self, indices: [usize; R]) -> &T {
        &self.view[indices]
    }
}

impl<T, M: Mode<T>, const MT: u8> Index<usize> for WrapperSubview<View<T, 1, M, MT>> {
    type Output = T;

    #[inline]
    fn index(&self, index: usize) -> &T {
        &self.view[[index]]
    }
}
