//! Bracket indexing by index accumulation.

use std::ops::Index;

use brak_view::{Mode, View, MAX_RANK};

use crate::bracket::Bracket;
use crate::unmanaged::MakeUnmanaged;

/// Wrapper whose brackets record indices and access the view once.
///
/// `C` is the current rank: the number of indices still to be supplied.
/// Each [`at`](Bracket::at) on a wrapper with `C > 1` stores the index and
/// returns a wrapper with `C - 1` over the same, never sliced, view. The
/// bracket at `C == 1` performs a single native access with all `R` indices.
/// As with [`WrapperSubview`](crate::WrapperSubview), the view stops being
/// reference counted after the first bracket.
///
/// ```rust
/// use brak::{Bracket, View, WrapperArray};
///
/// let data = View::<i32, 3>::new("data", [2, 3, 4]);
/// let w3 = WrapperArray::new(data.clone());
/// let w1 = w3.at(1).at(2);
/// assert_eq!(w1.indices(), &[1, 2]);
/// assert_eq!((w1.rank(), w1.depth()), (1, 2));
///
/// // SAFETY: nothing else accesses this element meanwhile.
/// unsafe { w1.at(3).write(5) };
/// assert_eq!(*w1.at(3), 5);
/// assert_eq!(data[[1, 2, 3]], 5);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct WrapperArray<V, const C: usize> {
    view: V,
    indices: [usize; MAX_RANK],
}

impl<T, const R: usize, M: Mode<T>, const MT: u8> WrapperArray<View<T, R, M, MT>, R> {
    /// Wrap a view of rank 1 to 8, with no index recorded yet.
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
                "wrapping managed view by index accumulation"
            );
        }
        Self {
            view,
            indices: [0; MAX_RANK],
        }
    }
}

impl<T, const R: usize, M: Mode<T>, const MT: u8, const C: usize>
    WrapperArray<View<T, R, M, MT>, C>
{
    /// Number of indices still open.
    #[inline]
    pub const fn rank(&self) -> usize {
        C
    }

    /// Rank of the wrapped view.
    #[inline]
    pub const fn rank_source(&self) -> usize {
        R
    }

    /// Number of brackets applied so far.
    #[inline]
    pub const fn depth(&self) -> usize {
        R - C
    }

    /// Indices recorded so far, outermost first.
    #[inline]
    pub fn indices(&self) -> &[usize] {
        &self.indices[..R - C]
    }

    /// Full index: the recorded prefix followed by `rest`.
    #[inline]
    fn full_index(&self, rest: [usize; C]) -> [usize; R] {
        const { assert!(C >= 1 && C <= R) };
        let mut full = [0usize; R];
        full[..R - C].copy_from_slice(&self.indices[..R - C]);
        full[R - C..].copy_from_slice(&rest);
        full
    }

    /// Access an element with all remaining indices at once.
    ///
    /// # Panics
    /// Panics if a recorded or supplied index is out of range.
    #[inline]
    pub fn call(&self, rest: [usize; C]) -> M::Ref<'_> {
        self.view.element_ref(self.full_index(rest))
    }

    /// Raw pointer to the origin of the wrapped view.
    ///
    /// The view is never sliced, so this stays the origin of the original
    /// view whatever the depth.
    #[inline]
    pub fn as_mut_ptr(&self) -> *mut T {
        self.view.as_mut_ptr()
    }

    /// The wrapped view, at its full rank.
    #[inline]
    pub fn view(&self) -> View<T, R, M, MT> {
        self.view.clone()
    }
}

macro_rules! impl_bracket_array {
    ($($rank:literal => $lower:literal),* $(,)?) => {$(
        impl<T, const R: usize, M: Mode<T>, const MT: u8> Bracket
            for WrapperArray<View<T, R, M, MT>, $rank>
        {
            const RANK: usize = $rank;

            type Output<'s> = WrapperArray<View<T, R, M::AsUnmanaged<'s>, MT>, $lower>
            where
                Self: 's;

            #[inline]
            fn at(&self, index: usize) -> Self::Output<'_> {
                let mut indices = self.indices;
                indices[R - $rank] = index;
                WrapperArray {
                    view: self.view.make_unmanaged(),
                    indices,
                }
            }
        }
    )*};
}

impl_bracket_array!(8 => 7, 7 => 6, 6 => 5, 5 => 4, 4 => 3, 3 => 2, 2 => 1);

impl<T, const R: usize, M: Mode<T>, const MT: u8> Bracket
    for WrapperArray<View<T, R, M, MT>, 1>
{
    const RANK: usize = 1;

    type Output<'s> = M::Ref<'s> where Self: 's;

    #[inline]
    fn at(&self, index: usize) -> Self::Output<'_> {
        self.view.element_ref(self.full_index([index]))
    }
}

impl<T, const R: usize, M: Mode<T>, const MT: u8, const C: usize> Index<[usize; C]>
    for WrapperArray<View<T, R, M, MT>, C>
{
    type Output = T;

    #[inline]
    fn index(&self, rest: [usize; C]) -> &T {
        &self.view[self.full_index(rest)]
    }
}

impl<T, const R: usize, M: Mode<T>, const MT: u8> Index<usize>
    for WrapperArray<View<T, R, M, MT>, 1>
{
    type Output = T;

    #[inline]
    fn index(&self, index: usize) -> &T {
        &self[[index]]
    }
}
