/// One bracket application: `a[index]`.
///
/// Implemented by both indexing wrappers for every rank from 1 to 8. On a
/// wrapper of rank `C > 1`, [`at`](Bracket::at) returns a wrapper of rank
/// `C - 1`; on a wrapper of rank 1 it returns an [`ElementRef`] to the
/// element.
///
/// The output of a wrapper over an unmanaged view keeps that view's lifetime
/// rather than borrowing the wrapper, so chains of temporaries are fine:
///
/// ```rust
/// use brak::{Bracket, ElementRef, View, WrapperSubview};
///
/// let data = View::<f32, 3>::new("data", [2, 2, 2]);
/// let w = WrapperSubview::new(data.clone());
/// assert_eq!(w.at(1).at(0).rank(), 1);
///
/// let element: ElementRef<'_, f32> = w.at(1).at(0).at(1);
/// // SAFETY: `element` is the only handle used on this element.
/// unsafe { element.write(0.5) };
/// assert_eq!(data[[1, 0, 1]], 0.5);
/// ```
///
/// [`ElementRef`]: crate::ElementRef
pub trait Bracket {
    /// Current rank: the number of brackets still needed to reach an element.
    const RANK: usize;

    /// Wrapper of rank one lower, or the element handle at rank 1.
    type Output<'s>
    where
        Self: 's;

    /// Fix the leading open index to `index`.
    ///
    /// # Panics
    /// Panics if `index` is out of range for the leading open dimension,
    /// exactly as the view's native access does.
    fn at(&self, index: usize) -> Self::Output<'_>;
}
