//! Handle to one element of a shared buffer.

use std::fmt;
use std::marker::PhantomData;
use std::ops::Deref;

/// Reference to a single element of a view's buffer, valid for `'a`.
///
/// Views are shared handles, so safe code only reads through an element
/// reference (it dereferences to `&T`). Writes go through
/// [`as_mut`](Self::as_mut) or [`write`](Self::write), whose callers
/// guarantee that nothing else accesses the element meanwhile.
///
/// Two handles to one element can coexist, but neither can be written
/// through in safe code:
///
/// ```compile_fail
/// use brak_view::View;
///
/// let data = View::<i32, 1>::new("data", [2]);
/// let a = data.element_ref([1]);
/// let b = data.element_ref([1]);
/// *a = 1;
/// *b = 2;
/// ```
pub struct ElementRef<'a, T> {
    ptr: *mut T,
    _marker: PhantomData<&'a T>,
}

impl<'a, T> ElementRef<'a, T> {
    /// # Safety
    /// `ptr` must point to an initialized element that stays valid for `'a`.
    #[inline]
    pub(crate) unsafe fn new(ptr: *mut T) -> Self {
        Self {
            ptr,
            _marker: PhantomData,
        }
    }

    /// Address of the element.
    #[inline]
    pub fn as_ptr(self) -> *mut T {
        self.ptr
    }

    /// Mutable reference to the element.
    ///
    /// # Safety
    /// While the returned reference is live, the element must not be read
    /// or written through any other handle, on this thread or another.
    #[inline]
    pub unsafe fn as_mut(self) -> &'a mut T {
        &mut *self.ptr
    }

    /// Replace the element with `value`, dropping the old one.
    ///
    /// # Safety
    /// No other access to the element may run concurrently with the write.
    #[inline]
    pub unsafe fn write(self, value: T) {
        *self.ptr = value;
    }
}

impl<T> Clone for ElementRef<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for ElementRef<'_, T> {}

impl<T> Deref for ElementRef<'_, T> {
    type Target = T;

    #[inline]
    fn deref(&self) -> &T {
        // SAFETY: the element is valid for `'a`; writers guarantee they do
        // not overlap with other accesses.
        unsafe { &*self.ptr }
    }
}

impl<T: fmt::Debug> fmt::Debug for ElementRef<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&**self, f)
    }
}

#[cfg(test)]
mod tests {
    use crate::View;

    #[test]
    fn test_aliasing_handles_share_address() {
        let data = View::<i32, 2>::new("data", [2, 2]);
        let a = data.element_ref([1, 1]);
        let b = data.element_ref([1, 1]);
        assert_eq!(a.as_ptr(), b.as_ptr());
        unsafe { a.write(3) };
        assert_eq!(*b, 3);
    }

    #[test]
    fn test_as_mut_updates_in_place() {
        let data = View::from_fn("data", [3], |[i]| i as f64);
        let element = data.element_ref([2]);
        unsafe { *element.as_mut() *= 4.0 };
        assert_eq!(data[[2]], 8.0);
        assert_eq!(format!("{:?}", element), "8.0");
    }
}
