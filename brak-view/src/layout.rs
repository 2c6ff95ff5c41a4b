//! Memory layouts and their stride computation.

/// Order in which a view's elements are laid out in its buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Layout {
    /// Row-major (C default): last index varies fastest.
    #[default]
    Right,
    /// Column-major (Fortran/Julia default): first index varies fastest.
    Left,
}

impl Layout {
    /// Strides of a dense buffer with this layout.
    pub fn strides<const R: usize>(self, extents: &[usize; R]) -> [isize; R] {
        match self {
            Layout::Right => row_major_strides(extents),
            Layout::Left => col_major_strides(extents),
        }
    }
}

/// Compute column-major strides (first index varies fastest).
pub fn col_major_strides<const R: usize>(extents: &[usize; R]) -> [isize; R] {
    let mut strides = [1isize; R];
    for i in 1..R {
        strides[i] = strides[i - 1] * extents[i - 1] as isize;
    }
    strides
}

/// Compute row-major strides (last index varies fastest).
pub fn row_major_strides<const R: usize>(extents: &[usize; R]) -> [isize; R] {
    let mut strides = [1isize; R];
    for i in (0..R.saturating_sub(1)).rev() {
        strides[i] = strides[i + 1] * extents[i + 1] as isize;
    }
    strides
}
