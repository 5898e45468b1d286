use crate::ring::Ring;

/// Read-only indexed access to a run of symbols.
///
/// Implemented for plain buffers and for [`PaddedView`], which lets the
/// transforms read a block with one extra virtual symbol without copying it.
pub trait SymbolSource<T: Ring> {
    fn len(&self) -> usize;

    fn at(&self, index: usize) -> T;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: Ring> SymbolSource<T> for [T] {
    fn len(&self) -> usize {
        <[T]>::len(self)
    }

    fn at(&self, index: usize) -> T {
        self[index]
    }
}

impl<T: Ring> SymbolSource<T> for Vec<T> {
    fn len(&self) -> usize {
        Vec::len(self)
    }

    fn at(&self, index: usize) -> T {
        self[index]
    }
}

/// A block viewed as one symbol longer than its backing storage.
///
/// Every index at or past the end of the backing slice reads as the
/// sentinel, so `len()` is `data.len() + 1`.
#[derive(Debug, Clone, Copy)]
pub struct PaddedView<'a, T> {
    data: &'a [T],
    sentinel: T,
}

impl<'a, T: Ring> PaddedView<'a, T> {
    /// Pad with the ring's one, which keeps a trailing coefficient invertible.
    pub fn new(data: &'a [T]) -> Self {
        Self::with_sentinel(data, T::ONE)
    }

    pub fn with_sentinel(data: &'a [T], sentinel: T) -> Self {
        Self { data, sentinel }
    }

    pub fn backing(&self) -> &'a [T] {
        self.data
    }

    pub fn to_vec(&self) -> Vec<T> {
        (0..SymbolSource::len(self)).map(|i| self.at(i)).collect()
    }
}

impl<T: Ring> SymbolSource<T> for PaddedView<'_, T> {
    fn len(&self) -> usize {
        self.data.len() + 1
    }

    fn at(&self, index: usize) -> T {
        self.data.get(index).copied().unwrap_or(self.sentinel)
    }
}
