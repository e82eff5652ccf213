//! Packed null bitmap.

const WORD_BITS: usize = 64;

/// One bit per row, `1 = null`.
///
/// The bitmap length always matches the owning column's length.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NullBitmap {
    words: Vec<u64>,
    len: usize,
}

impl NullBitmap {
    /// Creates an empty bitmap.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty bitmap with room for `capacity` rows.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        NullBitmap {
            words: Vec::with_capacity(capacity.div_ceil(WORD_BITS)),
            len: 0,
        }
    }

    /// Returns the number of rows tracked.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if no rows are tracked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Reserves room for `additional` more rows.
    pub fn reserve(&mut self, additional: usize) {
        let needed = (self.len + additional).div_ceil(WORD_BITS);
        self.words.reserve(needed.saturating_sub(self.words.len()));
    }

    /// Appends one row.
    pub fn push(&mut self, is_null: bool) {
        let bit = self.len % WORD_BITS;
        if bit == 0 {
            self.words.push(0);
        }
        if is_null {
            let last = self.words.len() - 1;
            self.words[last] |= 1 << bit;
        }
        self.len += 1;
    }

    /// Returns whether row `i` is null. Rows past the end read as not null.
    #[must_use]
    pub fn is_null(&self, i: usize) -> bool {
        if i >= self.len {
            return false;
        }
        self.words[i / WORD_BITS] & (1 << (i % WORD_BITS)) != 0
    }

    /// Marks row `i` as null.
    pub fn set_null(&mut self, i: usize) {
        if i < self.len {
            self.words[i / WORD_BITS] |= 1 << (i % WORD_BITS);
        }
    }

    /// Returns the number of null rows.
    #[must_use]
    pub fn count_nulls(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Sets every row that is null in `other` to null here.
    ///
    /// Only the overlapping prefix is merged.
    pub fn union_with(&mut self, other: &NullBitmap) {
        let rows = self.len.min(other.len);
        let full_words = rows / WORD_BITS;
        for (dst, src) in self.words.iter_mut().zip(&other.words).take(full_words) {
            *dst |= *src;
        }
        let rem = rows % WORD_BITS;
        if rem != 0 {
            let mask = (1u64 << rem) - 1;
            self.words[full_words] |= other.words[full_words] & mask;
        }
    }

    /// Truncates to zero rows, keeping capacity.
    pub fn clear(&mut self) {
        self.words.clear();
        self.len = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_and_read() {
        let mut bm = NullBitmap::new();
        for i in 0..130 {
            bm.push(i % 3 == 0);
        }
        assert_eq!(bm.len(), 130);
        assert!(bm.is_null(0));
        assert!(!bm.is_null(1));
        assert!(bm.is_null(129));
        assert!(!bm.is_null(500));
        assert_eq!(bm.count_nulls(), 44);
    }

    #[test]
    fn test_union_partial_word() {
        let mut a = NullBitmap::new();
        let mut b = NullBitmap::new();
        for i in 0..70 {
            a.push(i == 1);
            b.push(i == 65 || i == 2);
        }
        a.union_with(&b);
        assert!(a.is_null(1));
        assert!(a.is_null(2));
        assert!(a.is_null(65));
        assert_eq!(a.count_nulls(), 3);
    }

    #[test]
    fn test_clear_keeps_nothing_visible() {
        let mut bm = NullBitmap::with_capacity(64);
        bm.push(true);
        bm.clear();
        assert!(bm.is_empty());
        bm.push(false);
        assert!(!bm.is_null(0));
    }
}
