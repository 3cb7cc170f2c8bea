//! Text position and range types.
//!
//! The engine addresses text by **char offset**: the index of a Unicode scalar
//! value from the start of the buffer. Offsets are what the rope indexes
//! natively and they survive being passed across the `TextBuffer` seam.
//!
//! [`Position`] (line, col) exists for humans: status bars, `path:line:col`
//! listings, scrolling. Both coordinates are **0-indexed**; the `Display`
//! impls convert to 1-indexed.

use std::fmt;

// ---------------------------------------------------------------------------
// Position
// ---------------------------------------------------------------------------

/// A position in a text buffer: (line, column), both 0-indexed.
///
/// `col` is the char offset from the start of the line, **not** a byte offset.
///
/// # Ordering
///
/// Positions are ordered lexicographically: line first, then column.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    pub line: usize,
    pub col: usize,
}

impl Position {
    /// The origin, line 0 column 0.
    pub const ZERO: Self = Self { line: 0, col: 0 };

    /// Create a new position.
    #[inline]
    #[must_use]
    pub const fn new(line: usize, col: usize) -> Self {
        Self { line, col }
    }
}

// Natural ordering: line first, then column.
impl Ord for Position {
    #[inline]
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.line
            .cmp(&other.line)
            .then(self.col.cmp(&other.col))
    }
}

impl PartialOrd for Position {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Debug for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Pos({}:{})", self.line, self.col)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // 1-indexed, the way editors and compilers print locations.
        write!(f, "{}:{}", self.line + 1, self.col + 1)
    }
}

// ---------------------------------------------------------------------------
// CharRange
// ---------------------------------------------------------------------------

/// A half-open range of char offsets: `[start, end)`.
///
/// `start` is inclusive, `end` is exclusive. An empty range has
/// `start == end` and doubles as a cursor. Ranges are always normalized so
/// that `start <= end`; use [`CharRange::new`], which enforces this, or
/// [`CharRange::ordered`] on untrusted input.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CharRange {
    pub start: usize,
    pub end: usize,
}

impl CharRange {
    /// Create a range. Panics in debug if `start > end`.
    #[inline]
    #[must_use]
    pub const fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= end, "CharRange::new requires start <= end");
        Self { start, end }
    }

    /// Create a range from two arbitrary offsets, swapping if needed. Useful
    /// for anchor + head of a selection dragged backwards.
    #[inline]
    #[must_use]
    pub const fn ordered(a: usize, b: usize) -> Self {
        if a <= b {
            Self { start: a, end: b }
        } else {
            Self { start: b, end: a }
        }
    }

    /// A zero-width range (a cursor) at `offset`.
    #[inline]
    #[must_use]
    pub const fn point(offset: usize) -> Self {
        Self {
            start: offset,
            end: offset,
        }
    }

    /// True when the range spans zero characters.
    #[inline]
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.start == self.end
    }

    /// Number of chars covered.
    #[inline]
    #[must_use]
    pub const fn len(self) -> usize {
        self.end - self.start
    }

    /// True when `offset` falls within `[start, end)`.
    #[inline]
    #[must_use]
    pub const fn contains(self, offset: usize) -> bool {
        offset >= self.start && offset < self.end
    }

    /// True when the two ranges share at least one char.
    #[inline]
    #[must_use]
    pub const fn overlaps(self, other: Self) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Clamp `offset` into `[start, end]`.
    #[inline]
    #[must_use]
    pub fn clamp(self, offset: usize) -> usize {
        offset.clamp(self.start, self.end)
    }

    /// The range as a `std::ops::Range` for slicing.
    #[inline]
    #[must_use]
    pub const fn as_std(self) -> std::ops::Range<usize> {
        self.start..self.end
    }
}

impl fmt::Debug for CharRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Chars({}..{})", self.start, self.end)
    }
}

impl fmt::Display for CharRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

impl From<std::ops::Range<usize>> for CharRange {
    fn from(r: std::ops::Range<usize>) -> Self {
        Self::ordered(r.start, r.end)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
