//! Tag table: visual annotations that follow the text.
//!
//! A [`TagTable`] holds `(Tag, CharRange)` spans for one document. Spans of
//! the same tag never overlap or touch: [`apply`](TagTable::apply) merges
//! them. When the text is edited, [`adjust`](TagTable::adjust) moves spans
//! after the edit and clips the ones that covered replaced text, the way a
//! text widget keeps its tags attached to characters.

use crate::position::CharRange;
use crate::text_buffer::Tag;

/// Tagged spans of a single document.
#[derive(Debug, Clone, Default)]
pub struct TagTable {
    /// Sorted by `(start, end)`.
    spans: Vec<(Tag, CharRange)>,
}

impl TagTable {
    /// Create an empty table.
    #[must_use]
    pub const fn new() -> Self {
        Self { spans: Vec::new() }
    }

    /// Tag `range`, merging with overlapping or adjacent spans of the same
    /// tag. Empty ranges are ignored.
    pub fn apply(&mut self, tag: Tag, range: CharRange) {
        if range.is_empty() {
            return;
        }
        let mut merged = range;
        self.spans.retain(|&(t, r)| {
            let touching = r.start <= merged.end && merged.start <= r.end;
            if t == tag && touching {
                merged = CharRange::new(merged.start.min(r.start), merged.end.max(r.end));
                false
            } else {
                true
            }
        });
        let at = self
            .spans
            .partition_point(|&(_, r)| (r.start, r.end) < (merged.start, merged.end));
        self.spans.insert(at, (tag, merged));
    }

    /// Remove every span of `tag`. Returns the number removed.
    pub fn remove(&mut self, tag: Tag) -> usize {
        let before = self.spans.len();
        self.spans.retain(|&(t, _)| t != tag);
        before - self.spans.len()
    }

    /// Number of spans carrying `tag`.
    #[must_use]
    pub fn count(&self, tag: Tag) -> usize {
        self.spans.iter().filter(|&&(t, _)| t == tag).count()
    }

    /// All spans of `tag`, in document order.
    pub fn ranges(&self, tag: Tag) -> impl Iterator<Item = CharRange> + '_ {
        self.spans
            .iter()
            .filter(move |&&(t, _)| t == tag)
            .map(|&(_, r)| r)
    }

    /// Spans overlapping `range`, in document order. Used by a renderer to
    /// paint the visible lines.
    pub fn spans_in(&self, range: CharRange) -> impl Iterator<Item = (Tag, CharRange)> + '_ {
        self.spans
            .iter()
            .copied()
            .filter(move |&(_, r)| r.overlaps(range))
    }

    /// True when no spans are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    /// Update spans after `edited` was replaced by `inserted_len` chars.
    ///
    /// Spans entirely after the edit shift by the length difference. Spans
    /// overlapping the replaced text keep only their parts outside it; a
    /// span that is left empty is dropped.
    pub fn adjust(&mut self, edited: CharRange, inserted_len: usize) {
        let shift = |offset: usize| offset - edited.len() + inserted_len;

        for (_, r) in &mut self.spans {
            if r.end <= edited.start {
                continue;
            }
            *r = if r.start >= edited.end {
                CharRange::new(shift(r.start), shift(r.end))
            } else {
                // Overlaps the replaced text: keep the parts outside it.
                match (r.start < edited.start, r.end > edited.end) {
                    // The edit landed inside the span, which now covers the
                    // inserted text too.
                    (true, true) => CharRange::new(r.start, shift(r.end)),
                    (true, false) => CharRange::new(r.start, edited.start),
                    (false, true) => CharRange::new(edited.start + inserted_len, shift(r.end)),
                    (false, false) => CharRange::point(edited.start),
                }
            };
        }
        self.spans.retain(|(_, r)| !r.is_empty());
        // Clipped spans may now sit out of order.
        self.spans.sort_by_key(|&(_, r)| (r.start, r.end));
        self.merge_touching();
    }

    /// Merge same-tag spans an edit pushed together. Expects `spans` sorted.
    fn merge_touching(&mut self) {
        // Index in `merged` of the last span of each tag.
        let mut last: Vec<(Tag, usize)> = Vec::new();
        let mut merged: Vec<(Tag, CharRange)> = Vec::with_capacity(self.spans.len());
        let mut grew = false;
        for (tag, r) in self.spans.drain(..) {
            match last.iter_mut().find(|(t, _)| *t == tag) {
                Some((_, i)) if merged[*i].1.end >= r.start => {
                    let prev = &mut merged[*i].1;
                    prev.end = prev.end.max(r.end);
                    grew = true;
                }
                Some((_, i)) => {
                    *i = merged.len();
                    merged.push((tag, r));
                }
                None => {
                    last.push((tag, merged.len()));
                    merged.push((tag, r));
                }
            }
        }
        if grew {
            merged.sort_by_key(|&(_, r)| (r.start, r.end));
        }
        self.spans = merged;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
