//! The `TextBuffer` capability trait.
//!
//! This is the whole surface the search engine needs from a document: read
//! text, look at single chars around a match, mutate a range, tag a range,
//! move the selection and scroll. [`Document`](crate::document::Document)
//! implements it over a rope; a GUI host implements it over its text widget.
//!
//! Offsets are char offsets (see [`position`](crate::position)).

use crate::position::CharRange;

/// A visual annotation on a range of text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tag {
    /// Occurrences marked by the search engine's Highlight action.
    SearchHighlight,
    /// A tag owned by some other component (bracket matching, spell check…).
    Named(&'static str),
}

/// Operations the search engine performs on a text buffer.
///
/// Callers guarantee exclusive, single-threaded access for the duration of
/// one engine call.
pub trait TextBuffer {
    /// Total number of chars.
    fn len_chars(&self) -> usize;

    /// The char at `offset`, or `None` past the end.
    fn char_at(&self, offset: usize) -> Option<char>;

    /// The text of `range`. `range` is within `0..=len_chars()`.
    fn text(&self, range: CharRange) -> String;

    /// The current selection. When nothing is selected this is an empty
    /// range at the cursor.
    fn selection(&self) -> CharRange;

    /// Select `range` (an empty range just moves the cursor).
    fn select(&mut self, range: CharRange);

    /// Replace the text of `range` with `text`.
    fn replace(&mut self, range: CharRange, text: &str);

    /// Apply `tag` over `range`.
    fn apply_tag(&mut self, tag: Tag, range: CharRange);

    /// Remove every span of `tag`, returning how many spans were removed.
    fn remove_tag(&mut self, tag: Tag) -> usize;

    /// Scroll so that `range` is visible, keeping `margin` (a fraction of
    /// the visible height) between it and the viewport edges.
    fn scroll_to(&mut self, range: CharRange, margin: f32);

    /// Start a group of edits that undo as one step. Groups nest.
    fn begin_user_action(&mut self) {}

    /// End the innermost group started by [`begin_user_action`](Self::begin_user_action).
    fn end_user_action(&mut self) {}

    /// The whole text.
    fn full_text(&self) -> String {
        self.text(CharRange::new(0, self.len_chars()))
    }
}
