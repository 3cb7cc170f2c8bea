//! Document: one open file as the search engine sees it.
//!
//! A `Document` bundles the rope [`Buffer`] with the state an editor keeps
//! next to it: the selection, a [`TagTable`], a [`Viewport`] and the undo
//! [`History`]. It implements [`TextBuffer`], so everything the engine does
//! to it (select, tag, replace, scroll) goes through the same paths a text
//! widget would take.
//!
//! Edits made outside an explicit user action are each their own undo step.

use std::path::Path;

use crate::buffer::Buffer;
use crate::error::Result;
use crate::history::History;
use crate::position::CharRange;
use crate::tags::TagTable;
use crate::text_buffer::{Tag, TextBuffer};
use crate::view::Viewport;

/// An open document.
#[derive(Debug, Default)]
pub struct Document {
    buffer: Buffer,
    selection: CharRange,
    tags: TagTable,
    viewport: Viewport,
    history: History,
}

impl Document {
    // -- Construction -------------------------------------------------------

    /// An empty, unnamed document.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A document holding `text`, cursor at the start.
    #[must_use]
    pub fn from_text(text: &str) -> Self {
        Self::from_buffer(Buffer::from_text(text))
    }

    /// Wrap an existing buffer.
    #[must_use]
    pub fn from_buffer(buffer: Buffer) -> Self {
        Self {
            buffer,
            ..Self::default()
        }
    }

    /// Open a file.
    ///
    /// # Errors
    ///
    /// See [`Buffer::from_file`].
    pub fn from_file(path: &Path) -> Result<Self> {
        Buffer::from_file(path).map(Self::from_buffer)
    }

    /// Save to the buffer's own path.
    ///
    /// # Errors
    ///
    /// See [`Buffer::save`].
    pub fn save(&mut self) -> Result<()> {
        self.buffer.save()
    }

    // -- Accessors ----------------------------------------------------------

    /// The underlying text storage.
    #[inline]
    #[must_use]
    pub const fn buffer(&self) -> &Buffer {
        &self.buffer
    }

    /// Tagged spans.
    #[inline]
    #[must_use]
    pub const fn tags(&self) -> &TagTable {
        &self.tags
    }

    /// Scroll state.
    #[inline]
    #[must_use]
    pub const fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// Mutable scroll state, for resizing.
    #[inline]
    pub const fn viewport_mut(&mut self) -> &mut Viewport {
        &mut self.viewport
    }

    /// Undo history.
    #[inline]
    #[must_use]
    pub const fn history(&self) -> &History {
        &self.history
    }

    /// Collect all text into a `String`.
    #[must_use]
    pub fn contents(&self) -> String {
        self.buffer.contents()
    }

    /// The file path, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.buffer.path()
    }

    /// True if modified since load or the last save.
    #[must_use]
    pub const fn is_modified(&self) -> bool {
        self.buffer.is_modified()
    }

    /// Move the cursor to `offset`, clearing the selection.
    pub fn set_cursor(&mut self, offset: usize) {
        self.select(CharRange::point(offset));
    }

    // -- Undo / redo --------------------------------------------------------

    /// Undo the last user action. Returns false when there was nothing to
    /// undo.
    pub fn undo(&mut self) -> bool {
        let Self {
            buffer,
            tags,
            history,
            ..
        } = self;
        let restored = history.undo(|range, text| {
            apply_edit(buffer, tags, range, text);
        });
        self.restore_selection(restored)
    }

    /// Redo the last undone user action. Returns false when there was
    /// nothing to redo.
    pub fn redo(&mut self) -> bool {
        let Self {
            buffer,
            tags,
            history,
            ..
        } = self;
        let restored = history.redo(|range, text| {
            apply_edit(buffer, tags, range, text);
        });
        self.restore_selection(restored)
    }

    fn restore_selection(&mut self, restored: Option<CharRange>) -> bool {
        match restored {
            Some(selection) => {
                self.select(selection);
                true
            }
            None => false,
        }
    }

    fn clamp(&self, range: CharRange) -> CharRange {
        let len = self.buffer.len_chars();
        CharRange::new(range.start.min(len), range.end.min(len))
    }
}

impl TextBuffer for Document {
    fn len_chars(&self) -> usize {
        self.buffer.len_chars()
    }

    fn char_at(&self, offset: usize) -> Option<char> {
        self.buffer.char_at(offset)
    }

    fn text(&self, range: CharRange) -> String {
        self.buffer
            .slice_to_string(self.clamp(range))
            .unwrap_or_default()
    }

    fn selection(&self) -> CharRange {
        self.selection
    }

    fn select(&mut self, range: CharRange) {
        self.selection = self.clamp(range);
    }

    fn replace(&mut self, range: CharRange, text: &str) {
        let range = self.clamp(range);
        let own_step = !self.history.in_transaction();
        if own_step {
            self.history.begin(self.selection);
        }

        let removed = apply_edit(&mut self.buffer, &mut self.tags, range, text);
        self.history.record(range.start, &removed, text);

        let inserted = text.chars().count();
        self.selection = CharRange::new(
            shift_offset(self.selection.start, range, inserted),
            shift_offset(self.selection.end, range, inserted),
        );

        if own_step {
            self.history.end(self.selection);
        }
    }

    fn apply_tag(&mut self, tag: Tag, range: CharRange) {
        let range = self.clamp(range);
        self.tags.apply(tag, range);
    }

    fn remove_tag(&mut self, tag: Tag) -> usize {
        self.tags.remove(tag)
    }

    fn scroll_to(&mut self, range: CharRange, margin: f32) {
        self.viewport.scroll_to(&self.buffer, range, margin);
    }

    fn begin_user_action(&mut self) {
        self.history.begin(self.selection);
    }

    fn end_user_action(&mut self) {
        self.history.end(self.selection);
    }

    fn full_text(&self) -> String {
        self.buffer.contents()
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Replace `range` in the buffer and keep the tags attached to their text.
fn apply_edit(buffer: &mut Buffer, tags: &mut TagTable, range: CharRange, text: &str) -> String {
    let removed = buffer.replace(range, text);
    tags.adjust(range, text.chars().count());
    removed
}

/// Where `offset` ends up after `edited` was replaced by `inserted` chars.
/// Offsets inside the replaced text move to the end of the new text.
const fn shift_offset(offset: usize, edited: CharRange, inserted: usize) -> usize {
    if offset <= edited.start {
        offset
    } else if offset >= edited.end {
        offset - edited.len() + inserted
    } else {
        edited.start + inserted
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    // -- shift_offset -------------------------------------------------------

    #[test]
    fn shift_offset_rules() {
        let edited = CharRange::new(4, 8);
        assert_eq!(shift_offset(2, edited, 1), 2);
        assert_eq!(shift_offset(4, edited, 1), 4);
        assert_eq!(shift_offset(6, edited, 1), 5);
        assert_eq!(shift_offset(8, edited, 1), 5);
        assert_eq!(shift_offset(10, edited, 1), 7);
    }

    // -- TextBuffer ---------------------------------------------------------

    #[test]
    fn text_and_chars() {
        let doc = Document::from_text("héllo world");
        assert_eq!(doc.len_chars(), 11);
        assert_eq!(doc.char_at(1), Some('é'));
        assert_eq!(doc.char_at(11), None);
        assert_eq!(doc.text(CharRange::new(6, 11)), "world");
        assert_eq!(doc.text(CharRange::new(6, 99)), "world");
        assert_eq!(doc.full_text(), "héllo world");
    }

    #[test]
    fn select_clamps_to_buffer() {
        let mut doc = Document::from_text("abc");
        doc.select(CharRange::new(1, 10));
        assert_eq!(doc.selection(), CharRange::new(1, 3));
        doc.set_cursor(2);
        assert_eq!(doc.selection(), CharRange::point(2));
    }

    #[test]
    fn replace_shifts_selection_after_edit() {
        let mut doc = Document::from_text("one two three");
        doc.select(CharRange::new(8, 13));
        doc.replace(CharRange::new(0, 3), "1");
        assert_eq!(doc.contents(), "1 two three");
        assert_eq!(doc.selection(), CharRange::new(6, 11));
        assert_eq!(doc.text(doc.selection()), "three");
    }

    #[test]
    fn replace_moves_tags_with_text() {
        let mut doc = Document::from_text("cat dog cat");
        doc.apply_tag(Tag::SearchHighlight, CharRange::new(8, 11));
        doc.replace(CharRange::new(4, 7), "horse");
        let ranges: Vec<_> = doc.tags().ranges(Tag::SearchHighlight).collect();
        assert_eq!(ranges, vec![CharRange::new(10, 13)]);
        assert_eq!(doc.text(ranges[0]), "cat");
    }

    #[test]
    fn remove_tag_counts_spans() {
        let mut doc = Document::from_text("a b c");
        doc.apply_tag(Tag::SearchHighlight, CharRange::new(0, 1));
        doc.apply_tag(Tag::SearchHighlight, CharRange::new(4, 5));
        doc.apply_tag(Tag::Named("spell"), CharRange::new(2, 3));
        assert_eq!(doc.remove_tag(Tag::SearchHighlight), 2);
        assert_eq!(doc.tags().count(Tag::Named("spell")), 1);
    }

    #[test]
    fn scroll_to_moves_viewport() {
        let text: Vec<String> = (0..100).map(|i| format!("row {i}")).collect();
        let mut doc = Document::from_text(&text.join("\n"));
        doc.viewport_mut().resize(10, 80);
        let offset = doc.buffer().pos_to_char_idx(crate::position::Position::new(60, 0)).unwrap();
        doc.scroll_to(CharRange::point(offset), 0.0);
        assert!(doc.viewport().is_line_visible(60));
        assert_eq!(doc.viewport().top_line(), 51);
    }

    // -- Undo / redo --------------------------------------------------------

    #[test]
    fn each_replace_is_its_own_step() {
        let mut doc = Document::from_text("abc");
        doc.replace(CharRange::new(0, 1), "x");
        doc.replace(CharRange::new(1, 2), "y");
        assert_eq!(doc.contents(), "xyc");
        assert_eq!(doc.history().undo_count(), 2);

        assert!(doc.undo());
        assert_eq!(doc.contents(), "xbc");
    }

    #[test]
    fn user_action_undoes_as_one_step() {
        let mut doc = Document::from_text("aaaa");
        doc.set_cursor(1);
        doc.begin_user_action();
        doc.replace(CharRange::new(2, 4), "b");
        doc.replace(CharRange::new(0, 2), "b");
        doc.end_user_action();
        assert_eq!(doc.contents(), "bb");
        assert_eq!(doc.history().undo_count(), 1);

        assert!(doc.undo());
        assert_eq!(doc.contents(), "aaaa");
        assert_eq!(doc.selection(), CharRange::point(1));
        assert!(!doc.undo());

        assert!(doc.redo());
        assert_eq!(doc.contents(), "bb");
        assert!(!doc.redo());
    }

    #[test]
    fn undo_restores_tags_positions() {
        let mut doc = Document::from_text("x needle");
        doc.apply_tag(Tag::SearchHighlight, CharRange::new(2, 8));
        doc.replace(CharRange::new(0, 1), "xyz");
        assert_eq!(doc.tags().ranges(Tag::SearchHighlight).next(), Some(CharRange::new(4, 10)));
        doc.undo();
        assert_eq!(doc.tags().ranges(Tag::SearchHighlight).next(), Some(CharRange::new(2, 8)));
    }

    // -- File I/O -----------------------------------------------------------

    #[test]
    fn open_edit_save() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.txt");
        std::fs::write(&path, "hello\r\nworld\r\n").unwrap();

        let mut doc = Document::from_file(&path).unwrap();
        assert!(!doc.is_modified());
        assert_eq!(doc.path(), Some(path.as_path()));

        doc.replace(CharRange::new(7, 12), "there");
        assert!(doc.is_modified());
        doc.save().unwrap();
        assert!(!doc.is_modified());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "hello\r\nthere\r\n");
    }
}
