//! Text buffer, the fundamental unit of text storage.
//!
//! A `Buffer` wraps a [`ropey::Rope`] with char-offset editing, conversion
//! between offsets and `Position` (line, col), file I/O, and metadata
//! (path, modified flag, line endings, byte-order mark).
//!
//! # Design choices
//!
//! - **Offsets are chars**, not bytes. Offset 3 of `"café"` is `'é'`. Byte
//!   offsets never leak into the public API.
//!
//! - **Line endings are detected on load** and normalized on save. The rope
//!   stores whatever the file contained; `line_ending` records the style to
//!   write back.
//!
//! - **Files are UTF-8.** A leading BOM is stripped on load and written back
//!   on save. Anything else is rejected with [`Error::Encoding`].
//!
//! - **No undo/redo here.** [`History`](crate::history::History) wraps edits
//!   from the [`Document`](crate::document::Document) layer.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use ropey::Rope;

use crate::error::{Error, Result};
use crate::position::{CharRange, Position};

const UTF8_BOM: &str = "\u{feff}";

// ---------------------------------------------------------------------------
// Line ending detection
// ---------------------------------------------------------------------------

/// Line ending style of a file.
///
/// Detected on load from the first occurrence. Defaults to `Lf` for new
/// buffers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LineEnding {
    /// `\n` (Unix, macOS, Linux).
    Lf,
    /// `\r\n` (Windows, DOS).
    CrLf,
    /// `\r` (classic Mac OS).
    Cr,
}

impl LineEnding {
    /// The string representation of this line ending.
    #[inline]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Lf => "\n",
            Self::CrLf => "\r\n",
            Self::Cr => "\r",
        }
    }

    /// Detect the line ending style from its first occurrence in `text`.
    /// Returns `Lf` if there is none.
    #[must_use]
    pub fn detect(text: &str) -> Self {
        let bytes = text.as_bytes();
        match bytes.iter().position(|&b| b == b'\n' || b == b'\r') {
            Some(i) if bytes[i] == b'\r' => {
                if bytes.get(i + 1) == Some(&b'\n') {
                    Self::CrLf
                } else {
                    Self::Cr
                }
            }
            _ => Self::Lf,
        }
    }
}

impl fmt::Display for LineEnding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lf => f.write_str("LF"),
            Self::CrLf => f.write_str("CRLF"),
            Self::Cr => f.write_str("CR"),
        }
    }
}

// ---------------------------------------------------------------------------
// Buffer
// ---------------------------------------------------------------------------

/// A text buffer backed by a rope.
///
/// Each open file (or scratch buffer) gets its own `Buffer`.
pub struct Buffer {
    rope: Rope,
    path: Option<PathBuf>,
    modified: bool,
    line_ending: LineEnding,
    bom: bool,
}

impl Buffer {
    // -- Construction -------------------------------------------------------

    /// Create an empty buffer with no file path.
    #[must_use]
    pub fn new() -> Self {
        Self {
            rope: Rope::new(),
            path: None,
            modified: false,
            line_ending: LineEnding::Lf,
            bom: false,
        }
    }

    /// Create a buffer from a string.
    #[must_use]
    pub fn from_text(text: &str) -> Self {
        Self {
            line_ending: LineEnding::detect(text),
            rope: Rope::from_str(text),
            path: None,
            modified: false,
            bom: false,
        }
    }

    /// Load a buffer from a file. The buffer starts unmodified.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the file cannot be read and
    /// [`Error::Encoding`] if it is not UTF-8.
    pub fn from_file(path: &Path) -> Result<Self> {
        let bytes = fs::read(path)?;
        let text = String::from_utf8(bytes).map_err(|_| Error::Encoding {
            path: path.to_path_buf(),
        })?;
        let (text, bom) = match text.strip_prefix(UTF8_BOM) {
            Some(rest) => (rest, true),
            None => (text.as_str(), false),
        };
        Ok(Self {
            line_ending: LineEnding::detect(text),
            rope: Rope::from_str(text),
            path: Some(path.to_path_buf()),
            modified: false,
            bom,
        })
    }

    // -- Text access --------------------------------------------------------

    /// Total character count (Unicode scalar values, not bytes).
    #[inline]
    #[must_use]
    pub fn len_chars(&self) -> usize {
        self.rope.len_chars()
    }

    /// True when the buffer contains no text.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rope.len_chars() == 0
    }

    /// Total number of lines. An empty buffer has 1 line.
    #[inline]
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    /// The character at `offset`, or `None` past the end.
    #[must_use]
    pub fn char_at(&self, offset: usize) -> Option<char> {
        (offset < self.rope.len_chars()).then(|| self.rope.char(offset))
    }

    /// The text of `range`, or `None` if it extends past the end.
    #[must_use]
    pub fn slice_to_string(&self, range: CharRange) -> Option<String> {
        (range.end <= self.rope.len_chars()).then(|| self.rope.slice(range.as_std()).to_string())
    }

    /// A line's text without its line ending. `None` past the last line.
    #[must_use]
    pub fn line_text(&self, line: usize) -> Option<String> {
        if line >= self.rope.len_lines() {
            return None;
        }
        let text = self.rope.line(line).to_string();
        Some(text.trim_end_matches(['\n', '\r']).to_string())
    }

    /// Collect all text into a `String`.
    #[must_use]
    pub fn contents(&self) -> String {
        self.rope.to_string()
    }

    // -- Coordinate conversion ----------------------------------------------

    /// Convert a char offset to a `Position`. Offsets past the end clamp to
    /// the end of the buffer.
    #[must_use]
    pub fn char_idx_to_pos(&self, offset: usize) -> Position {
        let offset = offset.min(self.rope.len_chars());
        let line = self.rope.char_to_line(offset);
        Position::new(line, offset - self.rope.line_to_char(line))
    }

    /// Convert a `Position` to a char offset. Returns `None` if the line does
    /// not exist or the column is past the line's last char (line ending
    /// included; one-past-the-end is allowed).
    #[must_use]
    pub fn pos_to_char_idx(&self, pos: Position) -> Option<usize> {
        if pos.line >= self.rope.len_lines() {
            return None;
        }
        let line_len = self.rope.line(pos.line).len_chars();
        (pos.col <= line_len).then(|| self.rope.line_to_char(pos.line) + pos.col)
    }

    // -- Editing ------------------------------------------------------------

    /// Replace the text in `range` with `text` and return what was removed.
    ///
    /// A range reaching past the end is clamped to the end.
    pub fn replace(&mut self, range: CharRange, text: &str) -> String {
        let len = self.rope.len_chars();
        let start = range.start.min(len);
        let end = range.end.min(len);
        debug_assert_eq!((start, end), (range.start, range.end), "replace range out of bounds");

        let removed = self.rope.slice(start..end).to_string();
        if start < end {
            self.rope.remove(start..end);
        }
        if !text.is_empty() {
            self.rope.insert(start, text);
        }
        if start < end || !text.is_empty() {
            self.modified = true;
        }
        removed
    }

    /// Insert `text` at `offset`.
    pub fn insert(&mut self, offset: usize, text: &str) {
        self.replace(CharRange::point(offset), text);
    }

    /// Delete `range`, returning the removed text.
    pub fn delete(&mut self, range: CharRange) -> String {
        self.replace(range, "")
    }

    // -- Metadata -----------------------------------------------------------

    /// The file path this buffer is associated with, if any.
    #[inline]
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// True if the buffer has been modified since the last save (or load).
    #[inline]
    #[must_use]
    pub const fn is_modified(&self) -> bool {
        self.modified
    }

    /// The detected (or configured) line ending style.
    #[inline]
    #[must_use]
    pub const fn line_ending(&self) -> LineEnding {
        self.line_ending
    }

    /// Override the line ending style used by future saves.
    #[inline]
    pub const fn set_line_ending(&mut self, ending: LineEnding) {
        self.line_ending = ending;
    }

    /// True if the file started with a UTF-8 byte-order mark.
    #[inline]
    #[must_use]
    pub const fn has_bom(&self) -> bool {
        self.bom
    }

    // -- File I/O -----------------------------------------------------------

    /// Save the buffer to its associated file path.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoPath`] if no path is set, or [`Error::Io`] if the
    /// write fails.
    pub fn save(&mut self) -> Result<()> {
        let path = self.path.clone().ok_or(Error::NoPath)?;
        self.save_as(&path)
    }

    /// Save the buffer to `path`, updating the stored path.
    ///
    /// Line endings are normalized to [`line_ending`](Self::line_ending) and
    /// the BOM is restored if the file had one.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the write fails.
    pub fn save_as(&mut self, path: &Path) -> Result<()> {
        fs::write(path, self.to_file_text())?;
        self.path = Some(path.to_path_buf());
        self.modified = false;
        Ok(())
    }

    /// The exact text `save` would write.
    #[must_use]
    pub fn to_file_text(&self) -> String {
        let mut out = String::with_capacity(self.rope.len_bytes() + UTF8_BOM.len());
        if self.bom {
            out.push_str(UTF8_BOM);
        }
        normalize_line_endings_into(&mut out, self.rope.chars(), self.line_ending.as_str());
        out
    }
}

impl Default for Buffer {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Buffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Buffer")
            .field("lines", &self.line_count())
            .field("chars", &self.len_chars())
            .field("modified", &self.modified)
            .field("line_ending", &self.line_ending)
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Append `chars` to `out`, turning every `\r\n`, `\r` or `\n` into `target`.
fn normalize_line_endings_into(out: &mut String, chars: impl Iterator<Item = char>, target: &str) {
    let mut chars = chars.peekable();
    while let Some(ch) = chars.next() {
        match ch {
            '\r' => {
                out.push_str(target);
                // \r\n is one line ending, not two.
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
            }
            '\n' => out.push_str(target),
            _ => out.push(ch),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    // -- LineEnding ---------------------------------------------------------

    #[test]
    fn line_ending_detect() {
        assert_eq!(LineEnding::detect("a\nb\n"), LineEnding::Lf);
        assert_eq!(LineEnding::detect("a\r\nb\r\n"), LineEnding::CrLf);
        assert_eq!(LineEnding::detect("a\rb\r"), LineEnding::Cr);
        assert_eq!(LineEnding::detect("no newlines"), LineEnding::Lf);
        assert_eq!(LineEnding::detect(""), LineEnding::Lf);
    }

    #[test]
    fn line_ending_detect_first_wins() {
        assert_eq!(LineEnding::detect("a\nb\r\nc"), LineEnding::Lf);
        assert_eq!(LineEnding::detect("a\r\nb\nc"), LineEnding::CrLf);
    }

    #[test]
    fn line_ending_display() {
        assert_eq!(LineEnding::CrLf.to_string(), "CRLF");
        assert_eq!(LineEnding::Cr.as_str(), "\r");
    }

    // -- Access -------------------------------------------------------------

    #[test]
    fn new_buffer_is_empty() {
        let buf = Buffer::new();
        assert!(buf.is_empty());
        assert_eq!(buf.line_count(), 1);
        assert!(!buf.is_modified());
        assert!(buf.path().is_none());
    }

    #[test]
    fn char_at_counts_chars_not_bytes() {
        let buf = Buffer::from_text("café!");
        assert_eq!(buf.char_at(3), Some('é'));
        assert_eq!(buf.char_at(4), Some('!'));
        assert_eq!(buf.char_at(5), None);
    }

    #[test]
    fn slice_to_string_bounds() {
        let buf = Buffer::from_text("hello world");
        assert_eq!(buf.slice_to_string(CharRange::new(6, 11)).as_deref(), Some("world"));
        assert_eq!(buf.slice_to_string(CharRange::point(3)).as_deref(), Some(""));
        assert!(buf.slice_to_string(CharRange::new(6, 12)).is_none());
    }

    #[test]
    fn line_text_strips_endings() {
        let buf = Buffer::from_text("one\r\ntwo\nthree");
        assert_eq!(buf.line_text(0).as_deref(), Some("one"));
        assert_eq!(buf.line_text(1).as_deref(), Some("two"));
        assert_eq!(buf.line_text(2).as_deref(), Some("three"));
        assert!(buf.line_text(3).is_none());
    }

    // -- Coordinates --------------------------------------------------------

    #[test]
    fn char_idx_to_pos_basic() {
        let buf = Buffer::from_text("hello\nworld");
        assert_eq!(buf.char_idx_to_pos(0), Position::new(0, 0));
        assert_eq!(buf.char_idx_to_pos(5), Position::new(0, 5));
        assert_eq!(buf.char_idx_to_pos(6), Position::new(1, 0));
        assert_eq!(buf.char_idx_to_pos(11), Position::new(1, 5));
        assert_eq!(buf.char_idx_to_pos(99), Position::new(1, 5));
    }

    #[test]
    fn pos_to_char_idx_basic() {
        let buf = Buffer::from_text("hello\nworld");
        assert_eq!(buf.pos_to_char_idx(Position::new(1, 4)), Some(10));
        assert_eq!(buf.pos_to_char_idx(Position::new(0, 6)), Some(6));
        assert_eq!(buf.pos_to_char_idx(Position::new(0, 7)), None);
        assert_eq!(buf.pos_to_char_idx(Position::new(5, 0)), None);
    }

    #[test]
    fn offset_roundtrip() {
        let buf = Buffer::from_text("ab\ncdé\n\nf");
        for offset in 0..=buf.len_chars() {
            let pos = buf.char_idx_to_pos(offset);
            assert_eq!(buf.pos_to_char_idx(pos), Some(offset), "offset {offset}");
        }
    }

    // -- Editing ------------------------------------------------------------

    #[test]
    fn replace_returns_removed_text() {
        let mut buf = Buffer::from_text("hello world");
        let removed = buf.replace(CharRange::new(6, 11), "earth");
        assert_eq!(removed, "world");
        assert_eq!(buf.contents(), "hello earth");
        assert!(buf.is_modified());
    }

    #[test]
    fn replace_with_different_lengths() {
        let mut buf = Buffer::from_text("aaaa");
        buf.replace(CharRange::new(2, 4), "b");
        buf.replace(CharRange::new(0, 2), "b");
        assert_eq!(buf.contents(), "bb");
    }

    #[test]
    fn insert_and_delete() {
        let mut buf = Buffer::from_text("hllo");
        buf.insert(1, "e");
        assert_eq!(buf.contents(), "hello");
        assert_eq!(buf.delete(CharRange::new(0, 1)), "h");
        assert_eq!(buf.contents(), "ello");
    }

    #[test]
    fn empty_edit_does_not_mark_modified() {
        let mut buf = Buffer::from_text("hello");
        buf.replace(CharRange::point(2), "");
        assert!(!buf.is_modified());
    }

    #[test]
    fn replace_unicode() {
        let mut buf = Buffer::from_text("日本語で日本語");
        buf.replace(CharRange::new(4, 6), "にほん");
        assert_eq!(buf.contents(), "日本語でにほん語");
        assert_eq!(buf.len_chars(), 8);
    }

    // -- File I/O -----------------------------------------------------------

    #[test]
    fn save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("roundtrip.txt");

        let mut buf = Buffer::from_text("hello\nworld\n");
        buf.save_as(&path).unwrap();
        assert!(!buf.is_modified());
        assert_eq!(buf.path(), Some(path.as_path()));

        let loaded = Buffer::from_file(&path).unwrap();
        assert_eq!(loaded.contents(), "hello\nworld\n");
        assert!(!loaded.is_modified());
    }

    #[test]
    fn save_normalizes_line_endings() {
        let mut buf = Buffer::from_text("a\r\nb\nc\r");
        buf.set_line_ending(LineEnding::CrLf);
        assert_eq!(buf.to_file_text(), "a\r\nb\r\nc\r\n");
        buf.set_line_ending(LineEnding::Lf);
        assert_eq!(buf.to_file_text(), "a\nb\nc\n");
    }

    #[test]
    fn bom_is_stripped_and_restored() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bom.txt");
        fs::write(&path, "\u{feff}hello\r\n").unwrap();

        let mut buf = Buffer::from_file(&path).unwrap();
        assert!(buf.has_bom());
        assert_eq!(buf.contents(), "hello\r\n");
        assert_eq!(buf.char_at(0), Some('h'));
        assert_eq!(buf.line_ending(), LineEnding::CrLf);

        buf.save().unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "\u{feff}hello\r\n");
    }

    #[test]
    fn from_file_rejects_invalid_utf8() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("latin1.txt");
        fs::write(&path, b"caf\xe9").unwrap();
        let err = Buffer::from_file(&path).unwrap_err();
        assert!(matches!(err, Error::Encoding { .. }));
    }

    #[test]
    fn from_file_nonexistent() {
        let err = Buffer::from_file(Path::new("/nonexistent/path/file.txt")).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn save_without_path_errors() {
        let mut buf = Buffer::from_text("hello");
        assert!(matches!(buf.save(), Err(Error::NoPath)));
    }

    #[test]
    fn buffer_debug_format() {
        let debug = format!("{:?}", Buffer::from_text("hello\nworld\n"));
        assert!(debug.contains("lines: 3"));
        assert!(debug.contains("chars: 12"));
    }
}
