//! Word characters and word boundaries.
//!
//! A **word** is a run of word characters: letters, digits, underscore.
//! Anything else (blanks, line endings, punctuation) separates words.
//! `hello.world` contains two words (`hello`, `world`).
//!
//! Used by whole-word matching and by seeding the search bar with the word
//! under the cursor.

use crate::position::CharRange;
use crate::text_buffer::TextBuffer;

// ---------------------------------------------------------------------------
// Character classification
// ---------------------------------------------------------------------------

/// Character class for word boundary detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharClass {
    /// Letters, digits, underscore.
    Word,
    /// Non-blank, non-word characters (operators, brackets, etc.).
    Punctuation,
    /// Whitespace within a line (space, tab).
    Blank,
    /// Line ending (`\n`, `\r`).
    Newline,
}

/// Classify a character.
#[must_use]
pub fn classify(ch: char) -> CharClass {
    if ch == '\n' || ch == '\r' {
        CharClass::Newline
    } else if ch.is_whitespace() {
        CharClass::Blank
    } else if is_word_char(ch) {
        CharClass::Word
    } else {
        CharClass::Punctuation
    }
}

/// True for letters, digits and underscore.
#[inline]
#[must_use]
pub fn is_word_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_'
}

/// True when a match flanked by `before` and `after` stands as a whole word:
/// neither neighbour (where one exists) is a word character.
#[inline]
#[must_use]
pub fn is_whole_word(before: Option<char>, after: Option<char>) -> bool {
    !before.is_some_and(is_word_char) && !after.is_some_and(is_word_char)
}

// ---------------------------------------------------------------------------
// Word lookup
// ---------------------------------------------------------------------------

/// The word touching `offset`.
///
/// A cursor inside a word or right after its last char both count, so a
/// cursor at the end of `hello|` still yields `hello`. Returns `None` when
/// neither side of `offset` is a word character.
#[must_use]
pub fn word_at<B: TextBuffer + ?Sized>(buf: &B, offset: usize) -> Option<CharRange> {
    let offset = offset.min(buf.len_chars());
    let on_word = buf.char_at(offset).is_some_and(is_word_char);
    let after_word = offset > 0 && buf.char_at(offset - 1).is_some_and(is_word_char);
    if !on_word && !after_word {
        return None;
    }

    let mut start = offset;
    while start > 0 && buf.char_at(start - 1).is_some_and(is_word_char) {
        start -= 1;
    }
    let mut end = offset;
    while buf.char_at(end).is_some_and(is_word_char) {
        end += 1;
    }
    Some(CharRange::new(start, end))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
