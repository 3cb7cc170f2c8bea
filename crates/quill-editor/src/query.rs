//! Search queries and the compiled matcher.
//!
//! A [`SearchQuery`] is a pattern, an optional replacement and a set of
//! [`SearchFlags`]. The pattern is compiled once, when the query is built:
//!
//! - **Literal** patterns are compared char by char. Without match-case both
//!   sides are folded to lower case one char at a time; a char whose lower
//!   case is more than one char (`İ`) is compared as-is, so a match always
//!   covers exactly as many chars as the pattern.
//! - **Regex** patterns use the `regex` crate. Replacements may refer to
//!   capture groups (`$1`, `${name}`). Zero-width matches never count.
//!   A regex always runs over the whole text; scan limits only decide which
//!   of its matches are taken, so `$` or `\b` never match at a limit.
//!
//! An empty pattern never matches. An invalid regex is rejected here, so
//! scanning itself cannot fail.

use regex::{Regex, RegexBuilder};

use crate::error::Result;
use crate::flags::SearchFlags;
use crate::position::CharRange;
use crate::word::is_whole_word;

// ---------------------------------------------------------------------------
// SearchQuery
// ---------------------------------------------------------------------------

/// What to look for, what to put in its place, and how.
#[derive(Debug, Clone)]
pub struct SearchQuery {
    pattern: String,
    replacement: Option<String>,
    flags: SearchFlags,
    matcher: Matcher,
}

impl SearchQuery {
    /// Build a query, compiling `pattern` according to `flags`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPattern`](crate::Error::InvalidPattern) when
    /// `flags.regex` is set and `pattern` is not a valid regular expression.
    pub fn new(pattern: impl Into<String>, flags: SearchFlags) -> Result<Self> {
        let pattern = pattern.into();
        let matcher = Matcher::compile(&pattern, flags)?;
        Ok(Self {
            pattern,
            replacement: None,
            flags,
            matcher,
        })
    }

    /// Set the replacement text. `None` replaces with nothing.
    #[must_use]
    pub fn with_replacement(mut self, replacement: Option<impl Into<String>>) -> Self {
        self.replacement = replacement.map(Into::into);
        self
    }

    /// The same pattern and replacement with different flags. The pattern is
    /// only recompiled when case or regex mode changed.
    ///
    /// # Errors
    ///
    /// As [`new`](Self::new).
    pub fn with_flags(mut self, flags: SearchFlags) -> Result<Self> {
        if flags.match_case != self.flags.match_case || flags.regex != self.flags.regex {
            self.matcher = Matcher::compile(&self.pattern, flags)?;
        }
        self.flags = flags;
        Ok(self)
    }

    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    #[must_use]
    pub fn replacement(&self) -> Option<&str> {
        self.replacement.as_deref()
    }

    #[must_use]
    pub const fn flags(&self) -> SearchFlags {
        self.flags
    }

    /// True when the pattern can never match.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        matches!(self.matcher, Matcher::Empty)
    }

    pub(crate) const fn matcher(&self) -> &Matcher {
        &self.matcher
    }
}

// ---------------------------------------------------------------------------
// Haystack
// ---------------------------------------------------------------------------

/// A snapshot of a buffer's text prepared for scanning.
///
/// Keeps the chars (and their folded form for case-insensitive literal
/// matching) plus the byte offset of each char for the regex engine.
#[derive(Debug)]
pub(crate) struct Haystack {
    text: String,
    chars: Vec<char>,
    folded: Option<Vec<char>>,
    /// Byte offset of every char, plus one trailing entry for the end.
    byte_of: Vec<usize>,
}

impl Haystack {
    pub(crate) fn new(text: String, fold: bool) -> Self {
        let mut chars = Vec::with_capacity(text.len());
        let mut byte_of = Vec::with_capacity(text.len() + 1);
        for (b, ch) in text.char_indices() {
            chars.push(ch);
            byte_of.push(b);
        }
        byte_of.push(text.len());
        let folded = fold.then(|| chars.iter().copied().map(fold_char).collect());
        Self {
            text,
            chars,
            folded,
            byte_of,
        }
    }

    /// Length in chars.
    pub(crate) fn len(&self) -> usize {
        self.chars.len()
    }

    pub(crate) fn char_at(&self, offset: usize) -> Option<char> {
        self.chars.get(offset).copied()
    }

    fn cmp_chars(&self) -> &[char] {
        self.folded.as_deref().unwrap_or(&self.chars)
    }

    fn byte(&self, offset: usize) -> usize {
        self.byte_of[offset.min(self.chars.len())]
    }

    fn char_of(&self, byte: usize) -> usize {
        self.byte_of.partition_point(|&b| b < byte)
    }
}

/// Lower-case `ch` when that yields exactly one char.
fn fold_char(ch: char) -> char {
    let mut lower = ch.to_lowercase();
    match (lower.next(), lower.next()) {
        (Some(l), None) => l,
        _ => ch,
    }
}

// ---------------------------------------------------------------------------
// Matcher
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub(crate) enum Matcher {
    Empty,
    Literal { needle: Vec<char>, fold: bool },
    Regex(Regex),
}

impl Matcher {
    fn compile(pattern: &str, flags: SearchFlags) -> Result<Self> {
        if pattern.is_empty() {
            return Ok(Self::Empty);
        }
        if flags.regex {
            let re = RegexBuilder::new(pattern)
                .case_insensitive(!flags.match_case)
                .build()?;
            return Ok(Self::Regex(re));
        }
        let fold = !flags.match_case;
        let needle = pattern
            .chars()
            .map(|c| if fold { fold_char(c) } else { c })
            .collect();
        Ok(Self::Literal { needle, fold })
    }

    /// True when scanning needs a case-folded haystack.
    pub(crate) const fn folds(&self) -> bool {
        matches!(self, Self::Literal { fold: true, .. })
    }

    /// Leftmost match with `start >= from` and `end <= limit`.
    pub(crate) fn next(
        &self,
        hay: &Haystack,
        from: usize,
        limit: usize,
        whole_word: bool,
    ) -> Option<CharRange> {
        let limit = limit.min(hay.len());
        if from > limit {
            return None;
        }
        let accept = |r: CharRange| !r.is_empty() && (!whole_word || word_bounded(hay, r));

        match self {
            Self::Empty => None,
            Self::Literal { needle, .. } => {
                let last = limit.checked_sub(needle.len())?;
                (from..=last)
                    .map(|s| CharRange::new(s, s + needle.len()))
                    .find(|&r| hay.cmp_chars()[r.as_std()] == needle[..] && accept(r))
            }
            Self::Regex(re) => {
                // Always the whole text: anchors and `\b` must see the real
                // neighbours, so the limit only filters where a match ends.
                let mut at = from;
                while at < limit {
                    let m = re.find_at(&hay.text, hay.byte(at))?;
                    let r = CharRange::new(hay.char_of(m.start()), hay.char_of(m.end()));
                    if r.start >= limit {
                        break;
                    }
                    if r.end <= limit && accept(r) {
                        return Some(r);
                    }
                    at = r.start + 1;
                }
                None
            }
        }
    }

    /// Rightmost match with `end <= before` and `start >= floor`.
    pub(crate) fn prev(
        &self,
        hay: &Haystack,
        floor: usize,
        before: usize,
        whole_word: bool,
    ) -> Option<CharRange> {
        let before = before.min(hay.len());
        if floor > before {
            return None;
        }
        match self {
            Self::Empty => None,
            Self::Literal { needle, .. } => {
                let last = before.checked_sub(needle.len())?;
                if last < floor {
                    return None;
                }
                (floor..=last)
                    .rev()
                    .map(|s| CharRange::new(s, s + needle.len()))
                    .find(|&r| {
                        hay.cmp_chars()[r.as_std()] == needle[..]
                            && (!whole_word || word_bounded(hay, r))
                    })
            }
            Self::Regex(_) => {
                // The regex engine only scans forward: step through every
                // start position that has a match and keep the last one.
                let mut found = None;
                let mut from = floor;
                while let Some(r) = self.next(hay, from, before, whole_word) {
                    found = Some(r);
                    from = r.start + 1;
                }
                found
            }
        }
    }

    /// The text that replaces `range`, a match found by this matcher.
    /// Regex replacements expand capture group references.
    pub(crate) fn replacement_for(
        &self,
        hay: &Haystack,
        range: CharRange,
        replacement: &str,
    ) -> String {
        let Self::Regex(re) = self else {
            return replacement.to_string();
        };
        let span = hay.byte(range.start)..hay.byte(range.end);
        let mut out = String::new();
        match re.captures_at(&hay.text, span.start) {
            Some(caps) if caps.get(0).is_some_and(|m| m.range() == span) => {
                caps.expand(replacement, &mut out);
            }
            _ => out.push_str(replacement),
        }
        out
    }
}

/// True when neither neighbour of `range` is a word character.
fn word_bounded(hay: &Haystack, range: CharRange) -> bool {
    let before = range.start.checked_sub(1).and_then(|i| hay.char_at(i));
    is_whole_word(before, hay.char_at(range.end))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn query(pattern: &str, flags: SearchFlags) -> SearchQuery {
        SearchQuery::new(pattern, flags).unwrap()
    }

    fn hay_for(q: &SearchQuery, text: &str) -> Haystack {
        Haystack::new(text.to_string(), q.matcher().folds())
    }

    fn all_forward(q: &SearchQuery, text: &str) -> Vec<CharRange> {
        let hay = hay_for(q, text);
        let mut out = Vec::new();
        let mut from = 0;
        while let Some(r) = q.matcher().next(&hay, from, hay.len(), q.flags().whole_word) {
            out.push(r);
            from = r.end;
        }
        out
    }

    // -- Construction -------------------------------------------------------

    #[test]
    fn empty_pattern_never_matches() {
        let q = query("", SearchFlags::new());
        assert!(q.is_empty());
        assert!(all_forward(&q, "anything").is_empty());
        let q = query("", SearchFlags::new().regex(true));
        assert!(q.is_empty());
    }

    #[test]
    fn invalid_regex_is_rejected_up_front() {
        let err = SearchQuery::new("(unclosed", SearchFlags::new().regex(true)).unwrap_err();
        assert!(matches!(err, Error::InvalidPattern(_)));
        // The same text is a fine literal.
        assert!(SearchQuery::new("(unclosed", SearchFlags::new()).is_ok());
    }

    #[test]
    fn replacement_accessors() {
        let q = query("a", SearchFlags::new()).with_replacement(Some("b"));
        assert_eq!(q.pattern(), "a");
        assert_eq!(q.replacement(), Some("b"));
        let q = q.with_replacement(None::<String>);
        assert_eq!(q.replacement(), None);
    }

    #[test]
    fn with_flags_recompiles_on_case_change() {
        let q = query("Cat", SearchFlags::new().match_case(true));
        assert!(all_forward(&q, "cat").is_empty());
        let q = q.with_flags(SearchFlags::new()).unwrap();
        assert_eq!(all_forward(&q, "cat"), vec![CharRange::new(0, 3)]);
    }

    // -- Literal ------------------------------------------------------------

    #[test]
    fn literal_case_folding() {
        let q = query("cat", SearchFlags::new());
        assert_eq!(
            all_forward(&q, "Cat CAT cat"),
            vec![CharRange::new(0, 3), CharRange::new(4, 7), CharRange::new(8, 11)]
        );
        let q = query("cat", SearchFlags::new().match_case(true));
        assert_eq!(all_forward(&q, "Cat CAT cat"), vec![CharRange::new(8, 11)]);
    }

    #[test]
    fn folding_keeps_offsets_aligned() {
        // 'İ' lower-cases to two chars; it must not shift what follows.
        let q = query("x", SearchFlags::new());
        assert_eq!(all_forward(&q, "İx"), vec![CharRange::new(1, 2)]);
        let q = query("é", SearchFlags::new());
        assert_eq!(all_forward(&q, "CAFÉ"), vec![CharRange::new(3, 4)]);
    }

    #[test]
    fn whole_word_skips_embedded_occurrences() {
        let q = query("cat", SearchFlags::new().whole_word(true));
        assert!(all_forward(&q, "concatenate").is_empty());
        assert_eq!(all_forward(&q, "a cat."), vec![CharRange::new(2, 5)]);
        assert_eq!(all_forward(&q, "cat_ cat"), vec![CharRange::new(5, 8)]);
    }

    #[test]
    fn literal_respects_limit() {
        let q = query("abc", SearchFlags::new());
        let hay = hay_for(&q, "xxabc");
        assert_eq!(q.matcher().next(&hay, 0, 4, false), None);
        assert_eq!(q.matcher().next(&hay, 0, 5, false), Some(CharRange::new(2, 5)));
        assert_eq!(q.matcher().next(&hay, 3, 5, false), None);
    }

    #[test]
    fn literal_prev_is_rightmost() {
        let q = query("aa", SearchFlags::new());
        let hay = hay_for(&q, "aaa");
        assert_eq!(q.matcher().prev(&hay, 0, 3, false), Some(CharRange::new(1, 3)));
        assert_eq!(q.matcher().prev(&hay, 0, 2, false), Some(CharRange::new(0, 2)));
        assert_eq!(q.matcher().prev(&hay, 1, 2, false), None);
    }

    // -- Regex --------------------------------------------------------------

    #[test]
    fn regex_matches_in_char_offsets() {
        let q = query(r"\d+", SearchFlags::new().regex(true));
        assert_eq!(
            all_forward(&q, "né 12 façade 345"),
            vec![CharRange::new(3, 5), CharRange::new(13, 16)]
        );
    }

    #[test]
    fn regex_case_insensitive_unless_match_case() {
        let q = query("h.llo", SearchFlags::new().regex(true));
        assert_eq!(all_forward(&q, "HELLO"), vec![CharRange::new(0, 5)]);
        let q = query("h.llo", SearchFlags::new().regex(true).match_case(true));
        assert!(all_forward(&q, "HELLO").is_empty());
    }

    #[test]
    fn regex_zero_width_matches_ignored() {
        let q = query("x*", SearchFlags::new().regex(true));
        assert_eq!(all_forward(&q, "ab xx"), vec![CharRange::new(3, 5)]);
        let q = query("^", SearchFlags::new().regex(true));
        assert!(all_forward(&q, "abc").is_empty());
    }

    #[test]
    fn regex_whole_word_retries_later_starts() {
        let q = query("ab+", SearchFlags::new().regex(true).whole_word(true));
        assert_eq!(all_forward(&q, "cabb abb"), vec![CharRange::new(5, 8)]);
    }

    #[test]
    fn regex_prev_finds_last_start() {
        let q = query("o.", SearchFlags::new().regex(true));
        let hay = hay_for(&q, "foo boo");
        assert_eq!(q.matcher().prev(&hay, 0, 7, false), Some(CharRange::new(5, 7)));
        assert_eq!(q.matcher().prev(&hay, 0, 5, false), Some(CharRange::new(2, 4)));
    }

    #[test]
    fn regex_limit_is_not_end_of_text() {
        let q = query("o$", SearchFlags::new().regex(true));
        let hay = hay_for(&q, "foo bar");
        assert_eq!(q.matcher().next(&hay, 0, 3, false), None);
        assert_eq!(q.matcher().prev(&hay, 0, 3, false), None);

        let q = query(r"ab\b", SearchFlags::new().regex(true));
        let hay = hay_for(&q, "abc ab");
        assert_eq!(q.matcher().next(&hay, 0, 2, false), None);
        assert_eq!(q.matcher().next(&hay, 0, 6, false), Some(CharRange::new(4, 6)));
    }

    #[test]
    fn regex_match_crossing_limit_is_rejected() {
        let q = query("a+", SearchFlags::new().regex(true));
        let hay = hay_for(&q, "aaa b aa");
        // The match at 0 runs to 3; nothing else fits before 2.
        assert_eq!(q.matcher().next(&hay, 0, 2, false), None);
        assert_eq!(q.matcher().next(&hay, 0, 8, false), Some(CharRange::new(0, 3)));
        assert_eq!(q.matcher().prev(&hay, 0, 8, false), Some(CharRange::new(7, 8)));
    }

    #[test]
    fn regex_replacement_expands_groups() {
        let q = query(r"(\w+)@(\w+)", SearchFlags::new().regex(true));
        let hay = hay_for(&q, "mail: bob@home");
        let r = q.matcher().next(&hay, 0, hay.len(), false).unwrap();
        assert_eq!(r, CharRange::new(6, 14));
        assert_eq!(q.matcher().replacement_for(&hay, r, "$2 of $1"), "home of bob");
    }

    #[test]
    fn literal_replacement_is_verbatim() {
        let q = query("bob", SearchFlags::new());
        let hay = hay_for(&q, "bob");
        assert_eq!(q.matcher().replacement_for(&hay, CharRange::new(0, 3), "$1"), "$1");
    }
}
