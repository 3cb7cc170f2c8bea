//! Search bar state: the last query and the pattern histories.
//!
//! The UI owns one `SearchState` and passes it where it is needed. It
//! remembers what was searched for last, so "find next" and "find previous"
//! can repeat it without the search bar open, and keeps most-recent-first
//! histories for the pattern and replacement entries.

use crate::flags::{IterStart, SearchAction, SearchArea, SearchDirection, SearchFlags};
use crate::query::SearchQuery;
use crate::search::{MatchResult, SearchEngine};
use crate::settings::SearchSettings;
use crate::text_buffer::TextBuffer;
use crate::word::word_at;

/// Last query plus search and replace histories.
#[derive(Debug, Clone)]
pub struct SearchState {
    last: Option<SearchQuery>,
    search_history: Vec<String>,
    replace_history: Vec<String>,
    history_limit: usize,
}

impl Default for SearchState {
    fn default() -> Self {
        Self::new(SearchSettings::default().history_limit)
    }
}

impl SearchState {
    /// Empty state keeping up to `history_limit` entries per history
    /// (at least one).
    #[must_use]
    pub fn new(history_limit: usize) -> Self {
        Self {
            last: None,
            search_history: Vec::new(),
            replace_history: Vec::new(),
            history_limit: history_limit.max(1),
        }
    }

    #[must_use]
    pub fn from_settings(settings: &SearchSettings) -> Self {
        Self::new(settings.history_limit)
    }

    /// Remember `query` as the last one and add its pattern (and
    /// replacement, if any) to the histories. Empty strings are not kept.
    pub fn record(&mut self, query: &SearchQuery) {
        push_recent(&mut self.search_history, query.pattern(), self.history_limit);
        if let Some(replacement) = query.replacement() {
            push_recent(&mut self.replace_history, replacement, self.history_limit);
        }
        self.last = Some(query.clone());
    }

    #[must_use]
    pub const fn last_query(&self) -> Option<&SearchQuery> {
        self.last.as_ref()
    }

    /// Patterns, most recent first.
    #[must_use]
    pub fn search_history(&self) -> &[String] {
        &self.search_history
    }

    /// Replacements, most recent first.
    #[must_use]
    pub fn replace_history(&self) -> &[String] {
        &self.replace_history
    }

    /// Select the next occurrence of the last pattern after the selection.
    /// `None` when nothing was recorded yet.
    pub fn find_next<B: TextBuffer + ?Sized>(
        &self,
        engine: &SearchEngine,
        buf: &mut B,
    ) -> Option<MatchResult> {
        self.repeat(engine, buf, IterStart::SelectionEnd, SearchDirection::Forward)
    }

    /// Select the previous occurrence of the last pattern before the
    /// selection. `None` when nothing was recorded yet.
    pub fn find_previous<B: TextBuffer + ?Sized>(
        &self,
        engine: &SearchEngine,
        buf: &mut B,
    ) -> Option<MatchResult> {
        self.repeat(engine, buf, IterStart::SelectionStart, SearchDirection::Backward)
    }

    fn repeat<B: TextBuffer + ?Sized>(
        &self,
        engine: &SearchEngine,
        buf: &mut B,
        start: IterStart,
        direction: SearchDirection,
    ) -> Option<MatchResult> {
        let query = self.last.as_ref()?;
        // Case, word, regex and wrap settings carry over; scope and action
        // do not.
        let flags: SearchFlags = query
            .flags()
            .area(SearchArea::Document)
            .start(start)
            .direction(direction)
            .action(SearchAction::Select)
            .entire_area(false)
            .all_documents(false);
        Some(engine.run(buf, query, flags))
    }
}

/// Text to prefill the search entry with: the selection when it is a
/// non-empty single line, otherwise the word at the cursor.
#[must_use]
pub fn seed_pattern<B: TextBuffer + ?Sized>(buf: &B) -> Option<String> {
    let selection = buf.selection();
    if !selection.is_empty() {
        let text = buf.text(selection);
        if !text.contains(['\n', '\r']) {
            return Some(text);
        }
    }
    word_at(buf, selection.end).map(|range| buf.text(range))
}

/// Move `entry` to the front of `history`, dropping duplicates and anything
/// past `limit`.
fn push_recent(history: &mut Vec<String>, entry: &str, limit: usize) {
    if entry.is_empty() {
        return;
    }
    history.retain(|e| e != entry);
    history.insert(0, entry.to_string());
    history.truncate(limit);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;
    use crate::position::CharRange;
    use pretty_assertions::assert_eq;

    fn query(pattern: &str, flags: SearchFlags) -> SearchQuery {
        SearchQuery::new(pattern, flags).unwrap()
    }

    // -- Histories ----------------------------------------------------------

    #[test]
    fn record_keeps_most_recent_first() {
        let mut s = SearchState::new(10);
        s.record(&query("one", SearchFlags::new()));
        s.record(&query("two", SearchFlags::new()));
        s.record(&query("one", SearchFlags::new()));
        assert_eq!(s.search_history(), ["one", "two"]);
        assert_eq!(s.last_query().map(SearchQuery::pattern), Some("one"));
    }

    #[test]
    fn history_is_capped() {
        let mut s = SearchState::new(2);
        for p in ["a", "b", "c"] {
            s.record(&query(p, SearchFlags::new()));
        }
        assert_eq!(s.search_history(), ["c", "b"]);
    }

    #[test]
    fn replacements_have_their_own_history() {
        let mut s = SearchState::default();
        s.record(&query("x", SearchFlags::new()).with_replacement(Some("y")));
        s.record(&query("x", SearchFlags::new()));
        s.record(&query("x", SearchFlags::new()).with_replacement(Some("")));
        assert_eq!(s.search_history(), ["x"]);
        assert_eq!(s.replace_history(), ["y"]);
    }

    #[test]
    fn empty_pattern_not_kept() {
        let mut s = SearchState::from_settings(&SearchSettings::default());
        s.record(&query("", SearchFlags::new()));
        assert!(s.search_history().is_empty());
        assert!(s.last_query().is_some());
    }

    // -- Find next / previous -----------------------------------------------

    #[test]
    fn find_next_without_query_is_none() {
        let s = SearchState::default();
        let mut doc = Document::from_text("abc");
        assert_eq!(s.find_next(&SearchEngine::new(), &mut doc), None);
    }

    #[test]
    fn find_next_and_previous_walk_matches() {
        let engine = SearchEngine::new();
        let mut s = SearchState::default();
        s.record(&query("ab", SearchFlags::new().wrap_around(true)));

        let mut doc = Document::from_text("ab ab ab");
        let r = s.find_next(&engine, &mut doc).unwrap();
        assert_eq!(r.first, Some(CharRange::new(0, 2)));
        s.find_next(&engine, &mut doc);
        assert_eq!(doc.selection(), CharRange::new(3, 5));
        s.find_next(&engine, &mut doc);
        assert_eq!(doc.selection(), CharRange::new(6, 8));

        let r = s.find_next(&engine, &mut doc).unwrap();
        assert!(r.wrapped);
        assert_eq!(doc.selection(), CharRange::new(0, 2));

        let r = s.find_previous(&engine, &mut doc).unwrap();
        assert!(r.wrapped);
        assert_eq!(doc.selection(), CharRange::new(6, 8));
        s.find_previous(&engine, &mut doc);
        assert_eq!(doc.selection(), CharRange::new(3, 5));
    }

    #[test]
    fn find_next_keeps_case_and_word_settings() {
        let engine = SearchEngine::new();
        let mut s = SearchState::default();
        s.record(&query("Cat", SearchFlags::new().match_case(true).whole_word(true)));

        let mut doc = Document::from_text("cat Catalog Cat");
        let r = s.find_next(&engine, &mut doc).unwrap();
        assert_eq!(r.first, Some(CharRange::new(12, 15)));
    }

    #[test]
    fn find_next_ignores_recorded_action_and_area() {
        let engine = SearchEngine::new();
        let mut s = SearchState::default();
        let recorded = SearchFlags::new()
            .area(SearchArea::Selection)
            .action(SearchAction::Replace)
            .entire_area(true);
        s.record(&query("x", recorded).with_replacement(Some("y")));

        let mut doc = Document::from_text("x x");
        s.find_next(&engine, &mut doc);
        assert_eq!(doc.contents(), "x x");
        assert_eq!(doc.selection(), CharRange::new(0, 1));
    }

    // -- seed_pattern -------------------------------------------------------

    #[test]
    fn seed_from_single_line_selection() {
        let mut doc = Document::from_text("hello big world");
        doc.select(CharRange::new(6, 15));
        assert_eq!(seed_pattern(&doc).as_deref(), Some("big world"));
    }

    #[test]
    fn seed_from_word_at_cursor() {
        let mut doc = Document::from_text("hello world");
        doc.set_cursor(8);
        assert_eq!(seed_pattern(&doc).as_deref(), Some("world"));
    }

    #[test]
    fn seed_ignores_multi_line_selection() {
        let mut doc = Document::from_text("one\ntwo");
        doc.select(CharRange::new(1, 5));
        // Falls back to the word at the selection end.
        assert_eq!(seed_pattern(&doc).as_deref(), Some("two"));
    }

    #[test]
    fn seed_nothing_on_blank() {
        let mut doc = Document::from_text("a   b");
        doc.set_cursor(2);
        assert_eq!(seed_pattern(&doc), None);
    }
}
