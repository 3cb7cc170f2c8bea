//! The search engine: find, select, highlight and replace.
//!
//! [`SearchEngine`] runs a [`SearchQuery`] against anything implementing
//! [`TextBuffer`]. Every call follows the same flow:
//!
//! 1. Work out the **area** (whole document or the selection) and the scan
//!    **origin** from the query's flags.
//! 2. Snapshot the buffer text once and scan from the origin toward the area
//!    boundary in the query's direction. With *entire area* every match is
//!    collected, otherwise scanning stops at the first.
//! 3. With *wrap around*, scan once more from the opposite boundary back to
//!    the origin.
//! 4. Apply the action: select the first match, tag every match, or replace
//!    them (back to front, as one undoable user action).
//!
//! Not finding anything is a normal result, see [`MatchResult::found`].
//!
//! # All documents
//!
//! [`find_in_documents`](SearchEngine::find_in_documents) extends a search to
//! every open document, in window order:
//!
//! ```text
//! active: origin ──▶ boundary      (no wrap)
//! active+1, active+2, … active-1   (each from its own area boundary)
//! active: boundary ──▶ origin      (only with wrap around)
//! ```
//!
//! Without *entire area* the first document with a match ends the search.

use std::cmp::Reverse;

use tracing::{debug, trace};

use crate::flags::{IterStart, SearchAction, SearchArea, SearchDirection, SearchFlags};
use crate::position::CharRange;
use crate::query::{Haystack, Matcher, SearchQuery};
use crate::settings::SearchSettings;
use crate::text_buffer::{Tag, TextBuffer};

/// Default distance kept between a selected match and the viewport edges,
/// as a fraction of the visible height.
pub const DEFAULT_SCROLL_MARGIN: f32 = 0.02;

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

/// Outcome of a search in one buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MatchResult {
    /// The first match in scan order. After a replace this is the inserted
    /// text, in post-replacement offsets.
    pub first: Option<CharRange>,
    /// Matches processed (spans removed, for Cleanup).
    pub count: usize,
    /// True when a match came from the wrapped pass.
    pub wrapped: bool,
}

impl MatchResult {
    #[must_use]
    pub const fn found(&self) -> bool {
        self.first.is_some()
    }

    /// Start offset of the first match.
    #[must_use]
    pub fn start(&self) -> Option<usize> {
        self.first.map(|r| r.start)
    }

    /// End offset of the first match.
    #[must_use]
    pub fn end(&self) -> Option<usize> {
        self.first.map(|r| r.end)
    }
}

/// Outcome of a search across several documents.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SearchSummary {
    /// Matches processed in all documents.
    pub total: usize,
    /// Document index and range of the first match in search order.
    pub first: Option<(usize, CharRange)>,
    /// Matches per document, indexed like the input slice.
    pub counts: Vec<usize>,
    /// True when a match came from the active document's wrapped pass.
    pub wrapped: bool,
}

impl SearchSummary {
    #[must_use]
    pub const fn found(&self) -> bool {
        self.first.is_some()
    }
}

// ---------------------------------------------------------------------------
// Scanning
// ---------------------------------------------------------------------------

/// Every match of one buffer in scan order, before any action is applied.
struct Scan {
    hay: Haystack,
    hits: Vec<CharRange>,
    /// Index of the first hit that came from the wrapped pass.
    wrap_at: usize,
}

impl Scan {
    fn first_pass(&self) -> &[CharRange] {
        &self.hits[..self.wrap_at]
    }

    fn wrap_pass(&self) -> &[CharRange] {
        &self.hits[self.wrap_at..]
    }

    fn wrapped(&self) -> bool {
        self.wrap_at < self.hits.len()
    }
}

/// Area and scan origin for `flags` in `buf`.
fn area_and_origin<B: TextBuffer + ?Sized>(buf: &B, flags: SearchFlags) -> (CharRange, usize) {
    let len = buf.len_chars();
    let sel = buf.selection();
    let sel = CharRange::new(sel.start.min(len), sel.end.min(len));

    let area = match flags.area {
        SearchArea::Document => CharRange::new(0, len),
        // An empty selection is an empty area.
        SearchArea::Selection => sel,
    };
    let origin = match flags.start {
        IterStart::AreaStart => area.start,
        IterStart::AreaEnd => area.end,
        IterStart::SelectionStart => sel.start,
        IterStart::SelectionEnd => sel.end,
    };
    (area, area.clamp(origin))
}

fn scan<B: TextBuffer + ?Sized>(buf: &B, query: &SearchQuery, flags: SearchFlags) -> Scan {
    let matcher = query.matcher();
    let hay = Haystack::new(buf.full_text(), matcher.folds());
    let (area, origin) = area_and_origin(buf, flags);

    let mut hits = Vec::new();
    let wrap_at = if query.is_empty() || area.is_empty() {
        0
    } else {
        match flags.direction {
            SearchDirection::Forward => {
                scan_forward(matcher, &hay, area, origin, flags, &mut hits)
            }
            SearchDirection::Backward => {
                scan_backward(matcher, &hay, area, origin, flags, &mut hits)
            }
        }
    };
    Scan { hay, hits, wrap_at }
}

/// Collect forward hits into `hits`. Returns where the wrapped ones begin.
fn scan_forward(
    matcher: &Matcher,
    hay: &Haystack,
    area: CharRange,
    origin: usize,
    flags: SearchFlags,
    hits: &mut Vec<CharRange>,
) -> usize {
    let ww = flags.whole_word;
    let mut from = origin;
    while let Some(range) = matcher.next(hay, from, area.end, ww) {
        hits.push(range);
        if !flags.entire_area {
            break;
        }
        from = range.end;
    }

    let wrap_at = hits.len();
    if flags.wrap_around && (hits.is_empty() || flags.entire_area) && origin > area.start {
        trace!(origin, "wrapping to area start");
        // Wrapped hits start before the origin and stay clear of the
        // first-pass hits.
        let limit = hits.first().map_or(area.end, |h| h.start);
        let mut from = area.start;
        while let Some(range) = matcher.next(hay, from, limit, ww) {
            if range.start >= origin {
                break;
            }
            hits.push(range);
            if !flags.entire_area {
                break;
            }
            from = range.end;
        }
    }
    wrap_at
}

/// Collect backward hits into `hits`. Returns where the wrapped ones begin.
fn scan_backward(
    matcher: &Matcher,
    hay: &Haystack,
    area: CharRange,
    origin: usize,
    flags: SearchFlags,
    hits: &mut Vec<CharRange>,
) -> usize {
    let ww = flags.whole_word;
    let mut before = origin;
    while let Some(range) = matcher.prev(hay, area.start, before, ww) {
        hits.push(range);
        if !flags.entire_area {
            break;
        }
        before = range.start;
    }

    let wrap_at = hits.len();
    if flags.wrap_around && (hits.is_empty() || flags.entire_area) && origin < area.end {
        trace!(origin, "wrapping to area end");
        // Wrapped hits end after the origin and stay clear of the
        // first-pass hits.
        let floor = hits.first().map_or(area.start, |h| h.end);
        let mut before = area.end;
        while let Some(range) = matcher.prev(hay, floor, before, ww) {
            if range.end <= origin {
                break;
            }
            hits.push(range);
            if !flags.entire_area {
                break;
            }
            before = range.start;
        }
    }
    wrap_at
}

// ---------------------------------------------------------------------------
// SearchEngine
// ---------------------------------------------------------------------------

/// Runs search queries against text buffers.
///
/// The engine holds no per-search state; one value can serve every document
/// of a window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchEngine {
    scroll_margin: f32,
}

impl Default for SearchEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl SearchEngine {
    /// An engine with the default scroll margin.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            scroll_margin: DEFAULT_SCROLL_MARGIN,
        }
    }

    /// An engine keeping `margin` (a fraction of the visible height) around
    /// selected matches. Clamped to `[0, 0.5)`.
    #[must_use]
    pub fn with_scroll_margin(margin: f32) -> Self {
        Self {
            scroll_margin: if margin.is_nan() { 0.0 } else { margin.clamp(0.0, 0.49) },
        }
    }

    /// An engine configured from user settings.
    #[must_use]
    pub fn from_settings(settings: &SearchSettings) -> Self {
        Self::with_scroll_margin(settings.scroll_margin)
    }

    #[must_use]
    pub const fn scroll_margin(&self) -> f32 {
        self.scroll_margin
    }

    // -- Single document ----------------------------------------------------

    /// Search `buf` as the query's flags say and apply the query's action.
    pub fn find<B: TextBuffer + ?Sized>(&self, buf: &mut B, query: &SearchQuery) -> MatchResult {
        self.run(buf, query, query.flags())
    }

    /// Tag every match in the area. Existing highlights are kept. Returns
    /// the number of matches tagged.
    pub fn highlight_all<B: TextBuffer + ?Sized>(&self, buf: &mut B, query: &SearchQuery) -> usize {
        let flags = query
            .flags()
            .action(SearchAction::Highlight)
            .entire_area(true);
        self.run(buf, query, flags).count
    }

    /// Replace every match in the area as one undoable step. Returns the
    /// number of replacements.
    pub fn replace_all<B: TextBuffer + ?Sized>(&self, buf: &mut B, query: &SearchQuery) -> usize {
        let flags = query.flags().action(SearchAction::Replace).entire_area(true);
        self.run(buf, query, flags).count
    }

    /// Every match in the area, in scan order, without touching the buffer.
    /// The query's action is ignored.
    #[must_use]
    pub fn matches<B: TextBuffer + ?Sized>(&self, buf: &B, query: &SearchQuery) -> Vec<CharRange> {
        let flags = query.flags().entire_area(true);
        let scan = scan(buf, query, flags);
        trace!(count = scan.hits.len(), "matches listed");
        scan.hits
    }

    /// Remove every search highlight. Returns the number of spans removed.
    pub fn clear_highlights<B: TextBuffer + ?Sized>(&self, buf: &mut B) -> usize {
        let removed = buf.remove_tag(Tag::SearchHighlight);
        debug!(removed, "search highlights cleared");
        removed
    }

    pub(crate) fn run<B: TextBuffer + ?Sized>(
        &self,
        buf: &mut B,
        query: &SearchQuery,
        flags: SearchFlags,
    ) -> MatchResult {
        if flags.action == SearchAction::Cleanup {
            return MatchResult {
                first: None,
                count: self.clear_highlights(buf),
                wrapped: false,
            };
        }

        let scan = scan(buf, query, flags);
        let first = self.apply(buf, query, flags.action, &scan.hay, &scan.hits);
        let result = MatchResult {
            first,
            count: scan.hits.len(),
            wrapped: scan.wrapped(),
        };
        debug!(
            action = ?flags.action,
            count = result.count,
            wrapped = result.wrapped,
            "search finished"
        );
        result
    }

    /// Apply `action` to `hits` (in scan order). Returns the first hit's
    /// range, in post-edit offsets for a replace.
    fn apply<B: TextBuffer + ?Sized>(
        &self,
        buf: &mut B,
        query: &SearchQuery,
        action: SearchAction,
        hay: &Haystack,
        hits: &[CharRange],
    ) -> Option<CharRange> {
        let first = *hits.first()?;
        match action {
            SearchAction::None | SearchAction::Cleanup => Some(first),
            SearchAction::Select => {
                buf.select(first);
                buf.scroll_to(first, self.scroll_margin);
                Some(first)
            }
            SearchAction::Highlight => {
                for &hit in hits {
                    buf.apply_tag(Tag::SearchHighlight, hit);
                }
                Some(first)
            }
            SearchAction::Replace => Some(replace_hits(buf, query, hay, hits)),
        }
    }

    // -- All documents ------------------------------------------------------

    /// Search `documents` (in window order) starting with `documents[active]`.
    ///
    /// Without the all-documents flag only the active document is searched,
    /// exactly like [`find`](Self::find). With it, see the module docs for the
    /// order. A Select action selects only the first match found.
    pub fn find_in_documents<B: TextBuffer>(
        &self,
        documents: &mut [B],
        active: usize,
        query: &SearchQuery,
    ) -> SearchSummary {
        let len = documents.len();
        if len == 0 {
            return SearchSummary::default();
        }
        let active = active.min(len - 1);
        let flags = query.flags();
        let mut summary = SearchSummary {
            counts: vec![0; len],
            ..SearchSummary::default()
        };

        if !flags.all_documents {
            let result = self.run(&mut documents[active], query, flags);
            summary.total = result.count;
            summary.counts[active] = result.count;
            summary.first = result.first.map(|r| (active, r));
            summary.wrapped = result.wrapped;
            return summary;
        }

        if flags.action == SearchAction::Cleanup {
            for (i, doc) in documents.iter_mut().enumerate() {
                summary.counts[i] = self.clear_highlights(doc);
            }
            summary.total = summary.counts.iter().sum();
            return summary;
        }

        let boundary = match flags.direction {
            SearchDirection::Forward => IterStart::AreaStart,
            SearchDirection::Backward => IterStart::AreaEnd,
        };
        let other_flags = flags.wrap_around(false).start(boundary);
        let others = (1..len).map(|i| (active + i) % len);

        let active_scan = scan(&documents[active], query, flags);

        if !flags.entire_area {
            if let Some(&hit) = active_scan.first_pass().first() {
                return self.finish_single(
                    documents,
                    active,
                    query,
                    flags,
                    &active_scan,
                    hit,
                    false,
                    summary,
                );
            }
            for idx in others {
                let s = scan(&documents[idx], query, other_flags);
                if let Some(&hit) = s.hits.first() {
                    return self.finish_single(documents, idx, query, flags, &s, hit, false, summary);
                }
            }
            if let Some(&hit) = active_scan.wrap_pass().first() {
                return self.finish_single(
                    documents,
                    active,
                    query,
                    flags,
                    &active_scan,
                    hit,
                    true,
                    summary,
                );
            }
            debug!(documents = len, "search finished, nothing found");
            return summary;
        }

        // Entire area: every document is processed.
        let other_scans: Vec<(usize, Scan)> = others
            .map(|idx| (idx, scan(&documents[idx], query, other_flags)))
            .collect();

        // Which document holds the first match in search order.
        let first_doc = if active_scan.first_pass().is_empty() {
            other_scans
                .iter()
                .find(|(_, s)| !s.hits.is_empty())
                .map(|&(idx, _)| idx)
                .or_else(|| active_scan.wrapped().then_some(active))
        } else {
            Some(active)
        };

        let mut process = |idx: usize, s: &Scan, summary: &mut SearchSummary| {
            summary.counts[idx] = s.hits.len();
            // Only one document gets the selection.
            let action = match flags.action {
                SearchAction::Select if first_doc != Some(idx) => SearchAction::None,
                action => action,
            };
            let first = self.apply(&mut documents[idx], query, action, &s.hay, &s.hits);
            if first_doc == Some(idx) {
                summary.first = first.map(|r| (idx, r));
            }
        };

        process(active, &active_scan, &mut summary);
        for (idx, s) in &other_scans {
            process(*idx, s, &mut summary);
        }

        summary.total = summary.counts.iter().sum();
        summary.wrapped = active_scan.wrapped();
        debug!(
            action = ?flags.action,
            documents = len,
            total = summary.total,
            wrapped = summary.wrapped,
            "search finished"
        );
        summary
    }

    /// Apply the action to one hit in `documents[idx]` and fill `summary`.
    #[allow(clippy::too_many_arguments)]
    fn finish_single<B: TextBuffer>(
        &self,
        documents: &mut [B],
        idx: usize,
        query: &SearchQuery,
        flags: SearchFlags,
        scan: &Scan,
        hit: CharRange,
        wrapped: bool,
        mut summary: SearchSummary,
    ) -> SearchSummary {
        let first = self.apply(&mut documents[idx], query, flags.action, &scan.hay, &[hit]);
        summary.total = 1;
        summary.counts[idx] = 1;
        summary.first = first.map(|r| (idx, r));
        summary.wrapped = wrapped;
        debug!(action = ?flags.action, document = idx, wrapped, "search finished");
        summary
    }
}

/// Replace `hits` back to front inside one user action. Returns the first
/// hit's replacement range in post-replacement offsets.
fn replace_hits<B: TextBuffer + ?Sized>(
    buf: &mut B,
    query: &SearchQuery,
    hay: &Haystack,
    hits: &[CharRange],
) -> CharRange {
    let replacement = query.replacement().unwrap_or("");
    let mut edits: Vec<(CharRange, String)> = hits
        .iter()
        .map(|&range| {
            let text = query.matcher().replacement_for(hay, range, replacement);
            (range, text)
        })
        .collect();

    // Where the first hit's replacement lands once every earlier hit has
    // been replaced.
    let (first, first_text) = &edits[0];
    let (removed, inserted) = edits
        .iter()
        .filter(|(r, _)| r.start < first.start)
        .fold((0, 0), |(rem, ins), (r, t)| {
            (rem + r.len(), ins + t.chars().count())
        });
    let start = first.start - removed + inserted;
    let first_after = CharRange::new(start, start + first_text.chars().count());

    edits.sort_by_key(|(r, _)| Reverse(r.start));
    buf.begin_user_action();
    for (range, text) in &edits {
        trace!(%range, replacement = %text, "replacing");
        buf.replace(*range, text);
    }
    buf.end_user_action();
    first_after
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
