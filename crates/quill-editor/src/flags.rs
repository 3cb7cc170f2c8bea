//! Search flags, one field per axis.
//!
//! A query's behaviour is described along independent axes: where to search
//! ([`SearchArea`]), where to begin ([`IterStart`]), which way to go
//! ([`SearchDirection`]), what to do with each match ([`SearchAction`]) and a
//! handful of on/off settings. Each axis is its own field, so a flag set can
//! never name two areas or two directions at once.
//!
//! ```
//! use quill_editor::flags::{SearchAction, SearchFlags};
//!
//! let flags = SearchFlags::new()
//!     .whole_word(true)
//!     .wrap_around(true)
//!     .action(SearchAction::Select);
//! assert!(flags.whole_word && !flags.match_case);
//! ```

// ---------------------------------------------------------------------------
// Axes
// ---------------------------------------------------------------------------

/// Scope of a search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SearchArea {
    /// The whole buffer.
    #[default]
    Document,
    /// The current selection. Empty when nothing is selected.
    Selection,
}

/// Where scanning begins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum IterStart {
    /// The start of the area.
    #[default]
    AreaStart,
    /// The end of the area.
    AreaEnd,
    /// The start of the selection (the cursor when nothing is selected).
    SelectionStart,
    /// The end of the selection (the cursor when nothing is selected).
    SelectionEnd,
}

/// Search direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SearchDirection {
    #[default]
    Forward,
    Backward,
}

impl SearchDirection {
    /// The opposite direction.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Forward => Self::Backward,
            Self::Backward => Self::Forward,
        }
    }
}

/// Side effect applied to each match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SearchAction {
    /// Only count.
    #[default]
    None,
    /// Tag the match with [`Tag::SearchHighlight`](crate::text_buffer::Tag).
    Highlight,
    /// Remove every search highlight. No matching is done.
    Cleanup,
    /// Select the match and scroll it into view.
    Select,
    /// Replace the match with the query's replacement.
    Replace,
}

// ---------------------------------------------------------------------------
// SearchFlags
// ---------------------------------------------------------------------------

/// The full set of search flags.
///
/// Fields are public; the chainable setters exist for building a set in one
/// expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[allow(clippy::struct_excessive_bools)]
pub struct SearchFlags {
    pub area: SearchArea,
    pub start: IterStart,
    pub direction: SearchDirection,
    pub action: SearchAction,
    /// Compare case-sensitively.
    pub match_case: bool,
    /// Require non-word characters (or a buffer edge) on both sides.
    pub whole_word: bool,
    /// Restart once from the opposite boundary when the first pass fails.
    pub wrap_around: bool,
    /// Enumerate every match instead of stopping at the first.
    pub entire_area: bool,
    /// Repeat across every open document.
    pub all_documents: bool,
    /// Treat the pattern as a regular expression.
    pub regex: bool,
}

impl SearchFlags {
    /// Document area, forward from the area start, every setting off, no
    /// action.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            area: SearchArea::Document,
            start: IterStart::AreaStart,
            direction: SearchDirection::Forward,
            action: SearchAction::None,
            match_case: false,
            whole_word: false,
            wrap_around: false,
            entire_area: false,
            all_documents: false,
            regex: false,
        }
    }

    #[must_use]
    pub const fn area(mut self, area: SearchArea) -> Self {
        self.area = area;
        self
    }

    #[must_use]
    pub const fn start(mut self, start: IterStart) -> Self {
        self.start = start;
        self
    }

    #[must_use]
    pub const fn direction(mut self, direction: SearchDirection) -> Self {
        self.direction = direction;
        self
    }

    #[must_use]
    pub const fn action(mut self, action: SearchAction) -> Self {
        self.action = action;
        self
    }

    #[must_use]
    pub const fn match_case(mut self, on: bool) -> Self {
        self.match_case = on;
        self
    }

    #[must_use]
    pub const fn whole_word(mut self, on: bool) -> Self {
        self.whole_word = on;
        self
    }

    #[must_use]
    pub const fn wrap_around(mut self, on: bool) -> Self {
        self.wrap_around = on;
        self
    }

    #[must_use]
    pub const fn entire_area(mut self, on: bool) -> Self {
        self.entire_area = on;
        self
    }

    #[must_use]
    pub const fn all_documents(mut self, on: bool) -> Self {
        self.all_documents = on;
        self
    }

    #[must_use]
    pub const fn regex(mut self, on: bool) -> Self {
        self.regex = on;
        self
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let f = SearchFlags::default();
        assert_eq!(f, SearchFlags::new());
        assert_eq!(f.area, SearchArea::Document);
        assert_eq!(f.start, IterStart::AreaStart);
        assert_eq!(f.direction, SearchDirection::Forward);
        assert_eq!(f.action, SearchAction::None);
        assert!(!f.match_case && !f.whole_word && !f.wrap_around);
        assert!(!f.entire_area && !f.all_documents && !f.regex);
    }

    #[test]
    fn setters_chain() {
        let f = SearchFlags::new()
            .area(SearchArea::Selection)
            .start(IterStart::SelectionEnd)
            .direction(SearchDirection::Backward)
            .action(SearchAction::Replace)
            .match_case(true)
            .entire_area(true);
        assert_eq!(f.area, SearchArea::Selection);
        assert_eq!(f.start, IterStart::SelectionEnd);
        assert_eq!(f.direction, SearchDirection::Backward);
        assert_eq!(f.action, SearchAction::Replace);
        assert!(f.match_case && f.entire_area);
        assert!(!f.wrap_around);
    }

    #[test]
    fn direction_opposite() {
        assert_eq!(SearchDirection::Forward.opposite(), SearchDirection::Backward);
        assert_eq!(SearchDirection::Backward.opposite(), SearchDirection::Forward);
    }
}
