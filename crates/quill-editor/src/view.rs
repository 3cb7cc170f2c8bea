//! Viewport: which part of a document is on screen.
//!
//! A `Viewport` holds only scroll state and display configuration. It does not
//! own the buffer; [`scroll_to`](Viewport::scroll_to) takes one as a parameter.
//! Sizes are in text lines and display columns, so the same type serves a
//! terminal grid or a GUI text view that reports its visible line count.
//!
//! Display columns differ from char columns: tabs expand to the next tab stop
//! and wide (CJK) characters take two columns.

use unicode_width::UnicodeWidthChar;

use crate::buffer::Buffer;
use crate::position::CharRange;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Convert a char column offset to a display column position.
///
/// Walks the character iterator, expanding tabs to the next tab stop and
/// accounting for wide characters. Stops at `char_col` or at the first line
/// ending.
#[must_use]
pub fn char_col_to_display_col<I: Iterator<Item = char>>(
    chars: I,
    char_col: usize,
    tab_width: u8,
) -> usize {
    let tab_w = tab_width.max(1) as usize;
    let mut display_col = 0;

    for (i, ch) in chars.enumerate() {
        if i >= char_col {
            break;
        }
        match ch {
            '\n' | '\r' => break,
            '\t' => display_col = (display_col / tab_w + 1) * tab_w,
            _ => display_col += ch.width().unwrap_or(0),
        }
    }

    display_col
}

/// Number of lines to keep between a target and the viewport edge for a
/// `margin` expressed as a fraction of `height`.
///
/// Always leaves at least one line for the target itself, so the result is
/// below half the height.
#[must_use]
pub fn margin_lines(margin: f32, height: usize) -> usize {
    if height == 0 || margin <= 0.0 || margin.is_nan() {
        return 0;
    }
    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    let lines = (margin * height as f32).ceil() as usize;
    lines.min((height - 1) / 2)
}

// ---------------------------------------------------------------------------
// Viewport
// ---------------------------------------------------------------------------

/// Scroll position and size of the visible text area.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Viewport {
    /// First visible buffer line (0-indexed).
    top_line: usize,

    /// Horizontal scroll offset in display columns.
    left_col: usize,

    /// Visible text lines.
    height: usize,

    /// Visible display columns.
    width: usize,

    /// Tab stop width (display columns per tab stop).
    tab_width: u8,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(40, 120)
    }
}

impl Viewport {
    /// Create a viewport of `height` lines by `width` columns, scrolled to the
    /// top-left corner, with 8-column tabs.
    #[must_use]
    pub const fn new(height: usize, width: usize) -> Self {
        Self {
            top_line: 0,
            left_col: 0,
            height,
            width,
            tab_width: 8,
        }
    }

    // -- Accessors ----------------------------------------------------------

    /// First visible buffer line (0-indexed).
    #[inline]
    #[must_use]
    pub const fn top_line(&self) -> usize {
        self.top_line
    }

    /// Horizontal scroll offset in display columns.
    #[inline]
    #[must_use]
    pub const fn left_col(&self) -> usize {
        self.left_col
    }

    /// Number of visible lines.
    #[inline]
    #[must_use]
    pub const fn height(&self) -> usize {
        self.height
    }

    /// Number of visible display columns.
    #[inline]
    #[must_use]
    pub const fn width(&self) -> usize {
        self.width
    }

    /// Current tab width.
    #[inline]
    #[must_use]
    pub const fn tab_width(&self) -> u8 {
        self.tab_width
    }

    /// True when `line` is on screen.
    #[inline]
    #[must_use]
    pub const fn is_line_visible(&self, line: usize) -> bool {
        line >= self.top_line && line < self.top_line + self.height
    }

    // -- Configuration ------------------------------------------------------

    /// Resize the visible area (e.g. after the window was resized).
    pub const fn resize(&mut self, height: usize, width: usize) {
        self.height = height;
        self.width = width;
    }

    /// Set the tab stop width (minimum 1).
    pub fn set_tab_width(&mut self, width: u8) {
        self.tab_width = width.max(1);
    }

    /// Set the vertical scroll position directly.
    pub const fn set_top_line(&mut self, line: usize) {
        self.top_line = line;
    }

    /// Set the horizontal scroll position directly.
    pub const fn set_left_col(&mut self, col: usize) {
        self.left_col = col;
    }

    // -- Scrolling ----------------------------------------------------------

    /// Scroll the minimum amount needed to show `range`.
    ///
    /// The line holding `range.start` ends up at least
    /// [`margin_lines`]`(margin, height)` lines away from the top and bottom
    /// edges. Horizontally the range is brought into the window; when it is
    /// wider than the window its start wins.
    pub fn scroll_to(&mut self, buf: &Buffer, range: CharRange, margin: f32) {
        if self.height == 0 || self.width == 0 {
            return;
        }

        let start = buf.char_idx_to_pos(range.start);
        let end = buf.char_idx_to_pos(range.end);
        let m = margin_lines(margin, self.height);

        // Vertical: start line within [top + m, top + height - m)
        if start.line < self.top_line + m {
            self.top_line = start.line.saturating_sub(m);
        }
        if start.line + m >= self.top_line + self.height {
            self.top_line = start.line + m + 1 - self.height;
        }

        // Horizontal, in display columns of the start line.
        let line = buf.line_text(start.line).unwrap_or_default();
        let start_col = char_col_to_display_col(line.chars(), start.col, self.tab_width);
        let end_col = if end.line == start.line {
            char_col_to_display_col(line.chars(), end.col, self.tab_width)
        } else {
            start_col
        };

        let want_end = end_col.max(start_col + 1);
        if want_end > self.left_col + self.width {
            self.left_col = want_end - self.width;
        }
        if start_col < self.left_col {
            self.left_col = start_col;
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
