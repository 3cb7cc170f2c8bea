//! Undo/redo history: transaction-based edit tracking.
//!
//! Records every buffer mutation as a reversible [`Edit`] grouped into
//! transactions. A transaction is the atomic unit of undo/redo. Transactions
//! nest the way user actions do in a text widget: only the outermost
//! [`end`](History::end) commits, so a replace-all made of hundreds of edits
//! undoes in one step.
//!
//! # Usage
//!
//! ```text
//! history.begin(selection);
//! // perform edits on the buffer, recording each one:
//! history.record(at, removed, inserted);
//! // finalize:
//! history.end(selection);
//! ```
//!
//! Empty transactions (no edits between begin and end) are silently
//! discarded.

use crate::position::CharRange;

// ---------------------------------------------------------------------------
// Edit
// ---------------------------------------------------------------------------

/// A single reversible buffer edit: `removed` at char offset `at` was
/// replaced by `inserted`.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Edit {
    Replace {
        at: usize,
        removed: String,
        inserted: String,
    },
}

impl Edit {
    /// The range and text that revert this edit.
    fn inverse(&self) -> (CharRange, &str) {
        let Self::Replace {
            at,
            removed,
            inserted,
        } = self;
        (CharRange::new(*at, at + char_len(inserted)), removed)
    }

    /// The range and text that re-apply this edit.
    fn forward(&self) -> (CharRange, &str) {
        let Self::Replace {
            at,
            removed,
            inserted,
        } = self;
        (CharRange::new(*at, at + char_len(removed)), inserted)
    }
}

// ---------------------------------------------------------------------------
// Transaction
// ---------------------------------------------------------------------------

/// A group of edits that undo/redo as one atomic unit.
///
/// Also tracks the selection so that undo restores it to where it was before
/// the transaction, and redo to where it was after.
#[derive(Debug, Clone)]
struct Transaction {
    edits: Vec<Edit>,
    selection_before: CharRange,
    selection_after: CharRange,
}

// ---------------------------------------------------------------------------
// History
// ---------------------------------------------------------------------------

/// Undo/redo history for a document.
///
/// New edits clear the redo stack; branching history is not kept.
#[derive(Debug)]
pub struct History {
    undo_stack: Vec<Transaction>,
    redo_stack: Vec<Transaction>,
    pending: Option<Transaction>,
    depth: usize,
}

impl History {
    /// Create an empty history.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            pending: None,
            depth: 0,
        }
    }

    /// Open a (possibly nested) transaction. `selection` is the selection
    /// before any edits; only the outermost call records it.
    pub fn begin(&mut self, selection: CharRange) {
        self.depth += 1;
        if self.depth == 1 {
            self.pending = Some(Transaction {
                edits: Vec::new(),
                selection_before: selection,
                selection_after: selection,
            });
        }
    }

    /// Close the innermost transaction. When it is the outermost one, the
    /// transaction is committed with `selection` as the selection to restore
    /// on redo.
    ///
    /// Unbalanced calls are ignored.
    pub fn end(&mut self, selection: CharRange) {
        if self.depth == 0 {
            return;
        }
        self.depth -= 1;
        if self.depth == 0 {
            if let Some(txn) = &mut self.pending {
                txn.selection_after = selection;
            }
            self.commit_pending();
        }
    }

    /// True while a transaction is open.
    #[must_use]
    pub const fn in_transaction(&self) -> bool {
        self.depth > 0
    }

    /// Record that `removed` at `at` was replaced by `inserted`. Call this
    /// after performing the edit on the buffer.
    ///
    /// Does nothing if no transaction is open or the edit is a no-op.
    pub fn record(&mut self, at: usize, removed: &str, inserted: &str) {
        if removed.is_empty() && inserted.is_empty() {
            return;
        }
        if let Some(txn) = &mut self.pending {
            txn.edits.push(Edit::Replace {
                at,
                removed: removed.to_string(),
                inserted: inserted.to_string(),
            });
        }
    }

    /// Undo the last transaction through `apply`, which must replace the
    /// given range with the given text. Returns the selection to restore, or
    /// `None` if there's nothing to undo.
    ///
    /// An open transaction is committed first so it can be undone.
    pub fn undo<F>(&mut self, mut apply: F) -> Option<CharRange>
    where
        F: FnMut(CharRange, &str),
    {
        self.depth = 0;
        self.commit_pending();

        let txn = self.undo_stack.pop()?;
        for edit in txn.edits.iter().rev() {
            let (range, text) = edit.inverse();
            apply(range, text);
        }
        let selection = txn.selection_before;
        self.redo_stack.push(txn);
        Some(selection)
    }

    /// Redo the last undone transaction through `apply`. Returns the
    /// selection to restore, or `None` if there's nothing to redo.
    pub fn redo<F>(&mut self, mut apply: F) -> Option<CharRange>
    where
        F: FnMut(CharRange, &str),
    {
        let txn = self.redo_stack.pop()?;
        for edit in &txn.edits {
            let (range, text) = edit.forward();
            apply(range, text);
        }
        let selection = txn.selection_after;
        self.undo_stack.push(txn);
        Some(selection)
    }

    /// True if there are transactions that can be undone.
    #[must_use]
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
            || self
                .pending
                .as_ref()
                .is_some_and(|t| !t.edits.is_empty())
    }

    /// True if there are transactions that can be redone.
    #[must_use]
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Number of transactions on the undo stack.
    #[must_use]
    pub fn undo_count(&self) -> usize {
        self.undo_stack.len()
    }

    /// Number of transactions on the redo stack.
    #[must_use]
    pub fn redo_count(&self) -> usize {
        self.redo_stack.len()
    }

    fn commit_pending(&mut self) {
        if let Some(txn) = self.pending.take() {
            if txn.edits.is_empty() {
                return;
            }
            self.redo_stack.clear();
            self.undo_stack.push(txn);
        }
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn char_len(text: &str) -> usize {
    text.chars().count()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
