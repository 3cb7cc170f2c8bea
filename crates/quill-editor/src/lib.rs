//! # quill-editor
//!
//! Editor core for quill.
//!
//! The toolkit-independent half of the editor: everything the search bar and
//! the replace dialog need, without any GUI types.
//!
//! - **[`position`]**: `Position` (line, col) for display, `CharRange` for offsets
//! - **[`buffer`]**: `Buffer` wrapping a rope with editing, file I/O, and metadata
//! - **[`document`]**: `Document`: buffer + selection + tags + viewport + undo
//! - **[`text_buffer`]**: the `TextBuffer` capability trait the engine works through
//! - **[`flags`]** / **[`query`]**: what to search for and how
//! - **[`search`]**: `SearchEngine`: find, highlight, replace, across documents
//! - **[`search_state`]**: last query and search/replace history for the UI
//! - **[`settings`]**: persisted search preferences

pub mod buffer;
pub mod document;
pub mod error;
pub mod flags;
pub mod history;
pub mod position;
pub mod query;
pub mod search;
pub mod search_state;
pub mod settings;
pub mod tags;
pub mod text_buffer;
pub mod view;
pub mod word;

pub use crate::error::{Error, Result};
