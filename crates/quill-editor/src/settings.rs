//! Search preferences, persisted as JSON.
//!
//! The file lives at `<config dir>/quill/search.json`. Every field is
//! optional; missing ones take their default, and a missing file means all
//! defaults.
//!
//! ```json
//! {
//!   "match_case": false,
//!   "whole_word": false,
//!   "wrap_around": true,
//!   "regex": false,
//!   "scroll_margin": 0.02,
//!   "history_limit": 10
//! }
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::Result;
use crate::flags::SearchFlags;
use crate::search::DEFAULT_SCROLL_MARGIN;

/// Largest accepted scroll margin; half the height or more would leave no
/// room for the match itself.
const MAX_SCROLL_MARGIN: f32 = 0.49;

/// User preferences for the search bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
#[allow(clippy::struct_excessive_bools)]
pub struct SearchSettings {
    pub match_case: bool,
    pub whole_word: bool,
    pub wrap_around: bool,
    pub regex: bool,
    /// Fraction of the visible height kept around a selected match.
    pub scroll_margin: f32,
    /// Entries kept in each search history.
    pub history_limit: usize,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            match_case: false,
            whole_word: false,
            wrap_around: true,
            regex: false,
            scroll_margin: DEFAULT_SCROLL_MARGIN,
            history_limit: 10,
        }
    }
}

impl SearchSettings {
    /// `<config dir>/quill/search.json`, when the platform has a config dir.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("quill").join("search.json"))
    }

    /// Load settings from `path`. A missing file yields the defaults.
    ///
    /// # Errors
    ///
    /// [`Error::Io`](crate::Error::Io) when the file exists but cannot be
    /// read, [`Error::Settings`](crate::Error::Settings) when it is not
    /// valid JSON of the right shape.
    pub fn load(path: &Path) -> Result<Self> {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no settings file, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(e.into()),
        };
        let settings: Self = serde_json::from_str(&text)?;
        Ok(settings.sanitized())
    }

    /// Load from [`default_path`](Self::default_path), or the defaults when
    /// there is no config dir.
    ///
    /// # Errors
    ///
    /// As [`load`](Self::load).
    pub fn load_default() -> Result<Self> {
        Self::default_path().map_or_else(|| Ok(Self::default()), |path| Self::load(&path))
    }

    /// Write the settings to `path`, creating parent directories.
    ///
    /// # Errors
    ///
    /// [`Error::Io`](crate::Error::Io) when the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let text = serde_json::to_string_pretty(self)?;
        fs::write(path, text)?;
        Ok(())
    }

    /// Flags carrying these preferences: document area, forward from the
    /// area start, no action.
    #[must_use]
    pub const fn base_flags(&self) -> SearchFlags {
        SearchFlags::new()
            .match_case(self.match_case)
            .whole_word(self.whole_word)
            .wrap_around(self.wrap_around)
            .regex(self.regex)
    }

    fn sanitized(mut self) -> Self {
        if self.scroll_margin.is_nan() || !(0.0..=MAX_SCROLL_MARGIN).contains(&self.scroll_margin)
        {
            let clamped = if self.scroll_margin.is_nan() {
                DEFAULT_SCROLL_MARGIN
            } else {
                self.scroll_margin.clamp(0.0, MAX_SCROLL_MARGIN)
            };
            warn!(
                scroll_margin = self.scroll_margin,
                clamped, "scroll margin out of range"
            );
            self.scroll_margin = clamped;
        }
        if self.history_limit == 0 {
            warn!("history limit of 0, keeping one entry");
            self.history_limit = 1;
        }
        self
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
