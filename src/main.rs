// SPDX-License-Identifier: MIT
//
// quill: find and replace across files with the editor's search engine.
//
// Each FILE is opened as a document, in argument order, the way tabs sit in
// a window. The search preferences come from the settings file and can be
// overridden per run:
//
//   quill PATTERN FILE...               list matches as path:line:col: text
//   quill --count PATTERN FILE...       per-file counts and a total
//   quill --replace TEXT PATTERN FILE...  replace everywhere and save
//
// Exit status: 0 when something matched, 1 when nothing did, 2 on error.

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use quill_editor::document::Document;
use quill_editor::flags::{SearchAction, SearchArea, SearchFlags};
use quill_editor::position::CharRange;
use quill_editor::query::SearchQuery;
use quill_editor::search::SearchEngine;
use quill_editor::settings::SearchSettings;
use quill_editor::text_buffer::TextBuffer;

// ─── Command line ───────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "quill", version, about = "Find and replace across files")]
#[allow(clippy::struct_excessive_bools)]
struct Args {
    /// Text to search for (a regular expression with --regex)
    #[arg(value_name = "PATTERN")]
    pattern: String,

    /// Files to search, in window order
    #[arg(value_name = "FILE", required = true)]
    files: Vec<PathBuf>,

    /// Print the number of matches per file instead of listing them
    #[arg(short, long, conflicts_with = "replace")]
    count: bool,

    /// Replace every match with TEXT and save the changed files
    #[arg(short, long, value_name = "TEXT")]
    replace: Option<String>,

    /// With --replace, print the new contents instead of saving
    #[arg(long, requires = "replace")]
    dry_run: bool,

    /// Compare case-insensitively
    #[arg(short, long, conflicts_with = "match_case")]
    ignore_case: bool,

    /// Compare case-sensitively
    #[arg(short = 's', long)]
    match_case: bool,

    /// Only match whole words
    #[arg(short, long)]
    whole_word: bool,

    /// Treat PATTERN as a regular expression
    #[arg(short = 'e', long)]
    regex: bool,

    /// Restrict the search to a char range of every file
    #[arg(long, value_name = "START..END", value_parser = parse_range)]
    selection: Option<CharRange>,

    /// Settings file to read instead of the default one
    #[arg(long, value_name = "PATH", env = "QUILL_SETTINGS")]
    settings: Option<PathBuf>,
}

impl Args {
    /// Settings flags with the command-line overrides applied.
    fn flags(&self, settings: &SearchSettings) -> SearchFlags {
        let mut flags = settings.base_flags();
        if self.ignore_case {
            flags.match_case = false;
        }
        if self.match_case {
            flags.match_case = true;
        }
        flags.whole_word |= self.whole_word;
        flags.regex |= self.regex;
        if self.selection.is_some() {
            flags.area = SearchArea::Selection;
        }
        flags
    }
}

/// Parse `START..END` char offsets.
fn parse_range(s: &str) -> Result<CharRange, String> {
    let (start, end) = s
        .split_once("..")
        .ok_or_else(|| format!("expected START..END, got `{s}`"))?;
    let start: usize = start
        .trim()
        .parse()
        .map_err(|e| format!("bad start `{start}`: {e}"))?;
    let end: usize = end
        .trim()
        .parse()
        .map_err(|e| format!("bad end `{end}`: {e}"))?;
    if start > end {
        return Err(format!("start {start} is after end {end}"));
    }
    Ok(CharRange::new(start, end))
}

// ─── Entry point ────────────────────────────────────────────────────────────

fn main() -> ExitCode {
    init_logging();
    let args = Args::parse();
    let stdout = io::stdout();
    match run(&args, &mut stdout.lock()) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(err) => {
            eprintln!("quill: {err:#}");
            ExitCode::from(2)
        }
    }
}

/// Log to stderr, filtered by `QUILL_LOG` (default `warn`).
fn init_logging() {
    let filter = EnvFilter::try_from_env("QUILL_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

/// Run one invocation. Returns whether anything matched.
fn run(args: &Args, out: &mut impl Write) -> Result<bool> {
    let settings = match &args.settings {
        Some(path) => SearchSettings::load(path)
            .with_context(|| format!("reading settings {}", path.display()))?,
        None => SearchSettings::load_default().context("reading settings")?,
    };
    let flags = args.flags(&settings);
    debug!(?flags, files = args.files.len(), "starting");

    let mut documents = open_documents(args)?;
    let engine = SearchEngine::from_settings(&settings);

    if let Some(replacement) = &args.replace {
        replace(args, &engine, &mut documents, flags, replacement, out)
    } else if args.count {
        count(args, &engine, &mut documents, flags, out)
    } else {
        list(args, &engine, &documents, flags, out)
    }
}

fn open_documents(args: &Args) -> Result<Vec<Document>> {
    args.files
        .iter()
        .map(|path| {
            let mut doc = Document::from_file(path)
                .with_context(|| format!("opening {}", path.display()))?;
            if let Some(range) = args.selection {
                doc.select(range);
            }
            Ok(doc)
        })
        .collect()
}

// ─── Modes ──────────────────────────────────────────────────────────────────

/// `path:line:col: text` for every match.
fn list(
    args: &Args,
    engine: &SearchEngine,
    documents: &[Document],
    flags: SearchFlags,
    out: &mut impl Write,
) -> Result<bool> {
    let query = SearchQuery::new(&args.pattern, flags)?;
    let mut any = false;
    for (path, doc) in args.files.iter().zip(documents) {
        for range in engine.matches(doc, &query) {
            any = true;
            let pos = doc.buffer().char_idx_to_pos(range.start);
            let line = doc.buffer().line_text(pos.line).unwrap_or_default();
            writeln!(out, "{}:{pos}: {line}", path.display())?;
        }
    }
    Ok(any)
}

/// `path: N` per file, then the total.
fn count(
    args: &Args,
    engine: &SearchEngine,
    documents: &mut [Document],
    flags: SearchFlags,
    out: &mut impl Write,
) -> Result<bool> {
    let flags = flags.all_documents(true).entire_area(true);
    let query = SearchQuery::new(&args.pattern, flags)?;
    let summary = engine.find_in_documents(documents, 0, &query);
    for (path, n) in args.files.iter().zip(&summary.counts) {
        writeln!(out, "{}: {n}", path.display())?;
    }
    writeln!(out, "total: {}", summary.total)?;
    Ok(summary.found())
}

/// Replace everywhere, then save (or print, with `--dry-run`) each changed
/// file.
fn replace(
    args: &Args,
    engine: &SearchEngine,
    documents: &mut [Document],
    flags: SearchFlags,
    replacement: &str,
    out: &mut impl Write,
) -> Result<bool> {
    let flags = flags
        .all_documents(true)
        .entire_area(true)
        .action(SearchAction::Replace);
    let query = SearchQuery::new(&args.pattern, flags)?.with_replacement(Some(replacement));
    let summary = engine.find_in_documents(documents, 0, &query);

    for ((path, doc), &n) in args.files.iter().zip(documents.iter_mut()).zip(&summary.counts) {
        if n == 0 {
            continue;
        }
        if args.dry_run {
            writeln!(out, "==> {} ({n} replaced) <==", path.display())?;
            out.write_all(doc.buffer().to_file_text().as_bytes())?;
        } else {
            doc.save()
                .with_context(|| format!("saving {}", path.display()))?;
            writeln!(out, "{}: {n} replaced", path.display())?;
        }
    }
    Ok(summary.found())
}

// ─── Tests ──────────────────────────────────────────────────────────────────
