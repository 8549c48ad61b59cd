use std::sync::Arc;

use chrono::{Local, NaiveDateTime};
use tracing::debug;

use crate::engine::{matcher, merger, resolver};
use crate::error::{NormalizeError, Result};
use crate::grammar::Grammar;
use crate::preprocess::clean;

/// Fixed-width textual form for base times at the API boundary.
pub const BASE_TIME_FORMAT: &str = "%Y-%m-%d-%H-%M-%S";

/// Parse a `YYYY-MM-DD-HH-mm-ss` base-time string.
pub fn parse_base(s: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, BASE_TIME_FORMAT).map_err(|_| NormalizeError::BaseTime(s.to_string()))
}

/// Format a base time in the `YYYY-MM-DD-HH-mm-ss` form.
pub fn format_base(dt: NaiveDateTime) -> String {
    dt.format(BASE_TIME_FORMAT).to_string()
}

/// One normalized temporal expression.
///
/// `start`/`end` are byte offsets into the *cleaned* text (see
/// [`clean`](crate::clean)), never into the raw input. Two consecutive units
/// where the second has `is_range_connector` set form a logical
/// (start, end) range pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeUnit {
    /// Slice of the cleaned text that matched.
    pub text: String,
    /// Start byte index of the expression (inclusive).
    pub start: usize,
    /// End byte index of the expression (exclusive).
    pub end: usize,
    /// The resolved absolute timestamp.
    pub time: NaiveDateTime,
    /// True when this unit is the right-hand side of an explicit 到/至 range
    /// with the unit before it.
    pub is_range_connector: bool,
}

/// A parsing session: owns the base-time state, the future-preference flag
/// and the latest result set.
///
/// Sessions are cheap; the compiled grammar behind them is shared. A single
/// session is meant for sequential reuse from one thread at a time; there is
/// no internal synchronization.
#[derive(Debug)]
pub struct TimeNormalizer {
    grammar: Arc<Grammar>,
    base: NaiveDateTime,
    original_base: Option<NaiveDateTime>,
    prefer_future: bool,
    time_units: Vec<TimeUnit>,
}

impl TimeNormalizer {
    /// Create a session over the process-wide bundled grammar.
    ///
    /// Fails when the grammar cannot be compiled; no session operates
    /// without one.
    pub fn new() -> Result<Self> {
        Ok(Self::with_grammar(Grammar::shared()?))
    }

    /// Create a session over an explicit grammar handle.
    pub fn with_grammar(grammar: Arc<Grammar>) -> Self {
        TimeNormalizer {
            grammar,
            base: Local::now().naive_local(),
            original_base: None,
            prefer_future: true,
            time_units: Vec::new(),
        }
    }

    /// Fix the session's base time (and the value [`reset_base`] restores).
    ///
    /// Without this, the original base is pinned by the first parse call.
    ///
    /// [`reset_base`]: TimeNormalizer::reset_base
    pub fn with_base(mut self, base: NaiveDateTime) -> Self {
        self.base = base;
        self.original_base = Some(base);
        self
    }

    /// Toggle future preference at construction; the default is `true`.
    pub fn with_prefer_future(mut self, prefer_future: bool) -> Self {
        self.prefer_future = prefer_future;
        self
    }

    /// Extract and normalize every temporal expression in `text`, using the
    /// current wall clock as the base time.
    pub fn parse(&mut self, text: &str) -> &[TimeUnit] {
        self.parse_with_base(text, Local::now().naive_local())
    }

    /// Extract and normalize every temporal expression in `text` against an
    /// explicit base time.
    ///
    /// The base is fixed for the whole call; mutating it afterwards only
    /// affects subsequent calls. The result is stored on the session (see
    /// [`time_units`](TimeNormalizer::time_units)) and returned.
    pub fn parse_with_base(&mut self, text: &str, base: NaiveDateTime) -> &[TimeUnit] {
        self.base = base;
        self.original_base.get_or_insert(base);

        let cleaned = clean(text);
        let merged = merger::merge(&cleaned, matcher::raw_matches(&self.grammar, &cleaned));
        debug!(
            expressions = merged.len(),
            raw_tokens = merged.iter().map(|m| m.matches).sum::<usize>(),
            "merged temporal expressions"
        );
        self.time_units = resolver::resolve_all(merged, base, self.prefer_future);
        &self.time_units
    }

    /// Like [`parse_with_base`](TimeNormalizer::parse_with_base), with the
    /// base supplied in the `YYYY-MM-DD-HH-mm-ss` textual form.
    pub fn parse_with_base_str(&mut self, text: &str, base: &str) -> Result<&[TimeUnit]> {
        let base = parse_base(base)?;
        Ok(self.parse_with_base(text, base))
    }

    /// The latest result set.
    pub fn time_units(&self) -> &[TimeUnit] {
        &self.time_units
    }

    /// The current base time.
    pub fn base(&self) -> NaiveDateTime {
        self.base
    }

    /// The base fixed at construction (or by the first parse call).
    pub fn original_base(&self) -> NaiveDateTime {
        self.original_base.unwrap_or(self.base)
    }

    pub fn set_base(&mut self, base: NaiveDateTime) {
        self.base = base;
    }

    /// Restore the current base to the original one.
    pub fn reset_base(&mut self) {
        if let Some(original) = self.original_base {
            self.base = original;
        }
    }

    pub fn prefer_future(&self) -> bool {
        self.prefer_future
    }

    pub fn set_prefer_future(&mut self, prefer_future: bool) {
        self.prefer_future = prefer_future;
    }
}
