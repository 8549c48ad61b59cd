//! Span matcher: raw grammar hits over the preprocessed text.

use crate::RawMatch;
use crate::grammar::Grammar;

/// Lazy iterator over grammar-token hits, in strictly increasing start order
/// with no overlaps. Finite and non-restartable; the grammar is consumed as
/// read-only shared state.
pub(crate) struct RawMatches<'t> {
    grammar: &'t Grammar,
    text: &'t str,
    at: usize,
}

pub(crate) fn raw_matches<'t>(grammar: &'t Grammar, text: &'t str) -> RawMatches<'t> {
    RawMatches { grammar, text, at: 0 }
}

impl Iterator for RawMatches<'_> {
    type Item = RawMatch;

    fn next(&mut self) -> Option<RawMatch> {
        if self.at > self.text.len() {
            return None;
        }
        let m = self.grammar.find_from(self.text, self.at)?;
        // No grammar branch matches the empty string, but a caller-supplied
        // pattern might; never loop in place.
        self.at = if m.end() > m.start() { m.end() } else { m.end() + 1 };
        Some(RawMatch { start: m.start(), end: m.end(), text: m.as_str().to_string() })
    }
}
