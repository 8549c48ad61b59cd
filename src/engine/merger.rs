//! Span merger: glue adjacent raw matches into logical expressions.
//!
//! The grammar tokenizes one logical date (去年 + 第4季度, or 明天 + 下午 +
//! 3点) into back-to-back hits. A small state machine joins those into single
//! expressions, and flags an expression as the right-hand side of an explicit
//! range when exactly one connector token (到 or 至) separates it from the
//! previous expression.

use crate::{MergedExpression, RawMatch};

struct Pending {
    text: String,
    start: usize,
    end: usize,
    matches: usize,
}

impl Pending {
    fn from_match(m: RawMatch) -> Self {
        Pending { text: m.text, start: m.start, end: m.end, matches: 1 }
    }

    fn extend(&mut self, m: RawMatch) {
        self.text.push_str(&m.text);
        self.end = m.end;
        self.matches += 1;
    }
}

/// Merge raw matches over `text` into ordered, non-overlapping expressions
/// that jointly cover every raw match exactly once.
///
/// Zero raw matches yield zero expressions, not an error.
pub(crate) fn merge(text: &str, matches: impl Iterator<Item = RawMatch>) -> Vec<MergedExpression> {
    let mut merged: Vec<MergedExpression> = Vec::new();
    let mut pending: Option<Pending> = None;

    for m in matches {
        match pending.as_mut() {
            Some(p) if m.start == p.end => p.extend(m),
            _ => {
                if let Some(p) = pending.take() {
                    finalize(p, text, &mut merged);
                }
                pending = Some(Pending::from_match(m));
            }
        }
    }
    if let Some(p) = pending.take() {
        finalize(p, text, &mut merged);
    }

    merged
}

fn finalize(p: Pending, text: &str, merged: &mut Vec<MergedExpression>) {
    // A connector only makes a range when there is a left-hand side to
    // connect to: the flag needs a previously finalized expression and the
    // gap between the two to be exactly one 到/至.
    let is_range_connector = merged
        .last()
        .is_some_and(|prev| matches!(&text[prev.end..p.start], "到" | "至"));

    merged.push(MergedExpression {
        text: p.text,
        start: p.start,
        end: p.end,
        matches: p.matches,
        is_range_connector,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::matcher::raw_matches;
    use crate::grammar::Grammar;

    fn merge_text(text: &str) -> Vec<MergedExpression> {
        let grammar = Grammar::shared().unwrap();
        merge(text, raw_matches(&grammar, text))
    }

    #[test]
    fn back_to_back_tokens_become_one_expression() {
        let merged = merge_text("去年第4季度");
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].text, "去年第4季度");
        assert_eq!(merged[0].matches, 2);
        assert!(!merged[0].is_range_connector);
    }

    #[test]
    fn one_character_gap_splits_expressions() {
        // 和 is not a connector: two independent expressions, no flag.
        let merged = merge_text("明天和后天");
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].text, "明天");
        assert_eq!(merged[1].text, "后天");
        assert!(!merged[1].is_range_connector);
    }

    #[test]
    fn connector_gap_marks_a_range() {
        let merged = merge_text("去年第4季度至今");
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].text, "去年第4季度");
        assert!(!merged[0].is_range_connector);
        assert_eq!(merged[1].text, "今");
        assert!(merged[1].is_range_connector);

        let merged = merge_text("昨天到明天");
        assert_eq!(merged.len(), 2);
        assert!(merged[1].is_range_connector);
    }

    #[test]
    fn first_expression_is_never_a_connector() {
        let merged = merge_text("明天");
        assert_eq!(merged.len(), 1);
        assert!(!merged[0].is_range_connector);
    }

    #[test]
    fn wider_gap_is_not_a_range() {
        // Two characters between the expressions: not an explicit range.
        let merged = merge_text("昨天直到明天");
        assert_eq!(merged.len(), 2);
        assert!(!merged[1].is_range_connector);
    }

    #[test]
    fn zero_matches_yield_zero_expressions() {
        assert!(merge_text("白马非马").is_empty());
        assert!(merge_text("").is_empty());
    }

    #[test]
    fn expressions_cover_all_matches_in_order() {
        let text = "2024年6月15日上午8点30分";
        let merged = merge_text(text);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].start, 0);
        assert_eq!(merged[0].end, text.len());
        assert!(merged[0].matches >= 4);
    }
}
