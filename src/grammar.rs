//! The compiled temporal grammar.
//!
//! One [`Grammar`] owns a single compiled alternation of per-category
//! sub-patterns; the span matcher drives it with "find next match from
//! offset N" and nothing else. The grammar is immutable once constructed and
//! safe for unsynchronized concurrent reads from any number of sessions.
//!
//! The sub-pattern constants below must stay in sync with the field binders
//! in `engine/binder.rs`: every branch the scanner can emit has a binder that
//! knows which calendar fields its text sets.

use std::path::Path;
use std::sync::Arc;

use once_cell::sync::OnceCell;
use regex::Regex;
use tracing::debug;

use crate::error::{NormalizeError, Result};

// Branch order matters: the regex engine prefers earlier alternatives at the
// same position, so compound tokens (3天前, 明天, 去年) come before the bare
// numeric fields that would otherwise eat their digits.
const OFFSET: &str = r"\d+(?:个)?(?:秒|分钟|小时|钟头|天|日|周|星期|礼拜|月|年)[以之]?[前后]";
const RELATIVE_YEAR: &str = "大前年|大后年|前年|去年|今年|明年|后年";
const RELATIVE_DAY: &str = "大前天|大后天|前天|昨天|今天|今日|明天|明日|后天";
const WEEKDAY: &str = "(?:上上|下下|上|下|这个?|本)?(?:周|星期|礼拜)[1-7日天]";
const QUARTER: &str = "第?[1-4]季度";
const FESTIVAL: &str = "元旦节?|春节|元宵节?|情人节|妇女节|植树节|愚人节|清明节?|劳动节|青年节|儿童节|端午节?|建党节|建军节|七夕节?|教师节|中秋节?|国庆节?|重阳节?|万圣节|平安夜|圣诞节?|除夕|母亲节|父亲节";
const YEAR: &str = r"\d{2,4}年";
const MONTH: &str = r"\d{1,2}月(?:份)?";
const DAY: &str = r"\d{1,2}[日号]";
const CLOCK: &str = r"\d{1,2}[点时](?:\d{1,2}分?|半|[13]刻|整)?|\d{1,2}:\d{1,2}(?::\d{1,2})?";
const MINUTE: &str = r"\d{1,2}分钟?";
const SECOND: &str = r"\d{1,2}秒";
const DAY_PERIOD: &str = "凌晨|清晨|早晨|早上|上午|中午|午间|下午|午后|傍晚|晚上|晚间|夜里|夜间|深夜";
const DIRECTION: &str = "以前|以后|之前|之后|最近|将来|未来";
const NOW: &str = "现在|此刻|当前|目前|今";

const BRANCHES: [&str; 15] = [
    OFFSET,
    RELATIVE_YEAR,
    RELATIVE_DAY,
    WEEKDAY,
    QUARTER,
    FESTIVAL,
    YEAR,
    MONTH,
    DAY,
    CLOCK,
    MINUTE,
    SECOND,
    DAY_PERIOD,
    DIRECTION,
    NOW,
];

static SHARED: OnceCell<Arc<Grammar>> = OnceCell::new();

/// The bundled scan pattern: the alternation of every category sub-pattern.
///
/// Callers that load a pattern file (`Grammar::from_file`) can start from
/// this text and extend it.
pub fn bundled_pattern() -> String {
    let branches: Vec<String> = BRANCHES.iter().map(|b| format!("(?:{b})")).collect();
    branches.join("|")
}

/// A compiled temporal grammar.
#[derive(Debug)]
pub struct Grammar {
    scan: Regex,
}

impl Grammar {
    /// The process-wide bundled grammar, compiled at most once.
    ///
    /// The first successful compilation wins and is shared by every session
    /// constructed afterwards; a failed compilation is retried on the next
    /// call rather than cached.
    pub fn shared() -> Result<Arc<Grammar>> {
        SHARED.get_or_try_init(|| Grammar::from_pattern(&bundled_pattern()).map(Arc::new)).cloned()
    }

    /// Compile a caller-supplied scan alternation.
    pub fn from_pattern(pattern: &str) -> Result<Grammar> {
        let scan = Regex::new(pattern)?;
        debug!(pattern_bytes = pattern.len(), "compiled temporal grammar");
        Ok(Grammar { scan })
    }

    /// Read a plain-text pattern file and compile it.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Grammar> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|source| NormalizeError::GrammarIo { path: path.display().to_string(), source })?;
        Grammar::from_pattern(raw.trim())
    }

    /// Find the next grammar token at or after byte offset `start`.
    pub(crate) fn find_from<'t>(&self, text: &'t str, start: usize) -> Option<regex::Match<'t>> {
        self.scan.find_at(text, start)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_pattern_compiles() {
        let grammar = Grammar::from_pattern(&bundled_pattern()).unwrap();
        assert!(grammar.find_from("明天", 0).is_some());
    }

    #[test]
    fn shared_grammar_is_one_instance() {
        let a = Grammar::shared().unwrap();
        let b = Grammar::shared().unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn invalid_pattern_is_an_error() {
        assert!(Grammar::from_pattern("(((").is_err());
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = Grammar::from_file("/nonexistent/grammar.txt").unwrap_err();
        assert!(matches!(err, NormalizeError::GrammarIo { .. }));
    }

    #[test]
    fn compound_tokens_win_over_bare_fields() {
        let grammar = Grammar::shared().unwrap();
        // 3天前 must scan as one offset token, not as a bare day field.
        let m = grammar.find_from("3天前", 0).unwrap();
        assert_eq!(m.as_str(), "3天前");

        let m = grammar.find_from("去年", 0).unwrap();
        assert_eq!(m.as_str(), "去年");

        let m = grammar.find_from("今天", 0).unwrap();
        assert_eq!(m.as_str(), "今天");
    }
}
