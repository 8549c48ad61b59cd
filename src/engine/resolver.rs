//! Temporal resolver: merged expressions to absolute timestamps.
//!
//! Resolution is a fold over the call's merged expressions. Each step gets
//! the call's fixed base time, the future-preference flag and the running
//! calendar context, and returns the resolved timestamp (or nothing) plus the
//! updated context for the next step. Unresolved expressions are dropped from
//! the output, never surfaced as errors.

use chrono::{Datelike, NaiveDateTime, Timelike};
use tracing::trace;

use crate::MergedExpression;
use crate::api::TimeUnit;
use crate::engine::binder::{self, BindEnv};
use crate::time_point::{Field, TimePoint, shift_datetime_by_field};

/// Resolve one merged expression against `base` and the running context.
///
/// Returns the resolved timestamp (or `None` when the expression carried no
/// usable value or composed to an impossible date) and the context to thread
/// into the next expression.
pub(crate) fn resolve(
    expr: &MergedExpression,
    base: NaiveDateTime,
    prefer_future: bool,
    ctx: TimePoint,
) -> (Option<NaiveDateTime>, TimePoint) {
    let env = BindEnv { base, prefer_future };
    let mut explicit = TimePoint::default();
    binder::apply_all(&expr.text, &env, &mut explicit);

    if explicit.is_empty() {
        // Matched a token category but carried no usable value.
        return (None, ctx);
    }
    trace!(text = %expr.text, fields = ?explicit.bound(), "bound expression");

    let (Some(coarsest), Some(finest)) = (explicit.coarsest_bound(), explicit.finest_bound()) else {
        return (None, ctx);
    };

    // Fields coarser than the finest bound one inherit from the running
    // context first, then from the base; fields finer take unit defaults.
    let mut working = explicit;
    let mut inherited_from_context = false;
    for field in Field::ALL {
        if field >= finest {
            continue;
        }
        if working.get(field).is_none() {
            if let Some(value) = ctx.get(field) {
                working.set(field, value);
                if field < coarsest {
                    inherited_from_context = true;
                }
            } else {
                working.set(field, base_field(base, field));
            }
        }
    }
    for field in Field::ALL {
        if field > finest {
            working.set(field, match field {
                Field::Month | Field::Day => 1,
                _ => 0,
            });
        }
    }

    let mut next_ctx = ctx;
    next_ctx.merge_bound(&explicit);

    let Some(mut resolved) = working.to_datetime() else {
        return (None, next_ctx);
    };

    // Future/past disambiguation: only when every field above the bound ones
    // was inherited from the base itself. An explicit coarser field, or one
    // carried over from a previous expression, already pins the period.
    if coarsest != Field::Year && !inherited_from_context {
        if let (Some(bound_value), Some(parent)) = (explicit.get(coarsest), coarsest.coarser()) {
            let base_value = base_field(base, coarsest);
            if prefer_future && bound_value < base_value {
                resolved = shift_datetime_by_field(resolved, 1, parent);
            } else if !prefer_future && bound_value > base_value {
                resolved = shift_datetime_by_field(resolved, -1, parent);
            }
        }
    }

    (Some(resolved), next_ctx)
}

/// Fold [`resolve`] over all expressions of one call and keep the resolved
/// ones, in order. The empty input yields the empty output.
pub(crate) fn resolve_all(
    exprs: Vec<MergedExpression>,
    base: NaiveDateTime,
    prefer_future: bool,
) -> Vec<TimeUnit> {
    let mut ctx = TimePoint::default();
    let mut units = Vec::with_capacity(exprs.len());

    for expr in exprs {
        let (resolved, next_ctx) = resolve(&expr, base, prefer_future, ctx);
        ctx = next_ctx;
        match resolved {
            Some(time) => units.push(TimeUnit {
                text: expr.text,
                start: expr.start,
                end: expr.end,
                time,
                is_range_connector: expr.is_range_connector,
            }),
            None => trace!(text = %expr.text, "dropped unresolved expression"),
        }
    }

    units
}

fn base_field(base: NaiveDateTime, field: Field) -> i32 {
    match field {
        Field::Year => base.year(),
        Field::Month => base.month() as i32,
        Field::Day => base.day() as i32,
        Field::Hour => base.hour() as i32,
        Field::Minute => base.minute() as i32,
        Field::Second => base.second() as i32,
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::engine::{matcher, merger};
    use crate::grammar::Grammar;
    use crate::preprocess::clean;

    fn base(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, mo, d).unwrap().and_hms_opt(h, mi, s).unwrap()
    }

    fn resolve_text(text: &str, base: NaiveDateTime, prefer_future: bool) -> Vec<TimeUnit> {
        let grammar = Grammar::shared().unwrap();
        let cleaned = clean(text);
        let merged = merger::merge(&cleaned, matcher::raw_matches(&grammar, &cleaned));
        resolve_all(merged, base, prefer_future)
    }

    #[test]
    fn bare_year_resolves_to_year_start() {
        let units = resolve_text("去年", base(2024, 1, 10, 0, 0, 0), true);
        assert_eq!(units.len(), 1);
        assert_eq!(units[0].time, base(2023, 1, 1, 0, 0, 0));
    }

    #[test]
    fn quarter_inherits_year_from_preceding_token() {
        let units = resolve_text("去年第4季度", base(2024, 6, 15, 12, 0, 0), true);
        assert_eq!(units.len(), 1);
        assert_eq!(units[0].time, base(2023, 10, 1, 0, 0, 0));
    }

    #[test]
    fn bare_quarter_inherits_base_year() {
        let units = resolve_text("第4季度", base(2024, 6, 15, 12, 0, 0), true);
        assert_eq!(units.len(), 1);
        assert_eq!(units[0].time, base(2024, 10, 1, 0, 0, 0));
    }

    #[test]
    fn context_carries_fields_across_expressions() {
        // 6月 after 去年 inherits the context year, not the base year.
        let units = resolve_text("去年，6月15日很热", base(2024, 1, 10, 0, 0, 0), true);
        assert_eq!(units.len(), 2);
        assert_eq!(units[0].time, base(2023, 1, 1, 0, 0, 0));
        assert_eq!(units[1].time, base(2023, 6, 15, 0, 0, 0));
    }

    #[test]
    fn month_prefer_future_rolls_to_next_year() {
        let b = base(2024, 6, 15, 12, 0, 0);
        let units = resolve_text("3月", b, true);
        assert_eq!(units[0].time, base(2025, 3, 1, 0, 0, 0));

        // Past side already: no shift.
        let units = resolve_text("3月", b, false);
        assert_eq!(units[0].time, base(2024, 3, 1, 0, 0, 0));

        // Later month under past preference rolls back a year.
        let units = resolve_text("8月", b, false);
        assert_eq!(units[0].time, base(2023, 8, 1, 0, 0, 0));
    }

    #[test]
    fn containing_period_is_never_shifted() {
        let b = base(2024, 6, 15, 12, 0, 0);
        for prefer in [true, false] {
            let units = resolve_text("6月", b, prefer);
            assert_eq!(units[0].time, base(2024, 6, 1, 0, 0, 0));
        }
    }

    #[test]
    fn hour_prefer_future_rolls_to_next_day() {
        let b = base(2024, 6, 15, 12, 0, 0);
        let units = resolve_text("8点", b, true);
        assert_eq!(units[0].time, base(2024, 6, 16, 8, 0, 0));

        let units = resolve_text("8点", b, false);
        assert_eq!(units[0].time, base(2024, 6, 15, 8, 0, 0));

        let units = resolve_text("15点", b, false);
        assert_eq!(units[0].time, base(2024, 6, 14, 15, 0, 0));
    }

    #[test]
    fn explicit_date_suppresses_preference() {
        // The day is pinned by 明天; the clock must not roll anything.
        let b = base(2024, 6, 15, 18, 0, 0);
        for prefer in [true, false] {
            let units = resolve_text("明天下午3点", b, prefer);
            assert_eq!(units.len(), 1);
            assert_eq!(units[0].time, base(2024, 6, 16, 15, 0, 0));
        }
    }

    #[test]
    fn impossible_dates_are_dropped() {
        let units = resolve_text("2月30日", base(2024, 1, 10, 0, 0, 0), true);
        assert!(units.is_empty());
    }

    #[test]
    fn festival_resolves_within_inherited_year() {
        let units = resolve_text("国庆节", base(2024, 6, 15, 0, 0, 0), true);
        assert_eq!(units[0].time, base(2024, 10, 1, 0, 0, 0));

        // Christmas just passed: prefer-past keeps last year's.
        let units = resolve_text("圣诞节", base(2024, 6, 15, 0, 0, 0), false);
        assert_eq!(units[0].time, base(2023, 12, 25, 0, 0, 0));
    }

    #[test]
    fn lunisolar_festival_is_filtered() {
        let units = resolve_text("春节", base(2024, 6, 15, 0, 0, 0), true);
        assert!(units.is_empty());
    }

    #[test]
    fn range_pair_resolves_both_sides() {
        let b = base(2024, 6, 15, 12, 0, 0);
        let units = resolve_text("去年第4季度至今", b, true);
        assert_eq!(units.len(), 2);
        assert_eq!(units[0].time, base(2023, 10, 1, 0, 0, 0));
        assert!(!units[0].is_range_connector);
        assert_eq!(units[1].time, b);
        assert!(units[1].is_range_connector);
    }
}
