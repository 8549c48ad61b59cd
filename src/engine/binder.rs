//! Field binders: per-category extraction of calendar fields from a merged
//! expression's text.
//!
//! Each binder owns a sub-pattern kept in sync with the grammar's scan
//! alternation, and binds literal or computed values on a working
//! [`TimePoint`]. Binders run in a fixed order; a later binder may overwrite
//! an earlier binding when sub-patterns overlap textually (10月前 first binds
//! month 10, then the offset binder rebinds the date from base minus ten
//! months), which mirrors how such text reads.

use chrono::{Datelike, Duration, NaiveDateTime};

use crate::time_point::{Field, TimePoint, shift_datetime_by_field};

/// Environment a binder may consult: the call's fixed base time and the
/// session's future-preference flag.
pub(crate) struct BindEnv {
    pub base: NaiveDateTime,
    pub prefer_future: bool,
}

/// Gregorian-dated festivals and fixed-date solar terms.
///
/// Lunisolar festivals (春节, 端午节, 中秋节, ...) are matched by the grammar
/// so they merge correctly with their neighbors, but bind nothing here: the
/// crate carries no lunisolar calendar, and a fixed date would be wrong in
/// most years.
const FESTIVALS: [(&str, i32, i32); 17] = [
    ("元旦", 1, 1),
    ("情人节", 2, 14),
    ("妇女节", 3, 8),
    ("植树节", 3, 12),
    ("愚人节", 4, 1),
    ("清明", 4, 4),
    ("劳动节", 5, 1),
    ("青年节", 5, 4),
    ("儿童节", 6, 1),
    ("建党节", 7, 1),
    ("建军节", 8, 1),
    ("教师节", 9, 10),
    ("国庆", 10, 1),
    ("万圣节", 10, 31),
    ("平安夜", 12, 24),
    ("冬至", 12, 22),
    ("圣诞", 12, 25),
];

/// Run the whole binder battery over one expression's text.
///
/// The application order is the category precedence: a later binder wins when
/// two categories claim the same field.
pub(crate) fn apply_all(text: &str, env: &BindEnv, tp: &mut TimePoint) {
    bind_year(text, tp);
    bind_relative_year(text, env, tp);
    bind_month(text, tp);
    bind_day(text, tp);
    bind_clock(text, tp);
    bind_minute(text, tp);
    bind_second(text, tp);
    bind_offset(text, env, tp);
    bind_relative_day(text, env, tp);
    bind_weekday(text, env, tp);
    bind_quarter(text, tp);
    bind_festival(text, tp);
    bind_now(text, env, tp);
}

fn bind_year(text: &str, tp: &mut TimePoint) {
    if let Some(caps) = regex!(r"(\d{2,4})年").captures(text) {
        let digits = &caps[1];
        let Ok(mut year) = digits.parse::<i32>() else { return };
        // Two-digit years: <30 reads as the 2000s, anything else as the 1900s.
        if digits.len() == 2 {
            year += if year < 30 { 2000 } else { 1900 };
        }
        tp.set(Field::Year, year);
    }
}

fn bind_relative_year(text: &str, env: &BindEnv, tp: &mut TimePoint) {
    let Some(m) = regex!("大前年|大后年|前年|去年|今年|明年|后年").find(text) else { return };
    let delta = match m.as_str() {
        "大前年" => -3,
        "前年" => -2,
        "去年" => -1,
        "今年" => 0,
        "明年" => 1,
        "后年" => 2,
        "大后年" => 3,
        _ => return,
    };
    tp.set(Field::Year, env.base.year() + delta);
}

fn bind_month(text: &str, tp: &mut TimePoint) {
    if let Some(caps) = regex!(r"(\d{1,2})月").captures(text) {
        if let Ok(month) = caps[1].parse::<i32>() {
            tp.set(Field::Month, month);
        }
    }
}

fn bind_day(text: &str, tp: &mut TimePoint) {
    if let Some(caps) = regex!(r"(\d{1,2})[日号]").captures(text) {
        if let Ok(day) = caps[1].parse::<i32>() {
            tp.set(Field::Day, day);
        }
    }
}

fn bind_clock(text: &str, tp: &mut TimePoint) {
    if let Some(caps) = regex!(r"(\d{1,2})[点时]").captures(text) {
        if let Ok(hour) = caps[1].parse::<i32>() {
            tp.set(Field::Hour, adjust_for_day_period(text, hour));
        }
        if let Some(caps) = regex!(r"[点时](\d{1,2})分?").captures(text) {
            if let Ok(minute) = caps[1].parse::<i32>() {
                tp.set(Field::Minute, minute);
            }
        } else if regex!("[点时]半").is_match(text) {
            tp.set(Field::Minute, 30);
        } else if let Some(caps) = regex!("[点时]([13])刻").captures(text) {
            tp.set(Field::Minute, if &caps[1] == "1" { 15 } else { 45 });
        }
    }

    if let Some(caps) = regex!(r"(\d{1,2}):(\d{1,2})(?::(\d{1,2}))?").captures(text) {
        let (Ok(hour), Ok(minute)) = (caps[1].parse::<i32>(), caps[2].parse::<i32>()) else { return };
        tp.set(Field::Hour, adjust_for_day_period(text, hour));
        tp.set(Field::Minute, minute);
        if let Some(second) = caps.get(3) {
            if let Ok(second) = second.as_str().parse::<i32>() {
                tp.set(Field::Second, second);
            }
        }
    }
}

/// Shift a 1-11 o'clock reading into the right half of the day when the
/// expression names a day period (下午3点 is 15:00, 晚上12点 is midnight).
fn adjust_for_day_period(text: &str, hour: i32) -> i32 {
    if regex!("凌晨|清晨|早晨|早上|上午").is_match(text) {
        if hour == 12 { 0 } else { hour }
    } else if regex!("中午|午间").is_match(text) {
        if (0..=10).contains(&hour) { hour + 12 } else { hour }
    } else if regex!("下午|午后").is_match(text) {
        if (1..=11).contains(&hour) { hour + 12 } else { hour }
    } else if regex!("傍晚|晚上|晚间|夜里|夜间|深夜").is_match(text) {
        if (1..=11).contains(&hour) {
            hour + 12
        } else if hour == 12 {
            0
        } else {
            hour
        }
    } else {
        hour
    }
}

fn bind_minute(text: &str, tp: &mut TimePoint) {
    if let Some(caps) = regex!(r"(\d{1,2})分").captures(text) {
        if let Ok(minute) = caps[1].parse::<i32>() {
            tp.set(Field::Minute, minute);
        }
    }
}

fn bind_second(text: &str, tp: &mut TimePoint) {
    if let Some(caps) = regex!(r"(\d{1,2})秒").captures(text) {
        if let Ok(second) = caps[1].parse::<i32>() {
            tp.set(Field::Second, second);
        }
    }
}

/// N-unit offsets from the base: 3天前, 2个月后, 1星期后, 5分钟前 ...
///
/// Multiple offsets in one expression accumulate (两天后 + 3小时前 is rare but
/// well-defined). The result binds every field from the year down to the
/// finest shifted grain; finer fields stay unbound and take unit defaults.
fn bind_offset(text: &str, env: &BindEnv, tp: &mut TimePoint) {
    let re = regex!(r"(\d+)(?:个)?(秒|分钟|小时|钟头|天|日|周|星期|礼拜|月|年)[以之]?([前后])");
    let mut dt = env.base;
    let mut finest: Option<Field> = None;

    for caps in re.captures_iter(text) {
        let Ok(n) = caps[1].parse::<i32>() else { continue };
        let signed = if &caps[3] == "前" { -n } else { n };
        let (field, amount) = match &caps[2] {
            "秒" => (Field::Second, signed),
            "分钟" => (Field::Minute, signed),
            "小时" | "钟头" => (Field::Hour, signed),
            "天" | "日" => (Field::Day, signed),
            "周" | "星期" | "礼拜" => (Field::Day, signed * 7),
            "月" => (Field::Month, signed),
            "年" => (Field::Year, signed),
            _ => continue,
        };
        dt = shift_datetime_by_field(dt, amount, field);
        finest = Some(finest.map_or(field, |f| f.max(field)));
    }

    if let Some(finest) = finest {
        bind_down_to(tp, dt, finest);
    }
}

fn bind_relative_day(text: &str, env: &BindEnv, tp: &mut TimePoint) {
    let Some(m) = regex!("大前天|大后天|前天|昨天|今天|今日|明天|明日|后天").find(text) else { return };
    let delta = match m.as_str() {
        "大前天" => -3,
        "前天" => -2,
        "昨天" => -1,
        "今天" | "今日" => 0,
        "明天" | "明日" => 1,
        "后天" => 2,
        "大后天" => 3,
        _ => return,
    };
    tp.set_date(env.base.date() + Duration::days(delta));
}

/// Week-relative weekdays: 上周3, 下星期5, 本周日, or a bare 周5.
///
/// An explicit prefix anchors the week; a bare weekday is ambiguous and is
/// disambiguated by the future-preference policy: nearest occurrence on the
/// future side of the base when preferred, nearest on the past side
/// otherwise. The base's own weekday resolves to the base day itself.
fn bind_weekday(text: &str, env: &BindEnv, tp: &mut TimePoint) {
    let Some(caps) = regex!("(上上|下下|上|下|这个?|本)?(?:周|星期|礼拜)([1-7日天])").captures(text) else {
        return;
    };

    let week_offset = match caps.get(1).map(|m| m.as_str()) {
        Some("上上") => Some(-2),
        Some("上") => Some(-1),
        Some("下下") => Some(2),
        Some("下") => Some(1),
        Some("这") | Some("这个") | Some("本") => Some(0),
        Some(_) => None,
        None => None,
    };
    let dow = match &caps[2] {
        "日" | "天" => 7,
        digit => {
            let Ok(d) = digit.parse::<i64>() else { return };
            d
        }
    };

    let base_date = env.base.date();
    let days_from_monday = base_date.weekday().num_days_from_monday() as i64;
    let in_base_week = base_date - Duration::days(days_from_monday) + Duration::days(dow - 1);

    let date = match week_offset {
        Some(weeks) => in_base_week + Duration::days(7 * weeks as i64),
        None if env.prefer_future && in_base_week < base_date => in_base_week + Duration::days(7),
        None if !env.prefer_future && in_base_week > base_date => in_base_week - Duration::days(7),
        None => in_base_week,
    };
    tp.set_date(date);
}

fn bind_quarter(text: &str, tp: &mut TimePoint) {
    if let Some(caps) = regex!("第?([1-4])季度").captures(text) {
        if let Ok(quarter) = caps[1].parse::<i32>() {
            tp.set(Field::Month, (quarter - 1) * 3 + 1);
        }
    }
}

fn bind_festival(text: &str, tp: &mut TimePoint) {
    for (name, month, day) in FESTIVALS {
        if text.contains(name) {
            tp.set(Field::Month, month);
            tp.set(Field::Day, day);
            return;
        }
    }
}

/// 现在 / 此刻 / 当前 / 目前, and the bare 今 of 至今: the base instant
/// itself, all six fields bound.
fn bind_now(text: &str, env: &BindEnv, tp: &mut TimePoint) {
    if text == "今" || regex!("现在|此刻|当前|目前").is_match(text) {
        tp.merge_bound(&TimePoint::from_datetime(env.base));
    }
}

fn bind_down_to(tp: &mut TimePoint, dt: NaiveDateTime, finest: Field) {
    let full = TimePoint::from_datetime(dt);
    for field in Field::ALL {
        if field > finest {
            break;
        }
        if let Some(value) = full.get(field) {
            tp.set(field, value);
        }
    }
}
