use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike};

/// Calendar fields a temporal expression can bind, coarsest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) enum Field {
    Year = 0,
    Month = 1,
    Day = 2,
    Hour = 3,
    Minute = 4,
    Second = 5,
}

impl Field {
    pub const ALL: [Field; 6] = [Field::Year, Field::Month, Field::Day, Field::Hour, Field::Minute, Field::Second];

    pub fn mask(self) -> FieldMask {
        FieldMask::from_bits_truncate(1 << self as u8)
    }

    /// The next coarser field, if any (`Month` for `Day`, `Year` for `Month`, ...).
    pub fn coarser(self) -> Option<Field> {
        match self {
            Field::Year => None,
            Field::Month => Some(Field::Year),
            Field::Day => Some(Field::Month),
            Field::Hour => Some(Field::Day),
            Field::Minute => Some(Field::Hour),
            Field::Second => Some(Field::Minute),
        }
    }
}

bitflags::bitflags! {
    /// Set of calendar fields bound on a [`TimePoint`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub(crate) struct FieldMask: u8 {
        const YEAR = 1 << 0;
        const MONTH = 1 << 1;
        const DAY = 1 << 2;
        const HOUR = 1 << 3;
        const MINUTE = 1 << 4;
        const SECOND = 1 << 5;
    }
}

/// A partially bound calendar record.
///
/// Each field is either bound to a literal value or unbound. One `TimePoint`
/// is folded through the resolution of all merged expressions in a parse
/// call, so an expression missing explicit fields can inherit them from the
/// most recent prior expression before falling back to the base time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct TimePoint {
    units: [Option<i32>; 6],
}

impl TimePoint {
    /// A point with all six fields bound from `dt`.
    pub fn from_datetime(dt: NaiveDateTime) -> Self {
        let mut tp = TimePoint::default();
        tp.set(Field::Year, dt.year());
        tp.set(Field::Month, dt.month() as i32);
        tp.set(Field::Day, dt.day() as i32);
        tp.set(Field::Hour, dt.hour() as i32);
        tp.set(Field::Minute, dt.minute() as i32);
        tp.set(Field::Second, dt.second() as i32);
        tp
    }

    pub fn get(&self, field: Field) -> Option<i32> {
        self.units[field as usize]
    }

    pub fn set(&mut self, field: Field, value: i32) {
        self.units[field as usize] = Some(value);
    }

    pub fn is_empty(&self) -> bool {
        self.units.iter().all(Option::is_none)
    }

    pub fn bound(&self) -> FieldMask {
        Field::ALL
            .iter()
            .filter(|f| self.get(**f).is_some())
            .fold(FieldMask::empty(), |mask, f| mask | f.mask())
    }

    /// The coarsest bound field (e.g. `Month` when only month and day are set).
    pub fn coarsest_bound(&self) -> Option<Field> {
        Field::ALL.into_iter().find(|f| self.get(*f).is_some())
    }

    /// The finest bound field (e.g. `Day` when only month and day are set).
    pub fn finest_bound(&self) -> Option<Field> {
        Field::ALL.into_iter().rev().find(|f| self.get(*f).is_some())
    }

    /// Overwrite this point with every field bound on `other`; fields `other`
    /// leaves unbound are kept as-is.
    pub fn merge_bound(&mut self, other: &TimePoint) {
        for field in Field::ALL {
            if let Some(value) = other.get(field) {
                self.set(field, value);
            }
        }
    }

    /// Bind year, month and day from a calendar date.
    pub fn set_date(&mut self, date: NaiveDate) {
        self.set(Field::Year, date.year());
        self.set(Field::Month, date.month() as i32);
        self.set(Field::Day, date.day() as i32);
    }

    /// Compose a fully populated point into a datetime.
    ///
    /// Every field must be bound; out-of-range values (month 13, day 32, ...)
    /// yield `None` rather than a panic.
    pub fn to_datetime(&self) -> Option<NaiveDateTime> {
        let year = self.get(Field::Year)?;
        let month = u32::try_from(self.get(Field::Month)?).ok()?;
        let day = u32::try_from(self.get(Field::Day)?).ok()?;
        let hour = u32::try_from(self.get(Field::Hour)?).ok()?;
        let minute = u32::try_from(self.get(Field::Minute)?).ok()?;
        let second = u32::try_from(self.get(Field::Second)?).ok()?;

        let date = NaiveDate::from_ymd_opt(year, month, day)?;
        let time = NaiveTime::from_hms_opt(hour, minute, second)?;
        Some(NaiveDateTime::new(date, time))
    }
}

/// Shift a datetime by `amount` units of `field`, clamping the day-of-month
/// on month and year shifts (Jan 31 + 1 month = Feb 29 in a leap year).
pub(crate) fn shift_datetime_by_field(dt: NaiveDateTime, amount: i32, field: Field) -> NaiveDateTime {
    match field {
        Field::Second => dt + Duration::seconds(amount as i64),
        Field::Minute => dt + Duration::minutes(amount as i64),
        Field::Hour => dt + Duration::hours(amount as i64),
        Field::Day => dt + Duration::days(amount as i64),
        Field::Month => add_months(dt, amount),
        Field::Year => add_months(dt, amount * 12),
    }
}

pub(crate) fn add_months(dt: NaiveDateTime, months: i32) -> NaiveDateTime {
    let base_year = dt.date().year();
    let base_month = dt.date().month() as i32;
    let zero_based = base_month - 1 + months;
    let year = base_year + zero_based.div_euclid(12);
    let month_zero = zero_based.rem_euclid(12);
    let month = (month_zero + 1) as u32;
    let day = dt.date().day().min(days_in_month(year, month));
    let date = NaiveDate::from_ymd_opt(year, month, day).unwrap_or_else(|| dt.date());
    NaiveDateTime::new(date, dt.time())
}

fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
    let first_next = NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .unwrap_or_else(|| NaiveDate::from_ymd_opt(year, month, 1).unwrap());
    let last_day = first_next - Duration::days(1);
    last_day.day()
}
