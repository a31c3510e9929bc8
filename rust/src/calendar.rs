//! Working-time calendars and the boundary between offsets and dates.
//!
//! The engine schedules in integer working-unit offsets. Callers own a
//! calendar value and use it here, after the computation, to turn offsets into
//! dates (and dated anchors into offsets before it). Several calendars can
//! coexist; none is global.

use chrono::{Datelike, Days, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Debug;
use thiserror::Error;

use crate::models::Schedule;

/// Working-time arithmetic consumed at the schedule boundary.
pub trait CalendarMapper {
    type Instant: Copy + Ord + Debug;

    /// Move `units` working units from `start` (backwards when negative).
    /// A non-working `start` is first moved forward to the next working one.
    fn add_working_units(&self, start: Self::Instant, units: i64) -> Self::Instant;

    /// Working units in `[a, b)`, negated when `b` precedes `a`.
    fn units_between(&self, a: Self::Instant, b: Self::Instant) -> i64;

    fn is_working_instant(&self, instant: Self::Instant) -> bool;
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CalendarError {
    #[error("Calendar has no working weekdays")]
    NoWorkingDays,
}

/// Day-granular calendar: a set of working weekdays minus holidays.
///
/// Deserialization enforces the same rule as [`WorkingCalendar::new`]: at
/// least one weekday must be a working day.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "CalendarFields")]
pub struct WorkingCalendar {
    /// Indexed by days from Monday.
    working_days: [bool; 7],
    holidays: BTreeSet<NaiveDate>,
}

impl WorkingCalendar {
    pub fn new<I>(working_days: &[Weekday], holidays: I) -> Result<Self, CalendarError>
    where
        I: IntoIterator<Item = NaiveDate>,
    {
        let mut mask = [false; 7];
        for day in working_days {
            mask[day.num_days_from_monday() as usize] = true;
        }
        Self::from_mask(mask, holidays.into_iter().collect())
    }

    fn from_mask(
        working_days: [bool; 7],
        holidays: BTreeSet<NaiveDate>,
    ) -> Result<Self, CalendarError> {
        if !working_days.iter().any(|&w| w) {
            return Err(CalendarError::NoWorkingDays);
        }
        Ok(Self {
            working_days,
            holidays,
        })
    }

    /// Monday to Friday, no holidays.
    pub fn weekdays() -> Self {
        Self {
            working_days: [true, true, true, true, true, false, false],
            holidays: BTreeSet::new(),
        }
    }

    /// Every day is a working day.
    pub fn seven_day() -> Self {
        Self {
            working_days: [true; 7],
            holidays: BTreeSet::new(),
        }
    }

    pub fn add_holiday(&mut self, date: NaiveDate) {
        self.holidays.insert(date);
    }

    pub fn holidays(&self) -> impl Iterator<Item = &NaiveDate> {
        self.holidays.iter()
    }

    #[inline]
    fn is_working_weekday(&self, date: NaiveDate) -> bool {
        self.working_days[date.weekday().num_days_from_monday() as usize]
    }

    fn next_working(&self, mut date: NaiveDate) -> NaiveDate {
        while !self.is_working_instant(date) {
            date = date + Days::new(1);
        }
        date
    }

    fn prev_working(&self, mut date: NaiveDate) -> NaiveDate {
        while !self.is_working_instant(date) {
            date = date - Days::new(1);
        }
        date
    }

    /// Working days in `[from, to)`; `from <= to`.
    fn count_working(&self, from: NaiveDate, to: NaiveDate) -> i64 {
        let days = (to - from).num_days();
        let weeks = days / 7;
        let per_week = self.working_days.iter().filter(|&&w| w).count() as i64;

        let mut count = weeks * per_week;
        let mut date = from + Days::new((weeks * 7) as u64);
        while date < to {
            if self.is_working_weekday(date) {
                count += 1;
            }
            date = date + Days::new(1);
        }

        let holidays = self
            .holidays
            .range(from..to)
            .filter(|&&h| self.is_working_weekday(h))
            .count() as i64;
        count - holidays
    }
}

/// Serialized form of [`WorkingCalendar`], checked before use.
#[derive(Deserialize)]
struct CalendarFields {
    working_days: [bool; 7],
    #[serde(default)]
    holidays: BTreeSet<NaiveDate>,
}

impl TryFrom<CalendarFields> for WorkingCalendar {
    type Error = CalendarError;

    fn try_from(fields: CalendarFields) -> Result<Self, CalendarError> {
        Self::from_mask(fields.working_days, fields.holidays)
    }
}

impl Default for WorkingCalendar {
    fn default() -> Self {
        Self::weekdays()
    }
}

impl CalendarMapper for WorkingCalendar {
    type Instant = NaiveDate;

    fn add_working_units(&self, start: NaiveDate, units: i64) -> NaiveDate {
        let mut date = self.next_working(start);
        if units >= 0 {
            for _ in 0..units {
                date = self.next_working(date + Days::new(1));
            }
        } else {
            for _ in 0..units.unsigned_abs() {
                date = self.prev_working(date - Days::new(1));
            }
        }
        date
    }

    fn units_between(&self, a: NaiveDate, b: NaiveDate) -> i64 {
        if a <= b {
            self.count_working(a, b)
        } else {
            -self.count_working(b, a)
        }
    }

    fn is_working_instant(&self, instant: NaiveDate) -> bool {
        self.is_working_weekday(instant) && !self.holidays.contains(&instant)
    }
}

/// A [`crate::ScheduleResult`] expressed in calendar instants.
///
/// Finish instants are the last working instant the task occupies; a
/// milestone finishes on the instant it starts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatedResult<I> {
    pub earliest_start: I,
    pub earliest_finish: I,
    pub latest_start: I,
    pub latest_finish: I,
}

fn finish_instant<C: CalendarMapper>(
    calendar: &C,
    project_start: C::Instant,
    start: i64,
    finish: i64,
) -> C::Instant {
    if finish > start {
        calendar.add_working_units(project_start, finish - 1)
    } else {
        calendar.add_working_units(project_start, finish)
    }
}

/// Convert every result of `schedule` to instants of `calendar`, counting
/// offsets from `project_start`.
pub fn dated_results<C: CalendarMapper>(
    schedule: &Schedule,
    calendar: &C,
    project_start: C::Instant,
) -> BTreeMap<String, DatedResult<C::Instant>> {
    schedule
        .results
        .iter()
        .map(|(id, r)| {
            let dated = DatedResult {
                earliest_start: calendar.add_working_units(project_start, r.earliest_start),
                earliest_finish: finish_instant(
                    calendar,
                    project_start,
                    r.earliest_start,
                    r.earliest_finish,
                ),
                latest_start: calendar.add_working_units(project_start, r.latest_start),
                latest_finish: finish_instant(
                    calendar,
                    project_start,
                    r.latest_start,
                    r.latest_finish,
                ),
            };
            (id.clone(), dated)
        })
        .collect()
}

/// Start offset of a dated anchor relative to `project_start`.
pub fn anchor_offset<C: CalendarMapper>(
    calendar: &C,
    project_start: C::Instant,
    instant: C::Instant,
) -> i64 {
    calendar.units_between(project_start, instant)
}

/// Finish offset for a task that must be done by the end of `instant`.
pub fn deadline_offset<C: CalendarMapper>(
    calendar: &C,
    project_start: C::Instant,
    instant: C::Instant,
) -> i64 {
    let offset = calendar.units_between(project_start, instant);
    if calendar.is_working_instant(instant) {
        offset + 1
    } else {
        offset
    }
}
