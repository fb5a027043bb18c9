// Day-level availability of a bus against its open date intervals

use chrono::{DateTime, Days, NaiveDate, NaiveDateTime, TimeZone};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AvailabilityError {
    #[error("Invalid range: end {end} is before start {start}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },

    #[error("Invalid interval: end {end} is before start {start}")]
    InvalidInterval { start: NaiveDate, end: NaiveDate },
}

/// Anything that can be reduced to a calendar day. Time-of-day is discarded.
pub trait CalendarDay {
    fn calendar_day(&self) -> NaiveDate;
}

impl CalendarDay for NaiveDate {
    fn calendar_day(&self) -> NaiveDate {
        *self
    }
}

impl CalendarDay for NaiveDateTime {
    fn calendar_day(&self) -> NaiveDate {
        self.date()
    }
}

impl<Tz: TimeZone> CalendarDay for DateTime<Tz> {
    fn calendar_day(&self) -> NaiveDate {
        self.date_naive()
    }
}

/// A closed span of calendar days, `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawInterval")]
pub struct DateInterval {
    start: NaiveDate,
    end: NaiveDate,
}

#[derive(Deserialize)]
struct RawInterval {
    start: NaiveDate,
    end: NaiveDate,
}

impl TryFrom<RawInterval> for DateInterval {
    type Error = AvailabilityError;

    fn try_from(raw: RawInterval) -> Result<Self, Self::Error> {
        DateInterval::new(raw.start, raw.end)
    }
}

impl DateInterval {
    pub fn new(start: impl CalendarDay, end: impl CalendarDay) -> Result<Self, AvailabilityError> {
        let (start, end) = (start.calendar_day(), end.calendar_day());
        if end < start {
            return Err(AvailabilityError::InvalidInterval { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn contains(&self, day: NaiveDate) -> bool {
        self.start <= day && day <= self.end
    }

    /// Inclusive number of calendar days covered.
    pub fn day_count(&self) -> u64 {
        (self.end - self.start).num_days() as u64 + 1
    }

    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let end = self.end;
        self.start.iter_days().take_while(move |day| *day <= end)
    }
}

/// The availability intervals of one resource. Order is irrelevant and
/// intervals may overlap or leave gaps.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AvailabilitySet {
    intervals: Vec<DateInterval>,
}

impl From<Vec<DateInterval>> for AvailabilitySet {
    fn from(intervals: Vec<DateInterval>) -> Self {
        Self { intervals }
    }
}

impl FromIterator<DateInterval> for AvailabilitySet {
    fn from_iter<I: IntoIterator<Item = DateInterval>>(iter: I) -> Self {
        Self {
            intervals: iter.into_iter().collect(),
        }
    }
}

impl AvailabilitySet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, interval: DateInterval) {
        self.intervals.push(interval);
    }

    pub fn intervals(&self) -> &[DateInterval] {
        &self.intervals
    }

    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    pub fn scan(&self) -> LinearScan<'_> {
        LinearScan { set: self }
    }

    pub fn merged(&self) -> MergedAvailability {
        MergedAvailability::from(self)
    }

    /// Days in `[start, end]` not covered by any interval.
    pub fn uncovered_days(
        &self,
        start: impl CalendarDay,
        end: impl CalendarDay,
    ) -> Result<Vec<NaiveDate>, AvailabilityError> {
        let (start, end) = (start.calendar_day(), end.calendar_day());
        let requested = DateInterval::new(start, end)
            .map_err(|_| AvailabilityError::InvalidRange { start, end })?;
        let scan = self.scan();
        Ok(requested
            .days()
            .filter(|day| !scan.is_date_available(*day))
            .collect())
    }
}

pub trait AvailabilityChecker {
    /// True iff the day of `date` lies inside at least one interval.
    fn is_date_available(&self, date: NaiveDate) -> bool;

    /// True iff every day in `[start, end]` is covered. Fails fast with
    /// `InvalidRange` when `end < start`.
    fn is_range_available(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<bool, AvailabilityError> {
        if end < start {
            return Err(AvailabilityError::InvalidRange { start, end });
        }
        let mut current = start;
        while current <= end {
            if !self.is_date_available(current) {
                return Ok(false);
            }
            current = match current.checked_add_days(Days::new(1)) {
                Some(next) => next,
                None => break,
            };
        }
        Ok(true)
    }
}

/// Checks every interval for every day. Fine for short trips over a handful
/// of intervals; cost grows with days × intervals.
#[derive(Debug, Clone, Copy)]
pub struct LinearScan<'a> {
    set: &'a AvailabilitySet,
}

impl AvailabilityChecker for LinearScan<'_> {
    fn is_date_available(&self, date: NaiveDate) -> bool {
        self.set.intervals.iter().any(|interval| interval.contains(date))
    }
}

/// Sorted, non-overlapping, non-adjacent intervals built once from an
/// `AvailabilitySet`. Lookups are a binary search.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergedAvailability {
    intervals: Vec<DateInterval>,
}

impl From<&AvailabilitySet> for MergedAvailability {
    fn from(set: &AvailabilitySet) -> Self {
        let mut sorted = set.intervals.clone();
        sorted.sort_by_key(|interval| interval.start);

        let mut merged: Vec<DateInterval> = Vec::with_capacity(sorted.len());
        for interval in sorted {
            if let Some(last) = merged.last_mut() {
                // Touching intervals (end + 1 day == next start) merge too,
                // since coverage is judged per day.
                let touches = last
                    .end
                    .checked_add_days(Days::new(1))
                    .map_or(true, |next| interval.start <= next);
                if touches {
                    if interval.end > last.end {
                        last.end = interval.end;
                    }
                    continue;
                }
            }
            merged.push(interval);
        }

        Self { intervals: merged }
    }
}

impl MergedAvailability {
    pub fn intervals(&self) -> &[DateInterval] {
        &self.intervals
    }

    fn covering(&self, day: NaiveDate) -> Option<&DateInterval> {
        // First interval starting after `day`; the candidate is the one before it.
        let idx = self.intervals.partition_point(|interval| interval.start <= day);
        idx.checked_sub(1)
            .map(|i| &self.intervals[i])
            .filter(|interval| interval.end >= day)
    }
}

impl AvailabilityChecker for MergedAvailability {
    fn is_date_available(&self, date: NaiveDate) -> bool {
        self.covering(date).is_some()
    }

    fn is_range_available(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<bool, AvailabilityError> {
        if end < start {
            return Err(AvailabilityError::InvalidRange { start, end });
        }
        Ok(self
            .covering(start)
            .map_or(false, |interval| interval.end >= end))
    }
}

/// Single-day check over any set of intervals, time-of-day ignored.
pub fn is_date_available(date: impl CalendarDay, availability: &AvailabilitySet) -> bool {
    availability.scan().is_date_available(date.calendar_day())
}

/// Day-by-day range check over any set of intervals, time-of-day ignored.
pub fn is_range_available(
    start: impl CalendarDay,
    end: impl CalendarDay,
    availability: &AvailabilitySet,
) -> Result<bool, AvailabilityError> {
    availability
        .scan()
        .is_range_available(start.calendar_day(), end.calendar_day())
}
