// Incremental start/end date picking for a trip

use chrono::NaiveDate;
use tracing::debug;

use crate::availability::{AvailabilityChecker, CalendarDay};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DateSelection {
    #[default]
    NoneSelected,
    StartSelected {
        start: NaiveDate,
    },
    RangeSelected {
        start: NaiveDate,
        end: NaiveDate,
    },
}

/// What a single pick did to the selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionOutcome {
    Started,
    Completed,
    Restarted,
    /// The candidate end left an uncovered day in the range. Selection unchanged.
    UnavailableRange,
    /// The day is before today and cannot be picked. Selection unchanged.
    PastDate,
}

impl DateSelection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&self) -> Option<NaiveDate> {
        match self {
            Self::NoneSelected => None,
            Self::StartSelected { start } | Self::RangeSelected { start, .. } => Some(*start),
        }
    }

    pub fn end(&self) -> Option<NaiveDate> {
        match self {
            Self::RangeSelected { end, .. } => Some(*end),
            _ => None,
        }
    }

    /// `(start, end)` once a full range has been picked.
    pub fn range(&self) -> Option<(NaiveDate, NaiveDate)> {
        match self {
            Self::RangeSelected { start, end } => Some((*start, *end)),
            _ => None,
        }
    }

    pub fn is_complete(&self) -> bool {
        matches!(self, Self::RangeSelected { .. })
    }

    pub fn reset(&mut self) {
        *self = Self::NoneSelected;
    }

    pub fn pick<C>(
        &mut self,
        date: impl CalendarDay,
        today: NaiveDate,
        checker: &C,
    ) -> SelectionOutcome
    where
        C: AvailabilityChecker + ?Sized,
    {
        let date = date.calendar_day();
        if date < today {
            debug!(%date, %today, "Ignoring pick of a past day");
            return SelectionOutcome::PastDate;
        }

        match *self {
            Self::NoneSelected => {
                *self = Self::StartSelected { start: date };
                SelectionOutcome::Started
            }
            Self::StartSelected { start } if date >= start => {
                match checker.is_range_available(start, date) {
                    Ok(true) => {
                        *self = Self::RangeSelected { start, end: date };
                        SelectionOutcome::Completed
                    }
                    Ok(false) => {
                        debug!(%start, end = %date, "Range has uncovered days, keeping start");
                        SelectionOutcome::UnavailableRange
                    }
                    // unreachable in practice, the guard ensures date >= start
                    Err(_) => SelectionOutcome::UnavailableRange,
                }
            }
            Self::StartSelected { .. } | Self::RangeSelected { .. } => {
                *self = Self::StartSelected { start: date };
                SelectionOutcome::Restarted
            }
        }
    }
}
