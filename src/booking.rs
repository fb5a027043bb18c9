// Booking records, trip requests and the signed-in session

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::availability::{AvailabilityChecker, AvailabilityError, CalendarDay};
use crate::fleet::Bus;
use crate::pricing::PriceBreakdown;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BookingError {
    #[error("Login required to book a bus")]
    LoginRequired,

    #[error("Only customers can book buses")]
    Forbidden,

    #[error("Both start and end dates must be selected")]
    DatesNotSelected,

    #[error("Missing {0} location")]
    MissingLocation(&'static str),

    #[error("Invalid number of passengers {requested}, allowed 1-{capacity}")]
    InvalidPassengerCount { requested: u32, capacity: u32 },

    #[error("Trip starting {start} is in the past (today is {today})")]
    DateInPast { start: NaiveDate, today: NaiveDate },

    #[error("Bus {0} is not approved for booking")]
    NotApproved(String),

    #[error("Some days between {start} and {end} are not available")]
    UnavailableRange { start: NaiveDate, end: NaiveDate },

    #[error("Unknown bus: {0}")]
    UnknownBus(String),

    #[error("Unknown booking: {0}")]
    UnknownBooking(String),

    #[error("Invalid payment details: {0}")]
    InvalidPayment(String),

    #[error("Cannot move booking from {from:?} to {to:?}")]
    InvalidTransition {
        from: BookingStatus,
        to: BookingStatus,
    },

    #[error(transparent)]
    Availability(#[from] AvailabilityError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserType {
    Customer,
    Owner,
    Admin,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub name: String,
    pub email: String,
    pub user_type: UserType,
}

/// Who is acting. Passed explicitly to every call that cares.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    user: Option<UserProfile>,
}

impl Session {
    pub fn anonymous() -> Self {
        Self { user: None }
    }

    pub fn signed_in(user: UserProfile) -> Self {
        Self { user: Some(user) }
    }

    pub fn user(&self) -> Option<&UserProfile> {
        self.user.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    pub fn sign_out(&mut self) {
        self.user = None;
    }

    /// The signed-in customer, or why there isn't one.
    pub fn require_customer(&self) -> Result<&UserProfile, BookingError> {
        match &self.user {
            None => Err(BookingError::LoginRequired),
            Some(user) if user.user_type == UserType::Customer => Ok(user),
            Some(_) => Err(BookingError::Forbidden),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TripRequest {
    pub start_date: NaiveDateTime,
    pub end_date: NaiveDateTime,
    pub passenger_count: u32,
}

/// Booking form contents before validation. Any field may still be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookingDraft {
    pub bus_id: String,
    pub start: Option<NaiveDateTime>,
    pub end: Option<NaiveDateTime>,
    pub pickup_location: String,
    pub drop_location: String,
    pub passenger_count: u32,
}

impl BookingDraft {
    /// Checks the draft against `bus` as of `today`. Trips may start today
    /// but not earlier.
    pub fn validate<C>(
        &self,
        bus: &Bus,
        checker: &C,
        today: NaiveDate,
    ) -> Result<TripRequest, BookingError>
    where
        C: AvailabilityChecker + ?Sized,
    {
        let (start, end) = match (self.start, self.end) {
            (Some(start), Some(end)) => (start, end),
            _ => return Err(BookingError::DatesNotSelected),
        };

        let (first_day, last_day) = (start.calendar_day(), end.calendar_day());
        if first_day < today {
            return Err(BookingError::DateInPast {
                start: first_day,
                today,
            });
        }

        if !checker.is_range_available(first_day, last_day)? {
            return Err(BookingError::UnavailableRange {
                start: first_day,
                end: last_day,
            });
        }

        if self.pickup_location.trim().is_empty() {
            return Err(BookingError::MissingLocation("pickup"));
        }
        if self.drop_location.trim().is_empty() {
            return Err(BookingError::MissingLocation("drop"));
        }

        if self.passenger_count == 0 || self.passenger_count > bus.capacity {
            return Err(BookingError::InvalidPassengerCount {
                requested: self.passenger_count,
                capacity: bus.capacity,
            });
        }

        Ok(TripRequest {
            start_date: start,
            end_date: end,
            passenger_count: self.passenger_count,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Completed,
    Cancelled,
}

impl BookingStatus {
    pub fn is_active(&self) -> bool {
        matches!(self, BookingStatus::Pending | BookingStatus::Confirmed)
    }

    pub fn can_transition_to(&self, next: BookingStatus) -> bool {
        use BookingStatus::*;
        matches!(
            (self, next),
            (Pending, Confirmed) | (Pending, Cancelled) | (Confirmed, Cancelled) | (Confirmed, Completed)
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Booking {
    pub id: String,
    pub bus_id: String,
    pub customer_id: String,
    pub start_date: NaiveDateTime,
    pub end_date: NaiveDateTime,
    pub pickup_location: String,
    pub drop_location: String,
    pub number_of_passengers: u32,
    pub total_amount: i64,
    pub advance_amount: i64,
    pub remaining_amount: i64,
    pub status: BookingStatus,
    pub created_at: NaiveDateTime,
}

impl Booking {
    pub fn new(
        id: String,
        bus_id: String,
        customer_id: String,
        draft: &BookingDraft,
        trip: TripRequest,
        price: &PriceBreakdown,
        created_at: NaiveDateTime,
    ) -> Self {
        Self {
            id,
            bus_id,
            customer_id,
            start_date: trip.start_date,
            end_date: trip.end_date,
            pickup_location: draft.pickup_location.trim().to_string(),
            drop_location: draft.drop_location.trim().to_string(),
            number_of_passengers: trip.passenger_count,
            total_amount: price.total_amount,
            advance_amount: price.advance_amount,
            remaining_amount: price.remaining_amount,
            status: BookingStatus::Pending,
            created_at,
        }
    }

    pub fn transition(&mut self, next: BookingStatus) -> Result<(), BookingError> {
        if !self.status.can_transition_to(next) {
            return Err(BookingError::InvalidTransition {
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        Ok(())
    }
}

/// Dashboard grouping of a customer's or owner's bookings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingTab {
    #[default]
    Upcoming,
    Ongoing,
    Past,
}

impl BookingTab {
    pub fn matches(&self, booking: &Booking, today: NaiveDate) -> bool {
        let start = booking.start_date.date();
        let end = booking.end_date.date();
        match self {
            BookingTab::Upcoming => booking.status.is_active() && start > today,
            BookingTab::Ongoing => booking.status.is_active() && start <= today && end >= today,
            BookingTab::Past => !booking.status.is_active() || end < today,
        }
    }

    pub fn filter<'a, I>(&self, bookings: I, today: NaiveDate) -> Vec<&'a Booking>
    where
        I: IntoIterator<Item = &'a Booking>,
    {
        bookings
            .into_iter()
            .filter(|booking| self.matches(booking, today))
            .collect()
    }
}
