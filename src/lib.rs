// Core booking logic for the bus rental marketplace

pub mod availability;
pub mod booking;
pub mod config;
pub mod fleet;
pub mod format;
pub mod pricing;
pub mod selection;
pub mod service;

// Re-export key types for convenience
pub use availability::{
    is_date_available, is_range_available, AvailabilityChecker, AvailabilityError,
    AvailabilitySet, CalendarDay, DateInterval, LinearScan, MergedAvailability,
};
pub use booking::{
    Booking, BookingDraft, BookingError, BookingStatus, BookingTab, Session, TripRequest,
    UserProfile, UserType,
};
pub use config::{BookingConfig, ConfigError, DEFAULT_ADVANCE_AMOUNT};
pub use fleet::{Bus, BusCatalog, BusType, CatalogError, SearchCriteria, SortOption};
pub use format::{format_currency, format_date, format_short_currency};
pub use pricing::{compute_price, trip_days, PriceBreakdown, PricingCalculator};
pub use selection::{DateSelection, SelectionOutcome};
pub use service::{
    BookingService, Clock, FixedClock, InMemoryBookingService, PaymentMethod, PaymentReceipt,
    ServiceStatsReport, SystemClock,
};
