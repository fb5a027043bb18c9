// Mocked booking API: every call waits for a configured latency and succeeds
// once its input is valid. Nothing leaves the process.

use async_trait::async_trait;
use chrono::{Local, NaiveDate, NaiveDateTime};
use dashmap::DashMap;
use parking_lot::RwLock;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::time::sleep;
use tracing::{info, warn};

use crate::availability::CalendarDay;
use crate::booking::{Booking, BookingDraft, BookingError, BookingStatus, Session};
use crate::config::{BookingConfig, ConfigError};
use crate::fleet::BusCatalog;
use crate::pricing::{PriceBreakdown, PricingCalculator};

/// Source of the current local time. Booking rules compare trip dates
/// against `today`.
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;

    fn today(&self) -> NaiveDate {
        self.now().date()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// Always reports the same instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum PaymentMethod {
    Card {
        holder: String,
        number: String,
        expiry: String,
        cvv: String,
    },
    Upi {
        id: String,
    },
}

// Card details must never end up in logs
impl std::fmt::Debug for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentMethod::Card { .. } => write!(f, "Card(**)"),
            PaymentMethod::Upi { .. } => write!(f, "Upi(**)"),
        }
    }
}

impl PaymentMethod {
    pub fn validate(&self) -> Result<(), BookingError> {
        match self {
            PaymentMethod::Card {
                holder,
                number,
                expiry,
                cvv,
            } => {
                if holder.trim().is_empty()
                    || number.trim().is_empty()
                    || expiry.is_empty()
                    || cvv.is_empty()
                {
                    return Err(invalid_payment("please fill in all card details"));
                }

                let digits: String = number.chars().filter(|c| !c.is_whitespace()).collect();
                if digits.len() != 16 || !digits.chars().all(|c| c.is_ascii_digit()) {
                    return Err(invalid_payment("card number must have 16 digits"));
                }

                if !is_valid_expiry(expiry) {
                    return Err(invalid_payment("expiry must be MM/YY"));
                }

                if cvv.len() != 3 || !cvv.chars().all(|c| c.is_ascii_digit()) {
                    return Err(invalid_payment("CVV must have 3 digits"));
                }
            }
            PaymentMethod::Upi { id } => {
                if id.trim().is_empty() {
                    return Err(invalid_payment("missing UPI id"));
                }
                if !id.contains('@') {
                    return Err(invalid_payment("UPI id must look like name@upi"));
                }
            }
        }
        Ok(())
    }
}

fn invalid_payment(reason: &str) -> BookingError {
    BookingError::InvalidPayment(reason.to_string())
}

fn is_valid_expiry(expiry: &str) -> bool {
    match expiry.split_once('/') {
        Some((month, year)) => {
            month.len() == 2
                && year.len() == 2
                && year.chars().all(|c| c.is_ascii_digit())
                && month
                    .parse::<u32>()
                    .map_or(false, |month| (1..=12).contains(&month))
        }
        None => false,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentReceipt {
    pub reference: String,
    pub booking_id: String,
    pub amount: i64,
    pub currency: String,
    pub paid_at: NaiveDateTime,
}

#[derive(Debug, Default)]
pub struct ServiceStats {
    pub bookings_created: AtomicUsize,
    pub bookings_rejected: AtomicUsize,
    pub payments_processed: AtomicUsize,
    pub cancellations: AtomicUsize,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ServiceStatsReport {
    pub bookings_created: usize,
    pub bookings_rejected: usize,
    pub payments_processed: usize,
    pub cancellations: usize,
}

#[async_trait]
pub trait BookingService: Send + Sync + 'static {
    /// Price a prospective trip without creating anything.
    fn quote(
        &self,
        bus_id: &str,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<PriceBreakdown, BookingError>;

    async fn create_booking(
        &self,
        session: &Session,
        draft: BookingDraft,
    ) -> Result<Booking, BookingError>;

    /// Collect the advance for a pending booking and confirm it.
    async fn pay_advance(
        &self,
        session: &Session,
        booking_id: &str,
        payment: PaymentMethod,
    ) -> Result<PaymentReceipt, BookingError>;

    async fn cancel_booking(
        &self,
        session: &Session,
        booking_id: &str,
    ) -> Result<Booking, BookingError>;

    fn booking(&self, booking_id: &str) -> Option<Booking>;

    fn bookings_for_customer(&self, customer_id: &str) -> Vec<Booking>;

    fn bookings_for_bus(&self, bus_id: &str) -> Vec<Booking>;

    fn stats(&self) -> ServiceStatsReport;

    fn update_config(&self, config: BookingConfig) -> Result<(), ConfigError>;
}

pub struct InMemoryBookingService {
    catalog: BusCatalog,
    bookings: DashMap<String, Booking>,
    config: RwLock<BookingConfig>,
    next_id: AtomicU64,
    stats: ServiceStats,
    clock: Arc<dyn Clock>,
}

impl InMemoryBookingService {
    pub fn new(catalog: BusCatalog, config: BookingConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            catalog,
            bookings: DashMap::new(),
            config: RwLock::new(config),
            next_id: AtomicU64::new(1),
            stats: ServiceStats::default(),
            clock: Arc::new(SystemClock),
        })
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    pub fn catalog(&self) -> &BusCatalog {
        &self.catalog
    }

    pub fn config(&self) -> BookingConfig {
        self.config.read().clone()
    }

    fn sorted(mut bookings: Vec<Booking>) -> Vec<Booking> {
        bookings.sort_by(|a, b| a.start_date.cmp(&b.start_date).then(a.id.cmp(&b.id)));
        bookings
    }

    fn reject(&self, err: BookingError) -> BookingError {
        self.stats.bookings_rejected.fetch_add(1, Ordering::SeqCst);
        warn!(error = %err, "Booking rejected");
        err
    }
}

#[async_trait]
impl BookingService for InMemoryBookingService {
    fn quote(
        &self,
        bus_id: &str,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<PriceBreakdown, BookingError> {
        let bus = self
            .catalog
            .get(bus_id)
            .ok_or_else(|| BookingError::UnknownBus(bus_id.to_string()))?;
        let calculator = PricingCalculator::from(&*self.config.read());
        Ok(calculator.price(start, end, bus.price_per_day))
    }

    #[tracing::instrument(skip(self, session, draft), fields(bus_id = %draft.bus_id))]
    async fn create_booking(
        &self,
        session: &Session,
        draft: BookingDraft,
    ) -> Result<Booking, BookingError> {
        let customer = session.require_customer().map_err(|e| self.reject(e))?;
        let bus = self
            .catalog
            .get(&draft.bus_id)
            .ok_or_else(|| self.reject(BookingError::UnknownBus(draft.bus_id.clone())))?;
        if !bus.is_approved {
            return Err(self.reject(BookingError::NotApproved(bus.id.clone())));
        }

        let now = self.clock.now();
        let trip = draft
            .validate(bus, &bus.available_dates.scan(), now.date())
            .map_err(|e| self.reject(e))?;

        let config = self.config();
        let price = PricingCalculator::from(&config).price(
            trip.start_date,
            trip.end_date,
            bus.price_per_day,
        );

        sleep(config.booking_latency()).await;

        let id = format!("booking{}", self.next_id.fetch_add(1, Ordering::SeqCst));
        let booking = Booking::new(
            id.clone(),
            bus.id.clone(),
            customer.id.clone(),
            &draft,
            trip,
            &price,
            now,
        );
        self.bookings.insert(id.clone(), booking.clone());
        self.stats.bookings_created.fetch_add(1, Ordering::SeqCst);

        info!(
            booking_id = %id,
            start = %trip.start_date.calendar_day(),
            end = %trip.end_date.calendar_day(),
            days = price.days,
            total = price.total_amount,
            "Booking created"
        );
        if price.remaining_amount < 0 {
            warn!(
                booking_id = %id,
                remaining = price.remaining_amount,
                "Trip total is below the advance amount"
            );
        }

        Ok(booking)
    }

    #[tracing::instrument(skip(self, session, payment))]
    async fn pay_advance(
        &self,
        session: &Session,
        booking_id: &str,
        payment: PaymentMethod,
    ) -> Result<PaymentReceipt, BookingError> {
        let customer = session.require_customer()?;
        let (status, amount) = {
            let booking = self
                .bookings
                .get(booking_id)
                .ok_or_else(|| BookingError::UnknownBooking(booking_id.to_string()))?;
            if booking.customer_id != customer.id {
                return Err(BookingError::Forbidden);
            }
            (booking.status, booking.advance_amount)
        };
        if !status.can_transition_to(BookingStatus::Confirmed) {
            return Err(BookingError::InvalidTransition {
                from: status,
                to: BookingStatus::Confirmed,
            });
        }
        payment.validate()?;

        let config = self.config();
        sleep(config.payment_latency()).await;

        // Status may have moved while we were waiting
        self.bookings
            .get_mut(booking_id)
            .ok_or_else(|| BookingError::UnknownBooking(booking_id.to_string()))?
            .transition(BookingStatus::Confirmed)?;
        self.stats.payments_processed.fetch_add(1, Ordering::SeqCst);

        let reference = format!("BK{}", rand::thread_rng().gen_range(100_000..1_000_000));
        info!(%reference, amount, "Advance payment accepted");

        Ok(PaymentReceipt {
            reference,
            booking_id: booking_id.to_string(),
            amount,
            currency: config.currency,
            paid_at: self.clock.now(),
        })
    }

    #[tracing::instrument(skip(self, session))]
    async fn cancel_booking(
        &self,
        session: &Session,
        booking_id: &str,
    ) -> Result<Booking, BookingError> {
        let user = session.user().ok_or(BookingError::LoginRequired)?;
        let mut booking = self
            .bookings
            .get_mut(booking_id)
            .ok_or_else(|| BookingError::UnknownBooking(booking_id.to_string()))?;

        // Customers cancel their own trips; the bus owner may cancel too
        let owns_bus = self
            .catalog
            .get(&booking.bus_id)
            .map_or(false, |bus| bus.owner_id == user.id);
        if booking.customer_id != user.id && !owns_bus {
            return Err(BookingError::Forbidden);
        }

        booking.transition(BookingStatus::Cancelled)?;
        self.stats.cancellations.fetch_add(1, Ordering::SeqCst);
        info!("Booking cancelled");
        Ok(booking.clone())
    }

    fn booking(&self, booking_id: &str) -> Option<Booking> {
        self.bookings.get(booking_id).map(|entry| entry.value().clone())
    }

    fn bookings_for_customer(&self, customer_id: &str) -> Vec<Booking> {
        Self::sorted(
            self.bookings
                .iter()
                .filter(|entry| entry.customer_id == customer_id)
                .map(|entry| entry.value().clone())
                .collect(),
        )
    }

    fn bookings_for_bus(&self, bus_id: &str) -> Vec<Booking> {
        Self::sorted(
            self.bookings
                .iter()
                .filter(|entry| entry.bus_id == bus_id)
                .map(|entry| entry.value().clone())
                .collect(),
        )
    }

    fn stats(&self) -> ServiceStatsReport {
        ServiceStatsReport {
            bookings_created: self.stats.bookings_created.load(Ordering::SeqCst),
            bookings_rejected: self.stats.bookings_rejected.load(Ordering::SeqCst),
            payments_processed: self.stats.payments_processed.load(Ordering::SeqCst),
            cancellations: self.stats.cancellations.load(Ordering::SeqCst),
        }
    }

    fn update_config(&self, config: BookingConfig) -> Result<(), ConfigError> {
        config.validate()?;
        *self.config.write() = config;
        Ok(())
    }
}
