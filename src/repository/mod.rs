//! Repository layer: persistence of confirmed bookings

pub mod bookings;
pub mod memory;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::{
    error::AppResult,
    models::{schedule::BusinessCalendar, Booking, NewBooking},
};

pub use bookings::BookingsRepository;
pub use memory::MemoryBookingStore;

/// Durable set of confirmed bookings.
///
/// `commit` is the only write path. Implementations must check that the
/// interval is inside opening hours and free for the barber, then insert,
/// as one atomic step: of several concurrent commits with overlapping
/// intervals for the same barber exactly one succeeds and the others get
/// `AppError::Conflict`. Readers never observe a partially committed booking.
#[async_trait]
pub trait BookingStore: Send + Sync {
    /// Confirmed bookings of a barber on a date, ordered by start time
    async fn bookings_on(&self, barber_id: &str, date: NaiveDate) -> AppResult<Vec<Booking>>;

    /// Atomically re-check and persist a booking
    async fn commit(&self, calendar: &BusinessCalendar, booking: NewBooking) -> AppResult<Booking>;

    /// Cheap connectivity check for readiness probes
    async fn ping(&self) -> AppResult<()>;
}

/// Key of the mutual-exclusion partition a commit runs under.
/// Bookings never span days, so (barber, date) is enough to serialize every overlap.
pub(crate) fn partition_key(barber_id: &str, date: NaiveDate) -> String {
    format!("{}/{}", barber_id, date)
}
