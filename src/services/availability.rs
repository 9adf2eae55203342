//! Availability calculator: free start times for a barber on a day

use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};

use crate::{
    clock::Clock,
    error::AppResult,
    models::{schedule::{end_time, BusinessCalendar}, Booking},
    repository::BookingStore,
};

/// Bookable start times for a service of `duration` on `date`, ascending.
///
/// Candidates come from the calendar grid; those overlapping a confirmed
/// booking are dropped, and on the current day so is anything not strictly
/// after `now`. Closed days and fully booked days yield an empty list.
pub fn available_slots(
    calendar: &BusinessCalendar,
    date: NaiveDate,
    duration: Duration,
    bookings: &[Booking],
    now: DateTime<Utc>,
) -> Vec<NaiveTime> {
    let local_now = calendar.local_now(now);
    if date < local_now.date() {
        return Vec::new();
    }
    let is_today = date == local_now.date();

    calendar
        .candidate_starts(date, duration)
        .into_iter()
        .filter(|&start| !is_today || start > local_now.time())
        .filter(|&start| {
            end_time(start, duration)
                .is_some_and(|end| !bookings.iter().any(|b| b.overlaps(start, end)))
        })
        .collect()
}

#[derive(Clone)]
pub struct AvailabilityService {
    store: Arc<dyn BookingStore>,
    calendar: Arc<BusinessCalendar>,
    clock: Arc<dyn Clock>,
}

impl AvailabilityService {
    pub fn new(
        store: Arc<dyn BookingStore>,
        calendar: Arc<BusinessCalendar>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self { store, calendar, clock }
    }

    /// Free start times for `barber_id` on `date`, reading the current committed bookings
    pub async fn available_slots(
        &self,
        barber_id: &str,
        date: NaiveDate,
        duration: Option<Duration>,
    ) -> AppResult<Vec<NaiveTime>> {
        let duration = duration.unwrap_or_else(|| self.calendar.default_duration());
        if self.calendar.hours_on(date).is_none() {
            return Ok(Vec::new());
        }
        let bookings = self.store.bookings_on(barber_id, date).await?;
        Ok(available_slots(&self.calendar, date, duration, &bookings, self.clock.now()))
    }

    /// Whether `[start, start + duration)` is currently free; advisory only
    pub async fn is_free(
        &self,
        barber_id: &str,
        date: NaiveDate,
        start: NaiveTime,
        duration: Duration,
    ) -> AppResult<bool> {
        let Some(end) = end_time(start, duration) else {
            return Ok(false);
        };
        let bookings = self.store.bookings_on(barber_id, date).await?;
        Ok(!bookings.iter().any(|b| b.overlaps(start, end)))
    }
}
