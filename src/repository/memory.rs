//! In-process booking store

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use tokio::sync::{Mutex, RwLock};

use super::{partition_key, BookingStore};
use crate::{
    error::{AppError, AppResult},
    models::{schedule::BusinessCalendar, Booking, NewBooking},
};

type Partition = Arc<Mutex<Vec<Booking>>>;

/// Bookings held in memory, partitioned by (barber, date).
///
/// Each partition has its own lock, so commits for different barbers or days
/// never wait on each other.
#[derive(Clone, Default)]
pub struct MemoryBookingStore {
    partitions: Arc<RwLock<HashMap<String, Partition>>>,
}

impl MemoryBookingStore {
    pub fn new() -> Self {
        Self::default()
    }

    async fn partition(&self, key: String) -> Partition {
        if let Some(partition) = self.partitions.read().await.get(&key) {
            return partition.clone();
        }
        self.partitions
            .write()
            .await
            .entry(key)
            .or_default()
            .clone()
    }

    /// Total number of stored bookings
    pub async fn len(&self) -> usize {
        let partitions: Vec<Partition> = self.partitions.read().await.values().cloned().collect();
        let mut total = 0;
        for partition in partitions {
            total += partition.lock().await.len();
        }
        total
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl BookingStore for MemoryBookingStore {
    async fn bookings_on(&self, barber_id: &str, date: NaiveDate) -> AppResult<Vec<Booking>> {
        let key = partition_key(barber_id, date);
        let Some(partition) = self.partitions.read().await.get(&key).cloned() else {
            return Ok(Vec::new());
        };
        let bookings = partition.lock().await.clone();
        Ok(bookings)
    }

    async fn commit(&self, calendar: &BusinessCalendar, booking: NewBooking) -> AppResult<Booking> {
        if !calendar.fits(booking.date, booking.start_time, booking.end_time) {
            return Err(AppError::invalid("hour", "Outside business hours"));
        }

        let partition = self.partition(partition_key(&booking.barber_id, booking.date)).await;
        let mut bookings = partition.lock().await;

        if bookings.iter().any(|b| b.overlaps(booking.start_time, booking.end_time)) {
            return Err(AppError::slot_taken());
        }

        let confirmed = booking.confirm(Utc::now());
        let at = bookings.partition_point(|b| b.start_time < confirmed.start_time);
        bookings.insert(at, confirmed.clone());
        Ok(confirmed)
    }

    async fn ping(&self) -> AppResult<()> {
        Ok(())
    }
}
