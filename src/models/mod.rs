//! Data models for the booking server

pub mod booking;
pub mod catalog;
pub mod schedule;

// Re-export commonly used types
pub use booking::{Booking, BookingForm, BookingStatus, Customer, NewBooking};
pub use catalog::{Barber, CatalogSnapshot, Service};
pub use schedule::{BusinessCalendar, DayHours};

/// Serde helpers for "HH:MM" times
pub(crate) mod hh_mm {
    use chrono::NaiveTime;
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&time.format("%H:%M"))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let value = String::deserialize(deserializer)?;
        NaiveTime::parse_from_str(&value, "%H:%M")
            .or_else(|_| NaiveTime::parse_from_str(&value, "%H:%M:%S"))
            .map_err(D::Error::custom)
    }
}
