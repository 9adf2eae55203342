//! Booking model and related types

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::hh_mm;

/// Booking lifecycle status; bookings are never mutated once confirmed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Confirmed,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Confirmed => "confirmed",
        }
    }
}

/// Contact details of the person booking
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    /// Exactly 9 digits
    pub phone: String,
}

/// A confirmed appointment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: Uuid,
    pub barber_id: String,
    pub service_id: String,
    pub date: NaiveDate,
    #[serde(with = "hh_mm")]
    #[schema(value_type = String, example = "10:00")]
    pub start_time: NaiveTime,
    #[serde(with = "hh_mm")]
    #[schema(value_type = String, example = "10:30")]
    pub end_time: NaiveTime,
    pub customer: Customer,
    pub created_at: DateTime<Utc>,
    pub status: BookingStatus,
}

impl Booking {
    /// Half-open interval overlap against `[start, end)`
    pub fn overlaps(&self, start: NaiveTime, end: NaiveTime) -> bool {
        start < self.end_time && end > self.start_time
    }
}

/// A booking ready to be committed to the store
#[derive(Debug, Clone)]
pub struct NewBooking {
    pub barber_id: String,
    pub service_id: String,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub customer: Customer,
}

impl NewBooking {
    /// Materialize the booking once the store has accepted it
    pub fn confirm(self, created_at: DateTime<Utc>) -> Booking {
        Booking {
            id: Uuid::new_v4(),
            barber_id: self.barber_id,
            service_id: self.service_id,
            date: self.date,
            start_time: self.start_time,
            end_time: self.end_time,
            customer: self.customer,
            created_at,
            status: BookingStatus::Confirmed,
        }
    }
}

/// Booking form as submitted by the browser; every field arrives as text
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct BookingForm {
    /// Barber id or name
    pub barber: String,
    /// Service id, name, or form label ("Haircut (25$)")
    pub service: String,
    /// Appointment date (YYYY-MM-DD)
    pub date_string: String,
    /// Start time (HH:MM)
    pub hour: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
}

/// Successful booking response
#[derive(Debug, Serialize, ToSchema)]
pub struct BookingResponse {
    /// Always true
    pub success: bool,
    pub data: Booking,
}
