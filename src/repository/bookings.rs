//! PostgreSQL booking store

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use sqlx::{FromRow, Pool, Postgres};
use uuid::Uuid;

use super::{partition_key, BookingStore};
use crate::{
    error::{AppError, AppResult},
    models::{schedule::BusinessCalendar, Booking, BookingStatus, Customer, NewBooking},
};

/// SQLSTATE raised by the `bookings_no_overlap` exclusion constraint
const EXCLUSION_VIOLATION: &str = "23P01";

/// Booking row as stored in the database
#[derive(Debug, FromRow)]
struct BookingRow {
    id: Uuid,
    barber_id: String,
    service_id: String,
    booking_date: NaiveDate,
    start_time: NaiveTime,
    end_time: NaiveTime,
    first_name: String,
    last_name: String,
    email: String,
    phone: String,
    created_at: DateTime<Utc>,
}

impl From<BookingRow> for Booking {
    fn from(row: BookingRow) -> Self {
        Booking {
            id: row.id,
            barber_id: row.barber_id,
            service_id: row.service_id,
            date: row.booking_date,
            start_time: row.start_time,
            end_time: row.end_time,
            customer: Customer {
                first_name: row.first_name,
                last_name: row.last_name,
                email: row.email,
                phone: row.phone,
            },
            created_at: row.created_at,
            status: BookingStatus::Confirmed,
        }
    }
}

/// An exclusion violation means another booking won the slot
fn insert_error(e: sqlx::Error) -> AppError {
    match e {
        sqlx::Error::Database(ref db) if db.code().as_deref() == Some(EXCLUSION_VIOLATION) => {
            AppError::slot_taken()
        }
        e => AppError::Database(e),
    }
}

#[derive(Clone)]
pub struct BookingsRepository {
    pool: Pool<Postgres>,
}

impl BookingsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookingStore for BookingsRepository {
    async fn bookings_on(&self, barber_id: &str, date: NaiveDate) -> AppResult<Vec<Booking>> {
        let rows = sqlx::query_as::<_, BookingRow>(
            "SELECT * FROM bookings WHERE barber_id = $1 AND booking_date = $2 ORDER BY start_time",
        )
        .bind(barber_id)
        .bind(date)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Booking::from).collect())
    }

    async fn commit(&self, calendar: &BusinessCalendar, booking: NewBooking) -> AppResult<Booking> {
        if !calendar.fits(booking.date, booking.start_time, booking.end_time) {
            return Err(AppError::invalid("hour", "Outside business hours"));
        }

        let mut tx = self.pool.begin().await?;

        // Serialize commits for this barber and day until the transaction ends
        sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1))")
            .bind(partition_key(&booking.barber_id, booking.date))
            .execute(&mut *tx)
            .await?;

        let taken: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM bookings
                WHERE barber_id = $1 AND booking_date = $2
                  AND start_time < $4 AND end_time > $3
            )
            "#,
        )
        .bind(&booking.barber_id)
        .bind(booking.date)
        .bind(booking.start_time)
        .bind(booking.end_time)
        .fetch_one(&mut *tx)
        .await?;

        if taken {
            return Err(AppError::slot_taken());
        }

        let confirmed = booking.confirm(Utc::now());
        sqlx::query(
            r#"
            INSERT INTO bookings (id, barber_id, service_id, booking_date, start_time, end_time,
                                  first_name, last_name, email, phone, status, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(confirmed.id)
        .bind(&confirmed.barber_id)
        .bind(&confirmed.service_id)
        .bind(confirmed.date)
        .bind(confirmed.start_time)
        .bind(confirmed.end_time)
        .bind(&confirmed.customer.first_name)
        .bind(&confirmed.customer.last_name)
        .bind(&confirmed.customer.email)
        .bind(&confirmed.customer.phone)
        .bind(confirmed.status.as_str())
        .bind(confirmed.created_at)
        .execute(&mut *tx)
        .await
        .map_err(insert_error)?;

        tx.commit().await?;
        Ok(confirmed)
    }

    async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
