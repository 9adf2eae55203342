//! Booking page endpoints

use axum::{
    extract::{
        rejection::{FormRejection, QueryRejection},
        Query, State,
    },
    Form, Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::{
    error::{AppError, AppResult, ErrorResponse},
    models::{
        booking::{BookingForm, BookingResponse},
        catalog::BookingOptions,
    },
};

/// Query parameters for availability
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct AvailabilityQuery {
    /// Barber id or name
    pub barber: String,
    /// Day to check (YYYY-MM-DD)
    pub date: String,
    /// Service id or name; sets the slot length
    pub service: Option<String>,
}

/// Free start times for a barber on a day
#[derive(Serialize, ToSchema)]
pub struct AvailabilityResponse {
    pub barber: String,
    pub date: NaiveDate,
    /// Start times in ascending order ("HH:MM")
    pub slots: Vec<String>,
}

/// Barbers and services for the booking form
#[utoipa::path(
    get,
    path = "/booking",
    tag = "booking",
    responses(
        (status = 200, description = "Booking form options", body = BookingOptions),
        (status = 503, description = "Catalog unavailable", body = ErrorResponse)
    )
)]
pub async fn get_options(State(state): State<crate::AppState>) -> AppResult<Json<BookingOptions>> {
    let options = state.services.bookings.options().await?;
    Ok(Json(options))
}

/// Available start times for a barber on a day
#[utoipa::path(
    get,
    path = "/booking/availability",
    tag = "booking",
    params(AvailabilityQuery),
    responses(
        (status = 200, description = "Free slots, possibly none", body = AvailabilityResponse),
        (status = 400, description = "Malformed date or query", body = ErrorResponse),
        (status = 404, description = "Unknown barber or service", body = ErrorResponse)
    )
)]
pub async fn get_availability(
    State(state): State<crate::AppState>,
    query: Result<Query<AvailabilityQuery>, QueryRejection>,
) -> AppResult<Json<AvailabilityResponse>> {
    let Query(query) = query?;
    let date = NaiveDate::parse_from_str(query.date.trim(), "%Y-%m-%d")
        .map_err(|_| AppError::invalid("date", "Invalid date (use YYYY-MM-DD)"))?;

    let day = state
        .services
        .bookings
        .availability(query.barber.trim(), date, query.service.as_deref().map(str::trim))
        .await?;

    Ok(Json(AvailabilityResponse {
        barber: day.barber_id,
        date: day.date,
        slots: day.slots.iter().map(|t| t.format("%H:%M").to_string()).collect(),
    }))
}

/// Book an appointment
#[utoipa::path(
    post,
    path = "/booking",
    tag = "booking",
    request_body(
        content = BookingForm,
        content_type = "application/x-www-form-urlencoded"
    ),
    responses(
        (status = 200, description = "Booking confirmed", body = BookingResponse),
        (status = 400, description = "Invalid fields or malformed form", body = ErrorResponse),
        (status = 404, description = "Unknown barber or service", body = ErrorResponse),
        (status = 409, description = "Slot no longer available", body = ErrorResponse),
        (status = 503, description = "Catalog or store unavailable", body = ErrorResponse)
    )
)]
pub async fn create_booking(
    State(state): State<crate::AppState>,
    form: Result<Form<BookingForm>, FormRejection>,
) -> AppResult<Json<BookingResponse>> {
    let Form(form) = form?;
    let booking = state.services.bookings.create_booking(&form).await?;
    Ok(Json(BookingResponse {
        success: true,
        data: booking,
    }))
}
