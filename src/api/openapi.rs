//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{bookings, health};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Barbershop Booking API",
        version = "0.1.0",
        description = "Barber availability and appointment booking"
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Booking
        bookings::get_options,
        bookings::get_availability,
        bookings::create_booking,
    ),
    components(
        schemas(
            // Booking
            crate::models::catalog::BookingOptions,
            crate::models::catalog::BarberOption,
            crate::models::catalog::ServiceOption,
            crate::models::booking::BookingForm,
            crate::models::booking::BookingResponse,
            crate::models::booking::Booking,
            crate::models::booking::BookingStatus,
            crate::models::booking::Customer,
            bookings::AvailabilityQuery,
            bookings::AvailabilityResponse,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "booking", description = "Availability and appointment booking")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
