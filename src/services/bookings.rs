//! Booking controller: validate, check availability, commit

use std::{sync::Arc, time::Duration};

use chrono::NaiveDate;

use super::{
    availability::AvailabilityService,
    catalog::{self, CatalogReader},
    validation::{self, Validation},
};
use crate::{
    clock::Clock,
    error::{AppError, AppResult},
    models::{catalog::BookingOptions, schedule::BusinessCalendar, Booking, BookingForm},
    repository::BookingStore,
};

/// Free slots for one barber and day
#[derive(Debug, Clone)]
pub struct DayAvailability {
    pub barber_id: String,
    pub date: NaiveDate,
    pub slots: Vec<chrono::NaiveTime>,
}

#[derive(Clone)]
pub struct BookingsService {
    catalog: Arc<dyn CatalogReader>,
    store: Arc<dyn BookingStore>,
    calendar: Arc<BusinessCalendar>,
    clock: Arc<dyn Clock>,
    availability: AvailabilityService,
    commit_timeout: Duration,
}

impl BookingsService {
    pub fn new(
        catalog: Arc<dyn CatalogReader>,
        store: Arc<dyn BookingStore>,
        calendar: Arc<BusinessCalendar>,
        clock: Arc<dyn Clock>,
        commit_timeout: Duration,
    ) -> Self {
        let availability = AvailabilityService::new(store.clone(), calendar.clone(), clock.clone());
        Self {
            catalog,
            store,
            calendar,
            clock,
            availability,
            commit_timeout,
        }
    }

    /// Barbers and services offered by the booking form
    pub async fn options(&self) -> AppResult<BookingOptions> {
        let catalog = catalog::snapshot(self.catalog.as_ref()).await?;
        Ok(BookingOptions::from(&catalog))
    }

    /// Free start times for a barber (id or name) on a date.
    /// The service, when given, sets the slot length.
    pub async fn availability(
        &self,
        barber: &str,
        date: NaiveDate,
        service: Option<&str>,
    ) -> AppResult<DayAvailability> {
        let catalog = catalog::snapshot(self.catalog.as_ref()).await?;
        let barber = catalog
            .find_barber(barber)
            .ok_or_else(|| AppError::not_found("barber", "Barber not found"))?;
        let duration = match service {
            Some(reference) => Some(
                catalog
                    .find_service(reference)
                    .ok_or_else(|| AppError::not_found("service", "Service not found"))?
                    .duration(),
            ),
            None => None,
        };

        let slots = self.availability.available_slots(&barber.id, date, duration).await?;
        Ok(DayAvailability {
            barber_id: barber.id.clone(),
            date,
            slots,
        })
    }

    /// Validate and commit a booking form.
    ///
    /// The availability check before committing only spares the store a doomed
    /// attempt; the store's own atomic check is what guarantees exclusivity.
    #[tracing::instrument(
        skip_all,
        fields(barber = %form.barber, date = %form.date_string, hour = %form.hour)
    )]
    pub async fn create_booking(&self, form: &BookingForm) -> AppResult<Booking> {
        let catalog = catalog::snapshot(self.catalog.as_ref()).await?;

        let request = match validation::validate(form, &catalog, &self.calendar, self.clock.now()) {
            Validation::Valid(request) => request,
            Validation::Invalid(errors) => {
                tracing::debug!(?errors, "Booking rejected by validation");
                return Err(AppError::Validation(errors));
            }
            Validation::NotFound(errors) => {
                tracing::info!(?errors, "Booking references unknown catalog entries");
                return Err(AppError::NotFound(errors));
            }
        };

        let barber_id = request.barber.id.clone();
        let date = request.date;
        let duration = request.service.duration();

        if !self
            .availability
            .is_free(&barber_id, date, request.start_time, duration)
            .await?
        {
            return Err(self.conflict(&barber_id, date, duration).await);
        }

        let commit = self.store.commit(&self.calendar, request.into_new_booking());
        match tokio::time::timeout(self.commit_timeout, commit).await {
            Ok(Ok(booking)) => {
                tracing::info!(booking_id = %booking.id, "Booking confirmed");
                Ok(booking)
            }
            Ok(Err(AppError::Conflict { .. })) => {
                Err(self.conflict(&barber_id, date, duration).await)
            }
            Ok(Err(e)) => Err(e),
            Err(_) => Err(AppError::StoreUnavailable(format!(
                "Booking commit did not complete within {:?}",
                self.commit_timeout
            ))),
        }
    }

    /// Conflict error carrying the slots still free, so the client can re-pick
    async fn conflict(
        &self,
        barber_id: &str,
        date: NaiveDate,
        duration: chrono::Duration,
    ) -> AppError {
        tracing::warn!(barber_id, %date, "Slot no longer available");
        let available_slots = match self
            .availability
            .available_slots(barber_id, date, Some(duration))
            .await
        {
            Ok(slots) => Some(slots),
            Err(e) => {
                tracing::warn!(error = %e, "Could not list free slots after conflict");
                None
            }
        };
        AppError::Conflict {
            message: "Slot no longer available".to_string(),
            available_slots,
        }
    }

    /// Booking store readiness
    pub async fn ping_store(&self) -> AppResult<()> {
        self.store.ping().await
    }
}
