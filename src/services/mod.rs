//! Business logic services

pub mod availability;
pub mod bookings;
pub mod catalog;
pub mod validation;

use std::{sync::Arc, time::Duration};

use crate::{
    clock::Clock,
    config::{CatalogConfig, CatalogSource, StorageConfig},
    error::AppResult,
    models::schedule::BusinessCalendar,
    repository::BookingStore,
};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub bookings: bookings::BookingsService,
}

impl Services {
    /// Create all services around the given booking store
    pub fn new(
        store: Arc<dyn BookingStore>,
        catalog_config: &CatalogConfig,
        storage_config: &StorageConfig,
        calendar: BusinessCalendar,
        clock: Arc<dyn Clock>,
    ) -> AppResult<Self> {
        let catalog: Arc<dyn catalog::CatalogReader> = match catalog_config.source {
            CatalogSource::Static => Arc::new(catalog::StaticCatalog::from_config(catalog_config)),
            CatalogSource::Contentful => {
                Arc::new(catalog::ContentfulCatalog::new(&catalog_config.contentful)?)
            }
        };

        Ok(Self {
            bookings: bookings::BookingsService::new(
                catalog,
                store,
                Arc::new(calendar),
                clock,
                Duration::from_millis(storage_config.commit_timeout_ms),
            ),
        })
    }
}
