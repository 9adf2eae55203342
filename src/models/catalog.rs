//! Catalog models (barbers and services)

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A barber taking appointments
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Barber {
    pub id: String,
    pub name: String,
}

/// A bookable service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    pub id: String,
    pub name: String,
    pub price_cents: i64,
    /// Always greater than zero
    pub duration_minutes: u32,
}

impl Service {
    /// Price in currency units, e.g. 2550 -> 25.5
    pub fn price(&self) -> f64 {
        self.price_cents as f64 / 100.0
    }

    /// Label shown in the booking form's service picker, e.g. "Haircut (25$)".
    /// The price is printed in its shortest form: "12.5", never "12.50".
    pub fn display_label(&self) -> String {
        let sign = if self.price_cents < 0 { "-" } else { "" };
        let cents = self.price_cents.unsigned_abs();
        let (units, fraction) = (cents / 100, cents % 100);
        let price = match fraction {
            0 => format!("{sign}{units}"),
            f if f % 10 == 0 => format!("{sign}{units}.{}", f / 10),
            f => format!("{sign}{units}.{f:02}"),
        };
        format!("{} ({}$)", self.name, price)
    }

    pub fn duration(&self) -> chrono::Duration {
        chrono::Duration::minutes(i64::from(self.duration_minutes))
    }
}

/// Immutable view of the catalog, fetched once per request
#[derive(Debug, Clone, Default)]
pub struct CatalogSnapshot {
    pub barbers: Vec<Barber>,
    pub services: Vec<Service>,
}

impl CatalogSnapshot {
    /// Find a barber by id or display name
    pub fn find_barber(&self, reference: &str) -> Option<&Barber> {
        self.barbers
            .iter()
            .find(|b| b.id == reference)
            .or_else(|| self.barbers.iter().find(|b| b.name.eq_ignore_ascii_case(reference)))
    }

    /// Find a service by id, display name, or form label
    pub fn find_service(&self, reference: &str) -> Option<&Service> {
        self.services
            .iter()
            .find(|s| s.id == reference)
            .or_else(|| self.services.iter().find(|s| s.name.eq_ignore_ascii_case(reference)))
            .or_else(|| self.services.iter().find(|s| s.display_label() == reference))
    }
}

/// Barber as listed on the booking page
#[derive(Debug, Serialize, ToSchema)]
pub struct BarberOption {
    pub name: String,
}

/// Service as listed on the booking page
#[derive(Debug, Serialize, ToSchema)]
pub struct ServiceOption {
    pub name: String,
    /// Price in currency units
    pub price: f64,
}

/// Choices offered by the booking form
#[derive(Debug, Serialize, ToSchema)]
pub struct BookingOptions {
    pub barbers: Vec<BarberOption>,
    pub services: Vec<ServiceOption>,
}

impl From<&CatalogSnapshot> for BookingOptions {
    fn from(catalog: &CatalogSnapshot) -> Self {
        Self {
            barbers: catalog
                .barbers
                .iter()
                .map(|b| BarberOption { name: b.name.clone() })
                .collect(),
            services: catalog
                .services
                .iter()
                .map(|s| ServiceOption {
                    name: s.name.clone(),
                    price: s.price(),
                })
                .collect(),
        }
    }
}
