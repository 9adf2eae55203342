//! Booking form validation

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use validator::Validate;

use crate::{
    error::FieldErrors,
    models::{
        schedule::{end_time, parse_hour, BusinessCalendar},
        Barber, BookingForm, CatalogSnapshot, Customer, NewBooking, Service,
    },
};

/// Exactly nine ASCII digits, no separators or country code
static PHONE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]{9}$").expect("valid phone pattern"));

/// Outcome of validating a booking form
#[derive(Debug)]
pub enum Validation {
    Valid(BookingRequest),
    /// User-correctable input errors, every violated field at once
    Invalid(FieldErrors),
    /// Input is well-formed but references barbers or services the catalog no longer has
    NotFound(FieldErrors),
}

/// A booking form that passed every rule
#[derive(Debug, Clone)]
pub struct BookingRequest {
    pub barber: Barber,
    pub service: Service,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub customer: Customer,
}

impl BookingRequest {
    pub fn into_new_booking(self) -> NewBooking {
        NewBooking {
            barber_id: self.barber.id,
            service_id: self.service.id,
            date: self.date,
            start_time: self.start_time,
            end_time: self.end_time,
            customer: self.customer,
        }
    }
}

#[derive(Debug, Validate)]
struct ContactDetails {
    #[validate(length(min = 1, message = "First name is required"))]
    first_name: String,
    #[validate(length(min = 1, message = "Last name is required"))]
    last_name: String,
    #[validate(email(message = "Invalid email address"))]
    email: String,
    #[validate(regex(path = *PHONE_REGEX, message = "Invalid phone number"))]
    phone: String,
}

/// Struct field -> form field
const CONTACT_FIELDS: [(&str, &str); 4] = [
    ("first_name", "firstName"),
    ("last_name", "lastName"),
    ("email", "email"),
    ("phone", "phone"),
];

/// Validate a submitted form against the catalog snapshot and the calendar.
///
/// Pure: `now` is the submission instant.
pub fn validate(
    form: &BookingForm,
    catalog: &CatalogSnapshot,
    calendar: &BusinessCalendar,
    now: DateTime<Utc>,
) -> Validation {
    let mut invalid = FieldErrors::new();
    let mut missing = FieldErrors::new();

    let barber = match form.barber.trim() {
        "" => {
            invalid.insert("barber".into(), "Barber is required".into());
            None
        }
        reference => {
            let found = catalog.find_barber(reference);
            if found.is_none() {
                missing.insert("barber".into(), "Barber not found".into());
            }
            found
        }
    };

    let service = match form.service.trim() {
        "" => {
            invalid.insert("service".into(), "Service is required".into());
            None
        }
        reference => {
            let found = catalog.find_service(reference);
            if found.is_none() {
                missing.insert("service".into(), "Service not found".into());
            }
            found
        }
    };

    let date = match form.date_string.trim() {
        "" => {
            invalid.insert("dateString".into(), "Date is required".into());
            None
        }
        value => {
            let parsed = NaiveDate::parse_from_str(value, "%Y-%m-%d").ok();
            if parsed.is_none() {
                invalid.insert("dateString".into(), "Invalid date (use YYYY-MM-DD)".into());
            }
            parsed
        }
    };

    let start = match form.hour.trim() {
        "" => {
            invalid.insert("hour".into(), "Hour is required".into());
            None
        }
        value => {
            let parsed = parse_hour(value);
            if parsed.is_none() {
                invalid.insert("hour".into(), "Invalid hour (use HH:MM)".into());
            }
            parsed
        }
    };

    let mut end = None;
    if let (Some(date), Some(start)) = (date, start) {
        let local_now = calendar.local_now(now);
        let duration = service.map_or_else(|| calendar.default_duration(), Service::duration);

        if date < local_now.date() {
            invalid.insert("dateString".into(), "Date must not be in the past".into());
        } else if date.and_time(start) < local_now {
            invalid.insert("hour".into(), "Time must not be in the past".into());
        } else if calendar.hours_on(date).is_none() {
            invalid.insert("dateString".into(), "The shop is closed on this day".into());
        } else {
            end = end_time(start, duration).filter(|&end| calendar.fits(date, start, end));
            if end.is_none() {
                invalid.insert("hour".into(), "Outside business hours".into());
            }
        }
    }

    let contact = ContactDetails {
        first_name: form.first_name.trim().to_string(),
        last_name: form.last_name.trim().to_string(),
        email: form.email.trim().to_string(),
        phone: form.phone.clone(),
    };
    if let Err(errors) = contact.validate() {
        let by_field = errors.field_errors();
        for (field, form_field) in CONTACT_FIELDS {
            if let Some(error) = by_field.get(field).and_then(|errs| errs.first()) {
                let message = error
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("Invalid {}", form_field));
                invalid.insert(form_field.into(), message);
            }
        }
    }

    if !invalid.is_empty() {
        // report unknown references alongside the other problems
        invalid.extend(missing);
        return Validation::Invalid(invalid);
    }
    if !missing.is_empty() {
        return Validation::NotFound(missing);
    }

    match (barber, service, date, start, end) {
        (Some(barber), Some(service), Some(date), Some(start_time), Some(end_time)) => {
            Validation::Valid(BookingRequest {
                barber: barber.clone(),
                service: service.clone(),
                date,
                start_time,
                end_time,
                customer: Customer {
                    first_name: contact.first_name,
                    last_name: contact.last_name,
                    email: contact.email,
                    phone: contact.phone,
                },
            })
        }
        // every None above recorded an error
        _ => Validation::Invalid(FieldErrors::from([(
            "form".to_string(),
            "Invalid booking request".to_string(),
        )])),
    }
}
