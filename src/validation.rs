use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::{FieldPatch, NewField, PaymentType};

const MIN_PASSWORD_LEN: usize = 6;
const MIN_NAME_LEN: usize = 2;

/// Per-field messages, keyed by form field name.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<&'static str, String>);

impl ValidationErrors {
    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.entry(field).or_insert_with(|| message.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    fn into_result<T>(self, value: T) -> Result<T, ValidationErrors> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

fn is_email(s: &str) -> bool {
    let Some((local, domain)) = s.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && !s.chars().any(char::is_whitespace)
        && domain
            .split_once('.')
            .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty() && !tld.ends_with('.'))
}

fn check_email(errors: &mut ValidationErrors, email: &str) {
    if !is_email(email.trim()) {
        errors.add("email", "Please enter a valid email");
    }
}

fn check_password(errors: &mut ValidationErrors, password: &str) {
    if password.chars().count() < MIN_PASSWORD_LEN {
        errors.add(
            "password",
            format!("Password must be at least {MIN_PASSWORD_LEN} characters"),
        );
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

impl LoginForm {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();
        check_email(&mut errors, &self.email);
        check_password(&mut errors, &self.password);
        errors.into_result(())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterForm {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

impl RegisterForm {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();
        if self.name.trim().chars().count() < MIN_NAME_LEN {
            errors.add(
                "name",
                format!("Name must be at least {MIN_NAME_LEN} characters"),
            );
        }
        check_email(&mut errors, &self.email);
        check_password(&mut errors, &self.password);
        if self.password != self.confirm_password {
            errors.add("confirm_password", "Passwords don't match");
        }
        errors.into_result(())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct BookingForm {
    pub field_id: String,
    pub date: String,
    pub hour: i64,
    pub payment_type: String,
}

/// A booking request that passed validation.
#[derive(Debug, Clone, Copy)]
pub struct ValidBooking<'a> {
    pub field_id: &'a str,
    pub date: NaiveDate,
    pub hour: u8,
    pub payment_type: PaymentType,
}

impl BookingForm {
    pub fn validate(&self) -> Result<ValidBooking<'_>, ValidationErrors> {
        let mut errors = ValidationErrors::default();

        let field_id = self.field_id.trim();
        if field_id.is_empty() {
            errors.add("field_id", "Please select a field");
        }

        let date = NaiveDate::parse_from_str(self.date.trim(), "%Y-%m-%d").ok();
        if date.is_none() {
            errors.add("date", "Please select a valid date");
        }

        let hour = u8::try_from(self.hour).ok().filter(|h| *h <= 23);
        if hour.is_none() {
            errors.add("hour", "Hour must be between 0 and 23");
        }

        let payment_type = PaymentType::parse(self.payment_type.trim());
        if payment_type.is_none() {
            errors.add("payment_type", "Payment type must be cash or bank_transfer");
        }

        match (date, hour, payment_type) {
            (Some(date), Some(hour), Some(payment_type)) if errors.is_empty() => Ok(ValidBooking {
                field_id,
                date,
                hour,
                payment_type,
            }),
            _ => Err(errors),
        }
    }
}

fn check_field_attrs(
    errors: &mut ValidationErrors,
    name: Option<&str>,
    address: Option<&str>,
    price_per_hour: Option<i64>,
    latitude: Option<f64>,
    longitude: Option<f64>,
    rating: Option<f64>,
) {
    if name.is_some_and(|n| n.trim().is_empty()) {
        errors.add("name", "Name is required");
    }
    if address.is_some_and(|a| a.trim().is_empty()) {
        errors.add("address", "Address is required");
    }
    if price_per_hour.is_some_and(|p| p <= 0) {
        errors.add("price_per_hour", "Price per hour must be positive");
    }
    if latitude.is_some_and(|v| !(-90.0..=90.0).contains(&v)) {
        errors.add("latitude", "Latitude must be between -90 and 90");
    }
    if longitude.is_some_and(|v| !(-180.0..=180.0).contains(&v)) {
        errors.add("longitude", "Longitude must be between -180 and 180");
    }
    if rating.is_some_and(|v| !(0.0..=5.0).contains(&v)) {
        errors.add("rating", "Rating must be between 0 and 5");
    }
}

pub fn validate_new_field(field: &NewField) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();
    check_field_attrs(
        &mut errors,
        Some(&field.name),
        Some(&field.address),
        Some(field.price_per_hour),
        Some(field.latitude),
        Some(field.longitude),
        Some(field.rating),
    );
    errors.into_result(())
}

pub fn validate_field_patch(patch: &FieldPatch) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();
    if patch.is_empty() {
        errors.add("field", "Nothing to update");
    }
    check_field_attrs(
        &mut errors,
        patch.name.as_deref(),
        patch.address.as_deref(),
        patch.price_per_hour,
        patch.latitude,
        patch.longitude,
        patch.rating,
    );
    errors.into_result(())
}
