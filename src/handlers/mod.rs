pub mod admin;
pub mod auth;
pub mod bookings;
pub mod fields;
pub mod health;

use std::sync::MutexGuard;

use axum::http::HeaderMap;
use chrono::NaiveDate;
use rusqlite::Connection;

use crate::errors::AppError;
use crate::models::StatusFilter;
use crate::session::SessionContext;
use crate::state::AppState;
use crate::validation::ValidationErrors;

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

pub(crate) fn session_db(state: &AppState) -> Result<MutexGuard<'_, Connection>, AppError> {
    state
        .db
        .lock()
        .map_err(|_| AppError::SessionStore(anyhow::anyhow!("session store lock poisoned")))
}

/// Rebuilds the caller's session from the bearer token.
pub(crate) fn authenticate(state: &AppState, headers: &HeaderMap) -> Result<SessionContext, AppError> {
    let token = bearer_token(headers).ok_or(AppError::Unauthorized)?;
    let db = session_db(state)?;
    let max_age = chrono::Duration::hours(i64::from(state.config.session_ttl_hours));
    let session = SessionContext::hydrate(&db, token, max_age)?;
    session.ok_or(AppError::Unauthorized)
}

pub(crate) fn authenticate_admin(
    state: &AppState,
    headers: &HeaderMap,
) -> Result<SessionContext, AppError> {
    let session = authenticate(state, headers)?;
    session.require_admin()?;
    Ok(session)
}

pub(crate) fn status_filter(raw: Option<&str>) -> Result<StatusFilter, AppError> {
    StatusFilter::parse(raw).ok_or_else(|| {
        let mut errors = ValidationErrors::default();
        errors.add("status", "Status must be all, pending, approved or rejected");
        AppError::Validation(errors)
    })
}

/// Reads an optional `YYYY-MM-DD` query value. A blank value means no date.
pub(crate) fn optional_date(
    key: &'static str,
    raw: Option<&str>,
) -> Result<Option<NaiveDate>, AppError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => NaiveDate::parse_from_str(value, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| {
                let mut errors = ValidationErrors::default();
                errors.add(key, "Please select a valid date");
                AppError::Validation(errors)
            }),
    }
}
