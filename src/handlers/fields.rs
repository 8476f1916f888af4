use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::handlers::optional_date;
use crate::models::field::search_fields;
use crate::models::{AvailabilityDay, Field, Weather};
use crate::services::availability::field_availability;
use crate::state::AppState;

async fn load_field(state: &AppState, id: &str) -> Result<Field, AppError> {
    state
        .repo
        .get_field(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("field {id}")))
}

async fn fetch_weather(
    state: &AppState,
    date: NaiveDate,
    latitude: f64,
    longitude: f64,
) -> Result<Weather, AppError> {
    state
        .weather
        .weather(date, latitude, longitude)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "weather lookup failed");
            AppError::Backend(e.to_string())
        })
}

// GET /api/fields?search=
#[derive(Deserialize)]
pub struct FieldsQuery {
    pub search: Option<String>,
}

pub async fn list_fields(
    State(state): State<Arc<AppState>>,
    Query(query): Query<FieldsQuery>,
) -> Result<Json<Vec<Field>>, AppError> {
    let fields = state.repo.list_fields().await?;
    Ok(Json(search_fields(
        &fields,
        query.search.as_deref().unwrap_or(""),
    )))
}

// GET /api/fields/:id
#[derive(Deserialize)]
pub struct DetailsQuery {
    /// First day of the availability window, today when absent.
    pub start: Option<String>,
}

#[derive(Serialize)]
pub struct FieldDetails {
    field: Field,
    availability: Vec<AvailabilityDay>,
}

pub async fn get_field(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(query): Query<DetailsQuery>,
) -> Result<Json<FieldDetails>, AppError> {
    let field = load_field(&state, &id).await?;
    let start = optional_date("start", query.start.as_deref())?
        .unwrap_or_else(|| Utc::now().date_naive());
    let availability = field_availability(
        state.repo.as_ref(),
        &state.config.grid,
        &field.id,
        start,
        state.config.demo_availability,
    )
    .await?;

    Ok(Json(FieldDetails {
        field,
        availability,
    }))
}

// GET /api/fields/:id/weather?date=
#[derive(Deserialize)]
pub struct FieldWeatherQuery {
    pub date: Option<String>,
}

pub async fn field_weather(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(query): Query<FieldWeatherQuery>,
) -> Result<Json<Weather>, AppError> {
    let field = load_field(&state, &id).await?;
    let date = optional_date("date", query.date.as_deref())?
        .unwrap_or_else(|| Utc::now().date_naive());
    let weather = fetch_weather(&state, date, field.latitude, field.longitude).await?;
    Ok(Json(weather))
}

// GET /api/weather?date=&lat=&lon=
#[derive(Deserialize)]
pub struct WeatherQuery {
    pub date: Option<String>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
}

pub async fn weather(
    State(state): State<Arc<AppState>>,
    Query(query): Query<WeatherQuery>,
) -> Result<Json<Weather>, AppError> {
    let date = optional_date("date", query.date.as_deref())?
        .unwrap_or_else(|| Utc::now().date_naive());
    let weather = fetch_weather(
        &state,
        date,
        query.lat.unwrap_or(state.config.default_latitude),
        query.lon.unwrap_or(state.config.default_longitude),
    )
    .await?;
    Ok(Json(weather))
}
