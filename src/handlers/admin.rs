use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;

use crate::errors::AppError;
use crate::handlers::{authenticate_admin, optional_date, status_filter};
use crate::models::{Booking, BookingQuery, Field, FieldPatch, NewField, Stats};
use crate::services::bookings;
use crate::services::export::bookings_csv;
use crate::state::AppState;
use crate::validation::{validate_field_patch, validate_new_field};

// POST /api/admin/fields
pub async fn create_field(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(new): Json<NewField>,
) -> Result<(StatusCode, Json<Field>), AppError> {
    authenticate_admin(&state, &headers)?;
    validate_new_field(&new)?;
    let field = state.repo.create_field(new).await?;
    tracing::info!(field_id = %field.id, name = %field.name, "field created");
    Ok((StatusCode::CREATED, Json(field)))
}

// PUT /api/admin/fields/:id
pub async fn update_field(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(patch): Json<FieldPatch>,
) -> Result<Json<Field>, AppError> {
    authenticate_admin(&state, &headers)?;
    validate_field_patch(&patch)?;
    let field = state
        .repo
        .update_field(&id, patch)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("field {id}")))?;
    tracing::info!(field_id = %id, "field updated");
    Ok(Json(field))
}

// DELETE /api/admin/fields/:id
pub async fn delete_field(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    authenticate_admin(&state, &headers)?;
    if !state.repo.delete_field(&id).await? {
        return Err(AppError::NotFound(format!("field {id}")));
    }
    tracing::info!(field_id = %id, "field deleted");
    Ok(StatusCode::NO_CONTENT)
}

// GET /api/admin/bookings?status=&date=&search=
#[derive(Deserialize)]
pub struct BookingsQuery {
    pub status: Option<String>,
    pub date: Option<String>,
    pub search: Option<String>,
}

impl BookingsQuery {
    fn into_query(self) -> Result<BookingQuery, AppError> {
        Ok(BookingQuery {
            status: status_filter(self.status.as_deref())?,
            date: optional_date("date", self.date.as_deref())?,
            search: self.search,
        })
    }
}

async fn filtered_bookings(
    state: &AppState,
    query: BookingsQuery,
) -> Result<Vec<Booking>, AppError> {
    let query = query.into_query()?;
    let all = state.repo.list_bookings(None).await?;
    Ok(query.apply(&all))
}

pub async fn get_bookings(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<BookingsQuery>,
) -> Result<Json<Vec<Booking>>, AppError> {
    authenticate_admin(&state, &headers)?;
    Ok(Json(filtered_bookings(&state, query).await?))
}

// GET /api/admin/bookings/export
pub async fn export_bookings(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<BookingsQuery>,
) -> Result<Response, AppError> {
    authenticate_admin(&state, &headers)?;
    let bookings = filtered_bookings(&state, query).await?;
    let csv = bookings_csv(&bookings);

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"bookings.csv\"",
            ),
        ],
        csv,
    )
        .into_response())
}

// POST /api/admin/bookings/:id/approve
pub async fn approve_booking(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<Booking>, AppError> {
    authenticate_admin(&state, &headers)?;
    Ok(Json(bookings::approve(state.repo.as_ref(), &id).await?))
}

// POST /api/admin/bookings/:id/reject
pub async fn reject_booking(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<Booking>, AppError> {
    authenticate_admin(&state, &headers)?;
    Ok(Json(bookings::reject(state.repo.as_ref(), &id).await?))
}

// GET /api/admin/stats
pub async fn get_stats(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Stats>, AppError> {
    authenticate_admin(&state, &headers)?;
    Ok(Json(bookings::stats(state.repo.as_ref()).await?))
}
