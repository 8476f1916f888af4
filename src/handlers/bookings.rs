use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::handlers::{authenticate, status_filter};
use crate::models::booking::filter_by_status;
use crate::models::Booking;
use crate::services::bookings;
use crate::state::AppState;
use crate::validation::BookingForm;

// GET /api/bookings?status=
#[derive(Deserialize)]
pub struct MyBookingsQuery {
    pub status: Option<String>,
}

pub async fn list_bookings(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<MyBookingsQuery>,
) -> Result<Json<Vec<Booking>>, AppError> {
    let session = authenticate(&state, &headers)?;
    let filter = status_filter(query.status.as_deref())?;
    let mine = state.repo.list_bookings(Some(&session.user().id)).await?;
    Ok(Json(filter_by_status(&mine, filter)))
}

// POST /api/bookings
pub async fn create_booking(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(form): Json<BookingForm>,
) -> Result<(StatusCode, Json<Booking>), AppError> {
    let session = authenticate(&state, &headers)?;
    let booking = bookings::create_booking(state.repo.as_ref(), &session, &form).await?;
    Ok((StatusCode::CREATED, Json(booking)))
}

// POST /api/bookings/:id/favorite
#[derive(Serialize)]
pub struct FavoriteResponse {
    booking_id: String,
    is_favorite: bool,
}

pub async fn toggle_favorite(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<FavoriteResponse>, AppError> {
    let session = authenticate(&state, &headers)?;
    let is_favorite = bookings::toggle_favorite(state.repo.as_ref(), &session, &id).await?;
    Ok(Json(FavoriteResponse {
        booking_id: id,
        is_favorite,
    }))
}

// GET /api/favorites
pub async fn list_favorites(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Vec<Booking>>, AppError> {
    let session = authenticate(&state, &headers)?;
    let favorites = state.repo.list_favorites(&session.user().id).await?;
    Ok(Json(favorites))
}
