use crate::errors::AppError;
use crate::models::{Booking, BookingStatus, NewBooking, Stats};
use crate::repository::Repository;
use crate::session::SessionContext;
use crate::validation::BookingForm;

/// Places a pending booking for the session's user.
///
/// The slot is not checked here; the backend owns double-booking
/// prevention and answers with a conflict.
pub async fn create_booking(
    repo: &dyn Repository,
    session: &SessionContext,
    form: &BookingForm,
) -> Result<Booking, AppError> {
    let valid = form.validate()?;

    if repo.get_field(valid.field_id).await?.is_none() {
        return Err(AppError::NotFound(format!("field {}", valid.field_id)));
    }

    let new = NewBooking::pending(
        &session.user().id,
        valid.field_id,
        valid.date,
        valid.hour,
        valid.payment_type,
    );
    let booking = repo.insert_booking(new).await?;

    tracing::info!(
        booking_id = %booking.id,
        reference = %booking.reference,
        field_id = %booking.field_id,
        date = %booking.date,
        hour = booking.hour,
        "booking created"
    );
    Ok(booking)
}

pub async fn approve(repo: &dyn Repository, id: &str) -> Result<Booking, AppError> {
    decide(repo, id, BookingStatus::Approved).await
}

pub async fn reject(repo: &dyn Repository, id: &str) -> Result<Booking, AppError> {
    decide(repo, id, BookingStatus::Rejected).await
}

async fn decide(
    repo: &dyn Repository,
    id: &str,
    decision: BookingStatus,
) -> Result<Booking, AppError> {
    let mut booking = repo
        .get_booking(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("booking {id}")))?;

    match decision {
        BookingStatus::Approved => booking.approve()?,
        BookingStatus::Rejected => booking.reject()?,
        BookingStatus::Pending => {
            booking.status = booking.status.transition(decision)?;
        }
    }

    let stored = repo
        .set_booking_status(id, booking.status)
        .await?
        .ok_or_else(|| AppError::Conflict(format!("booking {id} is no longer pending")))?;

    tracing::info!(booking_id = %id, status = %stored.status, "booking decided");
    Ok(stored)
}

/// Flips the caller's favorite marker on one of their bookings.
pub async fn toggle_favorite(
    repo: &dyn Repository,
    session: &SessionContext,
    booking_id: &str,
) -> Result<bool, AppError> {
    let owned = repo
        .get_booking(booking_id)
        .await?
        .is_some_and(|b| b.user_id == session.user().id);
    if !owned {
        return Err(AppError::NotFound(format!("booking {booking_id}")));
    }

    let is_favorite = repo.toggle_favorite(&session.user().id, booking_id).await?;
    tracing::debug!(booking_id = %booking_id, is_favorite, "favorite toggled");
    Ok(is_favorite)
}

pub async fn stats(repo: &dyn Repository) -> Result<Stats, AppError> {
    let bookings = repo.list_bookings(None).await?;
    let fields = repo.list_fields().await?;
    Ok(Stats::compute(&bookings, &fields))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use crate::models::{booking::is_reference, Identity, Role, User};
    use crate::repository::fixture::FixtureRepository;

    fn session(conn: &rusqlite::Connection, id: &str) -> SessionContext {
        SessionContext::establish(
            conn,
            Identity {
                user: User {
                    id: id.to_string(),
                    name: "Demo User".to_string(),
                    email: "user@example.com".to_string(),
                    role: Role::User,
                },
                backend_token: None,
            },
        )
        .unwrap()
    }

    fn form(field_id: &str, hour: i64) -> BookingForm {
        BookingForm {
            field_id: field_id.to_string(),
            date: "2025-10-04".to_string(),
            hour,
            payment_type: "cash".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_booking_starts_pending() {
        let conn = db::init_db(":memory:").unwrap();
        let repo = FixtureRepository::seeded();
        let ctx = session(&conn, "demo-user-1");

        let b = create_booking(&repo, &ctx, &form("1", 19)).await.unwrap();
        assert_eq!(b.status, BookingStatus::Pending);
        assert!(is_reference(&b.reference));
        assert_eq!(b.user_id, "demo-user-1");
        assert_eq!(b.field.unwrap().name, "Stadium Khouribga");
    }

    #[tokio::test]
    async fn test_create_booking_unknown_field() {
        let conn = db::init_db(":memory:").unwrap();
        let repo = FixtureRepository::seeded();
        let ctx = session(&conn, "demo-user-1");
        assert!(matches!(
            create_booking(&repo, &ctx, &form("404", 19)).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_create_booking_invalid_form() {
        let conn = db::init_db(":memory:").unwrap();
        let repo = FixtureRepository::seeded();
        let ctx = session(&conn, "demo-user-1");
        assert!(matches!(
            create_booking(&repo, &ctx, &form("1", 30)).await,
            Err(AppError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_approve_then_reject_fails() {
        let repo = FixtureRepository::seeded();
        let approved = approve(&repo, "2").await.unwrap();
        assert_eq!(approved.status, BookingStatus::Approved);
        assert!(matches!(
            reject(&repo, "2").await,
            Err(AppError::InvalidTransition(_))
        ));
    }

    #[tokio::test]
    async fn test_decide_missing_booking() {
        let repo = FixtureRepository::seeded();
        assert!(matches!(
            approve(&repo, "nope").await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_toggle_favorite_is_involutive() {
        let conn = db::init_db(":memory:").unwrap();
        let repo = FixtureRepository::seeded();
        let ctx = session(&conn, "demo-user-1");

        let first = toggle_favorite(&repo, &ctx, "1").await.unwrap();
        let second = toggle_favorite(&repo, &ctx, "1").await.unwrap();
        assert!(first);
        assert!(!second);
    }

    #[tokio::test]
    async fn test_toggle_favorite_on_foreign_booking() {
        let conn = db::init_db(":memory:").unwrap();
        let repo = FixtureRepository::seeded();
        let ctx = session(&conn, "someone-else");
        assert!(matches!(
            toggle_favorite(&repo, &ctx, "1").await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_stats_on_seed_data() {
        let repo = FixtureRepository::seeded();
        let stats = stats(&repo).await.unwrap();
        assert_eq!(stats.total_bookings, 2);
        assert_eq!(stats.approved_bookings, 1);
        assert_eq!(stats.revenue_by_field[0].revenue, 150);
        assert_eq!(stats.revenue_by_field[1].revenue, 0);
    }
}
