use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};

use super::{RepoResult, Repository, RepositoryError};
use crate::models::{
    Booking, BookingStatus, FavoriteSet, Field, FieldPatch, Identity, NewBooking, NewField,
    PaymentType, Role, User,
};

struct Account {
    user: User,
    password: String,
}

#[derive(Default)]
struct Tables {
    fields: Vec<Field>,
    bookings: Vec<Booking>,
    favorites: FavoriteSet,
    accounts: Vec<Account>,
}

/// In-memory stand-in for the hosted backend, seeded with demo data.
///
/// Enforces the one-booking-per-slot constraint the real database carries.
pub struct FixtureRepository {
    tables: Mutex<Tables>,
}

impl Default for FixtureRepository {
    fn default() -> Self {
        Self::seeded()
    }
}

fn field(
    id: &str,
    name: &str,
    address: &str,
    price_per_hour: i64,
    description: &str,
    (latitude, longitude): (f64, f64),
    rating: f64,
    amenities: &[&str],
) -> Field {
    Field {
        id: id.to_string(),
        name: name.to_string(),
        address: address.to_string(),
        price_per_hour,
        description: description.to_string(),
        image_url: String::new(),
        latitude,
        longitude,
        rating,
        amenities: amenities.iter().map(|a| a.to_string()).collect(),
    }
}

impl FixtureRepository {
    pub fn empty() -> Self {
        Self {
            tables: Mutex::new(Tables::default()),
        }
    }

    pub fn seeded() -> Self {
        let fields = vec![
            field(
                "1",
                "Stadium Khouribga",
                "Boulevard Mohammed V, Khouribga",
                150,
                "Modern football field with high-quality grass and professional lighting",
                (32.8959, -6.9190),
                4.5,
                &["Parking", "Restrooms", "Lighting", "Seating"],
            ),
            field(
                "2",
                "Complex Sportif Al Wifaq",
                "Hay Al Wifaq, Khouribga",
                120,
                "Community sports complex with multiple fields and facilities",
                (32.8844, -6.9067),
                4.2,
                &["Parking", "Restrooms", "Cafeteria"],
            ),
            field(
                "3",
                "Terrain Synthétique Benguerir",
                "Avenue Hassan II, Benguerir",
                180,
                "Premium synthetic field with international standards",
                (32.2355, -7.9514),
                4.8,
                &["Parking", "Restrooms", "Lighting", "Seating", "Locker Rooms"],
            ),
        ];

        let now = Utc::now();
        let bookings = vec![
            Booking {
                id: "1".to_string(),
                user_id: "demo-user-1".to_string(),
                field_id: "1".to_string(),
                field: None,
                date: NaiveDate::from_ymd_opt(2025, 9, 15).unwrap_or_default(),
                hour: 18,
                payment_type: PaymentType::BankTransfer,
                status: BookingStatus::Approved,
                reference: "SA3A-12345".to_string(),
                created_at: now,
                is_favorite: false,
            },
            Booking {
                id: "2".to_string(),
                user_id: "demo-user-1".to_string(),
                field_id: "2".to_string(),
                field: None,
                date: NaiveDate::from_ymd_opt(2025, 9, 20).unwrap_or_default(),
                hour: 20,
                payment_type: PaymentType::Cash,
                status: BookingStatus::Pending,
                reference: "SA3A-12346".to_string(),
                created_at: now,
                is_favorite: false,
            },
        ];

        let mut favorites = FavoriteSet::default();
        favorites.insert("demo-user-1", "2");

        let accounts = vec![
            Account {
                user: User {
                    id: "demo-user-1".to_string(),
                    name: "Demo User".to_string(),
                    email: "user@example.com".to_string(),
                    role: Role::User,
                },
                password: "password".to_string(),
            },
            Account {
                user: User {
                    id: "demo-admin-1".to_string(),
                    name: "Demo Admin".to_string(),
                    email: "admin@example.com".to_string(),
                    role: Role::Admin,
                },
                password: "adminpass".to_string(),
            },
        ];

        Self {
            tables: Mutex::new(Tables {
                fields,
                bookings,
                favorites,
                accounts,
            }),
        }
    }

    fn with_tables<T>(&self, f: impl FnOnce(&mut Tables) -> T) -> T {
        let mut guard = self
            .tables
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        f(&mut guard)
    }
}

impl Tables {
    fn hydrate(&self, booking: &Booking, viewer: Option<&str>) -> Booking {
        let mut out = booking.clone();
        out.field = self.fields.iter().find(|f| f.id == booking.field_id).cloned();
        out.is_favorite = viewer.is_some_and(|u| self.favorites.contains(u, &booking.id));
        out
    }
}

#[async_trait]
impl Repository for FixtureRepository {
    async fn sign_in(&self, email: &str, password: &str) -> RepoResult<Identity> {
        self.with_tables(|t| {
            t.accounts
                .iter()
                .find(|a| a.user.email.eq_ignore_ascii_case(email) && a.password == password)
                .map(|a| Identity {
                    user: a.user.clone(),
                    backend_token: None,
                })
                .ok_or(RepositoryError::InvalidCredentials)
        })
    }

    async fn sign_up(&self, name: &str, email: &str, password: &str) -> RepoResult<Identity> {
        self.with_tables(|t| {
            if t.accounts
                .iter()
                .any(|a| a.user.email.eq_ignore_ascii_case(email))
            {
                return Err(RepositoryError::Conflict(
                    "an account with this email already exists".to_string(),
                ));
            }
            let user = User {
                id: uuid::Uuid::new_v4().to_string(),
                name: name.to_string(),
                email: email.to_string(),
                role: Role::User,
            };
            t.accounts.push(Account {
                user: user.clone(),
                password: password.to_string(),
            });
            Ok(Identity {
                user,
                backend_token: None,
            })
        })
    }

    async fn sign_out(&self, _backend_token: Option<&str>) -> RepoResult<()> {
        Ok(())
    }

    async fn list_fields(&self) -> RepoResult<Vec<Field>> {
        Ok(self.with_tables(|t| t.fields.clone()))
    }

    async fn get_field(&self, id: &str) -> RepoResult<Option<Field>> {
        Ok(self.with_tables(|t| t.fields.iter().find(|f| f.id == id).cloned()))
    }

    async fn create_field(&self, field: NewField) -> RepoResult<Field> {
        let created = field.into_field(uuid::Uuid::new_v4().to_string());
        self.with_tables(|t| t.fields.push(created.clone()));
        Ok(created)
    }

    async fn update_field(&self, id: &str, patch: FieldPatch) -> RepoResult<Option<Field>> {
        Ok(self.with_tables(|t| {
            t.fields.iter_mut().find(|f| f.id == id).map(|f| {
                f.apply(patch);
                f.clone()
            })
        }))
    }

    async fn delete_field(&self, id: &str) -> RepoResult<bool> {
        self.with_tables(|t| {
            if t.bookings.iter().any(|b| b.field_id == id) {
                return Err(RepositoryError::Conflict(format!(
                    "field {id} still has bookings"
                )));
            }
            let before = t.fields.len();
            t.fields.retain(|f| f.id != id);
            Ok(before != t.fields.len())
        })
    }

    async fn list_bookings(&self, viewer: Option<&str>) -> RepoResult<Vec<Booking>> {
        Ok(self.with_tables(|t| {
            t.bookings
                .iter()
                .filter(|b| viewer.map_or(true, |u| b.user_id == u))
                .map(|b| t.hydrate(b, viewer))
                .collect()
        }))
    }

    async fn get_booking(&self, id: &str) -> RepoResult<Option<Booking>> {
        Ok(self.with_tables(|t| {
            t.bookings
                .iter()
                .find(|b| b.id == id)
                .map(|b| t.hydrate(b, None))
        }))
    }

    async fn insert_booking(&self, booking: NewBooking) -> RepoResult<Booking> {
        self.with_tables(|t| {
            if !t.fields.iter().any(|f| f.id == booking.field_id) {
                return Err(RepositoryError::NotFound(format!(
                    "field {}",
                    booking.field_id
                )));
            }
            let taken = t.bookings.iter().any(|b| {
                b.field_id == booking.field_id
                    && b.date == booking.date
                    && b.hour == booking.hour
                    && b.holds_slot()
            });
            if taken {
                return Err(RepositoryError::Conflict(
                    "this slot is already booked".to_string(),
                ));
            }
            if t.bookings.iter().any(|b| b.reference == booking.reference) {
                return Err(RepositoryError::Conflict(
                    "duplicate booking reference".to_string(),
                ));
            }

            let stored = Booking {
                id: uuid::Uuid::new_v4().to_string(),
                user_id: booking.user_id,
                field_id: booking.field_id,
                field: None,
                date: booking.date,
                hour: booking.hour,
                payment_type: booking.payment_type,
                status: booking.status,
                reference: booking.reference,
                created_at: Utc::now(),
                is_favorite: false,
            };
            t.bookings.push(stored.clone());
            Ok(t.hydrate(&stored, None))
        })
    }

    async fn set_booking_status(
        &self,
        id: &str,
        status: BookingStatus,
    ) -> RepoResult<Option<Booking>> {
        Ok(self.with_tables(|t| {
            let updated = t
                .bookings
                .iter_mut()
                .find(|b| b.id == id && b.status == BookingStatus::Pending)
                .map(|b| {
                    b.status = status;
                    b.clone()
                });
            updated.map(|b| t.hydrate(&b, None))
        }))
    }

    async fn booked_slots(
        &self,
        field_id: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> RepoResult<Vec<(NaiveDate, u8)>> {
        Ok(self.with_tables(|t| {
            t.bookings
                .iter()
                .filter(|b| {
                    b.field_id == field_id && b.holds_slot() && b.date >= from && b.date <= to
                })
                .map(|b| (b.date, b.hour))
                .collect()
        }))
    }

    async fn toggle_favorite(&self, user_id: &str, booking_id: &str) -> RepoResult<bool> {
        self.with_tables(|t| {
            if !t.bookings.iter().any(|b| b.id == booking_id) {
                return Err(RepositoryError::NotFound(format!("booking {booking_id}")));
            }
            Ok(t.favorites.toggle(user_id, booking_id))
        })
    }

    async fn list_favorites(&self, user_id: &str) -> RepoResult<Vec<Booking>> {
        Ok(self.with_tables(|t| {
            let ids = t.favorites.booking_ids_for(user_id);
            t.bookings
                .iter()
                .filter(|b| ids.contains(&b.id))
                .map(|b| t.hydrate(b, Some(user_id)))
                .collect()
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[tokio::test]
    async fn test_demo_sign_in() {
        let repo = FixtureRepository::seeded();
        let admin = repo.sign_in("admin@example.com", "adminpass").await.unwrap();
        assert_eq!(admin.user.role, Role::Admin);
        assert!(matches!(
            repo.sign_in("admin@example.com", "wrong").await,
            Err(RepositoryError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn test_sign_up_rejects_duplicate_email() {
        let repo = FixtureRepository::seeded();
        let new = repo.sign_up("Sara", "sara@example.com", "secret1").await.unwrap();
        assert_eq!(new.user.role, Role::User);
        assert!(matches!(
            repo.sign_up("Sara", "SARA@example.com", "secret1").await,
            Err(RepositoryError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn test_list_bookings_embeds_field_and_favorites() {
        let repo = FixtureRepository::seeded();
        let mine = repo.list_bookings(Some("demo-user-1")).await.unwrap();
        assert_eq!(mine.len(), 2);
        assert!(mine.iter().all(|b| b.field.is_some()));
        let fav: Vec<_> = mine.iter().filter(|b| b.is_favorite).map(|b| b.id.as_str()).collect();
        assert_eq!(fav, vec!["2"]);

        assert!(repo.list_bookings(Some("nobody")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_double_booking_conflicts() {
        let repo = FixtureRepository::seeded();
        let first = NewBooking::pending("u", "3", d("2025-10-01"), 19, PaymentType::Cash);
        repo.insert_booking(first).await.unwrap();
        let second = NewBooking::pending("v", "3", d("2025-10-01"), 19, PaymentType::Cash);
        assert!(matches!(
            repo.insert_booking(second).await,
            Err(RepositoryError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn test_rejected_booking_frees_slot() {
        let repo = FixtureRepository::seeded();
        let first = repo
            .insert_booking(NewBooking::pending("u", "3", d("2025-10-01"), 19, PaymentType::Cash))
            .await
            .unwrap();
        repo.set_booking_status(&first.id, BookingStatus::Rejected)
            .await
            .unwrap()
            .unwrap();
        let again = NewBooking::pending("v", "3", d("2025-10-01"), 19, PaymentType::Cash);
        assert!(repo.insert_booking(again).await.is_ok());
    }

    #[tokio::test]
    async fn test_status_write_requires_pending() {
        let repo = FixtureRepository::seeded();
        // booking 1 is already approved
        assert!(repo
            .set_booking_status("1", BookingStatus::Rejected)
            .await
            .unwrap()
            .is_none());
        let b = repo
            .set_booking_status("2", BookingStatus::Approved)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(b.status, BookingStatus::Approved);
    }

    #[tokio::test]
    async fn test_booked_slots_window() {
        let repo = FixtureRepository::seeded();
        let slots = repo
            .booked_slots("1", d("2025-09-14"), d("2025-09-20"))
            .await
            .unwrap();
        assert_eq!(slots, vec![(d("2025-09-15"), 18)]);
        let none = repo
            .booked_slots("1", d("2025-09-16"), d("2025-09-20"))
            .await
            .unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn test_toggle_favorite_twice() {
        let repo = FixtureRepository::seeded();
        assert!(repo.toggle_favorite("demo-user-1", "1").await.unwrap());
        assert!(!repo.toggle_favorite("demo-user-1", "1").await.unwrap());
        assert!(matches!(
            repo.toggle_favorite("demo-user-1", "missing").await,
            Err(RepositoryError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_field_with_bookings_cannot_be_deleted() {
        let repo = FixtureRepository::seeded();
        assert!(matches!(
            repo.delete_field("1").await,
            Err(RepositoryError::Conflict(_))
        ));
        assert!(repo.get_field("1").await.unwrap().is_some());
        let mine = repo.list_bookings(Some("demo-user-1")).await.unwrap();
        assert!(mine.iter().all(|b| b.field.is_some()));
    }

    #[tokio::test]
    async fn test_field_crud() {
        let repo = FixtureRepository::empty();
        let created = repo
            .create_field(NewField {
                name: "Terrain Test".to_string(),
                address: "Rue 1".to_string(),
                price_per_hour: 100,
                description: String::new(),
                image_url: String::new(),
                latitude: 32.0,
                longitude: -7.0,
                rating: 0.0,
                amenities: Default::default(),
            })
            .await
            .unwrap();
        let patched = repo
            .update_field(
                &created.id,
                FieldPatch {
                    price_per_hour: Some(110),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(patched.price_per_hour, 110);
        assert!(repo.delete_field(&created.id).await.unwrap());
        assert!(!repo.delete_field(&created.id).await.unwrap());
        assert!(repo.get_field(&created.id).await.unwrap().is_none());
    }
}
