use std::collections::HashSet;

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};

use super::{RepoResult, Repository, RepositoryError};
use crate::models::{
    Booking, BookingStatus, Field, FieldPatch, Identity, NewBooking, NewField, Role, User,
};

const BOOKING_SELECT: &str = "*,field:fields(*)";

/// Hosted backend speaking PostgREST (`/rest/v1`) and GoTrue (`/auth/v1`).
pub struct LiveRepository {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

#[derive(Deserialize)]
struct IdRow {
    id: String,
}

#[derive(Deserialize)]
struct BookingIdRow {
    booking_id: String,
}

#[derive(Deserialize)]
struct SlotRow {
    date: NaiveDate,
    hour: u8,
}

#[derive(Deserialize)]
struct FavoriteRow {
    booking: Option<Booking>,
}

impl LiveRepository {
    pub fn new(base_url: String, api_key: String) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            client: reqwest::Client::new(),
        }
    }

    fn rest(&self, method: Method, table: &str) -> RequestBuilder {
        self.client
            .request(method, format!("{}/rest/v1/{table}", self.base_url))
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }

    fn auth(&self, path: &str) -> RequestBuilder {
        self.client
            .post(format!("{}/auth/v1/{path}", self.base_url))
            .header("apikey", &self.api_key)
    }

    async fn first<T: DeserializeOwned>(req: RequestBuilder) -> RepoResult<Option<T>> {
        let rows: Vec<T> = decode(req.send().await?).await?;
        Ok(rows.into_iter().next())
    }
}

async fn decode<T: DeserializeOwned>(resp: reqwest::Response) -> RepoResult<T> {
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(match status {
            StatusCode::CONFLICT => RepositoryError::Conflict(body),
            _ => RepositoryError::Status {
                status: status.as_u16(),
                body,
            },
        });
    }
    resp.json::<T>()
        .await
        .map_err(|e| RepositoryError::Decode(e.to_string()))
}

/// Builds a [`User`] from a GoTrue user object. The role is read from
/// `app_metadata` first, then `user_metadata`.
fn user_from_auth(user: &Value, fallback_name: Option<&str>) -> RepoResult<User> {
    let id = user["id"]
        .as_str()
        .ok_or_else(|| RepositoryError::Decode("auth response without user id".to_string()))?;
    let role = user["app_metadata"]["role"]
        .as_str()
        .or_else(|| user["user_metadata"]["role"].as_str())
        .map(Role::parse)
        .unwrap_or_default();
    let name = user["user_metadata"]["name"]
        .as_str()
        .or(fallback_name)
        .unwrap_or_default();

    Ok(User {
        id: id.to_string(),
        name: name.to_string(),
        email: user["email"].as_str().unwrap_or_default().to_string(),
        role,
    })
}

/// Sign-up answers with a session when auto-confirm is on, or with the bare
/// user object when email confirmation is pending.
fn identity_from_auth(body: &Value, fallback_name: Option<&str>) -> RepoResult<Identity> {
    let user = if body["user"].is_object() {
        &body["user"]
    } else {
        body
    };
    Ok(Identity {
        user: user_from_auth(user, fallback_name)?,
        backend_token: body["access_token"].as_str().map(str::to_string),
    })
}

#[async_trait]
impl Repository for LiveRepository {
    async fn sign_in(&self, email: &str, password: &str) -> RepoResult<Identity> {
        let resp = self
            .auth("token")
            .query(&[("grant_type", "password")])
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;

        match resp.status() {
            StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED => {
                Err(RepositoryError::InvalidCredentials)
            }
            _ => {
                let body: Value = decode(resp).await?;
                identity_from_auth(&body, None)
            }
        }
    }

    async fn sign_up(&self, name: &str, email: &str, password: &str) -> RepoResult<Identity> {
        let resp = self
            .auth("signup")
            .json(&json!({
                "email": email,
                "password": password,
                "data": { "name": name, "role": Role::User.as_str() },
            }))
            .send()
            .await?;

        if resp.status() == StatusCode::UNPROCESSABLE_ENTITY {
            let body = resp.text().await.unwrap_or_default();
            return Err(RepositoryError::Conflict(body));
        }
        let body: Value = decode(resp).await?;
        let mut identity = identity_from_auth(&body, Some(name))?;
        identity.user.role = Role::User;
        Ok(identity)
    }

    async fn sign_out(&self, backend_token: Option<&str>) -> RepoResult<()> {
        let Some(token) = backend_token else {
            return Ok(());
        };
        self.auth("logout")
            .bearer_auth(token)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    async fn list_fields(&self) -> RepoResult<Vec<Field>> {
        let resp = self
            .rest(Method::GET, "fields")
            .query(&[("select", "*")])
            .send()
            .await?;
        decode(resp).await
    }

    async fn get_field(&self, id: &str) -> RepoResult<Option<Field>> {
        Self::first(
            self.rest(Method::GET, "fields")
                .query(&[("select", "*".to_string()), ("id", format!("eq.{id}"))]),
        )
        .await
    }

    async fn create_field(&self, field: NewField) -> RepoResult<Field> {
        Self::first(
            self.rest(Method::POST, "fields")
                .header("Prefer", "return=representation")
                .json(&field),
        )
        .await?
        .ok_or_else(|| RepositoryError::Decode("insert returned no row".to_string()))
    }

    async fn update_field(&self, id: &str, patch: FieldPatch) -> RepoResult<Option<Field>> {
        Self::first(
            self.rest(Method::PATCH, "fields")
                .query(&[("id", format!("eq.{id}"))])
                .header("Prefer", "return=representation")
                .json(&patch),
        )
        .await
    }

    async fn delete_field(&self, id: &str) -> RepoResult<bool> {
        let deleted: Option<IdRow> = Self::first(
            self.rest(Method::DELETE, "fields")
                .query(&[("id", format!("eq.{id}"))])
                .header("Prefer", "return=representation"),
        )
        .await?;
        Ok(deleted.is_some())
    }

    async fn list_bookings(&self, viewer: Option<&str>) -> RepoResult<Vec<Booking>> {
        let mut query = vec![
            ("select", BOOKING_SELECT.to_string()),
            ("order", "date.desc,hour.desc".to_string()),
        ];
        if let Some(user_id) = viewer {
            query.push(("user_id", format!("eq.{user_id}")));
        }
        let resp = self.rest(Method::GET, "bookings").query(&query).send().await?;
        let mut bookings: Vec<Booking> = decode(resp).await?;

        let Some(user_id) = viewer else {
            return Ok(bookings);
        };
        let resp = self
            .rest(Method::GET, "favorites")
            .query(&[("select", "booking_id".to_string()), ("user_id", format!("eq.{user_id}"))])
            .send()
            .await?;
        let favorites: HashSet<String> = decode::<Vec<BookingIdRow>>(resp)
            .await?
            .into_iter()
            .map(|r| r.booking_id)
            .collect();
        for b in &mut bookings {
            b.is_favorite = favorites.contains(&b.id);
        }
        Ok(bookings)
    }

    async fn get_booking(&self, id: &str) -> RepoResult<Option<Booking>> {
        Self::first(
            self.rest(Method::GET, "bookings")
                .query(&[("select", BOOKING_SELECT.to_string()), ("id", format!("eq.{id}"))]),
        )
        .await
    }

    async fn insert_booking(&self, booking: NewBooking) -> RepoResult<Booking> {
        Self::first(
            self.rest(Method::POST, "bookings")
                .query(&[("select", BOOKING_SELECT)])
                .header("Prefer", "return=representation")
                .json(&booking),
        )
        .await?
        .ok_or_else(|| RepositoryError::Decode("insert returned no row".to_string()))
    }

    async fn set_booking_status(
        &self,
        id: &str,
        status: BookingStatus,
    ) -> RepoResult<Option<Booking>> {
        Self::first(
            self.rest(Method::PATCH, "bookings")
                .query(&[
                    ("select", BOOKING_SELECT.to_string()),
                    ("id", format!("eq.{id}")),
                    ("status", format!("eq.{}", BookingStatus::Pending.as_str())),
                ])
                .header("Prefer", "return=representation")
                .json(&json!({ "status": status })),
        )
        .await
    }

    async fn booked_slots(
        &self,
        field_id: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> RepoResult<Vec<(NaiveDate, u8)>> {
        let resp = self
            .rest(Method::GET, "bookings")
            .query(&[
                ("select", "date,hour".to_string()),
                ("field_id", format!("eq.{field_id}")),
                ("status", format!("neq.{}", BookingStatus::Rejected.as_str())),
                ("date", format!("gte.{from}")),
                ("date", format!("lte.{to}")),
            ])
            .send()
            .await?;
        let rows: Vec<SlotRow> = decode(resp).await?;
        Ok(rows.into_iter().map(|r| (r.date, r.hour)).collect())
    }

    async fn toggle_favorite(&self, user_id: &str, booking_id: &str) -> RepoResult<bool> {
        let existing: Option<IdRow> = Self::first(self.rest(Method::GET, "favorites").query(&[
            ("select", "id".to_string()),
            ("user_id", format!("eq.{user_id}")),
            ("booking_id", format!("eq.{booking_id}")),
        ]))
        .await?;

        match existing {
            Some(row) => {
                let resp = self
                    .rest(Method::DELETE, "favorites")
                    .query(&[("id", format!("eq.{}", row.id))])
                    .send()
                    .await?;
                if !resp.status().is_success() {
                    let status = resp.status().as_u16();
                    let body = resp.text().await.unwrap_or_default();
                    return Err(RepositoryError::Status { status, body });
                }
                Ok(false)
            }
            None => {
                let resp = self
                    .rest(Method::POST, "favorites")
                    .json(&json!({ "user_id": user_id, "booking_id": booking_id }))
                    .send()
                    .await?;
                if !resp.status().is_success() {
                    let status = resp.status().as_u16();
                    let body = resp.text().await.unwrap_or_default();
                    return Err(RepositoryError::Status { status, body });
                }
                Ok(true)
            }
        }
    }

    async fn list_favorites(&self, user_id: &str) -> RepoResult<Vec<Booking>> {
        let resp = self
            .rest(Method::GET, "favorites")
            .query(&[
                ("select", format!("booking:bookings({BOOKING_SELECT})")),
                ("user_id", format!("eq.{user_id}")),
            ])
            .send()
            .await?;
        let rows: Vec<FavoriteRow> = decode(resp).await?;
        Ok(rows
            .into_iter()
            .filter_map(|r| r.booking)
            .map(|mut b| {
                b.is_favorite = true;
                b
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_from_token_response() {
        let body = json!({
            "access_token": "jwt-abc",
            "user": {
                "id": "u-1",
                "email": "admin@sa3amatch.com",
                "app_metadata": { "role": "admin" },
                "user_metadata": { "name": "Admin User", "role": "user" }
            }
        });
        let identity = identity_from_auth(&body, None).unwrap();
        assert_eq!(identity.user.role, Role::Admin);
        assert_eq!(identity.user.name, "Admin User");
        assert_eq!(identity.backend_token.as_deref(), Some("jwt-abc"));
    }

    #[test]
    fn test_identity_from_unconfirmed_signup() {
        let body = json!({
            "id": "u-2",
            "email": "new@example.com",
            "user_metadata": {}
        });
        let identity = identity_from_auth(&body, Some("Newcomer")).unwrap();
        assert_eq!(identity.user.id, "u-2");
        assert_eq!(identity.user.name, "Newcomer");
        assert_eq!(identity.user.role, Role::User);
        assert!(identity.backend_token.is_none());
    }

    #[test]
    fn test_identity_requires_user_id() {
        assert!(matches!(
            identity_from_auth(&json!({ "access_token": "x" }), None),
            Err(RepositoryError::Decode(_))
        ));
    }

    #[test]
    fn test_booking_row_with_embedded_field() {
        let row = json!({
            "id": "b-1",
            "user_id": "u-1",
            "field_id": "f-1",
            "date": "2025-09-15",
            "hour": 18,
            "payment_type": "bank_transfer",
            "status": "approved",
            "reference": "SA3A-12345",
            "created_at": "2025-09-01T10:00:00+00:00",
            "updated_at": "2025-09-01T10:00:00+00:00",
            "field": {
                "id": "f-1",
                "name": "Stadium Khouribga",
                "address": "Boulevard Mohammed V, Khouribga",
                "price_per_hour": 150,
                "description": "Modern football field",
                "image_url": "",
                "latitude": 32.8959,
                "longitude": -6.919,
                "rating": 4.5,
                "amenities": ["Parking"],
                "created_at": "2025-01-01T00:00:00+00:00"
            }
        });
        let booking: Booking = serde_json::from_value(row).unwrap();
        assert_eq!(booking.status, BookingStatus::Approved);
        assert_eq!(booking.field.unwrap().price_per_hour, 150);
        assert!(!booking.is_favorite);
    }

    #[test]
    fn test_base_url_is_trimmed() {
        let repo = LiveRepository::new("https://db.example.com/".to_string(), "key".to_string());
        assert_eq!(repo.base_url, "https://db.example.com");
    }
}
