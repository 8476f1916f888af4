use chrono::{Duration, Utc};
use rusqlite::Connection;

use crate::db::queries::{self, StoredSession};
use crate::errors::AppError;
use crate::models::{Identity, Role, User};

/// The signed-in caller of a request.
///
/// Created by [`SessionContext::establish`] on login, rebuilt from the
/// session store by [`SessionContext::hydrate`] on every later request and
/// destroyed by [`SessionContext::teardown`] on logout.
#[derive(Debug, Clone)]
pub struct SessionContext {
    token: String,
    user: User,
    backend_token: Option<String>,
}

impl SessionContext {
    pub fn establish(conn: &Connection, identity: Identity) -> anyhow::Result<Self> {
        let token = uuid::Uuid::new_v4().to_string();
        queries::save_session(
            conn,
            &StoredSession {
                token: token.clone(),
                user: identity.user.clone(),
                backend_token: identity.backend_token.clone(),
                created_at: Utc::now().naive_utc(),
            },
        )?;
        tracing::info!(user_id = %identity.user.id, "session established");
        Ok(Self {
            token,
            user: identity.user,
            backend_token: identity.backend_token,
        })
    }

    /// Sessions older than `max_age` are pruned first, so an expired token
    /// hydrates to `None`.
    pub fn hydrate(conn: &Connection, token: &str, max_age: Duration) -> anyhow::Result<Option<Self>> {
        let pruned = queries::prune_sessions(conn, Utc::now().naive_utc() - max_age)?;
        if pruned > 0 {
            tracing::debug!(pruned, "expired sessions removed");
        }
        Ok(queries::get_session(conn, token)?.map(|s| Self {
            token: s.token,
            user: s.user,
            backend_token: s.backend_token,
        }))
    }

    /// Removes the stored session. Returns the backend token so the caller
    /// can sign out upstream.
    pub fn teardown(self, conn: &Connection) -> anyhow::Result<Option<String>> {
        queries::delete_session(conn, &self.token)?;
        tracing::info!(user_id = %self.user.id, "session cleared");
        Ok(self.backend_token)
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn user(&self) -> &User {
        &self.user
    }

    pub fn is_admin(&self) -> bool {
        self.user.role == Role::Admin
    }

    pub fn require_admin(&self) -> Result<(), AppError> {
        if self.is_admin() {
            Ok(())
        } else {
            tracing::warn!(user_id = %self.user.id, "non-admin attempted admin action");
            Err(AppError::Forbidden)
        }
    }
}
