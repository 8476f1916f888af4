use chrono::{NaiveDateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use crate::models::{Role, User};

#[derive(Debug, Clone)]
pub struct StoredSession {
    pub token: String,
    pub user: User,
    pub backend_token: Option<String>,
    pub created_at: NaiveDateTime,
}

// ── Sessions ──

pub fn save_session(conn: &Connection, session: &StoredSession) -> anyhow::Result<()> {
    let created_at = session.created_at.format("%Y-%m-%d %H:%M:%S").to_string();

    conn.execute(
        "INSERT INTO sessions (token, user_id, name, email, role, backend_token, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
         ON CONFLICT(token) DO UPDATE SET
           user_id = excluded.user_id,
           name = excluded.name,
           email = excluded.email,
           role = excluded.role,
           backend_token = excluded.backend_token",
        params![
            session.token,
            session.user.id,
            session.user.name,
            session.user.email,
            session.user.role.as_str(),
            session.backend_token,
            created_at,
        ],
    )?;
    Ok(())
}

pub fn get_session(conn: &Connection, token: &str) -> anyhow::Result<Option<StoredSession>> {
    let row = conn
        .query_row(
            "SELECT token, user_id, name, email, role, backend_token, created_at
             FROM sessions WHERE token = ?1",
            params![token],
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, String>(4)?,
                    row.get::<_, Option<String>>(5)?,
                    row.get::<_, String>(6)?,
                ))
            },
        )
        .optional()?;

    Ok(row.map(
        |(token, user_id, name, email, role, backend_token, created_at)| StoredSession {
            token,
            user: User {
                id: user_id,
                name,
                email,
                role: Role::parse(&role),
            },
            backend_token,
            created_at: NaiveDateTime::parse_from_str(&created_at, "%Y-%m-%d %H:%M:%S")
                .unwrap_or_else(|_| Utc::now().naive_utc()),
        },
    ))
}

pub fn delete_session(conn: &Connection, token: &str) -> anyhow::Result<bool> {
    let count = conn.execute("DELETE FROM sessions WHERE token = ?1", params![token])?;
    Ok(count > 0)
}

/// Deletes sessions created before `cutoff`.
pub fn prune_sessions(conn: &Connection, cutoff: NaiveDateTime) -> anyhow::Result<usize> {
    let cutoff = cutoff.format("%Y-%m-%d %H:%M:%S").to_string();
    let count = conn.execute("DELETE FROM sessions WHERE created_at < ?1", params![cutoff])?;
    Ok(count)
}
