use std::sync::Arc;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use serde::Serialize;

use crate::errors::AppError;
use crate::handlers::{authenticate, session_db};
use crate::models::{Identity, User};
use crate::session::SessionContext;
use crate::state::AppState;
use crate::validation::{LoginForm, RegisterForm};

#[derive(Serialize)]
pub struct SessionResponse {
    token: String,
    user: User,
}

fn open_session(state: &AppState, identity: Identity) -> Result<SessionResponse, AppError> {
    let session = {
        let db = session_db(state)?;
        SessionContext::establish(&db, identity)?
    };
    Ok(SessionResponse {
        token: session.token().to_string(),
        user: session.user().clone(),
    })
}

// POST /api/auth/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(form): Json<LoginForm>,
) -> Result<Json<SessionResponse>, AppError> {
    form.validate()?;
    let identity = state.repo.sign_in(form.email.trim(), &form.password).await?;
    Ok(Json(open_session(&state, identity)?))
}

// POST /api/auth/register
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(form): Json<RegisterForm>,
) -> Result<(StatusCode, Json<SessionResponse>), AppError> {
    form.validate()?;
    let identity = state
        .repo
        .sign_up(form.name.trim(), form.email.trim(), &form.password)
        .await?;
    tracing::info!(user_id = %identity.user.id, "account registered");
    Ok((StatusCode::CREATED, Json(open_session(&state, identity)?)))
}

// POST /api/auth/logout
pub async fn logout(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<StatusCode, AppError> {
    let session = authenticate(&state, &headers)?;
    let backend_token = {
        let db = session_db(&state)?;
        session.teardown(&db)?
    };

    if let Err(e) = state.repo.sign_out(backend_token.as_deref()).await {
        tracing::warn!(error = %e, "backend sign-out failed");
    }
    Ok(StatusCode::NO_CONTENT)
}

// GET /api/auth/me
pub async fn me(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<User>, AppError> {
    let session = authenticate(&state, &headers)?;
    Ok(Json(session.user().clone()))
}
