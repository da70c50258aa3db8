use axum::{extract::State, routing::post, Json, Router};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, instrument, warn};

use crate::auth::dto::{LoginRequest, SessionResponse, SignupRequest, SignupResponse};
use crate::auth::password::{hash_password, verify_password};
use crate::auth::repo::User;
use crate::auth::token::generate_token;
use crate::error::ApiError;
use crate::state::AppState;

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/user/signup", post(signup))
        .route("/user/login", post(login))
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

#[instrument(skip(state, payload))]
pub async fn signup(
    State(state): State<AppState>,
    Json(payload): Json<SignupRequest>,
) -> Result<Json<SignupResponse>, ApiError> {
    let email = payload
        .email
        .as_deref()
        .map(|e| e.trim().to_lowercase())
        .filter(|e| !e.is_empty())
        .ok_or(ApiError::MissingField("email"))?;
    let username = payload
        .username
        .filter(|u| !u.is_empty())
        .ok_or(ApiError::MissingField("username"))?;
    let password = payload
        .password
        .filter(|p| !p.is_empty())
        .ok_or(ApiError::MissingField("password"))?;

    if !is_valid_email(&email) {
        warn!(email = %email, "invalid email");
        return Err(ApiError::Validation("Invalid email".into()));
    }

    // Ensure email is not taken
    if User::find_by_email(&state.db, &email).await?.is_some() {
        warn!(email = %email, "email already registered");
        return Err(ApiError::DuplicateEmail);
    }

    let hash = hash_password(&password)?;
    let token = generate_token();

    let user = User::create(
        &state.db,
        &email,
        &username,
        payload.phone.as_deref(),
        &hash,
        &token,
    )
    .await?;

    info!(user_id = %user.id, email = %user.email, "user registered");
    Ok(Json(SignupResponse {
        id: user.id,
        email: user.email.clone(),
        account: user.account(),
        token: user.token,
    }))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(mut payload): Json<LoginRequest>,
) -> Result<Json<SessionResponse>, ApiError> {
    payload.email = payload.email.trim().to_lowercase();

    let user = User::find_by_email(&state.db, &payload.email)
        .await?
        .ok_or_else(|| {
            warn!(email = %payload.email, "login unknown email");
            ApiError::NotFound("user")
        })?;

    let ok = verify_password(&payload.password, &user.password_hash)?;
    if !ok {
        warn!(email = %payload.email, user_id = %user.id, "login invalid password");
        return Err(ApiError::Unauthorized);
    }

    info!(user_id = %user.id, email = %user.email, "user logged in");
    Ok(Json(SessionResponse {
        id: user.id,
        account: user.account(),
        token: user.token,
    }))
}
