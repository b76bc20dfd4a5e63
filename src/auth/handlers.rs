use axum::{
    extract::{rejection::JsonRejection, FromRef, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use lazy_static::lazy_static;
use regex::Regex;
use serde_json::{json, Value};
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{LoginRequest, LoginResponse, RegisterRequest},
        jwt::JwtKeys,
        password::{hash_password, verify_password},
        repo::{User, UserRepository},
    },
    config::SeedUser,
    error::ApiError,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
}

pub(crate) fn is_valid_username(username: &str) -> bool {
    lazy_static! {
        static ref USERNAME_RE: Regex = Regex::new(r"^[A-Za-z0-9_.@-]{3,80}$").unwrap();
    }
    USERNAME_RE.is_match(username)
}

/// Validates, hashes and stores a new account.
pub async fn create_user(
    users: &dyn UserRepository,
    username: &str,
    password: &str,
) -> Result<User, ApiError> {
    let username = username.trim();
    if !is_valid_username(username) {
        return Err(ApiError::validation("invalid username"));
    }
    let hash = hash_password(password)?;
    if users.find_by_username(username).await?.is_some() {
        return Err(ApiError::validation("user already exists"));
    }
    Ok(users.insert(username, &hash).await?)
}

/// Creates the configured bootstrap account when no user exists yet.
pub async fn ensure_seed_user(users: &dyn UserRepository, seed: &SeedUser) -> anyhow::Result<()> {
    if users.count().await? > 0 {
        return Ok(());
    }
    match create_user(users, &seed.username, &seed.password).await {
        Ok(user) => {
            info!(username = %user.username, "seed user created");
            Ok(())
        }
        Err(e) => Err(anyhow::anyhow!("seed user not created: {e}")),
    }
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let Json(payload) = payload.map_err(|e| ApiError::validation(e.body_text()))?;

    let user = create_user(state.users.as_ref(), &payload.username, &payload.password).await?;

    info!(user_id = %user.id, username = %user.username, "user registered");
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "user created" })),
    ))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, ApiError> {
    let Json(payload) = payload.map_err(|e| ApiError::validation(e.body_text()))?;
    let username = payload.username.trim();

    let Some(user) = state.users.find_by_username(username).await? else {
        warn!(%username, "login unknown user");
        return Err(ApiError::InvalidCredentials);
    };

    if !verify_password(&payload.password, &user.password_hash)? {
        warn!(user_id = %user.id, "login invalid password");
        return Err(ApiError::InvalidCredentials);
    }

    let token = JwtKeys::from_ref(&state).sign(user.id, &user.username)?;

    info!(user_id = %user.id, username = %user.username, "user logged in");
    Ok(Json(LoginResponse {
        token,
        username: user.username,
    }))
}
