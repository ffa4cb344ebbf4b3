use axum::extract::State;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::{Deserialize, Serialize};

use crate::auth::{
    generate_token, hash_password, hash_token, verify_password, AuthUser, SESSION_COOKIE,
};
use crate::error::{AppError, Result};
use crate::extract::Json;
use crate::models::{CreateUser, UserResponse};
use crate::repo::session::SESSION_TTL_DAYS;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub user: UserResponse,
}

pub async fn register(
    State(state): State<AppState>,
    Json(input): Json<CreateUser>,
) -> Result<Json<AuthResponse>> {
    if input.email.trim().is_empty() || input.password.is_empty() || input.name.trim().is_empty() {
        return Err(AppError::Validation("All fields are required".to_string()));
    }

    if input.password.len() < 8 {
        return Err(AppError::Validation(
            "Password must be at least 8 characters".to_string(),
        ));
    }

    if state.users.email_taken(&input.email).await? {
        return Err(AppError::BadRequest("Email already registered".to_string()));
    }

    let password_hash = hash_password(&input.password)?;
    let user = state
        .users
        .create(&input.email, &password_hash, &input.name)
        .await?;
    tracing::info!(user_id = %user.id, "user registered");

    Ok(Json(AuthResponse { user: user.into() }))
}

pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(input): Json<LoginRequest>,
) -> Result<(CookieJar, Json<AuthResponse>)> {
    let user = state
        .users
        .find_by_email(&input.email)
        .await?
        .ok_or(AppError::Unauthorized)?;

    if !verify_password(&input.password, &user.password_hash)? {
        return Err(AppError::Unauthorized);
    }

    let token = generate_token();
    state.sessions.create(user.id, &hash_token(&token)).await?;

    let cookie = Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::days(SESSION_TTL_DAYS))
        .build();

    Ok((jar.add(cookie), Json(AuthResponse { user: user.into() })))
}

pub async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
    auth: AuthUser,
) -> Result<CookieJar> {
    state
        .sessions
        .delete_by_token_hash(&hash_token(&auth.session_token))
        .await?;

    let cookie = Cookie::build((SESSION_COOKIE, ""))
        .path("/")
        .http_only(true)
        .max_age(time::Duration::seconds(0))
        .build();

    Ok(jar.add(cookie))
}
