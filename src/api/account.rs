//! Registration and login.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Deserialize;
use serde_json::json;
use validator::Validate;
use super::ValidJson;
use crate::auth::{hash_password, issue_token, verify_password};
use crate::domain::aggregates::User;
use crate::{AppState, BackofficeError, Result};

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(required(message = "All fields are required"), length(min = 1, message = "All fields are required"))]
    pub name: Option<String>,
    #[validate(required(message = "All fields are required"), email(message = "Please enter a valid email"))]
    pub email: Option<String>,
    #[validate(required(message = "All fields are required"), length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(required(message = "Email and password are required"))]
    pub email: Option<String>,
    #[validate(required(message = "Email and password are required"))]
    pub password: Option<String>,
}

pub async fn register(State(s): State<AppState>, ValidJson(r): ValidJson<RegisterRequest>) -> Result<impl IntoResponse> {
    let (Some(name), Some(email), Some(password)) = (r.name, r.email, r.password) else {
        return Err(BackofficeError::validation("All fields are required"));
    };
    let name = name.trim().to_string();
    if name.is_empty() { return Err(BackofficeError::validation("All fields are required")); }
    if s.store.find_user_by_email(&email).await?.is_some() {
        return Err(BackofficeError::Duplicate("User"));
    }
    let user = User::create(name, &email, hash_password(&password)?);
    s.store.insert_user(&user).await?;
    tracing::info!(user_id = %user.id, "user registered");
    Ok((StatusCode::CREATED, Json(json!({ "message": "User registered successfully", "user": user.public() }))))
}

pub async fn login(State(s): State<AppState>, ValidJson(r): ValidJson<LoginRequest>) -> Result<impl IntoResponse> {
    let (Some(email), Some(password)) = (r.email, r.password) else {
        return Err(BackofficeError::validation("Email and password are required"));
    };
    let user = s.store.find_user_by_email(&email).await?.ok_or(BackofficeError::InvalidCredentials)?;
    if !verify_password(&password, &user.password_hash)? {
        tracing::warn!(user_id = %user.id, "login with wrong password");
        return Err(BackofficeError::InvalidCredentials);
    }
    let token = issue_token(&s.config.jwt_secret, &user, s.config.token_ttl_minutes)?;
    Ok(Json(json!({ "message": "Login successful", "token": token, "user": user.public() })))
}
