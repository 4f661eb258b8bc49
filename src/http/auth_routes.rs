use axum::{extract::rejection::JsonRejection, extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{info, instrument, warn};

use super::{blocking, error::AppError, extract::AuthUser, AppState};
use crate::auth::{hash_password, verify_password};
use crate::domain::{Role, User, UserCreate};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    first_name: Option<String>,
    last_name: Option<String>,
    email: Option<String>,
    password: Option<String>,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    email: Option<String>,
    password: Option<String>,
}

#[derive(Serialize)]
pub struct UserView {
    id: u64,
    username: String,
    email: String,
    role: Role,
}

impl From<&User> for UserView {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            role: user.role,
        }
    }
}

fn present(field: Option<String>) -> Option<String> {
    field.filter(|value| !value.trim().is_empty())
}

#[instrument(skip_all)]
pub async fn signup(
    State(state): State<AppState>,
    payload: Result<Json<SignupRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let Json(request) = payload?;

    let (Some(first_name), Some(last_name), Some(email), Some(password)) = (
        present(request.first_name),
        present(request.last_name),
        present(request.email),
        present(request.password),
    ) else {
        warn!("Signup missing required fields");
        return Err(AppError::BadRequest("All fields are required".to_string()));
    };

    let password_hash = blocking(move || hash_password(&password)).await?;

    let user = state
        .users
        .create_user(UserCreate {
            username: format!("{} {}", first_name.trim(), last_name.trim()),
            email,
            password_hash,
            role: Role::User,
        })
        .await?;

    info!(user_id = user.id, "User registered");
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "User registered successfully!", "userId": user.id })),
    ))
}

#[instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<Value>, AppError> {
    let Json(request) = payload?;

    let (Some(email), Some(password)) = (present(request.email), present(request.password)) else {
        return Err(AppError::BadRequest("Email and password are required".to_string()));
    };

    let invalid = || AppError::Unauthorized("Invalid credentials".to_string());

    let Some(user) = state.users.find_by_email(&email).await? else {
        info!("Login for unknown email");
        return Err(invalid());
    };

    let hash = user.password_hash.clone();
    if !blocking(move || verify_password(&password, &hash)).await? {
        info!(user_id = user.id, "Login with wrong password");
        return Err(invalid());
    }

    let token = state.tokens.issue(&user)?;
    info!(user_id = user.id, "User logged in");

    Ok(Json(json!({
        "message": "Logged in successfully",
        "token": token,
        "user": UserView::from(&user),
    })))
}

pub async fn me(AuthUser(claims): AuthUser) -> Json<Value> {
    Json(json!({ "user": claims }))
}
