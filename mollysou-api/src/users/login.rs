use axum::Json;
use axum::extract::State;
use mollysou_core::Data;
use mollysou_core::auth::{normalize_email, verify_password};
use mollysou_database::impls::users::find_credentials;
use serde::Deserialize;
use tracing::{debug, info};

use crate::extract::ApiJson;
use crate::users::UserView;
use crate::{ApiError, ApiResult, RouteMeta};

pub const META: RouteMeta = RouteMeta {
    method: "POST",
    path: "/api/users/login",
    desc: "Check an email and password; returns the user on success.",
    category: "users",
};

const BAD_CREDENTIALS: &str = "Invalid email or password.";

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

pub async fn login(
    State(data): State<Data>,
    ApiJson(request): ApiJson<LoginRequest>,
) -> ApiResult<UserView> {
    let Some(email) = normalize_email(&request.email) else {
        return Err(ApiError::unauthorized(BAD_CREDENTIALS));
    };

    let Some((user, Some(stored_hash))) = find_credentials(&data.db, &email).await? else {
        debug!("login for unknown email or user without password");
        return Err(ApiError::unauthorized(BAD_CREDENTIALS));
    };

    if !verify_password(request.password, stored_hash).await? {
        debug!(user_id = user.id, "login with wrong password");
        return Err(ApiError::unauthorized(BAD_CREDENTIALS));
    }

    info!(user_id = user.id, "user logged in");
    Ok(Json(UserView::from(user)))
}
