use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use mollysou_core::Data;
use mollysou_core::auth::{MIN_PASSWORD_LEN, hash_password, normalize_email};
use mollysou_database::impls::users::create_user;
use mollysou_database::model::user::NewUser;
use serde::Deserialize;
use tracing::info;

use crate::extract::ApiJson;
use crate::users::UserView;
use crate::{ApiError, RouteMeta};

pub const META: RouteMeta = RouteMeta {
    method: "POST",
    path: "/api/users/register",
    desc: "Register a user with a password and starting progression.",
    category: "users",
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub full_name: Option<String>,
    pub gender: Option<String>,
    pub profile_photo: Option<String>,
}

pub async fn register(
    State(data): State<Data>,
    ApiJson(request): ApiJson<RegisterRequest>,
) -> Result<(StatusCode, Json<UserView>), ApiError> {
    let Some(email) = normalize_email(&request.email) else {
        return Err(ApiError::bad_request("A valid email is required."));
    };
    if request.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ApiError::bad_request(format!(
            "Passwords need at least {MIN_PASSWORD_LEN} characters."
        )));
    }

    let password_hash = hash_password(request.password).await?;

    let user = create_user(
        &data.db,
        NewUser {
            email: &email,
            password_hash: &password_hash,
            full_name: request.full_name.as_deref(),
            gender: request.gender.as_deref(),
            profile_photo: request.profile_photo.as_deref(),
        },
    )
    .await?;

    info!(user_id = user.id, "user registered");
    Ok((StatusCode::CREATED, Json(UserView::from(user))))
}
