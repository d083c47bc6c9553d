use axum::Json;
use axum::extract::State;
use mollysou_core::Data;
use mollysou_database::impls::users::get_user;

use crate::users::UserView;
use crate::extract::ApiPath;
use crate::{ApiError, ApiResult, RouteMeta};

pub const META: RouteMeta = RouteMeta {
    method: "GET",
    path: "/api/users/{user_id}",
    desc: "Fetch a user profile with progression.",
    category: "users",
};

pub async fn profile(
    State(data): State<Data>,
    ApiPath(user_id): ApiPath<u64>,
) -> ApiResult<UserView> {
    match get_user(&data.db, user_id).await? {
        Some(user) => Ok(Json(UserView::from(user))),
        None => Err(ApiError::not_found(format!("user {user_id} not found"))),
    }
}
