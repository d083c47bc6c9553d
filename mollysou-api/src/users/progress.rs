use axum::Json;
use axum::extract::State;
use mollysou_core::Data;
use serde::Deserialize;

use crate::users::ProgressView;
use crate::extract::{ApiJson, ApiPath};
use crate::{ApiError, ApiResult, RouteMeta};

pub const ADD_POINTS_META: RouteMeta = RouteMeta {
    method: "POST",
    path: "/api/users/{user_id}/add-points",
    desc: "Award a non-negative amount of points; the same amount is granted as XP.",
    category: "users",
};

pub const ADD_XP_META: RouteMeta = RouteMeta {
    method: "POST",
    path: "/api/users/{user_id}/add-xp",
    desc: "Award a non-negative amount of XP.",
    category: "users",
};

pub const UPDATE_POINTS_XP_META: RouteMeta = RouteMeta {
    method: "POST",
    path: "/api/users/{user_id}/update-points-xp",
    desc: "Apply point and XP deltas; results below zero are refused.",
    category: "users",
};

#[derive(Debug, Deserialize)]
pub struct AddPointsRequest {
    pub points: i32,
}

#[derive(Debug, Deserialize)]
pub struct AddXpRequest {
    pub xp: i32,
}

#[derive(Debug, Deserialize)]
pub struct UpdatePointsXpRequest {
    #[serde(default)]
    pub points: i32,
    #[serde(default)]
    pub xp: i32,
}

pub async fn add_points(
    State(data): State<Data>,
    ApiPath(user_id): ApiPath<u64>,
    ApiJson(request): ApiJson<AddPointsRequest>,
) -> ApiResult<ProgressView> {
    let amount = non_negative("points", request.points)?;
    let progress = data.progress.grant(user_id, amount, amount).await?;
    Ok(Json(progress.into()))
}

pub async fn add_xp(
    State(data): State<Data>,
    ApiPath(user_id): ApiPath<u64>,
    ApiJson(request): ApiJson<AddXpRequest>,
) -> ApiResult<ProgressView> {
    let xp = non_negative("xp", request.xp)?;
    let progress = data.progress.grant(user_id, 0, xp).await?;
    Ok(Json(progress.into()))
}

pub async fn update_points_xp(
    State(data): State<Data>,
    ApiPath(user_id): ApiPath<u64>,
    ApiJson(request): ApiJson<UpdatePointsXpRequest>,
) -> ApiResult<ProgressView> {
    let progress = data
        .progress
        .grant(user_id, i64::from(request.points), i64::from(request.xp))
        .await?;
    Ok(Json(progress.into()))
}

fn non_negative(field: &str, amount: i32) -> Result<i64, ApiError> {
    if amount < 0 {
        return Err(ApiError::bad_request(format!(
            "`{field}` must not be negative (got {amount})"
        )));
    }
    Ok(i64::from(amount))
}
