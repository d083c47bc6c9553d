use axum::Json;
use axum::extract::State;
use mollysou_core::Data;
use mollysou_progression::ActionKind;

use crate::users::{CooldownView, ProgressView};
use crate::extract::ApiPath;
use crate::{ApiError, ApiResult, RouteMeta};

pub const TOUCH_META: RouteMeta = RouteMeta {
    method: "POST",
    path: "/api/users/{user_id}/cooldown/{action}",
    desc: "Start the cooldown of wheel, puzzle, video or reflex.",
    category: "users",
};

pub const LIST_META: RouteMeta = RouteMeta {
    method: "GET",
    path: "/api/users/{user_id}/cooldowns",
    desc: "Remaining cooldown seconds for every action.",
    category: "users",
};

pub async fn touch(
    State(data): State<Data>,
    ApiPath((user_id, action)): ApiPath<(u64, String)>,
) -> ApiResult<ProgressView> {
    let kind = action
        .parse::<ActionKind>()
        .map_err(|e| ApiError::bad_request(e.to_string()))?;

    let progress = data.progress.touch_cooldown(user_id, kind).await?;
    Ok(Json(progress.into()))
}

pub async fn list(
    State(data): State<Data>,
    ApiPath(user_id): ApiPath<u64>,
) -> ApiResult<CooldownView> {
    let cooldowns = data.progress.cooldowns(user_id).await?;
    Ok(Json(cooldowns.into()))
}
