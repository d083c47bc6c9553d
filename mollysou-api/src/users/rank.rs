use axum::Json;
use axum::extract::State;
use mollysou_core::Data;
use mollysou_progression::RankInfo;
use serde::Deserialize;

use crate::extract::{ApiPath, ApiQuery};
use crate::{ApiResult, RouteMeta};

pub const META: RouteMeta = RouteMeta {
    method: "GET",
    path: "/api/users/{user_id}/rank-info",
    desc: "Rank presentation for `?level=`, or for the user's own level.",
    category: "users",
};

#[derive(Debug, Deserialize)]
pub struct RankInfoQuery {
    pub level: Option<u32>,
}

pub async fn rank_info(
    State(data): State<Data>,
    ApiPath(user_id): ApiPath<u64>,
    ApiQuery(query): ApiQuery<RankInfoQuery>,
) -> ApiResult<RankInfo> {
    let level = match query.level {
        Some(level) => level,
        None => data.progress.progress(user_id).await?.level,
    };

    Ok(Json(data.progress.rank_info(level)))
}
