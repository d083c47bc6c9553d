use axum::Json;
use axum::extract::State;
use mollysou_core::Data;
use mollysou_database::impls::events::{get_event, list_events, list_popular_events};
use mollysou_database::model::catalog::Event;

use crate::extract::ApiPath;
use crate::{ApiError, ApiResult, RouteMeta};

pub const LIST_META: RouteMeta = RouteMeta {
    method: "GET",
    path: "/api/events",
    desc: "Events ordered by date.",
    category: "catalog",
};

pub const POPULAR_META: RouteMeta = RouteMeta {
    method: "GET",
    path: "/api/events/popular",
    desc: "The next few events by date.",
    category: "catalog",
};

pub const GET_META: RouteMeta = RouteMeta {
    method: "GET",
    path: "/api/events/{event_id}",
    desc: "A single event.",
    category: "catalog",
};

pub async fn list(State(data): State<Data>) -> ApiResult<Vec<Event>> {
    Ok(Json(list_events(&data.db).await?))
}

pub async fn popular(State(data): State<Data>) -> ApiResult<Vec<Event>> {
    Ok(Json(list_popular_events(&data.db).await?))
}

pub async fn get(State(data): State<Data>, ApiPath(event_id): ApiPath<u64>) -> ApiResult<Event> {
    get_event(&data.db, event_id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("event {event_id} not found")))
}
