use axum::Json;
use axum::extract::State;
use mollysou_core::Data;
use mollysou_database::impls::products::{get_product, list_available_products};
use mollysou_database::model::catalog::Product;

use crate::extract::ApiPath;
use crate::{ApiError, ApiResult, RouteMeta};

pub const LIST_META: RouteMeta = RouteMeta {
    method: "GET",
    path: "/api/products",
    desc: "Every product currently available.",
    category: "catalog",
};

pub const GET_META: RouteMeta = RouteMeta {
    method: "GET",
    path: "/api/products/{product_id}",
    desc: "A single product.",
    category: "catalog",
};

pub async fn list(State(data): State<Data>) -> ApiResult<Vec<Product>> {
    Ok(Json(list_available_products(&data.db).await?))
}

pub async fn get(
    State(data): State<Data>,
    ApiPath(product_id): ApiPath<u64>,
) -> ApiResult<Product> {
    get_product(&data.db, product_id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("product {product_id} not found")))
}
