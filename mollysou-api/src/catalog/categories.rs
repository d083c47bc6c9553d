use axum::Json;
use axum::extract::State;
use mollysou_core::Data;
use mollysou_database::impls::categories::{get_category, list_categories};
use mollysou_database::impls::products::list_products_by_category;
use mollysou_database::model::catalog::{Category, Product};

use crate::extract::ApiPath;
use crate::{ApiError, ApiResult, RouteMeta};

pub const LIST_META: RouteMeta = RouteMeta {
    method: "GET",
    path: "/api/categories",
    desc: "All categories with their product counts.",
    category: "catalog",
};

pub const GET_META: RouteMeta = RouteMeta {
    method: "GET",
    path: "/api/categories/{category_id}",
    desc: "A single category.",
    category: "catalog",
};

pub const PRODUCTS_META: RouteMeta = RouteMeta {
    method: "GET",
    path: "/api/categories/{category_id}/products",
    desc: "Products in a category.",
    category: "catalog",
};

pub async fn list(State(data): State<Data>) -> ApiResult<Vec<Category>> {
    Ok(Json(list_categories(&data.db).await?))
}

pub async fn get(
    State(data): State<Data>,
    ApiPath(category_id): ApiPath<u64>,
) -> ApiResult<Category> {
    get_category(&data.db, category_id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("category {category_id} not found")))
}

pub async fn products(
    State(data): State<Data>,
    ApiPath(category_id): ApiPath<u64>,
) -> ApiResult<Vec<Product>> {
    Ok(Json(list_products_by_category(&data.db, category_id).await?))
}
