use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use mollysou_core::Data;
use mollysou_database::impls::cart::{
    add_to_cart, clear_cart, count_cart_items, list_cart, remove_from_cart, update_cart_quantity,
};
use mollysou_database::model::cart::CartItem;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::{ApiError, ApiResult, RouteMeta};

pub const LIST_META: RouteMeta = RouteMeta {
    method: "GET",
    path: "/api/cart/{user_id}",
    desc: "Items in a user's cart.",
    category: "cart",
};

pub const ADD_META: RouteMeta = RouteMeta {
    method: "POST",
    path: "/api/cart/{user_id}/add",
    desc: "Add a product, merging with an existing line.",
    category: "cart",
};

pub const UPDATE_META: RouteMeta = RouteMeta {
    method: "PUT",
    path: "/api/cart/{user_id}/update/{product_id}",
    desc: "Set a line's `?quantity=`; zero removes it.",
    category: "cart",
};

pub const REMOVE_META: RouteMeta = RouteMeta {
    method: "DELETE",
    path: "/api/cart/{user_id}/remove/{product_id}",
    desc: "Remove a product from the cart.",
    category: "cart",
};

pub const CLEAR_META: RouteMeta = RouteMeta {
    method: "DELETE",
    path: "/api/cart/{user_id}/clear",
    desc: "Empty the cart.",
    category: "cart",
};

pub const COUNT_META: RouteMeta = RouteMeta {
    method: "GET",
    path: "/api/cart/{user_id}/count",
    desc: "Number of lines in the cart.",
    category: "cart",
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddToCartRequest {
    pub product_id: u64,
    #[serde(default = "default_quantity")]
    pub quantity: i32,
}

fn default_quantity() -> i32 {
    1
}

#[derive(Debug, Deserialize)]
pub struct QuantityQuery {
    pub quantity: i32,
}

#[derive(Debug, Serialize)]
pub struct CountView {
    pub count: u64,
}

pub async fn list(
    State(data): State<Data>,
    ApiPath(user_id): ApiPath<u64>,
) -> ApiResult<Vec<CartItem>> {
    Ok(Json(list_cart(&data.db, user_id).await?))
}

pub async fn add(
    State(data): State<Data>,
    ApiPath(user_id): ApiPath<u64>,
    ApiJson(request): ApiJson<AddToCartRequest>,
) -> ApiResult<CartItem> {
    if request.quantity <= 0 {
        return Err(ApiError::bad_request("Quantity must be at least 1."));
    }

    let item = add_to_cart(&data.db, user_id, request.product_id, request.quantity).await?;
    debug!(
        user_id,
        product_id = request.product_id,
        quantity = item.quantity,
        "cart line updated"
    );
    Ok(Json(item))
}

pub async fn update(
    State(data): State<Data>,
    ApiPath((user_id, product_id)): ApiPath<(u64, u64)>,
    ApiQuery(query): ApiQuery<QuantityQuery>,
) -> Result<StatusCode, ApiError> {
    update_cart_quantity(&data.db, user_id, product_id, query.quantity).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn remove(
    State(data): State<Data>,
    ApiPath((user_id, product_id)): ApiPath<(u64, u64)>,
) -> Result<StatusCode, ApiError> {
    if remove_from_cart(&data.db, user_id, product_id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found(format!(
            "product {product_id} is not in the cart"
        )))
    }
}

pub async fn clear(
    State(data): State<Data>,
    ApiPath(user_id): ApiPath<u64>,
) -> Result<StatusCode, ApiError> {
    let removed = clear_cart(&data.db, user_id).await?;
    debug!(user_id, removed, "cart cleared");
    Ok(StatusCode::NO_CONTENT)
}

pub async fn count(
    State(data): State<Data>,
    ApiPath(user_id): ApiPath<u64>,
) -> ApiResult<CountView> {
    let count = count_cart_items(&data.db, user_id).await?;
    Ok(Json(CountView { count }))
}
