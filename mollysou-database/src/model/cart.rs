use serde::{Deserialize, Serialize};

/// A cart line joined with the product it refers to.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub id: u64,
    pub product_id: u64,
    pub product_name: String,
    pub product_image: Option<String>,
    pub price_cents: i64,
    pub quantity: i32,
    pub stock: i32,
    pub category: Option<String>,
}
