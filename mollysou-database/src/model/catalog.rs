use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: u64,
    pub name: String,
    pub icon: Option<String>,
    pub color: Option<String>,
    pub description: Option<String>,
    pub product_count: u64,
}

/// Prices are stored in cents.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: u64,
    pub name: String,
    pub description: Option<String>,
    pub price_cents: i64,
    pub image: Option<String>,
    pub stock: i32,
    pub rating: f64,
    pub available: bool,
    pub category_id: Option<u64>,
    pub category_name: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: u64,
    pub title: String,
    pub description: Option<String>,
    pub starts_at: Option<u64>,
    pub price_cents: Option<i64>,
    pub image: Option<String>,
    pub location: Option<String>,
    pub rating: f64,
    pub event_type: Option<String>,
}
