use anyhow::Context as _;

use crate::cache::{
    CATALOG_CACHE_TTL, available_products_key, category_products_key, product_key,
};
use crate::database::Database;
use crate::model::catalog::Product;

const PRODUCT_SELECT: &str = "SELECT p.id, p.name, p.description, p.price_cents, p.image, p.stock,
            p.rating, p.available, p.category_id, c.name AS category_name
     FROM products p
     LEFT JOIN categories c ON c.id = p.category_id";

#[derive(sqlx::FromRow)]
struct ProductRow {
    id: i64,
    name: String,
    description: Option<String>,
    price_cents: i64,
    image: Option<String>,
    stock: i32,
    rating: f64,
    available: bool,
    category_id: Option<i64>,
    category_name: Option<String>,
}

pub async fn list_available_products(db: &Database) -> anyhow::Result<Vec<Product>> {
    let cache_key = available_products_key(db.cache());
    db.cache()
        .read_through(&cache_key, CATALOG_CACHE_TTL, || async {
            let rows: Vec<ProductRow> = sqlx::query_as(&format!(
                "{PRODUCT_SELECT}
                 WHERE p.available = TRUE
                 ORDER BY p.id ASC"
            ))
            .fetch_all(db.pool())
            .await?;

            rows.into_iter().map(to_product).collect()
        })
        .await
}

pub async fn list_products_by_category(
    db: &Database,
    category_id: u64,
) -> anyhow::Result<Vec<Product>> {
    let cache_key = category_products_key(db.cache(), category_id);
    db.cache()
        .read_through(&cache_key, CATALOG_CACHE_TTL, || async {
            let category_id_i64 =
                i64::try_from(category_id).context("category_id out of i64 range")?;

            let rows: Vec<ProductRow> = sqlx::query_as(&format!(
                "{PRODUCT_SELECT}
                 WHERE p.category_id = $1
                 ORDER BY p.id ASC"
            ))
            .bind(category_id_i64)
            .fetch_all(db.pool())
            .await?;

            rows.into_iter().map(to_product).collect()
        })
        .await
}

pub async fn get_product(db: &Database, product_id: u64) -> anyhow::Result<Option<Product>> {
    let cache_key = product_key(db.cache(), product_id);
    db.cache()
        .read_through(&cache_key, CATALOG_CACHE_TTL, || async {
            let product_id_i64 =
                i64::try_from(product_id).context("product_id out of i64 range")?;

            let row: Option<ProductRow> =
                sqlx::query_as(&format!("{PRODUCT_SELECT} WHERE p.id = $1"))
                    .bind(product_id_i64)
                    .fetch_optional(db.pool())
                    .await?;

            row.map(to_product).transpose()
        })
        .await
}

fn to_product(row: ProductRow) -> anyhow::Result<Product> {
    Ok(Product {
        id: u64::try_from(row.id).context("id row out of u64 range")?,
        name: row.name,
        description: row.description,
        price_cents: row.price_cents,
        image: row.image,
        stock: row.stock,
        rating: row.rating,
        available: row.available,
        category_id: row
            .category_id
            .map(u64::try_from)
            .transpose()
            .context("category_id row out of u64 range")?,
        category_name: row.category_name,
    })
}
