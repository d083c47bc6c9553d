use anyhow::Context as _;

use crate::cache::{CATALOG_CACHE_TTL, categories_key, category_key};
use crate::database::Database;
use crate::model::catalog::Category;

#[derive(sqlx::FromRow)]
struct CategoryRow {
    id: i64,
    name: String,
    icon: Option<String>,
    color: Option<String>,
    description: Option<String>,
    product_count: i64,
}

pub async fn list_categories(db: &Database) -> anyhow::Result<Vec<Category>> {
    let cache_key = categories_key(db.cache());
    db.cache()
        .read_through(&cache_key, CATALOG_CACHE_TTL, || async {
            let rows: Vec<CategoryRow> = sqlx::query_as(
                "SELECT c.id, c.name, c.icon, c.color, c.description, COUNT(p.id) AS product_count
                 FROM categories c
                 LEFT JOIN products p ON p.category_id = c.id
                 GROUP BY c.id
                 ORDER BY c.id ASC",
            )
            .fetch_all(db.pool())
            .await?;

            rows.into_iter().map(to_category).collect()
        })
        .await
}

pub async fn get_category(db: &Database, category_id: u64) -> anyhow::Result<Option<Category>> {
    let cache_key = category_key(db.cache(), category_id);
    db.cache()
        .read_through(&cache_key, CATALOG_CACHE_TTL, || async {
            let category_id_i64 =
                i64::try_from(category_id).context("category_id out of i64 range")?;

            let row: Option<CategoryRow> = sqlx::query_as(
                "SELECT c.id, c.name, c.icon, c.color, c.description, COUNT(p.id) AS product_count
                 FROM categories c
                 LEFT JOIN products p ON p.category_id = c.id
                 WHERE c.id = $1
                 GROUP BY c.id",
            )
            .bind(category_id_i64)
            .fetch_optional(db.pool())
            .await?;

            row.map(to_category).transpose()
        })
        .await
}

fn to_category(row: CategoryRow) -> anyhow::Result<Category> {
    Ok(Category {
        id: u64::try_from(row.id).context("id row out of u64 range")?,
        name: row.name,
        icon: row.icon,
        color: row.color,
        description: row.description,
        product_count: u64::try_from(row.product_count)
            .context("product_count row out of u64 range")?,
    })
}
