use anyhow::Context as _;
use mollysou_utils::time::now_unix_secs;
use sqlx::PgConnection;

use crate::database::Database;
use crate::error::StoreError;
use crate::impls::users::ensure_user_exists;
use crate::model::cart::CartItem;

const CART_ITEM_SELECT: &str = "SELECT ci.id, ci.product_id, p.name AS product_name, p.image AS product_image,
            p.price_cents, ci.quantity, p.stock, c.name AS category
     FROM cart_items ci
     JOIN products p ON p.id = ci.product_id
     LEFT JOIN categories c ON c.id = p.category_id";

#[derive(sqlx::FromRow)]
struct CartItemRow {
    id: i64,
    product_id: i64,
    product_name: String,
    product_image: Option<String>,
    price_cents: i64,
    quantity: i32,
    stock: i32,
    category: Option<String>,
}

pub async fn list_cart(db: &Database, user_id: u64) -> Result<Vec<CartItem>, StoreError> {
    let user_id_i64 = i64::try_from(user_id).context("user_id out of i64 range")?;

    let mut conn = db.pool().acquire().await?;
    ensure_user_exists(&mut conn, user_id).await?;

    let rows: Vec<CartItemRow> = sqlx::query_as(&format!(
        "{CART_ITEM_SELECT}
         WHERE ci.user_id = $1
         ORDER BY ci.id ASC"
    ))
    .bind(user_id_i64)
    .fetch_all(&mut *conn)
    .await?;

    let mut items = Vec::with_capacity(rows.len());
    for row in rows {
        items.push(to_cart_item(row)?);
    }

    Ok(items)
}

/// Add `quantity` of a product, merging with an existing line.
///
/// The product has to be available and in stock, and the resulting line may
/// not hold more than the current stock.
pub async fn add_to_cart(
    db: &Database,
    user_id: u64,
    product_id: u64,
    quantity: i32,
) -> Result<CartItem, StoreError> {
    let user_id_i64 = i64::try_from(user_id).context("user_id out of i64 range")?;
    let product_id_i64 = i64::try_from(product_id).context("product_id out of i64 range")?;
    let now = i64::try_from(now_unix_secs()).context("now out of i64 range")?;

    let mut tx = db.pool().begin().await?;
    ensure_user_exists(&mut tx, user_id).await?;

    let product: Option<(bool, i32)> =
        sqlx::query_as("SELECT available, stock FROM products WHERE id = $1 FOR SHARE")
            .bind(product_id_i64)
            .fetch_optional(&mut *tx)
            .await?;

    let Some((available, stock)) = product else {
        tx.rollback().await?;
        return Err(StoreError::NotFound {
            entity: "product",
            id: product_id,
        });
    };

    let existing: Option<i32> = sqlx::query_scalar(
        "SELECT quantity FROM cart_items WHERE user_id = $1 AND product_id = $2 FOR UPDATE",
    )
    .bind(user_id_i64)
    .bind(product_id_i64)
    .fetch_optional(&mut *tx)
    .await?;

    let new_quantity = match check_add(product_id, available, stock, existing, quantity) {
        Ok(new_quantity) => new_quantity,
        Err(err) => {
            tx.rollback().await?;
            return Err(err);
        }
    };

    let item_id: i64 = sqlx::query_scalar(
        "INSERT INTO cart_items (user_id, product_id, quantity, created_at, updated_at)
         VALUES ($1, $2, $3, $4, $4)
         ON CONFLICT (user_id, product_id)
         DO UPDATE SET quantity = EXCLUDED.quantity, updated_at = EXCLUDED.updated_at
         RETURNING id",
    )
    .bind(user_id_i64)
    .bind(product_id_i64)
    .bind(new_quantity)
    .bind(now)
    .fetch_one(&mut *tx)
    .await?;

    let item = fetch_cart_item(&mut tx, item_id).await?;
    tx.commit().await?;

    Ok(item)
}

/// Set the quantity of an existing line; zero or less removes it.
pub async fn update_cart_quantity(
    db: &Database,
    user_id: u64,
    product_id: u64,
    quantity: i32,
) -> Result<(), StoreError> {
    let user_id_i64 = i64::try_from(user_id).context("user_id out of i64 range")?;
    let product_id_i64 = i64::try_from(product_id).context("product_id out of i64 range")?;
    let now = i64::try_from(now_unix_secs()).context("now out of i64 range")?;

    let mut tx = db.pool().begin().await?;
    ensure_user_exists(&mut tx, user_id).await?;

    let line: Option<(i64, i32)> = sqlx::query_as(
        "SELECT ci.id, p.stock
         FROM cart_items ci
         JOIN products p ON p.id = ci.product_id
         WHERE ci.user_id = $1 AND ci.product_id = $2
         FOR UPDATE OF ci",
    )
    .bind(user_id_i64)
    .bind(product_id_i64)
    .fetch_optional(&mut *tx)
    .await?;

    let Some((item_id, stock)) = line else {
        tx.rollback().await?;
        return Err(StoreError::NotFound {
            entity: "cart item for product",
            id: product_id,
        });
    };

    let planned = match plan_update(product_id, stock, quantity) {
        Ok(planned) => planned,
        Err(err) => {
            tx.rollback().await?;
            return Err(err);
        }
    };

    match planned {
        Some(quantity) => {
            sqlx::query("UPDATE cart_items SET quantity = $1, updated_at = $2 WHERE id = $3")
                .bind(quantity)
                .bind(now)
                .bind(item_id)
                .execute(&mut *tx)
                .await?;
        }
        None => {
            sqlx::query("DELETE FROM cart_items WHERE id = $1")
                .bind(item_id)
                .execute(&mut *tx)
                .await?;
        }
    }

    tx.commit().await?;
    Ok(())
}

/// Remove a product from the cart. Returns whether a line was deleted.
pub async fn remove_from_cart(
    db: &Database,
    user_id: u64,
    product_id: u64,
) -> Result<bool, StoreError> {
    let user_id_i64 = i64::try_from(user_id).context("user_id out of i64 range")?;
    let product_id_i64 = i64::try_from(product_id).context("product_id out of i64 range")?;

    let mut conn = db.pool().acquire().await?;
    ensure_user_exists(&mut conn, user_id).await?;

    let deleted = sqlx::query("DELETE FROM cart_items WHERE user_id = $1 AND product_id = $2")
        .bind(user_id_i64)
        .bind(product_id_i64)
        .execute(&mut *conn)
        .await?
        .rows_affected();

    Ok(deleted > 0)
}

/// Empty the cart. Returns the number of removed lines.
pub async fn clear_cart(db: &Database, user_id: u64) -> Result<u64, StoreError> {
    let user_id_i64 = i64::try_from(user_id).context("user_id out of i64 range")?;

    let mut conn = db.pool().acquire().await?;
    ensure_user_exists(&mut conn, user_id).await?;

    let deleted = sqlx::query("DELETE FROM cart_items WHERE user_id = $1")
        .bind(user_id_i64)
        .execute(&mut *conn)
        .await?
        .rows_affected();

    Ok(deleted)
}

/// Number of distinct lines in the cart.
pub async fn count_cart_items(db: &Database, user_id: u64) -> Result<u64, StoreError> {
    let user_id_i64 = i64::try_from(user_id).context("user_id out of i64 range")?;

    let mut conn = db.pool().acquire().await?;
    ensure_user_exists(&mut conn, user_id).await?;

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM cart_items WHERE user_id = $1")
        .bind(user_id_i64)
        .fetch_one(&mut *conn)
        .await?;

    Ok(u64::try_from(count).context("cart count out of u64 range")?)
}

/// Quantity of the cart line after adding `requested` on top of `existing`.
pub fn check_add(
    product_id: u64,
    available: bool,
    stock: i32,
    existing: Option<i32>,
    requested: i32,
) -> Result<i32, StoreError> {
    if requested <= 0 {
        return Err(StoreError::Rejected(format!(
            "quantity must be positive (got {requested})"
        )));
    }
    if !available || stock <= 0 {
        return Err(StoreError::Unavailable(product_id));
    }

    let new_quantity = existing.unwrap_or(0).saturating_add(requested);
    if new_quantity > stock {
        return Err(StoreError::InsufficientStock {
            product_id,
            requested: new_quantity,
            in_stock: stock,
        });
    }

    Ok(new_quantity)
}

/// New quantity for an existing line, or `None` when the line should go.
pub fn plan_update(product_id: u64, stock: i32, quantity: i32) -> Result<Option<i32>, StoreError> {
    if quantity <= 0 {
        return Ok(None);
    }
    if quantity > stock {
        return Err(StoreError::InsufficientStock {
            product_id,
            requested: quantity,
            in_stock: stock,
        });
    }
    Ok(Some(quantity))
}

async fn fetch_cart_item(conn: &mut PgConnection, item_id: i64) -> Result<CartItem, StoreError> {
    let row: CartItemRow = sqlx::query_as(&format!("{CART_ITEM_SELECT} WHERE ci.id = $1"))
        .bind(item_id)
        .fetch_one(&mut *conn)
        .await?;

    Ok(to_cart_item(row)?)
}

fn to_cart_item(row: CartItemRow) -> anyhow::Result<CartItem> {
    Ok(CartItem {
        id: u64::try_from(row.id).context("id row out of u64 range")?,
        product_id: u64::try_from(row.product_id).context("product_id row out of u64 range")?,
        product_name: row.product_name,
        product_image: row.product_image,
        price_cents: row.price_cents,
        quantity: row.quantity,
        stock: row.stock,
        category: row.category,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adding_to_an_empty_line() {
        assert_eq!(check_add(7, true, 5, None, 3).unwrap(), 3);
        assert_eq!(check_add(7, true, 5, None, 5).unwrap(), 5);
    }

    #[test]
    fn adding_merges_with_the_existing_line() {
        assert_eq!(check_add(7, true, 5, Some(2), 3).unwrap(), 5);
    }

    #[test]
    fn adding_past_stock_reports_the_merged_quantity() {
        let err = check_add(7, true, 5, Some(4), 2).unwrap_err();
        assert!(matches!(
            err,
            StoreError::InsufficientStock {
                product_id: 7,
                requested: 6,
                in_stock: 5,
            }
        ));

        let err = check_add(7, true, 5, None, 6).unwrap_err();
        assert!(matches!(err, StoreError::InsufficientStock { requested: 6, .. }));
    }

    #[test]
    fn unavailable_or_sold_out_products_cannot_be_added() {
        assert!(matches!(
            check_add(7, false, 5, None, 1).unwrap_err(),
            StoreError::Unavailable(7)
        ));
        assert!(matches!(
            check_add(7, true, 0, None, 1).unwrap_err(),
            StoreError::Unavailable(7)
        ));
    }

    #[test]
    fn adding_nothing_is_rejected() {
        assert!(matches!(
            check_add(7, true, 5, Some(1), 0).unwrap_err(),
            StoreError::Rejected(_)
        ));
        assert!(matches!(
            check_add(7, true, 5, None, -2).unwrap_err(),
            StoreError::Rejected(_)
        ));
    }

    #[test]
    fn adding_saturates_instead_of_overflowing() {
        let err = check_add(7, true, 10, Some(i32::MAX), 1).unwrap_err();
        assert!(matches!(
            err,
            StoreError::InsufficientStock {
                requested: i32::MAX,
                ..
            }
        ));
    }

    #[test]
    fn update_within_stock_sets_the_quantity() {
        assert_eq!(plan_update(3, 5, 1).unwrap(), Some(1));
        assert_eq!(plan_update(3, 5, 5).unwrap(), Some(5));
    }

    #[test]
    fn update_to_zero_or_less_removes_the_line() {
        assert_eq!(plan_update(3, 5, 0).unwrap(), None);
        assert_eq!(plan_update(3, 5, -4).unwrap(), None);
        assert_eq!(plan_update(3, 0, 0).unwrap(), None);
    }

    #[test]
    fn update_past_stock_is_refused() {
        assert!(matches!(
            plan_update(3, 5, 6).unwrap_err(),
            StoreError::InsufficientStock {
                product_id: 3,
                requested: 6,
                in_stock: 5,
            }
        ));
    }
}
