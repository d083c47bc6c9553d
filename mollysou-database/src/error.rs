use thiserror::Error;

/// Failure kinds callers of the store need to tell apart.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: u64 },

    #[error("{0}")]
    Conflict(String),

    #[error("product {0} is not available")]
    Unavailable(u64),

    #[error("not enough stock for product {product_id} (requested {requested}, in stock {in_stock})")]
    InsufficientStock {
        product_id: u64,
        requested: i32,
        in_stock: i32,
    },

    /// The update was refused before anything was written.
    #[error("{0}")]
    Rejected(String),

    #[error("storage failure: {0:#}")]
    StorageFailure(#[from] anyhow::Error),
}

impl StoreError {
    pub fn user_not_found(user_id: u64) -> Self {
        Self::NotFound {
            entity: "user",
            id: user_id,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        Self::StorageFailure(err.into())
    }
}
