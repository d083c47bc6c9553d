pub mod auth;
pub mod service;

use mollysou_database::Database;

pub use service::ProgressService;

/// State shared by every request handler.
#[derive(Clone)]
pub struct Data {
    pub db: Database,
    pub progress: ProgressService,
}
