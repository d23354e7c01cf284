use common::storage::BlobStoreHandle;
use sea_orm::DatabaseConnection;

use crate::config::AppConfig;

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    /// Opened after the listener is bound; requests that need it fail with
    /// `STORE_UNAVAILABLE` until then.
    pub blob_store: BlobStoreHandle,
    pub config: AppConfig,
}
