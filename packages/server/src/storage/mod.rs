pub mod database;

use std::sync::Arc;

use common::storage::filesystem::FilesystemBlobStore;
use common::storage::{BlobStore, StorageError};
use sea_orm::DatabaseConnection;
use tracing::info;

use crate::config::{StorageAppConfig, StorageBackend};
use database::DatabaseBlobStore;

/// Build the configured blob store on top of a live database connection.
pub async fn open_blob_store(
    config: &StorageAppConfig,
    db: &DatabaseConnection,
) -> Result<Arc<dyn BlobStore>, StorageError> {
    let store: Arc<dyn BlobStore> = match config.backend {
        StorageBackend::Database => Arc::new(DatabaseBlobStore::new(
            db.clone(),
            config.chunk_size,
            config.max_blob_size,
        )),
        StorageBackend::Filesystem => Arc::new(
            FilesystemBlobStore::new(config.path.clone(), config.max_blob_size).await?,
        ),
    };
    info!(backend = ?config.backend, "Blob store opened");
    Ok(store)
}
