use std::time::Duration;

use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr};
use sea_orm::sea_query::{Index, PostgresQueryBuilder};
use tracing::{info, warn};

use crate::entity::stored_file;

pub async fn init_db(db_url: &str) -> Result<DatabaseConnection, DbErr> {
    let mut opt = ConnectOptions::new(db_url.to_owned());

    // Set connection pool options
    opt.max_connections(50)
        .min_connections(2)
        .connect_timeout(Duration::from_secs(8))
        .acquire_timeout(Duration::from_secs(8))
        .sqlx_logging(false);

    let db = Database::connect(opt).await?;
    db.get_schema_registry("admissions::entity::*")
        .sync(&db)
        .await?;

    Ok(db)
}

/// Ensure the blob lookup indexes exist.
///
/// SeaORM's schema-sync doesn't support composite non-unique indexes,
/// so we create them manually on startup.
pub async fn ensure_indexes(db: &DatabaseConnection) -> Result<(), DbErr> {
    // Name lookups resolve to the newest upload:
    // SELECT ... FROM stored_file WHERE filename = ? ORDER BY upload_date DESC
    let by_name = Index::create()
        .if_not_exists()
        .name("idx_stored_file_filename_upload_date")
        .table(stored_file::Entity)
        .col(stored_file::Column::Filename)
        .col(stored_file::Column::UploadDate)
        .to_string(PostgresQueryBuilder);

    // Per-student document listing.
    let by_application = Index::create()
        .if_not_exists()
        .name("idx_stored_file_application_number")
        .table(stored_file::Entity)
        .col(stored_file::Column::ApplicationNumber)
        .to_string(PostgresQueryBuilder);

    for (name, stmt) in [
        ("idx_stored_file_filename_upload_date", by_name),
        ("idx_stored_file_application_number", by_application),
    ] {
        match db.execute_unprepared(&stmt).await {
            Ok(_) => info!("Ensured index {} exists", name),
            Err(e) => warn!("Failed to create index {}: {}", name, e),
        }
    }

    Ok(())
}
