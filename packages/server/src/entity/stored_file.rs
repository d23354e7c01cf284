use common::DocumentField;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// File descriptor of the database blob store (one row per blob).
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "stored_file")]
pub struct Model {
    /// UUIDv7 primary key, handed out as the blob reference.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Display name, `{applicationNumber}-{originalFilename}`. Not unique.
    pub filename: String,

    /// Content length in bytes.
    pub length: i64,

    /// Size of every chunk except possibly the last.
    pub chunk_size: i32,

    pub upload_date: DateTimeUtc,

    /// MIME content type.
    pub content_type: Option<String>,

    /// Hex SHA-256 of the content.
    pub sha256: String,

    pub application_number: String,

    pub field_tag: Option<DocumentField>,

    #[sea_orm(has_many)]
    pub chunks: HasMany<super::file_chunk::Entity>,
}

impl ActiveModelBehavior for ActiveModel {}
