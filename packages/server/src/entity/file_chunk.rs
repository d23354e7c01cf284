use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "file_chunk")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub files_id: Uuid,
    /// Zero-based chunk index.
    #[sea_orm(primary_key, auto_increment = false)]
    pub n: i32,
    #[sea_orm(belongs_to, from = "files_id", to = "id")]
    pub stored_file: HasOne<super::stored_file::Entity>,

    pub data: Vec<u8>,
}

impl ActiveModelBehavior for ActiveModel {}
