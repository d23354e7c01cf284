use chrono::Utc;
use common::DocumentField;
use common::storage::BlobId;
use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, Set};
use serde_json::Value;
use tracing::info;
use uuid::Uuid;

use crate::entity::student;
use crate::models::student::NewStudent;

/// Reads and writes student records.
pub struct StudentStore<'a, C: ConnectionTrait> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> StudentStore<'a, C> {
    pub fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    /// Insert a new record. A reused application number surfaces as a
    /// unique-constraint violation.
    pub async fn create(&self, form: NewStudent) -> Result<student::Model, DbErr> {
        let now = Utc::now();
        let model = student::ActiveModel {
            id: Set(Uuid::now_v7()),
            application_number: Set(form.application_number),
            full_name: Set(form.full_name),
            email: Set(form.email),
            phone: Set(form.phone),
            date_of_birth: Set(form.date_of_birth),
            gender: Set(form.gender),
            category: Set(form.category),
            father_name: Set(form.father_name),
            mother_name: Set(form.mother_name),
            address: Set(form.address),
            course: Set(form.course),
            extra: Set(Value::Object(form.extra.into_iter().collect())),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(self.conn)
        .await?;

        info!(
            student_id = %model.id,
            application_number = %model.application_number,
            "Student record created"
        );
        Ok(model)
    }

    pub async fn find_by_application_number(
        &self,
        application_number: &str,
    ) -> Result<Option<student::Model>, DbErr> {
        student::Entity::find()
            .filter(student::Column::ApplicationNumber.eq(application_number))
            .one(self.conn)
            .await
    }

    /// Link blobs to document fields.
    ///
    /// Only the given columns and `updated_at` are written, so a concurrent
    /// save of other fields on the same record is not overwritten. Returns
    /// `None` if the record no longer exists.
    pub async fn save_documents(
        &self,
        id: Uuid,
        documents: &[(DocumentField, BlobId)],
    ) -> Result<Option<student::Model>, DbErr> {
        let mut model = student::ActiveModel {
            id: Set(id),
            updated_at: Set(Utc::now()),
            ..Default::default()
        };
        for (field, blob) in documents {
            model.set_document(*field, blob.as_uuid());
        }

        match model.update(self.conn).await {
            Ok(model) => Ok(Some(model)),
            Err(DbErr::RecordNotUpdated) => Ok(None),
            Err(e) => Err(e),
        }
    }
}
