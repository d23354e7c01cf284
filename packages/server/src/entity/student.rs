use common::DocumentField;
use sea_orm::Set;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A student's application record.
///
/// Document columns hold blob identifiers only; the blob store owns the
/// content. They carry no foreign key because the filesystem backend keeps
/// blob info outside the database.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "student")]
pub struct Model {
    /// UUIDv7 primary key.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Set once at creation, never updated.
    #[sea_orm(unique)]
    pub application_number: String,

    pub full_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub date_of_birth: Option<String>,
    pub gender: Option<String>,
    pub category: Option<String>,
    pub father_name: Option<String>,
    pub mother_name: Option<String>,
    pub address: Option<String>,
    pub course: Option<String>,

    /// Submitted keys outside the known set, as a JSON object.
    #[sea_orm(column_type = "JsonBinary")]
    pub extra: serde_json::Value,

    pub registration_form: Option<Uuid>,
    pub admit_card: Option<Uuid>,
    pub category_certificate: Option<Uuid>,
    pub marksheet_10: Option<Uuid>,
    pub marksheet_12: Option<Uuid>,
    pub diploma_certificate: Option<Uuid>,
    pub payment_receipt: Option<Uuid>,
    pub candidate_signature: Option<Uuid>,
    pub parent_signature: Option<Uuid>,
    pub passport_photo: Option<Uuid>,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl Model {
    /// The blob linked to `field`, if any.
    pub fn document(&self, field: DocumentField) -> Option<Uuid> {
        match field {
            DocumentField::RegistrationForm => self.registration_form,
            DocumentField::AdmitCard => self.admit_card,
            DocumentField::CategoryCertificate => self.category_certificate,
            DocumentField::Marksheet10 => self.marksheet_10,
            DocumentField::Marksheet12 => self.marksheet_12,
            DocumentField::DiplomaCertificate => self.diploma_certificate,
            DocumentField::PaymentReceipt => self.payment_receipt,
            DocumentField::CandidateSignature => self.candidate_signature,
            DocumentField::ParentSignature => self.parent_signature,
            DocumentField::PassportPhoto => self.passport_photo,
        }
    }
}

impl ActiveModel {
    /// Link `field` to a blob. Only this column becomes part of the update.
    pub fn set_document(&mut self, field: DocumentField, blob: Uuid) {
        let value = Set(Some(blob));
        match field {
            DocumentField::RegistrationForm => self.registration_form = value,
            DocumentField::AdmitCard => self.admit_card = value,
            DocumentField::CategoryCertificate => self.category_certificate = value,
            DocumentField::Marksheet10 => self.marksheet_10 = value,
            DocumentField::Marksheet12 => self.marksheet_12 = value,
            DocumentField::DiplomaCertificate => self.diploma_certificate = value,
            DocumentField::PaymentReceipt => self.payment_receipt = value,
            DocumentField::CandidateSignature => self.candidate_signature = value,
            DocumentField::ParentSignature => self.parent_signature = value,
            DocumentField::PassportPhoto => self.passport_photo = value,
        }
    }
}

impl ActiveModelBehavior for ActiveModel {}
