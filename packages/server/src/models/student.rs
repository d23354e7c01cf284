use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use common::DocumentField;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::entity::student;
use crate::error::AppError;

/// Keys the server assigns itself; clients cannot submit them.
const RESERVED_KEYS: &[&str] = &["id", "createdAt", "updatedAt"];

/// Maximum length of an application number.
const MAX_APPLICATION_NUMBER_LEN: usize = 64;

/// Student application form.
///
/// Known fields that hold strings are stored in their own columns. Any other
/// key, and a known field holding a non-string value, is kept verbatim in
/// `extra`.
#[derive(Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmitFormRequest {
    /// Unique application number; required. A number is accepted and stored
    /// as its decimal string.
    #[schema(value_type = String, example = "A100")]
    pub application_number: Option<Value>,
    #[schema(example = "Asha Verma")]
    pub full_name: Option<Value>,
    #[schema(example = "asha@example.com")]
    pub email: Option<Value>,
    pub phone: Option<Value>,
    #[schema(example = "2006-04-12")]
    pub date_of_birth: Option<Value>,
    pub gender: Option<Value>,
    #[schema(example = "General")]
    pub category: Option<Value>,
    pub father_name: Option<Value>,
    pub mother_name: Option<Value>,
    pub address: Option<Value>,
    pub course: Option<Value>,
    /// Any additional submitted keys.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// A validated form, ready to be stored.
#[derive(Debug, Clone, PartialEq)]
pub struct NewStudent {
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
    pub extra: BTreeMap<String, Value>,
}

impl SubmitFormRequest {
    /// Check the required key and reject keys only the server may set.
    pub fn validate(self) -> Result<NewStudent, AppError> {
        let application_number = match self.application_number {
            Some(Value::String(n)) => n.trim().to_string(),
            Some(Value::Number(n)) => n.to_string(),
            None | Some(Value::Null) => String::new(),
            Some(_) => {
                return Err(AppError::Validation(
                    "applicationNumber must be a string or a number".into(),
                ));
            }
        };
        if application_number.is_empty() {
            return Err(AppError::MissingParameter("applicationNumber"));
        }
        validate_application_number(&application_number)?;

        for key in self.extra.keys() {
            if RESERVED_KEYS.contains(&key.as_str()) {
                return Err(AppError::Validation(format!("'{key}' cannot be submitted")));
            }
            if key.parse::<DocumentField>().is_ok() {
                return Err(AppError::Validation(format!(
                    "'{key}' can only be set by uploading a file"
                )));
            }
        }

        let mut extra = self.extra;
        Ok(NewStudent {
            application_number,
            full_name: string_column("fullName", self.full_name, &mut extra),
            email: string_column("email", self.email, &mut extra),
            phone: string_column("phone", self.phone, &mut extra),
            date_of_birth: string_column("dateOfBirth", self.date_of_birth, &mut extra),
            gender: string_column("gender", self.gender, &mut extra),
            category: string_column("category", self.category, &mut extra),
            father_name: string_column("fatherName", self.father_name, &mut extra),
            mother_name: string_column("motherName", self.mother_name, &mut extra),
            address: string_column("address", self.address, &mut extra),
            course: string_column("course", self.course, &mut extra),
            extra,
        })
    }
}

/// The column value for a known field. Non-string values move to `extra`
/// under `key`.
fn string_column(
    key: &str,
    value: Option<Value>,
    extra: &mut BTreeMap<String, Value>,
) -> Option<String> {
    match value? {
        Value::String(s) => Some(s),
        Value::Null => None,
        other => {
            extra.insert(key.to_string(), other);
            None
        }
    }
}

/// Application numbers end up in blob names and URL paths.
pub fn validate_application_number(application_number: &str) -> Result<(), AppError> {
    if application_number.chars().count() > MAX_APPLICATION_NUMBER_LEN {
        return Err(AppError::Validation(format!(
            "applicationNumber must be at most {MAX_APPLICATION_NUMBER_LEN} characters"
        )));
    }
    if application_number
        .chars()
        .any(|c| c.is_control() || c == '/' || c == '\\')
    {
        return Err(AppError::Validation(
            "applicationNumber contains invalid characters".into(),
        ));
    }
    Ok(())
}

#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmitFormResponse {
    #[schema(example = "Student data submitted successfully!")]
    pub message: String,
    #[schema(example = "A100")]
    pub application_number: String,
}

/// `?applicationNumber=` query parameter.
#[derive(Deserialize, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query, rename_all = "camelCase")]
pub struct ApplicationQuery {
    /// Application number of the student.
    pub application_number: Option<String>,
}

impl ApplicationQuery {
    /// The trimmed application number, or `MissingParameter`.
    pub fn require(self) -> Result<String, AppError> {
        self.application_number
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .ok_or(AppError::MissingParameter("applicationNumber"))
    }
}

/// A stored student record.
///
/// Extra submitted keys are flattened back into the top level, so the record
/// reads the way it was submitted. Document fields hold blob identifiers.
#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StudentResponse {
    pub id: Uuid,
    pub application_number: String,
    pub full_name: Option<Value>,
    pub email: Option<Value>,
    pub phone: Option<Value>,
    pub date_of_birth: Option<Value>,
    pub gender: Option<Value>,
    pub category: Option<Value>,
    pub father_name: Option<Value>,
    pub mother_name: Option<Value>,
    pub address: Option<Value>,
    pub course: Option<Value>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
    pub registration_form: Option<Uuid>,
    pub admit_card: Option<Uuid>,
    pub category_certificate: Option<Uuid>,
    #[serde(rename = "marksheet_10")]
    pub marksheet_10: Option<Uuid>,
    #[serde(rename = "marksheet_12")]
    pub marksheet_12: Option<Uuid>,
    #[serde(rename = "diploma_certificate")]
    pub diploma_certificate: Option<Uuid>,
    pub payment_receipt: Option<Uuid>,
    pub candidate_signature: Option<Uuid>,
    pub parent_signature: Option<Uuid>,
    pub passport_photo: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A known field's submitted value: its column, or the verbatim value kept
/// in `extra` when it was not a string.
fn known_value(
    key: &str,
    column: Option<String>,
    extra: &mut BTreeMap<String, Value>,
) -> Option<Value> {
    match column {
        Some(s) => Some(Value::String(s)),
        None => extra.remove(key),
    }
}

impl From<student::Model> for StudentResponse {
    fn from(model: student::Model) -> Self {
        let mut extra = match model.extra {
            Value::Object(map) => map.into_iter().collect(),
            _ => BTreeMap::new(),
        };
        Self {
            id: model.id,
            application_number: model.application_number,
            full_name: known_value("fullName", model.full_name, &mut extra),
            email: known_value("email", model.email, &mut extra),
            phone: known_value("phone", model.phone, &mut extra),
            date_of_birth: known_value("dateOfBirth", model.date_of_birth, &mut extra),
            gender: known_value("gender", model.gender, &mut extra),
            category: known_value("category", model.category, &mut extra),
            father_name: known_value("fatherName", model.father_name, &mut extra),
            mother_name: known_value("motherName", model.mother_name, &mut extra),
            address: known_value("address", model.address, &mut extra),
            course: known_value("course", model.course, &mut extra),
            extra,
            registration_form: model.registration_form,
            admit_card: model.admit_card,
            category_certificate: model.category_certificate,
            marksheet_10: model.marksheet_10,
            marksheet_12: model.marksheet_12,
            diploma_certificate: model.diploma_certificate,
            payment_receipt: model.payment_receipt,
            candidate_signature: model.candidate_signature,
            parent_signature: model.parent_signature,
            passport_photo: model.passport_photo,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
