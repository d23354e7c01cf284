#[cfg(feature = "sea-orm")]
use sea_orm::prelude::StringLen;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One of the fixed document-reference fields of a student record.
///
/// The serialized form is the field tag clients attach to uploaded files.
/// When the `sea-orm` feature is enabled, this enum can be stored directly in SeaORM entities.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[cfg_attr(
    feature = "sea-orm",
    derive(sea_orm::DeriveActiveEnum, sea_orm::EnumIter),
    sea_orm(rs_type = "String", db_type = "String(StringLen::None)")
)]
pub enum DocumentField {
    #[serde(rename = "registrationForm")]
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "registrationForm"))]
    RegistrationForm,
    #[serde(rename = "admitCard")]
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "admitCard"))]
    AdmitCard,
    #[serde(rename = "categoryCertificate")]
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "categoryCertificate"))]
    CategoryCertificate,
    #[serde(rename = "marksheet_10")]
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "marksheet_10"))]
    Marksheet10,
    #[serde(rename = "marksheet_12")]
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "marksheet_12"))]
    Marksheet12,
    #[serde(rename = "diploma_certificate")]
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "diploma_certificate"))]
    DiplomaCertificate,
    #[serde(rename = "paymentReceipt")]
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "paymentReceipt"))]
    PaymentReceipt,
    #[serde(rename = "candidateSignature")]
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "candidateSignature"))]
    CandidateSignature,
    #[serde(rename = "parentSignature")]
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "parentSignature"))]
    ParentSignature,
    #[serde(rename = "passportPhoto")]
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "passportPhoto"))]
    PassportPhoto,
}

/// Returned when a string is not one of the known field tags.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown document field tag: {0}")]
pub struct UnknownFieldTag(pub String);

impl DocumentField {
    /// Every document-reference field, in form order.
    pub const ALL: &'static [DocumentField] = &[
        Self::RegistrationForm,
        Self::AdmitCard,
        Self::CategoryCertificate,
        Self::Marksheet10,
        Self::Marksheet12,
        Self::DiplomaCertificate,
        Self::PaymentReceipt,
        Self::CandidateSignature,
        Self::ParentSignature,
        Self::PassportPhoto,
    ];

    /// The wire tag for this field.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RegistrationForm => "registrationForm",
            Self::AdmitCard => "admitCard",
            Self::CategoryCertificate => "categoryCertificate",
            Self::Marksheet10 => "marksheet_10",
            Self::Marksheet12 => "marksheet_12",
            Self::DiplomaCertificate => "diploma_certificate",
            Self::PaymentReceipt => "paymentReceipt",
            Self::CandidateSignature => "candidateSignature",
            Self::ParentSignature => "parentSignature",
            Self::PassportPhoto => "passportPhoto",
        }
    }
}

impl fmt::Display for DocumentField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocumentField {
    type Err = UnknownFieldTag;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|field| field.as_str() == s)
            .ok_or_else(|| UnknownFieldTag(s.to_string()))
    }
}
