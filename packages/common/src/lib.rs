pub mod config;
pub mod document_field;
pub mod storage;

pub use document_field::{DocumentField, UnknownFieldTag};
