pub mod document;
pub mod student;
