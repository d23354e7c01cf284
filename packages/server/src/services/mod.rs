pub mod download;
pub mod student_store;
pub mod upload;
