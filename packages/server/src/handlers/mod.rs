pub mod download;
pub mod health;
pub mod student;
pub mod upload;
