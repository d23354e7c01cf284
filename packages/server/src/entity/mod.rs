pub mod file_chunk;
pub mod stored_file;
pub mod student;
