pub mod backend;
pub mod json_file;

pub use backend::{Backend, MemoryBackend};
pub use json_file::JsonFileBackend;
