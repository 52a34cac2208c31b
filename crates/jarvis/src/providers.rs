pub mod base;
pub mod configs;
pub mod errors;
pub mod mock;
pub mod ollama;
pub mod utils;
