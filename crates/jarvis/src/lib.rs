pub mod adapter;
pub mod agent;
pub mod chat;
pub mod errors;
pub mod models;
pub mod prompt_template;
pub mod providers;
pub mod streaming;
pub mod tools;
