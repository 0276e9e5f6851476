//! Model server clients.

pub mod ollama;

pub use ollama::{pick_model, ModelError, OllamaClient};
