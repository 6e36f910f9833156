//! Lambda binding: event parsing, response shaping and the handler

pub mod handler;
pub mod helpers;
pub mod parsing;

// Re-export the main handler for convenience
pub use handler::function_handler as handler;
