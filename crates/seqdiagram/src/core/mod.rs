//! Shared infrastructure: errors, logging and the renderer boundary

mod error;
pub mod logging;
mod renderer;

pub use error::*;
pub use logging::{init_default_logging, init_logging, LogFormat};
pub use renderer::*;

/// Result type for the tokenize and parse stages
pub type Result<T> = std::result::Result<T, DiagramError>;
