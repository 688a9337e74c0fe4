//! ragd core library.
//!
//! Foundational utilities shared by every ragd crate:
//! - Error handling (`AppError`, `AppResult`)
//! - Logging initialization
//! - Service configuration

pub mod config;
pub mod error;
pub mod logging;

// Re-export commonly used types
pub use config::{RagConfig, COLLECTION_NAME};
pub use error::{AppError, AppResult};
