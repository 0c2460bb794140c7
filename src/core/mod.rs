pub mod config;
pub mod error;
pub mod types;

pub use config::{GridConfig, SeedRegion};
pub use error::{FieldError, Result};
