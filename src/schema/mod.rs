//! Schema module - Configuration and seeding types for the neural CA engine.

mod config;
mod seed;

pub use config::*;
pub use seed::*;
