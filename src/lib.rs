//! Neural CA - interactive neural cellular automata.
//!
//! This crate runs a toroidal grid of cells whose state (up to 4 float
//! channels in `[-1, 1]`) is updated every step by a weighted 3x3
//! convolution followed by a nonlinearity and temporal blending. The
//! weights are not trained; they are initialized by strategy and explored
//! through randomized mutation operators, producing emergent spatial
//! patterns.
//!
//! # Architecture
//!
//! The crate is split into two main modules:
//!
//! - `schema`: Configuration and seed types (serde-serializable)
//! - `compute`: Numerical engine (weights, evaluator, mutation, scheduler)
//!
//! # Example
//!
//! ```rust,no_run
//! use neural_ca::{Engine, EngineConfig, SeedPattern};
//!
//! let config = EngineConfig::default();
//! let mut engine = Engine::new(config).expect("valid configuration");
//!
//! // Seed a disk in the middle and run a few frames.
//! engine.seed(64, 64, 10.0, SeedPattern::Center);
//! for _ in 0..100 {
//!     engine.frame();
//! }
//!
//! println!("Active cells: {}", engine.stats().active_cells);
//! ```

pub mod compute;
pub mod schema;

// Re-export commonly used types
pub use compute::{Engine, GridStats, MutationRecord, NetworkConfig};
pub use schema::{
    Activation, EngineConfig, InitStrategy, MutationConfig, MutationPattern, SeedPattern,
    WeightConstraints,
};
