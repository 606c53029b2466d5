//! Compute module - Numerical engine for the neural CA.

mod activation;
mod engine;
mod evaluator;
mod mutation;
mod rng;
mod scheduler;
mod state;
mod weights;

pub use engine::*;
pub use evaluator::step_into;
pub use mutation::{HISTORY_CAPACITY, MutationHistory, MutationRecord, temporal_strength};
pub use rng::*;
pub use scheduler::*;
pub use state::*;
pub use weights::*;
