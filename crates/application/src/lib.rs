//! AutoGuard Application Layer
//!
//! Ports (traits implemented by the infrastructure layer), the five
//! detection layers, the decision engine that orchestrates them, and the
//! use cases invoked by the gateway and the background workers.
pub mod detectors;
pub mod engine;
pub mod ports;
pub mod use_cases;

pub use engine::{DecisionEngine, DecisionOutput};
