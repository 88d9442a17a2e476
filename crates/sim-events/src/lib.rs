//! # Simulation Events
//!
//! Defines the priority-ordered event model the backtesting engine dispatches against:
//! a tagged `Event`/`EventKind` pair and the `EventQueue` min-heap that totally orders
//! them by `(timestamp, priority, sequence)`.
//!
//! As a Layer 0 crate, it depends only on `core-types` and provides the definitive
//! language for what the engine's event loop dispatches.

// Declare the modules that make up this crate.
pub mod error;
pub mod messages;
pub mod queue;

// Re-export the core types to provide a clean public API.
pub use error::EventsError;
pub use messages::{Event, EventKind, FillPayload, KillSwitchPayload, Priority, RiskBreach};
pub use queue::EventQueue;
