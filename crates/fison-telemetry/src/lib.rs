//! # fison-telemetry
//!
//! Structured run telemetry: event types emitted by the primal solver and
//! the adaptive controller, a broadcast bus, and pluggable sinks.
//!
//! ## Key Types
//!
//! - [`RunEvent`] / [`EventKind`] — what happened, tagged with a timestep
//! - [`EventBus`] — mpsc-backed broadcast dispatch
//! - [`EventSink`] — consumer trait ([`VecSink`] for tests, [`TracingSink`]
//!   for log output)

pub mod bus;
pub mod events;
pub mod sinks;

pub use bus::EventBus;
pub use events::{EventKind, MeshDecision, RunEvent};
pub use sinks::{EventSink, TracingSink, VecSink};
