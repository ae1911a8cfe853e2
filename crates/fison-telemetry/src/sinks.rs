//! Pluggable event sinks.
//!
//! Sinks consume events from the bus and process them (collect for tests,
//! forward to `tracing`, stream elsewhere).

use std::sync::{Arc, Mutex};

use crate::events::RunEvent;

/// Trait for event consumers.
pub trait EventSink: Send {
    /// Process a single event.
    fn handle(&mut self, event: &RunEvent);

    /// Called when the run ends. Flush buffers, close files, etc.
    fn finalize(&mut self) {}

    /// Returns a human-readable name for this sink.
    fn name(&self) -> &str;
}

/// A sink that collects events into a shared buffer.
///
/// The buffer handle survives handing the sink to the bus, so tests can
/// assert on what a solve emitted.
pub struct VecSink {
    events: Arc<Mutex<Vec<RunEvent>>>,
}

impl VecSink {
    /// Creates an empty sink.
    pub fn new() -> Self {
        Self {
            events: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Returns a handle to the collected events.
    pub fn events(&self) -> Arc<Mutex<Vec<RunEvent>>> {
        Arc::clone(&self.events)
    }
}

impl Default for VecSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for VecSink {
    fn handle(&mut self, event: &RunEvent) {
        if let Ok(mut guard) = self.events.lock() {
            guard.push(event.clone());
        }
    }

    fn name(&self) -> &str {
        "vec_sink"
    }
}

/// A sink that logs events through the `tracing` crate.
pub struct TracingSink {
    /// Minimum log level for events.
    _level: tracing::Level,
}

impl TracingSink {
    /// Creates a new tracing sink at the given log level.
    pub fn new(level: tracing::Level) -> Self {
        Self { _level: level }
    }
}

impl EventSink for TracingSink {
    fn handle(&mut self, event: &RunEvent) {
        tracing::info!(
            timestep = event.timestep,
            event = ?event.kind,
            "run_event"
        );
    }

    fn name(&self) -> &str {
        "tracing_sink"
    }
}
