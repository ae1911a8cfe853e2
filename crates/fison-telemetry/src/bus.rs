//! Event bus — broadcast-style event dispatch with pluggable sinks.
//!
//! The bus uses `std::sync::mpsc` so producers never block on sink work.
//! Sinks are registered once at initialization; `flush` drains pending
//! events to every sink, typically at the end of each time step and at
//! run shutdown.

use std::sync::mpsc;

use crate::events::{EventKind, RunEvent};
use crate::sinks::EventSink;

/// Broadcast event bus for solve telemetry.
pub struct EventBus {
    /// Channel sender for the producer side.
    sender: mpsc::Sender<RunEvent>,
    /// Channel receiver — owned by the bus for dispatching to sinks.
    receiver: mpsc::Receiver<RunEvent>,
    /// Registered sinks.
    sinks: Vec<Box<dyn EventSink>>,
    /// Whether the bus is active. A disabled bus drops events silently.
    enabled: bool,
}

impl EventBus {
    /// Creates a new event bus with no sinks.
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            sender,
            receiver,
            sinks: Vec::new(),
            enabled: true,
        }
    }

    /// Registers a sink to receive events.
    pub fn add_sink(&mut self, sink: Box<dyn EventSink>) {
        self.sinks.push(sink);
    }

    /// Enables or disables the bus.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Returns true if the bus is active.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Emit an event. If the bus is disabled, this is a no-op.
    pub fn emit(&self, event: RunEvent) {
        if !self.enabled {
            return;
        }
        // Receiver lives in self, so send can only fail after a partial move
        let _ = self.sender.send(event);
    }

    /// Convenience: emit a kind tagged with a timestep.
    pub fn emit_kind(&self, timestep: u32, kind: EventKind) {
        self.emit(RunEvent::new(timestep, kind));
    }

    /// Flush all pending events to registered sinks.
    pub fn flush(&mut self) {
        while let Ok(event) = self.receiver.try_recv() {
            for sink in &mut self.sinks {
                sink.handle(&event);
            }
        }
    }

    /// Flush, then tell every sink the run is over.
    pub fn finalize(&mut self) {
        self.flush();
        for sink in &mut self.sinks {
            sink.finalize();
        }
    }

    /// Returns the number of registered sinks.
    pub fn sink_count(&self) -> usize {
        self.sinks.len()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
