//! Command facade
//!
//! A clonable handle that forwards to one adapter. Every call holds the
//! adapter lock from building the command until the response is decoded,
//! so clones can be used from several threads without interleaving
//! commands on the wire.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::Result;
use crate::network::{Adapter, DebugSink};
use crate::protocol::{Serializer, WireValue};

/// Facade over a shared adapter
pub struct Cli<A: Adapter> {
    adapter: Arc<Mutex<A>>,
}

impl<A: Adapter> Clone for Cli<A> {
    fn clone(&self) -> Self {
        Self {
            adapter: Arc::clone(&self.adapter),
        }
    }
}

impl<A: Adapter> Cli<A> {
    pub fn new(adapter: A) -> Self {
        Self {
            adapter: Arc::new(Mutex::new(adapter)),
        }
    }

    /// Execute the command and return the decoded response
    pub fn get_response(&self, name: &str, parameters: &[WireValue]) -> Result<WireValue> {
        self.adapter.lock().get_response(name, parameters)
    }

    /// Build and send the command, returning the decoded response
    pub fn send_command(&self, name: &str, parameters: &[WireValue]) -> Result<WireValue> {
        let mut adapter = self.adapter.lock();
        let command = adapter.build_command(name, parameters)?;
        adapter.send_command(&command)
    }

    /// Execute the command and report whether it succeeded
    pub fn execute_command(&self, name: &str, parameters: &[WireValue]) -> Result<bool> {
        self.adapter.lock().execute_command(name, parameters)
    }

    /// Replace the codec used for parameters and payloads
    pub fn set_serializer(&self, serializer: Box<dyn Serializer>) {
        self.adapter.lock().set_serializer(serializer);
    }

    pub fn set_debug(&self, debug: bool) {
        self.adapter.lock().set_debug(debug);
    }

    /// Route wire lines to `sink`, or back to `tracing` with `None`
    pub fn set_debug_sink(&self, sink: Option<Box<dyn DebugSink>>) {
        self.adapter.lock().set_debug_sink(sink);
    }

    /// Run `f` with exclusive access to the adapter
    pub fn with_adapter<R>(&self, f: impl FnOnce(&mut A) -> R) -> R {
        f(&mut self.adapter.lock())
    }
}
