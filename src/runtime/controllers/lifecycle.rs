//! # Lifecycle
//!
//! Generation counter shared between a form and its pending awaits. Every
//! await takes a ticket before suspending and checks it on resumption; after
//! teardown no ticket is current, so late results are dropped instead of
//! mutating a discarded model.

use crate::runtime::errors::StructuralError;
use std::cell::Cell;
use std::rc::Rc;

#[derive(Debug, Default)]
struct LifecycleState {
    generation: Cell<u64>,
    torn_down: Cell<bool>,
}

/// Cloneable handle; all clones observe the same teardown
#[derive(Debug, Clone, Default)]
pub struct Lifecycle {
    state: Rc<LifecycleState>,
}

/// Proof that an operation started while the form was live
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

impl Lifecycle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ticket(&self) -> Result<Ticket, StructuralError> {
        if self.state.torn_down.get() {
            return Err(StructuralError::TornDown);
        }
        Ok(Ticket(self.state.generation.get()))
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        !self.state.torn_down.get() && self.state.generation.get() == ticket.0
    }

    pub fn is_torn_down(&self) -> bool {
        self.state.torn_down.get()
    }

    /// Invalidate every outstanding ticket. Idempotent.
    pub fn teardown(&self) {
        if self.state.torn_down.replace(true) {
            return;
        }
        self.state.generation.set(self.state.generation.get() + 1);
        tracing::debug!("Lifecycle torn down at generation {}", self.state.generation.get());
    }
}
