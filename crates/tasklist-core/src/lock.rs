//! Per-operation UI locks
//!
//! Each operation kind (entering a new todo, deleting) owns one
//! `OperationLock` that walks `Idle -> Pending -> {Committed, Failed}`.
//! Acquiring hands out a `LockTicket` that is neither `Clone` nor `Copy` and
//! must be given back to `settle`, so a lock cannot be settled twice and a
//! ticket for one kind cannot settle the other.
//!
//! The lock is a binary latch: a second acquire while pending is refused.

use std::fmt;
use std::marker::PhantomData;

use tracing::debug;

/// Marker for an operation kind
pub trait LockKind {
    const NAME: &'static str;
}

/// The entry field, engaged while a create is in flight
#[derive(Debug)]
pub enum InputLock {}

impl LockKind for InputLock {
    const NAME: &'static str = "input";
}

/// The delete affordance, engaged while any delete is in flight
#[derive(Debug)]
pub enum DeleteLock {}

impl LockKind for DeleteLock {
    const NAME: &'static str = "delete";
}

/// Lifecycle phase of a lock
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockPhase {
    /// Never used
    Idle,
    /// Operation in flight
    Pending,
    /// Last operation succeeded
    Committed,
    /// Last operation failed
    Failed,
}

/// How an operation ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settlement {
    Committed,
    Failed,
}

/// Proof that the holder started the pending operation
#[must_use = "a lock ticket must be settled or the lock stays engaged"]
pub struct LockTicket<K: LockKind> {
    _kind: PhantomData<K>,
}

impl<K: LockKind> fmt::Debug for LockTicket<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LockTicket<{}>", K::NAME)
    }
}

/// Binary latch guarding one kind of operation
pub struct OperationLock<K: LockKind> {
    phase: LockPhase,
    _kind: PhantomData<K>,
}

impl<K: LockKind> fmt::Debug for OperationLock<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OperationLock")
            .field("kind", &K::NAME)
            .field("phase", &self.phase)
            .finish()
    }
}

impl<K: LockKind> Default for OperationLock<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: LockKind> OperationLock<K> {
    pub fn new() -> Self {
        Self {
            phase: LockPhase::Idle,
            _kind: PhantomData,
        }
    }

    /// Start an operation, or `None` if one is already pending
    pub fn acquire(&mut self) -> Option<LockTicket<K>> {
        if self.phase == LockPhase::Pending {
            debug!("{} lock busy", K::NAME);
            return None;
        }
        self.phase = LockPhase::Pending;
        Some(LockTicket { _kind: PhantomData })
    }

    /// Finish the operation started with `ticket`
    pub fn settle(&mut self, ticket: LockTicket<K>, outcome: Settlement) {
        let LockTicket { .. } = ticket;
        self.phase = match outcome {
            Settlement::Committed => LockPhase::Committed,
            Settlement::Failed => LockPhase::Failed,
        };
    }

    /// Whether the affordance should be disabled
    pub fn is_engaged(&self) -> bool {
        self.phase == LockPhase::Pending
    }

    pub fn phase(&self) -> LockPhase {
        self.phase
    }
}
