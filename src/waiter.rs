//! Bookkeeping for consumers blocked inside a blocking pop.

use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering::{Acquire, Release};
use std::sync::{Condvar, MutexGuard, PoisonError};

const REGISTERED: usize = 0;
const WOKEN: usize = 1;
const CANCELLED: usize = 2;

/// Slot state of a blocked consumer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaiterState {
    /// In the waiting list, asleep on its condition variable.
    Registered,

    /// Signaled to claim an item; already removed from the waiting list.
    Woken,

    /// The queue was closed while the consumer was waiting.
    Cancelled,
}

/// One consumer blocked inside a blocking pop.
///
/// Each waiter sleeps on its own condition variable, so a signaler can wake
/// exactly one chosen consumer and no other. The slot state is written only
/// while the owning queue's lock is held, and a waiter is signaled at most
/// once: `Registered` becomes either `Woken` or `Cancelled`, never both.
#[derive(Debug)]
pub struct Waiter {
    /// Encoded `WaiterState`.
    state: AtomicUsize,

    /// The private wake signal.
    cond: Condvar,
}

impl Waiter {
    /// Returns a fresh waiter in the `Registered` state.
    pub fn new() -> Waiter {
        Waiter {
            state: AtomicUsize::new(REGISTERED),
            cond: Condvar::new(),
        }
    }

    /// Decodes the current slot state.
    pub fn state(&self) -> WaiterState {
        match self.state.load(Acquire) {
            REGISTERED => WaiterState::Registered,
            WOKEN => WaiterState::Woken,
            _ => WaiterState::Cancelled,
        }
    }

    /// Releases `guard` and sleeps until signaled, re-acquiring the lock on
    /// wake. Condition variables may wake spuriously, so callers must
    /// re-check the slot state before acting.
    pub fn wait<'a, T>(&self, guard: MutexGuard<'a, T>) -> MutexGuard<'a, T> {
        self.cond.wait(guard).unwrap_or_else(PoisonError::into_inner)
    }

    /// Signals the waiter to claim an item. The owning queue's lock must be
    /// held.
    pub fn wake(&self) {
        self.state.store(WOKEN, Release);
        self.cond.notify_one();
    }

    /// Signals the waiter that the queue was closed. The owning queue's
    /// lock must be held.
    pub fn cancel(&self) {
        self.state.store(CANCELLED, Release);
        self.cond.notify_one();
    }
}
