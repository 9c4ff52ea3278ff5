//! A blocking FIFO queue with fair hand-off to waiting consumers.
//!
//! The queue is a classic monitor: one mutex guards the item store, the
//! list of blocked consumers and the lifecycle flag, and each blocked
//! consumer sleeps on its own condition variable. Wakes are serialized by a
//! hand-off flag: at most one consumer is between being signaled and
//! claiming the front item at any time, and while the flag is set that item
//! belongs to the signaled consumer. The claimant passes the baton to the
//! next waiter in line, so consumers are served strictly in arrival order
//! without a dedicated coordinator thread.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crossbeam_utils::CachePadded;

use err::{PopError, PushError, TryPopError};
use fifo::Fifo;
use waiter::{Waiter, WaiterState};

/// Acquires `mutex`, recovering the guard from a poisoned lock.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Everything the queue's lock protects.
struct State<T> {
    /// Items waiting to be consumed, oldest first.
    data: Fifo<T>,

    /// Consumers waiting for an item, longest-waiting first. Holds only
    /// waiters still in the `Registered` state; a waiter leaves the list
    /// the moment it is signaled.
    waiters: Fifo<Arc<Waiter>>,

    /// A woken consumer has been promised the front item of `data` but has
    /// not claimed it yet. While set, no other consumer may take that item
    /// and no further waiter is woken.
    handoff: bool,

    /// Cleared by `close`; no operation starts once this is false.
    active: bool,
}

impl<T> State<T> {
    /// Hands the front item to the longest-waiting consumer.
    ///
    /// Does nothing if there is no item, no waiter, or a hand-off is
    /// already in flight. The queue's lock must be held.
    fn wake_next(&mut self) {
        if !self.handoff && !self.data.is_empty() {
            if let Some(waiter) = self.waiters.pop_front() {
                self.handoff = true;
                waiter.wake();
            }
        }
    }

    /// Takes the item promised to a woken consumer and passes the baton to
    /// the next waiter in line.
    fn claim(&mut self) -> T {
        let item = match self.data.pop_front() {
            Some(item) => item,
            // The signaler confirms an item is present before every
            // hand-off.
            None => unreachable!("woken consumer found an empty store"),
        };
        self.handoff = false;
        self.wake_next();
        item
    }
}

/// A blocking multi-producer multi-consumer FIFO queue.
///
/// Items are delivered in the order they were pushed. Consumers that block
/// in [`pop`] are served strictly in the order they arrived: a push wakes
/// at most the single longest-waiting consumer, and [`try_pop`] refuses to
/// overtake a blocked consumer even when an item is physically present.
/// [`close`] releases every blocked consumer and makes all later
/// operations fail without blocking.
///
/// The queue takes no interest in its items beyond holding them between
/// push and pop; any `T: Send` works.
///
/// # Examples
///
/// ```
/// use fair_queue::BlockingQueue;
///
/// let q = BlockingQueue::new();
/// q.push(1).unwrap();
/// q.push(2).unwrap();
/// assert_eq!(q.pop(), Ok(1));
/// assert_eq!(q.pop(), Ok(2));
/// ```
///
/// [`pop`]: #method.pop
/// [`try_pop`]: #method.try_pop
/// [`close`]: #method.close
pub struct BlockingQueue<T> {
    /// All mutable state, kept on its own cache lines.
    state: CachePadded<Mutex<State<T>>>,
}

impl<T> BlockingQueue<T> {
    /// Creates a new, empty, active queue.
    pub fn new() -> BlockingQueue<T> {
        BlockingQueue {
            state: CachePadded::new(Mutex::new(State {
                data: Fifo::new(),
                waiters: Fifo::new(),
                handoff: false,
                active: true,
            })),
        }
    }

    /// Appends `item` to the back of the queue.
    ///
    /// Never blocks. If consumers are waiting, exactly one of them, the
    /// longest-waiting, is woken to claim the front item.
    ///
    /// On a closed queue the push fails and the item is handed back inside
    /// the error.
    pub fn push(&self, item: T) -> Result<(), PushError<T>> {
        let mut state = lock(&self.state);
        if !state.active {
            return Err(PushError(item));
        }
        state.data.push_back(item);
        state.wake_next();
        Ok(())
    }

    /// Removes the front item, blocking until one is available.
    ///
    /// Consumers are served in arrival order: a call that finds other
    /// consumers already waiting queues up behind them, even if items are
    /// present. Returns [`PopError::Closed`] on a queue closed before the
    /// call, and [`PopError::Cancelled`] if the queue is closed while this
    /// call is blocked.
    ///
    /// [`PopError::Closed`]: enum.PopError.html#variant.Closed
    /// [`PopError::Cancelled`]: enum.PopError.html#variant.Cancelled
    pub fn pop(&self) -> Result<T, PopError> {
        let mut state = lock(&self.state);
        if !state.active {
            return Err(PopError::Closed);
        }

        // Claim immediately only when nobody is ahead of us and the front
        // item is not already promised to a woken consumer.
        if state.waiters.is_empty() && !state.handoff {
            if let Some(item) = state.data.pop_front() {
                return Ok(item);
            }
        }

        // Register and sleep. The emptiness check and the registration
        // happen under one lock acquisition, so a push racing with them
        // cannot have its wakeup lost.
        let waiter = Arc::new(Waiter::new());
        state.waiters.push_back(waiter.clone());
        loop {
            state = waiter.wait(state);
            match waiter.state() {
                WaiterState::Registered => continue, // spurious wake
                WaiterState::Woken => return Ok(state.claim()),
                WaiterState::Cancelled => return Err(PopError::Cancelled),
            }
        }
    }

    /// Removes the front item if one is available and unclaimed.
    ///
    /// Never blocks. Fails with [`TryPopError::Empty`] when the queue holds
    /// no items, and also when items are present but consumers are blocked
    /// ahead of the caller; those items are already earmarked for them.
    ///
    /// [`TryPopError::Empty`]: enum.TryPopError.html#variant.Empty
    pub fn try_pop(&self) -> Result<T, TryPopError> {
        let mut state = lock(&self.state);
        if !state.active {
            return Err(TryPopError::Closed);
        }
        if state.handoff || !state.waiters.is_empty() {
            return Err(TryPopError::Empty);
        }
        state.data.pop_front().ok_or(TryPopError::Empty)
    }

    /// Returns the number of items currently stored.
    pub fn len(&self) -> usize {
        lock(&self.state).data.len()
    }

    /// Returns `true` if no items are stored.
    pub fn is_empty(&self) -> bool {
        lock(&self.state).data.is_empty()
    }

    /// Returns the number of consumers currently blocked in [`pop`].
    ///
    /// [`pop`]: #method.pop
    pub fn waiting(&self) -> usize {
        lock(&self.state).waiters.len()
    }

    /// Returns the total number of items delivered to consumers over the
    /// queue's lifetime.
    pub fn visited(&self) -> usize {
        lock(&self.state).data.visited()
    }

    /// Returns `true` once [`close`] has been called.
    ///
    /// [`close`]: #method.close
    pub fn is_closed(&self) -> bool {
        !lock(&self.state).active
    }

    /// Closes the queue and releases every blocked consumer.
    ///
    /// Each consumer blocked in [`pop`] is woken and returns
    /// [`PopError::Cancelled`]; later pushes and pops fail without
    /// blocking. Undelivered items are dropped, except a front item already
    /// promised to a woken consumer, which that consumer still receives.
    ///
    /// Returns the number of undelivered items dropped. Closing an already
    /// closed queue does nothing and returns 0.
    ///
    /// [`pop`]: #method.pop
    /// [`PopError::Cancelled`]: enum.PopError.html#variant.Cancelled
    #[cold]
    pub fn close(&self) -> usize {
        let mut state = lock(&self.state);
        if !state.active {
            return 0;
        }
        state.active = false;
        while let Some(waiter) = state.waiters.pop_front() {
            waiter.cancel();
        }
        let keep = if state.handoff { 1 } else { 0 };
        state.data.truncate(keep)
    }
}

impl<T> Default for BlockingQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for BlockingQueue<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let state = lock(&self.state);
        f.debug_struct("BlockingQueue")
            .field("len", &state.data.len())
            .field("waiting", &state.waiters.len())
            .field("closed", &!state.active)
            .finish()
    }
}
