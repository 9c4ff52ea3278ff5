//! A fair blocking FIFO queue for multiple producers and consumers.
//!
//! Items come out in the order they went in, and consumers blocked waiting
//! for an item are served strictly in the order they arrived: each push
//! wakes at most the single longest-waiting consumer, a non-blocking take
//! never overtakes a blocked one, and closing the queue promptly releases
//! every consumer still waiting.
//!
//! # Examples
//!
//! ```
//! use std::sync::Arc;
//! use std::thread;
//!
//! use fair_queue::BlockingQueue;
//!
//! let q = Arc::new(BlockingQueue::new());
//!
//! let consumer = {
//!     let q = q.clone();
//!     thread::spawn(move || q.pop())
//! };
//!
//! q.push("hello").unwrap();
//! assert_eq!(consumer.join().unwrap(), Ok("hello"));
//! ```

extern crate crossbeam_utils;

#[cfg(test)]
extern crate rand;

mod err;
mod fifo;
mod queue;
mod waiter;

pub use self::err::{PopError, PushError, TryPopError};
pub use self::queue::BlockingQueue;
