//! # Group-Pool: Worker Pool with Nested Job Groups
//!
//! A bounded thread pool built around *job groups*:
//! - Jobs are submitted into groups and awaited per group
//! - Waiting threads work: `wait` drains the queue instead of idling
//! - A running job can open a new group, submit into it, and wait on it
//! - Submission never blocks: on a full queue the job runs inline on the
//!   submitting thread, which keeps nested waiting deadlock-free over a
//!   bounded queue
//! - The first error of each group is sticky and surfaced by `wait`;
//!   running jobs can observe it early through an error probe
//!
//! Each closure receives a [`Scope`] carrying the executing thread's ID in
//! `[0, threads)` (background workers hold `1..threads`, the waiting caller
//! holds `0`), so per-thread scratch storage can be indexed without locks.
//!
//! ## Example
//!
//! ```rust
//! use group_pool::GroupPool;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use std::sync::Arc;
//!
//! let pool = GroupPool::new(4, 64);
//! let group = pool.new_job_group();
//!
//! let hits = Arc::new(AtomicUsize::new(0));
//! for _ in 0..16 {
//!     let hits = Arc::clone(&hits);
//!     pool.add_job(group, move |_scope, _probe| {
//!         hits.fetch_add(1, Ordering::Relaxed);
//!         Ok(())
//!     })
//!     .unwrap();
//! }
//!
//! pool.wait(group).unwrap();
//! assert_eq!(hits.load(Ordering::Relaxed), 16);
//! ```

mod error;
mod job;
mod latch;
mod pool;
mod queue;
mod registry;
mod scope;
mod worker;

pub use error::JobError;
pub use pool::GroupPool;
pub use registry::GroupId;
pub use scope::{ErrorProbe, Scope};
