use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use log::{debug, warn};

use crate::error::{panic_message, JobError};
use crate::job::Job;
use crate::queue::{JobQueue, PushError};
use crate::registry::{GroupId, GroupRegistry};
use crate::scope::{ErrorProbe, Scope};
use crate::worker::spawn_worker;

/// Thread ID under which external callers submit and wait.
const CALLER_ID: usize = 0;

/// Shared core of a pool: everything the workers and the public handle
/// both need. Workers hold an `Arc` to it; `Scope` borrows it.
pub(crate) struct PoolCore {
    threads: usize,
    queue: JobQueue,
    registry: GroupRegistry,
}

impl PoolCore {
    pub fn threads(&self) -> usize {
        self.threads
    }

    pub fn queue(&self) -> &JobQueue {
        &self.queue
    }

    /// A pool with a single thread runs every job synchronously on the
    /// caller; jobs never pass through the queue and groups never hold a
    /// latch.
    fn degenerate(&self) -> bool {
        self.threads == 1
    }

    pub fn new_job_group(&self) -> GroupId {
        self.registry.allocate()
    }

    pub fn add_job_from<F>(&self, thread_id: usize, group: GroupId, job: F) -> Result<(), JobError>
    where
        F: FnOnce(&Scope<'_>, &ErrorProbe<'_>) -> Result<(), JobError> + Send + 'static,
    {
        if self.degenerate() {
            let scope = Scope::new(self, CALLER_ID);
            let probe = ErrorProbe::new(&self.registry, group);
            return job(&scope, &probe);
        }

        // increment before enqueue, so a concurrent wait() cannot observe
        // the group at zero while this job is still queued
        self.registry.latch_for(group).add(1);

        match self.queue.try_push(Job::new(group, Box::new(job))) {
            Ok(()) => Ok(()),
            // full queue: run on the submitting thread instead of blocking;
            // a blocked submitter may be the only thread able to drain
            Err(PushError::Full(job)) => {
                self.run_job(thread_id, job);
                Ok(())
            }
            Err(PushError::Closed(_)) => panic!("job submitted to a stopped pool"),
        }
    }

    pub fn add_range_job_from<F>(
        &self,
        thread_id: usize,
        lo: usize,
        hi: usize,
        group: GroupId,
        job: F,
    ) -> Result<(), JobError>
    where
        F: Fn(usize, &Scope<'_>, &ErrorProbe<'_>) -> Result<(), JobError> + Send + Sync + 'static,
    {
        if lo >= hi {
            return Ok(());
        }
        let len = hi - lo;
        let chunks = self.threads.min(len);
        let size = len / chunks;
        let job = Arc::new(job);

        for chunk in 0..chunks {
            let start = lo + chunk * size;
            // the final chunk absorbs the division remainder
            let end = if chunk + 1 == chunks { hi } else { start + size };
            let job = Arc::clone(&job);
            self.add_job_from(thread_id, group, move |scope, probe| {
                for i in start..end {
                    (*job)(i, scope, probe)?;
                }
                Ok(())
            })?;
        }
        Ok(())
    }

    pub fn wait_from(&self, thread_id: usize, group: GroupId) -> Result<(), JobError> {
        if self.degenerate() {
            return Ok(());
        }
        // a group nothing was ever submitted to has nothing to wait for
        let Some(latch) = self.registry.latch(group) else {
            return Ok(());
        };

        loop {
            if latch.value() == 0 {
                break;
            }
            // drain whatever is queued, not only jobs of the waited group:
            // the queue is shared FIFO and the waited group's children may
            // sit behind jobs of other groups
            match self.queue.try_pop() {
                Some(job) => self.run_job(thread_id, job),
                None => {
                    latch.wait();
                    break;
                }
            }
        }

        match self.registry.remove(group) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Execute one job: invoke the closure with the executing thread's
    /// identity and a probe bound to the job's group, record a failure as
    /// the group's first error, and decrement the group latch. A panicking
    /// closure is caught and recorded as a synthetic error so it cannot
    /// leave the latch stuck.
    pub fn run_job(&self, thread_id: usize, job: Job) {
        let (group, func) = job.into_parts();
        let scope = Scope::new(self, thread_id);
        let probe = ErrorProbe::new(&self.registry, group);

        match panic::catch_unwind(AssertUnwindSafe(|| func(&scope, &probe))) {
            Ok(Ok(())) => {}
            Ok(Err(err)) => self.registry.record_error(group, err),
            Err(payload) => {
                let msg = panic_message(payload.as_ref());
                warn!("job in group {} panicked: {}", group, msg);
                self.registry
                    .record_error(group, JobError::msg(format!("job panicked: {}", msg)));
            }
        }
        self.registry.finish(group);
    }
}

/// A bounded worker pool with job groups and nested waiting.
///
/// `new(n, b)` spawns `n - 1` background workers over a queue of capacity
/// `b`; the n-th worker slot is taken by whichever thread is currently
/// inside [`wait`](GroupPool::wait). See the crate docs for the model.
pub struct GroupPool {
    core: Arc<PoolCore>,
    workers: Mutex<Vec<JoinHandle<()>>>,
}

impl GroupPool {
    /// Create a pool with `threads` total execution slots and a pending-job
    /// queue of capacity `bufsize`.
    ///
    /// `threads == 1` yields a degenerate pool that spawns nothing and runs
    /// every job synchronously on the caller.
    ///
    /// # Panics
    ///
    /// If `threads` or `bufsize` is zero.
    pub fn new(threads: usize, bufsize: usize) -> Self {
        assert!(threads >= 1, "pool needs at least one thread");
        assert!(bufsize >= 1, "queue capacity must be at least one");

        let core = Arc::new(PoolCore {
            threads,
            queue: JobQueue::new(bufsize),
            registry: GroupRegistry::new(),
        });

        let workers = (1..threads)
            .map(|id| spawn_worker(id, Arc::clone(&core)))
            .collect();

        GroupPool {
            core,
            workers: Mutex::new(workers),
        }
    }

    /// The configured thread count, including the caller's slot.
    pub fn threads(&self) -> usize {
        self.core.threads()
    }

    /// Reserve a fresh, unused group ID. No jobs are submitted and nothing
    /// is registered; the first `add_job` naming the ID creates the group.
    ///
    /// Passing self-chosen integers to `add_job` instead is also supported.
    pub fn new_job_group(&self) -> GroupId {
        self.core.new_job_group()
    }

    /// Submit a job into `group`.
    ///
    /// Never blocks: if the queue is full the job runs inline on the
    /// calling thread before this returns. On a degenerate pool the job
    /// runs immediately and its error, if any, is returned directly; in
    /// every other case the result is `Ok` and failures surface through
    /// [`wait`](GroupPool::wait).
    ///
    /// # Panics
    ///
    /// If the pool was stopped.
    pub fn add_job<F>(&self, group: GroupId, job: F) -> Result<(), JobError>
    where
        F: FnOnce(&Scope<'_>, &ErrorProbe<'_>) -> Result<(), JobError> + Send + 'static,
    {
        self.core.add_job_from(CALLER_ID, group, job)
    }

    /// Split `[lo, hi)` into at most [`threads`](GroupPool::threads)
    /// contiguous chunks and submit one job per chunk; each chunk invokes
    /// `job(i, scope, probe)` for its indices in order and stops at the
    /// first error. `lo >= hi` is a no-op.
    pub fn add_range_job<F>(
        &self,
        lo: usize,
        hi: usize,
        group: GroupId,
        job: F,
    ) -> Result<(), JobError>
    where
        F: Fn(usize, &Scope<'_>, &ErrorProbe<'_>) -> Result<(), JobError> + Send + Sync + 'static,
    {
        self.core.add_range_job_from(CALLER_ID, lo, hi, group, job)
    }

    /// Wait until every job of `group` has completed, then return the
    /// group's first error, or `Ok` if none was recorded (or if the group
    /// never had jobs).
    ///
    /// The calling thread works while it waits: it keeps dequeuing and
    /// running pending jobs (of any group, under thread ID 0) until the
    /// queue is empty, and only then blocks. On return the group is gone;
    /// a later submission under the same ID starts a new logical group.
    pub fn wait(&self, group: GroupId) -> Result<(), JobError> {
        self.core.wait_from(CALLER_ID, group)
    }

    /// Stop the pool: close the queue, let the workers drain it, and join
    /// them. Idempotent. Submitting after `stop` panics.
    pub fn stop(&self) {
        debug!("stopping pool");
        self.core.queue().close();
        let mut workers = self.workers.lock().unwrap();
        for worker in workers.drain(..) {
            let _ = worker.join();
        }
    }
}

impl Drop for GroupPool {
    fn drop(&mut self) {
        self.stop();
    }
}
