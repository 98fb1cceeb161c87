use crate::error::JobError;
use crate::pool::PoolCore;
use crate::registry::{GroupId, GroupRegistry};

/// Handle passed to every job closure.
///
/// Carries the identity of the executing thread and a reference back to the
/// pool, so a running job can submit follow-up work and wait on it.
///
/// Thread IDs fall in `[0, threads)`: background workers hold `1..threads`
/// and `0` is the thread that called [`GroupPool::wait`] (or the sole
/// caller of a degenerate pool). The ID is stable for the duration of one
/// closure invocation, which makes it safe to index per-thread scratch
/// storage of length `threads()`.
///
/// [`GroupPool::wait`]: crate::GroupPool::wait
pub struct Scope<'a> {
    pool: &'a PoolCore,
    thread_id: usize,
}

impl<'a> Scope<'a> {
    pub(crate) fn new(pool: &'a PoolCore, thread_id: usize) -> Self {
        Scope { pool, thread_id }
    }

    /// Identity of the thread running this closure, in `[0, threads)`.
    pub fn thread_id(&self) -> usize {
        self.thread_id
    }

    /// The pool's configured thread count.
    pub fn threads(&self) -> usize {
        self.pool.threads()
    }

    /// Reserve a fresh group ID. See [`GroupPool::new_job_group`].
    ///
    /// [`GroupPool::new_job_group`]: crate::GroupPool::new_job_group
    pub fn new_job_group(&self) -> GroupId {
        self.pool.new_job_group()
    }

    /// Submit a job from inside a running job. If the queue is full the job
    /// runs inline on this thread, under this thread's ID.
    pub fn add_job<F>(&self, group: GroupId, job: F) -> Result<(), JobError>
    where
        F: FnOnce(&Scope<'_>, &ErrorProbe<'_>) -> Result<(), JobError> + Send + 'static,
    {
        self.pool.add_job_from(self.thread_id, group, job)
    }

    /// Submit one job per chunk of `[lo, hi)` from inside a running job.
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
        self.pool.add_range_job_from(self.thread_id, lo, hi, group, job)
    }

    /// Wait on a group from inside a running job. While waiting, this
    /// thread keeps draining the queue, running dequeued jobs under its own
    /// ID.
    pub fn wait(&self, group: GroupId) -> Result<(), JobError> {
        self.pool.wait_from(self.thread_id, group)
    }
}

/// Read-only view of the first error recorded for a job's own group.
///
/// Handed to every closure alongside the [`Scope`]. A job that observes a
/// sibling's failure can return `Ok(())` early instead of doing work whose
/// result the group's `wait` will discard anyway; the pool itself never
/// cancels queued jobs.
pub struct ErrorProbe<'a> {
    registry: &'a GroupRegistry,
    group: GroupId,
}

impl<'a> ErrorProbe<'a> {
    pub(crate) fn new(registry: &'a GroupRegistry, group: GroupId) -> Self {
        ErrorProbe { registry, group }
    }

    /// The group's first error so far, if any. Monotone: once this returns
    /// `Some`, it keeps returning the same error for the group's lifetime.
    pub fn error(&self) -> Option<JobError> {
        self.registry.error(self.group)
    }
}
