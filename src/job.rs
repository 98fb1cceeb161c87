use crate::error::JobError;
use crate::registry::GroupId;
use crate::scope::{ErrorProbe, Scope};

/// Boxed job closure as stored in the queue.
pub(crate) type JobFn =
    Box<dyn FnOnce(&Scope<'_>, &ErrorProbe<'_>) -> Result<(), JobError> + Send + 'static>;

/// A unit of work: a closure and the group that owns it.
pub(crate) struct Job {
    group: GroupId,
    func: JobFn,
}

impl Job {
    pub fn new(group: GroupId, func: JobFn) -> Self {
        Job { group, func }
    }

    pub fn into_parts(self) -> (GroupId, JobFn) {
        (self.group, self.func)
    }
}
