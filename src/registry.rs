use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

use crate::error::JobError;
use crate::latch::CountingLatch;

/// Identifies a set of jobs that can be awaited as a unit.
///
/// IDs handed out by `new_job_group` are fresh, but any integer is accepted
/// by `add_job` and `wait`; the registry registers unknown IDs lazily.
pub type GroupId = usize;

struct GroupEntry {
    latch: Arc<CountingLatch>,
    error: Option<JobError>,
}

impl GroupEntry {
    fn new() -> Self {
        GroupEntry {
            latch: Arc::new(CountingLatch::new()),
            error: None,
        }
    }
}

/// Tracks live groups: their latch and their first recorded error.
///
/// Lookups take the shared lock, mutations the exclusive one. An entry
/// lives from the first submission naming its ID until the `wait` call that
/// observes the latch at zero removes it.
pub(crate) struct GroupRegistry {
    groups: RwLock<HashMap<GroupId, GroupEntry>>,
    next_id: AtomicUsize,
}

impl GroupRegistry {
    pub fn new() -> Self {
        GroupRegistry {
            groups: RwLock::new(HashMap::new()),
            next_id: AtomicUsize::new(0),
        }
    }

    /// Return a fresh ID. Counter values colliding with a live entry are
    /// skipped, so the sequence is monotonic but not contiguous.
    pub fn allocate(&self) -> GroupId {
        let groups = self.groups.read().unwrap();
        loop {
            let id = self.next_id.fetch_add(1, Ordering::Relaxed);
            if !groups.contains_key(&id) {
                return id;
            }
        }
    }

    // the group's latch, registering the group on first use
    pub fn latch_for(&self, id: GroupId) -> Arc<CountingLatch> {
        if let Some(entry) = self.groups.read().unwrap().get(&id) {
            return Arc::clone(&entry.latch);
        }
        let mut groups = self.groups.write().unwrap();
        let entry = groups.entry(id).or_insert_with(GroupEntry::new);
        Arc::clone(&entry.latch)
    }

    pub fn latch(&self, id: GroupId) -> Option<Arc<CountingLatch>> {
        self.groups
            .read()
            .unwrap()
            .get(&id)
            .map(|entry| Arc::clone(&entry.latch))
    }

    // first error wins, later ones are dropped
    pub fn record_error(&self, id: GroupId, err: JobError) {
        let mut groups = self.groups.write().unwrap();
        let entry = groups
            .get_mut(&id)
            .expect("error recorded for a group that is not live");
        if entry.error.is_none() {
            entry.error = Some(err);
        }
    }

    pub fn error(&self, id: GroupId) -> Option<JobError> {
        self.groups
            .read()
            .unwrap()
            .get(&id)
            .and_then(|entry| entry.error.clone())
    }

    // decrement the group's latch after a job finished
    pub fn finish(&self, id: GroupId) {
        self.groups
            .read()
            .unwrap()
            .get(&id)
            .expect("job finished for a group that is not live")
            .latch
            .done();
    }

    // drop the group, returning its recorded error
    pub fn remove(&self, id: GroupId) -> Option<JobError> {
        self.groups
            .write()
            .unwrap()
            .remove(&id)
            .and_then(|entry| entry.error)
    }
}
