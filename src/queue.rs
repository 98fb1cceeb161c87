use std::sync::RwLock;

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};

use crate::job::Job;

pub(crate) enum PushError {
    /// Queue is at capacity; the job is handed back to the producer.
    Full(Job),
    /// Queue was closed; no further submissions are accepted.
    Closed(Job),
}

/// Bounded FIFO of pending jobs.
///
/// A thin wrapper over a bounded channel. The sender side lives behind a
/// lock so `close()` can drop it while producers are active; once it is
/// gone, `pop()` drains whatever is still buffered and then reports the
/// queue closed. FIFO order holds per producer; consumers see a merge of
/// the producer sequences.
pub(crate) struct JobQueue {
    tx: RwLock<Option<Sender<Job>>>,
    rx: Receiver<Job>,
}

impl JobQueue {
    pub fn new(capacity: usize) -> Self {
        let (tx, rx) = bounded(capacity);
        JobQueue {
            tx: RwLock::new(Some(tx)),
            rx,
        }
    }

    /// Non-blocking enqueue. A full queue hands the job back so the
    /// producer can run it inline.
    pub fn try_push(&self, job: Job) -> Result<(), PushError> {
        match self.tx.read().unwrap().as_ref() {
            Some(tx) => match tx.try_send(job) {
                Ok(()) => Ok(()),
                Err(TrySendError::Full(job)) => Err(PushError::Full(job)),
                Err(TrySendError::Disconnected(job)) => Err(PushError::Closed(job)),
            },
            None => Err(PushError::Closed(job)),
        }
    }

    /// Blocking enqueue, for producers that may stall on a full queue.
    /// No producer inside the pool qualifies: submission must never block,
    /// so overflow runs the job inline instead.
    #[allow(dead_code)]
    pub fn push(&self, job: Job) -> Result<(), PushError> {
        match self.tx.read().unwrap().as_ref() {
            Some(tx) => tx.send(job).map_err(|e| PushError::Closed(e.0)),
            None => Err(PushError::Closed(job)),
        }
    }

    /// Non-blocking dequeue.
    pub fn try_pop(&self) -> Option<Job> {
        self.rx.try_recv().ok()
    }

    /// Blocking dequeue. Returns `None` once the queue is closed and empty.
    pub fn pop(&self) -> Option<Job> {
        self.rx.recv().ok()
    }

    /// Close the queue. Buffered jobs are still handed out; blocked
    /// consumers wake once the buffer is drained.
    pub fn close(&self) {
        self.tx.write().unwrap().take();
    }
}
