use std::{
    sync::Arc,
    thread::{self, JoinHandle},
};

use log::trace;

use crate::pool::PoolCore;

pub(crate) fn spawn_worker(id: usize, pool: Arc<PoolCore>) -> JoinHandle<()> {
    thread::Builder::new()
        .name(format!("gp{}", id))
        .spawn(move || {
            trace!("worker {} started", id);
            while let Some(job) = pool.queue().pop() {
                pool.run_job(id, job);
            }
            // queue closed and drained
            trace!("worker {} exiting", id);
        })
        .expect("spawn failed")
}
