// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! A fixed pool of background threads for repository calls.

use crossbeam_channel::{Receiver, Sender};
use std::panic::{self, AssertUnwindSafe};
use std::thread;

pub(crate) type Job = Box<dyn FnOnce() + Send + 'static>;

/// Runs jobs on `threads` named worker threads, in no particular order.
///
/// Dropping the pool closes the queue and joins every worker after the
/// already queued jobs have run.
pub(crate) struct WorkerPool {
    sender: Option<Sender<Job>>,
    handles: Vec<thread::JoinHandle<()>>,
}

impl WorkerPool {
    pub(crate) fn new(threads: usize) -> std::io::Result<Self> {
        let threads = threads.max(1);
        let (sender, receiver) = crossbeam_channel::unbounded::<Job>();

        let handles = (0..threads)
            .map(|index| {
                let receiver = receiver.clone();
                thread::Builder::new()
                    .name(format!("quarry-resolve-{index}"))
                    .spawn(move || Self::work(receiver))
            })
            .collect::<std::io::Result<Vec<_>>>()?;

        log::info!("Resolution worker pool started with {threads} thread(s).");

        Ok(Self {
            sender: Some(sender),
            handles,
        })
    }

    /// Queues `job`. Hands it back if the pool is shutting down.
    pub(crate) fn execute(&self, job: Job) -> Result<(), Job> {
        match &self.sender {
            Some(sender) => sender.send(job).map_err(|e| e.into_inner()),
            None => Err(job),
        }
    }

    pub(crate) fn threads(&self) -> usize {
        self.handles.len()
    }

    fn work(receiver: Receiver<Job>) {
        while let Ok(job) = receiver.recv() {
            if panic::catch_unwind(AssertUnwindSafe(job)).is_err() {
                log::error!("A resolution job panicked; the worker keeps running.");
            }
        }
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.sender.take();
        for handle in self.handles.drain(..) {
            if handle.join().is_err() {
                log::error!("A resolution worker exited with a panic.");
            }
        }
        log::info!("Resolution worker pool stopped.");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn runs_every_job_before_shutdown() {
        let counter = Arc::new(AtomicUsize::new(0));
        let pool = WorkerPool::new(3).expect("Pool should start");
        assert_eq!(pool.threads(), 3);

        for _ in 0..50 {
            let counter = counter.clone();
            assert!(pool
                .execute(Box::new(move || {
                    counter.fetch_add(1, Ordering::SeqCst);
                }))
                .is_ok());
        }
        drop(pool);

        assert_eq!(counter.load(Ordering::SeqCst), 50);
    }

    #[test]
    fn survives_a_panicking_job() {
        let counter = Arc::new(AtomicUsize::new(0));
        let pool = WorkerPool::new(1).expect("Pool should start");

        assert!(pool.execute(Box::new(|| panic!("job failure"))).is_ok());
        let after = counter.clone();
        assert!(pool
            .execute(Box::new(move || {
                after.fetch_add(1, Ordering::SeqCst);
            }))
            .is_ok());
        drop(pool);

        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn zero_threads_still_starts_one() {
        let pool = WorkerPool::new(0).expect("Pool should start");
        assert_eq!(pool.threads(), 1);
    }
}
