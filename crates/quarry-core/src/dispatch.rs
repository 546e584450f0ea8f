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

//! Hands work from background contexts back to the single consuming context.
//!
//! The [`CompletionDispatcher`] owns the consumer end of an unbounded,
//! multi-producer channel. Producers hold a [`CompletionSender`] and enqueue
//! closures; the consuming context calls [`CompletionDispatcher::drain`] once
//! per tick, which runs every queued closure against a `&mut C` in FIFO order.
//!
//! The dispatcher is an ordinary value: whoever owns the consuming context
//! owns the dispatcher, and separate dispatchers never share state.

use anyhow::anyhow;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::time::Duration;

type Completion<C> = Box<dyn FnOnce(&mut C) + Send + 'static>;

/// The consumer end of a completion queue for context type `C`.
pub struct CompletionDispatcher<C: 'static> {
    sender: flume::Sender<Completion<C>>,
    receiver: flume::Receiver<Completion<C>>,
}

/// The producer end of a completion queue. Cheap to clone, safe to send.
pub struct CompletionSender<C: 'static> {
    sender: flume::Sender<Completion<C>>,
}

impl<C: 'static> Clone for CompletionSender<C> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
        }
    }
}

impl<C: 'static> CompletionSender<C> {
    /// Queues `work` to run on the consuming context. Never blocks.
    ///
    /// ## Arguments
    /// * `work` - The closure to run against the consuming context's state.
    ///
    /// ## Returns
    /// `false` if the dispatcher has been dropped; the work is discarded in
    /// that case.
    pub fn enqueue<F>(&self, work: F) -> bool
    where
        F: FnOnce(&mut C) + Send + 'static,
    {
        log::trace!("Enqueuing a completion.");

        if let Err(e) = self.sender.send(Box::new(work)) {
            log::error!("Failed to enqueue completion: {e}. Dispatcher likely dropped.");
            return false;
        }
        true
    }

    /// Queues `work` and waits, without blocking the thread, until the
    /// consuming context has run it.
    ///
    /// ## Arguments
    /// * `work` - The closure to run against the consuming context's state.
    ///
    /// ## Returns
    /// The value produced by `work`. An error returned by `work`, or a panic
    /// inside it, is surfaced to the awaiting caller.
    pub async fn enqueue_and_await<T, F>(&self, work: F) -> anyhow::Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut C) -> anyhow::Result<T> + Send + 'static,
    {
        let (tx, rx) = tokio::sync::oneshot::channel();

        let queued = self.enqueue(move |context| {
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| work(context)))
                .unwrap_or_else(|payload| {
                    Err(anyhow!("completion panicked: {}", panic_message(&*payload)))
                });
            // The awaiting side may have given up; nothing to report then.
            let _ = tx.send(outcome);
        });

        if !queued {
            return Err(anyhow!("completion dispatcher is no longer draining"));
        }

        rx.await
            .map_err(|_| anyhow!("completion was dropped before it ran"))?
    }
}

impl<C: 'static> CompletionDispatcher<C> {
    /// Creates a dispatcher with an unbounded queue.
    pub fn new() -> Self {
        let (sender, receiver) = flume::unbounded();
        log::debug!("CompletionDispatcher initialized.");
        Self { sender, receiver }
    }

    /// Returns a producer handle for background contexts.
    pub fn sender(&self) -> CompletionSender<C> {
        CompletionSender {
            sender: self.sender.clone(),
        }
    }

    /// Queues `work` from the consuming context itself.
    pub fn enqueue<F>(&self, work: F)
    where
        F: FnOnce(&mut C) + Send + 'static,
    {
        // The receiver lives in `self`, so the send cannot fail.
        let _ = self.sender.send(Box::new(work));
    }

    /// The number of completions waiting to be drained.
    pub fn pending(&self) -> usize {
        self.receiver.len()
    }

    /// Runs every completion queued at the time of the call, in FIFO order.
    ///
    /// Completions enqueued while draining run on the next call. A completion
    /// that panics is logged and skipped; the rest still run.
    ///
    /// ## Arguments
    /// * `context` - The state every completion receives.
    ///
    /// ## Returns
    /// The number of completions executed.
    pub fn drain(&self, context: &mut C) -> usize {
        let queued = self.receiver.len();
        let mut executed = 0;

        for _ in 0..queued {
            let Ok(work) = self.receiver.try_recv() else {
                break;
            };
            Self::run(work, context);
            executed += 1;
        }

        if executed > 0 {
            log::trace!("Drained {executed} completion(s).");
        }
        executed
    }

    /// Waits up to `timeout` for a first completion, then drains the queue.
    pub fn drain_timeout(&self, context: &mut C, timeout: Duration) -> usize {
        match self.receiver.recv_timeout(timeout) {
            Ok(first) => {
                Self::run(first, context);
                1 + self.drain(context)
            }
            Err(_) => 0,
        }
    }

    fn run(work: Completion<C>, context: &mut C) {
        if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| work(context))) {
            log::error!(
                "A completion panicked and was skipped: {}",
                panic_message(&*payload)
            );
        }
    }
}

impl<C: 'static> Default for CompletionDispatcher<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: 'static> std::fmt::Debug for CompletionDispatcher<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompletionDispatcher")
            .field("pending", &self.pending())
            .finish()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[derive(Default)]
    struct Log {
        entries: Vec<&'static str>,
    }

    #[test]
    fn drain_runs_in_fifo_order_exactly_once() {
        let dispatcher = CompletionDispatcher::<Log>::new();
        let sender = dispatcher.sender();
        let mut log = Log::default();

        sender.enqueue(|log: &mut Log| log.entries.push("A"));
        sender.enqueue(|log: &mut Log| log.entries.push("B"));
        sender.enqueue(|log: &mut Log| log.entries.push("C"));

        assert_eq!(dispatcher.drain(&mut log), 3);
        assert_eq!(log.entries, vec!["A", "B", "C"]);

        assert_eq!(dispatcher.drain(&mut log), 0);
        assert_eq!(log.entries.len(), 3);
    }

    #[test]
    fn panicking_completion_does_not_stop_the_drain() {
        let dispatcher = CompletionDispatcher::<Log>::new();
        let mut log = Log::default();

        dispatcher.enqueue(|log: &mut Log| log.entries.push("before"));
        dispatcher.enqueue(|_: &mut Log| panic!("callback failure"));
        dispatcher.enqueue(|log: &mut Log| log.entries.push("after"));

        assert_eq!(dispatcher.drain(&mut log), 3);
        assert_eq!(log.entries, vec!["before", "after"]);
    }

    #[test]
    fn work_enqueued_during_drain_waits_for_next_pass() {
        let dispatcher = CompletionDispatcher::<Log>::new();
        let sender = dispatcher.sender();
        let mut log = Log::default();

        let inner = sender.clone();
        sender.enqueue(move |log: &mut Log| {
            log.entries.push("outer");
            inner.enqueue(|log: &mut Log| log.entries.push("inner"));
        });

        assert_eq!(dispatcher.drain(&mut log), 1);
        assert_eq!(log.entries, vec!["outer"]);
        assert_eq!(dispatcher.pending(), 1);
        assert_eq!(dispatcher.drain(&mut log), 1);
        assert_eq!(log.entries, vec!["outer", "inner"]);
    }

    #[test]
    fn enqueue_from_thread_preserves_producer_order() {
        let dispatcher = CompletionDispatcher::<Vec<u32>>::new();
        let sender = dispatcher.sender();
        let mut seen = Vec::new();

        let handle = thread::spawn(move || {
            for i in 0..100 {
                assert!(sender.enqueue(move |seen: &mut Vec<u32>| seen.push(i)));
            }
        });
        handle.join().expect("Producer thread panicked");

        dispatcher.drain(&mut seen);
        assert_eq!(seen, (0..100).collect::<Vec<_>>());
    }

    #[test]
    fn drain_timeout_waits_for_late_work() {
        let dispatcher = CompletionDispatcher::<Vec<u32>>::new();
        let sender = dispatcher.sender();
        let mut seen = Vec::new();

        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            sender.enqueue(|seen: &mut Vec<u32>| seen.push(7));
        });

        let executed = dispatcher.drain_timeout(&mut seen, Duration::from_secs(2));
        handle.join().expect("Producer thread panicked");

        assert_eq!(executed, 1);
        assert_eq!(seen, vec![7]);
    }

    #[test]
    fn enqueue_fails_after_dispatcher_drop() {
        let dispatcher = CompletionDispatcher::<Log>::new();
        let sender = dispatcher.sender();
        drop(dispatcher);

        assert!(!sender.enqueue(|log: &mut Log| log.entries.push("lost")));
    }

    #[test]
    fn enqueue_and_await_returns_result_from_consumer() {
        let dispatcher = CompletionDispatcher::<Vec<u32>>::new();
        let sender = dispatcher.sender();
        let mut state = vec![1, 2, 3];

        let waiter = thread::spawn(move || {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .build()
                .expect("Failed to build runtime");
            runtime.block_on(sender.enqueue_and_await(|state: &mut Vec<u32>| {
                state.push(4);
                Ok(state.len())
            }))
        });

        while !waiter.is_finished() {
            dispatcher.drain_timeout(&mut state, Duration::from_millis(10));
        }

        let len = waiter
            .join()
            .expect("Waiter thread panicked")
            .expect("Work should succeed");
        assert_eq!(len, 4);
        assert_eq!(state, vec![1, 2, 3, 4]);
    }

    #[test]
    fn enqueue_and_await_surfaces_errors_and_panics() {
        let dispatcher = CompletionDispatcher::<u32>::new();
        let sender = dispatcher.sender();
        let mut counter = 0u32;

        let waiter = thread::spawn(move || {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .build()
                .expect("Failed to build runtime");
            let failed: anyhow::Result<()> = runtime
                .block_on(sender.enqueue_and_await(|_: &mut u32| Err(anyhow!("nope"))));
            let panicked: anyhow::Result<()> =
                runtime.block_on(sender.enqueue_and_await(|_: &mut u32| panic!("boom")));
            (failed, panicked)
        });

        while !waiter.is_finished() {
            dispatcher.drain_timeout(&mut counter, Duration::from_millis(10));
        }

        let (failed, panicked) = waiter.join().expect("Waiter thread panicked");
        assert_eq!(failed.unwrap_err().to_string(), "nope");
        assert!(panicked.unwrap_err().to_string().contains("boom"));
    }
}
