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

//! Observer registration and fan-out for resolution events.

use quarry_core::error::LoadFailure;
use quarry_core::resource::ResourceKind;

/// Receives resolution notifications on the consuming context.
///
/// Every method has an empty default so implementors only override what they
/// care about.
pub trait ResolutionObserver: Send {
    /// A resource was materialized by the repository and stored.
    fn on_loaded(&mut self, _name: &str, _kind: ResourceKind) {}

    /// A resource could not be resolved.
    fn on_load_failed(&mut self, _name: &str, _kind: ResourceKind, _reason: &LoadFailure) {}

    /// The cache and the category index were cleared.
    fn on_cache_cleared(&mut self) {}
}

/// Identifies a registered observer so it can be unregistered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverHandle(u64);

/// Observers in registration order.
#[derive(Default)]
pub struct ObserverRegistry {
    next_id: u64,
    observers: Vec<(ObserverHandle, Box<dyn ResolutionObserver>)>,
}

impl ObserverRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `observer` after every existing one.
    pub fn register(&mut self, observer: Box<dyn ResolutionObserver>) -> ObserverHandle {
        let handle = ObserverHandle(self.next_id);
        self.next_id += 1;
        self.observers.push((handle, observer));
        handle
    }

    /// Removes the observer behind `handle`. Returns `false` if it was not registered.
    pub fn unregister(&mut self, handle: ObserverHandle) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(h, _)| *h != handle);
        self.observers.len() != before
    }

    /// Number of registered observers.
    pub fn len(&self) -> usize {
        self.observers.len()
    }

    /// Returns `true` if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }

    pub(crate) fn notify_loaded(&mut self, name: &str, kind: ResourceKind) {
        for (_, observer) in &mut self.observers {
            observer.on_loaded(name, kind);
        }
    }

    pub(crate) fn notify_failed(&mut self, name: &str, kind: ResourceKind, reason: &LoadFailure) {
        for (_, observer) in &mut self.observers {
            observer.on_load_failed(name, kind, reason);
        }
    }

    pub(crate) fn notify_cleared(&mut self) {
        for (_, observer) in &mut self.observers {
            observer.on_cache_cleared();
        }
    }
}

impl std::fmt::Debug for ObserverRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObserverRegistry")
            .field("observers", &self.observers.len())
            .finish()
    }
}

/// A resolution notification as a value.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolutionEvent {
    /// See [`ResolutionObserver::on_loaded`].
    Loaded {
        /// The resolved name.
        name: String,
        /// The resolved kind.
        kind: ResourceKind,
    },
    /// See [`ResolutionObserver::on_load_failed`].
    LoadFailed {
        /// The requested name.
        name: String,
        /// The requested kind.
        kind: ResourceKind,
        /// Why resolution failed.
        reason: LoadFailure,
    },
    /// See [`ResolutionObserver::on_cache_cleared`].
    CacheCleared,
}

/// Forwards every notification into a channel, for consumers that poll.
#[derive(Debug, Clone)]
pub struct ChannelObserver {
    sender: flume::Sender<ResolutionEvent>,
}

impl ChannelObserver {
    /// Wraps an existing sender.
    pub fn new(sender: flume::Sender<ResolutionEvent>) -> Self {
        Self { sender }
    }

    /// Creates an observer and the receiver its events arrive on.
    pub fn channel() -> (Self, flume::Receiver<ResolutionEvent>) {
        let (sender, receiver) = flume::unbounded();
        (Self { sender }, receiver)
    }

    fn publish(&self, event: ResolutionEvent) {
        if let Err(e) = self.sender.send(event) {
            log::warn!("Dropping resolution event: {e}. Receiver likely disconnected.");
        }
    }
}

impl ResolutionObserver for ChannelObserver {
    fn on_loaded(&mut self, name: &str, kind: ResourceKind) {
        self.publish(ResolutionEvent::Loaded {
            name: name.to_string(),
            kind,
        });
    }

    fn on_load_failed(&mut self, name: &str, kind: ResourceKind, reason: &LoadFailure) {
        self.publish(ResolutionEvent::LoadFailed {
            name: name.to_string(),
            kind,
            reason: reason.clone(),
        });
    }

    fn on_cache_cleared(&mut self) {
        self.publish(ResolutionEvent::CacheCleared);
    }
}
