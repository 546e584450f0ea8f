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

//! Shared fixtures for the resolution integration tests.

#![allow(dead_code)]

use quarry_agents::{ResolutionObserver, ResolverConfig, ResourceResolver};
use quarry_core::error::LoadFailure;
use quarry_core::repository::ResourceRepository;
use quarry_core::resource::{Resource, ResourceHandle, ResourceKind};
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// A tile as the repository materializes it.
#[derive(Debug, Clone, PartialEq)]
pub struct TestTile {
    pub name: String,
}

impl Resource for TestTile {
    fn name(&self) -> &str {
        &self.name
    }
}

/// An in-memory repository that counts calls and can be told to fail.
#[derive(Default)]
pub struct MemoryRepository {
    known: Mutex<HashSet<(ResourceKind, String)>>,
    broken: Mutex<Vec<String>>,
    calls: AtomicUsize,
}

impl MemoryRepository {
    pub fn with(kind: ResourceKind, names: &[&str]) -> Arc<Self> {
        let repository = Self::default();
        {
            let mut known = repository.known.lock().unwrap();
            for name in names {
                known.insert((kind, name.to_string()));
            }
        }
        Arc::new(repository)
    }

    pub fn add(&self, kind: ResourceKind, name: &str) {
        self.known.lock().unwrap().insert((kind, name.to_string()));
    }

    pub fn break_name(&self, name: &str) {
        self.broken.lock().unwrap().push(name.to_string());
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ResourceRepository for MemoryRepository {
    fn resolve(&self, name: &str, kind: ResourceKind) -> anyhow::Result<Option<ResourceHandle>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.broken.lock().unwrap().iter().any(|b| b == name) {
            anyhow::bail!("storage unavailable for '{name}'");
        }
        let known = self.known.lock().unwrap();
        Ok(known.contains(&(kind, name.to_string())).then(|| {
            ResourceHandle::new(TestTile {
                name: name.to_string(),
            })
        }))
    }
}

/// Records every notification as a readable line.
#[derive(Clone, Default)]
pub struct EventLog(pub Arc<Mutex<Vec<String>>>);

impl EventLog {
    pub fn lines(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }
}

impl ResolutionObserver for EventLog {
    fn on_loaded(&mut self, name: &str, kind: ResourceKind) {
        self.0.lock().unwrap().push(format!("loaded {kind} {name}"));
    }

    fn on_load_failed(&mut self, name: &str, kind: ResourceKind, reason: &LoadFailure) {
        let reason = match reason {
            LoadFailure::NotFound => "not found",
            LoadFailure::Repository(_) => "error",
        };
        self.0
            .lock()
            .unwrap()
            .push(format!("failed {kind} {name} ({reason})"));
    }

    fn on_cache_cleared(&mut self) {
        self.0.lock().unwrap().push("cleared".to_string());
    }
}

pub fn resolver(repository: Arc<MemoryRepository>, config: ResolverConfig) -> ResourceResolver {
    ResourceResolver::new(repository, config).expect("Resolver should start")
}

/// Drains completions until no asynchronous request is pending.
pub fn pump_until_idle(resolver: &mut ResourceResolver) {
    let deadline = Instant::now() + Duration::from_secs(5);
    while resolver.pending_requests() > 0 {
        assert!(Instant::now() < deadline, "Completions never arrived");
        resolver.process_completions_timeout(Duration::from_millis(10));
    }
    resolver.process_completions();
}
