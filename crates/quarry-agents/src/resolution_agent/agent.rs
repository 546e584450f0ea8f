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

//! The ResourceResolver is the public entry point of the resolution pipeline.
//!
//! A request flows `cache check -> repository -> store -> categorize -> notify`.
//! The synchronous path runs all of it on the caller's context. The
//! asynchronous path only runs the repository call on a worker; the store,
//! the categorization, the notifications and the callback run on the consuming
//! context when [`ResourceResolver::process_completions`] drains the
//! dispatcher, so cache state has a single writer.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Duration;

use ahash::{AHashMap, AHashSet};
use anyhow::anyhow;
use quarry_core::dispatch::{CompletionDispatcher, CompletionSender};
use quarry_core::error::{LoadFailure, ResolveError, ResolveResult};
use quarry_core::repository::{Classifier, ResourceRepository};
use quarry_core::resource::{CacheKey, Category, Resource, ResourceHandle, ResourceKind};
use quarry_data::cache::{CacheStats, TypedResourceCache};
use quarry_data::category_index::{WeightedCategoryIndex, WeightedEntry};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};

use super::batch::{BatchReport, ValidationResult};
use super::classifier::CatalogClassifier;
use super::config::ResolverConfig;
use super::observer::{ObserverHandle, ObserverRegistry, ResolutionObserver};
use super::workers::{Job, WorkerPool};

/// Receives the outcome of an asynchronous resolution, exactly once.
pub type ResolveCallback = Box<dyn FnOnce(Option<ResourceHandle>) + Send + 'static>;

struct InFlight {
    callbacks: Vec<ResolveCallback>,
    /// The clear generation the result may be cached under.
    generation: u64,
}

/// The mutable state owned by the consuming context.
///
/// Completions sent through [`ResourceResolver::completion_sender`] receive
/// it as their argument.
pub struct ResolverState {
    cache: TypedResourceCache,
    index: WeightedCategoryIndex,
    observers: ObserverRegistry,
    classifier: Arc<dyn Classifier>,
    in_flight: AHashMap<CacheKey, InFlight>,
    /// Tiles already in the category index. Membership is appended once per
    /// key, however often the key is evicted and resolved again.
    categorized: AHashSet<CacheKey>,
    generation: u64,
}

impl ResolverState {
    /// The resource cache.
    pub fn cache(&self) -> &TypedResourceCache {
        &self.cache
    }

    /// The category index.
    pub fn index(&self) -> &WeightedCategoryIndex {
        &self.index
    }

    /// Current cache statistics.
    pub fn stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Asynchronous requests still waiting for the repository.
    pub fn pending_requests(&self) -> usize {
        self.in_flight.len()
    }

    /// Returns the canonical handle for `key`, storing `handle` if nothing is
    /// cached yet and categorizing it the first time the key resolves.
    ///
    /// ## Arguments
    /// * `key` - The resolved key.
    /// * `handle` - The resource the repository produced.
    ///
    /// ## Returns
    /// The cached handle when one exists, `handle` otherwise.
    fn store(&mut self, key: &CacheKey, handle: ResourceHandle) -> ResourceHandle {
        if let Some(existing) = self.cache.get(key.kind, &key.name) {
            log::trace!("{key} was cached meanwhile; keeping the existing entry.");
            return existing;
        }

        self.cache.put(key.kind, &key.name, handle.clone());
        if key.kind.is_tile() && self.categorized.insert(key.clone()) {
            self.categorize(&handle);
        }

        log::debug!("Loaded {key}.");
        self.observers.notify_loaded(&key.name, key.kind);
        handle
    }

    fn categorize(&mut self, handle: &ResourceHandle) {
        let category = self.classifier.classify(handle);
        let traits = self.classifier.traits(handle, &category);
        self.index
            .categorize(category, WeightedEntry::with_traits(handle.clone(), traits));
    }

    fn fail(&mut self, key: &CacheKey, reason: LoadFailure) {
        match &reason {
            LoadFailure::NotFound => log::warn!("Resource {key} not found."),
            LoadFailure::Repository(message) => log::error!("Failed to load {key}: {message}"),
        }
        self.observers.notify_failed(&key.name, key.kind, &reason);
    }

    fn finish_async(&mut self, key: CacheKey, outcome: anyhow::Result<Option<ResourceHandle>>) {
        let Some(flight) = self.in_flight.remove(&key) else {
            log::warn!("Completion for {key} had no pending request.");
            return;
        };

        let resource = match outcome {
            Ok(Some(handle)) if flight.generation == self.generation => {
                Some(self.store(&key, handle))
            }
            Ok(Some(handle)) => {
                log::debug!("Cache was cleared while {key} was loading; delivering it uncached.");
                self.observers.notify_loaded(&key.name, key.kind);
                Some(handle)
            }
            Ok(None) => {
                self.fail(&key, LoadFailure::NotFound);
                None
            }
            Err(error) => {
                self.fail(&key, LoadFailure::Repository(format!("{error:#}")));
                None
            }
        };

        for callback in flight.callbacks {
            let delivered = resource.clone();
            if panic::catch_unwind(AssertUnwindSafe(move || callback(delivered))).is_err() {
                log::error!("A resolution callback for {key} panicked.");
            }
        }
    }

    fn clear(&mut self) {
        let dropped = self.cache.clear();
        self.index.clear();
        self.categorized.clear();
        self.generation += 1;
        log::info!("Resource cache cleared ({dropped} entries dropped).");
        self.observers.notify_cleared();
    }
}

/// Resolves symbolic names to resources, memoizing and categorizing them.
///
/// Owned by the consuming context. Background workers only ever call the
/// repository; everything else happens on the thread that owns the resolver.
pub struct ResourceResolver {
    // Declared first so workers are joined before the dispatcher goes away.
    workers: WorkerPool,
    dispatcher: CompletionDispatcher<ResolverState>,
    state: ResolverState,
    repository: Arc<dyn ResourceRepository>,
    rng: StdRng,
}

impl ResourceResolver {
    /// Creates a resolver over `repository`, classifying tiles with a
    /// [`CatalogClassifier`] built from the configured catalog.
    ///
    /// ## Arguments
    /// * `repository` - The asset repository misses are delegated to.
    /// * `config` - Cache bounds, worker count, RNG seed and tile catalog.
    ///
    /// ## Returns
    /// The resolver, or [`ResolveError::Config`] if the workers cannot start.
    pub fn new(repository: Arc<dyn ResourceRepository>, config: ResolverConfig) -> ResolveResult<Self> {
        let workers = WorkerPool::new(config.worker_threads)
            .map_err(|e| ResolveError::Config(format!("cannot start resolution workers: {e}")))?;

        let rng = match config.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let state = ResolverState {
            cache: TypedResourceCache::new(config.cache),
            index: WeightedCategoryIndex::new(),
            observers: ObserverRegistry::new(),
            classifier: Arc::new(CatalogClassifier::new(&config.catalog)),
            in_flight: AHashMap::new(),
            categorized: AHashSet::new(),
            generation: 0,
        };

        log::info!(
            "ResourceResolver initialized with {} worker(s).",
            workers.threads()
        );

        Ok(Self {
            workers,
            dispatcher: CompletionDispatcher::new(),
            state,
            repository,
            rng,
        })
    }

    /// Replaces the tile classifier.
    pub fn with_classifier(mut self, classifier: Arc<dyn Classifier>) -> Self {
        self.state.classifier = classifier;
        self
    }

    /// Read access to the consuming-context state.
    pub fn state(&self) -> &ResolverState {
        &self.state
    }

    /// Resolves `name` as `kind`, from the cache or the repository.
    ///
    /// ## Arguments
    /// * `name` - The symbolic name to resolve. Must not be empty.
    /// * `kind` - The cache partition and shape requested.
    ///
    /// ## Returns
    /// The resource, or `Ok(None)` when the repository has no such resource.
    /// A repository error is reported to observers and then returned.
    ///
    /// # Errors
    /// [`ResolveError::InvalidArgument`] for an empty name,
    /// [`ResolveError::Repository`] when the repository fails.
    pub fn resolve(&mut self, name: &str, kind: ResourceKind) -> ResolveResult<Option<ResourceHandle>> {
        validate_name(name)?;

        if let Some(handle) = self.state.cache.get(kind, name) {
            self.state.cache.record_hit();
            log::trace!("Cache hit for {kind} '{name}'.");
            return Ok(Some(handle));
        }
        self.state.cache.record_miss();

        let key = CacheKey::new(kind, name);
        match self.repository.resolve(name, kind) {
            Ok(Some(handle)) => Ok(Some(self.state.store(&key, handle))),
            Ok(None) => {
                self.state.fail(&key, LoadFailure::NotFound);
                Ok(None)
            }
            Err(source) => {
                self.state
                    .fail(&key, LoadFailure::Repository(format!("{source:#}")));
                Err(ResolveError::Repository {
                    name: key.name,
                    kind,
                    source,
                })
            }
        }
    }

    /// Resolves `name` and returns a copy of it as its concrete type.
    ///
    /// # Errors
    /// Everything [`Self::resolve`] returns, plus
    /// [`ResolveError::InvalidArgument`] when the resource is not a `T`.
    pub fn resolve_as<T: Resource + Clone>(
        &mut self,
        name: &str,
        kind: ResourceKind,
    ) -> ResolveResult<Option<T>> {
        let Some(handle) = self.resolve(name, kind)? else {
            return Ok(None);
        };

        handle.downcast_ref::<T>().cloned().map(Some).ok_or_else(|| {
            ResolveError::InvalidArgument(format!(
                "{kind} '{name}' is not a {}",
                std::any::type_name::<T>()
            ))
        })
    }

    /// Resolves `name` on a background worker and calls `callback` with the
    /// result on the consuming context, during a later
    /// [`Self::process_completions`].
    ///
    /// Concurrent requests for the same missing key share one repository
    /// call. Repository errors never reach the callback as errors: it receives
    /// `None` and the failure is logged and reported to observers.
    ///
    /// ## Arguments
    /// * `name` - The symbolic name to resolve. Must not be empty.
    /// * `kind` - The cache partition and shape requested.
    /// * `callback` - Called exactly once with the resource or `None`.
    ///
    /// # Errors
    /// [`ResolveError::InvalidArgument`] for an empty name, immediately.
    pub fn resolve_async<F>(&mut self, name: &str, kind: ResourceKind, callback: F) -> ResolveResult<()>
    where
        F: FnOnce(Option<ResourceHandle>) + Send + 'static,
    {
        validate_name(name)?;
        let key = CacheKey::new(kind, name);

        if let Some(handle) = self.state.cache.get(kind, name) {
            self.state.cache.record_hit();
            log::trace!("Cache hit for {key}; callback queued.");
            self.dispatcher.enqueue(move |_| callback(Some(handle)));
            return Ok(());
        }
        self.state.cache.record_miss();

        let generation = self.state.generation;
        if let Some(flight) = self.state.in_flight.get_mut(&key) {
            flight.callbacks.push(Box::new(callback));
            flight.generation = generation;
            log::debug!("Joined the pending request for {key}.");
            return Ok(());
        }

        self.state.in_flight.insert(
            key.clone(),
            InFlight {
                callbacks: vec![Box::new(callback)],
                generation,
            },
        );

        let repository = Arc::clone(&self.repository);
        let sender = self.dispatcher.sender();
        let job_key = key.clone();
        let job: Job = Box::new(move || {
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                repository.resolve(&job_key.name, job_key.kind)
            }))
            .unwrap_or_else(|_| Err(anyhow!("repository panicked")));

            sender.enqueue(move |state: &mut ResolverState| state.finish_async(job_key, outcome));
        });

        log::debug!("Dispatched {key} to the worker pool.");
        if self.workers.execute(job).is_err() {
            self.dispatcher.enqueue(move |state: &mut ResolverState| {
                state.finish_async(key, Err(anyhow!("resolution workers are shut down")))
            });
        }
        Ok(())
    }

    /// Runs every queued completion on this context. Call once per tick.
    ///
    /// Returns the number of completions executed.
    pub fn process_completions(&mut self) -> usize {
        self.dispatcher.drain(&mut self.state)
    }

    /// Like [`Self::process_completions`], but waits up to `timeout` for the
    /// first completion to arrive.
    pub fn process_completions_timeout(&mut self, timeout: Duration) -> usize {
        self.dispatcher.drain_timeout(&mut self.state, timeout)
    }

    /// A producer handle other threads can use to run work on this context.
    pub fn completion_sender(&self) -> CompletionSender<ResolverState> {
        self.dispatcher.sender()
    }

    /// Asynchronous requests still waiting for the repository.
    pub fn pending_requests(&self) -> usize {
        self.state.pending_requests()
    }

    /// Draws a resource of `category` by weight.
    ///
    /// ## Arguments
    /// * `category` - The category to draw from.
    /// * `rng` - The RNG to draw with. The resolver's own RNG is used when
    ///   `None`; pass a seeded RNG for reproducible draws.
    ///
    /// ## Returns
    /// `None` only when the category has no entries.
    pub fn sample_random_of_category(
        &mut self,
        category: &Category,
        rng: Option<&mut dyn RngCore>,
    ) -> Option<ResourceHandle> {
        match rng {
            Some(rng) => self.state.index.sample(category, rng),
            None => self.state.index.sample(category, &mut self.rng),
        }
    }

    /// Draws a walkable resource of `category` by weight.
    pub fn sample_walkable(
        &mut self,
        category: &Category,
        rng: Option<&mut dyn RngCore>,
    ) -> Option<ResourceHandle> {
        let walkable = |entry: &WeightedEntry| entry.walkable;
        match rng {
            Some(rng) => self.state.index.sample_filtered(category, rng, walkable),
            None => self
                .state
                .index
                .sample_filtered(category, &mut self.rng, walkable),
        }
    }

    /// The resources indexed under `category`, in insertion order.
    pub fn entries_of(&self, category: &Category) -> Vec<ResourceHandle> {
        self.state.index.entries_of(category).cloned().collect()
    }

    /// Resolves every name, continuing past failures.
    ///
    /// ## Returns
    /// A report grouping the names into resolved, missing and failed.
    pub fn preload<I, S>(&mut self, names: I, kind: ResourceKind) -> BatchReport
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let report = self.resolve_batch(names, kind);
        log::info!(
            "Preloaded {}/{} {kind} resource(s).",
            report.resolved.len(),
            report.requested()
        );
        report
    }

    /// Resolves every name and reports every one that did not resolve in a
    /// single [`ResolveError::MissingRequired`].
    pub fn validate_required<I, S>(&mut self, names: I, kind: ResourceKind) -> ValidationResult
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.resolve_batch(names, kind).into_validation()
    }

    fn resolve_batch<I, S>(&mut self, names: I, kind: ResourceKind) -> BatchReport
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut report = BatchReport::new(kind);
        for name in names {
            let name = name.as_ref();
            match self.resolve(name, kind) {
                Ok(Some(_)) => report.resolved.push(name.to_string()),
                Ok(None) => report.missing.push(name.to_string()),
                Err(e) => {
                    log::warn!("Skipping {kind} '{name}': {e}");
                    report.failed.push((name.to_string(), e.to_string()));
                }
            }
        }
        report
    }

    /// Returns `true` if `(kind, name)` is cached.
    pub fn contains(&self, kind: ResourceKind, name: &str) -> bool {
        self.state.cache.contains(kind, name)
    }

    /// Current cache statistics.
    pub fn stats(&self) -> CacheStats {
        self.state.stats()
    }

    /// Drops every cached resource and category entry, resets the counters,
    /// and notifies observers.
    ///
    /// Pending asynchronous requests still complete and call back, but their
    /// results are not cached.
    pub fn clear(&mut self) {
        self.state.clear();
    }

    /// Registers an observer; observers are notified in registration order.
    pub fn register_observer(&mut self, observer: impl ResolutionObserver + 'static) -> ObserverHandle {
        self.state.observers.register(Box::new(observer))
    }

    /// Unregisters an observer. Returns `false` if it was not registered.
    pub fn unregister_observer(&mut self, handle: ObserverHandle) -> bool {
        self.state.observers.unregister(handle)
    }
}

fn validate_name(name: &str) -> ResolveResult<()> {
    if name.is_empty() {
        return Err(ResolveError::InvalidArgument(
            "resource name must not be empty".to_string(),
        ));
    }
    Ok(())
}
