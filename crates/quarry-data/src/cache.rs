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

//! A bounded, multi-kind memoization cache for resolved resources.
//!
//! Entries are partitioned by [`ResourceKind`]. Each partition has its own
//! capacity and evicts in insertion order: when a new name would exceed the
//! bound, the entry inserted earliest for that kind is dropped. Reads do not
//! refresh an entry's position, so this approximates LRU without tracking
//! access recency.

use ahash::AHashMap;
use quarry_core::resource::{ResourceHandle, ResourceKind};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Capacity and size heuristic for one resource kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KindSettings {
    /// Maximum number of live entries. `0` disables caching for the kind.
    pub capacity: usize,
    /// Fixed per-entry size estimate in bytes.
    pub size_estimate: u64,
}

/// Per-kind cache bounds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Settings for [`ResourceKind::Tile`].
    pub tile: KindSettings,
    /// Settings for [`ResourceKind::Prefab`].
    pub prefab: KindSettings,
    /// Settings for [`ResourceKind::Config`].
    pub config: KindSettings,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            tile: KindSettings {
                capacity: 512,
                size_estimate: 1024,
            },
            prefab: KindSettings {
                capacity: 128,
                size_estimate: 16 * 1024,
            },
            config: KindSettings {
                capacity: 64,
                size_estimate: 4 * 1024,
            },
        }
    }
}

impl CacheConfig {
    /// Returns the settings for `kind`.
    pub fn settings(&self, kind: ResourceKind) -> KindSettings {
        match kind {
            ResourceKind::Tile => self.tile,
            ResourceKind::Prefab => self.prefab,
            ResourceKind::Config => self.config,
        }
    }

    /// Overrides the capacity of `kind`.
    pub fn with_capacity(mut self, kind: ResourceKind, capacity: usize) -> Self {
        self.settings_mut(kind).capacity = capacity;
        self
    }

    /// Overrides the size estimate of `kind`.
    pub fn with_size_estimate(mut self, kind: ResourceKind, bytes: u64) -> Self {
        self.settings_mut(kind).size_estimate = bytes;
        self
    }

    fn settings_mut(&mut self, kind: ResourceKind) -> &mut KindSettings {
        match kind {
            ResourceKind::Tile => &mut self.tile,
            ResourceKind::Prefab => &mut self.prefab,
            ResourceKind::Config => &mut self.config,
        }
    }
}

/// One cached resource.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    handle: ResourceHandle,
    sequence: u64,
    size_estimate: u64,
}

impl CacheEntry {
    /// The cached resource.
    pub fn handle(&self) -> &ResourceHandle {
        &self.handle
    }

    /// Monotonic insertion number; lower means inserted earlier.
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// The estimated size accounted for this entry.
    pub fn size_estimate(&self) -> u64 {
        self.size_estimate
    }
}

/// What a [`TypedResourceCache::put`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PutOutcome {
    /// A new entry was created, possibly evicting the oldest one of its kind.
    Inserted {
        /// The name evicted to make room, if any.
        evicted: Option<String>,
    },
    /// The key was already cached; its resource was replaced in place.
    Replaced,
    /// The kind has a capacity of zero; nothing was stored.
    Disabled,
}

/// A point-in-time view of cache health, computed on demand.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CacheStats {
    /// Live entries across every kind.
    pub total_assets: usize,
    /// Live entries per kind, in [`ResourceKind::ALL`] order.
    pub per_kind: Vec<(ResourceKind, usize)>,
    /// Requests served.
    pub load_count: u64,
    /// Requests served from the cache.
    pub hit_count: u64,
    /// `load_count - hit_count`.
    pub miss_count: u64,
    /// `hit_count / load_count`, or `0.0` before the first request.
    pub hit_rate: f64,
    /// Sum of the size estimates of live entries, in bytes.
    pub memory_usage: u64,
    /// Entries dropped to respect a capacity bound.
    pub evictions: u64,
}

#[derive(Debug, Default)]
struct Partition {
    entries: AHashMap<String, CacheEntry>,
    /// Names in insertion order. Only eviction and `clear` remove entries, so
    /// the front is always the oldest live entry.
    order: VecDeque<String>,
}

/// Maps `(kind, name)` to a resolved resource, bounded per kind.
#[derive(Debug)]
pub struct TypedResourceCache {
    config: CacheConfig,
    partitions: AHashMap<ResourceKind, Partition>,
    next_sequence: u64,
    memory_usage: u64,
    load_count: u64,
    hit_count: u64,
    evictions: u64,
}

impl Default for TypedResourceCache {
    fn default() -> Self {
        Self::new(CacheConfig::default())
    }
}

impl TypedResourceCache {
    /// Creates an empty cache with the given bounds.
    pub fn new(config: CacheConfig) -> Self {
        Self {
            config,
            partitions: AHashMap::new(),
            next_sequence: 0,
            memory_usage: 0,
            load_count: 0,
            hit_count: 0,
            evictions: 0,
        }
    }

    /// The bounds this cache was built with.
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Returns the cached resource for `(kind, name)`, if any. No side effects.
    pub fn get(&self, kind: ResourceKind, name: &str) -> Option<ResourceHandle> {
        self.entry(kind, name).map(|entry| entry.handle.clone())
    }

    /// Returns the full entry for `(kind, name)`, if any.
    pub fn entry(&self, kind: ResourceKind, name: &str) -> Option<&CacheEntry> {
        self.partitions.get(&kind)?.entries.get(name)
    }

    /// Returns `true` if `(kind, name)` is cached. An empty name is never cached.
    pub fn contains(&self, kind: ResourceKind, name: &str) -> bool {
        if name.is_empty() {
            return false;
        }
        self.partitions
            .get(&kind)
            .is_some_and(|partition| partition.entries.contains_key(name))
    }

    /// Stores `handle` under `(kind, name)`.
    ///
    /// If `name` is new and the kind is at capacity, the earliest inserted
    /// entry of that kind is evicted first and its size estimate is released.
    /// Storing an already cached name replaces its resource without changing
    /// its insertion position.
    pub fn put(&mut self, kind: ResourceKind, name: &str, handle: ResourceHandle) -> PutOutcome {
        let settings = self.config.settings(kind);
        if settings.capacity == 0 {
            log::debug!("Caching disabled for {kind}; '{name}' not stored.");
            return PutOutcome::Disabled;
        }

        let partition = self.partitions.entry(kind).or_default();

        if let Some(existing) = partition.entries.get_mut(name) {
            existing.handle = handle;
            return PutOutcome::Replaced;
        }

        let mut evicted = None;
        while partition.entries.len() >= settings.capacity {
            let Some(oldest) = partition.order.pop_front() else {
                break;
            };
            if let Some(entry) = partition.entries.remove(&oldest) {
                self.memory_usage = self.memory_usage.saturating_sub(entry.size_estimate);
                self.evictions += 1;
                log::info!("Evicted {kind} '{oldest}' to stay within capacity {}.", settings.capacity);
                evicted = Some(oldest);
            }
        }

        let sequence = self.next_sequence;
        self.next_sequence += 1;

        partition.order.push_back(name.to_string());
        partition.entries.insert(
            name.to_string(),
            CacheEntry {
                handle,
                sequence,
                size_estimate: settings.size_estimate,
            },
        );
        self.memory_usage += settings.size_estimate;

        PutOutcome::Inserted { evicted }
    }

    /// Counts a request that was served from the cache.
    pub fn record_hit(&mut self) {
        self.load_count += 1;
        self.hit_count += 1;
    }

    /// Counts a request that had to go to the repository.
    pub fn record_miss(&mut self) {
        self.load_count += 1;
    }

    /// Names cached for `kind`, oldest first.
    pub fn names(&self, kind: ResourceKind) -> impl Iterator<Item = &str> + '_ {
        self.partitions
            .get(&kind)
            .into_iter()
            .flat_map(|partition| partition.order.iter().map(String::as_str))
    }

    /// Live entries of `kind`.
    pub fn len_of(&self, kind: ResourceKind) -> usize {
        self.partitions
            .get(&kind)
            .map_or(0, |partition| partition.entries.len())
    }

    /// Live entries across every kind.
    pub fn len(&self) -> usize {
        self.partitions.values().map(|p| p.entries.len()).sum()
    }

    /// Returns `true` if nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops every entry and resets every counter to zero.
    ///
    /// Returns the number of entries dropped.
    pub fn clear(&mut self) -> usize {
        let dropped = self.len();
        self.partitions.clear();
        self.memory_usage = 0;
        self.load_count = 0;
        self.hit_count = 0;
        self.evictions = 0;
        dropped
    }

    /// Computes the current statistics.
    pub fn stats(&self) -> CacheStats {
        let hit_rate = if self.load_count == 0 {
            0.0
        } else {
            self.hit_count as f64 / self.load_count as f64
        };

        CacheStats {
            total_assets: self.len(),
            per_kind: ResourceKind::ALL
                .iter()
                .map(|&kind| (kind, self.len_of(kind)))
                .collect(),
            load_count: self.load_count,
            hit_count: self.hit_count,
            miss_count: self.load_count - self.hit_count,
            hit_rate,
            memory_usage: self.memory_usage,
            evictions: self.evictions,
        }
    }
}
