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

//! Per-category weighted selection of interchangeable tiles.
//!
//! Each [`Category`] keeps its entries in insertion order alongside a
//! [`CumulativeTable`] of running weight sums. A weighted draw picks
//! `r` in `[0, total)` and returns the first entry whose cumulative sum is
//! `>= r`, so a draw landing exactly on a boundary resolves to the
//! lower-indexed entry.

use quarry_core::resource::{Category, ResourceHandle, TileTraits};
use rand::Rng;
use std::collections::BTreeMap;

/// A categorized resource and its designer-assigned attributes.
#[derive(Debug, Clone)]
pub struct WeightedEntry {
    /// The categorized resource.
    pub resource: ResourceHandle,
    /// Relative selection weight. Expected to be non-negative.
    pub weight: f32,
    /// Whether actors can stand on the tile.
    pub walkable: bool,
    /// Whether the tile blocks movement.
    pub has_collision: bool,
}

impl WeightedEntry {
    /// Creates a non-walkable, non-colliding entry with `weight`.
    pub fn new(resource: ResourceHandle, weight: f32) -> Self {
        Self {
            resource,
            weight,
            walkable: false,
            has_collision: false,
        }
    }

    /// Creates an entry from resolved tile attributes.
    pub fn with_traits(resource: ResourceHandle, traits: TileTraits) -> Self {
        Self {
            resource,
            weight: traits.weight,
            walkable: traits.walkable,
            has_collision: traits.has_collision,
        }
    }

    /// Sets the walkable flag.
    pub fn walkable(mut self, walkable: bool) -> Self {
        self.walkable = walkable;
        self
    }

    /// Sets the collision flag.
    pub fn with_collision(mut self, has_collision: bool) -> Self {
        self.has_collision = has_collision;
        self
    }
}

/// Prefix sums of entry weights, index-aligned with the entry list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CumulativeTable {
    sums: Vec<f32>,
}

impl CumulativeTable {
    /// Appends `weight`, extending the table by `previous_total + weight`.
    pub fn push(&mut self, weight: f32) {
        let total = self.total();
        self.sums.push(total + weight);
    }

    /// The sum of every weight; `0.0` when empty.
    pub fn total(&self) -> f32 {
        self.sums.last().copied().unwrap_or(0.0)
    }

    /// The running sums.
    pub fn as_slice(&self) -> &[f32] {
        &self.sums
    }

    /// Number of entries covered.
    pub fn len(&self) -> usize {
        self.sums.len()
    }

    /// Returns `true` if the table covers no entries.
    pub fn is_empty(&self) -> bool {
        self.sums.is_empty()
    }

    /// The index of the first sum `>= r`.
    ///
    /// A draw past the last sum (accumulated rounding) maps to the last index.
    pub fn locate(&self, r: f32) -> Option<usize> {
        if self.sums.is_empty() {
            return None;
        }
        let index = self.sums.partition_point(|&sum| sum < r);
        Some(index.min(self.sums.len() - 1))
    }
}

#[derive(Debug, Default)]
struct Bucket {
    entries: Vec<WeightedEntry>,
    table: CumulativeTable,
}

impl Bucket {
    fn select(&self, r: f32) -> Option<&WeightedEntry> {
        let mut index = self.table.locate(r)?;

        // Zero-weight entries share their sum with a neighbour; step to the
        // positive-weight entry that owns the interval.
        while self.entries[index].weight <= 0.0 && index + 1 < self.entries.len() {
            index += 1;
        }
        while self.entries[index].weight <= 0.0 && index > 0 {
            index -= 1;
        }
        self.entries.get(index)
    }

    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&WeightedEntry> {
        let total = self.table.total();
        if total > 0.0 {
            self.select(rng.gen_range(0.0..total))
        } else if self.entries.is_empty() {
            None
        } else {
            self.entries.get(rng.gen_range(0..self.entries.len()))
        }
    }
}

/// Indexes categorized resources and draws from them by weight.
#[derive(Debug, Default)]
pub struct WeightedCategoryIndex {
    buckets: BTreeMap<Category, Bucket>,
}

impl WeightedCategoryIndex {
    /// Creates an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `entry` to `category`.
    ///
    /// Insertion is not idempotent: categorizing the same resource twice
    /// creates two independently selectable entries.
    pub fn categorize(&mut self, category: Category, entry: WeightedEntry) {
        log::trace!(
            "Categorized '{}' as {category} with weight {}.",
            entry.resource.name(),
            entry.weight
        );
        let bucket = self.buckets.entry(category).or_default();
        bucket.table.push(entry.weight);
        bucket.entries.push(entry);
    }

    /// Draws an entry of `category` with probability proportional to weight.
    ///
    /// Falls back to a uniform draw when every weight is zero. Returns `None`
    /// only when the category has no entries.
    pub fn sample_entry<R: Rng + ?Sized>(
        &self,
        category: &Category,
        rng: &mut R,
    ) -> Option<&WeightedEntry> {
        self.buckets.get(category)?.sample(rng)
    }

    /// Draws a resource of `category`; see [`Self::sample_entry`].
    pub fn sample<R: Rng + ?Sized>(
        &self,
        category: &Category,
        rng: &mut R,
    ) -> Option<ResourceHandle> {
        self.sample_entry(category, rng)
            .map(|entry| entry.resource.clone())
    }

    /// Draws among the entries of `category` that satisfy `filter`, by weight,
    /// falling back to a uniform draw over them when their weights sum to zero.
    pub fn sample_filtered<R, F>(
        &self,
        category: &Category,
        rng: &mut R,
        filter: F,
    ) -> Option<ResourceHandle>
    where
        R: Rng + ?Sized,
        F: Fn(&WeightedEntry) -> bool,
    {
        let bucket = self.buckets.get(category)?;
        let candidates: Vec<&WeightedEntry> = bucket.entries.iter().filter(|e| filter(e)).collect();
        let last = candidates.last()?;

        let total: f32 = candidates.iter().map(|e| e.weight.max(0.0)).sum();
        if total <= 0.0 {
            let pick = candidates[rng.gen_range(0..candidates.len())];
            return Some(pick.resource.clone());
        }

        let r = rng.gen_range(0.0..total);
        let mut running = 0.0;
        let mut chosen = None;
        for entry in candidates.iter().filter(|e| e.weight > 0.0) {
            running += entry.weight;
            chosen = Some(*entry);
            if r <= running {
                break;
            }
        }
        Some(chosen.unwrap_or(*last).resource.clone())
    }

    /// Resolves a pre-drawn value `r` against the cumulative table of
    /// `category`, without touching an RNG.
    pub fn select_weighted(&self, category: &Category, r: f32) -> Option<ResourceHandle> {
        let bucket = self.buckets.get(category)?;
        if bucket.table.total() <= 0.0 {
            return None;
        }
        bucket.select(r).map(|entry| entry.resource.clone())
    }

    /// The resources of `category`, in insertion order.
    pub fn entries_of(&self, category: &Category) -> impl Iterator<Item = &ResourceHandle> + '_ {
        self.weighted_entries_of(category)
            .iter()
            .map(|entry| &entry.resource)
    }

    /// The weighted entries of `category`, in insertion order.
    pub fn weighted_entries_of(&self, category: &Category) -> &[WeightedEntry] {
        self.buckets
            .get(category)
            .map(|bucket| bucket.entries.as_slice())
            .unwrap_or(&[])
    }

    /// The cumulative table of `category`, if it has entries.
    pub fn cumulative_table(&self, category: &Category) -> Option<&CumulativeTable> {
        self.buckets.get(category).map(|bucket| &bucket.table)
    }

    /// The summed weight of `category`; `0.0` when empty or unknown.
    pub fn total_weight(&self, category: &Category) -> f32 {
        self.buckets
            .get(category)
            .map_or(0.0, |bucket| bucket.table.total())
    }

    /// Every category with at least one entry, in a stable order.
    pub fn categories(&self) -> impl Iterator<Item = &Category> + '_ {
        self.buckets.keys()
    }

    /// Number of entries in `category`.
    pub fn len_of(&self, category: &Category) -> usize {
        self.weighted_entries_of(category).len()
    }

    /// Returns `true` if no category has entries.
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Drops every category.
    pub fn clear(&mut self) {
        self.buckets.clear();
    }
}
