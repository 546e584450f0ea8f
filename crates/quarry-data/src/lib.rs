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

//! # Quarry Data
//!
//! The mutable state of the resolution pipeline: the multi-kind resource
//! cache, the weighted category index used for procedural selection, and the
//! designer catalog that feeds both.
//!
//! Everything here is owned by the single consuming context; none of these
//! types synchronize internally.

#![warn(missing_docs)]

pub mod cache;
pub mod catalog;
pub mod category_index;

pub use cache::{CacheConfig, CacheEntry, CacheStats, KindSettings, PutOutcome, TypedResourceCache};
pub use catalog::{KeywordRule, TileCatalog, TileRule};
pub use category_index::{CumulativeTable, WeightedCategoryIndex, WeightedEntry};
