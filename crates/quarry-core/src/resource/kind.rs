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

use serde::{Deserialize, Serialize};
use std::fmt;

/// The shape of a resource, used as the outer partition of the cache.
///
/// Only [`ResourceKind::Tile`] resources take part in category indexing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    /// A placeable tile consumed by the placement pipeline.
    Tile,
    /// A prefab-like composite object.
    Prefab,
    /// A structured configuration asset.
    Config,
}

impl ResourceKind {
    /// Every kind, in a stable order.
    pub const ALL: [ResourceKind; 3] = [ResourceKind::Tile, ResourceKind::Prefab, ResourceKind::Config];

    /// Returns `true` if resources of this kind are categorized for weighted selection.
    pub fn is_tile(self) -> bool {
        matches!(self, ResourceKind::Tile)
    }

    /// A short, lowercase label for logs and error messages.
    pub fn as_str(self) -> &'static str {
        match self {
            ResourceKind::Tile => "tile",
            ResourceKind::Prefab => "prefab",
            ResourceKind::Config => "config",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Uniquely identifies one cached resource.
///
/// At most one live cache entry exists per key at any time.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    /// The partition the resource lives in.
    pub kind: ResourceKind,
    /// The symbolic name passed to the repository.
    pub name: String,
}

impl CacheKey {
    /// Creates a key from a kind and a name.
    pub fn new(kind: ResourceKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.name)
    }
}
