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

//! The interfaces this crate consumes but does not implement.
//!
//! The asset repository materializes resources from symbolic names, and the
//! classifier assigns tile resources to a [`Category`]. Both are shared with
//! background workers, hence the `Send + Sync` bounds.

use crate::resource::{Category, ResourceHandle, ResourceKind, TileTraits};

/// The external asset repository.
///
/// Implementations are expected to be reentrant: the resolver calls them from
/// the consuming context and from several workers at once.
pub trait ResourceRepository: Send + Sync {
    /// Materializes the resource `name` of shape `kind`.
    ///
    /// Returns `Ok(None)` when no such resource exists. An `Err` is reserved
    /// for unexpected failures.
    fn resolve(&self, name: &str, kind: ResourceKind) -> anyhow::Result<Option<ResourceHandle>>;
}

impl<F> ResourceRepository for F
where
    F: Fn(&str, ResourceKind) -> anyhow::Result<Option<ResourceHandle>> + Send + Sync,
{
    fn resolve(&self, name: &str, kind: ResourceKind) -> anyhow::Result<Option<ResourceHandle>> {
        self(name, kind)
    }
}

/// Assigns a resolved tile to exactly one [`Category`].
pub trait Classifier: Send + Sync {
    /// Classifies `resource`, typically from its name.
    fn classify(&self, resource: &ResourceHandle) -> Category;

    /// The weight and movement attributes of `resource` within `category`.
    fn traits(&self, _resource: &ResourceHandle, category: &Category) -> TileTraits {
        TileTraits::for_category(category)
    }
}
