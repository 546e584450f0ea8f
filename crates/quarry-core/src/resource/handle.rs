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

use super::{AsAny, Resource};
use std::{fmt, ops::Deref, sync::Arc};

/// A thread-safe, reference-counted handle to a resolved resource.
///
/// Cloning a handle is cheap, as it only increments the reference count and
/// does not duplicate the underlying resource. The cache, the category index
/// and every caller share the same allocation.
#[derive(Clone)]
pub struct ResourceHandle(Arc<dyn Resource>);

impl ResourceHandle {
    /// Creates a new `ResourceHandle` that takes ownership of the resource.
    pub fn new<R: Resource>(resource: R) -> Self {
        Self(Arc::new(resource))
    }

    /// Wraps an already shared resource.
    pub fn from_arc(resource: Arc<dyn Resource>) -> Self {
        Self(resource)
    }

    /// Returns the concrete resource if it is of type `T`.
    pub fn downcast_ref<T: Resource>(&self) -> Option<&T> {
        let resource: &dyn Resource = &*self.0;
        AsAny::as_any(resource).downcast_ref::<T>()
    }

    /// Returns `true` if both handles point to the same allocation.
    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        Arc::ptr_eq(&a.0, &b.0)
    }
}

impl Deref for ResourceHandle {
    type Target = dyn Resource;

    fn deref(&self) -> &Self::Target {
        &*self.0
    }
}

impl fmt::Debug for ResourceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ResourceHandle").field(&self.0).finish()
    }
}
