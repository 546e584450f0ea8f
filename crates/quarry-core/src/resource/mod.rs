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

//! Provides the primitive types every resolution request is expressed in.
//!
//! The key components are:
//! - The [`Resource`] trait: a marker for anything the asset repository can
//!   materialize (tiles, prefab-like objects, structured configuration).
//! - [`ResourceHandle`]: the shared, reference-counted form a resource takes
//!   once it has been resolved.
//! - [`ResourceKind`] and [`CacheKey`]: the partitioning tag and the unique key
//!   of a cached resource.
//! - [`Category`]: the semantic grouping used for weighted selection.

mod category;
mod handle;
mod kind;

pub use category::*;
pub use handle::*;
pub use kind::*;

use std::any::Any;
use std::fmt;

/// Gives access to a value as [`Any`] so trait objects can be downcast.
///
/// Implemented for every `'static` sized type; there is no reason to
/// implement it by hand.
pub trait AsAny {
    /// Returns `self` as a `&dyn Any`.
    fn as_any(&self) -> &dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// A marker trait for types that can be materialized by the asset repository.
///
/// The supertraits enforce the guarantees the resolver relies on:
/// - `Send` + `Sync`: resources are produced on background workers and handed
///   back to the consuming context.
/// - [`AsAny`] + `'static`: a resolved handle can be downcast to its
///   concrete type.
///
/// # Examples
///
/// ```
/// use quarry_core::resource::Resource;
///
/// #[derive(Debug)]
/// struct FloorTile {
///     name: String,
/// }
///
/// impl Resource for FloorTile {
///     fn name(&self) -> &str {
///         &self.name
///     }
/// }
/// ```
pub trait Resource: AsAny + Send + Sync + fmt::Debug + 'static {
    /// The symbolic name the resource was materialized from.
    fn name(&self) -> &str;
}
