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

//! # Quarry Core
//!
//! Foundational crate containing the contracts, keys, and primitives shared by
//! every layer of the resource resolution pipeline.
//!
//! Nothing in here knows how resources are materialized or stored: the asset
//! repository and the classifier are consumed through the traits in
//! [`repository`], storage lives in `quarry-data`, and orchestration lives in
//! `quarry-agents`.

#![warn(missing_docs)]

pub mod dispatch;
pub mod error;
pub mod repository;
pub mod resource;

pub use dispatch::{CompletionDispatcher, CompletionSender};
pub use error::{LoadFailure, ResolveError, ResolveResult};
pub use repository::{Classifier, ResourceRepository};
pub use resource::{CacheKey, Category, Resource, ResourceHandle, ResourceKind, TileTraits};
