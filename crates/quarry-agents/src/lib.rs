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

//! # Quarry Agents
//!
//! The public entry point of the resolution pipeline. The
//! [`ResourceResolver`](resolution_agent::ResourceResolver) answers requests
//! from its cache, delegates misses to the asset repository (synchronously or
//! on background workers), indexes tiles by category, and notifies observers.

#![warn(missing_docs)]

pub mod resolution_agent;

pub use resolution_agent::{
    BatchReport, CatalogClassifier, ChannelObserver, ObserverHandle, ResolutionEvent,
    ResolutionObserver, ResolverConfig, ResolverState, ResourceResolver, ValidationResult,
};
