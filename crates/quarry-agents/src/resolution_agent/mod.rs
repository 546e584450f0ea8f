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

//! Acts as the agent for resource resolution.
//!
//! This module provides the tactical logic of the pipeline. It owns the
//! consuming-context state (cache, category index, observers), decides when
//! to call the repository, and routes background results back through a
//! completion dispatcher so every mutation happens on the consuming context.
//!
//! The primary entry point is [`ResourceResolver`].

mod agent;
mod batch;
mod classifier;
mod config;
mod observer;
mod workers;

pub use agent::{ResolveCallback, ResolverState, ResourceResolver};
pub use batch::{BatchReport, ValidationResult};
pub use classifier::CatalogClassifier;
pub use config::ResolverConfig;
pub use observer::{
    ChannelObserver, ObserverHandle, ObserverRegistry, ResolutionEvent, ResolutionObserver,
};
