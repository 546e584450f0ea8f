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

//! Configuration for the resolution agent.

use quarry_core::error::{ResolveError, ResolveResult};
use quarry_data::cache::CacheConfig;
use quarry_data::catalog::TileCatalog;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Everything a [`ResourceResolver`](super::ResourceResolver) is built from.
///
/// Every field has a default, so a configuration file only needs to list what
/// it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Per-kind capacities and size estimates.
    pub cache: CacheConfig,
    /// Background threads used by asynchronous resolution. At least one is started.
    pub worker_threads: usize,
    /// Seed for the default sampling RNG. `None` seeds from entropy.
    pub rng_seed: Option<u64>,
    /// Designer tile rules used by the default classifier.
    pub catalog: TileCatalog,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            cache: CacheConfig::default(),
            worker_threads: 2,
            rng_seed: None,
            catalog: TileCatalog::default(),
        }
    }
}

impl ResolverConfig {
    /// Parses a RON document.
    pub fn from_ron_str(source: &str) -> ResolveResult<Self> {
        ron::from_str(source).map_err(|e| ResolveError::Config(format!("invalid RON: {e}")))
    }

    /// Parses a JSON document.
    pub fn from_json_str(source: &str) -> ResolveResult<Self> {
        serde_json::from_str(source).map_err(|e| ResolveError::Config(format!("invalid JSON: {e}")))
    }

    /// Loads a `.ron` or `.json` file, picking the format from the extension.
    pub fn from_file(path: impl AsRef<Path>) -> ResolveResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| ResolveError::Config(format!("cannot read '{}': {e}", path.display())))?;

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("ron") => Self::from_ron_str(&content),
            Some("json") => Self::from_json_str(&content),
            other => Err(ResolveError::Config(format!(
                "unsupported configuration format {other:?} for '{}'",
                path.display()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quarry_core::resource::{Category, ResourceKind};
    use std::io::Write;

    #[test]
    fn partial_ron_keeps_defaults() {
        let config = ResolverConfig::from_ron_str(
            r#"(
                worker_threads: 4,
                cache: (tile: (capacity: 2, size_estimate: 64)),
            )"#,
        )
        .expect("Config should parse");

        assert_eq!(config.worker_threads, 4);
        assert_eq!(config.cache.settings(ResourceKind::Tile).capacity, 2);
        assert_eq!(config.cache.prefab, CacheConfig::default().prefab);
        assert_eq!(config.rng_seed, None);
    }

    #[test]
    fn json_catalog() {
        let config = ResolverConfig::from_json_str(
            r#"{
                "rng_seed": 9,
                "catalog": { "tiles": [ { "name": "floor_a", "category": "floor", "weight": 2.5 } ] }
            }"#,
        )
        .expect("Config should parse");

        assert_eq!(config.rng_seed, Some(9));
        let rule = config.catalog.rule("floor_a").unwrap();
        assert_eq!(rule.category, Category::Floor);
        assert_eq!(rule.weight, 2.5);
    }

    #[test]
    fn from_file_picks_format_by_extension() {
        let mut file = tempfile::Builder::new()
            .suffix(".ron")
            .tempfile()
            .expect("Failed to create temp file");
        writeln!(file, "(worker_threads: 3)").expect("Failed to write config");

        let config = ResolverConfig::from_file(file.path()).expect("Config should load");
        assert_eq!(config.worker_threads, 3);
    }

    #[test]
    fn unsupported_extension_is_a_config_error() {
        let file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .expect("Failed to create temp file");

        let err = ResolverConfig::from_file(file.path()).unwrap_err();
        assert!(matches!(err, ResolveError::Config(_)));
    }

    #[test]
    fn malformed_ron_is_a_config_error() {
        let err = ResolverConfig::from_ron_str("(worker_threads: )").unwrap_err();
        assert!(matches!(err, ResolveError::Config(_)));
    }
}
