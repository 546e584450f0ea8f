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

// Quarry Sandbox
// Resolves a small in-memory tile set and prints what the resolver sees.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use quarry_agents::{ChannelObserver, ResolutionEvent, ResolverConfig, ResourceResolver};
use quarry_core::{Category, Resource, ResourceHandle, ResourceKind};
use rand::SeedableRng;

#[derive(Debug, Clone)]
struct Tile {
    name: String,
    glyph: char,
}

impl Resource for Tile {
    fn name(&self) -> &str {
        &self.name
    }
}

#[derive(Debug, Clone)]
struct Prefab {
    name: String,
    footprint: (u32, u32),
}

impl Resource for Prefab {
    fn name(&self) -> &str {
        &self.name
    }
}

const TILES: &[(&str, char)] = &[
    ("floor_stone", '.'),
    ("floor_moss", ','),
    ("floor_gold", '$'),
    ("pit_cover", '_'),
    ("wall_brick", '#'),
    ("wall_rubble", '%'),
    ("door_oak", '+'),
    ("rope_bridge", '='),
    ("water_deep", '~'),
    ("lava_pool", '^'),
];

const PREFABS: &[(&str, (u32, u32))] = &[("shrine", (3, 3)), ("barracks", (7, 5))];

/// Stands in for a disk-backed repository: every lookup takes a little while.
struct DemoRepository {
    latency: Duration,
    lookups: AtomicUsize,
}

impl quarry_core::ResourceRepository for DemoRepository {
    fn resolve(&self, name: &str, kind: ResourceKind) -> anyhow::Result<Option<ResourceHandle>> {
        self.lookups.fetch_add(1, Ordering::Relaxed);
        std::thread::sleep(self.latency);

        let handle = match kind {
            ResourceKind::Tile => TILES.iter().find(|(n, _)| *n == name).map(|(n, glyph)| {
                ResourceHandle::new(Tile {
                    name: n.to_string(),
                    glyph: *glyph,
                })
            }),
            ResourceKind::Prefab => PREFABS
                .iter()
                .find(|(n, _)| *n == name)
                .map(|(n, footprint)| {
                    ResourceHandle::new(Prefab {
                        name: n.to_string(),
                        footprint: *footprint,
                    })
                }),
            ResourceKind::Config => anyhow::bail!("config store is offline"),
        };
        Ok(handle)
    }
}

fn load_config() -> Result<ResolverConfig> {
    match std::env::args().nth(1) {
        Some(path) => {
            log::info!("Loading resolver configuration from '{path}'.");
            Ok(ResolverConfig::from_file(path)?)
        }
        None => Ok(ResolverConfig::default()),
    }
}

fn main() -> Result<()> {
    use env_logger::{Builder, Env};

    Builder::from_env(Env::default().default_filter_or("info")).init();

    let repository = Arc::new(DemoRepository {
        latency: Duration::from_millis(5),
        lookups: AtomicUsize::new(0),
    });
    let mut resolver = ResourceResolver::new(repository.clone(), load_config()?)?;
    let (observer, events) = ChannelObserver::channel();
    resolver.register_observer(observer);

    let report = resolver.preload(TILES.iter().take(6).map(|(name, _)| *name), ResourceKind::Tile);
    log::info!("Preload report: {report:?}");

    for (name, _) in TILES.iter().skip(6) {
        resolver.resolve_async(name, ResourceKind::Tile, |resource| {
            if let Some(tile) = resource.as_ref().and_then(|h| h.downcast_ref::<Tile>()) {
                log::info!("Streamed in '{}' ({}).", tile.name, tile.glyph);
            }
        })?;
    }
    while resolver.pending_requests() > 0 {
        resolver.process_completions_timeout(Duration::from_millis(50));
    }

    if let Some(shrine) = resolver.resolve_as::<Prefab>("shrine", ResourceKind::Prefab)? {
        log::info!("Prefab '{}' covers {:?}.", shrine.name, shrine.footprint);
    }
    if let Err(e) = resolver.validate_required(["world_rules"], ResourceKind::Config) {
        log::warn!("Validation failed: {e}");
    }

    let mut rng = rand::rngs::StdRng::seed_from_u64(2025);
    let row: String = (0..40)
        .filter_map(|_| resolver.sample_random_of_category(&Category::Floor, Some(&mut rng)))
        .filter_map(|handle| handle.downcast_ref::<Tile>().map(|tile| tile.glyph))
        .collect();
    println!("floor row: {row}");

    let path: String = (0..40)
        .filter_map(|_| resolver.sample_walkable(&Category::Floor, Some(&mut rng)))
        .filter_map(|handle| handle.downcast_ref::<Tile>().map(|tile| tile.glyph))
        .collect();
    println!("walkable row: {path}");

    let stats = resolver.stats();
    println!(
        "{} cached, {} loads, {:.0}% hits, {} bytes, {} evictions, {} repository lookups",
        stats.total_assets,
        stats.load_count,
        stats.hit_rate * 100.0,
        stats.memory_usage,
        stats.evictions,
        repository.lookups.load(Ordering::Relaxed)
    );

    resolver.clear();
    let loaded = events
        .try_iter()
        .filter(|event| matches!(event, ResolutionEvent::Loaded { .. }))
        .count();
    log::info!("{loaded} resource(s) were loaded during the session.");

    Ok(())
}
