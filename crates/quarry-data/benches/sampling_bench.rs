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

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use quarry_core::resource::{Category, Resource, ResourceHandle};
use quarry_data::{WeightedCategoryIndex, WeightedEntry};
use rand::rngs::StdRng;
use rand::SeedableRng;

#[derive(Debug)]
struct BenchTile(String);

impl Resource for BenchTile {
    fn name(&self) -> &str {
        &self.0
    }
}

fn bench_sampling(c: &mut Criterion) {
    let mut index = WeightedCategoryIndex::new();

    // 1,000 floor variants with uneven weights
    for i in 0..1_000 {
        let tile = ResourceHandle::new(BenchTile(format!("floor_{i}")));
        index.categorize(Category::Floor, WeightedEntry::new(tile, (i % 7) as f32));
    }

    let mut group = c.benchmark_group("Weighted Sampling");

    group.bench_function("Cumulative table draw", |b| {
        let mut rng = StdRng::seed_from_u64(0);
        b.iter(|| black_box(index.sample(&Category::Floor, &mut rng)));
    });

    group.bench_function("Filtered linear draw", |b| {
        let mut rng = StdRng::seed_from_u64(0);
        b.iter(|| black_box(index.sample_filtered(&Category::Floor, &mut rng, |e| e.weight > 3.0)));
    });

    group.finish();
}

criterion_group!(benches, bench_sampling);
criterion_main!(benches);
