// Copyright 2019-2020 Parity Technologies (UK) Ltd.
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

use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};

use trie_collections::{PMap, PSet};

criterion_group!(
    populated_cache,
    bench_set_add_populated,
    bench_set_remove_populated,
    bench_map_set_populated,
    bench_map_pop_populated,
);
criterion_main!(populated_cache);

/// The number of entries seeded into the `PSet`/`PMap` used in these
/// benchmarks.
const ENTRIES: i32 = 500;

fn test_values() -> Vec<i32> {
    (0..ENTRIES).collect()
}

fn setup_set() -> PSet<i32> {
    PSet::of(test_values())
}

fn setup_map() -> PMap<i32, i32> {
    PMap::of(test_values().into_iter().map(|v| (v, v)))
}

/// Checks membership then adds, for keys both inside and outside the
/// existing range, mirroring how a cache actually grows.
fn insert_and_check(set: &mut PSet<i32>) {
    for key in 0..ENTRIES * 2 {
        if !black_box(set.contains(&key)) {
            *set = black_box(set.add(key));
        }
    }
}

fn remove_if_present(set: &mut PSet<i32>) {
    for key in 0..ENTRIES * 2 {
        if black_box(set.contains(&key)) {
            *set = black_box(set.discard(&key));
        }
    }
}

fn bench_set_add_populated(c: &mut Criterion) {
    c.bench_function("PSet::add (populated cache)", |b| {
        b.iter_batched_ref(setup_set, insert_and_check, BatchSize::SmallInput)
    });
}

fn bench_set_remove_populated(c: &mut Criterion) {
    c.bench_function("PSet::discard (populated cache)", |b| {
        b.iter_batched_ref(setup_set, remove_if_present, BatchSize::SmallInput)
    });
}

fn bench_map_set_populated(c: &mut Criterion) {
    c.bench_function("PMap::set (populated cache)", |b| {
        b.iter_batched_ref(
            setup_map,
            |map: &mut PMap<i32, i32>| {
                for key in 0..ENTRIES * 2 {
                    *map = black_box(map.set(key, key));
                }
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_map_pop_populated(c: &mut Criterion) {
    c.bench_function("PMap::pop (populated cache)", |b| {
        b.iter_batched_ref(
            setup_map,
            |map: &mut PMap<i32, i32>| {
                for key in 0..ENTRIES {
                    if let Ok((m, _)) = black_box(&*map).pop(&key) {
                        *map = m;
                    }
                }
            },
            BatchSize::SmallInput,
        )
    });
}
