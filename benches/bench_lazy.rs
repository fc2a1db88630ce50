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

use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};

use trie_collections::{LazyCell, LazyList};

criterion_group!(reification, bench_first_reify, bench_cached_reify,);
criterion_main!(reification);

/// The number of cells seeded into the `LazyList` used in these benchmarks.
const ENTRIES: i64 = 500;

fn setup_list() -> LazyList<i64> {
    LazyList::of((0..ENTRIES).map(|i| Arc::new(LazyCell::new(format!("bench:{}", i), move || Ok(i * 2)))))
}

/// Forcing every cell for the first time: each `get` takes the slow,
/// lock-guarded path once before publishing into the lock-free `OnceCell`.
fn bench_first_reify(c: &mut Criterion) {
    c.bench_function("LazyList::get (first reify)", |b| {
        b.iter_batched_ref(
            setup_list,
            |list| {
                for i in 0..ENTRIES {
                    black_box(list.get(i).unwrap());
                }
            },
            BatchSize::SmallInput,
        )
    });
}

/// Reading already-reified cells, which never touch the lock.
fn bench_cached_reify(c: &mut Criterion) {
    let list = setup_list();
    list.reify_all().unwrap();
    c.bench_function("LazyList::get (already ready)", |b| {
        b.iter(|| {
            for i in 0..ENTRIES {
                black_box(list.get(i).unwrap());
            }
        })
    });
}
