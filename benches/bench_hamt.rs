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

use trie_collections::PList;

criterion_group!(
    populated_cache,
    bench_append_populated,
    bench_get_populated,
);
criterion_group!(empty_cache, bench_append_empty,);
criterion_main!(populated_cache, empty_cache);

/// The number of entries seeded into the `PList` used in these benchmarks.
const ENTRIES: i64 = 500;

fn setup_list() -> PList<i64> {
    PList::of(0..ENTRIES)
}

/// Appending to a populated list: every append allocates one new path down
/// to the trie's rightmost edge but shares everything else with `self`.
fn bench_append_populated(c: &mut Criterion) {
    c.bench_function("PList::append (populated)", |b| {
        b.iter_batched_ref(
            setup_list,
            |list| {
                let mut l = black_box(list).clone();
                for i in 0..ENTRIES {
                    l = l.append(i);
                }
                l
            },
            BatchSize::SmallInput,
        )
    });
}

/// Reading every element of a populated list, front to back.
fn bench_get_populated(c: &mut Criterion) {
    let list = setup_list();
    c.bench_function("PList::get (populated)", |b| {
        b.iter(|| {
            for i in 0..ENTRIES {
                black_box(list.get(i).unwrap());
            }
        })
    });
}

/// Appending into an initially empty list, growing it one `Arc` clone at a
/// time.
fn bench_append_empty(c: &mut Criterion) {
    c.bench_function("PList::append (empty cache)", |b| {
        b.iter_batched_ref(
            PList::new,
            |list: &mut PList<i64>| {
                let mut l = black_box(list).clone();
                for i in 0..ENTRIES {
                    l = l.append(i);
                }
                l
            },
            BatchSize::SmallInput,
        )
    });
}
