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

//! The slot payload shared by the set and map: a value plus a link to the
//! next-older slot that hashed to the same bucket.
//!
//! Grounded on `storage2::collections::hashmap`'s split between a
//! `keys: Stash<K>` (stable-slot storage) and a `LazyHashMap<K, ValueEntry<V>>`
//! (hash-indexed lookup). Here the two collapse into one HAMT (`els`,
//! keyed by monotonic slot) plus a second HAMT (`idx`, keyed by hash)
//! pointing at the newest slot in each bucket; a collision chain runs
//! back through older slots via `next` instead of the teacher's
//! probing-within-a-single-bucket scheme, since a HAMT bucket holds
//! exactly one `idx` entry per hash.

/// One occupied slot in `els`: a payload (`V` for a set, `(K, V)` for a
/// map) and the previous slot that shared this value's hash bucket, if
/// any.
#[derive(Debug, Clone)]
pub(crate) struct Entry<T> {
    pub(crate) payload: T,
    pub(crate) next: Option<u64>,
}
