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

//! The hashing abstraction used by the insertion-ordered set and map.
//!
//! This mirrors `ink_storage`'s `Hasher` trait, generalized from a
//! blockchain-deterministic digest (Blake2x256) to the standard library's
//! [`DefaultHasher`], since nothing in this crate needs cross-process hash
//! stability.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher as StdHasher};

/// Produces a 64-bit digest for any [`Hash`] value.
///
/// Implementations are free to use a faster or slower, more or less
/// collision-resistant algorithm; the set/map layer only relies on the
/// digest being stable for the lifetime of a value and on collisions being
/// handled (never assumed away) via the collision chain in `els`/`idx`.
pub trait Hasher {
    /// Hashes `value` down to a 64-bit digest.
    fn hash_of<V: Hash + ?Sized>(value: &V) -> u64;
}

/// The crate's default [`Hasher`], backed by [`DefaultHasher`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DefaultHash;

impl Hasher for DefaultHash {
    fn hash_of<V: Hash + ?Sized>(value: &V) -> u64 {
        let mut hasher = DefaultHasher::new();
        value.hash(&mut hasher);
        hasher.finish()
    }
}

/// Shorthand for `DefaultHash::hash_of`, used throughout the set/map/HAMT
/// modules.
pub(crate) fn hash_value<V: Hash + ?Sized>(value: &V) -> u64 {
    DefaultHash::hash_of(value)
}
