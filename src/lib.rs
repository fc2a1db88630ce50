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

//! Persistent (structurally shared, immutable) and transient (mutable,
//! single-owner) collections backed by a hash array-mapped trie.
//!
//! Every container comes in a matched pair: a `P*` type that never
//! changes once built, cheap to clone and to share across threads, and a
//! `T*` type opened from it for a batch of in-place edits that is later
//! frozen back into a new persistent snapshot. The two share the same
//! underlying trie (see [`hamt`]), so opening a transient and freezing it
//! back without touching anything is free, and any edit's cost is
//! proportional to what it actually touched rather than to the
//! container's total size.
//!
//! - [`list`] — ordered, integer-indexed sequences ([`PList`]/[`TList`]).
//! - [`set`] — insertion-ordered, deduplicated collections
//!   ([`PSet`]/[`TSet`]).
//! - [`map`] — insertion-ordered key/value associations
//!   ([`PMap`]/[`TMap`]).
//! - [`lazy`] — values and containers computed at most once on first
//!   access ([`lazy::LazyCell`], [`lazy::LazyList`], [`lazy::LazyMap`]).

mod compare;
mod entry;
pub mod error;
mod hamt;
pub mod hash;
pub mod lazy;
pub mod list;
pub mod map;
pub mod set;

pub use compare::SetOrdering;
pub use error::{Error, Result};
pub use lazy::{LazyCell, LazyList, LazyMap, LazyTList, LazyTMap};
pub use list::{PList, TList};
pub use map::{PMap, TMap};
pub use set::{PSet, TSet};
