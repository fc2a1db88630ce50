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

//! Values and containers whose elements are computed at most once, on
//! first access, and cached afterward.
//!
//! [`LazyCell`] is the primitive: a single slot that either already holds
//! a value or holds a thunk that produces one. [`LazyList`] and
//! [`LazyMap`] wrap the persistent containers from [`crate::list`] and
//! [`crate::map`] around `Arc<LazyCell<T>>` elements, so a container can
//! be built once with most of its contents still unevaluated, and only
//! the cells a caller actually reads ever run their thunk.

mod cell;
mod list;
mod map;

pub use cell::LazyCell;
pub use list::{LazyList, LazyTList};
pub use map::{LazyMap, LazyTMap};
