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

use std::hash::Hash;
use std::sync::Arc;

use super::cell::LazyCell;
use crate::error::{Error, Result};
use crate::hash::hash_value;
use crate::map::{PMap, TMap};

/// A persistent mapping whose values may be lazily computed cells.
///
/// Mirrors [`super::list::LazyList`]: reifying reads (`get`, `values`,
/// `items`) force whichever cells they touch, while `get_raw`/`items_raw`
/// hand back the cells themselves.
#[derive(Clone)]
pub struct LazyMap<K, T> {
    cells: PMap<K, Arc<LazyCell<T>>>,
}

impl<K, T> LazyMap<K, T> {
    pub fn new() -> Self {
        LazyMap { cells: PMap::new() }
    }

    pub fn of<I: IntoIterator<Item = (K, Arc<LazyCell<T>>)>>(iter: I) -> Self
    where
        K: Hash + PartialEq,
    {
        LazyMap {
            cells: PMap::of(iter),
        }
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn contains_key(&self, k: &K) -> bool
    where
        K: Hash + PartialEq,
    {
        self.cells.contains_key(k)
    }

    /// Forces the cell at `k`, if present, and returns its value.
    pub fn get(&self, k: &K) -> Result<Option<&T>>
    where
        K: Hash + PartialEq,
    {
        match self.cells.get(k) {
            Some(cell) => cell.get().map(Some),
            None => Ok(None),
        }
    }

    /// Returns the cell at `k` without forcing it.
    pub fn get_raw(&self, k: &K) -> Option<&Arc<LazyCell<T>>>
    where
        K: Hash + PartialEq,
    {
        self.cells.get(k)
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.cells.keys()
    }

    /// Forces every value, in insertion order.
    pub fn values(&self) -> impl Iterator<Item = Result<&T>> {
        self.cells.values().map(|cell| cell.get())
    }

    /// Forces every value and pairs it with its key, in insertion order.
    pub fn items(&self) -> impl Iterator<Item = (&K, Result<&T>)> {
        self.cells.iter().map(|(k, cell)| (k, cell.get()))
    }

    /// Iterates `(key, cell)` pairs without forcing any value.
    pub fn items_raw(&self) -> impl Iterator<Item = (&K, &Arc<LazyCell<T>>)> {
        self.cells.iter().map(|(k, cell)| (k, cell))
    }

    /// Forces every value, sequentially, stopping at the first failure.
    pub fn reify_all(&self) -> Result<()> {
        for (_, cell) in self.cells.iter() {
            cell.get()?;
        }
        Ok(())
    }

    pub fn transient(&self) -> LazyTMap<K, T>
    where
        K: Clone,
    {
        LazyTMap {
            cells: self.cells.transient(),
        }
    }

    /// Structural equality after forcing every value on both sides.
    pub fn eq(&self, other: &Self) -> Result<bool>
    where
        K: Hash + PartialEq,
        T: PartialEq,
    {
        if self.len() != other.len() {
            return Ok(false);
        }
        for (k, v) in self.items() {
            match other.get(k)? {
                Some(ov) if ov == v? => {}
                _ => return Ok(false),
            }
        }
        Ok(true)
    }

    /// A hash over the forced entries. See
    /// [`LazyList::hash_value`](super::list::LazyList::hash_value) for why
    /// this always reifies.
    pub fn hash_value(&self) -> Result<u64>
    where
        K: Hash,
        T: Hash,
    {
        let mut acc: u64 = (self.len() as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15);
        for (k, v) in self.items() {
            acc ^= hash_value(k) ^ hash_value(v?).rotate_left(1);
        }
        Ok(acc)
    }
}

impl<K, T> Default for LazyMap<K, T> {
    fn default() -> Self {
        LazyMap::new()
    }
}

/// The transient twin of [`LazyMap`].
pub struct LazyTMap<K, T> {
    cells: TMap<K, Arc<LazyCell<T>>>,
}

impl<K, T> LazyTMap<K, T> {
    pub fn new() -> Self {
        LazyTMap { cells: TMap::new() }
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.len() == 0
    }

    pub fn get_raw(&self, k: &K) -> Option<&Arc<LazyCell<T>>>
    where
        K: Hash + PartialEq,
    {
        self.cells.get(k)
    }

    pub fn get(&self, k: &K) -> Result<Option<&T>>
    where
        K: Hash + PartialEq,
    {
        match self.cells.get(k) {
            Some(cell) => cell.get().map(Some),
            None => Ok(None),
        }
    }

    pub fn set_ready_mut(&mut self, k: K, value: T)
    where
        K: Hash + PartialEq,
    {
        self.cells.set_mut(k, Arc::new(LazyCell::ready(value)));
    }

    pub fn set_cell_mut(&mut self, k: K, cell: Arc<LazyCell<T>>)
    where
        K: Hash + PartialEq,
    {
        self.cells.set_mut(k, cell);
    }

    /// Removes `k` and returns its reified value. This is the corrected
    /// behavior: a naive port (unwrap the cell's value, then remove the
    /// key by recursing through this same `pop`) loops forever, since the
    /// cell has already been unlinked by the time the recursive call
    /// looks it up again. Remove the slot first, reify through the
    /// removed cell after.
    pub fn pop_mut(&mut self, k: &K) -> Result<T>
    where
        K: Hash + Clone + PartialEq,
        T: Clone,
    {
        let cell = self.cells.pop_mut(k)?;
        cell.get().map(|v| v.clone())
    }

    pub fn persistent(self) -> LazyMap<K, T> {
        LazyMap {
            cells: self.cells.persistent(),
        }
    }
}

impl<K, T> Default for LazyTMap<K, T> {
    fn default() -> Self {
        LazyTMap::new()
    }
}
