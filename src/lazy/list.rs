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
use crate::error::Result;
use crate::hash::hash_value;
use crate::list::{PList, TList};

/// A persistent list whose elements may be lazily computed cells.
///
/// `get`/`iter` reify: they force whichever cell they touch and hand back
/// its value. `get_raw`/`iter_raw` return the cells themselves, unreified,
/// matching the spec's split between the transparent read paths and the
/// explicit non-reifying ones transient batch mutators need.
#[derive(Clone)]
pub struct LazyList<T> {
    cells: PList<Arc<LazyCell<T>>>,
}

impl<T> LazyList<T> {
    pub fn new() -> Self {
        LazyList { cells: PList::new() }
    }

    pub fn of<I: IntoIterator<Item = Arc<LazyCell<T>>>>(iter: I) -> Self {
        LazyList {
            cells: PList::of(iter),
        }
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Forces the cell at `i` and returns its value.
    pub fn get(&self, i: i64) -> Result<&T> {
        self.cells.get(i)?.get()
    }

    /// Returns the cell at `i` without forcing it.
    pub fn get_raw(&self, i: i64) -> Result<&Arc<LazyCell<T>>> {
        self.cells.get(i)
    }

    /// Forces every cell in order and returns their values.
    pub fn iter(&self) -> impl Iterator<Item = Result<&T>> {
        self.cells.iter().map(|cell| cell.get())
    }

    /// Iterates the cells themselves, without forcing any of them.
    pub fn iter_raw(&self) -> impl Iterator<Item = &Arc<LazyCell<T>>> {
        self.cells.iter()
    }

    /// Forces every cell, sequentially, stopping at the first failure.
    pub fn reify_all(&self) -> Result<()> {
        for cell in self.cells.iter() {
            cell.get()?;
        }
        Ok(())
    }

    pub fn transient(&self) -> LazyTList<T> {
        LazyTList {
            cells: self.cells.transient(),
        }
    }

    /// Structural equality after forcing every cell on both sides.
    pub fn eq(&self, other: &Self) -> Result<bool>
    where
        T: PartialEq,
    {
        if self.len() != other.len() {
            return Ok(false);
        }
        for i in 0..self.len() as i64 {
            if self.get(i)? != other.get(i)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// A hash over the forced elements, in order. Forcing every cell to
    /// hash a lazy-bearing container is a conscious cost: the alternative
    /// (hashing raw cells by identity) would break equality with the
    /// reified peer.
    pub fn hash_value(&self) -> Result<u64>
    where
        T: Hash,
    {
        let mut acc = self.len() as u64;
        for i in 0..self.len() as i64 {
            acc = acc.wrapping_mul(31).wrapping_add(hash_value(self.get(i)?));
        }
        Ok(acc)
    }
}

impl<T> Default for LazyList<T> {
    fn default() -> Self {
        LazyList::new()
    }
}

/// The transient twin of [`LazyList`]. Edits preserve whichever cells
/// they don't touch, so laziness on the rest of the list survives a batch
/// mutation.
pub struct LazyTList<T> {
    cells: TList<Arc<LazyCell<T>>>,
}

impl<T> LazyTList<T> {
    pub fn new() -> Self {
        LazyTList { cells: TList::new() }
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.len() == 0
    }

    /// Non-reifying read: returns the cell at `i` without forcing it, so
    /// a batch mutator can see whether a slot already holds a value.
    pub fn get_raw(&self, i: i64) -> Result<&Arc<LazyCell<T>>> {
        self.cells.get(i)
    }

    pub fn get(&self, i: i64) -> Result<&T> {
        self.cells.get(i)?.get()
    }

    pub fn append_ready_mut(&mut self, value: T) {
        self.cells.append_mut(Arc::new(LazyCell::ready(value)));
    }

    pub fn append_cell_mut(&mut self, cell: Arc<LazyCell<T>>) {
        self.cells.append_mut(cell);
    }

    pub fn set_cell_mut(&mut self, i: i64, cell: Arc<LazyCell<T>>) -> Result<()> {
        self.cells.set_mut(i, cell)
    }

    pub fn persistent(self) -> LazyList<T> {
        LazyList {
            cells: self.cells.persistent(),
        }
    }
}

impl<T> Default for LazyTList<T> {
    fn default() -> Self {
        LazyTList::new()
    }
}
