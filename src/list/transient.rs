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

use std::cmp::Ordering;
use std::sync::Arc;

use super::normalize_index;
use super::persistent::PList;
use crate::error::{Error, Result};
use crate::hamt::TransientHamt;

#[inline]
fn key_at(start: i64, j: i64) -> u64 {
    (start.wrapping_add(j)) as u64
}

/// A mutable sequence opened from a [`PList`]. Every `_mut` method mutates
/// in place; there is no separate "mutated during iteration" runtime
/// check here because Rust's borrow checker already rules it out: an
/// [`iter`](Self::iter) call borrows `self` immutably, so it cannot be
/// outlived by a later `_mut` call on the same value — the hazard the
/// spec's `Error::MutatedDuringIteration` exists for on a host without
/// static borrow checking simply cannot arise here.
pub struct TList<V> {
    els: TransientHamt<V>,
    start: i64,
    /// The persistent list this transient was opened from. Cleared by the
    /// first structural mutation (`set_mut`/`append_mut`/`prepend_mut`/
    /// `insert_mut`/`delete_mut`/`clear_mut`); while still present,
    /// `persistent()` returns it directly instead of freezing.
    pub orig: Option<PList<V>>,
}

impl<V> TList<V> {
    pub fn new() -> Self {
        TList {
            els: TransientHamt::new(),
            start: 0,
            orig: None,
        }
    }

    pub(crate) fn from_persistent(p: &PList<V>) -> Self {
        TList {
            els: p.els.clone().into_transient(),
            start: p.start,
            orig: Some(p.clone()),
        }
    }

    pub fn len(&self) -> usize {
        self.els.len()
    }

    pub fn is_empty(&self) -> bool {
        self.els.len() == 0
    }

    #[inline]
    fn key_for(&self, j: i64) -> u64 {
        key_at(self.start, j)
    }

    pub fn get(&self, i: i64) -> Result<&V> {
        let idx = normalize_index(i, self.len(), false)?;
        Ok(self
            .els
            .get(self.key_for(idx))
            .expect("index in range must be present"))
    }

    pub fn set_mut(&mut self, i: i64, v: V) -> Result<()> {
        let idx = normalize_index(i, self.len(), false)?;
        self.orig = None;
        self.els.assoc(self.key_for(idx), Arc::new(v));
        Ok(())
    }

    pub fn append_mut(&mut self, v: V) {
        self.orig = None;
        let key = self.key_for(self.len() as i64);
        self.els.assoc(key, Arc::new(v));
    }

    pub fn prepend_mut(&mut self, v: V) {
        self.orig = None;
        self.start -= 1;
        let key = self.key_for(0);
        self.els.assoc(key, Arc::new(v));
    }

    pub fn extend_mut<I: IntoIterator<Item = V>>(&mut self, iter: I) {
        for v in iter {
            self.append_mut(v);
        }
    }

    /// Same shorter-side-shift strategy as [`PList::insert`], applied in
    /// place against this transient's own `TransientHamt`.
    pub fn insert_mut(&mut self, i: i64, v: V) -> Result<()> {
        let n = self.len();
        let i = normalize_index(i, n, true)? as usize;
        self.orig = None;
        let left = i;
        let right = n - i;
        if left <= right {
            let new_start = self.start - 1;
            for j in 0..i as i64 {
                if let Some(arc) = self.els.get_arc(key_at(self.start, j)) {
                    self.els.assoc(key_at(new_start, j), arc);
                }
                self.els.dissoc(key_at(self.start, j));
            }
            self.els.assoc(key_at(new_start, i as i64), Arc::new(v));
            self.start = new_start;
        } else {
            for j in (i as i64..n as i64).rev() {
                if let Some(arc) = self.els.get_arc(self.key_for(j)) {
                    self.els.assoc(self.key_for(j + 1), arc);
                }
                self.els.dissoc(self.key_for(j));
            }
            self.els.assoc(self.key_for(i as i64), Arc::new(v));
        }
        Ok(())
    }

    pub fn delete_mut(&mut self, i: i64) -> Result<()> {
        let n = self.len();
        let i = normalize_index(i, n, false)? as usize;
        self.orig = None;
        let left = i;
        let right = n - 1 - i;
        self.els.dissoc(self.key_for(i as i64));
        if left <= right {
            let new_start = self.start + 1;
            for j in (0..i as i64).rev() {
                if let Some(arc) = self.els.get_arc(self.key_for(j)) {
                    self.els.assoc(key_at(new_start, j), arc);
                }
                self.els.dissoc(self.key_for(j));
            }
            self.start = new_start;
        } else {
            for j in (i as i64 + 1)..n as i64 {
                if let Some(arc) = self.els.get_arc(self.key_for(j)) {
                    self.els.assoc(self.key_for(j - 1), arc);
                }
                self.els.dissoc(self.key_for(j));
            }
        }
        Ok(())
    }

    /// Like [`delete_mut`](Self::delete_mut), but does nothing instead of
    /// failing when `i` is out of range.
    pub fn drop_mut(&mut self, i: i64) {
        let _ = self.delete_mut(i);
    }

    /// Removes and returns the last element, failing with
    /// [`Error::KeyMissing`] on an empty list.
    pub fn pop_mut(&mut self) -> Result<V>
    where
        V: Clone,
    {
        if self.is_empty() {
            return Err(Error::KeyMissing);
        }
        let last = self.len() as i64 - 1;
        let v = self.get(last)?.clone();
        self.delete_mut(last)?;
        Ok(v)
    }

    pub fn clear_mut(&mut self) {
        self.orig = None;
        self.els = TransientHamt::new();
        self.start = 0;
    }

    pub fn sort_mut<F>(&mut self, mut compare: F)
    where
        V: Clone,
        F: FnMut(&V, &V) -> Ordering,
    {
        let mut items: Vec<V> = self.iter().cloned().collect();
        items.sort_by(|a, b| compare(a, b));
        self.clear_mut();
        self.extend_mut(items);
    }

    pub fn reverse_mut(&mut self)
    where
        V: Clone,
    {
        let items: Vec<V> = self.iter().rev().cloned().collect();
        self.clear_mut();
        self.extend_mut(items);
    }

    /// Freezes this transient into a persistent snapshot. Returns `orig`
    /// directly, with no allocation, if no structural mutation has
    /// happened since this transient was opened.
    pub fn persistent(self) -> PList<V> {
        if let Some(orig) = self.orig {
            return orig;
        }
        PList::from_parts(self.els.into_persistent(), self.start)
    }

    pub fn iter(&self) -> Iter<'_, V> {
        Iter {
            list: self,
            front: 0,
            back: self.len() as i64,
        }
    }
}

impl<V> Default for TList<V> {
    fn default() -> Self {
        TList::new()
    }
}

pub struct Iter<'a, V> {
    list: &'a TList<V>,
    front: i64,
    back: i64,
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<&'a V> {
        if self.front >= self.back {
            return None;
        }
        let v = self.list.els.get(self.list.key_for(self.front));
        self.front += 1;
        v
    }
}

impl<'a, V> DoubleEndedIterator for Iter<'a, V> {
    fn next_back(&mut self) -> Option<&'a V> {
        if self.front >= self.back {
            return None;
        }
        self.back -= 1;
        self.list.els.get(self.list.key_for(self.back))
    }
}

impl<V: PartialEq> PartialEq for TList<V> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<V: PartialEq> PartialEq<PList<V>> for TList<V> {
    fn eq(&self, other: &PList<V>) -> bool {
        other == self
    }
}

impl<V: std::fmt::Debug> std::fmt::Debug for TList<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let rendered = crate::compare::render(self.iter(), 60, "[<", ">]", ", ", |v| {
            format!("{:?}", v)
        });
        f.write_str(&rendered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_prepend_and_freeze_round_trip() {
        let mut t = TList::new();
        t.append_mut(2);
        t.prepend_mut(1);
        t.append_mut(3);
        let p = t.persistent();
        assert_eq!(p, vec![1, 2, 3]);
    }

    #[test]
    fn insert_and_delete_mutate_in_place() {
        let mut t = PList::of(0..5).transient();
        t.insert_mut(2, 99).unwrap();
        assert_eq!(t.persistent(), vec![0, 1, 99, 2, 3, 4]);

        let mut t2 = PList::of(0..5).transient();
        t2.delete_mut(2).unwrap();
        assert_eq!(t2.persistent(), vec![0, 1, 3, 4]);
    }

    #[test]
    fn orig_points_back_to_the_source_persistent_list() {
        let p = PList::of(vec![1, 2, 3]);
        let t = p.transient();
        assert_eq!(t.orig.as_ref().unwrap(), &p);
    }

    #[test]
    fn orig_is_cleared_by_structural_mutation() {
        let p = PList::of(vec![1, 2, 3]);
        let mut t = p.transient();
        t.append_mut(4);
        assert!(t.orig.is_none());
    }

    #[test]
    fn persistent_returns_orig_directly_when_untouched() {
        let p = PList::of(vec![1, 2, 3]);
        let t = p.transient();
        let q = t.persistent();
        assert!(std::ptr::eq(p.get(0).unwrap(), q.get(0).unwrap()));
    }

    #[test]
    fn drop_mut_is_a_noop_out_of_range() {
        let mut t = PList::of(vec![1, 2, 3]).transient();
        t.drop_mut(99);
        assert_eq!(t.persistent(), vec![1, 2, 3]);
    }

    #[test]
    fn pop_mut_removes_the_last_element() {
        let mut t: TList<i32> = PList::of(vec![1, 2, 3]).transient();
        assert_eq!(t.pop_mut().unwrap(), 3);
        assert_eq!(t.pop_mut().unwrap(), 2);
        assert_eq!(t.pop_mut().unwrap(), 1);
        assert!(t.pop_mut().is_err());
    }
}
