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

use once_cell::sync::OnceCell;

use super::transient::TSet;
use crate::compare::{set_compare, SetOrdering};
use crate::entry::Entry;
use crate::error::Result;
use crate::hamt::Hamt;
use crate::hash::hash_value as hash_of;

fn find_slot<V: PartialEq>(els: &Hamt<Entry<V>>, head: Option<u64>, value: &V) -> Option<u64> {
    let mut cur = head;
    while let Some(s) = cur {
        let entry = els.get(s).expect("chain slot must exist");
        if entry.payload == *value {
            return Some(s);
        }
        cur = entry.next;
    }
    None
}

/// An immutable, insertion-ordered, deduplicated collection.
///
/// Storage is split across two HAMTs, mirroring `storage2`'s split of a
/// `Stash` (stable slots) from a hash index: `els` holds every occupied
/// slot keyed by a monotonically increasing counter (`top`), and `idx`
/// maps a value's hash to the newest slot that holds it. Slots that
/// collide on the same hash chain backward through `Entry::next` rather
/// than probing, since a HAMT bucket holds exactly one `idx` entry per
/// hash. Unlike `storage2::collections::Stash`, freed slots are never
/// reused — `top` only grows — which keeps insertion order recoverable
/// by a plain ascending scan at the cost of sparser slot occupancy after
/// heavy churn.
pub struct PSet<V> {
    pub(super) els: Hamt<Entry<V>>,
    pub(super) idx: Hamt<u64>,
    pub(super) top: u64,
    hash_cache: OnceCell<u64>,
}

impl<V> PSet<V> {
    pub fn new() -> Self {
        PSet {
            els: Hamt::new(),
            idx: Hamt::new(),
            top: 0,
            hash_cache: OnceCell::new(),
        }
    }

    pub(crate) fn from_parts(els: Hamt<Entry<V>>, idx: Hamt<u64>, top: u64) -> Self {
        PSet {
            els,
            idx,
            top,
            hash_cache: OnceCell::new(),
        }
    }

    pub(crate) fn parts(&self) -> (Hamt<Entry<V>>, Hamt<u64>, u64) {
        (self.els.clone(), self.idx.clone(), self.top)
    }

    pub fn of<I: IntoIterator<Item = V>>(iter: I) -> Self
    where
        V: Hash + PartialEq,
    {
        let mut t = PSet::new().transient();
        for v in iter {
            t.add_mut(v);
        }
        t.persistent()
    }

    pub fn len(&self) -> usize {
        self.els.len()
    }

    pub fn is_empty(&self) -> bool {
        self.els.len() == 0
    }

    pub fn contains(&self, v: &V) -> bool
    where
        V: Hash + PartialEq,
    {
        let h = hash_of(v);
        find_slot(&self.els, self.idx.get(h).copied(), v).is_some()
    }

    pub fn add(&self, v: V) -> Self
    where
        V: Hash + PartialEq,
    {
        let mut t = self.transient();
        t.add_mut(v);
        t.persistent()
    }

    pub fn discard(&self, v: &V) -> Self
    where
        V: Hash + Clone + PartialEq,
    {
        let mut t = self.transient();
        t.discard_mut(v);
        t.persistent()
    }

    pub fn remove(&self, v: &V) -> Result<Self>
    where
        V: Hash + Clone + PartialEq,
    {
        let mut t = self.transient();
        t.remove_mut(v)?;
        Ok(t.persistent())
    }

    /// Returns a set with the earliest-inserted element removed, along
    /// with that element.
    pub fn pop(&self) -> Result<(Self, V)>
    where
        V: Hash + Clone + PartialEq,
    {
        let mut t = self.transient();
        let v = t.pop_mut()?;
        Ok((t.persistent(), v))
    }

    pub fn clear(&self) -> Self {
        PSet::new()
    }

    /// Adds every element of `values`, ignoring ones already present.
    pub fn addall<I: IntoIterator<Item = V>>(&self, values: I) -> Self
    where
        V: Hash + Clone + PartialEq,
    {
        let mut t = self.transient();
        for v in values {
            t.add_mut(v);
        }
        t.persistent()
    }

    /// Removes every element of `values`, failing at the first one that is
    /// absent.
    pub fn removeall<'v, I: IntoIterator<Item = &'v V>>(&self, values: I) -> Result<Self>
    where
        V: 'v + Hash + Clone + PartialEq,
    {
        let mut t = self.transient();
        for v in values {
            t.remove_mut(v)?;
        }
        Ok(t.persistent())
    }

    /// Removes every element of `values`, ignoring ones that are absent.
    pub fn discardall<'v, I: IntoIterator<Item = &'v V>>(&self, values: I) -> Self
    where
        V: 'v + Hash + Clone + PartialEq,
    {
        let mut t = self.transient();
        for v in values {
            t.discard_mut(v);
        }
        t.persistent()
    }

    pub fn union(&self, other: &Self) -> Self
    where
        V: Hash + Clone + PartialEq,
    {
        let mut t = self.transient();
        for v in other.iter() {
            t.add_mut(v.clone());
        }
        t.persistent()
    }

    pub fn intersection(&self, other: &Self) -> Self
    where
        V: Hash + Clone + PartialEq,
    {
        let mut t = PSet::new().transient();
        for v in self.iter() {
            if other.contains(v) {
                t.add_mut(v.clone());
            }
        }
        t.persistent()
    }

    pub fn difference(&self, other: &Self) -> Self
    where
        V: Hash + Clone + PartialEq,
    {
        let mut t = PSet::new().transient();
        for v in self.iter() {
            if !other.contains(v) {
                t.add_mut(v.clone());
            }
        }
        t.persistent()
    }

    pub fn symmetric_difference(&self, other: &Self) -> Self
    where
        V: Hash + Clone + PartialEq,
    {
        let mut t = PSet::new().transient();
        for v in self.iter() {
            if !other.contains(v) {
                t.add_mut(v.clone());
            }
        }
        for v in other.iter() {
            if !self.contains(v) {
                t.add_mut(v.clone());
            }
        }
        t.persistent()
    }

    pub fn is_disjoint(&self, other: &Self) -> bool
    where
        V: Hash + PartialEq,
    {
        self.iter().all(|v| !other.contains(v))
    }

    /// Orders `self` against `other` by subset/superset/equality,
    /// iterating whichever side is smaller.
    pub fn compare(&self, other: &Self) -> SetOrdering
    where
        V: Hash + PartialEq,
    {
        if self.len() <= other.len() {
            set_compare(self.len(), other.len(), self.iter(), |v| other.contains(v))
        } else {
            match set_compare(other.len(), self.len(), other.iter(), |v| self.contains(v)) {
                SetOrdering::Subset => SetOrdering::Superset,
                SetOrdering::Superset => SetOrdering::Subset,
                same => same,
            }
        }
    }

    pub fn transient(&self) -> TSet<V> {
        TSet::from_persistent(self)
    }

    pub fn iter(&self) -> Iter<'_, V> {
        Iter { set: self, slot: 0 }
    }

    /// An order-independent hash over the set's elements, cached after
    /// first computation.
    pub fn hash_value(&self) -> u64
    where
        V: Hash,
    {
        *self.hash_cache.get_or_init(|| {
            let mut acc: u64 = 0;
            for v in self.iter() {
                acc ^= hash_of(v);
            }
            acc ^ (self.len() as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15)
        })
    }
}

impl<V> Clone for PSet<V> {
    fn clone(&self) -> Self {
        PSet {
            els: self.els.clone(),
            idx: self.idx.clone(),
            top: self.top,
            hash_cache: self.hash_cache.clone(),
        }
    }
}

impl<V> Default for PSet<V> {
    fn default() -> Self {
        PSet::new()
    }
}

pub struct Iter<'a, V> {
    set: &'a PSet<V>,
    slot: u64,
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<&'a V> {
        while self.slot < self.set.top {
            let s = self.slot;
            self.slot += 1;
            if let Some(entry) = self.set.els.get(s) {
                return Some(&entry.payload);
            }
        }
        None
    }
}

impl<V: Hash + PartialEq> PartialEq for PSet<V> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|v| other.contains(v))
    }
}

impl<V: Hash + PartialEq> Eq for PSet<V> {}

impl<V: Hash + PartialEq> PartialEq<TSet<V>> for PSet<V> {
    fn eq(&self, other: &TSet<V>) -> bool {
        self.len() == other.len() && self.iter().all(|v| other.contains(v))
    }
}

impl<V: std::fmt::Debug> std::fmt::Debug for PSet<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let rendered = crate::compare::render(self.iter(), 60, "{|", "|}", ", ", |v| {
            format!("{:?}", v)
        });
        f.write_str(&rendered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn of_dedupes_and_preserves_insertion_order() {
        let s = PSet::of(vec![3, 1, 3, 2]);
        let got: Vec<i32> = s.iter().copied().collect();
        assert_eq!(got, vec![3, 1, 2]);
    }

    #[test]
    fn add_and_remove_are_structural() {
        let a = PSet::of(vec![1, 2]);
        let b = a.add(3);
        assert_eq!(b.len(), 3);
        assert_eq!(a.len(), 2);
        let c = b.remove(&2).unwrap();
        assert_eq!(c.iter().copied().collect::<Vec<_>>(), vec![1, 3]);
        assert!(b.remove(&99).is_err());
    }

    #[test]
    fn set_algebra() {
        let a = PSet::of(vec![1, 2, 3]);
        let b = PSet::of(vec![2, 3, 4]);
        let mut u: Vec<i32> = a.union(&b).iter().copied().collect();
        u.sort();
        assert_eq!(u, vec![1, 2, 3, 4]);
        let mut i: Vec<i32> = a.intersection(&b).iter().copied().collect();
        i.sort();
        assert_eq!(i, vec![2, 3]);
        let mut d: Vec<i32> = a.difference(&b).iter().copied().collect();
        d.sort();
        assert_eq!(d, vec![1]);
        let mut sd: Vec<i32> = a.symmetric_difference(&b).iter().copied().collect();
        sd.sort();
        assert_eq!(sd, vec![1, 4]);
        assert!(!a.is_disjoint(&b));
        assert!(a.is_disjoint(&PSet::of(vec![5, 6])));
    }

    #[test]
    fn compare_reports_subset_superset_and_equal() {
        let a = PSet::of(vec![1, 2]);
        let b = PSet::of(vec![1, 2, 3]);
        assert_eq!(a.compare(&b), SetOrdering::Subset);
        assert_eq!(b.compare(&a), SetOrdering::Superset);
        assert_eq!(a.compare(&a.clone()), SetOrdering::Equal);
        assert_eq!(a.compare(&PSet::of(vec![9, 10])), SetOrdering::Disjoint);
    }

    #[test]
    fn pop_removes_earliest_inserted() {
        let a = PSet::of(vec![10, 20, 30]);
        let (b, v) = a.pop().unwrap();
        assert_eq!(v, 10);
        assert_eq!(b.iter().copied().collect::<Vec<_>>(), vec![20, 30]);
    }

    #[test]
    fn hash_value_is_order_independent() {
        let a = PSet::of(vec![1, 2, 3]);
        let b = PSet::of(vec![3, 2, 1]);
        assert_eq!(a.hash_value(), b.hash_value());
    }

    #[test]
    fn addall_ignores_values_already_present() {
        let a = PSet::of(vec![1, 2]);
        let b = a.addall(vec![2, 3]);
        assert_eq!(b.iter().copied().collect::<Vec<_>>(), vec![1, 2, 3]);
        assert_eq!(a.len(), 2);
    }

    #[test]
    fn removeall_fails_on_first_absent_value_leaving_original_untouched() {
        let a = PSet::of(vec![1, 2, 3]);
        assert!(a.removeall(&[1, 99]).is_err());
        assert_eq!(a.len(), 3);
        let b = a.removeall(&[1, 2]).unwrap();
        assert_eq!(b.iter().copied().collect::<Vec<_>>(), vec![3]);
    }

    #[test]
    fn discardall_ignores_absent_values() {
        let a = PSet::of(vec![1, 2, 3]);
        let b = a.discardall(&[2, 99]);
        assert_eq!(b.iter().copied().collect::<Vec<_>>(), vec![1, 3]);
        assert_eq!(a.len(), 3);
    }
}
