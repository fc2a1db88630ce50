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

use super::persistent::PSet;
use crate::entry::Entry;
use crate::error::{Error, Result};
use crate::hamt::TransientHamt;
use crate::hash::hash_value;

/// Finds the slot in `els`'s collision chain (starting at `head`) holding
/// `value`, without mutating anything.
pub(super) fn find_slot<V: PartialEq>(
    els: &TransientHamt<Entry<V>>,
    head: Option<u64>,
    value: &V,
) -> Option<u64> {
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

/// Removes `value`'s entry from its collision chain, relinking whichever
/// predecessor pointed at it (the chain's head in `idx`, or another
/// entry's `next`). Requires `V: Clone` only because relinking a
/// non-head predecessor means rebuilding its `Entry` with the same
/// payload and a new `next`.
fn unlink<V: Clone + PartialEq>(
    els: &mut TransientHamt<Entry<V>>,
    idx: &mut TransientHamt<u64>,
    hash: u64,
    value: &V,
) -> Option<V> {
    let mut prev: Option<u64> = None;
    let mut cur = idx.get(hash).copied();
    while let Some(s) = cur {
        let (is_match, next, payload) = {
            let entry = els.get(s).expect("chain slot must exist");
            (entry.payload == *value, entry.next, entry.payload.clone())
        };
        if is_match {
            els.dissoc(s);
            match prev {
                Some(p) => {
                    let p_payload = els.get(p).expect("chain slot must exist").payload.clone();
                    els.assoc(
                        p,
                        Arc::new(Entry {
                            payload: p_payload,
                            next,
                        }),
                    );
                }
                None => match next {
                    Some(n) => {
                        idx.assoc(hash, Arc::new(n));
                    }
                    None => {
                        idx.dissoc(hash);
                    }
                },
            }
            return Some(payload);
        }
        prev = Some(s);
        cur = next;
    }
    None
}

/// A mutable set opened from a [`PSet`].
pub struct TSet<V> {
    els: TransientHamt<Entry<V>>,
    idx: TransientHamt<u64>,
    top: u64,
    /// The persistent set this transient was opened from. Cleared by the
    /// first structural mutation; while still present, `persistent()`
    /// returns it directly instead of freezing.
    pub orig: Option<PSet<V>>,
}

impl<V> TSet<V> {
    pub fn new() -> Self {
        TSet {
            els: TransientHamt::new(),
            idx: TransientHamt::new(),
            top: 0,
            orig: None,
        }
    }

    pub(crate) fn from_persistent(p: &PSet<V>) -> Self {
        let (els, idx, top) = p.parts();
        TSet {
            els: els.into_transient(),
            idx: idx.into_transient(),
            top,
            orig: Some(p.clone()),
        }
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
        let h = hash_value(v);
        find_slot(&self.els, self.idx.get(h).copied(), v).is_some()
    }

    /// Inserts `v`. Returns `true` if it was not already present.
    pub fn add_mut(&mut self, v: V) -> bool
    where
        V: Hash + PartialEq,
    {
        let h = hash_value(&v);
        let head = self.idx.get(h).copied();
        if find_slot(&self.els, head, &v).is_some() {
            return false;
        }
        self.orig = None;
        let slot = self.top;
        self.top += 1;
        self.els.assoc(slot, Arc::new(Entry { payload: v, next: head }));
        self.idx.assoc(h, Arc::new(slot));
        true
    }

    /// Removes `v` if present, silently doing nothing if it is absent.
    /// Returns `true` if it was removed.
    pub fn discard_mut(&mut self, v: &V) -> bool
    where
        V: Hash + Clone + PartialEq,
    {
        let h = hash_value(v);
        let removed = unlink(&mut self.els, &mut self.idx, h, v);
        if removed.is_some() {
            self.orig = None;
        }
        removed.is_some()
    }

    /// Removes `v`, failing with [`Error::KeyMissing`] if it is absent.
    pub fn remove_mut(&mut self, v: &V) -> Result<()>
    where
        V: Hash + Clone + PartialEq,
    {
        let h = hash_value(v);
        let removed = unlink(&mut self.els, &mut self.idx, h, v).map(|_| ());
        if removed.is_some() {
            self.orig = None;
        }
        removed.ok_or(Error::KeyMissing)
    }

    /// Removes and returns the earliest-inserted element still present.
    pub fn pop_mut(&mut self) -> Result<V>
    where
        V: Hash + Clone + PartialEq,
    {
        let slot = (0..self.top)
            .find(|&s| self.els.get(s).is_some())
            .ok_or(Error::KeyMissing)?;
        let payload = self.els.get(slot).expect("slot located by scan").payload.clone();
        let h = hash_value(&payload);
        let removed = unlink(&mut self.els, &mut self.idx, h, &payload);
        if removed.is_some() {
            self.orig = None;
        }
        removed.ok_or(Error::KeyMissing)
    }

    /// Adds every element of `values`, ignoring ones already present.
    pub fn addall_mut<I: IntoIterator<Item = V>>(&mut self, values: I)
    where
        V: Hash + PartialEq,
    {
        for v in values {
            self.add_mut(v);
        }
    }

    /// Removes every element of `values`, failing at the first one that is
    /// absent.
    pub fn removeall_mut<'v, I: IntoIterator<Item = &'v V>>(&mut self, values: I) -> Result<()>
    where
        V: 'v + Hash + Clone + PartialEq,
    {
        for v in values {
            self.remove_mut(v)?;
        }
        Ok(())
    }

    /// Removes every element of `values`, ignoring ones that are absent.
    pub fn discardall_mut<'v, I: IntoIterator<Item = &'v V>>(&mut self, values: I)
    where
        V: 'v + Hash + Clone + PartialEq,
    {
        for v in values {
            self.discard_mut(v);
        }
    }

    pub fn clear_mut(&mut self) {
        self.orig = None;
        self.els = TransientHamt::new();
        self.idx = TransientHamt::new();
        self.top = 0;
    }

    /// Freezes this transient into a persistent snapshot. Returns `orig`
    /// directly, with no allocation, if no structural mutation has
    /// happened since this transient was opened.
    pub fn persistent(self) -> PSet<V> {
        if let Some(orig) = self.orig {
            return orig;
        }
        PSet::from_parts(self.els.into_persistent(), self.idx.into_persistent(), self.top)
    }

    pub fn iter(&self) -> Iter<'_, V> {
        Iter {
            set: self,
            slot: 0,
        }
    }
}

impl<V> Default for TSet<V> {
    fn default() -> Self {
        TSet::new()
    }
}

/// In-place union: every element of `other` not already present is added.
impl<V: Hash + Clone + PartialEq> std::ops::BitOrAssign<&PSet<V>> for TSet<V> {
    fn bitor_assign(&mut self, other: &PSet<V>) {
        self.addall_mut(other.iter().cloned());
    }
}

/// In-place intersection: any element of `self` absent from `other` is
/// discarded.
impl<V: Hash + Clone + PartialEq> std::ops::BitAndAssign<&PSet<V>> for TSet<V> {
    fn bitand_assign(&mut self, other: &PSet<V>) {
        let to_remove: Vec<V> = self.iter().filter(|v| !other.contains(v)).cloned().collect();
        for v in &to_remove {
            self.discard_mut(v);
        }
    }
}

/// In-place difference: every element of `other` is discarded from `self`.
impl<V: Hash + Clone + PartialEq> std::ops::SubAssign<&PSet<V>> for TSet<V> {
    fn sub_assign(&mut self, other: &PSet<V>) {
        self.discardall_mut(other.iter());
    }
}

/// In-place symmetric difference: an element present in both is discarded,
/// one present in only `other` is added.
impl<V: Hash + Clone + PartialEq> std::ops::BitXorAssign<&PSet<V>> for TSet<V> {
    fn bitxor_assign(&mut self, other: &PSet<V>) {
        for v in other.iter() {
            if self.contains(v) {
                self.discard_mut(v);
            } else {
                self.add_mut(v.clone());
            }
        }
    }
}

pub struct Iter<'a, V> {
    set: &'a TSet<V>,
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

impl<V: Hash + PartialEq> PartialEq for TSet<V> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|v| other.contains(v))
    }
}

impl<V: Hash + PartialEq> PartialEq<PSet<V>> for TSet<V> {
    fn eq(&self, other: &PSet<V>) -> bool {
        other == self
    }
}

impl<V: std::fmt::Debug> std::fmt::Debug for TSet<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let rendered = crate::compare::render(self.iter(), 60, "{<", ">}", ", ", |v| {
            format!("{:?}", v)
        });
        f.write_str(&rendered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_dedupes_and_preserves_insertion_order() {
        let mut t: TSet<i32> = TSet::new();
        t.add_mut(3);
        t.add_mut(1);
        t.add_mut(3);
        t.add_mut(2);
        let got: Vec<i32> = t.iter().copied().collect();
        assert_eq!(got, vec![3, 1, 2]);
        assert_eq!(t.len(), 3);
    }

    #[test]
    fn discard_is_noop_when_absent_remove_errors() {
        let mut t: TSet<i32> = TSet::new();
        t.add_mut(1);
        assert!(!t.discard_mut(&99));
        assert!(t.discard_mut(&1));
        assert!(t.remove_mut(&5).is_err());
    }

    #[test]
    fn pop_removes_earliest_inserted() {
        let mut t: TSet<i32> = TSet::new();
        t.add_mut(10);
        t.add_mut(20);
        t.add_mut(30);
        assert_eq!(t.pop_mut().unwrap(), 10);
        assert_eq!(t.pop_mut().unwrap(), 20);
        assert_eq!(t.len(), 1);
    }

    #[test]
    fn remove_from_middle_of_collision_chain_relinks_correctly() {
        // Force collisions by using a key type whose Hash always collides.
        #[derive(Clone, PartialEq, Eq, Debug)]
        struct AllSameHash(i32);
        impl std::hash::Hash for AllSameHash {
            fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
                0u8.hash(state);
            }
        }
        let mut t: TSet<AllSameHash> = TSet::new();
        t.add_mut(AllSameHash(1));
        t.add_mut(AllSameHash(2));
        t.add_mut(AllSameHash(3));
        assert!(t.remove_mut(&AllSameHash(2)).is_ok());
        let got: Vec<i32> = t.iter().map(|x| x.0).collect();
        assert_eq!(got, vec![1, 3]);
        assert!(t.contains(&AllSameHash(1)));
        assert!(t.contains(&AllSameHash(3)));
        assert!(!t.contains(&AllSameHash(2)));
    }

    #[test]
    fn addall_mut_ignores_values_already_present() {
        let mut t: TSet<i32> = TSet::new();
        t.add_mut(1);
        t.addall_mut(vec![1, 2, 3]);
        assert_eq!(t.iter().copied().collect::<Vec<_>>(), vec![1, 2, 3]);
    }

    #[test]
    fn removeall_mut_fails_on_first_absent_value() {
        let mut t: TSet<i32> = TSet::new();
        t.addall_mut(vec![1, 2, 3]);
        assert!(t.removeall_mut(&[1, 99]).is_err());
        assert!(!t.contains(&1));
        assert!(t.contains(&2));
    }

    #[test]
    fn discardall_mut_ignores_absent_values() {
        let mut t: TSet<i32> = TSet::new();
        t.addall_mut(vec![1, 2, 3]);
        t.discardall_mut(&[2, 99]);
        assert_eq!(t.iter().copied().collect::<Vec<_>>(), vec![1, 3]);
    }

    #[test]
    fn bitor_assign_adds_missing_elements() {
        let mut t: TSet<i32> = TSet::new();
        t.addall_mut(vec![1, 2]);
        t |= &PSet::of(vec![2, 3]);
        assert_eq!(t.iter().copied().collect::<Vec<_>>(), vec![1, 2, 3]);
    }

    #[test]
    fn bitand_assign_keeps_only_shared_elements() {
        let mut t: TSet<i32> = TSet::new();
        t.addall_mut(vec![1, 2, 3]);
        t &= &PSet::of(vec![2, 3, 4]);
        let mut got: Vec<i32> = t.iter().copied().collect();
        got.sort_unstable();
        assert_eq!(got, vec![2, 3]);
    }

    #[test]
    fn sub_assign_discards_elements_present_in_other() {
        let mut t: TSet<i32> = TSet::new();
        t.addall_mut(vec![1, 2, 3]);
        t -= &PSet::of(vec![2]);
        assert_eq!(t.iter().copied().collect::<Vec<_>>(), vec![1, 3]);
    }

    #[test]
    fn orig_is_cleared_by_structural_mutation() {
        let p = PSet::of(vec![1, 2]);
        let mut t = p.transient();
        t.add_mut(3);
        assert!(t.orig.is_none());
    }

    #[test]
    fn persistent_returns_orig_directly_when_untouched() {
        let p = PSet::of(vec![1, 2]);
        let t = p.transient();
        let q = t.persistent();
        assert!(std::ptr::eq(p.iter().next().unwrap(), q.iter().next().unwrap()));
    }

    #[test]
    fn bitxor_assign_keeps_elements_in_exactly_one_side() {
        let mut t: TSet<i32> = TSet::new();
        t.addall_mut(vec![1, 2]);
        t ^= &PSet::of(vec![2, 3]);
        let mut got: Vec<i32> = t.iter().copied().collect();
        got.sort_unstable();
        assert_eq!(got, vec![1, 3]);
    }
}
