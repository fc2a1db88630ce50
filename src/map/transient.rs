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

use super::persistent::PMap;
use crate::entry::Entry;
use crate::error::{Error, Result};
use crate::hamt::TransientHamt;
use crate::hash::hash_value;

/// Same slot/chain layout as the set (see `crate::set::transient`), keyed
/// by `K` rather than by the whole payload.
pub(super) fn find_slot<K: PartialEq, V>(
    els: &TransientHamt<Entry<(K, V)>>,
    head: Option<u64>,
    key: &K,
) -> Option<u64> {
    let mut cur = head;
    while let Some(s) = cur {
        let entry = els.get(s).expect("chain slot must exist");
        if entry.payload.0 == *key {
            return Some(s);
        }
        cur = entry.next;
    }
    None
}

fn unlink<K: Clone + PartialEq, V: Clone>(
    els: &mut TransientHamt<Entry<(K, V)>>,
    idx: &mut TransientHamt<u64>,
    hash: u64,
    key: &K,
) -> Option<(K, V)> {
    let mut prev: Option<u64> = None;
    let mut cur = idx.get(hash).copied();
    while let Some(s) = cur {
        let (is_match, next, payload) = {
            let entry = els.get(s).expect("chain slot must exist");
            (entry.payload.0 == *key, entry.next, entry.payload.clone())
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

/// A mutable map opened from a [`PMap`].
pub struct TMap<K, V> {
    els: TransientHamt<Entry<(K, V)>>,
    idx: TransientHamt<u64>,
    top: u64,
    /// The persistent map this transient was opened from. Cleared by the
    /// first structural mutation; while still present, `persistent()`
    /// returns it directly instead of freezing.
    pub orig: Option<PMap<K, V>>,
}

impl<K, V> TMap<K, V> {
    pub fn new() -> Self {
        TMap {
            els: TransientHamt::new(),
            idx: TransientHamt::new(),
            top: 0,
            orig: None,
        }
    }

    pub(crate) fn from_persistent(p: &PMap<K, V>) -> Self
    where
        K: Clone,
        V: Clone,
    {
        let (els, idx, top) = p.parts();
        TMap {
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

    pub fn contains_key(&self, k: &K) -> bool
    where
        K: Hash + PartialEq,
    {
        let h = hash_value(k);
        find_slot(&self.els, self.idx.get(h).copied(), k).is_some()
    }

    pub fn get(&self, k: &K) -> Option<&V>
    where
        K: Hash + PartialEq,
    {
        let h = hash_value(k);
        let slot = find_slot(&self.els, self.idx.get(h).copied(), k)?;
        Some(&self.els.get(slot).expect("slot located by find_slot").payload.1)
    }

    /// Inserts or overwrites the value for `k`. Returns `true` if the key
    /// is new.
    pub fn set_mut(&mut self, k: K, v: V) -> bool
    where
        K: Hash + PartialEq,
    {
        let h = hash_value(&k);
        let head = self.idx.get(h).copied();
        self.orig = None;
        if let Some(slot) = find_slot(&self.els, head, &k) {
            let next = self.els.get(slot).expect("chain slot must exist").next;
            self.els.assoc(slot, Arc::new(Entry { payload: (k, v), next }));
            false
        } else {
            let slot = self.top;
            self.top += 1;
            self.els.assoc(slot, Arc::new(Entry { payload: (k, v), next: head }));
            self.idx.assoc(h, Arc::new(slot));
            true
        }
    }

    /// Removes `k` if present, silently doing nothing if it is absent.
    /// Returns `true` if it was removed.
    pub fn drop_mut(&mut self, k: &K) -> bool
    where
        K: Hash + Clone + PartialEq,
        V: Clone,
    {
        let h = hash_value(k);
        let removed = unlink(&mut self.els, &mut self.idx, h, k);
        if removed.is_some() {
            self.orig = None;
        }
        removed.is_some()
    }

    /// Removes `k`, failing with [`Error::KeyMissing`] when absent.
    pub fn delete_mut(&mut self, k: &K) -> Result<()>
    where
        K: Hash + Clone + PartialEq,
        V: Clone,
    {
        let h = hash_value(k);
        let removed = unlink(&mut self.els, &mut self.idx, h, k).map(|_| ());
        if removed.is_some() {
            self.orig = None;
        }
        removed.ok_or(Error::KeyMissing)
    }

    /// Removes `k` and returns its value, failing with
    /// [`Error::KeyMissing`] when absent.
    pub fn pop_mut(&mut self, k: &K) -> Result<V>
    where
        K: Hash + Clone + PartialEq,
        V: Clone,
    {
        let h = hash_value(k);
        let removed = unlink(&mut self.els, &mut self.idx, h, k).map(|(_, v)| v);
        if removed.is_some() {
            self.orig = None;
        }
        removed.ok_or(Error::KeyMissing)
    }

    /// Removes and returns the earliest-inserted `(key, value)` pair.
    pub fn popitem_mut(&mut self) -> Result<(K, V)>
    where
        K: Hash + Clone + PartialEq,
        V: Clone,
    {
        let slot = (0..self.top)
            .find(|&s| self.els.get(s).is_some())
            .ok_or(Error::KeyMissing)?;
        let (k, _) = self.els.get(slot).expect("slot located by scan").payload.clone();
        let h = hash_value(&k);
        let removed = unlink(&mut self.els, &mut self.idx, h, &k);
        if removed.is_some() {
            self.orig = None;
        }
        removed.ok_or(Error::KeyMissing)
    }

    pub fn setdefault_mut(&mut self, k: K, default: V) -> &V
    where
        K: Hash + Clone + PartialEq,
        V: Clone,
    {
        let h = hash_value(&k);
        let head = self.idx.get(h).copied();
        if find_slot(&self.els, head, &k).is_none() {
            self.orig = None;
            let slot = self.top;
            self.top += 1;
            self.els.assoc(
                slot,
                Arc::new(Entry {
                    payload: (k.clone(), default),
                    next: head,
                }),
            );
            self.idx.assoc(h, Arc::new(slot));
        }
        self.get(&k).expect("just inserted or already present")
    }

    pub fn update_mut<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I)
    where
        K: Hash + PartialEq,
    {
        for (k, v) in iter {
            self.set_mut(k, v);
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
    pub fn persistent(self) -> PMap<K, V> {
        if let Some(orig) = self.orig {
            return orig;
        }
        PMap::from_parts(self.els.into_persistent(), self.idx.into_persistent(), self.top)
    }

    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter { map: self, slot: 0 }
    }
}

impl<K, V> Default for TMap<K, V> {
    fn default() -> Self {
        TMap::new()
    }
}

pub struct Iter<'a, K, V> {
    map: &'a TMap<K, V>,
    slot: u64,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = &'a (K, V);

    fn next(&mut self) -> Option<&'a (K, V)> {
        while self.slot < self.map.top {
            let s = self.slot;
            self.slot += 1;
            if let Some(entry) = self.map.els.get(s) {
                return Some(&entry.payload);
            }
        }
        None
    }
}

impl<K: Hash + PartialEq, V: PartialEq> PartialEq for TMap<K, V> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|(k, v)| other.get(k) == Some(v))
    }
}

impl<K: Hash + PartialEq, V: PartialEq> PartialEq<PMap<K, V>> for TMap<K, V> {
    fn eq(&self, other: &PMap<K, V>) -> bool {
        other == self
    }
}

impl<K: std::fmt::Debug, V: std::fmt::Debug> std::fmt::Debug for TMap<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let rendered = crate::compare::render(self.iter(), 60, "{<", ">}", ", ", |(k, v)| {
            format!("{:?}: {:?}", k, v)
        });
        f.write_str(&rendered)
    }
}
