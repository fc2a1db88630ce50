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

use super::transient::TMap;
use crate::entry::Entry;
use crate::error::Result;
use crate::hamt::Hamt;
use crate::hash::hash_value as hash_of;

fn find_slot<K: PartialEq, V>(els: &Hamt<Entry<(K, V)>>, head: Option<u64>, key: &K) -> Option<u64> {
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

/// An immutable, insertion-ordered key/value association.
///
/// Identical machinery to [`crate::PSet`] (see its doc comment), with
/// `Entry<(K, V)>` payloads and the collision chain keyed by `K` rather
/// than by the whole payload.
pub struct PMap<K, V> {
    pub(super) els: Hamt<Entry<(K, V)>>,
    pub(super) idx: Hamt<u64>,
    pub(super) top: u64,
    hash_cache: OnceCell<u64>,
}

impl<K, V> PMap<K, V> {
    pub fn new() -> Self {
        PMap {
            els: Hamt::new(),
            idx: Hamt::new(),
            top: 0,
            hash_cache: OnceCell::new(),
        }
    }

    pub(crate) fn from_parts(els: Hamt<Entry<(K, V)>>, idx: Hamt<u64>, top: u64) -> Self {
        PMap {
            els,
            idx,
            top,
            hash_cache: OnceCell::new(),
        }
    }

    pub(crate) fn parts(&self) -> (Hamt<Entry<(K, V)>>, Hamt<u64>, u64) {
        (self.els.clone(), self.idx.clone(), self.top)
    }

    pub fn of<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self
    where
        K: Hash + PartialEq,
    {
        let mut t = PMap::new().transient();
        for (k, v) in iter {
            t.set_mut(k, v);
        }
        t.persistent()
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
        let h = hash_of(k);
        find_slot(&self.els, self.idx.get(h).copied(), k).is_some()
    }

    pub fn get(&self, k: &K) -> Option<&V>
    where
        K: Hash + PartialEq,
    {
        let h = hash_of(k);
        let slot = find_slot(&self.els, self.idx.get(h).copied(), k)?;
        Some(&self.els.get(slot).expect("slot located by find_slot").payload.1)
    }

    /// Returns a map with `k` mapped to `v`. Returns `self` unchanged if
    /// `k` is already present with a value equal to `v`.
    pub fn set(&self, k: K, v: V) -> Self
    where
        K: Hash + Clone + PartialEq,
        V: Clone + PartialEq,
    {
        if self.get(&k) == Some(&v) {
            return self.clone();
        }
        let mut t = self.transient();
        t.set_mut(k, v);
        t.persistent()
    }

    /// Removes `k`, returning `self` unchanged if it is absent.
    pub fn drop(&self, k: &K) -> Self
    where
        K: Hash + Clone + PartialEq,
        V: Clone,
    {
        let mut t = self.transient();
        if !t.drop_mut(k) {
            return self.clone();
        }
        t.persistent()
    }

    /// Removes `k`, failing with [`crate::Error::KeyMissing`] if absent.
    pub fn delete(&self, k: &K) -> Result<Self>
    where
        K: Hash + Clone + PartialEq,
        V: Clone,
    {
        let mut t = self.transient();
        t.delete_mut(k)?;
        Ok(t.persistent())
    }

    /// Removes `k`, returning the new map and its former value.
    pub fn pop(&self, k: &K) -> Result<(Self, V)>
    where
        K: Hash + Clone + PartialEq,
        V: Clone,
    {
        let mut t = self.transient();
        let v = t.pop_mut(k)?;
        Ok((t.persistent(), v))
    }

    /// Removes the earliest-inserted `(key, value)` pair.
    pub fn popitem(&self) -> Result<(Self, (K, V))>
    where
        K: Hash + Clone + PartialEq,
        V: Clone,
    {
        let mut t = self.transient();
        let kv = t.popitem_mut()?;
        Ok((t.persistent(), kv))
    }

    /// Returns a map with `k` mapped to `default` if absent, alongside
    /// the value now stored for `k`.
    pub fn setdefault(&self, k: K, default: V) -> (Self, V)
    where
        K: Hash + Clone + PartialEq,
        V: Clone,
    {
        let mut t = self.transient();
        let v = t.setdefault_mut(k, default).clone();
        (t.persistent(), v)
    }

    pub fn update<I: IntoIterator<Item = (K, V)>>(&self, iter: I) -> Self
    where
        K: Hash + Clone + PartialEq,
        V: Clone,
    {
        let mut t = self.transient();
        t.update_mut(iter);
        t.persistent()
    }

    /// Alias for [`update`](Self::update): inserts or overwrites every
    /// `(key, value)` pair from `pairs`.
    pub fn setall<I: IntoIterator<Item = (K, V)>>(&self, pairs: I) -> Self
    where
        K: Hash + Clone + PartialEq,
        V: Clone,
    {
        self.update(pairs)
    }

    /// Drops every key in `keys`, ignoring ones that are absent.
    pub fn dropall<I: IntoIterator<Item = K>>(&self, keys: I) -> Self
    where
        K: Hash + Clone + PartialEq,
        V: Clone,
    {
        let mut t = self.transient();
        for k in keys {
            t.drop_mut(&k);
        }
        t.persistent()
    }

    /// Deletes every key in `keys`, failing at the first one that is
    /// absent.
    pub fn deleteall<I: IntoIterator<Item = K>>(&self, keys: I) -> Result<Self>
    where
        K: Hash + Clone + PartialEq,
        V: Clone,
    {
        let mut t = self.transient();
        for k in keys {
            t.delete_mut(&k)?;
        }
        Ok(t.persistent())
    }

    pub fn clear(&self) -> Self {
        PMap::new()
    }

    pub fn transient(&self) -> TMap<K, V>
    where
        K: Clone,
        V: Clone,
    {
        TMap::from_persistent(self)
    }

    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter { map: self, slot: 0 }
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.iter().map(|(k, _)| k)
    }

    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.iter().map(|(_, v)| v)
    }

    pub fn items(&self) -> Iter<'_, K, V> {
        self.iter()
    }

    /// An order-independent hash over the map's entries, cached after
    /// first computation.
    pub fn hash_value(&self) -> u64
    where
        K: Hash,
        V: Hash,
    {
        *self.hash_cache.get_or_init(|| {
            let mut acc: u64 = 0;
            for (k, v) in self.iter() {
                acc ^= hash_of(k) ^ hash_of(v).rotate_left(1);
            }
            acc ^ (self.len() as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15)
        })
    }
}

impl<K, V> Clone for PMap<K, V> {
    fn clone(&self) -> Self {
        PMap {
            els: self.els.clone(),
            idx: self.idx.clone(),
            top: self.top,
            hash_cache: self.hash_cache.clone(),
        }
    }
}

impl<K, V> Default for PMap<K, V> {
    fn default() -> Self {
        PMap::new()
    }
}

pub struct Iter<'a, K, V> {
    map: &'a PMap<K, V>,
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

impl<K: Hash + PartialEq, V: PartialEq> PartialEq for PMap<K, V> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|(k, v)| other.get(k) == Some(v))
    }
}

impl<K: Hash + PartialEq, V: PartialEq> Eq for PMap<K, V> {}

impl<K: Hash + PartialEq, V: PartialEq> PartialEq<TMap<K, V>> for PMap<K, V> {
    fn eq(&self, other: &TMap<K, V>) -> bool {
        self.len() == other.len() && self.iter().all(|(k, v)| other.get(k) == Some(v))
    }
}

impl<K: std::fmt::Debug, V: std::fmt::Debug> std::fmt::Debug for PMap<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let rendered = crate::compare::render(self.iter(), 60, "{|", "|}", ", ", |(k, v)| {
            format!("{:?}: {:?}", k, v)
        });
        f.write_str(&rendered)
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use quickcheck_macros::quickcheck;

    /// `p.set(k, v).get(k) == v`.
    #[quickcheck]
    fn set_then_get_returns_the_set_value(pairs: Vec<(i32, i32)>, k: i32, v: i32) -> bool {
        let p = PMap::of(pairs);
        p.set(k, v).get(&k) == Some(&v)
    }

    /// `p.set(k, v).drop(k) == p` iff `k` was absent from `p` beforehand.
    #[quickcheck]
    fn set_then_drop_restores_original_iff_key_was_fresh(pairs: Vec<(i32, i32)>, k: i32, v: i32) -> bool {
        let p = PMap::of(pairs);
        let restored = p.set(k, v).drop(&k);
        (restored == p) == !p.contains_key(&k)
    }
}
