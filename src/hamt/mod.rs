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

//! A persistent hash array-mapped trie keyed by 64-bit integers, with a
//! mutable transient twin that shares subtrees with its persistent origin.
//!
//! This is the L0 primitive every container in the crate is built from:
//! the list keys by contiguous slot, the set and map key by insertion slot
//! (`els`) and by value hash (`idx`). The HAMT itself never hashes its
//! keys further — callers decide what a key means (a list index, an
//! insertion slot, or an element hash); the trie just routes on the bits
//! of whatever 64-bit integer it is given.

mod node;

use node::{freeze, node_get, node_get_arc, slot_assoc_mut, slot_dissoc_mut, Iter as NodeIter, NodeRef};
use std::sync::Arc;

pub(crate) use node::{ARITY, BITS};

/// An immutable hash array-mapped trie. Cloning an `Hamt` is `O(1)` (an
/// `Arc` clone of the root); two `Hamt`s produced by editing a common
/// ancestor share every subtree neither edit touched.
#[derive(Debug)]
pub(crate) struct Hamt<V> {
    root: Option<NodeRef<V>>,
    len: usize,
}

impl<V> Clone for Hamt<V> {
    fn clone(&self) -> Self {
        Hamt {
            root: self.root.as_ref().map(|n| match n {
                NodeRef::Shared(arc) => NodeRef::Shared(arc.clone()),
                NodeRef::Owned(_) => {
                    unreachable!("a persistent Hamt's root is always Shared")
                }
            }),
            len: self.len,
        }
    }
}

impl<V> Default for Hamt<V> {
    fn default() -> Self {
        Hamt::new()
    }
}

impl<V> Hamt<V> {
    /// The canonical empty trie.
    pub(crate) fn new() -> Self {
        Hamt { root: None, len: 0 }
    }

    pub(crate) fn len(&self) -> usize {
        self.len
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub(crate) fn get(&self, key: u64) -> Option<&V> {
        self.root.as_ref().and_then(|n| node_get(n, key, 0))
    }

    pub(crate) fn contains_key(&self, key: u64) -> bool {
        self.get(key).is_some()
    }

    /// Returns the stored `Arc` for `key`, for callers that need to test
    /// pointer identity rather than just read the value.
    pub(crate) fn get_arc(&self, key: u64) -> Option<Arc<V>> {
        self.root.as_ref().and_then(|n| node_get_arc(n, key, 0))
    }

    /// Returns a new trie with `key` mapped to `value`, sharing every
    /// subtree not on the path to `key`. Implemented by opening a
    /// transient over `self` (an `O(1)` reuse of the root), mutating it
    /// (which clones only the spine, via
    /// [`node::ensure_owned`](node::ensure_owned)'s clone-on-write), and
    /// freezing the result (`O(log n)`, reusing every untouched subtree as
    /// a `Shared` `Arc`) — the same net complexity as a hand-written
    /// immutable path-copy, with one fewer algorithm to maintain.
    pub(crate) fn assoc(&self, key: u64, value: Arc<V>) -> Self {
        let mut transient = self.clone().into_transient();
        transient.assoc(key, value);
        transient.into_persistent()
    }

    pub(crate) fn dissoc(&self, key: u64) -> Self {
        let mut transient = self.clone().into_transient();
        transient.dissoc(key);
        transient.into_persistent()
    }

    pub(crate) fn iter(&self) -> NodeIter<'_, V> {
        NodeIter::new(self.root.as_ref())
    }

    /// Opens a transient over `self`. `O(1)`: the root is reused as
    /// `Shared`, nothing is cloned until the transient is actually
    /// mutated.
    pub(crate) fn into_transient(self) -> TransientHamt<V> {
        TransientHamt {
            root: self.root,
            len: self.len,
        }
    }
}

/// A mutable, single-owner trie opened from a [`Hamt`]. Mutations clone
/// only the spine they touch (clone-on-write over `Shared` nodes);
/// everything else keeps pointing at the origin's subtrees until
/// [`into_persistent`](TransientHamt::into_persistent) freezes the result.
#[derive(Debug)]
pub(crate) struct TransientHamt<V> {
    root: Option<NodeRef<V>>,
    len: usize,
}

impl<V> TransientHamt<V> {
    pub(crate) fn new() -> Self {
        TransientHamt { root: None, len: 0 }
    }

    pub(crate) fn len(&self) -> usize {
        self.len
    }

    pub(crate) fn get(&self, key: u64) -> Option<&V> {
        self.root.as_ref().and_then(|n| node_get(n, key, 0))
    }

    /// Returns the stored `Arc` for `key` (cloned, a refcount bump), for
    /// callers that want to re-key an entry without cloning its value.
    pub(crate) fn get_arc(&self, key: u64) -> Option<Arc<V>> {
        self.root.as_ref().and_then(|n| node_get_arc(n, key, 0))
    }

    /// Inserts or replaces `key`. Returns `true` if the entry count grew.
    pub(crate) fn assoc(&mut self, key: u64, value: Arc<V>) -> bool {
        let grew = slot_assoc_mut(&mut self.root, key, value, 0);
        if grew {
            self.len += 1;
        }
        grew
    }

    /// Removes `key`, applying the collapsing rule. Returns `true` if an
    /// entry was actually removed.
    pub(crate) fn dissoc(&mut self, key: u64) -> bool {
        let removed = slot_dissoc_mut(&mut self.root, key, 0);
        if removed {
            self.len -= 1;
        }
        removed
    }

    pub(crate) fn iter(&self) -> NodeIter<'_, V> {
        NodeIter::new(self.root.as_ref())
    }

    /// Freezes the transient into a persistent snapshot. `O(log n)`: only
    /// the `Owned` nodes created by this transient's mutations are
    /// converted into freshly allocated `Arc`s; any subtree still `Shared`
    /// with the origin is returned untouched.
    pub(crate) fn into_persistent(self) -> Hamt<V> {
        let _span = tracing::trace_span!("hamt_freeze", len = self.len).entered();
        Hamt {
            root: self.root.map(|n| NodeRef::Shared(freeze(n))),
            len: self.len,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_is_empty() {
        let h = Hamt::<i32>::new();
        assert_eq!(h.len(), 0);
        assert!(h.is_empty());
        assert_eq!(h.get(0), None);
    }

    #[test]
    fn assoc_then_get() {
        let h = Hamt::new();
        let h = h.assoc(10, Arc::new("ten"));
        assert_eq!(h.get(10), Some(&"ten"));
        assert_eq!(h.len(), 1);
    }

    #[test]
    fn assoc_shares_structure() {
        let mut h = Hamt::new();
        for i in 0..1000u64 {
            h = h.assoc(i, Arc::new(i));
        }
        let h2 = h.assoc(500, Arc::new(99999u64));
        // Original trie is untouched.
        assert_eq!(h.get(500), Some(&500));
        assert_eq!(h2.get(500), Some(&99999));
        assert_eq!(h.len(), 1000);
        assert_eq!(h2.len(), 1000);
        // Every other key is shared, not recomputed.
        for i in (0..1000u64).filter(|&i| i != 500) {
            assert_eq!(h.get(i), h2.get(i));
        }
    }

    #[test]
    fn dissoc_then_missing() {
        let mut h = Hamt::new();
        for i in 0..50u64 {
            h = h.assoc(i, Arc::new(i));
        }
        let h2 = h.dissoc(25);
        assert_eq!(h2.get(25), None);
        assert_eq!(h2.len(), 49);
        // `h` is unaffected (persistent).
        assert_eq!(h.get(25), Some(&25));
        assert_eq!(h.len(), 50);
    }

    #[test]
    fn transient_round_trip_is_o1_then_mutates_in_place() {
        let mut h = Hamt::new();
        for i in 0..10u64 {
            h = h.assoc(i, Arc::new(i));
        }
        let mut t = h.clone().into_transient();
        t.assoc(10, Arc::new(10));
        t.assoc(11, Arc::new(11));
        t.dissoc(0);
        let h2 = t.into_persistent();
        assert_eq!(h2.len(), 11);
        assert_eq!(h2.get(0), None);
        assert_eq!(h2.get(10), Some(&10));
        assert_eq!(h2.get(11), Some(&11));
        // Original is untouched.
        assert_eq!(h.len(), 10);
        assert_eq!(h.get(0), Some(&0));
    }

    #[test]
    fn iter_yields_every_entry() {
        let mut h = Hamt::new();
        for i in 0..300u64 {
            h = h.assoc(i, Arc::new(i * i));
        }
        let mut got: Vec<(u64, u64)> = h.iter().map(|(k, v)| (k, *v)).collect();
        got.sort_unstable();
        let expected: Vec<(u64, u64)> = (0..300).map(|i| (i, i * i)).collect();
        assert_eq!(got, expected);
    }

    /// Generates one `assoc`-then-`get` smoke test per value type, so
    /// adding a new type under test is a one-line macro invocation
    /// instead of a hand-copied test function.
    macro_rules! assoc_get_smoke_test {
        ($name:ident, $ty:ty, $val:expr) => {
            paste::paste! {
                #[test]
                fn [<assoc_then_get_ $name>]() {
                    let h: Hamt<$ty> = Hamt::new();
                    let h = h.assoc(1, Arc::new($val));
                    assert_eq!(h.get(1), Some(&$val));
                }
            }
        };
    }

    assoc_get_smoke_test!(i32, i32, 42i32);
    assoc_get_smoke_test!(u64, u64, 7u64);
    assoc_get_smoke_test!(string, String, "hamt".to_string());
}
