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

//! Comparators and a truncating renderer shared by every container.
//!
//! Generalized from `pcollections/util/_core.py`'s `setcmp` (kept in
//! `examples/original_source`), which returns one of five sentinel values
//! by iterating the smaller of two sets. Rust has no natural sentinel
//! family for "subset or equal or superset or disjoint or overlapping but
//! incomparable", so [`SetOrdering`] models the five outcomes as a proper
//! enum instead of overloading `Option<Ordering>`.

use std::cmp::Ordering;

/// The outcome of comparing two unordered collections by containment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetOrdering {
    /// `a` is a (possibly equal) subset of `b`.
    Subset,
    /// `a` and `b` contain exactly the same elements.
    Equal,
    /// `a` is a (possibly equal) superset of `b`.
    Superset,
    /// `a` and `b` share no elements.
    Disjoint,
    /// `a` and `b` overlap but neither contains the other.
    Incomparable,
}

/// Compares set `a` to set `b` by containment.
///
/// `iter_a` must yield every element of `a`; `contains_b` must answer
/// membership in `b`. Callers should pass the smaller side as `iter_a` to
/// get the `O(min(|a|, |b|))` behavior the spec asks for — this function
/// itself doesn't know which side is smaller.
pub(crate) fn set_compare<'a, V: 'a>(
    len_a: usize,
    len_b: usize,
    iter_a: impl Iterator<Item = &'a V>,
    contains_b: impl Fn(&V) -> bool,
) -> SetOrdering {
    let mut intersections = 0usize;
    for el in iter_a {
        if contains_b(el) {
            intersections += 1;
        }
    }
    if intersections == 0 {
        match (len_a == 0, len_b == 0) {
            (true, true) => SetOrdering::Equal,
            (true, false) => SetOrdering::Subset,
            (false, true) => SetOrdering::Superset,
            (false, false) => SetOrdering::Disjoint,
        }
    } else if intersections < len_a {
        SetOrdering::Incomparable
    } else if len_a == len_b {
        SetOrdering::Equal
    } else if len_a < len_b {
        SetOrdering::Subset
    } else {
        SetOrdering::Superset
    }
}

/// Lexicographically compares two sequences, falling through to comparing
/// lengths when one is a prefix of the other (the tiebreak the original
/// implementation's `seqcmp` always applied, per `spec.md` §9's resolved
/// open question).
pub(crate) fn seq_compare<'a, T: 'a + PartialOrd>(
    a: impl Iterator<Item = &'a T>,
    b: impl Iterator<Item = &'a T>,
) -> Option<Ordering> {
    let mut a = a;
    let mut b = b;
    loop {
        return match (a.next(), b.next()) {
            (Some(x), Some(y)) => match x.partial_cmp(y) {
                Some(Ordering::Equal) => continue,
                other => other,
            },
            (Some(_), None) => Some(Ordering::Greater),
            (None, Some(_)) => Some(Ordering::Less),
            (None, None) => Some(Ordering::Equal),
        };
    }
}

/// Renders `items` into `prefix ... suffix`, truncating with an ellipsis
/// once the assembled string would exceed `max_len`. Reserves room for the
/// ellipsis up front rather than appending it only after overflowing, so
/// the final string never exceeds `max_len`.
pub(crate) fn render<T>(
    items: impl IntoIterator<Item = T>,
    max_len: usize,
    prefix: &str,
    suffix: &str,
    sep: &str,
    mut repr: impl FnMut(T) -> String,
) -> String {
    const ELLIPSIS: &str = "...";
    let budget = max_len.saturating_sub(prefix.len() + suffix.len() + ELLIPSIS.len());
    let mut body = String::new();
    let mut truncated = false;
    for (i, item) in items.into_iter().enumerate() {
        let piece = repr(item);
        let needed = if i == 0 { piece.len() } else { sep.len() + piece.len() };
        if body.len() + needed > budget {
            truncated = true;
            break;
        }
        if i > 0 {
            body.push_str(sep);
        }
        body.push_str(&piece);
    }
    let mut out = String::with_capacity(prefix.len() + body.len() + suffix.len() + ELLIPSIS.len());
    out.push_str(prefix);
    out.push_str(&body);
    if truncated {
        out.push_str(ELLIPSIS);
    }
    out.push_str(suffix);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_compare_equal() {
        let a = [1, 2, 3];
        let b = [3, 2, 1];
        let ord = set_compare(a.len(), b.len(), a.iter(), |v| b.contains(v));
        assert_eq!(ord, SetOrdering::Equal);
    }

    #[test]
    fn set_compare_subset_and_superset() {
        let small = [1, 2];
        let big = [1, 2, 3];
        assert_eq!(
            set_compare(small.len(), big.len(), small.iter(), |v| big.contains(v)),
            SetOrdering::Subset
        );
        assert_eq!(
            set_compare(big.len(), small.len(), big.iter(), |v| small.contains(v)),
            SetOrdering::Superset
        );
    }

    #[test]
    fn set_compare_disjoint_and_incomparable() {
        let a = [1, 2];
        let b = [3, 4];
        assert_eq!(
            set_compare(a.len(), b.len(), a.iter(), |v| b.contains(v)),
            SetOrdering::Disjoint
        );
        let c = [2, 3];
        assert_eq!(
            set_compare(a.len(), c.len(), a.iter(), |v| c.contains(v)),
            SetOrdering::Incomparable
        );
    }

    #[test]
    fn seq_compare_length_tiebreak() {
        let a = [1, 2];
        let b = [1, 2, 3];
        assert_eq!(seq_compare(a.iter(), b.iter()), Some(Ordering::Less));
        assert_eq!(seq_compare(b.iter(), a.iter()), Some(Ordering::Greater));
        assert_eq!(seq_compare(a.iter(), a.iter()), Some(Ordering::Equal));
    }

    #[test]
    fn render_truncates_with_ellipsis() {
        let items: Vec<i32> = (0..1000).collect();
        let out = render(items, 20, "[|", "|]", ", ", |i| i.to_string());
        assert!(out.len() <= 20);
        assert!(out.starts_with("[|"));
        assert!(out.ends_with("...|]"));
    }

    #[test]
    fn render_no_truncation_when_it_fits() {
        let items = [1, 2, 3];
        let out = render(items, 60, "[|", "|]", ", ", |i| i.to_string());
        assert_eq!(out, "[|1, 2, 3|]");
    }
}
