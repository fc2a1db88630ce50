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

//! Persistent and transient sequences.
//!
//! Grounded on `ink_storage`'s `storage2::collections::smallvec` module: a
//! contiguous sequence addressed by integer index, backed here by the
//! crate's HAMT instead of a flat cell array so that persistent edits
//! share structure instead of copying the whole backing store.
//!
//! A list's keys into the HAMT are `start + i` for logical index `i`;
//! `start` shifts on `prepend`/front-delete so that growing either end
//! never has to renumber the other.

mod persistent;
mod transient;

pub use persistent::PList;
pub use transient::TList;

pub(crate) fn normalize_index(i: i64, len: usize, allow_len: bool) -> crate::error::Result<i64> {
    let len_i = len as i64;
    let resolved = if i < 0 { i + len_i } else { i };
    let max = if allow_len { len_i } else { len_i - 1 };
    if resolved < 0 || resolved > max {
        return Err(crate::error::Error::index_out_of_range(i, len));
    }
    Ok(resolved)
}
