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

//! Insertion-ordered key/value associations: [`PMap`] (persistent) and
//! [`TMap`] (transient), built on the same slot/chain layout as
//! `crate::set`, keyed by `K` instead of by the whole payload.

mod persistent;
mod transient;

pub use persistent::PMap;
pub use transient::TMap;
