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

//! The error kinds shared by every persistent and transient container.

use std::fmt;

/// Every way an operation on a container in this crate can fail.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A list access or mutation fell outside the valid index range.
    #[error("index {index} is out of range for a sequence of length {len}")]
    IndexOutOfRange {
        /// The index that was requested.
        index: i64,
        /// The length of the sequence at the time of the request.
        len: usize,
    },
    /// `remove`/`delete`/`pop` (without a default) targeted an absent
    /// key or element.
    #[error("key or element is missing from the container")]
    KeyMissing,
    /// An operand had the wrong type for a comparison, arithmetic, or
    /// iteration operation.
    #[error("type mismatch: {0}")]
    TypeMismatch(String),
    /// A variadic constructor or `pop` received more arguments than
    /// documented.
    #[error("expected at most {max} argument(s), got {got}")]
    ArityError {
        /// The documented maximum.
        max: usize,
        /// The number of arguments actually supplied.
        got: usize,
    },
    /// A transient's iterator observed a structural mutation mid-walk.
    #[error("transient container was mutated during iteration")]
    MutatedDuringIteration,
    /// A lazy cell's thunk raised. The message is the diagnostic captured
    /// at the cell's construction site; the live thunk error is preserved
    /// as [`std::error::Error::source`].
    #[error("lazy evaluation failed (constructed at {construction_site})")]
    LazyEvaluationFailed {
        /// Where the cell was created, captured so a later failure can be
        /// attributed back to construction rather than to the use site
        /// that happened to trigger evaluation.
        construction_site: String,
        /// The error the thunk actually raised.
        #[source]
        cause: Box<dyn std::error::Error + Send + Sync + 'static>,
    },
    /// A lazy cell observed itself already evaluating on the same logical
    /// call stack.
    #[error("cycle detected while evaluating a lazy cell")]
    CycleDetected,
}

impl Error {
    pub(crate) fn index_out_of_range(index: i64, len: usize) -> Self {
        Error::IndexOutOfRange { index, len }
    }

    pub(crate) fn type_mismatch(msg: impl fmt::Display) -> Self {
        Error::TypeMismatch(msg.to_string())
    }
}

/// The `Result` alias used by every fallible operation in this crate.
pub type Result<T> = std::result::Result<T, Error>;
