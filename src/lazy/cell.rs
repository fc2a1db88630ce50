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

use std::cell::RefCell;
use std::fmt;

use once_cell::sync::OnceCell;
use parking_lot::ReentrantMutex;

use crate::error::{Error, Result};

type BoxError = Box<dyn std::error::Error + Send + Sync>;
type Thunk<T> = Box<dyn Fn() -> std::result::Result<T, BoxError> + Send + Sync>;

enum Pending<T> {
    /// Not yet evaluated. Retained as `Fn` (not `FnOnce`) rather than
    /// consumed on first call, so a failed attempt can be retried.
    Thunk(Thunk<T>),
    /// Currently being evaluated, by this thread or another. Seeing this
    /// while already holding the lock (same thread, reentrant) means the
    /// thunk calls back into its own cell.
    Evaluating,
}

/// A value computed at most once, on first access, and cached afterward.
///
/// Guarded by a re-entrant lock so a thunk that evaluates the same cell it
/// is computing observes `Evaluating` instead of deadlocking, and is
/// reported as [`Error::CycleDetected`]. Once ready, reads take a lock-free
/// fast path: an [`OnceCell`] holds the published value and is consulted
/// before ever touching the lock.
pub struct LazyCell<T> {
    ready: OnceCell<T>,
    pending: ReentrantMutex<RefCell<Option<Pending<T>>>>,
    /// Where this cell was constructed, so a later evaluation failure can
    /// be attributed back to construction rather than to whichever call
    /// happened to trigger it.
    construction_site: String,
}

impl<T> LazyCell<T> {
    /// Creates a cell that evaluates `thunk` on first access. `site`
    /// should identify where in the caller's code this cell was built
    /// (e.g. `format!("{}:{}", file!(), line!())`).
    pub fn new<F>(site: impl Into<String>, thunk: F) -> Self
    where
        F: Fn() -> std::result::Result<T, BoxError> + Send + Sync + 'static,
    {
        LazyCell {
            ready: OnceCell::new(),
            pending: ReentrantMutex::new(RefCell::new(Some(Pending::Thunk(Box::new(thunk))))),
            construction_site: site.into(),
        }
    }

    /// Creates an already-evaluated cell, never invoking a thunk.
    pub fn ready(value: T) -> Self {
        let cell = LazyCell {
            ready: OnceCell::new(),
            pending: ReentrantMutex::new(RefCell::new(None)),
            construction_site: String::new(),
        };
        let _ = cell.ready.set(value);
        cell
    }

    pub fn is_ready(&self) -> bool {
        self.ready.get().is_some()
    }

    /// Returns the cell's value, evaluating the thunk on first call.
    pub fn get(&self) -> Result<&T> {
        // Fast path: no span here, a disabled-subscriber check still costs
        // more than this crate wants to pay on every already-ready read.
        if let Some(v) = self.ready.get() {
            return Ok(v);
        }
        let _span = tracing::trace_span!("lazy_cell_evaluate", site = %self.construction_site).entered();
        let guard = self.pending.lock();
        if let Some(v) = self.ready.get() {
            tracing::trace!("published by another caller while waiting for the lock");
            return Ok(v);
        }
        let taken = guard.borrow_mut().take();
        match taken {
            Some(Pending::Evaluating) => {
                *guard.borrow_mut() = Some(Pending::Evaluating);
                tracing::trace!("reentrant evaluation, reporting cycle");
                Err(Error::CycleDetected)
            }
            Some(Pending::Thunk(thunk)) => {
                *guard.borrow_mut() = Some(Pending::Evaluating);
                match thunk() {
                    Ok(value) => {
                        let _ = self.ready.set(value);
                        // The thunk is dropped here, releasing whatever it captured.
                        *guard.borrow_mut() = None;
                        Ok(self.ready.get().expect("value was just published"))
                    }
                    Err(cause) => {
                        *guard.borrow_mut() = Some(Pending::Thunk(thunk));
                        tracing::trace!("thunk failed, cell left pending for retry");
                        Err(Error::LazyEvaluationFailed {
                            construction_site: self.construction_site.clone(),
                            cause,
                        })
                    }
                }
            }
            None => unreachable!("a cell with no ready value always has a pending thunk"),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for LazyCell<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LazyCell")
            .field("state", if self.is_ready() { &"ready" } else { &"pending" })
            .field("value", &self.ready.get())
            .finish()
    }
}
