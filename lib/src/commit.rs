// Copyright 2026 The Synctext Authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
// https://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! A single entry in the commit chain: a finalized text and the ops that
//! produced it from its predecessor.

use crate::op::{self, Op};

/// `text` is the finalized buffer after this commit; `ops` transforms the
/// predecessor commit's text into `text`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Commit {
    pub text: String,
    pub ops: Vec<Op>,
}

impl Commit {
    pub fn new(text: impl Into<String>, ops: Vec<Op>) -> Self {
        Self {
            text: text.into(),
            ops,
        }
    }

    /// An empty commit: no text, no ops. Used for chain sentinels and
    /// fresh per-user baselines.
    pub fn empty() -> Self {
        Self {
            text: String::new(),
            ops: Vec::new(),
        }
    }

    /// Recompute `text` by applying `ops` to `predecessor_text`. Used after
    /// `ops` has been rebased onto a new predecessor.
    pub fn reanchor(predecessor_text: &str, ops: Vec<Op>) -> Self {
        let text = op::apply(&ops, predecessor_text);
        Self { text, ops }
    }
}
