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

//! Cursor tracking across rebases.
//!
//! A cursor snapshotted at commit time is either sitting on text untouched
//! by the incoming edit (`OnOriginal`), or inside a span the incoming edit
//! just replaced (`OnNewCommit`). The two need different carry-forward rules
//! as later commits land.

use crate::op::{self, Op};

/// A cursor position tracked through a sequence of commits.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CursorInfo {
    /// The cursor was outside every op's replaced range at snapshot time;
    /// `position` is tracked directly against the evolving text.
    OnOriginal { position: usize },
    /// The cursor fell inside `ops[i]`'s replaced range, at offset `delta`
    /// into that op's replacement text. `ops` is carried (and may split)
    /// across subsequent rebases.
    OnNewCommit { ops: Vec<Op>, delta: usize },
}

impl CursorInfo {
    /// Classify `position` against the ops of a just-built commit.
    pub fn snapshot(position: usize, commit_ops: &[Op]) -> Self {
        for commit_op in commit_ops {
            if commit_op.begin <= position && position <= commit_op.end {
                return Self::OnNewCommit {
                    ops: vec![commit_op.clone()],
                    delta: position - commit_op.begin,
                };
            }
        }
        Self::OnOriginal { position }
    }

    /// Carry this cursor across one more commit's ops, in order.
    pub fn advance(self, ops: &[Op]) -> Self {
        match self {
            Self::OnOriginal { position } => {
                let mut position = position;
                for commit_op in ops {
                    position = advance_on_original(position, commit_op);
                }
                Self::OnOriginal { position }
            }
            Self::OnNewCommit { ops: tracked, delta } => Self::OnNewCommit {
                ops: op::rebase_all(&tracked, ops),
                delta,
            },
        }
    }

    /// Resolve to a final byte offset, clamped into `[0, text_len]`.
    pub fn resolve(&self, text_len: usize) -> usize {
        let position = match self {
            Self::OnOriginal { position } => *position,
            Self::OnNewCommit { ops, delta } => resolve_on_new_commit(ops, *delta),
        };
        position.min(text_len)
    }
}

fn advance_on_original(position: usize, op: &Op) -> usize {
    if position <= op.begin {
        position
    } else if position + 1 >= op.end {
        (position as i64 + op.increased_length()) as usize
    } else {
        // Cursor lies inside the replaced span: snap to its start.
        op.begin
    }
}

fn resolve_on_new_commit(ops: &[Op], delta: usize) -> usize {
    let mut remaining = delta as i64;
    for fragment in ops {
        if fragment.begin as i64 + remaining <= fragment.end as i64 {
            return (fragment.begin as i64 + remaining).max(0) as usize;
        }
        remaining -= fragment.new_text.len() as i64;
    }
    // Should not happen given the invariants: every delta handed out by
    // `snapshot` fits inside its originating op's span.
    ops.last().map_or(0, |f| f.end)
}
