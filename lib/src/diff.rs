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

//! Turns a pair of whole texts into the list of [`Op`]s that transforms one
//! into the other.

use crate::op::Op;

/// Compute a non-overlapping, ascending-order list of [`Op`]s such that
/// `apply(diff_to_ops(old, new), old) == new`.
///
/// Trims the common prefix and suffix first, then runs a Myers-style
/// shortest-edit-script diff over remaining lines, and falls back to a
/// per-character diff within any single changed line so a small in-line
/// edit doesn't get reported as replacing the whole line.
pub fn diff_to_ops(old: &str, new: &str) -> Vec<Op> {
    let (prefix_len, old_mid, new_mid) = trim_common(old, new);
    if old_mid.is_empty() && new_mid.is_empty() {
        return Vec::new();
    }
    if old_mid.is_empty() {
        return vec![Op::new(prefix_len, prefix_len, new_mid)];
    }
    if new_mid.is_empty() {
        return vec![Op::new(prefix_len, prefix_len + old_mid.len(), "")];
    }

    let old_lines = split_keep_ends(old_mid);
    let new_lines = split_keep_ends(new_mid);
    let script = myers_diff(&old_lines, &new_lines);

    let mut ops = Vec::new();
    let mut old_offset = prefix_len;
    for hunk in script {
        match hunk {
            Hunk::Equal(lines) => {
                old_offset += lines.iter().map(|l| l.len()).sum::<usize>();
            }
            Hunk::Replace {
                old: old_run,
                new: new_run,
            } => {
                let old_run_len: usize = old_run.iter().map(|l| l.len()).sum();
                let old_text: String = old_run.concat();
                let new_text: String = new_run.concat();
                ops.extend(char_level_refine(old_offset, &old_text, &new_text));
                old_offset += old_run_len;
            }
        }
    }
    ops
}

/// Trim the common prefix and suffix (on `char` boundaries) off `old`/`new`,
/// returning `(prefix_byte_len, old_middle, new_middle)`.
fn trim_common<'a>(old: &'a str, new: &'a str) -> (usize, &'a str, &'a str) {
    let old_chars: Vec<(usize, char)> = old.char_indices().collect();
    let new_chars: Vec<(usize, char)> = new.char_indices().collect();

    let mut prefix = 0usize;
    while prefix < old_chars.len()
        && prefix < new_chars.len()
        && old_chars[prefix].1 == new_chars[prefix].1
    {
        prefix += 1;
    }
    let prefix_byte_len = if prefix == 0 {
        0
    } else if prefix == old_chars.len() {
        old.len()
    } else {
        old_chars[prefix].0
    };

    let mut old_suffix = old_chars.len();
    let mut new_suffix = new_chars.len();
    while old_suffix > prefix
        && new_suffix > prefix
        && old_chars[old_suffix - 1].1 == new_chars[new_suffix - 1].1
    {
        old_suffix -= 1;
        new_suffix -= 1;
    }
    let old_mid_end = if old_suffix == old_chars.len() {
        old.len()
    } else {
        old_chars[old_suffix].0
    };
    let new_mid_end = if new_suffix == new_chars.len() {
        new.len()
    } else {
        new_chars[new_suffix].0
    };
    (
        prefix_byte_len,
        &old[prefix_byte_len..old_mid_end],
        &new[prefix_byte_len..new_mid_end],
    )
}

fn split_keep_ends(text: &str) -> Vec<&str> {
    let mut lines = Vec::new();
    let mut start = 0;
    for (idx, byte) in text.bytes().enumerate() {
        if byte == b'\n' {
            lines.push(&text[start..=idx]);
            start = idx + 1;
        }
    }
    if start < text.len() {
        lines.push(&text[start..]);
    }
    lines
}

enum Hunk<'a> {
    Equal(Vec<&'a str>),
    Replace {
        old: Vec<&'a str>,
        new: Vec<&'a str>,
    },
}

/// Shortest-edit-script diff (Myers) over line slices, coalesced into
/// alternating equal/replace runs.
fn myers_diff<'a>(old: &[&'a str], new: &[&'a str]) -> Vec<Hunk<'a>> {
    let n = old.len();
    let m = new.len();
    let max = n + m;
    if max == 0 {
        return Vec::new();
    }
    let offset = max as isize;
    let size = 2 * max + 1;
    // trace[d] is a snapshot of `v` taken *before* processing step d, i.e.
    // it holds the furthest-reaching x for each k from step d-1 (trace[0]
    // is the all-zero initial state). This is what the backtrack below
    // expects: it never needs the in-progress state of the step that found
    // the match, only where each step started from.
    let mut trace: Vec<Vec<isize>> = Vec::new();
    let mut v = vec![0isize; size];

    'outer: for d in 0..=max as isize {
        trace.push(v.clone());
        for k in (-d..=d).step_by(2) {
            let idx = (k + offset) as usize;
            let mut x = if k == -d || (k != d && v[idx - 1] < v[idx + 1]) {
                v[idx + 1]
            } else {
                v[idx - 1] + 1
            };
            let mut y = x - k;
            while (x as usize) < n && (y as usize) < m && old[x as usize] == new[y as usize] {
                x += 1;
                y += 1;
            }
            v[idx] = x;
            if x as usize >= n && y as usize >= m {
                break 'outer;
            }
        }
    }

    // Backtrack to recover the edit script, then forward-replay into hunks.
    let mut ops = Vec::new();
    let (mut x, mut y) = (n as isize, m as isize);
    for d in (0..trace.len() as isize).rev() {
        let v = &trace[d as usize];
        let k = x - y;
        let idx = (k + offset) as usize;
        let prev_k = if k == -d || (k != d && v[idx - 1] < v[idx + 1]) {
            k + 1
        } else {
            k - 1
        };
        let prev_idx = (prev_k + offset) as usize;
        let prev_x = v[prev_idx];
        let prev_y = prev_x - prev_k;

        while x > prev_x && y > prev_y {
            x -= 1;
            y -= 1;
            ops.push((old[x as usize], new[y as usize], true));
        }
        if d > 0 {
            if x == prev_x {
                y -= 1;
                ops.push(("", new[y as usize], false));
            } else {
                x -= 1;
                ops.push((old[x as usize], "", false));
            }
            x = prev_x;
            y = prev_y;
        }
    }
    ops.reverse();

    let mut hunks = Vec::new();
    let mut i = 0;
    while i < ops.len() {
        if ops[i].2 {
            let mut equal = Vec::new();
            while i < ops.len() && ops[i].2 {
                equal.push(ops[i].0);
                i += 1;
            }
            hunks.push(Hunk::Equal(equal));
        } else {
            let mut old_run = Vec::new();
            let mut new_run = Vec::new();
            while i < ops.len() && !ops[i].2 {
                if !ops[i].0.is_empty() {
                    old_run.push(ops[i].0);
                }
                if !ops[i].1.is_empty() {
                    new_run.push(ops[i].1);
                }
                i += 1;
            }
            hunks.push(Hunk::Replace {
                old: old_run,
                new: new_run,
            });
        }
    }
    hunks
}

/// Within one changed line run, trim common char prefix/suffix so an edit
/// like appending one character doesn't replace the whole run.
fn char_level_refine(base_offset: usize, old: &str, new: &str) -> Vec<Op> {
    if old.is_empty() && new.is_empty() {
        return Vec::new();
    }
    let old_chars: Vec<(usize, char)> = old.char_indices().collect();
    let new_chars: Vec<(usize, char)> = new.char_indices().collect();

    let mut prefix = 0usize;
    while prefix < old_chars.len()
        && prefix < new_chars.len()
        && old_chars[prefix].1 == new_chars[prefix].1
    {
        prefix += 1;
    }
    let mut old_suffix = old_chars.len();
    let mut new_suffix = new_chars.len();
    while old_suffix > prefix
        && new_suffix > prefix
        && old_chars[old_suffix - 1].1 == new_chars[new_suffix - 1].1
    {
        old_suffix -= 1;
        new_suffix -= 1;
    }

    let prefix_byte = if prefix == 0 {
        0
    } else if prefix == old_chars.len() {
        old.len()
    } else {
        old_chars[prefix].0
    };
    let old_mid_end = if old_suffix == old_chars.len() {
        old.len()
    } else {
        old_chars[old_suffix].0
    };
    let new_mid_end = if new_suffix == new_chars.len() {
        new.len()
    } else {
        new_chars[new_suffix].0
    };

    if prefix_byte == old_mid_end && prefix_byte == new_mid_end {
        return Vec::new();
    }
    vec![Op::new(
        base_offset + prefix_byte,
        base_offset + old_mid_end,
        &new[prefix_byte..new_mid_end],
    )]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::op::apply;

    #[test]
    fn identical_texts_produce_no_ops() {
        assert!(diff_to_ops("same", "same").is_empty());
    }

    #[test]
    fn pure_insert_at_end() {
        let ops = diff_to_ops("hello", "hello world");
        assert_eq!(apply(&ops, "hello"), "hello world");
    }

    #[test]
    fn pure_delete() {
        let ops = diff_to_ops("hello world", "hello");
        assert_eq!(apply(&ops, "hello world"), "hello");
    }

    #[test]
    fn single_char_change_is_localized() {
        let old = "The quick brown fox\njumps over the lazy dog\n";
        let new = "The quick brown fox\njumps over the LAZY dog\n";
        let ops = diff_to_ops(old, new);
        assert_eq!(apply(&ops, old), new);
        // Should not replace the whole text: the first line must be untouched.
        assert!(ops.iter().all(|op| op.begin >= old.find("jumps").unwrap()));
    }

    #[test]
    fn multi_line_rewrite_round_trips() {
        let old = "one\ntwo\nthree\n";
        let new = "one\ntwo-edited\nthree\nfour\n";
        let ops = diff_to_ops(old, new);
        assert_eq!(apply(&ops, old), new);
    }

    #[test]
    fn empty_to_empty() {
        assert!(diff_to_ops("", "").is_empty());
    }

    #[test]
    fn empty_to_nonempty() {
        let ops = diff_to_ops("", "hello");
        assert_eq!(apply(&ops, ""), "hello");
    }
}
