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

//! The operation algebra: a single edit primitive and its rebase rule.

/// Replace the half-open byte range `[begin, end)` of an anchor text with
/// `new_text`.
///
/// An `Op` only has meaning relative to a specific anchor text. Rebasing
/// reinterprets it against a different anchor.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Op {
    pub begin: usize,
    pub end: usize,
    pub new_text: String,
}

impl Op {
    pub fn new(begin: usize, end: usize, new_text: impl Into<String>) -> Self {
        let new_text = new_text.into();
        assert!(begin <= end, "op range must be non-decreasing");
        Self {
            begin,
            end,
            new_text,
        }
    }

    /// Net change in text length this op produces, signed.
    pub fn increased_length(&self) -> i64 {
        self.new_text.len() as i64 - (self.end - self.begin) as i64
    }

    pub fn is_empty(&self) -> bool {
        self.begin == self.end && self.new_text.is_empty()
    }
}

/// Apply `ops` in order to `text`, returning the resulting text.
///
/// `ops` must be non-overlapping and given in ascending `begin` order, each
/// interpreted against `text` as it stood before any of them were applied
/// (i.e. offsets are not shifted between ops in the list; this is the
/// invariant [`diff_to_ops`](crate::diff::diff_to_ops) and `rebase` both
/// maintain for ops that share a common anchor).
pub fn apply(ops: &[Op], text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut cursor = 0usize;
    for op in ops {
        result.push_str(&text[cursor..op.begin]);
        result.push_str(&op.new_text);
        cursor = op.end;
    }
    result.push_str(&text[cursor..]);
    result
}

/// Reinterpret `subject` against the text produced by applying `earlier` to
/// their common anchor, given `earlier` has already landed.
///
/// Returns one or two ops, never zero-length spuriously (empty fragments of
/// a split are always omitted). See the case table this implements in
/// `SPEC_FULL.md` section 4.1.
pub fn rebase(subject: &Op, earlier: &Op) -> Vec<Op> {
    let delta = earlier.increased_length();
    let shift = |offset: usize| -> usize { (offset as i64 + delta) as usize };

    let (a, b) = (earlier.begin, earlier.end);
    let (p, q) = (subject.begin, subject.end);

    if b <= p {
        // earlier lies entirely at or before subject's start.
        return vec![Op::new(shift(p), shift(q), subject.new_text.clone())];
    }
    if q <= a {
        // earlier lies entirely at or after subject's end: unaffected.
        return vec![subject.clone()];
    }
    if a < p {
        if b < q {
            // left-overlap: earlier's tail eats into subject's head.
            return vec![Op::new(shift(b), shift(q), subject.new_text.clone())];
        }
        // earlier fully covers subject (b >= q): subject collapses to an
        // insertion at the end of earlier's replacement.
        return vec![Op::new(shift(b), shift(b), subject.new_text.clone())];
    }
    if a == p {
        if b < q {
            return vec![Op::new(shift(b), shift(q), subject.new_text.clone())];
        }
        // b >= q, including the exact-same-range case: collapses to an
        // insertion at the end of earlier's replacement.
        return vec![Op::new(shift(b), shift(b), subject.new_text.clone())];
    }
    // a > p: subject starts before earlier.
    if b < q {
        // subject fully covers earlier: split into a left fragment that
        // keeps subject's replacement text up to earlier's start, and a
        // right fragment that deletes whatever of subject's range trails
        // past earlier's (now-shifted) end.
        let mut out = vec![Op::new(p, a, subject.new_text.clone())];
        let tail = Op::new(shift(b), shift(q), String::new());
        if !tail.is_empty() {
            out.push(tail);
        }
        return out;
    }
    // b >= q: earlier's range reaches at or past subject's end; subject's
    // whole effect is absorbed into the left fragment.
    vec![Op::new(p, a, subject.new_text.clone())]
}

/// Fold `subjects` through [`rebase`] against each op in `earlier_ops` in
/// turn, flattening splits as they occur.
pub fn rebase_all(subjects: &[Op], earlier_ops: &[Op]) -> Vec<Op> {
    let mut current = subjects.to_vec();
    for earlier in earlier_ops {
        current = current
            .iter()
            .flat_map(|subject| rebase(subject, earlier))
            .collect();
    }
    current
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn apply_replaces_range() {
        let ops = vec![Op::new(1, 3, "XY")];
        assert_eq!(apply(&ops, "abcdef"), "aXYdef");
    }

    #[test]
    fn apply_multiple_ops_in_order() {
        let ops = vec![Op::new(0, 1, "H"), Op::new(6, 11, "WORLD")];
        assert_eq!(apply(&ops, "hello world"), "Hello WORLD");
    }

    #[test]
    fn rebase_strictly_left_shifts_by_delta() {
        let earlier = Op::new(0, 1, "HELLO");
        let subject = Op::new(6, 11, "WORLD");
        let result = rebase(&subject, &earlier);
        assert_eq!(result, vec![Op::new(10, 15, "WORLD")]);
    }

    #[test]
    fn rebase_strictly_right_is_unaffected() {
        let earlier = Op::new(6, 11, "WORLD");
        let subject = Op::new(0, 1, "H");
        assert_eq!(rebase(&subject, &earlier), vec![subject]);
    }

    #[test]
    fn rebase_left_overlap() {
        // "abcdef" -> earlier replaces [1,3) with "XY" -> "aXYdef"
        // subject (same anchor) replaces [2,4) with "Z"
        let earlier = Op::new(1, 3, "XY");
        let subject = Op::new(2, 4, "Z");
        let rebased = rebase(&subject, &earlier);
        assert_eq!(rebased, vec![Op::new(3, 4, "Z")]);
        let committed = apply(&[earlier], "abcdef");
        assert_eq!(committed, "aXYdef");
        assert_eq!(apply(&rebased, &committed), "aXYZef");
    }

    #[test]
    fn rebase_exact_same_range_collapses_to_insertion() {
        let earlier = Op::new(2, 4, "Q");
        let subject = Op::new(2, 4, "Z");
        assert_eq!(rebase(&subject, &earlier), vec![Op::new(3, 3, "Z")]);
    }

    #[test]
    fn rebase_subject_covers_earlier_splits() {
        let earlier = Op::new(2, 3, "Q");
        let subject = Op::new(1, 5, "XYZ");
        let rebased = rebase(&subject, &earlier);
        assert_eq!(
            rebased,
            vec![Op::new(1, 2, "XYZ"), Op::new(3, 5, String::new())]
        );
        let committed = apply(&[earlier], "01234");
        assert_eq!(committed, "01Q34");
        // Earlier's own inserted text ("Q") survives inside subject's
        // covering range rather than being silently destroyed.
        assert_eq!(apply(&rebased, &committed), "0XYZQ");
    }

    #[test]
    fn rebase_earlier_covers_subject_collapses() {
        let earlier = Op::new(1, 5, "XYZ");
        let subject = Op::new(2, 3, "Q");
        assert_eq!(rebase(&subject, &earlier), vec![Op::new(4, 4, "Q")]);
    }

    #[test]
    fn increased_length_accounts_for_insert_and_delete() {
        assert_eq!(Op::new(0, 0, "ab").increased_length(), 2);
        assert_eq!(Op::new(0, 2, "").increased_length(), -2);
        assert_eq!(Op::new(0, 2, "xy").increased_length(), 0);
    }
}
