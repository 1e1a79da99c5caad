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

//! The commit chain: an ordered sequence of [`Commit`]s, each one user's
//! edit rebased onto every commit that landed after the edit's baseline.

use crate::commit::Commit;
use crate::cursor::CursorInfo;
use crate::diff::diff_to_ops;
use crate::op;
use crate::persist::TextPersistence;

/// Sentinel id of the root, always-empty commit.
const ROOT_ID: i64 = 0;
/// Sentinel id of the commit holding the text loaded at startup.
const INITIAL_CONTENT_ID: i64 = 1;

/// An ordered list of commits, two per-buffer sentinels plus a negative-id
/// prefix of unsynced user baselines and a positive-id suffix of
/// user-authored commits.
pub struct CommitChain {
    entries: Vec<(i64, Commit)>,
    next_negative_id: i64,
    next_positive_id: i64,
    persistence: TextPersistence,
    last_commit_ops: Vec<op::Op>,
}

impl CommitChain {
    /// Build a chain, loading initial content from `persistence` (empty if
    /// absent).
    pub fn new(persistence: TextPersistence) -> Self {
        let initial_content = persistence.load_or_default();
        let initial_ops = diff_to_ops("", &initial_content);
        let entries = vec![
            (ROOT_ID, Commit::empty()),
            (INITIAL_CONTENT_ID, Commit::new(initial_content, initial_ops)),
        ];
        Self {
            entries,
            next_negative_id: ROOT_ID - 1,
            next_positive_id: INITIAL_CONTENT_ID + 1,
            persistence,
            last_commit_ops: Vec::new(),
        }
    }

    fn index_of(&self, id: i64) -> usize {
        self.entries
            .iter()
            .position(|(entry_id, _)| *entry_id == id)
            .unwrap_or_else(|| panic!("commit id {id} not found in chain"))
    }

    /// Prepend a fresh, empty baseline commit and return its id. Used when a
    /// user connects or is reset; the returned id anchors that user's first
    /// edit even though it carries no text of its own — `commit` folds in
    /// everything that has happened since via the rebase across later
    /// commits.
    pub fn new_baseline(&mut self) -> i64 {
        let id = self.next_negative_id;
        self.next_negative_id -= 1;
        self.entries.insert(0, (id, Commit::empty()));
        id
    }

    /// Diff `new_text` against `base_id`'s text, rebase across every commit
    /// that has landed since, append the result as a new tail commit, and
    /// drop the caller's now-obsolete baseline.
    ///
    /// Returns `(new_commit_id, rebased_text, rebased_cursors)`.
    pub fn commit(
        &mut self,
        base_id: i64,
        new_text: &str,
        cursors: &[usize],
    ) -> (i64, String, Vec<usize>) {
        let base_index = self.index_of(base_id);
        let base_text = self.entries[base_index].1.text.clone();
        let ops = diff_to_ops(&base_text, new_text);

        let mut cursor_infos: Vec<CursorInfo> = cursors
            .iter()
            .map(|&position| CursorInfo::snapshot(position, &ops))
            .collect();

        let mut rebased_ops = ops;
        for (_, later_commit) in &self.entries[base_index + 1..] {
            rebased_ops = op::rebase_all(&rebased_ops, &later_commit.ops);
            cursor_infos = cursor_infos
                .into_iter()
                .map(|info| info.advance(&later_commit.ops))
                .collect();
        }

        let tail_text = self.entries.last().expect("chain is never empty").1.text.clone();
        let new_commit = Commit::reanchor(&tail_text, rebased_ops);
        let new_id = self.next_positive_id;
        self.next_positive_id += 1;

        self.last_commit_ops = new_commit.ops.clone();
        let rebased_text = new_commit.text.clone();
        let text_len = rebased_text.len();
        self.entries.push((new_id, new_commit));
        self.delete(base_id);

        self.persistence.save(&rebased_text);

        let rebased_cursors = cursor_infos
            .into_iter()
            .map(|info| info.resolve(text_len))
            .collect();
        (new_id, rebased_text, rebased_cursors)
    }

    /// Carry cursors belonging to some other user across the most recently
    /// committed edit.
    pub fn update_cursors(&self, cursors: &[usize]) -> Vec<usize> {
        let text_len = self.entries.last().expect("chain is never empty").1.text.len();
        cursors
            .iter()
            .map(|&position| {
                CursorInfo::OnOriginal { position }
                    .advance(&self.last_commit_ops)
                    .resolve(text_len)
            })
            .collect()
    }

    /// Remove a commit, splicing its successor onto its predecessor so the
    /// successor's ops still transform its (new) predecessor's text into its
    /// own unchanged text.
    pub fn delete(&mut self, id: i64) {
        let index = self.index_of(id);
        if index >= 1 && index + 1 < self.entries.len() {
            let pre_text = self.entries[index - 1].1.text.clone();
            let next_id = self.entries[index + 1].0;
            let next_text = self.entries[index + 1].1.text.clone();
            let ops = diff_to_ops(&pre_text, &next_text);
            self.entries[index + 1] = (next_id, Commit::new(next_text, ops));
        }
        self.entries.remove(index);
    }

    /// Text stored at `id`.
    pub fn get_text(&self, id: i64) -> &str {
        &self.entries[self.index_of(id)].1.text
    }

    /// Text of the current tail commit.
    pub fn tail_text(&self) -> &str {
        &self.entries.last().expect("chain is never empty").1.text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain_in_temp_dir() -> (CommitChain, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let persistence = TextPersistence::new(dir.path().join("text.txt"));
        (CommitChain::new(persistence), dir)
    }

    /// A fresh baseline's own text is empty; a real client first folds in
    /// whatever is already on the tail with a no-op empty-text commit
    /// (mirroring `_check_init` in the request handler) before submitting
    /// an edit that assumes that tail text as its starting point.
    fn sync_new_user(chain: &mut CommitChain, base: i64) -> i64 {
        chain.commit(base, "", &[]).0
    }

    #[test]
    fn new_baseline_then_commit_folds_in_initial_content() {
        let (mut chain, _dir) = chain_in_temp_dir();
        // No initial content was persisted, so the tail starts empty.
        let baseline = chain.new_baseline();
        let (_, text, cursors) = chain.commit(baseline, "hello", &[5]);
        assert_eq!(text, "hello");
        assert_eq!(cursors, vec![5]);
    }

    #[test]
    fn concurrent_disjoint_edits_both_land() {
        let (mut chain, _dir) = chain_in_temp_dir();
        let base = chain.new_baseline();
        let (_, seeded, _) = chain.commit(base, "hello world", &[]);
        assert_eq!(seeded, "hello world");

        let a_base = chain.new_baseline();
        let b_base = chain.new_baseline();
        let a_synced = sync_new_user(&mut chain, a_base);
        let b_synced = sync_new_user(&mut chain, b_base);

        let (_, text_a, cursors_a) = chain.commit(a_synced, "HELLO world", &[5]);
        assert_eq!(text_a, "HELLO world");
        assert_eq!(cursors_a, vec![5]);

        let (_, text_b, cursors_b) = chain.commit(b_synced, "hello WORLD", &[11]);
        assert_eq!(text_b, "HELLO WORLD");
        assert_eq!(cursors_b, vec![11]);
    }

    #[test]
    fn overlapping_replace_rebases_correctly() {
        let (mut chain, _dir) = chain_in_temp_dir();
        let base = chain.new_baseline();
        chain.commit(base, "abcdef", &[]);

        let a_base = chain.new_baseline();
        let b_base = chain.new_baseline();
        let a_synced = sync_new_user(&mut chain, a_base);
        let b_synced = sync_new_user(&mut chain, b_base);

        chain.commit(a_synced, "aXYdef", &[]);
        let (_, text_b, _) = chain.commit(b_synced, "abZef", &[]);
        assert_eq!(text_b, "aXYZef");
    }

    #[test]
    fn delete_splices_successor_onto_predecessor() {
        let (mut chain, _dir) = chain_in_temp_dir();
        let base = chain.new_baseline();
        chain.commit(base, "seed", &[]);

        let a_base = chain.new_baseline();
        let b_base = chain.new_baseline();
        chain.delete(a_base);
        let b_synced = sync_new_user(&mut chain, b_base);
        let (_, text, _) = chain.commit(b_synced, "seed-edited", &[]);
        assert_eq!(text, "seed-edited");
    }

    #[test]
    fn update_cursors_shifts_other_users_cursor() {
        let (mut chain, _dir) = chain_in_temp_dir();
        let base = chain.new_baseline();
        chain.commit(base, "hello world", &[]);
        let a_base = chain.new_baseline();
        let a_synced = sync_new_user(&mut chain, a_base);
        chain.commit(a_synced, "HELLO world", &[]);
        let shifted = chain.update_cursors(&[6]);
        assert_eq!(shifted, vec![6]);
    }

    #[test]
    fn persists_tail_text_after_commit() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("text.txt");
        let mut chain = CommitChain::new(TextPersistence::new(&path));
        let base = chain.new_baseline();
        chain.commit(base, "saved text", &[]);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "saved text");
    }

    #[test]
    fn loads_persisted_content_on_startup() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("text.txt");
        std::fs::write(&path, "preexisting").unwrap();
        let chain = CommitChain::new(TextPersistence::new(&path));
        assert_eq!(chain.get_text(INITIAL_CONTENT_ID), "preexisting");
    }
}
