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

//! Owns the commit chain and the user roster, and serializes every mutation
//! behind a single reentrant lock.
//!
//! [`parking_lot::ReentrantMutex`] is used rather than `std::sync::Mutex`
//! because [`UsersTextManager::reset_user`] re-enters the manager (it calls
//! [`UsersTextManager::delete_user`] then [`UsersTextManager::add_user`]
//! within one critical section); a plain mutex would deadlock a thread
//! locking itself. A `ReentrantMutex` only ever hands out `&T`, so the
//! mutable state behind it lives in a `RefCell`.

use std::cell::RefCell;
use std::collections::BTreeMap;

use indexmap::IndexMap;
use parking_lot::ReentrantMutex;

use crate::chain::CommitChain;
use crate::error::ManagerError;
use crate::persist::TextPersistence;
use crate::user::{Authority, UserInfo};

struct ManagerState {
    chain: CommitChain,
    users: BTreeMap<String, UserInfo>,
}

/// Thread-safe owner of the commit chain and the online user roster.
pub struct UsersTextManager {
    state: ReentrantMutex<RefCell<ManagerState>>,
}

impl UsersTextManager {
    pub fn new(persistence: TextPersistence) -> Self {
        Self {
            state: ReentrantMutex::new(RefCell::new(ManagerState {
                chain: CommitChain::new(persistence),
                users: BTreeMap::new(),
            })),
        }
    }

    pub fn add_user(
        &self,
        identity: &str,
        nickname: &str,
        authority: Authority,
    ) -> Result<(), ManagerError> {
        let guard = self.state.lock();
        let mut state = guard.borrow_mut();
        if state.users.contains_key(identity) {
            return Err(ManagerError::AlreadyExists {
                identity: identity.to_string(),
            });
        }
        let baseline = state.chain.new_baseline();
        state
            .users
            .insert(identity.to_string(), UserInfo::new(authority, nickname, baseline));
        tracing::info!(identity, nickname, authority = authority.as_str(), "user added");
        Ok(())
    }

    pub fn delete_user(&self, identity: &str) -> Result<(), ManagerError> {
        let guard = self.state.lock();
        let mut state = guard.borrow_mut();
        let user = state
            .users
            .remove(identity)
            .ok_or_else(|| ManagerError::NotFound {
                identity: identity.to_string(),
            })?;
        state.chain.delete(user.last_commit_id);
        tracing::info!(identity, "user deleted");
        Ok(())
    }

    /// Delete then re-add `identity`, preserving its authority and nickname
    /// but clearing mode and cursors and allocating a fresh baseline.
    ///
    /// Relies on the lock being reentrant: both calls run inside the single
    /// critical section this method holds.
    pub fn reset_user(&self, identity: &str) -> Result<(), ManagerError> {
        let guard = self.state.lock();
        let (nickname, authority) = {
            let state = guard.borrow();
            let user = state
                .users
                .get(identity)
                .ok_or_else(|| ManagerError::NotFound {
                    identity: identity.to_string(),
                })?;
            (user.nickname.clone(), user.authority)
        };
        self.delete_user(identity)?;
        self.add_user(identity, &nickname, authority)?;
        Ok(())
    }

    /// Snapshot of users, optionally excluding a set of identities and
    /// optionally restricted to those who have synced at least once.
    pub fn get_users_info(&self, without: &[&str], must_online: bool) -> BTreeMap<String, UserInfo> {
        let guard = self.state.lock();
        let state = guard.borrow();
        state
            .users
            .iter()
            .filter(|(identity, user)| {
                !without.contains(&identity.as_str()) && (!must_online || user.is_online())
            })
            .map(|(identity, user)| (identity.clone(), user.clone()))
            .collect()
    }

    pub fn get_user_text(&self, identity: &str) -> Result<String, ManagerError> {
        let guard = self.state.lock();
        let state = guard.borrow();
        let user = state
            .users
            .get(identity)
            .ok_or_else(|| ManagerError::NotFound {
                identity: identity.to_string(),
            })?;
        Ok(state.chain.get_text(user.last_commit_id).to_string())
    }

    /// Commit `identity`'s edit, update its cursors and mode, carry every
    /// other online user's cursors across the new commit, and return the
    /// updated `UserInfo` together with the reconciled text.
    pub fn update_user_text(
        &self,
        identity: &str,
        new_mode: i64,
        new_cursors: &IndexMap<String, usize>,
        new_text: &str,
    ) -> Result<(UserInfo, String), ManagerError> {
        let guard = self.state.lock();
        let mut state = guard.borrow_mut();

        let base_id = state
            .users
            .get(identity)
            .ok_or_else(|| ManagerError::NotFound {
                identity: identity.to_string(),
            })?
            .last_commit_id;

        let names: Vec<&String> = new_cursors.keys().collect();
        let positions: Vec<usize> = new_cursors.values().copied().collect();
        let (new_id, rebased_text, rebased_positions) =
            state.chain.commit(base_id, new_text, &positions);

        {
            let user = state.users.get_mut(identity).expect("checked above");
            user.last_commit_id = new_id;
            user.mode = new_mode;
            user.cursors = names
                .into_iter()
                .cloned()
                .zip(rebased_positions)
                .collect();
        }

        let other_identities: Vec<String> = state
            .users
            .keys()
            .filter(|other| other.as_str() != identity)
            .cloned()
            .collect();
        for other in other_identities {
            let positions: Vec<usize> = state.users[&other].cursors.values().copied().collect();
            let updated = state.chain.update_cursors(&positions);
            let user = state.users.get_mut(&other).expect("just listed");
            for (value, updated) in user.cursors.values_mut().zip(updated) {
                *value = updated;
            }
        }

        let user = state.users.get(identity).expect("checked above").clone();
        Ok((user, rebased_text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager_in_temp_dir() -> (UsersTextManager, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let persistence = TextPersistence::new(dir.path().join("text.txt"));
        (UsersTextManager::new(persistence), dir)
    }

    /// A freshly added user's baseline carries no text of its own; fold in
    /// whatever is already on the tail with a no-op empty-text commit before
    /// submitting a real edit, mirroring what a real client does on connect.
    fn sync_new_user(manager: &UsersTextManager, identity: &str) {
        manager
            .update_user_text(identity, 0, &IndexMap::new(), "")
            .unwrap();
    }

    #[test]
    fn add_user_twice_fails() {
        let (manager, _dir) = manager_in_temp_dir();
        manager.add_user("alice", "Alice", Authority::ReadWrite).unwrap();
        assert_eq!(
            manager.add_user("alice", "Alice", Authority::ReadWrite),
            Err(ManagerError::AlreadyExists {
                identity: "alice".to_string()
            })
        );
    }

    #[test]
    fn delete_unknown_user_fails() {
        let (manager, _dir) = manager_in_temp_dir();
        assert_eq!(
            manager.delete_user("ghost"),
            Err(ManagerError::NotFound {
                identity: "ghost".to_string()
            })
        );
    }

    #[test]
    fn reset_user_preserves_authority_and_nickname() {
        let (manager, _dir) = manager_in_temp_dir();
        manager.add_user("alice", "Alice", Authority::ReadOnly).unwrap();
        manager.reset_user("alice").unwrap();
        let info = manager.get_users_info(&[], false);
        let alice = &info["alice"];
        assert_eq!(alice.nickname, "Alice");
        assert_eq!(alice.authority, Authority::ReadOnly);
        assert!(!alice.is_online());
    }

    #[test]
    fn update_user_text_commits_and_returns_cursors() {
        let (manager, _dir) = manager_in_temp_dir();
        manager.add_user("alice", "Alice", Authority::ReadWrite).unwrap();
        let mut cursors = IndexMap::new();
        cursors.insert(".".to_string(), 5usize);
        let (user, text) = manager
            .update_user_text("alice", 1, &cursors, "hello")
            .unwrap();
        assert_eq!(text, "hello");
        assert_eq!(user.cursors["."], 5);
        assert_eq!(user.mode, 1);
    }

    #[test]
    fn other_users_cursors_shift_after_a_commit() {
        let (manager, _dir) = manager_in_temp_dir();
        manager.add_user("alice", "Alice", Authority::ReadWrite).unwrap();
        manager.add_user("bob", "Bob", Authority::ReadWrite).unwrap();
        sync_new_user(&manager, "alice");
        sync_new_user(&manager, "bob");

        let mut cursors = IndexMap::new();
        cursors.insert(".".to_string(), 0usize);
        manager.update_user_text("alice", 1, &cursors, "hello world").unwrap();

        let mut bob_cursors = IndexMap::new();
        bob_cursors.insert(".".to_string(), 11usize);
        manager.update_user_text("bob", 1, &bob_cursors, "hello world").unwrap();

        let mut alice_cursors = IndexMap::new();
        alice_cursors.insert(".".to_string(), 0usize);
        let (alice, _) = manager
            .update_user_text("alice", 1, &alice_cursors, "HELLO world")
            .unwrap();
        assert_eq!(alice.cursors["."], 0);

        // Bob's own edit was an insert of "hello world" that rebased to land
        // after alice's, so his cursor (at the end of what he typed) carries
        // forward to the end of his own inserted copy, not back to 11.
        let bob_info = manager.get_users_info(&[], false);
        assert_eq!(bob_info["bob"].cursors["."], 22);
    }
}
