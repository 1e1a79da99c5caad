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

//! Per-user state tracked by [`crate::manager::UsersTextManager`].

use indexmap::IndexMap;

/// Sentinel `mode` meaning "has never synced this session".
pub const UNKNOWN_MODE: i64 = -1;

/// A user's edit permission.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Authority {
    #[serde(rename = "RO")]
    ReadOnly,
    #[serde(rename = "RW")]
    ReadWrite,
}

impl Authority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ReadOnly => "RO",
            Self::ReadWrite => "RW",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "RO" => Some(Self::ReadOnly),
            "RW" => Some(Self::ReadWrite),
            _ => None,
        }
    }
}

/// Everything the manager tracks about one connected identity.
#[derive(Clone, Debug)]
pub struct UserInfo {
    pub authority: Authority,
    pub nickname: String,
    pub mode: i64,
    /// Cursor-mark name (e.g. `"."`, `"v"`) to byte offset, in insertion
    /// order so zipping rebased positions back onto names stays correct.
    pub cursors: IndexMap<String, usize>,
    pub last_commit_id: i64,
}

impl UserInfo {
    pub fn new(authority: Authority, nickname: impl Into<String>, last_commit_id: i64) -> Self {
        Self {
            authority,
            nickname: nickname.into(),
            mode: UNKNOWN_MODE,
            cursors: IndexMap::new(),
            last_commit_id,
        }
    }

    pub fn is_online(&self) -> bool {
        self.mode != UNKNOWN_MODE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_user_is_offline() {
        let user = UserInfo::new(Authority::ReadWrite, "alice", 0);
        assert!(!user.is_online());
        assert_eq!(user.mode, UNKNOWN_MODE);
    }

    #[test]
    fn authority_round_trips_through_string() {
        assert_eq!(Authority::parse("RO"), Some(Authority::ReadOnly));
        assert_eq!(Authority::parse("RW"), Some(Authority::ReadWrite));
        assert_eq!(Authority::parse("nope"), None);
        assert_eq!(Authority::ReadOnly.as_str(), "RO");
    }
}
