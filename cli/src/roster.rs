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

//! The `<identity> <nickname> <RO|RW>`-per-line roster file format shared
//! by startup and the admin console's `load`/`save` commands.

use std::fs;
use std::path::Path;

use synctext_lib::{Authority, UsersTextManager};

use crate::error::RosterError;

/// One line of a roster file.
pub struct RosterEntry {
    pub identity: String,
    pub nickname: String,
    pub authority: Authority,
}

fn parse_line(line_no: usize, line: &str) -> Result<Option<RosterEntry>, RosterError> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    let mut parts = trimmed.split_whitespace();
    let (Some(identity), Some(nickname), Some(authority)) =
        (parts.next(), parts.next(), parts.next())
    else {
        return Err(RosterError::Malformed {
            line: line_no,
            text: line.to_string(),
        });
    };
    let authority = Authority::parse(authority).ok_or_else(|| RosterError::Malformed {
        line: line_no,
        text: line.to_string(),
    })?;
    Ok(Some(RosterEntry {
        identity: identity.to_string(),
        nickname: nickname.to_string(),
        authority,
    }))
}

/// Parse a roster file's contents into entries, one per non-blank line.
pub fn parse(contents: &str) -> Result<Vec<RosterEntry>, RosterError> {
    contents
        .lines()
        .enumerate()
        .filter_map(|(idx, line)| parse_line(idx + 1, line).transpose())
        .collect()
}

/// Load a roster file and add every entry to `manager`. Entries that
/// already exist are skipped with a warning rather than failing the whole
/// load.
pub fn load(manager: &UsersTextManager, path: &Path) -> Result<usize, RosterError> {
    let contents = fs::read_to_string(path).map_err(|source| RosterError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let entries = parse(&contents)?;
    let mut added = 0;
    for entry in entries {
        match manager.add_user(&entry.identity, &entry.nickname, entry.authority) {
            Ok(()) => added += 1,
            Err(err) => tracing::warn!(identity = %entry.identity, %err, "skipping roster entry"),
        }
    }
    Ok(added)
}

/// Write every known user (online or not), sorted by identity, to `path`.
pub fn save(manager: &UsersTextManager, path: &Path) -> Result<usize, RosterError> {
    let users = manager.get_users_info(&[], false);
    let mut lines: Vec<String> = users
        .iter()
        .map(|(identity, info)| format!("{identity} {} {}", info.nickname, info.authority.as_str()))
        .collect();
    lines.sort();
    let count = lines.len();
    fs::write(path, lines.join("\n") + if lines.is_empty() { "" } else { "\n" }).map_err(
        |source| RosterError::Io {
            path: path.to_path_buf(),
            source,
        },
    )?;
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_skips_blank_lines() {
        let entries = parse("alice Alice RW\n\nbob Bob RO\n").unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].identity, "alice");
        assert_eq!(entries[1].authority, Authority::ReadOnly);
    }

    #[test]
    fn parse_rejects_malformed_line() {
        let result = parse("alice Alice\n");
        assert!(matches!(result, Err(RosterError::Malformed { line: 1, .. })));
    }

    #[test]
    fn parse_rejects_unknown_authority() {
        let result = parse("alice Alice XX\n");
        assert!(matches!(result, Err(RosterError::Malformed { .. })));
    }

    #[test]
    fn load_then_save_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let text_path = dir.path().join("text.txt");
        let manager = UsersTextManager::new(synctext_lib::TextPersistence::new(text_path));

        let roster_path = dir.path().join("roster.txt");
        fs::write(&roster_path, "alice Alice RW\nbob Bob RO\n").unwrap();
        let added = load(&manager, &roster_path).unwrap();
        assert_eq!(added, 2);

        let save_path = dir.path().join("saved.txt");
        let saved = save(&manager, &save_path).unwrap();
        assert_eq!(saved, 2);
        let contents = fs::read_to_string(&save_path).unwrap();
        assert!(contents.contains("alice Alice RW"));
        assert!(contents.contains("bob Bob RO"));
    }
}
