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

//! The commit chain's persistence sink: a single plain-text file holding the
//! tail commit's text.
//!
//! Durability is explicitly out of scope; a failed write is logged and
//! otherwise swallowed, matching the best-effort save semantics this design
//! is grounded on. No temp-file-plus-rename dance is used here, since there
//! is nothing downstream that depends on the write being atomic.

use std::fs;
use std::path::{Path, PathBuf};

/// Loads the initial buffer content on startup and rewrites it after every
/// successful commit.
#[derive(Clone, Debug)]
pub struct TextPersistence {
    path: PathBuf,
}

impl TextPersistence {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Read the persisted text, or an empty string if the file is absent.
    pub fn load_or_default(&self) -> String {
        match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => String::new(),
            Err(err) => {
                tracing::warn!(path = %self.path.display(), error = %err, "failed to read persisted text, starting empty");
                String::new()
            }
        }
    }

    /// Best-effort overwrite of the persisted text.
    pub fn save(&self, text: &str) {
        if let Err(err) = fs::write(&self.path, text) {
            tracing::warn!(path = %self.path.display(), error = %err, "failed to persist text");
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_or_default_returns_empty_for_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let persistence = TextPersistence::new(dir.path().join("missing.txt"));
        assert_eq!(persistence.load_or_default(), "");
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let persistence = TextPersistence::new(dir.path().join("text.txt"));
        persistence.save("hello world");
        assert_eq!(persistence.load_or_default(), "hello world");
    }
}
