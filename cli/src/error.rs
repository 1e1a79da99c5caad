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

//! Error types for the server binary's transport and roster I/O.

use std::path::PathBuf;

use thiserror::Error;

/// A frame-level failure on one connection. Always terminates that
/// connection; the framing has no resync point once it desyncs.
#[derive(Debug, Error)]
pub enum WireError {
    #[error("connection closed")]
    Eof,
    #[error("malformed length prefix: {0:?}")]
    BadLengthPrefix(Vec<u8>),
    #[error("frame exceeds maximum size ({0} bytes)")]
    FrameTooLarge(usize),
    #[error("zlib decompression failed")]
    Decompress(#[source] std::io::Error),
    #[error("frame is not valid UTF-8")]
    Utf8(#[from] std::string::FromUtf8Error),
    #[error("frame is not valid JSON")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Failure reading or writing the admin console's roster file.
#[derive(Debug, Error)]
pub enum RosterError {
    #[error("cannot access {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("line {line}: expected \"<identity> <nickname> <RO|RW>\", got {text:?}")]
    Malformed { line: usize, text: String },
}
