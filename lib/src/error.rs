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

//! Error types for user lifecycle operations.

use thiserror::Error;

/// Errors raised by [`crate::manager::UsersTextManager`] user-lifecycle calls.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ManagerError {
    #[error("user already exists: {identity}")]
    AlreadyExists { identity: String },
    #[error("user not found: {identity}")]
    NotFound { identity: String },
}
