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

//! Edit-reconciliation core for a collaborative text editor server: the
//! operation algebra, the commit chain, and the user/text manager that
//! drives them.

pub mod chain;
pub mod commit;
pub mod cursor;
pub mod diff;
pub mod error;
pub mod manager;
pub mod op;
pub mod persist;
pub mod request;
pub mod user;

pub use chain::CommitChain;
pub use commit::Commit;
pub use error::ManagerError;
pub use manager::UsersTextManager;
pub use op::Op;
pub use persist::TextPersistence;
pub use request::{handle, PeerInfo, Request, Response};
pub use user::{Authority, UserInfo};
