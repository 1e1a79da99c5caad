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

//! Translates a wire-level [`Request`] into calls on [`UsersTextManager`]
//! and packages the result as a [`Response`]. Has no I/O of its own; the
//! transport decodes bytes into a `Request` and encodes a `Response` back
//! into bytes.

use indexmap::IndexMap;
use itertools::Itertools as _;

use crate::manager::UsersTextManager;
use crate::user::Authority;

/// A decoded client message. `identity` is always required; everything else
/// is optional depending on whether this is a sync, a leave, or an init.
#[derive(Clone, Debug, Default, serde::Deserialize)]
pub struct Request {
    pub identity: Option<String>,
    #[serde(default)]
    pub bye: bool,
    #[serde(default)]
    pub init: bool,
    #[serde(default)]
    pub mode: i64,
    #[serde(default)]
    pub cursors: IndexMap<String, usize>,
    #[serde(default)]
    pub text: String,
}

/// A snapshot of one other online user, included in a sync response.
#[derive(Clone, Debug, serde::Serialize)]
pub struct PeerInfo {
    pub nickname: String,
    pub mode: i64,
    pub cursors: IndexMap<String, usize>,
}

/// What gets encoded back onto the wire.
#[derive(Clone, serde::Serialize)]
#[serde(untagged)]
pub enum Response {
    Sync {
        text: String,
        cursors: IndexMap<String, usize>,
        mode: i64,
        others: Vec<PeerInfo>,
    },
    Empty {},
    Error {
        error: String,
    },
}

/// Handle one decoded request against `manager`, producing the response to
/// send back.
pub fn handle(manager: &UsersTextManager, mut request: Request) -> Response {
    let Some(identity) = request.identity.take().filter(|id| !id.is_empty()) else {
        return Response::Error {
            error: "Bad request".to_string(),
        };
    };

    if request.bye {
        return match manager.reset_user(&identity) {
            Ok(()) => Response::Empty {},
            Err(_) => Response::Error {
                error: "Invalid identity".to_string(),
            },
        };
    }

    let users = manager.get_users_info(&[], false);
    let Some(user) = users.get(&identity) else {
        return Response::Error {
            error: "Invalid identity".to_string(),
        };
    };

    if request.init {
        if manager.reset_user(&identity).is_err() {
            return Response::Error {
                error: "Invalid identity".to_string(),
            };
        }
        request.text = String::new();
        for value in request.cursors.values_mut() {
            *value = 0;
        }
    } else if user.authority != Authority::ReadWrite {
        // Read-only users cannot effect edits: replace their submitted text
        // with the server's current view so the diff against it is empty.
        request.text = match manager.get_user_text(&identity) {
            Ok(text) => text,
            Err(_) => {
                return Response::Error {
                    error: "Invalid identity".to_string(),
                }
            }
        };
    }

    let Ok((updated, text)) =
        manager.update_user_text(&identity, request.mode, &request.cursors, &request.text)
    else {
        return Response::Error {
            error: "Invalid identity".to_string(),
        };
    };

    let others = manager
        .get_users_info(&[identity.as_str()], true)
        .into_iter()
        .sorted_by(|(a, _), (b, _)| a.cmp(b))
        .map(|(_, info)| PeerInfo {
            nickname: info.nickname,
            mode: info.mode,
            cursors: info.cursors,
        })
        .collect();

    Response::Sync {
        text,
        cursors: updated.cursors,
        mode: updated.mode,
        others,
    }
}


impl std::fmt::Debug for Response {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sync { text, mode, others, .. } => f
                .debug_struct("Sync")
                .field("text", text)
                .field("mode", mode)
                .field("others", &others.len())
                .finish(),
            Self::Empty {} => write!(f, "Empty"),
            Self::Error { error } => write!(f, "Error({error})"),
        }
    }
}
