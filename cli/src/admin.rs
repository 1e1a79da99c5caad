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

//! The line-oriented admin console on stdin: manages the user roster live
//! without restarting the server.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use synctext_lib::{Authority, UsersTextManager};

use crate::roster;

const HELP_TEXT: &str = "\
commands:
  add <id> <nick> <RO|RW>   add a user to the roster
  delete <id>               remove a user
  deleteall                 remove every user
  reset <id>                reset a user's session
  list                      list every known user
  online                    list only users who have synced
  load <file>               add every user in a roster file
  save <file>               write every known user to a roster file
  port                      print the listening port
  exit                      shut down the server
  help                      show this text";

pub struct AdminConsole {
    manager: Arc<UsersTextManager>,
    port: u16,
    stop: Arc<AtomicBool>,
}

impl AdminConsole {
    pub fn new(manager: Arc<UsersTextManager>, port: u16, stop: Arc<AtomicBool>) -> Self {
        Self { manager, port, stop }
    }

    /// Read and dispatch commands from `input` until `exit`, EOF, or
    /// shutdown. Writes prompts and output to `output`.
    pub fn run(&self, input: impl BufRead, mut output: impl Write) {
        let mut lines = input.lines();
        loop {
            if self.stop.load(Ordering::Relaxed) {
                return;
            }
            let _ = write!(output, "> ");
            let _ = output.flush();
            let Some(Ok(line)) = lines.next() else {
                return;
            };
            if self.dispatch(&line, &mut output) {
                self.stop.store(true, Ordering::Relaxed);
                return;
            }
        }
    }

    /// Handle one command line. Returns `true` if the console should stop.
    fn dispatch(&self, line: &str, output: &mut impl Write) -> bool {
        let mut parts = line.split_whitespace();
        let Some(command) = parts.next() else {
            return false;
        };
        let args: Vec<&str> = parts.collect();
        match command {
            "add" => self.cmd_add(&args, output),
            "delete" => self.cmd_delete(&args, output),
            "deleteall" => self.cmd_deleteall(output),
            "reset" => self.cmd_reset(&args, output),
            "list" => self.cmd_list(false, output),
            "online" => self.cmd_list(true, output),
            "load" => self.cmd_load(&args, output),
            "save" => self.cmd_save(&args, output),
            "port" => {
                let _ = writeln!(output, "{}", self.port);
            }
            "help" => {
                let _ = writeln!(output, "{HELP_TEXT}");
            }
            "exit" => return true,
            other => {
                let _ = writeln!(output, "unknown command: {other} (try \"help\")");
            }
        }
        false
    }

    fn cmd_add(&self, args: &[&str], output: &mut impl Write) {
        let [identity, nickname, authority] = args else {
            let _ = writeln!(output, "usage: add <id> <nick> <RO|RW>");
            return;
        };
        let Some(authority) = Authority::parse(authority) else {
            let _ = writeln!(output, "authority must be RO or RW, got {authority:?}");
            return;
        };
        match self.manager.add_user(identity, nickname, authority) {
            Ok(()) => tracing::info!(identity, "added via admin console"),
            Err(err) => {
                let _ = writeln!(output, "{err}");
            }
        }
    }

    fn cmd_delete(&self, args: &[&str], output: &mut impl Write) {
        let [identity] = args else {
            let _ = writeln!(output, "usage: delete <id>");
            return;
        };
        if let Err(err) = self.manager.delete_user(identity) {
            let _ = writeln!(output, "{err}");
        }
    }

    fn cmd_deleteall(&self, output: &mut impl Write) {
        for identity in self.manager.get_users_info(&[], false).keys() {
            let _ = self.manager.delete_user(identity);
        }
        let _ = writeln!(output, "all users deleted");
    }

    fn cmd_reset(&self, args: &[&str], output: &mut impl Write) {
        let [identity] = args else {
            let _ = writeln!(output, "usage: reset <id>");
            return;
        };
        if let Err(err) = self.manager.reset_user(identity) {
            let _ = writeln!(output, "{err}");
        }
    }

    fn cmd_list(&self, must_online: bool, output: &mut impl Write) {
        let users = self.manager.get_users_info(&[], must_online);
        if users.is_empty() {
            let _ = writeln!(output, "(none)");
            return;
        }
        for (identity, info) in users {
            let _ = writeln!(
                output,
                "{identity} {} {} mode={}",
                info.nickname,
                info.authority.as_str(),
                info.mode
            );
        }
    }

    fn cmd_load(&self, args: &[&str], output: &mut impl Write) {
        let [path] = args else {
            let _ = writeln!(output, "usage: load <file>");
            return;
        };
        match roster::load(&self.manager, &PathBuf::from(path)) {
            Ok(count) => {
                let _ = writeln!(output, "added {count} users");
            }
            Err(err) => {
                let _ = writeln!(output, "{err}");
            }
        }
    }

    fn cmd_save(&self, args: &[&str], output: &mut impl Write) {
        let [path] = args else {
            let _ = writeln!(output, "usage: save <file>");
            return;
        };
        match roster::save(&self.manager, &PathBuf::from(path)) {
            Ok(count) => {
                let _ = writeln!(output, "saved {count} users");
            }
            Err(err) => {
                let _ = writeln!(output, "{err}");
            }
        }
    }
}

/// Entry point used by `main`: wraps real stdin/stdout.
pub fn run_on_stdio(manager: Arc<UsersTextManager>, port: u16, stop: Arc<AtomicBool>) {
    let console = AdminConsole::new(manager, port, stop);
    console.run(io::stdin().lock(), io::stdout());
}

#[cfg(test)]
mod tests {
    use super::*;
    use synctext_lib::TextPersistence;

    fn console_in_temp_dir() -> (AdminConsole, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let manager = Arc::new(UsersTextManager::new(TextPersistence::new(dir.path().join("text.txt"))));
        (
            AdminConsole::new(manager, 4000, Arc::new(AtomicBool::new(false))),
            dir,
        )
    }

    #[test]
    fn add_then_list_shows_the_user() {
        let (console, _dir) = console_in_temp_dir();
        let mut output = Vec::new();
        console.dispatch("add alice Alice RW", &mut output);
        console.dispatch("list", &mut output);
        let text = String::from_utf8(output).unwrap();
        assert!(text.contains("alice Alice RW"));
    }

    #[test]
    fn unknown_command_does_not_stop_the_console() {
        let (console, _dir) = console_in_temp_dir();
        let mut output = Vec::new();
        let stop = console.dispatch("frobnicate", &mut output);
        assert!(!stop);
        assert!(String::from_utf8(output).unwrap().contains("unknown command"));
    }

    #[test]
    fn exit_stops_the_console() {
        let (console, _dir) = console_in_temp_dir();
        let mut output = Vec::new();
        assert!(console.dispatch("exit", &mut output));
    }

    #[test]
    fn port_prints_configured_port() {
        let (console, _dir) = console_in_temp_dir();
        let mut output = Vec::new();
        console.dispatch("port", &mut output);
        assert_eq!(String::from_utf8(output).unwrap().trim(), "4000");
    }

    #[test]
    fn add_with_missing_args_prints_usage() {
        let (console, _dir) = console_in_temp_dir();
        let mut output = Vec::new();
        console.dispatch("add alice", &mut output);
        assert!(String::from_utf8(output).unwrap().contains("usage: add"));
    }
}
