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

//! Process entry point: parses arguments, sets up logging, and wires the
//! TCP server, the admin console, and a shutdown handler around a shared
//! [`UsersTextManager`].

mod admin;
mod error;
mod roster;
mod server;
mod wire;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use clap::Parser;
use synctext_lib::{TextPersistence, UsersTextManager};
use tracing_subscriber::EnvFilter;

/// Standalone server for a shared, reconciled text buffer.
#[derive(Parser, Debug)]
#[command(name = "synctextd", version, about)]
struct Args {
    /// TCP port to listen on.
    port: u16,
    /// Roster file loaded at startup (one `<id> <nick> <RO|RW>` per line).
    user_roster_file: PathBuf,
    /// File holding the shared buffer's text across restarts.
    text_file: PathBuf,
}

fn main() -> ExitCode {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    if let Err(err) = run(args) {
        tracing::error!(%err, "server exited with an error");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

#[derive(Debug, thiserror::Error)]
enum RunError {
    #[error("failed to bind port: {0}")]
    Bind(#[source] std::io::Error),
    #[error("failed to load initial roster: {0}")]
    Roster(#[from] error::RosterError),
    #[error("failed to install signal handler: {0}")]
    Signal(#[source] std::io::Error),
}

fn run(args: Args) -> Result<(), RunError> {
    let manager = Arc::new(UsersTextManager::new(TextPersistence::new(&args.text_file)));
    roster::load(&manager, &args.user_roster_file)?;

    let stop = Arc::new(AtomicBool::new(false));
    install_shutdown_handler(&stop).map_err(RunError::Signal)?;

    let server = server::Server::bind(args.port, manager.clone(), stop.clone()).map_err(RunError::Bind)?;
    let port = server.local_port().map_err(RunError::Bind)?;
    tracing::info!(port, "listening");

    let server_thread = thread::spawn(move || server.run());

    admin::run_on_stdio(manager, port, stop.clone());
    stop.store(true, Ordering::Relaxed);

    let _ = server_thread.join();
    Ok(())
}

fn install_shutdown_handler(stop: &Arc<AtomicBool>) -> std::io::Result<()> {
    signal_hook::flag::register(signal_hook::consts::SIGINT, stop.clone())?;
    signal_hook::flag::register(signal_hook::consts::SIGTERM, stop.clone())?;
    Ok(())
}
