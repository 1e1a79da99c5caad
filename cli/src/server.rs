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

//! The TCP transport: one accept loop polling at 8 Hz, and one worker
//! thread per connection decoding frames until the peer disconnects or the
//! server is shutting down.

use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use synctext_lib::{request, UsersTextManager};

use crate::error::WireError;
use crate::wire;

/// How often the accept loop checks the shutdown flag.
const POLL_INTERVAL: Duration = Duration::from_millis(125);
/// Per-socket read/write timeout, re-armed after every timed-out poll so a
/// worker notices shutdown promptly without busy-spinning.
const SOCKET_TIMEOUT: Duration = Duration::from_secs(1);

pub struct Server {
    listener: TcpListener,
    manager: Arc<UsersTextManager>,
    stop: Arc<AtomicBool>,
}

impl Server {
    pub fn bind(port: u16, manager: Arc<UsersTextManager>, stop: Arc<AtomicBool>) -> std::io::Result<Self> {
        let listener = TcpListener::bind(("0.0.0.0", port))?;
        listener.set_nonblocking(true)?;
        Ok(Self {
            listener,
            manager,
            stop,
        })
    }

    pub fn local_port(&self) -> std::io::Result<u16> {
        Ok(self.listener.local_addr()?.port())
    }

    /// Accept connections until the shutdown flag is set, spawning one
    /// worker thread per connection and joining them all before returning.
    pub fn run(self) {
        let mut workers = Vec::new();
        while !self.stop.load(Ordering::Relaxed) {
            match self.listener.accept() {
                Ok((stream, addr)) => {
                    tracing::info!(%addr, "connection accepted");
                    let manager = self.manager.clone();
                    let stop = self.stop.clone();
                    workers.push(thread::spawn(move || handle_connection(stream, &manager, &stop)));
                }
                Err(err) if err.kind() == std::io::ErrorKind::WouldBlock => {
                    thread::sleep(POLL_INTERVAL);
                }
                Err(err) => {
                    tracing::warn!(%err, "accept failed");
                    thread::sleep(POLL_INTERVAL);
                }
            }
        }
        for worker in workers {
            let _ = worker.join();
        }
    }
}

fn handle_connection(stream: TcpStream, manager: &UsersTextManager, stop: &AtomicBool) {
    if let Err(err) = stream.set_read_timeout(Some(SOCKET_TIMEOUT)) {
        tracing::warn!(%err, "failed to set read timeout");
        return;
    }
    if let Err(err) = stream.set_write_timeout(Some(SOCKET_TIMEOUT)) {
        tracing::warn!(%err, "failed to set write timeout");
        return;
    }

    let mut reader = stream.try_clone().expect("clone socket for reading");
    let mut writer = stream;

    while !stop.load(Ordering::Relaxed) {
        let request: request::Request = match wire::read_frame(&mut reader) {
            Ok(request) => request,
            Err(WireError::Io(ref err))
                if matches!(
                    err.kind(),
                    std::io::ErrorKind::WouldBlock | std::io::ErrorKind::TimedOut
                ) =>
            {
                continue;
            }
            Err(WireError::Eof) => {
                tracing::debug!("connection closed by peer");
                return;
            }
            Err(err) => {
                tracing::warn!(%err, "frame decode failed, closing connection");
                return;
            }
        };

        let response = request::handle(manager, request);
        if let Err(err) = wire::write_frame(&mut writer, &response) {
            tracing::warn!(%err, "failed to write response, closing connection");
            return;
        }
    }
}
