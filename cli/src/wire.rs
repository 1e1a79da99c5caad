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

//! Wire framing: a 10-ASCII-digit zero-padded length prefix, a zlib
//! (level 2) compressed body, and UTF-8 JSON inside that.

use std::io::{Read, Write};

use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::WireError;

const HEADER_LEN: usize = 10;
/// Defensive cap on a single frame's compressed size, well past anything a
/// real editing session produces, to keep a corrupt or hostile length
/// prefix from driving an unbounded allocation.
const MAX_FRAME_LEN: usize = 64 * 1024 * 1024;

/// Read one length-prefixed, zlib-compressed JSON frame from `reader` and
/// decode it as `T`.
pub fn read_frame<T: DeserializeOwned>(reader: &mut impl Read) -> Result<T, WireError> {
    let mut header = [0u8; HEADER_LEN];
    read_exact_or_eof(reader, &mut header)?;
    let header_str = std::str::from_utf8(&header).map_err(|_| WireError::BadLengthPrefix(header.to_vec()))?;
    let body_len: usize = header_str
        .trim()
        .parse()
        .map_err(|_| WireError::BadLengthPrefix(header.to_vec()))?;
    if body_len > MAX_FRAME_LEN {
        return Err(WireError::FrameTooLarge(body_len));
    }

    let mut compressed = vec![0u8; body_len];
    read_exact_resuming(reader, &mut compressed)?;

    let mut decoder = ZlibDecoder::new(&compressed[..]);
    let mut decompressed = Vec::new();
    decoder
        .read_to_end(&mut decompressed)
        .map_err(WireError::Decompress)?;

    let text = String::from_utf8(decompressed)?;
    Ok(serde_json::from_str(&text)?)
}

/// Encode `value` as JSON, compress it, and write it as one length-prefixed
/// frame to `writer`.
pub fn write_frame<T: Serialize>(writer: &mut impl Write, value: &T) -> Result<(), WireError> {
    let text = serde_json::to_string(value)?;
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::new(2));
    encoder.write_all(text.as_bytes())?;
    let compressed = encoder.finish()?;

    if compressed.len() > MAX_FRAME_LEN {
        return Err(WireError::FrameTooLarge(compressed.len()));
    }
    let header = format!("{:0width$}", compressed.len(), width = HEADER_LEN);
    writer.write_all(header.as_bytes())?;
    writer.write_all(&compressed)?;
    writer.flush()?;
    Ok(())
}

/// Like `read_exact`, but a zero-byte read before anything is consumed is
/// reported as a clean [`WireError::Eof`] rather than an I/O error.
///
/// A read timeout is only surfaced to the caller while `buf` is still
/// completely empty, i.e. while we're idle between frames — that's the one
/// point a caller can safely poll for shutdown and retry from scratch.
/// Once any header byte has arrived, a timeout instead loops and resumes the
/// same read, since bailing out here would hand the connection loop a
/// partial header to discard and silently desync the stream.
fn read_exact_or_eof(reader: &mut impl Read, buf: &mut [u8]) -> Result<(), WireError> {
    let mut filled = 0;
    while filled < buf.len() {
        let read = match reader.read(&mut buf[filled..]) {
            Ok(read) => read,
            Err(err) if filled > 0 && is_timeout(&err) => continue,
            Err(err) => return Err(err.into()),
        };
        if read == 0 {
            if filled == 0 {
                return Err(WireError::Eof);
            }
            return Err(WireError::BadLengthPrefix(buf[..filled].to_vec()));
        }
        filled += read;
    }
    Ok(())
}

/// Like `read_exact`, but a read timeout always loops and resumes the same
/// read rather than surfacing to the caller. Used for the frame body, where
/// the header has already been consumed, so there is no longer a frame
/// boundary a timeout could safely bail out to.
fn read_exact_resuming(reader: &mut impl Read, buf: &mut [u8]) -> Result<(), WireError> {
    let mut filled = 0;
    while filled < buf.len() {
        let read = match reader.read(&mut buf[filled..]) {
            Ok(read) => read,
            Err(err) if is_timeout(&err) => continue,
            Err(err) => return Err(err.into()),
        };
        if read == 0 {
            return Err(std::io::Error::from(std::io::ErrorKind::UnexpectedEof).into());
        }
        filled += read;
    }
    Ok(())
}

fn is_timeout(err: &std::io::Error) -> bool {
    matches!(
        err.kind(),
        std::io::ErrorKind::WouldBlock | std::io::ErrorKind::TimedOut
    )
}
