//! Length-prefixed framing over a byte stream.
//!
//! Request frame:  `[mode u8][len u32 LE][envelope]`, mode 1 = sync, 2 = async
//! Response frame: `[status u8][len u32 LE][payload]`, status 0 = ok, 1 = error
//!
//! Sync requests get exactly one response frame; an error frame carries the
//! UTF-8 error message. Async requests get none.

use std::io::{self, Read, Write};

use tracing::{debug, info, warn};

use super::{OneWayTransport, Transport, TransportError};
use crate::server::Dispatcher;

pub const MODE_SYNC: u8 = 1;
pub const MODE_ASYNC: u8 = 2;
pub const STATUS_OK: u8 = 0;
pub const STATUS_ERROR: u8 = 1;

/// Default upper bound for a frame payload (16 MiB).
pub const DEFAULT_MAX_FRAME_BYTES: usize = 16 * 1024 * 1024;

const HEADER_LEN: usize = 5;

/// Write one frame and flush.
pub fn write_frame<W: Write + ?Sized>(
    writer: &mut W,
    tag: u8,
    payload: &[u8],
    max_frame_bytes: usize,
) -> Result<(), TransportError> {
    let too_large = TransportError::FrameTooLarge {
        size: payload.len(),
        max: max_frame_bytes,
    };
    if payload.len() > max_frame_bytes {
        return Err(too_large);
    }
    let len = u32::try_from(payload.len()).map_err(|_| too_large)?;

    let mut header = [0u8; HEADER_LEN];
    header[0] = tag;
    header[1..].copy_from_slice(&len.to_le_bytes());

    writer.write_all(&header)?;
    writer.write_all(payload)?;
    writer.flush()?;
    Ok(())
}

/// Read one frame.
///
/// Returns `None` on a clean end of stream at a frame boundary; a stream
/// that ends mid-frame is an error.
pub fn read_frame<R: Read + ?Sized>(
    reader: &mut R,
    max_frame_bytes: usize,
) -> Result<Option<(u8, Vec<u8>)>, TransportError> {
    let mut header = [0u8; HEADER_LEN];
    let mut filled = 0;
    while filled < HEADER_LEN {
        match reader.read(&mut header[filled..]) {
            Ok(0) if filled == 0 => return Ok(None),
            Ok(0) => {
                return Err(TransportError::InvalidFrame(
                    "unexpected EOF inside frame header".to_string(),
                ))
            }
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }

    let size = u32::from_le_bytes([header[1], header[2], header[3], header[4]]) as usize;
    if size > max_frame_bytes {
        return Err(TransportError::FrameTooLarge {
            size,
            max: max_frame_bytes,
        });
    }

    let mut payload = vec![0u8; size];
    reader.read_exact(&mut payload).map_err(|e| {
        if e.kind() == io::ErrorKind::UnexpectedEof {
            TransportError::InvalidFrame("unexpected EOF inside frame payload".to_string())
        } else {
            TransportError::Io(e)
        }
    })?;

    Ok(Some((header[0], payload)))
}

/// Client side of the framed protocol.
#[derive(Debug)]
pub struct FramedTransport<R, W> {
    reader: R,
    writer: W,
    max_frame_bytes: usize,
}

impl<R: Read, W: Write> FramedTransport<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self {
            reader,
            writer,
            max_frame_bytes: DEFAULT_MAX_FRAME_BYTES,
        }
    }

    pub fn with_max_frame_bytes(mut self, max_frame_bytes: usize) -> Self {
        self.max_frame_bytes = max_frame_bytes;
        self
    }

    pub fn into_inner(self) -> (R, W) {
        (self.reader, self.writer)
    }
}

impl<R: Read, W: Write> Transport for FramedTransport<R, W> {
    type Error = TransportError;

    fn round_trip(&mut self, request: &[u8]) -> Result<Vec<u8>, TransportError> {
        write_frame(&mut self.writer, MODE_SYNC, request, self.max_frame_bytes)?;

        match read_frame(&mut self.reader, self.max_frame_bytes)? {
            None => Err(TransportError::Closed),
            Some((STATUS_OK, payload)) => Ok(payload),
            Some((STATUS_ERROR, payload)) => Err(TransportError::Remote(
                String::from_utf8_lossy(&payload).into_owned(),
            )),
            Some((status, _)) => Err(TransportError::InvalidFrame(format!(
                "unknown response status {}",
                status
            ))),
        }
    }
}

impl<R: Read, W: Write> OneWayTransport for FramedTransport<R, W> {
    type Error = TransportError;

    fn send(&mut self, request: &[u8]) -> Result<(), TransportError> {
        write_frame(&mut self.writer, MODE_ASYNC, request, self.max_frame_bytes)
    }
}

/// Counters reported when [`serve`] returns.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ServeStats {
    pub sync_calls: u64,
    pub async_calls: u64,
    pub failed_calls: u64,
}

/// Serve framed requests until the peer closes the stream.
///
/// Dispatch failures on sync requests become error frames and the loop
/// continues. Async failures are logged only. Framing errors end the loop
/// with an error, since the stream can no longer be trusted.
pub fn serve<R, W>(
    dispatcher: &Dispatcher,
    reader: &mut R,
    writer: &mut W,
    max_frame_bytes: usize,
) -> Result<ServeStats, TransportError>
where
    R: Read + ?Sized,
    W: Write + ?Sized,
{
    let mut stats = ServeStats::default();

    while let Some((mode, request)) = read_frame(reader, max_frame_bytes)? {
        match mode {
            MODE_SYNC => {
                stats.sync_calls += 1;
                match dispatcher.handle_sync_request(&request) {
                    Ok(response) if response.len() <= max_frame_bytes => {
                        write_frame(writer, STATUS_OK, &response, max_frame_bytes)?;
                    }
                    Ok(response) => {
                        stats.failed_calls += 1;
                        let message = format!(
                            "response of {} bytes exceeds frame limit of {} bytes",
                            response.len(),
                            max_frame_bytes
                        );
                        warn!(%message, "dropping oversized response");
                        write_frame(writer, STATUS_ERROR, message.as_bytes(), max_frame_bytes)?;
                    }
                    Err(e) => {
                        stats.failed_calls += 1;
                        warn!(error = %e, "sync call failed");
                        let message = e.to_string();
                        write_frame(writer, STATUS_ERROR, message.as_bytes(), max_frame_bytes)?;
                    }
                }
            }
            MODE_ASYNC => {
                stats.async_calls += 1;
                if let Err(e) = dispatcher.handle_async_request(&request) {
                    stats.failed_calls += 1;
                    warn!(error = %e, "async call failed");
                }
            }
            other => {
                return Err(TransportError::InvalidFrame(format!(
                    "unknown request mode {}",
                    other
                )));
            }
        }
        debug!(?stats, "frame handled");
    }

    info!(
        sync_calls = stats.sync_calls,
        async_calls = stats.async_calls,
        failed_calls = stats.failed_calls,
        "peer closed the stream"
    );
    Ok(stats)
}
