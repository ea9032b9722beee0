//! Header emission through an injected sink.
//!
//! The core never touches a live response. Hosts implement [`HeaderSink`] over
//! their transport; `send_header` refuses to write once output has started.

use std::fmt;

use crate::builder::HeaderBuilder;
use crate::header::split_header_line;

/// Destination for a single HTTP header line.
pub trait HeaderSink {
    /// Whether response headers have already been flushed.
    fn headers_sent(&self) -> bool;

    /// Write one `name: value` header.
    fn write_header(&mut self, name: &str, value: &str);
}

/// Reason a header was not emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmitError {
    /// The sink already flushed its headers.
    HeadersAlreadySent,
    /// No pins are configured, so there is no header to send.
    NothingToSend,
}

impl fmt::Display for EmitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EmitError::HeadersAlreadySent => write!(f, "headers already sent"),
            EmitError::NothingToSend => write!(f, "no pins configured; nothing to send"),
        }
    }
}

impl std::error::Error for EmitError {}

/// Compile (if needed) and write the pinning header to `sink`.
pub fn send_header<S: HeaderSink + ?Sized>(
    builder: &mut HeaderBuilder,
    sink: &mut S,
) -> Result<(), EmitError> {
    if sink.headers_sent() {
        tracing::warn!("Public-Key-Pins not sent: headers already sent");
        return Err(EmitError::HeadersAlreadySent);
    }
    let line = split_header_line(builder.header()).ok_or(EmitError::NothingToSend)?;
    sink.write_header(line.name, line.value);
    Ok(())
}

/// In-memory sink that records written headers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordingSink {
    headers: Vec<(String, String)>,
    sent: bool,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark headers as flushed; later sends are refused.
    pub fn flush(&mut self) {
        self.sent = true;
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }
}

impl HeaderSink for RecordingSink {
    fn headers_sent(&self) -> bool {
        self.sent
    }

    fn write_header(&mut self, name: &str, value: &str) {
        self.headers.push((name.to_string(), value.to_string()));
    }
}
