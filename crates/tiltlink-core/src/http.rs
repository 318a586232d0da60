//! Minimal HTTP/1.1 framing for a single POST exchange.

use core::{fmt::Write, task::Poll};

use heapless::{String, Vec};

use crate::{
    delivery::TransportFailure,
    url::{CollectorUrl, DEFAULT_HTTP_PORT},
};

/// Request line plus headers; the collector URL and a handful of headers fit easily.
pub const REQUEST_HEAD_CAPACITY: usize = 384;

pub type RequestHead = String<REQUEST_HEAD_CAPACITY>;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Header {
    pub name: &'static str,
    pub value: &'static str,
}

impl Header {
    pub const fn new(name: &'static str, value: &'static str) -> Self {
        Self { name, value }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum HttpError {
    /// Request head did not fit its buffer.
    HeadTooLarge,
    /// Not enough bytes yet to decide.
    Incomplete,
    /// Response does not start with `HTTP/1.x NNN`.
    MalformedStatusLine,
}

/// Writes a `POST` request head terminated by the blank line.
///
/// `Host`, `Content-Length` and `Connection: close` are always emitted;
/// `headers` go in between, in order.
pub fn write_post_head(
    url: &CollectorUrl,
    headers: &[Header],
    content_length: usize,
) -> Result<RequestHead, HttpError> {
    let mut head = RequestHead::new();
    write_head_into(&mut head, url, headers, content_length).map_err(|_| HttpError::HeadTooLarge)?;
    Ok(head)
}

fn write_head_into(
    head: &mut RequestHead,
    url: &CollectorUrl,
    headers: &[Header],
    content_length: usize,
) -> core::fmt::Result {
    write!(head, "POST {}{} HTTP/1.1\r\n", url.path(), url.query())?;
    if url.port() == DEFAULT_HTTP_PORT {
        write!(head, "Host: {}\r\n", url.host())?;
    } else {
        write!(head, "Host: {}:{}\r\n", url.host(), url.port())?;
    }
    for header in headers {
        write!(head, "{}: {}\r\n", header.name, header.value)?;
    }
    write!(head, "Content-Length: {}\r\n", content_length)?;
    head.write_str("Connection: close\r\n\r\n")
}

/// `HTTP/1.x NNN` followed by one delimiter byte.
pub const STATUS_PREFIX_LEN: usize = 13;

const VERSION_PREFIX: &[u8] = b"HTTP/1.";

/// Parses the status code from the start of a response.
///
/// Only the version and code are inspected, so the reason phrase may be any
/// length. Returns `Incomplete` while `buf` is a valid but short prefix.
pub fn parse_status_line(buf: &[u8]) -> Result<u16, HttpError> {
    let mut code = 0u16;
    for (index, &byte) in buf.iter().take(STATUS_PREFIX_LEN).enumerate() {
        let valid = match index {
            0..=6 => byte == VERSION_PREFIX[index],
            7 => byte.is_ascii_digit(),
            8 => byte == b' ',
            9..=11 => {
                code = code * 10 + u16::from(byte.wrapping_sub(b'0'));
                byte.is_ascii_digit()
            }
            _ => matches!(byte, b' ' | b'\r' | b'\n'),
        };
        if !valid {
            return Err(HttpError::MalformedStatusLine);
        }
    }

    if buf.len() < STATUS_PREFIX_LEN {
        return Err(HttpError::Incomplete);
    }
    Ok(code)
}

/// Accumulates response chunks until the status code can be decided.
#[derive(Debug, Default)]
pub struct StatusLineReader {
    prefix: Vec<u8, STATUS_PREFIX_LEN>,
}

impl StatusLineReader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds the next chunk read from the connection; an empty chunk means
    /// the peer closed it.
    pub fn push(&mut self, chunk: &[u8]) -> Poll<Result<u16, TransportFailure>> {
        if chunk.is_empty() {
            return Poll::Ready(Err(TransportFailure::ConnectionLost));
        }

        let take = chunk.len().min(self.prefix.capacity() - self.prefix.len());
        // Capacity is checked right above.
        let _ = self.prefix.extend_from_slice(&chunk[..take]);

        match parse_status_line(&self.prefix) {
            Ok(status) => Poll::Ready(Ok(status)),
            Err(HttpError::Incomplete) => Poll::Pending,
            Err(_) => Poll::Ready(Err(TransportFailure::NoHttpServer)),
        }
    }

    /// Bytes buffered so far.
    pub fn buffered(&self) -> usize {
        self.prefix.len()
    }
}
