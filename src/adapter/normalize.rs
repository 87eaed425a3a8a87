//! Turning backend exchanges into [`ResultItem`]s.
//!
//! Both call paths share these rules. The only difference between them is
//! how much of a non-200 response ends up in the error message, selected by
//! [`ErrorDetail`].

use serde_json::Value;

use crate::adapter::error::AdapterError;
use crate::adapter::job::ResultItem;

/// How much of a failed response to report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorDetail {
    /// `HTTP <status>` (model listing).
    StatusOnly,
    /// `HTTP <status>: <body>` (forwarding).
    StatusWithBody,
}

/// Normalize a fully-read backend response.
///
/// Success bodies are decoded strictly; invalid UTF-8 is a decode error.
pub fn normalize_response(status: u16, body: &[u8], detail: ErrorDetail) -> ResultItem {
    if status != 200 {
        return status_error(status, &String::from_utf8_lossy(body), detail);
    }

    match serde_json::from_slice::<Value>(body) {
        Ok(value) => ResultItem::success(value),
        Err(e) => normalize_error(&AdapterError::from(e)),
    }
}

/// Error item for a non-200 status.
pub fn status_error(status: u16, body: &str, detail: ErrorDetail) -> ResultItem {
    match detail {
        ErrorDetail::StatusOnly => ResultItem::error(format!("HTTP {status}")),
        ErrorDetail::StatusWithBody => ResultItem::error(format!("HTTP {status}: {body}")),
    }
}

/// Error item for a transport or decode failure.
pub fn normalize_error(err: &AdapterError) -> ResultItem {
    ResultItem::error(err.to_string())
}

/// Incremental decoder for newline-delimited JSON bodies.
///
/// Chunks may split lines anywhere; partial lines are buffered until the
/// newline arrives or [`finish`](Self::finish) is called. After the first
/// undecodable line the decoder yields that error and nothing else.
#[derive(Debug, Default)]
pub struct NdjsonDecoder {
    buf: Vec<u8>,
    /// Prefix of `buf` already known to hold no newline.
    scanned: usize,
    emitted: usize,
    failed: bool,
}

impl NdjsonDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk, returning the items for every line it completes.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<ResultItem> {
        if self.failed {
            return Vec::new();
        }
        self.buf.extend_from_slice(chunk);

        let mut items = Vec::new();
        while let Some(offset) = self.buf[self.scanned..].iter().position(|&b| b == b'\n') {
            let pos = self.scanned + offset;
            let line: Vec<u8> = self.buf.drain(..=pos).collect();
            self.scanned = 0;
            if let Some(item) = self.decode_line(&line) {
                items.push(item);
                if self.failed {
                    self.buf.clear();
                    return items;
                }
            }
        }
        self.scanned = self.buf.len();
        items
    }

    /// Flush the trailing line at end of body.
    ///
    /// Returns an error item if the body held no JSON at all, so a stream
    /// never ends without output.
    pub fn finish(&mut self) -> Option<ResultItem> {
        if self.failed {
            return None;
        }
        let rest = std::mem::take(&mut self.buf);
        self.scanned = 0;
        if let Some(item) = self.decode_line(&rest) {
            return Some(item);
        }
        if self.emitted == 0 {
            self.failed = true;
            return Some(normalize_error(&AdapterError::EmptyBody));
        }
        None
    }

    /// True once a line failed to decode.
    pub fn is_failed(&self) -> bool {
        self.failed
    }

    /// Number of items produced so far.
    pub fn emitted(&self) -> usize {
        self.emitted
    }

    fn decode_line(&mut self, line: &[u8]) -> Option<ResultItem> {
        let line = trim_ascii(line);
        if line.is_empty() {
            return None;
        }

        self.emitted += 1;
        match serde_json::from_slice::<Value>(line) {
            Ok(value) => Some(ResultItem::success(value)),
            Err(e) => {
                self.failed = true;
                Some(normalize_error(&AdapterError::from(e)))
            }
        }
    }
}

fn trim_ascii(bytes: &[u8]) -> &[u8] {
    let start = bytes
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(bytes.len());
    let end = bytes
        .iter()
        .rposition(|b| !b.is_ascii_whitespace())
        .map_or(start, |i| i + 1);
    &bytes[start..end]
}
