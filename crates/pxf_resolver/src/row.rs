//! Rows read from a fragment.
use std::io::BufRead;

use bytes::Bytes;
use tracing::trace;

use crate::errors::{ResolverError, Result};

/// A single physical row read from a fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRow {
    /// Byte offset of the row within the fragment, if known.
    pub offset: Option<u64>,
    pub data: Bytes,
}

impl RawRow {
    pub fn new(data: impl Into<Bytes>) -> Self {
        RawRow {
            offset: None,
            data: data.into(),
        }
    }

    pub fn with_offset(data: impl Into<Bytes>, offset: u64) -> Self {
        RawRow {
            offset: Some(offset),
            data: data.into(),
        }
    }

    /// Get the row's content as a string.
    pub fn content(&self) -> Result<&str> {
        std::str::from_utf8(&self.data).map_err(|e| match self.offset {
            Some(offset) => {
                ResolverError::RowRead(format!("row at offset {offset} is not valid utf8: {e}"))
            }
            None => ResolverError::RowRead(format!("row is not valid utf8: {e}")),
        })
    }
}

/// Pull-based source of rows for a fragment.
pub trait RowSource {
    /// Read the next row.
    ///
    /// Returns `Ok(None)` once the fragment is exhausted.
    fn next_row(&mut self) -> Result<Option<RawRow>>;
}

impl<S: RowSource + ?Sized> RowSource for &mut S {
    fn next_row(&mut self) -> Result<Option<RawRow>> {
        (**self).next_row()
    }
}

/// Row source producing one row per line of text.
///
/// Line terminators (`\n` or `\r\n`) are stripped. The row offset is the
/// byte offset of the start of the line.
#[derive(Debug)]
pub struct LineRowSource<R> {
    reader: R,
    offset: u64,
    buf: Vec<u8>,
}

impl<R: BufRead> LineRowSource<R> {
    pub fn new(reader: R) -> Self {
        LineRowSource {
            reader,
            offset: 0,
            buf: Vec::new(),
        }
    }
}

impl<R: BufRead> RowSource for LineRowSource<R> {
    fn next_row(&mut self) -> Result<Option<RawRow>> {
        self.buf.clear();
        let start = self.offset;
        let result = self.reader.read_until(b'\n', &mut self.buf);

        // Bytes pulled from the reader are consumed even if the read failed
        // part way through a line.
        self.offset += self.buf.len() as u64;

        if let Err(e) = result {
            return Err(ResolverError::RowRead(format!(
                "at offset {start}, {} byte(s) of the line discarded: {e}",
                self.buf.len()
            )));
        }

        if self.buf.is_empty() {
            return Ok(None);
        }

        let mut line = self.buf.as_slice();
        if let Some(rest) = line.strip_suffix(b"\n") {
            line = rest;
            if let Some(rest) = line.strip_suffix(b"\r") {
                line = rest;
            }
        }

        trace!(offset = start, len = line.len(), "read line");

        Ok(Some(RawRow::with_offset(Bytes::copy_from_slice(line), start)))
    }
}
