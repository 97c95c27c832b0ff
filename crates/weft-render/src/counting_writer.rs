#![forbid(unsafe_code)]

//! Counting writer for tracking bytes emitted.
//!
//! The renderer wraps its output in a [`CountingWriter`] so every draw can
//! report how many bytes reached the terminal. Unchanged regions must cost
//! zero bytes, and this is how that is checked.
//!
//! # Usage
//!
//! ```
//! use weft_render::counting_writer::CountingWriter;
//! use std::io::Write;
//!
//! let mut buffer = Vec::new();
//! let mut writer = CountingWriter::new(&mut buffer);
//!
//! writer.write_all(b"Hello, world!").unwrap();
//! assert_eq!(writer.bytes_written(), 13);
//!
//! writer.reset_counter();
//! writer.write_all(b"Hi").unwrap();
//! assert_eq!(writer.bytes_written(), 2);
//! ```

use std::io::{self, Write};

/// A write wrapper that counts bytes written.
#[derive(Debug)]
pub struct CountingWriter<W> {
    inner: W,
    bytes_written: u64,
}

impl<W> CountingWriter<W> {
    /// Create a new counting writer wrapping the given writer.
    #[inline]
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            bytes_written: 0,
        }
    }

    /// Get the number of bytes written since the last reset.
    #[inline]
    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    /// Reset the byte counter to zero.
    #[inline]
    pub fn reset_counter(&mut self) {
        self.bytes_written = 0;
    }

    /// Get a reference to the underlying writer.
    #[inline]
    pub fn inner(&self) -> &W {
        &self.inner
    }

    /// Consume the counting writer and return the inner writer.
    #[inline]
    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write> Write for CountingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.inner.write(buf)?;
        self.bytes_written += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }

    fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        self.inner.write_all(buf)?;
        self.bytes_written += buf.len() as u64;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_write_all() {
        let mut writer = CountingWriter::new(Vec::new());
        writer.write_all(b"\x1b[1;1H").unwrap();
        writer.write_all(b"x").unwrap();
        assert_eq!(writer.bytes_written(), 7);
        assert_eq!(writer.inner().as_slice(), b"\x1b[1;1Hx");
    }

    #[test]
    fn counts_partial_writes() {
        let mut writer = CountingWriter::new(Vec::new());
        let n = writer.write(b"abc").unwrap();
        assert_eq!(n, 3);
        assert_eq!(writer.bytes_written(), 3);
    }

    #[test]
    fn formatted_writes_are_counted() {
        let mut writer = CountingWriter::new(Vec::new());
        write!(writer, "{}-{}", 12, 345).unwrap();
        assert_eq!(writer.bytes_written(), 6);
    }

    #[test]
    fn reset_counter_keeps_output() {
        let mut writer = CountingWriter::new(Vec::new());
        writer.write_all(b"hello").unwrap();
        writer.reset_counter();
        assert_eq!(writer.bytes_written(), 0);
        writer.write_all(b"!").unwrap();
        assert_eq!(writer.bytes_written(), 1);
        assert_eq!(writer.into_inner(), b"hello!");
    }
}
