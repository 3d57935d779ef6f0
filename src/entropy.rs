//! Byte-level entropy stream used to drive structure-aware fuzzing.
//!
//! A source yields one byte at a time from any reader; a sink accepts bytes and
//! reports how many were written. A sink over `Cursor<&mut [u8]>` is bounded by the
//! slice, a sink over `Vec<u8>` grows.

use byteorder::{ReadBytesExt, WriteBytesExt};
use std::io::{self, Read, Write};

#[derive(Debug, thiserror::Error)]
pub enum EntropyError {
    #[error("entropy source exhausted")]
    Exhausted,
    #[error("entropy sink is full")]
    SinkFull,
    #[error("IO: {0}")]
    Io(#[from] io::Error),
    /// The IE list handed to serialize does not line up with the container's fields.
    #[error("internal: {container} consumed {consumed} of {total} IEs")]
    Internal {
        container: String,
        consumed: usize,
        total: usize,
    },
    #[error("value codec: {0}")]
    Value(String),
}

impl EntropyError {
    fn from_read(e: io::Error) -> Self {
        match e.kind() {
            io::ErrorKind::UnexpectedEof => EntropyError::Exhausted,
            _ => EntropyError::Io(e),
        }
    }

    fn from_write(e: io::Error) -> Self {
        match e.kind() {
            io::ErrorKind::WriteZero => EntropyError::SinkFull,
            _ => EntropyError::Io(e),
        }
    }
}

pub struct EntropySource<R> {
    reader: R,
    consumed: usize,
}

impl<R: Read> EntropySource<R> {
    pub fn new(reader: R) -> Self {
        EntropySource { reader, consumed: 0 }
    }

    pub fn get_byte(&mut self) -> Result<u8, EntropyError> {
        let b = self.reader.read_u8().map_err(EntropyError::from_read)?;
        self.consumed += 1;
        Ok(b)
    }

    /// Bytes taken from the source so far.
    pub fn consumed(&self) -> usize {
        self.consumed
    }
}

impl<'a> EntropySource<&'a [u8]> {
    pub fn from_bytes(bytes: &'a [u8]) -> Self {
        EntropySource::new(bytes)
    }
}

pub struct EntropySink<W> {
    writer: W,
    written: usize,
}

impl<W: Write> EntropySink<W> {
    pub fn new(writer: W) -> Self {
        EntropySink { writer, written: 0 }
    }

    /// Write one byte; returns the number of bytes written (always 1).
    pub fn put_byte(&mut self, b: u8) -> Result<usize, EntropyError> {
        self.writer.write_u8(b).map_err(EntropyError::from_write)?;
        self.written += 1;
        Ok(1)
    }

    pub fn written(&self) -> usize {
        self.written
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn source_reads_then_exhausts() {
        let mut src = EntropySource::from_bytes(&[1, 2]);
        assert_eq!(src.get_byte().unwrap(), 1);
        assert_eq!(src.get_byte().unwrap(), 2);
        assert!(matches!(src.get_byte(), Err(EntropyError::Exhausted)));
        assert_eq!(src.consumed(), 2);
    }

    #[test]
    fn bounded_sink_reports_full() {
        let mut buf = [0u8; 2];
        let mut sink = EntropySink::new(Cursor::new(&mut buf[..]));
        assert_eq!(sink.put_byte(7).unwrap(), 1);
        assert_eq!(sink.put_byte(8).unwrap(), 1);
        assert!(matches!(sink.put_byte(9), Err(EntropyError::SinkFull)));
        assert_eq!(sink.written(), 2);
        assert_eq!(buf, [7, 8]);
    }

    #[test]
    fn vec_sink_grows() {
        let mut sink = EntropySink::new(Vec::new());
        for b in 0..10u8 {
            sink.put_byte(b).unwrap();
        }
        assert_eq!(sink.into_inner(), (0..10u8).collect::<Vec<_>>());
    }
}
