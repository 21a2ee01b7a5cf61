use std::io::{self, Read as _};

use crate::varint;

/// Largest up-front allocation a length field is trusted for. Anything
/// longer has to actually arrive before more space is reserved.
const MAX_PREALLOC: usize = 0x1000;

fn eof() -> io::Error {
    io::ErrorKind::UnexpectedEof.into()
}

/// A fixed-capacity read-ahead buffer.
///
/// Fixed spans (tags, part bytes, magnitudes) come out of the buffer;
/// variable-length payloads drain it and then read the remainder from
/// the underlying reader directly.
#[derive(Debug)]
pub(super) struct Input<R> {
    reader: R,
    buf: Box<[u8]>,
    start: usize,
    end: usize,
}

impl<R: io::Read> Input<R> {
    pub fn new(reader: R, capacity: usize) -> Self {
        Self {
            reader,
            buf: vec![0; capacity].into_boxed_slice(),
            start: 0,
            end: 0,
        }
    }

    pub fn available(&self) -> usize {
        self.end - self.start
    }

    /// Buffers at least `n` unread bytes. Only fixed spans are read this
    /// way, so `n` never exceeds the capacity floor.
    fn ensure(&mut self, n: usize) -> io::Result<()> {
        debug_assert!(n <= self.buf.len(), "span must fit the buffer");
        if self.available() >= n {
            return Ok(());
        }
        self.buf.copy_within(self.start..self.end, 0);
        self.end -= self.start;
        self.start = 0;
        while self.available() < n {
            match self.reader.read(&mut self.buf[self.end..]) {
                Ok(0) => return Err(eof()),
                Ok(got) => self.end += got,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }

    pub fn take_u8(&mut self) -> io::Result<u8> {
        self.ensure(1)?;
        let byte = self.buf[self.start];
        self.start += 1;
        Ok(byte)
    }

    pub fn take_array<const N: usize>(&mut self) -> io::Result<[u8; N]> {
        self.ensure(N)?;
        let mut out = [0; N];
        out.copy_from_slice(&self.buf[self.start..self.start + N]);
        self.start += N;
        Ok(out)
    }

    /// Reads a big-endian magnitude of `len` bytes, at most 8.
    pub fn take_magnitude(&mut self, len: usize) -> io::Result<u64> {
        self.ensure(len)?;
        let value = varint::from_be(&self.buf[self.start..self.start + len]);
        self.start += len;
        Ok(value)
    }

    pub fn take_vec(&mut self, len: usize) -> io::Result<Vec<u8>> {
        if len <= self.buf.len() {
            self.ensure(len)?;
            let out = self.buf[self.start..self.start + len].to_vec();
            self.start += len;
            return Ok(out);
        }
        // longer than the buffer: drain what is buffered, then stream the
        // rest from the reader directly
        let buffered = self.available();
        let mut out = Vec::with_capacity(len.min(MAX_PREALLOC).max(buffered));
        out.extend_from_slice(&self.buf[self.start..self.start + buffered]);
        self.start += buffered;
        let rest = u64::try_from(len - out.len()).map_err(|_| eof())?;
        (&mut self.reader).take(rest).read_to_end(&mut out)?;
        if out.len() < len {
            return Err(eof());
        }
        Ok(out)
    }

    /// Whether the input is exhausted: nothing buffered and the reader
    /// reports end of stream.
    pub fn at_end(&mut self) -> io::Result<bool> {
        if self.available() > 0 {
            return Ok(false);
        }
        self.start = 0;
        self.end = 0;
        loop {
            match self.reader.read(&mut self.buf) {
                Ok(0) => return Ok(true),
                Ok(got) => {
                    self.end = got;
                    return Ok(false);
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(e),
            }
        }
    }
}
