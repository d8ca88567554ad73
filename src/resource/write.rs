//! Body writing.
//!
//! The responder commits headers first and only then runs the resource's
//! [`WriteCallback`]. [`write_stream`] adapts any `Read` source onto the
//! response sink.

use std::io::{self, Read, Write};

use crate::http::response::WebResponse;
use crate::resource::attributes::Attributes;
use crate::resource::error::ResourceError;

/// Size of the buffer used when copying a stream into the response.
pub const COPY_BUFFER_SIZE: usize = 4096;

/// Single-use capability that writes the body of a resource response.
pub trait WriteCallback: Send {
    fn write_data(self: Box<Self>, attributes: &mut Attributes<'_>) -> Result<(), ResourceError>;
}

impl<F> WriteCallback for F
where
    F: FnOnce(&mut Attributes<'_>) -> Result<(), ResourceError> + Send,
{
    fn write_data(self: Box<Self>, attributes: &mut Attributes<'_>) -> Result<(), ResourceError> {
        (*self)(attributes)
    }
}

/// Write callback that streams a reader into the response.
pub struct StreamWriteCallback<R> {
    stream: R,
}

impl<R: Read + Send> StreamWriteCallback<R> {
    pub fn new(stream: R) -> Self {
        Self { stream }
    }
}

impl<R: Read + Send> WriteCallback for StreamWriteCallback<R> {
    fn write_data(self: Box<Self>, attributes: &mut Attributes<'_>) -> Result<(), ResourceError> {
        write_stream(attributes, self.stream).map(|_| ())
    }
}

/// Copy `stream` into the response. Returns the number of bytes written.
///
/// An I/O failure aborts the copy; nothing already written is rolled back.
pub fn write_stream<R: Read>(attributes: &mut Attributes<'_>, stream: R) -> Result<u64, ResourceError> {
    let mut output = ResponseOutput::new(attributes.response());
    let copied = copy(stream, &mut output)?;
    tracing::trace!(bytes = copied, writes = output.writes(), "Resource stream written");
    Ok(copied)
}

/// Copy all of `reader` into `writer` one buffer at a time.
pub fn copy<R: Read, W: Write>(mut reader: R, writer: &mut W) -> io::Result<u64> {
    let mut buffer = [0u8; COPY_BUFFER_SIZE];
    let mut total = 0u64;
    loop {
        let read = match reader.read(&mut buffer) {
            Ok(0) => break,
            Ok(read) => read,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        writer.write_all(&buffer[..read])?;
        total += read as u64;
    }
    Ok(total)
}

/// `io::Write` view of a [`WebResponse`]; one response write per call.
pub struct ResponseOutput<'r> {
    response: &'r mut dyn WebResponse,
    writes: usize,
}

impl<'r> ResponseOutput<'r> {
    pub fn new(response: &'r mut dyn WebResponse) -> Self {
        Self { response, writes: 0 }
    }

    /// Write `len` bytes of `buffer` starting at `offset`.
    ///
    /// A range covering the whole buffer goes straight through. A partial
    /// range is passed as a borrowed sub-slice and deliberately not copied
    /// into a fresh buffer: the sink receives the same bytes either way.
    pub fn write_range(&mut self, buffer: &[u8], offset: usize, len: usize) -> io::Result<()> {
        if offset == 0 && len == buffer.len() {
            return self.write_all(buffer);
        }
        let end = offset
            .checked_add(len)
            .filter(|end| *end <= buffer.len())
            .ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("range {}+{} exceeds buffer of {} bytes", offset, len, buffer.len()),
                )
            })?;
        self.write_all(&buffer[offset..end])
    }

    /// Number of writes issued to the response so far.
    pub fn writes(&self) -> usize {
        self.writes
    }
}

impl Write for ResponseOutput<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        self.response.write(buf)?;
        self.writes += 1;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.response.flush()
    }
}
