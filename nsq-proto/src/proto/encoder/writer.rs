use std::io;

use super::{BodyTooLargeError, FrameEncoder};
use crate::proto::Command;

/// An error encountered while writing a [`Command`] to an [`io::Write`]
///
/// It carries the number of bytes the writer accepted before failing.
#[derive(Debug, thiserror::Error)]
#[error("failed to write command after {written} bytes")]
pub struct WriteError {
    written: u64,
    #[source]
    source: io::Error,
}

impl WriteError {
    /// The number of bytes accepted by the writer before the failure
    #[must_use]
    pub fn written(&self) -> u64 {
        self.written
    }

    /// The error returned by the writer
    #[must_use]
    pub fn io_error(&self) -> &io::Error {
        &self.source
    }

    /// Discard the byte count, keeping the writer's error
    #[must_use]
    pub fn into_io_error(self) -> io::Error {
        self.source
    }
}

impl From<WriteError> for io::Error {
    fn from(value: WriteError) -> Self {
        value.source
    }
}

impl From<BodyTooLargeError> for io::Error {
    fn from(value: BodyTooLargeError) -> Self {
        Self::new(io::ErrorKind::InvalidInput, value)
    }
}

struct IoEncoder<'a, W: ?Sized> {
    writer: &'a mut W,
    written: u64,
}

impl<W> FrameEncoder for IoEncoder<'_, W>
where
    W: io::Write + ?Sized,
{
    type Error = io::Error;

    fn write(&mut self, mut buf: &[u8]) -> io::Result<()> {
        while !buf.is_empty() {
            match self.writer.write(buf) {
                Ok(0) => return Err(io::ErrorKind::WriteZero.into()),
                Ok(n) => {
                    self.written += n as u64;
                    buf = &buf[n..];
                }
                Err(err) if err.kind() == io::ErrorKind::Interrupted => {}
                Err(err) => return Err(err),
            }
        }

        Ok(())
    }
}

impl Command {
    /// Write this command to `writer`, returning the number of bytes written
    ///
    /// Every frame is written through several small writes, so `writer`
    /// should usually be buffered, for example by [`io::BufWriter`].
    /// `writer` isn't flushed.
    ///
    /// # Errors
    ///
    /// It returns an error as soon as `writer` fails, without retrying.
    /// [`WriteError::written`] tells how much of the frame was already written.
    /// A body longer than `u32::MAX` bytes is rejected with
    /// [`io::ErrorKind::InvalidInput`] before anything is written.
    pub fn write_to<W>(&self, writer: &mut W) -> Result<u64, WriteError>
    where
        W: io::Write + ?Sized,
    {
        let mut encoder = IoEncoder { writer, written: 0 };
        match super::encode(&mut encoder, self) {
            Ok(()) => Ok(encoder.written),
            Err(source) => Err(WriteError {
                written: encoder.written,
                source,
            }),
        }
    }
}
