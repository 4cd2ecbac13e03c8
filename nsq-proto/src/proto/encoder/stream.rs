use bytes::{Buf, Bytes, BytesMut};

use super::{BodyTooLargeError, FrameEncoder};
use crate::proto::Command;

/// An in-memory encoder that queues [`Command`]s for a byte stream
///
/// Encoded commands accumulate in an internal buffer, which is
/// drained through the [`Buf`] implementation, for example
/// by writing [`Buf::chunk`] to a socket and then calling [`Buf::advance`].
#[derive(Debug, Default)]
pub struct StreamEncoder {
    buf: BytesMut,
}

impl StreamEncoder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            buf: BytesMut::new(),
        }
    }

    /// Encode `command` at the end of the queue
    ///
    /// # Errors
    ///
    /// It returns an error if the command body is longer than `u32::MAX`
    /// bytes, in which case nothing is queued.
    pub fn enqueue(&mut self, command: &Command) -> Result<(), BodyTooLargeError> {
        self.buf.reserve(command.encoded_len());
        super::encode(&mut Queue(&mut self.buf), command)
    }

    /// Split off every queued byte as a single frozen buffer
    #[must_use]
    pub fn split_bytes(&mut self) -> Bytes {
        self.buf.split().freeze()
    }
}

struct Queue<'a>(&'a mut BytesMut);

impl FrameEncoder for Queue<'_> {
    type Error = BodyTooLargeError;

    fn write(&mut self, buf: &[u8]) -> Result<(), Self::Error> {
        self.0.extend_from_slice(buf);
        Ok(())
    }
}

impl Buf for StreamEncoder {
    fn remaining(&self) -> usize {
        self.buf.remaining()
    }

    fn chunk(&self) -> &[u8] {
        self.buf.chunk()
    }

    fn advance(&mut self, cnt: usize) {
        self.buf.advance(cnt);
    }
}

impl Command {
    /// Encode this command into a new buffer
    ///
    /// # Errors
    ///
    /// It returns an error if the body is longer than `u32::MAX` bytes.
    pub fn to_bytes(&self) -> Result<Bytes, BodyTooLargeError> {
        let mut encoder = StreamEncoder::new();
        encoder.enqueue(self)?;
        Ok(encoder.split_bytes())
    }
}
