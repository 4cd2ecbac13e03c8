pub use self::stream::StreamEncoder;
#[cfg(feature = "std")]
pub use self::writer::WriteError;

use super::Command;

mod stream;
#[cfg(feature = "std")]
mod writer;

/// An error encountered when a [`Command`] body doesn't fit its `u32` length prefix
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("command body is {len} bytes long, which doesn't fit a u32 length prefix")]
pub struct BodyTooLargeError {
    len: usize,
}

impl BodyTooLargeError {
    /// The length of the rejected body
    #[must_use]
    pub fn body_len(&self) -> usize {
        self.len
    }
}

pub(super) trait FrameEncoder {
    type Error: From<BodyTooLargeError>;

    fn write(&mut self, buf: &[u8]) -> Result<(), Self::Error>;
}

/// Frame `command` as `<VERB>[ <PARAM>]*\n[<u32 BE len><body>]`
///
/// Nothing is written if the body length can't be represented.
/// Otherwise writing stops at the first error returned by `encoder`.
pub(super) fn encode<E: FrameEncoder>(encoder: &mut E, command: &Command) -> Result<(), E::Error> {
    let body = match command.body() {
        Some(body) => {
            let len = u32::try_from(body.len()).map_err(|_| BodyTooLargeError { len: body.len() })?;
            Some((len, body))
        }
        None => None,
    };

    encoder.write(command.verb().as_str().as_bytes())?;
    for param in command.params() {
        encoder.write(b" ")?;
        encoder.write(param)?;
    }
    encoder.write(b"\n")?;

    if let Some((len, body)) = body {
        let len: [u8; 4] = len.to_be_bytes();
        encoder.write(&len)?;
        encoder.write(body)?;
    }

    Ok(())
}
