use core::fmt::{self, Display};

/// The identifier of a message delivered by `nsqd`
///
/// Message ids are opaque 16 byte tokens. They are sent back to the server
/// as-is by [`Command::finish`], [`Command::requeue`] and [`Command::touch`],
/// so they must not contain the space or newline bytes delimiting the command line.
///
/// [`Command::finish`]: crate::Command::finish
/// [`Command::requeue`]: crate::Command::requeue
/// [`Command::touch`]: crate::Command::touch
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MessageId([u8; Self::LEN]);

/// An error encountered while constructing a [`MessageId`]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MessageIdError {
    /// The value isn't 16 bytes long
    #[error("message id must be 16 bytes long, got {len}")]
    InvalidLength { len: usize },
    /// The value contains a space or newline byte
    #[error("message id contains a delimiter byte at index {index}")]
    ContainsDelimiter { index: usize },
}

impl MessageId {
    pub const LEN: usize = 16;

    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; Self::LEN] {
        &self.0
    }

    #[must_use]
    pub const fn into_bytes(self) -> [u8; Self::LEN] {
        self.0
    }
}

impl TryFrom<[u8; MessageId::LEN]> for MessageId {
    type Error = MessageIdError;

    fn try_from(value: [u8; MessageId::LEN]) -> Result<Self, Self::Error> {
        match memchr::memchr2(b' ', b'\n', &value) {
            Some(index) => Err(MessageIdError::ContainsDelimiter { index }),
            None => Ok(Self(value)),
        }
    }
}

impl TryFrom<&[u8]> for MessageId {
    type Error = MessageIdError;

    fn try_from(value: &[u8]) -> Result<Self, Self::Error> {
        let value = <[u8; Self::LEN]>::try_from(value)
            .map_err(|_| MessageIdError::InvalidLength { len: value.len() })?;
        Self::try_from(value)
    }
}

impl From<MessageId> for [u8; MessageId::LEN] {
    fn from(value: MessageId) -> Self {
        value.0
    }
}

impl AsRef<[u8]> for MessageId {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.0.escape_ascii(), f)
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::ToString;

    use claims::{assert_err_eq, assert_ok};

    use super::{MessageId, MessageIdError};

    #[test]
    fn hex_id() {
        let id = assert_ok!(MessageId::try_from(&b"0a1b2c3d4e5f6789"[..]));
        assert_eq!(b"0a1b2c3d4e5f6789", id.as_bytes());
        assert_eq!("0a1b2c3d4e5f6789", id.to_string());
    }

    #[test]
    fn binary_id() {
        let mut raw = [0xffu8; 16];
        raw[0] = 0;
        let id = assert_ok!(MessageId::try_from(raw));
        assert_eq!(raw, id.into_bytes());
        assert!(id.to_string().starts_with("\\x00\\xff"));
    }

    #[test]
    fn invalid_length() {
        assert_err_eq!(
            MessageId::try_from(&b"short"[..]),
            MessageIdError::InvalidLength { len: 5 }
        );
        assert_err_eq!(
            MessageId::try_from(&[b'a'; 17][..]),
            MessageIdError::InvalidLength { len: 17 }
        );
    }

    #[test]
    fn delimiters() {
        assert_err_eq!(
            MessageId::try_from(*b"0a1b2c3d 4e5f678"),
            MessageIdError::ContainsDelimiter { index: 8 }
        );
        assert_err_eq!(
            MessageId::try_from(*b"0a1b2c3d4e5f678\n"),
            MessageIdError::ContainsDelimiter { index: 15 }
        );
    }
}
