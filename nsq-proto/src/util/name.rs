pub(crate) const MAX_NAME_LEN: usize = 64;
pub(crate) const EPHEMERAL_SUFFIX: &str = "#ephemeral";

/// An error encountered while validating a [`Topic`] or [`Channel`] name
///
/// [`Topic`]: crate::Topic
/// [`Channel`]: crate::Channel
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NameValidateError {
    /// The name is empty
    #[error("name is empty")]
    Empty,
    /// The name is longer than 64 bytes
    #[error("name is {len} bytes long, the maximum is 64")]
    TooLong { len: usize },
    /// The name contains a byte outside of `[.a-zA-Z0-9_-]`
    #[error("name contains invalid byte {byte:#04x} at index {index}")]
    InvalidByte { byte: u8, index: usize },
}

/// Validate a name the same way `nsqd` does
///
/// A valid name is 1 to 64 bytes of `[.a-zA-Z0-9_-]`, optionally
/// followed by the `#ephemeral` suffix.
pub(crate) fn validate(name: &str) -> Result<(), NameValidateError> {
    if name.is_empty() {
        return Err(NameValidateError::Empty);
    }
    if name.len() > MAX_NAME_LEN {
        return Err(NameValidateError::TooLong { len: name.len() });
    }

    let body = name.strip_suffix(EPHEMERAL_SUFFIX).unwrap_or(name);
    if body.is_empty() {
        return Err(NameValidateError::Empty);
    }

    match body.bytes().position(|b| !is_name_byte(b)) {
        Some(index) => Err(NameValidateError::InvalidByte {
            byte: body.as_bytes()[index],
            index,
        }),
        None => Ok(()),
    }
}

pub(crate) fn is_ephemeral(name: &str) -> bool {
    name.ends_with(EPHEMERAL_SUFFIX)
}

fn is_name_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'.' | b'_' | b'-')
}
