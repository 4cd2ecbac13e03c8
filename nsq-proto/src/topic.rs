use alloc::string::String;
use core::{
    fmt::{self, Display},
    ops::Deref,
};

use bytestring::ByteString;
use serde::{Deserialize, Deserializer, Serialize, de};

use crate::util::name::{self, NameValidateError};

/// A string that can be used to represent an NSQ topic
///
/// `Topic` contains a string that is guaranteed [^1] to
/// contain a valid topic name that meets the following requirements:
///
/// * The value is between 1 and 64 bytes long
/// * The value only contains ASCII alphanumerics, `.`, `_` and `-`
/// * The value may end with the `#ephemeral` suffix
///
/// In particular a `Topic` can never contain the space or newline
/// bytes used to frame commands on the wire.
///
/// `Topic` can be constructed from [`Topic::from_static`]
/// or any of the `TryFrom` implementations.
///
/// [^1]: Because [`Topic::from_dangerous_value`] allows constructing
///       an unvalidated `Topic`, this is only guaranteed if the caller
///       upholds the requirements above.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Topic(ByteString);

impl Topic {
    /// Construct `Topic` from a static string
    ///
    /// # Panics
    ///
    /// Will panic if `value` isn't a valid `Topic`
    #[must_use]
    pub fn from_static(value: &'static str) -> Self {
        Self::try_from(ByteString::from_static(value)).expect("invalid Topic")
    }

    /// Construct a `Topic` from a string, without checking invariants
    ///
    /// This method bypasses invariants checks implemented by [`Topic::from_static`]
    /// and all `TryFrom` implementations.
    ///
    /// # Security
    ///
    /// While calling this method can eliminate the runtime performance cost of
    /// checking the string, constructing `Topic` with an invalid string and
    /// then calling the NSQ server with it can cause serious security issues.
    /// When in doubt use the [`Topic::from_static`] or any of the `TryFrom`
    /// implementations.
    ///
    /// # Panics
    ///
    /// In debug builds it panics if `value` isn't a valid `Topic`.
    #[must_use]
    pub fn from_dangerous_value(value: ByteString) -> Self {
        if cfg!(debug_assertions) {
            if let Err(err) = name::validate(&value) {
                panic!("Topic {value:?} isn't valid {err:?}");
            }
        }
        Self(value)
    }

    /// Whether the topic disappears once its last channel is deleted
    #[must_use]
    pub fn is_ephemeral(&self) -> bool {
        name::is_ephemeral(&self.0)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub(crate) fn to_bytes(&self) -> bytes::Bytes {
        self.0.as_bytes().clone()
    }
}

impl Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl TryFrom<ByteString> for Topic {
    type Error = NameValidateError;

    fn try_from(value: ByteString) -> Result<Self, Self::Error> {
        name::validate(&value)?;
        Ok(Self(value))
    }
}

impl TryFrom<String> for Topic {
    type Error = NameValidateError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        name::validate(&value)?;
        Ok(Self(value.into()))
    }
}

impl From<Topic> for ByteString {
    fn from(value: Topic) -> Self {
        value.0
    }
}

impl AsRef<[u8]> for Topic {
    fn as_ref(&self) -> &[u8] {
        self.as_str().as_bytes()
    }
}

impl AsRef<str> for Topic {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl Deref for Topic {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        self.as_str()
    }
}

impl<'de> Deserialize<'de> for Topic {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = ByteString::deserialize(deserializer)?;
        s.try_into().map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::{String, ToString};

    use bytestring::ByteString;
    use claims::{assert_err_eq, assert_ok_eq};

    use super::Topic;
    use crate::error::NameValidateError;

    #[test]
    fn valid_topics() {
        let topic = Topic::from_static("orders.created");
        assert_eq!("orders.created", topic.as_str());
        assert_eq!("orders.created", topic.to_string());
        assert!(!topic.is_ephemeral());

        let topic = Topic::try_from(String::from("metrics#ephemeral")).unwrap();
        assert!(topic.is_ephemeral());
    }

    #[test]
    fn invalid_topics() {
        assert_err_eq!(
            Topic::try_from(ByteString::from_static("a b")),
            NameValidateError::InvalidByte {
                byte: b' ',
                index: 1
            }
        );
        assert_err_eq!(
            Topic::try_from(String::new()),
            NameValidateError::Empty
        );
    }

    #[test]
    #[should_panic = "invalid Topic"]
    fn from_static_panics() {
        let _ = Topic::from_static("new\nline");
    }

    #[test]
    fn from_dangerous_value_valid() {
        let topic = Topic::from_dangerous_value(ByteString::from_static("events"));
        assert_eq!(Topic::from_static("events"), topic);
    }

    #[cfg(debug_assertions)]
    #[test]
    #[should_panic = "isn't valid"]
    fn from_dangerous_value_panics_in_debug() {
        let _ = Topic::from_dangerous_value(ByteString::from_static("a b"));
    }

    #[test]
    fn serde() {
        let topic = Topic::from_static("events");
        assert_eq!("\"events\"", serde_json::to_string(&topic).unwrap());
        assert_ok_eq!(serde_json::from_str::<Topic>("\"events\""), topic);
        assert!(serde_json::from_str::<Topic>("\"ev ents\"").is_err());
    }
}
