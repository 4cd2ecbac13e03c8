use alloc::string::String;
use core::{
    fmt::{self, Display},
    ops::Deref,
};

use bytestring::ByteString;
use serde::{Deserialize, Deserializer, Serialize, de};

use crate::util::name::{self, NameValidateError};

/// A string that can be used to represent an NSQ channel
///
/// `Channel` follows the same rules as [`Topic`]: between 1 and 64 bytes
/// of ASCII alphanumerics, `.`, `_` and `-`, optionally followed by
/// the `#ephemeral` suffix.
///
/// [`Topic`]: crate::Topic
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Channel(ByteString);

impl Channel {
    /// Construct `Channel` from a static string
    ///
    /// # Panics
    ///
    /// Will panic if `value` isn't a valid `Channel`
    #[must_use]
    pub fn from_static(value: &'static str) -> Self {
        Self::try_from(ByteString::from_static(value)).expect("invalid Channel")
    }

    /// Construct a `Channel` from a string, without checking invariants
    ///
    /// See [`Topic::from_dangerous_value`] for the caveats.
    ///
    /// # Panics
    ///
    /// In debug builds it panics if `value` isn't a valid `Channel`.
    ///
    /// [`Topic::from_dangerous_value`]: crate::Topic::from_dangerous_value
    #[must_use]
    pub fn from_dangerous_value(value: ByteString) -> Self {
        if cfg!(debug_assertions) {
            if let Err(err) = name::validate(&value) {
                panic!("Channel {value:?} isn't valid {err:?}");
            }
        }
        Self(value)
    }

    /// Whether the channel disappears once its last client disconnects
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

impl Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl TryFrom<ByteString> for Channel {
    type Error = NameValidateError;

    fn try_from(value: ByteString) -> Result<Self, Self::Error> {
        name::validate(&value)?;
        Ok(Self(value))
    }
}

impl TryFrom<String> for Channel {
    type Error = NameValidateError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        name::validate(&value)?;
        Ok(Self(value.into()))
    }
}

impl From<Channel> for ByteString {
    fn from(value: Channel) -> Self {
        value.0
    }
}

impl AsRef<str> for Channel {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl Deref for Channel {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        self.as_str()
    }
}

impl<'de> Deserialize<'de> for Channel {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = ByteString::deserialize(deserializer)?;
        s.try_into().map_err(de::Error::custom)
    }
}
