#![no_std]
#![forbid(unsafe_code)]

extern crate alloc;
#[cfg(feature = "std")]
extern crate std;

pub use bytes;
pub use bytestring;

pub use self::channel::Channel;
pub use self::identify::{IdentifyOptions, Interval};
pub use self::message_id::MessageId;
pub use self::proto::{Command, StreamEncoder, Verb};
pub use self::topic::Topic;

mod channel;
mod identify;
mod message_id;
pub mod proto;
mod topic;
mod util;

#[cfg(feature = "from-env")]
mod from_env;

pub mod error {
    pub use super::message_id::MessageIdError;
    #[cfg(feature = "std")]
    pub use super::proto::error::WriteError;
    pub use super::proto::error::{BodyTooLargeError, SerializationError};
    pub use super::util::name::NameValidateError;
}
