pub use self::command::{Command, Verb};
pub use self::encoder::StreamEncoder;

mod command;
mod encoder;

pub mod error {
    pub use super::command::SerializationError;
    pub use super::encoder::BodyTooLargeError;
    #[cfg(feature = "std")]
    pub use super::encoder::WriteError;
}
