use alloc::{vec, vec::Vec};
use core::{
    fmt::{self, Display},
    time::Duration,
};

use bytes::{BufMut, Bytes, BytesMut};
use serde::Serialize;

use crate::{Channel, MessageId, Topic};

/// A command sent by a client to `nsqd`
///
/// A `Command` is made of a [`Verb`], an ordered list of parameters and an
/// optional body. It is framed on the wire as:
///
/// ```text
/// <VERB>[ <PARAM>]*\n[<u32 BE body length><body>]
/// ```
///
/// Commands can only be obtained through the per-verb constructors, which
/// guarantee the parameters and body are shaped the way the server expects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    verb: Verb,
    params: Vec<Bytes>,
    body: Option<Bytes>,
}

/// The verb of a [`Command`]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Verb {
    Identify,
    Auth,
    Register,
    Unregister,
    Ping,
    Publish,
    DeferredPublish,
    MultiPublish,
    Subscribe,
    Ready,
    Finish,
    Requeue,
    Touch,
    StartClose,
    Nop,
}

/// An error encountered while building the body of a [`Command`]
#[derive(Debug, thiserror::Error)]
pub enum SerializationError {
    /// The `IDENTIFY` options couldn't be encoded to JSON
    #[error("failed to serialize IDENTIFY options")]
    Json(#[source] serde_json::Error),
    /// An `MPUB` message is longer than its signed 32 bit length prefix allows
    #[error("MPUB message at index {index} is {len} bytes long")]
    MessageTooLarge { index: usize, len: usize },
    /// An `MPUB` has more messages than its 32 bit count allows
    #[error("too many messages in MPUB")]
    TooManyMessages,
}

impl Command {
    fn new(verb: Verb, params: Vec<Bytes>, body: Option<Bytes>) -> Self {
        Self { verb, params, body }
    }

    /// Describe this client to the server
    ///
    /// `options` is serialized to JSON. It is usually an [`IdentifyOptions`],
    /// but any map-like [`Serialize`] value is accepted.
    ///
    /// This is generally the first command sent after the protocol magic.
    ///
    /// # Errors
    ///
    /// It returns an error if `options` can't be represented as JSON.
    ///
    /// [`IdentifyOptions`]: crate::IdentifyOptions
    pub fn identify<T>(options: &T) -> Result<Self, SerializationError>
    where
        T: Serialize + ?Sized,
    {
        let body = serde_json::to_vec(options).map_err(SerializationError::Json)?;
        Ok(Self::new(Verb::Identify, Vec::new(), Some(body.into())))
    }

    /// Authenticate with the given secret
    ///
    /// Usually sent right after `IDENTIFY`, when the server requires it.
    #[must_use]
    pub fn auth(secret: impl Into<Bytes>) -> Self {
        Self::new(Verb::Auth, Vec::new(), Some(secret.into()))
    }

    /// Register a topic, and optionally a channel, with a lookup server
    #[must_use]
    pub fn register(topic: &Topic, channel: Option<&Channel>) -> Self {
        Self::new(Verb::Register, topic_and_channel(topic, channel), None)
    }

    /// Unregister a topic, and optionally a channel, from a lookup server
    #[must_use]
    pub fn unregister(topic: &Topic, channel: Option<&Channel>) -> Self {
        Self::new(Verb::Unregister, topic_and_channel(topic, channel), None)
    }

    /// Keep alive the registrations announced to a lookup server
    #[must_use]
    pub fn ping() -> Self {
        Self::new(Verb::Ping, Vec::new(), None)
    }

    /// Publish a message to `topic`
    #[must_use]
    pub fn publish(topic: &Topic, message: impl Into<Bytes>) -> Self {
        Self::new(Verb::Publish, vec![topic.to_bytes()], Some(message.into()))
    }

    /// Publish a message to `topic`, delivering it to channels only after `delay`
    ///
    /// `delay` is sent with millisecond precision, any remainder is truncated.
    #[must_use]
    pub fn deferred_publish(topic: &Topic, delay: Duration, message: impl Into<Bytes>) -> Self {
        Self::new(
            Verb::DeferredPublish,
            vec![topic.to_bytes(), millis(delay)],
            Some(message.into()),
        )
    }

    /// Publish multiple messages to `topic` in a single round trip
    ///
    /// # Errors
    ///
    /// It returns an error if a message is longer than `i32::MAX` bytes
    /// or if there are more than `u32::MAX` messages.
    pub fn multi_publish<I>(topic: &Topic, messages: I) -> Result<Self, SerializationError>
    where
        I: IntoIterator,
        I::Item: AsRef<[u8]>,
    {
        let body = multi_publish_body(messages)?;
        Ok(Self::new(
            Verb::MultiPublish,
            vec![topic.to_bytes()],
            Some(body),
        ))
    }

    /// Subscribe to `channel` of `topic`
    #[must_use]
    pub fn subscribe(topic: &Topic, channel: &Channel) -> Self {
        Self::new(
            Verb::Subscribe,
            vec![topic.to_bytes(), channel.to_bytes()],
            None,
        )
    }

    /// Declare how many messages the client is ready to receive
    #[must_use]
    pub fn ready(count: u64) -> Self {
        Self::new(Verb::Ready, vec![decimal(count)], None)
    }

    /// Mark the message `id` as successfully processed
    #[must_use]
    pub fn finish(id: MessageId) -> Self {
        Self::new(Verb::Finish, vec![message_id(id)], None)
    }

    /// Put the message `id` back in the queue after `delay`
    ///
    /// A zero `delay` requeues the message immediately.
    #[must_use]
    pub fn requeue(id: MessageId, delay: Duration) -> Self {
        Self::new(Verb::Requeue, vec![message_id(id), millis(delay)], None)
    }

    /// Reset the server-side timeout of the in-flight message `id`
    #[must_use]
    pub fn touch(id: MessageId) -> Self {
        Self::new(Verb::Touch, vec![message_id(id)], None)
    }

    /// Start a graceful close of the connection
    ///
    /// The server stops delivering new messages, leaving the client
    /// time to finish the in-flight ones.
    #[must_use]
    pub fn start_close() -> Self {
        Self::new(Verb::StartClose, Vec::new(), None)
    }

    /// A command without any effect, used to answer heartbeats
    #[must_use]
    pub fn nop() -> Self {
        Self::new(Verb::Nop, Vec::new(), None)
    }

    /// The verb written at the start of the command line
    #[must_use]
    pub fn verb(&self) -> Verb {
        self.verb
    }

    /// The parameters following the verb, in wire order
    #[must_use]
    pub fn params(&self) -> &[Bytes] {
        &self.params
    }

    /// The body of the command, if it has one
    ///
    /// A present but empty body is still framed with its length prefix.
    #[must_use]
    pub fn body(&self) -> Option<&Bytes> {
        self.body.as_ref()
    }

    /// The exact number of bytes this command takes on the wire
    #[must_use]
    pub fn encoded_len(&self) -> usize {
        let line = self.verb.as_str().len()
            + self
                .params
                .iter()
                .map(|param| " ".len() + param.len())
                .sum::<usize>()
            + "\n".len();
        let body = self
            .body
            .as_ref()
            .map_or(0, |body| size_of::<u32>() + body.len());
        line + body
    }
}

impl Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.verb.as_str())?;
        for param in &self.params {
            write!(f, " {}", param.escape_ascii())?;
        }
        Ok(())
    }
}

impl Verb {
    /// The token identifying this verb on the wire
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Identify => "IDENTIFY",
            Self::Auth => "AUTH",
            Self::Register => "REGISTER",
            Self::Unregister => "UNREGISTER",
            Self::Ping => "PING",
            Self::Publish => "PUB",
            Self::DeferredPublish => "DPUB",
            Self::MultiPublish => "MPUB",
            Self::Subscribe => "SUB",
            Self::Ready => "RDY",
            Self::Finish => "FIN",
            Self::Requeue => "REQ",
            Self::Touch => "TOUCH",
            Self::StartClose => "CLS",
            Self::Nop => "NOP",
        }
    }

    /// Whether commands with this verb are followed by a length-prefixed body
    #[must_use]
    pub const fn has_body(self) -> bool {
        matches!(
            self,
            Self::Identify
                | Self::Auth
                | Self::Publish
                | Self::DeferredPublish
                | Self::MultiPublish
        )
    }
}

impl Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn topic_and_channel(topic: &Topic, channel: Option<&Channel>) -> Vec<Bytes> {
    let mut params = Vec::with_capacity(2);
    params.push(topic.to_bytes());
    if let Some(channel) = channel {
        params.push(channel.to_bytes());
    }
    params
}

fn message_id(id: MessageId) -> Bytes {
    Bytes::copy_from_slice(id.as_bytes())
}

fn millis(delay: Duration) -> Bytes {
    decimal(delay.as_millis())
}

fn decimal<I: itoa::Integer>(n: I) -> Bytes {
    let mut buffer = itoa::Buffer::new();
    Bytes::copy_from_slice(buffer.format(n).as_bytes())
}

// `<u32 BE count>` followed by `<i32 BE len><message>` for every message
fn multi_publish_body<I>(messages: I) -> Result<Bytes, SerializationError>
where
    I: IntoIterator,
    I::Item: AsRef<[u8]>,
{
    let mut body = BytesMut::new();
    body.put_u32(0);

    let mut count = 0u32;
    for (index, message) in messages.into_iter().enumerate() {
        let message = message.as_ref();
        let len = i32::try_from(message.len()).map_err(|_| SerializationError::MessageTooLarge {
            index,
            len: message.len(),
        })?;
        count = count
            .checked_add(1)
            .ok_or(SerializationError::TooManyMessages)?;

        body.put_i32(len);
        body.put_slice(message);
    }

    body[..size_of::<u32>()].copy_from_slice(&count.to_be_bytes());
    Ok(body.freeze())
}

#[cfg(test)]
mod tests {
    use alloc::{borrow::ToOwned, collections::BTreeMap, string::ToString, vec::Vec};
    use core::time::Duration;

    use bytes::Bytes;
    use claims::{assert_matches, assert_none, assert_ok, assert_some_eq};

    use super::{Command, SerializationError, Verb};
    use crate::{Channel, IdentifyOptions, MessageId, Topic};

    fn id() -> MessageId {
        MessageId::try_from(*b"0a1b2c3d4e5f6789").unwrap()
    }

    #[test]
    fn identify() {
        let options = IdentifyOptions::new()
            .client_id("worker")
            .feature_negotiation(true);
        let command = assert_ok!(Command::identify(&options));
        assert_eq!(Verb::Identify, command.verb());
        assert!(command.params().is_empty());
        assert_some_eq!(
            command.body(),
            &Bytes::from_static(br#"{"client_id":"worker","feature_negotiation":true}"#)
        );
    }

    #[test]
    fn identify_map() {
        let mut options = serde_json::Map::new();
        options.insert("short_id".to_owned(), "abc".into());
        let command = assert_ok!(Command::identify(&options));
        assert_some_eq!(command.body(), &Bytes::from_static(br#"{"short_id":"abc"}"#));
    }

    #[test]
    fn identify_unrepresentable() {
        let mut options = BTreeMap::new();
        options.insert([1u8, 2], 3u8);
        assert_matches!(
            Command::identify(&options),
            Err(SerializationError::Json(_))
        );
    }

    #[test]
    fn auth() {
        let command = Command::auth("s3cr3t");
        assert_eq!(Verb::Auth, command.verb());
        assert!(command.params().is_empty());
        assert_some_eq!(command.body(), &Bytes::from_static(b"s3cr3t"));
    }

    #[test]
    fn register_omits_missing_channel() {
        let topic = Topic::from_static("topic");

        let command = Command::register(&topic, None);
        assert_eq!(&[Bytes::from_static(b"topic")], command.params());
        assert_none!(command.body());

        let command = Command::unregister(&topic, Some(&Channel::from_static("chan")));
        assert_eq!(Verb::Unregister, command.verb());
        assert_eq!(
            &[Bytes::from_static(b"topic"), Bytes::from_static(b"chan")],
            command.params()
        );
    }

    #[test]
    fn deferred_publish() {
        let command = Command::deferred_publish(
            &Topic::from_static("t"),
            Duration::from_micros(1_500_900),
            "later",
        );
        assert_eq!(
            &[Bytes::from_static(b"t"), Bytes::from_static(b"1500")],
            command.params()
        );
        assert_some_eq!(command.body(), &Bytes::from_static(b"later"));
    }

    #[test]
    fn publish_empty_body_is_present() {
        let command = Command::publish(&Topic::from_static("t"), Bytes::new());
        assert_some_eq!(command.body(), &Bytes::new());
        assert_eq!("PUB t\n".len() + 4, command.encoded_len());
    }

    #[test]
    fn multi_publish_body() {
        let command = assert_ok!(Command::multi_publish(
            &Topic::from_static("t"),
            ["a", "bb"]
        ));
        assert_eq!(Verb::MultiPublish, command.verb());
        assert_some_eq!(
            command.body(),
            &Bytes::from_static(b"\x00\x00\x00\x02\x00\x00\x00\x01a\x00\x00\x00\x02bb")
        );
    }

    #[test]
    fn multi_publish_no_messages() {
        let command = assert_ok!(Command::multi_publish(
            &Topic::from_static("t"),
            Vec::<Bytes>::new()
        ));
        assert_some_eq!(command.body(), &Bytes::from_static(&[0, 0, 0, 0]));
    }

    #[test]
    fn message_id_commands() {
        let command = Command::finish(id());
        assert_eq!(&[Bytes::from_static(b"0a1b2c3d4e5f6789")], command.params());

        let command = Command::requeue(id(), Duration::ZERO);
        assert_eq!(
            &[
                Bytes::from_static(b"0a1b2c3d4e5f6789"),
                Bytes::from_static(b"0")
            ],
            command.params()
        );

        let command = Command::touch(id());
        assert_eq!(Verb::Touch, command.verb());
        assert_none!(command.body());
    }

    #[test]
    fn display() {
        let topic = Topic::from_static("topic");
        let channel = Channel::from_static("chan");

        assert_eq!(
            "REGISTER topic chan",
            Command::register(&topic, Some(&channel)).to_string()
        );
        assert_eq!("NOP", Command::nop().to_string());
        assert_eq!("RDY 5", Command::ready(5).to_string());
        assert_eq!("PUB topic", Command::publish(&topic, "body").to_string());

        let id = MessageId::try_from([0xffu8; 16]).unwrap();
        assert!(Command::finish(id).to_string().starts_with("FIN \\xff"));
    }

    #[test]
    fn verbs() {
        let verbs = [
            (Command::ping(), "PING"),
            (Command::start_close(), "CLS"),
            (Command::nop(), "NOP"),
            (Command::ready(1), "RDY"),
        ];
        for (command, verb) in verbs {
            assert_eq!(verb, command.verb().as_str());
            assert_eq!(verb, command.verb().to_string());
        }
    }
}
