use alloc::string::String;
use core::time::Duration;

use serde::{Serialize, Serializer};

/// The options sent to `nsqd` through the `IDENTIFY` command
///
/// Every field left at its [`Default`] value is omitted from the
/// serialized body, letting the server apply its own defaults.
///
/// Any other [`Serialize`] value, like a `serde_json::Map`, can be passed
/// to [`Command::identify`] to send options not covered here.
///
/// [`Command::identify`]: crate::Command::identify
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[expect(
    clippy::struct_excessive_bools,
    reason = "each flag is a distinct IDENTIFY key"
)]
pub struct IdentifyOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) client_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) hostname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) user_agent: Option<String>,
    #[serde(skip_serializing_if = "is_false")]
    pub(crate) feature_negotiation: bool,
    #[serde(skip_serializing_if = "Interval::is_server_default")]
    pub(crate) heartbeat_interval: Interval,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) output_buffer_size: Option<u32>,
    #[serde(skip_serializing_if = "Interval::is_server_default")]
    pub(crate) output_buffer_timeout: Interval,
    #[serde(skip_serializing_if = "is_false")]
    pub(crate) tls_v1: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub(crate) snappy: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub(crate) deflate: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) deflate_level: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) sample_rate: Option<u8>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_millis"
    )]
    pub(crate) msg_timeout: Option<Duration>,
}

/// A server-side interval that can also be left to the server or disabled
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum Interval {
    /// Let the server pick the interval
    #[default]
    ServerDefault,
    /// Disable the feature driven by this interval
    Disabled,
    /// Use the given interval, with millisecond precision
    Every(Duration),
}

impl IdentifyOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// An identifier for this consumer, shown by `nsqadmin`
    #[must_use]
    pub fn client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = Some(client_id.into());
        self
    }

    #[must_use]
    pub fn hostname(mut self, hostname: impl Into<String>) -> Self {
        self.hostname = Some(hostname.into());
        self
    }

    /// The agent string, conventionally `<client_library_name>/<version>`
    #[must_use]
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Ask the server to reply to `IDENTIFY` with its own JSON settings
    #[must_use]
    pub fn feature_negotiation(mut self, feature_negotiation: bool) -> Self {
        self.feature_negotiation = feature_negotiation;
        self
    }

    /// How often the server sends heartbeats to this connection
    ///
    /// Default: [`Interval::ServerDefault`]
    #[must_use]
    pub fn heartbeat_interval(mut self, heartbeat_interval: Interval) -> Self {
        self.heartbeat_interval = heartbeat_interval;
        self
    }

    /// The size in bytes of the buffer `nsqd` uses when writing to this client
    #[must_use]
    pub fn output_buffer_size(mut self, output_buffer_size: u32) -> Self {
        self.output_buffer_size = Some(output_buffer_size);
        self
    }

    /// How long `nsqd` may buffer data before flushing it to this client
    ///
    /// Setting a lower value reduces latency at the cost of more frequent
    /// writes on the server.
    #[must_use]
    pub fn output_buffer_timeout(mut self, output_buffer_timeout: Interval) -> Self {
        self.output_buffer_timeout = output_buffer_timeout;
        self
    }

    /// Upgrade the connection to TLS after `IDENTIFY`
    #[must_use]
    pub fn tls_v1(mut self, tls_v1: bool) -> Self {
        self.tls_v1 = tls_v1;
        self
    }

    #[must_use]
    pub fn snappy(mut self, snappy: bool) -> Self {
        self.snappy = snappy;
        self
    }

    #[must_use]
    pub fn deflate(mut self, deflate: bool) -> Self {
        self.deflate = deflate;
        self
    }

    /// The deflate compression level, from 1 to 9
    #[must_use]
    pub fn deflate_level(mut self, deflate_level: u8) -> Self {
        self.deflate_level = Some(deflate_level);
        self
    }

    /// Receive only a percentage of the messages on the channel, from 0 to 99
    #[must_use]
    pub fn sample_rate(mut self, sample_rate: u8) -> Self {
        self.sample_rate = Some(sample_rate);
        self
    }

    /// How long the server waits for `FIN`, `REQ` or `TOUCH` before
    /// automatically requeueing a message
    #[must_use]
    pub fn msg_timeout(mut self, msg_timeout: Duration) -> Self {
        self.msg_timeout = Some(msg_timeout);
        self
    }
}

impl Interval {
    fn is_server_default(&self) -> bool {
        matches!(self, Self::ServerDefault)
    }
}

impl Serialize for Interval {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Self::ServerDefault => serializer.serialize_none(),
            Self::Disabled => serializer.serialize_i64(-1),
            Self::Every(interval) => serializer.serialize_u64(millis(*interval)),
        }
    }
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn is_false(value: &bool) -> bool {
    !*value
}

#[allow(clippy::ref_option)]
fn serialize_millis<S>(value: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match value {
        Some(duration) => serializer.serialize_u64(millis(*duration)),
        None => serializer.serialize_none(),
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
