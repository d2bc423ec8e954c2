use serde::{Deserialize, Serialize};

/// Numeric identifier of a decoded message type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(pub u32);

/// Message id of the heartbeat-class status report.
pub const HEARTBEAT_ID: MessageId = MessageId(0);

/// Address of a frame's origin: (system, component).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SenderId {
    pub system: u8,
    pub component: u8,
}

impl SenderId {
    pub fn new(system: u8, component: u8) -> Self {
        Self { system, component }
    }
}

impl std::fmt::Display for SenderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.system, self.component)
    }
}

/// Outcome of the upstream framing / integrity check for a received frame.
///
/// Carried as metadata on every delivery. Subscriptions using the standard
/// filter policies only ever see `Ok` frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FramingStatus {
    Ok,
    BadCrc,
    BadSignature,
    Incomplete,
}

impl FramingStatus {
    pub fn is_ok(&self) -> bool {
        matches!(self, FramingStatus::Ok)
    }
}

/// Classifier codes identifying the category of a heartbeat's originator.
pub mod mav_type {
    pub const GENERIC: u8 = 0;
    pub const FIXED_WING: u8 = 1;
    pub const QUADROTOR: u8 = 2;
    pub const GCS: u8 = 6;
    pub const ONBOARD_CONTROLLER: u8 = 18;
}

/// Decoded heartbeat-class status report.
///
/// Produced by the host's codec; plugins never construct or mutate one
/// outside of tests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Heartbeat {
    /// Category of the sender (see [`mav_type`]).
    pub mav_type: u8,
    pub autopilot: u8,
    pub base_mode: u8,
    pub custom_mode: u32,
    pub system_status: u8,
    pub mavlink_version: u8,
}

impl Heartbeat {
    /// Heartbeat with the given classifier and all other fields zeroed.
    pub fn with_type(mav_type: u8) -> Self {
        Self {
            mav_type,
            autopilot: 0,
            base_mode: 0,
            custom_mode: 0,
            system_status: 0,
            mavlink_version: 0,
        }
    }
}

/// Decoded message payloads the runtime can deliver to handlers.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum Message {
    Heartbeat(Heartbeat),
}

impl Message {
    pub fn id(&self) -> MessageId {
        match self {
            Message::Heartbeat(_) => HEARTBEAT_ID,
        }
    }
}

/// One decoded frame as delivered to a plugin handler.
///
/// Scoped to the handler invocation — handlers borrow it, never store it.
#[derive(Debug, Clone)]
pub struct RxFrame {
    pub source: SenderId,
    pub status: FramingStatus,
    pub message: Message,
}

impl RxFrame {
    /// A framing-ok frame carrying the given message.
    pub fn ok(source: SenderId, message: Message) -> Self {
        Self {
            source,
            status: FramingStatus::Ok,
            message,
        }
    }
}
