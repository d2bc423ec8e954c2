use crate::message::{FramingStatus, SenderId};

/// Delivery policy a subscription declares toward the router.
///
/// Every policy requires the upstream framing check to have passed; they
/// differ only in which sources they accept relative to the host's target
/// system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterPolicy {
    /// Deliver from any source as long as framing succeeded.
    #[default]
    AnyOk,
    /// Framing ok and the frame's system id matches the target system.
    SystemAndOk,
    /// Framing ok and both system and component ids match the target.
    ComponentAndOk,
}

impl FilterPolicy {
    /// Whether a frame with the given framing status and source should be
    /// delivered, given the host's target address.
    pub fn accepts(&self, status: FramingStatus, source: SenderId, target: SenderId) -> bool {
        if !status.is_ok() {
            return false;
        }
        match self {
            FilterPolicy::AnyOk => true,
            FilterPolicy::SystemAndOk => source.system == target.system,
            FilterPolicy::ComponentAndOk => {
                source.system == target.system && source.component == target.component
            }
        }
    }
}
