use serde::{Deserialize, Serialize};

use crate::error::PluginError;

/// Retention behavior of an output channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Durability {
    /// Subscribers only see values published after they attached.
    #[default]
    Volatile,
    /// The channel retains its most recent value and replays it to late
    /// subscribers (latched semantics).
    TransientLocal,
}

/// Quality-of-service profile declared when a channel is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QosProfile {
    /// Per-subscriber buffer depth.
    pub depth: usize,
    pub durability: Durability,
}

impl QosProfile {
    pub fn volatile(depth: usize) -> Self {
        Self { depth, durability: Durability::Volatile }
    }

    pub fn transient_local(depth: usize) -> Self {
        Self { depth, durability: Durability::TransientLocal }
    }

    pub fn is_latched(&self) -> bool {
        self.durability == Durability::TransientLocal
    }
}

impl Default for QosProfile {
    fn default() -> Self {
        Self::volatile(10)
    }
}

/// Outbound publish capability handed to plugins.
///
/// Publishing is fire-and-forget from the plugin's point of view: the host
/// decides what a failed publish means, and in-process channels treat the
/// absence of subscribers as success.
pub trait Publisher<T>: Send + Sync {
    fn publish(&self, value: T) -> Result<(), PluginError>;
}
