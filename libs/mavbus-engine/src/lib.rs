pub mod error;
pub mod router;
pub mod topic;

pub use error::EngineError;
pub use router::{PluginContext, PluginFactory, Router};
pub use topic::{Topic, TopicRegistry, TopicSubscription};
