use crate::filter::FilterPolicy;
use crate::message::{MessageId, RxFrame};

/// Handler invoked for every frame a subscription accepts.
///
/// Handlers must complete synchronously without blocking; the host decides
/// the thread they run on.
pub type HandlerFn = Box<dyn Fn(&RxFrame) + Send + Sync>;

/// One entry in a plugin's handler table: which message type it wants, the
/// delivery policy it requires, and the handler to invoke.
pub struct Subscription {
    pub message: MessageId,
    pub filter: FilterPolicy,
    pub handler: HandlerFn,
}

impl Subscription {
    pub fn new(message: MessageId, filter: FilterPolicy, handler: HandlerFn) -> Self {
        Self { message, filter, handler }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("message", &self.message)
            .field("filter", &self.filter)
            .finish()
    }
}

/// A plugin hosted by the runtime.
///
/// Plugins are constructed by an explicit factory call at startup and
/// declare their interests via [`Plugin::subscriptions`] — there is no
/// implicit global registration. Handlers capture whatever publisher
/// handles the plugin created at construction time.
pub trait Plugin: Send + Sync {
    /// Stable plugin name, unique within a host.
    fn name(&self) -> &str;

    /// The plugin's handler table. Called once by the host right after
    /// construction.
    fn subscriptions(&self) -> Vec<Subscription>;
}
