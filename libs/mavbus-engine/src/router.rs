use std::sync::Arc;

use mavbus_api::error::PluginError;
use mavbus_api::filter::FilterPolicy;
use mavbus_api::message::{MessageId, RxFrame, SenderId};
use mavbus_api::plugin::{HandlerFn, Plugin};
use mavbus_api::topic::{Publisher, QosProfile};

use crate::error::EngineError;
use crate::topic::TopicRegistry;

/// Capabilities injected into a plugin at construction time.
///
/// This is the only host surface a plugin sees: it can create output
/// channels against the registry and nothing else.
pub struct PluginContext {
    registry: Arc<TopicRegistry>,
}

impl PluginContext {
    pub fn new(registry: Arc<TopicRegistry>) -> Self {
        Self { registry }
    }

    /// Create an output channel and return its publish capability.
    pub fn publisher<T: Clone + Send + 'static>(
        &self,
        name: &str,
        qos: QosProfile,
    ) -> Result<Arc<dyn Publisher<T>>, PluginError> {
        let topic = self
            .registry
            .create::<T>(name, qos)
            .map_err(|e| PluginError::config(e.to_string()))?;
        Ok(topic)
    }

    /// Latched output channel: late subscribers receive the most recent
    /// value immediately.
    pub fn latched_publisher<T: Clone + Send + 'static>(
        &self,
        name: &str,
        depth: usize,
    ) -> Result<Arc<dyn Publisher<T>>, PluginError> {
        self.publisher(name, QosProfile::transient_local(depth))
    }

    pub fn registry(&self) -> &Arc<TopicRegistry> {
        &self.registry
    }
}

/// Explicit plugin constructor the host calls at startup.
///
/// Plain `fn` pointers like `StatusRelay::create` coerce to this; tests can
/// pass closures to [`Router::register`] directly.
pub type PluginFactory = fn(&PluginContext) -> Result<Box<dyn Plugin>, PluginError>;

struct Route {
    plugin: String,
    message: MessageId,
    filter: FilterPolicy,
    handler: HandlerFn,
}

/// Dispatches decoded frames to plugin handlers.
///
/// Registration happens once at startup via [`Router::register`]; dispatch
/// is synchronous fan-out on the caller's thread, in registration order,
/// with no internal queueing.
pub struct Router {
    target: SenderId,
    registry: Arc<TopicRegistry>,
    plugins: Vec<Box<dyn Plugin>>,
    routes: Vec<Route>,
}

impl std::fmt::Debug for Router {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Router")
            .field("target", &self.target)
            .field("plugins", &self.plugins.iter().map(|p| p.name()).collect::<Vec<_>>())
            .field("routes", &self.routes.len())
            .finish()
    }
}

impl Router {
    /// `target` is the host's own address, used by the system/component
    /// filter policies.
    pub fn new(target: SenderId) -> Self {
        Self {
            target,
            registry: Arc::new(TopicRegistry::new()),
            plugins: Vec::new(),
            routes: Vec::new(),
        }
    }

    pub fn registry(&self) -> &Arc<TopicRegistry> {
        &self.registry
    }

    /// Construct a plugin through its factory and collect its handler
    /// table into the routing set.
    pub fn register<F>(&mut self, factory: F) -> Result<(), EngineError>
    where
        F: FnOnce(&PluginContext) -> Result<Box<dyn Plugin>, PluginError>,
    {
        let ctx = PluginContext::new(self.registry.clone());
        let plugin = factory(&ctx)
            .map_err(|e| EngineError::from(e).with_context("plugin registration"))?;

        let name = plugin.name().to_string();
        if self.plugins.iter().any(|p| p.name() == name) {
            return Err(EngineError::DuplicatePlugin(name));
        }

        let subscriptions = plugin.subscriptions();
        tracing::info!(
            plugin = %name,
            subscriptions = subscriptions.len(),
            "registered plugin"
        );
        for sub in subscriptions {
            self.routes.push(Route {
                plugin: name.clone(),
                message: sub.message,
                filter: sub.filter,
                handler: sub.handler,
            });
        }
        self.plugins.push(plugin);
        Ok(())
    }

    /// Deliver one decoded frame to every subscription that matches its
    /// message id and whose filter policy accepts it. A frame no route
    /// accepts is a no-op.
    pub fn dispatch(&self, frame: &RxFrame) {
        let id = frame.message.id();
        let mut delivered = 0usize;
        for route in &self.routes {
            if route.message != id {
                continue;
            }
            if !route.filter.accepts(frame.status, frame.source, self.target) {
                continue;
            }
            (route.handler)(frame);
            delivered += 1;
            tracing::trace!(plugin = %route.plugin, message = ?id, "delivered frame");
        }
        if delivered == 0 {
            tracing::trace!(message = ?id, source = %frame.source, "no route for frame");
        }
    }
}
