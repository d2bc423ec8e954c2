use std::any::Any;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, RwLock};

use tokio::sync::broadcast;

use mavbus_api::error::PluginError;
use mavbus_api::topic::{Publisher, QosProfile};

/// A named output channel with broadcast fan-out and optional latching.
///
/// With `TransientLocal` durability the most recent value is retained and
/// replayed to late subscribers; with `Volatile` durability subscribers only
/// see values published after they attached.
pub struct Topic<T> {
    name: String,
    qos: QosProfile,
    tx: broadcast::Sender<T>,
    /// Retained value for latched replay. The lock also orders subscribe
    /// against concurrent publishes so a late subscriber never misses or
    /// double-receives the retained value.
    retained: Mutex<Option<T>>,
}

impl<T> std::fmt::Debug for Topic<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Topic")
            .field("name", &self.name)
            .field("qos", &self.qos)
            .finish()
    }
}

impl<T: Clone + Send + 'static> Topic<T> {
    pub fn new(name: impl Into<String>, qos: QosProfile) -> Self {
        let (tx, _) = broadcast::channel(qos.depth.max(1));
        Self {
            name: name.into(),
            qos,
            tx,
            retained: Mutex::new(None),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn qos(&self) -> QosProfile {
        self.qos
    }

    fn lock_retained(&self) -> MutexGuard<'_, Option<T>> {
        match self.retained.lock() {
            Ok(g) => g,
            Err(poisoned) => {
                tracing::warn!(topic = %self.name, "retained-value lock was poisoned, recovering");
                poisoned.into_inner()
            }
        }
    }

    /// Publish a value: retain it (latched topics), then fan out to current
    /// subscribers. Absence of subscribers is not a failure.
    pub fn publish(&self, value: T) -> Result<(), PluginError> {
        let mut retained = self.lock_retained();
        if self.qos.is_latched() {
            *retained = Some(value.clone());
        }
        // Errors only mean "no receivers right now".
        let _ = self.tx.send(value);
        Ok(())
    }

    /// Attach a subscriber. On a latched topic the retained value (if any)
    /// is delivered first, then live values in publish order.
    pub fn subscribe(&self) -> TopicSubscription<T> {
        let retained = self.lock_retained();
        let rx = self.tx.subscribe();
        TopicSubscription {
            topic: self.name.clone(),
            replay: retained.clone(),
            rx,
        }
    }

    /// Current retained value, if any.
    pub fn last(&self) -> Option<T> {
        self.lock_retained().clone()
    }
}

impl<T: Clone + Send + 'static> Publisher<T> for Topic<T> {
    fn publish(&self, value: T) -> Result<(), PluginError> {
        Topic::publish(self, value)
    }
}

/// Receiving side of a [`Topic`] subscription.
pub struct TopicSubscription<T> {
    topic: String,
    replay: Option<T>,
    rx: broadcast::Receiver<T>,
}

impl<T: Clone + Send + 'static> TopicSubscription<T> {
    /// Next value. `None` when the topic has been torn down.
    ///
    /// A subscriber that falls behind its buffer depth skips the dropped
    /// values and continues from the oldest retained one.
    pub async fn recv(&mut self) -> Option<T> {
        if let Some(value) = self.replay.take() {
            return Some(value);
        }
        loop {
            match self.rx.recv().await {
                Ok(value) => return Some(value),
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(topic = %self.topic, skipped = n, "slow subscriber lagged");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Next value without waiting. `None` when nothing is pending.
    pub fn try_recv(&mut self) -> Option<T> {
        if let Some(value) = self.replay.take() {
            return Some(value);
        }
        loop {
            match self.rx.try_recv() {
                Ok(value) => return Some(value),
                Err(broadcast::error::TryRecvError::Lagged(n)) => {
                    tracing::warn!(topic = %self.topic, skipped = n, "slow subscriber lagged");
                }
                Err(_) => return None,
            }
        }
    }
}

// ---------------------------------------------------------------------------
// TopicRegistry — name → topic map, typed lookup
// ---------------------------------------------------------------------------

/// Registry of all topics in the host.
///
/// Uses interior mutability so plugins can create topics during
/// registration while the host holds the registry behind an `Arc`.
#[derive(Default)]
pub struct TopicRegistry {
    topics: RwLock<HashMap<String, Arc<dyn Any + Send + Sync>>>,
}

impl std::fmt::Debug for TopicRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TopicRegistry")
            .field("topics", &self.topic_names())
            .finish()
    }
}

impl TopicRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a topic carrying values of type `T`. Fails if the name is
    /// already taken — every output channel has exactly one owner.
    pub fn create<T: Clone + Send + 'static>(
        &self,
        name: &str,
        qos: QosProfile,
    ) -> Result<Arc<Topic<T>>, crate::error::EngineError> {
        let mut guard = match self.topics.write() {
            Ok(g) => g,
            Err(poisoned) => {
                tracing::warn!("topic registry write lock was poisoned, recovering");
                poisoned.into_inner()
            }
        };
        if guard.contains_key(name) {
            return Err(crate::error::EngineError::DuplicateTopic(name.to_string()));
        }
        let topic = Arc::new(Topic::<T>::new(name, qos));
        guard.insert(name.to_string(), topic.clone());
        Ok(topic)
    }

    /// Typed lookup. `None` if the topic does not exist or carries a
    /// different value type.
    pub fn get<T: Clone + Send + 'static>(&self, name: &str) -> Option<Arc<Topic<T>>> {
        let guard = match self.topics.read() {
            Ok(g) => g,
            Err(poisoned) => {
                tracing::warn!("topic registry read lock was poisoned, recovering");
                poisoned.into_inner()
            }
        };
        guard
            .get(name)
            .cloned()
            .and_then(|any| any.downcast::<Topic<T>>().ok())
    }

    pub fn contains(&self, name: &str) -> bool {
        let guard = match self.topics.read() {
            Ok(g) => g,
            Err(poisoned) => {
                tracing::warn!("topic registry read lock was poisoned, recovering");
                poisoned.into_inner()
            }
        };
        guard.contains_key(name)
    }

    pub fn topic_names(&self) -> Vec<String> {
        let guard = match self.topics.read() {
            Ok(g) => g,
            Err(poisoned) => {
                tracing::warn!("topic registry read lock was poisoned, recovering");
                poisoned.into_inner()
            }
        };
        guard.keys().cloned().collect()
    }
}
