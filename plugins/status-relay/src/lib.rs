use std::sync::Arc;

use mavbus_api::error::PluginError;
use mavbus_api::filter::FilterPolicy;
use mavbus_api::message::{Message, HEARTBEAT_ID};
use mavbus_api::plugin::{Plugin, Subscription};
use mavbus_api::topic::Publisher;
use mavbus_engine::PluginContext;

/// Output channel carrying the classifier of every accepted heartbeat.
pub const OUTPUT_TOPIC: &str = "heartbeat_status";

/// Buffer depth of the output channel.
const OUTPUT_DEPTH: usize = 10;

/// Status relay: republishes the type classifier of every heartbeat it
/// receives, from any source, on a latched `heartbeat_status` channel.
///
/// Stateless across messages — one publish per accepted heartbeat, no
/// buffering, no transformation beyond extracting the field. Publish
/// outcomes are ignored; delivery is the host's concern.
pub struct StatusRelay {
    status_pub: Arc<dyn Publisher<u8>>,
}

impl StatusRelay {
    /// Plugin factory. The host calls this once at startup; the latched
    /// output channel is created here and owned by the relay until
    /// teardown.
    pub fn create(ctx: &PluginContext) -> Result<Box<dyn Plugin>, PluginError> {
        let status_pub = ctx
            .latched_publisher::<u8>(OUTPUT_TOPIC, OUTPUT_DEPTH)
            .map_err(|e| e.with_context("status relay"))?;
        Ok(Box::new(Self { status_pub }))
    }
}

impl Plugin for StatusRelay {
    fn name(&self) -> &str {
        "status_relay"
    }

    fn subscriptions(&self) -> Vec<Subscription> {
        let status_pub = self.status_pub.clone();
        vec![Subscription::new(
            HEARTBEAT_ID,
            FilterPolicy::AnyOk,
            Box::new(move |frame| {
                if let Message::Heartbeat(hb) = &frame.message {
                    // Fire and forget: no retry, no inspection of the outcome.
                    let _ = status_pub.publish(hb.mav_type);
                }
            }),
        )]
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use mavbus_api::message::{mav_type, Heartbeat, RxFrame, SenderId};

    use super::*;

    /// Fake publish capability recording every published byte.
    #[derive(Default)]
    struct RecordingPublisher {
        published: Mutex<Vec<u8>>,
    }

    impl Publisher<u8> for RecordingPublisher {
        fn publish(&self, value: u8) -> Result<(), PluginError> {
            self.published.lock().unwrap().push(value);
            Ok(())
        }
    }

    fn relay_with_fake() -> (Arc<RecordingPublisher>, Vec<Subscription>) {
        let publisher = Arc::new(RecordingPublisher::default());
        let relay = StatusRelay { status_pub: publisher.clone() };
        let subs = relay.subscriptions();
        (publisher, subs)
    }

    fn heartbeat(mav_type: u8) -> RxFrame {
        RxFrame::ok(
            SenderId::new(255, 190),
            Message::Heartbeat(Heartbeat::with_type(mav_type)),
        )
    }

    #[test]
    fn declares_one_any_ok_heartbeat_subscription() {
        let (_publisher, subs) = relay_with_fake();
        assert_eq!(subs.len(), 1);
        assert_eq!(subs[0].message, HEARTBEAT_ID);
        assert_eq!(subs[0].filter, FilterPolicy::AnyOk);
    }

    #[test]
    fn every_classifier_value_is_relayed_unchanged() {
        let (publisher, subs) = relay_with_fake();
        for c in 0..=u8::MAX {
            (subs[0].handler)(&heartbeat(c));
        }
        let published = publisher.published.lock().unwrap();
        assert_eq!(published.len(), 256);
        for (i, &v) in published.iter().enumerate() {
            assert_eq!(v, i as u8);
        }
    }

    #[test]
    fn n_heartbeats_produce_n_publishes_in_order() {
        let (publisher, subs) = relay_with_fake();
        let classifiers = [6u8, 1, 1, 2, 6, 0];
        for &c in &classifiers {
            (subs[0].handler)(&heartbeat(c));
        }
        assert_eq!(*publisher.published.lock().unwrap(), classifiers);
    }

    #[test]
    fn fixed_wing_heartbeat_relays_byte_one() {
        let (publisher, subs) = relay_with_fake();
        (subs[0].handler)(&heartbeat(mav_type::FIXED_WING));
        assert_eq!(*publisher.published.lock().unwrap(), vec![1]);
    }

    #[test]
    fn gcs_heartbeat_is_relayed_like_any_other() {
        // No special case for the GCS classifier: same path, same result.
        let (publisher, subs) = relay_with_fake();
        (subs[0].handler)(&heartbeat(mav_type::GCS));
        (subs[0].handler)(&heartbeat(mav_type::QUADROTOR));
        assert_eq!(*publisher.published.lock().unwrap(), vec![6, 2]);
    }

    struct FailingPublisher;

    impl Publisher<u8> for FailingPublisher {
        fn publish(&self, _value: u8) -> Result<(), PluginError> {
            Err(PluginError::io("transport down"))
        }
    }

    #[test]
    fn publish_failure_does_not_escape_the_handler() {
        let relay = StatusRelay { status_pub: Arc::new(FailingPublisher) };
        let subs = relay.subscriptions();
        // Must not panic or propagate anything.
        (subs[0].handler)(&heartbeat(mav_type::FIXED_WING));
    }
}
