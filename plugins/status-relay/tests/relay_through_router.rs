//! End-to-end: router dispatch → relay handler → latched output topic.

use mavbus_api::message::{mav_type, FramingStatus, Heartbeat, Message, RxFrame, SenderId};
use mavbus_engine::Router;
use status_relay::{StatusRelay, OUTPUT_TOPIC};

fn heartbeat_from(system: u8, classifier: u8) -> RxFrame {
    RxFrame::ok(
        SenderId::new(system, 1),
        Message::Heartbeat(Heartbeat::with_type(classifier)),
    )
}

#[tokio::test]
async fn relayed_classifier_reaches_the_output_topic() {
    let mut router = Router::new(SenderId::new(1, 1));
    router.register(StatusRelay::create).unwrap();

    let topic = router.registry().get::<u8>(OUTPUT_TOPIC).unwrap();
    let mut sub = topic.subscribe();

    router.dispatch(&heartbeat_from(42, mav_type::FIXED_WING));
    assert_eq!(sub.recv().await, Some(1));
}

#[tokio::test]
async fn late_subscriber_observes_last_relayed_value() {
    let mut router = Router::new(SenderId::new(1, 1));
    router.register(StatusRelay::create).unwrap();

    router.dispatch(&heartbeat_from(255, mav_type::GCS));

    // Attach after the publish: the latched value arrives immediately,
    // with no further inbound message.
    let topic = router.registry().get::<u8>(OUTPUT_TOPIC).unwrap();
    let mut sub = topic.subscribe();
    assert_eq!(sub.recv().await, Some(6));
}

#[tokio::test]
async fn heartbeats_from_any_source_are_relayed_in_order() {
    let mut router = Router::new(SenderId::new(1, 1));
    router.register(StatusRelay::create).unwrap();

    let topic = router.registry().get::<u8>(OUTPUT_TOPIC).unwrap();
    let mut sub = topic.subscribe();

    for (system, classifier) in [(1u8, 1u8), (200, 6), (17, 2)] {
        router.dispatch(&heartbeat_from(system, classifier));
    }
    for expected in [1u8, 6, 2] {
        assert_eq!(sub.recv().await, Some(expected));
    }
}

#[tokio::test]
async fn bad_framing_never_reaches_the_relay() {
    let mut router = Router::new(SenderId::new(1, 1));
    router.register(StatusRelay::create).unwrap();

    let mut frame = heartbeat_from(1, mav_type::FIXED_WING);
    frame.status = FramingStatus::BadCrc;
    router.dispatch(&frame);

    let topic = router.registry().get::<u8>(OUTPUT_TOPIC).unwrap();
    assert_eq!(topic.last(), None);
}
