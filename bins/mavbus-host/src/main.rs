use clap::Parser;

use mavbus_api::message::{mav_type, Heartbeat, Message, RxFrame, SenderId};
use mavbus_engine::Router;
use status_relay::{StatusRelay, OUTPUT_TOPIC};

#[derive(Parser)]
#[command(name = "mavbus-host", about = "Demo host: feeds synthetic heartbeats to the status relay")]
struct Cli {
    /// System id of this host (target for system-scoped filter policies).
    #[arg(long, default_value_t = 1, env = "MAVBUS_SYSTEM")]
    system: u8,

    /// Heartbeat rate in Hz.
    #[arg(long, default_value_t = 1.0)]
    rate_hz: f64,

    /// Stop after this many heartbeats (0 = run until Ctrl+C).
    #[arg(long, default_value_t = 0)]
    count: u64,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();

    let mut router = Router::new(SenderId::new(cli.system, 1));
    if let Err(e) = router.register(StatusRelay::create) {
        tracing::error!(error = %e, "failed to register status relay");
        std::process::exit(1);
    }

    // Observe the relay's output the way a late-joining consumer would.
    let topic = match router.registry().get::<u8>(OUTPUT_TOPIC) {
        Some(t) => t,
        None => {
            tracing::error!(topic = OUTPUT_TOPIC, "output topic missing after registration");
            std::process::exit(1);
        }
    };
    let mut sub = topic.subscribe();
    tokio::spawn(async move {
        while let Some(classifier) = sub.recv().await {
            tracing::info!(classifier, "relayed status");
        }
    });

    tracing::info!(system = cli.system, rate_hz = cli.rate_hz, "mavbus-host started, press Ctrl+C to stop");

    // Synthetic inbound feed: alternate a few sender roles, as if several
    // peers were heartbeating on the link.
    let senders = [
        (SenderId::new(1, 1), mav_type::FIXED_WING),
        (SenderId::new(255, 190), mav_type::GCS),
        (SenderId::new(2, 1), mav_type::QUADROTOR),
    ];
    let period = std::time::Duration::from_secs_f64(1.0 / cli.rate_hz.max(0.001));
    let mut ticker = tokio::time::interval(period);
    let mut sent = 0u64;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let (source, classifier) = senders[(sent as usize) % senders.len()];
                let frame = RxFrame::ok(
                    source,
                    Message::Heartbeat(Heartbeat::with_type(classifier)),
                );
                router.dispatch(&frame);
                sent += 1;
                if cli.count != 0 && sent >= cli.count {
                    break;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("shutting down...");
                break;
            }
        }
    }

    tracing::info!(heartbeats = sent, "done");
}
