use std::time::Duration;

use chrono::{SecondsFormat, Utc};
use tokio::time::{self, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::broker::BrokerHandle;

/// Broadcasts a numbered, timestamped message at a fixed interval.
///
/// The first message goes out immediately. Broadcasting never waits on
/// subscribers, so a stalled consumer cannot slow the ticker down.
#[derive(Debug, Clone)]
pub struct Ticker {
    broker: BrokerHandle,
    interval: Duration,
}

impl Ticker {
    pub fn new(broker: BrokerHandle, interval: Duration) -> Self {
        Self { broker, interval }
    }

    /// Runs until `shutdown` is cancelled or the broker is gone.
    /// Returns how many messages were published.
    pub async fn run(self, shutdown: CancellationToken) -> u64 {
        let mut ticks = time::interval(self.interval);
        ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut counter = 0u64;

        info!(interval = ?self.interval, "publisher started");
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = ticks.tick() => {
                    if self.broker.is_closed() {
                        break;
                    }
                    self.broker.broadcast(message(counter));
                    debug!(counter, "published");
                    counter += 1;
                }
            }
        }

        info!(published = counter, "publisher stopped");
        counter
    }
}

pub(crate) fn message(counter: u64) -> String {
    format!(
        "Broadcast message {counter} at {}",
        Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
    )
}
