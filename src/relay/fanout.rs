//! Fan-out of one accepted reading to both sinks.

use crate::relay::models::SensorReading;
use crate::relay::{BrokerLink, StoreSink};
use log::error;

/// Per-sink result of one fan-out. Both sinks are always attempted exactly
/// once; neither failure suppresses the other attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct PublishOutcome {
    pub broker_ok: bool,
    pub store_ok: bool,
    pub store_error: Option<String>,
}

impl PublishOutcome {
    pub fn all_ok(&self) -> bool {
        self.broker_ok && self.store_ok
    }
}

/// Send the raw line to the broker topic and write the structured point to
/// the store. Failures are logged and reported, never retried; a dropped
/// store write is simply gone.
pub async fn publish<B: BrokerLink, S: StoreSink>(
    broker: &mut B,
    store: &mut S,
    reading: &SensorReading,
    raw_line: &str,
) -> PublishOutcome {
    let broker_ok = match broker.publish(raw_line).await {
        Ok(()) => true,
        Err(e) => {
            error!("{}", e);
            false
        }
    };

    let (store_ok, store_error) = match store.write(reading).await {
        Ok(()) => (true, None),
        Err(e) => {
            error!("{}", e);
            (false, Some(e.to_string()))
        }
    };

    PublishOutcome {
        broker_ok,
        store_ok,
        store_error,
    }
}
