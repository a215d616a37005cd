//! The relay engine: a single-owner, tick-driven loop composing the frame
//! reader, decoder, fan-out publisher, connection supervisor and
//! maintenance scheduler.
//!
//! All mutable state lives here and is touched only by [`Relay::tick`];
//! the outside world is reached through the seam traits below, so the
//! whole engine runs deterministically under test.

pub mod decode;
pub mod fanout;
pub mod frame;
pub mod link;
pub mod models;
pub mod schedule;

use crate::errors::{LinkError, PublishError, UpdateError};
use frame::FrameReader;
use link::{BrokerState, LinkState, NetworkState};
use log::{debug, info, warn};
use models::{InboundMessage, SensorReading};
use schedule::ScheduleClock;
use std::time::{Duration, Instant};

/// Broker session as the engine sees it.
#[allow(async_fn_in_trait)]
pub trait BrokerLink {
    /// One handshake attempt. Blocking here is fine: the loop has nothing
    /// to forward while the session is down.
    async fn handshake(&mut self) -> Result<(), LinkError>;

    /// Publish the connect announcement and (re)subscribe to the inbound
    /// topic. Safe to repeat on every reconnect.
    async fn announce(&mut self) -> Result<(), LinkError>;

    /// Publish one raw line verbatim to the data topic.
    async fn publish(&mut self, raw_line: &str) -> Result<(), PublishError>;

    /// Drain inbound messages accumulated since the last call. An error
    /// means the session dropped and must be re-established.
    async fn service(&mut self) -> Result<Vec<InboundMessage>, LinkError>;
}

/// Time-series store.
#[allow(async_fn_in_trait)]
pub trait StoreSink {
    async fn write(&mut self, reading: &SensorReading) -> Result<(), PublishError>;
}

/// Wireless network link. `reassociate` must return immediately.
pub trait NetworkLink {
    fn is_up(&mut self) -> bool;
    fn reassociate(&mut self);
}

/// Firmware-update service; invoked with the running version string.
#[allow(async_fn_in_trait)]
pub trait UpdateService {
    async fn check_update(&mut self, version: &str) -> Result<(), UpdateError>;
}

/// Source of raw serial bytes. Must not block when nothing is available:
/// return `Ok(0)` instead.
pub trait FrameSource {
    fn read_available(&mut self, buf: &mut [u8]) -> std::io::Result<usize>;
}

/// Monotonic time for the maintenance scheduler.
pub trait Clock {
    fn now(&mut self) -> Duration;
}

/// Wall clock measured from process start.
pub struct MonotonicClock {
    start: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now(&mut self) -> Duration {
        self.start.elapsed()
    }
}

/// Engine tuning, taken from the config file.
#[derive(Debug, Clone)]
pub struct RelayOptions {
    pub reconnect_backoff: Duration,
    pub sync_interval: Duration,
    pub firmware_version: String,
}

/// What one tick did. The loop driver uses [`TickReport::is_idle`] to
/// decide whether to yield before the next tick.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Readings accepted and fanned out.
    pub forwarded: usize,
    /// Lines rejected by the decoder.
    pub dropped: usize,
    /// Inbound broker messages drained.
    pub inbound: usize,
    /// The tick was ceded to connection handling.
    pub reconnecting: bool,
    /// The maintenance action was dispatched this tick.
    pub maintenance_fired: bool,
}

impl TickReport {
    pub fn is_idle(&self) -> bool {
        self.forwarded == 0 && self.dropped == 0 && self.inbound == 0 && !self.maintenance_fired
    }
}

enum SupervisorVerdict {
    /// Network down; reassociation requested, control returned at once.
    Reassociating,
    /// Session established and announced.
    Connected,
    /// Handshake failed; wait out the backoff before the next attempt.
    Backoff(Duration),
}

pub struct Relay<B, S, N, U, F, C> {
    broker: B,
    store: S,
    net: N,
    updater: U,
    source: F,
    clock: C,
    link: LinkState,
    frames: FrameReader,
    schedule: ScheduleClock,
    options: RelayOptions,
}

impl<B, S, N, U, F, C> Relay<B, S, N, U, F, C>
where
    B: BrokerLink,
    S: StoreSink,
    N: NetworkLink,
    U: UpdateService,
    F: FrameSource,
    C: Clock,
{
    pub fn new(options: RelayOptions, broker: B, store: S, net: N, updater: U, source: F, clock: C) -> Self {
        let schedule = ScheduleClock::new(options.sync_interval);
        Self {
            broker,
            store,
            net,
            updater,
            source,
            clock,
            link: LinkState::new(),
            frames: FrameReader::new(),
            schedule,
            options,
        }
    }

    pub fn link(&self) -> LinkState {
        self.link
    }

    /// One tick: supervise the connection when the session is down,
    /// otherwise service the broker, drain the serial peer and run the
    /// maintenance check. Ingestion happens only with the broker
    /// connected; nothing is read from the serial peer before then.
    pub async fn tick(&mut self) -> TickReport {
        let mut report = TickReport::default();
        let now = self.clock.now();

        if self.link.broker != BrokerState::Connected {
            report.reconnecting = true;
            if let SupervisorVerdict::Backoff(delay) = self.supervise().await {
                tokio::time::sleep(delay).await;
            }
            return report;
        }

        match self.broker.service().await {
            Ok(messages) => {
                for msg in messages {
                    info!("message arrived [{}] {}", msg.topic, msg.payload);
                    report.inbound += 1;
                }
            }
            Err(e) => {
                warn!("broker session dropped: {}", e);
                self.link.broker_dropped();
                report.reconnecting = true;
                return report;
            }
        }

        self.pump_serial(&mut report).await;

        self.maintenance(now, &mut report).await;

        report
    }

    /// One supervisor step, entered only while the session is down.
    async fn supervise(&mut self) -> SupervisorVerdict {
        if !self.net.is_up() {
            if self.link.network == NetworkState::Up {
                warn!("network link lost, requesting reassociation");
            }
            self.link.network_lost();
            self.net.reassociate();
            return SupervisorVerdict::Reassociating;
        }

        if self.link.network == NetworkState::Down {
            info!("network link up");
        }
        self.link.network_up();
        self.link.broker_connecting();

        match self.broker.handshake().await {
            Ok(()) => {
                self.link.broker_connected();
                info!("broker session established");
                if let Err(e) = self.broker.announce().await {
                    warn!("connect announcement failed: {}", e);
                }
                SupervisorVerdict::Connected
            }
            Err(e) => {
                self.link.broker_dropped();
                warn!(
                    "{}, retrying in {} seconds",
                    e,
                    self.options.reconnect_backoff.as_secs()
                );
                SupervisorVerdict::Backoff(self.options.reconnect_backoff)
            }
        }
    }

    async fn pump_serial(&mut self, report: &mut TickReport) {
        let mut chunk = [0u8; 256];
        loop {
            match self.source.read_available(&mut chunk) {
                Ok(0) => break,
                Ok(n) => self.frames.extend(&chunk[..n]),
                Err(e) => {
                    warn!("serial read failed: {}", e);
                    break;
                }
            }
        }

        while let Some(line) = self.frames.next_line() {
            debug!("received from sensor peer: {}", line);
            match decode::decode(&line) {
                Ok(reading) => {
                    let outcome =
                        fanout::publish(&mut self.broker, &mut self.store, &reading, &line).await;
                    if outcome.all_ok() {
                        debug!("forwarded reading from {}", reading.id);
                    }
                    report.forwarded += 1;
                }
                Err(e) => {
                    warn!("dropping line: {}", e);
                    report.dropped += 1;
                }
            }
        }
    }

    async fn maintenance(&mut self, now: Duration, report: &mut TickReport) {
        if !self.schedule.due(now) {
            return;
        }

        if !self.net.is_up() {
            // Deferred, not skipped: the clock is only stamped on a real
            // fire, so the sync runs as soon as the link returns.
            warn!("network down at sync time, requesting reassociation");
            self.link.network_lost();
            self.net.reassociate();
            return;
        }

        self.schedule.mark_fired(now);
        report.maintenance_fired = true;
        info!("firmware version: {}", self.options.firmware_version);
        if let Err(e) = self
            .updater
            .check_update(&self.options.firmware_version)
            .await
        {
            warn!("{}", e);
        }
    }
}
