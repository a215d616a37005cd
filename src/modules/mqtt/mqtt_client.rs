use crate::config::MqttConfig;
use crate::errors::{LinkError, PublishError};
use crate::relay::models::InboundMessage;
use crate::relay::BrokerLink;
use log::{error, info};
use rumqttc::{AsyncClient, Event, MqttOptions, Packet, QoS};
use std::time::Duration;
use tokio::time::{timeout, Instant};

/// How long one `service` call drives the event loop. Bounds the latency
/// the broker adds to a tick while still letting keep-alives and queued
/// publishes go out.
const SERVICE_BUDGET: Duration = Duration::from_millis(50);

/// Event-loop time granted to flush a just-queued publish or subscribe.
const FLUSH_BUDGET: Duration = Duration::from_millis(25);

/// Broker session on a rumqttc [`AsyncClient`].
///
/// The event loop is owned here and driven only from the relay tick, never
/// from a background task, so inbound messages surface as a drained batch
/// instead of a callback.
pub struct MqttLink {
    client: AsyncClient,
    eventloop: rumqttc::EventLoop,
    topic: String,
    client_id: String,
    connect_timeout: Duration,
    pending: Vec<InboundMessage>,
}

impl MqttLink {
    pub fn new(config: &MqttConfig) -> Self {
        let mut options =
            MqttOptions::new(config.client_id.clone(), config.broker.clone(), config.port);
        options.set_keep_alive(Duration::from_secs(config.keep_alive.into()));
        options.set_clean_session(false);

        if let (Some(username), Some(password)) = (&config.username, &config.password) {
            options.set_credentials(username.clone(), password.clone());
        }

        let (client, eventloop) = AsyncClient::new(options, 64);

        MqttLink {
            client,
            eventloop,
            topic: config.topic.clone(),
            client_id: config.client_id.clone(),
            connect_timeout: Duration::from_secs(config.connect_timeout_secs),
            pending: Vec::new(),
        }
    }

    /// Drive the event loop for at most `budget`, stashing inbound
    /// publishes. Returns false once the session errored.
    async fn drive(&mut self, budget: Duration) -> bool {
        let deadline = Instant::now() + budget;
        loop {
            let now = Instant::now();
            if now >= deadline {
                return true;
            }
            match timeout(deadline - now, self.eventloop.poll()).await {
                Err(_) => return true,
                Ok(Ok(Event::Incoming(Packet::Publish(publish)))) => {
                    self.pending.push(InboundMessage {
                        topic: publish.topic.clone(),
                        payload: String::from_utf8_lossy(&publish.payload).to_string(),
                    });
                }
                Ok(Ok(_)) => {}
                Ok(Err(e)) => {
                    error!("mqtt event loop error: {}", e);
                    return false;
                }
            }
        }
    }
}

impl BrokerLink for MqttLink {
    async fn handshake(&mut self) -> Result<(), LinkError> {
        let deadline = Instant::now() + self.connect_timeout;
        loop {
            let now = Instant::now();
            if now >= deadline {
                return Err(LinkError::BrokerHandshakeFailed(
                    "timed out waiting for broker acknowledgement".to_string(),
                ));
            }
            match timeout(deadline - now, self.eventloop.poll()).await {
                Err(_) => {
                    return Err(LinkError::BrokerHandshakeFailed(
                        "timed out waiting for broker acknowledgement".to_string(),
                    ))
                }
                Ok(Ok(Event::Incoming(Packet::ConnAck(_)))) => {
                    info!("connection established with broker");
                    return Ok(());
                }
                Ok(Ok(_)) => {}
                Ok(Err(e)) => return Err(LinkError::BrokerHandshakeFailed(e.to_string())),
            }
        }
    }

    async fn announce(&mut self) -> Result<(), LinkError> {
        let payload = format!("{} connected", self.client_id);
        self.client
            .publish(self.topic.as_str(), QoS::AtLeastOnce, false, payload)
            .await
            .map_err(|e| LinkError::BrokerHandshakeFailed(e.to_string()))?;
        self.client
            .subscribe(self.topic.as_str(), QoS::AtLeastOnce)
            .await
            .map_err(|e| LinkError::BrokerHandshakeFailed(e.to_string()))?;
        info!("subscribed to topic: {}", self.topic);

        if !self.drive(FLUSH_BUDGET).await {
            return Err(LinkError::NetworkLost);
        }
        Ok(())
    }

    async fn publish(&mut self, raw_line: &str) -> Result<(), PublishError> {
        self.client
            .publish(self.topic.as_str(), QoS::AtLeastOnce, false, raw_line.to_owned())
            .await
            .map_err(|e| PublishError::BrokerUnavailable(e.to_string()))?;

        if !self.drive(FLUSH_BUDGET).await {
            return Err(PublishError::BrokerUnavailable(
                "session dropped while flushing".to_string(),
            ));
        }
        Ok(())
    }

    async fn service(&mut self) -> Result<Vec<InboundMessage>, LinkError> {
        if !self.drive(SERVICE_BUDGET).await {
            // Messages drained before the error stay queued for the next
            // service call after the session is re-established.
            return Err(LinkError::NetworkLost);
        }
        Ok(std::mem::take(&mut self.pending))
    }
}
