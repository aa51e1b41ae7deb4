//! MQTT transport over `rumqttc`.
//!
//! Each `connect` builds a fresh client/event-loop pair and polls it until
//! the broker's CONNACK arrives. The event loop is then polled by
//! `next_event`, which surfaces publishes and turns poll errors into a
//! link-loss event.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use rumqttc::{AsyncClient, ConnectReturnCode, Event, EventLoop, MqttOptions, Outgoing, Packet, QoS};
use tracing::{debug, info, warn};

use super::{BrokerTransport, TransportEvent};
use crate::config::BrokerConfig;
use crate::error::{DashboardError, Result};

/// Bounded request queue between the client handle and the event loop
const REQUEST_CAPACITY: usize = 32;

/// How long to keep polling for the outgoing DISCONNECT on shutdown
const DISCONNECT_FLUSH_TIMEOUT: Duration = Duration::from_secs(1);

/// Link-loss code reported for transport errors and broker-side closes
const LINK_ERROR_CODE: i32 = 1;

/// MQTT client session
pub struct MqttTransport {
    options: MqttOptions,
    connect_timeout: Duration,
    client: Option<AsyncClient>,
    eventloop: Option<EventLoop>,
}

impl std::fmt::Debug for MqttTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (host, port) = self.options.broker_address();
        f.debug_struct("MqttTransport")
            .field("broker", &format!("{}:{}", host, port))
            .field("client_id", &self.options.client_id())
            .field("connected", &self.is_connected())
            .finish_non_exhaustive()
    }
}

impl MqttTransport {
    /// Create a transport for the configured broker
    ///
    /// The client id is the configured prefix followed by 8 hex digits so
    /// that several dashboards can share a broker.
    pub fn new(config: &BrokerConfig) -> Self {
        let client_id = format!("{}{}", config.client_id_prefix, client_suffix());
        let mut options = MqttOptions::new(client_id, config.host.clone(), config.port);
        options.set_keep_alive(Duration::from_secs(config.keep_alive_s));
        options.set_clean_session(true);

        Self {
            options,
            connect_timeout: Duration::from_millis(config.connect_timeout_ms),
            client: None,
            eventloop: None,
        }
    }

    /// Client id presented to the broker
    pub fn client_id(&self) -> String {
        self.options.client_id()
    }

    fn drop_session(&mut self) {
        self.client = None;
        self.eventloop = None;
    }
}

fn client_suffix() -> String {
    let nanos = Utc::now().timestamp_subsec_nanos();
    format!("{:08x}", nanos ^ std::process::id().rotate_left(16))
}

/// Poll until the broker answers the CONNECT
async fn await_connack(eventloop: &mut EventLoop) -> Result<()> {
    loop {
        match eventloop.poll().await {
            Ok(Event::Incoming(Packet::ConnAck(ack))) => {
                return if ack.code == ConnectReturnCode::Success {
                    Ok(())
                } else {
                    Err(DashboardError::Transport(format!(
                        "broker refused connection: {:?}",
                        ack.code
                    )))
                };
            }
            Ok(event) => debug!("Handshake event: {:?}", event),
            Err(e) => return Err(DashboardError::Transport(e.to_string())),
        }
    }
}

/// Map an event-loop event onto what the controller sees
///
/// A DISCONNECT from the broker is a link loss: code 0 is reserved for
/// closes this client asked for.
fn translate(event: Event) -> Option<TransportEvent> {
    match event {
        Event::Incoming(Packet::Publish(publish)) => Some(TransportEvent::Message {
            topic: publish.topic,
            payload: String::from_utf8_lossy(&publish.payload).into_owned(),
        }),
        Event::Incoming(Packet::Disconnect) => Some(TransportEvent::ConnectionLost {
            code: LINK_ERROR_CODE,
            reason: "broker closed the session".to_string(),
        }),
        _ => None,
    }
}

#[async_trait]
impl BrokerTransport for MqttTransport {
    async fn connect(&mut self) -> Result<()> {
        self.drop_session();

        let (host, port) = self.options.broker_address();
        debug!("Connecting to MQTT broker {}:{}", host, port);

        let (client, mut eventloop) = AsyncClient::new(self.options.clone(), REQUEST_CAPACITY);
        match tokio::time::timeout(self.connect_timeout, await_connack(&mut eventloop)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => return Err(e),
            Err(_) => {
                return Err(DashboardError::Transport(format!(
                    "no CONNACK within {} ms",
                    self.connect_timeout.as_millis()
                )))
            }
        }

        info!("Connected to MQTT broker {}:{}", host, port);
        self.client = Some(client);
        self.eventloop = Some(eventloop);
        Ok(())
    }

    async fn subscribe(&mut self, topic: &str) -> Result<()> {
        let client = self
            .client
            .as_ref()
            .ok_or_else(|| DashboardError::Transport("not connected".to_string()))?;
        client
            .subscribe(topic, QoS::AtMostOnce)
            .await
            .map_err(|e| DashboardError::Transport(format!("Failed to subscribe to {}: {}", topic, e)))?;
        debug!("Subscribe request queued for {}", topic);
        Ok(())
    }

    async fn next_event(&mut self) -> Result<TransportEvent> {
        let eventloop = self
            .eventloop
            .as_mut()
            .ok_or_else(|| DashboardError::Transport("not connected".to_string()))?;

        loop {
            match eventloop.poll().await {
                Ok(event) => {
                    let Some(event) = translate(event) else {
                        continue;
                    };
                    if matches!(event, TransportEvent::ConnectionLost { .. }) {
                        self.drop_session();
                    }
                    return Ok(event);
                }
                Err(e) => {
                    warn!("MQTT link error: {}", e);
                    self.drop_session();
                    return Ok(TransportEvent::ConnectionLost {
                        code: LINK_ERROR_CODE,
                        reason: e.to_string(),
                    });
                }
            }
        }
    }

    async fn disconnect(&mut self) -> Result<()> {
        let (Some(client), Some(mut eventloop)) = (self.client.take(), self.eventloop.take()) else {
            return Ok(());
        };

        client
            .disconnect()
            .await
            .map_err(|e| DashboardError::Transport(format!("Failed to disconnect: {}", e)))?;

        // The request only reaches the broker once the event loop sends it
        let flush = async {
            loop {
                match eventloop.poll().await {
                    Ok(Event::Outgoing(Outgoing::Disconnect)) | Err(_) => break,
                    Ok(_) => continue,
                }
            }
        };
        if tokio::time::timeout(DISCONNECT_FLUSH_TIMEOUT, flush).await.is_err() {
            debug!("Timed out flushing DISCONNECT");
        }

        info!("Disconnected from MQTT broker");
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.eventloop.is_some()
    }
}
