//! # Broker Transport Module
//!
//! Trait abstraction over the publish/subscribe link so the session
//! controller can be driven by a real MQTT client or by a test double.
//!
//! This module handles:
//! - The transport capability set (connect, subscribe, receive, disconnect)
//! - Inbound events: topic messages and link loss
//! - The MQTT implementation over `rumqttc`

pub mod mqtt;

pub use mqtt::MqttTransport;

use async_trait::async_trait;

use crate::error::Result;

/// Something the transport delivered
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// A publish on a subscribed topic, payload decoded as text
    Message { topic: String, payload: String },

    /// The established link went away.
    ///
    /// `code` 0 is a close this client asked for. Broker-side closes and
    /// link errors carry a non-zero code.
    ConnectionLost { code: i32, reason: String },
}

/// Publish/subscribe link used by the session controller
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BrokerTransport: Send {
    /// Perform the broker handshake
    ///
    /// Resolves once the broker has accepted the session.
    async fn connect(&mut self) -> Result<()>;

    /// Subscribe to a topic on the current session
    async fn subscribe(&mut self, topic: &str) -> Result<()>;

    /// Wait for the next inbound event
    ///
    /// Only called while connected.
    async fn next_event(&mut self) -> Result<TransportEvent>;

    /// Close the session
    async fn disconnect(&mut self) -> Result<()>;

    /// Whether a session is currently established
    fn is_connected(&self) -> bool;
}
