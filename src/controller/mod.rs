//! # Session Controller Module
//!
//! Drives one dashboard session: the broker connection lifecycle, message
//! dispatch by topic, and the derived state shown on the dashboard.
//!
//! ## Connection lifecycle
//!
//! ```text
//!                 connect()             handshake ok
//! Disconnected ─────────────► Connecting ─────────────► Connected
//!      ▲                          │                         │
//!      │   handshake failed       │        link lost        │
//!      └──────────────────────────┴─────────────────────────┘
//! ```
//!
//! A failed handshake always schedules exactly one new attempt after the
//! reconnect interval (5 s by default). Link loss does the same unless
//! `reconnect.on_link_loss` is turned off. There is no backoff and no retry
//! cap. Shutting the session down cancels a pending attempt.
//!
//! ## Concurrency
//!
//! [`SessionController::run`] handles transport events, timers, operator
//! [`Command`]s and the shutdown signal one at a time on a single task. All
//! state is owned by the controller. The shutdown signal also interrupts a
//! connect attempt that is still waiting on the broker.

pub mod command;
pub mod payload;

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{interval_at, sleep_until, Instant, Interval, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use crate::config::{Config, TopicConfig};
use crate::error::{DashboardError, Result};
use crate::session::{Clock, EventLevel, LinkStatus, SessionState, SystemClock};
use crate::simulator::Simulator;
use crate::sink::{Chart, DashboardSink, Indicator, IndicatorState};
use crate::transport::{BrokerTransport, TransportEvent};

pub use command::{forward_commands, Command};
use payload::{parse_rotation, parse_temperature};

/// Delay between starting a manual refresh and reporting it done
pub const REFRESH_DURATION: Duration = Duration::from_millis(1000);

/// Telemetry session controller
///
/// Generic over the broker transport and the output sink so that both can
/// be replaced in tests.
pub struct SessionController<T: BrokerTransport, S: DashboardSink> {
    transport: T,
    sink: S,
    clock: Box<dyn Clock>,
    state: SessionState,
    topics: TopicConfig,
    broker_address: String,
    reconnect_interval: Duration,
    reconnect_on_link_loss: bool,
    reconnect_at: Option<Instant>,
    refresh_at: Option<Instant>,
    simulation: Option<(Simulator, Duration)>,
    commands: Option<mpsc::Receiver<Command>>,
    closed: bool,
}

impl<T: BrokerTransport, S: DashboardSink> SessionController<T, S> {
    /// Create a controller for a new session
    ///
    /// Nothing happens on the network until [`connect`](Self::connect) or
    /// [`run`](Self::run) is called.
    pub fn new(config: &Config, transport: T, sink: S) -> Self {
        let simulation = config.simulation.enabled.then(|| {
            (
                Simulator::default(),
                Duration::from_millis(config.simulation.interval_ms),
            )
        });

        Self {
            transport,
            sink,
            clock: Box::new(SystemClock),
            state: SessionState::new(&config.history),
            topics: config.topics.clone(),
            broker_address: config.broker.address(),
            reconnect_interval: Duration::from_millis(config.reconnect.interval_ms),
            reconnect_on_link_loss: config.reconnect.on_link_loss,
            reconnect_at: None,
            refresh_at: None,
            simulation,
            commands: None,
            closed: false,
        }
    }

    /// Replace the wall-clock source
    #[must_use]
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Take operator commands from `commands` while running
    #[must_use]
    pub fn with_commands(mut self, commands: mpsc::Receiver<Command>) -> Self {
        self.commands = Some(commands);
        self
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// When the pending reconnect attempt is due, if one is scheduled
    pub fn reconnect_deadline(&self) -> Option<Instant> {
        self.reconnect_at
    }

    /// Whether [`shutdown`](Self::shutdown) has been called
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Announce the dashboard: broker address and an initial log entry
    pub fn start(&mut self) {
        info!("Telemetry dashboard for broker {}", self.broker_address);
        self.sink.show_broker_address(&self.broker_address);
        self.log(EventLevel::Info, "Dashboard initialized");
    }

    /// Attempt to open a broker session and subscribe to both topics
    ///
    /// On failure the session goes back to `Disconnected` and one reconnect
    /// attempt is scheduled. Does nothing after shutdown.
    pub async fn connect(&mut self) {
        if self.closed {
            debug!("Session closed, not connecting");
            return;
        }

        self.reconnect_at = None;
        self.state.set_link(LinkStatus::Connecting);
        self.sink
            .set_status(Indicator::Feed, IndicatorState::Connecting, "Connecting...");

        match self.open_session().await {
            Ok(()) => self.on_connected(),
            Err(e) => {
                if self.transport.is_connected() {
                    if let Err(e) = self.transport.disconnect().await {
                        debug!("Cleanup after failed connect: {}", e);
                    }
                }
                self.on_connect_failure(&e);
            }
        }
    }

    async fn open_session(&mut self) -> Result<()> {
        self.transport.connect().await?;
        for topic in [&self.topics.temperature, &self.topics.rotation] {
            self.transport.subscribe(topic).await?;
            info!("Subscribed to {}", topic);
        }
        Ok(())
    }

    fn on_connected(&mut self) {
        self.state.set_link(LinkStatus::Connected);
        self.state.set_broker_online(true);
        self.sink
            .set_status(Indicator::Feed, IndicatorState::Connected, "Connected");
        self.sink
            .set_status(Indicator::Broker, IndicatorState::Online, "Online");
        self.log(EventLevel::Success, "Connected to MQTT broker");
    }

    fn on_connect_failure(&mut self, err: &DashboardError) {
        error!("MQTT connection failed: {}", err);
        self.state.set_link(LinkStatus::Disconnected);
        self.state.set_broker_online(false);
        self.sink
            .set_status(Indicator::Feed, IndicatorState::Disconnected, "Disconnected");
        self.sink
            .set_status(Indicator::Broker, IndicatorState::Offline, "Offline");
        self.log(EventLevel::Error, format!("MQTT connection failed: {}", err));
        self.schedule_reconnect();
    }

    fn schedule_reconnect(&mut self) {
        if self.closed {
            return;
        }
        // One pending attempt at most; rescheduling replaces it
        self.reconnect_at = Some(Instant::now() + self.reconnect_interval);
        info!("Reconnecting in {} ms", self.reconnect_interval.as_millis());
    }

    /// Apply one transport event
    pub fn handle_event(&mut self, event: TransportEvent) {
        match event {
            TransportEvent::Message { topic, payload } => self.handle_message(&topic, &payload),
            TransportEvent::ConnectionLost { code, reason } => {
                self.handle_connection_lost(code, &reason)
            }
        }
    }

    /// Handle the loss of an established link
    ///
    /// A zero code is a close this client asked for and is not reported on
    /// the dashboard.
    pub fn handle_connection_lost(&mut self, code: i32, reason: &str) {
        self.state.set_link(LinkStatus::Disconnected);

        if code == 0 {
            debug!("MQTT session closed cleanly: {}", reason);
            return;
        }

        warn!("MQTT connection lost (code {}): {}", code, reason);
        self.sink
            .set_status(Indicator::Feed, IndicatorState::Disconnected, "Disconnected");
        self.log(EventLevel::Error, "MQTT connection lost");

        if self.reconnect_on_link_loss {
            self.schedule_reconnect();
        }
    }

    /// Dispatch a message by topic
    ///
    /// Unknown topics are ignored, but any message marks the device online.
    pub fn handle_message(&mut self, topic: &str, payload: &str) {
        let now = self.clock.now();
        debug!("MQTT: {} -> {}", topic, payload);

        if topic == self.topics.temperature {
            match parse_temperature(topic, payload) {
                Ok(value) => self.update_temperature(value),
                Err(e) => self.reject(&e),
            }
        } else if topic == self.topics.rotation {
            match parse_rotation(topic, payload) {
                Ok(count) => self.update_rotation(count),
                Err(e) => self.reject(&e),
            }
        } else {
            debug!("Ignoring message on unknown topic {}", topic);
        }

        self.state.mark_device_seen(now);
        self.sink
            .set_status(Indicator::Device, IndicatorState::Online, "Online");
        self.sink.show_last_update(now);
    }

    /// Record a temperature reading, classify its trend and redraw the chart
    pub fn update_temperature(&mut self, value: f64) {
        let now = self.clock.now();
        let trend = self.state.record_temperature(value, now);
        self.sink.show_temperature(value, trend, now);

        let (labels, values) = self.state.temperatures().chart_series();
        self.sink.set_series(Chart::Temperature, &labels, &values);

        self.log(EventLevel::Info, format!("Temperature updated: {:.1}°C", value));
    }

    /// Record one rotation event and redraw the bucket chart
    pub fn update_rotation(&mut self, count: i64) {
        let now = self.clock.now();
        let today = self.state.record_rotation(count, now);
        self.sink.show_rotation(count, today, now);

        let (labels, values) = self.state.buckets().chart_series();
        self.sink.set_series(Chart::Rotation, &labels, &values);

        self.log(EventLevel::Info, format!("Rotation recorded. Total today: {}", today));
    }

    fn reject(&mut self, err: &DashboardError) {
        warn!("Rejected reading: {}", err);
        self.log(EventLevel::Error, err.to_string());
    }

    /// Start a manual refresh; it completes after [`REFRESH_DURATION`]
    pub fn refresh(&mut self) {
        self.log(EventLevel::Info, "Refreshing data...");
        self.refresh_at = Some(Instant::now() + REFRESH_DURATION);
    }

    fn complete_refresh(&mut self) {
        self.refresh_at = None;
        self.log(EventLevel::Info, "Data refreshed manually");
    }

    /// Record a change of the chart time range
    pub fn select_range(&mut self, range: &str) {
        info!("Chart range changed to {}", range);
        self.log(EventLevel::Info, format!("Chart range changed to: {}", range));
    }

    /// Apply an operator command; returns `true` when it ends the session
    pub fn handle_command(&mut self, command: Command) -> bool {
        debug!("Command: {:?}", command);
        match command {
            Command::Refresh => self.refresh(),
            Command::Range(range) => self.select_range(&range),
            Command::Logout => return true,
        }
        false
    }

    /// Inject one simulated reading while no broker session is up
    pub fn simulate_tick(&mut self) {
        if self.state.link() == LinkStatus::Connected {
            return;
        }

        let daily = self.state.daily_rotations();
        let t_secs = self.clock.now().timestamp_millis() as f64 / 1000.0;
        let Some((simulator, _)) = self.simulation.as_mut() else {
            return;
        };
        let reading = simulator.tick(t_secs, daily);

        self.update_temperature(reading.temperature);
        if let Some(count) = reading.rotation {
            self.update_rotation(count);
        }
    }

    /// Close the session: disconnect, cancel the pending reconnect
    pub async fn shutdown(&mut self) {
        self.closed = true;
        self.reconnect_at = None;
        self.refresh_at = None;

        if self.transport.is_connected() {
            if let Err(e) = self.transport.disconnect().await {
                warn!("Failed to disconnect cleanly: {}", e);
            }
        }

        if self.state.link() != LinkStatus::Disconnected {
            self.state.set_link(LinkStatus::Disconnected);
            self.sink
                .set_status(Indicator::Feed, IndicatorState::Disconnected, "Disconnected");
        }
        self.log(EventLevel::Info, "Session closed");
    }

    /// Run the session until `stop` resolves
    ///
    /// Connects immediately, then reacts to transport events, the reconnect
    /// timer, refresh completion, simulator ticks and operator commands until
    /// stopped or logged out.
    pub async fn run<F>(&mut self, stop: F)
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(stop);

        self.start();
        if self.connect_or_stop(&mut stop).await {
            return;
        }

        let mut ticker = self.simulation.as_ref().map(|(_, period)| {
            let mut ticker = interval_at(Instant::now() + *period, *period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            ticker
        });

        loop {
            let connected = self.state.link() == LinkStatus::Connected;
            let reconnect_at = self.reconnect_at;
            let refresh_at = self.refresh_at;
            let simulate = ticker.is_some() && !connected;
            let listening = self.commands.is_some();

            tokio::select! {
                _ = &mut stop => {
                    info!("Stopping telemetry session");
                    self.shutdown().await;
                    break;
                }

                event = self.transport.next_event(), if connected => match event {
                    Ok(event) => self.handle_event(event),
                    Err(e) => self.handle_connection_lost(1, &e.to_string()),
                },

                _ = sleep_until(reconnect_at.unwrap_or_else(Instant::now)), if reconnect_at.is_some() => {
                    if self.connect_or_stop(&mut stop).await {
                        break;
                    }
                }

                _ = sleep_until(refresh_at.unwrap_or_else(Instant::now)), if refresh_at.is_some() => {
                    self.complete_refresh();
                }

                _ = next_tick(&mut ticker), if simulate => {
                    self.simulate_tick();
                }

                command = next_command(&mut self.commands), if listening => match command {
                    Some(command) => {
                        if self.handle_command(command) {
                            info!("Logout requested");
                            self.shutdown().await;
                            break;
                        }
                    }
                    None => {
                        debug!("Command input closed");
                        self.commands = None;
                    }
                },
            }
        }
    }

    /// Connect unless `stop` resolves first; returns `true` if stopped
    ///
    /// A stopped attempt is abandoned and the session is shut down.
    async fn connect_or_stop<F>(&mut self, stop: &mut Pin<&mut F>) -> bool
    where
        F: Future<Output = ()>,
    {
        let stopped = tokio::select! {
            _ = stop.as_mut() => true,
            _ = self.connect() => false,
        };
        if stopped {
            info!("Stopping telemetry session while connecting");
            self.shutdown().await;
        }
        stopped
    }

    fn log(&mut self, level: EventLevel, text: impl Into<String>) {
        let now = self.clock.now();
        let entry = self.state.log_event(level, text, now);
        self.sink.show_event(entry);
    }
}

async fn next_command(commands: &mut Option<mpsc::Receiver<Command>>) -> Option<Command> {
    match commands {
        Some(commands) => commands.recv().await,
        None => std::future::pending().await,
    }
}

async fn next_tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(ticker) => {
            ticker.tick().await;
        }
        None => std::future::pending().await,
    }
}
