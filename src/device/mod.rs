// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! High-level device abstraction for the LED matrix.
//!
//! A [`Device`] mirrors the state of one matrix and keeps it fresh from two
//! sources:
//!
//! - a persistent push session that the device uses to announce every
//!   change, reconnected forever with a fixed delay
//! - a periodic poll of the full state, which also runs once per new push
//!   session and shortly after every command
//!
//! Both sources merge into one [`StateCache`]. Subscribers are notified
//! whenever a merge changes something.
//!
//! ```no_run
//! use obegraensad_lib::Device;
//! use obegraensad_lib::subscription::Subscribable;
//! use obegraensad_lib::types::{Brightness, RotateDirection};
//!
//! # async fn example() -> obegraensad_lib::Result<()> {
//! let device = Device::builder("192.168.5.60").build()?;
//!
//! device.subscribe(|state| {
//!     println!("brightness={} rotation={}", state.brightness(), state.rotation());
//! });
//!
//! device.start()?;
//!
//! device.set_brightness(Brightness::new(128)).await?;
//! device.rotate(RotateDirection::Left).await?;
//!
//! device.stop().await?;
//! # Ok(())
//! # }
//! ```
//!
//! Commands are only sent while the push session is live. There is no
//! offline queue: a command issued while disconnected fails with
//! [`Error::NotConnected`].

#[cfg(all(feature = "http", feature = "websocket"))]
mod builder;
mod config;
mod connection;
mod poller;

#[cfg(all(feature = "http", feature = "websocket"))]
pub use builder::DeviceBuilder;
pub use config::DeviceConfig;
pub use connection::ConnectionStatus;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::time::Instant;

use parking_lot::Mutex;
use tokio::sync::{Notify, oneshot};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::command::Command;
use crate::error::Error;
use crate::protocol::{PushConnector, StateSource, codec};
#[cfg(all(feature = "http", feature = "websocket"))]
use crate::protocol::{HttpClient, WebSocketConnector};
use crate::state::{ChangeSet, DeviceState, StateCache, StateField, StatePatch};
use crate::subscription::{CallbackRegistry, Subscribable, SubscriptionId};
use crate::types::{Brightness, PluginId, RotateDirection};

use connection::Outbound;

/// Handle to one LED matrix.
///
/// Cloning is cheap; all clones share the same cache, subscribers and
/// background tasks. Dropping the last clone cancels the background tasks
/// without waiting for them; call [`stop`](Self::stop) for an orderly
/// shutdown.
///
/// # Type Parameters
///
/// - `C`: push transport, [`WebSocketConnector`](crate::protocol::WebSocketConnector) by default
/// - `S`: poll transport, [`HttpClient`](crate::protocol::HttpClient) by default
///
/// Custom transports are plugged in with [`Device::with_transports`].
pub struct Device<C, S>
where
    C: PushConnector,
    S: StateSource,
{
    shared: Arc<Shared<C, S>>,
    lifecycle: Arc<Lifecycle>,
}

/// State shared between device handles and background tasks.
pub(crate) struct Shared<C, S> {
    pub(crate) config: DeviceConfig,
    pub(crate) connector: C,
    pub(crate) source: S,
    pub(crate) cache: StateCache,
    callbacks: CallbackRegistry,
    status: AtomicU8,
    /// Serializes merge-then-notify and status notifications.
    notify_lock: Mutex<()>,
    /// Set once `stop()` begins; suppresses state notifications.
    closed: AtomicBool,
    /// Sender of the live session's command channel.
    pub(crate) outbound: Mutex<Option<tokio::sync::mpsc::Sender<Outbound>>>,
    pub(crate) last_seen: Mutex<Option<Instant>>,
    /// Wakes the poller for a follow-up poll.
    pub(crate) refresh: Notify,
}

/// Background tasks of a started device.
struct Running {
    cancel: CancellationToken,
    tasks: Vec<JoinHandle<()>>,
}

/// Owned by device handles only, never by the tasks it tracks.
#[derive(Default)]
struct Lifecycle {
    running: Mutex<Option<Running>>,
}

impl Drop for Lifecycle {
    fn drop(&mut self) {
        if let Some(running) = self.running.get_mut().take() {
            tracing::debug!("Last device handle dropped, cancelling sync tasks");
            running.cancel.cancel();
        }
    }
}

#[cfg(all(feature = "http", feature = "websocket"))]
impl Device<WebSocketConnector, HttpClient> {
    /// Creates a builder for a device at the given host.
    ///
    /// # Examples
    ///
    /// ```
    /// use obegraensad_lib::Device;
    ///
    /// let device = Device::builder("192.168.5.60").with_port(8080).build().unwrap();
    /// assert_eq!(device.config().ws_url(), "ws://192.168.5.60:8080/ws");
    /// ```
    #[must_use]
    pub fn builder(host: impl Into<String>) -> DeviceBuilder {
        DeviceBuilder::new(host)
    }
}

impl<C, S> Device<C, S>
where
    C: PushConnector,
    S: StateSource,
{
    /// Creates a device from a configuration and explicit transports.
    ///
    /// The device starts idle; call [`start`](Self::start) to connect.
    #[must_use]
    pub fn with_transports(config: DeviceConfig, connector: C, source: S) -> Self {
        Self {
            shared: Arc::new(Shared {
                config,
                connector,
                source,
                cache: StateCache::new(),
                callbacks: CallbackRegistry::new(),
                status: AtomicU8::new(ConnectionStatus::Disconnected as u8),
                notify_lock: Mutex::new(()),
                closed: AtomicBool::new(false),
                outbound: Mutex::new(None),
                last_seen: Mutex::new(None),
                refresh: Notify::new(),
            }),
            lifecycle: Arc::new(Lifecycle::default()),
        }
    }

    /// Returns the device configuration.
    #[must_use]
    pub fn config(&self) -> &DeviceConfig {
        &self.shared.config
    }

    /// Returns a snapshot of the current device state.
    #[must_use]
    pub fn state(&self) -> DeviceState {
        self.shared.cache.read()
    }

    /// Returns the push connection status.
    #[must_use]
    pub fn connection_status(&self) -> ConnectionStatus {
        self.shared.status()
    }

    /// Returns when the last push frame of the current session arrived.
    ///
    /// `None` before the first frame of each session.
    #[must_use]
    pub fn last_seen(&self) -> Option<Instant> {
        *self.shared.last_seen.lock()
    }

    /// Returns `true` between [`start`](Self::start) and
    /// [`stop`](Self::stop).
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.lifecycle.running.lock().is_some()
    }

    // ========== Lifecycle ==========

    /// Spawns the connection and poller tasks.
    ///
    /// Must be called from within a Tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AlreadyRunning`] if the device is already started.
    pub fn start(&self) -> Result<(), Error> {
        let mut running = self.lifecycle.running.lock();
        if running.is_some() {
            return Err(Error::AlreadyRunning);
        }

        self.shared.closed.store(false, Ordering::Release);

        let cancel = CancellationToken::new();
        let tasks = vec![
            tokio::spawn(connection::run(Arc::clone(&self.shared), cancel.clone())),
            tokio::spawn(poller::run(Arc::clone(&self.shared), cancel.clone())),
        ];
        *running = Some(Running { cancel, tasks });

        tracing::info!(host = %self.shared.config.host(), "Device sync started");
        Ok(())
    }

    /// Stops the background tasks and closes the push session.
    ///
    /// Subscribers are not called once this method has begun. Status
    /// callbacks still observe the final transition to
    /// [`ConnectionStatus::Disconnected`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotRunning`] if the device was not started.
    pub async fn stop(&self) -> Result<(), Error> {
        let running = self.lifecycle.running.lock().take().ok_or(Error::NotRunning)?;

        {
            let _guard = self.shared.notify_lock.lock();
            self.shared.closed.store(true, Ordering::Release);
        }

        running.cancel.cancel();
        for task in running.tasks {
            if let Err(e) = task.await {
                tracing::warn!(error = %e, "Sync task ended abnormally");
            }
        }

        self.shared.outbound.lock().take();
        self.shared.set_status(ConnectionStatus::Disconnected);

        tracing::info!(host = %self.shared.config.host(), "Device sync stopped");
        Ok(())
    }

    /// Polls the device now and returns the merged state.
    ///
    /// Works whether or not the device is started.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails, times out, or the body cannot be
    /// decoded. The cache is unchanged in that case.
    pub async fn refresh(&self) -> Result<DeviceState, Error> {
        self.shared.poll().await
    }

    // ========== Commands ==========

    /// Validates and sends a command given by name and untyped parameters.
    ///
    /// See [`Command::parse`] for the accepted forms of `params`.
    ///
    /// # Errors
    ///
    /// - [`Error::Value`] if the name or parameters are invalid; nothing is sent
    /// - [`Error::NotConnected`] if the push session is not live
    pub async fn dispatch(&self, name: &str, params: &serde_json::Value) -> Result<(), Error> {
        let command = Command::parse(name, params)?;
        self.send_command(command).await
    }

    /// Sends a command over the live push session.
    ///
    /// Resolves once the frame is written. The device echoes the resulting
    /// state on the push channel, and a follow-up poll is scheduled.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotConnected`] if the session is not live or ends
    /// before the frame is written.
    pub async fn send_command(&self, command: Command) -> Result<(), Error> {
        if !self.connection_status().is_live() {
            return Err(Error::NotConnected);
        }

        let sender = self
            .shared
            .outbound
            .lock()
            .clone()
            .ok_or(Error::NotConnected)?;

        let frame = codec::encode(&command)?;
        let (ack_tx, ack_rx) = oneshot::channel();

        sender
            .send(Outbound { frame, ack: ack_tx })
            .await
            .map_err(|_| Error::NotConnected)?;

        match ack_rx.await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                tracing::debug!(command = command.name(), error = %e, "Command write failed");
                return Err(Error::NotConnected);
            }
            Err(_) => return Err(Error::NotConnected),
        }

        tracing::debug!(command = command.name(), "Command sent");
        self.shared.refresh.notify_one();
        Ok(())
    }

    /// Sets the panel brightness.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotConnected`] if the session is not live.
    pub async fn set_brightness(&self, brightness: Brightness) -> Result<(), Error> {
        self.send_command(Command::brightness(brightness)).await
    }

    /// Sets full brightness.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotConnected`] if the session is not live.
    pub async fn turn_on(&self) -> Result<(), Error> {
        self.set_brightness(Brightness::MAX).await
    }

    /// Sets zero brightness.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotConnected`] if the session is not live.
    pub async fn turn_off(&self) -> Result<(), Error> {
        self.set_brightness(Brightness::OFF).await
    }

    /// Switches to another plugin.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotConnected`] if the session is not live.
    pub async fn set_plugin(&self, plugin: PluginId) -> Result<(), Error> {
        self.send_command(Command::plugin(plugin)).await
    }

    /// Rotates the display by a quarter turn.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotConnected`] if the session is not live.
    pub async fn rotate(&self, direction: RotateDirection) -> Result<(), Error> {
        self.send_command(Command::rotate(direction)).await
    }

    /// Enables or disables the plugin schedule.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotConnected`] if the session is not live.
    pub async fn set_schedule_active(&self, active: bool) -> Result<(), Error> {
        self.send_command(Command::schedule_active(active)).await
    }
}

impl<C, S> Subscribable for Device<C, S>
where
    C: PushConnector,
    S: StateSource,
{
    fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&DeviceState) + Send + Sync + 'static,
    {
        self.shared.callbacks.subscribe(callback)
    }

    fn on_field_changed<F>(&self, field: StateField, callback: F) -> SubscriptionId
    where
        F: Fn(&DeviceState) + Send + Sync + 'static,
    {
        self.shared.callbacks.on_field_changed(field, callback)
    }

    fn on_status_changed<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(ConnectionStatus) + Send + Sync + 'static,
    {
        self.shared.callbacks.on_status_changed(callback)
    }

    fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.shared.callbacks.unsubscribe(id)
    }
}

impl<C, S> Clone for Device<C, S>
where
    C: PushConnector,
    S: StateSource,
{
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
            lifecycle: Arc::clone(&self.lifecycle),
        }
    }
}

impl<C, S> std::fmt::Debug for Device<C, S>
where
    C: PushConnector,
    S: StateSource,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Device")
            .field("host", &self.shared.config.host())
            .field("status", &self.connection_status())
            .field("running", &self.is_running())
            .field("subscribers", &self.shared.callbacks.callback_count())
            .finish_non_exhaustive()
    }
}

impl<C, S> Shared<C, S> {
    pub(crate) fn status(&self) -> ConnectionStatus {
        ConnectionStatus::from_u8(self.status.load(Ordering::Acquire))
    }

    /// Records a status and notifies status callbacks on a transition.
    pub(crate) fn set_status(&self, status: ConnectionStatus) {
        let _guard = self.notify_lock.lock();
        let previous = ConnectionStatus::from_u8(self.status.swap(status as u8, Ordering::AcqRel));
        if previous != status {
            tracing::debug!(from = %previous, to = %status, "Connection status changed");
            self.callbacks.dispatch_status(status);
        }
    }

    /// Merges a patch and notifies subscribers if anything changed.
    pub(crate) fn apply(&self, patch: &StatePatch) -> ChangeSet {
        let _guard = self.notify_lock.lock();
        let changes = self.cache.merge(patch);

        if !changes.is_empty() && !self.closed.load(Ordering::Acquire) {
            tracing::debug!(
                fields = ?changes.fields().collect::<Vec<_>>(),
                "State changed"
            );
            let snapshot = self.cache.read();
            self.callbacks.dispatch(&snapshot, &changes);
        }

        changes
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicU32;

    use super::*;
    use crate::error::ProtocolError;
    use crate::protocol::PushSession;
    use crate::types::Rotation;

    struct NoConnector;

    struct NoSession;

    impl PushSession for NoSession {
        async fn recv(&mut self) -> Result<Option<String>, ProtocolError> {
            Ok(None)
        }

        async fn send(&mut self, _frame: String) -> Result<(), ProtocolError> {
            Err(ProtocolError::ConnectionClosed)
        }

        async fn close(&mut self) {}
    }

    impl PushConnector for NoConnector {
        type Session = NoSession;

        async fn connect(&self) -> Result<NoSession, ProtocolError> {
            Err(ProtocolError::ConnectionFailed("unreachable".to_string()))
        }
    }

    struct FixedSource(&'static str);

    impl StateSource for FixedSource {
        async fn fetch(&self) -> Result<String, ProtocolError> {
            Ok(self.0.to_string())
        }
    }

    fn device(body: &'static str) -> Device<NoConnector, FixedSource> {
        Device::with_transports(DeviceConfig::new("test"), NoConnector, FixedSource(body))
    }

    #[test]
    fn new_device_is_idle() {
        let device = device("{}");
        assert_eq!(device.connection_status(), ConnectionStatus::Disconnected);
        assert_eq!(device.state(), DeviceState::new());
        assert!(device.last_seen().is_none());
        assert!(!device.is_running());
    }

    #[test]
    fn apply_notifies_only_on_change() {
        let device = device("{}");
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();
        device.subscribe(move |_| {
            counter_clone.fetch_add(1, Ordering::SeqCst);
        });

        let patch = StatePatch::new().with_rotation(Rotation::new(2).unwrap());
        assert_eq!(device.shared.apply(&patch).len(), 1);
        assert!(device.shared.apply(&patch).is_empty());
        assert!(device.shared.apply(&StatePatch::new()).is_empty());

        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn closed_device_does_not_notify() {
        let device = device("{}");
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();
        device.subscribe(move |_| {
            counter_clone.fetch_add(1, Ordering::SeqCst);
        });

        device.shared.closed.store(true, Ordering::Release);
        device
            .shared
            .apply(&StatePatch::new().with_brightness(Brightness::new(9)));

        assert_eq!(counter.load(Ordering::SeqCst), 0);
        assert_eq!(device.state().brightness().value(), 9);
    }

    #[test]
    fn status_callbacks_fire_on_transitions_only() {
        let device = device("{}");
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = seen.clone();
        device.on_status_changed(move |s| seen_clone.lock().push(s));

        device.shared.set_status(ConnectionStatus::Disconnected);
        device.shared.set_status(ConnectionStatus::Connecting);
        device.shared.set_status(ConnectionStatus::Connecting);
        device.shared.set_status(ConnectionStatus::Disconnected);

        assert_eq!(
            *seen.lock(),
            vec![ConnectionStatus::Connecting, ConnectionStatus::Disconnected]
        );
    }

    #[tokio::test]
    async fn refresh_merges_poll() {
        let device = device(r#"{"brightness": 42, "rotation": 3}"#);
        let state = device.refresh().await.unwrap();
        assert_eq!(state.brightness().value(), 42);
        assert_eq!(device.state().rotation().value(), 3);
    }

    #[tokio::test]
    async fn refresh_with_bad_body_keeps_cache() {
        let device = device("<html>");
        assert!(matches!(device.refresh().await, Err(Error::Parse(_))));
        assert_eq!(device.state(), DeviceState::new());
    }

    #[tokio::test]
    async fn command_rejected_when_not_live() {
        let device = device("{}");
        assert!(matches!(
            device.turn_on().await,
            Err(Error::NotConnected)
        ));
        assert!(matches!(
            device.dispatch("brightness", &serde_json::json!(300)).await,
            Err(Error::Value(_))
        ));
    }

    #[tokio::test]
    async fn start_and_stop_lifecycle() {
        let device = device("{}");

        device.start().unwrap();
        assert!(device.is_running());
        assert!(matches!(device.start(), Err(Error::AlreadyRunning)));

        device.stop().await.unwrap();
        assert!(!device.is_running());
        assert_eq!(device.connection_status(), ConnectionStatus::Disconnected);
        assert!(matches!(device.stop().await, Err(Error::NotRunning)));
    }

    #[test]
    fn debug_output() {
        let device = device("{}");
        let id = device.subscribe(|_| {});
        device.on_status_changed(|_| {});

        let debug = format!("{device:?}");
        assert!(debug.contains("Device"));
        assert!(debug.contains("test"));
        assert!(debug.contains("subscribers: 2"));

        device.unsubscribe(id);
        assert!(format!("{device:?}").contains("subscribers: 1"));
    }
}
