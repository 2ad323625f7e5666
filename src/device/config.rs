// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device connection settings.

use std::time::Duration;

/// Connection and timing settings for one device.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use obegraensad_lib::device::DeviceConfig;
///
/// let config = DeviceConfig::new("192.168.5.60")
///     .with_port(8080)
///     .with_poll_interval(Duration::from_secs(60));
///
/// assert_eq!(config.ws_url(), "ws://192.168.5.60:8080/ws");
/// assert_eq!(config.info_url(), "http://192.168.5.60:8080/api/info");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceConfig {
    host: String,
    port: u16,
    reconnect_delay: Duration,
    poll_interval: Duration,
    refresh_delay: Duration,
    request_timeout: Duration,
    connect_timeout: Duration,
}

impl DeviceConfig {
    /// Default HTTP/WebSocket port.
    pub const DEFAULT_PORT: u16 = 80;
    /// Default pause between reconnect attempts.
    pub const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_secs(5);
    /// Default interval of the background poll.
    pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(300);
    /// Default delay between a command and its follow-up poll.
    pub const DEFAULT_REFRESH_DELAY: Duration = Duration::from_millis(100);
    /// Default timeout of a single poll request.
    pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(5);
    /// Default timeout of the WebSocket handshake.
    pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

    /// Creates a configuration with default settings for the given host.
    #[must_use]
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: Self::DEFAULT_PORT,
            reconnect_delay: Self::DEFAULT_RECONNECT_DELAY,
            poll_interval: Self::DEFAULT_POLL_INTERVAL,
            refresh_delay: Self::DEFAULT_REFRESH_DELAY,
            request_timeout: Self::DEFAULT_REQUEST_TIMEOUT,
            connect_timeout: Self::DEFAULT_CONNECT_TIMEOUT,
        }
    }

    /// Sets the port shared by the HTTP and WebSocket endpoints.
    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Sets the fixed pause between reconnect attempts.
    #[must_use]
    pub fn with_reconnect_delay(mut self, delay: Duration) -> Self {
        self.reconnect_delay = delay;
        self
    }

    /// Sets the background poll interval.
    ///
    /// The first poll runs immediately on start.
    #[must_use]
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Sets the delay between a successful command and its follow-up poll.
    #[must_use]
    pub fn with_refresh_delay(mut self, delay: Duration) -> Self {
        self.refresh_delay = delay;
        self
    }

    /// Sets the timeout of a single poll request.
    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Sets the WebSocket handshake timeout.
    #[must_use]
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Returns the device host.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Returns the device port.
    #[must_use]
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Returns the reconnect delay.
    #[must_use]
    pub fn reconnect_delay(&self) -> Duration {
        self.reconnect_delay
    }

    /// Returns the poll interval.
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Returns the follow-up poll delay.
    #[must_use]
    pub fn refresh_delay(&self) -> Duration {
        self.refresh_delay
    }

    /// Returns the poll request timeout.
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    /// Returns the handshake timeout.
    #[must_use]
    pub fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }

    /// Returns `host` or `host:port` when the port is not the default.
    #[must_use]
    pub fn authority(&self) -> String {
        if self.port == Self::DEFAULT_PORT {
            self.host.clone()
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }

    /// Returns the push endpoint URL.
    #[must_use]
    pub fn ws_url(&self) -> String {
        format!("ws://{}/ws", self.authority())
    }

    /// Returns the HTTP base URL.
    #[must_use]
    pub fn base_url(&self) -> String {
        format!("http://{}", self.authority())
    }

    /// Returns the poll endpoint URL.
    #[must_use]
    pub fn info_url(&self) -> String {
        format!("{}/api/info", self.base_url())
    }
}
