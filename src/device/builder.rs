// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device builder.

use std::time::Duration;

use crate::device::{Device, DeviceConfig};
use crate::error::{Error, ProtocolError};
use crate::protocol::{HttpClient, WebSocketConnector};

/// Builder for devices using the WebSocket and HTTP transports.
///
/// This builder can be created in two ways:
/// - `Device::builder("host")` - Simple host string
/// - `DeviceBuilder::from_config(DeviceConfig::new("host").with_port(8080))` - Full configuration
///
/// # Examples
///
/// ```no_run
/// use std::time::Duration;
/// use obegraensad_lib::Device;
///
/// # async fn example() -> obegraensad_lib::Result<()> {
/// let device = Device::builder("192.168.5.60")
///     .with_poll_interval(Duration::from_secs(60))
///     .build()?;
///
/// device.start()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct DeviceBuilder {
    config: DeviceConfig,
}

impl DeviceBuilder {
    /// Creates a builder for the given host with default settings.
    #[must_use]
    pub fn new(host: impl Into<String>) -> Self {
        Self::from_config(DeviceConfig::new(host))
    }

    /// Creates a builder from an existing configuration.
    #[must_use]
    pub fn from_config(config: DeviceConfig) -> Self {
        Self { config }
    }

    /// Sets the device port.
    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.config = self.config.with_port(port);
        self
    }

    /// Sets the pause between reconnect attempts.
    #[must_use]
    pub fn with_reconnect_delay(mut self, delay: Duration) -> Self {
        self.config = self.config.with_reconnect_delay(delay);
        self
    }

    /// Sets the background poll interval.
    #[must_use]
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.config = self.config.with_poll_interval(interval);
        self
    }

    /// Sets the delay of the poll that follows each command.
    #[must_use]
    pub fn with_refresh_delay(mut self, delay: Duration) -> Self {
        self.config = self.config.with_refresh_delay(delay);
        self
    }

    /// Sets the timeout of a single poll request.
    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.config = self.config.with_request_timeout(timeout);
        self
    }

    /// Sets the WebSocket handshake timeout.
    #[must_use]
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.config = self.config.with_connect_timeout(timeout);
        self
    }

    /// Returns the configuration built so far.
    #[must_use]
    pub fn config(&self) -> &DeviceConfig {
        &self.config
    }

    /// Builds the device. No network access happens until
    /// [`Device::start`].
    ///
    /// # Errors
    ///
    /// Returns error if the host is empty or the HTTP client cannot be
    /// created.
    pub fn build(self) -> Result<Device<WebSocketConnector, HttpClient>, Error> {
        if self.config.host().is_empty() {
            return Err(ProtocolError::InvalidAddress("host is required".to_string()).into());
        }

        let source =
            HttpClient::with_timeout(self.config.base_url(), self.config.request_timeout())?;
        let connector = WebSocketConnector::new(self.config.ws_url());
        Ok(Device::with_transports(self.config, connector, source))
    }
}
