// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! HTTP polling client.

use std::time::Duration;

use reqwest::Client;

use crate::error::ProtocolError;
use crate::protocol::StateSource;

/// HTTP client for the device's `/api/info` endpoint.
///
/// # Examples
///
/// ```no_run
/// use obegraensad_lib::protocol::{HttpClient, StateSource};
///
/// # async fn example() -> obegraensad_lib::Result<()> {
/// let client = HttpClient::new("192.168.5.60")?;
/// let body = client.fetch().await?;
/// println!("{body}");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct HttpClient {
    base_url: String,
    client: Client,
    timeout: Duration,
}

impl HttpClient {
    /// Default request timeout.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

    /// Creates a client for the specified host.
    ///
    /// `host` may be a bare address (`192.168.5.60`, `matrix.local:8080`)
    /// or a full `http://` base URL.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be created.
    pub fn new(host: impl Into<String>) -> Result<Self, ProtocolError> {
        Self::with_timeout(host, Self::DEFAULT_TIMEOUT)
    }

    /// Creates a client with a custom request timeout.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be created.
    pub fn with_timeout(host: impl Into<String>, timeout: Duration) -> Result<Self, ProtocolError> {
        let host = host.into();
        if host.is_empty() {
            return Err(ProtocolError::InvalidAddress(
                "host is required".to_string(),
            ));
        }

        let base_url = if host.starts_with("http://") || host.starts_with("https://") {
            host.trim_end_matches('/').to_string()
        } else {
            format!("http://{host}")
        };

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(ProtocolError::Http)?;

        Ok(Self {
            base_url,
            client,
            timeout,
        })
    }

    /// Returns the base URL of the device.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns the URL of the state endpoint.
    #[must_use]
    pub fn info_url(&self) -> String {
        format!("{}/api/info", self.base_url)
    }

    fn map_error(&self, error: reqwest::Error) -> ProtocolError {
        if error.is_timeout() {
            ProtocolError::timeout(self.timeout)
        } else {
            ProtocolError::Http(error)
        }
    }
}

impl StateSource for HttpClient {
    async fn fetch(&self) -> Result<String, ProtocolError> {
        let url = self.info_url();

        tracing::debug!(url = %url, "Polling device state");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| self.map_error(e))?;

        if !response.status().is_success() {
            return Err(ProtocolError::ConnectionFailed(format!(
                "HTTP {} - {}",
                response.status().as_u16(),
                response.status().canonical_reason().unwrap_or("Unknown")
            )));
        }

        let body = response.text().await.map_err(|e| self.map_error(e))?;

        tracing::debug!(body = %body, "Received device state");

        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_host_gets_http_scheme() {
        let client = HttpClient::new("192.168.5.60").unwrap();
        assert_eq!(client.base_url(), "http://192.168.5.60");
        assert_eq!(client.info_url(), "http://192.168.5.60/api/info");
    }

    #[test]
    fn host_with_port() {
        let client = HttpClient::new("matrix.local:8080").unwrap();
        assert_eq!(client.info_url(), "http://matrix.local:8080/api/info");
    }

    #[test]
    fn full_url_is_kept() {
        let client = HttpClient::new("http://127.0.0.1:4000/").unwrap();
        assert_eq!(client.base_url(), "http://127.0.0.1:4000");
    }

    #[test]
    fn empty_host_is_rejected() {
        assert!(matches!(
            HttpClient::new(""),
            Err(ProtocolError::InvalidAddress(_))
        ));
    }

    #[test]
    fn custom_timeout() {
        let client = HttpClient::with_timeout("10.0.0.2", Duration::from_secs(2)).unwrap();
        assert_eq!(client.timeout, Duration::from_secs(2));
    }
}
