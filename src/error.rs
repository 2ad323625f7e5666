// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the `obegraensad_lib` library.
//!
//! The hierarchy separates caller-attributable failures (invalid command
//! values, commands issued while disconnected) from transport and parsing
//! failures, which the synchronization core recovers from on its own.

use std::time::Duration;

use thiserror::Error;

/// The main error type for this library.
#[derive(Debug, Error)]
pub enum Error {
    /// A command or value failed validation. No I/O was attempted.
    #[error("value error: {0}")]
    Value(#[from] ValueError),

    /// Error occurred during protocol communication.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Error occurred while decoding a payload.
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// The push transport is not live, so the command was not sent.
    #[error("device is not connected")]
    NotConnected,

    /// `start()` was called on a device that is already running.
    #[error("device synchronization is already running")]
    AlreadyRunning,

    /// `stop()` was called on a device that is not running.
    #[error("device synchronization is not running")]
    NotRunning,
}

/// Errors related to value validation and constraints.
///
/// These errors occur when building commands or constrained types from
/// invalid input.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValueError {
    /// A numeric value is outside the allowed range.
    #[error("value {actual} is out of range [{min}, {max}]")]
    OutOfRange {
        /// Minimum allowed value.
        min: i64,
        /// Maximum allowed value.
        max: i64,
        /// The actual value that was provided.
        actual: i64,
    },

    /// The command name is not one the device understands.
    #[error("unknown command: {0}")]
    UnknownCommand(String),

    /// A rotation direction other than `left` or `right` was provided.
    #[error("invalid rotation direction: {0}")]
    InvalidDirection(String),

    /// A command parameter is missing or has the wrong type.
    #[error("invalid parameter for {command}: {message}")]
    InvalidParameter {
        /// The command being built.
        command: String,
        /// Description of the problem.
        message: String,
    },
}

/// Errors related to protocol communication (HTTP/WebSocket).
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// HTTP request failed.
    #[cfg(feature = "http")]
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// WebSocket handshake or frame I/O failed.
    #[cfg(feature = "websocket")]
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    /// Connection to the device failed.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// The remote end closed the push connection.
    #[error("connection closed by device")]
    ConnectionClosed,

    /// Request timed out.
    #[error("request timed out after {0} ms")]
    Timeout(u64),

    /// Invalid URL or address.
    #[error("invalid address: {0}")]
    InvalidAddress(String),
}

impl ProtocolError {
    /// Creates a [`Timeout`](Self::Timeout) error, saturating at `u64::MAX` ms.
    pub(crate) fn timeout(after: Duration) -> Self {
        Self::Timeout(u64::try_from(after.as_millis()).unwrap_or(u64::MAX))
    }
}

/// Errors related to decoding device payloads.
#[derive(Debug, Error)]
pub enum ParseError {
    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// The payload is valid JSON but not a state object.
    #[error("unexpected payload format: {0}")]
    UnexpectedFormat(String),
}

/// A specialized Result type for this library.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_error_display() {
        let err = ValueError::OutOfRange {
            min: 0,
            max: 255,
            actual: 300,
        };
        assert_eq!(err.to_string(), "value 300 is out of range [0, 255]");
    }

    #[test]
    fn error_from_value_error() {
        let value_err = ValueError::UnknownCommand("reboot".to_string());
        let err: Error = value_err.into();
        assert!(matches!(err, Error::Value(ValueError::UnknownCommand(_))));
    }

    #[test]
    fn parse_error_display() {
        let err = ParseError::UnexpectedFormat("expected object".to_string());
        assert_eq!(
            err.to_string(),
            "unexpected payload format: expected object"
        );
    }

    #[test]
    fn not_connected_display() {
        assert_eq!(Error::NotConnected.to_string(), "device is not connected");
    }

    #[test]
    fn protocol_error_timeout_display() {
        let err: Error = ProtocolError::Timeout(5000).into();
        assert_eq!(
            err.to_string(),
            "protocol error: request timed out after 5000 ms"
        );
    }

    #[test]
    fn timeout_from_duration_saturates() {
        assert!(matches!(
            ProtocolError::timeout(Duration::from_millis(1500)),
            ProtocolError::Timeout(1500)
        ));
        assert!(matches!(
            ProtocolError::timeout(Duration::MAX),
            ProtocolError::Timeout(u64::MAX)
        ));
    }
}
