// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the monitor.
//!
//! Failures are split by where they happen: configuration validation,
//! communication with the device, decoding its responses, and the
//! monitor's own lifecycle (signal registration, console output).

use std::time::Duration;

use thiserror::Error;

/// The main error type for this crate.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid configuration was supplied.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Communication with the device failed.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// A device response could not be decoded.
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// The state could not be read before the loop started.
    #[error("failed to get initial state")]
    InitialFetch,

    /// Registering the shutdown signal handlers failed.
    #[error("failed to register signal handler: {0}")]
    Signal(#[source] std::io::Error),

    /// Writing a report to the console failed.
    #[error("failed to write report: {0}")]
    Output(#[source] std::io::Error),
}

/// Errors raised while validating configuration values.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The poll interval must be strictly positive.
    #[error("poll interval must be greater than zero, got {0:?}")]
    InvalidInterval(Duration),

    /// The request timeout must be strictly positive.
    #[error("request timeout must be greater than zero, got {0:?}")]
    InvalidTimeout(Duration),

    /// No device address was given.
    #[error("device host is required")]
    MissingHost,
}

/// Errors related to HTTP communication with the device.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// HTTP request failed (connection, timeout, TLS).
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The device answered with a non-success status.
    #[error("HTTP {code} - {reason}")]
    Status {
        /// Numeric status code.
        code: u16,
        /// Canonical reason phrase.
        reason: String,
    },

    /// The device rejected the credentials.
    #[error("authentication failed")]
    AuthenticationFailed,

    /// Invalid URL or address.
    #[error("invalid address: {0}")]
    InvalidAddress(String),
}

/// Errors related to decoding device responses.
#[derive(Debug, Error)]
pub enum ParseError {
    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// Expected field is missing from the response.
    #[error("missing field in response: {0}")]
    MissingField(String),
}

/// A specialized Result type for this crate.
pub type Result<T> = std::result::Result<T, Error>;
