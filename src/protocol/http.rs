// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! HTTP access to the device's local REST API.

use std::time::Duration;

use reqwest::Client;

use crate::error::{ConfigError, Error, ProtocolError};
use crate::protocol::{ChargerInfo, DeviceClient, DeviceSession, InverterInfo};

/// Path of the charger status endpoint.
pub const CHARGER_INFO_PATH: &str = "/api/v1/chargerinfo";
/// Path of the inverter status endpoint.
pub const INVERTER_INFO_PATH: &str = "/api/v1/inverterinfo";

// ============================================================================
// HttpConfig - Connection parameters
// ============================================================================

/// Configuration for an HTTP connection to the device.
///
/// # Examples
///
/// ```
/// use fcsp_monitor::protocol::HttpConfig;
/// use std::time::Duration;
///
/// let config = HttpConfig::new("192.168.1.197")
///     .with_https()
///     .with_invalid_certs_accepted()
///     .with_timeout(Duration::from_secs(5));
///
/// assert_eq!(config.base_url(), "https://192.168.1.197");
/// ```
#[derive(Debug, Clone)]
pub struct HttpConfig {
    host: String,
    port: u16,
    use_https: bool,
    accept_invalid_certs: bool,
    credentials: Option<(String, String)>,
    timeout: Duration,
}

impl HttpConfig {
    /// Default HTTP port.
    pub const DEFAULT_PORT: u16 = 80;
    /// Default HTTPS port.
    pub const DEFAULT_HTTPS_PORT: u16 = 443;
    /// Default request timeout.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Creates a configuration for the specified host.
    ///
    /// `host` may also be a full `http://` or `https://` base URL, in which
    /// case port and scheme settings are ignored.
    #[must_use]
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: Self::DEFAULT_PORT,
            use_https: false,
            accept_invalid_certs: false,
            credentials: None,
            timeout: Self::DEFAULT_TIMEOUT,
        }
    }

    /// Sets a custom port.
    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Enables HTTPS.
    ///
    /// If port hasn't been explicitly set, it will be changed to 443.
    #[must_use]
    pub fn with_https(mut self) -> Self {
        self.use_https = true;
        if self.port == Self::DEFAULT_PORT {
            self.port = Self::DEFAULT_HTTPS_PORT;
        }
        self
    }

    /// Accepts self-signed or otherwise invalid TLS certificates.
    #[must_use]
    pub fn with_invalid_certs_accepted(mut self) -> Self {
        self.accept_invalid_certs = true;
        self
    }

    /// Sets HTTP basic authentication credentials.
    #[must_use]
    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.credentials = Some((username.into(), password.into()));
        self
    }

    /// Sets the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Returns the credentials if set.
    #[must_use]
    pub fn credentials(&self) -> Option<(&str, &str)> {
        self.credentials
            .as_ref()
            .map(|(u, p)| (u.as_str(), p.as_str()))
    }

    /// Returns the timeout.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Builds the base URL from this configuration.
    #[must_use]
    pub fn base_url(&self) -> String {
        if self.host.starts_with("http://") || self.host.starts_with("https://") {
            return self.host.trim_end_matches('/').to_string();
        }

        let (scheme, default_port) = if self.use_https {
            ("https", Self::DEFAULT_HTTPS_PORT)
        } else {
            ("http", Self::DEFAULT_PORT)
        };
        if self.port == default_port {
            format!("{scheme}://{}", self.host)
        } else {
            format!("{scheme}://{}:{}", self.host, self.port)
        }
    }

    /// Validates the configuration and creates an [`HttpDevice`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingHost`] for an empty host and
    /// [`ConfigError::InvalidTimeout`] for a zero timeout.
    pub fn into_device(self) -> Result<HttpDevice, Error> {
        if self.host.trim().is_empty() {
            return Err(ConfigError::MissingHost.into());
        }
        if self.timeout.is_zero() {
            return Err(ConfigError::InvalidTimeout(self.timeout).into());
        }

        Ok(HttpDevice {
            base_url: self.base_url(),
            accept_invalid_certs: self.accept_invalid_certs,
            credentials: self.credentials,
            timeout: self.timeout,
        })
    }
}

// ============================================================================
// HttpDevice - DeviceClient over HTTP
// ============================================================================

/// Device client talking to the charger's REST API.
///
/// Every [`connect`](DeviceClient::connect) builds a fresh HTTP client that
/// keeps no idle connections, so closing the session leaves no socket open
/// between polls.
#[derive(Debug, Clone)]
pub struct HttpDevice {
    base_url: String,
    accept_invalid_certs: bool,
    credentials: Option<(String, String)>,
    timeout: Duration,
}

impl HttpDevice {
    /// Returns the base URL of the device.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl DeviceClient for HttpDevice {
    type Session = HttpSession;

    async fn connect(&self) -> Result<HttpSession, Error> {
        let client = Client::builder()
            .timeout(self.timeout)
            .pool_max_idle_per_host(0)
            .danger_accept_invalid_certs(self.accept_invalid_certs)
            .build()
            .map_err(ProtocolError::Http)?;

        tracing::debug!(base_url = %self.base_url, "Opened device session");

        Ok(HttpSession {
            base_url: self.base_url.clone(),
            client,
            credentials: self.credentials.clone(),
        })
    }
}

/// One open session against the device REST API.
#[derive(Debug)]
pub struct HttpSession {
    base_url: String,
    client: Client,
    credentials: Option<(String, String)>,
}

impl HttpSession {
    async fn get(&self, path: &str) -> Result<String, ProtocolError> {
        let url = format!("{}{path}", self.base_url);

        tracing::debug!(url = %url, "Sending HTTP request");

        let mut request = self.client.get(&url);
        if let Some((username, password)) = &self.credentials {
            request = request.basic_auth(username, Some(password));
        }

        let response = request.send().await?;

        if response.status() == reqwest::StatusCode::UNAUTHORIZED {
            return Err(ProtocolError::AuthenticationFailed);
        }

        if !response.status().is_success() {
            return Err(ProtocolError::Status {
                code: response.status().as_u16(),
                reason: response
                    .status()
                    .canonical_reason()
                    .unwrap_or("Unknown")
                    .to_string(),
            });
        }

        let body = response.text().await?;

        tracing::debug!(body = %body, "Received HTTP response");

        Ok(body)
    }
}

impl DeviceSession for HttpSession {
    async fn charger_info(&mut self) -> Result<ChargerInfo, Error> {
        let body = self.get(CHARGER_INFO_PATH).await?;
        Ok(ChargerInfo::from_json(&body)?)
    }

    async fn inverter_info(&mut self) -> Result<Vec<InverterInfo>, Error> {
        let body = self.get(INVERTER_INFO_PATH).await?;
        Ok(InverterInfo::list_from_json(&body)?)
    }

    async fn close(self) {
        tracing::debug!(base_url = %self.base_url, "Closed device session");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_config_default_values() {
        let config = HttpConfig::new("192.168.1.197");
        assert_eq!(config.base_url(), "http://192.168.1.197");
        assert!(config.credentials().is_none());
        assert_eq!(config.timeout(), Duration::from_secs(10));
    }

    #[test]
    fn https_switches_default_port() {
        let config = HttpConfig::new("192.168.1.197").with_https();
        assert_eq!(config.base_url(), "https://192.168.1.197");
    }

    #[test]
    fn https_keeps_explicit_port() {
        let config = HttpConfig::new("192.168.1.197")
            .with_port(8443)
            .with_https();
        assert_eq!(config.base_url(), "https://192.168.1.197:8443");
    }

    #[test]
    fn http_on_port_443_is_explicit() {
        let config = HttpConfig::new("192.168.1.197").with_port(443);
        assert_eq!(config.base_url(), "http://192.168.1.197:443");
    }

    #[test]
    fn http_config_with_credentials() {
        let config = HttpConfig::new("192.168.1.197").with_credentials("admin", "secret");
        assert_eq!(config.credentials(), Some(("admin", "secret")));
    }

    #[test]
    fn http_config_base_url_http() {
        assert_eq!(
            HttpConfig::new("192.168.1.197").base_url(),
            "http://192.168.1.197"
        );
        assert_eq!(
            HttpConfig::new("192.168.1.197").with_port(8080).base_url(),
            "http://192.168.1.197:8080"
        );
    }

    #[test]
    fn http_config_full_url_host() {
        let config = HttpConfig::new("https://charger.local/").with_port(9000);
        assert_eq!(config.base_url(), "https://charger.local");
    }

    #[test]
    fn into_device_rejects_empty_host() {
        let err = HttpConfig::new("  ").into_device().unwrap_err();
        assert!(matches!(err, Error::Config(ConfigError::MissingHost)));
    }

    #[test]
    fn into_device_rejects_zero_timeout() {
        let err = HttpConfig::new("192.168.1.197")
            .with_timeout(Duration::ZERO)
            .into_device()
            .unwrap_err();
        assert!(matches!(err, Error::Config(ConfigError::InvalidTimeout(_))));
    }

    #[test]
    fn into_device_keeps_base_url() {
        let device = HttpConfig::new("192.168.1.197")
            .with_https()
            .into_device()
            .unwrap();
        assert_eq!(device.base_url(), "https://192.168.1.197");
    }
}
