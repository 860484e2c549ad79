// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Integration tests for the HTTP device client using wiremock.

use std::time::Duration;

use fcsp_monitor::monitor::read_snapshot;
use fcsp_monitor::protocol::{DeviceClient, DeviceSession, HttpConfig, HttpDevice};
use fcsp_monitor::{Error, MonitorConfig, ParseError, ProtocolError, Snapshot, StateMonitor};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mount_json(server: &MockServer, route: &str, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

fn device_for(server: &MockServer) -> HttpDevice {
    HttpConfig::new(server.uri()).into_device().unwrap()
}

// ============================================================================
// HttpSession
// ============================================================================

mod http_session {
    use super::*;

    #[tokio::test]
    async fn reads_charger_info() {
        let server = MockServer::start().await;
        mount_json(
            &server,
            "/api/v1/chargerinfo",
            serde_json::json!({
                "state": "CS02",
                "serial": "FCSP-0001",
                "firmware": "4.1.2"
            }),
        )
        .await;

        let mut session = device_for(&server).connect().await.unwrap();
        let info = session.charger_info().await.unwrap();
        session.close().await;

        assert_eq!(info.state(), "CS02");
    }

    #[tokio::test]
    async fn reads_inverter_info_in_order() {
        let server = MockServer::start().await;
        mount_json(
            &server,
            "/api/v1/inverterinfo",
            serde_json::json!([
                { "id": 1, "state": "ready" },
                { "id": 2, "state": "charging" }
            ]),
        )
        .await;

        let mut session = device_for(&server).connect().await.unwrap();
        let infos = session.inverter_info().await.unwrap();

        let states: Vec<&str> = infos.iter().map(|i| i.state().as_str()).collect();
        assert_eq!(states, ["ready", "charging"]);
    }

    #[tokio::test]
    async fn unauthorized_maps_to_authentication_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/chargerinfo"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let mut session = device_for(&server).connect().await.unwrap();
        let err = session.charger_info().await.unwrap_err();

        assert!(matches!(
            err,
            Error::Protocol(ProtocolError::AuthenticationFailed)
        ));
    }

    #[tokio::test]
    async fn server_error_maps_to_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/inverterinfo"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let mut session = device_for(&server).connect().await.unwrap();
        let err = session.inverter_info().await.unwrap_err();

        assert!(matches!(
            err,
            Error::Protocol(ProtocolError::Status { code: 500, .. })
        ));
        assert_eq!(
            err.to_string(),
            "protocol error: HTTP 500 - Internal Server Error"
        );
    }

    #[tokio::test]
    async fn malformed_body_maps_to_parse_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/chargerinfo"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>login</html>"))
            .mount(&server)
            .await;

        let mut session = device_for(&server).connect().await.unwrap();
        let err = session.charger_info().await.unwrap_err();

        assert!(matches!(err, Error::Parse(ParseError::Json(_))));
    }

    #[tokio::test]
    async fn sends_basic_auth_credentials() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/chargerinfo"))
            .and(header("authorization", "Basic YWRtaW46c2VjcmV0"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "state": "CS00" })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let device = HttpConfig::new(server.uri())
            .with_credentials("admin", "secret")
            .into_device()
            .unwrap();
        let mut session = device.connect().await.unwrap();

        assert_eq!(session.charger_info().await.unwrap().state(), "CS00");
    }

    #[tokio::test]
    async fn slow_device_hits_request_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/chargerinfo"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "state": "CS00" }))
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&server)
            .await;

        let device = HttpConfig::new(server.uri())
            .with_timeout(Duration::from_millis(200))
            .into_device()
            .unwrap();
        let mut session = device.connect().await.unwrap();
        let err = session.charger_info().await.unwrap_err();

        match err {
            Error::Protocol(ProtocolError::Http(e)) => assert!(e.is_timeout()),
            other => panic!("expected timeout, got {other:?}"),
        }
    }
}

// ============================================================================
// Snapshot reads
// ============================================================================

mod snapshot {
    use super::*;

    #[tokio::test]
    async fn read_snapshot_combines_both_endpoints() {
        let server = MockServer::start().await;
        mount_json(
            &server,
            "/api/v1/chargerinfo",
            serde_json::json!({ "state": "CS02" }),
        )
        .await;
        mount_json(
            &server,
            "/api/v1/inverterinfo",
            serde_json::json!([{ "state": "charging" }]),
        )
        .await;

        let snapshot = read_snapshot(&device_for(&server)).await.unwrap();

        assert_eq!(snapshot, Snapshot::new("CS02", &["charging"]));
    }

    #[tokio::test]
    async fn missing_inverter_state_fails_snapshot() {
        let server = MockServer::start().await;
        mount_json(
            &server,
            "/api/v1/chargerinfo",
            serde_json::json!({ "state": "CS02" }),
        )
        .await;
        mount_json(
            &server,
            "/api/v1/inverterinfo",
            serde_json::json!([{ "state": "charging" }, { "id": 2 }]),
        )
        .await;

        let err = read_snapshot(&device_for(&server)).await.unwrap_err();

        assert!(matches!(err, Error::Parse(ParseError::MissingField(_))));
    }

    #[tokio::test]
    async fn unreachable_device_fails_snapshot() {
        // Nothing listens on the discard port.
        let device = HttpConfig::new("127.0.0.1")
            .with_port(9)
            .with_timeout(Duration::from_secs(1))
            .into_device()
            .unwrap();

        let err = read_snapshot(&device).await.unwrap_err();

        assert!(matches!(err, Error::Protocol(ProtocolError::Http(_))));
    }
}

// ============================================================================
// Monitor over HTTP
// ============================================================================

mod monitor {
    use super::*;

    #[tokio::test]
    async fn initial_fetch_failure_over_http() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let mut monitor =
            StateMonitor::new(device_for(&server), MonitorConfig::from_secs(30), Vec::new())
                .unwrap();

        let err = monitor.run().await.unwrap_err();
        assert!(matches!(err, Error::InitialFetch));

        let output = String::from_utf8(monitor.into_output()).unwrap();
        assert!(output.contains("❌ Error getting state: protocol error: HTTP 503"));
        assert!(output.contains("❌ Failed to get initial state. Exiting."));
    }

    #[tokio::test]
    async fn poll_once_over_http_reports_change() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/chargerinfo"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "state": "CS00" })),
            )
            .up_to_n_times(1)
            .mount(&server)
            .await;
        mount_json(
            &server,
            "/api/v1/chargerinfo",
            serde_json::json!({ "state": "CS01" }),
        )
        .await;
        mount_json(&server, "/api/v1/inverterinfo", serde_json::json!([])).await;

        let mut monitor =
            StateMonitor::new(device_for(&server), MonitorConfig::from_secs(30), Vec::new())
                .unwrap();

        monitor.poll_once().await.unwrap();
        monitor.poll_once().await.unwrap();

        assert_eq!(monitor.previous(), Some(&Snapshot::new("CS01", &[])));
        let output = String::from_utf8(monitor.into_output()).unwrap();
        assert!(output.contains("🟢 CS00 (Available) → 🟡 CS01 (Connected (Not Charging))"));
    }
}
