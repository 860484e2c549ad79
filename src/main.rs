// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `fcsp-monitor` - report state changes of an FCSP charging station.
//!
//! Reports go to stdout; diagnostics go to stderr and are filtered with
//! `RUST_LOG` (default `warn`).

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use clap::error::ErrorKind;
use fcsp_monitor::{Error, HttpConfig, MonitorConfig, StateMonitor};

#[derive(Debug, Parser)]
#[command(name = "fcsp-monitor", version, about = "FCSP State Monitor", long_about = None)]
struct Cli {
    /// Polling interval in seconds
    #[arg(short, long, default_value_t = 30, value_parser = clap::value_parser!(u64).range(1..))]
    interval: u64,

    /// Path to configuration file (reserved, not read)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Device hostname or IP address
    #[arg(long, env = "FCSP_HOST")]
    host: String,

    /// Device port (defaults to 80, or 443 with --https)
    #[arg(long)]
    port: Option<u16>,

    /// Connect over HTTPS
    #[arg(long)]
    https: bool,

    /// Accept self-signed TLS certificates
    #[arg(long)]
    insecure: bool,

    /// Username for HTTP basic authentication
    #[arg(long, env = "FCSP_USERNAME")]
    username: Option<String>,

    /// Password for HTTP basic authentication
    #[arg(long, env = "FCSP_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// Request timeout in seconds
    #[arg(long, default_value_t = 10, value_parser = clap::value_parser!(u64).range(1..))]
    timeout: u64,
}

impl Cli {
    fn http_config(&self) -> HttpConfig {
        let mut config = HttpConfig::new(&self.host)
            .with_timeout(Duration::from_secs(self.timeout));

        if let Some(port) = self.port {
            config = config.with_port(port);
        }
        if self.https {
            config = config.with_https();
        }
        if self.insecure {
            config = config.with_invalid_certs_accepted();
        }
        if let Some(username) = &self.username {
            config = config.with_credentials(username, self.password.clone().unwrap_or_default());
        }

        config
    }

    fn monitor_config(&self) -> MonitorConfig {
        MonitorConfig::from_secs(self.interval)
    }
}

fn init_tracing() {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_writer(io::stderr))
        .init();
}

/// Writes the startup failure notice, ignoring a closed output.
fn report_failure(out: &mut impl Write, e: &Error) {
    tracing::debug!(error = %e, "Monitor failed to start");
    let _ = writeln!(out, "❌ Failed to start monitor: {e}");
}

async fn run(cli: Cli) -> fcsp_monitor::Result<()> {
    if let Some(path) = &cli.config {
        tracing::warn!(path = %path.display(), "Configuration files are not read, ignoring");
    }

    let device = cli.http_config().into_device()?;
    tracing::info!(base_url = %device.base_url(), "Monitoring device");

    let mut monitor = StateMonitor::initialize(device, cli.monitor_config(), io::stdout())?;
    monitor.run().await
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    init_tracing();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            e.exit()
        }
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        // Already reported by the monitor.
        Err(Error::InitialFetch) => ExitCode::FAILURE,
        Err(e) => {
            report_failure(&mut io::stdout(), &e);
            ExitCode::FAILURE
        }
    }
}
