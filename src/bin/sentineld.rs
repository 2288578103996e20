//! Desktop/Linux alarm daemon.
//!
//! Reads a PIR sensor through sysfs, logs the status line, reports state
//! changes to the configured datastore, and serves the disarm endpoint.
//!
//! # Usage
//!
//! ```sh
//! CODE=2468 SERVER=https://datastore.example/alarm AUTH_TOKEN=secret \
//!     MOTION_SENSOR_PATH=/sys/class/gpio/gpio4/value \
//!     cargo run --bin sentineld
//! ```
//!
//! Logging is controlled with `RUST_LOG` (default `info`).
//!
//! # Exit Status
//!
//! - `0`: clean shutdown on Ctrl+C
//! - `1`: invalid configuration or runtime failure (sensor fault, server error)
//! - `2`: hardware could not be initialized

use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::sync::oneshot;
use tokio::task::JoinError;
use tracing_subscriber::{fmt, EnvFilter};

use rs_sentinel::hal::{ConsoleDisplay, MonotonicClock, SysfsMotionSensor, SysfsReadError};
use rs_sentinel::services::{run_server_with_state, HttpNotifier, WebServerConfig};
use rs_sentinel::{
    AlarmDisplay, AlarmStateMachine, Clock, Config, HardwareInitError, Poller, SharedAlarmState,
    HARDWARE_INIT_EXIT_CODE,
};

fn main() -> ExitCode {
    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "invalid configuration");
            return ExitCode::FAILURE;
        }
    };

    let (sensor, display) = match init_hardware(&config) {
        Ok(hardware) => hardware,
        Err(e) => {
            tracing::error!(error = %e, "hardware initialization failed");
            return ExitCode::from(HARDWARE_INIT_EXIT_CODE);
        }
    };

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(e) => {
            tracing::error!(error = %e, "failed to start async runtime");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run(config, sensor, display)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = ?e, "sentineld stopped");
            ExitCode::FAILURE
        }
    }
}

fn init_hardware(config: &Config) -> Result<(SysfsMotionSensor, ConsoleDisplay), HardwareInitError> {
    // sysfs GPIO is Linux only
    if !cfg!(target_os = "linux") {
        return Err(HardwareInitError::UnsupportedPlatform);
    }
    let sensor = SysfsMotionSensor::open(config.sensor.path.as_str(), config.sensor.active_low)?;

    let mut display = ConsoleDisplay::new();
    display.init().map_err(HardwareInitError::display)?;

    Ok((sensor, display))
}

enum Exit {
    Signal,
    PollerStopped(PollerJoin),
    ServerStopped(ServerJoin),
}

type PollerJoin = Result<std::thread::Result<Result<(), SysfsReadError>>, JoinError>;
type ServerJoin = Result<std::io::Result<()>, JoinError>;

async fn run(config: Config, sensor: SysfsMotionSensor, display: ConsoleDisplay) -> anyhow::Result<()> {
    let notifier = HttpNotifier::spawn(&config.notify).context("building notification client")?;

    let clock = MonotonicClock::new();
    let machine = AlarmStateMachine::with_timing(config.alarm.timing(), clock.now_ms());
    let state = Arc::new(SharedAlarmState::new(machine, clock, notifier));

    // Poller on its own thread
    let stop = Arc::new(AtomicBool::new(false));
    let poller = Poller::new(Arc::clone(&state), sensor, display)
        .with_interval(Duration::from_millis(config.alarm.poll_interval_ms.into()))
        .spawn(Arc::clone(&stop))
        .context("spawning poller thread")?;
    let mut poller = tokio::task::spawn_blocking(move || poller.join());

    // Web server, stopped through `shutdown_tx`
    let web_config = WebServerConfig::from_config(&config);
    tracing::info!(url = %format!("http://{}", web_config.addr), "status page");
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
    let mut server = tokio::spawn(run_server_with_state(state, web_config, async move {
        let _ = shutdown_rx.await;
    }));

    let exit = tokio::select! {
        _ = tokio::signal::ctrl_c() => Exit::Signal,
        joined = &mut poller => Exit::PollerStopped(joined),
        served = &mut server => Exit::ServerStopped(served),
    };

    match exit {
        Exit::Signal => {
            tracing::info!("shutdown requested");
            stop.store(true, Ordering::SeqCst);
            let _ = shutdown_tx.send(());

            server_outcome(server.await)?;
            poller_outcome(poller.await)
        }
        Exit::PollerStopped(joined) => {
            let _ = shutdown_tx.send(());
            let _ = server.await;
            poller_outcome(joined)?;
            anyhow::bail!("poller stopped unexpectedly")
        }
        Exit::ServerStopped(served) => {
            stop.store(true, Ordering::SeqCst);
            let _ = poller.await;
            server_outcome(served)?;
            anyhow::bail!("web server stopped unexpectedly")
        }
    }
}

fn poller_outcome(joined: PollerJoin) -> anyhow::Result<()> {
    match joined.context("poller task")? {
        Ok(result) => result.context("motion sensor failed"),
        Err(_) => anyhow::bail!("poller thread panicked"),
    }
}

fn server_outcome(served: ServerJoin) -> anyhow::Result<()> {
    served.context("web server task")?.context("web server")
}
