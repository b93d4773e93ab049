//! Ship actuator adapter.
//!
//! Talks to the propulsion/steering controller over its local socket: polls
//! telemetry on the configured cadence and forwards it to the core, and
//! drains the setpoint queue the dispatcher writes through [`ShipControl`].

use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tokio::net::UnixStream;
use tokio::sync::mpsc;
use tokio::time;
use tokio_graceful_shutdown::SubsystemHandle;

use helmsman_core::traits::{ShipControl, ShipDataUpdater};
use helmsman_core::ShipData;

use crate::config::ShipConfig;
use crate::ipc;

/// Pending setpoints tolerated while the adapter catches up. The dispatcher
/// never blocks on this queue; overflow drops the command.
const COMMAND_BUF_SIZE: usize = 16;

const CMD_SET_SPEED: &str = "set_speed";
const CMD_SET_STEERING: &str = "set_steering";

#[derive(Debug, Serialize)]
struct QueryRequest {
    #[serde(rename = "type")]
    rq_type: &'static str,
}

#[derive(Debug, Serialize)]
struct CommandRequest<'a> {
    #[serde(rename = "type")]
    rq_type: &'static str,
    cmd: &'a str,
    data: &'a str,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    speed: String,
    steering: String,
}

#[derive(Debug, Deserialize)]
struct CommandResponse {
    status: String,
    #[serde(default)]
    error: String,
}

/// A setpoint on its way to the actuator.
#[derive(Debug, PartialEq)]
pub enum ShipCommand {
    Speed(String),
    Steering(String),
}

/// The dispatcher's side of the setpoint queue.
#[derive(Clone)]
pub struct ShipControlHandle {
    tx: mpsc::Sender<ShipCommand>,
}

impl ShipControlHandle {
    fn push(&self, command: ShipCommand) {
        if let Err(err) = self.tx.try_send(command) {
            log::warn!("ship command queue full, dropping command: {err}");
        }
    }
}

impl ShipControl for ShipControlHandle {
    fn set_speed(&self, speed: &str) {
        self.push(ShipCommand::Speed(speed.to_string()));
    }

    fn set_steering(&self, steering: &str) {
        self.push(ShipCommand::Steering(steering.to_string()));
    }
}

/// Create the setpoint queue ahead of the adapter itself, so the core can be
/// wired up before the adapter task exists.
pub fn command_channel() -> (ShipControlHandle, mpsc::Receiver<ShipCommand>) {
    let (tx, rx) = mpsc::channel(COMMAND_BUF_SIZE);
    (ShipControlHandle { tx }, rx)
}

pub struct ShipAdapter {
    socket_name: PathBuf,
    polling_interval: Duration,
    commands: mpsc::Receiver<ShipCommand>,
    updater: Arc<dyn ShipDataUpdater>,
}

impl ShipAdapter {
    pub fn new(
        config: &ShipConfig,
        commands: mpsc::Receiver<ShipCommand>,
        updater: Arc<dyn ShipDataUpdater>,
    ) -> Self {
        Self {
            socket_name: config.socket_name.clone(),
            polling_interval: Duration::from_millis(config.polling_interval),
            commands,
            updater,
        }
    }

    /// Connect and serve until shutdown. A failed dial ends the adapter;
    /// the core keeps running without telemetry.
    pub async fn run(self, subsys: SubsystemHandle) -> Result<()> {
        let Self {
            socket_name,
            polling_interval,
            mut commands,
            updater,
        } = self;

        let mut stream = match UnixStream::connect(&socket_name).await {
            Ok(stream) => stream,
            Err(err) => {
                log::error!(
                    "failed to connect to ship controller at {}: {err}",
                    socket_name.display()
                );
                return Ok(());
            }
        };
        log::info!("connected to ship controller at {}", socket_name.display());

        let mut tick = time::interval(polling_interval);
        loop {
            tokio::select! {
                _ = tick.tick() => {
                    match query(&mut stream).await {
                        Ok(ship_data) => updater.update_ship_data(ship_data).await,
                        Err(err) => log::error!("ship telemetry query failed: {err:#}"),
                    }
                }
                Some(cmd) = commands.recv() => {
                    let (name, value) = match &cmd {
                        ShipCommand::Speed(value) => (CMD_SET_SPEED, value),
                        ShipCommand::Steering(value) => (CMD_SET_STEERING, value),
                    };
                    match command(&mut stream, name, value).await {
                        Ok(response) if response.status != "ok" => {
                            log::error!("{name} {value} rejected: {}", response.error);
                        }
                        Ok(_) => {}
                        Err(err) => log::error!("{name} {value} failed: {err:#}"),
                    }
                }
                _ = subsys.on_shutdown_requested() => {
                    log::info!("ship adapter stopping");
                    return Ok(());
                }
            }
        }
    }
}

async fn query(stream: &mut UnixStream) -> Result<ShipData> {
    let request = serde_json::to_vec(&QueryRequest { rq_type: "query" })?;
    let payload = ipc::roundtrip(stream, &request).await?;
    let response: QueryResponse =
        serde_json::from_slice(&payload).context("malformed telemetry response")?;

    Ok(ShipData {
        speed: response.speed,
        steering: response.steering,
    })
}

async fn command(stream: &mut UnixStream, cmd: &str, data: &str) -> Result<CommandResponse> {
    let request = serde_json::to_vec(&CommandRequest {
        rq_type: "cmd",
        cmd,
        data,
    })?;
    let payload = ipc::roundtrip(stream, &request).await?;
    serde_json::from_slice(&payload).map_err(|err| anyhow!("malformed command response: {err}"))
}
