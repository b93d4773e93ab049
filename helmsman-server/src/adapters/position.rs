//! GPS/magnetometer sensor adapter.
//!
//! Polls the positioning peripheral on the configured cadence: a GPS fix
//! first, then a magnetometer reading turned into a bearing. A magnetometer
//! failure is logged and only skips the bearing; the GPS fix still reaches
//! the core. Calibration requests suspend polling until calibration stops.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tokio::net::UnixStream;
use tokio::sync::mpsc;
use tokio::time;
use tokio_graceful_shutdown::SubsystemHandle;

use helmsman_core::traits::{BearingUpdater, PositionCalibrator, PositionUpdater};
use helmsman_core::{Bearing, Position};

use crate::config::PositionConfig;
use crate::ipc;

const CMD_GET_GPS: &str = "GetGPSData";
const CMD_GET_MAGNETOMETER: &str = "GetMagnetometerData";
const CMD_START_CALIBRATION: &str = "StartCalibration";
const CMD_STOP_CALIBRATION: &str = "StopCalibration";

#[derive(Debug, Serialize)]
struct SensorRequest<'a> {
    cmd: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GpsResponse {
    num_satellites: i32,
    latitude: f64,
    longitude: f64,
    speed_knots: f64,
    speed_km: f64,
}

/// The peripheral also reports a vertical component; only the plane
/// components feed the bearing.
#[derive(Debug, Deserialize)]
struct MagnetometerResponse {
    x: i32,
    y: i32,
}

#[derive(Debug, Deserialize)]
struct CalibrationResponse {
    success: bool,
}

/// The peripheral answers any request it cannot serve with this envelope.
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error_message: String,
}

/// Calibration control offered to whoever manages sensor alignment.
#[derive(Clone)]
pub struct CalibrationHandle {
    tx: mpsc::Sender<bool>,
}

#[async_trait]
impl PositionCalibrator for CalibrationHandle {
    async fn start_calibration(&self) {
        let _ = self.tx.send(true).await;
    }

    async fn stop_calibration(&self) {
        let _ = self.tx.send(false).await;
    }
}

pub struct PositionAdapter {
    socket_name: PathBuf,
    polling_interval: Duration,
    declination: f64,
    position_updater: Arc<dyn PositionUpdater>,
    bearing_updater: Arc<dyn BearingUpdater>,
    calibration_rx: mpsc::Receiver<bool>,
}

impl PositionAdapter {
    pub fn new(
        config: &PositionConfig,
        declination: f64,
        position_updater: Arc<dyn PositionUpdater>,
        bearing_updater: Arc<dyn BearingUpdater>,
    ) -> (Self, CalibrationHandle) {
        let (tx, calibration_rx) = mpsc::channel(1);
        (
            Self {
                socket_name: config.socket_name.clone(),
                polling_interval: Duration::from_millis(config.polling_interval),
                declination,
                position_updater,
                bearing_updater,
                calibration_rx,
            },
            CalibrationHandle { tx },
        )
    }

    /// Connect and poll until shutdown. A failed dial ends the adapter;
    /// the core keeps running on its last known position.
    pub async fn run(self, subsys: SubsystemHandle) -> Result<()> {
        let Self {
            socket_name,
            polling_interval,
            declination,
            position_updater,
            bearing_updater,
            mut calibration_rx,
        } = self;

        let mut stream = match UnixStream::connect(&socket_name).await {
            Ok(stream) => stream,
            Err(err) => {
                log::error!(
                    "failed to connect to position sensor at {}: {err}",
                    socket_name.display()
                );
                return Ok(());
            }
        };
        log::info!("connected to position sensor at {}", socket_name.display());

        let mut tick = time::interval(polling_interval);
        let mut calibrating = false;
        loop {
            tokio::select! {
                _ = tick.tick() => {
                    if calibrating {
                        continue;
                    }

                    match gps_request(&mut stream).await {
                        Ok(position) => position_updater.update_position(position).await,
                        Err(err) => {
                            log::error!("gps query failed: {err:#}");
                            continue;
                        }
                    }

                    match magnetometer_request(&mut stream).await {
                        Ok((x, y)) => {
                            let mut bearing = Bearing::new(declination);
                            bearing.set_from_components(f64::from(x), f64::from(y));
                            bearing_updater.update_bearing(bearing).await;
                        }
                        // the position update above still went through
                        Err(err) => log::error!("magnetometer query failed: {err:#}"),
                    }
                }
                Some(start) = calibration_rx.recv() => {
                    calibrating = start;
                    log::info!(
                        "{} calibration",
                        if calibrating { "starting" } else { "stopping" }
                    );
                    match calibration_request(&mut stream, calibrating).await {
                        Ok(response) if !response.success => {
                            log::error!("sensor refused to change calibration state");
                        }
                        Ok(_) => {}
                        Err(err) => log::error!("calibration request failed: {err:#}"),
                    }
                }
                _ = subsys.on_shutdown_requested() => {
                    log::info!("position adapter stopping");
                    return Ok(());
                }
            }
        }
    }
}

/// Decode a sensor response, falling back to the error envelope.
fn decode<T: DeserializeOwned>(payload: &[u8]) -> Result<T> {
    match serde_json::from_slice(payload) {
        Ok(response) => Ok(response),
        Err(err) => match serde_json::from_slice::<ErrorResponse>(payload) {
            Ok(error) => Err(anyhow!("sensor error: {}", error.error_message)),
            Err(_) => Err(anyhow!("malformed sensor response: {err}")),
        },
    }
}

async fn request<T: DeserializeOwned>(stream: &mut UnixStream, cmd: &str) -> Result<T> {
    let request = serde_json::to_vec(&SensorRequest { cmd })?;
    let payload = ipc::roundtrip(stream, &request).await?;
    decode(&payload)
}

async fn gps_request(stream: &mut UnixStream) -> Result<Position> {
    let response: GpsResponse = request(stream, CMD_GET_GPS).await?;
    Ok(Position {
        num_satellites: response.num_satellites as i8,
        latitude: response.latitude,
        longitude: response.longitude,
        speed_knots: response.speed_knots,
        speed_km: response.speed_km,
    })
}

async fn magnetometer_request(stream: &mut UnixStream) -> Result<(i32, i32)> {
    let response: MagnetometerResponse = request(stream, CMD_GET_MAGNETOMETER).await?;
    Ok((response.x, response.y))
}

async fn calibration_request(stream: &mut UnixStream, start: bool) -> Result<CalibrationResponse> {
    let cmd = if start {
        CMD_START_CALIBRATION
    } else {
        CMD_STOP_CALIBRATION
    };
    request(stream, cmd).await
}
