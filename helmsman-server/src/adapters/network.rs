//! Operator command socket server.
//!
//! Accepts local stream connections from operator clients. Each request is
//! one JSON document of at most 4 KiB: either a `query` answered with a
//! snapshot of the navigation state, or a `cmd` routed to the core. Unknown
//! commands are acknowledged and ignored; an unknown request type or a
//! malformed document closes only that client's connection.

use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{UnixListener, UnixStream};
use tokio_graceful_shutdown::{SubsystemBuilder, SubsystemHandle};

use helmsman_core::traits::{
    NavigationController, PositionDataProvider, ShipDataProvider, WaypointDataProvider,
    WaypointsUpdater,
};
use helmsman_core::Waypoint;

use crate::config::NetworkConfig;
use crate::ipc::MAX_FRAME;

const RQ_TYPE_QUERY: &str = "query";
const RQ_TYPE_CMD: &str = "cmd";

const CMD_NAV_START: &str = "nav_start";
const CMD_NAV_STOP: &str = "nav_stop";
const CMD_NET_LOSS: &str = "net_loss";
const CMD_SET_WAYPOINTS: &str = "set_waypoints";
const CMD_ADD_WAYPOINT: &str = "add_waypoint";
const CMD_CLEAR_WAYPOINTS: &str = "clear_waypoints";
const CMD_SET_HOME_WAYPOINT: &str = "set_home_waypoint";

const STATUS_OK: &str = "ok";
const STATUS_FAILURE: &str = "failure";

#[derive(Debug, Deserialize)]
struct Request {
    #[serde(rename = "type")]
    rq_type: String,
    #[serde(default)]
    cmd: String,
    #[serde(default)]
    waypoints: Vec<WaypointMsg>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct WaypointMsg {
    latitude: f64,
    longitude: f64,
}

impl From<WaypointMsg> for Waypoint {
    fn from(msg: WaypointMsg) -> Self {
        Waypoint {
            latitude: msg.latitude,
            longitude: msg.longitude,
        }
    }
}

impl From<&Waypoint> for WaypointMsg {
    fn from(waypoint: &Waypoint) -> Self {
        WaypointMsg {
            latitude: waypoint.latitude,
            longitude: waypoint.longitude,
        }
    }
}

#[derive(Debug, Serialize)]
struct PositionDataMsg {
    num_satellites: i8,
    latitude: f64,
    longitude: f64,
    speed_knots: f64,
    speed_km: f64,
    /// Current bearing in degrees.
    angle: f64,
}

#[derive(Debug, Serialize)]
struct ShipDataMsg {
    speed: String,
    steering: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryResponse {
    position_data: PositionDataMsg,
    ship_data: ShipDataMsg,
    waypoints: Vec<WaypointMsg>,
    error: String,
}

#[derive(Debug, Serialize)]
struct CommandResponse {
    status: &'static str,
    error: String,
}

impl CommandResponse {
    fn ok() -> Self {
        Self {
            status: STATUS_OK,
            error: String::new(),
        }
    }

    fn failure(error: &str) -> Self {
        Self {
            status: STATUS_FAILURE,
            error: error.to_string(),
        }
    }
}

/// Routes decoded requests to the core's contracts. Cheap to clone into
/// per-client tasks.
#[derive(Clone)]
pub struct RequestHandler {
    ship_data: Arc<dyn ShipDataProvider>,
    position_data: Arc<dyn PositionDataProvider>,
    waypoint_data: Arc<dyn WaypointDataProvider>,
    nav: Arc<dyn NavigationController>,
    waypoints: Arc<dyn WaypointsUpdater>,
}

impl RequestHandler {
    pub fn new(
        ship_data: Arc<dyn ShipDataProvider>,
        position_data: Arc<dyn PositionDataProvider>,
        waypoint_data: Arc<dyn WaypointDataProvider>,
        nav: Arc<dyn NavigationController>,
        waypoints: Arc<dyn WaypointsUpdater>,
    ) -> Self {
        Self {
            ship_data,
            position_data,
            waypoint_data,
            nav,
            waypoints,
        }
    }

    async fn handle_request(&self, request: &Request) -> Result<Vec<u8>> {
        match request.rq_type.as_str() {
            RQ_TYPE_QUERY => {
                let response = self.handle_query();
                Ok(serde_json::to_vec(&response)?)
            }
            RQ_TYPE_CMD => {
                let response = self.handle_command(request).await;
                Ok(serde_json::to_vec(&response)?)
            }
            other => Err(anyhow!("invalid request type '{other}'")),
        }
    }

    fn handle_query(&self) -> QueryResponse {
        let (bearing, position) = self.position_data.position_data();
        let ship_data = self.ship_data.ship_data();
        let waypoints = self.waypoint_data.waypoints();

        QueryResponse {
            position_data: PositionDataMsg {
                num_satellites: position.num_satellites,
                latitude: position.latitude,
                longitude: position.longitude,
                speed_knots: position.speed_knots,
                speed_km: position.speed_km,
                angle: bearing.angle_deg(),
            },
            ship_data: ShipDataMsg {
                speed: ship_data.speed,
                steering: ship_data.steering,
            },
            waypoints: waypoints.iter().map(WaypointMsg::from).collect(),
            error: String::new(),
        }
    }

    async fn handle_command(&self, request: &Request) -> CommandResponse {
        match request.cmd.as_str() {
            CMD_NAV_START => self.nav.start_navigation().await,
            CMD_NAV_STOP => self.nav.stop_navigation().await,
            CMD_NET_LOSS => self.nav.network_lost().await,
            CMD_SET_WAYPOINTS => {
                if request.waypoints.is_empty() {
                    return CommandResponse::failure("no waypoints provided");
                }
                let waypoints = request.waypoints.iter().map(|&w| w.into()).collect();
                self.waypoints.set_waypoints(waypoints).await;
            }
            CMD_ADD_WAYPOINT => {
                let Some(&first) = request.waypoints.first() else {
                    return CommandResponse::failure("waypoint is not provided");
                };
                self.waypoints.add_waypoint(first.into()).await;
            }
            CMD_CLEAR_WAYPOINTS => self.waypoints.clear_waypoints().await,
            CMD_SET_HOME_WAYPOINT => {
                let Some(&first) = request.waypoints.first() else {
                    return CommandResponse::failure("waypoint is not provided");
                };
                self.waypoints.set_home_waypoint(first.into()).await;
            }
            // lenient by design: acknowledged, not acted upon
            other => log::debug!("ignoring unknown command '{other}'"),
        }

        CommandResponse::ok()
    }
}

pub struct NetworkAdapter {
    socket_name: PathBuf,
    handler: RequestHandler,
}

impl NetworkAdapter {
    pub fn new(config: &NetworkConfig, handler: RequestHandler) -> Self {
        Self {
            socket_name: config.socket_name.clone(),
            handler,
        }
    }

    /// Listen and serve until shutdown.
    ///
    /// Returns an error when the listener cannot be set up or dies; the
    /// application supervisor relaunches the adapter in that case.
    pub async fn serve(&self, subsys: &SubsystemHandle) -> Result<()> {
        // a socket file left behind by a crashed predecessor
        if self.socket_name.exists() {
            std::fs::remove_file(&self.socket_name).ok();
        }

        let listener = UnixListener::bind(&self.socket_name).with_context(|| {
            format!(
                "failed to open socket {} for listening",
                self.socket_name.display()
            )
        })?;
        log::info!("listening for operators on {}", self.socket_name.display());

        let next_client_id = AtomicU64::new(1);
        loop {
            tokio::select! {
                accepted = listener.accept() => {
                    let (stream, _addr) = accepted.context("failed to accept connection")?;
                    let client_id = next_client_id.fetch_add(1, Ordering::Relaxed);
                    let handler = self.handler.clone();
                    subsys.start(SubsystemBuilder::new(
                        format!("operator-client-{client_id}"),
                        move |s: SubsystemHandle| async move {
                            tokio::select! {
                                _ = handle_client(handler, stream, client_id) => {}
                                _ = s.on_shutdown_requested() => {}
                            }
                            Ok::<(), anyhow::Error>(())
                        },
                    ));
                }
                _ = subsys.on_shutdown_requested() => {
                    log::info!("operator adapter stopping");
                    drop(listener);
                    std::fs::remove_file(&self.socket_name).ok();
                    return Ok(());
                }
            }
        }
    }
}

async fn handle_client(handler: RequestHandler, mut stream: UnixStream, client_id: u64) {
    log::info!("operator client {client_id} connected");

    let mut buf = vec![0u8; MAX_FRAME];
    loop {
        let n = match stream.read(&mut buf).await {
            Ok(0) => {
                log::info!("operator client {client_id} disconnected");
                return;
            }
            Ok(n) => n,
            Err(err) => {
                log::error!("error reading from operator client {client_id}: {err}");
                return;
            }
        };

        let request: Request = match serde_json::from_slice(&buf[..n]) {
            Ok(request) => request,
            Err(err) => {
                log::error!("malformed request from operator client {client_id}: {err}");
                return;
            }
        };

        let response = match handler.handle_request(&request).await {
            Ok(response) => response,
            Err(err) => {
                log::error!("failed to process request from operator client {client_id}: {err}");
                return;
            }
        };

        if let Err(err) = stream.write_all(&response).await {
            log::error!("failed to respond to operator client {client_id}: {err}");
            return;
        }
    }
}
