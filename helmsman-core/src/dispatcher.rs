//! The core dispatcher: one event loop that owns all navigation state.
//!
//! Adapters push updates through bounded channels held by a [`CoreHandle`];
//! the [`Core`] drains them one at a time, mutates the shared snapshot and
//! feeds exactly one event per iteration into the state machine. All writes
//! happen on the dispatcher task; the operator-facing providers take short
//! read locks on the same snapshot.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::sync::mpsc;
use tokio::time::{self, Instant};

use crate::event::Event;
use crate::fsm::{Fsm, State, StateHandler};
use crate::model::{Bearing, Position, ShipData, Waypoint, WaypointPlan};
use crate::states::{
    IdleHandler, Label, MovingHandler, MovingHomeHandler, NavState, StoppingHandler,
    TurningHandler, TurningHomeHandler,
};
use crate::traits::{
    BearingUpdater, NavigationController, PositionDataProvider, PositionUpdater, ShipControl,
    ShipDataProvider, ShipDataUpdater, WaypointDataProvider, WaypointsUpdater,
};

const DEFAULT_UPDATE_BUF_SIZE: usize = 1024;

/// Cadence of the observability log line naming the current state.
const STATE_LOG_INTERVAL: Duration = Duration::from_secs(3);

/// Control-policy configuration consumed by the core.
///
/// Deserialized straight from the `coreConfig` section of the configuration
/// file. All fields are optional on the wire; a missing `updateBufSize`
/// (or zero) falls back to 1024.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// Added as-is to the radian magnetometer angle.
    pub declination: f64,
    pub update_buf_size: usize,
    pub turning_speed: String,
    pub turning_steering_left: String,
    pub turning_steering_right: String,
    pub approach_speed: String,
    pub full_speed: String,
    /// Meters; closer than this switches to the approach speed.
    pub approach_distance: f64,
    /// Meters; at or below this a waypoint counts as reached.
    pub distance_inaccuracy: f64,
}

/// All navigation state. Written only by the dispatcher task.
#[derive(Debug, Clone)]
pub struct CoreData {
    pub declination: f64,
    pub position: Position,
    pub home_waypoint: Option<Waypoint>,
    pub cur_bearing: Bearing,
    pub target_bearing: Bearing,
    pub ship_data: ShipData,
    pub waypoints: WaypointPlan,
    /// Name of the state the machine is currently in, mirrored here for
    /// snapshot readers.
    pub state: NavState,
}

impl CoreData {
    pub fn new(declination: f64) -> Self {
        Self {
            declination,
            position: Position::default(),
            home_waypoint: None,
            cur_bearing: Bearing::new(declination),
            target_bearing: Bearing::new(declination),
            ship_data: ShipData::default(),
            waypoints: WaypointPlan::new(),
            state: NavState::Idle,
        }
    }
}

pub type SharedData = Arc<RwLock<CoreData>>;

/// A tagged waypoint plan edit, applied on the dispatcher task.
enum WaypointCommand {
    Set(Vec<Waypoint>),
    Add(Waypoint),
    Clear,
}

/// The dispatcher. Built once, consumed by [`Core::run`].
pub struct Core {
    data: SharedData,
    fsm: Fsm<NavState, Event, Label>,
    position_rx: mpsc::Receiver<Position>,
    home_waypoint_rx: mpsc::Receiver<Waypoint>,
    bearing_rx: mpsc::Receiver<Bearing>,
    ship_data_rx: mpsc::Receiver<ShipData>,
    waypoints_rx: mpsc::Receiver<WaypointCommand>,
    nav_rx: mpsc::Receiver<bool>,
    net_loss_rx: mpsc::Receiver<bool>,
    stop_rx: mpsc::Receiver<()>,
}

/// Clonable sender bundle through which adapters talk to the dispatcher.
#[derive(Clone)]
pub struct CoreHandle {
    data: SharedData,
    position_tx: mpsc::Sender<Position>,
    home_waypoint_tx: mpsc::Sender<Waypoint>,
    bearing_tx: mpsc::Sender<Bearing>,
    ship_data_tx: mpsc::Sender<ShipData>,
    waypoints_tx: mpsc::Sender<WaypointCommand>,
    nav_tx: mpsc::Sender<bool>,
    net_loss_tx: mpsc::Sender<bool>,
    stop_tx: mpsc::Sender<()>,
}

impl Core {
    /// Build the dispatcher and its handle.
    ///
    /// The six states, their handlers and the transition tables declared
    /// here are the complete navigation behavior; the machine enters `idle`
    /// immediately.
    pub fn new(settings: &Settings, ship: Arc<dyn ShipControl>) -> (Self, CoreHandle) {
        let buf_size = if settings.update_buf_size == 0 {
            DEFAULT_UPDATE_BUF_SIZE
        } else {
            settings.update_buf_size
        };

        let data: SharedData = Arc::new(RwLock::new(CoreData::new(settings.declination)));

        let idle = IdleHandler::new(data.clone());
        let turning = TurningHandler::new(
            data.clone(),
            ship.clone(),
            settings.turning_speed.clone(),
            settings.turning_steering_left.clone(),
            settings.turning_steering_right.clone(),
        );
        let moving = MovingHandler::new(
            data.clone(),
            ship.clone(),
            settings.approach_speed.clone(),
            settings.full_speed.clone(),
            settings.approach_distance,
            settings.distance_inaccuracy,
        );
        let turning_home = TurningHomeHandler::new(
            data.clone(),
            ship.clone(),
            settings.turning_speed.clone(),
            settings.turning_steering_left.clone(),
            settings.turning_steering_right.clone(),
        );
        let moving_home = MovingHomeHandler::new(
            data.clone(),
            ship.clone(),
            settings.approach_speed.clone(),
            settings.full_speed.clone(),
            settings.approach_distance,
            settings.distance_inaccuracy,
        );
        let stopping = StoppingHandler::new(data.clone(), ship);

        let states = HashMap::from([
            (
                NavState::Idle,
                State::new(
                    Box::new(idle) as Box<dyn StateHandler<Event, Label>>,
                    HashMap::from([
                        (Label::NavStart, NavState::Turning),
                        (Label::NetLossHome, NavState::TurningHome),
                    ]),
                ),
            ),
            (
                NavState::Turning,
                State::new(
                    Box::new(turning) as Box<dyn StateHandler<Event, Label>>,
                    HashMap::from([
                        (Label::NavStop, NavState::Idle),
                        (Label::BearingAdjust, NavState::Moving),
                        (Label::NetLossStop, NavState::Stopping),
                        (Label::WaypointsCleared, NavState::Stopping),
                        (Label::NetLossHome, NavState::TurningHome),
                    ]),
                ),
            ),
            (
                NavState::Moving,
                State::new(
                    Box::new(moving) as Box<dyn StateHandler<Event, Label>>,
                    HashMap::from([
                        (Label::NavStop, NavState::Idle),
                        (Label::Waypoint, NavState::Turning),
                        (Label::WaypointsSet, NavState::Turning),
                        (Label::LastWaypoint, NavState::Stopping),
                        (Label::NetLossStop, NavState::Stopping),
                        (Label::WaypointsCleared, NavState::Stopping),
                        (Label::NetLossHome, NavState::TurningHome),
                    ]),
                ),
            ),
            (
                NavState::TurningHome,
                State::new(
                    Box::new(turning_home) as Box<dyn StateHandler<Event, Label>>,
                    HashMap::from([
                        (Label::NavStop, NavState::Idle),
                        (Label::BearingAdjust, NavState::MovingHome),
                    ]),
                ),
            ),
            (
                NavState::MovingHome,
                State::new(
                    Box::new(moving_home) as Box<dyn StateHandler<Event, Label>>,
                    HashMap::from([
                        (Label::NavStop, NavState::Idle),
                        (Label::HomeReached, NavState::Stopping),
                    ]),
                ),
            ),
            (
                NavState::Stopping,
                State::new(
                    Box::new(stopping) as Box<dyn StateHandler<Event, Label>>,
                    HashMap::from([(Label::ShipStopped, NavState::Idle)]),
                ),
            ),
        ]);

        let fsm = Fsm::new(states, NavState::Idle);

        let (position_tx, position_rx) = mpsc::channel(buf_size);
        let (home_waypoint_tx, home_waypoint_rx) = mpsc::channel(buf_size);
        let (bearing_tx, bearing_rx) = mpsc::channel(buf_size);
        let (ship_data_tx, ship_data_rx) = mpsc::channel(buf_size);
        let (waypoints_tx, waypoints_rx) = mpsc::channel(buf_size);
        let (nav_tx, nav_rx) = mpsc::channel(buf_size);
        let (net_loss_tx, net_loss_rx) = mpsc::channel(buf_size);
        let (stop_tx, stop_rx) = mpsc::channel(1);

        let core = Self {
            data: data.clone(),
            fsm,
            position_rx,
            home_waypoint_rx,
            bearing_rx,
            ship_data_rx,
            waypoints_rx,
            nav_rx,
            net_loss_rx,
            stop_rx,
        };

        let handle = CoreHandle {
            data,
            position_tx,
            home_waypoint_tx,
            bearing_tx,
            ship_data_tx,
            waypoints_tx,
            nav_tx,
            net_loss_tx,
            stop_tx,
        };

        (core, handle)
    }

    /// Drain inbound channels until stopped.
    ///
    /// One ready source per iteration: mutate the state snapshot, derive one
    /// event, hand it to the machine. A tick every few seconds logs the
    /// current state and feeds the machine an `Undefined` event, which every
    /// handler ignores.
    pub async fn run(mut self) {
        let mut tick = time::interval_at(
            Instant::now() + STATE_LOG_INTERVAL,
            STATE_LOG_INTERVAL,
        );

        loop {
            let event = tokio::select! {
                _ = tick.tick() => {
                    log::info!("current state = {}", self.fsm.current_state());
                    Event::Undefined
                }
                Some(position) = self.position_rx.recv() => {
                    self.data.write().unwrap().position = position;
                    Event::PositionUpdate
                }
                Some(home) = self.home_waypoint_rx.recv() => {
                    self.data.write().unwrap().home_waypoint = Some(home);
                    Event::HomeWaypointUpdate
                }
                Some(bearing) = self.bearing_rx.recv() => {
                    self.data.write().unwrap().cur_bearing = bearing;
                    Event::BearingUpdate
                }
                Some(ship_data) = self.ship_data_rx.recv() => {
                    self.data.write().unwrap().ship_data = ship_data;
                    Event::ShipDataUpdate
                }
                Some(command) = self.waypoints_rx.recv() => {
                    self.apply_waypoint_command(command)
                }
                Some(start) = self.nav_rx.recv() => {
                    if start { Event::NavStart } else { Event::NavStop }
                }
                Some(lost) = self.net_loss_rx.recv() => {
                    if lost { Event::NetLoss } else { Event::Undefined }
                }
                _ = self.stop_rx.recv() => break,
            };

            log::trace!("event: {event}");
            self.fsm.handle_event(&event);
            self.data.write().unwrap().state = self.fsm.current_state();
        }

        log::info!("core dispatcher stopped");
    }

    fn apply_waypoint_command(&self, command: WaypointCommand) -> Event {
        let mut data = self.data.write().unwrap();
        match command {
            WaypointCommand::Set(waypoints) => {
                data.waypoints.set(waypoints);
                Event::WaypointsSet
            }
            WaypointCommand::Add(waypoint) => {
                data.waypoints.add(waypoint);
                Event::WaypointAdded
            }
            WaypointCommand::Clear => {
                data.waypoints = WaypointPlan::new();
                Event::WaypointsCleared
            }
        }
    }
}

impl CoreHandle {
    /// Name of the state the machine is currently in.
    pub fn current_state(&self) -> NavState {
        self.data.read().unwrap().state
    }

    /// Terminate the dispatcher loop. Pending events are discarded.
    pub fn stop(&self) {
        let _ = self.stop_tx.try_send(());
    }

    async fn send<T>(tx: &mpsc::Sender<T>, value: T, what: &str)
    where
        T: Send,
    {
        if tx.send(value).await.is_err() {
            log::debug!("core is gone, dropping {what}");
        }
    }
}

#[async_trait]
impl PositionUpdater for CoreHandle {
    async fn update_position(&self, position: Position) {
        Self::send(&self.position_tx, position, "position update").await;
    }
}

#[async_trait]
impl BearingUpdater for CoreHandle {
    async fn update_bearing(&self, bearing: Bearing) {
        Self::send(&self.bearing_tx, bearing, "bearing update").await;
    }
}

#[async_trait]
impl ShipDataUpdater for CoreHandle {
    async fn update_ship_data(&self, ship_data: ShipData) {
        Self::send(&self.ship_data_tx, ship_data, "ship data update").await;
    }
}

#[async_trait]
impl WaypointsUpdater for CoreHandle {
    async fn set_waypoints(&self, waypoints: Vec<Waypoint>) {
        if waypoints.is_empty() {
            return;
        }
        Self::send(
            &self.waypoints_tx,
            WaypointCommand::Set(waypoints),
            "waypoint set",
        )
        .await;
    }

    async fn add_waypoint(&self, waypoint: Waypoint) {
        Self::send(
            &self.waypoints_tx,
            WaypointCommand::Add(waypoint),
            "waypoint add",
        )
        .await;
    }

    async fn clear_waypoints(&self) {
        Self::send(&self.waypoints_tx, WaypointCommand::Clear, "waypoint clear").await;
    }

    async fn set_home_waypoint(&self, waypoint: Waypoint) {
        Self::send(&self.home_waypoint_tx, waypoint, "home waypoint").await;
    }
}

#[async_trait]
impl NavigationController for CoreHandle {
    async fn start_navigation(&self) {
        Self::send(&self.nav_tx, true, "nav start").await;
    }

    async fn stop_navigation(&self) {
        Self::send(&self.nav_tx, false, "nav stop").await;
    }

    async fn network_lost(&self) {
        Self::send(&self.net_loss_tx, true, "net loss").await;
    }
}

impl PositionDataProvider for CoreHandle {
    fn position_data(&self) -> (Bearing, Position) {
        let data = self.data.read().unwrap();
        (data.cur_bearing, data.position)
    }
}

impl ShipDataProvider for CoreHandle {
    fn ship_data(&self) -> ShipData {
        self.data.read().unwrap().ship_data.clone()
    }
}

impl WaypointDataProvider for CoreHandle {
    fn waypoints(&self) -> Vec<Waypoint> {
        self.data.read().unwrap().waypoints.remaining().to_vec()
    }
}
