//! Contracts between the core and its peripheral adapters.
//!
//! The updater/controller traits are the inbound side: adapters call them to
//! feed the dispatcher, and the calls await channel capacity, so they are
//! async. The provider traits are the outbound snapshot side: short
//! read-lock copies, safe to call from any adapter task. [`ShipControl`] and
//! [`PositionCalibrator`] are the two contracts the core *requires* from
//! adapters.

use async_trait::async_trait;

use crate::model::{Bearing, Position, ShipData, Waypoint};

/// Sink for GPS fixes.
#[async_trait]
pub trait PositionUpdater: Send + Sync {
    async fn update_position(&self, position: Position);
}

/// Sink for magnetometer bearings.
#[async_trait]
pub trait BearingUpdater: Send + Sync {
    async fn update_bearing(&self, bearing: Bearing);
}

/// Sink for actuator telemetry.
#[async_trait]
pub trait ShipDataUpdater: Send + Sync {
    async fn update_ship_data(&self, ship_data: ShipData);
}

/// Waypoint plan edits issued by the operator.
#[async_trait]
pub trait WaypointsUpdater: Send + Sync {
    /// Replace the plan. An empty sequence is dropped silently.
    async fn set_waypoints(&self, waypoints: Vec<Waypoint>);
    async fn add_waypoint(&self, waypoint: Waypoint);
    async fn clear_waypoints(&self);
    async fn set_home_waypoint(&self, waypoint: Waypoint);
}

/// Operator navigation commands.
#[async_trait]
pub trait NavigationController: Send + Sync {
    async fn start_navigation(&self);
    async fn stop_navigation(&self);
    /// Operator link presumed down; return home if a home waypoint is set.
    async fn network_lost(&self);
}

/// Snapshot of the current bearing and position.
pub trait PositionDataProvider: Send + Sync {
    fn position_data(&self) -> (Bearing, Position);
}

/// Snapshot of the latest actuator telemetry.
pub trait ShipDataProvider: Send + Sync {
    fn ship_data(&self) -> ShipData;
}

/// Snapshot of the unreached tail of the waypoint plan.
pub trait WaypointDataProvider: Send + Sync {
    fn waypoints(&self) -> Vec<Waypoint>;
}

/// Speed/steering setpoints, required by the core from the actuator adapter.
///
/// Called on the dispatcher task during state entry and event handling;
/// implementations must accept the call without blocking (enqueue and
/// return).
pub trait ShipControl: Send + Sync {
    fn set_speed(&self, speed: &str);
    fn set_steering(&self, steering: &str);
}

/// Magnetometer calibration control, offered by the sensor adapter.
///
/// The core itself never drives calibration; the contract exists for
/// completeness with the sensor peripheral.
#[async_trait]
pub trait PositionCalibrator: Send + Sync {
    async fn start_calibration(&self);
    async fn stop_calibration(&self);
}
