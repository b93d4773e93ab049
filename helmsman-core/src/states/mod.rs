//! The six navigation states and the control policy they share.
//!
//! Each handler owns its slice of the configuration (speed/steering tokens,
//! distance thresholds) and a handle to the shared state snapshot. The
//! geometric policy lives in free functions here so that the plain and
//! return-home variants of turning/moving stay in lockstep.

use std::fmt;

use crate::dispatcher::CoreData;
use crate::model::Waypoint;
use crate::traits::ShipControl;

mod idle;
mod moving;
mod moving_home;
mod stopping;
mod turning;
mod turning_home;

pub(crate) use idle::IdleHandler;
pub(crate) use moving::MovingHandler;
pub(crate) use moving_home::MovingHomeHandler;
pub(crate) use stopping::StoppingHandler;
pub(crate) use turning::TurningHandler;
pub(crate) use turning_home::TurningHomeHandler;

/// Speed token that brings the ship to a halt; also the telemetry value the
/// stopping state waits for.
pub(crate) const SPEED_STOP: &str = "stop";

/// Steering token for a centered rudder.
pub(crate) const STEERING_STRAIGHT: &str = "straight";

/// Turning is considered complete when the bearing delta shrinks below this
/// many degrees.
const BEARING_REACHED_DEG: f64 = 0.1;

/// Navigation state names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NavState {
    Idle,
    Turning,
    Moving,
    TurningHome,
    MovingHome,
    Stopping,
}

impl fmt::Display for NavState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NavState::Idle => "idle",
            NavState::Turning => "turning",
            NavState::Moving => "moving",
            NavState::TurningHome => "turning home",
            NavState::MovingHome => "moving home",
            NavState::Stopping => "stopping",
        };
        f.write_str(name)
    }
}

/// Transition labels a handler may request.
///
/// The label set is closed; every label maps to a target state in the
/// transition tables built by the dispatcher, and the machine validates the
/// tables at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Label {
    NavStart,
    NavStop,
    BearingAdjust,
    Waypoint,
    LastWaypoint,
    WaypointsSet,
    WaypointsCleared,
    NetLossStop,
    NetLossHome,
    HomeReached,
    ShipStopped,
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Label::NavStart => "nav start",
            Label::NavStop => "nav stop",
            Label::BearingAdjust => "bearing adjust",
            Label::Waypoint => "waypoint",
            Label::LastWaypoint => "last waypoint",
            Label::WaypointsSet => "waypoints set",
            Label::WaypointsCleared => "waypoints cleared",
            Label::NetLossStop => "net loss stop",
            Label::NetLossHome => "net loss home",
            Label::HomeReached => "home reached",
            Label::ShipStopped => "ship stopped",
        };
        f.write_str(name)
    }
}

/// Point the target bearing from the current position at `target`.
///
/// The component order is `(diffLat, diffLong)` - the deployed controller's
/// convention, kept for wire-compatible behavior. With no target the bearing
/// is left untouched; the machine must keep running even on an empty plan.
pub(crate) fn compute_target_bearing(data: &mut CoreData, target: Option<Waypoint>) {
    let Some(target) = target else {
        log::warn!("no target waypoint, keeping previous target bearing");
        return;
    };

    let diff_lat = target.latitude - data.position.latitude;
    let diff_long = target.longitude - data.position.longitude;
    data.target_bearing.set_from_components(diff_lat, diff_long);

    log::debug!(
        "current bearing = {}, target bearing = {}",
        data.cur_bearing.angle_deg(),
        data.target_bearing.angle_deg()
    );
}

/// Pick the turn direction for the current bearing delta and command it.
///
/// Left when `delta > 180` or `-180 < delta < 0`, right otherwise. The delta
/// is deliberately not normalized first; the `> 180` arm is what handles the
/// wraparound.
pub(crate) fn steer_to_target(data: &CoreData, ship: &dyn ShipControl, left: &str, right: &str) {
    let delta = data.target_bearing.angle_deg() - data.cur_bearing.angle_deg();
    if delta > 180.0 || (delta > -180.0 && delta < 0.0) {
        ship.set_steering(left);
    } else {
        ship.set_steering(right);
    }
}

/// Whether the current bearing is close enough to the target to stop turning.
pub(crate) fn turn_complete(data: &CoreData) -> bool {
    let delta = data.target_bearing.angle_deg() - data.cur_bearing.angle_deg();
    delta.abs() < BEARING_REACHED_DEG
}

/// Approach speed inside the approach radius, full speed outside it.
pub(crate) fn speed_for_distance<'a>(
    distance: f64,
    approach_distance: f64,
    approach_speed: &'a str,
    full_speed: &'a str,
) -> &'a str {
    if distance < approach_distance {
        approach_speed
    } else {
        full_speed
    }
}
