//! Geometry primitives and telemetry snapshots.
//!
//! All values are plain data. Each sensor update replaces the previous
//! snapshot wholesale; nothing in here is shared or locked.

mod bearing;
mod position;
mod ship_data;
mod waypoints;

pub use bearing::Bearing;
pub use position::Position;
pub use ship_data::ShipData;
pub use waypoints::{Waypoint, WaypointPlan};
