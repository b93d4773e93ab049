//! helmsman-core - navigation control core for an unmanned surface vessel
//!
//! This crate owns all navigation state and decides speed/steering setpoints.
//! It fuses GPS position and magnetometer bearing with an operator-supplied
//! waypoint plan, drives the hull along the plan, and returns to a designated
//! home point when the operator link is reported lost.
//!
//! Everything runs on a single dispatcher task: peripheral adapters push
//! updates through bounded channels, the dispatcher serializes them into one
//! consistent state and feeds one event at a time to a table-driven finite
//! state machine. The crate performs no socket I/O of its own; adapters live
//! in `helmsman-server`.
//!
//! # Modules
//!
//! - [`model`]: geometry primitives and telemetry snapshots
//! - [`fsm`]: generic table-driven state machine engine
//! - [`event`]: the closed set of navigation events
//! - [`states`]: the six state handlers and their shared control policy
//! - [`dispatcher`]: the event loop, shared state and the core handle
//! - [`traits`]: contracts between the core and its adapters

pub mod dispatcher;
pub mod event;
pub mod fsm;
pub mod model;
pub mod states;
pub mod traits;

#[cfg(test)]
pub(crate) mod testutil;

pub use dispatcher::{Core, CoreHandle, Settings};
pub use event::Event;
pub use model::{Bearing, Position, ShipData, Waypoint, WaypointPlan};
pub use states::NavState;
