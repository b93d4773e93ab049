use std::fmt;

/// One navigation event per dispatcher iteration.
///
/// Every inbound message is translated to exactly one of these after the
/// corresponding state field has been updated. `Undefined` is what the
/// periodic tick feeds through the machine; no handler reacts to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    Undefined,
    PositionUpdate,
    HomeWaypointUpdate,
    BearingUpdate,
    ShipDataUpdate,
    WaypointsSet,
    WaypointAdded,
    WaypointsCleared,
    NavStart,
    NavStop,
    NetLoss,
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Event::Undefined => "undefined",
            Event::PositionUpdate => "position update",
            Event::HomeWaypointUpdate => "home waypoint update",
            Event::BearingUpdate => "bearing update",
            Event::ShipDataUpdate => "ship data update",
            Event::WaypointsSet => "waypoints set",
            Event::WaypointAdded => "waypoint added",
            Event::WaypointsCleared => "waypoints cleared",
            Event::NavStart => "nav start",
            Event::NavStop => "nav stop",
            Event::NetLoss => "net loss",
        };
        f.write_str(name)
    }
}
