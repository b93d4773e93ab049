use std::sync::Arc;

use crate::dispatcher::SharedData;
use crate::event::Event;
use crate::fsm::StateHandler;
use crate::states::{speed_for_distance, Label, STEERING_STRAIGHT};
use crate::traits::ShipControl;

/// Running straight at the next waypoint of the plan.
///
/// Entry centers the rudder and picks full or approach speed by distance.
/// Each position update either advances the plan (waypoint reached) or
/// re-picks the speed.
pub(crate) struct MovingHandler {
    data: SharedData,
    ship: Arc<dyn ShipControl>,
    approach_speed: String,
    full_speed: String,
    approach_distance: f64,
    distance_inaccuracy: f64,
}

impl MovingHandler {
    pub(crate) fn new(
        data: SharedData,
        ship: Arc<dyn ShipControl>,
        approach_speed: String,
        full_speed: String,
        approach_distance: f64,
        distance_inaccuracy: f64,
    ) -> Self {
        Self {
            data,
            ship,
            approach_speed,
            full_speed,
            approach_distance,
            distance_inaccuracy,
        }
    }

    fn distance_to_next(&self) -> f64 {
        let data = self.data.read().unwrap();
        data.waypoints
            .next()
            .map(|waypoint| data.position.distance_meters(waypoint))
            .unwrap_or(0.0)
    }

    fn set_speed(&self, distance: f64) {
        self.ship.set_speed(speed_for_distance(
            distance,
            self.approach_distance,
            &self.approach_speed,
            &self.full_speed,
        ));
    }
}

impl StateHandler<Event, Label> for MovingHandler {
    fn on_enter(&mut self) {
        log::debug!("moving: enter");

        self.ship.set_steering(STEERING_STRAIGHT);

        let distance = self.distance_to_next();
        log::debug!("moving: distance to target = {distance}");
        self.set_speed(distance);
    }

    fn on_exit(&mut self) {
        log::debug!("moving: exit");
    }

    fn handle_event(&mut self, event: &Event) -> Option<Label> {
        match event {
            Event::PositionUpdate => {
                let distance = self.distance_to_next();
                log::debug!("moving: distance to target = {distance}");
                if distance <= self.distance_inaccuracy {
                    let mut data = self.data.write().unwrap();
                    data.waypoints.advance();
                    if data.waypoints.next().is_none() {
                        log::info!("moving: last waypoint reached");
                        Some(Label::LastWaypoint)
                    } else {
                        log::info!("moving: waypoint reached");
                        Some(Label::Waypoint)
                    }
                } else {
                    self.set_speed(distance);
                    None
                }
            }
            Event::NetLoss => {
                if self.data.read().unwrap().home_waypoint.is_some() {
                    log::info!("moving: operator link lost, returning home");
                    Some(Label::NetLossHome)
                } else {
                    Some(Label::NetLossStop)
                }
            }
            Event::NavStop => Some(Label::NavStop),
            Event::WaypointsSet => Some(Label::WaypointsSet),
            Event::WaypointsCleared => Some(Label::WaypointsCleared),
            _ => None,
        }
    }
}
