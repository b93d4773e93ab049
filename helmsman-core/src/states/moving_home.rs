use std::sync::Arc;

use crate::dispatcher::SharedData;
use crate::event::Event;
use crate::fsm::StateHandler;
use crate::states::{speed_for_distance, Label, STEERING_STRAIGHT};
use crate::traits::ShipControl;

/// Running straight at the home waypoint.
///
/// Like [`super::MovingHandler`] but aimed at the fixed home point; reaching
/// it ends the voyage instead of advancing a plan.
pub(crate) struct MovingHomeHandler {
    data: SharedData,
    ship: Arc<dyn ShipControl>,
    approach_speed: String,
    full_speed: String,
    approach_distance: f64,
    distance_inaccuracy: f64,
}

impl MovingHomeHandler {
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

    fn distance_home(&self) -> f64 {
        let data = self.data.read().unwrap();
        data.home_waypoint
            .map(|home| data.position.distance_meters(&home))
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

impl StateHandler<Event, Label> for MovingHomeHandler {
    fn on_enter(&mut self) {
        log::debug!("moving home: enter");

        if self.data.read().unwrap().home_waypoint.is_none() {
            log::error!("moving home: no home waypoint");
            return;
        }

        self.ship.set_steering(STEERING_STRAIGHT);

        let distance = self.distance_home();
        log::debug!("moving home: distance home = {distance}");
        self.set_speed(distance);
    }

    fn on_exit(&mut self) {
        log::debug!("moving home: exit");
    }

    fn handle_event(&mut self, event: &Event) -> Option<Label> {
        match event {
            Event::PositionUpdate => {
                let distance = self.distance_home();
                log::debug!("moving home: distance home = {distance}");
                if distance <= self.distance_inaccuracy {
                    log::info!("moving home: home reached");
                    Some(Label::HomeReached)
                } else {
                    self.set_speed(distance);
                    None
                }
            }
            Event::NavStop => Some(Label::NavStop),
            _ => None,
        }
    }
}
