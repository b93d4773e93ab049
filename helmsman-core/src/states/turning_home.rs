use std::sync::Arc;

use crate::dispatcher::SharedData;
use crate::event::Event;
use crate::fsm::StateHandler;
use crate::states::{compute_target_bearing, steer_to_target, turn_complete, Label};
use crate::traits::ShipControl;

/// Rotating the hull towards the home waypoint after operator-link loss.
///
/// Like [`super::TurningHandler`] but aimed at the fixed home point, and the
/// turn direction is chosen once on entry: position updates re-aim the
/// target bearing without issuing a new steering command.
pub(crate) struct TurningHomeHandler {
    data: SharedData,
    ship: Arc<dyn ShipControl>,
    turning_speed: String,
    steering_left: String,
    steering_right: String,
}

impl TurningHomeHandler {
    pub(crate) fn new(
        data: SharedData,
        ship: Arc<dyn ShipControl>,
        turning_speed: String,
        steering_left: String,
        steering_right: String,
    ) -> Self {
        Self {
            data,
            ship,
            turning_speed,
            steering_left,
            steering_right,
        }
    }
}

impl StateHandler<Event, Label> for TurningHomeHandler {
    fn on_enter(&mut self) {
        log::debug!("turning home: enter");

        let mut data = self.data.write().unwrap();
        let home = data.home_waypoint;
        compute_target_bearing(&mut data, home);
        steer_to_target(
            &data,
            self.ship.as_ref(),
            &self.steering_left,
            &self.steering_right,
        );
        drop(data);

        self.ship.set_speed(&self.turning_speed);
    }

    fn on_exit(&mut self) {
        log::debug!("turning home: exit");

        let mut data = self.data.write().unwrap();
        data.target_bearing.set_from_components(0.0, 0.0);
    }

    fn handle_event(&mut self, event: &Event) -> Option<Label> {
        match event {
            Event::NavStop => Some(Label::NavStop),
            Event::BearingUpdate => {
                let data = self.data.read().unwrap();
                if turn_complete(&data) {
                    log::info!(
                        "turning home: turn complete at {} deg",
                        data.cur_bearing.angle_deg()
                    );
                    Some(Label::BearingAdjust)
                } else {
                    None
                }
            }
            Event::PositionUpdate => {
                let mut data = self.data.write().unwrap();
                let home = data.home_waypoint;
                compute_target_bearing(&mut data, home);
                None
            }
            _ => None,
        }
    }
}
