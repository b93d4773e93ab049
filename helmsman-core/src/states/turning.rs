use std::sync::Arc;

use crate::dispatcher::SharedData;
use crate::event::Event;
use crate::fsm::StateHandler;
use crate::states::{compute_target_bearing, steer_to_target, turn_complete, Label};
use crate::traits::ShipControl;

/// Rotating the hull towards the next waypoint of the plan.
///
/// Entry aims the target bearing at `plan.next()` and commands a turn;
/// position and plan updates re-aim and re-steer, a bearing update close
/// enough to the target completes the turn.
pub(crate) struct TurningHandler {
    data: SharedData,
    ship: Arc<dyn ShipControl>,
    turning_speed: String,
    steering_left: String,
    steering_right: String,
}

impl TurningHandler {
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

    fn aim_and_steer(&self) {
        let mut data = self.data.write().unwrap();
        let target = data.waypoints.next().copied();
        compute_target_bearing(&mut data, target);
        steer_to_target(
            &data,
            self.ship.as_ref(),
            &self.steering_left,
            &self.steering_right,
        );
    }
}

impl StateHandler<Event, Label> for TurningHandler {
    fn on_enter(&mut self) {
        log::debug!("turning: enter");

        self.aim_and_steer();
        self.ship.set_speed(&self.turning_speed);
    }

    fn on_exit(&mut self) {
        log::debug!("turning: exit");

        // a fresh turn must not inherit this target
        let mut data = self.data.write().unwrap();
        data.target_bearing.set_from_components(0.0, 0.0);
    }

    fn handle_event(&mut self, event: &Event) -> Option<Label> {
        match event {
            Event::BearingUpdate => {
                let data = self.data.read().unwrap();
                if turn_complete(&data) {
                    log::info!(
                        "turning: turn complete at {} deg",
                        data.cur_bearing.angle_deg()
                    );
                    Some(Label::BearingAdjust)
                } else {
                    None
                }
            }
            Event::PositionUpdate | Event::WaypointsSet => {
                self.aim_and_steer();
                None
            }
            Event::WaypointsCleared => Some(Label::WaypointsCleared),
            Event::NavStop => Some(Label::NavStop),
            Event::NetLoss => {
                if self.data.read().unwrap().home_waypoint.is_some() {
                    log::info!("turning: operator link lost, returning home");
                    Some(Label::NetLossHome)
                } else {
                    Some(Label::NetLossStop)
                }
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Position, Waypoint};
    use crate::testutil::{shared_data, MockShip};

    fn handler(data: SharedData, ship: Arc<MockShip>) -> TurningHandler {
        TurningHandler::new(
            data,
            ship,
            "fwd30".into(),
            "left40".into(),
            "right40".into(),
        )
    }

    fn approach_first_waypoint() -> SharedData {
        shared_data(|data| {
            data.position = Position {
                latitude: 56.34000,
                longitude: 43.99394,
                ..Position::default()
            };
            data.waypoints.add(Waypoint {
                latitude: 56.33956,
                longitude: 43.98449,
            });
        })
    }

    #[test]
    fn entry_aims_at_the_next_waypoint_and_turns() {
        let data = approach_first_waypoint();
        let ship = Arc::new(MockShip::default());
        let mut handler = handler(data.clone(), ship.clone());

        handler.on_enter();

        let angle = data.read().unwrap().target_bearing.angle_deg();
        assert!((angle - (-92.665815)).abs() < 1e-4, "got {angle}");
        // current bearing 0, target -92.67: turn left
        assert_eq!(ship.steering(), "left40");
        assert_eq!(ship.speed(), "fwd30");
    }

    #[test]
    fn exit_resets_the_target_bearing() {
        let data = shared_data(|data| {
            data.target_bearing.set_from_components(170.0, 3.0);
        });
        let ship = Arc::new(MockShip::default());
        let mut handler = handler(data.clone(), ship);

        handler.on_exit();

        assert_eq!(data.read().unwrap().target_bearing.angle_deg(), 0.0);
    }

    #[test]
    fn bearing_update_completes_the_turn_only_close_to_target() {
        let data = approach_first_waypoint();
        let ship = Arc::new(MockShip::default());
        let mut handler = handler(data.clone(), ship);
        handler.on_enter();
        // target bearing is -92.665815 deg here

        data.write()
            .unwrap()
            .cur_bearing
            .set_from_components(2.0, -1.0); // -26.57 deg
        assert_eq!(handler.handle_event(&Event::BearingUpdate), None);

        data.write()
            .unwrap()
            .cur_bearing
            .set_from_components(-0.04655, -1.0); // -92.665 deg
        assert_eq!(
            handler.handle_event(&Event::BearingUpdate),
            Some(Label::BearingAdjust)
        );
    }

    #[test]
    fn position_update_reaims_without_transition() {
        let data = approach_first_waypoint();
        let ship = Arc::new(MockShip::default());
        let mut handler = handler(data.clone(), ship);
        handler.on_enter();

        {
            let mut data = data.write().unwrap();
            data.position.latitude = 56.33938;
            data.position.longitude = 43.99413;
        }

        assert_eq!(handler.handle_event(&Event::PositionUpdate), None);
        let angle = data.read().unwrap().target_bearing.angle_deg();
        assert!((angle - (-88.93028610071595)).abs() < 1e-4, "got {angle}");
    }

    #[test]
    fn waypoints_set_resteers_without_transition() {
        let data = approach_first_waypoint();
        let ship = Arc::new(MockShip::default());
        let mut handler = handler(data.clone(), ship.clone());
        handler.on_enter();
        // target -92.67 deg, turning left

        {
            let mut data = data.write().unwrap();
            let mut plan = crate::model::WaypointPlan::new();
            plan.add(Waypoint {
                latitude: 56.338651,
                longitude: 44.000639,
            });
            data.waypoints = plan;
        }

        assert_eq!(handler.handle_event(&Event::WaypointsSet), None);
        assert_eq!(ship.steering(), "right40");
    }

    #[test]
    fn cleared_plan_stops_the_ship() {
        let data = approach_first_waypoint();
        let ship = Arc::new(MockShip::default());
        let mut handler = handler(data.clone(), ship);
        handler.on_enter();

        {
            let mut data = data.write().unwrap();
            data.waypoints = crate::model::WaypointPlan::new();
        }

        assert_eq!(
            handler.handle_event(&Event::WaypointsCleared),
            Some(Label::WaypointsCleared)
        );
    }

    #[test]
    fn net_loss_stops_or_returns_home() {
        let data = shared_data(|_| {});
        let ship = Arc::new(MockShip::default());
        let mut handler = handler(data.clone(), ship);

        assert_eq!(
            handler.handle_event(&Event::NetLoss),
            Some(Label::NetLossStop)
        );

        data.write().unwrap().home_waypoint = Some(Waypoint {
            latitude: 56.33938,
            longitude: 43.99413,
        });
        assert_eq!(
            handler.handle_event(&Event::NetLoss),
            Some(Label::NetLossHome)
        );
    }

    #[test]
    fn nav_stop_goes_back_to_idle() {
        let data = shared_data(|_| {});
        let ship = Arc::new(MockShip::default());
        let mut handler = handler(data, ship);

        assert_eq!(handler.handle_event(&Event::NavStop), Some(Label::NavStop));
    }

    #[test]
    fn entry_with_an_empty_plan_does_not_panic() {
        let data = shared_data(|data| {
            data.target_bearing.set_from_components(1.0, 1.0);
        });
        let ship = Arc::new(MockShip::default());
        let mut handler = handler(data.clone(), ship.clone());

        handler.on_enter();

        // target bearing untouched, turn still commanded from stale data
        let angle = data.read().unwrap().target_bearing.angle_deg();
        assert!((angle - 45.0).abs() < 1e-10);
        assert_eq!(ship.speed(), "fwd30");
    }
}
