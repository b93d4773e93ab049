use std::sync::Arc;

use crate::dispatcher::SharedData;
use crate::event::Event;
use crate::fsm::StateHandler;
use crate::states::{Label, SPEED_STOP, STEERING_STRAIGHT};
use crate::traits::ShipControl;

/// Bringing the hull to a standstill.
///
/// Entry commands stop/straight; the state waits for the actuator telemetry
/// to confirm the ship has actually stopped before handing back to idle.
pub(crate) struct StoppingHandler {
    data: SharedData,
    ship: Arc<dyn ShipControl>,
}

impl StoppingHandler {
    pub(crate) fn new(data: SharedData, ship: Arc<dyn ShipControl>) -> Self {
        Self { data, ship }
    }
}

impl StateHandler<Event, Label> for StoppingHandler {
    fn on_enter(&mut self) {
        log::debug!("stopping: enter");

        self.ship.set_speed(SPEED_STOP);
        self.ship.set_steering(STEERING_STRAIGHT);
    }

    fn on_exit(&mut self) {
        log::debug!("stopping: exit");
    }

    fn handle_event(&mut self, event: &Event) -> Option<Label> {
        match event {
            Event::ShipDataUpdate => {
                if self.data.read().unwrap().ship_data.speed == SPEED_STOP {
                    log::info!("stopping: ship has stopped");
                    Some(Label::ShipStopped)
                } else {
                    None
                }
            }
            _ => None,
        }
    }
}
