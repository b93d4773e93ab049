use crate::dispatcher::SharedData;
use crate::event::Event;
use crate::fsm::StateHandler;
use crate::states::Label;

/// Waiting for orders. No actuator effect on entry or exit.
pub(crate) struct IdleHandler {
    data: SharedData,
}

impl IdleHandler {
    pub(crate) fn new(data: SharedData) -> Self {
        Self { data }
    }
}

impl StateHandler<Event, Label> for IdleHandler {
    fn on_enter(&mut self) {
        log::debug!("idle: enter");
    }

    fn on_exit(&mut self) {
        log::debug!("idle: exit");
    }

    fn handle_event(&mut self, event: &Event) -> Option<Label> {
        match event {
            Event::NavStart => {
                log::info!("idle: navigation started");
                Some(Label::NavStart)
            }
            Event::NetLoss => {
                // without a home waypoint there is nowhere to return to
                if self.data.read().unwrap().home_waypoint.is_some() {
                    log::info!("idle: operator link lost, returning home");
                    Some(Label::NetLossHome)
                } else {
                    None
                }
            }
            _ => None,
        }
    }
}
