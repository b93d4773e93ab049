//! Shared fixtures for the unit tests of the state handlers and dispatcher.

use std::sync::{Arc, Mutex, RwLock};

use crate::dispatcher::{CoreData, SharedData};
use crate::traits::ShipControl;

/// Records the last commanded setpoints.
#[derive(Default)]
pub(crate) struct MockShip {
    speed: Mutex<String>,
    steering: Mutex<String>,
}

impl MockShip {
    pub(crate) fn speed(&self) -> String {
        self.speed.lock().unwrap().clone()
    }

    pub(crate) fn steering(&self) -> String {
        self.steering.lock().unwrap().clone()
    }
}

impl ShipControl for MockShip {
    fn set_speed(&self, speed: &str) {
        *self.speed.lock().unwrap() = speed.to_string();
    }

    fn set_steering(&self, steering: &str) {
        *self.steering.lock().unwrap() = steering.to_string();
    }
}

/// Zero-declination core state with test-specific tweaks applied.
pub(crate) fn data_with(configure: impl FnOnce(&mut CoreData)) -> CoreData {
    let mut data = CoreData::new(0.0);
    configure(&mut data);
    data
}

pub(crate) fn shared_data(configure: impl FnOnce(&mut CoreData)) -> SharedData {
    Arc::new(RwLock::new(data_with(configure)))
}
