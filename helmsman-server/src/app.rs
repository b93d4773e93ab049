//! Process wiring and supervision.
//!
//! Builds the core and the three adapters, connects them through the core's
//! contracts, and runs each as a supervised subsystem. The operator adapter
//! is relaunched with a short backoff when its listener fails; the two
//! peripheral pollers end quietly if their peer cannot be dialed, leaving
//! the core running on stale data.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Result};
use tokio_graceful_shutdown::{SubsystemBuilder, SubsystemHandle};

use helmsman_core::Core;

use crate::adapters::network::{NetworkAdapter, RequestHandler};
use crate::adapters::position::PositionAdapter;
use crate::adapters::ship::{self, ShipAdapter};
use crate::config::Config;

const OPERATOR_RESTART_DELAY: Duration = Duration::from_secs(1);

pub struct App {
    config: Config,
}

impl App {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Start every subsystem and stay alive until shutdown is requested.
    pub async fn run(self, subsys: SubsystemHandle) -> Result<()> {
        let (ship_control, ship_commands) = ship::command_channel();
        let (core, core_handle) = Core::new(&self.config.core_config, Arc::new(ship_control));

        let handle = Arc::new(core_handle.clone());
        let ship_adapter = ShipAdapter::new(&self.config.ship_config, ship_commands, handle.clone());
        let (position_adapter, _calibration) = PositionAdapter::new(
            &self.config.position_config,
            self.config.core_config.declination,
            handle.clone(),
            handle.clone(),
        );
        let network_adapter = NetworkAdapter::new(
            &self.config.network_config,
            RequestHandler::new(
                handle.clone(),
                handle.clone(),
                handle.clone(),
                handle.clone(),
                handle,
            ),
        );

        subsys.start(SubsystemBuilder::new(
            "core",
            move |s: SubsystemHandle| async move {
                let dispatcher = tokio::spawn(core.run());
                s.on_shutdown_requested().await;
                core_handle.stop();
                dispatcher
                    .await
                    .map_err(|err| anyhow!("core dispatcher failed: {err}"))
            },
        ));

        subsys.start(SubsystemBuilder::new("ship-adapter", |s| {
            ship_adapter.run(s)
        }));

        subsys.start(SubsystemBuilder::new("position-adapter", |s| {
            position_adapter.run(s)
        }));

        subsys.start(SubsystemBuilder::new(
            "operator-adapter",
            move |s: SubsystemHandle| async move {
                loop {
                    match network_adapter.serve(&s).await {
                        Ok(()) => break,
                        Err(err) => log::error!("operator adapter failed: {err:#}, restarting"),
                    }
                    tokio::select! {
                        _ = tokio::time::sleep(OPERATOR_RESTART_DELAY) => {}
                        _ = s.on_shutdown_requested() => break,
                    }
                }
                Ok::<(), anyhow::Error>(())
            },
        ));

        subsys.on_shutdown_requested().await;
        Ok(())
    }
}
