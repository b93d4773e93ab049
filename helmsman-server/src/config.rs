//! Static JSON configuration, read once at startup.
//!
//! The file mirrors the deployed controller's layout: a section per
//! component plus a global log level. A missing or malformed file is fatal;
//! the process refuses to start without a complete configuration.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use helmsman_core::Settings;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Control-policy settings handed to the core dispatcher.
    pub core_config: Settings,
    pub network_config: NetworkConfig,
    pub position_config: PositionConfig,
    pub ship_config: ShipConfig,
    #[serde(default)]
    pub log_level: String,
}

/// Operator command socket.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkConfig {
    pub socket_name: PathBuf,
}

/// GPS/magnetometer peripheral socket and polling cadence (milliseconds).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionConfig {
    pub socket_name: PathBuf,
    pub polling_interval: u64,
}

/// Ship actuator peripheral socket and polling cadence (milliseconds).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShipConfig {
    pub socket_name: PathBuf,
    pub polling_interval: u64,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let data = fs::read(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        serde_json::from_slice(&data)
            .with_context(|| format!("failed to parse config file {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "coreConfig": {
            "declination": 13.62,
            "updateBufSize": 100,
            "turningSpeed": "fwd30",
            "turningSteeringLeft": "left40",
            "turningSteeringRight": "right40",
            "approachSpeed": "fwd50",
            "fullSpeed": "fwd100",
            "approachDistance": 10.0,
            "distanceInaccuracy": 3.0
        },
        "networkConfig": {
            "socketName": "/tmp/helm-operator.sock"
        },
        "positionConfig": {
            "socketName": "/tmp/helm-position.sock",
            "pollingInterval": 500
        },
        "shipConfig": {
            "socketName": "/tmp/helm-ship.sock",
            "pollingInterval": 500
        },
        "logLevel": "debug"
    }"#;

    #[test]
    fn parses_a_complete_file() {
        let config: Config = serde_json::from_str(SAMPLE).expect("sample config");

        assert_eq!(config.core_config.declination, 13.62);
        assert_eq!(config.core_config.update_buf_size, 100);
        assert_eq!(config.core_config.turning_speed, "fwd30");
        assert_eq!(config.core_config.turning_steering_left, "left40");
        assert_eq!(config.core_config.turning_steering_right, "right40");
        assert_eq!(config.core_config.approach_speed, "fwd50");
        assert_eq!(config.core_config.full_speed, "fwd100");
        assert_eq!(config.core_config.approach_distance, 10.0);
        assert_eq!(config.core_config.distance_inaccuracy, 3.0);

        assert_eq!(
            config.network_config.socket_name,
            PathBuf::from("/tmp/helm-operator.sock")
        );
        assert_eq!(
            config.position_config.socket_name,
            PathBuf::from("/tmp/helm-position.sock")
        );
        assert_eq!(config.position_config.polling_interval, 500);
        assert_eq!(
            config.ship_config.socket_name,
            PathBuf::from("/tmp/helm-ship.sock")
        );
        assert_eq!(config.ship_config.polling_interval, 500);
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn missing_section_is_an_error() {
        let result = serde_json::from_str::<Config>(r#"{"logLevel": "info"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn missing_core_values_fall_back_to_defaults() {
        let config: Config = serde_json::from_str(
            r#"{
                "coreConfig": {},
                "networkConfig": {"socketName": "/tmp/a"},
                "positionConfig": {"socketName": "/tmp/b", "pollingInterval": 100},
                "shipConfig": {"socketName": "/tmp/c", "pollingInterval": 100}
            }"#,
        )
        .expect("sparse config");

        assert_eq!(config.core_config.declination, 0.0);
        assert_eq!(config.core_config.update_buf_size, 0);
        assert!(config.core_config.turning_speed.is_empty());
        assert!(config.log_level.is_empty());
    }

    #[test]
    fn load_reads_from_disk_and_reports_missing_files() {
        let dir = std::env::temp_dir();
        let path = dir.join("helmsman-config-test.conf");
        fs::write(&path, SAMPLE).expect("write sample");

        let config = Config::load(&path).expect("load sample");
        assert_eq!(config.core_config.declination, 13.62);
        fs::remove_file(&path).ok();

        let missing = dir.join("helmsman-config-test-missing.conf");
        assert!(Config::load(&missing).is_err());
    }
}
