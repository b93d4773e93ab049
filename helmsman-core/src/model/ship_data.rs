/// Actuator telemetry as reported by the ship controller.
///
/// The tokens are opaque to the core except for the `"stop"` and
/// `"straight"` sentinels; everything else (`"fwd40"`, `"left40"`, ...)
/// comes from configuration and is only ever compared for equality.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShipData {
    pub speed: String,
    pub steering: String,
}
