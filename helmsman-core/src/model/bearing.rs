/// Planar heading derived from magnetometer components, plus a fixed
/// declination offset aligning the sensor frame with the geographic frame.
///
/// The declination is set at construction and never changes; each sensor
/// reading replaces the angle through [`Bearing::set_from_components`].
#[derive(Debug, Clone, Copy)]
pub struct Bearing {
    angle: f64,
    declination: f64,
}

impl Bearing {
    pub fn new(declination: f64) -> Self {
        Self {
            angle: 0.0,
            declination,
        }
    }

    /// Update the bearing from raw sensor components.
    ///
    /// The angle is `atan2(y, x) + declination`. Callers pick the component
    /// order; the control loop deliberately passes `(diffLat, diffLong)`.
    pub fn set_from_components(&mut self, x: f64, y: f64) {
        self.angle = y.atan2(x) + self.declination;
    }

    /// Bearing angle in radians.
    pub fn angle(&self) -> f64 {
        self.angle
    }

    /// Bearing angle in degrees, in (-180, 180] for zero declination.
    pub fn angle_deg(&self) -> f64 {
        self.angle.to_degrees()
    }
}
