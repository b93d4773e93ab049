/// A geodetic point of the navigation plan, in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Waypoint {
    pub latitude: f64,
    pub longitude: f64,
}

/// Ordered waypoint sequence with a monotonically advancing cursor.
///
/// The cursor marks the next unreached point. It only moves forward
/// ([`WaypointPlan::advance`]) or back to the start when the whole sequence
/// is replaced ([`WaypointPlan::set`]).
#[derive(Debug, Clone, Default)]
pub struct WaypointPlan {
    waypoints: Vec<Waypoint>,
    next_index: usize,
}

impl WaypointPlan {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole sequence and reset the cursor to its start.
    pub fn set(&mut self, waypoints: Vec<Waypoint>) {
        self.waypoints = waypoints;
        self.next_index = 0;
    }

    /// Append a waypoint; the cursor stays where it is.
    pub fn add(&mut self, waypoint: Waypoint) {
        self.waypoints.push(waypoint);
    }

    /// The next unreached waypoint, or `None` past the end of the plan.
    pub fn next(&self) -> Option<&Waypoint> {
        self.waypoints.get(self.next_index)
    }

    /// Mark the current target reached and move the cursor one step forward.
    pub fn advance(&mut self) {
        self.next_index += 1;
    }

    /// The unreached tail of the plan, cursor untouched.
    pub fn remaining(&self) -> &[Waypoint] {
        let start = self.next_index.min(self.waypoints.len());
        &self.waypoints[start..]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wp(latitude: f64, longitude: f64) -> Waypoint {
        Waypoint {
            latitude,
            longitude,
        }
    }

    #[test]
    fn empty_plan_has_no_next() {
        let plan = WaypointPlan::new();
        assert_eq!(plan.next(), None);
        assert!(plan.remaining().is_empty());
    }

    #[test]
    fn advance_walks_the_sequence() {
        let mut plan = WaypointPlan::new();
        plan.add(wp(56.402099, 43.859839));
        plan.add(wp(56.376828, 43.876562));

        assert_eq!(plan.next(), Some(&wp(56.402099, 43.859839)));
        plan.advance();
        assert_eq!(plan.next(), Some(&wp(56.376828, 43.876562)));
        plan.advance();
        assert_eq!(plan.next(), None);
    }

    #[test]
    fn set_resets_the_cursor() {
        let mut plan = WaypointPlan::new();
        plan.add(wp(1.0, 1.0));
        plan.add(wp(2.0, 2.0));
        plan.advance();

        plan.set(vec![wp(3.0, 3.0)]);
        assert_eq!(plan.next(), Some(&wp(3.0, 3.0)));
    }

    #[test]
    fn add_does_not_reset_the_cursor() {
        let mut plan = WaypointPlan::new();
        plan.set(vec![wp(1.0, 1.0)]);
        plan.advance();
        assert_eq!(plan.next(), None);

        plan.add(wp(2.0, 2.0));
        assert_eq!(plan.next(), Some(&wp(2.0, 2.0)));
    }

    #[test]
    fn remaining_does_not_move_the_cursor() {
        let mut plan = WaypointPlan::new();
        plan.set(vec![wp(1.0, 1.0), wp(2.0, 2.0), wp(3.0, 3.0)]);
        plan.advance();

        assert_eq!(plan.remaining(), &[wp(2.0, 2.0), wp(3.0, 3.0)]);
        // a second read sees the same tail
        assert_eq!(plan.remaining(), &[wp(2.0, 2.0), wp(3.0, 3.0)]);
        assert_eq!(plan.next(), Some(&wp(2.0, 2.0)));
    }

    #[test]
    fn remaining_is_empty_past_the_end() {
        let mut plan = WaypointPlan::new();
        plan.set(vec![wp(1.0, 1.0)]);
        plan.advance();
        plan.advance();

        assert!(plan.remaining().is_empty());
    }
}
