//! Shared straight-line stepping used by the unobstructed and
//! obstacle-avoiding spatial managers.

use flowsim_core::Point3;

pub struct Step {
    pub position: Point3,
    pub reached_waypoint: bool,
}

/// Moves `current` toward `waypoint` by `speed * delta_time`, clamping at
/// the waypoint rather than overshooting it.
pub fn step_toward(current: Point3, waypoint: Point3, speed: f32, delta_time: f32) -> Step {
    let distance = current.distance(waypoint);
    if distance <= f32::EPSILON {
        return Step { position: waypoint, reached_waypoint: true };
    }
    let travel = speed * delta_time;
    if travel >= distance {
        Step { position: waypoint, reached_waypoint: true }
    } else {
        let t = travel / distance;
        Step { position: current.lerp(waypoint, t), reached_waypoint: false }
    }
}

/// Incremental progress update matching the reference implementation: each
/// tick adds `distance_moved / distance_remaining_at_tick_start` to the
/// running progress rather than recomputing `traveled_total / path_total`
/// from scratch — a heuristic indicator, not an exact fraction. Exact
/// arrival is instead detected by `Step::reached_waypoint` on the final leg,
/// which callers use to force progress to `1.0` directly.
pub fn accumulate_progress(prev_progress: f32, distance_remaining_before: f32, distance_moved: f32) -> f32 {
    if distance_remaining_before <= 0.0 {
        return 1.0;
    }
    (prev_progress + distance_moved / distance_remaining_before).min(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flowsim_core::Point3;

    #[test]
    fn step_clamps_at_waypoint() {
        let step = step_toward(Point3::new(0.0, 0.0, 0.0), Point3::new(10.0, 0.0, 0.0), 5.0, 3.0);
        assert!(step.reached_waypoint);
        assert_eq!(step.position, Point3::new(10.0, 0.0, 0.0));
    }

    #[test]
    fn step_moves_partway() {
        let step = step_toward(Point3::new(0.0, 0.0, 0.0), Point3::new(10.0, 0.0, 0.0), 2.0, 1.0);
        assert!(!step.reached_waypoint);
        assert_eq!(step.position, Point3::new(2.0, 0.0, 0.0));
    }

    #[test]
    fn progress_caps_at_one() {
        assert_eq!(accumulate_progress(0.9, 1.0, 5.0), 1.0);
    }
}
