//! TrackingController - proportional servo correction
//!
//! Converts a detection's horizontal offset from the frame centre into a new
//! servo angle. A dead zone around the centre suppresses corrections so the
//! head does not oscillate around a creature that is already roughly centred.

use crate::detection::Detection;

/// Lowest servo angle (degrees)
pub const SERVO_MIN_ANGLE: u32 = 0;
/// Highest servo angle (degrees)
pub const SERVO_MAX_ANGLE: u32 = 180;

/// Degrees of correction for a creature at the frame edge
pub const DEFAULT_ANGULAR_SCALE: f64 = 20.0;
/// Half-width of the dead zone as a fraction of the image midpoint
pub const DEFAULT_DEAD_ZONE_RATIO: f64 = 0.2;

/// Proportional control law parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackingController {
    pub angular_scale: f64,
    pub dead_zone_ratio: f64,
}

impl Default for TrackingController {
    fn default() -> Self {
        Self {
            angular_scale: DEFAULT_ANGULAR_SCALE,
            dead_zone_ratio: DEFAULT_DEAD_ZONE_RATIO,
        }
    }
}

impl TrackingController {
    pub fn new(angular_scale: f64, dead_zone_ratio: f64) -> Self {
        Self {
            angular_scale,
            dead_zone_ratio,
        }
    }

    /// Servo angle that re-centres `detection`, or `None` inside the dead zone.
    ///
    /// The dead zone boundaries belong to the dead zone. The integer delta is
    /// truncated toward zero and the resulting angle is clamped to
    /// `[SERVO_MIN_ANGLE, SERVO_MAX_ANGLE]`.
    pub fn compute_angle_delta(
        &self,
        detection: &Detection,
        frame_width: u32,
        current_angle: u32,
    ) -> Option<u32> {
        if frame_width == 0 {
            return None;
        }

        let creature_midpoint = detection.midpoint();
        let image_midpoint = f64::from(frame_width) / 2.0;
        let margin = self.dead_zone_ratio * image_midpoint;
        let center_min = image_midpoint - margin;
        let center_max = image_midpoint + margin;

        if creature_midpoint >= center_min && creature_midpoint <= center_max {
            return None;
        }

        let movement = (image_midpoint - creature_midpoint) / image_midpoint;
        let delta = (self.angular_scale * movement).trunc() as i64;

        let target = (i64::from(current_angle) + delta)
            .clamp(i64::from(SERVO_MIN_ANGLE), i64::from(SERVO_MAX_ANGLE));

        Some(target as u32)
    }
}
