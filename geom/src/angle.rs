use std::f64::consts::PI;
use std::fmt;

use serde::{Deserialize, Serialize};

/// An angle, stored in radians. Measured with `atan2(dy, dx)` in diagram space, where Y points
/// down, so increasing angles rotate clockwise on screen.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Angle(f64);

impl Angle {
    pub const ZERO: Angle = Angle(0.0);

    /// Create an angle in radians.
    pub fn radians(rads: f64) -> Angle {
        Angle(rads)
    }

    /// Create an angle in degrees.
    pub fn degrees(degs: f64) -> Angle {
        Angle::radians(degs.to_radians())
    }

    /// The raw value, without normalizing.
    pub fn inner_radians(self) -> f64 {
        self.0
    }

    pub fn rotate_degs(self, degrees: f64) -> Angle {
        Angle(self.0 + degrees.to_radians())
    }

    /// Normalized to [0, 2pi)
    pub fn normalized_radians(self) -> f64 {
        let rads = self.0.rem_euclid(2.0 * PI);
        // rem_euclid can round up to exactly 2pi for tiny negative inputs
        if rads >= 2.0 * PI {
            0.0
        } else {
            rads
        }
    }

    /// Normalized to [0, 360)
    pub fn normalized_degrees(self) -> f64 {
        self.normalized_radians().to_degrees()
    }

    /// The signed rotation, in radians and normalized to (-pi, pi], that takes this angle to the
    /// other along the shorter way around.
    pub fn shortest_rotation_towards(self, other: Angle) -> f64 {
        let mut sweep = other.0 - self.0;
        while sweep > PI {
            sweep -= 2.0 * PI;
        }
        while sweep <= -PI {
            sweep += 2.0 * PI;
        }
        sweep
    }

    /// The unsigned circular distance between two angles, in [0, pi].
    pub fn circular_distance(self, other: Angle) -> f64 {
        let diff = (self.normalized_radians() - other.normalized_radians()).abs();
        diff.min(2.0 * PI - diff)
    }

    /// True if the two angles are within `threshold_degrees` of each other, going the short way.
    pub fn approx_eq(self, other: Angle, threshold_degrees: f64) -> bool {
        self.circular_distance(other).to_degrees() < threshold_degrees
    }
}

impl fmt::Display for Angle {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Angle({} degrees)", self.normalized_degrees())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shortest_rotation_wraps() {
        let a = Angle::degrees(350.0);
        let b = Angle::degrees(10.0);
        assert!((a.shortest_rotation_towards(b).to_degrees() - 20.0).abs() < 1e-9);
        assert!((b.shortest_rotation_towards(a).to_degrees() + 20.0).abs() < 1e-9);

        // Exactly opposite resolves to +pi, never -pi
        let c = Angle::degrees(0.0);
        let d = Angle::degrees(180.0);
        assert!((c.shortest_rotation_towards(d) - PI).abs() < 1e-9);
        assert!((d.shortest_rotation_towards(c) - PI).abs() < 1e-9);
    }

    #[test]
    fn circular_distance_is_symmetric() {
        let a = Angle::degrees(-5.0);
        let b = Angle::degrees(365.0);
        assert!((a.circular_distance(b).to_degrees() - 10.0).abs() < 1e-9);
        assert!((b.circular_distance(a).to_degrees() - 10.0).abs() < 1e-9);
        assert!(a.approx_eq(b, 11.0));
        assert!(!a.approx_eq(b, 9.0));
    }

    #[test]
    fn normalization() {
        assert!((Angle::degrees(-90.0).normalized_degrees() - 270.0).abs() < 1e-9);
        assert!(Angle::degrees(720.0).approx_eq(Angle::ZERO, 1e-6));
        let n = Angle::degrees(-1e-14).normalized_radians();
        assert!((0.0..2.0 * PI).contains(&n));
    }
}
