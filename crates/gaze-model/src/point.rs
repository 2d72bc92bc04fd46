//! 2-D vector primitive used for gaze positions, velocities and
//! accelerations.

use std::fmt;
use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};

use serde::{Deserialize, Serialize};

/// A 2-D point or vector in gaze-source units.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

impl Point2D {
    pub const ZERO: Point2D = Point2D { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean length of the vector.
    pub fn magnitude(&self) -> f64 {
        self.x.hypot(self.y)
    }

    /// Unit vector in the same direction, or `None` for the zero vector.
    pub fn normalize(&self) -> Option<Point2D> {
        let norm = self.magnitude();
        if norm == 0.0 || !norm.is_finite() {
            return None;
        }
        Some(*self / norm)
    }

    /// Rotate counter-clockwise by `degrees`.
    pub fn rotate_deg(&self, degrees: f64) -> Point2D {
        self.rotate_rad(degrees.to_radians())
    }

    /// Rotate counter-clockwise by `radians`.
    pub fn rotate_rad(&self, radians: f64) -> Point2D {
        let (sin, cos) = radians.sin_cos();
        Point2D {
            x: self.x * cos - self.y * sin,
            y: self.x * sin + self.y * cos,
        }
    }

    /// Angle from the +y axis in radians, in `[0, 2π)`.
    ///
    /// `(0, 1)` is 0, `(-1, 0)` is π/2, `(0, -1)` is π and `(1, 0)` is
    /// 3π/2. The zero vector has angle 0.
    pub fn angle_rad(&self) -> f64 {
        let rho = self.magnitude();
        if rho == 0.0 || (self.x == 0.0 && self.y >= 0.0) {
            return 0.0;
        }
        let sign = if self.x < 0.0 { -1.0 } else { 1.0 };
        let theta = (-self.y / rho).clamp(-1.0, 1.0).acos() * sign + std::f64::consts::PI;
        // x > 0 with y -> +inf lands on exactly 2π
        theta % std::f64::consts::TAU
    }

    /// Angle from the +y axis in degrees, in `[0, 360)`.
    pub fn angle_deg(&self) -> f64 {
        self.angle_rad().to_degrees()
    }

    /// Euclidean distance to another point.
    pub fn distance_to(&self, other: &Point2D) -> f64 {
        (*self - *other).magnitude()
    }

    /// Linear interpolation between two points.
    pub fn lerp(a: &Point2D, b: &Point2D, t: f64) -> Point2D {
        let t = t.clamp(0.0, 1.0);
        *a + (*b - *a) * t
    }

    /// Whether both components are finite.
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl Add for Point2D {
    type Output = Point2D;

    fn add(self, rhs: Point2D) -> Point2D {
        Point2D::new(self.x + rhs.x, self.y + rhs.y)
    }
}

/// Offsets both components by the same amount.
impl Add<f64> for Point2D {
    type Output = Point2D;

    fn add(self, rhs: f64) -> Point2D {
        Point2D::new(self.x + rhs, self.y + rhs)
    }
}

impl AddAssign for Point2D {
    fn add_assign(&mut self, rhs: Point2D) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Point2D {
    type Output = Point2D;

    fn sub(self, rhs: Point2D) -> Point2D {
        Point2D::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Sub<f64> for Point2D {
    type Output = Point2D;

    fn sub(self, rhs: f64) -> Point2D {
        Point2D::new(self.x - rhs, self.y - rhs)
    }
}

impl SubAssign for Point2D {
    fn sub_assign(&mut self, rhs: Point2D) {
        self.x -= rhs.x;
        self.y -= rhs.y;
    }
}

impl Mul<f64> for Point2D {
    type Output = Point2D;

    fn mul(self, rhs: f64) -> Point2D {
        Point2D::new(self.x * rhs, self.y * rhs)
    }
}

impl Mul<Point2D> for f64 {
    type Output = Point2D;

    fn mul(self, rhs: Point2D) -> Point2D {
        rhs * self
    }
}

impl Div<f64> for Point2D {
    type Output = Point2D;

    fn div(self, rhs: f64) -> Point2D {
        Point2D::new(self.x / rhs, self.y / rhs)
    }
}

impl Neg for Point2D {
    type Output = Point2D;

    fn neg(self) -> Point2D {
        Point2D::new(-self.x, -self.y)
    }
}

impl std::iter::Sum for Point2D {
    fn sum<I: Iterator<Item = Point2D>>(iter: I) -> Point2D {
        iter.fold(Point2D::ZERO, |acc, p| acc + p)
    }
}

impl fmt::Display for Point2D {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:.2}, {:.2}]", self.x, self.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Point2D, b: Point2D) -> bool {
        (a.x - b.x).abs() < 1e-9 && (a.y - b.y).abs() < 1e-9
    }

    #[test]
    fn test_affine_operators() {
        let a = Point2D::new(1.0, 2.0);
        let b = Point2D::new(3.0, -1.0);
        assert_eq!(a + b, Point2D::new(4.0, 1.0));
        assert_eq!(a - b, Point2D::new(-2.0, 3.0));
        assert_eq!(a * 2.0, Point2D::new(2.0, 4.0));
        assert_eq!(2.0 * a, Point2D::new(2.0, 4.0));
        assert_eq!(b / 2.0, Point2D::new(1.5, -0.5));
        assert_eq!(-a, Point2D::new(-1.0, -2.0));
        assert_eq!(a + 1.0, Point2D::new(2.0, 3.0));
        assert_eq!(a - 1.0, Point2D::new(0.0, 1.0));

        let mut c = a;
        c += b;
        c -= a;
        assert_eq!(c, b);
    }

    #[test]
    fn test_magnitude_and_normalize() {
        let v = Point2D::new(3.0, 4.0);
        assert!((v.magnitude() - 5.0).abs() < 1e-12);
        assert!(approx(v.normalize().unwrap(), Point2D::new(0.6, 0.8)));
        assert!(Point2D::ZERO.normalize().is_none());
    }

    #[test]
    fn test_rotate() {
        let v = Point2D::new(1.0, 0.0);
        assert!(approx(v.rotate_deg(90.0), Point2D::new(0.0, 1.0)));
        assert!(approx(v.rotate_rad(std::f64::consts::PI), Point2D::new(-1.0, 0.0)));
    }

    #[test]
    fn test_angle_from_positive_y_axis() {
        assert_eq!(Point2D::new(0.0, 1.0).angle_deg(), 0.0);
        assert!((Point2D::new(-1.0, 0.0).angle_deg() - 90.0).abs() < 1e-9);
        assert!((Point2D::new(0.0, -1.0).angle_deg() - 180.0).abs() < 1e-9);
        assert!((Point2D::new(1.0, 0.0).angle_deg() - 270.0).abs() < 1e-9);
        assert_eq!(Point2D::ZERO.angle_deg(), 0.0);
    }

    #[test]
    fn test_angle_stays_in_range() {
        for i in 0..360 {
            let v = Point2D::new(0.0, 1.0).rotate_deg(i as f64 + 0.5);
            let angle = v.angle_deg();
            assert!((0.0..360.0).contains(&angle), "angle {angle} out of range");
        }
    }

    #[test]
    fn test_distance_and_lerp() {
        let a = Point2D::new(0.0, 0.0);
        let b = Point2D::new(1.0, 0.0);
        assert!((a.distance_to(&b) - 1.0).abs() < 1e-9);
        assert_eq!(Point2D::lerp(&a, &b, 0.25), Point2D::new(0.25, 0.0));
    }

    #[test]
    fn test_sum_and_display() {
        let total: Point2D = [Point2D::new(1.0, 1.0), Point2D::new(2.0, 3.0)]
            .into_iter()
            .sum();
        assert_eq!(total, Point2D::new(3.0, 4.0));
        assert_eq!(total.to_string(), "[3.00, 4.00]");
    }
}
