// ctf_core/src/geometry.rs

use rand::Rng;

use crate::error::SetupError;
use crate::types::{Point2, Vec2};

/// An axis-aligned rectangle on the playfield.
/// Used for the field itself, prison zones and patrol areas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: Point2,
    pub max: Point2,
}

impl Bounds {
    pub fn new(min: Point2, max: Point2) -> Result<Self, SetupError> {
        if min.x > max.x || min.y > max.y {
            return Err(SetupError::InvalidBounds {
                min: [min.x, min.y],
                max: [max.x, max.y],
            });
        }
        Ok(Self { min, max })
    }

    /// Builds bounds from two opposite corners in any order.
    pub fn from_corners(a: Point2, b: Point2) -> Self {
        Self {
            min: Point2::new(a.x.min(b.x), a.y.min(b.y)),
            max: Point2::new(a.x.max(b.x), a.y.max(b.y)),
        }
    }

    pub fn contains(&self, p: &Point2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    pub fn contains_bounds(&self, other: &Bounds) -> bool {
        self.contains(&other.min) && self.contains(&other.max)
    }

    pub fn clamp(&self, p: &Point2) -> Point2 {
        Point2::new(
            p.x.clamp(self.min.x, self.max.x),
            p.y.clamp(self.min.y, self.max.y),
        )
    }

    pub fn center(&self) -> Point2 {
        nalgebra::center(&self.min, &self.max)
    }

    /// Uniformly samples a point inside the bounds.
    /// Inclusive ranges so a degenerate (zero-area) box yields its only point.
    pub fn random_point<R: Rng + ?Sized>(&self, rng: &mut R) -> Point2 {
        Point2::new(
            rng.gen_range(self.min.x..=self.max.x),
            rng.gen_range(self.min.y..=self.max.y),
        )
    }
}

/// Moves `from` toward `to` by at most `max_delta`, never overshooting.
pub fn move_towards(from: &Point2, to: &Point2, max_delta: f64) -> Point2 {
    let offset = to - from;
    let distance = offset.norm();
    if distance <= max_delta || distance <= f64::EPSILON {
        return *to;
    }
    from + offset * (max_delta / distance)
}

/// Advances `from` along `heading` at `speed` for `dt` seconds.
/// Headings longer than 1 are scaled down so analog input never exceeds full speed.
pub fn step_heading(from: &Point2, heading: &Vec2, speed: f64, dt: f64) -> Point2 {
    let magnitude = heading.norm();
    let direction = if magnitude > 1.0 {
        heading / magnitude
    } else {
        *heading
    };
    from + direction * speed * dt
}

/// Unit vector from `from` to `to`, or zero when the points coincide.
pub fn direction_to(from: &Point2, to: &Point2) -> Vec2 {
    let offset = to - from;
    offset.try_normalize(f64::EPSILON).unwrap_or_else(Vec2::zeros)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    const EPSILON: f64 = 1e-9;

    #[test]
    fn bounds_reject_inverted_corners() {
        let result = Bounds::new(Point2::new(1.0, 0.0), Point2::new(0.0, 1.0));
        assert!(matches!(result, Err(SetupError::InvalidBounds { .. })));
    }

    #[test]
    fn bounds_clamp_and_contain() {
        let b = Bounds::from_corners(Point2::new(2.0, 3.0), Point2::new(-2.0, -3.0));
        assert!(b.contains(&Point2::new(0.0, 0.0)));
        assert!(b.contains(&Point2::new(2.0, -3.0)));
        assert!(!b.contains(&Point2::new(2.1, 0.0)));

        let clamped = b.clamp(&Point2::new(10.0, -10.0));
        assert_abs_diff_eq!(clamped.x, 2.0, epsilon = EPSILON);
        assert_abs_diff_eq!(clamped.y, -3.0, epsilon = EPSILON);
    }

    #[test]
    fn random_points_stay_inside() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let b = Bounds::from_corners(Point2::new(5.0, 1.0), Point2::new(8.0, 4.0));
        for _ in 0..200 {
            assert!(b.contains(&b.random_point(&mut rng)));
        }
    }

    #[test]
    fn random_point_on_degenerate_bounds() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let p = Point2::new(3.0, -1.0);
        let b = Bounds::from_corners(p, p);
        assert_eq!(b.random_point(&mut rng), p);
    }

    #[test]
    fn move_towards_does_not_overshoot() {
        let from = Point2::new(0.0, 0.0);
        let to = Point2::new(3.0, 4.0);

        let partial = move_towards(&from, &to, 2.5);
        assert_abs_diff_eq!(partial.x, 1.5, epsilon = EPSILON);
        assert_abs_diff_eq!(partial.y, 2.0, epsilon = EPSILON);

        let arrived = move_towards(&from, &to, 10.0);
        assert_eq!(arrived, to);
    }

    #[test]
    fn step_heading_caps_diagonal_input() {
        let from = Point2::origin();
        let next = step_heading(&from, &Vec2::new(1.0, 1.0), 2.0, 1.0);
        assert_abs_diff_eq!((next - from).norm(), 2.0, epsilon = EPSILON);

        let half = step_heading(&from, &Vec2::new(0.5, 0.0), 2.0, 1.0);
        assert_abs_diff_eq!(half.x, 1.0, epsilon = EPSILON);
    }

    #[test]
    fn direction_to_same_point_is_zero() {
        let p = Point2::new(1.0, 1.0);
        assert_eq!(direction_to(&p, &p), Vec2::zeros());
    }
}
