// ctf_core/src/prison.rs

use rand::Rng;

use crate::geometry::Bounds;
use crate::types::{Point2, Team};

/// A zone confining tagged agents of `team` until a teammate rescues them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prison {
    pub team: Team,
    pub bounds: Bounds,
}

impl Prison {
    pub fn new(team: Team, bounds: Bounds) -> Self {
        Self { team, bounds }
    }

    /// The spot a freshly tagged agent walks to.
    pub fn random_cell<R: Rng + ?Sized>(&self, rng: &mut R) -> Point2 {
        self.bounds.random_point(rng)
    }
}
