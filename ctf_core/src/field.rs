// ctf_core/src/field.rs

//! The playfield and its two territories.

use crate::geometry::Bounds;
use crate::types::{Point2, Side, Team};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Field {
    pub bounds: Bounds,
    /// X coordinate of the centre line separating the territories.
    pub center_x: f64,
    /// The half owned by the Red team. Blue owns the other one.
    pub red_side: Side,
}

impl Field {
    pub fn new(bounds: Bounds, center_x: f64, red_side: Side) -> Self {
        Self {
            bounds,
            center_x,
            red_side,
        }
    }

    pub fn side_of(&self, team: Team) -> Side {
        match team {
            Team::Red => self.red_side,
            Team::Blue => self.red_side.opposite(),
        }
    }

    /// The team owning the territory under `p`.
    /// Points exactly on the centre line belong to nobody.
    pub fn territory_at(&self, p: &Point2) -> Option<Team> {
        let side = if p.x < self.center_x {
            Side::West
        } else if p.x > self.center_x {
            Side::East
        } else {
            return None;
        };
        if side == self.red_side {
            Some(Team::Red)
        } else {
            Some(Team::Blue)
        }
    }

    pub fn in_own_territory(&self, team: Team, p: &Point2) -> bool {
        self.territory_at(p) == Some(team)
    }

    pub fn in_enemy_territory(&self, team: Team, p: &Point2) -> bool {
        self.territory_at(p) == Some(team.opponent())
    }

    /// The point `depth` units inside `team`'s half, level with `from`.
    /// This is where flag carriers and escorts head to.
    pub fn home_point(&self, team: Team, from: &Point2, depth: f64) -> Point2 {
        let x = self.center_x + self.side_of(team).sign() * depth;
        self.bounds.clamp(&Point2::new(x, from.y))
    }

    /// The rectangle covering `team`'s half of the field.
    pub fn half(&self, team: Team) -> Bounds {
        let center_x = self.center_x.clamp(self.bounds.min.x, self.bounds.max.x);
        match self.side_of(team) {
            Side::West => Bounds::from_corners(
                self.bounds.min,
                Point2::new(center_x, self.bounds.max.y),
            ),
            Side::East => Bounds::from_corners(
                Point2::new(center_x, self.bounds.min.y),
                self.bounds.max,
            ),
        }
    }
}
