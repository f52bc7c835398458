// ctf_core/src/brain/raider.rs

use rand::RngCore;

use super::{homing_state, AgentSnapshot, ArenaView, Brain, Decision, Steering};
use crate::agent::AgentState;
use crate::geometry::direction_to;
use crate::types::{Point2, Vec2};

/// The attacker. Goes after enemy flags, frees imprisoned teammates and
/// dodges defenders while on enemy soil.
#[derive(Debug, Clone)]
pub struct Raider {
    /// Defenders closer than this are evaded while in enemy territory.
    pub avoid_radius: f64,
    /// Whether imprisoned teammates take priority over flags.
    pub rescue: bool,
}

impl Default for Raider {
    fn default() -> Self {
        Self {
            avoid_radius: 2.0,
            rescue: true,
        }
    }
}

impl Raider {
    /// Unit vector pointing away from the closest threat, if any is in range.
    fn evasion(&self, me: &AgentSnapshot, view: &ArenaView) -> Option<Vec2> {
        if !view.field.in_enemy_territory(me.team, &me.position) {
            return None;
        }
        let threat = view.nearest_threat(me.team, &me.position, self.avoid_radius)?;
        let away = direction_to(&threat.position, &me.position);
        if away == Vec2::zeros() {
            Some(view.homeward(me.team, &me.position))
        } else {
            Some(away)
        }
    }

    fn objective(&self, me: &AgentSnapshot, view: &ArenaView) -> Option<(AgentState, Point2)> {
        if self.rescue {
            let prisoner = closest_point(
                view.imprisoned_teammates(me.team).map(|a| a.position),
                &me.position,
            );
            if let Some(p) = prisoner {
                return Some((AgentState::Rescuing, p));
            }
        }
        closest_point(
            view.enemy_flags_at_base(me.team).map(|f| f.position),
            &me.position,
        )
        .map(|p| (AgentState::Raiding, p))
    }
}

impl Brain for Raider {
    fn label(&self) -> &'static str {
        "raider"
    }

    fn decide(
        &mut self,
        me: &AgentSnapshot,
        view: &ArenaView,
        _dt: f64,
        _rng: &mut dyn RngCore,
    ) -> Decision {
        let objective = self.objective(me, view);

        if let Some(away) = self.evasion(me, view) {
            // Keep some pull toward the objective so the raider skirts around
            // defenders instead of running straight back every time.
            let pull = objective
                .map(|(_, target)| direction_to(&me.position, &target) * 0.5)
                .unwrap_or_else(Vec2::zeros);
            let heading = (away + pull)
                .try_normalize(f64::EPSILON)
                .unwrap_or(away);
            return Decision::new(AgentState::Avoiding, Steering::Heading(heading));
        }

        match objective {
            Some((state, target)) => Decision::toward(state, target),
            // Nothing left to raid: wait on our side of the line.
            None => Decision::toward(AgentState::Idle, view.home_point(me.team, &me.position)),
        }
    }

    fn return_home(
        &mut self,
        me: &AgentSnapshot,
        view: &ArenaView,
        _dt: f64,
        _rng: &mut dyn RngCore,
    ) -> Decision {
        let state = homing_state(me);
        let home = view.home_point(me.team, &me.position);
        match self.evasion(me, view) {
            Some(away) => {
                let homeward = view.homeward(me.team, &me.position);
                let heading = (homeward + away)
                    .try_normalize(f64::EPSILON)
                    .unwrap_or(homeward);
                Decision::new(state, Steering::Heading(heading))
            }
            None => Decision::toward(state, home),
        }
    }
}

fn closest_point(points: impl Iterator<Item = Point2>, from: &Point2) -> Option<Point2> {
    points.min_by(|a, b| {
        nalgebra::distance(from, a).total_cmp(&nalgebra::distance(from, b))
    })
}
