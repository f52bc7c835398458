// ctf_core/src/brain/patroller.rs

use rand::RngCore;

use super::{AgentSnapshot, ArenaView, Brain, Decision};
use crate::agent::AgentState;
use crate::geometry::Bounds;
use crate::types::Point2;

/// Wanders between random points of an area.
///
/// A new point is drawn on arrival and, when `decision_interval` is
/// positive, every `decision_interval` seconds regardless of progress.
#[derive(Debug, Clone)]
pub struct Patroller {
    /// Area to wander in. Defaults to the agent's own half of the field.
    pub area: Option<Bounds>,
    pub decision_interval: f64,
    pub arrival_tolerance: f64,
    target: Option<Point2>,
    since_decision: f64,
}

impl Default for Patroller {
    fn default() -> Self {
        Self::new(None, 2.0)
    }
}

impl Patroller {
    pub fn new(area: Option<Bounds>, decision_interval: f64) -> Self {
        Self {
            area,
            decision_interval,
            arrival_tolerance: 0.1,
            target: None,
            since_decision: 0.0,
        }
    }

    pub fn target(&self) -> Option<Point2> {
        self.target
    }

    fn needs_new_target(&self, position: &Point2) -> bool {
        match self.target {
            None => true,
            Some(target) => {
                nalgebra::distance(position, &target) < self.arrival_tolerance
                    || (self.decision_interval > 0.0
                        && self.since_decision >= self.decision_interval)
            }
        }
    }
}

impl Brain for Patroller {
    fn label(&self) -> &'static str {
        "patroller"
    }

    fn decide(
        &mut self,
        me: &AgentSnapshot,
        view: &ArenaView,
        dt: f64,
        rng: &mut dyn RngCore,
    ) -> Decision {
        self.since_decision += dt;
        if self.needs_new_target(&me.position) {
            let area = self.area.unwrap_or_else(|| view.field.half(me.team));
            let next = area.random_point(rng);
            tracing::trace!(
                "{}: new patrol point ({:.2}, {:.2})",
                me.handle,
                next.x,
                next.y
            );
            self.target = Some(next);
            self.since_decision = 0.0;
        }

        match self.target {
            Some(target) => Decision::toward(AgentState::Patrolling, target),
            None => Decision::hold(AgentState::Patrolling),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::brain::test_support::*;
    use crate::brain::Steering;
    use crate::types::Team;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn patrols_inside_its_area() {
        let f = field();
        let area = Bounds::from_corners(Point2::new(2.0, -1.0), Point2::new(4.0, 1.0));
        let mut brain = Patroller::new(Some(area), 0.0);
        let me = snapshot(0, Team::Red, 3.0, 0.0);
        let agents = [me];
        let mut rng = ChaCha8Rng::seed_from_u64(42);

        let d = brain.decide(&me, &view(&f, &agents, &[]), 0.1, &mut rng);
        assert_eq!(d.state, AgentState::Patrolling);
        match d.steering {
            Steering::Toward(p) => assert!(area.contains(&p)),
            other => panic!("unexpected steering {other:?}"),
        }
    }

    #[test]
    fn keeps_its_point_until_arrival_or_timeout() {
        let f = field();
        let mut brain = Patroller::new(None, 2.0);
        let me = snapshot(0, Team::Blue, -5.0, 0.0);
        let agents = [me];
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let v = view(&f, &agents, &[]);

        brain.decide(&me, &v, 0.5, &mut rng);
        let first = brain.target().unwrap();
        assert!(f.half(Team::Blue).contains(&first));

        brain.decide(&me, &v, 0.5, &mut rng);
        assert_eq!(brain.target(), Some(first));

        // Arriving re-rolls immediately.
        let mut arrived = me;
        arrived.position = first;
        brain.decide(&arrived, &v, 0.1, &mut rng);
        assert_ne!(brain.target(), Some(first));

        // So does the decision interval.
        let second = brain.target().unwrap();
        brain.decide(&me, &v, 2.5, &mut rng);
        assert_ne!(brain.target(), Some(second));
    }

    #[test]
    fn arrival_means_strictly_inside_the_tolerance() {
        let mut brain = Patroller::new(None, 0.0);
        brain.arrival_tolerance = 0.5;
        brain.target = Some(Point2::new(0.0, 0.0));

        assert!(!brain.needs_new_target(&Point2::new(0.5, 0.0)));
        assert!(brain.needs_new_target(&Point2::new(0.25, 0.0)));
    }
}
