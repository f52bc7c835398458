// ctf_core/src/brain/sentry.rs

use rand::RngCore;

use super::{AgentSnapshot, ArenaView, Brain, Decision, Patroller};
use crate::agent::AgentState;

/// A patroller with eyes: any free enemy within `detection_range`
/// interrupts the patrol and gets chased until it is out of range.
#[derive(Debug, Clone)]
pub struct Sentry {
    pub patrol: Patroller,
    pub detection_range: f64,
}

impl Default for Sentry {
    fn default() -> Self {
        Self {
            patrol: Patroller::default(),
            detection_range: 5.0,
        }
    }
}

impl Brain for Sentry {
    fn label(&self) -> &'static str {
        "sentry"
    }

    fn decide(
        &mut self,
        me: &AgentSnapshot,
        view: &ArenaView,
        dt: f64,
        rng: &mut dyn RngCore,
    ) -> Decision {
        let detected = view
            .enemies_of(me.team)
            .filter(|e| e.is_free())
            .map(|e| (e, nalgebra::distance(&me.position, &e.position)))
            .filter(|(_, d)| *d <= self.detection_range)
            .min_by(|(_, d1), (_, d2)| d1.total_cmp(d2))
            .map(|(e, _)| e);

        match detected {
            Some(enemy) => Decision::toward(AgentState::Chasing(enemy.handle), enemy.position),
            None => self.patrol.decide(me, view, dt, rng),
        }
    }
}
