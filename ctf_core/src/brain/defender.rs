// ctf_core/src/brain/defender.rs

use rand::RngCore;

use super::{AgentSnapshot, ArenaView, Brain, Decision};
use crate::agent::AgentState;
use crate::types::Point2;

/// Guards its own territory: chases the closest enemy that has crossed the
/// centre line and gives up once the target is confined or back home.
#[derive(Debug, Clone, Default)]
pub struct Defender {
    /// Where to wait between chases. Holds position when unset.
    pub post: Option<Point2>,
}

impl Defender {
    pub fn with_post(post: Point2) -> Self {
        Self { post: Some(post) }
    }
}

impl Brain for Defender {
    fn label(&self) -> &'static str {
        "defender"
    }

    fn decide(
        &mut self,
        me: &AgentSnapshot,
        view: &ArenaView,
        _dt: f64,
        _rng: &mut dyn RngCore,
    ) -> Decision {
        // Keep chasing the current target while it is still a valid invader.
        if let AgentState::Chasing(target) = me.state {
            if let Some(t) = view.agent(target) {
                if t.is_taggable() && view.field.in_own_territory(me.team, &t.position) {
                    return Decision::toward(AgentState::Chasing(target), t.position);
                }
            }
        }

        let closest = view
            .invaders_of(me.team)
            .min_by(|a, b| {
                let da = nalgebra::distance(&me.position, &a.position);
                let db = nalgebra::distance(&me.position, &b.position);
                da.total_cmp(&db)
            });
        if let Some(invader) = closest {
            return Decision::toward(AgentState::Chasing(invader.handle), invader.position);
        }

        match self.post {
            Some(post) => Decision::toward(AgentState::Idle, post),
            None => Decision::hold(AgentState::Idle),
        }
    }
}
