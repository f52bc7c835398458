// ctf_core/src/brain/mod.rs

//! Decision making for AI-driven agents.
//!
//! A `Brain` looks at a read-only `ArenaView` and answers two questions for
//! its agent: which free state it wants to be in, and how it wants to move.
//! The arena owns the rules: brains are never consulted while their agent is
//! in a locked state (walking to prison, in prison, being rescued).

use dyn_clone::DynClone;
use rand::RngCore;
use std::fmt::Debug;

use crate::agent::{Agent, AgentState, Control};
use crate::field::Field;
use crate::flag::Flag;
use crate::geometry::direction_to;
use crate::prison::Prison;
use crate::types::{AgentHandle, FlagHandle, Point2, Team, Vec2};

mod defender;
mod patroller;
mod raider;
mod sentry;

pub use defender::Defender;
pub use patroller::Patroller;
pub use raider::Raider;
pub use sentry::Sentry;

// =========================================================================
// == Outputs ==
// =========================================================================

/// How an agent wants to move this tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Steering {
    /// Stand still.
    Hold,
    /// Walk straight to a point without overshooting it.
    Toward(Point2),
    /// Walk along a direction. Magnitudes above 1 are clamped to full speed.
    Heading(Vec2),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Decision {
    pub state: AgentState,
    pub steering: Steering,
}

impl Decision {
    pub fn new(state: AgentState, steering: Steering) -> Self {
        Self { state, steering }
    }

    pub fn hold(state: AgentState) -> Self {
        Self::new(state, Steering::Hold)
    }

    pub fn toward(state: AgentState, target: Point2) -> Self {
        Self::new(state, Steering::Toward(target))
    }
}

// =========================================================================
// == The Brain Trait ("Contract") ==
// =========================================================================

/// The contract for any AI behaviour driving an agent.
/// Implementations must be `Send + Sync` to live inside a Bevy resource, and
/// clonable so an arena can be reset to its starting line-up.
pub trait Brain: Debug + Send + Sync + DynClone {
    /// Short name used in logs and reports.
    fn label(&self) -> &'static str;

    /// Picks the next free state and steering for `me`.
    fn decide(
        &mut self,
        me: &AgentSnapshot,
        view: &ArenaView,
        dt: f64,
        rng: &mut dyn RngCore,
    ) -> Decision;

    /// Called instead of `decide` while `me` carries a flag or escorts a
    /// rescued teammate. The default walks straight back over the centre line.
    fn return_home(
        &mut self,
        me: &AgentSnapshot,
        view: &ArenaView,
        _dt: f64,
        _rng: &mut dyn RngCore,
    ) -> Decision {
        Decision::toward(homing_state(me), view.home_point(me.team, &me.position))
    }
}

dyn_clone::clone_trait_object!(Brain);

/// The state an agent is in while heading home with a flag or an escort.
pub fn homing_state(me: &AgentSnapshot) -> AgentState {
    if me.carrying.is_some() {
        AgentState::ReturningFlag
    } else {
        AgentState::Escorting
    }
}

// =========================================================================
// == Read-only World Snapshot ==
// =========================================================================

/// The per-tick copy of an agent that brains get to see.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AgentSnapshot {
    pub handle: AgentHandle,
    pub team: Team,
    pub position: Point2,
    pub state: AgentState,
    pub control: Control,
    pub carrying: Option<FlagHandle>,
    pub escorting: Option<AgentHandle>,
}

impl AgentSnapshot {
    pub fn is_taggable(&self) -> bool {
        !self.state.is_confined()
    }

    pub fn is_free(&self) -> bool {
        !self.state.is_locked()
    }
}

impl From<&Agent> for AgentSnapshot {
    fn from(agent: &Agent) -> Self {
        Self {
            handle: agent.handle,
            team: agent.team,
            position: agent.position,
            state: agent.state,
            control: agent.control,
            carrying: agent.carrying,
            escorting: agent.escorting,
        }
    }
}

/// Everything a brain may look at while deciding.
#[derive(Debug, Clone, Copy)]
pub struct ArenaView<'a> {
    pub field: &'a Field,
    pub agents: &'a [AgentSnapshot],
    pub flags: &'a [Flag],
    pub prisons: &'a [Prison],
    /// Seconds since the match started.
    pub clock: f64,
    /// How far past the centre line "home" is for returning agents.
    pub home_depth: f64,
}

impl<'a> ArenaView<'a> {
    pub fn agent(&self, handle: AgentHandle) -> Option<&'a AgentSnapshot> {
        self.agents.iter().find(|a| a.handle == handle)
    }

    pub fn enemies_of(&self, team: Team) -> impl Iterator<Item = &'a AgentSnapshot> {
        self.agents.iter().filter(move |a| a.team != team)
    }

    pub fn teammates_of(&self, team: Team) -> impl Iterator<Item = &'a AgentSnapshot> {
        self.agents.iter().filter(move |a| a.team == team)
    }

    /// Taggable enemies standing inside `team`'s territory.
    pub fn invaders_of(&self, team: Team) -> impl Iterator<Item = &'a AgentSnapshot> + '_ {
        self.enemies_of(team)
            .filter(move |a| a.is_taggable() && self.field.in_own_territory(team, &a.position))
    }

    /// The closest taggable enemy within `radius` of `from`.
    pub fn nearest_enemy_within(
        &self,
        team: Team,
        from: &Point2,
        radius: f64,
    ) -> Option<&'a AgentSnapshot> {
        nearest(
            self.enemies_of(team).filter(|a| a.is_taggable()),
            from,
            radius,
        )
    }

    /// Enemies that could tag an agent of `team` standing at `from`:
    /// taggable and on their own side of the field.
    pub fn nearest_threat(
        &self,
        team: Team,
        from: &Point2,
        radius: f64,
    ) -> Option<&'a AgentSnapshot> {
        nearest(
            self.enemies_of(team).filter(|a| {
                a.is_taggable() && self.field.in_own_territory(a.team, &a.position)
            }),
            from,
            radius,
        )
    }

    /// Teammates sitting in prison. Ones already being escorted out are
    /// `UnderRescue`, not `InPrison`.
    pub fn imprisoned_teammates(&self, team: Team) -> impl Iterator<Item = &'a AgentSnapshot> {
        self.teammates_of(team)
            .filter(|a| a.state == AgentState::InPrison)
    }

    pub fn enemy_flags_at_base(&self, team: Team) -> impl Iterator<Item = &'a Flag> {
        self.flags
            .iter()
            .filter(move |f| f.team != team && f.is_at_base())
    }

    pub fn home_point(&self, team: Team, from: &Point2) -> Point2 {
        self.field.home_point(team, from, self.home_depth)
    }

    /// Unit vector pointing from `from` toward `team`'s half along X.
    pub fn homeward(&self, team: Team, from: &Point2) -> Vec2 {
        let dir = direction_to(from, &self.home_point(team, from));
        if dir == Vec2::zeros() {
            Vec2::new(self.field.side_of(team).sign(), 0.0)
        } else {
            dir
        }
    }
}

fn nearest<'a>(
    candidates: impl Iterator<Item = &'a AgentSnapshot>,
    from: &Point2,
    radius: f64,
) -> Option<&'a AgentSnapshot> {
    candidates
        .map(|a| (a, nalgebra::distance(from, &a.position)))
        .filter(|(_, d)| *d <= radius)
        .min_by(|(_, d1), (_, d2)| d1.total_cmp(d2))
        .map(|(a, _)| a)
}
