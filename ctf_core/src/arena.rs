// ctf_core/src/arena.rs

//! The whole match: field, agents, flags, prisons, score and clock.
//!
//! `Arena::step` is the single entry point that advances the game. It is
//! fully deterministic given the same inputs and random number generator.

use rand::RngCore;

use crate::agent::{Agent, AgentState};
use crate::brain::{AgentSnapshot, ArenaView, Steering};
use crate::events::GameEvent;
use crate::field::Field;
use crate::flag::Flag;
use crate::geometry::{move_towards, step_heading};
use crate::player::{PlayerController, PlayerInput};
use crate::prison::Prison;
use crate::rules::{MatchOutcome, MatchRules, Scoreboard};
use crate::types::{AgentHandle, FlagHandle, Team};

#[derive(Debug, Clone)]
pub struct Arena {
    field: Field,
    rules: MatchRules,
    prisons: Vec<Prison>,
    agents: Vec<Agent>,
    flags: Vec<Flag>,
    player: PlayerController,
    score: Scoreboard,
    clock: f64,
    outcome: Option<MatchOutcome>,
    // Starting line-up, kept for `restart`.
    initial_agents: Vec<Agent>,
    initial_flags: Vec<Flag>,
}

impl Arena {
    /// Assembles an arena from already validated parts. See `ArenaBuilder`.
    pub(crate) fn from_parts(
        field: Field,
        rules: MatchRules,
        prisons: Vec<Prison>,
        agents: Vec<Agent>,
        flags: Vec<Flag>,
        player: PlayerController,
    ) -> Self {
        Self {
            field,
            rules,
            prisons,
            initial_agents: agents.clone(),
            initial_flags: flags.clone(),
            agents,
            flags,
            player,
            score: Scoreboard::default(),
            clock: 0.0,
            outcome: None,
        }
    }

    // --- Read access ---

    pub fn field(&self) -> &Field {
        &self.field
    }

    pub fn rules(&self) -> &MatchRules {
        &self.rules
    }

    pub fn prisons(&self) -> &[Prison] {
        &self.prisons
    }

    pub fn prison_for(&self, team: Team) -> Option<&Prison> {
        self.prisons.iter().find(|p| p.team == team)
    }

    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    pub fn agent(&self, handle: AgentHandle) -> Option<&Agent> {
        self.agents.iter().find(|a| a.handle == handle)
    }

    pub fn agent_by_name(&self, name: &str) -> Option<&Agent> {
        self.agents.iter().find(|a| a.name == name)
    }

    /// Direct mutable access, for scripted setups and tests.
    pub fn agent_mut(&mut self, handle: AgentHandle) -> Option<&mut Agent> {
        self.agents.iter_mut().find(|a| a.handle == handle)
    }

    pub fn flags(&self) -> &[Flag] {
        &self.flags
    }

    pub fn flag(&self, handle: FlagHandle) -> Option<&Flag> {
        self.flags.iter().find(|f| f.handle == handle)
    }

    pub fn player(&self) -> &PlayerController {
        &self.player
    }

    pub fn score(&self) -> Scoreboard {
        self.score
    }

    /// Seconds of match time played.
    pub fn clock(&self) -> f64 {
        self.clock
    }

    pub fn outcome(&self) -> Option<MatchOutcome> {
        self.outcome
    }

    pub fn is_over(&self) -> bool {
        self.outcome.is_some()
    }

    // --- Lifecycle ---

    /// Puts everything back to the starting line-up (the "Retry" button).
    pub fn restart(&mut self) {
        self.agents = self.initial_agents.clone();
        self.flags = self.initial_flags.clone();
        self.player.clear();
        self.score = Scoreboard::default();
        self.clock = 0.0;
        self.outcome = None;
    }

    /// Advances the match by `dt` seconds and returns what happened.
    /// Does nothing once the match is over.
    pub fn step(&mut self, dt: f64, input: &PlayerInput, rng: &mut dyn RngCore) -> Vec<GameEvent> {
        let mut events = Vec::new();
        if self.outcome.is_some() || dt <= 0.0 {
            return events;
        }

        self.player.apply(input, &mut self.agents, &mut events);
        self.steer_and_move(dt, input, rng);
        self.carry_flags();
        self.check_prison_arrivals(&mut events);

        self.resolve_tags(rng, &mut events);
        self.resolve_rescues(&mut events);
        self.resolve_pickups(&mut events);
        self.resolve_captures(&mut events);
        self.resolve_rescue_completion(&mut events);
        self.carry_flags();

        self.player.enforce(&mut self.agents, &mut events);
        self.clock += dt;

        if let Some(outcome) = self.rules.evaluate(&self.score, &self.agents, self.clock) {
            self.finish(outcome, &mut events);
        }
        events
    }

    // =========================================================================
    // == Movement ==
    // =========================================================================

    fn steer_and_move(&mut self, dt: f64, input: &PlayerInput, rng: &mut dyn RngCore) {
        let snapshots: Vec<AgentSnapshot> = self.agents.iter().map(AgentSnapshot::from).collect();
        let view = ArenaView {
            field: &self.field,
            agents: &snapshots,
            flags: &self.flags,
            prisons: &self.prisons,
            clock: self.clock,
            home_depth: self.rules.home_depth,
        };

        for (agent, me) in self.agents.iter_mut().zip(snapshots.iter()) {
            let steering = match agent.state {
                AgentState::MovingToPrison(spot) => Steering::Toward(spot),
                AgentState::InPrison => Steering::Hold,
                AgentState::UnderRescue(rescuer) => match view.agent(rescuer) {
                    Some(r) => Steering::Toward(r.position),
                    None => Steering::Hold,
                },
                _ if agent.is_player_controlled() => Steering::Heading(input.axis),
                _ => {
                    let decision = if agent.carrying.is_some() || agent.escorting.is_some() {
                        agent.brain.return_home(me, &view, dt, rng)
                    } else {
                        agent.brain.decide(me, &view, dt, rng)
                    };
                    if decision.state.is_locked() {
                        tracing::warn!(
                            "{}: brain '{}' asked for locked state {}, ignoring",
                            agent.name,
                            agent.brain.label(),
                            decision.state
                        );
                        agent.transition(AgentState::Idle);
                    } else {
                        agent.transition(decision.state);
                    }
                    decision.steering
                }
            };

            let next = match steering {
                Steering::Hold => agent.position,
                Steering::Toward(target) => move_towards(&agent.position, &target, agent.speed * dt),
                Steering::Heading(heading) => step_heading(&agent.position, &heading, agent.speed, dt),
            };
            agent.position = self.field.bounds.clamp(&next);
        }
    }

    fn carry_flags(&mut self) {
        for flag in &mut self.flags {
            if let Some(carrier) = flag.carrier() {
                if let Some(agent) = self.agents.iter().find(|a| a.handle == carrier) {
                    flag.follow(agent.position);
                }
            }
        }
    }

    fn check_prison_arrivals(&mut self, events: &mut Vec<GameEvent>) {
        let tolerance = self.rules.arrival_tolerance;
        for agent in &mut self.agents {
            if let AgentState::MovingToPrison(spot) = agent.state {
                if nalgebra::distance(&agent.position, &spot) <= tolerance {
                    agent.position = spot;
                    agent.transition(AgentState::InPrison);
                    events.push(GameEvent::Imprisoned {
                        agent: agent.handle,
                    });
                }
            }
        }
    }

    // =========================================================================
    // == Contacts ==
    // =========================================================================

    /// Opponents in contact: whoever stands on enemy soil while the other
    /// is at home gets sent to prison.
    fn resolve_tags(&mut self, rng: &mut dyn RngCore, events: &mut Vec<GameEvent>) {
        let n = self.agents.len();
        for i in 0..n {
            for j in (i + 1)..n {
                let (a, b) = (&self.agents[i], &self.agents[j]);
                if a.team == b.team || !a.is_taggable() || !b.is_taggable() {
                    continue;
                }
                if nalgebra::distance(&a.position, &b.position) > self.rules.tag_radius {
                    continue;
                }
                let a_invades = self.field.in_enemy_territory(a.team, &a.position)
                    && self.field.in_own_territory(b.team, &b.position);
                let b_invades = self.field.in_enemy_territory(b.team, &b.position)
                    && self.field.in_own_territory(a.team, &a.position);

                let (tagger, tagged) = if a_invades {
                    (b.handle, a.handle)
                } else if b_invades {
                    (a.handle, b.handle)
                } else {
                    continue;
                };
                self.send_to_prison(tagged, Some(tagger), rng, events);
            }
        }
    }

    fn send_to_prison(
        &mut self,
        handle: AgentHandle,
        tagger: Option<AgentHandle>,
        rng: &mut dyn RngCore,
        events: &mut Vec<GameEvent>,
    ) {
        let Some(idx) = self.index_of(handle) else {
            return;
        };

        if self.player.selected() == Some(handle) {
            self.player.deselect(&mut self.agents, events);
        }

        if let Some(flag_handle) = self.agents[idx].carrying.take() {
            if let Some(flag) = self.flags.iter_mut().find(|f| f.handle == flag_handle) {
                flag.reset();
            }
            events.push(GameEvent::FlagDropped {
                agent: handle,
                flag: flag_handle,
            });
        }

        // A rescuee caught on the way out frees its rescuer from escort duty.
        if let AgentState::UnderRescue(rescuer) = self.agents[idx].state {
            if let Some(r) = self.agents.iter_mut().find(|a| a.handle == rescuer) {
                r.escorting = None;
                if r.state == AgentState::Escorting {
                    r.settle();
                }
            }
        }

        let escorted = self.agents[idx].escorting.take();
        let team = self.agents[idx].team;
        let spot = match self.prisons.iter().find(|p| p.team == team) {
            Some(prison) => prison.random_cell(rng),
            None => self.agents[idx].position,
        };

        let agent = &mut self.agents[idx];
        tracing::debug!(
            "{} tagged, going to prison at ({:.2}, {:.2})",
            agent.name,
            spot.x,
            spot.y
        );
        agent.transition(AgentState::MovingToPrison(spot));
        events.push(GameEvent::Tagged {
            tagger,
            tagged: handle,
            prison_spot: spot,
        });

        // Whoever was being led out goes straight back.
        if let Some(prisoner) = escorted {
            self.send_to_prison(prisoner, None, rng, events);
        }
    }

    fn resolve_rescues(&mut self, events: &mut Vec<GameEvent>) {
        let n = self.agents.len();
        for i in 0..n {
            for j in 0..n {
                if i == j {
                    continue;
                }
                let (rescuer, prisoner) = (&self.agents[i], &self.agents[j]);
                if rescuer.team != prisoner.team
                    || prisoner.state != AgentState::InPrison
                    || !rescuer.can_take_objective()
                {
                    continue;
                }
                if nalgebra::distance(&rescuer.position, &prisoner.position) > self.rules.tag_radius
                {
                    continue;
                }

                let (rescuer_handle, prisoner_handle) = (rescuer.handle, prisoner.handle);
                let rescuer = &mut self.agents[i];
                rescuer.escorting = Some(prisoner_handle);
                if !rescuer.is_player_controlled() {
                    rescuer.transition(AgentState::Escorting);
                }
                self.agents[j].transition(AgentState::UnderRescue(rescuer_handle));
                events.push(GameEvent::RescueStarted {
                    rescuer: rescuer_handle,
                    prisoner: prisoner_handle,
                });
            }
        }
    }

    fn resolve_pickups(&mut self, events: &mut Vec<GameEvent>) {
        let radius = self.rules.pickup_radius;
        for agent in &mut self.agents {
            if !agent.can_take_objective() {
                continue;
            }
            let Some(flag) = self.flags.iter_mut().find(|f| {
                f.team != agent.team
                    && f.is_at_base()
                    && nalgebra::distance(&f.position, &agent.position) <= radius
            }) else {
                continue;
            };

            flag.attach(agent.handle, agent.position);
            agent.carrying = Some(flag.handle);
            if !agent.is_player_controlled() {
                agent.transition(AgentState::ReturningFlag);
            }
            events.push(GameEvent::FlagPickedUp {
                agent: agent.handle,
                flag: flag.handle,
            });
        }
    }

    fn resolve_captures(&mut self, events: &mut Vec<GameEvent>) {
        for agent in &mut self.agents {
            let Some(flag_handle) = agent.carrying else {
                continue;
            };
            if !self.field.in_own_territory(agent.team, &agent.position) {
                continue;
            }

            agent.carrying = None;
            if let Some(flag) = self.flags.iter_mut().find(|f| f.handle == flag_handle) {
                flag.mark_captured();
            }
            let total = self.score.award(agent.team);
            tracing::debug!("{} captured {} ({} total for {})", agent.name, flag_handle, total, agent.team);
            if agent.escorting.is_none() {
                agent.settle();
            }
            events.push(GameEvent::FlagCaptured {
                agent: agent.handle,
                flag: flag_handle,
                team: agent.team,
                score: self.score,
            });
        }
    }

    fn resolve_rescue_completion(&mut self, events: &mut Vec<GameEvent>) {
        for j in 0..self.agents.len() {
            let AgentState::UnderRescue(rescuer) = self.agents[j].state else {
                continue;
            };
            let freed = &self.agents[j];
            if !self.field.in_own_territory(freed.team, &freed.position) {
                continue;
            }

            let freed_handle = freed.handle;
            self.agents[j].transition(AgentState::Idle);
            if let Some(r) = self.agents.iter_mut().find(|a| a.handle == rescuer) {
                if r.escorting == Some(freed_handle) {
                    r.escorting = None;
                    if r.state == AgentState::Escorting {
                        r.settle();
                    }
                }
            }
            events.push(GameEvent::Freed {
                agent: freed_handle,
                rescuer: Some(rescuer),
            });
        }
    }

    // =========================================================================
    // == End of match ==
    // =========================================================================

    fn finish(&mut self, outcome: MatchOutcome, events: &mut Vec<GameEvent>) {
        tracing::debug!("match over after {:.2}s: {} ({})", self.clock, outcome, self.score);
        self.player.deselect(&mut self.agents, events);
        self.outcome = Some(outcome);
        events.push(GameEvent::MatchEnded {
            outcome,
            score: self.score,
            clock: self.clock,
        });
    }

    fn index_of(&self, handle: AgentHandle) -> Option<usize> {
        self.agents.iter().position(|a| a.handle == handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::Control;
    use crate::brain::{Brain, Decision, Defender, Raider, Sentry};
    use crate::flag::FlagStatus;
    use crate::geometry::Bounds;
    use crate::rules::WinReason;
    use crate::setup::{AgentSpec, ArenaBuilder};
    use crate::types::{Point2, Side, Vec2};
    use approx::assert_abs_diff_eq;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    const DT: f64 = 0.1;

    /// Never moves on its own. Keeps the tests in control of positions.
    #[derive(Debug, Clone)]
    struct Statue;

    impl Brain for Statue {
        fn label(&self) -> &'static str {
            "statue"
        }

        fn decide(
            &mut self,
            _me: &AgentSnapshot,
            _view: &ArenaView,
            _dt: f64,
            _rng: &mut dyn RngCore,
        ) -> Decision {
            Decision::hold(AgentState::Idle)
        }
    }

    fn field() -> Field {
        Field::new(
            Bounds::from_corners(Point2::new(-10.0, -5.0), Point2::new(10.0, 5.0)),
            0.0,
            Side::East,
        )
    }

    fn red_prison() -> Bounds {
        Bounds::from_corners(Point2::new(-9.0, -4.0), Point2::new(-7.0, -2.0))
    }

    fn builder() -> ArenaBuilder {
        ArenaBuilder::new(field())
            .prison(Team::Red, red_prison())
            .prison(
                Team::Blue,
                Bounds::from_corners(Point2::new(7.0, 2.0), Point2::new(9.0, 4.0)),
            )
    }

    fn statue(name: &str, team: Team, x: f64, y: f64) -> AgentSpec {
        AgentSpec::new(name, team, Point2::new(x, y), 5.0, Box::new(Statue))
    }

    fn run(arena: &mut Arena, steps: usize, rng: &mut ChaCha8Rng) -> Vec<GameEvent> {
        let mut all = Vec::new();
        for _ in 0..steps {
            all.extend(arena.step(DT, &PlayerInput::idle(), rng));
        }
        all
    }

    fn handle(arena: &Arena, name: &str) -> AgentHandle {
        arena.agent_by_name(name).unwrap().handle
    }

    #[test]
    fn carrier_scores_on_crossing_home() {
        let mut arena = builder()
            .flag("blue_flag", Team::Blue, Point2::new(-3.0, 0.0))
            .agent(statue("red", Team::Red, -3.0, 0.0))
            .agent(statue("blue", Team::Blue, -9.0, 4.5))
            .build()
            .unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let red = handle(&arena, "red");

        let first = arena.step(DT, &PlayerInput::idle(), &mut rng);
        assert_eq!(
            first,
            vec![GameEvent::FlagPickedUp {
                agent: red,
                flag: FlagHandle(0)
            }]
        );
        assert_eq!(arena.agent(red).unwrap().state, AgentState::ReturningFlag);

        let events = run(&mut arena, 20, &mut rng);
        assert!(events
            .iter()
            .any(|e| matches!(e, GameEvent::FlagCaptured { team: Team::Red, .. })));
        assert_eq!(arena.score().red, 1);
        assert_eq!(arena.flags()[0].status, FlagStatus::Captured);
        let red_agent = arena.agent(red).unwrap();
        assert_eq!(red_agent.carrying, None);
        assert_eq!(red_agent.state, AgentState::Idle);
        assert!(arena.field().in_own_territory(Team::Red, &red_agent.position));
    }

    #[test]
    fn invader_is_tagged_and_jailed() {
        let mut arena = builder()
            .agent(statue("red", Team::Red, -2.0, 0.0))
            .agent(statue("blue", Team::Blue, -2.3, 0.0))
            .build()
            .unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let (red, blue) = (handle(&arena, "red"), handle(&arena, "blue"));

        let events = arena.step(DT, &PlayerInput::idle(), &mut rng);
        let spot = match arena.agent(red).unwrap().state {
            AgentState::MovingToPrison(spot) => spot,
            other => panic!("expected MovingToPrison, got {other}"),
        };
        assert!(red_prison().contains(&spot));
        assert_eq!(
            events,
            vec![GameEvent::Tagged {
                tagger: Some(blue),
                tagged: red,
                prison_spot: spot
            }]
        );
        assert!(arena.agent(blue).unwrap().is_free());

        let events = run(&mut arena, 30, &mut rng);
        assert!(events.contains(&GameEvent::Imprisoned { agent: red }));
        let red_agent = arena.agent(red).unwrap();
        assert_eq!(red_agent.state, AgentState::InPrison);
        assert_eq!(red_agent.position, spot);

        // The only Red agent is locked up: Blue wins and the arena freezes.
        assert_eq!(
            arena.outcome(),
            Some(MatchOutcome::winner(Team::Blue, WinReason::AllOpponentsImprisoned))
        );
        let clock = arena.clock();
        assert!(arena.step(DT, &PlayerInput::idle(), &mut rng).is_empty());
        assert_abs_diff_eq!(arena.clock(), clock);
    }

    #[test]
    fn no_tag_on_the_center_line() {
        let mut arena = builder()
            .agent(statue("red", Team::Red, 0.0, 0.0))
            .agent(statue("blue", Team::Blue, 0.3, 0.0))
            .build()
            .unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        assert!(arena.step(DT, &PlayerInput::idle(), &mut rng).is_empty());
        assert!(arena.agents().iter().all(|a| a.is_free()));
    }

    #[test]
    fn tagged_carrier_drops_the_flag() {
        let mut arena = builder()
            .flag("blue_flag", Team::Blue, Point2::new(-2.0, 0.0))
            .agent(statue("red", Team::Red, -2.0, 0.0))
            .agent(statue("blue", Team::Blue, -9.0, 4.5))
            .build()
            .unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let (red, blue) = (handle(&arena, "red"), handle(&arena, "blue"));

        arena.step(DT, &PlayerInput::idle(), &mut rng);
        assert_eq!(arena.flags()[0].carrier(), Some(red));

        // The carrier moves half a unit home this tick, straight into the defender.
        arena.agent_mut(blue).unwrap().position = Point2::new(-1.5, 0.2);
        let events = arena.step(DT, &PlayerInput::idle(), &mut rng);
        assert!(events.contains(&GameEvent::FlagDropped {
            agent: red,
            flag: FlagHandle(0)
        }));
        let flag = &arena.flags()[0];
        assert!(flag.is_at_base());
        assert_eq!(flag.position, Point2::new(-2.0, 0.0));
        assert_eq!(arena.agent(red).unwrap().carrying, None);
    }

    fn rescue_setup() -> (Arena, AgentHandle, AgentHandle, AgentHandle) {
        let mut arena = builder()
            .agent(statue("rescuer", Team::Red, -8.0, -2.7))
            .agent(statue("prisoner", Team::Red, -8.0, -3.0))
            .agent(statue("blue", Team::Blue, -9.0, 4.5))
            .build()
            .unwrap();
        let rescuer = handle(&arena, "rescuer");
        let prisoner = handle(&arena, "prisoner");
        let blue = handle(&arena, "blue");
        arena.agent_mut(prisoner).unwrap().state = AgentState::InPrison;
        (arena, rescuer, prisoner, blue)
    }

    #[test]
    fn rescue_escorts_prisoner_home() {
        let (mut arena, rescuer, prisoner, _) = rescue_setup();
        let mut rng = ChaCha8Rng::seed_from_u64(5);

        let events = arena.step(DT, &PlayerInput::idle(), &mut rng);
        assert_eq!(events, vec![GameEvent::RescueStarted { rescuer, prisoner }]);
        assert_eq!(arena.agent(rescuer).unwrap().state, AgentState::Escorting);
        assert_eq!(
            arena.agent(prisoner).unwrap().state,
            AgentState::UnderRescue(rescuer)
        );

        let events = run(&mut arena, 60, &mut rng);
        assert!(events.contains(&GameEvent::Freed {
            agent: prisoner,
            rescuer: Some(rescuer)
        }));
        let freed = arena.agent(prisoner).unwrap();
        assert_eq!(freed.state, AgentState::Idle);
        assert!(arena.field().in_own_territory(Team::Red, &freed.position));
        let r = arena.agent(rescuer).unwrap();
        assert_eq!(r.escorting, None);
        assert_eq!(r.state, AgentState::Idle);
    }

    #[test]
    fn tagging_the_rescuer_sends_both_back() {
        let (mut arena, rescuer, prisoner, blue) = rescue_setup();
        let mut rng = ChaCha8Rng::seed_from_u64(6);
        arena.step(DT, &PlayerInput::idle(), &mut rng);

        // The rescuer advances half a unit toward home and meets the defender.
        let ahead = arena.agent(rescuer).unwrap().position + Vec2::new(0.5, 0.0);
        arena.agent_mut(blue).unwrap().position = ahead;
        let events = arena.step(DT, &PlayerInput::idle(), &mut rng);

        let tags: Vec<_> = events
            .iter()
            .filter_map(|e| match e {
                GameEvent::Tagged { tagger, tagged, .. } => Some((*tagger, *tagged)),
                _ => None,
            })
            .collect();
        assert_eq!(tags, vec![(Some(blue), rescuer), (None, prisoner)]);
        assert!(arena.agent(rescuer).unwrap().is_confined());
        assert!(arena.agent(prisoner).unwrap().is_confined());
        assert_eq!(arena.agent(rescuer).unwrap().escorting, None);
    }

    #[test]
    fn tagging_the_rescuee_releases_the_rescuer() {
        let (mut arena, rescuer, prisoner, blue) = rescue_setup();
        let mut rng = ChaCha8Rng::seed_from_u64(8);
        arena.step(DT, &PlayerInput::idle(), &mut rng);

        // The prisoner catches up with where the rescuer stood; the defender
        // waits just behind that spot, out of the rescuer's reach.
        let behind = arena.agent(rescuer).unwrap().position - Vec2::new(0.3, 0.0);
        arena.agent_mut(blue).unwrap().position = behind;
        let events = arena.step(DT, &PlayerInput::idle(), &mut rng);

        assert!(events.iter().any(|e| matches!(
            e,
            GameEvent::Tagged { tagger: Some(t), tagged, .. } if *t == blue && *tagged == prisoner
        )));
        assert!(arena.agent(prisoner).unwrap().is_confined());
        let r = arena.agent(rescuer).unwrap();
        assert_eq!(r.escorting, None);
        assert_eq!(r.state, AgentState::Idle);
        assert!(r.is_free());
    }

    /// Asks for a state only the arena may assign.
    #[derive(Debug, Clone)]
    struct Jailbird;

    impl Brain for Jailbird {
        fn label(&self) -> &'static str {
            "jailbird"
        }

        fn decide(
            &mut self,
            _me: &AgentSnapshot,
            _view: &ArenaView,
            _dt: f64,
            _rng: &mut dyn RngCore,
        ) -> Decision {
            Decision::hold(AgentState::InPrison)
        }
    }

    #[test]
    fn brains_cannot_pick_locked_states() {
        let mut arena = builder()
            .agent(AgentSpec::new(
                "red",
                Team::Red,
                Point2::new(4.0, 0.0),
                5.0,
                Box::new(Jailbird),
            ))
            .agent(statue("blue", Team::Blue, -4.0, 0.0))
            .build()
            .unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let red = handle(&arena, "red");

        let events = run(&mut arena, 3, &mut rng);
        assert!(events.is_empty());
        let agent = arena.agent(red).unwrap();
        assert_eq!(agent.state, AgentState::Idle);
        assert!(agent.is_free());
        assert_eq!(arena.outcome(), None);
    }

    #[test]
    fn player_steers_and_loses_control_when_tagged() {
        let mut arena = builder()
            .agent(statue("red_1", Team::Red, -1.0, 0.0))
            .agent(statue("red_2", Team::Red, 5.0, 0.0))
            .agent(statue("blue", Team::Blue, -1.8, 0.0))
            .roster(vec!["red_1".to_string(), "red_2".to_string()])
            .build()
            .unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let red = handle(&arena, "red_1");

        let input = PlayerInput {
            select: Some(0),
            deselect: false,
            axis: Vec2::new(-1.0, 0.0),
        };
        let events = arena.step(DT, &input, &mut rng);

        assert_eq!(events[0], GameEvent::AgentSelected { agent: red });
        assert!(events.contains(&GameEvent::ControlReleased { agent: red }));
        assert!(events
            .iter()
            .any(|e| matches!(e, GameEvent::Tagged { tagged, .. } if *tagged == red)));
        assert_eq!(arena.player().selected(), None);
        let agent = arena.agent(red).unwrap();
        assert_eq!(agent.control, Control::Ai);
        assert!(agent.is_confined());
    }

    #[test]
    fn player_moves_with_axis() {
        let mut arena = builder()
            .agent(statue("red", Team::Red, 5.0, 0.0))
            .agent(statue("blue", Team::Blue, -5.0, 0.0))
            .roster(vec!["red".to_string()])
            .build()
            .unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(8);
        let red = handle(&arena, "red");

        arena.step(
            DT,
            &PlayerInput {
                select: Some(0),
                ..PlayerInput::idle()
            },
            &mut rng,
        );
        for _ in 0..4 {
            arena.step(DT, &PlayerInput::moving(Vec2::new(0.0, 1.0)), &mut rng);
        }
        let agent = arena.agent(red).unwrap();
        assert_eq!(agent.state, AgentState::Controlled);
        assert_abs_diff_eq!(agent.position.y, 2.0, epsilon = 1e-9);

        // The field edge stops the agent.
        for _ in 0..20 {
            arena.step(DT, &PlayerInput::moving(Vec2::new(0.0, 1.0)), &mut rng);
        }
        assert_abs_diff_eq!(arena.agent(red).unwrap().position.y, 5.0, epsilon = 1e-9);
    }

    #[test]
    fn restart_restores_the_line_up() {
        let mut arena = builder()
            .flag("blue_flag", Team::Blue, Point2::new(-3.0, 0.0))
            .agent(statue("red", Team::Red, -3.0, 0.0))
            .agent(statue("blue", Team::Blue, -9.0, 4.5))
            .build()
            .unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        run(&mut arena, 20, &mut rng);
        assert_eq!(arena.score().red, 1);

        arena.restart();
        assert_eq!(arena.score(), Scoreboard::default());
        assert_abs_diff_eq!(arena.clock(), 0.0);
        assert!(arena.flags()[0].is_at_base());
        assert_eq!(
            arena.agent_by_name("red").unwrap().position,
            Point2::new(-3.0, 0.0)
        );
    }

    fn skirmish() -> Arena {
        let raider = |name: &str, team: Team, x: f64, y: f64| {
            AgentSpec::new(name, team, Point2::new(x, y), 4.0, Box::new(Raider::default()))
        };
        let sentry = |name: &str, team: Team, x: f64, y: f64| {
            AgentSpec::new(name, team, Point2::new(x, y), 3.5, Box::new(Sentry::default()))
        };
        let defender = |name: &str, team: Team, x: f64, y: f64| {
            AgentSpec::new(
                name,
                team,
                Point2::new(x, y),
                3.0,
                Box::new(Defender::with_post(Point2::new(x, y))),
            )
        };
        builder()
            .rules(MatchRules {
                time_limit: Some(60.0),
                ..MatchRules::default()
            })
            .flag("red_a", Team::Red, Point2::new(8.5, 0.0))
            .flag("red_b", Team::Red, Point2::new(6.0, -4.0))
            .flag("blue_a", Team::Blue, Point2::new(-8.5, 0.0))
            .flag("blue_b", Team::Blue, Point2::new(-6.0, 4.0))
            .agent(raider("red_raider", Team::Red, 4.0, 1.0))
            .agent(sentry("red_sentry", Team::Red, 3.0, -1.0))
            .agent(defender("red_guard", Team::Red, 6.0, 0.0))
            .agent(raider("blue_raider", Team::Blue, -4.0, -1.0))
            .agent(sentry("blue_sentry", Team::Blue, -3.0, 1.0))
            .agent(defender("blue_guard", Team::Blue, -6.0, 0.0))
            .build()
            .unwrap()
    }

    #[test]
    fn same_seed_same_match() {
        let mut a = skirmish();
        let mut b = skirmish();
        let mut rng_a = ChaCha8Rng::seed_from_u64(11);
        let mut rng_b = ChaCha8Rng::seed_from_u64(11);

        let events_a = run(&mut a, 700, &mut rng_a);
        let events_b = run(&mut b, 700, &mut rng_b);

        assert_eq!(events_a, events_b);
        assert_eq!(a.score(), b.score());
        for (x, y) in a.agents().iter().zip(b.agents()) {
            assert_eq!(x.position, y.position);
            assert_eq!(x.state, y.state);
        }
        // The time limit guarantees the match is decided one way or another.
        assert!(a.is_over());
        assert!(events_a
            .iter()
            .any(|e| matches!(e, GameEvent::MatchEnded { .. })));
    }

    #[test]
    fn skirmish_keeps_invariants() {
        let mut arena = skirmish();
        let mut rng = ChaCha8Rng::seed_from_u64(23);
        for _ in 0..700 {
            arena.step(DT, &PlayerInput::idle(), &mut rng);
            for agent in arena.agents() {
                assert!(arena.field().bounds.contains(&agent.position));
                if let Some(flag) = agent.carrying {
                    assert_eq!(arena.flag(flag).unwrap().carrier(), Some(agent.handle));
                    assert!(!agent.is_confined());
                }
                if agent.state == AgentState::InPrison {
                    let prison = arena.prison_for(agent.team).unwrap();
                    assert!(prison.bounds.contains(&agent.position));
                }
            }
            for flag in arena.flags() {
                if let Some(carrier) = flag.carrier() {
                    assert_eq!(arena.agent(carrier).unwrap().carrying, Some(flag.handle));
                }
            }
        }
    }
}
