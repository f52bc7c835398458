// ctf_core/src/setup.rs

//! Validated construction of an `Arena`.

use std::collections::HashSet;

use crate::agent::Agent;
use crate::arena::Arena;
use crate::brain::Brain;
use crate::error::SetupError;
use crate::field::Field;
use crate::flag::Flag;
use crate::geometry::Bounds;
use crate::player::PlayerController;
use crate::prison::Prison;
use crate::rules::MatchRules;
use crate::types::{AgentHandle, FlagHandle, Point2, Team};

/// Everything needed to place one agent on the field.
#[derive(Debug, Clone)]
pub struct AgentSpec {
    pub name: String,
    pub team: Team,
    pub position: Point2,
    pub speed: f64,
    pub brain: Box<dyn Brain>,
}

impl AgentSpec {
    pub fn new(
        name: impl Into<String>,
        team: Team,
        position: Point2,
        speed: f64,
        brain: Box<dyn Brain>,
    ) -> Self {
        Self {
            name: name.into(),
            team,
            position,
            speed,
            brain,
        }
    }
}

#[derive(Debug, Clone)]
struct FlagSpec {
    name: String,
    team: Team,
    position: Point2,
}

/// Collects the parts of a match and checks them in `build`.
#[derive(Debug, Clone)]
pub struct ArenaBuilder {
    field: Field,
    rules: MatchRules,
    prisons: Vec<Prison>,
    flags: Vec<FlagSpec>,
    agents: Vec<AgentSpec>,
    roster: Vec<String>,
}

impl ArenaBuilder {
    pub fn new(field: Field) -> Self {
        Self {
            field,
            rules: MatchRules::default(),
            prisons: Vec::new(),
            flags: Vec::new(),
            agents: Vec::new(),
            roster: Vec::new(),
        }
    }

    pub fn rules(mut self, rules: MatchRules) -> Self {
        self.rules = rules;
        self
    }

    /// The zone confining tagged agents of `team`.
    pub fn prison(mut self, team: Team, bounds: Bounds) -> Self {
        self.prisons.push(Prison::new(team, bounds));
        self
    }

    pub fn flag(mut self, name: impl Into<String>, team: Team, position: Point2) -> Self {
        self.flags.push(FlagSpec {
            name: name.into(),
            team,
            position,
        });
        self
    }

    pub fn agent(mut self, spec: AgentSpec) -> Self {
        self.agents.push(spec);
        self
    }

    /// Names of the agents the player may take over, in slot order.
    pub fn roster(mut self, names: Vec<String>) -> Self {
        self.roster = names;
        self
    }

    pub fn build(self) -> Result<Arena, SetupError> {
        let Self {
            field,
            rules,
            prisons,
            flags,
            agents,
            roster,
        } = self;

        rules.validate()?;
        Bounds::new(field.bounds.min, field.bounds.max)?;
        if field.center_x <= field.bounds.min.x || field.center_x >= field.bounds.max.x {
            return Err(SetupError::CenterLineOutside(field.center_x));
        }

        for team in Team::ALL {
            let count = prisons.iter().filter(|p| p.team == team).count();
            match count {
                0 => return Err(SetupError::MissingPrison(team)),
                1 => {}
                _ => return Err(SetupError::DuplicatePrison(team)),
            }
        }
        for prison in &prisons {
            Bounds::new(prison.bounds.min, prison.bounds.max)?;
            if !field.bounds.contains_bounds(&prison.bounds) {
                return Err(SetupError::OutsideField {
                    what: "prison",
                    name: prison.team.to_string(),
                });
            }
        }

        for spec in &flags {
            if !field.bounds.contains(&spec.position) {
                return Err(SetupError::OutsideField {
                    what: "flag",
                    name: spec.name.clone(),
                });
            }
            if !field.in_own_territory(spec.team, &spec.position) {
                return Err(SetupError::FlagOutsideTerritory {
                    name: spec.name.clone(),
                    team: spec.team,
                });
            }
        }

        let mut names = HashSet::new();
        for spec in &agents {
            if !names.insert(spec.name.as_str()) {
                return Err(SetupError::DuplicateAgent(spec.name.clone()));
            }
            if spec.speed <= 0.0 || !spec.speed.is_finite() {
                return Err(SetupError::InvalidSpeed {
                    name: spec.name.clone(),
                    speed: spec.speed,
                });
            }
            if !field.bounds.contains(&spec.position) {
                return Err(SetupError::OutsideField {
                    what: "agent",
                    name: spec.name.clone(),
                });
            }
        }
        for team in Team::ALL {
            if !agents.iter().any(|a| a.team == team) {
                return Err(SetupError::EmptyTeam(team));
            }
        }

        let agents: Vec<Agent> = agents
            .into_iter()
            .enumerate()
            .map(|(i, spec)| {
                Agent::new(
                    AgentHandle(i as u64),
                    spec.name,
                    spec.team,
                    spec.position,
                    spec.speed,
                    spec.brain,
                )
            })
            .collect();

        let mut roster_handles = Vec::with_capacity(roster.len());
        let mut roster_team = None;
        for name in roster {
            let agent = agents
                .iter()
                .find(|a| a.name == name)
                .ok_or_else(|| SetupError::UnknownRosterAgent(name.clone()))?;
            let team = *roster_team.get_or_insert(agent.team);
            if agent.team != team {
                return Err(SetupError::MixedRoster(name, team));
            }
            roster_handles.push(agent.handle);
        }

        let flags: Vec<Flag> = flags
            .into_iter()
            .enumerate()
            .map(|(i, spec)| Flag::new(FlagHandle(i as u64), spec.name, spec.team, spec.position))
            .collect();

        tracing::debug!(
            "arena ready: {} agents, {} flags, roster of {}",
            agents.len(),
            flags.len(),
            roster_handles.len()
        );

        Ok(Arena::from_parts(
            field,
            rules,
            prisons,
            agents,
            flags,
            PlayerController::new(roster_handles),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::brain::{Defender, Raider};
    use crate::types::Side;

    fn field() -> Field {
        Field::new(
            Bounds::from_corners(Point2::new(-10.0, -5.0), Point2::new(10.0, 5.0)),
            0.0,
            Side::East,
        )
    }

    fn spec(name: &str, team: Team, x: f64) -> AgentSpec {
        AgentSpec::new(name, team, Point2::new(x, 0.0), 5.0, Box::new(Defender::default()))
    }

    fn base() -> ArenaBuilder {
        ArenaBuilder::new(field())
            .prison(
                Team::Red,
                Bounds::from_corners(Point2::new(-9.0, -4.0), Point2::new(-7.0, -2.0)),
            )
            .prison(
                Team::Blue,
                Bounds::from_corners(Point2::new(7.0, 2.0), Point2::new(9.0, 4.0)),
            )
            .agent(spec("red_1", Team::Red, 3.0))
            .agent(spec("blue_1", Team::Blue, -3.0))
    }

    #[test]
    fn builds_a_valid_arena() {
        let arena = base()
            .flag("red_flag", Team::Red, Point2::new(8.0, 0.0))
            .agent(AgentSpec::new(
                "red_2",
                Team::Red,
                Point2::new(4.0, 1.0),
                4.0,
                Box::new(Raider::default()),
            ))
            .roster(vec!["red_2".into(), "red_1".into()])
            .build()
            .unwrap();

        assert_eq!(arena.agents().len(), 3);
        assert_eq!(arena.agents()[2].handle, AgentHandle(2));
        assert_eq!(arena.agents()[2].brain.label(), "raider");
        assert_eq!(arena.flags()[0].handle, FlagHandle(0));
        assert_eq!(arena.player().roster(), &[AgentHandle(2), AgentHandle(0)]);
        assert!(!arena.is_over());
    }

    #[test]
    fn every_team_needs_agents_and_a_prison() {
        let err = ArenaBuilder::new(field())
            .prison(Team::Red, Bounds::from_corners(Point2::new(-9.0, -4.0), Point2::new(-7.0, -2.0)))
            .prison(Team::Blue, Bounds::from_corners(Point2::new(7.0, 2.0), Point2::new(9.0, 4.0)))
            .agent(spec("red_1", Team::Red, 3.0))
            .build()
            .unwrap_err();
        assert_eq!(err, SetupError::EmptyTeam(Team::Blue));

        let err = ArenaBuilder::new(field())
            .prison(Team::Red, Bounds::from_corners(Point2::new(-9.0, -4.0), Point2::new(-7.0, -2.0)))
            .agent(spec("red_1", Team::Red, 3.0))
            .agent(spec("blue_1", Team::Blue, -3.0))
            .build()
            .unwrap_err();
        assert_eq!(err, SetupError::MissingPrison(Team::Blue));
    }

    #[test]
    fn flags_start_at_home() {
        let err = base()
            .flag("stray", Team::Blue, Point2::new(2.0, 0.0))
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            SetupError::FlagOutsideTerritory {
                name: "stray".into(),
                team: Team::Blue
            }
        );

        let err = base()
            .flag("lost", Team::Blue, Point2::new(-20.0, 0.0))
            .build()
            .unwrap_err();
        assert!(matches!(err, SetupError::OutsideField { what: "flag", .. }));
    }

    #[test]
    fn rejects_bad_agents() {
        let err = base().agent(spec("red_1", Team::Red, 2.0)).build().unwrap_err();
        assert_eq!(err, SetupError::DuplicateAgent("red_1".into()));

        let mut slow = spec("slow", Team::Red, 2.0);
        slow.speed = 0.0;
        let err = base().agent(slow).build().unwrap_err();
        assert!(matches!(err, SetupError::InvalidSpeed { .. }));

        let err = base().agent(spec("far", Team::Red, 11.0)).build().unwrap_err();
        assert!(matches!(err, SetupError::OutsideField { what: "agent", .. }));
    }

    #[test]
    fn roster_is_one_team_of_known_agents() {
        let err = base().roster(vec!["ghost".into()]).build().unwrap_err();
        assert_eq!(err, SetupError::UnknownRosterAgent("ghost".into()));

        let err = base()
            .roster(vec!["red_1".into(), "blue_1".into()])
            .build()
            .unwrap_err();
        assert_eq!(err, SetupError::MixedRoster("blue_1".into(), Team::Red));
    }

    #[test]
    fn centre_line_must_split_the_field() {
        let mut f = field();
        f.center_x = 10.0;
        let err = ArenaBuilder::new(f).build().unwrap_err();
        assert_eq!(err, SetupError::CenterLineOutside(10.0));
    }
}
