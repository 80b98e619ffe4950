//! Integration tests for ev-sim.

use ev_agent::{Pedestrian, Population};
use ev_behavior::{BehaviorModel, FloorFieldBehavior, MoveIntent, Route, TickContext};
use ev_core::{AgentRng, EvacConfig, Position, Tick};
use ev_field::PreferenceMatrix;
use ev_grid::Frame;

use crate::{RunSummary, SimObserver, TickStats};

// ── Helpers ───────────────────────────────────────────────────────────────────

fn open_config(size: i32, exits: Vec<Position>) -> EvacConfig {
    EvacConfig {
        max_ticks: Some(1_000),
        ..EvacConfig::open_floor(size, size, exits)
    }
}

/// All weight straight ahead, steeply tilted: agents walk their route.
fn straight_ahead() -> FloorFieldBehavior {
    FloorFieldBehavior::new(PreferenceMatrix::new([[0.0, 1.0, 0.0], [0.0; 3], [0.0; 3]]), 50.0)
}

/// Proposes a step onto `0` whenever it is adjacent; otherwise stays.
struct Toward(Position);

impl BehaviorModel for Toward {
    fn decide(
        &self,
        ped:    &mut Pedestrian,
        _route: &Route,
        _ctx:   &TickContext<'_>,
        _rng:   &mut AgentRng,
    ) -> MoveIntent {
        ped.preferred_next = if ped.position.chebyshev(self.0) == 1 { self.0 } else { ped.position };
        ped.mass = 0.5;
        MoveIntent::from(&*ped)
    }
}

/// Records everything the sim reports.
#[derive(Default)]
struct Recorder {
    starts:      Vec<Tick>,
    stats:       Vec<TickStats>,
    frames:      Vec<Frame>,
    populations: Vec<usize>,
    summary:     Option<RunSummary>,
}

impl SimObserver for Recorder {
    fn on_tick_start(&mut self, tick: Tick) {
        self.starts.push(tick);
    }

    fn on_tick_end(&mut self, _tick: Tick, stats: &TickStats) {
        self.stats.push(*stats);
    }

    fn on_snapshot(&mut self, _tick: Tick, frame: &Frame, population: &Population) {
        self.frames.push(frame.clone());
        self.populations.push(population.len());
    }

    fn on_sim_end(&mut self, _final_tick: Tick, summary: &RunSummary) {
        self.summary = Some(summary.clone());
    }
}

// ── SimBuilder ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod builder_tests {
    use ev_behavior::FloorFieldBehavior;
    use ev_core::{AgentId, EvacConfig, Position};
    use ev_grid::{Grid, GridError};

    use super::open_config;
    use crate::{SimBuilder, SimError};

    #[test]
    fn default_scenario_places_all_agents() {
        let config = EvacConfig::default();
        let sim = SimBuilder::new(config.clone(), FloorFieldBehavior::from_config(&config))
            .build()
            .unwrap();
        assert_eq!(sim.population.len(), 100);
        assert_eq!(sim.grid.occupied_count(), 100);
        assert_eq!(sim.grid.exits().len(), 3);
        assert_eq!(sim.grid.rooms().len(), 3);
    }

    #[test]
    fn placement_is_seeded() {
        let config = open_config(12, vec![Position::new(11, 6)]);
        let a = SimBuilder::new(config.clone(), FloorFieldBehavior::default()).build().unwrap();
        let b = SimBuilder::new(config, FloorFieldBehavior::default()).build().unwrap();
        assert_eq!(a.population.positions(), b.population.positions());
    }

    #[test]
    fn explicit_agents_get_sequential_ids() {
        let sim = SimBuilder::new(open_config(5, vec![Position::new(4, 4)]), FloorFieldBehavior::default())
            .agents([Position::new(0, 0), Position::new(2, 3)])
            .build()
            .unwrap();
        let agents = sim.population.agents();
        assert_eq!(agents.len(), 2);
        assert_eq!(agents[1].id, AgentId(1));
        assert_eq!(agents[1].position, Position::new(2, 3));
        assert!(sim.grid.is_occupied(Position::new(2, 3)));
    }

    #[test]
    fn too_many_agents_fails_fast() {
        let config = EvacConfig {
            agent_count: 20,
            ..open_config(3, vec![Position::new(2, 2)])
        };
        let result = SimBuilder::new(config, FloorFieldBehavior::default()).build();
        assert!(matches!(
            result,
            Err(SimError::Grid(GridError::InsufficientCapacity { requested: 20, available: 8 }))
        ));
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = EvacConfig { decay: 2.0, ..open_config(5, vec![Position::new(4, 4)]) };
        let result = SimBuilder::new(config, FloorFieldBehavior::default()).build();
        assert!(matches!(result, Err(SimError::Config(_))));
    }

    #[test]
    fn agent_on_wall_is_rejected() {
        let config = open_config(5, vec![Position::new(4, 4)]);
        let mut grid = Grid::from_config(&config).unwrap();
        grid.add_walls(&[Position::new(2, 2)]).unwrap();
        let result = SimBuilder::new(config, FloorFieldBehavior::default())
            .grid(grid)
            .agents([Position::new(2, 2)])
            .build();
        assert!(matches!(result, Err(SimError::Grid(_))));
    }

    #[test]
    fn prepopulated_grid_is_rejected() {
        let config = open_config(5, vec![Position::new(4, 4)]);
        let mut grid = Grid::from_config(&config).unwrap();
        grid.place_agent(Position::new(1, 1)).unwrap();
        let result = SimBuilder::new(config, FloorFieldBehavior::default()).grid(grid).build();
        assert!(matches!(result, Err(SimError::Config(_))));
    }
}

// ── Conflict resolution ───────────────────────────────────────────────────────

#[cfg(test)]
mod conflict_tests {
    use std::collections::HashSet;

    use ev_behavior::MoveIntent;
    use ev_core::{AgentId, ConflictPolicy, Position, SimRng};

    use crate::conflict::{conflicting_groups, resolve};

    fn intent(id: u32, from: (i32, i32), to: (i32, i32), mass: f64) -> MoveIntent {
        MoveIntent { agent: AgentId(id), from: from.into(), to: to.into(), mass }
    }

    fn targets_unique(intents: &[MoveIntent]) -> bool {
        let set: HashSet<Position> = intents.iter().map(|i| i.to).collect();
        set.len() == intents.len()
    }

    #[test]
    fn two_contenders_one_winner() {
        for seed in 0..20 {
            let mut intents = vec![intent(0, (0, 0), (1, 1), 0.5), intent(1, (2, 2), (1, 1), 0.5)];
            let res = resolve(&mut intents, ConflictPolicy::MassWeighted, &mut SimRng::new(seed)).unwrap();

            assert_eq!(res.rounds, 1);
            assert_eq!(res.conflict_cells, 1);
            let winners = intents.iter().filter(|i| i.to == Position::new(1, 1)).count();
            assert_eq!(winners, 1);
            let loser = intents.iter().find(|i| i.to != Position::new(1, 1)).unwrap();
            assert!(loser.is_stay());
        }
    }

    #[test]
    fn mass_weights_the_draw() {
        for seed in 0..20 {
            let mut intents = vec![intent(0, (0, 0), (1, 1), 0.0), intent(1, (2, 2), (1, 1), 0.9)];
            resolve(&mut intents, ConflictPolicy::MassWeighted, &mut SimRng::new(seed)).unwrap();
            assert_eq!(intents[1].to, Position::new(1, 1));
            assert!(intents[0].is_stay());
        }
    }

    #[test]
    fn zero_mass_falls_back_to_uniform() {
        let mut wins = [0usize; 2];
        for seed in 0..200 {
            let mut intents = vec![intent(0, (0, 0), (1, 1), 0.0), intent(1, (2, 2), (1, 1), 0.0)];
            resolve(&mut intents, ConflictPolicy::MassWeighted, &mut SimRng::new(seed)).unwrap();
            assert!(targets_unique(&intents));
            let w = if intents[0].to == Position::new(1, 1) { 0 } else { 1 };
            wins[w] += 1;
        }
        assert!(wins[0] > 0 && wins[1] > 0, "both contenders should win sometimes: {wins:?}");
    }

    #[test]
    fn uniform_policy_ignores_mass() {
        let mut light_wins = 0;
        for seed in 0..200 {
            let mut intents = vec![intent(0, (0, 0), (1, 1), 0.0), intent(1, (2, 2), (1, 1), 1.0)];
            resolve(&mut intents, ConflictPolicy::Uniform, &mut SimRng::new(seed)).unwrap();
            if intents[0].to == Position::new(1, 1) {
                light_wins += 1;
            }
        }
        assert!(light_wins > 0);
    }

    #[test]
    fn staying_occupant_keeps_its_cell() {
        for seed in 0..20 {
            let mut intents = vec![intent(0, (1, 1), (1, 1), 0.0), intent(1, (0, 0), (1, 1), 1.0)];
            resolve(&mut intents, ConflictPolicy::MassWeighted, &mut SimRng::new(seed)).unwrap();
            assert!(intents.iter().all(MoveIntent::is_stay));
        }
    }

    #[test]
    fn cascade_resolves_to_unique_targets() {
        // 0 → 1's cell, 1 → (0,2), 2 → (0,2).  If 2 wins, 1 falls back onto
        // its own cell, which 0 still targets.
        for seed in 0..50 {
            let original = vec![
                intent(0, (0, 0), (0, 1), 0.3),
                intent(1, (0, 1), (0, 2), 0.3),
                intent(2, (1, 2), (0, 2), 0.3),
            ];
            let mut intents = original.clone();
            let res = resolve(&mut intents, ConflictPolicy::Uniform, &mut SimRng::new(seed)).unwrap();

            assert!(targets_unique(&intents));
            assert!((1..=2).contains(&res.rounds));
            for (after, before) in intents.iter().zip(&original) {
                assert!(after.to == before.to || after.is_stay());
            }
        }
    }

    #[test]
    fn resolution_is_idempotent() {
        let mut intents = vec![
            intent(0, (0, 0), (1, 1), 0.5),
            intent(1, (2, 2), (1, 1), 0.5),
            intent(2, (3, 3), (3, 4), 0.5),
        ];
        let mut rng = SimRng::new(3);
        resolve(&mut intents, ConflictPolicy::MassWeighted, &mut rng).unwrap();
        let settled = intents.clone();

        let again = resolve(&mut intents, ConflictPolicy::MassWeighted, &mut rng).unwrap();
        assert_eq!(again.rounds, 0);
        assert_eq!(intents, settled);
    }

    #[test]
    fn groups_are_sorted_by_cell() {
        let intents = vec![
            intent(0, (5, 5), (4, 4), 0.1),
            intent(1, (0, 0), (1, 1), 0.1),
            intent(2, (3, 3), (4, 4), 0.1),
            intent(3, (2, 2), (1, 1), 0.1),
            intent(4, (7, 7), (7, 8), 0.1),
        ];
        let groups = conflicting_groups(&intents);
        let cells: Vec<Position> = groups.iter().map(|(c, _)| *c).collect();
        assert_eq!(cells, vec![Position::new(1, 1), Position::new(4, 4)]);
        assert_eq!(groups[0].1, vec![1, 3]);
    }
}

// ── Running ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod run_tests {
    use ev_behavior::{FloorFieldBehavior, StayBehavior};
    use ev_core::{AgentId, CellState, ConflictPolicy, EvacConfig, Position, Tick};

    use super::{Recorder, Toward, open_config, straight_ahead};
    use crate::{NoopObserver, SimBuilder};

    #[test]
    fn single_agent_walks_straight_out() {
        let mut sim = SimBuilder::new(open_config(10, vec![Position::new(9, 5)]), straight_ahead())
            .agents([Position::new(0, 5)])
            .build()
            .unwrap();
        let mut rec = Recorder::default();
        let summary = sim.run(&mut rec).unwrap();

        assert!(summary.completed);
        assert_eq!(summary.ticks, 9);
        assert_eq!(summary.evacuation_ticks, vec![(AgentId(0), Tick(8))]);
        assert!(sim.population.is_empty());

        for (t, frame) in rec.frames.iter().enumerate().take(8) {
            assert_eq!(frame.tick, Tick(t as u64));
            assert_eq!(frame.get(t as i32 + 1, 5), Some(CellState::Occupied.code()));
        }
        let last = rec.frames.last().unwrap();
        assert_eq!(last.count(CellState::Occupied), 0);
        assert_eq!(last.get(9, 5), Some(CellState::Exit.code()));
    }

    #[test]
    fn observer_hooks_fire_once_per_tick() {
        let mut sim = SimBuilder::new(open_config(10, vec![Position::new(9, 5)]), straight_ahead())
            .agents([Position::new(0, 5)])
            .build()
            .unwrap();
        let mut rec = Recorder::default();
        let summary = sim.run(&mut rec).unwrap();

        let n = summary.ticks as usize;
        assert_eq!(rec.starts.len(), n);
        assert_eq!(rec.stats.len(), n);
        assert_eq!(rec.frames.len(), n);
        assert_eq!(rec.summary, Some(summary));
        assert_eq!(rec.stats.last().unwrap().evacuated, 1);
        assert_eq!(rec.stats.last().unwrap().remaining, 0);
    }

    #[test]
    fn run_ticks_steps_incrementally() {
        let mut sim = SimBuilder::new(open_config(10, vec![Position::new(9, 5)]), straight_ahead())
            .agents([Position::new(0, 5)])
            .build()
            .unwrap();
        assert_eq!(sim.run_ticks(3, &mut NoopObserver).unwrap(), 3);
        assert_eq!(sim.tick, Tick(3));
        assert_eq!(sim.population.agents()[0].position, Position::new(3, 5));

        // Only six more ticks are needed; the rest are skipped.
        assert_eq!(sim.run_ticks(100, &mut NoopObserver).unwrap(), 6);
        assert!(sim.is_finished());
    }

    #[test]
    fn trace_is_deposited_where_agents_leave() {
        let mut sim = SimBuilder::new(open_config(10, vec![Position::new(9, 5)]), straight_ahead())
            .agents([Position::new(0, 5)])
            .build()
            .unwrap();
        sim.run_ticks(1, &mut NoopObserver).unwrap();

        let left = sim.dynamic.get(Position::new(0, 5));
        let now = sim.dynamic.get(Position::new(1, 5));
        assert!(left > now, "departed cell {left} vs current cell {now}");
        assert!(now > 0.0, "diffusion spreads to the neighbour");
    }

    #[test]
    fn contested_cell_goes_to_exactly_one_agent() {
        let target = Position::new(1, 1);
        let starts = [Position::new(0, 0), Position::new(2, 2)];
        let mut sim = SimBuilder::new(open_config(5, vec![Position::new(4, 4)]), Toward(target))
            .agents(starts)
            .build()
            .unwrap();
        let mut rec = Recorder::default();
        sim.run_ticks(1, &mut rec).unwrap();

        let positions = sim.population.positions();
        assert_eq!(positions.iter().filter(|&&p| p == target).count(), 1);
        assert!(positions.iter().any(|p| starts.contains(p)));
        assert_eq!(rec.stats[0].conflict_cells, 1);
        assert_eq!(rec.stats[0].moved, 1);
    }

    #[test]
    fn occupied_cells_match_population_every_tick() {
        let config = EvacConfig {
            agent_count: 40,
            max_ticks:   Some(300),
            ..open_config(20, vec![Position::new(19, 10), Position::new(0, 10)])
        };
        let mut sim = SimBuilder::new(config.clone(), FloorFieldBehavior::from_config(&config))
            .build()
            .unwrap();
        let mut rec = Recorder::default();
        let summary = sim.run(&mut rec).unwrap();

        for (frame, &alive) in rec.frames.iter().zip(&rec.populations) {
            assert_eq!(frame.count(CellState::Occupied), alive, "at {}", frame.tick);
            assert_eq!(frame.count(CellState::Exit), 2);
        }
        assert_eq!(summary.evacuated + summary.remaining, 40);
        assert_eq!(summary.evacuation_ticks.len(), summary.evacuated);
    }

    #[test]
    fn same_seed_same_run() {
        let config = EvacConfig {
            agent_count: 25,
            max_ticks:   Some(200),
            ..open_config(15, vec![Position::new(14, 7), Position::new(7, 0)])
        };
        let run = || {
            let mut sim = SimBuilder::new(config.clone(), FloorFieldBehavior::from_config(&config))
                .build()
                .unwrap();
            let mut rec = Recorder::default();
            let summary = sim.run(&mut rec).unwrap();
            (summary, rec.stats)
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn uniform_policy_keeps_invariants() {
        let config = EvacConfig {
            agent_count:     15,
            max_ticks:       Some(200),
            conflict_policy: ConflictPolicy::Uniform,
            ..open_config(8, vec![Position::new(7, 4)])
        };
        let mut sim = SimBuilder::new(config.clone(), FloorFieldBehavior::from_config(&config))
            .build()
            .unwrap();
        let mut rec = Recorder::default();
        let summary = sim.run(&mut rec).unwrap();

        assert_eq!(summary.evacuated + summary.remaining, 15);
        for (frame, &alive) in rec.frames.iter().zip(&rec.populations) {
            assert_eq!(frame.count(CellState::Occupied), alive);
        }
    }

    #[test]
    fn tick_limit_stops_a_stuck_run() {
        let config = EvacConfig { max_ticks: Some(4), ..open_config(5, vec![Position::new(4, 4)]) };
        let mut sim = SimBuilder::new(config, StayBehavior)
            .agents([Position::new(0, 0), Position::new(1, 1), Position::new(2, 2)])
            .build()
            .unwrap();
        let summary = sim.run(&mut NoopObserver).unwrap();

        assert!(!summary.completed);
        assert_eq!(summary.ticks, 4);
        assert_eq!(summary.remaining, 3);
        assert_eq!(summary.evacuated, 0);
        assert_eq!(summary.last_evacuation(), None);
    }

    #[test]
    fn sealed_agent_is_reported_unreachable() {
        let mut config = EvacConfig { max_ticks: Some(2), ..open_config(6, vec![Position::new(5, 5)]) };
        config.walls = vec![Position::new(0, 1), Position::new(1, 0), Position::new(1, 1)];
        let mut sim = SimBuilder::new(config, straight_ahead())
            .agents([Position::new(0, 0)])
            .build()
            .unwrap();
        let mut rec = Recorder::default();
        let summary = sim.run(&mut rec).unwrap();

        assert!(!summary.completed);
        assert!(rec.stats.iter().all(|s| s.unreachable == 1));
        assert_eq!(sim.population.agents()[0].position, Position::new(0, 0));
    }
}
