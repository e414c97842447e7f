//! End-to-end tests of the MILP formulations.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::*;
use crate::models::{Actor, ActorSlot, SolveStatus};
use crate::solver::{GoodLpFactory, SolverFault};
use crate::test_utils::{CountingFactory, RecordingFactory};
use crate::validation::verify_schedule;

const ENCODINGS: [StartEncoding; 2] = [StartEncoding::TimeIndexed, StartEncoding::BigM];

fn solve(
    graph: &DataflowGraph,
    cores: usize,
    horizon: u32,
    encoding: StartEncoding,
) -> Result<OptimizationResult> {
    MilpScheduleBuilder::new(graph, cores, horizon)
        .with_encoding(encoding)
        .solve(&GoodLpFactory)
}

fn assert_feasible(graph: &DataflowGraph, cores: usize, horizon: u32, result: &OptimizationResult) {
    assert_eq!(result.status, SolveStatus::Optimal);
    let schedule = result.schedule.as_ref().expect("optimal result has a schedule");
    let violations = verify_schedule(graph, cores, horizon, schedule);
    assert!(violations.is_empty(), "violations: {violations:?}");
    assert_eq!(result.objective, Some(schedule.sum_of_starts() as f64));
}

/// Random DAG: edges only go from lower to higher index.
fn random_dag(rng: &mut StdRng, actors: usize) -> DataflowGraph {
    let mut graph = DataflowGraph::new();
    for i in 0..actors {
        graph.add_actor(Actor::new(format!("a{i}"), rng.random_range(1..=3)));
    }
    for i in 0..actors {
        for j in i + 1..actors {
            if rng.random_bool(0.35) {
                graph.add_edge(crate::models::Edge::new(format!("a{i}"), format!("a{j}")));
            }
        }
    }
    graph
}

// ---- Scenarios -----------------------------------------------------------

#[test]
fn test_chain_on_one_core() {
    let graph = DataflowGraph::new()
        .with_actor(Actor::new("A", 2))
        .with_actor(Actor::new("B", 3))
        .with_edge("A", "B");

    for encoding in ENCODINGS {
        let result = solve(&graph, 1, 10, encoding).unwrap();
        assert_feasible(&graph, 1, 10, &result);
        assert_eq!(result.objective, Some(2.0));
        assert_eq!(result.makespan(), Some(5));

        // Unique optimum: A at 0, B at 2, both on core 0.
        let schedule = result.schedule.unwrap();
        assert_eq!(schedule.slot("A"), Some(&ActorSlot::new(0, 0, 2)));
        assert_eq!(schedule.slot("B"), Some(&ActorSlot::new(0, 2, 5)));
    }
}

#[test]
fn test_independent_actors_on_two_cores() {
    let graph = DataflowGraph::new()
        .with_actor(Actor::new("A", 2))
        .with_actor(Actor::new("B", 3));

    for encoding in ENCODINGS {
        let result = solve(&graph, 2, 5, encoding).unwrap();
        assert_feasible(&graph, 2, 5, &result);
        assert_eq!(result.objective, Some(0.0));
        assert_eq!(result.makespan(), Some(3));

        let schedule = result.schedule.unwrap();
        assert_ne!(
            schedule.slot("A").unwrap().resource,
            schedule.slot("B").unwrap().resource
        );
    }
}

#[test]
fn test_forced_serialization() {
    let graph = DataflowGraph::new()
        .with_actor(Actor::new("A", 3))
        .with_actor(Actor::new("B", 3))
        .with_actor(Actor::new("C", 3));

    for encoding in ENCODINGS {
        let result = solve(&graph, 1, 9, encoding).unwrap();
        assert_feasible(&graph, 1, 9, &result);
        assert_eq!(result.objective, Some(9.0));
        assert_eq!(result.makespan(), Some(9));

        // Order is not unique; the start set is.
        let mut starts: Vec<u32> = result
            .schedule
            .unwrap()
            .slots
            .values()
            .map(|s| s.start)
            .collect();
        starts.sort_unstable();
        assert_eq!(starts, vec![0, 3, 6]);
    }
}

#[test]
fn test_actor_longer_than_horizon() {
    let graph = DataflowGraph::new().with_actor(Actor::new("A", 5));

    for encoding in ENCODINGS {
        let err = solve(&graph, 1, 3, encoding).unwrap_err();
        assert!(matches!(
            err,
            ScheduleError::InfeasibleHorizon { ref actor, duration: 5, horizon: 3 } if actor == "A"
        ));
    }
}

#[test]
fn test_cyclic_precedence_is_infeasible() {
    let graph = DataflowGraph::new()
        .with_actor(Actor::new("A", 2))
        .with_actor(Actor::new("B", 3))
        .with_edge("A", "B")
        .with_edge("B", "A");

    for encoding in ENCODINGS {
        let result = solve(&graph, 2, 10, encoding).unwrap();
        assert_eq!(result.status, SolveStatus::Infeasible);
        assert!(result.objective.is_none());
        assert!(result.schedule.is_none());
    }
}

#[test]
fn test_horizon_too_short_for_serialization() {
    // Each actor fits, but three of them do not fit one after another.
    let graph = DataflowGraph::new()
        .with_actor(Actor::new("A", 3))
        .with_actor(Actor::new("B", 3))
        .with_actor(Actor::new("C", 3));

    let result = solve(&graph, 1, 8, StartEncoding::TimeIndexed).unwrap();
    assert_eq!(result.status, SolveStatus::Infeasible);
}

#[test]
fn test_sum_of_starts_is_not_makespan() {
    // Fork: A → B, A → C on two cores. Starts 0, 2, 2 give objective 4
    // with makespan 2 + max(d(B), d(C)).
    let graph = DataflowGraph::new()
        .with_actor(Actor::new("A", 2))
        .with_actor(Actor::new("B", 1))
        .with_actor(Actor::new("C", 4))
        .with_edge("A", "B")
        .with_edge("A", "C");

    let result = solve(&graph, 2, 10, StartEncoding::TimeIndexed).unwrap();
    assert_feasible(&graph, 2, 10, &result);
    assert_eq!(result.objective, Some(4.0));
    assert_eq!(result.makespan(), Some(6));
}

#[test]
fn test_empty_graph() {
    let factory = RecordingFactory::optimal();
    let probe = factory.probe();
    let graph = DataflowGraph::new();
    let result = MilpScheduleBuilder::new(&graph, 2, 4)
        .solve(&factory)
        .unwrap();
    assert!(result.is_optimal());
    assert_eq!(result.objective, Some(0.0));
    assert_eq!(result.makespan(), Some(0));
    assert_eq!(probe.created(), 0);
}

// ---- Properties ----------------------------------------------------------

#[test]
fn test_random_dags_are_feasible_with_enough_cores_and_time() {
    for seed in 0..6 {
        let mut rng = StdRng::seed_from_u64(seed);
        let n = rng.random_range(2..=4);
        let graph = random_dag(&mut rng, n);
        // n cores cover any antichain; Σd slots cover full serialization.
        let cores = n;
        let horizon = graph.total_duration() as u32;

        let result = solve(&graph, cores, horizon, StartEncoding::TimeIndexed).unwrap();
        assert_feasible(&graph, cores, horizon, &result);
    }
}

#[test]
fn test_encodings_agree_on_objective() {
    for seed in 10..14 {
        let mut rng = StdRng::seed_from_u64(seed);
        let graph = random_dag(&mut rng, 3);
        let horizon = graph.total_duration() as u32;

        let indexed = solve(&graph, 2, horizon, StartEncoding::TimeIndexed).unwrap();
        let big_m = solve(&graph, 2, horizon, StartEncoding::BigM).unwrap();
        assert_feasible(&graph, 2, horizon, &indexed);
        assert_feasible(&graph, 2, horizon, &big_m);
        assert_eq!(indexed.objective, big_m.objective, "seed {seed}");
    }
}

#[test]
fn test_concurrent_solves_share_nothing() {
    let chain = DataflowGraph::new()
        .with_actor(Actor::new("A", 2))
        .with_actor(Actor::new("B", 3))
        .with_edge("A", "B");
    let parallel = DataflowGraph::new()
        .with_actor(Actor::new("A", 2))
        .with_actor(Actor::new("B", 3));
    let chain_builder = MilpScheduleBuilder::new(&chain, 1, 10);
    let parallel_builder = MilpScheduleBuilder::new(&parallel, 2, 5);

    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let builder = if i % 2 == 0 {
                    &chain_builder
                } else {
                    &parallel_builder
                };
                scope.spawn(move || builder.solve(&GoodLpFactory).unwrap())
            })
            .collect();
        for (i, handle) in handles.into_iter().enumerate() {
            let result = handle.join().unwrap();
            let expected = if i % 2 == 0 { 2.0 } else { 0.0 };
            assert_eq!(result.objective, Some(expected));
        }
    });
}

// ---- Lifecycle & errors --------------------------------------------------

fn chain() -> DataflowGraph {
    DataflowGraph::new()
        .with_actor(Actor::new("A", 2))
        .with_actor(Actor::new("B", 3))
        .with_edge("A", "B")
}

#[test]
fn test_optimal_solve_disposes_model_once() {
    for encoding in ENCODINGS {
        let factory = CountingFactory::new(GoodLpFactory);
        let probe = factory.probe();
        let result = MilpScheduleBuilder::new(&chain(), 1, 10)
            .with_encoding(encoding)
            .solve(&factory)
            .unwrap();
        assert_eq!(result.objective, Some(2.0));
        assert_eq!((probe.created(), probe.dropped()), (1, 1));
    }
}

#[test]
fn test_cyclic_solve_disposes_model_once() {
    let factory = CountingFactory::new(GoodLpFactory);
    let probe = factory.probe();
    let graph = chain().with_edge("B", "A");
    let result = MilpScheduleBuilder::new(&graph, 1, 10)
        .solve(&factory)
        .unwrap();
    assert_eq!(result.status, SolveStatus::Infeasible);
    assert_eq!((probe.created(), probe.dropped()), (1, 1));
}

#[test]
fn test_horizon_guard_never_creates_a_solver() {
    let factory = RecordingFactory::optimal();
    let probe = factory.probe();
    let graph = DataflowGraph::new().with_actor(Actor::new("A", 5));
    let err = MilpScheduleBuilder::new(&graph, 1, 3)
        .solve(&factory)
        .unwrap_err();
    assert!(matches!(err, ScheduleError::InfeasibleHorizon { .. }));
    assert_eq!(probe.created(), 0);
}

#[test]
fn test_invalid_parameters() {
    let factory = RecordingFactory::optimal();
    let probe = factory.probe();
    let graph = chain();

    let err = MilpScheduleBuilder::new(&graph, 0, 10)
        .solve(&factory)
        .unwrap_err();
    assert!(matches!(err, ScheduleError::InvalidParameter(_)));

    let err = MilpScheduleBuilder::new(&graph, 1, 0)
        .solve(&factory)
        .unwrap_err();
    assert!(matches!(err, ScheduleError::InvalidParameter(_)));
    assert_eq!(probe.created(), 0);
}

#[test]
fn test_invalid_graph() {
    let factory = RecordingFactory::optimal();
    let graph = chain().with_actor(Actor::new("A", 1)).with_edge("B", "Z");
    let err = MilpScheduleBuilder::new(&graph, 1, 10)
        .solve(&factory)
        .unwrap_err();
    match err {
        ScheduleError::InvalidGraph(errors) => assert_eq!(errors.len(), 2),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_infeasible_status_disposes_model() {
    let factory = RecordingFactory::status(SolverStatus::Infeasible);
    let probe = factory.probe();
    let graph = chain();
    let result = MilpScheduleBuilder::new(&graph, 1, 10)
        .solve(&factory)
        .unwrap();
    assert_eq!(result, OptimizationResult::infeasible());
    assert_eq!((probe.created(), probe.dropped()), (1, 1));
}

#[test]
fn test_unbounded_status_is_data() {
    let factory = RecordingFactory::status(SolverStatus::Unbounded);
    let graph = chain();
    let result = MilpScheduleBuilder::new(&graph, 1, 10)
        .solve(&factory)
        .unwrap();
    assert_eq!(result.status, SolveStatus::Unbounded);
    assert!(result.schedule.is_none());
}

#[test]
fn test_error_status_carries_code() {
    let factory = RecordingFactory::status(SolverStatus::Error(10009));
    let probe = factory.probe();
    let graph = chain();
    let err = MilpScheduleBuilder::new(&graph, 1, 10)
        .solve(&factory)
        .unwrap_err();
    assert!(matches!(err, ScheduleError::SolverError { code: 10009, .. }));
    assert_eq!(probe.dropped(), 1);
}

#[test]
fn test_optimize_fault_disposes_model() {
    let factory = RecordingFactory::failing_optimize(SolverFault::new(42, "engine crashed"));
    let probe = factory.probe();
    let graph = chain();
    let err = MilpScheduleBuilder::new(&graph, 1, 10)
        .solve(&factory)
        .unwrap_err();
    match err {
        ScheduleError::SolverError { code, message } => {
            assert_eq!(code, 42);
            assert_eq!(message, "engine crashed");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!((probe.created(), probe.dropped()), (1, 1));
}

#[test]
fn test_construction_fault_disposes_partial_model() {
    for encoding in ENCODINGS {
        let factory = RecordingFactory::failing_constraint(3);
        let probe = factory.probe();
        let graph = chain();
        let err = MilpScheduleBuilder::new(&graph, 1, 10)
            .with_encoding(encoding)
            .solve(&factory)
            .unwrap_err();
        assert!(matches!(err, ScheduleError::SolverError { .. }));
        assert_eq!((probe.created(), probe.dropped()), (1, 1));
    }
}

#[test]
fn test_unavailable_solver() {
    let factory = RecordingFactory::unavailable(SolverFault::new(10009, "license expired"));
    let graph = chain();
    let err = MilpScheduleBuilder::new(&graph, 1, 10)
        .solve(&factory)
        .unwrap_err();
    match err {
        ScheduleError::SolverUnavailable(message) => assert!(message.contains("license")),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_optimal_without_values_is_a_decode_error() {
    let factory = RecordingFactory::optimal();
    let probe = factory.probe();
    let graph = chain();
    let err = MilpScheduleBuilder::new(&graph, 1, 10)
        .solve(&factory)
        .unwrap_err();
    assert!(matches!(
        err,
        ScheduleError::SolverError { code: SolverFault::DECODE, .. }
    ));
    assert_eq!(probe.dropped(), 1);
}

#[test]
fn test_build_reports_formulation() {
    let factory = RecordingFactory::optimal();
    let graph = chain();
    let builder = MilpScheduleBuilder::new(&graph, 1, 10);

    let mut solver = factory.create("m").unwrap();
    let formulation = builder.build(&mut solver).unwrap();
    assert!(matches!(formulation, Formulation::TimeIndexed(_)));
    // X 20 + S 17 + R 2
    assert_eq!(solver.variable_count(), 39);
    assert_eq!(solver.constraint_count(), 36);

    let mut solver = factory.create("m").unwrap();
    let formulation = builder
        .clone()
        .with_encoding(StartEncoding::BigM)
        .build(&mut solver)
        .unwrap();
    assert!(matches!(formulation, Formulation::BigM(_)));
}

#[test]
fn test_from_config() {
    let graph = chain();
    let config = SchedulerConfig::new(1, 10).with_encoding(StartEncoding::BigM);
    let result = MilpScheduleBuilder::from_config(&graph, &config)
        .solve(&GoodLpFactory)
        .unwrap();
    assert_eq!(result.objective, Some(2.0));
}
