mod support;

use ai_abilities::{
    tick_controllers, AbilityController, ActionShape, ControllerConfig, ControllerError,
    ControllerPhase, DecisionVector, DispatchFlags, FnDecisionSource, ScriptedDecisionSource,
    ZeroDecisionSource,
};
use support::{ctx, scenario, Call, Composite, Continuous, Discrete, Observer, TestWorld};

#[test]
fn structure_is_locked_while_an_episode_runs() {
    let mut s = scenario();
    s.controller.begin_episode().unwrap();
    assert_eq!(s.controller.phase(), ControllerPhase::Running);

    let err = s.controller.attach(Discrete::new("late", 2)).unwrap_err();
    assert_eq!(
        err,
        ControllerError::StructureLocked {
            agent: "agent#7".to_string(),
        }
    );
    assert!(matches!(
        s.controller.detach(s.jump),
        Err(ControllerError::StructureLocked { .. })
    ));
    assert_eq!(s.controller.registry().len(), 4);

    s.controller.end_episode();
    assert_eq!(s.controller.phase(), ControllerPhase::Editing);
    assert!(s.controller.detach(s.jump).unwrap().is_some());
}

#[test]
fn second_begin_episode_is_refused_and_setup_runs_once() {
    let mut s = scenario();
    s.controller.attach(Observer::new("observer")).unwrap();
    s.controller.begin_episode().unwrap();

    let locked = ControllerError::StructureLocked {
        agent: "agent#7".to_string(),
    };
    assert_eq!(s.controller.begin_episode().unwrap_err(), locked);
    assert_eq!(s.controller.reconcile().unwrap_err(), locked);
    assert_eq!(s.controller.phase(), ControllerPhase::Running);

    let (_, observer) = s.controller.registry().find_one::<Observer>().unwrap();
    assert_eq!(observer.setup_calls, 1);
}

#[test]
fn dispatch_requires_a_running_episode() {
    let mut s = scenario();
    let mut world = TestWorld::default();

    let err = s
        .controller
        .dispatch(
            &ctx(0),
            &mut world,
            &DecisionVector::default(),
            DispatchFlags::NORMAL,
        )
        .unwrap_err();
    assert!(matches!(err, ControllerError::NotRunning { .. }));

    let err = s
        .controller
        .tick(&ctx(0), &mut world, &mut ZeroDecisionSource, DispatchFlags::NORMAL)
        .unwrap_err();
    assert!(matches!(err, ControllerError::NotRunning { .. }));
    assert!(world.calls.is_empty());
}

#[test]
fn begin_episode_publishes_the_shape() {
    let mut s = scenario();
    let report = s.controller.begin_episode().unwrap();

    assert!(report.is_clean());
    assert_eq!(report.initialized.len(), 4);
    assert_eq!(
        s.controller.shape(),
        &ActionShape {
            discrete_branches: vec![2, 4, 3, 3],
            continuous_count: 2,
        }
    );
}

#[test]
fn failed_reconcile_keeps_the_previous_layout_usable() {
    let mut s = scenario();
    s.controller.reconcile().unwrap();
    let shape = s.controller.shape().clone();

    let bad = s
        .controller
        .attach(Composite::new("bad", &[0], 0))
        .unwrap();
    assert!(s.controller.reconcile().is_err());
    assert_eq!(s.controller.shape(), &shape);

    s.controller.detach(bad).unwrap();
    s.controller.begin_episode().unwrap();
    assert_eq!(s.controller.shape(), &shape);
}

#[test]
fn decisions_follow_the_configured_period() {
    let mut s = scenario();
    s.controller.config = ControllerConfig {
        decision_period: 3,
        decision_offset: 0,
        repeat_between_decisions: false,
    };
    s.controller.begin_episode().unwrap();

    let mut asked = Vec::new();
    let mut source = FnDecisionSource::new(move |ctx: &ai_core::TickContext, _agent: u64, shape: &ActionShape| {
        let mut vector = DecisionVector::zeros(shape);
        vector.discrete[0] = (ctx.tick % 2) as i32;
        vector
    });
    let mut world = TestWorld::default();

    for tick in 0..7 {
        let report = s
            .controller
            .tick(&ctx(tick), &mut world, &mut source, DispatchFlags::NORMAL)
            .unwrap();
        if report.is_some() {
            asked.push(tick);
        }
    }

    assert_eq!(asked, vec![0, 3, 6]);
    let jumps: Vec<i32> = world
        .calls
        .iter()
        .filter_map(|call| match call {
            Call::Discrete("jump", v) => Some(*v),
            _ => None,
        })
        .collect();
    assert_eq!(jumps, vec![0, 1, 0]);
}

#[test]
fn last_decision_is_repeated_between_decisions() {
    let mut s = scenario();
    s.controller.config.decision_period = 2;
    s.controller.begin_episode().unwrap();

    let mut source = ScriptedDecisionSource::new(vec![
        DecisionVector::new([1, 0, 0, 0], [0.1, 0.0]),
        DecisionVector::new([0, 2, 0, 0], [0.2, 0.0]),
    ]);
    let mut world = TestWorld::default();

    for tick in 0..4 {
        let report = s
            .controller
            .tick(&ctx(tick), &mut world, &mut source, DispatchFlags::NORMAL)
            .unwrap();
        assert!(report.is_some());
    }
    assert_eq!(source.remaining(), 0);

    let strafe: Vec<f32> = world
        .calls
        .iter()
        .filter_map(|call| match call {
            Call::Continuous("strafe", v) => Some(*v),
            _ => None,
        })
        .collect();
    assert_eq!(strafe, vec![0.1, 0.1, 0.2, 0.2]);
}

#[test]
fn rejected_decision_is_not_repeated() {
    let mut s = scenario();
    s.controller.config.decision_period = 2;
    s.controller.begin_episode().unwrap();

    let mut source = ScriptedDecisionSource::new(vec![DecisionVector::new([1], [0.5])]);
    let mut world = TestWorld::default();

    let err = s
        .controller
        .tick(&ctx(0), &mut world, &mut source, DispatchFlags::NORMAL)
        .unwrap_err();
    assert!(matches!(err, ControllerError::Dispatch(_)));

    let between = s
        .controller
        .tick(&ctx(1), &mut world, &mut source, DispatchFlags::NORMAL)
        .unwrap();
    assert!(between.is_none());
    assert!(world.calls.is_empty());
}

#[test]
fn deterministic_config_spreads_agents_over_the_period() {
    let config = ControllerConfig::deterministic(5u64, 4);
    assert_eq!(config.decision_period, 4);
    assert_eq!(config.decision_offset, 1);
    assert!(config.should_decide(3));
    assert!(!config.should_decide(4));

    let zero = ControllerConfig {
        decision_period: 0,
        ..ControllerConfig::default()
    };
    assert!((0..5).all(|tick| zero.should_decide(tick)));
}

#[test]
fn controllers_tick_in_stable_agent_order() {
    let build = |agent: u64| {
        let mut controller = AbilityController::<TestWorld>::new(agent);
        controller.attach(Continuous::new("throttle")).unwrap();
        controller.begin_episode().unwrap();
        controller
    };
    let mut controllers = vec![build(30), build(10), build(20)];
    let mut seen = Vec::new();
    let mut source = FnDecisionSource::new(move |_ctx: &ai_core::TickContext, agent: u64, _shape: &ActionShape| {
        DecisionVector::new(Vec::<i32>::new(), [agent as f32])
    });
    let mut world = TestWorld::default();

    let results = tick_controllers(
        &ctx(0),
        &mut world,
        &mut controllers,
        &mut source,
        DispatchFlags::NORMAL,
    );

    for (agent, result) in &results {
        assert!(result.as_ref().unwrap().is_some());
        seen.push(*agent);
    }
    assert_eq!(seen, vec![10, 20, 30]);
    let slice_order: Vec<u64> = controllers.iter().map(|c| c.agent).collect();
    assert_eq!(slice_order, vec![30, 10, 20]);
    assert_eq!(
        world.calls,
        vec![
            Call::Continuous("throttle", 10.0),
            Call::Continuous("throttle", 20.0),
            Call::Continuous("throttle", 30.0),
        ]
    );
}
