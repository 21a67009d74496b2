#![allow(dead_code)]

use ai_abilities::{
    Ability, AbilityBinding, AbilityController, AbilityId, BufferType, Mediator, MultiAbilityInfo,
    SetupContext, SetupError,
};
use ai_core::{Blackboard, TickContext, WorldMut, WorldView};

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Discrete(&'static str, i32),
    Continuous(&'static str, f32),
    Batch(&'static str, Vec<i32>, Vec<f32>),
}

#[derive(Default)]
pub struct TestWorld {
    pub calls: Vec<Call>,
    pub body_missing: bool,
}

impl WorldView for TestWorld {
    type Agent = u64;

    fn body_ready(&self, _agent: u64) -> bool {
        !self.body_missing
    }
}

impl WorldMut for TestWorld {}

#[derive(Debug)]
pub struct Discrete {
    pub name: &'static str,
    pub branch_size: u32,
}

impl Discrete {
    pub fn new(name: &'static str, branch_size: u32) -> Self {
        Self { name, branch_size }
    }
}

impl Ability<TestWorld> for Discrete {
    fn name(&self) -> &str {
        self.name
    }

    fn buffer_type(&self) -> BufferType {
        BufferType::Discrete
    }

    fn branch_size(&self) -> u32 {
        self.branch_size
    }

    fn activate_discrete(
        &mut self,
        _ctx: &TickContext,
        _agent: u64,
        world: &mut TestWorld,
        _blackboard: &mut Blackboard,
        value: i32,
    ) {
        world.calls.push(Call::Discrete(self.name, value));
    }
}

pub struct Continuous {
    pub name: &'static str,
}

impl Continuous {
    pub fn new(name: &'static str) -> Self {
        Self { name }
    }
}

impl Ability<TestWorld> for Continuous {
    fn name(&self) -> &str {
        self.name
    }

    fn buffer_type(&self) -> BufferType {
        BufferType::Continuous
    }

    fn activate_continuous(
        &mut self,
        _ctx: &TickContext,
        _agent: u64,
        world: &mut TestWorld,
        _blackboard: &mut Blackboard,
        value: f32,
    ) {
        world.calls.push(Call::Continuous(self.name, value));
    }
}

/// Records both halves of a batch activation as a single call.
pub struct Composite {
    pub name: &'static str,
    pub info: Option<MultiAbilityInfo>,
    pub enabled: bool,
    pending: Vec<i32>,
}

impl Composite {
    pub fn new(name: &'static str, branches: &[u32], continuous: usize) -> Self {
        Self {
            name,
            info: Some(MultiAbilityInfo::new(branches.to_vec(), continuous)),
            enabled: true,
            pending: Vec::new(),
        }
    }

    pub fn without_layout(name: &'static str) -> Self {
        Self {
            name,
            info: None,
            enabled: true,
            pending: Vec::new(),
        }
    }
}

impl Ability<TestWorld> for Composite {
    fn name(&self) -> &str {
        self.name
    }

    fn buffer_type(&self) -> BufferType {
        BufferType::Composite
    }

    fn multi_info(&self) -> Option<&MultiAbilityInfo> {
        self.info.as_ref()
    }

    fn multi_info_mut(&mut self) -> Option<&mut MultiAbilityInfo> {
        self.info.as_mut()
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn activate_discrete_batch(
        &mut self,
        _ctx: &TickContext,
        _agent: u64,
        _world: &mut TestWorld,
        _blackboard: &mut Blackboard,
        values: &[i32],
    ) {
        self.pending = values.to_vec();
    }

    fn activate_continuous_batch(
        &mut self,
        _ctx: &TickContext,
        _agent: u64,
        world: &mut TestWorld,
        _blackboard: &mut Blackboard,
        values: &[f32],
    ) {
        let discrete = std::mem::take(&mut self.pending);
        world
            .calls
            .push(Call::Batch(self.name, discrete, values.to_vec()));
    }
}

/// Continuous ability that keeps its binding and counts discrete peers during setup.
pub struct Observer {
    pub name: &'static str,
    pub binding: AbilityBinding<u64>,
    pub discrete_peers: usize,
    pub setup_calls: u32,
}

impl Observer {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            binding: AbilityBinding::default(),
            discrete_peers: 0,
            setup_calls: 0,
        }
    }
}

impl Ability<TestWorld> for Observer {
    fn name(&self) -> &str {
        self.name
    }

    fn buffer_type(&self) -> BufferType {
        BufferType::Continuous
    }

    fn bind(&mut self, owner: u64, mediator: Mediator) {
        self.binding.bind(owner, mediator);
    }

    fn setup(&mut self, ctx: &SetupContext<'_, u64>) -> Result<(), SetupError> {
        self.setup_calls += 1;
        self.discrete_peers = ctx.lookup.ids_of::<Discrete>().len();
        Ok(())
    }
}

/// Discrete ability whose setup always fails.
pub struct Broken {
    pub name: &'static str,
}

impl Ability<TestWorld> for Broken {
    fn name(&self) -> &str {
        self.name
    }

    fn buffer_type(&self) -> BufferType {
        BufferType::Discrete
    }

    fn setup(&mut self, _ctx: &SetupContext<'_, u64>) -> Result<(), SetupError> {
        Err(SetupError::new("missing animation rig"))
    }

    fn activate_discrete(
        &mut self,
        _ctx: &TickContext,
        _agent: u64,
        world: &mut TestWorld,
        _blackboard: &mut Blackboard,
        value: i32,
    ) {
        world.calls.push(Call::Discrete(self.name, value));
    }
}

pub struct Scenario {
    pub controller: AbilityController<TestWorld>,
    pub jump: AbilityId,
    pub strafe: AbilityId,
    pub weapon: AbilityId,
    pub aim: AbilityId,
}

/// discrete(2), continuous, discrete(4) attached in that order, plus a composite with
/// branches [3, 3] and one continuous channel.
pub fn scenario() -> Scenario {
    let mut controller = AbilityController::new(7u64);
    let jump = controller.attach(Discrete::new("jump", 2)).unwrap();
    let strafe = controller.attach(Continuous::new("strafe")).unwrap();
    let weapon = controller.attach(Discrete::new("weapon", 4)).unwrap();
    let aim = controller.attach(Composite::new("aim", &[3, 3], 1)).unwrap();
    Scenario {
        controller,
        jump,
        strafe,
        weapon,
        aim,
    }
}

pub fn ctx(tick: u64) -> TickContext {
    TickContext::new(tick, 0.02, 0x5EED)
}

pub fn offsets(controller: &AbilityController<TestWorld>, id: AbilityId) -> (usize, usize) {
    let info = controller
        .registry()
        .get(id)
        .and_then(|a| a.multi_info())
        .expect("composite ability");
    (info.discrete_start_offset(), info.continuous_start_offset())
}
