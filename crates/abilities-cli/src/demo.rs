//! Demo loadout used by the CLI: a small character with movement and weapon abilities.

use std::collections::BTreeMap;

use ai_abilities::{
    Ability, AbilityBinding, AbilityController, ActionShape, BufferType, ControllerConfig,
    DecisionVector, Mediator, MultiAbilityInfo, SetupContext, SetupError,
};
use ai_core::{BbKey, Blackboard, TickContext, WorldMut, WorldView};
use anyhow::Result;
use serde::Serialize;

/// Seconds a jump keeps the body airborne.
const JUMP_SECONDS: f32 = 0.5;
const STRAFE_SPEED: f32 = 4.0;
const AIM_STEP_DEGREES: f32 = 2.5;

/// Weapon slot chosen this tick, shared with the aim ability.
const ACTIVE_WEAPON: BbKey<u32> = BbKey::new(0xDE70_0000_0000_0001);

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Body {
    pub x: f32,
    pub airborne_for: f32,
    pub jumps: u32,
    pub weapon: u32,
    pub yaw: f32,
    pub pitch: f32,
    pub zoom: f32,
    pub shots: u32,
}

#[derive(Debug, Default, Serialize)]
pub struct DemoWorld {
    pub bodies: BTreeMap<u32, Body>,
}

impl DemoWorld {
    pub fn spawn(&mut self, agent: u32) {
        self.bodies.entry(agent).or_default();
    }

    fn body_mut(&mut self, agent: u32) -> Option<&mut Body> {
        self.bodies.get_mut(&agent)
    }
}

impl WorldView for DemoWorld {
    type Agent = u32;

    fn body_ready(&self, agent: u32) -> bool {
        self.bodies.contains_key(&agent)
    }
}

impl WorldMut for DemoWorld {}

/// Discrete(2): 1 starts a jump when grounded.
pub struct Jump;

impl Ability<DemoWorld> for Jump {
    fn name(&self) -> &str {
        "jump"
    }

    fn buffer_type(&self) -> BufferType {
        BufferType::Discrete
    }

    fn activate_discrete(
        &mut self,
        ctx: &TickContext,
        agent: u32,
        world: &mut DemoWorld,
        _blackboard: &mut Blackboard,
        value: i32,
    ) {
        let Some(body) = world.body_mut(agent) else {
            return;
        };
        body.airborne_for = (body.airborne_for - ctx.dt_seconds).max(0.0);
        if value == 1 && body.airborne_for == 0.0 {
            body.airborne_for = JUMP_SECONDS;
            body.jumps += 1;
        }
    }
}

/// Continuous: lateral velocity, clamped to [-1, 1].
pub struct Strafe;

impl Ability<DemoWorld> for Strafe {
    fn name(&self) -> &str {
        "strafe"
    }

    fn buffer_type(&self) -> BufferType {
        BufferType::Continuous
    }

    fn activate_continuous(
        &mut self,
        ctx: &TickContext,
        agent: u32,
        world: &mut DemoWorld,
        _blackboard: &mut Blackboard,
        value: f32,
    ) {
        if let Some(body) = world.body_mut(agent) {
            body.x += value.clamp(-1.0, 1.0) * STRAFE_SPEED * ctx.dt_seconds;
        }
    }
}

/// Discrete(4): weapon slot.
pub struct WeaponSelect;

impl Ability<DemoWorld> for WeaponSelect {
    fn name(&self) -> &str {
        "weapon"
    }

    fn buffer_type(&self) -> BufferType {
        BufferType::Discrete
    }

    fn branch_size(&self) -> u32 {
        4
    }

    fn activate_discrete(
        &mut self,
        _ctx: &TickContext,
        agent: u32,
        world: &mut DemoWorld,
        blackboard: &mut Blackboard,
        value: i32,
    ) {
        let slot = value.clamp(0, 3) as u32;
        blackboard.set(ACTIVE_WEAPON, slot);
        if let Some(body) = world.body_mut(agent) {
            body.weapon = slot;
        }
    }
}

/// Composite: yaw and pitch steps (3 values each: down, hold, up) and a zoom channel.
///
/// Fires when the zoom channel is past half and a weapon is selected.
pub struct Aim {
    info: MultiAbilityInfo,
    binding: AbilityBinding<u32>,
    pending: [i32; 2],
}

impl Aim {
    pub fn new() -> Self {
        Self {
            info: MultiAbilityInfo::new([3, 3], 1),
            binding: AbilityBinding::default(),
            pending: [1, 1],
        }
    }
}

impl Default for Aim {
    fn default() -> Self {
        Self::new()
    }
}

impl Ability<DemoWorld> for Aim {
    fn name(&self) -> &str {
        "aim"
    }

    fn buffer_type(&self) -> BufferType {
        BufferType::Composite
    }

    fn multi_info(&self) -> Option<&MultiAbilityInfo> {
        Some(&self.info)
    }

    fn multi_info_mut(&mut self) -> Option<&mut MultiAbilityInfo> {
        Some(&mut self.info)
    }

    fn bind(&mut self, owner: u32, mediator: Mediator) {
        self.binding.bind(owner, mediator);
    }

    fn setup(&mut self, ctx: &SetupContext<'_, u32>) -> Result<(), SetupError> {
        if ctx.lookup.ids_of::<WeaponSelect>().is_empty() {
            return Err(SetupError::new("aim needs a weapon selector"));
        }
        Ok(())
    }

    fn activate_discrete_batch(
        &mut self,
        _ctx: &TickContext,
        _agent: u32,
        _world: &mut DemoWorld,
        _blackboard: &mut Blackboard,
        values: &[i32],
    ) {
        for (slot, value) in self.pending.iter_mut().zip(values) {
            *slot = *value;
        }
    }

    fn activate_continuous_batch(
        &mut self,
        _ctx: &TickContext,
        agent: u32,
        world: &mut DemoWorld,
        blackboard: &mut Blackboard,
        values: &[f32],
    ) {
        let armed = blackboard.get(ACTIVE_WEAPON).is_some_and(|slot| *slot > 0);
        let Some(body) = world.body_mut(agent) else {
            return;
        };
        body.yaw += (self.pending[0] - 1) as f32 * AIM_STEP_DEGREES;
        body.pitch =
            (body.pitch + (self.pending[1] - 1) as f32 * AIM_STEP_DEGREES).clamp(-80.0, 80.0);
        body.zoom = values.first().copied().unwrap_or_default().clamp(-1.0, 1.0);
        if armed && body.zoom > 0.5 {
            body.shots += 1;
        }
    }
}

/// Controller with the demo loadout attached, in editing phase.
pub fn loadout(agent: u32, config: ControllerConfig) -> Result<AbilityController<DemoWorld>> {
    let mut controller = AbilityController::new(agent).with_config(config);
    controller.attach(Jump)?;
    controller.attach(Strafe)?;
    controller.attach(WeaponSelect)?;
    controller.attach(Aim::new())?;
    Ok(controller)
}

/// Scripted heuristic standing in for a trained policy.
///
/// Produces in-range values in slot order: jump, weapon, strafe, then aim.
pub fn patrol(ctx: &TickContext, agent: u32, shape: &ActionShape) -> DecisionVector {
    let phase = ctx.tick.wrapping_add(agent as u64);
    let mut vector = DecisionVector::zeros(shape);
    for (slot, (value, size)) in vector
        .discrete
        .iter_mut()
        .zip(&shape.discrete_branches)
        .enumerate()
    {
        let step = phase / (slot as u64 * 7 + 5);
        *value = (step % *size as u64) as i32;
    }
    for (slot, value) in vector.continuous.iter_mut().enumerate() {
        *value = ((phase as f32 + slot as f32 * 3.0) * 0.2).sin();
    }
    vector
}
