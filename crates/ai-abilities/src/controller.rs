use ai_core::{AgentId, Blackboard, TickContext, WorldMut};

use crate::capability::Ability;
use crate::config::ControllerConfig;
use crate::decision::{DecisionSource, DecisionVector};
use crate::error::ControllerError;
use crate::layout::{ActionShape, LayoutPlanner};
use crate::link::{AbilityId, AbilityLink};
use crate::reconcile::reconcile;
use crate::registry::{AbilityRegistry, InitReport};
use crate::router::{BufferRouter, DispatchFlags, DispatchReport, DispatchRequest, DISPATCH_RNG_STREAM};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerPhase {
    /// Abilities may be attached and detached.
    Editing,
    /// An episode is in progress; the link set is frozen.
    Running,
}

/// Hosts the abilities of one agent: links, published shape, and per-tick dispatch.
pub struct AbilityController<W>
where
    W: WorldMut + 'static,
{
    pub agent: W::Agent,
    pub config: ControllerConfig,
    pub blackboard: Blackboard,
    registry: AbilityRegistry<W>,
    links: Vec<AbilityLink>,
    shape: ActionShape,
    phase: ControllerPhase,
    last_decision: Option<DecisionVector>,
}

impl<W> AbilityController<W>
where
    W: WorldMut + 'static,
{
    pub fn new(agent: W::Agent) -> Self {
        Self {
            agent,
            config: ControllerConfig::default(),
            blackboard: Blackboard::new(),
            registry: AbilityRegistry::new(),
            links: Vec::new(),
            shape: ActionShape::default(),
            phase: ControllerPhase::Editing,
            last_decision: None,
        }
    }

    pub fn with_config(mut self, config: ControllerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn phase(&self) -> ControllerPhase {
        self.phase
    }

    pub fn is_running(&self) -> bool {
        self.phase == ControllerPhase::Running
    }

    /// Shape published by the last successful reconcile.
    pub fn shape(&self) -> &ActionShape {
        &self.shape
    }

    pub fn links(&self) -> &[AbilityLink] {
        &self.links
    }

    pub fn registry(&self) -> &AbilityRegistry<W> {
        &self.registry
    }

    pub fn ability_mut(&mut self, id: AbilityId) -> Option<&mut dyn Ability<W>> {
        self.registry.get_mut(id)
    }

    pub fn attach<A: Ability<W>>(&mut self, ability: A) -> Result<AbilityId, ControllerError> {
        self.attach_boxed(Box::new(ability))
    }

    pub fn attach_boxed(
        &mut self,
        ability: Box<dyn Ability<W>>,
    ) -> Result<AbilityId, ControllerError> {
        self.ensure_editing()?;
        Ok(self.registry.attach_boxed(ability))
    }

    pub fn detach(&mut self, id: AbilityId) -> Result<Option<Box<dyn Ability<W>>>, ControllerError> {
        self.ensure_editing()?;
        Ok(self.registry.detach(id))
    }

    /// Re-links the live abilities and recomputes the shape.
    ///
    /// Links, shape and composite offsets are replaced together; on error the
    /// previous layout stays in place. Only allowed while editing.
    pub fn reconcile(&mut self) -> Result<&ActionShape, ControllerError> {
        self.ensure_editing()?;
        let links = reconcile(&self.links, &self.registry.live());
        let plan = LayoutPlanner::plan(&links, &self.registry)?;
        plan.apply(&mut self.registry);

        if plan.shape != self.shape || links != self.links {
            tracing::debug!(
                agent = %self.agent.label(),
                links = links.len(),
                branches = ?plan.shape.discrete_branches,
                continuous = plan.shape.continuous_count,
                "ability layout changed"
            );
        }
        self.links = links;
        self.shape = plan.shape;
        Ok(&self.shape)
    }

    /// Reconciles, initializes every ability and freezes the link set.
    ///
    /// Setup failures are reported in the returned [`InitReport`] and do not stop the
    /// episode from starting. Fails with [`ControllerError::StructureLocked`] while an
    /// episode is already running, so setup hooks run once per episode.
    pub fn begin_episode(&mut self) -> Result<InitReport, ControllerError> {
        self.reconcile()?;
        let report = self.registry.initialize(&self.links, self.agent);
        self.phase = ControllerPhase::Running;
        self.last_decision = None;

        tracing::info!(
            agent = %self.agent.label(),
            abilities = self.links.len(),
            discrete = self.shape.discrete_len(),
            continuous = self.shape.continuous_count,
            setup_failures = report.failures.len(),
            "episode started"
        );
        Ok(report)
    }

    /// Reopens the link set for editing.
    pub fn end_episode(&mut self) {
        if self.phase == ControllerPhase::Running {
            tracing::info!(agent = %self.agent.label(), "episode ended");
        }
        self.phase = ControllerPhase::Editing;
        self.last_decision = None;
    }

    /// Dispatches one decision vector. At most once per tick.
    pub fn dispatch(
        &mut self,
        ctx: &TickContext,
        world: &mut W,
        vector: &DecisionVector,
        flags: DispatchFlags,
    ) -> Result<DispatchReport, ControllerError> {
        self.ensure_running()?;
        let mut rng = ctx.rng_for_agent(self.agent, DISPATCH_RNG_STREAM);
        let request = DispatchRequest {
            ctx,
            links: &self.links,
            vector,
            flags,
        };
        let report = BufferRouter::dispatch(
            request,
            &mut self.registry,
            self.agent,
            world,
            &mut self.blackboard,
            &mut rng,
        )?;
        Ok(report)
    }

    /// Runs one tick of the decision cadence.
    ///
    /// On decision ticks a fresh vector is requested from `source`; between decisions
    /// the last vector is dispatched again when `repeat_between_decisions` is set.
    /// Returns `Ok(None)` when nothing was dispatched.
    pub fn tick(
        &mut self,
        ctx: &TickContext,
        world: &mut W,
        source: &mut dyn DecisionSource<W::Agent>,
        flags: DispatchFlags,
    ) -> Result<Option<DispatchReport>, ControllerError> {
        self.ensure_running()?;

        if self.config.should_decide(ctx.tick) {
            let vector = source.decide(ctx, self.agent, &self.shape);
            let report = self.dispatch(ctx, world, &vector, flags)?;
            self.last_decision = Some(vector);
            return Ok(Some(report));
        }

        if !self.config.repeat_between_decisions {
            return Ok(None);
        }
        let Some(vector) = self.last_decision.take() else {
            return Ok(None);
        };
        let result = self.dispatch(ctx, world, &vector, flags);
        self.last_decision = Some(vector);
        result.map(Some)
    }

    fn ensure_editing(&self) -> Result<(), ControllerError> {
        match self.phase {
            ControllerPhase::Editing => Ok(()),
            ControllerPhase::Running => Err(ControllerError::StructureLocked {
                agent: self.agent.label(),
            }),
        }
    }

    fn ensure_running(&self) -> Result<(), ControllerError> {
        match self.phase {
            ControllerPhase::Running => Ok(()),
            ControllerPhase::Editing => Err(ControllerError::NotRunning {
                agent: self.agent.label(),
            }),
        }
    }
}

/// Ticks several controllers in stable agent order against one shared source.
///
/// The slice itself is left in the caller's order; results come back in tick order.
pub fn tick_controllers<W>(
    ctx: &TickContext,
    world: &mut W,
    controllers: &mut [AbilityController<W>],
    source: &mut dyn DecisionSource<W::Agent>,
    flags: DispatchFlags,
) -> Vec<(W::Agent, Result<Option<DispatchReport>, ControllerError>)>
where
    W: WorldMut + 'static,
{
    let mut order: Vec<usize> = (0..controllers.len()).collect();
    order.sort_by_key(|&index| controllers[index].agent.stable_id());
    order
        .into_iter()
        .map(|index| {
            let controller = &mut controllers[index];
            let result = controller.tick(ctx, world, source, flags);
            (controller.agent, result)
        })
        .collect()
}
