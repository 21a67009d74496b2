//! Ability action-buffer routing.
//!
//! An agent carries a set of pluggable abilities. Each tick an external decision
//! process (trained policy, scripted heuristic, human input) produces one flat
//! [`DecisionVector`]; this crate
//! - computes the [`ActionShape`] that vector must have from the attached abilities,
//! - slices the vector and forwards each slice to the ability that owns it.
//!
//! Both directions replay the same traversal: regular (single-slot) abilities in
//! sibling order, then composite abilities in sibling order. [`reconcile`] keeps that
//! order deterministic for a given set of abilities and attach order.
//!
//! Typical use goes through [`AbilityController`]:
//! attach abilities, [`AbilityController::begin_episode`], publish
//! [`AbilityController::shape`] to the decision process, then call
//! [`AbilityController::tick`] (or [`AbilityController::dispatch`]) once per tick.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod capability;
pub mod config;
pub mod controller;
pub mod decision;
pub mod error;
pub mod layout;
pub mod link;
pub mod mediator;
pub mod reconcile;
pub mod registry;
pub mod router;

pub use capability::{
    Ability, AbilityBinding, AsAny, BufferType, MultiAbilityInfo, SetupContext, SlotUsage,
};
pub use config::ControllerConfig;
pub use controller::{tick_controllers, AbilityController, ControllerPhase};
pub use decision::{
    DecisionSource, DecisionVector, FnDecisionSource, ScriptedDecisionSource, ZeroDecisionSource,
};
pub use error::{
    AmbiguousLookup, ControllerError, DispatchError, LayoutError, LayoutFault, SetupError,
    SetupFailure,
};
pub use layout::{ActionShape, CompositeOffsets, LayoutPlan, LayoutPlanner, MAX_BRANCH_SIZE};
pub use link::{AbilityId, AbilityLink};
pub use mediator::{AbilityDirectory, AbilityLookup, DirectoryEntry, Mediator};
pub use reconcile::reconcile;
pub use registry::{AbilityRegistry, InitReport};
pub use router::{BufferRouter, DispatchFlags, DispatchReport, DispatchRequest, DISPATCH_RNG_STREAM};
