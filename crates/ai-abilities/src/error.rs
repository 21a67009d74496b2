//! Error types for layout planning, dispatch, initialization and the controller.
//!
//! Layout and dispatch errors are local to the call that raised them: a failed
//! plan leaves the previous layout in place and a failed dispatch activates nothing.
//! Setup failures and ambiguous lookups are reported but never abort the caller.

use crate::capability::BufferType;
use crate::link::AbilityId;

/// What is wrong with one ability's declared layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum LayoutFault {
    #[error("composite branch {index} has size 0")]
    EmptyBranch { index: usize },

    #[error("discrete branch size {size} is below the minimum of 2")]
    BranchTooSmall { size: u32 },

    #[error("discrete branch size {size} does not fit an i32 decision value")]
    BranchTooLarge { size: u32 },

    #[error("composite ability exposes no sub-layout")]
    MissingSubLayout,

    #[error("link cached buffer type {cached} but the ability reports {actual}")]
    TypeChanged {
        cached: BufferType,
        actual: BufferType,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LayoutError {
    #[error("invalid layout for ability `{ability}` ({id}): {fault}")]
    InvalidLayout {
        id: AbilityId,
        ability: String,
        fault: LayoutFault,
    },

    #[error("link references {0}, which is not attached")]
    DanglingLink(AbilityId),
}

impl LayoutError {
    pub fn fault(&self) -> Option<LayoutFault> {
        match self {
            Self::InvalidLayout { fault, .. } => Some(*fault),
            Self::DanglingLink(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DispatchError {
    /// The decision vector does not have the shape the current links consume.
    ///
    /// `first_affected` names the first ability (in slot order) whose slice falls
    /// outside the supplied vector; it is `None` when the vector is too long.
    #[error(
        "tick {tick}: decision vector has {actual_discrete} discrete / {actual_continuous} continuous slots, expected {expected_discrete} / {expected_continuous} (first affected ability: {})",
        .first_affected.as_deref().unwrap_or("none")
    )]
    BufferShapeMismatch {
        tick: u64,
        expected_discrete: usize,
        actual_discrete: usize,
        expected_continuous: usize,
        actual_continuous: usize,
        first_affected: Option<String>,
    },

    #[error("tick {tick}: link references {id}, which is not attached")]
    DanglingLink { tick: u64, id: AbilityId },
}

/// Error returned by an ability's setup hook.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct SetupError {
    message: String,
}

impl SetupError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// One ability whose setup hook failed. The ability stays registered.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("setup of ability `{ability}` ({id}) failed: {error}")]
pub struct SetupFailure {
    pub id: AbilityId,
    pub ability: String,
    #[source]
    pub error: SetupError,
}

/// More than one ability matched a single-result lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("{matches} abilities of type `{type_name}` are attached, expected at most one")]
pub struct AmbiguousLookup {
    pub type_name: &'static str,
    pub matches: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ControllerError {
    #[error(transparent)]
    Layout(#[from] LayoutError),

    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    #[error("{agent}: abilities cannot be attached or detached while an episode is running")]
    StructureLocked { agent: String },

    #[error("{agent}: no episode is running")]
    NotRunning { agent: String },
}
