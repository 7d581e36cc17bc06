use std::any::Any;

use thiserror::Error;

use crate::any_value::Canonical;

/// Errors a node's own `tick()` can raise. Distinguishes programmer mistakes
/// ("logic errors" in the engine's vocabulary) from data-dependent failures
/// ("runtime errors"), though both are represented by this one enum, the
/// taxonomy is in the variant, not the type.
#[derive(Debug, Error)]
pub enum NodeError {
    /// `tick()` (or one of its sync/async hooks) returned `Idle`, which is
    /// never a legal return value.
    #[error("node returned NodeStatus::Idle from {0}, which is never a legal return value")]
    IllegalIdle(String),
    /// A synchronous action or condition returned `Running`.
    #[error("synchronous node '{0}' returned NodeStatus::Running, which is not allowed")]
    IllegalRunning(String),
    /// Requested port isn't in the node's port map.
    #[error("couldn't find port '{0}'")]
    PortNotFound(String),
    /// Blackboard lookup missed.
    #[error("couldn't find blackboard entry '{0}'")]
    MissingKey(String),
    /// String-to-T conversion failed (port literal or blackboard string donor).
    #[error("couldn't parse port '{0}' into the expected type")]
    ConversionFailed(String),
    /// Safe numeric cast rejected the write.
    #[error("numeric value {0:?} cannot be safely represented in the target type")]
    NumericCastFailed(Canonical),
    /// Blackboard entry is locked to an incompatible type.
    #[error("blackboard entry '{0}' is locked to type `{1}`, incompatible with `{2}`")]
    TypeLocked(String, &'static str, &'static str),
    /// Tree shape doesn't satisfy a node's structural requirement (child
    /// count, etc).
    #[error("{0}")]
    StructureError(String),
    /// Child index out of bounds.
    #[error("child index out of bounds")]
    IndexError,
    /// A decorator was ticked/halted before its child was attached.
    #[error("decorator has no child")]
    ChildMissing,
    /// Escape hatch for errors raised by user leaf-node code.
    #[error(transparent)]
    User(#[from] anyhow::Error),
    /// A descendant's tick already failed and was wrapped into a
    /// `NodeExecutionError`; this variant lets that error travel back up
    /// through intermediate composites' `?` operators without being
    /// re-wrapped at every layer. `execute_tick` unwraps it again before
    /// it reaches the caller.
    #[error(transparent)]
    Propagated(#[from] Box<NodeExecutionError>),
}

pub type NodeResult<T = crate::basic_types::NodeStatus> = Result<T, NodeError>;

/// Identifies the node whose `tick()` raised, for diagnostics. Assembled
/// once at tree-construction time (name, path, registration-id are all
/// static for the lifetime of the tree), so it's cheap to clone into an
/// error.
#[derive(Debug, Clone)]
pub struct TickBacktraceEntry {
    pub instance_name: String,
    pub full_path: String,
    pub registration_id: String,
}

/// The error type that crosses the `execute_tick` boundary. Carries exactly
/// one `TickBacktraceEntry`, the node where the failure originated, no
/// matter how many composites it unwinds through on its way to the host.
#[derive(Debug, Error)]
#[error("[{}] ({}): {source}", backtrace.full_path, backtrace.registration_id)]
pub struct NodeExecutionError {
    pub backtrace: TickBacktraceEntry,
    #[source]
    pub source: NodeError,
}

impl NodeExecutionError {
    pub(crate) fn from_panic(backtrace: TickBacktraceEntry, payload: Box<dyn Any + Send>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "node panicked with a non-string payload".to_string()
        };

        Self {
            backtrace,
            source: NodeError::User(anyhow::anyhow!(message)),
        }
    }
}

#[derive(Debug, Error)]
pub enum FactoryError {
    #[error("no builder registered for node type '{0}'")]
    UnknownNodeType(String),
    #[error("unknown subtree '{0}'")]
    UnknownSubtree(String),
    #[error("{0}")]
    StructureError(String),
}
