//! Node kind implementations, grouped the way the original engine groups
//! them: leaf variants at this level, composites under `control/`,
//! single-child wrappers under `decorator/`.

pub mod action;
pub mod control;
pub mod coroutine;
pub mod decorator;
pub mod threaded;

pub use action::{ConditionNode, StatefulActionNode, SyncActionNode};
pub use coroutine::CoroutineActionNode;
pub use threaded::ThreadedActionNode;
