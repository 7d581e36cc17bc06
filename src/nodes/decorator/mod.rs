//! Single-child wrapper nodes. Grounded on the original engine's
//! `nodes::decorator` family (`InverterNode`, `ForceSuccessNode`,
//! `RepeatNode`, `RetryNode`, `RunOnceNode`, ...), generalized to this
//! engine's synchronous `execute_tick` boundary.

pub mod delay;
pub mod force_failure;
pub mod force_success;
pub mod inverter;
pub mod keep_running_until_failure;
pub mod precondition;
pub mod repeat;
pub mod retry;
pub mod run_once;
pub mod subtree;
pub mod timeout;

pub use delay::DelayNode;
pub use force_failure::ForceFailureNode;
pub use force_success::ForceSuccessNode;
pub use inverter::InverterNode;
pub use keep_running_until_failure::KeepRunningUntilFailureNode;
pub use precondition::PreconditionNode;
pub use repeat::RepeatNode;
pub use retry::RetryNode;
pub use run_once::RunOnceNode;
pub use subtree::SubTreeNode;
pub use timeout::TimeoutNode;
