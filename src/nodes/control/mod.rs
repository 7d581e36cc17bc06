//! Composite nodes: own an ordered list of children and decide which to
//! tick and how to combine their statuses. Grounded on the original engine's
//! `nodes::control` family (`SequenceNode`, `FallbackNode`,
//! `ReactiveSequenceNode`, `ParallelNode`, ...), generalized to this
//! engine's `Rc<RefCell<dyn TreeNode>>` child storage and synchronous
//! `execute_tick` boundary instead of the original engine's async/derive-macro one.

pub mod fallback;
pub mod if_then_else;
pub mod manual_selector;
pub mod parallel;
pub mod reactive_fallback;
pub mod reactive_sequence;
pub mod sequence;
pub mod sequence_with_memory;
pub mod switch;
pub mod try_catch;
pub mod while_do_else;

pub use fallback::FallbackNode;
pub use if_then_else::IfThenElseNode;
pub use manual_selector::ManualSelectorNode;
pub use parallel::ParallelNode;
pub use reactive_fallback::ReactiveFallbackNode;
pub use reactive_sequence::ReactiveSequenceNode;
pub use sequence::SequenceNode;
pub use sequence_with_memory::SequenceWithMemoryNode;
pub use switch::SwitchNode;
pub use try_catch::TryCatchNode;
pub use while_do_else::WhileDoElseNode;
