//! Embeddable behavior-tree runtime, modeled after BehaviorTree.CPP.
//!
//! A tree is assembled once (`Factory::create_tree`) and then driven by a
//! host application calling `Tree::tick_once`/`tick_while_running` in a
//! loop. Control and decorator nodes compose a deterministic traversal;
//! leaf nodes read/write a typed, type-locking `Blackboard` through their
//! declared ports and do the actual work.
//!
//! See [`factory`] for how trees are built, [`tree`] for the tick driver,
//! and [`blackboard`] for the shared data store's type-locking rules.

pub mod any_value;
pub mod basic_types;
pub mod blackboard;
pub mod error;
pub mod factory;
pub mod node;
pub mod nodes;
pub mod observer;
pub mod ports;
pub mod tree;

pub use any_value::{Canonical, Dynamic, FromCanonical};
pub use basic_types::{
    ports, FromString, NodeCategory, NodeStatus, Port, PortDirection, PortInfo, PortsList,
    PortsRemapping, TreeNodeManifest,
};
pub use blackboard::Blackboard;
pub use error::{FactoryError, NodeError, NodeExecutionError, NodeResult, TickBacktraceEntry};
pub use factory::{Blueprint, BuildableNode, Factory};
pub use node::{execute_tick, halt_children, reset_children, NodeData, NodePtr, TreeNode, WakeHandle};
pub use observer::{Observer, RecordingObserver};
pub use ports::NodeConfig;
pub use tree::{Subtree, Tree, TickResult};
