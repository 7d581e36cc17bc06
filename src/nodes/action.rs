//! Synchronous leaf variants: plain actions, conditions (same contract,
//! different registration category), and stateful actions that keep
//! `on_start`/`on_running` state across ticks. Grounded on the original
//! engine's `SyncActionNode`/`StatefulActionNode` split, generalized into
//! one generic wrapper per variant instead of the original engine's
//! attribute-macro-generated struct per user type.

use std::marker::PhantomData;

use crate::basic_types::{NodeCategory, PortsList};
use crate::error::{NodeError, NodeResult};
use crate::factory::BuildableNode;
use crate::node::{NodeData, NodePtr, TreeNode};
use crate::observer::Observer;
use crate::ports::NodeConfig;

/// User logic for a synchronous action: completes within one `tick()`,
/// never returns `Running`.
pub trait SyncAction: 'static {
    fn tick(config: &NodeConfig) -> NodeResult;

    fn provided_ports() -> PortsList {
        PortsList::new()
    }
}

pub struct SyncActionNode<A: SyncAction> {
    data: NodeData,
    _marker: PhantomData<A>,
}

impl<A: SyncAction> TreeNode for SyncActionNode<A> {
    fn tick(&mut self, _observer: Option<&dyn Observer>) -> NodeResult {
        let status = A::tick(&self.data.config)?;
        if status.is_running() {
            return Err(NodeError::IllegalRunning(self.data.full_path.clone()));
        }
        Ok(status)
    }

    fn halt(&mut self) {}

    fn node_data(&self) -> &NodeData {
        &self.data
    }

    fn node_data_mut(&mut self) -> &mut NodeData {
        &mut self.data
    }
}

impl<A: SyncAction> BuildableNode for SyncActionNode<A> {
    fn provided_ports() -> PortsList {
        A::provided_ports()
    }

    fn category() -> NodeCategory {
        NodeCategory::Action
    }

    fn build(config: NodeConfig, _children: Vec<NodePtr>) -> Self {
        Self {
            data: NodeData::new(String::new(), String::new(), config),
            _marker: PhantomData,
        }
    }
}

/// Same contract as `SyncAction`, registered under `NodeCategory::Condition`
/// purely so diagnostics and the factory's structural checks can tell a
/// condition leaf from an action leaf.
pub trait Condition: 'static {
    fn tick(config: &NodeConfig) -> NodeResult;

    fn provided_ports() -> PortsList {
        PortsList::new()
    }
}

pub struct ConditionNode<C: Condition> {
    data: NodeData,
    _marker: PhantomData<C>,
}

impl<C: Condition> TreeNode for ConditionNode<C> {
    fn tick(&mut self, _observer: Option<&dyn Observer>) -> NodeResult {
        let status = C::tick(&self.data.config)?;
        if status.is_running() {
            return Err(NodeError::IllegalRunning(self.data.full_path.clone()));
        }
        Ok(status)
    }

    fn halt(&mut self) {}

    fn node_data(&self) -> &NodeData {
        &self.data
    }

    fn node_data_mut(&mut self) -> &mut NodeData {
        &mut self.data
    }
}

impl<C: Condition> BuildableNode for ConditionNode<C> {
    fn provided_ports() -> PortsList {
        C::provided_ports()
    }

    fn category() -> NodeCategory {
        NodeCategory::Condition
    }

    fn build(config: NodeConfig, _children: Vec<NodePtr>) -> Self {
        Self {
            data: NodeData::new(String::new(), String::new(), config),
            _marker: PhantomData,
        }
    }
}

/// User logic for a stateful action: `on_start` runs the first tick of an
/// activation, `on_running` every tick after that while still `Running`,
/// `on_halted` if the node is cancelled mid-flight.
pub trait StatefulAction: 'static {
    fn on_start(config: &NodeConfig) -> NodeResult;

    fn on_running(config: &NodeConfig) -> NodeResult;

    fn on_halted(_config: &NodeConfig) {}

    fn provided_ports() -> PortsList {
        PortsList::new()
    }
}

pub struct StatefulActionNode<A: StatefulAction> {
    data: NodeData,
    started: bool,
    _marker: PhantomData<A>,
}

impl<A: StatefulAction> TreeNode for StatefulActionNode<A> {
    fn tick(&mut self, _observer: Option<&dyn Observer>) -> NodeResult {
        let status = if self.started {
            A::on_running(&self.data.config)?
        } else {
            A::on_start(&self.data.config)?
        };

        self.started = status.is_running();
        Ok(status)
    }

    fn halt(&mut self) {
        if self.started {
            A::on_halted(&self.data.config);
        }
        self.started = false;
    }

    fn node_data(&self) -> &NodeData {
        &self.data
    }

    fn node_data_mut(&mut self) -> &mut NodeData {
        &mut self.data
    }
}

impl<A: StatefulAction> BuildableNode for StatefulActionNode<A> {
    fn provided_ports() -> PortsList {
        A::provided_ports()
    }

    fn category() -> NodeCategory {
        NodeCategory::Action
    }

    fn build(config: NodeConfig, _children: Vec<NodePtr>) -> Self {
        Self {
            data: NodeData::new(String::new(), String::new(), config),
            started: false,
            _marker: PhantomData,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::basic_types::NodeStatus;
    use crate::blackboard::Blackboard;

    struct AlwaysSuccess;
    impl SyncAction for AlwaysSuccess {
        fn tick(_config: &NodeConfig) -> NodeResult {
            Ok(NodeStatus::Success)
        }
    }

    #[test]
    fn sync_action_rejects_running() {
        struct Broken;
        impl SyncAction for Broken {
            fn tick(_config: &NodeConfig) -> NodeResult {
                Ok(NodeStatus::Running)
            }
        }

        let config = NodeConfig::new(Blackboard::create());
        let mut node = SyncActionNode::<Broken>::build(config, Vec::new());
        assert!(matches!(
            node.tick(None),
            Err(NodeError::IllegalRunning(_))
        ));
    }

    #[test]
    fn sync_action_runs_to_completion() {
        let config = NodeConfig::new(Blackboard::create());
        let mut node = SyncActionNode::<AlwaysSuccess>::build(config, Vec::new());
        assert_eq!(node.tick(None).unwrap(), NodeStatus::Success);
    }

    #[test]
    fn stateful_action_tracks_running_across_ticks() {
        struct CountToTwo;
        impl StatefulAction for CountToTwo {
            fn on_start(_config: &NodeConfig) -> NodeResult {
                Ok(NodeStatus::Running)
            }
            fn on_running(_config: &NodeConfig) -> NodeResult {
                Ok(NodeStatus::Success)
            }
        }

        let config = NodeConfig::new(Blackboard::create());
        let mut node = StatefulActionNode::<CountToTwo>::build(config, Vec::new());
        assert_eq!(node.tick(None).unwrap(), NodeStatus::Running);
        assert_eq!(node.tick(None).unwrap(), NodeStatus::Success);
    }
}
