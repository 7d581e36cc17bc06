//! Flips `Success` to `Failure` and vice versa; `Running`/`Skipped` pass
//! through unchanged. Grounded on the original engine's `InverterNode`.

use crate::basic_types::{NodeCategory, NodeStatus, PortsList};
use crate::error::{NodeError, NodeResult};
use crate::factory::BuildableNode;
use crate::node::{execute_tick, reset_children, NodeData, NodePtr, TreeNode};
use crate::observer::Observer;
use crate::ports::NodeConfig;

pub struct InverterNode {
    data: NodeData,
}

impl TreeNode for InverterNode {
    fn tick(&mut self, observer: Option<&dyn Observer>) -> NodeResult {
        self.data.status = NodeStatus::Running;

        let child = self.data.children[0].clone();
        let child_status =
            execute_tick(&child, observer).map_err(|e| NodeError::Propagated(Box::new(e)))?;

        match child_status {
            NodeStatus::Success => {
                reset_children(&self.data.children);
                Ok(NodeStatus::Failure)
            }
            NodeStatus::Failure => {
                reset_children(&self.data.children);
                Ok(NodeStatus::Success)
            }
            status @ (NodeStatus::Running | NodeStatus::Skipped) => Ok(status),
            NodeStatus::Idle => Err(NodeError::IllegalIdle(self.data.full_path.clone())),
        }
    }

    fn halt(&mut self) {
        reset_children(&self.data.children);
    }

    fn node_data(&self) -> &NodeData {
        &self.data
    }

    fn node_data_mut(&mut self) -> &mut NodeData {
        &mut self.data
    }
}

impl BuildableNode for InverterNode {
    fn provided_ports() -> PortsList {
        PortsList::new()
    }

    fn category() -> NodeCategory {
        NodeCategory::Decorator
    }

    fn build(config: NodeConfig, children: Vec<NodePtr>) -> Self {
        let mut data = NodeData::new(String::new(), String::new(), config);
        data.children = children;
        Self { data }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blackboard::Blackboard;
    use crate::nodes::action::{SyncAction, SyncActionNode};
    use std::cell::RefCell;
    use std::rc::Rc;

    struct AlwaysSuccess;
    impl SyncAction for AlwaysSuccess {
        fn tick(_config: &NodeConfig) -> NodeResult {
            Ok(NodeStatus::Success)
        }
    }

    #[test]
    fn flips_success_to_failure() {
        let bb = Blackboard::create();
        let child = Rc::new(RefCell::new(SyncActionNode::<AlwaysSuccess>::build(
            NodeConfig::new(bb.clone()),
            Vec::new(),
        ))) as NodePtr;
        let mut node = InverterNode::build(NodeConfig::new(bb), vec![child]);
        assert_eq!(node.tick(None).unwrap(), NodeStatus::Failure);
    }
}
