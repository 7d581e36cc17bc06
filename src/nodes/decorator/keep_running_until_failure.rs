//! Keeps reporting `Running` through any number of child `Success`es;
//! only a child `Failure` ends it. Grounded on the original engine's
//! `KeepRunningUntilFailureNode`.

use crate::basic_types::{NodeCategory, NodeStatus, PortsList};
use crate::error::{NodeError, NodeResult};
use crate::factory::BuildableNode;
use crate::node::{execute_tick, reset_children, NodeData, NodePtr, TreeNode};
use crate::observer::Observer;
use crate::ports::NodeConfig;

pub struct KeepRunningUntilFailureNode {
    data: NodeData,
}

impl TreeNode for KeepRunningUntilFailureNode {
    fn tick(&mut self, observer: Option<&dyn Observer>) -> NodeResult {
        self.data.status = NodeStatus::Running;

        let child = self.data.children[0].clone();
        let child_status =
            execute_tick(&child, observer).map_err(|e| NodeError::Propagated(Box::new(e)))?;

        match child_status {
            NodeStatus::Success => {
                reset_children(&self.data.children);
                Ok(NodeStatus::Running)
            }
            NodeStatus::Failure => {
                reset_children(&self.data.children);
                Ok(NodeStatus::Failure)
            }
            NodeStatus::Idle => Err(NodeError::IllegalIdle(self.data.full_path.clone())),
            NodeStatus::Running | NodeStatus::Skipped => Ok(NodeStatus::Running),
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

impl BuildableNode for KeepRunningUntilFailureNode {
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
