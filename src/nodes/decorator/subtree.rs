//! Transparent wrapper placed at a subtree's entry point. Not looked up
//! through the registration-id map like other nodes, `Factory::build`
//! constructs one directly via `from_parts` whenever a `Blueprint::Subtree`
//! is resolved, after the subtree's own root has already been built on its
//! own (child) blackboard.

use crate::basic_types::NodeStatus;
use crate::error::{NodeError, NodeResult};
use crate::node::{execute_tick, NodeData, TreeNode};
use crate::observer::Observer;

pub struct SubTreeNode {
    data: NodeData,
}

impl SubTreeNode {
    pub fn from_parts(data: NodeData) -> Self {
        Self { data }
    }
}

impl TreeNode for SubTreeNode {
    fn tick(&mut self, observer: Option<&dyn Observer>) -> NodeResult {
        self.data.status = NodeStatus::Running;
        let child = self.data.children[0].clone();
        execute_tick(&child, observer).map_err(|e| NodeError::Propagated(Box::new(e)))
    }

    fn halt(&mut self) {
        let child = self.data.children[0].clone();
        let is_running = child.borrow().node_data().status.is_running();
        if is_running {
            child.borrow_mut().halt();
        }
    }

    fn node_data(&self) -> &NodeData {
        &self.data
    }

    fn node_data_mut(&mut self) -> &mut NodeData {
        &mut self.data
    }
}
