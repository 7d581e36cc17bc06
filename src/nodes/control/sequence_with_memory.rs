//! Like `Sequence`, but a `Failure` does not rewind `child_idx` back to the
//! start, the loop resumes from the failed child on the next activation
//! instead of re-running already-succeeded ones. Grounded on the original
//! engine's `SequenceWithMemoryNode` (there named `SequenceStarNode`).

use crate::basic_types::{NodeCategory, NodeStatus, PortsList};
use crate::error::{NodeError, NodeResult};
use crate::factory::BuildableNode;
use crate::node::{execute_tick, halt_children, reset_children, NodeData, NodePtr, TreeNode};
use crate::observer::Observer;
use crate::ports::NodeConfig;

pub struct SequenceWithMemoryNode {
    data: NodeData,
    child_idx: usize,
    all_skipped: bool,
}

impl TreeNode for SequenceWithMemoryNode {
    fn tick(&mut self, observer: Option<&dyn Observer>) -> NodeResult {
        if self.data.status == NodeStatus::Idle {
            self.all_skipped = true;
        }
        self.data.status = NodeStatus::Running;

        while self.child_idx < self.data.children.len() {
            let child = self.data.children[self.child_idx].clone();
            let child_status =
                execute_tick(&child, observer).map_err(|e| NodeError::Propagated(Box::new(e)))?;

            self.all_skipped &= child_status == NodeStatus::Skipped;

            match child_status {
                NodeStatus::Running => return Ok(NodeStatus::Running),
                NodeStatus::Failure => {
                    halt_children(&self.data.children[self.child_idx..]);
                    return Ok(NodeStatus::Failure);
                }
                NodeStatus::Success | NodeStatus::Skipped => self.child_idx += 1,
                NodeStatus::Idle => {
                    return Err(NodeError::IllegalIdle(self.data.full_path.clone()))
                }
            }
        }

        reset_children(&self.data.children);
        self.child_idx = 0;
        Ok(if self.all_skipped {
            NodeStatus::Skipped
        } else {
            NodeStatus::Success
        })
    }

    fn halt(&mut self) {
        self.child_idx = 0;
        reset_children(&self.data.children);
    }

    fn node_data(&self) -> &NodeData {
        &self.data
    }

    fn node_data_mut(&mut self) -> &mut NodeData {
        &mut self.data
    }
}

impl BuildableNode for SequenceWithMemoryNode {
    fn provided_ports() -> PortsList {
        PortsList::new()
    }

    fn category() -> NodeCategory {
        NodeCategory::Control
    }

    fn build(config: NodeConfig, children: Vec<NodePtr>) -> Self {
        let mut data = NodeData::new(String::new(), String::new(), config);
        data.children = children;
        Self {
            data,
            child_idx: 0,
            all_skipped: false,
        }
    }
}
