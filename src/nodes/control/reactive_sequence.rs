//! Re-ticks every child from the first one on every activation (unlike
//! `Sequence`, which remembers where it left off). Grounded on the
//! original engine's `ReactiveSequenceNode`.

use crate::basic_types::{NodeCategory, NodeStatus, PortsList};
use crate::error::{NodeError, NodeResult};
use crate::factory::BuildableNode;
use crate::node::{execute_tick, halt_children, reset_children, NodeData, NodePtr, TreeNode};
use crate::observer::Observer;
use crate::ports::NodeConfig;

pub struct ReactiveSequenceNode {
    data: NodeData,
}

impl TreeNode for ReactiveSequenceNode {
    fn tick(&mut self, observer: Option<&dyn Observer>) -> NodeResult {
        let mut all_skipped = true;
        self.data.status = NodeStatus::Running;

        for index in 0..self.data.children.len() {
            let child = self.data.children[index].clone();
            let child_status =
                execute_tick(&child, observer).map_err(|e| NodeError::Propagated(Box::new(e)))?;

            all_skipped &= child_status == NodeStatus::Skipped;

            match child_status {
                NodeStatus::Running => {
                    // A prior tick may have left a *later* child running
                    // (its running index can only regress here, since this
                    // child resolved to `Running` before reaching it), so
                    // halt on both sides of `index`, not just the prefix.
                    halt_children(&self.data.children[..index]);
                    halt_children(&self.data.children[index + 1..]);
                    return Ok(NodeStatus::Running);
                }
                NodeStatus::Failure => {
                    reset_children(&self.data.children);
                    return Ok(NodeStatus::Failure);
                }
                NodeStatus::Success => {}
                NodeStatus::Skipped => child.borrow_mut().halt(),
                NodeStatus::Idle => {
                    return Err(NodeError::IllegalIdle(self.data.full_path.clone()))
                }
            }
        }

        reset_children(&self.data.children);
        Ok(if all_skipped {
            NodeStatus::Skipped
        } else {
            NodeStatus::Success
        })
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

impl BuildableNode for ReactiveSequenceNode {
    fn provided_ports() -> PortsList {
        PortsList::new()
    }

    fn category() -> NodeCategory {
        NodeCategory::Control
    }

    fn build(config: NodeConfig, children: Vec<NodePtr>) -> Self {
        let mut data = NodeData::new(String::new(), String::new(), config);
        data.children = children;
        Self { data }
    }
}
