//! Like `IfThenElse`, but the condition is re-evaluated on every tick
//! (reactive): switching from `do` to `else` or back halts whichever branch
//! was running first. 2 children means "while-do" with an implicit
//! `Failure` else. Grounded on the same composite family as
//! `IfThenElseNode`, generalized with `ReactiveSequence`'s re-tick-from-top
//! discipline.

use crate::basic_types::{NodeCategory, NodeStatus, PortsList};
use crate::error::{NodeError, NodeResult};
use crate::factory::BuildableNode;
use crate::node::{execute_tick, reset_children, NodeData, NodePtr, TreeNode};
use crate::observer::Observer;
use crate::ports::NodeConfig;

pub struct WhileDoElseNode {
    data: NodeData,
    running_branch: Option<usize>,
}

impl TreeNode for WhileDoElseNode {
    fn tick(&mut self, observer: Option<&dyn Observer>) -> NodeResult {
        let child_count = self.data.children.len();
        if !(2..=3).contains(&child_count) {
            return Err(NodeError::StructureError(format!(
                "[{}]: WhileDoElse requires 2 or 3 children",
                self.data.full_path
            )));
        }
        self.data.status = NodeStatus::Running;

        let condition = self.data.children[0].clone();
        let condition_status = execute_tick(&condition, observer)
            .map_err(|e| NodeError::Propagated(Box::new(e)))?;

        let target_branch = match condition_status {
            NodeStatus::Running => return Ok(NodeStatus::Running),
            NodeStatus::Idle => return Err(NodeError::IllegalIdle(self.data.full_path.clone())),
            NodeStatus::Success => 1,
            NodeStatus::Failure | NodeStatus::Skipped => {
                if child_count == 3 {
                    2
                } else {
                    self.running_branch = None;
                    return Ok(NodeStatus::Failure);
                }
            }
        };

        if let Some(previous) = self.running_branch {
            if previous != target_branch {
                self.data.children[previous].borrow_mut().halt();
            }
        }

        let branch = self.data.children[target_branch].clone();
        let status =
            execute_tick(&branch, observer).map_err(|e| NodeError::Propagated(Box::new(e)))?;

        if status.is_running() {
            self.running_branch = Some(target_branch);
        } else {
            self.running_branch = None;
        }

        Ok(status)
    }

    fn halt(&mut self) {
        self.running_branch = None;
        reset_children(&self.data.children);
    }

    fn node_data(&self) -> &NodeData {
        &self.data
    }

    fn node_data_mut(&mut self) -> &mut NodeData {
        &mut self.data
    }
}

impl BuildableNode for WhileDoElseNode {
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
            running_branch: None,
        }
    }
}
