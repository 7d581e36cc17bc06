//! Ticks a condition child, then one of two branches depending on the
//! result. 2 children means "if-then" with an implicit no-op else; 3 means
//! "if-then-else". Grounded on the original engine's composite family,
//! generalized into this shape (the original engine doesn't carry this
//! node under this exact name; its structure follows `Sequence`/
//! `Fallback`'s index-tracking style).

use crate::basic_types::{NodeCategory, NodeStatus, PortsList};
use crate::error::{NodeError, NodeResult};
use crate::factory::BuildableNode;
use crate::node::{execute_tick, reset_children, NodeData, NodePtr, TreeNode};
use crate::observer::Observer;
use crate::ports::NodeConfig;

pub struct IfThenElseNode {
    data: NodeData,
    running_branch: Option<usize>,
}

impl TreeNode for IfThenElseNode {
    fn tick(&mut self, observer: Option<&dyn Observer>) -> NodeResult {
        let child_count = self.data.children.len();
        if !(2..=3).contains(&child_count) {
            return Err(NodeError::StructureError(format!(
                "[{}]: IfThenElse requires 2 or 3 children",
                self.data.full_path
            )));
        }
        self.data.status = NodeStatus::Running;

        if let Some(branch) = self.running_branch {
            let child = self.data.children[branch].clone();
            let status =
                execute_tick(&child, observer).map_err(|e| NodeError::Propagated(Box::new(e)))?;
            if status.is_completed() {
                self.running_branch = None;
                reset_children(&self.data.children);
            }
            return Ok(status);
        }

        let condition = self.data.children[0].clone();
        let condition_status = execute_tick(&condition, observer)
            .map_err(|e| NodeError::Propagated(Box::new(e)))?;

        match condition_status {
            NodeStatus::Running => Ok(NodeStatus::Running),
            NodeStatus::Idle => Err(NodeError::IllegalIdle(self.data.full_path.clone())),
            NodeStatus::Success => self.run_branch(1, observer),
            NodeStatus::Failure | NodeStatus::Skipped => {
                if child_count == 3 {
                    self.run_branch(2, observer)
                } else {
                    Ok(NodeStatus::Failure)
                }
            }
        }
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

impl IfThenElseNode {
    fn run_branch(&mut self, index: usize, observer: Option<&dyn Observer>) -> NodeResult {
        let child = self.data.children[index].clone();
        let status =
            execute_tick(&child, observer).map_err(|e| NodeError::Propagated(Box::new(e)))?;
        if status.is_running() {
            self.running_branch = Some(index);
        } else {
            reset_children(&self.data.children);
        }
        Ok(status)
    }
}

impl BuildableNode for IfThenElseNode {
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
