//! Re-ticks the child after each `Failure`, up to `num_attempts` times
//! (`-1` means unlimited); a `Success` stops the loop immediately.
//! Grounded on the original engine's `RetryNode` (there `RetryNode`, exposed
//! in this crate as `RetryUntilSuccessful`).

use crate::basic_types::{ports, NodeCategory, NodeStatus, Port, PortsList};
use crate::error::{NodeError, NodeResult};
use crate::factory::BuildableNode;
use crate::node::{execute_tick, reset_children, NodeData, NodePtr, TreeNode};
use crate::observer::Observer;
use crate::ports::NodeConfig;

pub struct RetryNode {
    data: NodeData,
    try_count: usize,
    all_skipped: bool,
}

impl TreeNode for RetryNode {
    fn tick(&mut self, observer: Option<&dyn Observer>) -> NodeResult {
        let max_attempts: i64 = self.data.config.get_input("num_attempts")?;

        let mut do_loop = (self.try_count as i64) < max_attempts || max_attempts < 0;

        if self.data.status == NodeStatus::Idle {
            self.all_skipped = true;
        }
        self.data.status = NodeStatus::Running;

        while do_loop {
            let child = self.data.children[0].clone();
            let child_status = execute_tick(&child, observer)
                .map_err(|e| NodeError::Propagated(Box::new(e)))?;

            self.all_skipped &= child_status == NodeStatus::Skipped;

            match child_status {
                NodeStatus::Success => {
                    self.try_count = 0;
                    reset_children(&self.data.children);
                    return Ok(NodeStatus::Success);
                }
                NodeStatus::Failure => {
                    self.try_count += 1;
                    do_loop = (self.try_count as i64) < max_attempts || max_attempts < 0;
                    reset_children(&self.data.children);
                }
                NodeStatus::Running => return Ok(NodeStatus::Running),
                NodeStatus::Skipped => {
                    reset_children(&self.data.children);
                    return Ok(NodeStatus::Skipped);
                }
                NodeStatus::Idle => {
                    return Err(NodeError::IllegalIdle(self.data.full_path.clone()))
                }
            }
        }

        self.try_count = 0;
        Ok(if self.all_skipped {
            NodeStatus::Skipped
        } else {
            NodeStatus::Failure
        })
    }

    fn halt(&mut self) {
        self.try_count = 0;
        reset_children(&self.data.children);
    }

    fn node_data(&self) -> &NodeData {
        &self.data
    }

    fn node_data_mut(&mut self) -> &mut NodeData {
        &mut self.data
    }
}

impl BuildableNode for RetryNode {
    fn provided_ports() -> PortsList {
        ports([Port::input::<i64>("num_attempts").default(-1i64)])
    }

    fn category() -> NodeCategory {
        NodeCategory::Decorator
    }

    fn build(config: NodeConfig, children: Vec<NodePtr>) -> Self {
        let mut data = NodeData::new(String::new(), String::new(), config);
        data.children = children;
        Self {
            data,
            try_count: 0,
            all_skipped: true,
        }
    }
}
