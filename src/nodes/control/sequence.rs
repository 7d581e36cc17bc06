//! Ticks children in order; a `Failure` stops the loop immediately and
//! resets every child back to `Idle`. Grounded on the original engine's
//! `SequenceNode`.

use crate::basic_types::{NodeCategory, NodeStatus, PortsList};
use crate::error::{NodeError, NodeResult};
use crate::factory::BuildableNode;
use crate::node::{execute_tick, reset_children, NodeData, NodePtr, TreeNode};
use crate::observer::Observer;
use crate::ports::NodeConfig;

pub struct SequenceNode {
    data: NodeData,
    child_idx: usize,
    all_skipped: bool,
}

impl TreeNode for SequenceNode {
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
                NodeStatus::Failure => {
                    reset_children(&self.data.children);
                    self.child_idx = 0;
                    return Ok(NodeStatus::Failure);
                }
                NodeStatus::Success | NodeStatus::Skipped => self.child_idx += 1,
                NodeStatus::Running => return Ok(NodeStatus::Running),
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

impl BuildableNode for SequenceNode {
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

    struct AlwaysFailure;
    impl SyncAction for AlwaysFailure {
        fn tick(_config: &NodeConfig) -> NodeResult {
            Ok(NodeStatus::Failure)
        }
    }

    fn leaf<A: SyncAction>(bb: &Blackboard) -> NodePtr {
        Rc::new(RefCell::new(SyncActionNode::<A>::build(
            NodeConfig::new(bb.clone()),
            Vec::new(),
        )))
    }

    #[test]
    fn stops_at_first_failure() {
        let bb = Blackboard::create();
        let children = vec![
            leaf::<AlwaysSuccess>(&bb),
            leaf::<AlwaysFailure>(&bb),
            leaf::<AlwaysSuccess>(&bb),
        ];
        let mut node = SequenceNode::build(NodeConfig::new(bb), children);
        assert_eq!(node.tick(None).unwrap(), NodeStatus::Failure);
    }

    #[test]
    fn all_success_returns_success() {
        let bb = Blackboard::create();
        let children = vec![leaf::<AlwaysSuccess>(&bb), leaf::<AlwaysSuccess>(&bb)];
        let mut node = SequenceNode::build(NodeConfig::new(bb), children);
        assert_eq!(node.tick(None).unwrap(), NodeStatus::Success);
    }
}
