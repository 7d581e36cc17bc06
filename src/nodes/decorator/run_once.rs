//! Ticks the child through to completion exactly once, then either repeats
//! that same result forever or reports `Skipped`, depending on the
//! `then_skip` port. Grounded on the original engine's `RunOnceNode`.

use crate::basic_types::{ports, NodeCategory, NodeStatus, Port, PortsList};
use crate::error::{NodeError, NodeResult};
use crate::factory::BuildableNode;
use crate::node::{execute_tick, reset_children, NodeData, NodePtr, TreeNode};
use crate::observer::Observer;
use crate::ports::NodeConfig;

pub struct RunOnceNode {
    data: NodeData,
    already_ticked: bool,
    returned_status: NodeStatus,
}

impl TreeNode for RunOnceNode {
    fn tick(&mut self, observer: Option<&dyn Observer>) -> NodeResult {
        let then_skip: bool = self.data.config.get_input("then_skip")?;

        if self.already_ticked {
            return Ok(if then_skip {
                NodeStatus::Skipped
            } else {
                self.returned_status
            });
        }

        self.data.status = NodeStatus::Running;

        let child = self.data.children[0].clone();
        let status =
            execute_tick(&child, observer).map_err(|e| NodeError::Propagated(Box::new(e)))?;

        if status.is_completed() {
            self.already_ticked = true;
            self.returned_status = status;
            reset_children(&self.data.children);
        }

        Ok(status)
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

impl BuildableNode for RunOnceNode {
    fn provided_ports() -> PortsList {
        ports([Port::input::<bool>("then_skip").default(true)])
    }

    fn category() -> NodeCategory {
        NodeCategory::Decorator
    }

    fn build(config: NodeConfig, children: Vec<NodePtr>) -> Self {
        let mut data = NodeData::new(String::new(), String::new(), config);
        data.children = children;
        Self {
            data,
            already_ticked: false,
            returned_status: NodeStatus::Idle,
        }
    }
}
