//! Ticks the child only if a blackboard-backed `condition` port is true;
//! otherwise returns a configured status without touching the child at
//! all. Scripting-language precondition expressions are out of scope for
//! this engine; this is the same gate expressed as a plain typed port
//! instead of an expression string.

use crate::basic_types::{ports, NodeCategory, NodeStatus, Port, PortsList};
use crate::error::{NodeError, NodeResult};
use crate::factory::BuildableNode;
use crate::node::{execute_tick, reset_children, NodeData, NodePtr, TreeNode};
use crate::observer::Observer;
use crate::ports::NodeConfig;

pub struct PreconditionNode {
    data: NodeData,
}

impl TreeNode for PreconditionNode {
    fn tick(&mut self, observer: Option<&dyn Observer>) -> NodeResult {
        let condition: bool = self.data.config.get_input("condition")?;

        if !condition {
            if self.data.status == NodeStatus::Running {
                reset_children(&self.data.children);
            }
            let else_status: String = self
                .data
                .config
                .get_input("else")
                .unwrap_or_else(|_| "FAILURE".to_string());
            return match else_status.as_str() {
                "SUCCESS" => Ok(NodeStatus::Success),
                "SKIPPED" => Ok(NodeStatus::Skipped),
                _ => Ok(NodeStatus::Failure),
            };
        }

        self.data.status = NodeStatus::Running;
        let child = self.data.children[0].clone();
        let status =
            execute_tick(&child, observer).map_err(|e| NodeError::Propagated(Box::new(e)))?;

        if status.is_completed() {
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

impl BuildableNode for PreconditionNode {
    fn provided_ports() -> PortsList {
        ports([
            Port::input::<bool>("condition"),
            Port::input::<String>("else").default("FAILURE".to_string()),
        ])
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
