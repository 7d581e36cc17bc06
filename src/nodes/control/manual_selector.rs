//! Non-interactive stub. The original engine's `ManualSelectorNode` drives
//! an interactive terminal prompt to pick which child to run; that's out of
//! scope here (no terminal UI), but the registration surface is kept
//! complete. `tick()` always returns the status configured on its
//! `default_status` port.

use crate::basic_types::{ports, NodeCategory, NodeStatus, Port, PortsList};
use crate::error::{NodeError, NodeResult};
use crate::factory::BuildableNode;
use crate::node::{NodeData, NodePtr, TreeNode};
use crate::observer::Observer;
use crate::ports::NodeConfig;

pub struct ManualSelectorNode {
    data: NodeData,
}

impl TreeNode for ManualSelectorNode {
    fn tick(&mut self, _observer: Option<&dyn Observer>) -> NodeResult {
        let status: String = self
            .data
            .config
            .get_input("default_status")
            .unwrap_or_else(|_| "FAILURE".to_string());

        match status.as_str() {
            "SUCCESS" => Ok(NodeStatus::Success),
            "FAILURE" => Ok(NodeStatus::Failure),
            other => Err(NodeError::ConversionFailed(format!(
                "default_status '{other}' is not SUCCESS or FAILURE"
            ))),
        }
    }

    fn halt(&mut self) {}

    fn node_data(&self) -> &NodeData {
        &self.data
    }

    fn node_data_mut(&mut self) -> &mut NodeData {
        &mut self.data
    }
}

impl BuildableNode for ManualSelectorNode {
    fn provided_ports() -> PortsList {
        ports([Port::input::<String>("default_status").default("FAILURE".to_string())])
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
