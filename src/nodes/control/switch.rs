//! Compares a `variable` port against `case_1..case_N` ports (as strings)
//! and ticks whichever child matches, falling back to the last child (the
//! default) if none do. Re-evaluated only at tick time, not reactively:
//! a value change between ticks has no effect until the next tick.
//! Grounded on the original engine's `SwitchNode<N>` (`gtest_switch.cpp`
//! documents the non-reactive, halt-on-change-of-branch behavior this
//! mirrors).

use crate::basic_types::{ports, NodeCategory, NodeStatus, Port, PortsList};
use crate::error::{NodeError, NodeResult};
use crate::factory::BuildableNode;
use crate::node::{execute_tick, reset_children, NodeData, NodePtr, TreeNode};
use crate::observer::Observer;
use crate::ports::NodeConfig;

pub struct SwitchNode<const N: usize> {
    data: NodeData,
    running_branch: Option<usize>,
}

impl<const N: usize> SwitchNode<N> {
    fn matching_branch(&self) -> NodeResult<usize> {
        let variable: String = self.data.config.get_input("variable").unwrap_or_default();
        for case in 0..N {
            let case_value: String = self
                .data
                .config
                .get_input(&format!("case_{}", case + 1))
                .unwrap_or_default();
            if !case_value.is_empty() && case_value == variable {
                return Ok(case);
            }
        }
        Ok(N)
    }
}

impl<const N: usize> TreeNode for SwitchNode<N> {
    fn tick(&mut self, observer: Option<&dyn Observer>) -> NodeResult {
        if self.data.children.len() != N + 1 {
            return Err(NodeError::StructureError(format!(
                "[{}]: Switch<{N}> requires exactly {} children",
                self.data.full_path,
                N + 1
            )));
        }
        self.data.status = NodeStatus::Running;

        let branch = self.matching_branch()?;

        if let Some(previous) = self.running_branch {
            if previous != branch {
                self.data.children[previous].borrow_mut().halt();
            }
        }

        let child = self.data.children[branch].clone();
        let status =
            execute_tick(&child, observer).map_err(|e| NodeError::Propagated(Box::new(e)))?;

        if status.is_running() {
            self.running_branch = Some(branch);
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

impl<const N: usize> BuildableNode for SwitchNode<N> {
    fn provided_ports() -> PortsList {
        let mut list = vec![Port::input::<String>("variable")];
        for case in 0..N {
            list.push(Port::input::<String>(format!("case_{}", case + 1)));
        }
        ports(list)
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
