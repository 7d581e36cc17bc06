//! Runs children `0..N-2` as a try-sequence and the last child as a catch
//! handler entered on the first try-child `Failure`. Grounded verbatim on
//! the original engine's `TryCatchNode` (`try_catch_node.cpp`): the
//! re-entrant tick-on-failure trick (falling straight into catch mode
//! within the same tick instead of waiting for the next one) and the
//! `catch_on_halt` synchronous-cleanup behavior both come from there.

use crate::basic_types::{NodeCategory, NodeStatus, PortsList};
use crate::error::{NodeError, NodeResult};
use crate::factory::BuildableNode;
use crate::node::{execute_tick, halt_children, reset_children, NodeData, NodePtr, TreeNode};
use crate::observer::Observer;
use crate::ports::NodeConfig;

pub struct TryCatchNode {
    data: NodeData,
    current_child_idx: usize,
    skipped_count: usize,
    in_catch: bool,
}

impl TryCatchNode {
    fn catch_on_halt(&self) -> bool {
        self.data.config.get_input("catch_on_halt").unwrap_or(false)
    }
}

impl TreeNode for TryCatchNode {
    fn tick(&mut self, observer: Option<&dyn Observer>) -> NodeResult {
        let child_count = self.data.children.len();
        if child_count < 2 {
            return Err(NodeError::StructureError(format!(
                "[{}]: TryCatch requires at least 2 children",
                self.data.full_path
            )));
        }

        if self.data.status != NodeStatus::Running {
            self.skipped_count = 0;
            self.in_catch = false;
        }
        self.data.status = NodeStatus::Running;

        let try_count = child_count - 1;

        if self.in_catch {
            let catch_child = self.data.children[child_count - 1].clone();
            let catch_status = execute_tick(&catch_child, observer)
                .map_err(|e| NodeError::Propagated(Box::new(e)))?;

            if catch_status.is_running() {
                return Ok(NodeStatus::Running);
            }

            reset_children(&self.data.children);
            self.current_child_idx = 0;
            self.in_catch = false;
            return Ok(NodeStatus::Failure);
        }

        while self.current_child_idx < try_count {
            let child = self.data.children[self.current_child_idx].clone();
            let child_status =
                execute_tick(&child, observer).map_err(|e| NodeError::Propagated(Box::new(e)))?;

            match child_status {
                NodeStatus::Running => return Ok(NodeStatus::Running),
                NodeStatus::Failure => {
                    reset_children(&self.data.children);
                    self.current_child_idx = 0;
                    self.in_catch = true;
                    return self.tick(observer);
                }
                NodeStatus::Success => self.current_child_idx += 1,
                NodeStatus::Skipped => {
                    self.current_child_idx += 1;
                    self.skipped_count += 1;
                }
                NodeStatus::Idle => {
                    return Err(NodeError::IllegalIdle(self.data.full_path.clone()))
                }
            }
        }

        let all_skipped = self.skipped_count == try_count;
        reset_children(&self.data.children);
        self.current_child_idx = 0;
        self.skipped_count = 0;

        Ok(if all_skipped {
            NodeStatus::Skipped
        } else {
            NodeStatus::Success
        })
    }

    /// If `catch_on_halt` is set and the try-block was active (not already
    /// in catch), runs the catch child synchronously before halting, as
    /// best-effort cleanup matching the original engine's behavior.
    fn halt(&mut self) {
        let catch_on_halt = self.catch_on_halt();
        let child_count = self.data.children.len();

        if catch_on_halt
            && !self.in_catch
            && self.data.status == NodeStatus::Running
            && child_count >= 2
        {
            halt_children(&self.data.children[..child_count - 1]);

            let catch_child = self.data.children[child_count - 1].clone();
            let catch_status = execute_tick(&catch_child, None);
            if matches!(catch_status, Ok(NodeStatus::Running)) {
                catch_child.borrow_mut().halt();
            }
        }

        self.current_child_idx = 0;
        self.skipped_count = 0;
        self.in_catch = false;
        reset_children(&self.data.children);
    }

    fn node_data(&self) -> &NodeData {
        &self.data
    }

    fn node_data_mut(&mut self) -> &mut NodeData {
        &mut self.data
    }
}

impl BuildableNode for TryCatchNode {
    fn provided_ports() -> PortsList {
        use crate::basic_types::{ports, Port};
        ports([Port::input::<bool>("catch_on_halt").default(false)])
    }

    fn category() -> NodeCategory {
        NodeCategory::Control
    }

    fn build(config: NodeConfig, children: Vec<NodePtr>) -> Self {
        let mut data = NodeData::new(String::new(), String::new(), config);
        data.children = children;
        Self {
            data,
            current_child_idx: 0,
            skipped_count: 0,
            in_catch: false,
        }
    }
}
