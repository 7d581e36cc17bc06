//! Ticks every not-yet-completed child on every activation; succeeds or
//! fails once enough children have reported the matching terminal status.
//! Grounded on the original engine's `ParallelNode` (signed thresholds: a
//! negative count means "all but N children", matching the original
//! engine's convention), the original's by-name `"Log"` special case is
//! replaced with an explicit `skip_indices` port naming non-counting
//! children by position, so no node is special-cased by registration name
//! (see the design notes on this decision).

use std::collections::HashSet;

use crate::basic_types::{NodeCategory, NodeStatus, PortsList};
use crate::error::{NodeError, NodeResult};
use crate::factory::BuildableNode;
use crate::node::{execute_tick, reset_children, NodeData, NodePtr, TreeNode};
use crate::observer::Observer;
use crate::ports::NodeConfig;

pub struct ParallelNode {
    data: NodeData,
    completed: HashSet<usize>,
    success_count: usize,
    failure_count: usize,
}

impl ParallelNode {
    fn thresholds(&self, counted: usize) -> NodeResult<(usize, i64)> {
        let success: i64 = self.data.config.get_input("success_count").unwrap_or(-1);
        let failure: i64 = self.data.config.get_input("failure_count").unwrap_or(1);

        let success_threshold = if success < 0 {
            ((counted as i64) + success + 1).max(0) as usize
        } else {
            success as usize
        };
        Ok((success_threshold, failure))
    }

    fn skip_indices(&self) -> HashSet<usize> {
        let raw: String = self
            .data
            .config
            .get_input("skip_indices")
            .unwrap_or_default();
        raw.split(',')
            .filter_map(|s| s.trim().parse::<usize>().ok())
            .collect()
    }

    fn clear(&mut self) {
        self.completed.clear();
        self.success_count = 0;
        self.failure_count = 0;
    }
}

impl TreeNode for ParallelNode {
    fn tick(&mut self, observer: Option<&dyn Observer>) -> NodeResult {
        self.data.status = NodeStatus::Running;

        let skip = self.skip_indices();
        let total = self.data.children.len();
        let counted = total - skip.len();

        let (success_threshold, failure_threshold_signed) = self.thresholds(counted)?;
        let failure_threshold = if failure_threshold_signed < 0 {
            ((counted as i64) + failure_threshold_signed + 1).max(0) as usize
        } else {
            failure_threshold_signed as usize
        };

        if counted < success_threshold {
            return Err(NodeError::StructureError(format!(
                "[{}]: not enough counted children to ever reach the success threshold",
                self.data.full_path
            )));
        }
        if counted < failure_threshold {
            return Err(NodeError::StructureError(format!(
                "[{}]: not enough counted children to ever reach the failure threshold",
                self.data.full_path
            )));
        }

        let mut skipped_count = 0usize;

        for i in 0..total {
            if skip.contains(&i) {
                continue;
            }
            if self.completed.contains(&i) {
                continue;
            }

            let child = self.data.children[i].clone();
            let child_status =
                execute_tick(&child, observer).map_err(|e| NodeError::Propagated(Box::new(e)))?;

            match child_status {
                NodeStatus::Success => {
                    self.completed.insert(i);
                    self.success_count += 1;
                }
                NodeStatus::Failure => {
                    self.completed.insert(i);
                    self.failure_count += 1;
                }
                NodeStatus::Skipped => skipped_count += 1,
                NodeStatus::Running => {}
                NodeStatus::Idle => {
                    return Err(NodeError::IllegalIdle(self.data.full_path.clone()))
                }
            }
        }

        if self.success_count >= success_threshold {
            self.clear();
            reset_children(&self.data.children);
            return Ok(NodeStatus::Success);
        }

        if counted - self.failure_count < success_threshold || self.failure_count >= failure_threshold
        {
            self.clear();
            reset_children(&self.data.children);
            return Ok(NodeStatus::Failure);
        }

        Ok(if skipped_count == counted {
            NodeStatus::Skipped
        } else {
            NodeStatus::Running
        })
    }

    fn halt(&mut self) {
        self.clear();
        reset_children(&self.data.children);
    }

    fn node_data(&self) -> &NodeData {
        &self.data
    }

    fn node_data_mut(&mut self) -> &mut NodeData {
        &mut self.data
    }
}

impl BuildableNode for ParallelNode {
    fn provided_ports() -> PortsList {
        use crate::basic_types::{ports, Port};
        ports([
            Port::input::<i64>("success_count").default(-1i64),
            Port::input::<i64>("failure_count").default(1i64),
            Port::input::<String>("skip_indices").default(String::new()),
        ])
    }

    fn category() -> NodeCategory {
        NodeCategory::Control
    }

    fn build(config: NodeConfig, children: Vec<NodePtr>) -> Self {
        let mut data = NodeData::new(String::new(), String::new(), config);
        data.children = children;
        Self {
            data,
            completed: HashSet::new(),
            success_count: 0,
            failure_count: 0,
        }
    }
}
