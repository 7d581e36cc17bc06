//! Reports `Running` for `msec` before ticking the child for the first
//! time; once the delay elapses, passes every subsequent tick straight
//! through. Deadline checked at tick time only, same as `Timeout`.

use std::time::{Duration, Instant};

use crate::basic_types::{ports, NodeCategory, NodeStatus, Port, PortsList};
use crate::error::{NodeError, NodeResult};
use crate::factory::BuildableNode;
use crate::node::{execute_tick, reset_children, NodeData, NodePtr, TreeNode};
use crate::observer::Observer;
use crate::ports::NodeConfig;

pub struct DelayNode {
    data: NodeData,
    deadline: Option<Instant>,
    elapsed: bool,
}

impl TreeNode for DelayNode {
    fn tick(&mut self, observer: Option<&dyn Observer>) -> NodeResult {
        self.data.status = NodeStatus::Running;

        if !self.elapsed {
            let msec: i64 = self.data.config.get_input("msec")?;
            let deadline = *self
                .deadline
                .get_or_insert_with(|| Instant::now() + Duration::from_millis(msec.max(0) as u64));

            if Instant::now() < deadline {
                return Ok(NodeStatus::Running);
            }
            self.elapsed = true;
        }

        let child = self.data.children[0].clone();
        let status =
            execute_tick(&child, observer).map_err(|e| NodeError::Propagated(Box::new(e)))?;

        if status.is_completed() {
            reset_children(&self.data.children);
            self.elapsed = false;
            self.deadline = None;
        }

        Ok(status)
    }

    fn halt(&mut self) {
        self.elapsed = false;
        self.deadline = None;
        reset_children(&self.data.children);
    }

    fn node_data(&self) -> &NodeData {
        &self.data
    }

    fn node_data_mut(&mut self) -> &mut NodeData {
        &mut self.data
    }
}

impl BuildableNode for DelayNode {
    fn provided_ports() -> PortsList {
        ports([Port::input::<i64>("msec")])
    }

    fn category() -> NodeCategory {
        NodeCategory::Decorator
    }

    fn build(config: NodeConfig, children: Vec<NodePtr>) -> Self {
        let mut data = NodeData::new(String::new(), String::new(), config);
        data.children = children;
        Self {
            data,
            deadline: None,
            elapsed: false,
        }
    }
}
