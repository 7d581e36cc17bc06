//! Fails the child if it's still `Running` past a deadline. The deadline is
//! only checked at tick time, no background timer, consistent with the
//! engine's single-threaded, cooperative tick loop.

use std::time::{Duration, Instant};

use crate::basic_types::{ports, NodeCategory, NodeStatus, Port, PortsList};
use crate::error::{NodeError, NodeResult};
use crate::factory::BuildableNode;
use crate::node::{execute_tick, reset_children, NodeData, NodePtr, TreeNode};
use crate::observer::Observer;
use crate::ports::NodeConfig;

pub struct TimeoutNode {
    data: NodeData,
    deadline: Option<Instant>,
}

impl TreeNode for TimeoutNode {
    fn tick(&mut self, observer: Option<&dyn Observer>) -> NodeResult {
        let msec: i64 = self.data.config.get_input("msec")?;

        if self.deadline.is_none() {
            self.deadline = Some(Instant::now() + Duration::from_millis(msec.max(0) as u64));
        }

        self.data.status = NodeStatus::Running;

        if Instant::now() >= self.deadline.unwrap() {
            reset_children(&self.data.children);
            self.deadline = None;
            return Ok(NodeStatus::Failure);
        }

        let child = self.data.children[0].clone();
        let status =
            execute_tick(&child, observer).map_err(|e| NodeError::Propagated(Box::new(e)))?;

        if status.is_completed() {
            reset_children(&self.data.children);
            self.deadline = None;
        }

        Ok(status)
    }

    fn halt(&mut self) {
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

impl BuildableNode for TimeoutNode {
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
        }
    }
}
