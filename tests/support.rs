//! Shared leaf-node fixtures for the integration tests. Grounded on the
//! original engine's test helper module (`tests/nodes.rs`): a handful of
//! small, reusable nodes instead of re-declaring fixtures in every file.

use std::cell::RefCell;

use behavior_tree::{
    ports, BuildableNode, NodeCategory, NodeConfig, NodeData, NodePtr, NodeResult, NodeStatus,
    Port, PortsList, TreeNode,
};

pub fn test_setup() {
    let _ = pretty_env_logger::formatted_builder()
        .filter_level(log::LevelFilter::Debug)
        .is_test(true)
        .try_init();
}

/// Returns whatever status its `status` port says.
pub struct StatusNode {
    data: NodeData,
}

impl TreeNode for StatusNode {
    fn tick(&mut self, _observer: Option<&dyn behavior_tree::Observer>) -> NodeResult {
        let status: String = self.data.config.get_input("status")?;
        let status = match status.as_str() {
            "SUCCESS" => NodeStatus::Success,
            "FAILURE" => NodeStatus::Failure,
            "SKIPPED" => NodeStatus::Skipped,
            "RUNNING" => NodeStatus::Running,
            other => panic!("StatusNode: unsupported status literal '{other}'"),
        };
        log::info!("StatusNode returning {status:?}");
        Ok(status)
    }

    fn halt(&mut self) {}

    fn node_data(&self) -> &NodeData {
        &self.data
    }

    fn node_data_mut(&mut self) -> &mut NodeData {
        &mut self.data
    }
}

impl BuildableNode for StatusNode {
    fn provided_ports() -> PortsList {
        ports([Port::input::<String>("status")])
    }

    fn category() -> NodeCategory {
        NodeCategory::Action
    }

    fn build(config: NodeConfig, _children: Vec<NodePtr>) -> Self {
        Self {
            data: NodeData::new(String::new(), String::new(), config),
        }
    }
}

/// Returns `Success` `good_runs` times, then `Failure` forever after.
/// Used to exercise sequence-with-memory resumption and reactive
/// short-circuiting.
pub struct SuccessThenFailureNode {
    data: NodeData,
    runs: RefCell<usize>,
}

impl TreeNode for SuccessThenFailureNode {
    fn tick(&mut self, _observer: Option<&dyn behavior_tree::Observer>) -> NodeResult {
        let good_runs: i64 = self.data.config.get_input("good_runs")?;
        let mut runs = self.runs.borrow_mut();
        if (*runs as i64) < good_runs {
            *runs += 1;
            Ok(NodeStatus::Success)
        } else {
            Ok(NodeStatus::Failure)
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

impl BuildableNode for SuccessThenFailureNode {
    fn provided_ports() -> PortsList {
        ports([Port::input::<i64>("good_runs").default(0)])
    }

    fn category() -> NodeCategory {
        NodeCategory::Action
    }

    fn build(config: NodeConfig, _children: Vec<NodePtr>) -> Self {
        Self {
            data: NodeData::new(String::new(), String::new(), config),
            runs: RefCell::new(0),
        }
    }
}

/// Counts how many times it has been ticked, reporting `Running` until a
/// `target_ticks` threshold, then `Success`. Used to exercise parallel
/// thresholds and resumable control nodes.
pub struct CountToNode {
    data: NodeData,
    count: usize,
}

impl TreeNode for CountToNode {
    fn tick(&mut self, _observer: Option<&dyn behavior_tree::Observer>) -> NodeResult {
        let target: i64 = self.data.config.get_input("target_ticks")?;
        self.count += 1;
        if (self.count as i64) < target {
            Ok(NodeStatus::Running)
        } else {
            self.count = 0;
            Ok(NodeStatus::Success)
        }
    }

    fn halt(&mut self) {
        self.count = 0;
    }

    fn node_data(&self) -> &NodeData {
        &self.data
    }

    fn node_data_mut(&mut self) -> &mut NodeData {
        &mut self.data
    }
}

impl BuildableNode for CountToNode {
    fn provided_ports() -> PortsList {
        ports([Port::input::<i64>("target_ticks").default(1)])
    }

    fn category() -> NodeCategory {
        NodeCategory::Action
    }

    fn build(config: NodeConfig, _children: Vec<NodePtr>) -> Self {
        Self {
            data: NodeData::new(String::new(), String::new(), config),
            count: 0,
        }
    }
}
