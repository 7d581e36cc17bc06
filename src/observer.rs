//! Tree-wide tick observer. Distinct from a node's own per-instance status
//! subscribers (`NodeData::subscribe_to_status_change`): an `Observer` sees
//! every node's status changes for one tick pass, invoked synchronously
//! from the ticking thread.

use crate::basic_types::NodeStatus;

pub trait Observer {
    fn tree_started(&self) {}

    fn tick_started(&self) {}

    fn node_status_changed(&self, _full_path: &str, _previous: NodeStatus, _new: NodeStatus) {}

    fn tick_ended(&self) {}
}

/// An `Observer` that records every status change it sees, for tests and
/// simple diagnostics.
#[derive(Default)]
pub struct RecordingObserver {
    pub events: std::cell::RefCell<Vec<(String, NodeStatus, NodeStatus)>>,
}

impl Observer for RecordingObserver {
    fn node_status_changed(&self, full_path: &str, previous: NodeStatus, new: NodeStatus) {
        self.events
            .borrow_mut()
            .push((full_path.to_string(), previous, new));
    }
}
