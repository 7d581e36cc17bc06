//! The `TreeNode` trait and the `execute_tick` boundary every node is
//! ticked through. Grounded on the original engine's `TreeNode`/`TreeNodeData`
//! split (common fields factored out of the per-kind behavior), replacing
//! its function-pointer/`BoxFuture` dispatch with a plain trait object,
//! since this engine ticks synchronously and has no executor to thread
//! through.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::{Arc, Condvar, Mutex};
use std::time::Duration;

use crate::basic_types::NodeStatus;
use crate::error::{NodeExecutionError, NodeResult, TickBacktraceEntry};
use crate::observer::Observer;
use crate::ports::NodeConfig;

/// The shared, mutable handle to a node used throughout the tree: children
/// are stored as `Vec<NodePtr>`, composites mutate their children through
/// interior mutability rather than exclusive ownership, which is what lets
/// a `Tree` walk itself (for path assignment, halting, observers) without
/// fighting the borrow checker.
pub type NodePtr = Rc<RefCell<dyn TreeNode>>;

/// The tree-wide condition variable `tick_while_running` sleeps on.
/// Threaded/coroutine actions and `set_output` notify it when something a
/// sleeping tick loop might care about changes.
pub struct WakeHandle {
    flag: Mutex<bool>,
    condvar: Condvar,
}

impl WakeHandle {
    pub fn new() -> Arc<WakeHandle> {
        Arc::new(WakeHandle {
            flag: Mutex::new(false),
            condvar: Condvar::new(),
        })
    }

    pub fn notify(&self) {
        let mut flag = self.flag.lock().unwrap();
        *flag = true;
        self.condvar.notify_all();
    }

    /// Blocks until notified or `timeout` elapses, whichever comes first.
    /// Always consumes a pending notification before returning.
    pub fn wait_timeout(&self, timeout: Duration) {
        let flag = self.flag.lock().unwrap();
        let (mut flag, _) = self
            .condvar
            .wait_timeout_while(flag, timeout, |woken| !*woken)
            .unwrap();
        *flag = false;
    }
}

type StatusSubscriber = Box<dyn FnMut(NodeStatus, NodeStatus)>;

/// Fields common to every node, regardless of kind. Concrete node types
/// embed one of these and implement `TreeNode::node_data`/`node_data_mut`
/// as trivial accessors.
pub struct NodeData {
    pub name: String,
    pub registration_id: String,
    pub full_path: String,
    pub uid: u16,
    pub status: NodeStatus,
    pub config: NodeConfig,
    pub children: Vec<NodePtr>,
    subscribers: Vec<StatusSubscriber>,
    wake: Option<Arc<WakeHandle>>,
}

impl NodeData {
    pub fn new(name: impl Into<String>, registration_id: impl Into<String>, config: NodeConfig) -> Self {
        let name = name.into();
        Self {
            full_path: name.clone(),
            name,
            registration_id: registration_id.into(),
            uid: 0,
            status: NodeStatus::Idle,
            config,
            children: Vec::new(),
            subscribers: Vec::new(),
            wake: None,
        }
    }

    pub fn subscribe_to_status_change(&mut self, callback: impl FnMut(NodeStatus, NodeStatus) + 'static) {
        self.subscribers.push(Box::new(callback));
    }

    pub fn set_wake_handle(&mut self, wake: Arc<WakeHandle>) {
        self.wake = Some(wake);
    }

    pub fn wake_tree(&self) {
        if let Some(wake) = &self.wake {
            wake.notify();
        }
    }

    pub fn wake_handle(&self) -> Option<Arc<WakeHandle>> {
        self.wake.clone()
    }

    fn notify_subscribers(&mut self, previous: NodeStatus, new: NodeStatus) {
        for subscriber in self.subscribers.iter_mut() {
            subscriber(previous, new);
        }
    }

    pub fn backtrace(&self) -> TickBacktraceEntry {
        TickBacktraceEntry {
            instance_name: self.name.clone(),
            full_path: self.full_path.clone(),
            registration_id: self.registration_id.clone(),
        }
    }
}

/// Every node in a tree implements this. `tick`/`halt` are the only
/// required behavior; everything shared (status bookkeeping, subscriber
/// notification, backtrace assembly) lives in `execute_tick` and reads it
/// through `node_data`/`node_data_mut`.
pub trait TreeNode {
    fn tick(&mut self, observer: Option<&dyn Observer>) -> NodeResult;

    /// Halts this node: for a leaf, stop whatever's in flight; for a
    /// composite/decorator, halt any still-`Running` child first. Must be
    /// idempotent, halting an already-`Idle`/terminal node is a no-op.
    fn halt(&mut self);

    fn node_data(&self) -> &NodeData;

    fn node_data_mut(&mut self) -> &mut NodeData;
}

/// Ticks `node`, converting a returned `Err`, a `Propagated` backtrace
/// already in flight, or a caught panic into exactly one
/// `NodeExecutionError` identifying the node that actually failed.
/// Composites call this on each child and convert the result back into
/// their own `NodeError` with `.map_err(|e| NodeError::Propagated(Box::new(e)))?`
/// so the backtrace travels up without being rewrapped at every layer.
pub fn execute_tick(node: &NodePtr, observer: Option<&dyn Observer>) -> Result<NodeStatus, NodeExecutionError> {
    let tick_result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        node.borrow_mut().tick(observer)
    }));

    let status = match tick_result {
        Ok(Ok(status)) => status,
        Ok(Err(crate::error::NodeError::Propagated(inner))) => return Err(*inner),
        Ok(Err(other)) => {
            let backtrace = node.borrow().node_data().backtrace();
            return Err(NodeExecutionError { backtrace, source: other });
        }
        Err(panic_payload) => {
            let backtrace = node.borrow().node_data().backtrace();
            return Err(NodeExecutionError::from_panic(backtrace, panic_payload));
        }
    };

    if status == NodeStatus::Idle {
        let backtrace = node.borrow().node_data().backtrace();
        let full_path = backtrace.full_path.clone();
        return Err(NodeExecutionError {
            backtrace,
            source: crate::error::NodeError::IllegalIdle(full_path),
        });
    }

    let mut node_mut = node.borrow_mut();
    let data = node_mut.node_data_mut();
    if data.status != status {
        let previous = data.status;
        data.status = status;
        log::debug!("[{}] {:?} -> {:?}", data.full_path, previous, status);
        data.notify_subscribers(previous, status);
        if let Some(observer) = observer {
            observer.node_status_changed(&data.full_path, previous, status);
        }
        data.wake_tree();
    }

    Ok(status)
}

/// Halts every still-`Running` child in `children`, left to right. Free
/// function (not a method on `Vec`) because children are reached through
/// shared `NodePtr` handles via interior mutability, not through `&mut
/// Vec<NodePtr>`, a composite only ever needs a `&[NodePtr]` borrow to
/// halt its children, never exclusive access to the vector itself.
pub fn halt_children(children: &[NodePtr]) {
    for child in children {
        let is_running = child.borrow().node_data().status.is_running();
        if is_running {
            child.borrow_mut().halt();
        }
    }
}

/// Resets every child's status to `Idle`, including already-terminal ones.
/// Used by composites that want a fully clean slate on `halt()` (as opposed
/// to memory variants, which deliberately skip this).
pub fn reset_children(children: &[NodePtr]) {
    for child in children {
        child.borrow_mut().halt();
        child.borrow_mut().node_data_mut().status = NodeStatus::Idle;
    }
}
