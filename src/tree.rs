//! `Tree`: the ticked, constructed result of `Factory::create_tree`.
//! Grounded on the original engine's `SyncTree`/`AsyncTree` split (here
//! collapsed into one type, since this engine has no async executor to
//! layer on top of), generalized with the subtree registry and a wake
//! `Condvar` so a blocked host thread can park between ticks instead of
//! busy-polling.

use std::rc::Rc;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::basic_types::NodeStatus;
use crate::blackboard::Blackboard;
use crate::error::NodeExecutionError;
use crate::node::{execute_tick, NodePtr, WakeHandle};
use crate::observer::Observer;

pub type TickResult = Result<NodeStatus, NodeExecutionError>;

/// One subtree instance created during `Factory::create_tree`: its root
/// node, its own blackboard (child of whichever blackboard it was entered
/// from), and the fully-qualified name/path prefix the factory assigned it.
pub struct Subtree {
    pub root: NodePtr,
    pub blackboard: Blackboard,
    pub instance_name: String,
    pub path_prefix: String,
}

pub struct Tree {
    root: NodePtr,
    subtrees: Vec<Subtree>,
    wake: Arc<WakeHandle>,
    observer: Option<Rc<dyn Observer>>,
}

impl Tree {
    pub(crate) fn new(root: NodePtr, subtrees: Vec<Subtree>, wake: Arc<WakeHandle>) -> Tree {
        Tree {
            root,
            subtrees,
            wake,
            observer: None,
        }
    }

    pub fn set_observer(&mut self, observer: Rc<dyn Observer>) {
        self.observer = Some(observer);
    }

    pub fn subtrees(&self) -> &[Subtree] {
        &self.subtrees
    }

    pub fn root_blackboard(&self) -> Blackboard {
        self.root.borrow().node_data().config.blackboard().clone()
    }

    /// Ticks the root exactly once and returns the resulting status. A
    /// `Success`/`Failure` result resets the root back to `Idle` so the
    /// next call starts a fresh activation, matching the engine's
    /// cooperative, re-entrant tick contract.
    pub fn tick_once(&mut self) -> TickResult {
        let observer = self.observer.clone();
        if let Some(observer) = &observer {
            observer.tick_started();
        }

        let status = execute_tick(&self.root, observer.as_deref())?;

        if status.is_completed() {
            self.root.borrow_mut().halt();
            self.root.borrow_mut().node_data_mut().status = NodeStatus::Idle;
        }

        if let Some(observer) = &observer {
            observer.tick_ended();
        }

        Ok(status)
    }

    /// Ticks the root in a loop while it returns `Running`. Between ticks,
    /// waits on the tree's wake `Condvar` or `sleep_between`, whichever
    /// comes first; a spurious wakeup just re-ticks. Returns the first
    /// terminal status (`Success`, `Failure`, or `Skipped`).
    pub fn tick_while_running(&mut self, sleep_between: Duration) -> TickResult {
        loop {
            let status = self.tick_once()?;
            if status != NodeStatus::Running {
                return Ok(status);
            }
            self.wake.wait_timeout(sleep_between);
        }
    }

    /// Same as `tick_while_running`, but gives up and returns `Ok(Running)`
    /// if `deadline` passes before the root completes.
    pub fn tick_while_running_until(&mut self, sleep_between: Duration, deadline: Instant) -> TickResult {
        loop {
            let status = self.tick_once()?;
            if status != NodeStatus::Running {
                return Ok(status);
            }
            if Instant::now() >= deadline {
                return Ok(NodeStatus::Running);
            }
            self.wake.wait_timeout(sleep_between);
        }
    }

    pub fn halt_tree(&mut self) {
        self.root.borrow_mut().halt();
        self.root.borrow_mut().node_data_mut().status = NodeStatus::Idle;
    }
}
