//! Threaded action: on first tick, spawns a worker thread running the
//! user's blocking logic; subsequent ticks just peek at a shared status
//! slot. Grounded on the original engine's thread-based action node, adapted
//! to this engine's synchronous `tick()` contract, no `tokio`/`futures`
//! needed since the worker is a plain `std::thread`.

use std::marker::PhantomData;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use crate::basic_types::{NodeCategory, NodeStatus, PortsList};
use crate::error::{NodeError, NodeResult};
use crate::factory::BuildableNode;
use crate::node::{NodeData, NodePtr, TreeNode};
use crate::observer::Observer;
use crate::ports::NodeConfig;

/// Handle the worker closure uses to check for a halt request and to make
/// its own port reads/writes against the node's blackboard.
pub struct ThreadedContext {
    config: NodeConfig,
    halt_requested: Arc<AtomicBool>,
}

impl ThreadedContext {
    pub fn config(&self) -> &NodeConfig {
        &self.config
    }

    pub fn is_halt_requested(&self) -> bool {
        self.halt_requested.load(Ordering::Acquire)
    }
}

pub trait ThreadedAction: 'static {
    /// Runs on the worker thread. Must return promptly after
    /// `ctx.is_halt_requested()` becomes `true`; `Running` is not a legal
    /// return value here (the wrapper is already what reports `Running`
    /// while the thread is in flight).
    fn run(ctx: &ThreadedContext) -> NodeResult;

    fn provided_ports() -> PortsList {
        PortsList::new()
    }
}

struct WorkerState {
    result: Mutex<Option<NodeResult>>,
    halt_requested: Arc<AtomicBool>,
}

pub struct ThreadedActionNode<A: ThreadedAction> {
    data: NodeData,
    worker: Option<JoinHandle<()>>,
    state: Option<Arc<WorkerState>>,
    _marker: PhantomData<A>,
}

impl<A: ThreadedAction> ThreadedActionNode<A> {
    fn spawn(&mut self) {
        let halt_requested = Arc::new(AtomicBool::new(false));
        let state = Arc::new(WorkerState {
            result: Mutex::new(None),
            halt_requested: Arc::clone(&halt_requested),
        });
        let config = self.data.config.clone();
        let worker_state = Arc::clone(&state);
        let wake = self.data.wake_handle();

        let handle = std::thread::spawn(move || {
            let ctx = ThreadedContext {
                config,
                halt_requested,
            };
            let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| A::run(&ctx)))
                .unwrap_or_else(|payload| {
                    let message = payload
                        .downcast_ref::<&str>()
                        .map(|s| s.to_string())
                        .or_else(|| payload.downcast_ref::<String>().cloned())
                        .unwrap_or_else(|| "threaded action worker panicked".to_string());
                    Err(NodeError::User(anyhow::anyhow!(message)))
                });
            *worker_state.result.lock().unwrap() = Some(result);
            if let Some(wake) = wake {
                wake.notify();
            }
        });

        self.worker = Some(handle);
        self.state = Some(state);
    }
}

impl<A: ThreadedAction> TreeNode for ThreadedActionNode<A> {
    fn tick(&mut self, _observer: Option<&dyn Observer>) -> NodeResult {
        if self.worker.is_none() {
            self.spawn();
            return Ok(NodeStatus::Running);
        }

        let state = self.state.as_ref().unwrap();
        let finished = state.result.lock().unwrap().take();

        match finished {
            Some(result) => {
                self.worker.take().unwrap().join().ok();
                self.state = None;
                result
            }
            None => Ok(NodeStatus::Running),
        }
    }

    fn halt(&mut self) {
        if let Some(state) = &self.state {
            state.halt_requested.store(true, Ordering::Release);
        }
        if let Some(worker) = self.worker.take() {
            worker.join().ok();
        }
        self.state = None;
        self.data.status = NodeStatus::Idle;
    }

    fn node_data(&self) -> &NodeData {
        &self.data
    }

    fn node_data_mut(&mut self) -> &mut NodeData {
        &mut self.data
    }
}

impl<A: ThreadedAction> BuildableNode for ThreadedActionNode<A> {
    fn provided_ports() -> PortsList {
        A::provided_ports()
    }

    fn category() -> NodeCategory {
        NodeCategory::Action
    }

    fn build(config: NodeConfig, _children: Vec<NodePtr>) -> Self {
        Self {
            data: NodeData::new(String::new(), String::new(), config),
            worker: None,
            state: None,
            _marker: PhantomData,
        }
    }
}
