//! Coroutine action: like the threaded action, but the user body can
//! suspend itself mid-routine with `yield_running()` and resume from that
//! exact point on the next tick, instead of being re-entered from the top.
//! The suspension mechanism is left open by the node's contract; this
//! crate realizes it with the same worker-thread machinery as
//! `ThreadedActionNode` plus a pair of rendezvous channels, grounded on the
//! original engine's thread-backed action pattern.

use std::marker::PhantomData;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{sync_channel, Receiver, SyncSender};
use std::sync::Arc;
use std::thread::JoinHandle;

use crate::basic_types::{NodeCategory, NodeStatus, PortsList};
use crate::error::{NodeError, NodeResult};
use crate::factory::BuildableNode;
use crate::node::{NodeData, NodePtr, TreeNode};
use crate::observer::Observer;
use crate::ports::NodeConfig;

enum WorkerMessage {
    Yielded,
    Done(NodeResult),
}

/// Handed to the user's coroutine body.
pub struct CoroutineHandle {
    config: NodeConfig,
    resume_rx: Receiver<()>,
    msg_tx: SyncSender<WorkerMessage>,
    halt_requested: Arc<AtomicBool>,
}

impl CoroutineHandle {
    pub fn config(&self) -> &NodeConfig {
        &self.config
    }

    /// Suspends the coroutine, reporting `Running` for this tick, and
    /// blocks until the tree ticks this node again. Check
    /// `is_halt_requested()` right after this returns, `halt()` wakes a
    /// suspended coroutine up specifically so it gets a chance to notice
    /// and unwind instead of staying parked forever.
    pub fn yield_running(&self) {
        let _ = self.msg_tx.send(WorkerMessage::Yielded);
        let _ = self.resume_rx.recv();
    }

    pub fn is_halt_requested(&self) -> bool {
        self.halt_requested.load(Ordering::Acquire)
    }
}

pub trait CoroutineAction: 'static {
    fn run(handle: &CoroutineHandle) -> NodeResult;

    fn provided_ports() -> PortsList {
        PortsList::new()
    }
}

pub struct CoroutineActionNode<A: CoroutineAction> {
    data: NodeData,
    worker: Option<JoinHandle<()>>,
    resume_tx: Option<SyncSender<()>>,
    msg_rx: Option<Receiver<WorkerMessage>>,
    halt_requested: Option<Arc<AtomicBool>>,
    _marker: PhantomData<A>,
}

impl<A: CoroutineAction> CoroutineActionNode<A> {
    fn spawn(&mut self) {
        let (resume_tx, resume_rx) = sync_channel::<()>(0);
        let (msg_tx, msg_rx) = sync_channel::<WorkerMessage>(0);
        let config = self.data.config.clone();
        let done_tx = msg_tx.clone();
        let halt_requested = Arc::new(AtomicBool::new(false));
        let worker_halt_requested = Arc::clone(&halt_requested);

        let handle = std::thread::spawn(move || {
            let ctx = CoroutineHandle {
                config,
                resume_rx,
                msg_tx,
                halt_requested: worker_halt_requested,
            };
            let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| A::run(&ctx)))
                .unwrap_or_else(|payload| {
                    let message = payload
                        .downcast_ref::<&str>()
                        .map(|s| s.to_string())
                        .or_else(|| payload.downcast_ref::<String>().cloned())
                        .unwrap_or_else(|| "coroutine action worker panicked".to_string());
                    Err(NodeError::User(anyhow::anyhow!(message)))
                });
            let _ = done_tx.send(WorkerMessage::Done(result));
        });

        self.worker = Some(handle);
        self.resume_tx = Some(resume_tx);
        self.msg_rx = Some(msg_rx);
        self.halt_requested = Some(halt_requested);
    }
}

impl<A: CoroutineAction> TreeNode for CoroutineActionNode<A> {
    fn tick(&mut self, _observer: Option<&dyn Observer>) -> NodeResult {
        if self.worker.is_none() {
            self.spawn();
        } else if let Some(resume_tx) = &self.resume_tx {
            let _ = resume_tx.send(());
        }

        let message = self.msg_rx.as_ref().unwrap().recv();
        match message {
            Ok(WorkerMessage::Yielded) => Ok(NodeStatus::Running),
            Ok(WorkerMessage::Done(result)) => {
                self.worker.take().unwrap().join().ok();
                self.resume_tx = None;
                self.msg_rx = None;
                self.halt_requested = None;
                result
            }
            Err(_) => Ok(NodeStatus::Running),
        }
    }

    /// Requests a halt, wakes a suspended coroutine so it can observe the
    /// request, then joins the worker. The coroutine body is expected to
    /// check `is_halt_requested()` after every `yield_running()` call and
    /// return promptly when it's set; a body that never checks will make
    /// this block until it finishes on its own.
    fn halt(&mut self) {
        if let Some(halt_requested) = &self.halt_requested {
            halt_requested.store(true, Ordering::Release);
        }
        self.resume_tx = None;
        self.msg_rx = None;
        if let Some(worker) = self.worker.take() {
            worker.join().ok();
        }
        self.halt_requested = None;
        self.data.status = NodeStatus::Idle;
    }

    fn node_data(&self) -> &NodeData {
        &self.data
    }

    fn node_data_mut(&mut self) -> &mut NodeData {
        &mut self.data
    }
}

impl<A: CoroutineAction> BuildableNode for CoroutineActionNode<A> {
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
            resume_tx: None,
            msg_rx: None,
            halt_requested: None,
            _marker: PhantomData,
        }
    }
}
