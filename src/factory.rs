//! The node registry and tree builder. Grounded on the original engine's
//! `Factory` (a name -> constructor map plus a registered-tree table),
//! generalized to build from an in-memory `Blueprint` instead of parsed
//! XML, this crate doesn't ship a text-format loader, so trees are
//! assembled directly in Rust.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::Arc;

use crate::basic_types::{NodeCategory, PortsList, PortsRemapping, TreeNodeManifest};
use crate::blackboard::Blackboard;
use crate::error::FactoryError;
use crate::node::{NodeData, NodePtr, WakeHandle};
use crate::nodes::control::{
    FallbackNode, IfThenElseNode, ManualSelectorNode, ParallelNode, ReactiveFallbackNode,
    ReactiveSequenceNode, SequenceNode, SequenceWithMemoryNode, SwitchNode, TryCatchNode,
    WhileDoElseNode,
};
use crate::nodes::decorator::{
    DelayNode, ForceFailureNode, ForceSuccessNode, InverterNode, KeepRunningUntilFailureNode,
    PreconditionNode, RepeatNode, RetryNode, RunOnceNode, SubTreeNode, TimeoutNode,
};
use crate::ports::NodeConfig;
use crate::tree::{Subtree, Tree};

/// Implemented by every concrete node type the factory can construct via
/// `register_node_type::<T>`. A node type that needs a manual builder
/// closure instead (e.g. one that isn't generic over user logic) is
/// registered with `register_builder` and doesn't need this.
pub trait BuildableNode: crate::node::TreeNode + Sized + 'static {
    fn provided_ports() -> PortsList {
        PortsList::new()
    }

    fn category() -> NodeCategory;

    fn build(config: NodeConfig, children: Vec<NodePtr>) -> Self;
}

type BuilderFn = dyn Fn(NodeConfig, Vec<NodePtr>) -> NodePtr;

/// An in-memory tree description. The host builds this directly (there's
/// no XML/text format parsed into it) and hands it to
/// `Factory::register_tree`/`create_tree`.
pub enum Blueprint {
    Node {
        registration_id: String,
        instance_name: Option<String>,
        input_ports: PortsRemapping,
        output_ports: PortsRemapping,
        children: Vec<Blueprint>,
    },
    Subtree {
        tree_id: String,
        instance_name: Option<String>,
        remappings: PortsRemapping,
        autoremap: bool,
    },
}

impl Blueprint {
    pub fn node(registration_id: impl Into<String>) -> Blueprint {
        Blueprint::Node {
            registration_id: registration_id.into(),
            instance_name: None,
            input_ports: PortsRemapping::new(),
            output_ports: PortsRemapping::new(),
            children: Vec::new(),
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Blueprint {
        if let Blueprint::Node { instance_name, .. } = &mut self {
            *instance_name = Some(name.into());
        }
        self
    }

    pub fn input(mut self, port: impl Into<String>, value: impl Into<String>) -> Blueprint {
        if let Blueprint::Node { input_ports, .. } = &mut self {
            input_ports.insert(port.into(), value.into());
        }
        self
    }

    pub fn output(mut self, port: impl Into<String>, value: impl Into<String>) -> Blueprint {
        if let Blueprint::Node { output_ports, .. } = &mut self {
            output_ports.insert(port.into(), value.into());
        }
        self
    }

    pub fn child(mut self, child: Blueprint) -> Blueprint {
        if let Blueprint::Node { children, .. } = &mut self {
            children.push(child);
        }
        self
    }

    pub fn children(mut self, new_children: impl IntoIterator<Item = Blueprint>) -> Blueprint {
        if let Blueprint::Node { children, .. } = &mut self {
            children.extend(new_children);
        }
        self
    }

    pub fn subtree(tree_id: impl Into<String>) -> Blueprint {
        Blueprint::Subtree {
            tree_id: tree_id.into(),
            instance_name: None,
            remappings: PortsRemapping::new(),
            autoremap: false,
        }
    }

    pub fn remap(mut self, internal: impl Into<String>, external: impl Into<String>) -> Blueprint {
        if let Blueprint::Subtree { remappings, .. } = &mut self {
            remappings.insert(internal.into(), external.into());
        }
        self
    }

    pub fn autoremap(mut self, enabled: bool) -> Blueprint {
        if let Blueprint::Subtree { autoremap, .. } = &mut self {
            *autoremap = enabled;
        }
        self
    }
}

pub struct Factory {
    builders: HashMap<String, (Arc<BuilderFn>, Arc<TreeNodeManifest>)>,
    trees: HashMap<String, Blueprint>,
}

impl Default for Factory {
    fn default() -> Self {
        Self::new()
    }
}

impl Factory {
    /// A fresh factory with every built-in control and decorator node
    /// already registered under its usual name, the same set the original
    /// engine wires up in its own `Factory::new` (minus the nodes this
    /// engine doesn't carry, plus the ones this engine adds: `TryCatch`,
    /// `Switch2..Switch6`, `Timeout`, `Delay`, `Precondition`,
    /// `ManualSelector`). User node types layer on top via
    /// `register_node_type`/`register_builder`.
    pub fn new() -> Factory {
        let mut factory = Factory {
            builders: HashMap::new(),
            trees: HashMap::new(),
        };
        factory.register_builtins();
        factory
    }

    fn register_builtins(&mut self) {
        self.register_node_type::<SequenceNode>("Sequence");
        self.register_node_type::<SequenceWithMemoryNode>("SequenceWithMemory");
        self.register_node_type::<ReactiveSequenceNode>("ReactiveSequence");
        self.register_node_type::<FallbackNode>("Fallback");
        self.register_node_type::<ReactiveFallbackNode>("ReactiveFallback");
        self.register_node_type::<ParallelNode>("Parallel");
        self.register_node_type::<IfThenElseNode>("IfThenElse");
        self.register_node_type::<WhileDoElseNode>("WhileDoElse");
        self.register_node_type::<TryCatchNode>("TryCatch");
        self.register_node_type::<ManualSelectorNode>("ManualSelector");
        self.register_node_type::<SwitchNode<2>>("Switch2");
        self.register_node_type::<SwitchNode<3>>("Switch3");
        self.register_node_type::<SwitchNode<4>>("Switch4");
        self.register_node_type::<SwitchNode<5>>("Switch5");
        self.register_node_type::<SwitchNode<6>>("Switch6");

        self.register_node_type::<InverterNode>("Inverter");
        self.register_node_type::<ForceSuccessNode>("ForceSuccess");
        self.register_node_type::<ForceFailureNode>("ForceFailure");
        self.register_node_type::<KeepRunningUntilFailureNode>("KeepRunningUntilFailure");
        self.register_node_type::<RepeatNode>("Repeat");
        self.register_node_type::<RetryNode>("RetryUntilSuccessful");
        self.register_node_type::<RunOnceNode>("RunOnce");
        self.register_node_type::<TimeoutNode>("Timeout");
        self.register_node_type::<DelayNode>("Delay");
        self.register_node_type::<PreconditionNode>("Precondition");
    }

    /// Registers `T` under `registration_id`, inferring its manifest from
    /// `T::provided_ports()`/`T::category()`.
    pub fn register_node_type<T: BuildableNode>(&mut self, registration_id: impl Into<String>) {
        let registration_id = registration_id.into();
        let manifest = Arc::new(TreeNodeManifest {
            category: T::category(),
            registration_id: registration_id.clone(),
            ports: T::provided_ports(),
            description: String::new(),
        });
        let builder: Arc<BuilderFn> = Arc::new(|config, children| {
            Rc::new(RefCell::new(T::build(config, children))) as NodePtr
        });
        self.builders.insert(registration_id, (builder, manifest));
    }

    /// Manual registration path for a builder closure that isn't backed by
    /// a `BuildableNode` impl.
    pub fn register_builder(
        &mut self,
        registration_id: impl Into<String>,
        manifest: TreeNodeManifest,
        builder: impl Fn(NodeConfig, Vec<NodePtr>) -> NodePtr + 'static,
    ) {
        self.builders
            .insert(registration_id.into(), (Arc::new(builder), Arc::new(manifest)));
    }

    pub fn register_tree(&mut self, tree_id: impl Into<String>, blueprint: Blueprint) {
        self.trees.insert(tree_id.into(), blueprint);
    }

    /// Resolves `root_id` against the registered trees, builds every node
    /// and subtree, assigns UIDs and full paths in construction order, and
    /// returns a ready-to-tick `Tree`.
    pub fn create_tree(&self, root_id: &str, blackboard: Blackboard) -> Result<Tree, FactoryError> {
        let blueprint = self
            .trees
            .get(root_id)
            .ok_or_else(|| FactoryError::UnknownSubtree(root_id.to_string()))?;

        let wake = WakeHandle::new();
        let mut uid = 0u16;
        let mut subtrees = Vec::new();

        let root = self.build(blueprint, &blackboard, root_id, &wake, &mut uid, &mut subtrees)?;

        Ok(Tree::new(root, subtrees, wake))
    }

    fn build(
        &self,
        blueprint: &Blueprint,
        blackboard: &Blackboard,
        path_prefix: &str,
        wake: &Arc<WakeHandle>,
        uid: &mut u16,
        subtrees: &mut Vec<Subtree>,
    ) -> Result<NodePtr, FactoryError> {
        match blueprint {
            Blueprint::Node {
                registration_id,
                instance_name,
                input_ports,
                output_ports,
                children,
            } => {
                let (builder, manifest) = self
                    .builders
                    .get(registration_id)
                    .ok_or_else(|| FactoryError::UnknownNodeType(registration_id.clone()))?;

                let name = instance_name.clone().unwrap_or_else(|| registration_id.clone());
                let full_path = format!("{path_prefix}/{name}");

                let mut built_children = Vec::with_capacity(children.len());
                for child in children {
                    built_children.push(self.build(
                        child,
                        blackboard,
                        &full_path,
                        wake,
                        uid,
                        subtrees,
                    )?);
                }

                let mut config = NodeConfig::new(blackboard.clone());
                for (port, value) in input_ports {
                    config.bind_input(port.clone(), value.clone());
                }
                for (port, value) in output_ports {
                    config.bind_output(port.clone(), value.clone());
                }
                config.set_manifest(Arc::clone(manifest));
                config.set_wake_handle(Arc::clone(wake));

                let node = builder(config, built_children);
                *uid += 1;
                {
                    let mut node_mut = node.borrow_mut();
                    let data = node_mut.node_data_mut();
                    data.name = name;
                    data.registration_id = registration_id.clone();
                    data.full_path = full_path;
                    data.uid = *uid;
                    data.set_wake_handle(Arc::clone(wake));
                }
                set_children_wake(&node, wake);

                Ok(node)
            }
            Blueprint::Subtree {
                tree_id,
                instance_name,
                remappings,
                autoremap,
            } => {
                let subtree_blueprint = self
                    .trees
                    .get(tree_id)
                    .ok_or_else(|| FactoryError::UnknownSubtree(tree_id.clone()))?;

                let child_bb = Blackboard::with_parent(blackboard);
                for (internal, external) in remappings {
                    child_bb.add_subtree_remapping(internal.clone(), external.clone());
                }
                if *autoremap {
                    child_bb.enable_auto_remapping(true);
                }

                let name = instance_name.clone().unwrap_or_else(|| tree_id.clone());
                let full_path = format!("{path_prefix}/{name}");

                let subtree_root = self.build(
                    subtree_blueprint,
                    &child_bb,
                    &full_path,
                    wake,
                    uid,
                    subtrees,
                )?;

                subtrees.push(Subtree {
                    root: Rc::clone(&subtree_root),
                    blackboard: child_bb,
                    instance_name: name.clone(),
                    path_prefix: full_path.clone(),
                });

                let mut subtree_config = NodeConfig::new(blackboard.clone());
                subtree_config.set_wake_handle(Arc::clone(wake));
                let mut data = NodeData::new(name, "SubTree", subtree_config);
                data.full_path = full_path;
                *uid += 1;
                data.uid = *uid;
                data.set_wake_handle(Arc::clone(wake));
                data.children.push(subtree_root);

                Ok(Rc::new(RefCell::new(SubTreeNode::from_parts(data))))
            }
        }
    }
}

fn set_children_wake(node: &NodePtr, wake: &Arc<WakeHandle>) {
    let children: Vec<NodePtr> = node.borrow().node_data().children.clone();
    for child in children {
        child
            .borrow_mut()
            .node_data_mut()
            .set_wake_handle(Arc::clone(wake));
        set_children_wake(&child, wake);
    }
}
