//! Factory construction edge cases: unknown registrations, and a subtree
//! wired up with an explicit port remapping.

mod support;

use behavior_tree::{Blackboard, Blueprint, Factory, FactoryError, NodeStatus};

use support::StatusNode;

#[test]
fn unknown_node_type_is_reported() {
    support::test_setup();

    let mut factory = Factory::new();
    factory.register_tree("main", Blueprint::node("NotRegistered"));

    let err = factory.create_tree("main", Blackboard::create()).unwrap_err();
    assert!(matches!(err, FactoryError::UnknownNodeType(ref id) if id == "NotRegistered"));
}

#[test]
fn unknown_root_tree_is_reported() {
    support::test_setup();

    let factory = Factory::new();
    let err = factory.create_tree("missing", Blackboard::create()).unwrap_err();
    assert!(matches!(err, FactoryError::UnknownSubtree(ref id) if id == "missing"));
}

#[test]
fn subtree_remaps_a_port_from_the_parent_blackboard() {
    support::test_setup();

    let mut factory = Factory::new();
    factory.register_node_type::<StatusNode>("StatusNode");
    factory.register_tree(
        "child",
        Blueprint::node("StatusNode").input("status", "{outcome}"),
    );
    factory.register_tree(
        "main",
        Blueprint::subtree("child").remap("outcome", "parent_outcome"),
    );

    let blackboard = Blackboard::create();
    blackboard.set("parent_outcome", "SUCCESS".to_string()).unwrap();

    let mut tree = factory.create_tree("main", blackboard).unwrap();
    assert_eq!(tree.tick_once().unwrap(), NodeStatus::Success);
}

#[test]
fn subtree_instances_are_recorded_on_the_tree() {
    support::test_setup();

    let mut factory = Factory::new();
    factory.register_node_type::<StatusNode>("StatusNode");
    factory.register_tree("child", Blueprint::node("StatusNode").input("status", "SUCCESS"));
    factory.register_tree("main", Blueprint::subtree("child"));

    let tree = factory.create_tree("main", Blackboard::create()).unwrap();
    assert_eq!(tree.subtrees().len(), 1);
    assert_eq!(tree.subtrees()[0].instance_name, "child");
}
