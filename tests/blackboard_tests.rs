//! Blackboard type-locking behavior as seen through node ports, rather than
//! through the blackboard's own unit tests (see `src/blackboard.rs`).

mod support;

use behavior_tree::{Blackboard, Blueprint, Factory, NodeStatus};

use support::CountToNode;

#[test]
fn a_fresh_entry_locks_to_the_first_non_string_type_written() {
    let bb = Blackboard::create();
    bb.set("count", 3i64).unwrap();
    // Locked to i64; a different numeric type is rejected outright, and a
    // string that doesn't parse as i64 fails too.
    assert!(bb.set("count", 1.5f64).is_err());
    assert!(bb.set("count", "not a number".to_string()).is_err());
}

#[test]
fn a_string_write_to_a_locked_entry_parses_through_that_type() {
    let bb = Blackboard::create();
    bb.set("count", 3i64).unwrap();
    // A string that *does* parse as i64 goes through rather than being
    // rejected for being the "wrong" type.
    bb.set("count", "42".to_string()).unwrap();
    assert_eq!(bb.get::<i64>("count").unwrap(), 42);
}

#[test]
fn string_values_are_a_valid_donor_for_a_typed_port() {
    support::test_setup();

    let mut factory = Factory::new();
    factory.register_node_type::<CountToNode>("CountTo");
    factory.register_tree(
        "main",
        Blueprint::node("CountTo").input("target_ticks", "{limit}"),
    );

    let blackboard = Blackboard::create();
    // Written as a string; the port is declared `i64`, so `get_input`
    // should parse it through `FromString` rather than failing outright.
    blackboard.set("limit", "1".to_string()).unwrap();

    let mut tree = factory.create_tree("main", blackboard).unwrap();
    assert_eq!(tree.tick_once().unwrap(), NodeStatus::Success);
}
