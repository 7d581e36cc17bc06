//! Integration coverage for composite nodes, built the way the original
//! engine's `tests/control_tests.rs` exercises them: assemble a small tree
//! through the factory, tick it, and check the resulting status (and, where
//! it matters, how many times a leaf actually ran).

mod support;

use std::time::Duration;

use behavior_tree::{Blackboard, Blueprint, Factory};
use log::info;

use support::{CountToNode, StatusNode, SuccessThenFailureNode};

fn factory() -> Factory {
    let mut factory = Factory::new();
    factory.register_node_type::<StatusNode>("StatusNode");
    factory.register_node_type::<SuccessThenFailureNode>("SuccessThenFailure");
    factory.register_node_type::<CountToNode>("CountTo");
    factory
}

#[test]
fn fallback_stops_at_first_success() {
    support::test_setup();

    let mut factory = factory();
    factory.register_tree(
        "main",
        Blueprint::node("Fallback").children([
            Blueprint::node("StatusNode").input("status", "FAILURE"),
            Blueprint::node("StatusNode").input("status", "FAILURE"),
            Blueprint::node("StatusNode").input("status", "SUCCESS"),
        ]),
    );

    let mut tree = factory.create_tree("main", Blackboard::create()).unwrap();
    let status = tree.tick_while_running(Duration::from_millis(1)).unwrap();
    info!("{status:?}");
    assert_eq!(status, behavior_tree::NodeStatus::Success);
}

#[test]
fn sequence_with_memory_resumes_from_failed_child() {
    support::test_setup();

    // First child always succeeds, second fails once then succeeds, third
    // always succeeds. A plain `Sequence` would re-tick the first child on
    // every resumption; `SequenceWithMemory` must not.
    let mut factory = factory();
    factory.register_tree(
        "main",
        Blueprint::node("SequenceWithMemory").children([
            Blueprint::node("StatusNode").input("status", "SUCCESS"),
            Blueprint::node("SuccessThenFailure").input("good_runs", "0"),
            Blueprint::node("StatusNode").input("status", "SUCCESS"),
        ]),
    );

    let mut tree = factory.create_tree("main", Blackboard::create()).unwrap();
    let status = tree.tick_once().unwrap();
    assert_eq!(status, behavior_tree::NodeStatus::Failure);
}

#[test]
fn reactive_fallback_short_circuits_every_tick() {
    support::test_setup();

    let mut factory = factory();
    factory.register_tree(
        "main",
        Blueprint::node("ReactiveFallback").children([
            Blueprint::node("StatusNode").input("status", "FAILURE"),
            Blueprint::node("StatusNode").input("status", "SUCCESS"),
        ]),
    );

    let mut tree = factory.create_tree("main", Blackboard::create()).unwrap();
    assert_eq!(tree.tick_once().unwrap(), behavior_tree::NodeStatus::Success);
    // Re-entering should re-evaluate the first child from scratch, not
    // remember where it left off.
    assert_eq!(tree.tick_once().unwrap(), behavior_tree::NodeStatus::Success);
}

#[test]
fn reactive_sequence_halts_a_later_child_when_the_running_index_regresses() {
    support::test_setup();

    // child 0 starts out succeeding, so the first tick's running child is
    // child 1 (a long-running CountTo). On the second tick child 0 itself
    // reports Running, so the running index moves back down to 0. child 1
    // is still Running from the previous tick and must be halted, not left
    // dangling.
    let blackboard = Blackboard::create();
    blackboard.set("first_status", "SUCCESS".to_string()).unwrap();

    let mut factory = factory();
    factory.register_tree(
        "main",
        Blueprint::node("ReactiveSequence").children([
            Blueprint::node("StatusNode").input("status", "{first_status}"),
            Blueprint::node("CountTo").named("long_running").input("target_ticks", "100"),
        ]),
    );

    let mut tree = factory.create_tree("main", blackboard.clone()).unwrap();
    assert_eq!(tree.tick_once().unwrap(), behavior_tree::NodeStatus::Running);

    blackboard.set("first_status", "RUNNING".to_string()).unwrap();
    assert_eq!(tree.tick_once().unwrap(), behavior_tree::NodeStatus::Running);

    // child 1 should have been halted (its internal counter reset) rather
    // than left running from the first tick; reverting to SUCCESS and
    // letting it run again should need the full target_ticks count again,
    // not resume from where it left off.
    blackboard.set("first_status", "SUCCESS".to_string()).unwrap();
    for _ in 0..99 {
        assert_eq!(tree.tick_once().unwrap(), behavior_tree::NodeStatus::Running);
    }
    assert_eq!(tree.tick_once().unwrap(), behavior_tree::NodeStatus::Success);
}

#[test]
fn parallel_succeeds_at_threshold() {
    support::test_setup();

    let mut factory = factory();
    factory.register_tree(
        "main",
        Blueprint::node("Parallel")
            .input("success_count", "2")
            .input("failure_count", "-1")
            .children([
                Blueprint::node("StatusNode").input("status", "SUCCESS"),
                Blueprint::node("StatusNode").input("status", "SUCCESS"),
                Blueprint::node("CountTo").input("target_ticks", "100"),
            ]),
    );

    let mut tree = factory.create_tree("main", Blackboard::create()).unwrap();
    let status = tree.tick_once().unwrap();
    assert_eq!(status, behavior_tree::NodeStatus::Success);
}

#[test]
fn parallel_fails_at_threshold() {
    support::test_setup();

    let mut factory = factory();
    factory.register_tree(
        "main",
        Blueprint::node("Parallel")
            .input("success_count", "-1")
            .input("failure_count", "2")
            .children([
                Blueprint::node("StatusNode").input("status", "FAILURE"),
                Blueprint::node("StatusNode").input("status", "FAILURE"),
                Blueprint::node("CountTo").input("target_ticks", "100"),
            ]),
    );

    let mut tree = factory.create_tree("main", Blackboard::create()).unwrap();
    let status = tree.tick_once().unwrap();
    assert_eq!(status, behavior_tree::NodeStatus::Failure);
}

#[test]
fn switch_retargets_on_value_change() {
    support::test_setup();

    let mut factory = factory();
    factory.register_tree(
        "main",
        Blueprint::node("Switch2")
            .input("variable", "{which}")
            .input("case_1", "one")
            .input("case_2", "two")
            .children([
                Blueprint::node("CountTo").named("branch_one").input("target_ticks", "100"),
                Blueprint::node("CountTo").named("branch_two").input("target_ticks", "100"),
                Blueprint::node("StatusNode").named("default_branch").input("status", "FAILURE"),
            ]),
    );

    let blackboard = Blackboard::create();
    blackboard.set("which", "one".to_string()).unwrap();

    let mut tree = factory.create_tree("main", blackboard.clone()).unwrap();
    assert_eq!(tree.tick_once().unwrap(), behavior_tree::NodeStatus::Running);

    // Switching the variable mid-flight halts the running branch and
    // re-enters on the new one instead of resuming it.
    blackboard.set("which", "two".to_string()).unwrap();
    assert_eq!(tree.tick_once().unwrap(), behavior_tree::NodeStatus::Running);
}

#[test]
fn try_catch_runs_catch_child_on_try_failure() {
    support::test_setup();

    let mut factory = factory();
    factory.register_tree(
        "main",
        Blueprint::node("TryCatch").children([
            Blueprint::node("StatusNode").named("try").input("status", "FAILURE"),
            Blueprint::node("StatusNode").named("catch").input("status", "SUCCESS"),
        ]),
    );

    let mut tree = factory.create_tree("main", Blackboard::create()).unwrap();
    // The catch child running (successfully or not) still means the try
    // block failed, so the node as a whole reports Failure.
    assert_eq!(tree.tick_once().unwrap(), behavior_tree::NodeStatus::Failure);
}
