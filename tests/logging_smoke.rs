//! Confirms a node's status transition actually goes through `log` at
//! `debug` level, the single choke point `execute_tick` logs through. Runs
//! in its own test binary since installing a logger is a global, one-shot
//! operation and the other integration tests install `pretty_env_logger`
//! instead.

mod support;

use std::sync::Mutex;

use behavior_tree::{Blackboard, Blueprint, Factory};
use log::{Level, Log, Metadata, Record};

use support::StatusNode;

struct CapturingLogger {
    records: Mutex<Vec<(Level, String)>>,
}

impl Log for CapturingLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= Level::Debug
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            self.records
                .lock()
                .unwrap()
                .push((record.level(), record.args().to_string()));
        }
    }

    fn flush(&self) {}
}

static LOGGER: CapturingLogger = CapturingLogger {
    records: Mutex::new(Vec::new()),
};

#[test]
fn status_transition_emits_a_debug_record() {
    let _ = log::set_logger(&LOGGER);
    log::set_max_level(log::LevelFilter::Debug);

    let mut factory = Factory::new();
    factory.register_node_type::<StatusNode>("StatusNode");
    factory.register_tree("main", Blueprint::node("StatusNode").input("status", "SUCCESS"));

    let mut tree = factory.create_tree("main", Blackboard::create()).unwrap();
    tree.tick_once().unwrap();

    let records = LOGGER.records.lock().unwrap();
    assert!(records
        .iter()
        .any(|(level, message)| *level == Level::Debug && message.contains("Idle -> Success")));
}
