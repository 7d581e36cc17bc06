//! Shared value types: node status, the registration-category enum, and the
//! port-declaration machinery. Grounded on the original engine's
//! `basic_types.rs` (same `NodeStatus`/`FromString`/`BTToString` shape),
//! generalized with the `Generic`/`Dynamic` port-constraint rule this
//! engine's type-locking contract needs.

use std::any::TypeId;
use std::collections::HashMap;
use std::convert::Infallible;
use std::str::FromStr;

use thiserror::Error;

use crate::any_value::Dynamic;

/// Every node's state at any instant. Five-valued, not tri-valued: `Idle`
/// exists so a node can tell "never entered this activation" from
/// "running", and `Skipped` exists so composites can tell whether any real
/// work happened this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeStatus {
    Idle,
    Running,
    Success,
    Failure,
    Skipped,
}

impl NodeStatus {
    /// True only for `Running`, the one status that means "keep me alive
    /// across ticks".
    pub fn is_running(&self) -> bool {
        matches!(self, Self::Running)
    }

    /// True for any of the three terminal outcomes.
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Success | Self::Failure | Self::Skipped)
    }
}

impl std::fmt::Display for NodeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            Self::Idle => "IDLE",
            Self::Running => "RUNNING",
            Self::Success => "SUCCESS",
            Self::Failure => "FAILURE",
            Self::Skipped => "SKIPPED",
        };
        write!(f, "{text}")
    }
}

/// Coarse category a registered node belongs to. Used for diagnostics and
/// by the factory to validate child-count invariants before the tree is
/// ticked for the first time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeCategory {
    Action,
    Condition,
    Control,
    Decorator,
    SubTree,
}

impl std::fmt::Display for NodeCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            Self::Action => "Action",
            Self::Condition => "Condition",
            Self::Control => "Control",
            Self::Decorator => "Decorator",
            Self::SubTree => "SubTree",
        };
        write!(f, "{text}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortDirection {
    Input,
    Output,
    InOut,
}

// ===========================
// String <-> T conversion
// ===========================

/// Lets a port literal or a blackboard string donor be parsed into `T`.
/// Implemented out of the box for all numeric types, `bool`, and `String`.
/// Implement it for custom port types the same way; the blanket impl below
/// means anything with a `FromStr` impl gets `FromString` for free.
pub trait FromString: Sized {
    type Err;

    fn from_string(value: &str) -> Result<Self, Self::Err>;
}

macro_rules! impl_from_string_via_fromstr {
    ($($t:ty),*) => {
        $(impl FromString for $t {
            type Err = <$t as FromStr>::Err;

            fn from_string(value: &str) -> Result<Self, Self::Err> {
                value.parse()
            }
        })*
    };
}

impl_from_string_via_fromstr!(
    u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize, f32, f64
);

impl FromString for String {
    type Err = Infallible;

    fn from_string(value: &str) -> Result<String, Self::Err> {
        Ok(value.to_string())
    }
}

#[derive(Error, Debug)]
#[error("string wasn't one of the expected forms: 1/0, true/false, TRUE/FALSE")]
pub struct ParseBoolError;

impl FromString for bool {
    type Err = ParseBoolError;

    fn from_string(value: &str) -> Result<bool, ParseBoolError> {
        match value {
            "1" | "true" | "TRUE" => Ok(true),
            "0" | "false" | "FALSE" => Ok(false),
            _ => Err(ParseBoolError),
        }
    }
}

/// Converts a typed value back into the blackboard's universal-donor string
/// form, for diagnostics and for round-tripping default port values.
pub trait BTToString {
    fn bt_to_string(&self) -> String;
}

impl BTToString for String {
    fn bt_to_string(&self) -> String {
        self.clone()
    }
}

macro_rules! impl_bt_to_string_via_display {
    ($($t:ty),*) => {
        $(impl BTToString for $t {
            fn bt_to_string(&self) -> String {
                self.to_string()
            }
        })*
    };
}

impl_bt_to_string_via_display!(
    u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize, f32, f64, bool
);

// ===========================
// Ports
// ===========================

pub type PortsList = HashMap<String, PortInfo>;
pub type PortsRemapping = HashMap<String, String>;

/// What kind of type constraint a port carries. `Typed` enforces the
/// blackboard's usual type-locking rules; `Generic`/`Dynamic` both disable
/// them (the type-locking rules), `Generic` is the declared-port-level
/// sentinel ("this port accepts anything"), `Dynamic` is the escape hatch a
/// concrete value can carry at write time regardless of the port.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PortType {
    Typed(TypeId),
    Generic,
}

#[derive(Debug, Clone)]
pub struct PortInfo {
    direction: PortDirection,
    port_type: PortType,
    type_name: &'static str,
    description: String,
    default_value: Option<String>,
}

impl PortInfo {
    pub fn new<T: 'static>(direction: PortDirection) -> PortInfo {
        Self {
            direction,
            port_type: PortType::Typed(TypeId::of::<T>()),
            type_name: std::any::type_name::<T>(),
            description: String::new(),
            default_value: None,
        }
    }

    pub fn new_generic(direction: PortDirection) -> PortInfo {
        Self {
            direction,
            port_type: PortType::Generic,
            type_name: "Any",
            description: String::new(),
            default_value: None,
        }
    }

    pub fn direction(&self) -> PortDirection {
        self.direction
    }

    pub fn port_type(&self) -> PortType {
        self.port_type
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn default_value(&self) -> Option<&str> {
        self.default_value.as_deref()
    }

    pub fn set_default(&mut self, default: impl Into<String>) {
        self.default_value = Some(default.into());
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
    }

    pub fn accepts_any(&self) -> bool {
        matches!(self.port_type, PortType::Generic) || self.type_name == std::any::type_name::<Dynamic>()
    }
}

/// Builder used from `provided_ports()` implementations.
pub struct Port {
    name: String,
    info: PortInfo,
}

impl Port {
    pub fn input<T: 'static>(name: impl Into<String>) -> Port {
        Port {
            name: name.into(),
            info: PortInfo::new::<T>(PortDirection::Input),
        }
    }

    pub fn output<T: 'static>(name: impl Into<String>) -> Port {
        Port {
            name: name.into(),
            info: PortInfo::new::<T>(PortDirection::Output),
        }
    }

    pub fn inout<T: 'static>(name: impl Into<String>) -> Port {
        Port {
            name: name.into(),
            info: PortInfo::new::<T>(PortDirection::InOut),
        }
    }

    pub fn input_any(name: impl Into<String>) -> Port {
        Port {
            name: name.into(),
            info: PortInfo::new_generic(PortDirection::Input),
        }
    }

    pub fn default(mut self, default: impl BTToString) -> Port {
        self.info.set_default(default.bt_to_string());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Port {
        self.info.set_description(description);
        self
    }

    pub fn build(self) -> (String, PortInfo) {
        (self.name, self.info)
    }
}

/// Assembles a `PortsList` from a sequence of `Port` builders, mirroring the
/// original engine's `define_ports!`/`input_port!` macros but as plain
/// function calls.
pub fn ports(list: impl IntoIterator<Item = Port>) -> PortsList {
    list.into_iter().map(Port::build).collect()
}

/// If `remapped` is the same-name wildcard (`"="`) or a `{name}` blackboard
/// pointer, returns the blackboard key it refers to.
pub fn remapped_key(port_name: &str, remapped: &str) -> Option<String> {
    if remapped == "=" {
        Some(port_name.to_string())
    } else if remapped.starts_with('{') && remapped.ends_with('}') && remapped.len() >= 2 {
        Some(remapped[1..remapped.len() - 1].to_string())
    } else {
        None
    }
}

#[derive(Clone, Debug)]
pub struct TreeNodeManifest {
    pub category: NodeCategory,
    pub registration_id: String,
    pub ports: PortsList,
    pub description: String,
}
