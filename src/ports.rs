//! `NodeConfig`: the per-node bundle of blackboard handle + port remapping
//! table. Grounded on the original engine's `NodeConfig::get_input`/
//! `set_output` (the `"="` / `"{name}"` / literal resolution rules), with
//! `get_input` pulling its type-lock-aware fallbacks from `Blackboard::get`
//! instead of a bare `Option`.

use std::sync::Arc;

use crate::basic_types::{remapped_key, FromString, PortsList, PortsRemapping, TreeNodeManifest};
use crate::blackboard::Blackboard;
use crate::error::{NodeError, NodeResult};
use crate::node::WakeHandle;

/// Everything a node needs beyond its own fields: the blackboard it reads
/// and writes through, its port remapping tables, and a pointer to the
/// manifest the factory captured for it (used to resolve port defaults).
#[derive(Clone)]
pub struct NodeConfig {
    blackboard: Blackboard,
    input_ports: PortsRemapping,
    output_ports: PortsRemapping,
    manifest: Option<Arc<TreeNodeManifest>>,
    wake: Option<Arc<WakeHandle>>,
}

impl NodeConfig {
    pub fn new(blackboard: Blackboard) -> NodeConfig {
        Self {
            blackboard,
            input_ports: PortsRemapping::new(),
            output_ports: PortsRemapping::new(),
            manifest: None,
            wake: None,
        }
    }

    pub fn blackboard(&self) -> &Blackboard {
        &self.blackboard
    }

    pub fn set_manifest(&mut self, manifest: Arc<TreeNodeManifest>) {
        self.manifest = Some(manifest);
    }

    /// Gives `set_output` a handle to the owning tree's wake condvar, so a
    /// port write can pull a sleeping `tick_while_running` loop out of its
    /// wait immediately instead of leaving it to the next sleep timeout.
    pub fn set_wake_handle(&mut self, wake: Arc<WakeHandle>) {
        self.wake = Some(wake);
    }

    pub fn manifest(&self) -> Option<&TreeNodeManifest> {
        self.manifest.as_deref()
    }

    pub fn bind_input(&mut self, port: impl Into<String>, value: impl Into<String>) {
        self.input_ports.insert(port.into(), value.into());
    }

    pub fn bind_output(&mut self, port: impl Into<String>, value: impl Into<String>) {
        self.output_ports.insert(port.into(), value.into());
    }

    fn port_declaration(&self, port: &str) -> Option<&crate::basic_types::PortInfo> {
        self.manifest.as_ref().and_then(|m| m.ports.get(port))
    }

    /// Resolves an input port's value. A bound blackboard pointer (`"="` or
    /// `"{name}"`) reads through the blackboard (type-locked, string-donor,
    /// numeric-cast rules all apply); anything else is parsed directly as a
    /// literal via `FromString`. An unbound port falls back to its
    /// manifest-declared default, if any.
    pub fn get_input<T>(&self, port: &str) -> NodeResult<T>
    where
        T: FromString + crate::any_value::FromCanonical + std::any::Any + Clone + 'static,
    {
        let raw = match self.input_ports.get(port).map(String::as_str) {
            Some(raw) if !raw.is_empty() => raw,
            _ => {
                return self
                    .port_declaration(port)
                    .and_then(|info| info.default_value())
                    .ok_or_else(|| NodeError::PortNotFound(port.to_string()))
                    .and_then(|default| {
                        T::from_string(default)
                            .map_err(|_| NodeError::ConversionFailed(port.to_string()))
                    });
            }
        };

        match remapped_key(port, raw) {
            Some(key) => self.blackboard.get::<T>(&key),
            None => T::from_string(raw).map_err(|_| NodeError::ConversionFailed(port.to_string())),
        }
    }

    /// Writes `value` through a bound output port. `"="` writes under the
    /// port's own name; `"{name}"` writes under `name`; any other literal is
    /// used as a blackboard key verbatim (matching the original engine's
    /// `set_output`, which treats a bare string the same way). Wakes the
    /// owning tree afterward, so a node sleeping in `tick_while_running`
    /// waiting on this entry doesn't have to wait out its sleep interval.
    pub fn set_output<T: std::any::Any + Send + 'static>(
        &self,
        port: &str,
        value: T,
    ) -> NodeResult<()> {
        let raw = self
            .output_ports
            .get(port)
            .ok_or_else(|| NodeError::PortNotFound(port.to_string()))?;
        let key = remapped_key(port, raw).unwrap_or_else(|| raw.clone());
        self.blackboard.set(&key, value)?;
        if let Some(wake) = &self.wake {
            wake.notify();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use super::*;

    #[test]
    fn set_output_wakes_a_sleeping_tick_loop() {
        let mut config = NodeConfig::new(Blackboard::create());
        config.bind_output("out", "=");
        let wake = WakeHandle::new();
        config.set_wake_handle(Arc::clone(&wake));

        config.set_output("out", 42i64).unwrap();

        // The notification already happened, so this shouldn't actually
        // have to wait out the timeout.
        let start = Instant::now();
        wake.wait_timeout(Duration::from_secs(5));
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn set_output_without_a_wake_handle_still_succeeds() {
        let mut config = NodeConfig::new(Blackboard::create());
        config.bind_output("out", "=");
        assert!(config.set_output("out", 1i64).is_ok());
    }
}
