//! The typed, type-locking blackboard. Grounded on the original engine's
//! `Blackboard` (parent-chain lookup, `internal_to_external` remap table,
//! `get`/`get_exact` split, `strip_bb_pointer`), generalized with an
//! explicit per-entry lock state so reads/writes follow the type-locking
//! rules instead of silently overwriting whatever was there.
//!
//! Every entry mutation, value, sequence id, timestamp, happens under
//! the entry's own `Mutex` in one critical section. The original engine
//! this crate is modeled after shipped a version that wrote those fields
//! outside the entry lock after inserting into the map, which TSan could
//! catch as a race against a reader holding the entry handle; this
//! implementation never does that.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use std::time::Instant;

use crate::any_value::{is_dynamic_type, to_canonical, Dynamic, FromCanonical};
use crate::basic_types::FromString;
use crate::error::{NodeError, NodeResult};

/// A blackboard-pointer port value (`"{name}"`) vs. a plain literal.
pub trait BlackboardString {
    fn strip_bb_pointer(&self) -> Option<String>;
    fn is_bb_pointer(&self) -> bool;
}

impl<T: AsRef<str>> BlackboardString for T {
    fn strip_bb_pointer(&self) -> Option<String> {
        let s = self.as_ref();
        if s.starts_with('{') && s.ends_with('}') && s.len() >= 2 {
            Some(s[1..s.len() - 1].to_string())
        } else {
            None
        }
    }

    fn is_bb_pointer(&self) -> bool {
        let s = self.as_ref();
        s.starts_with('{') && s.ends_with('}')
    }
}

struct Entry {
    value: Box<dyn Any + Send>,
    type_id: Option<TypeId>,
    type_name: &'static str,
    locked: bool,
    seq: u64,
    #[allow(dead_code)]
    timestamp: Instant,
}

impl Entry {
    fn placeholder() -> Self {
        Self {
            value: Box::new(()),
            type_id: None,
            type_name: "()",
            locked: false,
            seq: 0,
            timestamp: Instant::now(),
        }
    }
}

type EntryHandle = Arc<Mutex<Entry>>;

#[derive(Default)]
struct RemapTable {
    internal_to_external: HashMap<String, String>,
    auto_remapping: bool,
}

/// Cheap to clone: every clone shares the same underlying storage, exactly
/// like the original engine's `Arc<RwLock<BlackboardData>>` handle. The parent
/// chain walks through owned clones rather than references so a subtree's
/// blackboard can outlive the scope that built it.
#[derive(Clone)]
pub struct Blackboard {
    registry: Arc<RwLock<HashMap<String, EntryHandle>>>,
    remap: Arc<RwLock<RemapTable>>,
    seq: Arc<AtomicU64>,
    parent: Option<Box<Blackboard>>,
}

impl Blackboard {
    pub fn create() -> Blackboard {
        Blackboard {
            registry: Arc::new(RwLock::new(HashMap::new())),
            remap: Arc::new(RwLock::new(RemapTable::default())),
            seq: Arc::new(AtomicU64::new(0)),
            parent: None,
        }
    }

    pub fn with_parent(parent: &Blackboard) -> Blackboard {
        Blackboard {
            registry: Arc::new(RwLock::new(HashMap::new())),
            remap: Arc::new(RwLock::new(RemapTable::default())),
            seq: Arc::new(AtomicU64::new(0)),
            parent: Some(Box::new(parent.clone())),
        }
    }

    pub fn enable_auto_remapping(&self, enabled: bool) {
        self.remap.write().unwrap().auto_remapping = enabled;
    }

    pub fn add_subtree_remapping(&self, internal: impl Into<String>, external: impl Into<String>) {
        self.remap
            .write()
            .unwrap()
            .internal_to_external
            .insert(internal.into(), external.into());
    }

    /// Looks up `key`'s entry handle, following the remap/auto-remap chain
    /// into the parent if it isn't present locally. A remap hit is cached
    /// locally (same `EntryHandle`, so writes through either name stay in
    /// sync) so repeated lookups don't re-walk the chain.
    pub fn get_entry(&self, key: &str) -> Option<EntryHandle> {
        if let Some(entry) = self.registry.read().unwrap().get(key) {
            return Some(Arc::clone(entry));
        }

        let parent = self.parent.as_deref()?;
        let remap = self.remap.read().unwrap();
        if let Some(external) = remap.internal_to_external.get(key) {
            let external = external.clone();
            drop(remap);
            let found = parent.get_entry(&external)?;
            self.registry
                .write()
                .unwrap()
                .insert(key.to_string(), Arc::clone(&found));
            return Some(found);
        }
        if remap.auto_remapping {
            drop(remap);
            return parent.get_entry(key);
        }
        None
    }

    /// Same cascading resolution as `get_entry`, but creates a fresh local
    /// entry (or a forwarded one in the parent) if nothing exists yet.
    pub fn create_entry(&self, key: &str) -> EntryHandle {
        if let Some(entry) = self.registry.read().unwrap().get(key) {
            return Arc::clone(entry);
        }

        let remap = self.remap.read().unwrap();
        let entry = if let Some(external) = remap.internal_to_external.get(key) {
            let external = external.clone();
            drop(remap);
            self.parent.as_ref().unwrap().create_entry(&external)
        } else if remap.auto_remapping && self.parent.is_some() {
            drop(remap);
            self.parent.as_ref().unwrap().create_entry(key)
        } else {
            drop(remap);
            Arc::new(Mutex::new(Entry::placeholder()))
        };

        self.registry
            .write()
            .unwrap()
            .insert(key.to_string(), Arc::clone(&entry));
        entry
    }

    pub fn unset(&self, key: &str) {
        self.registry.write().unwrap().remove(key);
    }

    pub fn keys(&self) -> Vec<String> {
        self.registry.read().unwrap().keys().cloned().collect()
    }

    /// Copies every locally-visible entry's current value into `other`,
    /// keyed by the same name. Used to seed a subtree's blackboard with a
    /// snapshot rather than a live forwarding link.
    pub fn clone_into(&self, other: &Blackboard) {
        let keys = self.keys();
        for key in keys {
            if let Some(entry) = self.get_entry(&key) {
                let guard = entry.lock().unwrap();
                if guard.type_id.is_none() {
                    continue;
                }
                let cloned = clone_erased(&guard);
                drop(guard);
                if let Some(cloned) = cloned {
                    other.set_erased(&key, cloned);
                }
            }
        }
    }

    fn set_erased(&self, key: &str, cloned: ErasedClone) {
        let entry = self.create_entry(key);
        let mut guard = entry.lock().unwrap();
        guard.value = cloned.value;
        guard.type_id = Some(cloned.type_id);
        guard.type_name = cloned.type_name;
        guard.locked = cloned.locked;
        guard.seq = self.seq.fetch_add(1, Ordering::Relaxed);
        guard.timestamp = Instant::now();
    }

    /// One line per entry: name, locked type (or `"<unset>"`), sequence id.
    pub fn debug_message(&self) -> String {
        let mut lines = Vec::new();
        for key in self.keys() {
            if let Some(entry) = self.get_entry(&key) {
                let guard = entry.lock().unwrap();
                lines.push(format!(
                    "{key} -> {} (seq {})",
                    guard.type_name, guard.seq
                ));
            }
        }
        lines.join("\n")
    }

    /// Reads `key` as `T`. Tries, in order: a direct match of the stored
    /// type; if the stored value is a `String`, `T::from_string`; if the
    /// stored value is some other arithmetic type, the canonical safe-cast
    /// rules. Anything else is a `TypeLocked` mismatch.
    pub fn get<T>(&self, key: &str) -> NodeResult<T>
    where
        T: Any + Clone + FromString + FromCanonical + 'static,
    {
        let entry = self
            .get_entry(key)
            .ok_or_else(|| NodeError::MissingKey(key.to_string()))?;
        let guard = entry.lock().unwrap();

        if let Some(value) = guard.value.downcast_ref::<T>() {
            return Ok(value.clone());
        }
        if let Some(s) = guard.value.downcast_ref::<String>() {
            return T::from_string(s)
                .map_err(|_| NodeError::ConversionFailed(key.to_string()));
        }
        if let Some(canonical) = to_canonical(guard.value.as_ref()) {
            return T::from_canonical(canonical)
                .ok_or(NodeError::NumericCastFailed(canonical));
        }

        Err(NodeError::TypeLocked(
            key.to_string(),
            guard.type_name,
            std::any::type_name::<T>(),
        ))
    }

    /// Reads `key` as exactly `T`, with no string-donor or numeric-cast
    /// fallback. Use for types that don't implement `FromString`.
    pub fn get_exact<T: Any + Clone + 'static>(&self, key: &str) -> NodeResult<T> {
        let entry = self
            .get_entry(key)
            .ok_or_else(|| NodeError::MissingKey(key.to_string()))?;
        let guard = entry.lock().unwrap();
        guard
            .value
            .downcast_ref::<T>()
            .cloned()
            .ok_or_else(|| NodeError::TypeLocked(key.to_string(), guard.type_name, std::any::type_name::<T>()))
    }

    /// Writes `value` at `key`, enforcing the type lock. A fresh
    /// entry locks to the first non-`String` type written to it; a
    /// `Dynamic` write always bypasses the lock entirely. A `String` write
    /// to an entry already locked to some other type is parsed through that
    /// type's `FromString` converter rather than rejected outright; the
    /// write only fails if the parse itself fails (or the locked type has no
    /// known string conversion).
    pub fn set<T: Any + Send + 'static>(&self, key: &str, value: T) -> NodeResult<()> {
        let entry = self.create_entry(key);
        let mut guard = entry.lock().unwrap();

        let writing_dynamic = is_dynamic_type(TypeId::of::<T>());
        let writing_string = TypeId::of::<T>() == TypeId::of::<String>();

        if !writing_dynamic && guard.locked && guard.type_id != Some(TypeId::of::<T>()) {
            if writing_string {
                let as_string = (&value as &dyn Any).downcast_ref::<String>().unwrap();
                let locked_type = guard.type_id.unwrap();
                let parsed = crate::any_value::parse_string_into_locked(locked_type, as_string)
                    .ok_or_else(|| NodeError::ConversionFailed(key.to_string()))?;
                guard.value = parsed;
                guard.seq = self.seq.fetch_add(1, Ordering::Relaxed);
                guard.timestamp = Instant::now();
                return Ok(());
            }
            return Err(NodeError::TypeLocked(
                key.to_string(),
                guard.type_name,
                std::any::type_name::<T>(),
            ));
        }

        guard.value = Box::new(value);
        if !writing_dynamic {
            guard.type_id = Some(TypeId::of::<T>());
            guard.type_name = std::any::type_name::<T>();
            guard.locked = guard.locked || !writing_string;
        }
        guard.seq = self.seq.fetch_add(1, Ordering::Relaxed);
        guard.timestamp = Instant::now();

        Ok(())
    }

    /// Writes `key` with no type-lock enforcement at all, for callers (like
    /// `Dynamic` construction sites) that already know they're bypassing
    /// the lock on purpose.
    pub fn set_exact<T: Any + Send + 'static>(&self, key: &str, value: T) {
        let entry = self.create_entry(key);
        let mut guard = entry.lock().unwrap();
        guard.value = Box::new(value);
        guard.seq = self.seq.fetch_add(1, Ordering::Relaxed);
        guard.timestamp = Instant::now();
    }

    /// Reads an escape-hatch `Dynamic` entry by reference, without requiring
    /// `Dynamic: Clone`.
    pub fn with_dynamic<R>(&self, key: &str, f: impl FnOnce(&Dynamic) -> R) -> NodeResult<R> {
        let entry = self
            .get_entry(key)
            .ok_or_else(|| NodeError::MissingKey(key.to_string()))?;
        let guard = entry.lock().unwrap();
        let dynamic = guard
            .value
            .downcast_ref::<Dynamic>()
            .ok_or_else(|| NodeError::TypeLocked(key.to_string(), guard.type_name, "Dynamic"))?;
        Ok(f(dynamic))
    }
}

struct ErasedClone {
    value: Box<dyn Any + Send>,
    type_id: TypeId,
    type_name: &'static str,
    locked: bool,
}

/// Clones a locked entry's erased value by trying the type set this crate
/// knows how to clone without the caller naming a concrete type. Custom
/// application types that aren't in this list simply don't survive
/// `clone_into`, document any such type as not subtree-snapshot-safe.
fn clone_erased(entry: &Entry) -> Option<ErasedClone> {
    macro_rules! try_clone {
        ($($t:ty),*) => {
            $(if let Some(v) = entry.value.downcast_ref::<$t>() {
                return Some(ErasedClone {
                    value: Box::new(v.clone()),
                    type_id: entry.type_id.unwrap(),
                    type_name: entry.type_name,
                    locked: entry.locked,
                });
            })*
        };
    }

    try_clone!(
        bool, String, f32, f64, u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize
    );
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_then_get_round_trips() {
        let bb = Blackboard::create();
        bb.set("count", 3i32).unwrap();
        assert_eq!(bb.get::<i32>("count").unwrap(), 3);
    }

    #[test]
    fn string_donor_parses_into_requested_type() {
        let bb = Blackboard::create();
        bb.set("count", "42".to_string()).unwrap();
        assert_eq!(bb.get::<i32>("count").unwrap(), 42);
    }

    #[test]
    fn numeric_widening_cast_succeeds() {
        let bb = Blackboard::create();
        bb.set("small", 7i32).unwrap();
        assert_eq!(bb.get::<i64>("small").unwrap(), 7);
    }

    #[test]
    fn narrowing_overflow_fails() {
        let bb = Blackboard::create();
        bb.set("big", 70000i32).unwrap();
        assert!(bb.get::<u8>("big").is_err());
    }

    #[test]
    fn locked_entry_rejects_incompatible_type() {
        let bb = Blackboard::create();
        bb.set("flag", true).unwrap();
        assert!(bb.set("flag", "not a bool".to_string()).is_err());
    }

    #[test]
    fn a_valid_string_write_parses_into_an_already_locked_type() {
        let bb = Blackboard::create();
        bb.set("count", 3i64).unwrap();
        bb.set("count", "42".to_string()).unwrap();
        assert_eq!(bb.get::<i64>("count").unwrap(), 42);

        bb.set("flag", true).unwrap();
        bb.set("flag", "false".to_string()).unwrap();
        assert_eq!(bb.get::<bool>("flag").unwrap(), false);
    }

    #[test]
    fn remapping_forwards_to_parent() {
        let parent = Blackboard::create();
        parent.set("goal_x", 10i32).unwrap();

        let child = Blackboard::with_parent(&parent);
        child.add_subtree_remapping("x", "goal_x");

        assert_eq!(child.get::<i32>("x").unwrap(), 10);
        child.set("x", 20i32).unwrap();
        assert_eq!(parent.get::<i32>("goal_x").unwrap(), 20);
    }

    #[test]
    fn auto_remapping_falls_through_unresolved_keys() {
        let parent = Blackboard::create();
        parent.set("shared", 1i32).unwrap();

        let child = Blackboard::with_parent(&parent);
        child.enable_auto_remapping(true);

        assert_eq!(child.get::<i32>("shared").unwrap(), 1);
    }

    #[test]
    fn dynamic_write_bypasses_lock() {
        let bb = Blackboard::create();
        bb.set("slot", 1i32).unwrap();
        bb.set_exact("slot", Dynamic::new("anything"));
        let read_back = bb
            .with_dynamic("slot", |d| d.downcast_ref::<&'static str>().copied())
            .unwrap();
        assert_eq!(read_back, Some("anything"));
    }

    #[test]
    fn clone_into_copies_snapshot_not_link() {
        let src = Blackboard::create();
        src.set("hp", 100i32).unwrap();

        let dst = Blackboard::create();
        src.clone_into(&dst);
        src.set("hp", 50i32).unwrap();

        assert_eq!(dst.get::<i32>("hp").unwrap(), 100);
    }

    #[test]
    fn concurrent_set_and_unset_do_not_panic() {
        use std::thread;

        let bb = Blackboard::create();
        bb.set("key", 0i32).unwrap();

        let setter_bb = bb.clone();
        let setter = thread::spawn(move || {
            for i in 0..2000 {
                let _ = setter_bb.set("key", i);
            }
        });
        let unsetter_bb = bb.clone();
        let unsetter = thread::spawn(move || {
            for _ in 0..2000 {
                unsetter_bb.unset("key");
            }
        });

        setter.join().unwrap();
        unsetter.join().unwrap();
    }
}
