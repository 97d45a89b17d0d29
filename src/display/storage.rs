//! Typed key/value store, one per display and one per scene.
//!
//! Slots are registered with a type and an optional default. Access with a
//! different type is an error rather than a silent `None`.
//!
//! # Example
//!
//! ```
//! use cellgraph::Storage;
//!
//! let mut storage = Storage::new();
//! storage.register("page", Some(0u32));
//! storage.update("page", |page: &mut Option<u32>| *page = page.map(|p| p + 1)).unwrap();
//!
//! assert_eq!(storage.get::<u32>("page").unwrap(), Some(1));
//! assert!(storage.get::<String>("page").is_err());
//! ```

use std::any::{Any, TypeId, type_name};
use std::collections::HashMap;
use std::fmt;

use crate::error::{Error, Result};

struct Slot {
    type_id: TypeId,
    type_name: &'static str,
    value: Box<dyn Any>,
}

#[derive(Default)]
pub struct Storage {
    slots: HashMap<String, Slot>,
}

impl Storage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `id` holding values of type `T`. Returns false, leaving the
    /// existing slot alone, if `id` is already registered.
    pub fn register<T: Any>(&mut self, id: impl Into<String>, default: Option<T>) -> bool {
        let id = id.into();
        if self.slots.contains_key(&id) {
            return false;
        }
        self.slots.insert(
            id,
            Slot {
                type_id: TypeId::of::<T>(),
                type_name: type_name::<T>(),
                value: Box::new(default),
            },
        );
        true
    }

    pub fn unregister(&mut self, id: &str) -> bool {
        self.slots.remove(id).is_some()
    }

    pub fn is_registered(&self, id: &str) -> bool {
        self.slots.contains_key(id)
    }

    /// Registered ids, sorted.
    pub fn registered_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.slots.keys().cloned().collect();
        ids.sort();
        ids
    }

    fn slot<T: Any>(&self, id: &str) -> Result<&Option<T>> {
        let slot = self.slots.get(id).ok_or_else(|| Error::StorageMissing { id: id.to_string() })?;
        slot.value
            .downcast_ref::<Option<T>>()
            .ok_or_else(|| type_error::<T>(id, slot))
    }

    fn slot_mut<T: Any>(&mut self, id: &str) -> Result<&mut Option<T>> {
        let slot = self
            .slots
            .get_mut(id)
            .ok_or_else(|| Error::StorageMissing { id: id.to_string() })?;
        if slot.type_id != TypeId::of::<T>() {
            return Err(type_error::<T>(id, slot));
        }
        let expected = slot.type_name;
        slot.value
            .downcast_mut::<Option<T>>()
            .ok_or_else(|| Error::StorageType {
                id: id.to_string(),
                expected,
                requested: type_name::<T>(),
            })
    }

    pub fn get<T: Any + Clone>(&self, id: &str) -> Result<Option<T>> {
        self.slot::<T>(id).cloned()
    }

    pub fn set<T: Any>(&mut self, id: &str, value: Option<T>) -> Result<()> {
        *self.slot_mut::<T>(id)? = value;
        Ok(())
    }

    /// Mutate a slot in place.
    pub fn update<T: Any, R>(&mut self, id: &str, f: impl FnOnce(&mut Option<T>) -> R) -> Result<R> {
        Ok(f(self.slot_mut::<T>(id)?))
    }
}

fn type_error<T: Any>(id: &str, slot: &Slot) -> Error {
    Error::StorageType {
        id: id.to_string(),
        expected: slot.type_name,
        requested: type_name::<T>(),
    }
}

impl fmt::Debug for Storage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.slots.iter().map(|(id, slot)| (id, slot.type_name)))
            .finish()
    }
}
