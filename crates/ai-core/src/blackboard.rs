use std::any::{type_name, Any};
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::marker::PhantomData;

/// Typed key into a [`Blackboard`].
///
/// Keys are plain numeric ids; the type parameter only fixes what is stored under them.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BbKey<T: 'static> {
    id: u64,
    _phantom: PhantomData<fn() -> T>,
}

impl<T: 'static> Copy for BbKey<T> {}

impl<T: 'static> Clone for BbKey<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: 'static> BbKey<T> {
    pub const fn new(id: u64) -> Self {
        Self {
            id,
            _phantom: PhantomData,
        }
    }

    pub fn id(self) -> u64 {
        self.id
    }
}

/// A key was read with a type other than the one its value was stored with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("blackboard key {key:#x} does not hold a `{requested}`")]
pub struct TypeMismatch {
    pub key: u64,
    pub requested: &'static str,
}

/// Per-agent scratch space.
///
/// Abilities attached to the same agent use it to hand values to each other during
/// activation; tooling uses it to collect traces.
#[derive(Default)]
pub struct Blackboard {
    values: BTreeMap<u64, Box<dyn Any>>,
}

impl Blackboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }

    pub fn contains<T: 'static>(&self, key: BbKey<T>) -> bool {
        self.values.contains_key(&key.id)
    }

    pub fn set<T: 'static>(&mut self, key: BbKey<T>, value: T) {
        self.values.insert(key.id, Box::new(value));
    }

    /// Typed read; `None` when absent or stored under another type.
    pub fn get<T: 'static>(&self, key: BbKey<T>) -> Option<&T> {
        self.try_get(key).ok().flatten()
    }

    pub fn get_mut<T: 'static>(&mut self, key: BbKey<T>) -> Option<&mut T> {
        self.try_get_mut(key).ok().flatten()
    }

    pub fn try_get<T: 'static>(&self, key: BbKey<T>) -> Result<Option<&T>, TypeMismatch> {
        match self.values.get(&key.id) {
            None => Ok(None),
            Some(value) => value
                .downcast_ref::<T>()
                .map(Some)
                .ok_or_else(|| mismatch::<T>(key.id)),
        }
    }

    pub fn try_get_mut<T: 'static>(
        &mut self,
        key: BbKey<T>,
    ) -> Result<Option<&mut T>, TypeMismatch> {
        match self.values.get_mut(&key.id) {
            None => Ok(None),
            Some(value) => value
                .downcast_mut::<T>()
                .map(Some)
                .ok_or_else(|| mismatch::<T>(key.id)),
        }
    }

    /// Returns the stored value, inserting `make()` first if the key is empty.
    ///
    /// A value of another type under the same key is replaced.
    pub fn get_or_insert_with<T: 'static>(
        &mut self,
        key: BbKey<T>,
        make: impl FnOnce() -> T,
    ) -> &mut T {
        let slot = match self.values.entry(key.id) {
            Entry::Occupied(mut entry) => {
                if !entry.get().is::<T>() {
                    entry.insert(Box::new(make()));
                }
                entry.into_mut()
            }
            Entry::Vacant(entry) => entry.insert(Box::new(make())),
        };
        match slot.downcast_mut::<T>() {
            Some(value) => value,
            None => unreachable!("slot was just normalized to the requested type"),
        }
    }

    /// Removes the value under `key`. A value of another type is left in place.
    pub fn remove<T: 'static>(&mut self, key: BbKey<T>) -> Result<Option<T>, TypeMismatch> {
        match self.values.get(&key.id) {
            None => return Ok(None),
            Some(value) if !value.is::<T>() => return Err(mismatch::<T>(key.id)),
            Some(_) => {}
        }
        Ok(self
            .values
            .remove(&key.id)
            .and_then(|value| value.downcast::<T>().ok())
            .map(|b| *b))
    }
}

fn mismatch<T: 'static>(key: u64) -> TypeMismatch {
    TypeMismatch {
        key,
        requested: type_name::<T>(),
    }
}
