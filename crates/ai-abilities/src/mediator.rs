//! Read-only view of an agent's abilities, shared with every ability at initialization.

use std::any::{Any, TypeId};
use std::sync::Arc;

use crate::capability::BufferType;
use crate::link::AbilityId;

/// Shared handle abilities keep to reach their peers.
pub type Mediator = Arc<AbilityDirectory>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryEntry {
    pub id: AbilityId,
    pub name: String,
    pub buffer_type: BufferType,
    pub type_id: TypeId,
    pub type_name: &'static str,
}

/// Narrow lookup interface handed to abilities during setup.
pub trait AbilityLookup {
    /// All entries in traversal order.
    fn entries(&self) -> &[DirectoryEntry];

    fn ids_of_type(&self, type_id: TypeId) -> Vec<AbilityId> {
        self.entries()
            .iter()
            .filter(|e| e.type_id == type_id)
            .map(|e| e.id)
            .collect()
    }

    fn entry(&self, id: AbilityId) -> Option<&DirectoryEntry> {
        self.entries().iter().find(|e| e.id == id)
    }

    fn find_by_name(&self, name: &str) -> Option<AbilityId> {
        self.entries().iter().find(|e| e.name == name).map(|e| e.id)
    }
}

impl dyn AbilityLookup + '_ {
    pub fn ids_of<T: Any>(&self) -> Vec<AbilityId> {
        self.ids_of_type(TypeId::of::<T>())
    }
}

/// Immutable snapshot of the registry taken when an agent's abilities are initialized.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AbilityDirectory {
    entries: Vec<DirectoryEntry>,
}

impl AbilityDirectory {
    pub fn new(entries: Vec<DirectoryEntry>) -> Self {
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn ids_of<T: Any>(&self) -> Vec<AbilityId> {
        self.ids_of_type(TypeId::of::<T>())
    }

    pub fn name_of(&self, id: AbilityId) -> Option<&str> {
        self.entry(id).map(|e| e.name.as_str())
    }
}

impl AbilityLookup for AbilityDirectory {
    fn entries(&self) -> &[DirectoryEntry] {
        &self.entries
    }
}
