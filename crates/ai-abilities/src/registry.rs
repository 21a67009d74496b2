//! Arena of the abilities attached to one agent.

use std::any::{type_name, Any};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use ai_core::{AgentId, WorldMut};

use crate::capability::{Ability, BufferType, SetupContext};
use crate::error::{AmbiguousLookup, SetupFailure};
use crate::link::{AbilityId, AbilityLink};
use crate::mediator::{AbilityDirectory, DirectoryEntry, Mediator};

/// Outcome of [`AbilityRegistry::initialize`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InitReport {
    /// Abilities whose setup hook succeeded, in traversal order.
    pub initialized: Vec<AbilityId>,
    pub failures: Vec<SetupFailure>,
}

impl InitReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Which abilities are live, keyed by stable identity.
///
/// Attach order decides where new links land; after [`AbilityRegistry::initialize`] the
/// link order becomes the traversal order used by lookups.
pub struct AbilityRegistry<W>
where
    W: WorldMut + 'static,
{
    next_id: u64,
    abilities: BTreeMap<AbilityId, Box<dyn Ability<W>>>,
    attach_order: Vec<AbilityId>,
    traversal: Vec<AbilityId>,
    setup_failed: BTreeSet<AbilityId>,
    mediator: Option<Mediator>,
}

impl<W> AbilityRegistry<W>
where
    W: WorldMut + 'static,
{
    pub fn new() -> Self {
        Self {
            next_id: 0,
            abilities: BTreeMap::new(),
            attach_order: Vec::new(),
            traversal: Vec::new(),
            setup_failed: BTreeSet::new(),
            mediator: None,
        }
    }

    pub fn attach<A: Ability<W>>(&mut self, ability: A) -> AbilityId {
        self.attach_boxed(Box::new(ability))
    }

    pub fn attach_boxed(&mut self, ability: Box<dyn Ability<W>>) -> AbilityId {
        let id = AbilityId(self.next_id);
        self.next_id += 1;
        tracing::debug!(
            %id,
            ability = ability.name(),
            buffer_type = %ability.buffer_type(),
            "ability attached"
        );
        self.abilities.insert(id, ability);
        self.attach_order.push(id);
        id
    }

    pub fn detach(&mut self, id: AbilityId) -> Option<Box<dyn Ability<W>>> {
        let ability = self.abilities.remove(&id)?;
        self.attach_order.retain(|other| *other != id);
        self.traversal.retain(|other| *other != id);
        self.setup_failed.remove(&id);
        tracing::debug!(%id, ability = ability.name(), "ability detached");
        Some(ability)
    }

    pub fn len(&self) -> usize {
        self.abilities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.abilities.is_empty()
    }

    pub fn contains(&self, id: AbilityId) -> bool {
        self.abilities.contains_key(&id)
    }

    pub fn get(&self, id: AbilityId) -> Option<&dyn Ability<W>> {
        self.abilities.get(&id).map(|a| &**a)
    }

    pub fn get_mut(&mut self, id: AbilityId) -> Option<&mut dyn Ability<W>> {
        self.abilities.get_mut(&id).map(|a| &mut **a)
    }

    /// Live abilities and their current buffer type, in attach order.
    pub fn live(&self) -> Vec<(AbilityId, BufferType)> {
        self.attach_order
            .iter()
            .filter_map(|id| self.abilities.get(id).map(|a| (*id, a.buffer_type())))
            .collect()
    }

    /// Ids in traversal order: initialized abilities by link order, then anything
    /// attached since, by attach order.
    pub fn ids(&self) -> Vec<AbilityId> {
        let mut ids = self.traversal.clone();
        let seen: BTreeSet<AbilityId> = ids.iter().copied().collect();
        ids.extend(self.attach_order.iter().filter(|id| !seen.contains(id)));
        ids
    }

    pub fn mediator(&self) -> Option<&Mediator> {
        self.mediator.as_ref()
    }

    /// Whether the ability's last setup hook failed.
    pub fn setup_failed(&self, id: AbilityId) -> bool {
        self.setup_failed.contains(&id)
    }

    /// Binds owner and mediator into each linked ability and runs its setup hook.
    ///
    /// Links are walked in order; each ability is bound immediately before its own
    /// setup. The directory handed out already lists every linked ability. A failing
    /// setup hook is logged and reported; the remaining abilities are still set up and
    /// the failed one stays attached.
    pub fn initialize(&mut self, links: &[AbilityLink], owner: W::Agent) -> InitReport {
        self.traversal = links
            .iter()
            .map(|link| link.id)
            .filter(|id| self.abilities.contains_key(id))
            .collect();
        self.setup_failed.clear();

        let entries = self
            .traversal
            .iter()
            .filter_map(|id| {
                let ability = self.abilities.get(id)?;
                Some(DirectoryEntry {
                    id: *id,
                    name: ability.name().to_owned(),
                    buffer_type: ability.buffer_type(),
                    type_id: (**ability).as_any().type_id(),
                    type_name: (**ability).concrete_type_name(),
                })
            })
            .collect();
        let mediator: Mediator = Arc::new(AbilityDirectory::new(entries));

        let mut report = InitReport::default();
        for id in &self.traversal {
            let Some(ability) = self.abilities.get_mut(id) else {
                continue;
            };
            ability.bind(owner, Arc::clone(&mediator));

            let ctx = SetupContext {
                owner,
                lookup: &*mediator,
            };
            match ability.setup(&ctx) {
                Ok(()) => report.initialized.push(*id),
                Err(error) => {
                    tracing::error!(
                        agent = %owner.label(),
                        %id,
                        ability = ability.name(),
                        %error,
                        "ability setup failed"
                    );
                    self.setup_failed.insert(*id);
                    report.failures.push(SetupFailure {
                        id: *id,
                        ability: ability.name().to_owned(),
                        error,
                    });
                }
            }
        }

        self.mediator = Some(mediator);
        report
    }

    /// Every ability of concrete type `T`, in traversal order.
    pub fn find_by_type<T: Any>(&self) -> Vec<(AbilityId, &T)> {
        self.ids()
            .into_iter()
            .filter_map(|id| {
                let ability = self.abilities.get(&id)?;
                (**ability)
                    .as_any()
                    .downcast_ref::<T>()
                    .map(|found| (id, found))
            })
            .collect()
    }

    /// First ability of type `T`; warns when more than one is attached.
    pub fn find_one<T: Any>(&self) -> Option<(AbilityId, &T)> {
        match self.find_unique::<T>() {
            Ok(found) => found,
            Err(ambiguous) => {
                tracing::warn!(%ambiguous, "ambiguous ability lookup, using the first match");
                self.find_by_type::<T>().into_iter().next()
            }
        }
    }

    /// Like [`AbilityRegistry::find_one`] but returns the ambiguity as an error.
    pub fn find_unique<T: Any>(&self) -> Result<Option<(AbilityId, &T)>, AmbiguousLookup> {
        let mut matches = self.find_by_type::<T>();
        if matches.len() > 1 {
            return Err(AmbiguousLookup {
                type_name: type_name::<T>(),
                matches: matches.len(),
            });
        }
        Ok(matches.pop())
    }

    pub fn find_mut<T: Any>(&mut self, id: AbilityId) -> Option<&mut T> {
        let ability = self.abilities.get_mut(&id)?;
        (**ability).as_any_mut().downcast_mut::<T>()
    }
}

impl<W> Default for AbilityRegistry<W>
where
    W: WorldMut + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}
