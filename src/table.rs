//! The service descriptor table and the model that owns it.
use serde::Serialize;

use crate::{
    runlevel::InheritanceGraph,
    service::{Direction, ServiceDescriptor},
    settings::GlobalSettings,
};

/// Ordered collection of descriptors. Insertion order is declaration order.
///
/// Duplicate ids are accepted here; the integrity scanner reports them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ServiceTable {
    services: Vec<ServiceDescriptor>,
}

impl ServiceTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `service` and returns its stable index.
    pub fn push(&mut self, service: ServiceDescriptor) -> usize {
        self.services.push(service);
        self.services.len() - 1
    }

    pub fn get(&self, index: usize) -> Option<&ServiceDescriptor> {
        self.services.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut ServiceDescriptor> {
        self.services.get_mut(index)
    }

    /// First descriptor with the given id.
    pub fn lookup(&self, id: &str) -> Option<&ServiceDescriptor> {
        self.services.iter().find(|service| service.id == id)
    }

    pub fn lookup_mut(&mut self, id: &str) -> Option<&mut ServiceDescriptor> {
        self.services.iter_mut().find(|service| service.id == id)
    }

    /// Largest nonzero priority in `direction`, or zero if none.
    pub fn highest_priority(&self, direction: Direction) -> u32 {
        self.services
            .iter()
            .map(|service| service.priority(direction))
            .max()
            .unwrap_or(0)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ServiceDescriptor> {
        self.services.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, ServiceDescriptor> {
        self.services.iter_mut()
    }

    pub fn as_slice(&self) -> &[ServiceDescriptor] {
        &self.services
    }

    pub(crate) fn as_mut_slice(&mut self) -> &mut [ServiceDescriptor] {
        &mut self.services
    }

    pub fn len(&self) -> usize {
        self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }
}

impl<'a> IntoIterator for &'a ServiceTable {
    type Item = &'a ServiceDescriptor;
    type IntoIter = std::slice::Iter<'a, ServiceDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.services.iter()
    }
}

/// A complete configuration: descriptors, inheritance edges and global settings.
///
/// Built by a full parse, mutated only by the parse pipeline and by the executor's
/// runtime fields, and swapped as a unit on reload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Model {
    pub services: ServiceTable,
    pub inheritance: InheritanceGraph,
    pub settings: GlobalSettings,
}

impl Model {
    pub fn lookup(&self, id: &str) -> Option<&ServiceDescriptor> {
        self.services.lookup(id)
    }

    pub fn lookup_mut(&mut self, id: &str) -> Option<&mut ServiceDescriptor> {
        self.services.lookup_mut(id)
    }

    pub fn highest_priority(&self, direction: Direction) -> u32 {
        self.services.highest_priority(direction)
    }

    /// Active runlevel name.
    pub fn runlevel(&self) -> &str {
        &self.settings.runlevel
    }

    /// Effective membership of `service` in `runlevel`, counting one inheritance hop.
    pub fn is_member(&self, service: &ServiceDescriptor, runlevel: &str) -> bool {
        self.inheritance.is_member(service, runlevel)
    }

    /// Membership as seen by the start sequence: halt-only services never start.
    fn is_member_in(
        &self,
        service: &ServiceDescriptor,
        runlevel: &str,
        direction: Direction,
    ) -> bool {
        if direction == Direction::Start && service.options.halt_only {
            return false;
        }
        self.is_member(service, runlevel)
    }

    /// A runlevel is valid when at least one non-halt-only service is a member.
    pub fn is_valid_runlevel(&self, runlevel: &str) -> bool {
        self.services
            .iter()
            .any(|service| self.is_member_in(service, runlevel, Direction::Start))
    }

    /// First descriptor whose `direction` priority equals `value` and, when a
    /// runlevel is given, that is a member of it.
    pub fn find_by_priority(
        &self,
        runlevel: Option<&str>,
        direction: Direction,
        value: u32,
    ) -> Option<&ServiceDescriptor> {
        self.services.iter().find(|service| {
            service.priority(direction) == value
                && runlevel.is_none_or(|rl| self.is_member_in(service, rl, direction))
        })
    }

    /// Members of `runlevel` with a nonzero priority, in ascending `direction` order.
    ///
    /// Equivalent to calling [`Model::find_by_priority`] for every value up to
    /// [`Model::highest_priority`] once priorities are unique.
    pub fn ordered(&self, runlevel: &str, direction: Direction) -> Vec<&ServiceDescriptor> {
        let mut members: Vec<&ServiceDescriptor> = self
            .services
            .iter()
            .filter(|service| {
                service.priority(direction) != 0
                    && self.is_member_in(service, runlevel, direction)
            })
            .collect();
        members.sort_by_key(|service| service.priority(direction));
        members.dedup_by_key(|service| service.priority(direction));
        members
    }

    /// Records executor outcomes. Returns false when `id` is unknown.
    pub fn set_runtime(&mut self, id: &str, started: bool, process_id: u32) -> bool {
        match self.lookup_mut(id) {
            Some(service) => {
                service.started = started;
                service.process_id = process_id;
                true
            }
            None => false,
        }
    }
}
