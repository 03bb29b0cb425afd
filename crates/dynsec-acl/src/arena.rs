//! Per-kind entity storage with a name index.

use crate::entity::{Entity, EntityId};
use dynsec_core::{Error, Result};
use std::collections::HashMap;

/// Slots one kind can ever hand out; handles are `u32`.
const MAX_SLOTS: usize = u32::MAX as usize;

/// Slot storage for one entity kind.
///
/// Slots are never reused, so a handle to a removed entity resolves to
/// `None` instead of aliasing a newer one. The same rule bounds the total
/// number of entities a kind can ever create by the handle range, whatever
/// the configured limit.
#[derive(Clone, Debug)]
pub(crate) struct Arena<T: Entity> {
    slots: Vec<Option<T>>,
    by_name: HashMap<String, T::Id>,
    limit: usize,
    max_slots: usize,
}

impl<T: Entity> Arena<T> {
    pub(crate) fn new(limit: usize) -> Self {
        Self {
            slots: Vec::new(),
            by_name: HashMap::new(),
            limit,
            max_slots: MAX_SLOTS,
        }
    }

    pub(crate) fn find(&self, name: &str) -> Option<T::Id> {
        self.by_name.get(name).copied()
    }

    pub(crate) fn get(&self, id: T::Id) -> Option<&T> {
        self.slots.get(id.slot()).and_then(Option::as_ref)
    }

    pub(crate) fn get_mut(&mut self, id: T::Id) -> Option<&mut T> {
        self.slots.get_mut(id.slot()).and_then(Option::as_mut)
    }

    pub(crate) fn len(&self) -> usize {
        self.by_name.len()
    }

    /// Fails with `OutOfMemory` unless `extra` more entities fit.
    pub(crate) fn check_room(&self, extra: usize) -> Result<()> {
        let over_limit = self.len().saturating_add(extra) > self.limit;
        let out_of_slots = self.slots.len().saturating_add(extra) > self.max_slots;
        if over_limit || out_of_slots {
            return Err(self.out_of_memory());
        }
        Ok(())
    }

    fn out_of_memory(&self) -> Error {
        Error::OutOfMemory {
            kind: T::KIND.as_str(),
            limit: self.limit.min(self.max_slots),
        }
    }

    pub(crate) fn find_or_create(&mut self, name: &str) -> Result<T::Id> {
        if let Some(id) = self.find(name) {
            return Ok(id);
        }
        self.check_room(1)?;
        let id = T::Id::from_slot(self.slots.len()).ok_or_else(|| self.out_of_memory())?;
        self.slots.push(Some(T::with_name(name.to_string())));
        self.by_name.insert(name.to_string(), id);
        log::trace!("Created {} '{}'", T::KIND, name);
        Ok(id)
    }

    pub(crate) fn remove(&mut self, id: T::Id) -> Option<T> {
        let entity = self.slots.get_mut(id.slot())?.take()?;
        self.by_name.remove(entity.name());
        Some(entity)
    }

    /// Live entities in creation order.
    pub(crate) fn iter(&self) -> impl Iterator<Item = (T::Id, &T)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(slot, entity)| Some((T::Id::from_slot(slot)?, entity.as_ref()?)))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::entity::{Client, GroupId};
    use crate::Group;

    #[test]
    fn test_find_or_create_is_idempotent() {
        let mut arena: Arena<Group> = Arena::new(10);
        let a = arena.find_or_create("admins").unwrap();
        let b = arena.find_or_create("admins").unwrap();
        assert_eq!(a, b);
        assert_eq!(arena.len(), 1);
    }

    #[test]
    fn test_limit_enforced() {
        let mut arena: Arena<Client> = Arena::new(1);
        arena.find_or_create("alice").unwrap();
        let err = arena.find_or_create("bob").unwrap_err();
        assert!(matches!(err, Error::OutOfMemory { kind: "client", limit: 1 }));

        // Existing names still resolve when full.
        assert!(arena.find_or_create("alice").is_ok());
    }

    #[test]
    fn test_slot_range_bounds_creation() {
        let mut arena: Arena<Client> = Arena::new(usize::MAX);
        arena.max_slots = 2;
        let a = arena.find_or_create("a").unwrap();
        arena.find_or_create("b").unwrap();
        arena.remove(a).unwrap();

        // One live entity, but both slots have been handed out.
        assert_eq!(arena.len(), 1);
        let err = arena.find_or_create("c").unwrap_err();
        assert!(matches!(err, Error::OutOfMemory { kind: "client", limit: 2 }));
        assert!(arena.check_room(1).is_err());
        assert!(arena.find("c").is_none());
    }

    #[test]
    fn test_removed_slot_not_reused() {
        let mut arena: Arena<Group> = Arena::new(10);
        let old = arena.find_or_create("a").unwrap();
        arena.remove(old).unwrap();
        let new = arena.find_or_create("a").unwrap();

        assert_ne!(old, new);
        assert!(arena.get(old).is_none());
        assert_eq!(arena.get(new).unwrap().name(), "a");
    }

    #[test]
    fn test_iter_creation_order() {
        let mut arena: Arena<Group> = Arena::new(10);
        for name in ["c", "a", "b"] {
            arena.find_or_create(name).unwrap();
        }
        arena.remove(GroupId::from_slot(1).unwrap());

        let names: Vec<_> = arena.iter().map(|(_, g)| g.name().to_string()).collect();
        assert_eq!(names, vec!["c", "b"]);
    }
}
