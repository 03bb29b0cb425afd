//! Ordered, de-duplicated association lists.
//!
//! An [`AssociationList`] maps a target handle to a priority while keeping
//! insertion order. It never owns what it points at: targets are plain
//! handles (or, while a record is being staged, any hashable key), so
//! dropping or clearing a list can never release an entity.

use std::collections::HashMap;
use std::hash::Hash;

/// Priority used when a member entry does not name one.
pub const DEFAULT_PRIORITY: i64 = -1;

/// A single `(target, priority)` link.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Association<K> {
    /// The referenced entity.
    pub target: K,
    /// Opaque ordering value for the authorization evaluator.
    pub priority: i64,
}

/// Insertion-ordered list of associations, keyed by target.
#[derive(Clone, Debug)]
pub struct AssociationList<K> {
    entries: Vec<Association<K>>,
    positions: HashMap<K, usize>,
}

impl<K> Default for AssociationList<K> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            positions: HashMap::new(),
        }
    }
}

impl<K: Clone + Eq + Hash> AssociationList<K> {
    /// Creates an empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `target`, or updates its priority in place if already present.
    ///
    /// Returns the previous priority when the target was already listed.
    pub fn add(&mut self, target: K, priority: i64) -> Option<i64> {
        if let Some(&pos) = self.positions.get(&target) {
            let entry = &mut self.entries[pos];
            return Some(std::mem::replace(&mut entry.priority, priority));
        }
        self.positions.insert(target.clone(), self.entries.len());
        self.entries.push(Association { target, priority });
        None
    }

    /// Removes `target`, returning its priority if it was listed.
    pub fn remove(&mut self, target: &K) -> Option<i64> {
        let pos = self.positions.remove(target)?;
        let removed = self.entries.remove(pos);
        for entry in &self.entries[pos..] {
            if let Some(p) = self.positions.get_mut(&entry.target) {
                *p -= 1;
            }
        }
        Some(removed.priority)
    }

    /// Priority stored for `target`, if listed.
    pub fn priority(&self, target: &K) -> Option<i64> {
        self.positions.get(target).map(|&pos| self.entries[pos].priority)
    }

    /// Whether `target` is listed.
    pub fn contains(&self, target: &K) -> bool {
        self.positions.contains_key(target)
    }

    /// Drops every association. Targets are untouched.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.positions.clear();
    }
}

impl<K> AssociationList<K> {
    /// Iterates associations in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, Association<K>> {
        self.entries.iter()
    }

    /// Number of associations.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the list is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'a, K> IntoIterator for &'a AssociationList<K> {
    type Item = &'a Association<K>;
    type IntoIter = std::slice::Iter<'a, Association<K>>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl<K> IntoIterator for AssociationList<K> {
    type Item = Association<K>;
    type IntoIter = std::vec::IntoIter<Association<K>>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<K: Clone + Eq + Hash> FromIterator<(K, i64)> for AssociationList<K> {
    fn from_iter<I: IntoIterator<Item = (K, i64)>>(iter: I) -> Self {
        let mut list = Self::new();
        for (target, priority) in iter {
            list.add(target, priority);
        }
        list
    }
}
