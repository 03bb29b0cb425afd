//! Shared helpers for the integration tests.

use dynsec_acl::{Entity, EntityStore};
use dynsec_core::{Error, LoadOptions, Result};
use dynsec_yaml::Event;
use std::collections::{BTreeMap, BTreeSet};

/// `(name, priority)` pairs, independent of handles and iteration order.
pub type Links = BTreeSet<(String, i64)>;

/// Display fields and links of one entity.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EntitySnapshot {
    pub text_name: Option<String>,
    pub text_description: Option<String>,
    /// Groups: rolelist. Roles and clients: grouplist.
    pub links: Links,
    /// Groups only: clientlist.
    pub client_links: Links,
}

/// Order-independent view of a whole store.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StoreSnapshot {
    pub groups: BTreeMap<String, EntitySnapshot>,
    pub roles: BTreeMap<String, EntitySnapshot>,
    pub clients: BTreeMap<String, EntitySnapshot>,
    pub anonymous_group: Option<String>,
}

fn display<E: Entity>(entity: &E) -> EntitySnapshot {
    EntitySnapshot {
        text_name: entity.text_name().map(str::to_string),
        text_description: entity.text_description().map(str::to_string),
        ..EntitySnapshot::default()
    }
}

/// Captures everything a round trip must preserve.
pub fn snapshot(store: &EntityStore) -> StoreSnapshot {
    let mut snap = StoreSnapshot::default();

    for (_, group) in store.groups() {
        let mut entry = display(group);
        for assoc in group.rolelist() {
            let role = store.role(assoc.target).unwrap();
            entry.links.insert((role.name().to_string(), assoc.priority));
        }
        for assoc in group.clientlist() {
            let client = store.client(assoc.target).unwrap();
            entry
                .client_links
                .insert((client.name().to_string(), assoc.priority));
        }
        snap.groups.insert(group.name().to_string(), entry);
    }

    for (_, role) in store.roles() {
        let mut entry = display(role);
        for assoc in role.grouplist() {
            let group = store.group(assoc.target).unwrap();
            entry.links.insert((group.name().to_string(), assoc.priority));
        }
        snap.roles.insert(role.name().to_string(), entry);
    }

    for (_, client) in store.clients() {
        let mut entry = display(client);
        for assoc in client.grouplist() {
            let group = store.group(assoc.target).unwrap();
            entry.links.insert((group.name().to_string(), assoc.priority));
        }
        snap.clients.insert(client.name().to_string(), entry);
    }

    snap.anonymous_group = store
        .anonymous_group()
        .and_then(|id| store.group(id))
        .map(|g| g.name().to_string());
    snap
}

/// Loads `yaml` into a fresh store, panicking on failure.
pub fn load(yaml: &str) -> EntityStore {
    let mut store = EntityStore::new();
    dynsec_yaml::load_str(&mut store, yaml, &LoadOptions::default())
        .expect("Document should load");
    store.check_links().expect("Links should be mirrored");
    store
}

/// Replays `events`, then fails with a stream error instead of ending.
pub fn failing_after(events: Vec<Event>) -> impl Iterator<Item = Result<Event>> {
    events
        .into_iter()
        .map(Ok)
        .chain(std::iter::once(Err(Error::stream("injected reader failure"))))
}
