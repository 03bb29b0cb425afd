//! The entity store: every group, role and client, plus their links.
//!
//! All link mutation goes through the store so that a group's rolelist and
//! clientlist always mirror the grouplists of the roles and clients they
//! name, with identical priorities.

use crate::arena::Arena;
use crate::entity::{Client, ClientId, Entity, EntityKind, Group, GroupId, Role, RoleId};
use dynsec_core::{Error, Limits, Result};

/// Owner of all entities and the only place links are changed.
#[derive(Clone, Debug)]
pub struct EntityStore {
    groups: Arena<Group>,
    roles: Arena<Role>,
    clients: Arena<Client>,
    anonymous_group: Option<GroupId>,
}

impl Default for EntityStore {
    fn default() -> Self {
        Self::new()
    }
}

impl EntityStore {
    /// An empty store with default limits.
    pub fn new() -> Self {
        Self::with_limits(Limits::default())
    }

    /// An empty store with explicit capacity limits.
    pub fn with_limits(limits: Limits) -> Self {
        Self {
            groups: Arena::new(limits.max_groups),
            roles: Arena::new(limits.max_roles),
            clients: Arena::new(limits.max_clients),
            anonymous_group: None,
        }
    }

    // ========================================================================
    // Lookup
    // ========================================================================

    /// Finds a group by name.
    pub fn find_group(&self, name: &str) -> Option<GroupId> {
        self.groups.find(name)
    }

    /// Finds a role by name.
    pub fn find_role(&self, name: &str) -> Option<RoleId> {
        self.roles.find(name)
    }

    /// Finds a client by name.
    pub fn find_client(&self, name: &str) -> Option<ClientId> {
        self.clients.find(name)
    }

    /// Gets a group by handle.
    pub fn group(&self, id: GroupId) -> Option<&Group> {
        self.groups.get(id)
    }

    /// Gets a role by handle.
    pub fn role(&self, id: RoleId) -> Option<&Role> {
        self.roles.get(id)
    }

    /// Gets a client by handle.
    pub fn client(&self, id: ClientId) -> Option<&Client> {
        self.clients.get(id)
    }

    /// Mutable access to a group's display fields.
    pub fn group_mut(&mut self, id: GroupId) -> Option<&mut Group> {
        self.groups.get_mut(id)
    }

    /// Mutable access to a role's display fields.
    pub fn role_mut(&mut self, id: RoleId) -> Option<&mut Role> {
        self.roles.get_mut(id)
    }

    /// Mutable access to a client's display fields.
    pub fn client_mut(&mut self, id: ClientId) -> Option<&mut Client> {
        self.clients.get_mut(id)
    }

    /// Groups in creation order.
    pub fn groups(&self) -> impl Iterator<Item = (GroupId, &Group)> {
        self.groups.iter()
    }

    /// Roles in creation order.
    pub fn roles(&self) -> impl Iterator<Item = (RoleId, &Role)> {
        self.roles.iter()
    }

    /// Clients in creation order.
    pub fn clients(&self) -> impl Iterator<Item = (ClientId, &Client)> {
        self.clients.iter()
    }

    /// Number of groups.
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Number of roles.
    pub fn role_count(&self) -> usize {
        self.roles.len()
    }

    /// Number of clients.
    pub fn client_count(&self) -> usize {
        self.clients.len()
    }

    // ========================================================================
    // Creation
    // ========================================================================

    /// Returns the group named `name`, creating it if absent.
    pub fn find_or_create_group(&mut self, name: &str) -> Result<GroupId> {
        self.groups.find_or_create(name)
    }

    /// Returns the role named `name`, creating it if absent.
    pub fn find_or_create_role(&mut self, name: &str) -> Result<RoleId> {
        self.roles.find_or_create(name)
    }

    /// Returns the client named `name`, creating it if absent.
    pub fn find_or_create_client(&mut self, name: &str) -> Result<ClientId> {
        self.clients.find_or_create(name)
    }

    /// Fails with `OutOfMemory` unless `extra` new entities of `kind` fit.
    pub fn check_room(&self, kind: EntityKind, extra: usize) -> Result<()> {
        match kind {
            EntityKind::Group => self.groups.check_room(extra),
            EntityKind::Role => self.roles.check_room(extra),
            EntityKind::Client => self.clients.check_room(extra),
        }
    }

    /// Registers a built group.
    ///
    /// An existing group with the same name keeps its handle and links; only
    /// its display fields are replaced. Links held by `group` are ignored,
    /// since a group built outside the store cannot carry any.
    pub fn insert_group(&mut self, group: Group) -> Result<GroupId> {
        let id = self.groups.find_or_create(group.name())?;
        if let Some(stored) = self.groups.get_mut(id) {
            let Group {
                text_name,
                text_description,
                ..
            } = group;
            stored.set_text(text_name, text_description);
        }
        Ok(id)
    }

    // ========================================================================
    // Links
    // ========================================================================

    /// Links `group` and `role` in both directions with `priority`.
    ///
    /// Re-linking an existing pair updates the priority on both sides.
    pub fn link_group_role(&mut self, group: GroupId, role: RoleId, priority: i64) -> Result<()> {
        self.require_role(role)?;
        self.require_group(group)?.rolelist.add(role, priority);
        if let Some(r) = self.roles.get_mut(role) {
            r.grouplist.add(group, priority);
        }
        Ok(())
    }

    /// Links `group` and `client` in both directions with `priority`.
    pub fn link_group_client(
        &mut self,
        group: GroupId,
        client: ClientId,
        priority: i64,
    ) -> Result<()> {
        self.require_client(client)?;
        self.require_group(group)?.clientlist.add(client, priority);
        if let Some(c) = self.clients.get_mut(client) {
            c.grouplist.add(group, priority);
        }
        Ok(())
    }

    /// Removes the `group`/`role` link on both sides.
    ///
    /// Returns the priority the link had, or `None` if it did not exist.
    pub fn unlink_group_role(&mut self, group: GroupId, role: RoleId) -> Option<i64> {
        let priority = self.groups.get_mut(group)?.rolelist.remove(&role);
        if let Some(r) = self.roles.get_mut(role) {
            r.grouplist.remove(&group);
        }
        priority
    }

    /// Removes the `group`/`client` link on both sides.
    pub fn unlink_group_client(&mut self, group: GroupId, client: ClientId) -> Option<i64> {
        let priority = self.groups.get_mut(group)?.clientlist.remove(&client);
        if let Some(c) = self.clients.get_mut(client) {
            c.grouplist.remove(&group);
        }
        priority
    }

    // ========================================================================
    // Anonymous group
    // ========================================================================

    /// The group applied to unauthenticated clients, if configured.
    pub fn anonymous_group(&self) -> Option<GroupId> {
        self.anonymous_group
            .filter(|&id| self.groups.get(id).is_some())
    }

    /// Designates (or clears) the anonymous group.
    pub fn set_anonymous_group(&mut self, group: Option<GroupId>) -> Result<()> {
        if let Some(id) = group {
            self.require_group(id)?;
        }
        self.anonymous_group = group;
        Ok(())
    }

    // ========================================================================
    // Removal
    // ========================================================================

    /// Deletes a group, unlinking it from every role and client first.
    pub fn remove_group(&mut self, id: GroupId) -> Option<Group> {
        let mut group = self.groups.remove(id)?;
        for assoc in &group.rolelist {
            if let Some(role) = self.roles.get_mut(assoc.target) {
                role.grouplist.remove(&id);
            }
        }
        for assoc in &group.clientlist {
            if let Some(client) = self.clients.get_mut(assoc.target) {
                client.grouplist.remove(&id);
            }
        }
        group.rolelist.clear();
        group.clientlist.clear();
        if self.anonymous_group == Some(id) {
            self.anonymous_group = None;
        }
        log::debug!("Removed group '{}'", group.name());
        Some(group)
    }

    /// Deletes a role, unlinking it from every group first.
    pub fn remove_role(&mut self, id: RoleId) -> Option<Role> {
        let mut role = self.roles.remove(id)?;
        for assoc in &role.grouplist {
            if let Some(group) = self.groups.get_mut(assoc.target) {
                group.rolelist.remove(&id);
            }
        }
        role.grouplist.clear();
        log::debug!("Removed role '{}'", role.name());
        Some(role)
    }

    /// Deletes a client, unlinking it from every group first.
    pub fn remove_client(&mut self, id: ClientId) -> Option<Client> {
        let mut client = self.clients.remove(id)?;
        for assoc in &client.grouplist {
            if let Some(group) = self.groups.get_mut(assoc.target) {
                group.clientlist.remove(&id);
            }
        }
        client.grouplist.clear();
        log::debug!("Removed client '{}'", client.name());
        Some(client)
    }

    // ========================================================================
    // Invariant check
    // ========================================================================

    /// Verifies that every link is mirrored with the same priority.
    ///
    /// Reports the first violation found.
    pub fn check_links(&self) -> Result<()> {
        for (gid, group) in self.groups() {
            for assoc in group.rolelist() {
                let role = self.roles.get(assoc.target).ok_or_else(|| {
                    Error::inconsistent(format!(
                        "group '{}' lists missing {}",
                        group.name(),
                        assoc.target
                    ))
                })?;
                if role.grouplist.priority(&gid) != Some(assoc.priority) {
                    return Err(Error::inconsistent(format!(
                        "group '{}' -> role '{}' ({}) is not mirrored",
                        group.name(),
                        role.name(),
                        assoc.priority
                    )));
                }
            }
            for assoc in group.clientlist() {
                let client = self.clients.get(assoc.target).ok_or_else(|| {
                    Error::inconsistent(format!(
                        "group '{}' lists missing {}",
                        group.name(),
                        assoc.target
                    ))
                })?;
                if client.grouplist.priority(&gid) != Some(assoc.priority) {
                    return Err(Error::inconsistent(format!(
                        "group '{}' -> client '{}' ({}) is not mirrored",
                        group.name(),
                        client.name(),
                        assoc.priority
                    )));
                }
            }
        }

        for (rid, role) in self.roles() {
            for assoc in role.grouplist() {
                let mirrored = self
                    .groups
                    .get(assoc.target)
                    .and_then(|g| g.rolelist.priority(&rid));
                if mirrored != Some(assoc.priority) {
                    return Err(Error::inconsistent(format!(
                        "role '{}' -> {} ({}) is not mirrored",
                        role.name(),
                        assoc.target,
                        assoc.priority
                    )));
                }
            }
        }

        for (cid, client) in self.clients() {
            for assoc in client.grouplist() {
                let mirrored = self
                    .groups
                    .get(assoc.target)
                    .and_then(|g| g.clientlist.priority(&cid));
                if mirrored != Some(assoc.priority) {
                    return Err(Error::inconsistent(format!(
                        "client '{}' -> {} ({}) is not mirrored",
                        client.name(),
                        assoc.target,
                        assoc.priority
                    )));
                }
            }
        }

        Ok(())
    }

    // ------------------------------------------------------------------------
    // helpers
    // ------------------------------------------------------------------------

    fn require_group(&mut self, id: GroupId) -> Result<&mut Group> {
        self.groups
            .get_mut(id)
            .ok_or_else(|| Error::not_found("group", id.to_string()))
    }

    fn require_role(&self, id: RoleId) -> Result<&Role> {
        self.roles
            .get(id)
            .ok_or_else(|| Error::not_found("role", id.to_string()))
    }

    fn require_client(&self, id: ClientId) -> Result<&Client> {
        self.clients
            .get(id)
            .ok_or_else(|| Error::not_found("client", id.to_string()))
    }
}

// ============================================================================
// Tests
// ============================================================================
