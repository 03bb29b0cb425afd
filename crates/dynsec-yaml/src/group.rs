//! Group records: the `groups` section and the anonymous group.
//!
//! A record is parsed by [`RecordLoader`] into a [`StagedGroup`] while the
//! store is only borrowed shared. Nothing is created or linked until
//! [`StagedGroup::commit`], so a record that fails halfway leaves the store
//! exactly as it was; dropping the staged value releases every temporary.

use crate::event::{
    begin_sequence, emit_optional_field, emit_string_field, next_key, read_optional_string,
    read_string, require_event, skip_value, Event, EventReader, EventWriter,
};
use crate::members::{emit_members, record_error, Member, Staged, StagedMembers};
use dynsec_acl::{
    AssociationList, Client, ClientId, Entity, EntityKind, EntityStore, Group, GroupId, Role,
    RoleId,
};
use dynsec_core::{Error, Result};

/// Top-level key naming the anonymous group.
pub const ANONYMOUS_GROUP_KEY: &str = "anonymousGroup";

/// Keys recognised inside a group record.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum GroupKey {
    GroupName,
    TextName,
    TextDescription,
    Roles,
    Clients,
    Unknown,
}

impl GroupKey {
    fn parse(key: &str) -> Self {
        const KEYS: [(&str, GroupKey); 5] = [
            ("groupname", GroupKey::GroupName),
            ("textname", GroupKey::TextName),
            ("textdescription", GroupKey::TextDescription),
            ("roles", GroupKey::Roles),
            ("clients", GroupKey::Clients),
        ];
        KEYS.iter()
            .find(|(name, _)| key.eq_ignore_ascii_case(name))
            .map_or(GroupKey::Unknown, |&(_, k)| k)
    }
}

// ============================================================================
// Loading
// ============================================================================

/// Parses one group record without touching the store.
#[derive(Debug)]
pub struct RecordLoader<'s> {
    store: &'s EntityStore,
    group: Option<Staged<GroupId>>,
    text_name: Option<String>,
    text_description: Option<String>,
    roles: StagedMembers<Role>,
    clients: StagedMembers<Client>,
}

impl<'s> RecordLoader<'s> {
    /// A loader resolving names against `store`.
    pub fn new(store: &'s EntityStore) -> Self {
        Self {
            store,
            group: None,
            text_name: None,
            text_description: None,
            roles: StagedMembers::default(),
            clients: StagedMembers::default(),
        }
    }

    /// Reads the record body up to and including its `MappingEnd`.
    ///
    /// The opening `MappingStart` must already have been consumed.
    pub fn load<R: EventReader + ?Sized>(mut self, reader: &mut R) -> Result<StagedGroup> {
        while let Some(key) = next_key(reader)? {
            self.on_key(&key, reader)?;
        }
        self.finish()
    }

    fn on_key<R: EventReader + ?Sized>(&mut self, key: &str, reader: &mut R) -> Result<()> {
        match GroupKey::parse(key) {
            GroupKey::GroupName => {
                let name = read_string(reader, "groupname")?;
                if name.is_empty() {
                    return Err(Error::invalid_record("empty 'groupname'"));
                }
                self.group = Some(self.stage_group(name)?);
            }
            GroupKey::TextName => {
                self.text_name = read_optional_string(reader, "textname")?;
            }
            GroupKey::TextDescription => {
                self.text_description = read_optional_string(reader, "textdescription")?;
            }
            GroupKey::Roles => self.roles.load(reader, self.store, "roles")?,
            GroupKey::Clients => self.clients.load(reader, self.store, "clients")?,
            GroupKey::Unknown => {
                log::error!("Unknown key '{key}' in group record, skipping");
                skip_value(reader)?;
            }
        }
        Ok(())
    }

    fn stage_group(&self, name: String) -> Result<Staged<GroupId>> {
        match self.store.find_group(&name) {
            Some(id) => Ok(Staged::Existing(id)),
            None => {
                self.store
                    .check_room(EntityKind::Group, 1)
                    .map_err(|e| record_error(EntityKind::Group, e))?;
                Ok(Staged::New(name))
            }
        }
    }

    fn finish(self) -> Result<StagedGroup> {
        let group = self
            .group
            .ok_or_else(|| Error::invalid_record("group record is missing 'groupname'"))?;
        Ok(StagedGroup {
            group,
            text_name: self.text_name,
            text_description: self.text_description,
            roles: self.roles.into_list(),
            clients: self.clients.into_list(),
        })
    }
}

/// A fully parsed group record, ready to commit.
#[derive(Debug)]
pub struct StagedGroup {
    group: Staged<GroupId>,
    text_name: Option<String>,
    text_description: Option<String>,
    roles: AssociationList<Staged<RoleId>>,
    clients: AssociationList<Staged<ClientId>>,
}

impl StagedGroup {
    /// Whether the group itself will be created on commit.
    pub fn is_new(&self) -> bool {
        self.group.is_new()
    }

    /// Applies the record: creates staged entities, links every member on
    /// both sides and replaces the group's display fields.
    pub fn commit(self, store: &mut EntityStore) -> Result<GroupId> {
        let Self {
            group,
            text_name,
            text_description,
            roles,
            clients,
        } = self;

        let gid = match group {
            Staged::Existing(id) => {
                let stored = store
                    .group_mut(id)
                    .ok_or_else(|| Error::inconsistent(format!("staged {id} vanished")))?;
                stored.set_text(text_name, text_description);
                id
            }
            Staged::New(name) => {
                let mut built = Group::new(name);
                built.set_text(text_name, text_description);
                store.insert_group(built)?
            }
        };

        let (role_count, client_count) = (roles.len(), clients.len());
        for assoc in clients {
            let client = Client::resolve(store, assoc.target)?;
            store.link_group_client(gid, client, assoc.priority)?;
        }
        for assoc in roles {
            let role = Role::resolve(store, assoc.target)?;
            store.link_group_role(gid, role, assoc.priority)?;
        }

        log::debug!(
            "Committed group '{}' ({role_count} roles, {client_count} clients)",
            store.group(gid).map_or("", Entity::name)
        );
        Ok(gid)
    }
}

/// Loads a `groups` section, committing each record as it completes.
///
/// The reader is positioned just after the `groups` key. The first failing
/// record aborts the section; records committed before it stay.
pub fn load_groups<R: EventReader + ?Sized>(
    reader: &mut R,
    store: &mut EntityStore,
) -> Result<usize> {
    if !begin_sequence(reader, "groups")? {
        return Ok(0);
    }
    let mut count = 0;
    loop {
        match require_event(reader)? {
            Event::SequenceEnd => return Ok(count),
            Event::MappingStart => {
                let staged = RecordLoader::new(store).load(reader)?;
                staged.commit(store)?;
                count += 1;
            }
            other => {
                return Err(Error::invalid_record(format!(
                    "expected a group record, found {other}"
                )));
            }
        }
    }
}

// ============================================================================
// Saving
// ============================================================================

/// Emits the `groups` section and, if configured, the anonymous group.
pub fn save_groups<W: EventWriter + ?Sized>(store: &EntityStore, writer: &mut W) -> Result<()> {
    writer.emit(Event::str("groups"))?;
    writer.emit(Event::SequenceStart)?;
    for (_, group) in store.groups() {
        writer.emit(Event::MappingStart)?;
        emit_string_field(writer, "groupname", group.name())?;
        emit_optional_field(writer, "textname", group.text_name())?;
        emit_optional_field(writer, "textdescription", group.text_description())?;
        emit_members::<Role, _>(writer, store, "roles", group.rolelist())?;
        emit_members::<Client, _>(writer, store, "clients", group.clientlist())?;
        writer.emit(Event::MappingEnd)?;
    }
    writer.emit(Event::SequenceEnd)?;

    if let Some(group) = store.anonymous_group().and_then(|id| store.group(id)) {
        emit_string_field(writer, ANONYMOUS_GROUP_KEY, group.name())?;
    }
    Ok(())
}
