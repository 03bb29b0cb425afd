//! Role and client member lists inside a group record.
//!
//! ```yaml
//! roles:
//!   - rolename: reader
//!     priority: 3
//! clients:
//!   - username: alice
//!     priority: 10
//! ```
//!
//! Loading builds a temporary [`AssociationList`] of [`Staged`] members: a
//! member that already exists is held by handle, a new one by name. Nothing
//! touches the store until the enclosing record commits.

use crate::event::{
    begin_sequence, emit_integer_field, emit_string_field, next_key, read_integer,
    read_string, require_event, skip_value, Event, EventReader, EventWriter,
};
use dynsec_acl::{
    AssociationList, Client, ClientId, Entity, EntityKind, EntityStore, Role, RoleId,
    DEFAULT_PRIORITY,
};
use dynsec_core::{Error, Result};

/// An entity referenced by a record that is not committed yet.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Staged<Id> {
    /// Already in the store.
    Existing(Id),
    /// Will be created on commit.
    New(String),
}

impl<Id> Staged<Id> {
    /// Whether committing this reference creates an entity.
    pub fn is_new(&self) -> bool {
        matches!(self, Staged::New(_))
    }
}

/// An entity kind that can be listed as a group member.
pub trait Member: Entity {
    /// Key naming the member inside a list entry.
    const NAME_KEY: &'static str;

    /// Looks up an existing member.
    fn find(store: &EntityStore, name: &str) -> Option<Self::Id>;

    /// Resolves a staged member, creating it if needed.
    fn resolve(store: &mut EntityStore, staged: Staged<Self::Id>) -> Result<Self::Id>;

    /// Name of an existing member.
    fn name_of(store: &EntityStore, id: Self::Id) -> Option<&str>;

    /// Mutable access to an existing member.
    fn get_mut(store: &mut EntityStore, id: Self::Id) -> Option<&mut Self>;
}

impl Member for Role {
    const NAME_KEY: &'static str = "rolename";

    fn find(store: &EntityStore, name: &str) -> Option<RoleId> {
        store.find_role(name)
    }

    fn resolve(store: &mut EntityStore, staged: Staged<RoleId>) -> Result<RoleId> {
        match staged {
            Staged::Existing(id) => Ok(id),
            Staged::New(name) => store.find_or_create_role(&name),
        }
    }

    fn name_of(store: &EntityStore, id: RoleId) -> Option<&str> {
        store.role(id).map(Entity::name)
    }

    fn get_mut(store: &mut EntityStore, id: RoleId) -> Option<&mut Role> {
        store.role_mut(id)
    }
}

impl Member for Client {
    const NAME_KEY: &'static str = "username";

    fn find(store: &EntityStore, name: &str) -> Option<ClientId> {
        store.find_client(name)
    }

    fn resolve(store: &mut EntityStore, staged: Staged<ClientId>) -> Result<ClientId> {
        match staged {
            Staged::Existing(id) => Ok(id),
            Staged::New(name) => store.find_or_create_client(&name),
        }
    }

    fn name_of(store: &EntityStore, id: ClientId) -> Option<&str> {
        store.client(id).map(Entity::name)
    }

    fn get_mut(store: &mut EntityStore, id: ClientId) -> Option<&mut Client> {
        store.client_mut(id)
    }
}

/// Temporary member list built while a record is parsed.
#[derive(Debug)]
pub struct StagedMembers<M: Member> {
    list: AssociationList<Staged<M::Id>>,
    new_count: usize,
}

impl<M: Member> Default for StagedMembers<M> {
    fn default() -> Self {
        Self {
            list: AssociationList::new(),
            new_count: 0,
        }
    }
}

impl<M: Member> StagedMembers<M> {
    /// Number of distinct members staged.
    pub fn len(&self) -> usize {
        self.list.len()
    }

    /// Whether nothing is staged.
    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    /// Number of staged members that do not exist yet.
    pub fn new_count(&self) -> usize {
        self.new_count
    }

    /// Stages `name` with `priority`, upserting a repeated member.
    ///
    /// A member that would have to be created is checked against the store's
    /// capacity right away.
    pub fn stage(&mut self, store: &EntityStore, name: String, priority: i64) -> Result<()> {
        let staged = match M::find(store, &name) {
            Some(id) => Staged::Existing(id),
            None => Staged::New(name),
        };
        if staged.is_new() && !self.list.contains(&staged) {
            store.check_room(M::KIND, self.new_count + 1)?;
            self.new_count += 1;
        }
        self.list.add(staged, priority);
        Ok(())
    }

    /// Hands the staged list over for commit.
    pub fn into_list(self) -> AssociationList<Staged<M::Id>> {
        self.list
    }

    /// Reads a member sequence into this list.
    ///
    /// The reader is positioned just after the `roles` / `clients` key.
    pub fn load<R: EventReader + ?Sized>(
        &mut self,
        reader: &mut R,
        store: &EntityStore,
        list_key: &str,
    ) -> Result<()> {
        if !begin_sequence(reader, list_key)? {
            return Ok(());
        }
        loop {
            match require_event(reader)? {
                Event::SequenceEnd => return Ok(()),
                Event::MappingStart => self.load_entry(reader, store, list_key)?,
                other => {
                    return Err(Error::invalid_record(format!(
                        "expected a mapping entry in '{list_key}', found {other}"
                    )));
                }
            }
        }
    }

    fn load_entry<R: EventReader + ?Sized>(
        &mut self,
        reader: &mut R,
        store: &EntityStore,
        list_key: &str,
    ) -> Result<()> {
        let mut name = None;
        let mut priority = DEFAULT_PRIORITY;

        while let Some(key) = next_key(reader)? {
            if key.eq_ignore_ascii_case(M::NAME_KEY) {
                name = Some(read_string(reader, M::NAME_KEY)?);
            } else if key.eq_ignore_ascii_case("priority") {
                priority = read_integer(reader, "priority")?;
            } else {
                log::error!("Unexpected key for {} list entry: {key}", M::KIND);
                skip_value(reader)?;
            }
        }

        match name {
            Some(name) if !name.is_empty() => self
                .stage(store, name, priority)
                .map_err(|e| record_error(M::KIND, e)),
            _ => Err(Error::invalid_record(format!(
                "entry in '{list_key}' is missing '{}'",
                M::NAME_KEY
            ))),
        }
    }
}

/// Wraps a staging failure as an invalid record.
pub(crate) fn record_error(kind: EntityKind, err: Error) -> Error {
    match err {
        Error::InvalidRecord { .. } => err,
        other => Error::invalid_record_with_source(format!("cannot stage {kind}"), other),
    }
}

/// Emits `list_key` followed by its member sequence.
pub fn emit_members<M: Member, W: EventWriter + ?Sized>(
    writer: &mut W,
    store: &EntityStore,
    list_key: &str,
    list: &AssociationList<M::Id>,
) -> Result<()> {
    writer.emit(Event::str(list_key))?;
    writer.emit(Event::SequenceStart)?;
    for assoc in list {
        let name = M::name_of(store, assoc.target).ok_or_else(|| {
            Error::emit(format!("{list_key} refers to a missing {}", M::KIND))
        })?;
        writer.emit(Event::MappingStart)?;
        emit_string_field(writer, M::NAME_KEY, name)?;
        emit_integer_field(writer, "priority", assoc.priority)?;
        writer.emit(Event::MappingEnd)?;
    }
    writer.emit(Event::SequenceEnd)
}
