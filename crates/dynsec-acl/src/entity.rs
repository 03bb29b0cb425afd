//! Groups, roles, clients and the handles that refer to them.
//!
//! Entities never point at each other directly. Every cross reference is a
//! typed handle into the [`EntityStore`](crate::EntityStore) arena of the
//! target kind, and association lists are only mutable through the store so
//! both directions of a link change together.

use crate::association::AssociationList;
use std::fmt;
use std::hash::Hash;

// ============================================================================
// Handles
// ============================================================================

/// Common behaviour of the typed entity handles.
pub trait EntityId: Copy + Eq + Hash + fmt::Debug {
    /// Builds a handle from an arena slot, or `None` past the handle range.
    fn from_slot(slot: usize) -> Option<Self>;
    /// Arena slot this handle refers to.
    fn slot(self) -> usize;
}

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(u32);

        impl EntityId for $name {
            fn from_slot(slot: usize) -> Option<Self> {
                u32::try_from(slot).ok().map(Self)
            }

            fn slot(self) -> usize {
                self.0 as usize
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}#{}", stringify!($name), self.0)
            }
        }
    };
}

entity_id!(
    /// Handle to a [`Group`].
    GroupId
);
entity_id!(
    /// Handle to a [`Role`].
    RoleId
);
entity_id!(
    /// Handle to a [`Client`].
    ClientId
);

/// The three entity kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EntityKind {
    /// A group of clients sharing roles.
    Group,
    /// A named bundle of permissions.
    Role,
    /// An authenticating client.
    Client,
}

impl EntityKind {
    /// Lower-case kind name, as used in messages.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Group => "group",
            Self::Role => "role",
            Self::Client => "client",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Entity trait
// ============================================================================

/// Behaviour shared by every stored entity.
pub trait Entity {
    /// Handle type for this kind.
    type Id: EntityId;
    /// Which kind this is.
    const KIND: EntityKind;

    /// A fresh entity with empty display fields and no links.
    fn with_name(name: String) -> Self;
    /// Unique, case-sensitive name.
    fn name(&self) -> &str;
    /// Optional display name.
    fn text_name(&self) -> Option<&str>;
    /// Optional free-text description.
    fn text_description(&self) -> Option<&str>;
    /// Replaces both display fields.
    fn set_text(&mut self, text_name: Option<String>, text_description: Option<String>);
}

macro_rules! display_fields {
    () => {
        fn name(&self) -> &str {
            &self.name
        }

        fn text_name(&self) -> Option<&str> {
            self.text_name.as_deref()
        }

        fn text_description(&self) -> Option<&str> {
            self.text_description.as_deref()
        }

        fn set_text(&mut self, text_name: Option<String>, text_description: Option<String>) {
            self.text_name = text_name;
            self.text_description = text_description;
        }
    };
}

// ============================================================================
// Group
// ============================================================================

/// A group: clients that share a set of roles.
#[derive(Clone, Debug)]
pub struct Group {
    name: String,
    pub(crate) text_name: Option<String>,
    pub(crate) text_description: Option<String>,
    pub(crate) rolelist: AssociationList<RoleId>,
    pub(crate) clientlist: AssociationList<ClientId>,
}

impl Group {
    /// Creates an unlinked group.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_name(name.into())
    }

    /// Sets the display name.
    pub fn with_text_name(mut self, text_name: impl Into<String>) -> Self {
        self.text_name = Some(text_name.into());
        self
    }

    /// Sets the description.
    pub fn with_text_description(mut self, text_description: impl Into<String>) -> Self {
        self.text_description = Some(text_description.into());
        self
    }

    /// Roles granted to this group.
    pub fn rolelist(&self) -> &AssociationList<RoleId> {
        &self.rolelist
    }

    /// Clients in this group.
    pub fn clientlist(&self) -> &AssociationList<ClientId> {
        &self.clientlist
    }
}

impl Entity for Group {
    type Id = GroupId;
    const KIND: EntityKind = EntityKind::Group;

    fn with_name(name: String) -> Self {
        Self {
            name,
            text_name: None,
            text_description: None,
            rolelist: AssociationList::new(),
            clientlist: AssociationList::new(),
        }
    }

    display_fields!();
}

// ============================================================================
// Role
// ============================================================================

/// A role. Its grouplist mirrors the groups that grant it.
#[derive(Clone, Debug)]
pub struct Role {
    name: String,
    pub(crate) text_name: Option<String>,
    pub(crate) text_description: Option<String>,
    pub(crate) grouplist: AssociationList<GroupId>,
}

impl Role {
    /// Creates an unlinked role.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_name(name.into())
    }

    /// Groups that grant this role.
    pub fn grouplist(&self) -> &AssociationList<GroupId> {
        &self.grouplist
    }
}

impl Entity for Role {
    type Id = RoleId;
    const KIND: EntityKind = EntityKind::Role;

    fn with_name(name: String) -> Self {
        Self {
            name,
            text_name: None,
            text_description: None,
            grouplist: AssociationList::new(),
        }
    }

    display_fields!();
}

// ============================================================================
// Client
// ============================================================================

/// A client. Its grouplist mirrors the groups it belongs to.
#[derive(Clone, Debug)]
pub struct Client {
    name: String,
    pub(crate) text_name: Option<String>,
    pub(crate) text_description: Option<String>,
    pub(crate) grouplist: AssociationList<GroupId>,
}

impl Client {
    /// Creates an unlinked client.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_name(name.into())
    }

    /// Groups this client belongs to.
    pub fn grouplist(&self) -> &AssociationList<GroupId> {
        &self.grouplist
    }
}

impl Entity for Client {
    type Id = ClientId;
    const KIND: EntityKind = EntityKind::Client;

    fn with_name(name: String) -> Self {
        Self {
            name,
            text_name: None,
            text_description: None,
            grouplist: AssociationList::new(),
        }
    }

    display_fields!();
}
