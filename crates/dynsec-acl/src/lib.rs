//! # dynsec-acl
//!
//! The in-memory relational model behind dynamic-security access control.
//!
//! - [`EntityStore`]: owns every group, role and client, and is the only
//!   place links between them change
//! - [`AssociationList`]: insertion-ordered, de-duplicated `(handle, priority)`
//!   lists used for rolelists, clientlists and grouplists
//! - Typed handles ([`GroupId`], [`RoleId`], [`ClientId`]) for all cross
//!   references
//!
//! Every group → role and group → client link is mirrored by a
//! role → group or client → group back-reference with the same priority.
//!
//! ```rust
//! use dynsec_acl::EntityStore;
//!
//! let mut store = EntityStore::new();
//! let admins = store.find_or_create_group("admins").unwrap();
//! let alice = store.find_or_create_client("alice").unwrap();
//! store.link_group_client(admins, alice, 10).unwrap();
//!
//! let alice = store.client(alice).unwrap();
//! assert_eq!(alice.grouplist().priority(&admins), Some(10));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![forbid(unsafe_code)]

mod arena;
pub mod association;
pub mod entity;
mod proptests;
pub mod store;

pub use association::{Association, AssociationList, DEFAULT_PRIORITY};
pub use entity::{Client, ClientId, Entity, EntityId, EntityKind, Group, GroupId, Role, RoleId};
pub use store::EntityStore;
