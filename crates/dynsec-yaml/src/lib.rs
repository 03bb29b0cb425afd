//! # dynsec-yaml
//!
//! Streaming load and save of the dynsec relation store.
//!
//! Loaders and serializers work on a typed [`Event`] stream, so the record
//! logic is independent of the text format. [`YamlReader`] and
//! [`YamlWriter`] adapt that stream to YAML.
//!
//! # Modules
//!
//! - [`event`]: stream events plus the [`EventReader`] / [`EventWriter`] seams
//! - [`group`]: the group [`RecordLoader`] and `groups` section
//! - [`members`]: role and client member lists inside a group record
//! - [`records`]: top-level `clients` and `roles` display records
//! - [`document`]: whole-document [`load`] / [`save`]
//! - [`yaml`]: the YAML adapter
//!
//! ```rust
//! use dynsec_acl::EntityStore;
//! use dynsec_core::LoadOptions;
//!
//! let yaml = r#"
//! groups:
//!   - groupname: admins
//!     clients:
//!       - username: alice
//!         priority: 10
//! "#;
//!
//! let mut store = EntityStore::new();
//! dynsec_yaml::load_str(&mut store, yaml, &LoadOptions::default()).unwrap();
//!
//! let admins = store.find_group("admins").unwrap();
//! let alice = store.find_client("alice").unwrap();
//! assert_eq!(store.client(alice).unwrap().grouplist().priority(&admins), Some(10));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![forbid(unsafe_code)]

pub mod document;
pub mod event;
pub mod group;
pub mod members;
pub mod records;
pub mod yaml;

pub use document::{load, load_file, load_str, save, save_string, LoadReport};
pub use event::{Event, EventReader, EventWriter, Scalar};
pub use group::{load_groups, save_groups, RecordLoader, StagedGroup};
pub use members::{Member, Staged, StagedMembers};
pub use yaml::{YamlReader, YamlWriter};
