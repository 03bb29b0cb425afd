//! Whole-document load and save.
//!
//! ```yaml
//! clients:
//!   - username: alice
//! roles:
//!   - rolename: admin
//! groups:
//!   - groupname: admins
//!     clients:
//!       - username: alice
//!         priority: 10
//! anonymousGroup: guests
//! ```
//!
//! Top-level keys may appear in any order and match case-insensitively.

use crate::event::{
    next_key, read_optional_string, require_event, skip_value, Event, EventReader, EventWriter,
};
use crate::group::{load_groups, save_groups, ANONYMOUS_GROUP_KEY};
use crate::records::{emit_display_records, load_display_records};
use crate::yaml::{YamlReader, YamlWriter};
use dynsec_acl::{Client, EntityStore, Role};
use dynsec_core::{Error, LoadMode, LoadOptions, Result};
use std::path::Path;

/// What a load applied.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// Group records committed.
    pub groups: usize,
    /// Role display records applied.
    pub roles: usize,
    /// Client display records applied.
    pub clients: usize,
    /// Name of the anonymous group, if the document set one.
    pub anonymous_group: Option<String>,
}

/// Loads a document from `reader` into `store`.
///
/// With [`LoadMode::Partial`] records committed before a failure stay in the
/// store. With [`LoadMode::Atomic`] the document is applied to a copy that
/// replaces `store` only when the whole document loads.
pub fn load<R: EventReader + ?Sized>(
    reader: &mut R,
    store: &mut EntityStore,
    options: &LoadOptions,
) -> Result<LoadReport> {
    match options.mode {
        LoadMode::Partial => load_into(reader, store),
        LoadMode::Atomic => {
            let mut scratch = store.clone();
            let report = load_into(reader, &mut scratch)?;
            *store = scratch;
            Ok(report)
        }
    }
}

fn load_into<R: EventReader + ?Sized>(
    reader: &mut R,
    store: &mut EntityStore,
) -> Result<LoadReport> {
    let mut report = LoadReport::default();

    match require_event(reader)? {
        Event::MappingStart => {}
        Event::Scalar(s) if s.is_empty() => {
            log::debug!("Empty document");
            return Ok(report);
        }
        other => {
            return Err(Error::stream(format!(
                "document must be a mapping, found {other}"
            )));
        }
    }

    while let Some(key) = next_key(reader)? {
        if key.eq_ignore_ascii_case("groups") {
            report.groups += load_groups(reader, store)?;
        } else if key.eq_ignore_ascii_case("clients") {
            report.clients += load_display_records::<Client, _>(reader, store, "clients")?;
        } else if key.eq_ignore_ascii_case("roles") {
            report.roles += load_display_records::<Role, _>(reader, store, "roles")?;
        } else if key.eq_ignore_ascii_case(ANONYMOUS_GROUP_KEY) {
            report.anonymous_group = read_optional_string(reader, ANONYMOUS_GROUP_KEY)?;
        } else {
            log::warn!("Ignoring unknown top-level key '{key}'");
            skip_value(reader)?;
        }
    }

    if let Some(event) = reader.next_event()? {
        return Err(Error::stream(format!(
            "unexpected {event} after the end of the document"
        )));
    }

    // Resolved last so the group may be defined anywhere in the document.
    if let Some(name) = &report.anonymous_group {
        let id = store.find_or_create_group(name)?;
        store.set_anonymous_group(Some(id))?;
    }

    log::debug!(
        "Loaded {} groups, {} roles, {} clients",
        report.groups,
        report.roles,
        report.clients
    );
    Ok(report)
}

/// Emits the whole store: `clients`, `roles`, `groups`, then `anonymousGroup`.
pub fn save<W: EventWriter + ?Sized>(store: &EntityStore, writer: &mut W) -> Result<()> {
    writer.emit(Event::MappingStart)?;
    emit_display_records(writer, "clients", store.clients().map(|(_, c)| c))?;
    emit_display_records(writer, "roles", store.roles().map(|(_, r)| r))?;
    save_groups(store, writer)?;
    writer.emit(Event::MappingEnd)
}

/// Loads YAML text into `store`.
pub fn load_str(store: &mut EntityStore, text: &str, options: &LoadOptions) -> Result<LoadReport> {
    let mut reader = YamlReader::parse(text)?;
    load(&mut reader, store, options)
}

/// Loads a YAML file into `store`.
pub fn load_file(
    store: &mut EntityStore,
    path: impl AsRef<Path>,
    options: &LoadOptions,
) -> Result<LoadReport> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|e| Error::io_with_path(e, path))?;
    load_str(store, &text, options)
}

/// Renders the store as YAML text.
pub fn save_string(store: &EntityStore) -> Result<String> {
    let mut writer = YamlWriter::new();
    save(store, &mut writer)?;
    writer.into_string()
}
