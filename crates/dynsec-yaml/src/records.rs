//! Top-level `clients` and `roles` sections.
//!
//! These carry only the display fields of each entity; links live in the
//! group records. Any other key (credentials, ACL entries, ...) belongs to
//! another subsystem and is skipped.

use crate::event::{
    begin_sequence, emit_optional_field, emit_string_field, next_key, read_optional_string,
    read_string, require_event, skip_value, Event, EventReader, EventWriter,
};
use crate::members::{record_error, Member, Staged};
use dynsec_acl::EntityStore;
use dynsec_core::{Error, Result};

/// Display fields of one client or role, read but not yet applied.
#[derive(Debug, Default)]
struct DisplayRecord {
    name: Option<String>,
    text_name: Option<String>,
    text_description: Option<String>,
}

impl DisplayRecord {
    fn read<M: Member, R: EventReader + ?Sized>(reader: &mut R) -> Result<Self> {
        let mut record = Self::default();
        while let Some(key) = next_key(reader)? {
            if key.eq_ignore_ascii_case(M::NAME_KEY) {
                record.name = Some(read_string(reader, M::NAME_KEY)?);
            } else if key.eq_ignore_ascii_case("textname") {
                record.text_name = read_optional_string(reader, "textname")?;
            } else if key.eq_ignore_ascii_case("textdescription") {
                record.text_description = read_optional_string(reader, "textdescription")?;
            } else {
                log::debug!("Skipping {} key '{key}'", M::KIND);
                skip_value(reader)?;
            }
        }
        Ok(record)
    }

    fn apply<M: Member>(self, store: &mut EntityStore) -> Result<()> {
        let name = match self.name {
            Some(name) if !name.is_empty() => name,
            _ => {
                return Err(Error::invalid_record(format!(
                    "{} record is missing '{}'",
                    M::KIND,
                    M::NAME_KEY
                )));
            }
        };
        let staged = match M::find(store, &name) {
            Some(id) => Staged::Existing(id),
            None => Staged::New(name),
        };
        let id = M::resolve(store, staged).map_err(|e| record_error(M::KIND, e))?;
        if let Some(entity) = M::get_mut(store, id) {
            entity.set_text(self.text_name, self.text_description);
        }
        Ok(())
    }
}

/// Loads a `clients` or `roles` section, returning how many records it held.
///
/// Each record is applied as soon as it is complete.
pub fn load_display_records<M: Member, R: EventReader + ?Sized>(
    reader: &mut R,
    store: &mut EntityStore,
    section: &str,
) -> Result<usize> {
    if !begin_sequence(reader, section)? {
        return Ok(0);
    }
    let mut count = 0;
    loop {
        match require_event(reader)? {
            Event::SequenceEnd => return Ok(count),
            Event::MappingStart => {
                DisplayRecord::read::<M, _>(reader)?.apply::<M>(store)?;
                count += 1;
            }
            other => {
                return Err(Error::invalid_record(format!(
                    "expected a {} record in '{section}', found {other}",
                    M::KIND
                )));
            }
        }
    }
}

/// Emits `section` followed by one display record per entity.
pub fn emit_display_records<'a, M, W, I>(writer: &mut W, section: &str, entities: I) -> Result<()>
where
    M: Member + 'a,
    W: EventWriter + ?Sized,
    I: IntoIterator<Item = &'a M>,
{
    writer.emit(Event::str(section))?;
    writer.emit(Event::SequenceStart)?;
    for entity in entities {
        writer.emit(Event::MappingStart)?;
        emit_string_field(writer, M::NAME_KEY, entity.name())?;
        emit_optional_field(writer, "textname", entity.text_name())?;
        emit_optional_field(writer, "textdescription", entity.text_description())?;
        writer.emit(Event::MappingEnd)?;
    }
    writer.emit(Event::SequenceEnd)
}
